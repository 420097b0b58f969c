// THEORY:
// The `BlobExtractor` is the engine of the spatial grouping layer. It turns the
// denoised foreground mask into a short list of discrete moving regions.
//
// Algorithm steps:
// 1.  **Hole Filling**: The background pixels are labelled with 4-connectivity. Any
//     background region that does not touch the image border is enclosed by foreground
//     and is folded into it. This gives outer-boundary (external contour) semantics: a
//     ring counts as one solid blob, and an island sitting inside a ring's hole is part
//     of the ring rather than a separate object.
// 2.  **Region Labelling**: The filled mask is labelled with 8-connectivity, so regions
//     touching only at a corner are one blob. 4-connected background and 8-connected
//     foreground are the dual pair that keeps step 1 consistent.
// 3.  **Data Aggregation**: A single raster pass collects each region's area, bounds and
//     boundary pixels. Regions are numbered in the order their first pixel is met.
// 4.  **Filtering**: Regions whose area is not strictly greater than `min_area` are
//     dropped. Survivors get consecutive 1-based labels and a convex hull.
//
// Like the mask filter, this is a stateless utility with no memory of earlier frames.

use crate::core_modules::blob::{Blob, BoundingBox, Point, convex_hull};
use crate::core_modules::frame::{BACKGROUND, FOREGROUND};

pub mod blob_extractor {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma};
    use imageproc::region_labelling::{Connectivity, connected_components};
    use std::collections::{HashMap, HashSet};

    type LabelImage = ImageBuffer<Luma<u32>, Vec<u32>>;

    /// Running statistics for one labelled region.
    struct Region {
        area: u32,
        min_x: u32,
        min_y: u32,
        max_x: u32,
        max_y: u32,
        boundary: Vec<Point>,
    }

    impl Region {
        fn new(x: u32, y: u32) -> Self {
            Self {
                area: 0,
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
                boundary: Vec::new(),
            }
        }

        fn add(&mut self, x: u32, y: u32, on_boundary: bool) {
            self.area += 1;
            self.min_x = self.min_x.min(x);
            self.min_y = self.min_y.min(y);
            self.max_x = self.max_x.max(x);
            self.max_y = self.max_y.max(y);
            if on_boundary {
                self.boundary.push(Point::new(x as i32, y as i32));
            }
        }
    }

    /// Extracts every blob with `area > min_area` from `mask`, in discovery order.
    pub fn extract(mask: &GrayImage, min_area: u32) -> Vec<Blob> {
        if !mask.as_raw().iter().any(|&v| v == FOREGROUND) {
            return Vec::new();
        }

        // --- 1. Hole Filling ---
        let filled = fill_holes(mask);

        // --- 2. Region Labelling ---
        let labels = connected_components(&filled, Connectivity::Eight, Luma([BACKGROUND]));

        // --- 3. Data Aggregation ---
        let regions = collect_regions(&labels);

        // --- 4. Filtering ---
        regions
            .into_iter()
            .filter(|region| region.area > min_area)
            .enumerate()
            .map(|(index, region)| Blob {
                label: index + 1,
                area: region.area,
                bounding_box: BoundingBox {
                    x: region.min_x,
                    y: region.min_y,
                    width: region.max_x - region.min_x + 1,
                    height: region.max_y - region.min_y + 1,
                },
                convex_hull: convex_hull(&region.boundary),
            })
            .collect()
    }

    /// Returns a copy of `mask` in which background pockets enclosed by foreground are
    /// set to foreground.
    pub fn fill_holes(mask: &GrayImage) -> GrayImage {
        let (width, height) = mask.dimensions();
        // Label the background; foreground pixels act as the separator.
        let pockets = connected_components(mask, Connectivity::Four, Luma([FOREGROUND]));

        let mut outside: HashSet<u32> = HashSet::new();
        let mut mark = |x: u32, y: u32| {
            let label = pockets.get_pixel(x, y).0[0];
            if label != 0 {
                outside.insert(label);
            }
        };
        for x in 0..width {
            mark(x, 0);
            mark(x, height - 1);
        }
        for y in 0..height {
            mark(0, y);
            mark(width - 1, y);
        }

        GrayImage::from_fn(width, height, |x, y| {
            let label = pockets.get_pixel(x, y).0[0];
            if label == 0 || !outside.contains(&label) {
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        })
    }

    fn collect_regions(labels: &LabelImage) -> Vec<Region> {
        let (width, height) = labels.dimensions();
        let mut index_of: HashMap<u32, usize> = HashMap::new();
        let mut regions: Vec<Region> = Vec::new();

        for y in 0..height {
            for x in 0..width {
                let label = labels.get_pixel(x, y).0[0];
                if label == 0 {
                    continue;
                }

                let index = *index_of.entry(label).or_insert_with(|| {
                    regions.push(Region::new(x, y));
                    regions.len() - 1
                });

                let differs = |nx: i64, ny: i64| {
                    nx < 0
                        || ny < 0
                        || nx >= width as i64
                        || ny >= height as i64
                        || labels.get_pixel(nx as u32, ny as u32).0[0] != label
                };
                let (xi, yi) = (x as i64, y as i64);
                let on_boundary = differs(xi - 1, yi)
                    || differs(xi + 1, yi)
                    || differs(xi, yi - 1)
                    || differs(xi, yi + 1);

                regions[index].add(x, y, on_boundary);
            }
        }

        regions
    }
}
