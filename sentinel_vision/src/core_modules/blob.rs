// THEORY:
// A `Blob` is the output of the spatial grouping layer: one spatially coherent region
// of foreground in a single frame. It is a "dumb" data container. It has no memory of
// earlier frames, and its `label` is only its position in this frame's discovery order,
// never an identity that survives to the next frame.

use serde::Serialize;

/// A 2D point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, `x`/`y` being the top-left pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// A detected moving region within one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Blob {
    /// 1-based index in this frame's discovery order. Not persistent.
    pub label: usize,
    /// Pixels enclosed by the region's outer boundary.
    pub area: u32,
    pub bounding_box: BoundingBox,
    /// Convex hull of the boundary pixels, starting from the left-most, top-most vertex.
    pub convex_hull: Vec<Point>,
}

impl Blob {
    /// Moves the blob by (`dx`, `dy`); used to map ROI coordinates back onto the frame.
    pub fn translate(&mut self, dx: u32, dy: u32) {
        self.bounding_box.x += dx;
        self.bounding_box.y += dy;
        for point in &mut self.convex_hull {
            point.x += dx as i32;
            point.y += dy as i32;
        }
    }
}

/// Convex hull by Andrew's monotone chain. Collinear points are dropped. With the image
/// y axis pointing down, the vertices run clockwise on screen.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut sorted = points.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    if sorted.len() < 3 {
        return sorted;
    }

    fn cross(o: Point, a: Point, b: Point) -> i64 {
        (a.x - o.x) as i64 * (b.y - o.y) as i64 - (a.y - o.y) as i64 * (b.x - o.x) as i64
    }

    let mut hull: Vec<Point> = Vec::with_capacity(sorted.len() * 2);

    // Lower chain.
    for &p in &sorted {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    // Upper chain.
    let lower_len = hull.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(i32, i32)]) -> Vec<Point> {
        raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn hull_of_a_filled_square_is_its_corners() {
        let mut points = Vec::new();
        for y in 0..5 {
            for x in 0..5 {
                points.push(Point::new(x, y));
            }
        }
        let hull = convex_hull(&points);
        assert_eq!(hull, pts(&[(0, 0), (4, 0), (4, 4), (0, 4)]));
    }

    #[test]
    fn hull_drops_collinear_and_interior_points() {
        let hull = convex_hull(&pts(&[(0, 0), (2, 0), (4, 0), (2, 1), (2, 3), (4, 4), (0, 4)]));
        assert_eq!(hull, pts(&[(0, 0), (4, 0), (4, 4), (0, 4)]));
    }

    #[test]
    fn degenerate_hulls() {
        assert!(convex_hull(&[]).is_empty());
        assert_eq!(convex_hull(&pts(&[(3, 3), (3, 3)])), pts(&[(3, 3)]));
        assert_eq!(convex_hull(&pts(&[(0, 0), (1, 1), (2, 2)])), pts(&[(0, 0), (2, 2)]));
    }

    #[test]
    fn translate_moves_box_and_hull() {
        let mut blob = Blob {
            label: 1,
            area: 4,
            bounding_box: BoundingBox {
                x: 1,
                y: 2,
                width: 2,
                height: 2,
            },
            convex_hull: pts(&[(1, 2), (2, 2), (2, 3), (1, 3)]),
        };
        blob.translate(10, 20);
        assert_eq!(blob.bounding_box.x, 11);
        assert_eq!(blob.bounding_box.y, 22);
        assert_eq!(blob.convex_hull[0], Point::new(11, 22));
    }

    #[test]
    fn boxes_intersect_only_when_overlapping() {
        let a = BoundingBox { x: 0, y: 0, width: 4, height: 4 };
        let b = BoundingBox { x: 4, y: 0, width: 4, height: 4 };
        let c = BoundingBox { x: 3, y: 3, width: 4, height: 4 };
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
    }
}
