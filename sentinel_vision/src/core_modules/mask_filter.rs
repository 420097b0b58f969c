// THEORY:
// The `MaskFilter` is the noise-reduction step between the per-pixel classifier and
// the spatial grouping layer. The background model judges every pixel in isolation,
// so sensor noise shows up as salt-and-pepper specks. A median over a small square
// window removes those specks (and fills pin-holes) while leaving large contiguous
// regions intact; on a binary mask the median is simply a majority vote.
//
// It is a pure function of its input: no state, no configuration beyond the window.

pub mod mask_filter {
    use image::GrayImage;
    use imageproc::filter::median_filter;

    /// Default side of the square window.
    pub const DEFAULT_KERNEL: u32 = 5;

    /// Applies a `kernel`x`kernel` median filter. Pixels beyond the border take the value
    /// of the nearest border pixel. `kernel` is expected to be odd; a kernel of 1 is the
    /// identity.
    pub fn denoise(mask: &GrayImage, kernel: u32) -> GrayImage {
        let radius = kernel / 2;
        if radius == 0 {
            return mask.clone();
        }
        median_filter(mask, radius, radius)
    }
}
