use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbaImage};

/// Longest side a display cache may have.
pub const MAX_SIDE: u32 = 2500;

/// Build the bitmap that every later render of a pane reads from.
///
/// Large decodes are shrunk once with Lanczos so that pan and zoom only ever
/// touch at most `MAX_SIDE` x `MAX_SIDE` pixels. Smaller images are kept as is.
pub fn derive(img: &DynamicImage) -> RgbaImage {
    let (w, h) = img.dimensions();
    match bounded_size(w, h, MAX_SIDE) {
        Some((nw, nh)) => img.resize_exact(nw, nh, FilterType::Lanczos3).to_rgba8(),
        None => img.to_rgba8(),
    }
}

/// Target size when `(w, h)` exceeds `bound` on either side, `None` otherwise.
fn bounded_size(w: u32, h: u32, bound: u32) -> Option<(u32, u32)> {
    if w <= bound && h <= bound {
        return None;
    }
    let ratio = (bound as f64 / w as f64).min(bound as f64 / h as f64);
    let nw = ((w as f64 * ratio) as u32).max(1);
    let nh = ((h as f64 * ratio) as u32).max(1);
    Some((nw, nh))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_small_images_are_copied() {
        let src = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 200, Rgb([10, 20, 30])));
        let cache = derive(&src);
        assert_eq!(cache.dimensions(), (300, 200));
        assert_eq!(cache.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_exactly_at_bound_is_untouched() {
        assert_eq!(bounded_size(MAX_SIDE, 10, MAX_SIDE), None);
        assert_eq!(bounded_size(MAX_SIDE, MAX_SIDE, MAX_SIDE), None);
    }

    #[test]
    fn test_landscape_long_side_hits_bound() {
        assert_eq!(bounded_size(6000, 4000, 2500), Some((2500, 1666)));
    }

    #[test]
    fn test_portrait_long_side_hits_bound() {
        assert_eq!(bounded_size(4000, 6000, 2500), Some((1666, 2500)));
    }

    #[test]
    fn test_extreme_strip_keeps_a_pixel() {
        assert_eq!(bounded_size(100_000, 2, 2500), Some((2500, 1)));
    }

    #[test]
    fn test_derive_shrinks_large_source() {
        let src = DynamicImage::ImageRgb8(RgbImage::from_pixel(3000, 1500, Rgb([200, 100, 50])));
        let cache = derive(&src);
        assert_eq!(cache.dimensions(), (2500, 1250));
        // Lanczos on a flat field stays flat, give or take rounding
        let px = cache.get_pixel(1200, 600).0;
        for (got, want) in px.iter().zip([200u8, 100, 50, 255]) {
            assert!(got.abs_diff(want) <= 1, "{px:?}");
        }
    }
}
