use image::{ImageBuffer, RgbaImage};

pub const INITIAL_SCALE: f32 = 0.55;
pub const MIN_SCALE: f32 = 0.01;
const ZOOM_IN_RATIO: f32 = 1.1;
const ZOOM_OUT_RATIO: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Scale and pan shared by every pane of the group on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f32,
    pub pan: (f32, f32),
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: INITIAL_SCALE,
            pan: (0.0, 0.0),
        }
    }
}

/// The visible part of one pane's image, already resampled to screen pixels.
#[derive(Debug, Clone)]
pub struct RenderedPane {
    pub image: RgbaImage,
    /// Top-left corner of `image` inside the pane, in pane pixels.
    pub origin: (u32, u32),
}

impl Viewport {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// One wheel tick.
    pub fn zoom(&mut self, direction: ZoomDirection) {
        let ratio = match direction {
            ZoomDirection::In => ZOOM_IN_RATIO,
            ZoomDirection::Out => ZOOM_OUT_RATIO,
        };
        self.scale = (self.scale * ratio).max(MIN_SCALE);
    }

    /// Apply the pointer motion since the previous drag event.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan.0 += dx;
        self.pan.1 += dy;
    }

    /// Size of a `(w, h)` cache on screen at the current scale.
    pub fn displayed_size(&self, w: u32, h: u32) -> (u32, u32) {
        ((w as f32 * self.scale) as u32, (h as f32 * self.scale) as u32)
    }

    /// Top-left of the displayed image: centred in the pane, then panned.
    pub fn placement(&self, displayed: (u32, u32), pane: (u32, u32)) -> (i64, i64) {
        let x = (pane.0 / 2) as i64 - (displayed.0 / 2) as i64 + self.pan.0.round() as i64;
        let y = (pane.1 / 2) as i64 - (displayed.1 / 2) as i64 + self.pan.1.round() as i64;
        (x, y)
    }

    /// Draw `cache` into a pane of `pane` size.
    ///
    /// Sampling is nearest-neighbour: the expensive smoothing already happened
    /// when the cache was derived. Only pixels that land inside the pane are
    /// produced, so the cost follows the pane area and not the zoom level.
    /// Returns `None` when nothing would be visible.
    pub fn render(&self, cache: &RgbaImage, pane: (u32, u32)) -> Option<RenderedPane> {
        let (w, h) = cache.dimensions();
        let (nw, nh) = self.displayed_size(w, h);
        if nw == 0 || nh == 0 {
            return None;
        }
        let (x, y) = self.placement((nw, nh), pane);

        // Visible window in displayed-image coordinates.
        let x0 = (-x).max(0);
        let y0 = (-y).max(0);
        let x1 = (nw as i64).min(pane.0 as i64 - x);
        let y1 = (nh as i64).min(pane.1 as i64 - y);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        let image = ImageBuffer::from_fn((x1 - x0) as u32, (y1 - y0) as u32, |i, j| {
            let sx = source_index(x0 + i as i64, w, nw);
            let sy = source_index(y0 + j as i64, h, nh);
            *cache.get_pixel(sx, sy)
        });

        Some(RenderedPane {
            image,
            origin: ((x + x0) as u32, (y + y0) as u32),
        })
    }
}

// Same mapping as a nearest-filter resize from `src` to `dst` pixels.
fn source_index(dst_pos: i64, src: u32, dst: u32) -> u32 {
    let pos = ((dst_pos as f64 + 0.5) * src as f64 / dst as f64) as u32;
    pos.min(src - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker(w: u32, h: u32) -> RgbaImage {
        ImageBuffer::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn test_default_and_reset() {
        let mut vp = Viewport::default();
        assert_eq!(vp.scale, INITIAL_SCALE);
        assert_eq!(vp.pan, (0.0, 0.0));

        vp.zoom(ZoomDirection::In);
        vp.pan_by(12.0, -3.0);
        vp.reset();
        assert_eq!(vp, Viewport::default());
    }

    #[test]
    fn test_zoom_ratios() {
        let mut vp = Viewport { scale: 1.0, pan: (0.0, 0.0) };
        vp.zoom(ZoomDirection::In);
        assert!((vp.scale - 1.1).abs() < 1e-6);
        vp.zoom(ZoomDirection::Out);
        assert!((vp.scale - 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_out_never_reaches_zero() {
        let mut vp = Viewport::default();
        for _ in 0..500 {
            vp.zoom(ZoomDirection::Out);
        }
        assert_eq!(vp.scale, MIN_SCALE);
    }

    #[test]
    fn test_pan_accumulates_increments() {
        let mut vp = Viewport::default();
        // a drag from (10,10) to (15,12) to (18,20)
        vp.pan_by(5.0, 2.0);
        vp.pan_by(3.0, 8.0);
        assert_eq!(vp.pan, (8.0, 10.0));
    }

    #[test]
    fn test_centered_placement() {
        let vp = Viewport { scale: 1.0, pan: (0.0, 0.0) };
        assert_eq!(vp.placement((100, 50), (300, 200)), (100, 75));
        let panned = Viewport { scale: 1.0, pan: (-20.0, 7.0) };
        assert_eq!(panned.placement((100, 50), (300, 200)), (80, 82));
    }

    #[test]
    fn test_render_fully_visible() {
        let vp = Viewport { scale: 1.0, pan: (0.0, 0.0) };
        let cache = checker(10, 6);
        let out = vp.render(&cache, (30, 20)).unwrap();
        assert_eq!(out.origin, (10, 7));
        assert_eq!(out.image.dimensions(), (10, 6));
        assert_eq!(out.image, cache);
    }

    #[test]
    fn test_render_matches_nearest_resize() {
        let vp = Viewport { scale: 2.0, pan: (0.0, 0.0) };
        let cache = checker(7, 5);
        let out = vp.render(&cache, (100, 100)).unwrap();
        let expected =
            image::imageops::resize(&cache, 14, 10, image::imageops::FilterType::Nearest);
        assert_eq!(out.image, expected);
    }

    #[test]
    fn test_render_crops_to_pane_when_zoomed_in() {
        let vp = Viewport { scale: 10.0, pan: (0.0, 0.0) };
        let cache = checker(100, 100);
        let out = vp.render(&cache, (64, 48)).unwrap();
        assert_eq!(out.origin, (0, 0));
        assert_eq!(out.image.dimensions(), (64, 48));
        // displayed image is 1000x1000 centred, so pane (0,0) is displayed (468,476)
        let expected = cache.get_pixel(46, 47);
        assert_eq!(out.image.get_pixel(0, 0), expected);
    }

    #[test]
    fn test_render_partially_off_left_edge() {
        let vp = Viewport { scale: 1.0, pan: (-25.0, 0.0) };
        let cache = checker(20, 10);
        // centred x would be 10, panned to -15: five columns remain visible
        let out = vp.render(&cache, (40, 10)).unwrap();
        assert_eq!(out.origin, (0, 0));
        assert_eq!(out.image.dimensions(), (5, 10));
        assert_eq!(out.image.get_pixel(0, 0), cache.get_pixel(15, 0));
    }

    #[test]
    fn test_render_panned_out_of_view() {
        let vp = Viewport { scale: 1.0, pan: (500.0, 0.0) };
        assert!(vp.render(&checker(10, 10), (100, 100)).is_none());
    }

    #[test]
    fn test_render_degenerate_scale() {
        let vp = Viewport { scale: MIN_SCALE, pan: (0.0, 0.0) };
        assert!(vp.render(&checker(50, 50), (100, 100)).is_none());
    }
}
