use std::path::{Path, PathBuf};

use image::{GenericImageView, RgbaImage};
use rayon::prelude::*;

use crate::{decode, display_cache};

/// One member of the group on screen, reduced to what rendering needs.
#[derive(Debug, Clone)]
pub struct Pane {
    pub path: PathBuf,
    pub file_name: String,
    /// Bounded copy of the decode; the only bitmap pan and zoom read from.
    pub display: RgbaImage,
    /// Full decode size, `None` when the placeholder stands in.
    pub source_size: Option<(u32, u32)>,
    pub error: Option<String>,
}

impl Pane {
    /// Decode `path` and derive its display cache. A decode failure is logged
    /// and replaced by the grey placeholder.
    pub fn load(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        match decode::load(path) {
            Ok(img) => {
                let source_size = Some(img.dimensions());
                let display = display_cache::derive(&img);
                // drop the full-size decode right here; only the cache is kept
                drop(img);
                Pane {
                    path: path.to_path_buf(),
                    file_name,
                    display,
                    source_size,
                    error: None,
                }
            }
            Err(e) => {
                log::warn!("{}", e);
                Pane {
                    path: path.to_path_buf(),
                    file_name,
                    display: decode::placeholder().to_rgba8(),
                    source_size: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn caption(&self) -> String {
        match self.source_size {
            Some((w, h)) => format!("{}  ({} x {})", self.file_name, w, h),
            None => format!("{}  (unreadable)", self.file_name),
        }
    }
}

/// Load every member of a group in parallel, keeping group order.
pub fn load_group(paths: &[PathBuf]) -> Vec<Pane> {
    let start = std::time::Instant::now();
    let panes: Vec<Pane> = paths.par_iter().map(|p| Pane::load(p)).collect();
    log::info!("Loaded {} panes in {:?}", panes.len(), start.elapsed());
    panes
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_load_group_keeps_order_and_substitutes_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let good = tmp.path().join("a").join("shot.png");
        std::fs::create_dir_all(good.parent().unwrap()).unwrap();
        RgbaImage::from_pixel(64, 32, Rgba([9, 9, 9, 255]))
            .save(&good)
            .unwrap();
        let bad = tmp.path().join("shot.jpg");
        std::fs::write(&bad, b"nope").unwrap();

        let panes = load_group(&[bad.clone(), good.clone()]);
        assert_eq!(panes.len(), 2);

        assert_eq!(panes[0].path, bad);
        assert!(panes[0].error.is_some());
        assert_eq!(panes[0].display.dimensions(), (100, 100));
        assert!(panes[0].caption().contains("unreadable"));

        assert_eq!(panes[1].path, good);
        assert!(panes[1].error.is_none());
        assert_eq!(panes[1].source_size, Some((64, 32)));
        assert_eq!(panes[1].display.dimensions(), (64, 32));
        assert_eq!(panes[1].caption(), "shot.png  (64 x 32)");
    }
}
