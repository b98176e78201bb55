use std::path::Path;

pub const STANDARD_EXTENSIONS: [&str; 8] =
    ["png", "jpg", "jpeg", "bmp", "tiff", "tif", "gif", "webp"];

pub const RAW_EXTENSIONS: [&str; 10] = [
    "arw", "cr2", "cr3", "nef", "dng", "orf", "raf", "rw2", "pef", "srw",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Decodable by the `image` crate.
    Standard,
    /// Sensor data that has to be developed before display.
    CameraRaw,
}

/// Classify a file by the suffix after the last dot of its name, ignoring case.
/// Returns `None` for anything we do not know how to show.
///
/// A bare `.jpg` counts as a JPEG here even though `Path::extension` sees no
/// extension on it.
pub fn classify(path: &Path) -> Option<ImageKind> {
    let name = path.file_name()?.to_str()?;
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    if STANDARD_EXTENSIONS.contains(&ext.as_str()) {
        Some(ImageKind::Standard)
    } else if RAW_EXTENSIONS.contains(&ext.as_str()) {
        Some(ImageKind::CameraRaw)
    } else {
        None
    }
}

pub fn is_supported(path: &Path) -> bool {
    classify(path).is_some()
}

pub fn is_camera_raw(path: &Path) -> bool {
    classify(path) == Some(ImageKind::CameraRaw)
}
