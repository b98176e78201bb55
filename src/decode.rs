use std::io::{BufReader, Cursor};
use std::path::Path;

use image::{DynamicImage, ImageReader, Rgb, RgbImage};

use crate::error::DecodeError;
use crate::formats;

/// Side length of the stand-in shown when a file cannot be decoded.
pub const PLACEHOLDER_SIZE: u32 = 100;
const PLACEHOLDER_GREY: Rgb<u8> = Rgb([128, 128, 128]);

/// Decode `path` at full resolution.
///
/// Camera RAW files are developed through LibRaw with the white balance the
/// camera recorded; everything else goes through the `image` decoders and gets
/// its EXIF orientation applied.
pub fn load(path: &Path) -> Result<DynamicImage, DecodeError> {
    let start = std::time::Instant::now();
    let img = if formats::is_camera_raw(path) {
        load_raw(path)?
    } else {
        load_standard(path)?
    };
    log::debug!(
        "Decoded {} ({}x{}) in {:?}",
        path.display(),
        img.width(),
        img.height(),
        start.elapsed()
    );
    Ok(img)
}

/// Neutral grey square that keeps a pane's slot in the grid.
pub fn placeholder() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(
        PLACEHOLDER_SIZE,
        PLACEHOLDER_SIZE,
        PLACEHOLDER_GREY,
    ))
}

fn load_standard(path: &Path) -> Result<DynamicImage, DecodeError> {
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // Content sniffing first; the extension decides only when the magic bytes don't.
    let mut reader = ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    if reader.format().is_none() {
        if let Ok(format) = image::ImageFormat::from_path(path) {
            reader.set_format(format);
        }
    }

    let img = reader.decode().map_err(|source| DecodeError::Image {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(apply_orientation(img, read_orientation(&bytes)))
}

fn load_raw(path: &Path) -> Result<DynamicImage, DecodeError> {
    let data = std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut raw = rsraw::RawImage::open(&data)
        .map_err(|_| raw_error(path, "unrecognized RAW container"))?;
    raw.set_use_camera_wb(true);
    raw.unpack()
        .map_err(|_| raw_error(path, "could not unpack sensor data"))?;
    let processed = raw
        .process::<{ rsraw::BIT_DEPTH_8 }>()
        .map_err(|_| raw_error(path, "demosaic failed"))?;

    let (w, h) = (processed.width(), processed.height());
    if processed.len() != (w as usize) * (h as usize) * 3 {
        return Err(raw_error(path, "unexpected output layout"));
    }
    // LibRaw already rotated the output according to the camera's orientation flag.
    RgbImage::from_raw(w, h, processed.to_vec())
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| raw_error(path, "output buffer too small"))
}

fn raw_error(path: &Path, message: &str) -> DecodeError {
    DecodeError::Raw {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// EXIF orientation of an encoded image, 1 when absent or unreadable.
fn read_orientation(bytes: &[u8]) -> u32 {
    let mut reader = BufReader::new(Cursor::new(bytes));
    let Ok(exif) = exif::Reader::new().read_from_container(&mut reader) else {
        return 1;
    };
    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1)
}

fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    #[test]
    fn test_load_png() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("red.png");
        RgbaImage::from_pixel(40, 30, Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let img = load(&path).unwrap();
        assert_eq!(img.dimensions(), (40, 30));
        assert_eq!(img.to_rgba8().get_pixel(5, 5), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_wrong_extension_still_decodes() {
        let tmp = tempfile::tempdir().unwrap();
        let png = tmp.path().join("actually.png");
        RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 255]))
            .save(&png)
            .unwrap();
        let disguised = tmp.path().join("actually.jpg");
        std::fs::rename(&png, &disguised).unwrap();

        assert_eq!(load(&disguised).unwrap().dimensions(), (8, 8));
    }

    #[test]
    fn test_garbage_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();
        assert!(matches!(load(&path), Err(DecodeError::Image { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load(Path::new("/nonexistent/dir/photo.png")).unwrap_err();
        assert!(matches!(err, DecodeError::Io { .. }));
        assert!(err.to_string().contains("photo.png"));
    }

    #[test]
    fn test_bogus_raw_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("fake.cr2");
        std::fs::write(&path, vec![0u8; 512]).unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn test_placeholder() {
        let img = placeholder();
        assert_eq!(img.dimensions(), (PLACEHOLDER_SIZE, PLACEHOLDER_SIZE));
        assert_eq!(img.to_rgb8().get_pixel(50, 50), &Rgb([128, 128, 128]));
    }

    #[test]
    fn test_orientation_rotates_quarter_turn() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(40, 10));
        assert_eq!(apply_orientation(img.clone(), 6).dimensions(), (10, 40));
        assert_eq!(apply_orientation(img.clone(), 3).dimensions(), (40, 10));
        assert_eq!(apply_orientation(img, 1).dimensions(), (40, 10));
    }

    #[test]
    fn test_no_exif_means_upright() {
        assert_eq!(read_orientation(b"plain bytes"), 1);
    }
}
