//! Image decoding and encoding
//!
//! Inputs are decoded with their format sniffed from the content, not the
//! extension. Outputs are always PNG.

use crate::config::OutputNaming;
use crate::error::{Error, Result};
use image::{ImageFormat, ImageReader, RgbaImage};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A decoded source image copied into a mutable RGBA canvas
pub struct DecodedImage {
    pub canvas: RgbaImage,
    pub format: Option<ImageFormat>,
}

impl DecodedImage {
    /// Human readable format name for log lines
    pub fn format_name(&self) -> &'static str {
        match self.format {
            Some(ImageFormat::Jpeg) => "jpeg",
            Some(ImageFormat::Png) => "png",
            Some(_) => "other",
            None => "unknown",
        }
    }
}

/// Decode an already opened image file into an RGBA canvas
///
/// The handle is rewound first, since reading metadata may have been done
/// through it. Unsupported or corrupt data yields [`Error::Decode`].
pub fn decode_canvas(path: &Path, mut file: File) -> Result<DecodedImage> {
    file.seek(SeekFrom::Start(0)).map_err(|e| Error::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let reader = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(|e| Error::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
    let format = reader.format();

    let image = reader.decode().map_err(|e| Error::Decode {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(DecodedImage {
        canvas: image.to_rgba8(),
        format,
    })
}

/// Destination for a given input file
///
/// With [`OutputNaming::Keep`] the input's base name is reused verbatim, so a
/// `.jpg` name may hold PNG data.
pub fn output_path(output_dir: &Path, input: &Path, naming: OutputNaming) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("output"));
    let dest = output_dir.join(name);

    match naming {
        OutputNaming::Keep => dest,
        OutputNaming::Png => dest.with_extension("png"),
    }
}

/// Encode `canvas` as PNG into `path`, creating or truncating it
pub fn write_png(canvas: &RgbaImage, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::Create {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);

    canvas
        .write_to(&mut writer, ImageFormat::Png)
        .map_err(|e| Error::Encode {
            path: path.to_path_buf(),
            source: e,
        })?;

    writer.flush().map_err(|e| Error::Encode {
        path: path.to_path_buf(),
        source: image::ImageError::IoError(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba};
    use tempfile::tempdir;

    #[test]
    fn test_output_path_keeps_name() {
        let out = output_path(
            Path::new("/out"),
            Path::new("/in/IMG_0001.JPG"),
            OutputNaming::Keep,
        );
        assert_eq!(out, PathBuf::from("/out/IMG_0001.JPG"));
    }

    #[test]
    fn test_output_path_png_naming() {
        let out = output_path(
            Path::new("/out"),
            Path::new("/in/IMG_0001.jpeg"),
            OutputNaming::Png,
        );
        assert_eq!(out, PathBuf::from("/out/IMG_0001.png"));
    }

    #[test]
    fn test_decode_detects_format_from_content() {
        let dir = tempdir().unwrap();
        // PNG bytes behind a .jpg name
        let path = dir.path().join("misnamed.jpg");
        RgbImage::from_pixel(8, 4, Rgb([9, 8, 7]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let decoded = decode_canvas(&path, File::open(&path).unwrap()).unwrap();
        assert_eq!(decoded.format, Some(ImageFormat::Png));
        assert_eq!(decoded.format_name(), "png");
        assert_eq!(decoded.canvas.dimensions(), (8, 4));
        assert_eq!(decoded.canvas.get_pixel(3, 2), &Rgba([9, 8, 7, 255]));
    }

    #[test]
    fn test_decode_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\n truncated").unwrap();

        let err = decode_canvas(&path, File::open(&path).unwrap())
            .err()
            .unwrap();
        assert!(matches!(err, Error::Decode { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_write_png_truncates_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        std::fs::write(&path, vec![0u8; 64 * 1024]).unwrap();

        let canvas = RgbaImage::from_pixel(5, 5, Rgba([1, 2, 3, 255]));
        write_png(&canvas, &path).unwrap();

        let reloaded = ImageReader::open(&path)
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .decode()
            .unwrap()
            .to_rgba8();
        assert_eq!(reloaded, canvas);
    }

    #[test]
    fn test_write_png_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        let canvas = RgbaImage::new(1, 1);

        let err = write_png(&canvas, &path).err().unwrap();
        assert!(matches!(err, Error::Create { .. }));
    }
}
