use crate::error::TextureLoadError;
use image::{ImageBuffer, Rgb};
use log::info;
use std::path::Path;

/// Decoded texture pixels, rows bottom to top (flipped on load, GL convention).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }

    /// The `channels` bytes of one texel; `y` counts from the bottom row.
    pub fn texel(&self, x: u32, y: u32) -> &[u8] {
        let c = self.channels as usize;
        let idx = (y as usize * self.width as usize + x as usize) * c;
        &self.pixels[idx..idx + c]
    }
}

/// Loads a PNG/JPG and flips it vertically.
///
/// Images with alpha keep four channels; everything else is expanded or reduced to RGB.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ImageData, TextureLoadError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(TextureLoadError::EmptyPath);
    }

    let img = image::open(path)
        .map_err(|source| TextureLoadError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .flipv();

    let (width, height) = (img.width(), img.height());
    let data = if img.color().has_alpha() {
        ImageData {
            width,
            height,
            channels: 4,
            pixels: img.into_rgba8().into_raw(),
        }
    } else {
        ImageData {
            width,
            height,
            channels: 3,
            pixels: img.into_rgb8().into_raw(),
        }
    };

    info!(
        "Loaded texture: {:?} ({}x{}, {} channels)",
        path, width, height, data.channels
    );
    Ok(data)
}

/// Writes 8-bit RGB rows (top to bottom) to an image file.
pub fn save_rgb_image<P: AsRef<Path>>(
    rgb: Vec<u8>,
    width: usize,
    height: usize,
    path: P,
) -> Result<(), image::ImageError> {
    let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width as u32, height as u32, rgb).ok_or_else(|| {
            image::ImageError::Parameter(image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            ))
        })?;
    buffer.save(path.as_ref())
}
