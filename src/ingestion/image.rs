// ABOUTME: Decodes uploaded images into RGBA pixel buffers with known dimensions
// ABOUTME: Also re-encodes normalized pixels as PNG for engines that read files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::IngestionError;
use crate::errors::{AppError, AppResult};

/// Normalized image: RGBA8 pixels, row-major, no padding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl RawImage {
    /// Bytes per pixel after normalization
    pub const CHANNELS: usize = 4;

    /// Decode any supported image format and force an alpha channel
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a supported image or have no pixels
    pub fn decode(bytes: &[u8]) -> Result<Self, IngestionError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(IngestionError::EmptyImage);
        }
        Ok(Self {
            data: rgba.into_raw(),
            width,
            height,
        })
    }

    /// Pixel width
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Pixel height
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Encode the normalized pixels as PNG
    ///
    /// # Errors
    ///
    /// Returns an internal error if encoding fails
    pub fn to_png(&self) -> AppResult<Vec<u8>> {
        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(&self.data, self.width, self.height, ExtendedColorType::Rgba8)
            .map_err(|e| AppError::internal(format!("Failed to encode page as PNG: {e}")))?;
        Ok(png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn rgb_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([10, 20, 30]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_forces_alpha() {
        let raw = RawImage::decode(&rgb_png(5, 2)).unwrap();
        assert_eq!((raw.width(), raw.height()), (5, 2));
        assert_eq!(raw.data().len(), 5 * 2 * RawImage::CHANNELS);
        assert_eq!(&raw.data()[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_png_reencode_preserves_dimensions() {
        let raw = RawImage::decode(&rgb_png(9, 4)).unwrap();
        let again = RawImage::decode(&raw.to_png().unwrap()).unwrap();
        assert_eq!(again, raw);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            RawImage::decode(b"definitely not an image"),
            Err(IngestionError::Decode(_))
        ));
    }
}
