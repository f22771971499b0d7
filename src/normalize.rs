//! Image normalization — any supported image input to a 3-channel RGB grid.
//!
//! This is the only place images are decoded. Everything downstream works
//! on `ImageBuffer`, which is always 8-bit RGB regardless of the source
//! color model (grayscale, palette and alpha inputs are widened/flattened
//! by the `image` crate's standard conversion).

use crate::error::AnalysisError;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::path::PathBuf;

/// Image handed to the pipeline by the caller.
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// Encoded image bytes (PNG, JPEG, ...).
    Bytes(Vec<u8>),
    /// Path to an encoded image on disk.
    Path(PathBuf),
    /// Base64 text, optionally a `data:image/...;base64,` URL.
    Base64(String),
    /// Already decoded image.
    Decoded(DynamicImage),
}

impl From<Vec<u8>> for ImageInput {
    fn from(bytes: Vec<u8>) -> Self {
        ImageInput::Bytes(bytes)
    }
}

impl From<PathBuf> for ImageInput {
    fn from(path: PathBuf) -> Self {
        ImageInput::Path(path)
    }
}

impl From<DynamicImage> for ImageInput {
    fn from(image: DynamicImage) -> Self {
        ImageInput::Decoded(image)
    }
}

/// Immutable 8-bit RGB pixel grid, height × width × 3.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pixels: RgbImage,
}

impl ImageBuffer {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Array shape in (height, width, channels) order.
    pub fn shape(&self) -> [usize; 3] {
        [self.height() as usize, self.width() as usize, 3]
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }

    /// Encode to PNG in memory, for engines that read encoded images.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut png_bytes = Vec::new();
        self.pixels
            .write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)?;
        Ok(png_bytes)
    }
}

/// Validate and convert an image input into an `ImageBuffer`.
pub fn normalize_image(input: ImageInput) -> Result<ImageBuffer, AnalysisError> {
    let start = std::time::Instant::now();
    let decoded = decode(input)?;

    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "image has no pixels ({}x{})",
            decoded.width(),
            decoded.height()
        )));
    }

    let source_color = decoded.color();
    let pixels = match decoded {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    };

    log::info!(
        "[IMAGE] Normalized {}x{} {:?} -> RGB8 in {}ms",
        pixels.width(),
        pixels.height(),
        source_color,
        start.elapsed().as_millis()
    );
    Ok(ImageBuffer { pixels })
}

fn decode(input: ImageInput) -> Result<DynamicImage, AnalysisError> {
    match input {
        ImageInput::Decoded(image) => Ok(image),
        ImageInput::Bytes(bytes) => decode_bytes(&bytes),
        ImageInput::Path(path) => {
            let bytes = std::fs::read(&path).map_err(|e| {
                AnalysisError::InvalidInput(format!("cannot read {}: {}", path.display(), e))
            })?;
            decode_bytes(&bytes)
        }
        ImageInput::Base64(text) => {
            let payload = strip_data_url(&text);
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(payload.trim())
                .map_err(|e| AnalysisError::InvalidInput(format!("invalid base64 image: {}", e)))?;
            decode_bytes(&bytes)
        }
    }
}

fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage, AnalysisError> {
    if bytes.is_empty() {
        return Err(AnalysisError::InvalidInput("image data is empty".to_string()));
    }
    image::load_from_memory(bytes)
        .map_err(|e| AnalysisError::InvalidInput(format!("cannot decode image: {}", e)))
}

/// `data:image/png;base64,AAAA` → `AAAA`. Plain base64 is returned as-is.
fn strip_data_url(text: &str) -> &str {
    let trimmed = text.trim_start();
    if trimmed.starts_with("data:") {
        if let Some((_, payload)) = trimmed.split_once(',') {
            return payload;
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    fn png_bytes(image: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn grayscale_is_widened_to_rgb() {
        let gray = GrayImage::from_pixel(4, 2, Luma([200]));
        let buffer = normalize_image(ImageInput::Bytes(png_bytes(DynamicImage::ImageLuma8(gray))))
            .unwrap();
        assert_eq!(buffer.shape(), [2, 4, 3]);
        assert_eq!(buffer.as_rgb().get_pixel(3, 1).0, [200, 200, 200]);
    }

    #[test]
    fn alpha_channel_is_dropped() {
        let rgba = RgbaImage::from_pixel(3, 3, Rgba([10, 20, 30, 40]));
        let buffer = normalize_image(ImageInput::Decoded(DynamicImage::ImageRgba8(rgba))).unwrap();
        assert_eq!(buffer.as_rgb().get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn undecodable_bytes_are_invalid_input() {
        let err = normalize_image(ImageInput::Bytes(b"definitely not an image".to_vec()))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn empty_bytes_are_invalid_input() {
        let err = normalize_image(ImageInput::Bytes(Vec::new())).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn missing_path_is_invalid_input() {
        let err = normalize_image(ImageInput::Path(PathBuf::from(
            "/nonexistent/meme-insight/none.png",
        )))
        .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn zero_sized_image_is_invalid_input() {
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        let err = normalize_image(ImageInput::Decoded(empty)).unwrap_err();
        assert!(err.to_string().contains("no pixels"));
    }

    #[test]
    fn data_url_base64_is_decoded() {
        let bytes = png_bytes(DynamicImage::ImageRgb8(RgbImage::new(5, 7)));
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        let url = format!("data:image/png;base64,{}", encoded);
        let buffer = normalize_image(ImageInput::Base64(url)).unwrap();
        assert_eq!((buffer.width(), buffer.height()), (5, 7));
    }

    #[test]
    fn bad_base64_is_invalid_input() {
        let err = normalize_image(ImageInput::Base64("!!!not-base64!!!".into())).unwrap_err();
        assert!(err.to_string().contains("base64"));
    }

    #[test]
    fn png_encoding_round_trips_dimensions() {
        let buffer = normalize_image(ImageInput::Decoded(DynamicImage::ImageRgb8(
            RgbImage::new(6, 4),
        )))
        .unwrap();
        let encoded = buffer.to_png_bytes().unwrap();
        let decoded = image::load_from_memory(&encoded).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (6, 4));
    }
}
