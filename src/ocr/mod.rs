//! OCR domain — text extraction with per-detection confidence.
//!
//! The recognizer itself is a black box behind `OcrEngine`. This module
//! owns the request contract (languages + GPU preference, full detail) and
//! the "no text detected" classification. External code should only use
//! the public items here.

pub mod aggregate;
pub mod tesseract;

pub use aggregate::{aggregate, AggregatedText};
pub use tesseract::TesseractEngine;

use crate::error::EngineError;
use crate::normalize::ImageBuffer;
use serde::{Deserialize, Serialize};

/// Axis-aligned region of a detection, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingRegion {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingRegion {
    /// Smallest region covering both.
    pub fn union(&self, other: &BoundingRegion) -> BoundingRegion {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        // malformed engine output can carry huge boxes
        let right = self
            .left
            .saturating_add(self.width)
            .max(other.left.saturating_add(other.width));
        let bottom = self
            .top
            .saturating_add(self.height)
            .max(other.top.saturating_add(other.height));
        BoundingRegion {
            left,
            top,
            width: right - left,
            height: bottom - top,
        }
    }
}

/// One recognized text region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDetection {
    pub region: BoundingRegion,
    pub text: String,
    /// Recognition confidence in [0, 1].
    pub confidence: f64,
}

/// What the caller asks the engine for, besides the pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrRequest {
    pub languages: Vec<String>,
    pub prefer_gpu: bool,
}

impl Default for OcrRequest {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            prefer_gpu: true,
        }
    }
}

/// External OCR engine.
///
/// Implementations are built once per process and shared read-only across
/// requests, so `recognize` takes `&self`. Detections must be returned in
/// the engine's reading order with full detail (region, text, confidence).
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Optional throwaway run to pay model cold-start costs up front.
    fn warm_up(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn recognize(
        &self,
        image: &ImageBuffer,
        request: &OcrRequest,
    ) -> Result<Vec<TextDetection>, EngineError>;
}

/// Ordered detections from one image plus the derived confidence summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionResult {
    pub detections: Vec<TextDetection>,
}

impl ExtractionResult {
    pub fn new(detections: Vec<TextDetection>) -> Self {
        Self { detections }
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    /// Unweighted mean of per-detection confidence; 0.0 when empty.
    ///
    /// The empty value is a sentinel, not a measured confidence.
    pub fn average_confidence(&self) -> f64 {
        aggregate::average_confidence(&self.detections)
    }
}

/// Outcome of the extraction stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Found(ExtractionResult),
    NoTextFound,
}

/// Run the OCR engine on a normalized image.
///
/// Zero detections is not an error: it is reported as
/// `Extraction::NoTextFound` so the caller can skip sentiment scoring.
/// Detections are kept in engine order; confidences outside [0, 1] are
/// clamped and a NaN confidence is an engine failure.
pub fn extract_text(
    engine: &dyn OcrEngine,
    image: &ImageBuffer,
    request: &OcrRequest,
) -> Result<Extraction, EngineError> {
    let start = std::time::Instant::now();
    let mut detections = engine.recognize(image, request)?;
    let ocr_ms = start.elapsed().as_millis();

    if detections.is_empty() {
        log::warn!("[OCR] No text detected by {} ({}ms)", engine.name(), ocr_ms);
        return Ok(Extraction::NoTextFound);
    }

    for detection in &mut detections {
        if detection.confidence.is_nan() {
            return Err(EngineError::invocation(
                engine.name(),
                format!("confidence is NaN for detection {:?}", detection.text),
            ));
        }
        if !(0.0..=1.0).contains(&detection.confidence) {
            log::debug!(
                "[OCR] Clamping confidence {} for {:?}",
                detection.confidence,
                detection.text
            );
            detection.confidence = detection.confidence.clamp(0.0, 1.0);
        }
    }

    let result = ExtractionResult::new(detections);
    log::info!(
        "[OCR] {} detected {} lines in {}ms, avg confidence {:.2}",
        engine.name(),
        result.len(),
        ocr_ms,
        result.average_confidence()
    );
    Ok(Extraction::Found(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize_image, ImageInput};
    use image::{DynamicImage, RgbImage};

    struct FixedEngine(Vec<TextDetection>);

    impl OcrEngine for FixedEngine {
        fn name(&self) -> &str {
            "fixed"
        }

        fn recognize(
            &self,
            _image: &ImageBuffer,
            _request: &OcrRequest,
        ) -> Result<Vec<TextDetection>, EngineError> {
            Ok(self.0.clone())
        }
    }

    fn blank() -> ImageBuffer {
        normalize_image(ImageInput::Decoded(DynamicImage::ImageRgb8(RgbImage::new(8, 8))))
            .unwrap()
    }

    fn detection(text: &str, confidence: f64) -> TextDetection {
        TextDetection {
            region: BoundingRegion { left: 0, top: 0, width: 10, height: 10 },
            text: text.to_string(),
            confidence,
        }
    }

    #[test]
    fn zero_detections_is_no_text_found() {
        let extraction = extract_text(&FixedEngine(vec![]), &blank(), &OcrRequest::default())
            .unwrap();
        assert_eq!(extraction, Extraction::NoTextFound);
    }

    #[test]
    fn detections_keep_engine_order() {
        let engine = FixedEngine(vec![detection("TOP TEXT", 0.9), detection("BOTTOM TEXT", 0.8)]);
        let Extraction::Found(result) =
            extract_text(&engine, &blank(), &OcrRequest::default()).unwrap()
        else {
            panic!("expected detections");
        };
        let texts: Vec<&str> = result.detections.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, ["TOP TEXT", "BOTTOM TEXT"]);
    }

    #[test]
    fn out_of_range_confidence_is_clamped() {
        let engine = FixedEngine(vec![detection("a", 1.7), detection("b", -0.2)]);
        let Extraction::Found(result) =
            extract_text(&engine, &blank(), &OcrRequest::default()).unwrap()
        else {
            panic!("expected detections");
        };
        assert_eq!(result.detections[0].confidence, 1.0);
        assert_eq!(result.detections[1].confidence, 0.0);
    }

    #[test]
    fn nan_confidence_is_engine_failure() {
        let engine = FixedEngine(vec![detection("a", f64::NAN)]);
        let err = extract_text(&engine, &blank(), &OcrRequest::default()).unwrap_err();
        assert!(matches!(err, EngineError::Invocation { .. }));
    }

    #[test]
    fn empty_result_confidence_is_sentinel_zero() {
        assert_eq!(ExtractionResult::default().average_confidence(), 0.0);
    }

    #[test]
    fn region_union_covers_both() {
        let a = BoundingRegion { left: 10, top: 5, width: 20, height: 10 };
        let b = BoundingRegion { left: 40, top: 2, width: 5, height: 20 };
        assert_eq!(
            a.union(&b),
            BoundingRegion { left: 10, top: 2, width: 35, height: 20 }
        );
    }

    #[test]
    fn region_union_saturates_on_huge_boxes() {
        let a = BoundingRegion { left: 10, top: 10, width: u32::MAX, height: u32::MAX };
        let b = BoundingRegion { left: 0, top: 0, width: 5, height: 5 };
        assert_eq!(
            a.union(&b),
            BoundingRegion { left: 0, top: 0, width: u32::MAX, height: u32::MAX }
        );
    }
}
