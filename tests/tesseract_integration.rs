//! Integration test against a real `tesseract` install.
//!
//! Skipped when the binary is not on PATH.

use meme_insight_lib::config::AnalyzerConfig;
use meme_insight_lib::{AnalysisOutcome, AnalyzerState, ImageInput};

fn tesseract_available() -> bool {
    let found = which::which("tesseract").is_ok();
    if !found {
        eprintln!("SKIP: tesseract not installed");
    }
    found
}

#[test]
fn blank_image_has_no_text() {
    if !tesseract_available() {
        return;
    }

    let state = AnalyzerState::new(AnalyzerConfig::default());
    let analyzer = match state.get() {
        Ok(analyzer) => analyzer,
        Err(e) => {
            // e.g. tesseract present but no English traineddata
            eprintln!("SKIP: engines unavailable: {}", e);
            return;
        }
    };

    let blank = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        200,
        100,
        image::Rgb([255, 255, 255]),
    ));
    let outcome = analyzer.analyze(ImageInput::Decoded(blank), false);
    assert_eq!(outcome, AnalysisOutcome::NoTextFound);
}

#[test]
fn second_get_reuses_the_same_engines() {
    if !tesseract_available() {
        return;
    }
    let state = AnalyzerState::new(AnalyzerConfig::default());
    let (Ok(first), Ok(second)) = (state.get(), state.get()) else {
        eprintln!("SKIP: engines unavailable");
        return;
    };
    assert!(std::sync::Arc::ptr_eq(&first, &second));
}
