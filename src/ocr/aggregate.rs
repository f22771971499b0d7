//! Text aggregation — region texts to one corpus.
//!
//! Meme captions are usually split into a top and a bottom block, so the
//! regions are joined in engine order with a single space and no other
//! cleanup.

use super::{ExtractionResult, TextDetection};

/// Joined text, confidence summary and the individual lines.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedText {
    pub text: String,
    pub confidence: f64,
    pub lines: Vec<String>,
}

pub fn aggregate(result: &ExtractionResult) -> AggregatedText {
    let lines: Vec<String> = result
        .detections
        .iter()
        .map(|d| d.text.clone())
        .collect();
    AggregatedText {
        text: lines.join(" "),
        confidence: result.average_confidence(),
        lines,
    }
}

/// Detection texts joined by single spaces, in the given order.
pub fn join_text(detections: &[TextDetection]) -> String {
    detections
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Unweighted mean confidence. Region size and text length are ignored.
pub fn average_confidence(detections: &[TextDetection]) -> f64 {
    if detections.is_empty() {
        return 0.0;
    }
    let total: f64 = detections.iter().map(|d| d.confidence).sum();
    total / detections.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::BoundingRegion;

    fn detection(text: &str, confidence: f64) -> TextDetection {
        TextDetection {
            region: BoundingRegion { left: 0, top: 0, width: 1, height: 1 },
            text: text.to_string(),
            confidence,
        }
    }

    #[test]
    fn joins_in_order_with_single_spaces() {
        let result = ExtractionResult::new(vec![detection("I love", 0.95), detection("this!", 0.90)]);
        let aggregated = aggregate(&result);
        assert_eq!(aggregated.text, "I love this!");
        assert_eq!(aggregated.lines, vec!["I love", "this!"]);
        assert!((aggregated.confidence - 0.925).abs() < 1e-9);
    }

    #[test]
    fn short_low_confidence_line_counts_equally() {
        let detections = vec![
            detection("one very long caption line with many words", 1.0),
            detection("x", 0.0),
        ];
        assert_eq!(average_confidence(&detections), 0.5);
    }

    #[test]
    fn joining_a_single_joined_detection_is_unchanged() {
        let first = join_text(&[detection("WHEN THE", 0.8), detection("CODE WORKS", 0.7)]);
        let again = join_text(&[detection(&first, 0.75)]);
        assert_eq!(again, first);
    }

    #[test]
    fn inner_whitespace_is_not_cleaned() {
        let joined = join_text(&[detection("  padded ", 0.5), detection("TEXT", 0.5)]);
        assert_eq!(joined, "  padded  TEXT");
    }

    #[test]
    fn average_stays_within_unit_interval() {
        let detections = vec![detection("a", 0.0), detection("b", 1.0), detection("c", 0.33)];
        let avg = average_confidence(&detections);
        assert!((0.0..=1.0).contains(&avg));
    }

    #[test]
    fn empty_aggregate_uses_sentinel() {
        let aggregated = aggregate(&ExtractionResult::default());
        assert_eq!(aggregated.text, "");
        assert_eq!(aggregated.confidence, 0.0);
        assert!(aggregated.lines.is_empty());
    }
}
