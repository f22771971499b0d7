//! Analysis result types — the only values that cross the pipeline boundary.
//!
//! Serialized with a `status` tag so a presentation layer can render each
//! case distinctly:
//!
//! ```json
//! {"status": "success", "raw_text": "...", "confidence": 0.92, ...}
//! {"status": "no_text_found"}
//! {"status": "error", "message": "..."}
//! ```

use crate::classify::{MemePurpose, SentimentLabel, SubjectivityLabel};
use crate::error::AnalysisError;
use crate::sentiment::SentimentScore;
use serde::Serialize;

/// Everything known about a successfully analysed meme.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Aggregated caption text; the corrected text when correction ran.
    pub raw_text: String,
    /// Unweighted mean OCR confidence in [0, 1].
    pub confidence: f64,
    pub sentiment: SentimentScore,
    /// Per-detection text, in engine order.
    pub text_lines: Vec<String>,
    pub sentiment_label: SentimentLabel,
    pub subjectivity_label: SubjectivityLabel,
    pub purpose: MemePurpose,
    pub corrected: bool,
    pub processing_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Success(AnalysisReport),
    NoTextFound,
    #[serde(rename = "error")]
    Failure { message: String },
}

impl AnalysisOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisOutcome::Success(_))
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            AnalysisOutcome::Success(report) => Some(report),
            _ => None,
        }
    }

    /// OCR confidence, or the 0.0 sentinel when there is no report.
    pub fn confidence(&self) -> f64 {
        self.report().map_or(0.0, |r| r.confidence)
    }

    pub fn sentiment(&self) -> Option<SentimentScore> {
        self.report().map(|r| r.sentiment)
    }

    pub fn status(&self) -> &'static str {
        match self {
            AnalysisOutcome::Success(_) => "success",
            AnalysisOutcome::NoTextFound => "no_text_found",
            AnalysisOutcome::Failure { .. } => "error",
        }
    }
}

impl From<Result<Option<AnalysisReport>, AnalysisError>> for AnalysisOutcome {
    fn from(result: Result<Option<AnalysisReport>, AnalysisError>) -> Self {
        match result {
            Ok(Some(report)) => AnalysisOutcome::Success(report),
            Ok(None) => AnalysisOutcome::NoTextFound,
            Err(e) => {
                let message = e.to_string();
                AnalysisOutcome::Failure {
                    message: if message.trim().is_empty() {
                        "analysis failed".to_string()
                    } else {
                        message
                    },
                }
            }
        }
    }
}
