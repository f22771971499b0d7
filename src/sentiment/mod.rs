//! Sentiment domain — polarity/subjectivity scoring with optional correction.
//!
//! The scoring math lives in the engine (`SentimentEngine`); the optional
//! lexical correction lives in a `TextCorrector`. `SentimentScorer` owns
//! only the correction gate and the mapping from engine output to
//! `SentimentScore`.

pub mod lexicon;
pub mod spelling;

pub use lexicon::LexiconAnalyzer;
pub use spelling::SpellingCorrector;

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Raw engine output, before range checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentReading {
    pub polarity: f64,
    pub subjectivity: f64,
}

/// Polarity in [-1, 1], subjectivity in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentScore {
    pub polarity: f64,
    pub subjectivity: f64,
}

impl SentimentScore {
    pub fn new(polarity: f64, subjectivity: f64) -> Self {
        Self {
            polarity,
            subjectivity,
        }
    }

    fn from_reading(engine: &str, reading: SentimentReading) -> Result<Self, EngineError> {
        if reading.polarity.is_nan() || reading.subjectivity.is_nan() {
            return Err(EngineError::invocation(
                engine,
                format!("non-numeric sentiment {:?}", reading),
            ));
        }
        Ok(Self {
            polarity: reading.polarity.clamp(-1.0, 1.0),
            subjectivity: reading.subjectivity.clamp(0.0, 1.0),
        })
    }
}

/// External lexicon-based sentiment engine.
pub trait SentimentEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Pay one-time costs before the first request.
    fn warm_up(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn analyze(&self, text: &str) -> Result<SentimentReading, EngineError>;
}

/// External lexical correction transform (text in, corrected text out).
pub trait TextCorrector: Send + Sync {
    fn name(&self) -> &str;

    fn warm_up(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn correct(&self, text: &str) -> Result<String, EngineError>;
}

/// Scored text. `text` is the corrected text when correction ran.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredText {
    pub text: String,
    pub score: SentimentScore,
    pub corrected: bool,
}

/// Correction gate in front of a sentiment engine.
#[derive(Clone)]
pub struct SentimentScorer {
    engine: Arc<dyn SentimentEngine>,
    corrector: Option<Arc<dyn TextCorrector>>,
}

impl SentimentScorer {
    pub fn new(engine: Arc<dyn SentimentEngine>) -> Self {
        Self {
            engine,
            corrector: None,
        }
    }

    pub fn with_corrector(mut self, corrector: Arc<dyn TextCorrector>) -> Self {
        self.corrector = Some(corrector);
        self
    }

    pub fn has_corrector(&self) -> bool {
        self.corrector.is_some()
    }

    /// Warm the sentiment engine and, when present, the corrector.
    pub fn warm_up(&self) -> Result<(), EngineError> {
        self.engine.warm_up()?;
        if let Some(corrector) = &self.corrector {
            corrector.warm_up()?;
        }
        Ok(())
    }

    /// Score `text`, correcting it first when `apply_correction` is set.
    ///
    /// Correction is slow (dictionary search per token) and never runs
    /// unless asked for. Asking for it without a configured corrector is an
    /// `EngineError::Unavailable`.
    pub fn score(&self, text: &str, apply_correction: bool) -> Result<ScoredText, EngineError> {
        let text = if apply_correction {
            let corrector = self.corrector.as_ref().ok_or_else(|| {
                EngineError::unavailable("corrector", "no text corrector configured")
            })?;
            let start = std::time::Instant::now();
            log::info!("[SPELL] Running {} correction (this may take time)...", corrector.name());
            let corrected = corrector.correct(text)?;
            log::info!("[SPELL] Correction finished in {}ms", start.elapsed().as_millis());
            if corrected != text {
                log::debug!("[SPELL] {:?} -> {:?}", text, corrected);
            }
            corrected
        } else {
            text.to_string()
        };

        let reading = self.engine.analyze(&text)?;
        let score = SentimentScore::from_reading(self.engine.name(), reading)?;
        log::info!(
            "[SENTIMENT] Polarity: {:.2}, Subjectivity: {:.2}",
            score.polarity,
            score.subjectivity
        );

        Ok(ScoredText {
            text,
            score,
            corrected: apply_correction,
        })
    }
}
