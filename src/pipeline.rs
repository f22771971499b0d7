//! Core image-to-insight pipeline.
//!
//! normalize → OCR → aggregate → (correct) → score → classify.
//!
//! Each stage returns a typed `Result`; `analyze` is the single place where
//! failures are flattened into `AnalysisOutcome::Failure`. Zero detections
//! short-circuits to `NoTextFound` before the sentiment engine is touched.
//! No retries: an engine failure ends the request.

use crate::classify::{classify_purpose, SentimentLabel, SubjectivityLabel};
use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, EngineError};
use crate::normalize::{normalize_image, ImageInput};
use crate::ocr::{self, Extraction, OcrEngine, OcrRequest, TesseractEngine};
use crate::outcome::{AnalysisOutcome, AnalysisReport};
use crate::sentiment::{
    LexiconAnalyzer, SentimentEngine, SentimentScorer, SpellingCorrector, TextCorrector,
};
use std::sync::Arc;

/// The analysis service: one OCR engine, one scorer, shared across requests.
#[derive(Clone)]
pub struct MemeAnalyzer {
    ocr: Arc<dyn OcrEngine>,
    request: OcrRequest,
    scorer: SentimentScorer,
}

impl MemeAnalyzer {
    pub fn new(
        ocr: Arc<dyn OcrEngine>,
        sentiment: Arc<dyn SentimentEngine>,
        corrector: Option<Arc<dyn TextCorrector>>,
        request: OcrRequest,
    ) -> Self {
        let mut scorer = SentimentScorer::new(sentiment);
        if let Some(corrector) = corrector {
            scorer = scorer.with_corrector(corrector);
        }
        Self {
            ocr,
            request,
            scorer,
        }
    }

    /// Build the production engines described by `config`.
    ///
    /// This is the expensive part (binary probe, lexicon and dictionary
    /// loading); callers should do it once, see `AnalyzerState`.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, EngineError> {
        let start = std::time::Instant::now();

        let ocr = TesseractEngine::new(
            config.tesseract_path.as_deref(),
            &config.languages,
            config.page_segmentation,
        )?;

        let lexicon = match &config.lexicon_path {
            Some(path) => LexiconAnalyzer::from_path(path)?,
            None => LexiconAnalyzer::builtin()?,
        };
        let dictionary = match &config.dictionary_path {
            Some(path) => SpellingCorrector::from_path(path)?,
            None => SpellingCorrector::builtin()?,
        };
        log::info!(
            "[ENGINES] {} lexicon entries, {} dictionary words",
            lexicon.len(),
            dictionary.len()
        );

        let analyzer = Self::new(
            Arc::new(ocr),
            Arc::new(lexicon),
            Some(Arc::new(dictionary)),
            OcrRequest {
                languages: config.languages.clone(),
                prefer_gpu: config.use_gpu,
            },
        );
        log::info!(
            "[ENGINES] Analyzer built in {}ms (GPU requested: {})",
            start.elapsed().as_millis(),
            config.use_gpu
        );
        Ok(analyzer)
    }

    /// Run every engine's warm-up hook: OCR, sentiment, corrector.
    pub fn warm_up(&self) -> Result<(), EngineError> {
        self.ocr.warm_up()?;
        self.scorer.warm_up()
    }

    /// Run the full pipeline. Never fails: every error becomes `Failure`.
    pub fn analyze(&self, input: ImageInput, apply_correction: bool) -> AnalysisOutcome {
        let outcome: AnalysisOutcome = self.try_analyze(input, apply_correction).into();
        if let AnalysisOutcome::Failure { message } = &outcome {
            log::error!("[PIPELINE] Analysis failed: {}", message);
        }
        outcome
    }

    /// Run the full pipeline with typed errors.
    ///
    /// `Ok(None)` means the image holds no detectable text.
    pub fn try_analyze(
        &self,
        input: ImageInput,
        apply_correction: bool,
    ) -> Result<Option<AnalysisReport>, AnalysisError> {
        let pipeline_start = std::time::Instant::now();
        log::info!("[PIPELINE] Starting image analysis...");

        // Stage 1: normalize
        let image = normalize_image(input)?;
        let normalize_ms = pipeline_start.elapsed().as_millis();

        // Stage 2: OCR
        let ocr_start = std::time::Instant::now();
        let extraction = match ocr::extract_text(self.ocr.as_ref(), &image, &self.request)? {
            Extraction::Found(result) => result,
            Extraction::NoTextFound => {
                log::info!(
                    "[PIPELINE] No text; sentiment skipped ({}ms)",
                    pipeline_start.elapsed().as_millis()
                );
                return Ok(None);
            }
        };
        let ocr_ms = ocr_start.elapsed().as_millis();

        // Stage 3: aggregate
        let aggregated = ocr::aggregate(&extraction);

        // Stage 4: (correct +) score
        let score_start = std::time::Instant::now();
        let scored = self.scorer.score(&aggregated.text, apply_correction)?;
        let score_ms = score_start.elapsed().as_millis();

        // Stage 5: classify
        let purpose = classify_purpose(&scored.score);
        log::info!(
            "[CLASSIFY] Purpose: {} ({})",
            purpose.label(),
            purpose.description()
        );

        let total_ms = pipeline_start.elapsed().as_millis();
        log::info!(
            "[PIPELINE] Total: {}ms (normalize={} + ocr={} + score={})",
            total_ms,
            normalize_ms,
            ocr_ms,
            score_ms
        );

        Ok(Some(AnalysisReport {
            raw_text: scored.text,
            confidence: aggregated.confidence,
            sentiment: scored.score,
            text_lines: aggregated.lines,
            sentiment_label: SentimentLabel::from_polarity(scored.score.polarity),
            subjectivity_label: SubjectivityLabel::from_subjectivity(scored.score.subjectivity),
            purpose,
            corrected: scored.corrected,
            processing_ms: total_ms as u64,
        }))
    }
}
