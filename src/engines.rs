//! Process-wide analyzer state.
//!
//! The OCR and sentiment engines are expensive to build, so the host owns
//! one `AnalyzerState` and every request borrows the same `MemeAnalyzer`
//! from it. Construction runs at most once at a time; if it fails the
//! error is returned and the next call tries again.

use crate::config::AnalyzerConfig;
use crate::error::EngineError;
use crate::pipeline::MemeAnalyzer;
use once_cell::sync::OnceCell;
use std::sync::Arc;

pub struct AnalyzerState {
    config: AnalyzerConfig,
    analyzer: OnceCell<Arc<MemeAnalyzer>>,
}

impl AnalyzerState {
    /// Lazy state: engines are built from `config` on first `get`.
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            analyzer: OnceCell::new(),
        }
    }

    /// State around an already-built analyzer (custom engines, tests).
    pub fn with_analyzer(analyzer: MemeAnalyzer) -> Self {
        Self {
            config: AnalyzerConfig::default(),
            analyzer: OnceCell::with_value(Arc::new(analyzer)),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.analyzer.get().is_some()
    }

    /// The shared analyzer, building it on first use.
    pub fn get(&self) -> Result<Arc<MemeAnalyzer>, EngineError> {
        self.analyzer
            .get_or_try_init(|| {
                // This should only happen once per process.
                log::info!("[ENGINES] Loading analyzer engines...");
                MemeAnalyzer::from_config(&self.config)
                    .map(Arc::new)
                    .map_err(|e| {
                        log::error!("[ENGINES] Failed to load engines: {}", e);
                        e
                    })
            })
            .cloned()
    }

    /// Build the engines now and pay their cold starts up front.
    pub fn warm_up(&self) -> Result<(), EngineError> {
        let start = std::time::Instant::now();
        let analyzer = self.get()?;
        analyzer.warm_up()?;
        log::info!("[ENGINES] Warm-up complete in {}ms", start.elapsed().as_millis());
        Ok(())
    }
}
