//! Analyzer configuration.
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. JSON file: `MEME_INSIGHT_CONFIG`, else `~/.config/meme-insight/config.json` if present
//! 3. environment variables (`MEME_OCR_LANGUAGES`, `MEME_OCR_GPU`, `MEME_TESSERACT_PATH`,
//!    `MEME_OCR_PSM`, `MEME_LEXICON_PATH`, `MEME_DICTIONARY_PATH`)

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Highest Tesseract page segmentation mode.
const MAX_PSM: u8 = 13;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// OCR language codes, e.g. `["en"]`.
    pub languages: Vec<String>,
    /// Prefer GPU inference when the engine supports it.
    pub use_gpu: bool,
    /// Explicit tesseract binary; PATH lookup when unset.
    pub tesseract_path: Option<PathBuf>,
    pub page_segmentation: u8,
    /// Custom sentiment lexicon; the built-in one when unset.
    pub lexicon_path: Option<PathBuf>,
    /// Custom word-frequency list for correction; the built-in one when unset.
    pub dictionary_path: Option<PathBuf>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            use_gpu: true,
            tesseract_path: None,
            page_segmentation: 3,
            lexicon_path: None,
            dictionary_path: None,
        }
    }
}

impl AnalyzerConfig {
    /// Defaults, then config file, then process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match config_file_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;
        log::info!("[CONFIG] Loaded {}", path.display());
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = get("MEME_OCR_LANGUAGES") {
            self.languages = raw
                .split(',')
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect();
        }
        if let Some(raw) = get("MEME_OCR_GPU") {
            self.use_gpu = parse_bool("MEME_OCR_GPU", &raw)?;
        }
        if let Some(raw) = get("MEME_TESSERACT_PATH") {
            self.tesseract_path = Some(PathBuf::from(raw.trim()));
        }
        if let Some(raw) = get("MEME_OCR_PSM") {
            self.page_segmentation = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "MEME_OCR_PSM".to_string(),
                message: format!("{:?} is not a number", raw),
            })?;
        }
        if let Some(raw) = get("MEME_LEXICON_PATH") {
            self.lexicon_path = Some(PathBuf::from(raw.trim()));
        }
        if let Some(raw) = get("MEME_DICTIONARY_PATH") {
            self.dictionary_path = Some(PathBuf::from(raw.trim()));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.languages.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "languages".to_string(),
                message: "at least one OCR language is required".to_string(),
            });
        }
        if self.page_segmentation > MAX_PSM {
            return Err(ConfigError::InvalidValue {
                key: "page_segmentation".to_string(),
                message: format!("{} is outside 0..={}", self.page_segmentation, MAX_PSM),
            });
        }
        Ok(())
    }
}

/// Explicit `MEME_INSIGHT_CONFIG`, else the per-user file when it exists.
fn config_file_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("MEME_INSIGHT_CONFIG") {
        if !explicit.trim().is_empty() {
            return Some(PathBuf::from(explicit));
        }
    }
    let default = dirs::config_dir()?.join("meme-insight").join("config.json");
    default.exists().then_some(default)
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{:?} is not a boolean", other),
        }),
    }
}
