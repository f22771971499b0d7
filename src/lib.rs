//! Meme Insight — read a meme's captions, score their sentiment, infer its purpose.
//!
//! This file only declares the domains and hosts the command-line entry
//! point. Domains:
//!   - normalize.rs  — image decoding into an RGB pixel grid
//!   - ocr/          — OCR engine contract, Tesseract engine, text aggregation
//!   - sentiment/    — scoring gate, lexicon scorer, spelling corrector
//!   - classify.rs   — purpose rule table and coarse labels
//!   - pipeline.rs   — stage orchestration (`MemeAnalyzer`)
//!   - engines.rs    — once-only engine construction (`AnalyzerState`)

pub mod classify;
pub mod config;
pub mod engines;
pub mod error;
pub mod normalize;
pub mod ocr;
pub mod outcome;
pub mod pipeline;
pub mod sentiment;

pub use engines::AnalyzerState;
pub use normalize::ImageInput;
pub use outcome::{AnalysisOutcome, AnalysisReport};
pub use pipeline::MemeAnalyzer;

use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "Usage: meme-insight <image> [--correct] [--pretty]";

/// Command-line arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub image: PathBuf,
    pub apply_correction: bool,
    pub pretty: bool,
}

impl CliArgs {
    pub fn parse<I>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut image = None;
        let mut apply_correction = false;
        let mut pretty = false;
        for arg in args {
            match arg.as_str() {
                "--correct" => apply_correction = true,
                "--pretty" => pretty = true,
                flag if flag.starts_with("--") => return Err(format!("Unknown flag: {}", flag)),
                path if image.is_none() => image = Some(PathBuf::from(path)),
                extra => return Err(format!("Unexpected argument: {}", extra)),
            }
        }
        Ok(Self {
            image: image.ok_or_else(|| "Missing image path".to_string())?,
            apply_correction,
            pretty,
        })
    }
}

/// Entry point — called by `main`.
pub fn run() -> ExitCode {
    'env_load: for env_file in [".env.local", ".env"] {
        let path = PathBuf::from(env_file);
        if path.exists() {
            match dotenvy::from_path(&path) {
                Ok(_) => eprintln!("[STARTUP] Loaded {}", path.display()),
                Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
            }
            break 'env_load;
        }
    }

    env_logger::init();

    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    let config = match config::AnalyzerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(2);
        }
    };

    let state = AnalyzerState::new(config);
    let outcome = match state.get() {
        Ok(analyzer) => analyzer.analyze(ImageInput::Path(args.image), args.apply_correction),
        Err(e) => AnalysisOutcome::Failure {
            message: format!("Fatal error loading models: {}", e),
        },
    };

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&outcome)
    } else {
        serde_json::to_string(&outcome)
    };
    match rendered {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize outcome: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match outcome {
        AnalysisOutcome::Failure { .. } => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<CliArgs, String> {
        CliArgs::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_image_and_flags() {
        let parsed = args(&["meme.png", "--correct"]).unwrap();
        assert_eq!(parsed.image, PathBuf::from("meme.png"));
        assert!(parsed.apply_correction);
        assert!(!parsed.pretty);
    }

    #[test]
    fn correction_is_off_by_default() {
        assert!(!args(&["meme.png"]).unwrap().apply_correction);
    }

    #[test]
    fn missing_image_is_an_error() {
        assert!(args(&["--pretty"]).is_err());
    }

    #[test]
    fn unknown_flag_is_an_error() {
        assert!(args(&["meme.png", "--batch"]).unwrap_err().contains("--batch"));
    }

    #[test]
    fn second_image_is_rejected() {
        assert!(args(&["a.png", "b.png"]).is_err());
    }
}
