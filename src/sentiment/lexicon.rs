//! Lexicon-based polarity/subjectivity scorer.
//!
//! Each opinion word in the text contributes its lexicon polarity and
//! subjectivity; the text score is the mean of the contributions.
//! Modifiers ("very", "so", ...) scale the next opinion word, negations
//! flip it with factor -0.5, and an exclamation mark strengthens the
//! polarity of the most recent opinion word, once ("I love this!" boosts
//! "love").

use super::{SentimentEngine, SentimentReading};
use crate::error::EngineError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const ENGINE: &str = "lexicon";

const BUILTIN_LEXICON: &str = include_str!("../../assets/lexicon.tsv");

const NEGATION_FACTOR: f64 = -0.5;
const EXCLAMATION_FACTOR: f64 = 1.25;

const NEGATIONS: &[&str] = &[
    "not", "never", "no", "nothing", "nobody", "neither", "nor", "cannot", "without",
];

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z]+(?:'[a-z]+)?|[!?.]").expect("token pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexiconEntry {
    pub polarity: f64,
    pub subjectivity: f64,
    pub intensity: f64,
}

impl LexiconEntry {
    /// Pure intensifier/diminisher: scales the next word, scores nothing itself.
    fn is_modifier(&self) -> bool {
        self.polarity == 0.0 && self.subjectivity == 0.0 && self.intensity != 1.0
    }
}

struct Assessment {
    polarity: f64,
    subjectivity: f64,
    exclaimed: bool,
}

#[derive(Debug, Clone)]
pub struct LexiconAnalyzer {
    entries: HashMap<String, LexiconEntry>,
}

impl LexiconAnalyzer {
    /// The lexicon compiled into the binary.
    pub fn builtin() -> Result<Self, EngineError> {
        Self::parse(BUILTIN_LEXICON, Path::new("<builtin lexicon>"))
    }

    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        let source = std::fs::read_to_string(path).map_err(|e| EngineError::Asset {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&source, path)
    }

    /// Parse `word<TAB>polarity<TAB>subjectivity[<TAB>intensity]` rows.
    pub fn parse(source: &str, origin: &Path) -> Result<Self, EngineError> {
        let asset_error = |line_no: usize, reason: String| EngineError::Asset {
            path: PathBuf::from(origin),
            reason: format!("line {}: {}", line_no, reason),
        };

        let mut entries = HashMap::new();
        for (index, raw) in source.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let columns: Vec<&str> = line.split('\t').map(str::trim).collect();
            if columns.len() != 3 && columns.len() != 4 {
                return Err(asset_error(
                    line_no,
                    format!("expected 3 or 4 columns, found {}", columns.len()),
                ));
            }
            let number = |column: &str, name: &str| -> Result<f64, EngineError> {
                column
                    .parse::<f64>()
                    .map_err(|_| asset_error(line_no, format!("{} {:?} is not a number", name, column)))
            };
            let entry = LexiconEntry {
                polarity: number(columns[1], "polarity")?,
                subjectivity: number(columns[2], "subjectivity")?,
                intensity: match columns.get(3) {
                    Some(&column) => number(column, "intensity")?,
                    None => 1.0,
                },
            };
            if !(-1.0..=1.0).contains(&entry.polarity) || !(0.0..=1.0).contains(&entry.subjectivity)
            {
                return Err(asset_error(line_no, "score out of range".to_string()));
            }
            entries.insert(columns[0].to_lowercase(), entry);
        }

        if entries.is_empty() {
            return Err(EngineError::Asset {
                path: PathBuf::from(origin),
                reason: "lexicon has no entries".to_string(),
            });
        }
        log::debug!("[SENTIMENT] Loaded {} lexicon entries from {}", entries.len(), origin.display());
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, word: &str) -> Option<&LexiconEntry> {
        self.entries.get(&word.to_lowercase())
    }

    fn assess(&self, text: &str) -> Vec<Assessment> {
        let lowered = text.to_lowercase().replace('\u{2019}', "'");
        let mut assessments: Vec<Assessment> = Vec::new();
        let mut intensity: Option<f64> = None;
        let mut negated = false;

        for token in TOKEN_RE.find_iter(&lowered).map(|m| m.as_str()) {
            match token {
                "!" => {
                    if let Some(last) = assessments.last_mut() {
                        if !last.exclaimed {
                            last.polarity *= EXCLAMATION_FACTOR;
                            last.exclaimed = true;
                        }
                    }
                    negated = false;
                    intensity = None;
                    continue;
                }
                "." | "?" => {
                    negated = false;
                    intensity = None;
                    continue;
                }
                _ => {}
            }

            if NEGATIONS.contains(&token) || token.ends_with("n't") {
                negated = true;
                continue;
            }

            match self.entries.get(token) {
                Some(entry) if entry.is_modifier() => {
                    intensity = Some(intensity.unwrap_or(1.0) * entry.intensity);
                }
                Some(entry) => {
                    let scale = intensity.take().unwrap_or(1.0);
                    let mut polarity = entry.polarity * scale;
                    if negated {
                        polarity *= NEGATION_FACTOR;
                        negated = false;
                    }
                    assessments.push(Assessment {
                        polarity: polarity.clamp(-1.0, 1.0),
                        subjectivity: (entry.subjectivity * scale).clamp(0.0, 1.0),
                        exclaimed: false,
                    });
                }
                None => {
                    intensity = None;
                }
            }
        }

        // the exclamation boost can push a word past the range
        for a in &mut assessments {
            a.polarity = a.polarity.clamp(-1.0, 1.0);
        }
        assessments
    }
}

impl SentimentEngine for LexiconAnalyzer {
    fn name(&self) -> &str {
        ENGINE
    }

    fn warm_up(&self) -> Result<(), EngineError> {
        Lazy::force(&TOKEN_RE);
        Ok(())
    }

    fn analyze(&self, text: &str) -> Result<SentimentReading, EngineError> {
        let assessments = self.assess(text);
        if assessments.is_empty() {
            return Ok(SentimentReading {
                polarity: 0.0,
                subjectivity: 0.0,
            });
        }
        let n = assessments.len() as f64;
        let polarity = assessments.iter().map(|a| a.polarity).sum::<f64>() / n;
        let subjectivity = assessments.iter().map(|a| a.subjectivity).sum::<f64>() / n;
        Ok(SentimentReading {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity: subjectivity.clamp(0.0, 1.0),
        })
    }
}
