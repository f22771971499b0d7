//! Frequency-weighted spelling corrector.
//!
//! A word already in the dictionary is kept. Otherwise the most frequent
//! dictionary word one edit away wins, then two edits away; with no
//! candidate the word is left as written. Edits are deletes, adjacent
//! transposes, replaces and inserts over a–z. Tokens holding digits or
//! non-ASCII letters ("h8ers", "café") are kept as written.

use super::TextCorrector;
use crate::error::EngineError;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

const ENGINE: &str = "spelling";

const BUILTIN_WORDS: &str = include_str!("../../assets/words.txt");

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

// Whole tokens including digits and accents; `correct_word` skips those.
static WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:['\u{2019}][\p{L}\p{N}]+)?").expect("word pattern is valid")
});

#[derive(Debug, Clone)]
pub struct SpellingCorrector {
    counts: HashMap<String, u64>,
}

impl SpellingCorrector {
    /// The word list compiled into the binary.
    pub fn builtin() -> Result<Self, EngineError> {
        Self::parse(BUILTIN_WORDS, Path::new("<builtin dictionary>"))
    }

    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        let source = std::fs::read_to_string(path).map_err(|e| EngineError::Asset {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&source, path)
    }

    /// Parse `word count` rows; a bare word counts once. `#` starts a comment.
    pub fn parse(source: &str, origin: &Path) -> Result<Self, EngineError> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for (index, raw) in source.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let word = match parts.next() {
                Some(w) => w.to_lowercase(),
                None => continue,
            };
            let count = match parts.next() {
                Some(c) => c.parse::<u64>().map_err(|_| EngineError::Asset {
                    path: PathBuf::from(origin),
                    reason: format!("line {}: count {:?} is not a number", index + 1, c),
                })?,
                None => 1,
            };
            *counts.entry(word).or_insert(0) += count;
        }

        if counts.is_empty() {
            return Err(EngineError::Asset {
                path: PathBuf::from(origin),
                reason: "dictionary has no words".to_string(),
            });
        }
        log::debug!("[SPELL] Loaded {} dictionary words from {}", counts.len(), origin.display());
        Ok(Self { counts })
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn is_known(&self, word: &str) -> bool {
        self.counts.contains_key(&word.to_lowercase())
    }

    /// Correct a single word, keeping its casing style.
    pub fn correct_word(&self, word: &str) -> String {
        if word.chars().count() < 2 || !word.chars().all(|c| c.is_ascii_alphabetic()) {
            return word.to_string();
        }
        let lower = word.to_ascii_lowercase();
        if self.counts.contains_key(&lower) {
            return word.to_string();
        }

        let first = edits1(&lower);
        let best = self.most_frequent(first.iter()).or_else(|| {
            let second: HashSet<String> = first.iter().flat_map(|w| edits1(w)).collect();
            self.most_frequent(second.iter())
        });

        match best {
            Some(candidate) => restore_case(word, &candidate),
            None => word.to_string(),
        }
    }

    fn most_frequent<'a>(&self, candidates: impl Iterator<Item = &'a String>) -> Option<String> {
        candidates
            .filter_map(|c| self.counts.get(c).map(|n| (c, *n)))
            // higher count first; alphabetical on ties
            .max_by(|(a, na), (b, nb)| na.cmp(nb).then_with(|| b.cmp(a)))
            .map(|(c, _)| c.clone())
    }
}

impl TextCorrector for SpellingCorrector {
    fn name(&self) -> &str {
        ENGINE
    }

    fn warm_up(&self) -> Result<(), EngineError> {
        Lazy::force(&WORD_RE);
        Ok(())
    }

    fn correct(&self, text: &str) -> Result<String, EngineError> {
        let corrected = WORD_RE.replace_all(text, |caps: &Captures| self.correct_word(&caps[0]));
        Ok(corrected.into_owned())
    }
}

fn edits1(word: &str) -> HashSet<String> {
    let bytes = word.as_bytes();
    let n = bytes.len();
    let mut out = HashSet::with_capacity(54 * n + 25);

    for i in 0..n {
        let mut deleted = Vec::with_capacity(n - 1);
        deleted.extend_from_slice(&bytes[..i]);
        deleted.extend_from_slice(&bytes[i + 1..]);
        out.insert(to_string(deleted));
    }
    for i in 0..n.saturating_sub(1) {
        let mut swapped = bytes.to_vec();
        swapped.swap(i, i + 1);
        out.insert(to_string(swapped));
    }
    for i in 0..n {
        for &c in ALPHABET {
            let mut replaced = bytes.to_vec();
            replaced[i] = c;
            out.insert(to_string(replaced));
        }
    }
    for i in 0..=n {
        for &c in ALPHABET {
            let mut inserted = Vec::with_capacity(n + 1);
            inserted.extend_from_slice(&bytes[..i]);
            inserted.push(c);
            inserted.extend_from_slice(&bytes[i..]);
            out.insert(to_string(inserted));
        }
    }
    out
}

// only ever called with ASCII input
fn to_string(bytes: Vec<u8>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}

fn restore_case(original: &str, candidate: &str) -> String {
    let mut letters = original.chars();
    let first_upper = letters.next().map_or(false, |c| c.is_ascii_uppercase());
    if first_upper && original.chars().all(|c| c.is_ascii_uppercase()) {
        return candidate.to_ascii_uppercase();
    }
    if first_upper {
        let mut chars = candidate.chars();
        return match chars.next() {
            Some(c) => c.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        };
    }
    candidate.to_string()
}
