//! Meme purpose classification from polarity and subjectivity.
//!
//! The purpose is decided by an ordered rule table; the first rule that
//! matches wins, so rule order is part of the behavior. The coarse
//! positive/neutral/negative label is derived separately from polarity
//! alone and must not be confused with the purpose.

use crate::sentiment::SentimentScore;
use serde::{Deserialize, Serialize};

/// What the meme is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemePurpose {
    MakeYouSmile,
    VentComplain,
    InformPositively,
    WarnCritique,
    MakeYouThink,
    StateFacts,
    Entertain,
}

impl MemePurpose {
    pub fn label(&self) -> &'static str {
        match self {
            Self::MakeYouSmile => "make you smile",
            Self::VentComplain => "vent / complain",
            Self::InformPositively => "inform positively",
            Self::WarnCritique => "warn / critique",
            Self::MakeYouThink => "make you think",
            Self::StateFacts => "state facts",
            Self::Entertain => "entertain",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::MakeYouSmile => "Wholesome/Funny",
            Self::VentComplain => "Relatable Frustration",
            Self::InformPositively => "Motivational",
            Self::WarnCritique => "Serious Message",
            Self::MakeYouThink => "Thought-provoking",
            Self::StateFacts => "Informational",
            Self::Entertain => "General Humor",
        }
    }
}

impl std::fmt::Display for MemePurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the purpose table.
pub struct PurposeRule {
    pub purpose: MemePurpose,
    pub matches: fn(&SentimentScore) -> bool,
}

fn smile(s: &SentimentScore) -> bool {
    s.polarity > 0.3 && s.subjectivity > 0.5
}

fn vent(s: &SentimentScore) -> bool {
    s.polarity < -0.3 && s.subjectivity > 0.5
}

fn inform(s: &SentimentScore) -> bool {
    s.polarity > 0.0 && s.subjectivity < 0.3
}

fn warn(s: &SentimentScore) -> bool {
    s.polarity < 0.0 && s.subjectivity < 0.3
}

fn think(s: &SentimentScore) -> bool {
    s.polarity.abs() < 0.1 && s.subjectivity > 0.5
}

fn facts(s: &SentimentScore) -> bool {
    s.polarity.abs() < 0.1 && s.subjectivity < 0.3
}

/// Evaluated top to bottom. Everything unmatched is `Entertain`.
pub static PURPOSE_RULES: [PurposeRule; 6] = [
    PurposeRule { purpose: MemePurpose::MakeYouSmile, matches: smile },
    PurposeRule { purpose: MemePurpose::VentComplain, matches: vent },
    PurposeRule { purpose: MemePurpose::InformPositively, matches: inform },
    PurposeRule { purpose: MemePurpose::WarnCritique, matches: warn },
    PurposeRule { purpose: MemePurpose::MakeYouThink, matches: think },
    PurposeRule { purpose: MemePurpose::StateFacts, matches: facts },
];

pub fn classify_purpose(score: &SentimentScore) -> MemePurpose {
    PURPOSE_RULES
        .iter()
        .find(|rule| (rule.matches)(score))
        .map(|rule| rule.purpose)
        .unwrap_or(MemePurpose::Entertain)
}

/// Coarse polarity label for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.1 {
            SentimentLabel::Positive
        } else if polarity < -0.1 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// Opinion vs fact, split at subjectivity 0.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectivityLabel {
    Opinionated,
    Factual,
}

impl SubjectivityLabel {
    pub fn from_subjectivity(subjectivity: f64) -> Self {
        if subjectivity > 0.5 {
            SubjectivityLabel::Opinionated
        } else {
            SubjectivityLabel::Factual
        }
    }
}
