//! Text analysis: analyzer modes and the pluggable collaborators they consume.

mod analyzer;
mod patterns;
mod stemming;
mod stopwords;
mod synonyms;

pub use analyzer::Analyzer;
pub use stemming::{SnowballStemmer, Stemmer};
pub use stopwords::{BuiltinStopwords, LanguageStopwords, StaticStopwords, StopwordSource};
pub use synonyms::{SynonymMap, SynonymSource};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QuarryError;

/// How text is split into tokens
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerMode {
    #[default]
    Standard,
    Simple,
    Whitespace,
    Keyword,
    Pattern,
    Email,
    Url,
    Phone,
    Advanced,
    Stemming,
    Custom,
}

impl AnalyzerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerMode::Standard => "standard",
            AnalyzerMode::Simple => "simple",
            AnalyzerMode::Whitespace => "whitespace",
            AnalyzerMode::Keyword => "keyword",
            AnalyzerMode::Pattern => "pattern",
            AnalyzerMode::Email => "email",
            AnalyzerMode::Url => "url",
            AnalyzerMode::Phone => "phone",
            AnalyzerMode::Advanced => "advanced",
            AnalyzerMode::Stemming => "stemming",
            AnalyzerMode::Custom => "custom",
        }
    }
}

impl fmt::Display for AnalyzerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalyzerMode {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(AnalyzerMode::Standard),
            "simple" => Ok(AnalyzerMode::Simple),
            "whitespace" => Ok(AnalyzerMode::Whitespace),
            "keyword" => Ok(AnalyzerMode::Keyword),
            "pattern" => Ok(AnalyzerMode::Pattern),
            "email" => Ok(AnalyzerMode::Email),
            "url" => Ok(AnalyzerMode::Url),
            "phone" => Ok(AnalyzerMode::Phone),
            "advanced" => Ok(AnalyzerMode::Advanced),
            "stemming" => Ok(AnalyzerMode::Stemming),
            "custom" => Ok(AnalyzerMode::Custom),
            other => Err(QuarryError::InvalidConfig(format!(
                "unknown analyzer mode `{other}`"
            ))),
        }
    }
}
