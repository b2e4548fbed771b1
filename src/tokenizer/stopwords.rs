use std::collections::HashSet;
use stop_words::{get, LANGUAGE};

use crate::error::{QuarryError, Result};

/// Supplies the stopword set an analyzer drops tokens against
pub trait StopwordSource: Send + Sync {
    fn get_all(&self) -> HashSet<String>;
}

const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is",
    "it", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
    "these", "they", "this", "to", "was", "will", "with",
];

/// Compact English stopword list used when nothing else is configured
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinStopwords;

impl StopwordSource for BuiltinStopwords {
    fn get_all(&self) -> HashSet<String> {
        ENGLISH_STOPWORDS.iter().map(|s| s.to_string()).collect()
    }
}

/// Full per-language list from the `stop-words` crate
#[derive(Clone, Debug)]
pub struct LanguageStopwords {
    language: String,
}

impl LanguageStopwords {
    pub fn new(language: &str) -> Result<Self> {
        let language = language.to_ascii_lowercase();
        Self::language(&language)?;
        Ok(Self { language })
    }

    fn language(name: &str) -> Result<LANGUAGE> {
        match name {
            "english" | "en" => Ok(LANGUAGE::English),
            "french" | "fr" => Ok(LANGUAGE::French),
            "german" | "de" => Ok(LANGUAGE::German),
            "spanish" | "es" => Ok(LANGUAGE::Spanish),
            "italian" | "it" => Ok(LANGUAGE::Italian),
            "portuguese" | "pt" => Ok(LANGUAGE::Portuguese),
            other => Err(QuarryError::InvalidConfig(format!(
                "no stopword list for language `{other}`"
            ))),
        }
    }
}

impl StopwordSource for LanguageStopwords {
    fn get_all(&self) -> HashSet<String> {
        match Self::language(&self.language) {
            Ok(language) => get(language)
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect(),
            Err(_) => HashSet::new(),
        }
    }
}

/// Explicit, caller-provided stopword set
#[derive(Clone, Debug, Default)]
pub struct StaticStopwords {
    words: HashSet<String>,
}

impl StaticStopwords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl StopwordSource for StaticStopwords {
    fn get_all(&self) -> HashSet<String> {
        self.words.clone()
    }
}
