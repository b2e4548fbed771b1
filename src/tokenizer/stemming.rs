use rust_stemmers::Algorithm;

use crate::error::{QuarryError, Result};

/// Reduces a word to its stem for a language
pub trait Stemmer: Send + Sync {
    fn stem(&self, word: &str, language: &str) -> Result<String>;
}

/// Snowball stemmers from `rust-stemmers`
#[derive(Clone, Copy, Debug, Default)]
pub struct SnowballStemmer;

impl SnowballStemmer {
    fn algorithm(language: &str) -> Option<Algorithm> {
        let algorithm = match language.to_ascii_lowercase().as_str() {
            "arabic" | "ar" => Algorithm::Arabic,
            "danish" | "da" => Algorithm::Danish,
            "dutch" | "nl" => Algorithm::Dutch,
            "english" | "en" => Algorithm::English,
            "finnish" | "fi" => Algorithm::Finnish,
            "french" | "fr" => Algorithm::French,
            "german" | "de" => Algorithm::German,
            "greek" | "el" => Algorithm::Greek,
            "hungarian" | "hu" => Algorithm::Hungarian,
            "italian" | "it" => Algorithm::Italian,
            "norwegian" | "no" => Algorithm::Norwegian,
            "portuguese" | "pt" => Algorithm::Portuguese,
            "romanian" | "ro" => Algorithm::Romanian,
            "russian" | "ru" => Algorithm::Russian,
            "spanish" | "es" => Algorithm::Spanish,
            "swedish" | "sv" => Algorithm::Swedish,
            "tamil" | "ta" => Algorithm::Tamil,
            "turkish" | "tr" => Algorithm::Turkish,
            _ => return None,
        };
        Some(algorithm)
    }
}

impl Stemmer for SnowballStemmer {
    fn stem(&self, word: &str, language: &str) -> Result<String> {
        let algorithm = Self::algorithm(language)
            .ok_or_else(|| QuarryError::Stemmer(format!("unsupported language `{language}`")))?;
        Ok(rust_stemmers::Stemmer::create(algorithm)
            .stem(word)
            .into_owned())
    }
}
