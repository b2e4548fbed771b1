use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use super::patterns::{dedup_preserving_order, email_tokens, phone_tokens, url_tokens};
use super::stemming::{SnowballStemmer, Stemmer};
use super::stopwords::{BuiltinStopwords, LanguageStopwords, StopwordSource};
use super::AnalyzerMode;
use crate::config::{AnalysisConfig, CustomAnalyzerConfig};
use crate::error::{QuarryError, Result};

lazy_static! {
    static ref POSSESSIVE: Regex = Regex::new(r"['’]s\b").expect("valid regex");
    static ref APOSTROPHE: Regex = Regex::new(r"['’]").expect("valid regex");
    static ref PUNCT_EXCEPT_HYPHEN_DOT: Regex = Regex::new(r"[^\w\s.\-]").expect("valid regex");
    static ref HYPHEN_DOT_RUNS: Regex = Regex::new(r"[.\-]+").expect("valid regex");
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").expect("valid regex");
    static ref PATTERN_WORD: Regex = Regex::new(r"[\w'-]+").expect("valid regex");
    static ref HYPHENATED_WORD: Regex = Regex::new(r"[\w-]+").expect("valid regex");
    static ref HYPHENATED_WORD_WITH_APOSTROPHE: Regex =
        Regex::new(r"[\w'’-]+").expect("valid regex");
}

/// Text analyzer with one pipeline per [`AnalyzerMode`]
///
/// Analysis is a pure function of the input text and the configured
/// stopword set, stemmer and custom settings.
#[derive(Clone)]
pub struct Analyzer {
    stopwords: HashSet<String>,
    stemmer: Arc<dyn Stemmer>,
    stem_language: String,
    custom: CustomAnalyzerConfig,
    custom_pattern: Option<Regex>,
}

impl Analyzer {
    /// Create a new analyzer from configuration
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let stopwords = match &config.stopword_language {
            Some(language) => LanguageStopwords::new(language)?.get_all(),
            None => BuiltinStopwords.get_all(),
        };
        let custom_pattern = config
            .custom
            .pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| QuarryError::InvalidConfig(format!("custom analyzer pattern: {e}")))?;

        Ok(Self {
            stopwords,
            stemmer: Arc::new(SnowballStemmer),
            stem_language: config.stem_language.clone(),
            custom: config.custom.clone(),
            custom_pattern,
        })
    }

    /// Replace the stopword set
    pub fn with_stopwords(mut self, source: &dyn StopwordSource) -> Self {
        self.stopwords = source
            .get_all()
            .into_iter()
            .map(|w| w.to_lowercase())
            .collect();
        self
    }

    /// Replace the stemmer used by the `stemming` mode
    pub fn with_stemmer(mut self, stemmer: Arc<dyn Stemmer>) -> Self {
        self.stemmer = stemmer;
        self
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(&token.to_lowercase())
    }

    /// Tokenize text into an ordered sequence of terms
    pub fn tokenize(&self, text: &str, mode: AnalyzerMode) -> Vec<String> {
        match mode {
            AnalyzerMode::Standard => self.standard(text),
            AnalyzerMode::Simple => self.simple(text),
            AnalyzerMode::Whitespace => self.whitespace(text),
            AnalyzerMode::Keyword => keyword(text),
            AnalyzerMode::Pattern => self.pattern(text),
            AnalyzerMode::Email => self.drop_stopwords(email_tokens(text)),
            AnalyzerMode::Url => self.drop_stopwords(url_tokens(text)),
            AnalyzerMode::Phone => phone_tokens(text),
            AnalyzerMode::Advanced => self.advanced(text),
            AnalyzerMode::Stemming => self.stemming(text),
            AnalyzerMode::Custom => self.custom(text),
        }
    }

    /// Whether every token `mode` emits is lower-case
    ///
    /// `whitespace` and `keyword` keep the original case, as does `custom`
    /// with lower-casing turned off.
    pub fn folds_case(&self, mode: AnalyzerMode) -> bool {
        match mode {
            AnalyzerMode::Whitespace | AnalyzerMode::Keyword => false,
            AnalyzerMode::Custom => self.custom.lowercase,
            _ => true,
        }
    }

    fn standard(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let text = POSSESSIVE.replace_all(&lowered, "");
        let text = APOSTROPHE.replace_all(&text, " ");
        let text = PUNCT_EXCEPT_HYPHEN_DOT.replace_all(&text, " ");
        let text = HYPHEN_DOT_RUNS.replace_all(&text, " ");
        text.split_whitespace()
            .filter(|token| token.chars().count() > 1 && !self.stopwords.contains(*token))
            .map(str::to_string)
            .collect()
    }

    fn simple(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        NON_WORD
            .replace_all(&lowered, " ")
            .split_whitespace()
            .filter(|token| !self.stopwords.contains(*token))
            .map(str::to_string)
            .collect()
    }

    fn whitespace(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .filter(|token| !self.is_stopword(token))
            .map(str::to_string)
            .collect()
    }

    fn pattern(&self, text: &str) -> Vec<String> {
        PATTERN_WORD
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .filter(|token| token.chars().count() > 1 && !self.stopwords.contains(token))
            .collect()
    }

    fn advanced(&self, text: &str) -> Vec<String> {
        let mut tokens = self.standard(text);
        tokens.extend(self.drop_stopwords(email_tokens(text)));
        tokens.extend(self.drop_stopwords(url_tokens(text)));
        tokens.extend(phone_tokens(text));
        dedup_preserving_order(tokens)
    }

    fn stemming(&self, text: &str) -> Vec<String> {
        self.standard(text)
            .into_iter()
            .map(|token| match self.stemmer.stem(&token, &self.stem_language) {
                Ok(stem) if !stem.is_empty() => stem,
                Ok(_) => token,
                Err(err) => {
                    debug!(token = %token, error = %err, "stemming failed, keeping token");
                    token
                }
            })
            .collect()
    }

    fn custom(&self, text: &str) -> Vec<String> {
        let config = &self.custom;
        let raw: Vec<String> = if let Some(pattern) = &self.custom_pattern {
            pattern
                .find_iter(text)
                .map(|m| m.as_str().to_string())
                .collect()
        } else if config.preserve_hyphens {
            let class: &Regex = if config.preserve_apostrophes {
                &*HYPHENATED_WORD_WITH_APOSTROPHE
            } else {
                &*HYPHENATED_WORD
            };
            class
                .find_iter(text)
                .map(|m| m.as_str().to_string())
                .collect()
        } else {
            text.unicode_words()
                .flat_map(|word| {
                    if config.preserve_apostrophes {
                        vec![word.to_string()]
                    } else {
                        APOSTROPHE
                            .split(word)
                            .filter(|part| !part.is_empty())
                            .map(str::to_string)
                            .collect()
                    }
                })
                .collect()
        };

        raw.into_iter()
            .map(|token| {
                if config.lowercase {
                    token.to_lowercase()
                } else {
                    token
                }
            })
            .filter(|token| {
                let len = token.chars().count();
                len >= config.min_token_length
                    && len <= config.max_token_length
                    && !(config.remove_stopwords && self.is_stopword(token))
            })
            .collect()
    }

    fn drop_stopwords(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .filter(|token| !self.stopwords.contains(token))
            .collect()
    }
}

fn keyword(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Vec::new()
    } else {
        vec![trimmed.to_string()]
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            stopwords: BuiltinStopwords.get_all(),
            stemmer: Arc::new(SnowballStemmer),
            stem_language: "english".to_string(),
            custom: CustomAnalyzerConfig::default(),
            custom_pattern: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::StaticStopwords;

    fn analyzer() -> Analyzer {
        Analyzer::default()
    }

    fn custom(config: CustomAnalyzerConfig) -> Analyzer {
        let analysis = AnalysisConfig {
            custom: config,
            ..AnalysisConfig::default()
        };
        Analyzer::new(&analysis).unwrap()
    }

    #[test]
    fn test_standard_mode() {
        let tokens = analyzer().tokenize("The cat's toy isn't e-mail-ready... A B", AnalyzerMode::Standard);
        assert_eq!(tokens, vec!["cat", "toy", "isn", "mail", "ready"]);
    }

    #[test]
    fn test_standard_splits_contractions() {
        let tokens = analyzer().tokenize("Don't stop", AnalyzerMode::Standard);
        assert_eq!(tokens, vec!["don", "stop"]);
    }

    #[test]
    fn test_simple_keeps_single_chars() {
        let tokens = analyzer().tokenize("Hello, World! x-ray the", AnalyzerMode::Simple);
        assert_eq!(tokens, vec!["hello", "world", "x", "ray"]);
    }

    #[test]
    fn test_whitespace_preserves_case() {
        let tokens = analyzer().tokenize("Hello THE World,", AnalyzerMode::Whitespace);
        assert_eq!(tokens, vec!["Hello", "World,"]);
    }

    #[test]
    fn test_keyword_mode() {
        assert_eq!(
            analyzer().tokenize("  New York City ", AnalyzerMode::Keyword),
            vec!["New York City"]
        );
        assert!(analyzer().tokenize("   ", AnalyzerMode::Keyword).is_empty());
    }

    #[test]
    fn test_pattern_mode() {
        let tokens = analyzer().tokenize("Rock'n'roll is a well-known x style", AnalyzerMode::Pattern);
        assert_eq!(tokens, vec!["rock'n'roll", "well-known", "style"]);
    }

    #[test]
    fn test_email_mode_drops_stopwords() {
        let tokens = analyzer().tokenize("mail to@the.org", AnalyzerMode::Email);
        assert_eq!(tokens, vec!["to@the.org", "the.org", "org"]);
    }

    #[test]
    fn test_advanced_mode_unions_outputs() {
        let tokens = analyzer().tokenize(
            "Email support@acme.io or call 555-123-4567",
            AnalyzerMode::Advanced,
        );
        assert!(tokens.contains(&"email".to_string()));
        assert!(tokens.contains(&"support@acme.io".to_string()));
        assert!(tokens.contains(&"acme".to_string()));
        assert!(tokens.contains(&"5551234567".to_string()));
        let unique: HashSet<&String> = tokens.iter().collect();
        assert_eq!(unique.len(), tokens.len());
    }

    #[test]
    fn test_stemming_mode() {
        let tokens = analyzer().tokenize("Running runners searched", AnalyzerMode::Stemming);
        assert_eq!(tokens, vec!["run", "runner", "search"]);
    }

    #[test]
    fn test_stemming_failure_falls_back() {
        struct Broken;
        impl Stemmer for Broken {
            fn stem(&self, _word: &str, _language: &str) -> Result<String> {
                Err(QuarryError::Stemmer("offline".to_string()))
            }
        }
        let analyzer = analyzer().with_stemmer(Arc::new(Broken));
        assert_eq!(
            analyzer.tokenize("running dogs", AnalyzerMode::Stemming),
            vec!["running", "dogs"]
        );
    }

    #[test]
    fn test_custom_length_and_case() {
        let analyzer = custom(CustomAnalyzerConfig {
            lowercase: false,
            remove_stopwords: false,
            min_token_length: 3,
            max_token_length: 5,
            ..CustomAnalyzerConfig::default()
        });
        let tokens = analyzer.tokenize("a ab Abc abcd abcde abcdef", AnalyzerMode::Custom);
        assert_eq!(tokens, vec!["Abc", "abcd", "abcde"]);
    }

    #[test]
    fn test_custom_preserves_hyphens_and_apostrophes() {
        let analyzer = custom(CustomAnalyzerConfig {
            preserve_hyphens: true,
            preserve_apostrophes: true,
            ..CustomAnalyzerConfig::default()
        });
        let tokens = analyzer.tokenize("state-of-the-art isn't easy", AnalyzerMode::Custom);
        assert_eq!(tokens, vec!["state-of-the-art", "isn't", "easy"]);

        let hyphens_only = custom(CustomAnalyzerConfig {
            preserve_hyphens: true,
            ..CustomAnalyzerConfig::default()
        });
        for _ in 0..2 {
            assert_eq!(
                hyphens_only.tokenize("state-of-the-art isn't easy", AnalyzerMode::Custom),
                vec!["state-of-the-art", "isn", "easy"]
            );
        }

        let plain = custom(CustomAnalyzerConfig::default());
        assert_eq!(
            plain.tokenize("state-of-the-art isn't easy", AnalyzerMode::Custom),
            vec!["state", "art", "isn", "easy"]
        );
    }

    #[test]
    fn test_custom_pattern() {
        let analyzer = custom(CustomAnalyzerConfig {
            pattern: Some(r"[A-Z]{2,}-\d+".to_string()),
            lowercase: false,
            ..CustomAnalyzerConfig::default()
        });
        let tokens = analyzer.tokenize("fixes JIRA-42 and OPS-7", AnalyzerMode::Custom);
        assert_eq!(tokens, vec!["JIRA-42", "OPS-7"]);
    }

    #[test]
    fn test_injected_stopwords() {
        let analyzer = analyzer().with_stopwords(&StaticStopwords::new(["rust"]));
        assert_eq!(
            analyzer.tokenize("the rust book", AnalyzerMode::Standard),
            vec!["the", "book"]
        );
    }

    #[test]
    fn test_folds_case() {
        let analyzer = analyzer();
        assert!(analyzer.folds_case(AnalyzerMode::Standard));
        assert!(analyzer.folds_case(AnalyzerMode::Stemming));
        assert!(!analyzer.folds_case(AnalyzerMode::Whitespace));
        assert!(!analyzer.folds_case(AnalyzerMode::Keyword));
        assert!(analyzer.folds_case(AnalyzerMode::Custom));

        let cased = custom(CustomAnalyzerConfig {
            lowercase: false,
            ..CustomAnalyzerConfig::default()
        });
        assert!(!cased.folds_case(AnalyzerMode::Custom));
    }
}
