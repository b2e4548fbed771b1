use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{QuarryError, Result};
use crate::tokenizer::AnalyzerMode;

/// Engine settings configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub bm25: Bm25Params,
    /// Per-field score multipliers, 1.0 when absent
    pub field_boosts: HashMap<String, f32>,
    /// Number of token shards backing the inverted index (1 = unsharded)
    pub token_shards: usize,
    /// Text fields tracked by the facet engine in addition to non-text fields
    pub facet_fields: Vec<String>,
    pub default_page_size: usize,
    /// Infer `date` for unseen string fields that parse as dates
    pub date_detection: bool,
    pub analysis: AnalysisConfig,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            bm25: Bm25Params::default(),
            field_boosts: HashMap::new(),
            token_shards: 1,
            facet_fields: Vec::new(),
            default_page_size: 10,
            date_detection: false,
            analysis: AnalysisConfig::default(),
        }
    }
}

impl EngineSettings {
    pub fn with_field_boost(mut self, field: impl Into<String>, boost: f32) -> Self {
        self.field_boosts.insert(field.into(), boost);
        self
    }

    pub fn with_token_shards(mut self, shards: usize) -> Self {
        self.token_shards = shards;
        self
    }

    pub fn with_facet_field(mut self, field: impl Into<String>) -> Self {
        self.facet_fields.push(field.into());
        self
    }

    pub fn with_bm25(mut self, k1: f32, b: f32) -> Self {
        self.bm25 = Bm25Params { k1, b };
        self
    }

    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }

    pub fn with_date_detection(mut self, enabled: bool) -> Self {
        self.date_detection = enabled;
        self
    }

    pub fn with_analysis(mut self, analysis: AnalysisConfig) -> Self {
        self.analysis = analysis;
        self
    }

    /// Boost for a field, defaulting to 1.0
    pub fn field_boost(&self, field: &str) -> f32 {
        self.field_boosts.get(field).copied().unwrap_or(1.0)
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.token_shards == 0 {
            return Err(QuarryError::InvalidConfig(
                "token_shards must be at least 1".to_string(),
            ));
        }
        if self.default_page_size == 0 {
            return Err(QuarryError::InvalidConfig(
                "default_page_size must be at least 1".to_string(),
            ));
        }
        if self.bm25.k1 < 0.0 {
            return Err(QuarryError::InvalidConfig(format!(
                "bm25.k1 must be non-negative, got {}",
                self.bm25.k1
            )));
        }
        if !(0.0..=1.0).contains(&self.bm25.b) {
            return Err(QuarryError::InvalidConfig(format!(
                "bm25.b must be within [0, 1], got {}",
                self.bm25.b
            )));
        }
        if let Some(pattern) = &self.analysis.custom.pattern {
            regex::Regex::new(pattern).map_err(|e| {
                QuarryError::InvalidConfig(format!("custom analyzer pattern: {e}"))
            })?;
        }
        Ok(())
    }
}

/// BM25 parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term frequency saturation parameter
    pub k1: f32,
    /// Length normalization parameter
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

/// Analyzer pipeline configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Mode used for `text` fields without an explicit analyzer
    pub default_mode: AnalyzerMode,
    /// Language handed to the stemmer in `stemming` mode
    pub stem_language: String,
    /// Use the `stop-words` list for this language instead of the built-in English set
    pub stopword_language: Option<String>,
    pub custom: CustomAnalyzerConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_mode: AnalyzerMode::Standard,
            stem_language: "english".to_string(),
            stopword_language: None,
            custom: CustomAnalyzerConfig::default(),
        }
    }
}

/// Settings for the `custom` analyzer mode
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomAnalyzerConfig {
    pub lowercase: bool,
    pub remove_stopwords: bool,
    pub min_token_length: usize,
    pub max_token_length: usize,
    pub preserve_hyphens: bool,
    pub preserve_apostrophes: bool,
    /// Extraction regex; when set, every match becomes a token
    pub pattern: Option<String>,
}

impl Default for CustomAnalyzerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_stopwords: true,
            min_token_length: 2,
            max_token_length: 50,
            preserve_hyphens: false,
            preserve_apostrophes: false,
            pattern: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let settings = EngineSettings::default();
        assert_eq!(settings.bm25.k1, 1.2);
        assert_eq!(settings.bm25.b, 0.75);
        assert_eq!(settings.token_shards, 1);
        assert_eq!(settings.default_page_size, 10);
        assert_eq!(settings.analysis.default_mode, AnalyzerMode::Standard);
        assert!(settings.validate().is_ok());

        let custom = CustomAnalyzerConfig::default();
        assert!(custom.lowercase);
        assert!(custom.remove_stopwords);
        assert_eq!(custom.min_token_length, 2);
    }

    #[test]
    fn test_settings_builder() {
        let settings = EngineSettings::default()
            .with_field_boost("title", 2.0)
            .with_token_shards(4)
            .with_facet_field("category")
            .with_bm25(1.5, 0.5);

        assert_eq!(settings.field_boost("title"), 2.0);
        assert_eq!(settings.field_boost("body"), 1.0);
        assert_eq!(settings.token_shards, 4);
        assert_eq!(settings.facet_fields, vec!["category".to_string()]);
        assert_eq!(settings.bm25, Bm25Params { k1: 1.5, b: 0.5 });
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        assert!(EngineSettings::default().with_token_shards(0).validate().is_err());
        assert!(EngineSettings::default().with_bm25(1.2, 1.5).validate().is_err());
        assert!(EngineSettings::default()
            .with_default_page_size(0)
            .validate()
            .is_err());

        let mut settings = EngineSettings::default();
        settings.analysis.custom.pattern = Some("[unclosed".to_string());
        assert!(matches!(
            settings.validate(),
            Err(QuarryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_partial_json_settings() {
        let settings: EngineSettings =
            serde_json::from_str(r#"{"token_shards": 3, "field_boosts": {"title": 3.0}}"#)
                .unwrap();
        assert_eq!(settings.token_shards, 3);
        assert_eq!(settings.field_boost("title"), 3.0);
        assert_eq!(settings.default_page_size, 10);
    }
}
