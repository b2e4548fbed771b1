//! Field type definitions
//!
//! Defines how different data types are indexed and queried.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{QuarryError, Result};
use crate::models::FieldValue;
use crate::tokenizer::AnalyzerMode;

/// Field data type
///
/// Determines how a field is tokenized, validated and queried.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Full-text field, analyzed before indexing
    Text {
        #[serde(default)]
        analyzer: AnalyzerMode,
    },

    /// Exact-match field; the whole value is indexed as one token
    Keyword,

    /// Integral number
    Integer,

    /// Floating point number
    Float,

    Boolean,

    /// RFC 3339 / `YYYY-MM-DD` string or epoch milliseconds
    Date,

    /// Latitude/longitude pair
    GeoPoint,
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::text()
    }
}

impl FieldType {
    /// Create a text field with the standard analyzer
    pub fn text() -> Self {
        FieldType::Text {
            analyzer: AnalyzerMode::Standard,
        }
    }

    /// Create a text field with a specific analyzer
    pub fn text_with_analyzer(analyzer: AnalyzerMode) -> Self {
        FieldType::Text { analyzer }
    }

    /// Check if this field type supports full-text queries
    pub fn supports_fulltext(&self) -> bool {
        matches!(self, FieldType::Text { .. })
    }

    /// Check if the facet engine tracks this field by default
    pub fn supports_facets(&self) -> bool {
        !matches!(self, FieldType::Text { .. } | FieldType::GeoPoint)
    }

    /// Analyzer used for both indexing and query analysis; `None` for
    /// fields that are not tokenized
    pub fn analyzer(&self) -> Option<AnalyzerMode> {
        match self {
            FieldType::Text { analyzer } => Some(*analyzer),
            FieldType::GeoPoint => None,
            _ => Some(AnalyzerMode::Keyword),
        }
    }

    /// Keyword-style fields index a lower-cased whole value
    pub fn is_case_insensitive(&self) -> bool {
        !matches!(self, FieldType::Text { .. } | FieldType::GeoPoint)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Text { .. } => "text",
            FieldType::Keyword => "keyword",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::GeoPoint => "geo_point",
        }
    }

    /// Infer the type of an unmapped field from its first value
    pub fn infer(value: &FieldValue, default_analyzer: AnalyzerMode, date_detection: bool) -> Self {
        match value {
            FieldValue::Number(_) => FieldType::Float,
            FieldValue::Boolean(_) => FieldType::Boolean,
            FieldValue::Geo(_) => FieldType::GeoPoint,
            FieldValue::Text(s) if date_detection && parse_date_millis(s).is_some() => {
                FieldType::Date
            }
            FieldValue::Text(_) => FieldType::Text {
                analyzer: default_analyzer,
            },
        }
    }

    /// Validate a value against this field type
    pub fn validate(&self, field: &str, value: &FieldValue) -> Result<()> {
        let fail = |reason: String| -> Result<()> {
            Err(QuarryError::invalid_value(field, self.type_name(), reason))
        };
        match (self, value) {
            (FieldType::Text { .. } | FieldType::Keyword, FieldValue::Geo(_)) => {
                fail("expected a string, got a geo point".to_string())
            }
            (FieldType::Text { .. } | FieldType::Keyword, _) => Ok(()),
            (FieldType::Integer, FieldValue::Number(n)) if n.is_finite() && n.fract() == 0.0 => {
                Ok(())
            }
            (FieldType::Integer, FieldValue::Number(n)) => {
                fail(format!("expected an integer, got {n}"))
            }
            (FieldType::Float, FieldValue::Number(n)) if n.is_finite() => Ok(()),
            (FieldType::Boolean, FieldValue::Boolean(_)) => Ok(()),
            (FieldType::Date, FieldValue::Number(n)) if n.is_finite() => Ok(()),
            (FieldType::Date, FieldValue::Text(s)) if parse_date_millis(s).is_some() => Ok(()),
            (FieldType::Date, FieldValue::Text(s)) => fail(format!("unparseable date `{s}`")),
            (FieldType::GeoPoint, FieldValue::Geo(point)) if point.is_valid() => Ok(()),
            (FieldType::GeoPoint, FieldValue::Geo(point)) => fail(format!(
                "coordinates out of range: lat {}, lon {}",
                point.lat, point.lon
            )),
            (_, other) => fail(format!("got a {} value", other.kind())),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Text { analyzer } if *analyzer != AnalyzerMode::Standard => {
                write!(f, "text({analyzer})")
            }
            other => f.write_str(other.type_name()),
        }
    }
}

/// Parse a date string into epoch milliseconds
pub fn parse_date_millis(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc().timestamp_millis());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis());
    }
    None
}

/// Epoch milliseconds of a date field value
pub fn date_value_millis(value: &FieldValue) -> Option<i64> {
    match value {
        FieldValue::Number(n) if n.is_finite() => Some(*n as i64),
        FieldValue::Text(s) => parse_date_millis(s),
        _ => None,
    }
}
