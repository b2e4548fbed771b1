//! Core types for the query system

use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

use crate::models::document::format_number;
use crate::schema::parse_date_millis;

/// Operator for combining terms in a match query
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOperator {
    /// All terms must match (AND)
    #[default]
    And,
    /// At least one term must match (OR)
    Or,
}

impl MatchOperator {
    /// Parse `"and"` / `"or"`, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" => Some(MatchOperator::And),
            "or" => Some(MatchOperator::Or),
            _ => None,
        }
    }
}

/// Value type for range queries
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeValue {
    Number(f64),
    Text(String),
}

impl RangeValue {
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(RangeValue::Number),
            Value::String(s) => Some(RangeValue::Text(s.clone())),
            _ => None,
        }
    }

    /// Convert to f64 if possible
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RangeValue::Number(v) => Some(*v),
            RangeValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Epoch milliseconds, for date fields
    pub fn as_millis(&self) -> Option<i64> {
        match self {
            RangeValue::Number(v) => Some(*v as i64),
            RangeValue::Text(s) => parse_date_millis(s),
        }
    }

    /// Text form, for lexicographic comparison
    pub fn as_text(&self) -> String {
        match self {
            RangeValue::Number(v) => format_number(*v),
            RangeValue::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for RangeValue {
    fn from(value: f64) -> Self {
        RangeValue::Number(value)
    }
}

impl From<i64> for RangeValue {
    fn from(value: i64) -> Self {
        RangeValue::Number(value as f64)
    }
}

impl From<&str> for RangeValue {
    fn from(value: &str) -> Self {
        RangeValue::Text(value.to_string())
    }
}

/// Range bounds; `gte`/`lte` inclusive, `gt`/`lt` exclusive
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<RangeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<RangeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<RangeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<RangeValue>,
}

impl RangeBounds {
    /// Numeric containment; `None` when a bound is not numeric
    pub fn contains_f64(&self, value: f64) -> Option<bool> {
        self.check(|bound| bound.as_f64().and_then(|b| value.partial_cmp(&b)))
    }

    /// Instant containment; `None` when a bound is not a date
    pub fn contains_millis(&self, value: i64) -> Option<bool> {
        self.check(|bound| bound.as_millis().map(|b| value.cmp(&b)))
    }

    /// Lexicographic containment
    pub fn contains_str(&self, value: &str) -> bool {
        self.check(|bound| Some(value.cmp(bound.as_text().as_str())))
            .unwrap_or(false)
    }

    /// Apply every bound given `value.cmp(bound)`
    fn check<F>(&self, cmp: F) -> Option<bool>
    where
        F: Fn(&RangeValue) -> Option<Ordering>,
    {
        let mut inside = true;
        if let Some(bound) = &self.gte {
            inside &= cmp(bound)? != Ordering::Less;
        }
        if let Some(bound) = &self.gt {
            inside &= cmp(bound)? == Ordering::Greater;
        }
        if let Some(bound) = &self.lte {
            inside &= cmp(bound)? != Ordering::Greater;
        }
        if let Some(bound) = &self.lt {
            inside &= cmp(bound)? == Ordering::Less;
        }
        Some(inside)
    }
}

/// What a score source contributes for each document in its set
#[derive(Clone, Debug, PartialEq)]
pub enum ScoreKind {
    /// Sum of scorer contributions over the tokens a document contains
    Terms(Vec<String>),
    /// Fixed contribution, for non-text leaves
    Constant(f32),
}

/// A scoring contribution restricted to the documents of the clause that
/// produced it
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreSource {
    pub docs: RoaringBitmap,
    pub kind: ScoreKind,
}

/// Result of evaluating a query node: the matching documents plus the score
/// sources that rank them
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Clause {
    pub matches: RoaringBitmap,
    pub sources: Vec<ScoreSource>,
}

impl Clause {
    /// Matches nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Matches `matches`, scored by the tokens each document contains
    pub fn terms(matches: RoaringBitmap, tokens: Vec<String>) -> Self {
        let sources = if matches.is_empty() || tokens.is_empty() {
            Vec::new()
        } else {
            vec![ScoreSource {
                docs: matches.clone(),
                kind: ScoreKind::Terms(tokens),
            }]
        };
        Self { matches, sources }
    }

    /// Matches `matches`, each document scoring `value`
    pub fn constant(matches: RoaringBitmap, value: f32) -> Self {
        let sources = if matches.is_empty() {
            Vec::new()
        } else {
            vec![ScoreSource {
                docs: matches.clone(),
                kind: ScoreKind::Constant(value),
            }]
        };
        Self { matches, sources }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> u64 {
        self.matches.len()
    }

    /// Drop score sources with no document left in `allowed`
    pub fn restrict_sources(&mut self, allowed: &RoaringBitmap) {
        for source in &mut self.sources {
            source.docs &= allowed;
        }
        self.sources.retain(|source| !source.docs.is_empty());
    }
}
