//! Query DSL parser
//!
//! Parses the JSON query DSL into a [`Query`] tree. Each leaf accepts the
//! flat form `{"match": {"field": "title", "value": "rust"}}` as well as
//! the field-keyed form `{"match": {"title": "rust"}}` or
//! `{"match": {"title": {"query": "rust", "operator": "or"}}}`.
//!
//! Parsing never fails on a JSON value: a malformed clause becomes
//! [`Query::MatchNone`] so the rest of the query still runs.

use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::debug;

use crate::error::{QuarryError, Result};
use crate::models::document::format_number;
use crate::models::GeoPoint;
use crate::query::ast::Query;
use crate::query::nodes::{
    BoolQuery, FuzzyQuery, GeoDistanceQuery, MatchQuery, MultiMatchQuery, PhraseQuery,
    PrefixQuery, RangeQuery, TermQuery, TermsQuery, WildcardQuery,
};
use crate::query::types::{MatchOperator, RangeBounds, RangeValue};
use crate::tokenizer::AnalyzerMode;

const VALUE_KEYS: &[&str] = &["value", "query"];
const TERMS_KEYS: &[&str] = &["values", "value", "terms"];

/// A leaf clause resolved to its field, value and options
struct Leaf<'a> {
    field: &'a str,
    value: Option<&'a Value>,
    options: Option<&'a Map<String, Value>>,
}

impl<'a> Leaf<'a> {
    /// Resolve either the flat or the field-keyed leaf shape
    fn resolve(body: &'a Value, value_keys: &[&str]) -> Option<Self> {
        let map = body.as_object()?;

        if let Some(field) = map.get("field") {
            let field = field.as_str().filter(|f| !f.is_empty())?;
            return Some(Self {
                field,
                value: value_keys.iter().find_map(|k| map.get(*k)),
                options: Some(map),
            });
        }

        if map.len() != 1 {
            return None;
        }
        let (field, spec) = map.iter().next()?;
        match spec {
            Value::Object(options) => Some(Self {
                field,
                value: value_keys.iter().find_map(|k| options.get(*k)),
                options: Some(options),
            }),
            scalar => Some(Self {
                field,
                value: Some(scalar),
                options: None,
            }),
        }
    }

    fn option(&self, key: &str) -> Option<&'a Value> {
        self.options.and_then(|options| options.get(key))
    }

    fn text(&self) -> Option<String> {
        self.value.and_then(scalar_text)
    }
}

/// Query parser for JSON DSL
pub struct QueryParser;

impl QueryParser {
    /// Parse a JSON query into a query tree
    ///
    /// `null`, `{}` and the empty string match every document. A non-empty
    /// string is a multi-field match over all text fields.
    ///
    /// # Example
    ///
    /// ```json
    /// {
    ///   "bool": {
    ///     "must": [
    ///       { "match": { "content": "rust" } }
    ///     ],
    ///     "must_not": [
    ///       { "range": { "year": { "lt": 2020 } } }
    ///     ]
    ///   }
    /// }
    /// ```
    pub fn parse(json: &Value) -> Query {
        match json {
            Value::Null => Query::MatchAll,
            Value::String(text) if text.trim().is_empty() => Query::MatchAll,
            Value::String(text) => MultiMatchQuery::new(text.clone()).into(),
            Value::Object(map) => Self::parse_object(map),
            other => malformed("query", other),
        }
    }

    /// Parse JSON text into a query tree
    pub fn parse_str(json_str: &str) -> Result<Query> {
        if json_str.trim().is_empty() {
            return Ok(Query::MatchAll);
        }
        let value: Value = serde_json::from_str(json_str)
            .map_err(|e| QuarryError::InvalidQuery(format!("Invalid JSON: {e}")))?;
        Ok(Self::parse(&value))
    }

    fn parse_object(map: &Map<String, Value>) -> Query {
        if map.is_empty() {
            return Query::MatchAll;
        }
        if map.len() > 1 {
            debug!(keys = ?map.keys().collect::<Vec<_>>(), "query object with several keys");
            return Query::MatchNone;
        }

        let (kind, body) = match map.iter().next() {
            Some(entry) => entry,
            None => return Query::MatchAll,
        };
        let parsed = match kind.as_str() {
            // Wrapped query: { "query": { ... } }
            "query" => Some(Self::parse(body)),
            "match_all" => Some(Query::MatchAll),
            "match_none" => Some(Query::MatchNone),
            "bool" => Self::parse_bool(body),
            "match" => Self::parse_match(body),
            "multi_match" => Self::parse_multi_match(body),
            "term" => Self::parse_term(body),
            "terms" => Self::parse_terms(body),
            "prefix" => Self::parse_prefix(body),
            "wildcard" => Self::parse_wildcard(body),
            "fuzzy" => Self::parse_fuzzy(body),
            "range" => Self::parse_range(body),
            "match_phrase" | "phrase" => Self::parse_phrase(body),
            "geo_distance" => Self::parse_geo_distance(body),
            _ => None,
        };
        parsed.unwrap_or_else(|| malformed(kind, body))
    }

    /// Parse a bool query
    fn parse_bool(value: &Value) -> Option<Query> {
        let map = value.as_object()?;
        let mut query = BoolQuery::new();
        if let Some(must) = map.get("must") {
            query.must = Self::parse_clause_array(must)?;
        }
        if let Some(should) = map.get("should") {
            query.should = Self::parse_clause_array(should)?;
        }
        if let Some(must_not) = map.get("must_not") {
            query.must_not = Self::parse_clause_array(must_not)?;
        }
        Some(query.into())
    }

    /// Parse an array of query clauses
    fn parse_clause_array(value: &Value) -> Option<Vec<Query>> {
        match value {
            Value::Array(arr) => Some(arr.iter().map(Self::parse).collect()),
            // Single clause can be provided without array wrapper
            obj @ Value::Object(_) => Some(vec![Self::parse(obj)]),
            _ => None,
        }
    }

    /// Parse a match query
    fn parse_match(value: &Value) -> Option<Query> {
        let leaf = Leaf::resolve(value, VALUE_KEYS)?;
        let mut query = MatchQuery::new(leaf.field, leaf.text()?);
        if let Some(op) = leaf.option("operator") {
            query.operator = Some(MatchOperator::parse(op.as_str()?)?);
        }
        if let Some(analyzer) = leaf.option("analyzer") {
            query.analyzer = Some(parse_analyzer(analyzer)?);
        }
        Some(query.into())
    }

    fn parse_multi_match(value: &Value) -> Option<Query> {
        let map = value.as_object()?;
        let text = map.get("query").and_then(scalar_text)?;
        let mut query = MultiMatchQuery::new(text);
        if let Some(fields) = map.get("fields") {
            query.fields = fields
                .as_array()?
                .iter()
                .map(|f| f.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()?;
        }
        if let Some(op) = map.get("operator") {
            query.operator = Some(MatchOperator::parse(op.as_str()?)?);
        }
        Some(query.into())
    }

    /// Parse a term query
    fn parse_term(value: &Value) -> Option<Query> {
        let leaf = Leaf::resolve(value, VALUE_KEYS)?;
        Some(TermQuery::new(leaf.field, leaf.text()?).into())
    }

    /// Parse a terms query
    fn parse_terms(value: &Value) -> Option<Query> {
        let leaf = Leaf::resolve(value, TERMS_KEYS)?;
        let values = leaf
            .value?
            .as_array()?
            .iter()
            .map(scalar_text)
            .collect::<Option<Vec<_>>>()?;
        Some(TermsQuery::new(leaf.field, values).into())
    }

    /// Parse a prefix query
    fn parse_prefix(value: &Value) -> Option<Query> {
        let leaf = Leaf::resolve(value, VALUE_KEYS)?;
        Some(PrefixQuery::new(leaf.field, leaf.text()?).into())
    }

    /// Parse a wildcard query
    fn parse_wildcard(value: &Value) -> Option<Query> {
        let leaf = Leaf::resolve(value, &["value", "wildcard", "query"])?;
        Some(WildcardQuery::new(leaf.field, leaf.text()?).into())
    }

    /// Parse a fuzzy query
    fn parse_fuzzy(value: &Value) -> Option<Query> {
        let leaf = Leaf::resolve(value, VALUE_KEYS)?;
        let mut query = FuzzyQuery::new(leaf.field, leaf.text()?);
        if let Some(fuzziness) = leaf.option("fuzziness") {
            query.fuzziness = parse_u32(fuzziness)?;
        }
        Some(query.into())
    }

    /// Parse a range query
    fn parse_range(value: &Value) -> Option<Query> {
        let leaf = Leaf::resolve(value, &[])?;
        let options = leaf.options?;

        let bound = |key: &str| -> Option<Option<RangeValue>> {
            match options.get(key) {
                None => Some(None),
                Some(v) => RangeValue::from_json(v).map(Some),
            }
        };
        let bounds = RangeBounds {
            gte: bound("gte")?,
            gt: bound("gt")?,
            lte: bound("lte")?,
            lt: bound("lt")?,
        };
        Some(
            RangeQuery {
                field: leaf.field.to_string(),
                bounds,
            }
            .into(),
        )
    }

    /// Parse a match_phrase query
    fn parse_phrase(value: &Value) -> Option<Query> {
        let leaf = Leaf::resolve(value, VALUE_KEYS)?;
        let mut query = PhraseQuery::new(leaf.field, leaf.text()?);
        if let Some(slop) = leaf.option("slop") {
            query.slop = parse_u32(slop)?;
        }
        if let Some(analyzer) = leaf.option("analyzer") {
            query.analyzer = Some(parse_analyzer(analyzer)?);
        }
        Some(query.into())
    }

    /// Parse a geo_distance query
    ///
    /// Accepts `{field, center, distance}` and `{distance, <field>: center}`.
    fn parse_geo_distance(value: &Value) -> Option<Query> {
        let map = value.as_object()?;
        let distance = parse_distance(map.get("distance")?)?;

        let (field, center) = match map.get("field") {
            Some(field) => (field.as_str()?, map.get("center")?),
            None => {
                let mut rest = map.iter().filter(|(k, _)| k.as_str() != "distance");
                let (field, center) = rest.next()?;
                if rest.next().is_some() {
                    return None;
                }
                (field.as_str(), center)
            }
        };
        if field.is_empty() {
            return None;
        }

        let center = GeoPoint::from_json(center).filter(GeoPoint::is_valid)?;
        Some(GeoDistanceQuery::new(field, center, distance).into())
    }
}

fn malformed(kind: &str, body: &Value) -> Query {
    debug!(kind, body = %body, "malformed query clause matches nothing");
    Query::MatchNone
}

/// Text form of a scalar JSON value
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n.as_f64().map(format_number),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_analyzer(value: &Value) -> Option<AnalyzerMode> {
    AnalyzerMode::from_str(value.as_str()?).ok()
}

/// Kilometers, as a number or a numeric string without unit suffix
fn parse_distance(value: &Value) -> Option<f64> {
    let km = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (km.is_finite() && km >= 0.0).then_some(km)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_match_all_forms() {
        assert_eq!(QueryParser::parse(&Value::Null), Query::MatchAll);
        assert_eq!(QueryParser::parse(&json!({})), Query::MatchAll);
        assert_eq!(QueryParser::parse(&json!("")), Query::MatchAll);
        assert_eq!(QueryParser::parse(&json!({"match_all": {}})), Query::MatchAll);
        assert_eq!(QueryParser::parse_str("  ").unwrap(), Query::MatchAll);
    }

    #[test]
    fn test_bare_string_is_multi_match() {
        assert_eq!(
            QueryParser::parse(&json!("rust book")),
            Query::MultiMatch(MultiMatchQuery::new("rust book"))
        );
    }

    #[test]
    fn test_both_leaf_shapes() {
        let flat = QueryParser::parse(&json!({"match": {"field": "title", "value": "rust"}}));
        let keyed = QueryParser::parse(&json!({"match": {"title": "rust"}}));
        let nested = QueryParser::parse(&json!({"match": {"title": {"query": "rust"}}}));
        assert_eq!(flat, Query::Match(MatchQuery::new("title", "rust")));
        assert_eq!(flat, keyed);
        assert_eq!(flat, nested);
    }

    #[test]
    fn test_match_options() {
        let query = QueryParser::parse(&json!({
            "match": {"title": {"query": "rust", "operator": "OR", "analyzer": "simple"}}
        }));
        assert_eq!(
            query,
            Query::Match(
                MatchQuery::new("title", "rust")
                    .with_operator(MatchOperator::Or)
                    .with_analyzer(AnalyzerMode::Simple)
            )
        );
        let bad = QueryParser::parse(&json!({"match": {"title": {"query": "x", "operator": "xor"}}}));
        assert_eq!(bad, Query::MatchNone);
    }

    #[test]
    fn test_term_value_types() {
        assert_eq!(
            QueryParser::parse(&json!({"term": {"field": "year", "value": 2024}})),
            Query::Term(TermQuery::new("year", "2024"))
        );
        assert_eq!(
            QueryParser::parse(&json!({"term": {"active": true}})),
            Query::Term(TermQuery::new("active", "true"))
        );
        assert_eq!(
            QueryParser::parse(&json!({"terms": {"color": ["red", "blue"]}})),
            Query::Terms(TermsQuery::new("color", ["red", "blue"]))
        );
    }

    #[test]
    fn test_range_forms() {
        let flat = QueryParser::parse(&json!({"range": {"field": "price", "gte": 100, "lte": 500}}));
        let keyed = QueryParser::parse(&json!({"range": {"price": {"gte": 100, "lte": 500}}}));
        let expected = Query::Range(RangeQuery::new("price").gte(100.0).lte(500.0));
        assert_eq!(flat, expected);
        assert_eq!(keyed, expected);
        assert_eq!(
            QueryParser::parse(&json!({"range": {"price": {"gte": [1]}}})),
            Query::MatchNone
        );
    }

    #[test]
    fn test_phrase_and_fuzzy_options() {
        assert_eq!(
            QueryParser::parse(&json!({"phrase": {"field": "t", "value": "a b", "slop": 1}})),
            Query::Phrase(PhraseQuery::new("t", "a b").with_slop(1))
        );
        assert_eq!(
            QueryParser::parse(&json!({"match_phrase": {"t": "a b"}})),
            Query::Phrase(PhraseQuery::new("t", "a b"))
        );
        assert_eq!(
            QueryParser::parse(&json!({"fuzzy": {"field": "t", "value": "helo", "fuzziness": 1}})),
            Query::Fuzzy(FuzzyQuery::new("t", "helo").with_fuzziness(1))
        );
        assert_eq!(
            QueryParser::parse(&json!({"fuzzy": {"t": "helo"}})),
            Query::Fuzzy(FuzzyQuery::new("t", "helo"))
        );
    }

    #[test]
    fn test_geo_distance_forms() {
        let expected = Query::GeoDistance(GeoDistanceQuery::new(
            "location",
            GeoPoint::new(37.77, -122.42),
            10.0,
        ));
        assert_eq!(
            QueryParser::parse(&json!({"geo_distance": {
                "field": "location", "center": [-122.42, 37.77], "distance": 10
            }})),
            expected
        );
        assert_eq!(
            QueryParser::parse(&json!({"geo_distance": {
                "distance": "10", "location": {"lat": 37.77, "lon": -122.42}
            }})),
            expected
        );
        assert_eq!(
            QueryParser::parse(&json!({"geo_distance": {
                "field": "location", "center": [-122.42, 37.77], "distance": "10km"
            }})),
            Query::MatchNone
        );
    }

    #[test]
    fn test_bool_and_malformed_clauses() {
        let query = QueryParser::parse(&json!({
            "bool": {
                "must": [{"match": {"title": "rust"}}],
                "should": {"term": {"missing_field_key": {}}},
                "must_not": [{"term": {"value": "x"}}]
            }
        }));
        let expected = BoolQuery::new()
            .must(MatchQuery::new("title", "rust"))
            .should(Query::MatchNone)
            .must_not(TermQuery::new("value", "x"));
        assert_eq!(query, Query::Bool(expected));

        assert_eq!(QueryParser::parse(&json!({"term": {}})), Query::MatchNone);
        assert_eq!(QueryParser::parse(&json!({"term": {"field": "t"}})), Query::MatchNone);
        assert_eq!(QueryParser::parse(&json!({"unknown": {}})), Query::MatchNone);
        assert_eq!(QueryParser::parse(&json!({"match": {}, "term": {}})), Query::MatchNone);
        assert_eq!(QueryParser::parse(&json!(42)), Query::MatchNone);
    }

    #[test]
    fn test_parse_str_rejects_non_json() {
        assert!(matches!(
            QueryParser::parse_str("{not json"),
            Err(QuarryError::InvalidQuery(_))
        ));
        assert_eq!(
            QueryParser::parse_str(r#"{"prefix": {"title": "ru"}}"#).unwrap(),
            Query::Prefix(PrefixQuery::new("title", "ru"))
        );
    }
}
