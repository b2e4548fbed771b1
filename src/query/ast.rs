//! Query tree representation
//!
//! A query is a closed tree: one variant per leaf kind plus the boolean
//! composite. Evaluation matches on it exhaustively.

use super::nodes::{
    BoolQuery, FuzzyQuery, GeoDistanceQuery, MatchQuery, MultiMatchQuery, PhraseQuery,
    PrefixQuery, RangeQuery, TermQuery, TermsQuery, WildcardQuery,
};

/// A node of the query tree
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Query {
    /// Every live document
    #[default]
    MatchAll,
    /// No document; malformed clauses degrade to this
    MatchNone,
    Bool(BoolQuery),
    Match(MatchQuery),
    MultiMatch(MultiMatchQuery),
    Term(TermQuery),
    Terms(TermsQuery),
    Prefix(PrefixQuery),
    Wildcard(WildcardQuery),
    Fuzzy(FuzzyQuery),
    Range(RangeQuery),
    Phrase(PhraseQuery),
    GeoDistance(GeoDistanceQuery),
}

impl Query {
    /// Get the query type name for debugging and logging
    pub fn query_type(&self) -> &'static str {
        match self {
            Query::MatchAll => "match_all",
            Query::MatchNone => "match_none",
            Query::Bool(_) => "bool",
            Query::Match(_) => "match",
            Query::MultiMatch(_) => "multi_match",
            Query::Term(_) => "term",
            Query::Terms(_) => "terms",
            Query::Prefix(_) => "prefix",
            Query::Wildcard(_) => "wildcard",
            Query::Fuzzy(_) => "fuzzy",
            Query::Range(_) => "range",
            Query::Phrase(_) => "match_phrase",
            Query::GeoDistance(_) => "geo_distance",
        }
    }
}

macro_rules! impl_from_node {
    ($($node:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$node> for Query {
                fn from(node: $node) -> Self {
                    Query::$variant(node)
                }
            }
        )*
    };
}

impl_from_node! {
    BoolQuery => Bool,
    MatchQuery => Match,
    MultiMatchQuery => MultiMatch,
    TermQuery => Term,
    TermsQuery => Terms,
    PrefixQuery => Prefix,
    WildcardQuery => Wildcard,
    FuzzyQuery => Fuzzy,
    RangeQuery => Range,
    PhraseQuery => Phrase,
    GeoDistanceQuery => GeoDistance,
}

impl From<super::nodes::AllDocsQuery> for Query {
    fn from(_: super::nodes::AllDocsQuery) -> Self {
        Query::MatchAll
    }
}
