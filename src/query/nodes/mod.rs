//! Concrete query node implementations
//!
//! Every leaf evaluates to a [`Clause`](crate::query::types::Clause): the
//! matching documents plus the score sources that rank them.

mod all_docs;
mod bool_query;
mod fuzzy_query;
mod geo_distance_query;
mod match_query;
mod multi_match_query;
mod phrase_query;
mod prefix_query;
mod range_query;
mod term_query;
mod terms_query;
mod wildcard_query;

pub use all_docs::AllDocsQuery;
pub use bool_query::BoolQuery;
pub use fuzzy_query::{levenshtein_distance, FuzzyQuery, DEFAULT_FUZZINESS};
pub use geo_distance_query::{haversine_km, GeoDistanceQuery, EARTH_RADIUS_KM};
pub use match_query::MatchQuery;
pub use multi_match_query::MultiMatchQuery;
pub use phrase_query::{positions_form_phrase, PhraseQuery};
pub use prefix_query::PrefixQuery;
pub use range_query::RangeQuery;
pub use term_query::TermQuery;
pub use terms_query::TermsQuery;
pub use wildcard_query::{pattern_to_regex, WildcardQuery};
