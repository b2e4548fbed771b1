//! Facet engine: per-field value → document sets, counted against a result set

use roaring::RoaringBitmap;
use std::collections::{BTreeMap, HashMap};

use crate::index::DocNo;
use crate::models::FacetCounts;

/// field → value → documents holding it
#[derive(Clone, Debug, Default)]
pub struct FacetIndex {
    fields: HashMap<String, BTreeMap<String, RoaringBitmap>>,
}

impl FacetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, value: &str, docno: DocNo) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .entry(value.to_string())
            .or_default()
            .insert(docno.as_u32());
    }

    /// Drop a membership; empty values and fields are pruned
    pub fn remove(&mut self, field: &str, value: &str, docno: DocNo) {
        let Some(values) = self.fields.get_mut(field) else {
            return;
        };
        if let Some(docs) = values.get_mut(value) {
            docs.remove(docno.as_u32());
            if docs.is_empty() {
                values.remove(value);
            }
        }
        if values.is_empty() {
            self.fields.remove(field);
        }
    }

    pub fn is_tracked(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Non-zero counts of `requested` fields within `matches`
    ///
    /// Fields with no value inside the result set are left out.
    pub fn counts(&self, matches: &RoaringBitmap, requested: &[String]) -> FacetCounts {
        let mut counts = FacetCounts::new();
        for field in requested {
            let Some(values) = self.fields.get(field) else {
                continue;
            };
            let field_counts: BTreeMap<String, u64> = values
                .iter()
                .filter_map(|(value, docs)| {
                    let count = docs.intersection_len(matches);
                    (count > 0).then(|| (value.clone(), count))
                })
                .collect();
            if !field_counts.is_empty() {
                counts.insert(field.clone(), field_counts);
            }
        }
        counts
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}

/// Add `other` into `into`, value by value
pub fn merge_counts(into: &mut FacetCounts, other: FacetCounts) {
    for (field, values) in other {
        let target = into.entry(field).or_default();
        for (value, count) in values {
            *target.entry(value).or_insert(0) += count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requested(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_counts_within_result_set() {
        let mut facets = FacetIndex::new();
        facets.add("brand", "apple", DocNo::new(0));
        facets.add("brand", "apple", DocNo::new(1));
        facets.add("brand", "dell", DocNo::new(2));
        facets.add("in_stock", "true", DocNo::new(0));

        let matches: RoaringBitmap = [0, 2].into_iter().collect();
        let counts = facets.counts(&matches, &requested(&["brand", "color"]));
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["brand"]["apple"], 1);
        assert_eq!(counts["brand"]["dell"], 1);

        let only_one: RoaringBitmap = [1].into_iter().collect();
        let counts = facets.counts(&only_one, &requested(&["brand", "in_stock"]));
        assert_eq!(counts["brand"].len(), 1);
        assert!(!counts.contains_key("in_stock"));
    }

    #[test]
    fn test_remove_prunes() {
        let mut facets = FacetIndex::new();
        facets.add("brand", "apple", DocNo::new(0));
        facets.remove("brand", "apple", DocNo::new(0));
        assert!(!facets.is_tracked("brand"));
        facets.remove("missing", "x", DocNo::new(0));
    }

    #[test]
    fn test_merge_counts() {
        let mut total = FacetCounts::new();
        let mut part = FacetCounts::new();
        part.entry("brand".to_string())
            .or_default()
            .insert("apple".to_string(), 2);
        merge_counts(&mut total, part.clone());
        merge_counts(&mut total, part);
        assert_eq!(total["brand"]["apple"], 4);
    }
}
