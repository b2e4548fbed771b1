use std::collections::{HashMap, HashSet};

/// Supplies alternative spellings for a query term
pub trait SynonymSource: Send + Sync {
    fn get(&self, term: &str) -> HashSet<String>;
}

/// In-memory synonym table; groups are symmetric
#[derive(Clone, Debug, Default)]
pub struct SynonymMap {
    entries: HashMap<String, HashSet<String>>,
}

impl SynonymMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every term in `group` a synonym of every other
    pub fn with_group<I, S>(mut self, group: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_group(group);
        self
    }

    pub fn add_group<I, S>(&mut self, group: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: Vec<String> = group
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        for term in &terms {
            let entry = self.entries.entry(term.clone()).or_default();
            entry.extend(terms.iter().filter(|t| *t != term).cloned());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SynonymSource for SynonymMap {
    fn get(&self, term: &str) -> HashSet<String> {
        self.entries
            .get(&term.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_are_symmetric() {
        let map = SynonymMap::new().with_group(["laptop", "notebook", "Portable"]);
        let laptop = map.get("laptop");
        assert!(laptop.contains("notebook"));
        assert!(laptop.contains("portable"));
        assert!(!laptop.contains("laptop"));
        assert!(map.get("PORTABLE").contains("laptop"));
        assert!(map.get("desktop").is_empty());
        assert_eq!(map.len(), 3);
    }
}
