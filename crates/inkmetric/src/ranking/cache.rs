//! Caching sorted rankings by reference, formula, and measurement context.

use std::collections::HashMap;
use std::sync::Arc;

use super::candidate::MeasurementContext;
use super::RankedResult;
use crate::difference::DeltaEFormula;

/// The signature of a ranking pass.
///
/// A cached ranking is valid only for the same reference, formula,
/// measurement conditions, and population size. The threshold is not part of
/// the signature, since results are filtered when read.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RankingKey {
    pub reference_id: String,
    pub formula: DeltaEFormula,
    pub context: MeasurementContext,
    pub population: usize,
}

impl RankingKey {
    /// Create a new ranking key.
    pub fn new(
        reference_id: &str,
        formula: DeltaEFormula,
        context: &MeasurementContext,
        population: usize,
    ) -> Self {
        Self {
            reference_id: reference_id.to_owned(),
            formula,
            context: context.clone(),
            population,
        }
    }
}

/// A cache of sorted, unfiltered ranking results.
///
/// Entries are shared and never mutated in place. Inserting under an existing
/// key replaces the entry.
#[derive(Clone, Debug, Default)]
pub struct RankingCache {
    entries: HashMap<RankingKey, Arc<[RankedResult]>>,
}

impl RankingCache {
    /// Create a new, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the results for the key.
    pub fn get(&self, key: &RankingKey) -> Option<Arc<[RankedResult]>> {
        self.entries.get(key).cloned()
    }

    /// Cache the results under the key.
    pub fn insert(&mut self, key: RankingKey, results: Arc<[RankedResult]>) {
        self.entries.insert(key, results);
    }

    /// Get the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Determine whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries, e.g., after the standards data finished loading.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::{RankingCache, RankingKey};
    use crate::difference::DeltaEFormula;
    use crate::ranking::candidate::MeasurementContext;

    #[test]
    fn test_key_covers_signature() {
        let context = MeasurementContext::new("M1", "D50", "2", "E308");
        let key = RankingKey::new("ref", DeltaEFormula::Ciede2000, &context, 10);

        assert_eq!(key, RankingKey::new("ref", DeltaEFormula::Ciede2000, &context, 10));
        assert_ne!(key, RankingKey::new("other", DeltaEFormula::Ciede2000, &context, 10));
        assert_ne!(key, RankingKey::new("ref", DeltaEFormula::Cie76, &context, 10));
        assert_ne!(key, RankingKey::new("ref", DeltaEFormula::Ciede2000, &context, 11));

        let d65 = MeasurementContext::new("M1", "D65", "2", "E308");
        assert_ne!(key, RankingKey::new("ref", DeltaEFormula::Ciede2000, &d65, 10));
    }

    #[test]
    fn test_cache() {
        let context = MeasurementContext::default();
        let key = RankingKey::new("ref", DeltaEFormula::Cie76, &context, 0);

        let mut cache = RankingCache::new();
        assert!(cache.get(&key).is_none());

        cache.insert(key.clone(), Arc::from(Vec::new()));
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key).is_some());

        cache.clear();
        assert!(cache.is_empty());
    }
}
