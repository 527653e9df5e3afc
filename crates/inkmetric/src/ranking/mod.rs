//! Ranking candidate colors by perceptual difference from a reference.
//!
//! A ranking pass resolves a comparable Lab value for the reference and every
//! candidate, computes Delta-E with the [`ColorDifference`] collaborator, and
//! sorts the candidates by ascending difference. Candidates without any
//! comparable Lab are skipped. The sorted, unfiltered results are cached by
//! [`RankingKey`], so that changing the threshold only re-filters them.
//!
//! [`MatchSession`] tracks which pass is current and keeps the displayed
//! results stable, and [`compute_statistics`] summarizes a filtered
//! population.

mod cache;
mod candidate;
mod session;
mod stats;

use std::cell::Cell;
use std::sync::Arc;

use log::debug;
use serde::Serialize;

pub use cache::{RankingCache, RankingKey};
pub use candidate::{resolve_candidate_lab, LabSource, MatchCandidate, Measurement, MeasurementContext};
pub use session::{CommitOutcome, MatchSession, PassToken};
pub use stats::{compute_statistics, MatchStatistics, StatisticsRow};

use crate::config::RankingConfig;
use crate::difference::{ColorDifference, DeltaEFormula};
use crate::error::TransformError;
use crate::lab::Lab;
use crate::spectrum::SpectralCurve;
use crate::transform::LabTransform;
use crate::Float;

/// A candidate annotated with its difference from the reference.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedResult {
    /// The candidate's index in the ranked population.
    pub index: usize,
    pub candidate_id: String,
    /// The candidate's resolved Lab value.
    pub lab: Lab,
    pub source: LabSource,
    /// The non-negative difference, with infinity meaning incomparable.
    pub delta_e: Float,
}

/// The inputs of one ranking pass.
#[derive(Clone, Copy, Debug)]
pub struct RankingRequest<'a> {
    pub reference: &'a MatchCandidate,
    pub candidates: &'a [MatchCandidate],
    pub formula: DeltaEFormula,
    /// The maximum Delta-E of displayed results. Use infinity for no limit.
    pub threshold: Float,
    pub context: &'a MeasurementContext,
}

impl RankingRequest<'_> {
    /// Get this request's cache key.
    pub fn key(&self) -> RankingKey {
        RankingKey::new(&self.reference.id, self.formula, self.context, self.candidates.len())
    }
}

/// The color science collaborators of ranking.
#[derive(Clone, Copy)]
pub struct ColorServices<'a> {
    pub transform: &'a dyn LabTransform,
    pub difference: &'a dyn ColorDifference,
}

// --------------------------------------------------------------------------------------------------------------------

/// A match ranker with its result cache.
#[derive(Clone, Debug, Default)]
pub struct MatchRanker {
    config: RankingConfig,
    cache: RankingCache,
}

impl MatchRanker {
    /// Create a new ranker with the given configuration.
    pub fn new(config: RankingConfig) -> Self {
        Self {
            config,
            cache: RankingCache::new(),
        }
    }

    /// Access this ranker's configuration.
    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Access this ranker's cache.
    pub fn cache(&self) -> &RankingCache {
        &self.cache
    }

    /// Discard all cached rankings.
    ///
    /// Passes that ran into a still loading transform are never cached.
    /// Callers should still invoke this method when a loaded transform is
    /// replaced by another one.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    /// Rank the request's candidates.
    ///
    /// This method returns at most [`RankingConfig::display_limit`] results
    /// with Delta-E at or below the threshold, sorted by ascending Delta-E. If
    /// no result passes the threshold, it returns the closest results
    /// instead. If the reference has no comparable Lab, the result is empty.
    pub fn rank(&mut self, request: &RankingRequest<'_>, services: &ColorServices<'_>) -> Vec<RankedResult> {
        let key = request.key();
        let ranking = if let Some(ranking) = self.cache.get(&key) {
            debug!("ranking cache hit for reference {}", request.reference.id);
            ranking
        } else {
            debug!("ranking cache miss for reference {}", request.reference.id);
            let Some(pass) = compute_ranking(request, services, &self.config) else {
                return Vec::new();
            };
            let ranking: Arc<[RankedResult]> = pass.results.into();
            if pass.pending {
                debug!("not caching ranking for reference {} with pending transform", request.reference.id);
            } else {
                self.cache.insert(key, Arc::clone(&ranking));
            }
            ranking
        };

        select(&ranking, request.threshold, self.config.display_limit)
    }
}

/// A transform that records whether the wrapped transform is still loading.
struct PendingWatch<'a> {
    transform: &'a dyn LabTransform,
    pending: Cell<bool>,
}

impl<'a> PendingWatch<'a> {
    fn new(transform: &'a dyn LabTransform) -> Self {
        Self {
            transform,
            pending: Cell::new(false),
        }
    }
}

impl LabTransform for PendingWatch<'_> {
    fn spectral_to_lab(&self, curve: &SpectralCurve) -> Result<Lab, TransformError> {
        let result = self.transform.spectral_to_lab(curve);
        if matches!(result, Err(TransformError::Pending)) {
            self.pending.set(true);
        }
        result
    }
}

/// The sorted results of one ranking pass.
struct RankingPass {
    results: Vec<RankedResult>,
    /// Whether some spectral curve could not be converted yet.
    pending: bool,
}

/// Compare candidates with the reference and sort them. This function
/// returns `None` if the reference has no comparable Lab.
fn compute_ranking(
    request: &RankingRequest<'_>,
    services: &ColorServices<'_>,
    config: &RankingConfig,
) -> Option<RankingPass> {
    let transform = PendingWatch::new(services.transform);
    let Some((reference, _)) = resolve_candidate_lab(request.reference, request.context, &transform)
    else {
        debug!("reference {} has no comparable Lab", request.reference.id);
        return None;
    };

    let quota = config.quota();
    let mut results = Vec::new();
    for (index, candidate) in request
        .candidates
        .iter()
        .enumerate()
        .filter(|(_, candidate)| candidate.id != request.reference.id)
        .take(config.max_candidates)
    {
        let Some((lab, source)) = resolve_candidate_lab(candidate, request.context, &transform) else {
            continue;
        };

        let delta_e = services.difference.delta_e(&reference, &lab, request.formula);
        let delta_e = if delta_e.is_nan() { Float::INFINITY } else { delta_e.max(0.0) };

        results.push(RankedResult {
            index,
            candidate_id: candidate.id.clone(),
            lab,
            source,
            delta_e,
        });
        if quota <= results.len() {
            debug!("ranking quota of {quota} reached at candidate {index}");
            break;
        }
    }

    // Sort before any truncation.
    results.sort_by(|r1, r2| r1.delta_e.total_cmp(&r2.delta_e));
    Some(RankingPass {
        results,
        pending: transform.pending.get(),
    })
}

/// Apply threshold and display limit to sorted results. If no result passes
/// the threshold, fall back on the closest results.
fn select(ranking: &[RankedResult], threshold: Float, limit: usize) -> Vec<RankedResult> {
    let selected = ranking
        .iter()
        .filter(|result| result.delta_e <= threshold)
        .take(limit)
        .cloned()
        .collect::<Vec<_>>();

    if selected.is_empty() && !ranking.is_empty() {
        debug!("no match within threshold {threshold}, showing closest matches");
        return ranking.iter().take(limit).cloned().collect();
    }
    selected
}

/// Rank the request's candidates without caching.
pub fn rank_candidates(
    request: &RankingRequest<'_>,
    services: &ColorServices<'_>,
    config: &RankingConfig,
) -> Vec<RankedResult> {
    MatchRanker::new(*config).rank(request, services)
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use super::{
        rank_candidates, ColorServices, LabSource, MatchCandidate, MatchRanker, Measurement, MeasurementContext,
        RankedResult, RankingRequest,
    };
    use crate::config::RankingConfig;
    use crate::difference::{ColorDifference, DeltaEFormula, StandardDifference};
    use crate::error::TransformError;
    use crate::lab::Lab;
    use crate::spectrum::SpectralCurve;
    use crate::standards::Loadable;
    use crate::transform::TristimulusTable;
    use crate::Float;

    fn no_transform(_: &SpectralCurve) -> Result<Lab, TransformError> {
        Err(TransformError::Pending)
    }

    fn candidate(id: &str, l: Float) -> MatchCandidate {
        MatchCandidate::new(id, id, vec![Measurement::with_lab("M1", Lab::new(l, 0.0, 0.0))])
    }

    fn population() -> Vec<MatchCandidate> {
        vec![
            candidate("far", 80.0),
            candidate("near", 51.0),
            MatchCandidate::new("blank", "blank", Vec::new()),
            candidate("mid", 55.0),
            candidate("closest", 50.5),
        ]
    }

    fn ids(results: &[RankedResult]) -> Vec<&str> {
        results.iter().map(|r| r.candidate_id.as_str()).collect()
    }

    #[test]
    fn test_rank_sorts_and_filters() {
        let reference = candidate("ref", 50.0);
        let candidates = population();
        let context = MeasurementContext::new("M1", "D50", "2", "E308");
        let services = ColorServices {
            transform: &no_transform,
            difference: &StandardDifference,
        };
        let request = RankingRequest {
            reference: &reference,
            candidates: &candidates,
            formula: DeltaEFormula::Cie76,
            threshold: 10.0,
            context: &context,
        };

        let results = rank_candidates(&request, &services, &RankingConfig::default());
        assert_eq!(ids(&results), vec!["closest", "near", "mid"]);
        assert_eq!(results[0].index, 4);
        assert_eq!(results[0].source, LabSource::StoredLab);
        assert_eq!(results[0].delta_e, 0.5);
    }

    #[test]
    fn test_threshold_refilters_without_recompute() {
        let reference = candidate("ref", 50.0);
        let candidates = population();
        let context = MeasurementContext::new("M1", "D50", "2", "E308");

        let calls = Cell::new(0);
        let counting = |r: &Lab, c: &Lab, f: DeltaEFormula| {
            calls.set(calls.get() + 1);
            StandardDifference.delta_e(r, c, f)
        };
        let services = ColorServices {
            transform: &no_transform,
            difference: &counting,
        };

        let mut ranker = MatchRanker::new(RankingConfig::default());
        let mut request = RankingRequest {
            reference: &reference,
            candidates: &candidates,
            formula: DeltaEFormula::Cie76,
            threshold: Float::INFINITY,
            context: &context,
        };

        let all = ranker.rank(&request, &services);
        assert_eq!(all.len(), 4);
        assert_eq!(calls.get(), 4);

        request.threshold = 2.0;
        let some = ranker.rank(&request, &services);
        assert_eq!(ids(&some), vec!["closest", "near"]);
        assert_eq!(calls.get(), 4);
        assert_eq!(some[1].delta_e, all[1].delta_e);

        request.formula = DeltaEFormula::Ciede2000;
        ranker.rank(&request, &services);
        assert_eq!(calls.get(), 8);
        assert_eq!(ranker.cache().len(), 2);
    }

    #[test]
    fn test_fallback_to_closest() {
        let reference = candidate("ref", 50.0);
        let candidates = population();
        let context = MeasurementContext::new("M1", "D50", "2", "E308");
        let services = ColorServices {
            transform: &no_transform,
            difference: &StandardDifference,
        };
        let request = RankingRequest {
            reference: &reference,
            candidates: &candidates,
            formula: DeltaEFormula::Cie76,
            threshold: 0.1,
            context: &context,
        };
        let config = RankingConfig {
            display_limit: 2,
            ..RankingConfig::default()
        };

        let results = rank_candidates(&request, &services, &config);
        assert_eq!(ids(&results), vec!["closest", "near"]);
    }

    #[test]
    fn test_incomparable_sorts_last() {
        let reference = candidate("ref", 50.0);
        let candidates = population();
        let context = MeasurementContext::new("M1", "D50", "2", "E308");
        let broken = |_: &Lab, c: &Lab, _: DeltaEFormula| if c.l < 52.0 { Float::NAN } else { c.l - 50.0 };
        let services = ColorServices {
            transform: &no_transform,
            difference: &broken,
        };
        let request = RankingRequest {
            reference: &reference,
            candidates: &candidates,
            formula: DeltaEFormula::Cie76,
            threshold: Float::INFINITY,
            context: &context,
        };

        let results = rank_candidates(&request, &services, &RankingConfig::default());
        assert_eq!(ids(&results), vec!["mid", "far", "near", "closest"]);
        assert_eq!(results[3].delta_e, Float::INFINITY);
    }

    #[test]
    fn test_caps_and_quota() {
        let reference = candidate("ref", 50.0);
        let candidates = (0..20)
            .map(|n| candidate(&format!("c{n}"), 70.0 - n as Float))
            .collect::<Vec<_>>();
        let context = MeasurementContext::default();
        let services = ColorServices {
            transform: &no_transform,
            difference: &StandardDifference,
        };
        let request = RankingRequest {
            reference: &reference,
            candidates: &candidates,
            formula: DeltaEFormula::Cie76,
            threshold: Float::INFINITY,
            context: &context,
        };

        // Only the first ten candidates are scanned, so c9 is the closest.
        let capped = RankingConfig {
            display_limit: 50,
            max_candidates: 10,
            quota_factor: 2,
        };
        let results = rank_candidates(&request, &services, &capped);
        assert_eq!(results.len(), 10);
        assert_eq!(results[0].candidate_id, "c9");

        // The quota of 3 * 2 stops scanning after c5.
        let quota = RankingConfig {
            display_limit: 3,
            max_candidates: 500,
            quota_factor: 2,
        };
        let results = rank_candidates(&request, &services, &quota);
        assert_eq!(ids(&results), vec!["c5", "c4", "c3"]);
    }

    #[test]
    fn test_unresolvable_reference() {
        let reference = MatchCandidate::new("ref", "ref", Vec::new());
        let candidates = population();
        let context = MeasurementContext::default();
        let services = ColorServices {
            transform: &no_transform,
            difference: &StandardDifference,
        };
        let request = RankingRequest {
            reference: &reference,
            candidates: &candidates,
            formula: DeltaEFormula::Cie76,
            threshold: Float::INFINITY,
            context: &context,
        };

        let mut ranker = MatchRanker::default();
        assert!(ranker.rank(&request, &services).is_empty());
        assert!(ranker.cache().is_empty());
    }

    #[test]
    fn test_pending_transform_not_cached() {
        let spectral = |id: &str, level: Float| {
            let curve = SpectralCurve::from_samples([(500, level), (600, level)]);
            MatchCandidate::new(id, id, vec![Measurement::with_spectral_curve("M1", curve)])
        };
        let reference = candidate("ref", 50.0);
        let candidates = vec![spectral("dark", 0.2), spectral("light", 0.8)];
        let context = MeasurementContext::new("M1", "D50", "2", "E308");
        let request = RankingRequest {
            reference: &reference,
            candidates: &candidates,
            formula: DeltaEFormula::Cie76,
            threshold: Float::INFINITY,
            context: &context,
        };

        let mut ranker = MatchRanker::default();
        let pending: Loadable<TristimulusTable> = Loadable::Pending;
        let services = ColorServices {
            transform: &pending,
            difference: &StandardDifference,
        };
        assert!(ranker.rank(&request, &services).is_empty());
        assert!(ranker.cache().is_empty());

        let loaded = Loadable::Loaded(TristimulusTable::new(
            "flat",
            "E",
            "2",
            [(500, [50.0, 50.0, 50.0]), (600, [50.0, 50.0, 50.0])],
        ));
        let services = ColorServices {
            transform: &loaded,
            difference: &StandardDifference,
        };
        let results = ranker.rank(&request, &services);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.source == LabSource::Spectral));
        assert_eq!(ranker.cache().len(), 1);
    }
}
