//! Pass tracking and stable display of ranking results.

use std::sync::Arc;

use log::debug;

use super::stats::{compute_statistics, MatchStatistics};
use super::RankedResult;
use crate::difference::{ColorDifference, DeltaEFormula};
use crate::lab::Lab;

/// A token identifying one ranking pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PassToken(u64);

/// The outcome of committing a ranking pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The results replaced the displayed results.
    Applied,
    /// The results equal the displayed results, which were kept as is.
    Unchanged,
    /// A newer pass has started, so the results were discarded.
    Stale,
}

/// The displayed results of a matching session.
///
/// Every ranking pass starts with [`MatchSession::begin_pass`], which
/// supersedes all earlier passes, and ends with [`MatchSession::commit`].
/// Completions of superseded passes are discarded. Results identical to the
/// displayed ones, i.e., the same candidates in the same order with the same
/// Delta-E, leave the displayed results untouched, so that consumers
/// comparing by pointer see no change.
#[derive(Clone, Debug)]
pub struct MatchSession {
    latest_pass: u64,
    displayed: Arc<[RankedResult]>,
    statistics: Option<MatchStatistics>,
}

impl Default for MatchSession {
    fn default() -> Self {
        Self {
            latest_pass: 0,
            displayed: Arc::from(Vec::new()),
            statistics: None,
        }
    }
}

impl MatchSession {
    /// Create a new session without results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new ranking pass.
    pub fn begin_pass(&mut self) -> PassToken {
        self.latest_pass += 1;
        PassToken(self.latest_pass)
    }

    /// Determine whether the pass is the most recent one.
    pub fn is_current(&self, token: PassToken) -> bool {
        token.0 == self.latest_pass
    }

    /// Commit the results of a ranking pass.
    ///
    /// If the results are applied, this method also recomputes the statistics
    /// of the displayed population relative to the reference.
    pub fn commit(
        &mut self,
        token: PassToken,
        results: Vec<RankedResult>,
        reference: &Lab,
        formula: DeltaEFormula,
        difference: &dyn ColorDifference,
    ) -> CommitOutcome {
        if !self.is_current(token) {
            debug!("discarding stale ranking pass {} of {}", token.0, self.latest_pass);
            return CommitOutcome::Stale;
        }

        if self.is_displayed(&results) {
            return CommitOutcome::Unchanged;
        }

        self.statistics = compute_statistics(&results, reference, formula, difference);
        self.displayed = results.into();
        CommitOutcome::Applied
    }

    fn is_displayed(&self, results: &[RankedResult]) -> bool {
        self.displayed.len() == results.len()
            && self.displayed.iter().zip(results).all(|(r1, r2)| {
                r1.candidate_id == r2.candidate_id && r1.delta_e.to_bits() == r2.delta_e.to_bits()
            })
    }

    /// Get the displayed results.
    pub fn displayed(&self) -> &Arc<[RankedResult]> {
        &self.displayed
    }

    /// Get the statistics of the displayed results.
    pub fn statistics(&self) -> Option<&MatchStatistics> {
        self.statistics.as_ref()
    }
}
