//! Summary statistics over a ranked population.

use serde::Serialize;

use super::RankedResult;
use crate::core::Sum;
use crate::difference::{ColorDifference, DeltaEFormula};
use crate::lab::Lab;
use crate::Float;

/// One row of match statistics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatisticsRow {
    /// The candidate for the row, which is absent for the average.
    pub candidate_id: Option<String>,
    pub lab: Lab,
    pub delta_e: Float,
}

/// Statistics of a filtered population relative to a reference.
///
/// The minimum and maximum rows hold the closest and farthest candidates. The
/// average row holds the Lab centroid of the population and the mean Delta-E,
/// whereas `centroid_delta_e` is the Delta-E of the centroid itself.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchStatistics {
    pub min: StatisticsRow,
    pub avg: StatisticsRow,
    pub max: StatisticsRow,
    pub centroid_delta_e: Float,
    /// The number of comparable results.
    pub count: usize,
}

/// Compute statistics over the population.
///
/// Incomparable results, i.e., results with infinite Delta-E, are excluded.
/// If no comparable result remains, this function returns `None`. The
/// statistics depend on the population alone, so that recomputing them for
/// the same population yields the same statistics.
pub fn compute_statistics(
    population: &[RankedResult],
    reference: &Lab,
    formula: DeltaEFormula,
    difference: &dyn ColorDifference,
) -> Option<MatchStatistics> {
    let comparable = population
        .iter()
        .filter(|result| result.delta_e.is_finite())
        .collect::<Vec<_>>();

    let first = *comparable.first()?;
    let (mut closest, mut farthest) = (first, first);
    for &result in &comparable {
        if result.delta_e < closest.delta_e {
            closest = result;
        }
        if farthest.delta_e < result.delta_e {
            farthest = result;
        }
    }

    let mean = comparable
        .iter()
        .map(|result| result.delta_e)
        .collect::<Sum>()
        .mean()?;
    let centroid = Lab::centroid(comparable.iter().map(|result| &result.lab))?;

    let row = |result: &RankedResult| StatisticsRow {
        candidate_id: Some(result.candidate_id.clone()),
        lab: result.lab,
        delta_e: result.delta_e,
    };

    Some(MatchStatistics {
        min: row(closest),
        avg: StatisticsRow {
            candidate_id: None,
            lab: centroid,
            delta_e: mean,
        },
        max: row(farthest),
        centroid_delta_e: difference.delta_e(reference, &centroid, formula),
        count: comparable.len(),
    })
}
