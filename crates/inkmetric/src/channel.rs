//! Automatic density channel selection.
//!
//! The channel that best discriminates tone changes for an ink is selected
//! with a cascade of strategies, evaluated in order until one succeeds:
//!
//!  1. [`SelectionMethod::DensityRange`] compares substrate and solid density
//!     for every channel of the weighting table and picks the channel with
//!     the largest range.
//!  2. [`SelectionMethod::InkTypeHint`] maps a textual ink type to its
//!     complementary channel.
//!  3. [`SelectionMethod::SpectralAbsorption`] picks the channel whose band
//!     absorbs most light in a single spectral curve.
//!  4. [`SelectionMethod::Default`] falls back on the visual channel.
//!
//! Ties are always broken in favor of the channel appearing first in
//! [`DensityChannel::ALL`].

use log::debug;
use serde::Serialize;

use crate::density::weighted_density;
use crate::spectrum::{SpectralCurve, SpectralDistribution};
use crate::weighting::{DensityChannel, DensityWeightingTable};
use crate::Float;

/// The strategy that selected a density channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    /// The caller requested the channel.
    Requested,
    /// Largest density range between substrate and solid.
    DensityRange,
    /// Complementary channel of the ink type.
    InkTypeHint,
    /// Largest absorption in a single spectral curve.
    SpectralAbsorption,
    /// The visual channel as last resort.
    Default,
}

/// A selected density channel and the strategy that selected it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ChannelSelection {
    pub channel: DensityChannel,
    pub method: SelectionMethod,
}

/// The evidence available for selecting a density channel.
///
/// All fields are optional. Each strategy uses the fields it needs and
/// declines if they are missing.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChannelEvidence<'a> {
    /// A textual ink type such as `"Cyan"` or `"PANTONE 185 C"`.
    pub ink_type: Option<&'a str>,
    /// A single curve for spectral analysis, typically the solid.
    pub single_curve: Option<&'a SpectralCurve>,
    /// The substrate's curve.
    pub substrate_curve: Option<&'a SpectralCurve>,
    /// The solid's curve.
    pub solid_curve: Option<&'a SpectralCurve>,
    /// The density weighting table.
    pub table: Option<&'a DensityWeightingTable>,
}

type Strategy = fn(&ChannelEvidence<'_>) -> Option<DensityChannel>;

const STRATEGIES: [(SelectionMethod, Strategy); 3] = [
    (SelectionMethod::DensityRange, by_density_range),
    (SelectionMethod::InkTypeHint, by_ink_type),
    (SelectionMethod::SpectralAbsorption, by_spectral_absorption),
];

fn non_empty(curve: Option<&SpectralCurve>) -> Option<&SpectralCurve> {
    curve.filter(|c| !c.is_empty())
}

/// Pick the channel with the largest finite score, preferring earlier
/// channels on ties.
fn pick_max<I>(scores: I) -> Option<DensityChannel>
where
    I: IntoIterator<Item = (DensityChannel, Float)>,
{
    let mut best: Option<(DensityChannel, Float)> = None;
    for (channel, score) in scores {
        if !score.is_finite() {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => (),
            _ => best = Some((channel, score)),
        }
    }
    best.map(|(channel, _)| channel)
}

fn by_density_range(evidence: &ChannelEvidence<'_>) -> Option<DensityChannel> {
    let substrate = non_empty(evidence.substrate_curve)?;
    let solid = non_empty(evidence.solid_curve)?;
    let table = evidence.table?;

    pick_max(DensityChannel::ALL.into_iter().filter_map(|channel| {
        let weights = table.channel(channel)?;
        let range = weighted_density(solid, weights)? - weighted_density(substrate, weights)?;
        Some((channel, range.abs())).filter(|&(_, range)| 0.0 < range)
    }))
}

fn by_ink_type(evidence: &ChannelEvidence<'_>) -> Option<DensityChannel> {
    evidence
        .ink_type
        .map(str::trim)
        .filter(|hint| !hint.is_empty())
        .map(DensityChannel::from_ink_type)
}

fn by_spectral_absorption(evidence: &ChannelEvidence<'_>) -> Option<DensityChannel> {
    let curve = non_empty(evidence.single_curve)?;

    pick_max(DensityChannel::ALL.into_iter().filter_map(|channel| {
        let mean = curve.band_mean(channel.band())?;
        Some((channel, 100.0 - mean * 100.0))
    }))
}

/// Select the density channel that best discriminates tone changes.
pub fn auto_select_density_channel(evidence: &ChannelEvidence<'_>) -> ChannelSelection {
    let selection = STRATEGIES
        .iter()
        .find_map(|(method, strategy)| {
            strategy(evidence).map(|channel| ChannelSelection {
                channel,
                method: *method,
            })
        })
        .unwrap_or(ChannelSelection {
            channel: DensityChannel::Visual,
            method: SelectionMethod::Default,
        });

    debug!(
        "selected {} density channel by {:?}",
        selection.channel, selection.method
    );
    selection
}

/// Select the density channel from the given, optional evidence.
pub fn auto_select_channel(
    ink_type: Option<&str>,
    single_curve: Option<&SpectralCurve>,
    substrate_curve: Option<&SpectralCurve>,
    solid_curve: Option<&SpectralCurve>,
    table: Option<&DensityWeightingTable>,
) -> DensityChannel {
    auto_select_density_channel(&ChannelEvidence {
        ink_type,
        single_curve,
        substrate_curve,
        solid_curve,
        table,
    })
    .channel
}

#[cfg(test)]
mod test {
    use super::{auto_select_channel, auto_select_density_channel, ChannelEvidence, SelectionMethod};
    use crate::spectrum::SpectralCurve;
    use crate::weighting::{DensityChannel, DensityWeightingTable, WeightingFunction};
    use crate::Float;

    fn band_weights(start: usize, end: usize) -> WeightingFunction {
        WeightingFunction::new((start..=end).step_by(10).map(|w| (w, 1.0)))
    }

    fn table() -> DensityWeightingTable {
        DensityWeightingTable::new("test")
            .with_channel(DensityChannel::Red, band_weights(600, 700))
            .with_channel(DensityChannel::Green, band_weights(500, 590))
            .with_channel(DensityChannel::Blue, band_weights(400, 490))
            .with_channel(DensityChannel::Visual, band_weights(400, 700))
    }

    fn paper() -> SpectralCurve {
        SpectralCurve::from_samples((400..=700).step_by(10).map(|w| (w, 0.9)))
    }

    // A cyan-like ink absorbing strongly in the red band.
    fn cyan() -> SpectralCurve {
        SpectralCurve::from_samples((400..=700).step_by(10).map(|w| {
            let value: Float = if 600 <= w { 0.02 } else { 0.6 };
            (w, value)
        }))
    }

    #[test]
    fn test_density_range() {
        let table = table();
        let (paper, cyan) = (paper(), cyan());

        let selection = auto_select_density_channel(&ChannelEvidence {
            ink_type: Some("Yellow"),
            substrate_curve: Some(&paper),
            solid_curve: Some(&cyan),
            table: Some(&table),
            ..ChannelEvidence::default()
        });
        assert_eq!(selection.channel, DensityChannel::Red);
        assert_eq!(selection.method, SelectionMethod::DensityRange);
    }

    #[test]
    fn test_density_range_requires_positive_range() {
        let table = table();
        let paper = paper();

        let selection = auto_select_density_channel(&ChannelEvidence {
            ink_type: Some("magenta"),
            substrate_curve: Some(&paper),
            solid_curve: Some(&paper),
            table: Some(&table),
            ..ChannelEvidence::default()
        });
        assert_eq!(selection.channel, DensityChannel::Green);
        assert_eq!(selection.method, SelectionMethod::InkTypeHint);
    }

    #[test]
    fn test_spectral_absorption() {
        let cyan = cyan();
        let selection = auto_select_density_channel(&ChannelEvidence {
            ink_type: Some("  "),
            single_curve: Some(&cyan),
            ..ChannelEvidence::default()
        });
        assert_eq!(selection.channel, DensityChannel::Red);
        assert_eq!(selection.method, SelectionMethod::SpectralAbsorption);
    }

    #[test]
    fn test_ties_prefer_first_channel() {
        let gray = SpectralCurve::from_samples((400..=700).step_by(10).map(|w| (w, 0.5)));
        let selection = auto_select_density_channel(&ChannelEvidence {
            single_curve: Some(&gray),
            ..ChannelEvidence::default()
        });
        assert_eq!(selection.channel, DensityChannel::Red);
    }

    #[test]
    fn test_default() {
        let selection = auto_select_density_channel(&ChannelEvidence::default());
        assert_eq!(selection.channel, DensityChannel::Visual);
        assert_eq!(selection.method, SelectionMethod::Default);

        let empty = SpectralCurve::default();
        assert_eq!(
            auto_select_channel(None, Some(&empty), Some(&empty), Some(&empty), None),
            DensityChannel::Visual
        );
    }
}
