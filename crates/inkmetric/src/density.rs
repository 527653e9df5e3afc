//! Optical density and apparent dot area.
//!
//! Density is the negative decadic logarithm of reflectance. ISO 5-3 weighted
//! density first averages reflectance with a channel's spectral weighting
//! function and then takes the logarithm. When no weighting function is
//! available, this module falls back on the unweighted mean reflectance over
//! the visible range and, failing that, on zero density.

use log::{debug, warn};

use crate::core::Sum;
use crate::spectrum::{SpectralCurve, SpectralDistribution};
use crate::weighting::{density_wavelengths, DensityChannel, DensityWeightingTable, WeightingFunction};
use crate::Float;

/// The minimum difference between paper and solid reflectance for which
/// Murray-Davies is meaningful.
const MURRAY_DAVIES_EPSILON: Float = 1e-5;

/// Convert reflectance to density. Reflectance at or below zero maps to zero
/// density.
pub fn density_from_reflectance(reflectance: Float) -> Float {
    if reflectance <= 0.0 || reflectance.is_nan() {
        0.0
    } else {
        -reflectance.log10()
    }
}

/// Convert density to reflectance.
pub fn reflectance_from_density(density: Float) -> Float {
    (10.0 as Float).powf(-density)
}

/// Compute ISO 5-3 weighted density.
///
/// This function integrates reflectance times weight over 340nm to 770nm in
/// 10nm steps, skipping wavelengths with zero weight. Wavelengths outside the
/// curve's measured range reuse the nearest measured value, and wavelengths
/// between measured ones are linearly interpolated. If the contributing
/// weights sum to zero, this function returns `None`.
pub fn weighted_density(curve: &SpectralCurve, weights: &WeightingFunction) -> Option<Float> {
    let mut reflectance = Sum::new();
    let mut total = Sum::new();

    for wavelength in density_wavelengths() {
        let weight = weights.weight(wavelength);
        if weight == 0.0 {
            continue;
        }

        let value = curve.sample(wavelength)?;
        reflectance += value * weight;
        total += weight;
    }

    let total = total.value();
    if total <= 0.0 {
        return None;
    }

    Some(density_from_reflectance(reflectance.value() / total))
}

/// Compute unweighted density from the mean reflectance between 400nm and
/// 700nm in 10nm steps.
pub fn unweighted_density(curve: &SpectralCurve) -> Option<Float> {
    (400..=700)
        .step_by(10)
        .filter_map(|wavelength| curve.sample(wavelength))
        .collect::<Sum>()
        .mean()
        .map(density_from_reflectance)
}

/// Compute the density of the curve for the given channel.
///
/// This function uses the channel's weighting function if the table has one
/// and falls back on [`unweighted_density`] otherwise. An empty curve has
/// zero density.
pub fn compute_density(
    curve: &SpectralCurve,
    channel: DensityChannel,
    table: Option<&DensityWeightingTable>,
) -> Float {
    if curve.is_empty() {
        return 0.0;
    }

    if let Some(density) = table
        .and_then(|table| table.channel(channel))
        .and_then(|weights| weighted_density(curve, weights))
    {
        return density;
    }

    debug!("no {channel} weights for {}, using unweighted density", curve.label());
    unweighted_density(curve).unwrap_or(0.0)
}

/// Compute the Murray-Davies apparent dot area in percent.
///
/// The result is not clamped. Values below 0% or above 100% indicate under-
/// or over-inking, respectively. If paper and solid reflectance are
/// indistinguishable, this function returns 0.
pub fn murray_davies_dot_area(tone: Float, paper: Float, solid: Float) -> Float {
    let paper = reflectance_from_density(paper);
    let solid = reflectance_from_density(solid);
    let tone = reflectance_from_density(tone);

    let denominator = paper - solid;
    if denominator.abs() < MURRAY_DAVIES_EPSILON {
        warn!("paper and solid reflectance are indistinguishable, reporting 0% dot area");
        return 0.0;
    }

    100.0 * (paper - tone) / denominator
}
