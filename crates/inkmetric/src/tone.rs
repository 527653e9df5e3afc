//! Tone reproduction curves.
//!
//! A tone reproduction curve is a ladder of tint samples from bare substrate
//! (0%) to full solid (100%). For every intermediate tint, this module
//! computes the measured tone value, either as Murray-Davies apparent dot
//! area from density or as ISO 20654 spot color tone value from Lab, and the
//! tone value increase (TVI) relative to the nominal tint.
//!
//! Computing a curve first resolves the substrate and solid references with
//! [`find_reference`]. If either cannot be resolved, the curve degrades to
//! identity, i.e., every point reports its nominal tint as output and zero
//! TVI. The same holds for individual samples lacking usable data.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::channel::{auto_select_density_channel, ChannelEvidence, ChannelSelection, SelectionMethod};
use crate::config::ToneConfig;
use crate::core::lerp;
use crate::density::{compute_density, murray_davies_dot_area};
use crate::lab::Lab;
use crate::spectrum::{SpectralCurve, SpectralDistribution};
use crate::transform::LabTransform;
use crate::weighting::{DensityChannel, DensityWeightingTable};
use crate::Float;

/// The minimum squared distance between substrate and solid for which the
/// spot color tone value is meaningful.
const SCTV_EPSILON: Float = 1e-6;

/// One measured patch of a tint ladder.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TintSample {
    /// The nominal tint, from 0 for bare substrate to 100 for full solid.
    pub tint_percentage: Float,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectral_curve: Option<SpectralCurve>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lab: Option<Lab>,
    /// Whether the sample has been marked as the substrate.
    pub is_substrate: bool,
}

impl TintSample {
    /// Create a new sample without measurements.
    pub fn new(tint_percentage: Float) -> Self {
        Self {
            tint_percentage,
            ..Self::default()
        }
    }

    /// Add a spectral reflectance curve.
    #[must_use = "method returns updated sample and does not mutate original value"]
    pub fn with_spectral_curve(mut self, curve: SpectralCurve) -> Self {
        self.spectral_curve = Some(curve);
        self
    }

    /// Add a precomputed Lab color.
    #[must_use = "method returns updated sample and does not mutate original value"]
    pub fn with_lab(mut self, lab: Lab) -> Self {
        self.lab = Some(lab);
        self
    }

    /// Mark this sample as the substrate.
    #[must_use = "method returns updated sample and does not mutate original value"]
    pub fn as_substrate(mut self) -> Self {
        self.is_substrate = true;
        self
    }

    /// Get this sample's spectral curve if it has usable data.
    pub fn curve(&self) -> Option<&SpectralCurve> {
        self.spectral_curve.as_ref().filter(|curve| !curve.is_empty())
    }

    /// Resolve this sample's Lab, preferring the stored value over converting
    /// the spectral curve.
    fn resolve_lab(&self, transform: Option<&dyn LabTransform>) -> Option<Lab> {
        if let Some(lab) = self.lab.filter(Lab::is_finite) {
            return Some(lab);
        }

        let curve = self.curve()?;
        match transform?.spectral_to_lab(curve) {
            Ok(lab) => Some(lab).filter(Lab::is_finite),
            Err(error) => {
                debug!("no Lab for {}% tint: {error}", self.tint_percentage);
                None
            }
        }
    }
}

/// The method for computing tone values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneValueMethod {
    /// Murray-Davies apparent dot area from density.
    #[default]
    Density,
    /// ISO 20654 spot color tone value from Lab.
    Colorimetric,
}

/// The context for computing a tone reproduction curve.
///
/// All collaborators are optional. Without a weighting table, density
/// falls back on unweighted density. Without a transform, only stored Lab
/// values are available to the colorimetric method.
#[derive(Clone, Copy, Default)]
pub struct ToneContext<'a> {
    pub table: Option<&'a DensityWeightingTable>,
    /// A textual ink type used as hint for channel selection.
    pub ink_type: Option<&'a str>,
    /// A density channel overriding automatic selection.
    pub channel: Option<DensityChannel>,
    pub transform: Option<&'a dyn LabTransform>,
    pub config: ToneConfig,
}

// --------------------------------------------------------------------------------------------------------------------

/// An end of the tint ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Substrate,
    Solid,
}

/// The strategy that resolved a reference sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceStrategy {
    /// The nominal percentage matches 0% or 100%.
    ExactPercentage,
    /// The sample is marked as substrate.
    SubstrateFlag,
    /// The highest percentage at or above the solid minimum.
    NearSolid,
    /// The lowest or highest visual density.
    Density,
}

/// A resolved reference sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ReferenceSample {
    /// The sample's index in the input.
    pub index: usize,
    pub strategy: ReferenceStrategy,
}

type Resolver = fn(&[TintSample], Endpoint, &ToneContext<'_>) -> Option<usize>;

const RESOLVERS: [(ReferenceStrategy, Resolver); 4] = [
    (ReferenceStrategy::ExactPercentage, by_exact_percentage),
    (ReferenceStrategy::SubstrateFlag, by_substrate_flag),
    (ReferenceStrategy::NearSolid, by_near_solid),
    (ReferenceStrategy::Density, by_density),
];

fn by_exact_percentage(samples: &[TintSample], endpoint: Endpoint, context: &ToneContext<'_>) -> Option<usize> {
    let target = match endpoint {
        Endpoint::Substrate => 0.0,
        Endpoint::Solid => context.config.solid_percentage,
    };
    samples
        .iter()
        .position(|s| (s.tint_percentage - target).abs() <= context.config.percentage_tolerance)
}

fn by_substrate_flag(samples: &[TintSample], endpoint: Endpoint, _: &ToneContext<'_>) -> Option<usize> {
    match endpoint {
        Endpoint::Substrate => samples.iter().position(|s| s.is_substrate),
        Endpoint::Solid => None,
    }
}

fn by_near_solid(samples: &[TintSample], endpoint: Endpoint, context: &ToneContext<'_>) -> Option<usize> {
    if endpoint != Endpoint::Solid {
        return None;
    }

    let mut best: Option<(usize, Float)> = None;
    for (index, sample) in samples.iter().enumerate() {
        let tint = sample.tint_percentage;
        if tint.is_nan() || tint < context.config.solid_min_percentage {
            continue;
        }
        match best {
            Some((_, highest)) if tint <= highest => (),
            _ => best = Some((index, tint)),
        }
    }
    best.map(|(index, _)| index)
}

fn by_density(samples: &[TintSample], endpoint: Endpoint, context: &ToneContext<'_>) -> Option<usize> {
    let mut best: Option<(usize, Float)> = None;
    for (index, sample) in samples.iter().enumerate() {
        let Some(curve) = sample.curve() else {
            continue;
        };

        let density = compute_density(curve, DensityChannel::Visual, context.table);
        let better = match (endpoint, best) {
            (_, None) => true,
            (Endpoint::Substrate, Some((_, lowest))) => density < lowest,
            (Endpoint::Solid, Some((_, highest))) => highest < density,
        };
        if better {
            best = Some((index, density));
        }
    }
    best.map(|(index, _)| index)
}

/// Locate the substrate or solid reference of a tint ladder.
///
/// The strategies are tried in order: an exact percentage match within the
/// configured tolerance, the substrate flag (substrate only), the highest
/// percentage at or above the solid minimum (solid only), and finally the
/// lowest or highest visual density among samples with spectral data.
pub fn find_reference(
    samples: &[TintSample],
    endpoint: Endpoint,
    context: &ToneContext<'_>,
) -> Option<ReferenceSample> {
    let reference = RESOLVERS.iter().find_map(|(strategy, resolver)| {
        resolver(samples, endpoint, context).map(|index| ReferenceSample {
            index,
            strategy: *strategy,
        })
    });

    if let Some(reference) = reference {
        debug!(
            "resolved {endpoint:?} as sample {} by {:?}",
            reference.index, reference.strategy
        );
    }
    reference
}

// --------------------------------------------------------------------------------------------------------------------

/// Compute the ISO 20654 spot color tone value in percent.
///
/// The tone value is the ratio of the tint's distance from the substrate to
/// the solid's distance from the substrate, both measured in the auxiliary
/// space of [`Lab::to_auxiliary`]. The result is not clamped and may
/// legitimately exceed 100%. If substrate and solid are indistinguishable,
/// this function returns 0.
pub fn spot_color_tone_value(tint: &Lab, substrate: &Lab, solid: &Lab) -> Float {
    fn distance2(p: [Float; 3], q: [Float; 3]) -> Float {
        let (d0, d1, d2) = (p[0] - q[0], p[1] - q[1], p[2] - q[2]);
        d0.mul_add(d0, d1.mul_add(d1, d2 * d2))
    }

    let substrate = substrate.to_auxiliary();
    let denominator = distance2(substrate, solid.to_auxiliary());
    if denominator < SCTV_EPSILON {
        warn!("substrate and solid are colorimetrically indistinguishable, reporting 0% tone value");
        return 0.0;
    }

    100.0 * (distance2(substrate, tint.to_auxiliary()) / denominator).sqrt()
}

/// A point on a tone reproduction curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TonePoint {
    /// The sample's index in the input.
    pub index: usize,
    /// The nominal tint percentage.
    pub input: Float,
    /// The measured tone value.
    pub output: Float,
    /// The tone value increase, i.e., output minus input.
    pub tvi: Float,
}

impl TonePoint {
    fn identity(index: usize, input: Float) -> Self {
        Self {
            index,
            input,
            output: input,
            tvi: 0.0,
        }
    }
}

/// A tone reproduction curve and how it was computed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToneReproductionCurve {
    /// The points sorted by ascending nominal tint.
    pub points: Vec<TonePoint>,
    pub method: ToneValueMethod,
    /// The density channel used for every point of the curve.
    pub channel: ChannelSelection,
    pub substrate: Option<ReferenceSample>,
    pub solid: Option<ReferenceSample>,
    /// Whether the curve degraded to identity because its references could
    /// not be resolved or lack usable data.
    pub degraded: bool,
}

impl ToneReproductionCurve {
    /// Find the point with the largest tone value increase.
    pub fn max_tvi(&self) -> Option<&TonePoint> {
        self.points
            .iter()
            .filter(|point| point.tvi.is_finite())
            .max_by(|p1, p2| p1.tvi.total_cmp(&p2.tvi))
    }

    /// Determine the tone value increase at the given nominal tint by
    /// linearly interpolating between points. Tints outside the curve yield
    /// `None`.
    pub fn tvi_at(&self, nominal: Float) -> Option<Float> {
        let first = self.points.first()?;
        if first.input == nominal {
            return Some(first.tvi);
        }

        self.points.windows(2).find_map(|pair| {
            let [p1, p2] = pair else {
                return None;
            };
            (p1.input <= nominal && nominal <= p2.input)
                .then(|| lerp(nominal, p1.input, p1.tvi, p2.input, p2.tvi))
        })
    }
}

/// The reference values every intermediate tint is compared against.
enum References {
    Density { paper: Float, solid: Float },
    Colorimetric { substrate: Lab, solid: Lab },
}

impl References {
    fn new(
        substrate: &TintSample,
        solid: &TintSample,
        method: ToneValueMethod,
        channel: DensityChannel,
        context: &ToneContext<'_>,
    ) -> Option<Self> {
        match method {
            ToneValueMethod::Density => Some(Self::Density {
                paper: compute_density(substrate.curve()?, channel, context.table),
                solid: compute_density(solid.curve()?, channel, context.table),
            }),
            ToneValueMethod::Colorimetric => Some(Self::Colorimetric {
                substrate: substrate.resolve_lab(context.transform)?,
                solid: solid.resolve_lab(context.transform)?,
            }),
        }
    }

    fn tone_value(&self, sample: &TintSample, channel: DensityChannel, context: &ToneContext<'_>) -> Option<Float> {
        match self {
            Self::Density { paper, solid } => {
                let tone = compute_density(sample.curve()?, channel, context.table);
                Some(murray_davies_dot_area(tone, *paper, *solid))
            }
            Self::Colorimetric { substrate, solid } => {
                let tint = sample.resolve_lab(context.transform)?;
                Some(spot_color_tone_value(&tint, substrate, solid))
            }
        }
    }
}

/// Analyze the tint ladder.
///
/// This function resolves both references, selects one density channel for
/// the entire curve, and computes a point for every sample. Endpoints always
/// report their nominal tint as output and zero TVI.
pub fn analyze_tone_reproduction(
    samples: &[TintSample],
    method: ToneValueMethod,
    context: &ToneContext<'_>,
) -> ToneReproductionCurve {
    let substrate = find_reference(samples, Endpoint::Substrate, context);
    let solid = find_reference(samples, Endpoint::Solid, context);

    let endpoints = match (substrate, solid) {
        (Some(p), Some(s)) if p.index != s.index => samples.get(p.index).zip(samples.get(s.index)),
        _ => None,
    };

    let channel = match context.channel {
        Some(channel) => ChannelSelection {
            channel,
            method: SelectionMethod::Requested,
        },
        None => {
            let substrate_curve = endpoints.and_then(|(p, _)| p.curve());
            let solid_curve = endpoints.and_then(|(_, s)| s.curve());
            auto_select_density_channel(&ChannelEvidence {
                ink_type: context.ink_type,
                single_curve: solid_curve,
                substrate_curve,
                solid_curve,
                table: context.table,
            })
        }
    };

    let references = endpoints
        .and_then(|(p, s)| References::new(p, s, method, channel.channel, context));
    if endpoints.is_none() {
        warn!("could not resolve distinct substrate and solid, tone curve degrades to identity");
    } else if references.is_none() {
        warn!("substrate or solid lack {method:?} data, tone curve degrades to identity");
    }

    let tolerance = context.config.percentage_tolerance;
    let is_endpoint = |index: usize, input: Float| {
        Some(index) == substrate.map(|r| r.index)
            || Some(index) == solid.map(|r| r.index)
            || input.abs() <= tolerance
            || (input - context.config.solid_percentage).abs() <= tolerance
    };

    let mut points = samples
        .iter()
        .enumerate()
        .map(|(index, sample)| {
            let input = sample.tint_percentage;
            let Some(references) = &references else {
                return TonePoint::identity(index, input);
            };
            if is_endpoint(index, input) {
                return TonePoint::identity(index, input);
            }

            match references.tone_value(sample, channel.channel, context) {
                Some(output) if output.is_finite() => TonePoint {
                    index,
                    input,
                    output,
                    tvi: output - input,
                },
                _ => TonePoint::identity(index, input),
            }
        })
        .collect::<Vec<_>>();
    points.sort_by(|p1, p2| p1.input.total_cmp(&p2.input));

    ToneReproductionCurve {
        points,
        method,
        channel,
        substrate,
        solid,
        degraded: references.is_none(),
    }
}

/// Build the tone reproduction curve for the tint ladder.
///
/// The returned points are sorted by ascending nominal tint and carry the
/// index of their sample in the input.
pub fn build_tone_reproduction_curve(
    samples: &[TintSample],
    method: ToneValueMethod,
    context: &ToneContext<'_>,
) -> Vec<TonePoint> {
    analyze_tone_reproduction(samples, method, context).points
}
