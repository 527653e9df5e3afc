//! # Inkmetric
//!
//! Inkmetric turns spectral reflectance measurements of printed color into
//! the metrics printers actually use: optical density, apparent dot area,
//! tone value increase, and the perceptual difference between a reference
//! color and a population of candidates.
//!
//!
//! ## 1. Overview
//!
//! Inkmetric's main abstractions are:
//!
//!   * [`SpectralCurve`] is a **normalized reflectance curve** at nanometer
//!     resolution. [`spectrum::normalize_spectral_curve`] creates curves from
//!     the loosely typed data found in color exchange files, automatically
//!     rescaling percentages and dropping unusable entries.
//!   * [`weighting::DensityWeightingTable`] holds the **ISO 5-3 spectral
//!     weights** for each [`DensityChannel`]. [`density::compute_density`]
//!     uses them to compute weighted density, falling back on unweighted
//!     density when a channel is missing.
//!   * [`tone::TintSample`] is one patch of a tint ladder.
//!     [`tone::build_tone_reproduction_curve`] resolves the ladder's substrate
//!     and solid, selects one density channel with
//!     [`channel::auto_select_density_channel`], and computes **Murray-Davies
//!     dot area** or **ISO 20654 spot color tone value** for every tint.
//!   * [`ranking::MatchRanker`] **ranks candidate colors** by Delta-E from a
//!     reference, caching results so that threshold changes only re-filter.
//!     [`ranking::MatchSession`] keeps displayed results stable across passes
//!     and [`ranking::compute_statistics`] summarizes them.
//!
//! Two collaborators are injected rather than built in. The
//! [`transform::LabTransform`] trait converts spectral curves to [`Lab`] and
//! is implemented by the table-driven [`transform::TristimulusTable`]. The
//! [`difference::ColorDifference`] trait computes Delta-E and is implemented
//! by [`difference::StandardDifference`]. Since weighting tables are often
//! loaded asynchronously, [`standards::Loadable`] models tables that are
//! still pending or failed to load, and all computations degrade gracefully
//! instead of failing.
//!
//!
//! ## 2. Tone Reproduction
//!
//! A tint ladder from bare substrate to full solid yields a tone reproduction
//! curve with the tone value increase for every intermediate tint:
//!
//! ```
//! # use inkmetric::Float;
//! use inkmetric::SpectralCurve;
//! use inkmetric::tone::{build_tone_reproduction_curve, TintSample, ToneContext, ToneValueMethod};
//!
//! let flat = |reflectance: Float| {
//!     SpectralCurve::from_samples((400..=700).step_by(10).map(|w| (w, reflectance)))
//! };
//! let ladder = [
//!     TintSample::new(0.0).with_spectral_curve(flat(0.89)),
//!     TintSample::new(50.0).with_spectral_curve(flat(0.16)),
//!     TintSample::new(100.0).with_spectral_curve(flat(0.025)),
//! ];
//!
//! let curve = build_tone_reproduction_curve(
//!     &ladder, ToneValueMethod::Density, &ToneContext::default());
//! assert_eq!(curve[0].tvi, 0.0);
//! assert!(30.0 < curve[1].tvi && curve[1].tvi < 40.0);
//! assert_eq!(curve[2].output, 100.0);
//! ```
//!
//!
//! ## 3. Match Ranking
//!
//! Ranking works with whatever Lab values are available, even while the
//! tristimulus weighting table is still loading:
//!
//! ```
//! # use inkmetric::Float;
//! use inkmetric::{DeltaEFormula, Lab};
//! use inkmetric::config::RankingConfig;
//! use inkmetric::difference::StandardDifference;
//! use inkmetric::ranking::{
//!     rank_candidates, ColorServices, MatchCandidate, Measurement, MeasurementContext,
//!     RankingRequest,
//! };
//! use inkmetric::standards::Standards;
//!
//! let standards = Standards::default();
//! let swatch = |id: &str, l: Float| {
//!     MatchCandidate::new(id, id, vec![Measurement::with_lab("M1", Lab::new(l, 20.0, 10.0))])
//! };
//! let reference = swatch("reference", 50.0);
//! let candidates = vec![swatch("lighter", 58.0), swatch("close", 51.0)];
//! let context = MeasurementContext::new("M1", "D50", "2", "ASTM E308");
//!
//! let services = ColorServices {
//!     transform: &standards.tristimulus,
//!     difference: &StandardDifference,
//! };
//! let request = RankingRequest {
//!     reference: &reference,
//!     candidates: &candidates,
//!     formula: DeltaEFormula::Ciede2000,
//!     threshold: 2.0,
//!     context: &context,
//! };
//!
//! let results = rank_candidates(&request, &services, &RankingConfig::default());
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].candidate_id, "close");
//! ```
//!
//!
//! ## 4. Optional Features
//!
//! Inkmetric supports one feature flag:
//!
//!   - **`f64`** selects the eponymous type as floating point type [`Float`]
//!     instead of `f32`. This feature is enabled by default.
//!
//! Inkmetric logs through the [log](https://crates.io/crates/log) facade but
//! never installs a logger. Fallbacks are logged at debug level and
//! degenerate inputs at warn level.

/// The floating point type in use.
#[cfg(feature = "f64")]
pub type Float = f64;
/// The floating point type in use.
#[cfg(not(feature = "f64"))]
pub type Float = f32;

pub mod channel;
pub mod config;
mod core;
pub mod density;
pub mod difference;
pub mod error;
pub mod lab;
pub mod ranking;
pub mod spectrum;
pub mod standards;
pub mod tone;
pub mod transform;
pub mod weighting;

pub use difference::DeltaEFormula;
pub use lab::Lab;
pub use spectrum::SpectralCurve;
pub use weighting::DensityChannel;
