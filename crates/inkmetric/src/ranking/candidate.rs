//! Candidates, their measurements, and resolving a comparable Lab value.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::lab::Lab;
use crate::spectrum::{SpectralCurve, SpectralDistribution};
use crate::transform::LabTransform;

/// A measurement of a color under one measurement mode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Measurement {
    /// The measurement mode, e.g., `"M0"` or `"M1"`.
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lab: Option<Lab>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectral_curve: Option<SpectralCurve>,
}

impl Measurement {
    /// Create a new measurement with a Lab value.
    pub fn with_lab<S: Into<String>>(mode: S, lab: Lab) -> Self {
        Self {
            mode: mode.into(),
            lab: Some(lab),
            spectral_curve: None,
        }
    }

    /// Create a new measurement with a spectral curve.
    pub fn with_spectral_curve<S: Into<String>>(mode: S, curve: SpectralCurve) -> Self {
        Self {
            mode: mode.into(),
            lab: None,
            spectral_curve: Some(curve),
        }
    }

    fn has_mode(&self, mode: &str) -> bool {
        self.mode.eq_ignore_ascii_case(mode)
    }

    fn finite_lab(&self) -> Option<Lab> {
        self.lab.filter(Lab::is_finite)
    }
}

/// A color that may be matched against a reference.
///
/// Candidates are read-only inputs to ranking. The reference color of a
/// ranking pass is a candidate, too.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchCandidate {
    /// The candidate's identity.
    pub id: String,
    pub name: String,
    pub measurements: Vec<Measurement>,
}

impl MatchCandidate {
    /// Create a new candidate.
    pub fn new<S, T>(id: S, name: T, measurements: Vec<Measurement>) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            measurements,
        }
    }
}

/// The measurement conditions for comparing colors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementContext {
    /// The active measurement mode.
    pub mode: String,
    pub illuminant: String,
    pub observer: String,
    /// The label of the tristimulus weighting table.
    pub table: String,
}

impl MeasurementContext {
    /// Create a new measurement context.
    pub fn new<S: Into<String>>(mode: S, illuminant: S, observer: S, table: S) -> Self {
        Self {
            mode: mode.into(),
            illuminant: illuminant.into(),
            observer: observer.into(),
            table: table.into(),
        }
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// The source of a candidate's comparable Lab value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabSource {
    /// Stored Lab of the measurement for the active mode.
    StoredLab,
    /// Spectral curve of the measurement for the active mode, converted to Lab.
    Spectral,
    /// Stored Lab of another measurement.
    OtherMeasurement,
}

type Resolver = fn(&MatchCandidate, &MeasurementContext, &dyn LabTransform) -> Option<Lab>;

const RESOLVERS: [(LabSource, Resolver); 3] = [
    (LabSource::StoredLab, by_stored_lab),
    (LabSource::Spectral, by_spectral_curve),
    (LabSource::OtherMeasurement, by_other_measurement),
];

fn by_stored_lab(candidate: &MatchCandidate, context: &MeasurementContext, _: &dyn LabTransform) -> Option<Lab> {
    candidate
        .measurements
        .iter()
        .filter(|m| m.has_mode(&context.mode))
        .find_map(Measurement::finite_lab)
}

fn by_spectral_curve(
    candidate: &MatchCandidate,
    context: &MeasurementContext,
    transform: &dyn LabTransform,
) -> Option<Lab> {
    candidate
        .measurements
        .iter()
        .filter(|m| m.has_mode(&context.mode))
        .filter_map(|m| m.spectral_curve.as_ref().filter(|c| !c.is_empty()))
        .find_map(|curve| match transform.spectral_to_lab(curve) {
            Ok(lab) => Some(lab).filter(Lab::is_finite),
            Err(TransformError::Pending) => {
                debug!("spectral to Lab pending for candidate {}", candidate.id);
                None
            }
            Err(error) => {
                warn!("spectral to Lab failed for candidate {}: {error}", candidate.id);
                None
            }
        })
}

fn by_other_measurement(
    candidate: &MatchCandidate,
    _: &MeasurementContext,
    _: &dyn LabTransform,
) -> Option<Lab> {
    candidate.measurements.iter().find_map(Measurement::finite_lab)
}

/// Resolve the candidate's comparable Lab value.
///
/// The cascade prefers the stored Lab of the measurement for the active mode,
/// then converts that measurement's spectral curve, and finally falls back on
/// the stored Lab of any other measurement. Transform failures are logged and
/// skipped. If nothing resolves, the candidate is not comparable.
pub fn resolve_candidate_lab(
    candidate: &MatchCandidate,
    context: &MeasurementContext,
    transform: &dyn LabTransform,
) -> Option<(Lab, LabSource)> {
    RESOLVERS
        .iter()
        .find_map(|(source, resolver)| resolver(candidate, context, transform).map(|lab| (lab, *source)))
}
