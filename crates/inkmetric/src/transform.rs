//! The spectral to Lab transform.
//!
//! Converting reflectance to Lab is a collaborator of the tone and ranking
//! code, which only consume the [`LabTransform`] trait. [`TristimulusTable`]
//! is a table-driven implementation: it multiplies reflectance with a table
//! of weights that already incorporate illuminant and observer, as tabulated
//! by ASTM E308, and converts the resulting tristimulus values to Lab relative
//! to the table's white.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Sum;
use crate::error::{Error, Result, TransformError};
use crate::lab::Lab;
use crate::spectrum::{SpectralCurve, SpectralDistribution};
use crate::Float;

/// A spectral to Lab transform.
///
/// Implementations may fail for any reason, including a weighting table that
/// is still loading. Callers never propagate such failures and instead fall
/// back on stored Lab values or skip the measurement.
pub trait LabTransform {
    /// Convert the spectral reflectance curve to Lab.
    fn spectral_to_lab(&self, curve: &SpectralCurve) -> std::result::Result<Lab, TransformError>;
}

impl<F> LabTransform for F
where
    F: Fn(&SpectralCurve) -> std::result::Result<Lab, TransformError>,
{
    fn spectral_to_lab(&self, curve: &SpectralCurve) -> std::result::Result<Lab, TransformError> {
        self(curve)
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// A tristimulus weighting table.
///
/// Each entry maps a wavelength to the weights for X, Y, and Z. The weights
/// already include the illuminant's relative spectral power, so that the sum
/// over all entries is the white point.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TristimulusTable {
    /// A descriptive label, e.g., `"ASTM E308 Table 5 D50/2°"`.
    pub label: String,
    /// The illuminant's name, e.g., `"D50"`.
    pub illuminant: String,
    /// The observer's name, e.g., `"2"`.
    pub observer: String,
    weights: BTreeMap<usize, [Float; 3]>,
}

impl TristimulusTable {
    /// Create a new table with the given weights.
    pub fn new<S, I>(label: S, illuminant: S, observer: S, weights: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (usize, [Float; 3])>,
    {
        Self {
            label: label.into(),
            illuminant: illuminant.into(),
            observer: observer.into(),
            weights: weights.into_iter().collect(),
        }
    }

    /// Compute this table's white point, i.e., the sum of all weights.
    pub fn white(&self) -> [Float; 3] {
        let mut sums = [Sum::new(), Sum::new(), Sum::new()];
        for [x, y, z] in self.weights.values() {
            sums[0] += *x;
            sums[1] += *y;
            sums[2] += *z;
        }
        sums.map(|s| s.value())
    }

    /// Parse a table from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a table from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json_str(&content)
    }
}

impl LabTransform for TristimulusTable {
    fn spectral_to_lab(&self, curve: &SpectralCurve) -> std::result::Result<Lab, TransformError> {
        if curve.is_empty() || self.weights.is_empty() {
            return Err(TransformError::NoSpectralData);
        }

        let white = self.white();
        if white.iter().any(|&c| c <= 0.0 || !c.is_finite()) {
            return Err(TransformError::DegenerateWhite);
        }

        let mut sums = [Sum::new(), Sum::new(), Sum::new()];
        for (&wavelength, &[x, y, z]) in &self.weights {
            // Curve is not empty, hence sampling always succeeds.
            let reflectance = curve.sample(wavelength).unwrap_or(0.0);
            sums[0] += reflectance * x;
            sums[1] += reflectance * y;
            sums[2] += reflectance * z;
        }

        Ok(Lab::from_xyz(sums.map(|s| s.value()), white))
    }
}

#[cfg(test)]
mod test {
    use super::{LabTransform, TristimulusTable};
    use crate::core::assert_close;
    use crate::error::{Error, TransformError};
    use crate::lab::Lab;
    use crate::spectrum::SpectralCurve;
    use crate::Float;

    fn table() -> TristimulusTable {
        // A coarse, made-up table whose white is (96, 100, 82).
        TristimulusTable::new(
            "test",
            "D50",
            "2",
            [
                (450, [30.0, 10.0, 70.0]),
                (550, [30.0, 60.0, 10.0]),
                (650, [36.0, 30.0, 2.0]),
            ],
        )
    }

    fn flat(value: Float) -> SpectralCurve {
        SpectralCurve::from_samples((400..=700).step_by(10).map(|w| (w, value)))
    }

    #[test]
    fn test_white() {
        assert_eq!(table().white(), [96.0, 100.0, 82.0]);
    }

    #[test]
    fn test_neutral_curves() -> Result<(), TransformError> {
        let table = table();

        let lab = table.spectral_to_lab(&flat(1.0))?;
        assert_close!(lab.l, 100.0);
        assert_close!(lab.a, 0.0);
        assert_close!(lab.b, 0.0);

        let lab = table.spectral_to_lab(&flat(0.18))?;
        assert_close!(lab.l, 49.496, 1e-3);
        assert_close!(lab.a, 0.0);
        assert_close!(lab.b, 0.0);
        Ok(())
    }

    #[test]
    fn test_failures() {
        assert_eq!(
            table().spectral_to_lab(&SpectralCurve::default()),
            Err(TransformError::NoSpectralData)
        );

        let black = TristimulusTable::new("black", "D50", "2", [(550, [0.0, 0.0, 0.0])]);
        assert_eq!(
            black.spectral_to_lab(&flat(0.5)),
            Err(TransformError::DegenerateWhite)
        );
    }

    #[test]
    fn test_closure() {
        let fixed = |_: &SpectralCurve| -> Result<Lab, TransformError> { Ok(Lab::new(1.0, 2.0, 3.0)) };
        assert_eq!(fixed.spectral_to_lab(&flat(0.5)), Ok(Lab::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_json() -> Result<(), Error> {
        let table = TristimulusTable::from_json_str(
            r#"{
                "label": "json",
                "illuminant": "D65",
                "observer": "10",
                "weights": {"500": [10.0, 20.0, 30.0], "600": [40.0, 30.0, 0.5]}
            }"#,
        )?;
        assert_eq!(table.illuminant, "D65");
        assert_eq!(table.white(), [50.0, 50.0, 30.5]);
        Ok(())
    }
}
