//! Asynchronously supplied standards data.
//!
//! Weighting tables are loaded outside this crate, often asynchronously, and
//! may still be loading or may have failed to load when a computation runs.
//! [`Loadable`] captures those three states so that computations can degrade
//! to "no result yet" instead of failing.

use crate::error::TransformError;
use crate::lab::Lab;
use crate::spectrum::SpectralCurve;
use crate::transform::{LabTransform, TristimulusTable};
use crate::weighting::DensityWeightingTable;

/// A value that is loaded asynchronously.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Loadable<T> {
    /// The value is still loading.
    #[default]
    Pending,
    /// The value is available.
    Loaded(T),
    /// Loading the value failed for the given reason.
    Failed(String),
}

impl<T> Loadable<T> {
    /// Create a new loadable from the result of loading.
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Loaded(value),
            Err(error) => Self::Failed(error.to_string()),
        }
    }

    /// Get the value if it has been loaded.
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// Determine whether the value is still loading.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl<T: LabTransform> LabTransform for Loadable<T> {
    fn spectral_to_lab(&self, curve: &SpectralCurve) -> Result<Lab, TransformError> {
        match self {
            Self::Pending => Err(TransformError::Pending),
            Self::Loaded(transform) => transform.spectral_to_lab(curve),
            Self::Failed(reason) => Err(TransformError::Unavailable(reason.clone())),
        }
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// The standards data consumed by this crate.
///
/// This struct is an injected dependency. Callers pass it, or the parts they
/// need, into every entry point; there is no global instance.
#[derive(Clone, Debug, Default)]
pub struct Standards {
    /// The density weighting table.
    pub density: Loadable<DensityWeightingTable>,
    /// The tristimulus weighting table for spectral to Lab conversion.
    pub tristimulus: Loadable<TristimulusTable>,
}

impl Standards {
    /// Get the density weighting table if it has been loaded.
    pub fn density_table(&self) -> Option<&DensityWeightingTable> {
        self.density.get()
    }
}

#[cfg(test)]
mod test {
    use super::{Loadable, Standards};
    use crate::error::{Error, TransformError};
    use crate::spectrum::SpectralCurve;
    use crate::transform::{LabTransform, TristimulusTable};
    use crate::weighting::DensityWeightingTable;

    #[test]
    fn test_loadable_transform() {
        let curve = SpectralCurve::from_samples([(500, 0.5), (600, 0.5)]);

        let pending: Loadable<TristimulusTable> = Loadable::Pending;
        assert!(pending.is_pending());
        assert_eq!(pending.spectral_to_lab(&curve), Err(TransformError::Pending));

        let failed: Loadable<TristimulusTable> =
            Loadable::from_result(Err::<TristimulusTable, _>(Error::UnknownFormula("x".into())));
        assert!(matches!(
            failed.spectral_to_lab(&curve),
            Err(TransformError::Unavailable(_))
        ));

        let loaded = Loadable::Loaded(TristimulusTable::new(
            "flat",
            "E",
            "2",
            [(500, [50.0, 50.0, 50.0]), (600, [50.0, 50.0, 50.0])],
        ));
        assert!(loaded.spectral_to_lab(&curve).is_ok());
    }

    #[test]
    fn test_standards() {
        let mut standards = Standards::default();
        assert!(standards.density_table().is_none());

        standards.density = Loadable::Loaded(DensityWeightingTable::new("status t"));
        assert_eq!(standards.density_table().map(|t| t.label.as_str()), Some("status t"));
    }
}
