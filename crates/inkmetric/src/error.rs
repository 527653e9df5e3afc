//! Utility module with inkmetric's errors.
//!
//! Data-quality problems, such as missing spectra, unresolvable reference
//! wedges, or degenerate denominators, are never reported as errors. They
//! degrade to neutral results instead. The errors in this module cover the
//! remaining cases: programmer errors when naming formulas or channels,
//! configuration files that cannot be read, and failures of the spectral to
//! Lab collaborator, which the tone and ranking entry points catch.

use std::path::PathBuf;

use thiserror::Error;

/// A result with inkmetric's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// An error caused by the caller or its configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// A color difference formula name that does not denote a known formula.
    #[error("unknown color difference formula `{0}`")]
    UnknownFormula(String),

    /// A density channel name that does not denote a known channel.
    #[error("unknown density channel `{0}`, expected red, green, blue, or visual")]
    UnknownChannel(String),

    /// A configuration or standards file that could not be read or written.
    #[error("could not access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration or standards document that is not well-formed.
    #[error("malformed JSON document")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new I/O error for the given path.
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// ====================================================================================================================

/// A failure of the spectral to Lab transform.
///
/// The transform depends on a tristimulus weighting table that is loaded
/// asynchronously. Consumers treat every variant the same way, as "no Lab
/// available for this measurement," and move on to the next fallback.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// The weighting table has not been loaded yet.
    #[error("tristimulus weighting table is still loading")]
    Pending,

    /// The weighting table failed to load.
    #[error("tristimulus weighting table is unavailable: {0}")]
    Unavailable(String),

    /// The spectral curve has no usable samples or does not overlap the table.
    #[error("spectral curve has no samples within the weighting table's range")]
    NoSpectralData,

    /// The weighting table's white has no luminance.
    #[error("tristimulus weighting table has a degenerate white point")]
    DegenerateWhite,
}
