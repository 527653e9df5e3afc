//! Spectral reflectance curves.
//!
//! The [`SpectralDistribution`] trait defines an interface for mapping
//! nanometer-aligned wavelengths to values. Unlike a tabulated observer, the
//! distributions used in densitometry are sparse: instruments typically report
//! reflectance every 10nm and weighting tables are tabulated at the same
//! interval. Hence the trait distinguishes between the number of samples,
//! [`SpectralDistribution::len`], and the covered range,
//! [`SpectralDistribution::range`].
//!
//! This module includes the following implementation of the trait:
//!
//!   * [`SpectralCurve`] is a measured reflectance curve with values in
//!     `0..=1`. It is created with [`normalize_spectral_curve`] or one of its
//!     convenience wrappers, which accept the loosely typed data found in
//!     color exchange files and drop everything that is not a usable sample.
//!
//! [`WeightingFunction`](crate::weighting::WeightingFunction) is the other
//! implementation in this crate.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::core::{lerp, Sum};
use crate::Float;

/// The shortest wavelength retained by normalization.
pub const MIN_WAVELENGTH: usize = 360;

/// The longest wavelength retained by normalization.
pub const MAX_WAVELENGTH: usize = 830;

/// Raw curves whose maximum exceeds this value may be percentages.
const PERCENT_MAX_THRESHOLD: Float = 1.1;

/// Raw curves whose mean also exceeds this value are percentages.
const PERCENT_MEAN_THRESHOLD: Float = 1.0;

/// A spectral distribution at nanometer resolution.
///
/// A concrete implementation of this trait must provide methods that return a
/// descriptive label, the covered wavelengths, the number of samples, and the
/// spectral distribution's values.
pub trait SpectralDistribution {
    /// The spectral distribution's value type.
    type Value;

    /// Get a descriptive label for this spectral distribution.
    fn label(&self) -> String;

    /// Get the first wavelength with a sample. Empty distributions start at 0.
    fn start(&self) -> usize;

    /// Get the wavelength just past the last sample. Empty distributions end
    /// at 0.
    fn end(&self) -> usize;

    /// Get the range of wavelengths covered by this spectral distribution.
    fn range(&self) -> std::ops::Range<usize> {
        self.start()..self.end()
    }

    /// Determine whether this distribution is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the number of samples in this spectral distribution.
    fn len(&self) -> usize;

    /// Get this spectral distribution's value for the given wavelength.
    ///
    /// If the distribution has a sample at exactly the wavelength, this method
    /// returns some value. Otherwise, it returns none.
    fn at(&self, wavelength: usize) -> Option<Self::Value>;
}

// --------------------------------------------------------------------------------------------------------------------

/// A raw spectral reading.
///
/// Color exchange files are loosely typed: the same column may hold numbers,
/// numeric strings, empty strings, or nulls. This trait converts any of them
/// into a floating point number, returning `None` for anything that does not
/// denote one.
pub trait Reading {
    /// Convert this reading into a number.
    fn reading(&self) -> Option<Float>;
}

impl Reading for f64 {
    #[allow(clippy::unnecessary_cast)]
    fn reading(&self) -> Option<Float> {
        Some(*self as Float)
    }
}

impl Reading for f32 {
    #[allow(clippy::unnecessary_cast)]
    fn reading(&self) -> Option<Float> {
        Some(*self as Float)
    }
}

impl Reading for str {
    fn reading(&self) -> Option<Float> {
        self.trim().parse::<Float>().ok()
    }
}

impl Reading for String {
    fn reading(&self) -> Option<Float> {
        self.as_str().reading()
    }
}

impl Reading for serde_json::Value {
    #[allow(clippy::unnecessary_cast)]
    fn reading(&self) -> Option<Float> {
        match self {
            serde_json::Value::Number(number) => number.as_f64().map(|n| n as Float),
            serde_json::Value::String(text) => text.reading(),
            _ => None,
        }
    }
}

impl<T: Reading> Reading for Option<T> {
    fn reading(&self) -> Option<Float> {
        self.as_ref().and_then(Reading::reading)
    }
}

impl<T: Reading + ?Sized> Reading for &T {
    fn reading(&self) -> Option<Float> {
        (**self).reading()
    }
}

/// Parse a wavelength key such as `400`, `"400"`, `"400.0"`, `"400nm"`, or
/// `"400 nm"`.
///
/// Only the leading decimal digits count, optionally followed by a fraction
/// of zeros. Keys without leading digits, e.g., `"R400"` or `"nm"`, and keys
/// with a nonzero fraction, e.g., `"430.5"`, do not denote a wavelength.
pub(crate) fn parse_wavelength(key: &str) -> Option<usize> {
    let key = key.trim();
    let (digits, rest) = key.split_at(key.find(|c: char| !c.is_ascii_digit()).unwrap_or(key.len()));
    if let Some(fraction) = rest.strip_prefix('.') {
        let end = fraction.find(|c: char| !c.is_ascii_digit()).unwrap_or(fraction.len());
        if fraction[..end].bytes().any(|b| b != b'0') {
            return None;
        }
    }
    digits.parse().ok()
}

// --------------------------------------------------------------------------------------------------------------------

/// Normalize a raw spectral curve.
///
/// This function parses every wavelength key and reading, drops entries that
/// are not numbers, that are negative or not finite, or that fall outside
/// [`MIN_WAVELENGTH`]`..=`[`MAX_WAVELENGTH`]. If the remaining readings look
/// like percentages, i.e., their maximum exceeds 1.1 *and* their mean exceeds
/// 1.0, it divides them by 100. Requiring both keeps a single outlier from
/// rescaling an otherwise proper curve. Finally, it clamps all values to
/// `0..=1`.
///
/// This function never fails. Absent or fully invalid input yields an empty
/// curve, which callers treat as "no usable spectral data."
pub fn normalize_spectral_curve<I, K, V>(raw: I) -> SpectralCurve
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Reading,
{
    let valid = raw
        .into_iter()
        .filter_map(|(key, value)| Some((parse_wavelength(key.as_ref())?, value.reading()?)))
        .collect::<Vec<_>>();

    SpectralCurve::from_valid(valid)
}

/// A spectral reflectance curve.
///
/// Wavelengths are integral nanometers in `360..=830` and reflectance factors
/// are in `0..=1`. A curve without samples signals the absence of spectral
/// data; it is never treated as a curve of zeros.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, serde_json::Value>",
    into = "BTreeMap<usize, Float>"
)]
pub struct SpectralCurve {
    samples: BTreeMap<usize, Float>,
}

impl SpectralCurve {
    /// Create a new curve from wavelength, reflectance pairs.
    ///
    /// The samples are subject to the same normalization as
    /// [`normalize_spectral_curve`].
    pub fn from_samples<I: IntoIterator<Item = (usize, Float)>>(samples: I) -> Self {
        Self::from_valid(samples.into_iter().collect())
    }

    /// Create a new curve from a JSON object mapping wavelength keys to
    /// readings. Anything but an object yields an empty curve.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => normalize_spectral_curve(map),
            _ => Self::default(),
        }
    }

    fn from_valid(valid: Vec<(usize, Float)>) -> Self {
        let valid = valid
            .into_iter()
            .filter(|&(wavelength, value)| {
                value.is_finite()
                    && 0.0 <= value
                    && (MIN_WAVELENGTH..=MAX_WAVELENGTH).contains(&wavelength)
            })
            .collect::<Vec<_>>();

        if valid.is_empty() {
            return Self::default();
        }

        let max = valid
            .iter()
            .map(|&(_, value)| value)
            .fold(Float::NEG_INFINITY, Float::max);
        let mean = valid
            .iter()
            .map(|&(_, value)| value)
            .collect::<Sum>()
            .mean()
            .unwrap_or(0.0);
        let scale = if PERCENT_MAX_THRESHOLD < max && PERCENT_MEAN_THRESHOLD < mean {
            0.01
        } else {
            1.0
        };

        let samples = valid
            .into_iter()
            .map(|(wavelength, value)| (wavelength, (value * scale).clamp(0.0, 1.0)))
            .collect();

        Self { samples }
    }

    /// Get an iterator over this curve's wavelength, reflectance pairs in
    /// ascending wavelength order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Float)> + '_ {
        self.samples.iter().map(|(&wavelength, &value)| (wavelength, value))
    }

    /// Sample this curve at the given wavelength.
    ///
    /// Wavelengths before the first or after the last measured wavelength
    /// reuse that endpoint's value, i.e., the curve is tailed just like a
    /// densitometer extends its edge measurements. Wavelengths between two
    /// measured ones are linearly interpolated. Only an empty curve yields
    /// `None`.
    pub fn sample(&self, wavelength: usize) -> Option<Float> {
        let (&first, &first_value) = self.samples.first_key_value()?;
        let (&last, &last_value) = self.samples.last_key_value()?;

        if wavelength <= first {
            return Some(first_value);
        } else if last <= wavelength {
            return Some(last_value);
        } else if let Some(&value) = self.samples.get(&wavelength) {
            return Some(value);
        }

        let (&x0, &y0) = self.samples.range(..wavelength).next_back()?;
        let (&x1, &y1) = self.samples.range(wavelength..).next()?;
        Some(lerp(
            wavelength as Float,
            x0 as Float,
            y0,
            x1 as Float,
            y1,
        ))
    }

    /// Compute the mean reflectance of the samples measured within the band.
    pub fn band_mean(&self, band: RangeInclusive<usize>) -> Option<Float> {
        self.samples
            .range(band)
            .map(|(_, &value)| value)
            .collect::<Sum>()
            .mean()
    }

    /// Compute the mean reflectance over all samples.
    pub fn mean_reflectance(&self) -> Option<Float> {
        self.samples.values().copied().collect::<Sum>().mean()
    }
}

impl SpectralDistribution for SpectralCurve {
    type Value = Float;

    fn label(&self) -> String {
        format!("spectral curve with {} samples", self.samples.len())
    }

    fn start(&self) -> usize {
        self.samples.keys().next().copied().unwrap_or(0)
    }

    fn end(&self) -> usize {
        self.samples.keys().next_back().map_or(0, |&last| last + 1)
    }

    fn len(&self) -> usize {
        self.samples.len()
    }

    fn at(&self, wavelength: usize) -> Option<Self::Value> {
        self.samples.get(&wavelength).copied()
    }
}

impl From<BTreeMap<String, serde_json::Value>> for SpectralCurve {
    fn from(value: BTreeMap<String, serde_json::Value>) -> Self {
        normalize_spectral_curve(value)
    }
}

impl From<SpectralCurve> for BTreeMap<usize, Float> {
    fn from(value: SpectralCurve) -> Self {
        value.samples
    }
}
