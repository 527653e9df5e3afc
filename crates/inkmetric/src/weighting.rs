//! Density channels and their spectral weighting functions.
//!
//! ISO 5-3 defines densitometric status responses as spectral products
//! tabulated from 340nm to 770nm in 10nm steps. This crate does not bundle
//! any particular status response. Instead, callers inject a
//! [`DensityWeightingTable`], typically deserialized from JSON, and every
//! channel in that table is optional.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::spectrum::SpectralDistribution;
use crate::Float;

/// The first wavelength of the density integration.
pub const DENSITY_START: usize = 340;

/// The last wavelength of the density integration.
pub const DENSITY_END: usize = 770;

/// The interval between density integration wavelengths.
pub const DENSITY_STEP: usize = 10;

/// Get an iterator over the density integration wavelengths, i.e., 340nm to
/// 770nm in 10nm steps.
pub fn density_wavelengths() -> std::iter::StepBy<RangeInclusive<usize>> {
    (DENSITY_START..=DENSITY_END).step_by(DENSITY_STEP)
}

// --------------------------------------------------------------------------------------------------------------------

/// A density channel.
///
/// The red, green, and blue channels measure the complementary process inks
/// cyan, magenta, and yellow, respectively. The visual channel approximates
/// the photopic response and serves black and everything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityChannel {
    Red,
    Green,
    Blue,
    Visual,
}

impl DensityChannel {
    /// All channels in evaluation order. Ties are broken in favor of the
    /// channel appearing first.
    pub const ALL: [DensityChannel; 4] = [
        DensityChannel::Red,
        DensityChannel::Green,
        DensityChannel::Blue,
        DensityChannel::Visual,
    ];

    /// Get this channel's lowercase name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Visual => "visual",
        }
    }

    /// Get the band of wavelengths this channel is most sensitive to.
    pub const fn band(&self) -> RangeInclusive<usize> {
        match self {
            Self::Red => 600..=700,
            Self::Green => 500..=600,
            Self::Blue => 400..=500,
            Self::Visual => 400..=700,
        }
    }

    /// Map an ink type label to the channel measuring it.
    ///
    /// Cyan maps to red, magenta to green, and yellow to blue. Black and
    /// everything else, including spot colors, map to visual. The match is
    /// case-insensitive and accepts the single-letter process abbreviations.
    pub fn from_ink_type(ink_type: &str) -> Self {
        let ink_type = ink_type.trim().to_ascii_lowercase();
        match ink_type.as_str() {
            "c" => Self::Red,
            "m" => Self::Green,
            "y" => Self::Blue,
            label if label.contains("cyan") => Self::Red,
            label if label.contains("magenta") => Self::Green,
            label if label.contains("yellow") => Self::Blue,
            _ => Self::Visual,
        }
    }
}

impl std::fmt::Display for DensityChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for DensityChannel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" | "r" => Ok(Self::Red),
            "green" | "g" => Ok(Self::Green),
            "blue" | "b" => Ok(Self::Blue),
            "visual" | "v" => Ok(Self::Visual),
            _ => Err(Error::UnknownChannel(s.to_owned())),
        }
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// A density channel's spectral weighting function.
///
/// Weights are non-negative. Negative or non-finite weights are dropped when
/// creating or deserializing the function.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<usize, Float>", into = "BTreeMap<usize, Float>")]
pub struct WeightingFunction {
    weights: BTreeMap<usize, Float>,
}

impl WeightingFunction {
    /// Create a new weighting function from wavelength, weight pairs.
    pub fn new<I: IntoIterator<Item = (usize, Float)>>(weights: I) -> Self {
        Self {
            weights: weights
                .into_iter()
                .filter(|&(_, weight)| weight.is_finite() && 0.0 <= weight)
                .collect(),
        }
    }

    /// Get the weight at the given wavelength, which is zero if the function
    /// has no entry for it.
    #[inline]
    pub fn weight(&self, wavelength: usize) -> Float {
        self.weights.get(&wavelength).copied().unwrap_or(0.0)
    }

    /// Get an iterator over the wavelength, weight pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Float)> + '_ {
        self.weights.iter().map(|(&wavelength, &weight)| (wavelength, weight))
    }
}

impl SpectralDistribution for WeightingFunction {
    type Value = Float;

    fn label(&self) -> String {
        format!("weighting function with {} entries", self.weights.len())
    }

    fn start(&self) -> usize {
        self.weights.keys().next().copied().unwrap_or(0)
    }

    fn end(&self) -> usize {
        self.weights.keys().next_back().map_or(0, |&last| last + 1)
    }

    fn len(&self) -> usize {
        self.weights.len()
    }

    fn at(&self, wavelength: usize) -> Option<Self::Value> {
        self.weights.get(&wavelength).copied()
    }
}

impl From<BTreeMap<usize, Float>> for WeightingFunction {
    fn from(value: BTreeMap<usize, Float>) -> Self {
        Self::new(value)
    }
}

impl From<WeightingFunction> for BTreeMap<usize, Float> {
    fn from(value: WeightingFunction) -> Self {
        value.weights
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// A density weighting table.
///
/// The table holds up to four weighting functions, one per
/// [`DensityChannel`]. An absent channel is a valid state; density
/// computation and channel selection fall back on other strategies.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityWeightingTable {
    /// A descriptive label, e.g., `"ISO 5-3 Status T"`.
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red: Option<WeightingFunction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green: Option<WeightingFunction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blue: Option<WeightingFunction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual: Option<WeightingFunction>,
}

impl DensityWeightingTable {
    /// Create a new, empty table with the given label.
    pub fn new<S: Into<String>>(label: S) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Set the weighting function for the given channel.
    #[must_use = "method returns updated table and does not mutate original value"]
    pub fn with_channel(mut self, channel: DensityChannel, weights: WeightingFunction) -> Self {
        let slot = match channel {
            DensityChannel::Red => &mut self.red,
            DensityChannel::Green => &mut self.green,
            DensityChannel::Blue => &mut self.blue,
            DensityChannel::Visual => &mut self.visual,
        };
        *slot = Some(weights);
        self
    }

    /// Look up the weighting function for the given channel.
    ///
    /// This method treats a weighting function without entries the same as an
    /// absent one.
    pub fn channel(&self, channel: DensityChannel) -> Option<&WeightingFunction> {
        let weights = match channel {
            DensityChannel::Red => self.red.as_ref(),
            DensityChannel::Green => self.green.as_ref(),
            DensityChannel::Blue => self.blue.as_ref(),
            DensityChannel::Visual => self.visual.as_ref(),
        };
        weights.filter(|w| !w.is_empty())
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

#[cfg(test)]
mod test {
    use super::{density_wavelengths, DensityChannel, DensityWeightingTable, WeightingFunction};
    use crate::error::Error;
    use crate::spectrum::SpectralDistribution;
    use crate::Float;

    #[test]
    fn test_density_wavelengths() {
        let wavelengths = density_wavelengths().collect::<Vec<_>>();
        assert_eq!(wavelengths.len(), 44);
        assert_eq!(wavelengths.first(), Some(&340));
        assert_eq!(wavelengths.last(), Some(&770));
    }

    #[test]
    fn test_channel_names() -> Result<(), Error> {
        for channel in DensityChannel::ALL {
            assert_eq!(channel.name().parse::<DensityChannel>()?, channel);
            assert_eq!(channel.to_string(), channel.name());
        }
        assert_eq!(" V ".parse::<DensityChannel>()?, DensityChannel::Visual);
        assert!(matches!(
            "infrared".parse::<DensityChannel>(),
            Err(Error::UnknownChannel(name)) if name == "infrared"
        ));
        Ok(())
    }

    #[test]
    fn test_ink_type() {
        assert_eq!(DensityChannel::from_ink_type("Cyan"), DensityChannel::Red);
        assert_eq!(DensityChannel::from_ink_type("process magenta"), DensityChannel::Green);
        assert_eq!(DensityChannel::from_ink_type("Y"), DensityChannel::Blue);
        assert_eq!(DensityChannel::from_ink_type("black"), DensityChannel::Visual);
        assert_eq!(DensityChannel::from_ink_type("PANTONE 185"), DensityChannel::Visual);
    }

    #[test]
    fn test_weighting_function() {
        let weights = WeightingFunction::new([(400, 1.0), (410, -2.0), (420, Float::NAN), (430, 3.0)]);
        assert_eq!(weights.len(), 2);
        assert_eq!(weights.weight(400), 1.0);
        assert_eq!(weights.weight(410), 0.0);
        assert_eq!(weights.range(), 400..431);
    }

    #[test]
    fn test_table() -> Result<(), Error> {
        let table = DensityWeightingTable::new("test")
            .with_channel(DensityChannel::Red, WeightingFunction::new([(650, 1.0)]))
            .with_channel(DensityChannel::Green, WeightingFunction::default());

        assert!(table.channel(DensityChannel::Red).is_some());
        assert!(table.channel(DensityChannel::Green).is_none());
        assert!(table.channel(DensityChannel::Blue).is_none());

        let json = serde_json::to_string(&table)?;
        let again = DensityWeightingTable::from_json_str(&json)?;
        assert_eq!(table, again);

        let partial = DensityWeightingTable::from_json_str(
            r#"{"label": "visual only", "visual": {"500": 0.5, "550": 1.0}}"#,
        )?;
        assert_eq!(partial.label, "visual only");
        assert!(partial.channel(DensityChannel::Red).is_none());
        assert_eq!(
            partial
                .channel(DensityChannel::Visual)
                .map(|w| w.weight(550)),
            Some(1.0)
        );
        Ok(())
    }
}
