//! Perceptual color difference.
//!
//! Ranking consumes color difference through the [`ColorDifference`] trait and
//! never cares about the formula bodies. [`StandardDifference`] implements the
//! three formulas named by [`DeltaEFormula`] and is the default
//! implementation. Applications with their own formulas, say CMC l:c,
//! implement the trait themselves.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::lab::Lab;
use crate::Float;

/// A color difference formula.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeltaEFormula {
    /// The CIE 1976 formula, i.e., Euclidean distance in Lab.
    #[serde(rename = "cie76")]
    Cie76,
    /// The CIE 1994 formula with graphic arts weights.
    #[serde(rename = "cie94")]
    Cie94,
    /// The CIEDE2000 formula with unit parametric factors.
    #[default]
    #[serde(rename = "ciede2000")]
    Ciede2000,
}

impl DeltaEFormula {
    /// Get this formula's canonical name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Cie76 => "cie76",
            Self::Cie94 => "cie94",
            Self::Ciede2000 => "ciede2000",
        }
    }
}

impl std::fmt::Display for DeltaEFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for DeltaEFormula {
    type Err = Error;

    /// Parse a formula name. The names are matched case-insensitively and
    /// ignoring punctuation, so that `"dE2000"`, `"CIEDE2000"`, and
    /// `"delta-e 00"` all denote the same formula.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase();

        match name.as_str() {
            "cie76" | "cie1976" | "de76" | "deltae76" | "76" => Ok(Self::Cie76),
            "cie94" | "cie1994" | "de94" | "deltae94" | "94" => Ok(Self::Cie94),
            "ciede2000" | "cie2000" | "de2000" | "de00" | "deltae2000" | "deltae00" | "2000"
            | "00" => Ok(Self::Ciede2000),
            _ => Err(Error::UnknownFormula(s.to_owned())),
        }
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// A color difference function.
///
/// Implementations must be pure and deterministic and must return a
/// non-negative number. Not-a-number results are treated as incomparable by
/// the ranking engine.
pub trait ColorDifference {
    /// Compute the difference of the candidate from the reference color.
    fn delta_e(&self, reference: &Lab, candidate: &Lab, formula: DeltaEFormula) -> Float;
}

impl<F> ColorDifference for F
where
    F: Fn(&Lab, &Lab, DeltaEFormula) -> Float,
{
    fn delta_e(&self, reference: &Lab, candidate: &Lab, formula: DeltaEFormula) -> Float {
        self(reference, candidate, formula)
    }
}

/// The standard color difference formulas.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardDifference;

impl ColorDifference for StandardDifference {
    fn delta_e(&self, reference: &Lab, candidate: &Lab, formula: DeltaEFormula) -> Float {
        match formula {
            DeltaEFormula::Cie76 => delta_e76(reference, candidate),
            DeltaEFormula::Cie94 => delta_e94(reference, candidate),
            DeltaEFormula::Ciede2000 => delta_e2000(reference, candidate),
        }
    }
}

/// Compute CIE76 Delta-E.
#[allow(non_snake_case)]
pub fn delta_e76(reference: &Lab, candidate: &Lab) -> Float {
    let ΔL = reference.l - candidate.l;
    let Δa = reference.a - candidate.a;
    let Δb = reference.b - candidate.b;

    ΔL.mul_add(ΔL, Δa.mul_add(Δa, Δb * Δb)).sqrt()
}

/// Compute CIE94 Delta-E with the graphic arts weights `kL = 1`, `K1 =
/// 0.045`, and `K2 = 0.015`. The formula is asymmetric: chroma weights derive
/// from the reference color.
#[allow(non_snake_case)]
pub fn delta_e94(reference: &Lab, candidate: &Lab) -> Float {
    const K1: Float = 0.045;
    const K2: Float = 0.015;

    let C1 = reference.a.hypot(reference.b);
    let C2 = candidate.a.hypot(candidate.b);

    let ΔL = reference.l - candidate.l;
    let ΔC = C1 - C2;
    let Δa = reference.a - candidate.a;
    let Δb = reference.b - candidate.b;
    let ΔH2 = Δa.mul_add(Δa, Δb * Δb) - ΔC * ΔC;
    let ΔH = if 0.0 < ΔH2 { ΔH2.sqrt() } else { 0.0 };

    let SC = K1.mul_add(C1, 1.0);
    let SH = K2.mul_add(C1, 1.0);

    let (l, c, h) = (ΔL, ΔC / SC, ΔH / SH);
    l.mul_add(l, c.mul_add(c, h * h)).sqrt()
}

/// Compute CIEDE2000 Delta-E with the parametric factors `kL = kC = kH = 1`.
#[allow(non_snake_case)]
pub fn delta_e2000(reference: &Lab, candidate: &Lab) -> Float {
    let (L1, a1, b1) = (reference.l, reference.a, reference.b);
    let (L2, a2, b2) = (candidate.l, candidate.a, candidate.b);

    let C_avg = (a1.hypot(b1) + a2.hypot(b2)) / 2.0;
    let C_avg7 = C_avg.powi(7);
    let G = 0.5 * (1.0 - (C_avg7 / (C_avg7 + (25.0 as Float).powi(7))).sqrt());

    let a1p = a1 * (1.0 + G);
    let a2p = a2 * (1.0 + G);
    let C1p = a1p.hypot(b1);
    let C2p = a2p.hypot(b2);

    let hue = |b: Float, a: Float| {
        if b == 0.0 && a == 0.0 {
            0.0
        } else {
            b.atan2(a).to_degrees().rem_euclid(360.0)
        }
    };
    let h1p = hue(b1, a1p);
    let h2p = hue(b2, a2p);

    let ΔLp = L2 - L1;
    let ΔCp = C2p - C1p;
    let Δhp = if C1p * C2p == 0.0 {
        0.0
    } else if (h2p - h1p).abs() <= 180.0 {
        h2p - h1p
    } else if 180.0 < h2p - h1p {
        h2p - h1p - 360.0
    } else {
        h2p - h1p + 360.0
    };
    let ΔHp = 2.0 * (C1p * C2p).sqrt() * (Δhp.to_radians() / 2.0).sin();

    let Lp = (L1 + L2) / 2.0;
    let Cp = (C1p + C2p) / 2.0;
    let hp = if C1p * C2p == 0.0 {
        h1p + h2p
    } else if (h1p - h2p).abs() <= 180.0 {
        (h1p + h2p) / 2.0
    } else if h1p + h2p < 360.0 {
        (h1p + h2p + 360.0) / 2.0
    } else {
        (h1p + h2p - 360.0) / 2.0
    };

    let T = 1.0 - 0.17 * (hp - 30.0).to_radians().cos()
        + 0.24 * (2.0 * hp).to_radians().cos()
        + 0.32 * (3.0 * hp + 6.0).to_radians().cos()
        - 0.20 * (4.0 * hp - 63.0).to_radians().cos();

    let Lp50 = (Lp - 50.0).powi(2);
    let SL = 1.0 + (0.015 * Lp50) / (20.0 + Lp50).sqrt();
    let SC = 1.0 + 0.045 * Cp;
    let SH = 1.0 + 0.015 * Cp * T;

    let Δθ = 30.0 * (-((hp - 275.0) / 25.0).powi(2)).exp();
    let Cp7 = Cp.powi(7);
    let RC = 2.0 * (Cp7 / (Cp7 + (25.0 as Float).powi(7))).sqrt();
    let RT = -RC * (2.0 * Δθ).to_radians().sin();

    let (l, c, h) = (ΔLp / SL, ΔCp / SC, ΔHp / SH);
    (l * l + c * c + h * h + RT * c * h).max(0.0).sqrt()
}
