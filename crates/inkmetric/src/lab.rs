//! CIELAB colors.

use serde::{Deserialize, Serialize};

use crate::core::Sum;
use crate::Float;

/// CIE's ϵ = 216/24389 for the lightness function.
const EPSILON: Float = 216.0 / 24389.0;

/// CIE's κ = 24389/27 for the lightness function.
const KAPPA: Float = 24389.0 / 27.0;

/// A CIELAB color.
///
/// Lightness L* nominally ranges `0..=100`, whereas a* and b* are unbounded
/// though typically within `-150..=150`. Lab is both the terminal
/// representation of a measured color and the unit of perceptual comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Lab {
    #[serde(alias = "L")]
    pub l: Float,
    pub a: Float,
    pub b: Float,
}

impl Lab {
    /// Create a new Lab color.
    pub const fn new(l: Float, a: Float, b: Float) -> Self {
        Self { l, a, b }
    }

    /// Determine whether all three coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.l.is_finite() && self.a.is_finite() && self.b.is_finite()
    }

    /// Convert tristimulus values to Lab relative to the given white.
    ///
    /// Both arguments must use the same scale. If any white component is zero,
    /// the result is not finite; callers check the white first.
    #[allow(non_snake_case)]
    pub fn from_xyz(xyz: [Float; 3], white: [Float; 3]) -> Self {
        #[inline]
        fn f(t: Float) -> Float {
            if EPSILON < t {
                t.cbrt()
            } else {
                KAPPA.mul_add(t, 16.0) / 116.0
            }
        }

        let [X, Y, Z] = xyz;
        let [Xn, Yn, Zn] = white;
        let (fx, fy, fz) = (f(X / Xn), f(Y / Yn), f(Z / Zn));

        Self {
            l: fy.mul_add(116.0, -16.0),
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }

    /// Convert to the auxiliary space of ISO 20654.
    ///
    /// The spot color tone value is the Euclidean distance ratio in this space
    /// with coordinates `Lx = L + 116a/500`, `Ly = L`, and `Lz = L - 116b/200`.
    pub fn to_auxiliary(&self) -> [Float; 3] {
        [
            self.l + 116.0 * self.a / 500.0,
            self.l,
            self.l - 116.0 * self.b / 200.0,
        ]
    }

    /// Compute the componentwise mean of the given colors, if there are any.
    pub fn centroid<'a, I>(colors: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Lab>,
    {
        let mut sums = [Sum::new(), Sum::new(), Sum::new()];
        for color in colors {
            sums[0] += color.l;
            sums[1] += color.a;
            sums[2] += color.b;
        }

        let [l, a, b] = sums;
        Some(Self::new(l.mean()?, a.mean()?, b.mean()?))
    }
}

impl From<[Float; 3]> for Lab {
    fn from(value: [Float; 3]) -> Self {
        let [l, a, b] = value;
        Self::new(l, a, b)
    }
}

impl From<Lab> for [Float; 3] {
    fn from(value: Lab) -> Self {
        [value.l, value.a, value.b]
    }
}

#[cfg(test)]
mod test {
    use super::Lab;
    use crate::core::assert_close;

    #[test]
    fn test_from_xyz() {
        let white = [95.047, 100.0, 108.883];
        let lab = Lab::from_xyz(white, white);
        assert_close!(lab.l, 100.0);
        assert_close!(lab.a, 0.0);
        assert_close!(lab.b, 0.0);

        let lab = Lab::from_xyz([0.0, 0.0, 0.0], white);
        assert_close!(lab.l, 0.0);

        // Mid gray with Y = 18.42 has L* close to 50.
        let lab = Lab::from_xyz([17.5064, 18.4187, 20.0548], white);
        assert_close!(lab.l, 50.0, 1e-3);
        assert_close!(lab.a, 0.0, 1e-2);
        assert_close!(lab.b, 0.0, 1e-2);
    }

    #[test]
    fn test_auxiliary() {
        let [lx, ly, lz] = Lab::new(50.0, 25.0, -40.0).to_auxiliary();
        assert_close!(lx, 55.8);
        assert_close!(ly, 50.0);
        assert_close!(lz, 73.2);
    }

    #[test]
    fn test_centroid() {
        assert_eq!(Lab::centroid(&[] as &[Lab]), None);

        let colors = [Lab::new(40.0, 10.0, -10.0), Lab::new(60.0, -10.0, 30.0)];
        assert_eq!(Lab::centroid(&colors), Some(Lab::new(50.0, 0.0, 10.0)));
    }

    #[test]
    fn test_serde() -> Result<(), serde_json::Error> {
        let lab: Lab = serde_json::from_str(r#"{"L": 52.5, "a": -3.0, "b": 12.25}"#)?;
        assert_eq!(lab, Lab::new(52.5, -3.0, 12.25));
        Ok(())
    }
}
