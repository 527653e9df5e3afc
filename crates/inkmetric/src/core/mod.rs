mod math;

pub(crate) use math::{lerp, Sum};

/// Test macro for asserting that two floating point numbers are within the
/// given tolerance of each other.
///
/// # Panics
///
/// This macro panics if the absolute difference exceeds the tolerance. Its
/// message places the numbers below each other for easy comparability.
#[cfg(test)]
macro_rules! assert_close {
    ($f1:expr, $f2:expr, $tolerance:expr $(,)?) => {
        let (f1, f2, tolerance) = ($f1, $f2, $tolerance);
        assert!(
            (f1 - f2).abs() <= tolerance,
            "quantities differ by more than {}:\n{:?}\n{:?}",
            tolerance,
            f1,
            f2
        );
    };
    ($f1:expr, $f2:expr $(,)?) => {
        $crate::core::assert_close!($f1, $f2, 1e-9)
    };
}

#[cfg(test)]
pub(crate) use assert_close;
