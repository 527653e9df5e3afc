use crate::Float;

/// A floating point accumulator.
///
/// Unlike plain summation with the `+` operator, this struct minimizes the
/// cumulative error by using [Kahan's algorithm with Neumaier's
/// improvements](https://en.wikipedia.org/wiki/Kahan_summation_algorithm).
/// Densities are logarithms of weighted means over up to 44 ordinates, so the
/// compensation keeps the last digits stable regardless of summation order.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Sum {
    sum: Float,
    compensation: Float,
    count: usize,
}

impl Sum {
    /// Create a new, empty accumulator.
    pub const fn new() -> Self {
        Self {
            sum: 0.0,
            compensation: 0.0,
            count: 0,
        }
    }

    /// Get the compensated total.
    #[inline]
    pub fn value(&self) -> Float {
        self.sum + self.compensation
    }

    /// Get the arithmetic mean of the accumulated terms, if there are any.
    #[inline]
    pub fn mean(&self) -> Option<Float> {
        if self.count == 0 {
            None
        } else {
            Some(self.value() / self.count as Float)
        }
    }
}

impl std::ops::AddAssign<Float> for Sum {
    fn add_assign(&mut self, rhs: Float) {
        let t = self.sum + rhs;
        if rhs.abs() < self.sum.abs() {
            self.compensation += (self.sum - t) + rhs;
        } else {
            self.compensation += (rhs - t) + self.sum;
        }
        self.sum = t;
        self.count += 1;
    }
}

impl FromIterator<Float> for Sum {
    fn from_iter<I: IntoIterator<Item = Float>>(iter: I) -> Self {
        let mut sum = Self::new();
        for value in iter {
            sum += value;
        }
        sum
    }
}

// ----------------------------------------------------------------------------------------------------------

/// Linearly interpolate between `(x0, y0)` and `(x1, y1)` at `x`.
#[inline]
pub(crate) fn lerp(x: Float, x0: Float, y0: Float, x1: Float, y1: Float) -> Float {
    if x1 == x0 {
        return y0;
    }
    let t = (x - x0) / (x1 - x0);
    t.mul_add(y1 - y0, y0)
}
