use smallvec::SmallVec;

use crate::foundation::{
    error::{ReelError, ReelResult},
    math::lerp,
};

/// One vertex of a piecewise-linear curve. Serialized as `[at, value]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Breakpoint {
    pub at: f64,
    pub value: f64,
}

impl Breakpoint {
    pub const fn new(at: f64, value: f64) -> Self {
        Self { at, value }
    }
}

impl From<(f64, f64)> for Breakpoint {
    fn from((at, value): (f64, f64)) -> Self {
        Self { at, value }
    }
}

impl From<Breakpoint> for (f64, f64) {
    fn from(b: Breakpoint) -> Self {
        (b.at, b.value)
    }
}

/// Piecewise-linear function over an ordered breakpoint list.
///
/// Inputs before the first breakpoint take the first value, inputs past the last take the
/// last value; anything between is interpolated linearly between the bracketing pair.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<Breakpoint>", into = "Vec<Breakpoint>")]
pub struct Curve {
    points: SmallVec<[Breakpoint; 4]>,
}

impl Curve {
    pub fn new(points: impl IntoIterator<Item = Breakpoint>) -> ReelResult<Self> {
        let points: SmallVec<[Breakpoint; 4]> = points.into_iter().collect();
        if points.is_empty() {
            return Err(ReelError::validation("curve needs at least one breakpoint"));
        }
        if points
            .iter()
            .any(|p| !p.at.is_finite() || !p.value.is_finite())
        {
            return Err(ReelError::validation("curve breakpoints must be finite"));
        }
        if !points.windows(2).all(|w| w[0].at <= w[1].at) {
            return Err(ReelError::validation(
                "curve breakpoints must be sorted by position",
            ));
        }
        Ok(Self { points })
    }

    /// Curve from `(at, value)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> ReelResult<Self> {
        Self::new(pairs.iter().copied().map(Breakpoint::from))
    }

    /// Curve from a compile-time table that is known to be sorted and finite.
    pub(crate) fn from_table(pairs: &[(f64, f64)]) -> Self {
        debug_assert!(pairs.windows(2).all(|w| w[0].0 <= w[1].0));
        Self {
            points: pairs.iter().copied().map(Breakpoint::from).collect(),
        }
    }

    pub fn points(&self) -> &[Breakpoint] {
        &self.points
    }

    /// First and last breakpoint positions.
    pub fn domain(&self) -> (f64, f64) {
        // `new` guarantees at least one point.
        let first = self.points[0].at;
        let last = self.points[self.points.len() - 1].at;
        (first, last)
    }

    pub fn sample(&self, x: f64) -> f64 {
        let points = &self.points;
        if x.is_nan() {
            return points[0].value;
        }
        let idx = points.partition_point(|p| p.at <= x);
        if idx == 0 {
            return points[0].value;
        }
        if idx >= points.len() {
            return points[points.len() - 1].value;
        }

        let a = points[idx - 1];
        let b = points[idx];
        let denom = b.at - a.at;
        if denom <= 0.0 {
            return a.value;
        }
        lerp(a.value, b.value, (x - a.at) / denom)
    }
}

impl TryFrom<Vec<Breakpoint>> for Curve {
    type Error = ReelError;

    fn try_from(points: Vec<Breakpoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<Curve> for Vec<Breakpoint> {
    fn from(c: Curve) -> Self {
        c.points.into_vec()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/curve.rs"]
mod tests;
