//! Construction of the regular output grid.

/// Order of the values in a coordinate array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increasing,
    Decreasing,
}

/// Determine whether `values` are strictly increasing or strictly decreasing.
///
/// Returns `None` if neither is true (including if any value is NaN). Arrays
/// of zero or one values count as increasing.
pub fn direction(values: &[f64]) -> Option<Direction> {
    if values.windows(2).all(|w| w[0] < w[1]) {
        Some(Direction::Increasing)
    } else if values.windows(2).all(|w| w[0] > w[1]) {
        Some(Direction::Decreasing)
    } else {
        None
    }
}

/// Minimum and maximum of `values`, ignoring NaNs. `None` if there are no
/// non-NaN values.
pub fn finite_bounds(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Evenly spaced values from `start` (inclusive) towards `stop` (exclusive).
///
/// The number of values is `ceil((stop - start) / step)`, and value `i` is
/// `start + i * step`, so that accumulated rounding does not drift the grid.
/// As with other half-open ranges computed in floating point, a value that
/// rounds to `stop` itself may be included when `stop - start` is an exact
/// multiple of `step` in decimal but not in binary. An empty vector is returned
/// if `stop <= start`.
///
/// # Panics
/// If `step` is not positive.
pub fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    assert!(step > 0.0, "arange step must be positive");
    let n = ((stop - start) / step).ceil();
    if !n.is_finite() || n <= 0.0 {
        return vec![];
    }
    (0..n as usize).map(|i| start + i as f64 * step).collect()
}

/// The new values for one spatial coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetAxis {
    pub name: String,
    pub values: Vec<f64>,
}

impl TargetAxis {
    /// Build the regular axis spanning the observed range of `source`, with
    /// spacing `step`. Returns `None` if `source` has no non-NaN values.
    pub fn spanning(name: &str, source: &[f64], step: f64) -> Option<Self> {
        let (lo, hi) = finite_bounds(source)?;
        Some(Self {
            name: name.to_string(),
            values: arange(lo, hi, step),
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_arange() {
        let v = arange(-1.0, 1.0, 0.5);
        assert_eq!(v.len(), 4);
        for (a, b) in v.iter().zip([-1.0, -0.5, 0.0, 0.5]) {
            assert_abs_diff_eq!(*a, b);
        }

        assert!(arange(1.0, 1.0, 0.1).is_empty());
        assert!(arange(2.0, 1.0, 0.1).is_empty());
    }

    #[test]
    fn test_arange_merra_lon() {
        // MERRA-2 longitudes go from -180 to 179.375 in 0.625 degree steps
        let v = arange(-180.0, 179.375, 0.1);
        assert_eq!(v.len(), 3594);
        assert_abs_diff_eq!(v[0], -180.0);
        assert_abs_diff_eq!(v[3593], 179.3, epsilon = 1e-9);
    }

    #[test]
    fn test_direction() {
        assert_eq!(direction(&[1.0, 2.0, 3.0]), Some(Direction::Increasing));
        assert_eq!(direction(&[3.0, 2.0, 1.0]), Some(Direction::Decreasing));
        assert_eq!(direction(&[1.0, 1.0, 2.0]), None);
        assert_eq!(direction(&[1.0, f64::NAN, 2.0]), None);
        assert_eq!(direction(&[1.0]), Some(Direction::Increasing));
    }

    #[test]
    fn test_target_axis() {
        let axis = TargetAxis::spanning("lat", &[40.0, 39.5, 39.0, f64::NAN], 0.1).unwrap();
        assert_eq!(axis.name, "lat");
        assert_eq!(axis.len(), 10);
        assert_abs_diff_eq!(axis.values[0], 39.0);
        assert_abs_diff_eq!(axis.values[9], 39.9, epsilon = 1e-9);

        assert!(TargetAxis::spanning("lat", &[f64::NAN], 0.1).is_none());
    }
}
