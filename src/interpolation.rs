//! One dimensional interpolation methods and the driver that applies them
//! along one axis of an N-dimensional array.
//!
//! Every method works on strictly increasing source coordinates; the public
//! entry points ([`InterpolationMethod::interp1d`] and [`interp_along_axis`])
//! accept decreasing coordinates as well and flip them first. Output points
//! outside the range of the source coordinates are always NaN, never
//! extrapolated.
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};

use crate::grid::{direction, Direction};

#[derive(Debug, thiserror::Error)]
pub enum InterpolationError {
    #[error("Input arrays were different lengths (x.len() = {x_len}, y.len() = {y_len})")]
    InputLengthMismatch { x_len: usize, y_len: usize },
    #[error(
        "Input arrays were too short, needed at least {req_len} elements but got only {actual_len}"
    )]
    InputTooShort { req_len: usize, actual_len: usize },
    #[error("Input coordinates must be strictly increasing or strictly decreasing")]
    NotMonotonic,
    #[error("Axis {axis} is out of bounds for an array with {ndim} dimensions")]
    BadAxis { axis: usize, ndim: usize },
    #[error("Spline system could not be solved (zero pivot in row {row})")]
    SingularSystem { row: usize },
}

/// The interpolation methods that can be chosen, in menu order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum InterpolationKind {
    Linear,
    Nearest,
    Cubic,
    Quadratic,
    Slinear,
    Polynomial,
    Spline,
    Pchip,
    Akima,
    Cubicspline,
    FromDerivatives,
}

impl InterpolationKind {
    /// Name used for the output subdirectory and in messages.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Create the interpolator for this method. `polynomial_order` is only
    /// used by [`InterpolationKind::Polynomial`].
    pub fn interpolator(&self, polynomial_order: usize) -> Box<dyn InterpolationMethod> {
        match self {
            InterpolationKind::Linear | InterpolationKind::Slinear => Box::new(LinearInterp),
            InterpolationKind::Nearest => Box::new(NearestInterp),
            InterpolationKind::Cubic | InterpolationKind::Cubicspline => {
                Box::new(CubicSplineInterp::new(SplineBoundary::NotAKnot))
            }
            InterpolationKind::Spline => Box::new(CubicSplineInterp::new(SplineBoundary::Natural)),
            InterpolationKind::Quadratic => Box::new(LagrangeInterp::new(2)),
            InterpolationKind::Polynomial => Box::new(LagrangeInterp::new(polynomial_order)),
            InterpolationKind::Pchip => Box::new(HermiteInterp::new(HermiteSlopes::Pchip)),
            InterpolationKind::Akima => Box::new(HermiteInterp::new(HermiteSlopes::Akima)),
            InterpolationKind::FromDerivatives => {
                Box::new(HermiteInterp::new(HermiteSlopes::CentredDifference))
            }
        }
    }
}

pub trait InterpolationMethod {
    /// The minimum number of input points this method needs.
    fn min_len(&self) -> usize;

    /// Evaluate the interpolant through (`input_x`, `input_y`) at each of
    /// `output_x`, storing the results in `output_y`.
    ///
    /// Callers guarantee that `input_x` is strictly increasing, that `input_x`
    /// and `input_y` have the same length of at least [`Self::min_len`], and that
    /// `output_x` and `output_y` have the same length. Output points outside
    /// the input domain may be given any value; the callers replace them with NaN.
    fn interp_sorted(
        &self,
        input_x: &[f64],
        input_y: &[f64],
        output_x: &[f64],
        output_y: &mut [f64],
    ) -> Result<(), InterpolationError>;

    /// Interpolate one series to new coordinates.
    fn interp1d(
        &self,
        input_x: &[f64],
        input_y: &[f64],
        output_x: &[f64],
    ) -> Result<Vec<f64>, InterpolationError> {
        self.check_1d_inputs(input_x, input_y)?;
        let (x, y) = match direction(input_x) {
            Some(Direction::Increasing) => (input_x.to_vec(), input_y.to_vec()),
            Some(Direction::Decreasing) => (
                input_x.iter().rev().copied().collect(),
                input_y.iter().rev().copied().collect(),
            ),
            None => return Err(InterpolationError::NotMonotonic),
        };

        let mut output_y = vec![f64::NAN; output_x.len()];
        self.interp_sorted(&x, &y, output_x, &mut output_y)?;
        mask_out_of_domain(&x, output_x, &mut output_y);
        Ok(output_y)
    }

    fn check_1d_inputs(&self, input_x: &[f64], input_y: &[f64]) -> Result<(), InterpolationError> {
        if input_x.len() != input_y.len() {
            return Err(InterpolationError::InputLengthMismatch {
                x_len: input_x.len(),
                y_len: input_y.len(),
            });
        }

        // Now we know both are the same length, so only need to test 1
        if input_x.len() < self.min_len() {
            return Err(InterpolationError::InputTooShort {
                req_len: self.min_len(),
                actual_len: input_x.len(),
            });
        }

        Ok(())
    }
}

/// Interpolate `data` along `axis` from coordinates `input_x` to `output_x`.
///
/// The result has the same shape as `data` except along `axis`, which has
/// `output_x.len()` elements. Each 1D lane along `axis` is interpolated
/// independently, so a NaN only affects the lanes it appears in.
pub fn interp_along_axis(
    data: ArrayViewD<f64>,
    axis: usize,
    input_x: &[f64],
    output_x: &[f64],
    method: &dyn InterpolationMethod,
) -> Result<ArrayD<f64>, InterpolationError> {
    if axis >= data.ndim() {
        return Err(InterpolationError::BadAxis {
            axis,
            ndim: data.ndim(),
        });
    }

    let ax = Axis(axis);
    if data.len_of(ax) != input_x.len() {
        return Err(InterpolationError::InputLengthMismatch {
            x_len: input_x.len(),
            y_len: data.len_of(ax),
        });
    }
    if input_x.len() < method.min_len() {
        return Err(InterpolationError::InputTooShort {
            req_len: method.min_len(),
            actual_len: input_x.len(),
        });
    }

    let mut data = data;
    let x = match direction(input_x) {
        Some(Direction::Increasing) => input_x.to_vec(),
        Some(Direction::Decreasing) => {
            data.invert_axis(ax);
            input_x.iter().rev().copied().collect()
        }
        None => return Err(InterpolationError::NotMonotonic),
    };

    let in_domain = output_x
        .iter()
        .map(|&xi| xi >= x[0] && xi <= x[x.len() - 1])
        .collect::<Vec<_>>();

    let mut out_shape = data.shape().to_vec();
    out_shape[axis] = output_x.len();
    let mut out = ArrayD::from_elem(IxDyn(&out_shape), f64::NAN);

    // Lanes are not necessarily contiguous, so copy through buffers
    let mut ybuf = vec![0.0; x.len()];
    let mut obuf = vec![0.0; output_x.len()];
    for (lane_in, mut lane_out) in data.lanes(ax).into_iter().zip(out.lanes_mut(ax)) {
        for (b, v) in ybuf.iter_mut().zip(lane_in.iter()) {
            *b = *v;
        }
        method.interp_sorted(&x, &ybuf, output_x, &mut obuf)?;
        for ((o, v), ok) in lane_out.iter_mut().zip(obuf.iter()).zip(in_domain.iter()) {
            *o = if *ok { *v } else { f64::NAN };
        }
    }

    Ok(out)
}

fn mask_out_of_domain(x: &[f64], output_x: &[f64], output_y: &mut [f64]) {
    let (left, right) = (x[0], x[x.len() - 1]);
    for (xi, yi) in output_x.iter().zip(output_y.iter_mut()) {
        if *xi < left || *xi > right || xi.is_nan() {
            *yi = f64::NAN;
        }
    }
}

/// Index `i` of the interval `x[i]..=x[i+1]` containing `xi`, clamped to the
/// first and last intervals. `x` must have at least two elements.
fn interval_index(x: &[f64], xi: f64) -> usize {
    let i = x.partition_point(|&v| v <= xi);
    i.saturating_sub(1).min(x.len() - 2)
}

/// Piecewise linear interpolation, for both "linear" and "slinear" (a first
/// order spline passes through the same line segments).
pub struct LinearInterp;

impl InterpolationMethod for LinearInterp {
    fn min_len(&self) -> usize {
        2
    }

    fn interp_sorted(
        &self,
        input_x: &[f64],
        input_y: &[f64],
        output_x: &[f64],
        output_y: &mut [f64],
    ) -> Result<(), InterpolationError> {
        let values =
            interp::interp_slice(input_x, input_y, output_x, &interp::InterpMode::Extrapolate);
        output_y.copy_from_slice(&values);
        Ok(())
    }
}

/// Take the value of the closest input point. Ties go to the lower coordinate.
pub struct NearestInterp;

impl InterpolationMethod for NearestInterp {
    fn min_len(&self) -> usize {
        1
    }

    fn interp_sorted(
        &self,
        input_x: &[f64],
        input_y: &[f64],
        output_x: &[f64],
        output_y: &mut [f64],
    ) -> Result<(), InterpolationError> {
        if input_x.len() == 1 {
            output_y.fill(input_y[0]);
            return Ok(());
        }

        for (xi, yi) in output_x.iter().zip(output_y.iter_mut()) {
            let i = interval_index(input_x, *xi);
            let to_left = (*xi - input_x[i]).abs();
            let to_right = (input_x[i + 1] - *xi).abs();
            *yi = if to_right < to_left {
                input_y[i + 1]
            } else {
                input_y[i]
            };
        }
        Ok(())
    }
}

/// Piecewise polynomial through the `order + 1` input points surrounding each
/// output point. "quadratic" uses order 2.
pub struct LagrangeInterp {
    order: usize,
}

impl LagrangeInterp {
    pub fn new(order: usize) -> Self {
        Self {
            order: order.max(1),
        }
    }

    /// First index of the `order + 1` point window used for interval `i`.
    fn window_start(&self, i: usize, n: usize) -> usize {
        let npts = self.order + 1;
        let start = i.saturating_sub((self.order - 1) / 2);
        start.min(n - npts)
    }
}

impl InterpolationMethod for LagrangeInterp {
    fn min_len(&self) -> usize {
        self.order + 1
    }

    fn interp_sorted(
        &self,
        input_x: &[f64],
        input_y: &[f64],
        output_x: &[f64],
        output_y: &mut [f64],
    ) -> Result<(), InterpolationError> {
        let n = input_x.len();
        for (xi, yi) in output_x.iter().zip(output_y.iter_mut()) {
            let start = self.window_start(interval_index(input_x, *xi), n);
            let xs = &input_x[start..=start + self.order];
            let ys = &input_y[start..=start + self.order];

            let mut total = 0.0;
            for (j, (xj, yj)) in xs.iter().zip(ys).enumerate() {
                let basis = xs
                    .iter()
                    .enumerate()
                    .filter(|(m, _)| *m != j)
                    .fold(1.0, |acc, (_, xm)| acc * (*xi - xm) / (xj - xm));
                total += yj * basis;
            }
            *yi = total;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplineBoundary {
    /// Zero second derivative at both ends
    Natural,
    /// Continuous third derivative at the second and second to last points
    NotAKnot,
}

/// Cubic spline interpolation with either natural or not-a-knot end conditions.
pub struct CubicSplineInterp {
    boundary: SplineBoundary,
}

impl CubicSplineInterp {
    pub fn new(boundary: SplineBoundary) -> Self {
        Self { boundary }
    }

    /// Compute the second derivative of the spline at each input point.
    fn second_derivatives(&self, x: &[f64], y: &[f64]) -> Result<Vec<f64>, InterpolationError> {
        let n = x.len();
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

        // Unknowns are M_1 ..= M_{n-2}; row k of the system is for M_{k+1}
        let m = n - 2;
        let mut sub = vec![0.0; m];
        let mut diag = vec![0.0; m];
        let mut sup = vec![0.0; m];
        let mut rhs = vec![0.0; m];
        for k in 0..m {
            let i = k + 1;
            sub[k] = h[i - 1];
            diag[k] = 2.0 * (h[i - 1] + h[i]);
            sup[k] = h[i];
            rhs[k] = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
        }

        if self.boundary == SplineBoundary::NotAKnot {
            // Eliminate M_0 = ((h0 + h1) M_1 - h0 M_2) / h1 from the first row
            let (h0, h1) = (h[0], h[1]);
            diag[0] += h0 * (h0 + h1) / h1;
            sup[0] -= h0 * h0 / h1;

            // and M_{n-1} = ((a + b) M_{n-2} - b M_{n-3}) / a from the last,
            // with a = h_{n-3}, b = h_{n-2}
            let (a, b) = (h[n - 3], h[n - 2]);
            diag[m - 1] += b * (a + b) / a;
            sub[m - 1] -= b * b / a;
        }

        let inner = solve_tridiagonal(&sub, &diag, &sup, &rhs)?;

        let mut second = vec![0.0; n];
        second[1..n - 1].copy_from_slice(&inner);
        if self.boundary == SplineBoundary::NotAKnot {
            let (h0, h1) = (h[0], h[1]);
            second[0] = ((h0 + h1) * second[1] - h0 * second[2]) / h1;
            let (a, b) = (h[n - 3], h[n - 2]);
            second[n - 1] = ((a + b) * second[n - 2] - b * second[n - 3]) / a;
        }
        Ok(second)
    }
}

impl InterpolationMethod for CubicSplineInterp {
    fn min_len(&self) -> usize {
        match self.boundary {
            SplineBoundary::Natural => 3,
            SplineBoundary::NotAKnot => 4,
        }
    }

    fn interp_sorted(
        &self,
        input_x: &[f64],
        input_y: &[f64],
        output_x: &[f64],
        output_y: &mut [f64],
    ) -> Result<(), InterpolationError> {
        let m = self.second_derivatives(input_x, input_y)?;
        for (xi, yi) in output_x.iter().zip(output_y.iter_mut()) {
            let i = interval_index(input_x, *xi);
            let h = input_x[i + 1] - input_x[i];
            let a = input_x[i + 1] - *xi;
            let b = *xi - input_x[i];
            *yi = m[i] * a.powi(3) / (6.0 * h)
                + m[i + 1] * b.powi(3) / (6.0 * h)
                + (input_y[i] / h - m[i] * h / 6.0) * a
                + (input_y[i + 1] / h - m[i + 1] * h / 6.0) * b;
        }
        Ok(())
    }
}

/// Thomas algorithm for a tridiagonal system. `sub[0]` and `sup[n-1]` are ignored.
fn solve_tridiagonal(
    sub: &[f64],
    diag: &[f64],
    sup: &[f64],
    rhs: &[f64],
) -> Result<Vec<f64>, InterpolationError> {
    let n = diag.len();
    let mut c = vec![0.0; n];
    let mut d = vec![0.0; n];

    for i in 0..n {
        let (prev_c, prev_d, a) = if i == 0 {
            (0.0, 0.0, 0.0)
        } else {
            (c[i - 1], d[i - 1], sub[i])
        };
        let denom = diag[i] - a * prev_c;
        if denom.abs() < f64::EPSILON * diag[i].abs().max(1.0) {
            return Err(InterpolationError::SingularSystem { row: i });
        }
        c[i] = sup[i] / denom;
        d[i] = (rhs[i] - a * prev_d) / denom;
    }

    let mut solution = vec![0.0; n];
    for i in (0..n).rev() {
        solution[i] = if i == n - 1 {
            d[i]
        } else {
            d[i] - c[i] * solution[i + 1]
        };
    }
    Ok(solution)
}

/// How the derivative at each input point is estimated for [`HermiteInterp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HermiteSlopes {
    /// Fritsch-Carlson monotone slopes; does not overshoot the data.
    Pchip,
    /// Akima's weighted slopes, which are less affected by outliers.
    Akima,
    /// Centred finite differences, one sided at the ends.
    CentredDifference,
}

/// Piecewise cubic Hermite interpolation, with the slopes estimated from the data.
pub struct HermiteInterp {
    slopes: HermiteSlopes,
}

impl HermiteInterp {
    pub fn new(slopes: HermiteSlopes) -> Self {
        Self { slopes }
    }

    fn derivatives(&self, x: &[f64], y: &[f64]) -> Vec<f64> {
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let delta: Vec<f64> = y
            .windows(2)
            .zip(h.iter())
            .map(|(w, hk)| (w[1] - w[0]) / hk)
            .collect();

        match self.slopes {
            HermiteSlopes::Pchip => pchip_slopes(&h, &delta),
            HermiteSlopes::Akima => akima_slopes(&delta),
            HermiteSlopes::CentredDifference => centred_slopes(x, y, &delta),
        }
    }
}

impl InterpolationMethod for HermiteInterp {
    fn min_len(&self) -> usize {
        match self.slopes {
            HermiteSlopes::Akima => 3,
            _ => 2,
        }
    }

    fn interp_sorted(
        &self,
        input_x: &[f64],
        input_y: &[f64],
        output_x: &[f64],
        output_y: &mut [f64],
    ) -> Result<(), InterpolationError> {
        let d = self.derivatives(input_x, input_y);
        for (xi, yi) in output_x.iter().zip(output_y.iter_mut()) {
            let i = interval_index(input_x, *xi);
            let h = input_x[i + 1] - input_x[i];
            let t = (*xi - input_x[i]) / h;
            let t2 = t * t;
            let t3 = t2 * t;
            let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
            let h10 = t3 - 2.0 * t2 + t;
            let h01 = -2.0 * t3 + 3.0 * t2;
            let h11 = t3 - t2;
            *yi = h00 * input_y[i] + h10 * h * d[i] + h01 * input_y[i + 1] + h11 * h * d[i + 1];
        }
        Ok(())
    }
}

fn pchip_slopes(h: &[f64], delta: &[f64]) -> Vec<f64> {
    let n = h.len() + 1;
    if n == 2 {
        return vec![delta[0], delta[0]];
    }

    let mut d = vec![0.0; n];
    for k in 1..n - 1 {
        if delta[k - 1] * delta[k] <= 0.0 {
            d[k] = 0.0;
        } else {
            let w1 = 2.0 * h[k] + h[k - 1];
            let w2 = h[k] + 2.0 * h[k - 1];
            d[k] = (w1 + w2) / (w1 / delta[k - 1] + w2 / delta[k]);
        }
    }

    d[0] = pchip_end_slope(h[0], h[1], delta[0], delta[1]);
    d[n - 1] = pchip_end_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);
    d
}

/// Three point end slope, limited so the end interval stays monotone.
fn pchip_end_slope(h0: f64, h1: f64, delta0: f64, delta1: f64) -> f64 {
    // Unlike f64::signum, zero has its own sign here
    fn sign(v: f64) -> i8 {
        if v > 0.0 {
            1
        } else if v < 0.0 {
            -1
        } else {
            0
        }
    }

    let d = ((2.0 * h0 + h1) * delta0 - h0 * delta1) / (h0 + h1);
    if sign(d) != sign(delta0) {
        0.0
    } else if sign(delta0) != sign(delta1) && d.abs() > 3.0 * delta0.abs() {
        3.0 * delta0
    } else {
        d
    }
}

fn akima_slopes(delta: &[f64]) -> Vec<f64> {
    let n = delta.len() + 1;
    // Two extra secant slopes are extrapolated linearly off each end, so
    // mm[k + 2] is the secant slope of interval k for k in -2..=n
    let mut mm = vec![0.0; n + 3];
    mm[2..n + 1].copy_from_slice(delta);
    mm[1] = 2.0 * mm[2] - mm[3];
    mm[0] = 2.0 * mm[1] - mm[2];
    mm[n + 1] = 2.0 * mm[n] - mm[n - 1];
    mm[n + 2] = 2.0 * mm[n + 1] - mm[n];

    (0..n)
        .map(|i| {
            let w1 = (mm[i + 3] - mm[i + 2]).abs();
            let w2 = (mm[i + 1] - mm[i]).abs();
            if w1 + w2 == 0.0 {
                0.5 * (mm[i + 1] + mm[i + 2])
            } else {
                (w1 * mm[i + 1] + w2 * mm[i + 2]) / (w1 + w2)
            }
        })
        .collect()
}

fn centred_slopes(x: &[f64], y: &[f64], delta: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut d = vec![0.0; n];
    d[0] = delta[0];
    d[n - 1] = delta[n - 2];
    for i in 1..n - 1 {
        d[i] = (y[i + 1] - y[i - 1]) / (x[i + 1] - x[i - 1]);
    }
    d
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array3};
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    fn assert_all_close(actual: &[f64], expected: &[f64], epsilon: f64) {
        assert_eq!(actual.len(), expected.len(), "lengths differ");
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            if e.is_nan() {
                assert!(a.is_nan(), "element {i}: expected NaN, got {a}");
            } else {
                assert_abs_diff_eq!(*a, *e, epsilon = epsilon);
            }
        }
    }

    #[test]
    fn test_names() {
        let names: Vec<&str> = InterpolationKind::iter().map(|k| k.name()).collect();
        assert_eq!(
            names,
            [
                "linear",
                "nearest",
                "cubic",
                "quadratic",
                "slinear",
                "polynomial",
                "spline",
                "pchip",
                "akima",
                "cubicspline",
                "from_derivatives"
            ]
        );
        assert_eq!(
            InterpolationKind::from_str("from_derivatives").unwrap(),
            InterpolationKind::FromDerivatives
        );
        assert_eq!(InterpolationKind::Cubicspline.to_string(), "cubicspline");
    }

    #[test]
    fn test_error_checks() {
        let interpolator = LinearInterp;

        let err = interpolator.interp1d(&[1.0], &[1.0, 1.0], &[2.0]).unwrap_err();
        match err {
            InterpolationError::InputLengthMismatch { x_len, y_len } => {
                assert_eq!(x_len, 1, "x_len in error is incorrect");
                assert_eq!(y_len, 2, "y_len in error is incorrect");
            }
            _ => panic!("Expected InputLengthMismatch error, did not get that"),
        }

        let err = interpolator.interp1d(&[1.0], &[1.0], &[2.0]).unwrap_err();
        match err {
            InterpolationError::InputTooShort {
                req_len,
                actual_len,
            } => {
                assert_eq!(req_len, 2, "req_len in error is incorrect");
                assert_eq!(actual_len, 1, "actual_len in error is incorrect");
            }
            _ => panic!("Expected InputTooShort error, did not get that"),
        }

        let err = interpolator
            .interp1d(&[1.0, 3.0, 2.0], &[1.0, 2.0, 3.0], &[2.0])
            .unwrap_err();
        assert!(matches!(err, InterpolationError::NotMonotonic));
    }

    #[test]
    fn test_linear() {
        let y = LinearInterp
            .interp1d(&[0.0, 1.0, 2.0], &[0.0, 10.0, 30.0], &[-0.5, 0.0, 0.25, 1.5, 2.0, 2.5])
            .unwrap();
        assert_all_close(&y, &[f64::NAN, 0.0, 2.5, 20.0, 30.0, f64::NAN], 1e-12);
    }

    #[test]
    fn test_descending_input() {
        let y = LinearInterp
            .interp1d(&[2.0, 1.0, 0.0], &[30.0, 10.0, 0.0], &[0.25, 1.5])
            .unwrap();
        assert_all_close(&y, &[2.5, 20.0], 1e-12);
    }

    #[test]
    fn test_nearest() {
        let y = NearestInterp
            .interp1d(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0], &[1.25, 1.5, 2.75, 3.5])
            .unwrap();
        assert_all_close(&y, &[2.0, 2.0, 6.0, f64::NAN], 0.0);
    }

    #[test]
    fn test_quadratic_reproduces_parabola() {
        let x: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v * v - 2.0 * v).collect();
        let out = [0.5, 2.3, 4.9];
        let expected: Vec<f64> = out.iter().map(|v| v * v - 2.0 * v).collect();
        let interp = InterpolationKind::Quadratic.interpolator(3);
        assert_all_close(&interp.interp1d(&x, &y, &out).unwrap(), &expected, 1e-10);
    }

    #[test]
    fn test_polynomial_order() {
        let x: Vec<f64> = (0..8).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|v| v.powi(3) - v).collect();
        let out: [f64; 3] = [0.1, 1.7, 3.4];
        let expected: Vec<f64> = out.iter().map(|v| v.powi(3) - v).collect();
        let interp = InterpolationKind::Polynomial.interpolator(3);
        assert_eq!(interp.min_len(), 4);
        assert_all_close(&interp.interp1d(&x, &y, &out).unwrap(), &expected, 1e-10);
    }

    #[test]
    fn test_not_a_knot_reproduces_cubic() {
        // A single cubic satisfies the not-a-knot conditions, so the spline must match it exactly
        let x = [0.0, 0.7, 1.5, 2.0, 3.1, 4.0];
        let f = |v: f64| 0.5 * v.powi(3) - v * v + 2.0;
        let y: Vec<f64> = x.iter().map(|&v| f(v)).collect();
        let out = [0.1, 1.0, 2.5, 3.9];
        let expected: Vec<f64> = out.iter().map(|&v| f(v)).collect();
        for kind in [InterpolationKind::Cubic, InterpolationKind::Cubicspline] {
            let interp = kind.interpolator(3);
            assert_all_close(&interp.interp1d(&x, &y, &out).unwrap(), &expected, 1e-9);
        }
    }

    #[test]
    fn test_natural_spline() {
        // Natural splines reproduce straight lines and pass through the knots
        let x = [0.0, 1.0, 2.0, 4.0];
        let y = [1.0, 3.0, 5.0, 9.0];
        let interp = InterpolationKind::Spline.interpolator(3);
        let out = interp.interp1d(&x, &y, &[0.5, 1.0, 3.0]).unwrap();
        assert_all_close(&out, &[2.0, 3.0, 7.0], 1e-12);

        // Symmetric data gives a symmetric curve with zero curvature at the ends
        let out = interp
            .interp1d(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0], &[0.5, 1.5])
            .unwrap();
        assert_abs_diff_eq!(out[0], out[1], epsilon = 1e-12);
        assert_abs_diff_eq!(out[0], 0.6875, epsilon = 1e-12);
    }

    #[test]
    fn test_pchip_monotone() {
        // A step shaped input must not overshoot with pchip
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.0, 0.0, 1.0, 1.0, 1.0];
        let out_x: Vec<f64> = (0..=40).map(|i| i as f64 * 0.1).collect();
        let out = InterpolationKind::Pchip
            .interpolator(3)
            .interp1d(&x, &y, &out_x)
            .unwrap();
        for v in out {
            assert!((0.0..=1.0).contains(&v), "pchip overshot: {v}");
        }
    }

    #[test]
    fn test_akima_flat_regions() {
        // Akima keeps flat stretches flat next to a jump
        let x = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let out = InterpolationKind::Akima
            .interpolator(3)
            .interp1d(&x, &y, &[0.5, 1.5, 3.5, 4.5])
            .unwrap();
        assert_all_close(&out, &[0.0, 0.0, 1.0, 1.0], 1e-12);
    }

    #[rstest]
    #[case(InterpolationKind::Linear)]
    #[case(InterpolationKind::Nearest)]
    #[case(InterpolationKind::Cubic)]
    #[case(InterpolationKind::Quadratic)]
    #[case(InterpolationKind::Slinear)]
    #[case(InterpolationKind::Polynomial)]
    #[case(InterpolationKind::Spline)]
    #[case(InterpolationKind::Pchip)]
    #[case(InterpolationKind::Akima)]
    #[case(InterpolationKind::Cubicspline)]
    #[case(InterpolationKind::FromDerivatives)]
    fn test_passes_through_knots(#[case] kind: InterpolationKind) {
        let x = [10.0, 10.5, 11.0, 11.5, 12.0, 12.5];
        let y = [3.0, -1.0, 4.0, 1.0, -5.0, 9.0];
        let interp = kind.interpolator(3);
        let out = interp.interp1d(&x, &y, &x).unwrap();
        assert_all_close(&out, &y, 1e-9);
    }

    #[test]
    fn test_along_axis() {
        // (time, lat, lon) = (2, 3, 2), linear in lat
        let mut data = Array3::<f64>::zeros((2, 3, 2));
        for ((t, j, i), v) in data.indexed_iter_mut() {
            *v = 100.0 * t as f64 + 10.0 * j as f64 + i as f64;
        }
        let lat = [0.0, 1.0, 2.0];
        let new_lat = [0.0, 0.5, 1.5, 2.5];
        let out = interp_along_axis(data.view().into_dyn(), 1, &lat, &new_lat, &LinearInterp)
            .unwrap();
        assert_eq!(out.shape(), &[2, 4, 2]);
        assert_abs_diff_eq!(out[[0, 1, 0]], 5.0);
        assert_abs_diff_eq!(out[[1, 2, 1]], 116.0);
        assert!(out[[0, 3, 0]].is_nan());

        // Descending coordinates give the same answer
        let mut flipped = data.clone();
        flipped.invert_axis(Axis(1));
        let out2 = interp_along_axis(
            flipped.view().into_dyn(),
            1,
            &[2.0, 1.0, 0.0],
            &new_lat,
            &LinearInterp,
        )
        .unwrap();
        assert_abs_diff_eq!(out2[[1, 2, 1]], 116.0);
    }

    #[test]
    fn test_along_axis_errors() {
        let data = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
        let err = interp_along_axis(data.view(), 2, &[0.0, 1.0], &[0.5], &LinearInterp)
            .unwrap_err();
        assert!(matches!(err, InterpolationError::BadAxis { axis: 2, ndim: 2 }));

        let err = interp_along_axis(data.view(), 1, &[0.0, 1.0, 2.0], &[0.5], &LinearInterp)
            .unwrap_err();
        assert!(matches!(err, InterpolationError::InputLengthMismatch { .. }));

        let cubic = InterpolationKind::Cubic.interpolator(3);
        let err = interp_along_axis(data.view(), 1, &[0.0, 1.0], &[0.5], cubic.as_ref())
            .unwrap_err();
        assert!(matches!(err, InterpolationError::InputTooShort { req_len: 4, .. }));
    }
}
