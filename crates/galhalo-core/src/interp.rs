//! # Monotone Interpolation
//!
//! Shape-preserving piecewise-quadratic interpolation (Schumaker 1983).
//!
//! - Every interval between control points is covered by at most two quadratics
//!   joined with a continuous first derivative.
//! - Node slopes are harmonic means of the neighbouring secants (zero at local
//!   extrema), so monotone data yields a monotone interpolant.
//! - Outside the control points the interpolant is held at the end values.

use crate::GalhaloError;

/// One quadratic piece, valid from `x0` up to the next piece.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Piece {
    x0: f64,
    y0: f64,
    slope: f64,
    curvature: f64,
}

impl Piece {
    fn eval(&self, x: f64) -> f64 {
        let t = x - self.x0;
        self.y0 + t * (self.slope + t * self.curvature)
    }
}

/// Monotone piecewise-quadratic interpolant through tabulated points.
#[derive(Debug, Clone, PartialEq)]
pub struct MonotoneQuadratic {
    pieces: Vec<Piece>,
    x_min: f64,
    x_max: f64,
    y_first: f64,
    y_last: f64,
}

impl MonotoneQuadratic {
    /// Build the interpolant.
    ///
    /// `x` must be strictly increasing and the same length as `y`. A single
    /// control point yields a constant function.
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self, GalhaloError> {
        if x.len() != y.len() {
            return Err(GalhaloError::LengthMismatch {
                expected: x.len(),
                found: y.len(),
            });
        }
        let (Some(&x_min), Some(&x_max), Some(&y_first), Some(&y_last)) =
            (x.first(), x.last(), y.first(), y.last())
        else {
            return Err(GalhaloError::InvalidBins(
                "interpolation table needs at least one control point".to_string(),
            ));
        };
        if x.windows(2).any(|pair| pair[1] <= pair[0]) || x.iter().any(|v| !v.is_finite()) {
            return Err(GalhaloError::InvalidBins(
                "interpolation abscissa must be finite and strictly increasing".to_string(),
            ));
        }

        let mut pieces = Vec::with_capacity(2 * x.len());
        if x.len() == 1 {
            pieces.push(Piece {
                x0: x_min,
                y0: y_first,
                slope: 0.0,
                curvature: 0.0,
            });
        } else {
            let slopes = node_slopes(x, y);
            for i in 0..x.len() - 1 {
                push_interval(&mut pieces, x[i], x[i + 1], y[i], y[i + 1], slopes[i], slopes[i + 1]);
            }
        }

        Ok(Self {
            pieces,
            x_min,
            x_max,
            y_first,
            y_last,
        })
    }

    /// Evaluate at one point.
    #[must_use]
    pub fn eval(&self, x: f64) -> f64 {
        if x <= self.x_min {
            return self.y_first;
        }
        if x >= self.x_max {
            return self.y_last;
        }
        let idx = self.pieces.partition_point(|p| p.x0 <= x).saturating_sub(1);
        self.pieces[idx].eval(x)
    }

    /// Evaluate at every point.
    #[must_use]
    pub fn eval_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.eval(x)).collect()
    }

    /// Smallest tabulated abscissa.
    #[must_use]
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Largest tabulated abscissa.
    #[must_use]
    pub fn x_max(&self) -> f64 {
        self.x_max
    }
}

/// Harmonic-mean node slopes; one-sided secants at the ends.
fn node_slopes(x: &[f64], y: &[f64]) -> Vec<f64> {
    let secants: Vec<f64> = x
        .windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (ys[1] - ys[0]) / (xs[1] - xs[0]))
        .collect();

    let n = x.len();
    let mut slopes = vec![0.0; n];
    slopes[0] = secants[0];
    slopes[n - 1] = secants[n - 2];
    for i in 1..n - 1 {
        let (a, b) = (secants[i - 1], secants[i]);
        slopes[i] = if a * b > 0.0 { 2.0 * a * b / (a + b) } else { 0.0 };
    }
    slopes
}

/// Append the two quadratics covering `[t1, t2]`, joined at an inner knot.
fn push_interval(pieces: &mut Vec<Piece>, t1: f64, t2: f64, z1: f64, z2: f64, s1: f64, s2: f64) {
    let h = t2 - t1;
    let delta = (z2 - z1) / h;

    let knot = if (s1 - delta) * (s2 - delta) >= 0.0 {
        t1 + 0.5 * h
    } else if (s2 - delta).abs() < (s1 - delta).abs() {
        let bar = t1 + (s2 - delta) * h / (s2 - s1);
        0.5 * (t1 + bar)
    } else {
        let bar = t2 + (s1 - delta) * h / (s2 - s1);
        0.5 * (t2 + bar)
    };

    let s_knot = (2.0 * (z2 - z1) - (knot - t1) * s1 - (t2 - knot) * s2) / h;
    let z_knot = z1 + 0.5 * (s1 + s_knot) * (knot - t1);

    pieces.push(Piece {
        x0: t1,
        y0: z1,
        slope: s1,
        curvature: (s_knot - s1) / (2.0 * (knot - t1)),
    });
    pieces.push(Piece {
        x0: knot,
        y0: z_knot,
        slope: s_knot,
        curvature: (s2 - s_knot) / (2.0 * (t2 - knot)),
    });
}

// =============================================================================
// TESTS
// =============================================================================
