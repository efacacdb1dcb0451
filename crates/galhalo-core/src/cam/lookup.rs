//! Per-bin quantile functions of a reference galaxy sample.

use crate::interp::MonotoneQuadratic;
use crate::stats::{digitize, nearest_index, require_finite};
use crate::GalhaloError;
use std::sync::Arc;
use tracing::{debug, warn};

// =============================================================================
// QUANTILE FUNCTION
// =============================================================================

/// Inverse empirical CDF of one reference bin.
///
/// Maps a rank fraction in `[0, 1]` to a property value. The `i`-th of `n`
/// sorted reference values sits at `i / (n - 1)`; between them the function is
/// a monotone quadratic spline.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileFunction {
    spline: MonotoneQuadratic,
    sample_size: usize,
}

impl QuantileFunction {
    /// Fit the quantile function of `values`.
    pub fn fit(values: &[f64]) -> Result<Self, GalhaloError> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();
        let abscissa: Vec<f64> = match n {
            1 => vec![0.0],
            _ => (0..n).map(|i| i as f64 / (n - 1) as f64).collect(),
        };
        Ok(Self {
            spline: MonotoneQuadratic::new(&abscissa, &sorted)?,
            sample_size: n,
        })
    }

    /// Property value at rank fraction `u`.
    #[must_use]
    pub fn eval(&self, u: f64) -> f64 {
        self.spline.eval(u)
    }

    /// Number of reference values the function was fitted to.
    #[must_use]
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }
}

// =============================================================================
// LOOKUP TABLE
// =============================================================================

/// Build-time state of one bin. Never visible once the table is built.
enum LookupEntry {
    Unfit,
    Fitted(Arc<QuantileFunction>),
}

/// One quantile function per primary-property bin.
///
/// With `K` bin edges there are `K + 1` bins. Every bin holds a quantile
/// function: either fitted to its own reference rows or shared with the
/// nearest independently fitted bin.
#[derive(Debug, Clone)]
pub struct OnePointLookupTable {
    bins: Vec<f64>,
    entries: Vec<Arc<QuantileFunction>>,
    source_bins: Vec<usize>,
    backfilled: Vec<usize>,
}

impl OnePointLookupTable {
    /// Fit the table from reference rows.
    ///
    /// A bin is fitted independently when it holds more than
    /// `minimum_sampling` rows. Other bins borrow the function of the nearest
    /// fitted bin by index distance, ties going to the lower index.
    pub fn build(
        prim_galprop: &[f64],
        galprop: &[f64],
        bins: &[f64],
        minimum_sampling: usize,
    ) -> Result<Self, GalhaloError> {
        crate::stats::validate_bins(bins)?;
        require_finite(prim_galprop, "primary property")?;
        if prim_galprop.len() != galprop.len() {
            return Err(GalhaloError::LengthMismatch {
                expected: prim_galprop.len(),
                found: galprop.len(),
            });
        }

        let num_bins = bins.len() + 1;
        let mut members: Vec<Vec<f64>> = vec![Vec::new(); num_bins];
        for (bin, &value) in digitize(prim_galprop, bins).into_iter().zip(galprop) {
            members[bin].push(value);
        }

        let mut staged = Vec::with_capacity(num_bins);
        for values in &members {
            if values.len() > minimum_sampling {
                staged.push(LookupEntry::Fitted(Arc::new(QuantileFunction::fit(values)?)));
            } else {
                staged.push(LookupEntry::Unfit);
            }
        }

        let fitted: Vec<usize> = staged
            .iter()
            .enumerate()
            .filter_map(|(i, e)| matches!(e, LookupEntry::Fitted(_)).then_some(i))
            .collect();
        if fitted.is_empty() {
            return Err(GalhaloError::InsufficientReferenceSample {
                minimum: minimum_sampling,
            });
        }

        let mut source_bins = Vec::with_capacity(num_bins);
        let mut backfilled = Vec::new();
        for (i, entry) in staged.iter().enumerate() {
            match entry {
                LookupEntry::Fitted(_) => source_bins.push(i),
                LookupEntry::Unfit => {
                    let nearest = nearest_index(&fitted, i).ok_or(
                        GalhaloError::InsufficientReferenceSample {
                            minimum: minimum_sampling,
                        },
                    )?;
                    source_bins.push(nearest);
                    backfilled.push(i);
                }
            }
        }

        let mut entries = Vec::with_capacity(num_bins);
        for &source in &source_bins {
            match &staged[source] {
                LookupEntry::Fitted(function) => entries.push(Arc::clone(function)),
                LookupEntry::Unfit => {
                    return Err(GalhaloError::InsufficientReferenceSample {
                        minimum: minimum_sampling,
                    });
                }
            }
        }

        if !backfilled.is_empty() {
            warn!(
                minimum_sampling,
                backfilled_bins = ?backfilled,
                "reference bins below the minimum sampling requirement use the nearest sufficiently populated bin"
            );
        }
        debug!(
            num_bins,
            fitted_bins = fitted.len(),
            reference_rows = galprop.len(),
            "one-point lookup table built"
        );

        Ok(Self {
            bins: bins.to_vec(),
            entries,
            source_bins,
            backfilled,
        })
    }

    /// Bin edges.
    #[must_use]
    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    /// Number of bins (`edges + 1`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a built table has at least one bin.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Quantile function of bin `i`.
    #[must_use]
    pub fn entry(&self, i: usize) -> Option<&QuantileFunction> {
        self.entries.get(i).map(Arc::as_ref)
    }

    /// Whether bins `a` and `b` share one quantile function.
    #[must_use]
    pub fn shares_entry(&self, a: usize, b: usize) -> bool {
        match (self.entries.get(a), self.entries.get(b)) {
            (Some(x), Some(y)) => Arc::ptr_eq(x, y),
            _ => false,
        }
    }

    /// Bin whose reference rows fitted the quantile function of bin `i`.
    #[must_use]
    pub fn source_bin(&self, i: usize) -> Option<usize> {
        self.source_bins.get(i).copied()
    }

    /// Bins that borrowed a neighbour's quantile function, ascending.
    #[must_use]
    pub fn backfilled_bins(&self) -> &[usize] {
        &self.backfilled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_function_spans_sorted_sample() {
        let q = QuantileFunction::fit(&[5.0, 1.0, 3.0, 2.0, 4.0]).expect("fit");
        assert_eq!(q.sample_size(), 5);
        assert!((q.eval(0.0) - 1.0).abs() < 1e-12);
        assert!((q.eval(0.5) - 3.0).abs() < 1e-12);
        assert!((q.eval(1.0) - 5.0).abs() < 1e-12);
        let grid: Vec<f64> = (0..=100).map(|i| q.eval(f64::from(i) / 100.0)).collect();
        assert!(grid.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn single_value_sample_is_constant() {
        let q = QuantileFunction::fit(&[0.7]).expect("fit");
        assert_eq!(q.eval(0.0), 0.7);
        assert_eq!(q.eval(0.9), 0.7);
    }

    #[test]
    fn sparse_bins_borrow_nearest_fitted_bin() {
        // bins: (-inf,1) [1,2) [2,3) [3,inf)
        let mut prim = Vec::new();
        let mut galprop = Vec::new();
        for i in 0..50 {
            prim.push(0.5);
            galprop.push(f64::from(i));
            prim.push(3.5);
            galprop.push(100.0 + f64::from(i));
        }
        prim.push(1.5);
        galprop.push(-1.0);

        let table = OnePointLookupTable::build(&prim, &galprop, &[1.0, 2.0, 3.0], 10).expect("build");
        assert_eq!(table.len(), 4);
        assert_eq!(table.backfilled_bins(), &[1, 2]);
        assert_eq!(table.source_bin(1), Some(0));
        assert_eq!(table.source_bin(2), Some(3));
        assert!(table.shares_entry(0, 1));
        assert!(table.shares_entry(2, 3));
        assert!(!table.shares_entry(1, 2));
    }

    #[test]
    fn equidistant_backfill_prefers_lower_bin() {
        let mut prim = Vec::new();
        let mut galprop = Vec::new();
        for i in 0..20 {
            prim.push(0.5);
            galprop.push(f64::from(i));
            prim.push(2.5);
            galprop.push(f64::from(i) + 50.0);
        }
        let table = OnePointLookupTable::build(&prim, &galprop, &[1.0, 2.0], 5).expect("build");
        assert_eq!(table.backfilled_bins(), &[1]);
        assert_eq!(table.source_bin(1), Some(0));
    }

    #[test]
    fn sample_size_must_exceed_minimum() {
        let prim = vec![0.5; 100];
        let galprop: Vec<f64> = (0..100).map(f64::from).collect();
        let err = OnePointLookupTable::build(&prim, &galprop, &[1.0], 100).expect_err("too sparse");
        assert_eq!(err, GalhaloError::InsufficientReferenceSample { minimum: 100 });

        let table = OnePointLookupTable::build(&prim, &galprop, &[1.0], 99).expect("build");
        assert_eq!(table.backfilled_bins(), &[1]);
        assert_eq!(table.entry(0).map(QuantileFunction::sample_size), Some(100));
    }

    #[test]
    fn invalid_bins_are_rejected() {
        let err = OnePointLookupTable::build(&[1.0], &[1.0], &[2.0, 1.0], 0).expect_err("bins");
        assert!(matches!(err, GalhaloError::InvalidBins(_)));
        let err = OnePointLookupTable::build(&[1.0], &[1.0], &[], 0).expect_err("bins");
        assert!(matches!(err, GalhaloError::InvalidBins(_)));
    }
}
