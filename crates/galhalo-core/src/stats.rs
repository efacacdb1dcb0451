//! # Array Statistics
//!
//! Small array routines shared by the models, the CAM engine and the tests:
//! binning, nearest-index search, rank correlation and polynomial tables.

use crate::GalhaloError;

// =============================================================================
// GRIDS AND BINNING
// =============================================================================

/// `num` points evenly spaced in log10 between `10^log_min` and `10^log_max`.
#[must_use]
pub fn logspace(log_min: f64, log_max: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![10f64.powf(log_min)],
        _ => {
            let step = (log_max - log_min) / (num - 1) as f64;
            (0..num)
                .map(|i| 10f64.powf(log_min + step * i as f64))
                .collect()
        }
    }
}

/// Check that bin edges are non-empty, finite and strictly increasing.
pub fn validate_bins(bins: &[f64]) -> Result<(), GalhaloError> {
    if bins.is_empty() {
        return Err(GalhaloError::InvalidBins("no bin edges".to_string()));
    }
    if bins.iter().any(|edge| !edge.is_finite()) {
        return Err(GalhaloError::InvalidBins("bin edges must be finite".to_string()));
    }
    if bins.windows(2).any(|pair| pair[1] <= pair[0]) {
        return Err(GalhaloError::InvalidBins(
            "bin edges must be strictly increasing".to_string(),
        ));
    }
    Ok(())
}

/// Left-edge digitization of one value against increasing bin edges.
///
/// Returns `i` such that `bins[i-1] <= value < bins[i]`; values below the first
/// edge land in bin 0 and values at or above the last edge land in bin
/// `bins.len()`. There are therefore `bins.len() + 1` bins in total.
/// NaN sorts above every edge and lands in the last bin.
#[must_use]
pub fn digitize_one(value: f64, bins: &[f64]) -> usize {
    if value.is_nan() {
        return bins.len();
    }
    bins.partition_point(|&edge| edge <= value)
}

/// Reject a column that will be binned if any value is NaN or infinite.
pub fn require_finite(values: &[f64], key: &str) -> Result<(), GalhaloError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(row) => Err(GalhaloError::InvalidBins(format!(
            "column {key} has non-finite value {} at row {row}",
            values[row]
        ))),
        None => Ok(()),
    }
}

/// Left-edge digitization of every value. See [`digitize_one`].
#[must_use]
pub fn digitize(values: &[f64], bins: &[f64]) -> Vec<usize> {
    values.iter().map(|&v| digitize_one(v, bins)).collect()
}

/// Element of `candidates` closest to `target` by absolute distance.
///
/// `candidates` must be sorted ascending. Ties go to the lower value.
/// Returns `None` if there are no candidates.
#[must_use]
pub fn nearest_index(candidates: &[usize], target: usize) -> Option<usize> {
    let pos = candidates.partition_point(|&c| c < target);
    let below = pos.checked_sub(1).map(|i| candidates[i]);
    let above = candidates.get(pos).copied();
    match (below, above) {
        (Some(lo), Some(hi)) => {
            if target - lo <= hi - target {
                Some(lo)
            } else {
                Some(hi)
            }
        }
        (Some(lo), None) => Some(lo),
        (None, hi) => hi,
    }
}

// =============================================================================
// SUMMARY STATISTICS
// =============================================================================

/// Arithmetic mean, `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median, `None` for an empty slice.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some(0.5 * (sorted[mid - 1] + sorted[mid]))
    } else {
        Some(sorted[mid])
    }
}

/// Fractional ranks (1-based), averaging the ranks of tied values.
#[must_use]
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut out = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // ranks start..end (0-based) share their average, shifted to 1-based
        let shared = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            out[idx] = shared;
        }
        start = end;
    }
    out
}

/// Spearman rank-order correlation coefficient.
///
/// `None` if the slices differ in length, hold fewer than two values, or either
/// has zero rank variance.
#[must_use]
pub fn spearman_rank_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let rx = ranks(x);
    let ry = ranks(y);
    let mx = mean(&rx)?;
    let my = mean(&ry)?;

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in rx.iter().zip(&ry) {
        cov += (a - mx) * (b - my);
        vx += (a - mx) * (a - mx);
        vy += (b - my) * (b - my);
    }
    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some(cov / (vx * vy).sqrt())
}

// =============================================================================
// POLYNOMIAL TABLES
// =============================================================================

/// Evaluate the unique minimum-degree polynomial through `(abscissa, ordinates)`.
///
/// With one control point the polynomial is the constant `ordinates[0]`; with two
/// it is the line through both, and so on.
pub fn polynomial_from_table(
    abscissa: &[f64],
    ordinates: &[f64],
    x: f64,
) -> Result<f64, GalhaloError> {
    if abscissa.len() != ordinates.len() {
        return Err(GalhaloError::LengthMismatch {
            expected: abscissa.len(),
            found: ordinates.len(),
        });
    }
    if abscissa.is_empty() {
        return Err(GalhaloError::InvalidBins(
            "polynomial table needs at least one control point".to_string(),
        ));
    }

    // Lagrange form; the control points are few
    let mut total = 0.0;
    for (i, (&xi, &yi)) in abscissa.iter().zip(ordinates).enumerate() {
        let mut basis = 1.0;
        for (j, &xj) in abscissa.iter().enumerate() {
            if i != j {
                basis *= (x - xj) / (xi - xj);
            }
        }
        total += yi * basis;
    }
    Ok(total)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digitize_uses_left_closed_bins() {
        let bins = [1.0, 2.0, 3.0];
        assert_eq!(digitize(&[0.5, 1.0, 1.5, 2.999, 3.0, 10.0], &bins), vec![
            0, 1, 1, 2, 3, 3
        ]);
    }

    #[test]
    fn nan_lands_in_the_last_bin() {
        let bins = [1.0, 2.0, 3.0];
        assert_eq!(digitize_one(f64::NAN, &bins), 3);
        assert_eq!(digitize_one(f64::NEG_INFINITY, &bins), 0);
        assert_eq!(digitize_one(f64::INFINITY, &bins), 3);
    }

    #[test]
    fn require_finite_names_the_first_bad_row() {
        assert!(require_finite(&[1.0, 2.0], "stellar_mass").is_ok());
        let err = require_finite(&[1.0, f64::NAN, f64::INFINITY], "stellar_mass").expect_err("nan");
        assert!(matches!(&err, GalhaloError::InvalidBins(msg) if msg.contains("row 1")));
    }

    #[test]
    fn validate_bins_rejects_unsorted_edges() {
        assert!(validate_bins(&[1.0, 2.0]).is_ok());
        assert!(validate_bins(&[]).is_err());
        assert!(validate_bins(&[2.0, 1.0]).is_err());
        assert!(validate_bins(&[1.0, 1.0]).is_err());
        assert!(validate_bins(&[1.0, f64::NAN]).is_err());
    }

    #[test]
    fn nearest_index_breaks_ties_low() {
        let filled = [1, 5];
        assert_eq!(nearest_index(&filled, 0), Some(1));
        assert_eq!(nearest_index(&filled, 3), Some(1));
        assert_eq!(nearest_index(&filled, 4), Some(5));
        assert_eq!(nearest_index(&filled, 9), Some(5));
        assert_eq!(nearest_index(&[], 2), None);
    }

    #[test]
    fn logspace_hits_both_ends() {
        let grid = logspace(10.0, 15.0, 6);
        assert_eq!(grid.len(), 6);
        assert!((grid[0] - 1e10).abs() / 1e10 < 1e-12);
        assert!((grid[5] - 1e15).abs() / 1e15 < 1e-12);
    }

    #[test]
    fn ranks_average_ties() {
        assert_eq!(ranks(&[10.0, 20.0, 20.0, 5.0]), vec![2.0, 3.5, 3.5, 1.0]);
    }

    #[test]
    fn spearman_of_monotone_pairs_is_one() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [0.1, 5.0, 7.0, 100.0];
        assert_eq!(spearman_rank_correlation(&x, &y), Some(1.0));

        let reversed = [4.0, 3.0, 2.0, 1.0];
        let rho = spearman_rank_correlation(&x, &reversed).expect("rho");
        assert!((rho + 1.0).abs() < 1e-12);

        assert_eq!(spearman_rank_correlation(&[1.0], &[1.0]), None);
    }

    #[test]
    fn median_and_mean() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn polynomial_table_interpolates_linearly_between_two_points() {
        let abscissa = [12.0, 15.0];
        let ordinates = [0.3, 0.1];
        let at = |x| polynomial_from_table(&abscissa, &ordinates, x).expect("poly");
        assert!((at(12.0) - 0.3).abs() < 1e-12);
        assert!((at(15.0) - 0.1).abs() < 1e-12);
        assert!((at(13.5) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn polynomial_table_single_point_is_constant() {
        let value = polynomial_from_table(&[12.0], &[0.2], 14.0).expect("poly");
        assert_eq!(value, 0.2);
    }
}
