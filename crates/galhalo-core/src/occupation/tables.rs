//! Published best-fit HOD parameters.
//!
//! Table 1 of Zheng et al. (2007), arXiv:0703457, keyed by SDSS r-band
//! luminosity threshold. Thresholds are matched exactly; values between table
//! rows are never interpolated.

use crate::{GalhaloError, ParamDict};

/// Luminosity thresholds of the table rows.
pub const ZHENG07_THRESHOLDS: [f64; 9] = [-18.0, -18.5, -19.0, -19.5, -20.0, -20.5, -21.0, -21.5, -22.0];

const LOG_M_MIN: [f64; 9] = [11.35, 11.46, 11.6, 11.75, 12.02, 12.3, 12.79, 13.38, 14.22];
const SIGMA_LOG_M: [f64; 9] = [0.25, 0.24, 0.26, 0.28, 0.26, 0.21, 0.39, 0.51, 0.77];
const LOG_M0: [f64; 9] = [11.2, 10.59, 11.49, 11.69, 11.38, 11.84, 11.92, 13.94, 14.0];
const LOG_M1: [f64; 9] = [12.4, 12.68, 12.83, 13.01, 13.31, 13.58, 13.94, 13.91, 14.69];
const ALPHA: [f64; 9] = [0.83, 0.97, 1.02, 1.06, 1.06, 1.12, 1.15, 1.04, 0.87];

/// Which half of the table to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zheng07Population {
    /// `logMmin`, `sigma_logM`
    Centrals,
    /// `logM0`, `logM1`, `alpha`
    Satellites,
}

/// Whether `publication` names the Zheng et al. (2007) fits.
#[must_use]
pub fn is_zheng07(publication: &str) -> bool {
    matches!(
        publication,
        "zheng07" | "Zheng07" | "Zheng_etal07" | "zheng_etal07" | "zheng2007" | "Zheng2007"
    )
}

/// Best-fit parameters of `population` at `threshold` from `publication`.
pub fn published_params(
    publication: &str,
    threshold: f64,
    population: Zheng07Population,
) -> Result<ParamDict, GalhaloError> {
    if !is_zheng07(publication) {
        return Err(GalhaloError::UnsupportedPublication(publication.to_string()));
    }
    let row = ZHENG07_THRESHOLDS
        .iter()
        .position(|&t| t == threshold)
        .ok_or_else(|| GalhaloError::UnpublishedThreshold {
            publication: "Zheng07".to_string(),
            threshold,
        })?;
    let params = match population {
        Zheng07Population::Centrals => [("logMmin", LOG_M_MIN[row]), ("sigma_logM", SIGMA_LOG_M[row])]
            .into_iter()
            .collect(),
        Zheng07Population::Satellites => [
            ("logM0", LOG_M0[row]),
            ("logM1", LOG_M1[row]),
            ("alpha", ALPHA[row]),
        ]
        .into_iter()
        .collect(),
    };
    Ok(params)
}
