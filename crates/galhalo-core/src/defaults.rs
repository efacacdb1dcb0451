//! # Model Defaults
//!
//! Hardcoded default settings for the galhalo models.
//!
//! All hard-coded numbers used by more than one component live here.
//! Published best-fit tables are static lookup data and live next to the
//! model that consumes them.

// =============================================================================
// SAMPLE THRESHOLDS
// =============================================================================

/// Default luminosity threshold (absolute r-band magnitude) of Zheng07 samples.
pub const DEFAULT_LUMINOSITY_THRESHOLD: f64 = -20.0;

/// Default stellar mass threshold (log10 of stellar mass) of Leauthaud11 samples.
pub const DEFAULT_STELLAR_MASS_THRESHOLD: f64 = 10.5;

// =============================================================================
// MONTE CARLO
// =============================================================================

/// Floor applied to a Poisson rate whose mean is formally zero or negative.
///
/// A Poisson distribution with non-positive rate is undefined.
pub const TINY_POISSON_FLUCTUATION: f64 = 1.0e-20;

// =============================================================================
// HALO PROPERTY KEYS
// =============================================================================

/// Column name of the default primary (mass-like) halo property.
pub const PRIM_HALOPROP_KEY: &str = "halo_mvir";

/// Column name of the default secondary halo property.
pub const SEC_HALOPROP_KEY: &str = "halo_vmax";

/// Column name of the halo property driving stellar-to-halo-mass relations.
pub const SMHM_HALOPROP_KEY: &str = "halo_mpeak";

// =============================================================================
// RELATIONS
// =============================================================================

/// Default level of log-normal scatter in the stellar-to-halo-mass relation (dex).
pub const DEFAULT_SMHM_SCATTER: f64 = 0.2;

/// Default abscissa (log10 halo mass) of the scatter model.
pub const DEFAULT_SCATTER_ABSCISSA: f64 = 12.0;

/// Default concentration-mass fitting function.
pub const CONC_MASS_MODEL: &str = "dutton_maccio14";

/// Default redshift of redshift-dependent relations.
pub const DEFAULT_REDSHIFT: f64 = 0.0;

// =============================================================================
// SATELLITE KNEE GRID
// =============================================================================

/// log10 of the smallest halo mass on the inverse-SMHM grid.
pub const KNEE_GRID_LOG_MIN: f64 = 9.0;

/// log10 of the largest halo mass on the inverse-SMHM grid.
pub const KNEE_GRID_LOG_MAX: f64 = 15.0;

/// Number of halo masses on the inverse-SMHM grid.
pub const KNEE_GRID_NUM: usize = 500;

// =============================================================================
// CONDITIONAL ABUNDANCE MATCHING
// =============================================================================

/// Minimum number of reference galaxies a bin must exceed to be fitted directly.
pub const MINIMUM_SAMPLING_REQUIREMENT: usize = 100;
