//! # Conditional Abundance Matching
//!
//! Assigns a galaxy property (e.g. colour) to a target catalog so that:
//! - at fixed primary property (e.g. stellar mass) the assigned values follow
//!   the distribution of a reference sample
//! - within each primary-property bin the assigned values are rank-ordered by
//!   a secondary halo property (e.g. formation time)
//!
//! ## Lifecycle
//!
//! The lookup table is fitted once in [`ConditionalAbunMatch::new`] and is
//! immutable afterwards; any number of assignments may read it concurrently.
//!
//! ## Determinism
//!
//! Every assignment draws one uniform per target row from the caller's stream
//! before any per-bin work, so the result depends only on the stream and the
//! inputs.

mod lookup;

pub use lookup::{OnePointLookupTable, QuantileFunction};

use crate::catalog::Catalog;
use crate::defaults::MINIMUM_SAMPLING_REQUIREMENT;
use crate::stats::{digitize, require_finite, validate_bins};
use crate::GalhaloError;
use rand::distributions::Standard;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Target Spearman rank correlation between the assigned property and the
/// secondary halo property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrelationStrength {
    /// Same strength in every bin.
    Constant(f64),
    /// Strength tabulated against the primary property.
    Piecewise {
        abscissa: Vec<f64>,
        ordinates: Vec<f64>,
    },
}

impl Default for CorrelationStrength {
    fn default() -> Self {
        CorrelationStrength::Constant(1.0)
    }
}

impl CorrelationStrength {
    /// Check the shape and range of the strength, then reject anything other
    /// than perfect correlation, the only assignment implemented.
    pub fn validate(&self) -> Result<(), GalhaloError> {
        let values: &[f64] = match self {
            CorrelationStrength::Constant(value) => std::slice::from_ref(value),
            CorrelationStrength::Piecewise {
                abscissa,
                ordinates,
            } => {
                if abscissa.len() != ordinates.len() {
                    return Err(GalhaloError::LengthMismatch {
                        expected: abscissa.len(),
                        found: ordinates.len(),
                    });
                }
                validate_bins(abscissa)?;
                ordinates
            }
        };
        if let Some(&bad) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(GalhaloError::InvalidConfig(format!(
                "correlation strength must lie in [0, 1], got {bad}"
            )));
        }
        if let Some(&partial) = values.iter().find(|&&v| v != 1.0) {
            return Err(GalhaloError::UnsupportedCorrelationStrength(partial));
        }
        Ok(())
    }
}

fn default_minimum_sampling() -> usize {
    MINIMUM_SAMPLING_REQUIREMENT
}

/// Keys, bins and sampling requirement of a CAM model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CamConfig {
    /// Galaxy property being assigned.
    pub galprop_key: String,
    /// Galaxy property defining the conditional one-point statistics.
    pub prim_galprop_key: String,
    /// Halo property the assigned values are rank-ordered by.
    pub sec_haloprop_key: String,
    /// Edges binning the primary property.
    pub prim_galprop_bins: Vec<f64>,
    /// A bin must hold more than this many reference rows to be fitted.
    #[serde(default = "default_minimum_sampling")]
    pub minimum_sampling_requirement: usize,
    #[serde(default)]
    pub correlation_strength: CorrelationStrength,
}

impl CamConfig {
    /// Zero-scatter configuration with the default sampling requirement.
    #[must_use]
    pub fn new(
        galprop_key: impl Into<String>,
        prim_galprop_key: impl Into<String>,
        sec_haloprop_key: impl Into<String>,
        prim_galprop_bins: Vec<f64>,
    ) -> Self {
        Self {
            galprop_key: galprop_key.into(),
            prim_galprop_key: prim_galprop_key.into(),
            sec_haloprop_key: sec_haloprop_key.into(),
            prim_galprop_bins,
            minimum_sampling_requirement: MINIMUM_SAMPLING_REQUIREMENT,
            correlation_strength: CorrelationStrength::default(),
        }
    }

    #[must_use]
    pub fn with_minimum_sampling(mut self, minimum: usize) -> Self {
        self.minimum_sampling_requirement = minimum;
        self
    }

    #[must_use]
    pub fn with_correlation_strength(mut self, strength: CorrelationStrength) -> Self {
        self.correlation_strength = strength;
        self
    }

    /// Check every field that can be checked without data.
    pub fn validate(&self) -> Result<(), GalhaloError> {
        for (name, key) in [
            ("galprop_key", &self.galprop_key),
            ("prim_galprop_key", &self.prim_galprop_key),
            ("sec_haloprop_key", &self.sec_haloprop_key),
        ] {
            if key.is_empty() {
                return Err(GalhaloError::MissingArgument {
                    component: "ConditionalAbunMatch".to_string(),
                    argument: name.to_string(),
                });
            }
        }
        validate_bins(&self.prim_galprop_bins)?;
        self.correlation_strength.validate()
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Zero-scatter conditional abundance matching.
#[derive(Debug, Clone)]
pub struct ConditionalAbunMatch {
    config: CamConfig,
    table: OnePointLookupTable,
}

impl ConditionalAbunMatch {
    /// Validate `config` and fit the lookup table from `reference`, which must
    /// carry the `prim_galprop_key` and `galprop_key` columns.
    pub fn new(config: CamConfig, reference: &Catalog) -> Result<Self, GalhaloError> {
        config.validate()?;
        let table = OnePointLookupTable::build(
            reference.column(&config.prim_galprop_key)?,
            reference.column(&config.galprop_key)?,
            &config.prim_galprop_bins,
            config.minimum_sampling_requirement,
        )?;
        Ok(Self { config, table })
    }

    #[must_use]
    pub fn config(&self) -> &CamConfig {
        &self.config
    }

    #[must_use]
    pub fn lookup_table(&self) -> &OnePointLookupTable {
        &self.table
    }

    /// Bins whose quantile function was borrowed from a neighbour.
    #[must_use]
    pub fn backfilled_bins(&self) -> &[usize] {
        self.table.backfilled_bins()
    }

    /// Bin index of every target row.
    pub fn bin_indices(&self, target: &Catalog) -> Result<Vec<usize>, GalhaloError> {
        let prim = target.column(&self.config.prim_galprop_key)?;
        require_finite(prim, &self.config.prim_galprop_key)?;
        Ok(digitize(prim, self.table.bins()))
    }

    /// Assign the property to every row of `target`, aligned with its rows.
    ///
    /// `target` must carry the `prim_galprop_key` and `sec_haloprop_key`
    /// columns.
    pub fn assign(&self, target: &Catalog, rng: &mut dyn RngCore) -> Result<Vec<f64>, GalhaloError> {
        let bin_indices = self.bin_indices(target)?;
        self.assign_binned(target, &bin_indices, rng)
    }

    /// [`ConditionalAbunMatch::assign`] with a fresh stream seeded by `seed`.
    pub fn assign_seeded(&self, target: &Catalog, seed: u64) -> Result<Vec<f64>, GalhaloError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.assign(target, &mut rng)
    }

    /// Assign with precomputed bin indices, one per target row.
    pub fn assign_binned(
        &self,
        target: &Catalog,
        bin_indices: &[usize],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>, GalhaloError> {
        let sec = target.column(&self.config.sec_haloprop_key)?;
        if bin_indices.len() != sec.len() {
            return Err(GalhaloError::LengthMismatch {
                expected: sec.len(),
                found: bin_indices.len(),
            });
        }
        if let Some(&bad) = bin_indices.iter().find(|&&b| b >= self.table.len()) {
            return Err(GalhaloError::InvalidBins(format!(
                "bin index {bad} out of range for {} bins",
                self.table.len()
            )));
        }

        let uniforms: Vec<f64> = (0..sec.len())
            .map(|_| rng.sample::<f64, _>(Standard))
            .collect();

        let mut members: Vec<Vec<usize>> = vec![Vec::new(); self.table.len()];
        for (row, &bin) in bin_indices.iter().enumerate() {
            members[bin].push(row);
        }

        let mut output = vec![0.0; sec.len()];
        for (bin, rows) in members.iter_mut().enumerate() {
            let Some(quantile) = self.table.entry(bin) else {
                continue;
            };
            if rows.is_empty() {
                continue;
            }
            let mut draws: Vec<f64> = rows.iter().map(|&row| uniforms[row]).collect();
            draws.sort_by(f64::total_cmp);
            rows.sort_by(|&a, &b| sec[a].total_cmp(&sec[b]));
            for (&row, &u) in rows.iter().zip(&draws) {
                output[row] = quantile.eval(u);
            }
        }

        debug!(
            rows = output.len(),
            galprop_key = %self.config.galprop_key,
            "conditional abundance matching assigned"
        );
        Ok(output)
    }

    /// Assign and store the result in `target` under `galprop_key`.
    pub fn assign_into(&self, target: &mut Catalog, rng: &mut dyn RngCore) -> Result<(), GalhaloError> {
        let values = self.assign(target, rng)?;
        target.insert_column(self.config.galprop_key.clone(), values)
    }
}

// =============================================================================
// TESTS
// =============================================================================
