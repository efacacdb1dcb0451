//! # Occupation Statistics
//!
//! HOD-style occupation components. Every component implements
//! [`OccupationModel`]:
//! - `mean_occupation`: deterministic first moment per halo
//! - `mc_occupation`: one stochastic realization, Bernoulli for bound 1 and
//!   Poisson for unbounded populations
//!
//! Concrete components:
//! - [`Zheng07Cens`], [`Zheng07Sats`]: published luminosity-threshold HOD
//! - [`Leauthaud11Cens`], [`Leauthaud11Sats`]: occupation derived from a
//!   stellar-to-halo mass relation
//!
//! [`HodModel`] groups one component per galaxy population.

mod composite;
mod leauthaud11;
pub mod monte_carlo;
pub mod tables;
mod zheng07;

pub use composite::{HodModel, OccupationRealization};
pub use leauthaud11::{Leauthaud11Cens, Leauthaud11Sats};
pub use zheng07::{Zheng07Cens, Zheng07Sats};

use crate::catalog::HaloQuery;
use crate::defaults::PRIM_HALOPROP_KEY;
use crate::{GalhaloError, OccupationBound, ParamDict};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

// =============================================================================
// COMPONENT IDENTITY
// =============================================================================

/// Identity and selection of one galaxy population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// Population label, e.g. `centrals`.
    pub gal_type: String,
    /// Selection cut defining the population (magnitude or log10 stellar mass).
    pub threshold: f64,
    /// Maximum number of galaxies per halo.
    pub occupation_bound: OccupationBound,
    /// Halo column driving the occupation statistics.
    pub prim_haloprop_key: String,
    /// Optional secondary halo column.
    pub sec_haloprop_key: Option<String>,
}

impl ComponentSpec {
    /// Central population: at most one galaxy per halo.
    #[must_use]
    pub fn centrals(threshold: f64) -> Self {
        Self {
            gal_type: "centrals".to_string(),
            threshold,
            occupation_bound: OccupationBound::One,
            prim_haloprop_key: PRIM_HALOPROP_KEY.to_string(),
            sec_haloprop_key: None,
        }
    }

    /// Satellite population: unbounded number of galaxies per halo.
    #[must_use]
    pub fn satellites(threshold: f64) -> Self {
        Self {
            gal_type: "satellites".to_string(),
            occupation_bound: OccupationBound::Unbounded,
            ..Self::centrals(threshold)
        }
    }

    #[must_use]
    pub fn with_gal_type(mut self, gal_type: impl Into<String>) -> Self {
        self.gal_type = gal_type.into();
        self
    }

    #[must_use]
    pub fn with_prim_haloprop_key(mut self, key: impl Into<String>) -> Self {
        self.prim_haloprop_key = key.into();
        self
    }

    #[must_use]
    pub fn with_sec_haloprop_key(mut self, key: impl Into<String>) -> Self {
        self.sec_haloprop_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_occupation_bound(mut self, bound: OccupationBound) -> Self {
        self.occupation_bound = bound;
        self
    }
}

// =============================================================================
// OCCUPATION MODEL TRAIT
// =============================================================================

/// Occupation statistics of one galaxy population.
///
/// Implementations validate their required parameters at construction, so the
/// only call-time failures are missing or malformed halo inputs.
pub trait OccupationModel: Send + Sync + std::fmt::Debug {
    /// Identity and selection of the population.
    fn spec(&self) -> &ComponentSpec;

    /// Current parameters.
    fn param_dict(&self) -> &ParamDict;

    /// Overwrite one existing parameter; derived quantities are refreshed
    /// before this returns.
    fn set_param(&mut self, key: &str, value: f64) -> Result<(), GalhaloError>;

    /// Mean number of galaxies in every input halo.
    fn mean_occupation(&self, halos: &HaloQuery<'_>) -> Result<Vec<f64>, GalhaloError>;

    /// Papers the component and its default parameters come from.
    fn publications(&self) -> &[&'static str] {
        &[]
    }

    /// Population label.
    fn gal_type(&self) -> &str {
        &self.spec().gal_type
    }

    /// One Monte Carlo realization of the occupation of every input halo.
    fn mc_occupation(
        &self,
        halos: &HaloQuery<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<u32>, GalhaloError> {
        let mean = self.mean_occupation(halos)?;
        monte_carlo::draw_occupation(self.spec().occupation_bound, &mean, rng)
    }

    /// [`OccupationModel::mc_occupation`] with a fresh stream seeded by `seed`.
    fn mc_occupation_seeded(
        &self,
        halos: &HaloQuery<'_>,
        seed: u64,
    ) -> Result<Vec<u32>, GalhaloError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.mc_occupation(halos, &mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_constructors_pick_population_bounds() {
        let cens = ComponentSpec::centrals(-20.0);
        assert_eq!(cens.gal_type, "centrals");
        assert_eq!(cens.occupation_bound, OccupationBound::One);
        assert_eq!(cens.prim_haloprop_key, "halo_mvir");

        let sats = ComponentSpec::satellites(-20.0)
            .with_gal_type("sats")
            .with_prim_haloprop_key("halo_m200b")
            .with_sec_haloprop_key("halo_zhalf");
        assert_eq!(sats.gal_type, "sats");
        assert_eq!(sats.occupation_bound, OccupationBound::Unbounded);
        assert_eq!(sats.prim_haloprop_key, "halo_m200b");
        assert_eq!(sats.sec_haloprop_key.as_deref(), Some("halo_zhalf"));
    }
}
