//! # Parametrized Relations
//!
//! Pure mappings from a halo property to a derived property plus scatter:
//! - [`Moster13SmHm`]: stellar mass as a function of halo mass
//! - [`ConcMass`]: NFW concentration as a function of halo mass
//! - [`LogNormalScatterModel`]: scatter in dex as a function of halo mass
//!
//! Relations hold no state beyond their configuration and parameters.

mod conc_mass;
mod scatter;
mod smhm;

pub use conc_mass::{ConcMass, ConcMassFit};
pub use scatter::LogNormalScatterModel;
pub use smhm::Moster13SmHm;

use crate::catalog::HaloQuery;
use crate::{GalhaloError, ParamDict};
use rand::{Rng, RngCore};
use rand_distr::StandardNormal;

// =============================================================================
// RELATION TRAIT
// =============================================================================

/// A relation between a primary halo property and a derived galaxy or halo
/// property, with log-normal scatter.
///
/// `mean` returns the derived property in linear units; `scatter` returns the
/// width of the log-normal scatter in dex, one value per input halo.
pub trait ParametrizedRelation: Send + Sync + std::fmt::Debug {
    /// Short name used in error messages.
    fn relation_name(&self) -> &'static str;

    /// Column name of the halo property the relation is evaluated on.
    fn prim_haloprop_key(&self) -> &str;

    /// Name of the derived property.
    fn galprop_key(&self) -> &str;

    /// Current parameters.
    fn param_dict(&self) -> &ParamDict;

    /// Overwrite one existing parameter.
    fn set_param(&mut self, key: &str, value: f64) -> Result<(), GalhaloError>;

    /// Mean derived property of every input halo.
    fn mean(&self, halos: &HaloQuery<'_>) -> Result<Vec<f64>, GalhaloError>;

    /// Scatter (dex) of the derived property of every input halo.
    fn scatter(&self, halos: &HaloQuery<'_>) -> Result<Vec<f64>, GalhaloError>;

    /// One log-normal realization of the derived property.
    ///
    /// All Gaussian offsets are drawn from `rng` before any of them is applied.
    fn realization(
        &self,
        halos: &HaloQuery<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>, GalhaloError> {
        let mean = self.mean(halos)?;
        let sigma = self.scatter(halos)?;
        let offsets = gaussian_offsets(&sigma, rng)?;
        Ok(mean
            .iter()
            .zip(&offsets)
            .map(|(m, dlog)| 10f64.powf(m.log10() + dlog))
            .collect())
    }
}

/// One zero-mean Gaussian draw per entry of `sigma`, scaled by that entry.
pub(crate) fn gaussian_offsets(
    sigma: &[f64],
    rng: &mut dyn RngCore,
) -> Result<Vec<f64>, GalhaloError> {
    if let Some(bad) = sigma.iter().find(|s| !(s.is_finite() && **s >= 0.0)) {
        return Err(GalhaloError::InvalidConfig(format!(
            "scatter must be finite and non-negative, got {bad}"
        )));
    }
    let mut offsets = Vec::with_capacity(sigma.len());
    for s in sigma {
        let z: f64 = rng.sample(StandardNormal);
        offsets.push(z * s);
    }
    Ok(offsets)
}

/// Overwrite an existing entry of `params`, rejecting unknown keys.
pub(crate) fn overwrite_param(
    params: &mut ParamDict,
    component: &str,
    key: &str,
    value: f64,
) -> Result<(), GalhaloError> {
    params.require(component, key)?;
    params.insert(key, value);
    Ok(())
}
