//! Zheng et al. (2007) luminosity-threshold HOD.

use super::tables::{Zheng07Population, published_params};
use super::{ComponentSpec, OccupationModel};
use crate::catalog::HaloQuery;
use crate::{GalhaloError, ParamDict};
use statrs::function::erf::erf;

const PUBLICATIONS: [&str; 2] = ["arXiv:0408564", "arXiv:0703457"];
const SATELLITE_PUBLICATIONS: [&str; 2] = ["arXiv:0308519", "arXiv:0703457"];

// =============================================================================
// CENTRALS
// =============================================================================

/// Error-function central occupation:
///
/// `<Ncen> = 0.5 (1 + erf((log10 M - logMmin) / sigma_logM))`
#[derive(Debug, Clone, PartialEq)]
pub struct Zheng07Cens {
    spec: ComponentSpec,
    params: ParamDict,
}

impl Zheng07Cens {
    const NAME: &'static str = "Zheng07Cens";

    /// Centrals at a published luminosity threshold.
    pub fn new(threshold: f64) -> Result<Self, GalhaloError> {
        Self::with_spec(ComponentSpec::centrals(threshold))
    }

    /// Centrals with an explicit identity; parameters come from the
    /// published row matching `spec.threshold`.
    pub fn with_spec(spec: ComponentSpec) -> Result<Self, GalhaloError> {
        Self::from_publication(spec, "Zheng07")
    }

    /// Centrals with parameters from a named publication.
    pub fn from_publication(spec: ComponentSpec, publication: &str) -> Result<Self, GalhaloError> {
        let params = published_params(publication, spec.threshold, Zheng07Population::Centrals)?;
        Ok(Self { spec, params })
    }

    /// Mean occupation of halos of the given masses.
    pub fn mean_occupation_from_mass(&self, mass: &[f64]) -> Result<Vec<f64>, GalhaloError> {
        let log_m_min = self.params.require(Self::NAME, "logMmin")?;
        let sigma = self.params.require(Self::NAME, "sigma_logM")?;
        Ok(mass
            .iter()
            .map(|m| 0.5 * (1.0 + erf((m.log10() - log_m_min) / sigma)))
            .collect())
    }
}

impl OccupationModel for Zheng07Cens {
    fn spec(&self) -> &ComponentSpec {
        &self.spec
    }

    fn param_dict(&self) -> &ParamDict {
        &self.params
    }

    fn set_param(&mut self, key: &str, value: f64) -> Result<(), GalhaloError> {
        self.params.require(Self::NAME, key)?;
        self.params.insert(key, value);
        Ok(())
    }

    fn mean_occupation(&self, halos: &HaloQuery<'_>) -> Result<Vec<f64>, GalhaloError> {
        let mass = halos.resolve(&self.spec.prim_haloprop_key, "Zheng07Cens::mean_occupation")?;
        self.mean_occupation_from_mass(mass)
    }

    fn publications(&self) -> &[&'static str] {
        &PUBLICATIONS
    }
}

// =============================================================================
// SATELLITES
// =============================================================================

/// Power-law satellite occupation:
///
/// `<Nsat> = ((M - M0) / M1)^alpha` for `M > M0`, zero otherwise, optionally
/// multiplied by the mean occupation of a central population.
#[derive(Debug)]
pub struct Zheng07Sats {
    spec: ComponentSpec,
    params: ParamDict,
    central: Option<Box<dyn OccupationModel>>,
}

impl Zheng07Sats {
    const NAME: &'static str = "Zheng07Sats";

    /// Satellites at a published luminosity threshold, without modulation.
    pub fn new(threshold: f64) -> Result<Self, GalhaloError> {
        Self::with_spec(ComponentSpec::satellites(threshold))
    }

    /// Satellites with an explicit identity.
    pub fn with_spec(spec: ComponentSpec) -> Result<Self, GalhaloError> {
        Self::from_publication(spec, "Zheng07")
    }

    /// Satellites with parameters from a named publication.
    pub fn from_publication(spec: ComponentSpec, publication: &str) -> Result<Self, GalhaloError> {
        let params = published_params(publication, spec.threshold, Zheng07Population::Satellites)?;
        Ok(Self {
            spec,
            params,
            central: None,
        })
    }

    /// Multiply the satellite mean by the mean of a [`Zheng07Cens`] population
    /// named `gal_type_centrals`, built at the same threshold and halo key.
    pub fn modulate_with_cenocc(
        self,
        gal_type_centrals: impl Into<String>,
    ) -> Result<Self, GalhaloError> {
        let central_spec = ComponentSpec::centrals(self.spec.threshold)
            .with_gal_type(gal_type_centrals)
            .with_prim_haloprop_key(self.spec.prim_haloprop_key.clone());
        let central = Zheng07Cens::with_spec(central_spec)?;
        Ok(self.with_central(Box::new(central)))
    }

    /// Multiply the satellite mean by the mean of an arbitrary central model.
    #[must_use]
    pub fn with_central(mut self, central: Box<dyn OccupationModel>) -> Self {
        self.central = Some(central);
        self
    }

    /// Central model modulating the satellite mean, if any.
    #[must_use]
    pub fn central(&self) -> Option<&dyn OccupationModel> {
        self.central.as_deref()
    }

    /// Whether the satellite mean is modulated by a central population.
    #[must_use]
    pub fn modulates_with_cenocc(&self) -> bool {
        self.central.is_some()
    }

    /// Unmodulated mean occupation of halos of the given masses.
    pub fn mean_occupation_from_mass(&self, mass: &[f64]) -> Result<Vec<f64>, GalhaloError> {
        let m0 = 10f64.powf(self.params.require(Self::NAME, "logM0")?);
        let m1 = 10f64.powf(self.params.require(Self::NAME, "logM1")?);
        let alpha = self.params.require(Self::NAME, "alpha")?;
        Ok(mass
            .iter()
            .map(|&m| if m > m0 { ((m - m0) / m1).powf(alpha) } else { 0.0 })
            .collect())
    }
}

impl OccupationModel for Zheng07Sats {
    fn spec(&self) -> &ComponentSpec {
        &self.spec
    }

    fn param_dict(&self) -> &ParamDict {
        &self.params
    }

    fn set_param(&mut self, key: &str, value: f64) -> Result<(), GalhaloError> {
        if self.params.contains_key(key) {
            self.params.insert(key, value);
            return Ok(());
        }
        match self.central.as_mut() {
            Some(central) => central.set_param(key, value),
            None => Err(GalhaloError::MissingParameter {
                component: Self::NAME.to_string(),
                key: key.to_string(),
            }),
        }
    }

    fn mean_occupation(&self, halos: &HaloQuery<'_>) -> Result<Vec<f64>, GalhaloError> {
        let mass = halos.resolve(&self.spec.prim_haloprop_key, "Zheng07Sats::mean_occupation")?;
        let mut mean = self.mean_occupation_from_mass(mass)?;
        if let Some(central) = &self.central {
            let ncen = central.mean_occupation(halos)?;
            for (nsat, ncen) in mean.iter_mut().zip(ncen) {
                *nsat *= ncen;
            }
        }
        Ok(mean)
    }

    fn publications(&self) -> &[&'static str] {
        &SATELLITE_PUBLICATIONS
    }
}

// =============================================================================
// TESTS
// =============================================================================
