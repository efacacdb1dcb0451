//! Concentration-mass relations for NFW halos.

use super::ParametrizedRelation;
use crate::catalog::HaloQuery;
use crate::defaults::{DEFAULT_REDSHIFT, PRIM_HALOPROP_KEY};
use crate::{GalhaloError, ParamDict};
use std::str::FromStr;

/// Supported fitting functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcMassFit {
    /// Dutton & Maccio (2014), Planck cosmology, virial overdensity.
    DuttonMaccio14,
}

impl ConcMassFit {
    /// Name accepted by [`FromStr`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DuttonMaccio14 => "dutton_maccio14",
        }
    }
}

impl FromStr for ConcMassFit {
    type Err = GalhaloError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dutton_maccio14" => Ok(Self::DuttonMaccio14),
            other => Err(GalhaloError::UnsupportedRelation(other.to_string())),
        }
    }
}

/// Mean NFW concentration as a function of halo mass and redshift.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcMass {
    prim_haloprop_key: String,
    redshift: f64,
    fit: ConcMassFit,
    scatter_dex: f64,
    params: ParamDict,
}

impl ConcMass {
    const NAME: &'static str = "ConcMass";

    /// Build a relation from the name of its fitting function.
    pub fn new(
        fitting_function: &str,
        prim_haloprop_key: impl Into<String>,
        redshift: f64,
    ) -> Result<Self, GalhaloError> {
        Ok(Self {
            prim_haloprop_key: prim_haloprop_key.into(),
            redshift,
            fit: fitting_function.parse()?,
            scatter_dex: 0.0,
            params: ParamDict::new(),
        })
    }

    /// Set the log-normal scatter (dex) used by realizations.
    #[must_use]
    pub fn with_scatter(mut self, scatter_dex: f64) -> Self {
        self.scatter_dex = scatter_dex;
        self
    }

    /// Fitting function in use.
    #[must_use]
    pub fn fit(&self) -> ConcMassFit {
        self.fit
    }

    /// Mean concentration of halos of the given masses (Msun/h).
    #[must_use]
    pub fn concentration_at(&self, mass: &[f64], redshift: f64) -> Vec<f64> {
        match self.fit {
            ConcMassFit::DuttonMaccio14 => {
                let a = 0.537 + (1.025 - 0.537) * (-0.718 * redshift.powf(1.08)).exp();
                let b = -0.097 + 0.024 * redshift;
                mass.iter()
                    .map(|m| 10f64.powf(a + b * (m / 1e12).log10()))
                    .collect()
            }
        }
    }
}

impl Default for ConcMass {
    fn default() -> Self {
        Self {
            prim_haloprop_key: PRIM_HALOPROP_KEY.to_string(),
            redshift: DEFAULT_REDSHIFT,
            fit: ConcMassFit::DuttonMaccio14,
            scatter_dex: 0.0,
            params: ParamDict::new(),
        }
    }
}

impl ParametrizedRelation for ConcMass {
    fn relation_name(&self) -> &'static str {
        Self::NAME
    }

    fn prim_haloprop_key(&self) -> &str {
        &self.prim_haloprop_key
    }

    fn galprop_key(&self) -> &str {
        "conc_nfw"
    }

    fn param_dict(&self) -> &ParamDict {
        &self.params
    }

    fn set_param(&mut self, key: &str, _value: f64) -> Result<(), GalhaloError> {
        Err(GalhaloError::MissingParameter {
            component: Self::NAME.to_string(),
            key: key.to_string(),
        })
    }

    fn mean(&self, halos: &HaloQuery<'_>) -> Result<Vec<f64>, GalhaloError> {
        let mass = halos.resolve(&self.prim_haloprop_key, "ConcMass::mean")?;
        Ok(self.concentration_at(mass, self.redshift))
    }

    fn scatter(&self, halos: &HaloQuery<'_>) -> Result<Vec<f64>, GalhaloError> {
        let mass = halos.resolve(&self.prim_haloprop_key, "ConcMass::scatter")?;
        Ok(vec![self.scatter_dex; mass.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::CONC_MASS_MODEL;

    #[test]
    fn dutton_maccio_normalization() {
        let model = ConcMass::default();
        assert_eq!(model.fit().as_str(), CONC_MASS_MODEL);
        let conc = model.mean(&HaloQuery::prim_haloprop(&[1e12])).expect("conc");
        assert!((conc[0] - 10f64.powf(1.025)).abs() < 1e-9);
    }

    #[test]
    fn concentration_decreases_with_mass_and_redshift() {
        let model = ConcMass::default();
        let mass = [1e10, 1e12, 1e14, 1e15];
        let z0 = model.concentration_at(&mass, 0.0);
        assert!(z0.windows(2).all(|w| w[1] < w[0]));

        let z1 = model.concentration_at(&mass, 1.0);
        assert!(z1.iter().zip(&z0).all(|(hi_z, lo_z)| hi_z < lo_z));
    }

    #[test]
    fn unknown_fitting_function_is_rejected() {
        let err = ConcMass::new("bullock01", "halo_mvir", 0.0).expect_err("unsupported");
        assert!(matches!(err, GalhaloError::UnsupportedRelation(_)));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn relation_has_no_free_parameters() {
        let mut model = ConcMass::default();
        assert!(model.param_dict().is_empty());
        assert!(model.set_param("a0", 1.0).is_err());
    }
}
