//! Moster et al. (2013) stellar-to-halo mass relation.

use super::{LogNormalScatterModel, ParametrizedRelation, overwrite_param};
use crate::catalog::HaloQuery;
use crate::defaults::{DEFAULT_REDSHIFT, SMHM_HALOPROP_KEY};
use crate::{GalhaloError, ParamDict};

/// Published best-fit parameters of the relation.
const MOSTER13_PARAMS: [(&str, f64); 8] = [
    ("m10", 11.590),
    ("m11", 1.195),
    ("n10", 0.0351),
    ("n11", -0.0247),
    ("beta10", 1.376),
    ("beta11", -0.826),
    ("gamma10", 0.608),
    ("gamma11", 0.329),
];

/// Double power law stellar-to-halo mass relation with redshift evolution:
///
/// `m* = 2 N M [(M / M1)^-beta + (M / M1)^gamma]^-1`
///
/// where each of `log10 M1`, `N`, `beta`, `gamma` evolves linearly in
/// `z / (1 + z)`. Stellar masses are in Msun with h = 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Moster13SmHm {
    prim_haloprop_key: String,
    redshift: f64,
    params: ParamDict,
    scatter: LogNormalScatterModel,
}

impl Moster13SmHm {
    const NAME: &'static str = "Moster13SmHm";

    /// Relation evaluated on `prim_haloprop_key` at a fixed redshift, with the
    /// default constant 0.2 dex scatter.
    #[must_use]
    pub fn new(prim_haloprop_key: impl Into<String>, redshift: f64) -> Self {
        let prim_haloprop_key = prim_haloprop_key.into();
        let scatter = LogNormalScatterModel::default();
        let mut params: ParamDict = MOSTER13_PARAMS.into_iter().collect();
        for (key, value) in scatter.param_dict().iter() {
            params.insert(key, value);
        }
        Self {
            prim_haloprop_key,
            redshift,
            params,
            scatter,
        }
    }

    /// Replace the scatter model with one defined by control points.
    pub fn with_scatter(
        mut self,
        abscissa: Vec<f64>,
        ordinates: &[f64],
    ) -> Result<Self, GalhaloError> {
        let scatter =
            LogNormalScatterModel::new(self.prim_haloprop_key.clone(), abscissa, ordinates)?;
        for key in self.scatter.param_dict().keys() {
            self.params.remove(key);
        }
        for (key, value) in scatter.param_dict().iter() {
            self.params.insert(key, value);
        }
        self.scatter = scatter;
        Ok(self)
    }

    /// Redshift used by [`ParametrizedRelation::mean`].
    #[must_use]
    pub fn redshift(&self) -> f64 {
        self.redshift
    }

    /// Scatter model in use.
    #[must_use]
    pub fn scatter_model(&self) -> &LogNormalScatterModel {
        &self.scatter
    }

    /// Mean stellar mass of halos of the given masses at `redshift`.
    pub fn mean_stellar_mass_at(
        &self,
        mass: &[f64],
        redshift: f64,
    ) -> Result<Vec<f64>, GalhaloError> {
        let p = |key: &str| self.params.require(Self::NAME, key);
        let a = redshift / (1.0 + redshift);
        let m1 = 10f64.powf(p("m10")? + p("m11")? * a);
        let norm = p("n10")? + p("n11")? * a;
        let beta = p("beta10")? + p("beta11")? * a;
        let gamma = p("gamma10")? + p("gamma11")? * a;

        Ok(mass
            .iter()
            .map(|&m| {
                let x = m / m1;
                2.0 * norm * m / (x.powf(-beta) + x.powf(gamma))
            })
            .collect())
    }
}

impl Default for Moster13SmHm {
    fn default() -> Self {
        Self::new(SMHM_HALOPROP_KEY, DEFAULT_REDSHIFT)
    }
}

impl ParametrizedRelation for Moster13SmHm {
    fn relation_name(&self) -> &'static str {
        Self::NAME
    }

    fn prim_haloprop_key(&self) -> &str {
        &self.prim_haloprop_key
    }

    fn galprop_key(&self) -> &str {
        "stellar_mass"
    }

    fn param_dict(&self) -> &ParamDict {
        &self.params
    }

    fn set_param(&mut self, key: &str, value: f64) -> Result<(), GalhaloError> {
        overwrite_param(&mut self.params, Self::NAME, key, value)?;
        if self.scatter.param_dict().contains_key(key) {
            self.scatter.set_param(key, value)?;
        }
        Ok(())
    }

    fn mean(&self, halos: &HaloQuery<'_>) -> Result<Vec<f64>, GalhaloError> {
        let mass = halos.resolve(&self.prim_haloprop_key, "Moster13SmHm::mean")?;
        self.mean_stellar_mass_at(mass, self.redshift)
    }

    fn scatter(&self, halos: &HaloQuery<'_>) -> Result<Vec<f64>, GalhaloError> {
        let mass = halos.resolve(&self.prim_haloprop_key, "Moster13SmHm::scatter")?;
        self.scatter.mean_scatter_from_mass(mass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::stats::mean;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn published_normalization_at_z0() {
        let model = Moster13SmHm::default();
        let mstar = model
            .mean(&HaloQuery::prim_haloprop(&[1e12]))
            .expect("mean");
        assert!((mstar[0] / 3.4275e10 - 1.0).abs() < 1e-3, "got {}", mstar[0]);
    }

    #[test]
    fn relation_is_monotone_in_halo_mass() {
        let model = Moster13SmHm::default();
        let mass: Vec<f64> = (0..40).map(|i| 10f64.powf(10.0 + 0.125 * i as f64)).collect();
        let mstar = model.mean_stellar_mass_at(&mass, 0.0).expect("mean");
        assert!(mstar.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn redshift_evolution_parameters_are_inert_at_z0() {
        let mut model = Moster13SmHm::default();
        let halos = [1e11, 1e12, 1e13];
        let before = model.mean_stellar_mass_at(&halos, 0.0).expect("mean");
        model.set_param("n11", 0.5).expect("set");
        let after = model.mean_stellar_mass_at(&halos, 0.0).expect("mean");
        assert_eq!(before, after);

        let evolved = model.mean_stellar_mass_at(&halos, 1.0).expect("mean");
        assert!(evolved.iter().zip(&before).all(|(a, b)| a != b));
    }

    #[test]
    fn explicit_mass_and_table_agree() {
        let model = Moster13SmHm::default();
        let mass = vec![1e11, 3e12, 2e14];
        let table = Catalog::new()
            .with_column("halo_mpeak", mass.clone())
            .expect("table");
        let a = model.mean(&HaloQuery::prim_haloprop(&mass)).expect("mean");
        let b = model.mean(&HaloQuery::halo_table(&table)).expect("mean");
        assert_eq!(a, b);
    }

    #[test]
    fn scatter_params_are_exposed_and_forwarded() {
        let mut model = Moster13SmHm::default();
        assert_eq!(model.param_dict().get("scatter_model_param1"), Some(0.2));
        model.set_param("scatter_model_param1", 0.35).expect("set");
        let scatter = model
            .scatter(&HaloQuery::prim_haloprop(&[1e13]))
            .expect("scatter");
        assert!((scatter[0] - 0.35).abs() < 1e-12);

        let model = Moster13SmHm::default()
            .with_scatter(vec![11.0, 14.0], &[0.3, 0.15])
            .expect("scatter");
        assert!(model.param_dict().contains_key("scatter_model_param2"));
        assert_eq!(model.scatter_model().abscissa(), &[11.0, 14.0]);
    }

    #[test]
    fn realization_scatters_around_the_mean() {
        let model = Moster13SmHm::default();
        let mass = vec![1e12; 20_000];
        let mut rng = ChaCha8Rng::seed_from_u64(43);
        let mstar = model
            .realization(&HaloQuery::prim_haloprop(&mass), &mut rng)
            .expect("draw");
        let log_mean = mean(&mstar.iter().map(|m| m.log10()).collect::<Vec<_>>()).expect("mean");
        assert!((log_mean - 3.4275e10f64.log10()).abs() < 0.01);
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let mut model = Moster13SmHm::default();
        let err = model.set_param("m12", 1.0).expect_err("unknown");
        assert!(matches!(err, GalhaloError::MissingParameter { .. }));
    }
}
