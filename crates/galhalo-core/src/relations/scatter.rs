//! Log-normal scatter as a polynomial function of log10 halo mass.

use crate::catalog::HaloQuery;
use crate::defaults::{DEFAULT_SCATTER_ABSCISSA, DEFAULT_SMHM_SCATTER, SMHM_HALOPROP_KEY};
use crate::stats::polynomial_from_table;
use crate::{GalhaloError, ParamDict};
use rand::RngCore;

/// Scatter model defined by control points in log10 halo mass.
///
/// The scatter at `abscissa[i]` is parameter `scatter_model_param{i+1}`; between
/// control points the scatter follows the unique minimum-degree polynomial
/// through all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct LogNormalScatterModel {
    prim_haloprop_key: String,
    abscissa: Vec<f64>,
    params: ParamDict,
}

impl LogNormalScatterModel {
    const NAME: &'static str = "LogNormalScatterModel";

    /// Build a scatter model from control points.
    pub fn new(
        prim_haloprop_key: impl Into<String>,
        abscissa: Vec<f64>,
        ordinates: &[f64],
    ) -> Result<Self, GalhaloError> {
        if abscissa.len() != ordinates.len() {
            return Err(GalhaloError::LengthMismatch {
                expected: abscissa.len(),
                found: ordinates.len(),
            });
        }
        if abscissa.is_empty() {
            return Err(GalhaloError::MissingArgument {
                component: Self::NAME.to_string(),
                argument: "scatter_abscissa".to_string(),
            });
        }
        let params = ordinates
            .iter()
            .enumerate()
            .map(|(i, &value)| (Self::param_key(i), value))
            .collect();
        Ok(Self {
            prim_haloprop_key: prim_haloprop_key.into(),
            abscissa,
            params,
        })
    }

    /// Parameter name of the `i`-th (0-based) control point.
    #[must_use]
    pub fn param_key(i: usize) -> String {
        format!("scatter_model_param{}", i + 1)
    }

    /// Control-point abscissa (log10 halo mass).
    #[must_use]
    pub fn abscissa(&self) -> &[f64] {
        &self.abscissa
    }

    /// Control-point scatter values, in abscissa order.
    pub fn ordinates(&self) -> Result<Vec<f64>, GalhaloError> {
        (0..self.abscissa.len())
            .map(|i| self.params.require(Self::NAME, &Self::param_key(i)))
            .collect()
    }

    /// Column name of the halo property the scatter depends on.
    #[must_use]
    pub fn prim_haloprop_key(&self) -> &str {
        &self.prim_haloprop_key
    }

    /// Current parameters.
    #[must_use]
    pub fn param_dict(&self) -> &ParamDict {
        &self.params
    }

    /// Overwrite one control-point value.
    pub fn set_param(&mut self, key: &str, value: f64) -> Result<(), GalhaloError> {
        super::overwrite_param(&mut self.params, Self::NAME, key, value)
    }

    /// Scatter (dex) at each halo mass.
    pub fn mean_scatter_from_mass(&self, mass: &[f64]) -> Result<Vec<f64>, GalhaloError> {
        let ordinates = self.ordinates()?;
        mass.iter()
            .map(|m| polynomial_from_table(&self.abscissa, &ordinates, m.log10()))
            .collect()
    }

    /// Scatter (dex) of every input halo.
    pub fn mean_scatter(&self, halos: &HaloQuery<'_>) -> Result<Vec<f64>, GalhaloError> {
        let mass = halos.resolve(&self.prim_haloprop_key, "LogNormalScatterModel::mean_scatter")?;
        self.mean_scatter_from_mass(mass)
    }

    /// Gaussian offsets (dex) with the modelled scatter, one per halo.
    pub fn scatter_realization(
        &self,
        halos: &HaloQuery<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>, GalhaloError> {
        let sigma = self.mean_scatter(halos)?;
        super::gaussian_offsets(&sigma, rng)
    }
}

impl Default for LogNormalScatterModel {
    fn default() -> Self {
        Self {
            prim_haloprop_key: SMHM_HALOPROP_KEY.to_string(),
            abscissa: vec![DEFAULT_SCATTER_ABSCISSA],
            params: [(Self::param_key(0), DEFAULT_SMHM_SCATTER)]
                .into_iter()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::mean;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn std_dev(values: &[f64]) -> f64 {
        let m = mean(values).expect("mean");
        (values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64).sqrt()
    }

    #[test]
    fn default_model_is_constant() {
        let model = LogNormalScatterModel::default();
        assert_eq!(model.abscissa(), &[12.0]);
        assert_eq!(model.ordinates().expect("ordinates"), vec![0.2]);

        let scatter = model
            .mean_scatter(&HaloQuery::prim_haloprop(&[1e11, 1e12, 1e15]))
            .expect("scatter");
        assert!(scatter.iter().all(|s| (s - 0.2).abs() < 1e-12));
    }

    #[test]
    fn two_point_model_interpolates_and_tracks_param_updates() {
        let mut model =
            LogNormalScatterModel::new("halo_mpeak", vec![12.0, 15.0], &[0.3, 0.1]).expect("model");
        let keys: Vec<_> = model.param_dict().keys().collect();
        assert_eq!(keys, vec!["scatter_model_param1", "scatter_model_param2"]);

        let mass = [1e12, 10f64.powf(13.5), 1e15];
        let scatter = model
            .mean_scatter(&HaloQuery::prim_haloprop(&mass))
            .expect("scatter");
        assert!((scatter[0] - 0.3).abs() < 1e-9);
        assert!((scatter[1] - 0.2).abs() < 1e-9);
        assert!((scatter[2] - 0.1).abs() < 1e-9);

        model.set_param("scatter_model_param2", 0.5).expect("set");
        let scatter = model
            .mean_scatter(&HaloQuery::prim_haloprop(&mass))
            .expect("scatter");
        assert!((scatter[1] - 0.4).abs() < 1e-9);
        assert!((scatter[2] - 0.5).abs() < 1e-9);

        assert!(model.set_param("scatter_model_param3", 0.1).is_err());
    }

    #[test]
    fn realization_has_requested_width() {
        let model = LogNormalScatterModel::default();
        let mass = vec![1e12; 10_000];
        let mut rng = ChaCha8Rng::seed_from_u64(43);
        let offsets = model
            .scatter_realization(&HaloQuery::prim_haloprop(&mass), &mut rng)
            .expect("draw");
        assert!((std_dev(&offsets) - 0.2).abs() < 0.01);
    }
}
