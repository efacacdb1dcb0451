//! Leauthaud et al. (2011) HOD derived from a stellar-to-halo mass relation.

use super::{ComponentSpec, OccupationModel};
use crate::catalog::HaloQuery;
use crate::defaults::{
    DEFAULT_REDSHIFT, KNEE_GRID_LOG_MAX, KNEE_GRID_LOG_MIN, KNEE_GRID_NUM,
};
use crate::interp::MonotoneQuadratic;
use crate::relations::{Moster13SmHm, ParametrizedRelation};
use crate::stats::logspace;
use crate::{GalhaloError, ParamDict};
use statrs::function::erf::erf;
use std::f64::consts::SQRT_2;
use tracing::debug;

const PUBLICATIONS: [&str; 2] = ["arXiv:1103.2077", "arXiv:1104.0928"];

/// Satellite parameters, SIG_MOD1 of Table 5 of arXiv:1104.0928, lowest
/// redshift bin.
const SATELLITE_PARAMS: [(&str, f64); 5] = [
    ("alphasat", 1.0),
    ("bsat", 10.62),
    ("bcut", 1.47),
    ("betacut", -0.13),
    ("betasat", 0.859),
];

// =============================================================================
// CENTRALS
// =============================================================================

/// Central occupation from the scatter of a stellar-to-halo mass relation:
///
/// `<Ncen> = 0.5 (1 - erf((threshold - log10 m*(M)) / (sqrt(2) sigma(M))))`
///
/// where `threshold` is a log10 stellar mass. The parameters are those of the
/// relation.
#[derive(Debug)]
pub struct Leauthaud11Cens {
    spec: ComponentSpec,
    smhm: Box<dyn ParametrizedRelation>,
}

impl Leauthaud11Cens {
    /// Centrals above a log10 stellar mass threshold, using [`Moster13SmHm`]
    /// at redshift zero.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        let spec = ComponentSpec::centrals(threshold);
        let smhm = Moster13SmHm::new(spec.prim_haloprop_key.clone(), DEFAULT_REDSHIFT);
        Self::with_smhm(spec, Box::new(smhm))
    }

    /// Centrals with an explicit identity and relation.
    #[must_use]
    pub fn with_smhm(spec: ComponentSpec, smhm: Box<dyn ParametrizedRelation>) -> Self {
        Self { spec, smhm }
    }

    /// The stellar-to-halo mass relation.
    #[must_use]
    pub fn smhm(&self) -> &dyn ParametrizedRelation {
        self.smhm.as_ref()
    }

    fn set_gal_type(&mut self, gal_type: String) {
        self.spec.gal_type = gal_type;
    }
}

impl OccupationModel for Leauthaud11Cens {
    fn spec(&self) -> &ComponentSpec {
        &self.spec
    }

    fn param_dict(&self) -> &ParamDict {
        self.smhm.param_dict()
    }

    fn set_param(&mut self, key: &str, value: f64) -> Result<(), GalhaloError> {
        self.smhm.set_param(key, value)
    }

    fn mean_occupation(&self, halos: &HaloQuery<'_>) -> Result<Vec<f64>, GalhaloError> {
        let mstar = self.smhm.mean(halos)?;
        let scatter = self.smhm.scatter(halos)?;
        let threshold = self.spec.threshold;
        Ok(mstar
            .iter()
            .zip(&scatter)
            .map(|(m, s)| 0.5 * (1.0 - erf((threshold - m.log10()) / (SQRT_2 * s))))
            .collect())
    }

    fn publications(&self) -> &[&'static str] {
        &PUBLICATIONS
    }
}

// =============================================================================
// SATELLITES
// =============================================================================

/// Satellite occupation with an exponential cutoff:
///
/// `<Nsat> = exp(-Mcut / M) (M / Msat)^alphasat`
///
/// `Msat` and `Mcut` are derived from the halo mass at which the central
/// relation reaches the stellar mass threshold (the knee):
/// `Msat = bsat 1e12 (knee / 1e12)^betasat` and
/// `Mcut = bcut 1e12 (knee / 1e12)^betacut`. They are recomputed whenever a
/// parameter of the satellites or of their central relation changes.
#[derive(Debug)]
pub struct Leauthaud11Sats {
    spec: ComponentSpec,
    params: ParamDict,
    central: Leauthaud11Cens,
    modulate_with_cenocc: bool,
    knee_grid: Vec<f64>,
    knee: f64,
    msat: f64,
    mcut: f64,
}

impl Leauthaud11Sats {
    const NAME: &'static str = "Leauthaud11Sats";

    /// Satellites above a log10 stellar mass threshold, without modulation.
    pub fn new(threshold: f64) -> Result<Self, GalhaloError> {
        let spec = ComponentSpec::satellites(threshold);
        let central = Leauthaud11Cens::new(threshold);
        Self::with_central(spec, central)
    }

    /// Satellites whose knee is derived from the relation of `central`.
    pub fn with_central(spec: ComponentSpec, central: Leauthaud11Cens) -> Result<Self, GalhaloError> {
        let mut model = Self {
            spec,
            params: SATELLITE_PARAMS.into_iter().collect(),
            central,
            modulate_with_cenocc: false,
            knee_grid: logspace(KNEE_GRID_LOG_MIN, KNEE_GRID_LOG_MAX, KNEE_GRID_NUM),
            knee: f64::NAN,
            msat: f64::NAN,
            mcut: f64::NAN,
        };
        model.update_satellite_params()?;
        Ok(model)
    }

    /// Multiply the satellite mean by the mean of the central population,
    /// relabelled `gal_type_centrals`.
    #[must_use]
    pub fn modulate_with_cenocc(mut self, gal_type_centrals: impl Into<String>) -> Self {
        self.central.set_gal_type(gal_type_centrals.into());
        self.modulate_with_cenocc = true;
        self
    }

    /// Whether the satellite mean is modulated by the central population.
    #[must_use]
    pub fn modulates_with_cenocc(&self) -> bool {
        self.modulate_with_cenocc
    }

    /// Central population providing the stellar-to-halo mass relation.
    #[must_use]
    pub fn central(&self) -> &Leauthaud11Cens {
        &self.central
    }

    /// Halo mass at which the mean stellar mass equals the threshold.
    #[must_use]
    pub fn knee(&self) -> f64 {
        self.knee
    }

    /// Derived satellite mass scale.
    #[must_use]
    pub fn msat(&self) -> f64 {
        self.msat
    }

    /// Derived cutoff mass scale.
    #[must_use]
    pub fn mcut(&self) -> f64 {
        self.mcut
    }

    /// Tabulate the inverse of the central relation on the knee grid and
    /// derive `(knee, Msat, Mcut)` without touching the current scales.
    ///
    /// `changed` names the parameter update being tried, for error reports.
    fn derive_scales(&self, changed: Option<(&str, f64)>) -> Result<SatelliteScales, GalhaloError> {
        let not_invertible = || {
            let cause = changed
                .map(|(key, value)| format!(" after setting {key} = {value}"))
                .unwrap_or_default();
            GalhaloError::InvalidConfig(format!(
                "{}: central relation {} is not invertible on the knee grid{}",
                Self::NAME,
                self.central.smhm().relation_name(),
                cause
            ))
        };

        let mstar = self
            .central
            .smhm()
            .mean(&HaloQuery::prim_haloprop(&self.knee_grid))?;
        let log_mstar: Vec<f64> = mstar.iter().map(|m| m.log10()).collect();
        if log_mstar.iter().any(|m| !m.is_finite()) {
            return Err(not_invertible());
        }
        let log_mhalo: Vec<f64> = self.knee_grid.iter().map(|m| m.log10()).collect();
        let inverse = MonotoneQuadratic::new(&log_mstar, &log_mhalo).map_err(|_| not_invertible())?;
        let knee = 10f64.powf(inverse.eval(self.spec.threshold));

        let p = |key: &str| self.params.require(Self::NAME, key);
        let scaled_knee = knee / 1e12;
        Ok(SatelliteScales {
            knee,
            msat: 1e12 * p("bsat")? * scaled_knee.powf(p("betasat")?),
            mcut: 1e12 * p("bcut")? * scaled_knee.powf(p("betacut")?),
        })
    }

    fn commit_scales(&mut self, scales: SatelliteScales) {
        self.knee = scales.knee;
        self.msat = scales.msat;
        self.mcut = scales.mcut;
        debug!(
            gal_type = %self.spec.gal_type,
            knee = self.knee,
            msat = self.msat,
            mcut = self.mcut,
            "satellite mass scales rebuilt"
        );
    }

    fn update_satellite_params(&mut self) -> Result<(), GalhaloError> {
        let scales = self.derive_scales(None)?;
        self.commit_scales(scales);
        Ok(())
    }

    /// Write `value` to the satellite table or to the central relation.
    fn write_param(&mut self, own: bool, key: &str, value: f64) -> Result<(), GalhaloError> {
        if own {
            self.params.insert(key, value);
            Ok(())
        } else {
            self.central.set_param(key, value)
        }
    }
}

/// Mass scales derived from the knee of the central relation.
#[derive(Debug, Clone, Copy)]
struct SatelliteScales {
    knee: f64,
    msat: f64,
    mcut: f64,
}

impl OccupationModel for Leauthaud11Sats {
    fn spec(&self) -> &ComponentSpec {
        &self.spec
    }

    fn param_dict(&self) -> &ParamDict {
        &self.params
    }

    /// Parameters and derived scales change together: if the scales cannot
    /// be rebuilt, the previous value is restored and the error returned.
    fn set_param(&mut self, key: &str, value: f64) -> Result<(), GalhaloError> {
        let own = self.params.contains_key(key);
        let previous = if own {
            self.params.get(key)
        } else {
            self.central.param_dict().get(key)
        };
        let Some(previous) = previous else {
            return Err(GalhaloError::MissingParameter {
                component: Self::NAME.to_string(),
                key: key.to_string(),
            });
        };

        self.write_param(own, key, value)?;
        match self.derive_scales(Some((key, value))) {
            Ok(scales) => {
                self.commit_scales(scales);
                Ok(())
            }
            Err(err) => self.write_param(own, key, previous).and(Err(err)),
        }
    }

    fn mean_occupation(&self, halos: &HaloQuery<'_>) -> Result<Vec<f64>, GalhaloError> {
        let mass = halos.resolve(&self.spec.prim_haloprop_key, "Leauthaud11Sats::mean_occupation")?;
        let alphasat = self.params.require(Self::NAME, "alphasat")?;
        let mut mean: Vec<f64> = mass
            .iter()
            .map(|&m| (-self.mcut / m).exp() * (m / self.msat).powf(alphasat))
            .collect();
        if self.modulate_with_cenocc {
            let ncen = self.central.mean_occupation(halos)?;
            for (nsat, ncen) in mean.iter_mut().zip(ncen) {
                *nsat *= ncen;
            }
        }
        Ok(mean)
    }

    fn publications(&self) -> &[&'static str] {
        &PUBLICATIONS
    }
}

// =============================================================================
// TESTS
// =============================================================================
