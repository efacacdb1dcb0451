//! # Model Configuration
//!
//! TOML description of a composite HOD model and an optional CAM model.
//!
//! ```toml
//! [[population]]
//! model = "zheng07_cens"
//! threshold = -20.0
//!
//! [[population]]
//! model = "zheng07_sats"
//! threshold = -20.0
//! modulate_with_cenocc = true
//! gal_type_centrals = "centrals"
//! param_dict = { alpha = 1.1 }
//! ```
//!
//! Every field except `model` has a default. Construction-time validation
//! happens in [`ModelConfig::build_model`], so an invalid document fails
//! before any halo is evaluated.

use crate::cam::CamConfig;
use crate::defaults::{DEFAULT_LUMINOSITY_THRESHOLD, DEFAULT_REDSHIFT, DEFAULT_STELLAR_MASS_THRESHOLD};
use crate::occupation::{
    ComponentSpec, HodModel, Leauthaud11Cens, Leauthaud11Sats, OccupationModel, Zheng07Cens,
    Zheng07Sats,
};
use crate::relations::Moster13SmHm;
use crate::{GalhaloError, OccupationBound, ParamDict};
use serde::{Deserialize, Serialize};
use tracing::debug;

// =============================================================================
// DOCUMENT
// =============================================================================

/// Occupation component implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Zheng07Cens,
    Zheng07Sats,
    Leauthaud11Cens,
    Leauthaud11Sats,
}

impl ModelKind {
    fn is_central(self) -> bool {
        matches!(self, ModelKind::Zheng07Cens | ModelKind::Leauthaud11Cens)
    }

    fn default_threshold(self) -> f64 {
        match self {
            ModelKind::Zheng07Cens | ModelKind::Zheng07Sats => DEFAULT_LUMINOSITY_THRESHOLD,
            ModelKind::Leauthaud11Cens | ModelKind::Leauthaud11Sats => {
                DEFAULT_STELLAR_MASS_THRESHOLD
            }
        }
    }
}

/// One `[[population]]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PopulationConfig {
    pub model: ModelKind,
    #[serde(default)]
    pub gal_type: Option<String>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub prim_haloprop_key: Option<String>,
    #[serde(default)]
    pub sec_haloprop_key: Option<String>,
    /// `1.0` or `inf`.
    #[serde(default)]
    pub occupation_bound: Option<f64>,
    #[serde(default)]
    pub publication: Option<String>,
    #[serde(default)]
    pub modulate_with_cenocc: bool,
    #[serde(default)]
    pub gal_type_centrals: Option<String>,
    /// Stellar-to-halo mass relation of `leauthaud11_*` models.
    #[serde(default)]
    pub smhm_model: Option<String>,
    #[serde(default)]
    pub redshift: Option<f64>,
    #[serde(default)]
    pub scatter_abscissa: Option<Vec<f64>>,
    #[serde(default)]
    pub scatter_ordinates: Option<Vec<f64>>,
    /// Overrides applied after the published defaults.
    #[serde(default)]
    pub param_dict: ParamDict,
}

/// A full configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    #[serde(default)]
    pub population: Vec<PopulationConfig>,
    #[serde(default)]
    pub cam: Option<CamConfig>,
}

impl ModelConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, GalhaloError> {
        let config: Self =
            toml::from_str(source).map_err(|e| GalhaloError::InvalidConfig(e.to_string()))?;
        if config.population.is_empty() && config.cam.is_none() {
            return Err(GalhaloError::InvalidConfig(
                "configuration defines neither a population nor a cam model".to_string(),
            ));
        }
        Ok(config)
    }

    /// Render back to TOML.
    pub fn to_toml_string(&self) -> Result<String, GalhaloError> {
        toml::to_string(self).map_err(|e| GalhaloError::InvalidConfig(e.to_string()))
    }

    /// Build one component per population.
    pub fn build_model(&self) -> Result<HodModel, GalhaloError> {
        let mut model = HodModel::new();
        for population in &self.population {
            model.insert(population.build()?)?;
        }
        debug!(populations = model.len(), "composite model built");
        Ok(model)
    }

    /// CAM section, if present.
    #[must_use]
    pub fn cam_config(&self) -> Option<&CamConfig> {
        self.cam.as_ref()
    }
}

// =============================================================================
// COMPONENT CONSTRUCTION
// =============================================================================

impl PopulationConfig {
    /// Population with every optional field at its default.
    #[must_use]
    pub fn new(model: ModelKind) -> Self {
        Self {
            model,
            gal_type: None,
            threshold: None,
            prim_haloprop_key: None,
            sec_haloprop_key: None,
            occupation_bound: None,
            publication: None,
            modulate_with_cenocc: false,
            gal_type_centrals: None,
            smhm_model: None,
            redshift: None,
            scatter_abscissa: None,
            scatter_ordinates: None,
            param_dict: ParamDict::new(),
        }
    }

    fn component_name(&self) -> &'static str {
        match self.model {
            ModelKind::Zheng07Cens => "Zheng07Cens",
            ModelKind::Zheng07Sats => "Zheng07Sats",
            ModelKind::Leauthaud11Cens => "Leauthaud11Cens",
            ModelKind::Leauthaud11Sats => "Leauthaud11Sats",
        }
    }

    fn missing(&self, argument: &str) -> GalhaloError {
        GalhaloError::MissingArgument {
            component: self.component_name().to_string(),
            argument: argument.to_string(),
        }
    }

    /// Identity of the population with defaults filled in.
    pub fn spec(&self) -> Result<ComponentSpec, GalhaloError> {
        let threshold = self.threshold.unwrap_or(self.model.default_threshold());
        let mut spec = if self.model.is_central() {
            ComponentSpec::centrals(threshold)
        } else {
            ComponentSpec::satellites(threshold)
        };
        if let Some(gal_type) = &self.gal_type {
            spec = spec.with_gal_type(gal_type.clone());
        }
        if let Some(key) = &self.prim_haloprop_key {
            spec = spec.with_prim_haloprop_key(key.clone());
        }
        if let Some(key) = &self.sec_haloprop_key {
            spec = spec.with_sec_haloprop_key(key.clone());
        }
        if let Some(bound) = self.occupation_bound {
            spec = spec.with_occupation_bound(OccupationBound::try_from(bound)?);
        }
        Ok(spec)
    }

    fn gal_type_centrals(&self) -> Result<Option<&str>, GalhaloError> {
        match (self.modulate_with_cenocc, self.gal_type_centrals.as_deref()) {
            (false, _) => Ok(None),
            (true, Some(name)) => Ok(Some(name)),
            (true, None) => Err(self.missing("gal_type_centrals")),
        }
    }

    fn smhm(&self, prim_haloprop_key: &str) -> Result<Moster13SmHm, GalhaloError> {
        match self.smhm_model.as_deref() {
            None | Some("moster13") | Some("Moster13SmHm") => {}
            Some(other) => return Err(GalhaloError::UnsupportedRelation(other.to_string())),
        }
        let relation =
            Moster13SmHm::new(prim_haloprop_key, self.redshift.unwrap_or(DEFAULT_REDSHIFT));
        match (&self.scatter_abscissa, &self.scatter_ordinates) {
            (None, None) => Ok(relation),
            (Some(abscissa), Some(ordinates)) => relation.with_scatter(abscissa.clone(), ordinates),
            (Some(_), None) => Err(self.missing("scatter_ordinates")),
            (None, Some(_)) => Err(self.missing("scatter_abscissa")),
        }
    }

    fn leauthaud11_central(&self, spec: &ComponentSpec) -> Result<Leauthaud11Cens, GalhaloError> {
        let central_spec = ComponentSpec::centrals(spec.threshold)
            .with_prim_haloprop_key(spec.prim_haloprop_key.clone());
        let smhm = self.smhm(&spec.prim_haloprop_key)?;
        Ok(Leauthaud11Cens::with_smhm(central_spec, Box::new(smhm)))
    }

    /// Build the occupation component, then apply `param_dict` overrides.
    pub fn build(&self) -> Result<Box<dyn OccupationModel>, GalhaloError> {
        let spec = self.spec()?;
        let publication = self.publication.as_deref().unwrap_or("Zheng07");
        let mut component: Box<dyn OccupationModel> = match self.model {
            ModelKind::Zheng07Cens => Box::new(Zheng07Cens::from_publication(spec, publication)?),
            ModelKind::Zheng07Sats => {
                let sats = Zheng07Sats::from_publication(spec, publication)?;
                match self.gal_type_centrals()? {
                    Some(name) => Box::new(sats.modulate_with_cenocc(name)?),
                    None => Box::new(sats),
                }
            }
            ModelKind::Leauthaud11Cens => {
                let smhm = self.smhm(&spec.prim_haloprop_key)?;
                Box::new(Leauthaud11Cens::with_smhm(spec, Box::new(smhm)))
            }
            ModelKind::Leauthaud11Sats => {
                let central = self.leauthaud11_central(&spec)?;
                let sats = Leauthaud11Sats::with_central(spec, central)?;
                match self.gal_type_centrals()? {
                    Some(name) => Box::new(sats.modulate_with_cenocc(name)),
                    None => Box::new(sats),
                }
            }
        };
        for (key, value) in self.param_dict.iter() {
            component.set_param(key, value)?;
        }
        Ok(component)
    }
}

// =============================================================================
// TESTS
// =============================================================================
