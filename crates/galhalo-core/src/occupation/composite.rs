//! Composite HOD model: one occupation component per galaxy population.

use super::{Leauthaud11Cens, Leauthaud11Sats, OccupationModel, Zheng07Cens, Zheng07Sats};
use crate::catalog::HaloQuery;
use crate::GalhaloError;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Occupation counts of one population over a halo catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupationRealization {
    /// Population label.
    pub gal_type: String,
    /// Number of galaxies in each halo, aligned with the input halos.
    pub counts: Vec<u32>,
}

impl OccupationRealization {
    /// Total number of galaxies.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// Index of the host halo of every galaxy, each halo repeated by its count.
    #[must_use]
    pub fn host_halo_indices(&self) -> Vec<usize> {
        self.counts
            .iter()
            .enumerate()
            .flat_map(|(i, &c)| std::iter::repeat_n(i, c as usize))
            .collect()
    }
}

/// A set of occupation components keyed by `gal_type`.
///
/// Populations are visited in `gal_type` order, so a realization drawn from a
/// seeded stream is reproducible.
#[derive(Debug, Default)]
pub struct HodModel {
    components: BTreeMap<String, Box<dyn OccupationModel>>,
}

impl HodModel {
    /// Create an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Zheng et al. (2007) centrals and satellites at a luminosity threshold.
    pub fn zheng07(threshold: f64) -> Result<Self, GalhaloError> {
        let mut model = Self::new();
        model.insert(Box::new(Zheng07Cens::new(threshold)?))?;
        model.insert(Box::new(Zheng07Sats::new(threshold)?))?;
        Ok(model)
    }

    /// Leauthaud et al. (2011) centrals and satellites at a log10 stellar
    /// mass threshold.
    pub fn leauthaud11(threshold: f64) -> Result<Self, GalhaloError> {
        let mut model = Self::new();
        model.insert(Box::new(Leauthaud11Cens::new(threshold)))?;
        model.insert(Box::new(Leauthaud11Sats::new(threshold)?))?;
        Ok(model)
    }

    /// Add a component; its `gal_type` must not be taken.
    pub fn insert(&mut self, component: Box<dyn OccupationModel>) -> Result<(), GalhaloError> {
        let gal_type = component.gal_type().to_string();
        if self.components.contains_key(&gal_type) {
            return Err(GalhaloError::InvalidConfig(format!(
                "duplicate gal_type: {gal_type}"
            )));
        }
        self.components.insert(gal_type, component);
        Ok(())
    }

    /// Population labels in iteration order.
    pub fn gal_types(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    /// Number of populations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the model has no populations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Component of one population.
    pub fn component(&self, gal_type: &str) -> Result<&dyn OccupationModel, GalhaloError> {
        self.components
            .get(gal_type)
            .map(|c| c.as_ref())
            .ok_or_else(|| GalhaloError::UnknownGalType(gal_type.to_string()))
    }

    /// Overwrite one parameter of one population.
    pub fn set_param(&mut self, gal_type: &str, key: &str, value: f64) -> Result<(), GalhaloError> {
        self.components
            .get_mut(gal_type)
            .ok_or_else(|| GalhaloError::UnknownGalType(gal_type.to_string()))?
            .set_param(key, value)
    }

    /// Mean occupation of one population.
    pub fn mean_occupation(
        &self,
        gal_type: &str,
        halos: &HaloQuery<'_>,
    ) -> Result<Vec<f64>, GalhaloError> {
        self.component(gal_type)?.mean_occupation(halos)
    }

    /// One realization of the occupation of one population.
    pub fn mc_occupation(
        &self,
        gal_type: &str,
        halos: &HaloQuery<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<u32>, GalhaloError> {
        self.component(gal_type)?.mc_occupation(halos, rng)
    }

    /// One realization of every population, drawn in `gal_type` order from
    /// a single stream.
    pub fn populate_occupations(
        &self,
        halos: &HaloQuery<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<OccupationRealization>, GalhaloError> {
        let mut realizations = Vec::with_capacity(self.components.len());
        for (gal_type, component) in &self.components {
            let counts = component.mc_occupation(halos, rng)?;
            let realization = OccupationRealization {
                gal_type: gal_type.clone(),
                counts,
            };
            debug!(gal_type = %gal_type, total = realization.total(), "populated occupations");
            realizations.push(realization);
        }
        Ok(realizations)
    }

    /// [`HodModel::populate_occupations`] with a fresh stream seeded by `seed`.
    pub fn populate_occupations_seeded(
        &self,
        halos: &HaloQuery<'_>,
        seed: u64,
    ) -> Result<Vec<OccupationRealization>, GalhaloError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.populate_occupations(halos, &mut rng)
    }
}
