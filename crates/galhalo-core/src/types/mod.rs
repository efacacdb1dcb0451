//! # Core Type Definitions
//!
//! This module contains the types shared by every model in the crate:
//! - Parameter storage (`ParamDict`)
//! - Occupation bounds (`OccupationBound`)
//! - Error types (`GalhaloError`)
//!
//! ## Determinism Guarantees
//!
//! Parameter mappings are backed by `BTreeMap`, so iteration order (and
//! therefore every printed or serialized parameter set) is stable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// =============================================================================
// PARAMETER MAPPING
// =============================================================================

/// Mapping from parameter name to value.
///
/// Each occupation component or relation exclusively owns one `ParamDict`.
/// Entries may be perturbed after construction and the model re-evaluated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamDict(BTreeMap<String, f64>);

impl ParamDict {
    /// Create an empty parameter mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a parameter value, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// Get a parameter required by `component`'s formula.
    ///
    /// Returns `GalhaloError::MissingParameter` if the key is absent.
    pub fn require(&self, component: &str, key: &str) -> Result<f64, GalhaloError> {
        self.get(key).ok_or_else(|| GalhaloError::MissingParameter {
            component: component.to_string(),
            key: key.to_string(),
        })
    }

    /// Insert or overwrite a parameter, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) -> Option<f64> {
        self.0.insert(key.into(), value)
    }

    /// Remove a parameter, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<f64> {
        self.0.remove(key)
    }

    /// Check whether a parameter is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Parameter names in name order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the mapping is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ParamDict {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// =============================================================================
// OCCUPATION BOUND
// =============================================================================

/// Upper bound on the number of galaxies of one population per halo.
///
/// Only two values are supported: exactly one (central-like populations,
/// Bernoulli realizations) and unbounded (satellite-like populations, Poisson
/// realizations). Any other value is rejected when the bound is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum OccupationBound {
    /// At most one galaxy per halo.
    One,
    /// Any non-negative number of galaxies per halo.
    Unbounded,
}

impl OccupationBound {
    /// The bound as a float (`1.0` or `f64::INFINITY`).
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            OccupationBound::One => 1.0,
            OccupationBound::Unbounded => f64::INFINITY,
        }
    }
}

impl TryFrom<f64> for OccupationBound {
    type Error = GalhaloError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value == 1.0 {
            Ok(OccupationBound::One)
        } else if value == f64::INFINITY {
            Ok(OccupationBound::Unbounded)
        } else {
            Err(GalhaloError::UnsupportedOccupationBound(value))
        }
    }
}

impl From<OccupationBound> for f64 {
    fn from(bound: OccupationBound) -> Self {
        bound.as_f64()
    }
}

impl std::fmt::Display for OccupationBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OccupationBound::One => write!(f, "1"),
            OccupationBound::Unbounded => write!(f, "inf"),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while building or evaluating galhalo models.
///
/// Two families:
/// - configuration errors, raised when a component is built and never recoverable
///   by the component itself
/// - input errors, raised by a single call that was handed unusable arguments
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GalhaloError {
    /// A required construction argument was not supplied.
    #[error("`{argument}` is a required argument to build {component}")]
    MissingArgument {
        /// Component being built.
        component: String,
        /// Name of the missing argument.
        argument: String,
    },

    /// A parameter required by a formula is absent from the param_dict.
    #[error("parameter `{key}` is missing from the param_dict of {component}")]
    MissingParameter {
        /// Component whose formula needs the parameter.
        component: String,
        /// Missing parameter name.
        key: String,
    },

    /// Only 1 and infinity are permitted occupation bounds.
    #[error("occupation_bound must be 1 or infinity, got {0}")]
    UnsupportedOccupationBound(f64),

    /// The threshold does not match any row of a published parameter table.
    #[error("threshold {threshold} does not match any tabulated value of {publication}")]
    UnpublishedThreshold {
        /// Publication whose table was consulted.
        publication: String,
        /// Requested threshold.
        threshold: f64,
    },

    /// The named publication has no supported best-fit parameter set.
    #[error("unsupported publication: {0}")]
    UnsupportedPublication(String),

    /// The named relation or fitting function is not implemented.
    #[error("unsupported relation or fitting function: {0}")]
    UnsupportedRelation(String),

    /// Bin edges are empty, non-finite or not strictly increasing.
    #[error("invalid bins: {0}")]
    InvalidBins(String),

    /// A CAM correlation strength other than unity was requested.
    #[error("correlation strength {0} is not supported, only 1.0 (zero scatter) is implemented")]
    UnsupportedCorrelationStrength(f64),

    /// No bin of the CAM reference sample is populated well enough to fit.
    #[error("no bin of the reference sample holds more than {minimum} rows")]
    InsufficientReferenceSample {
        /// The minimum sampling requirement that no bin exceeded.
        minimum: usize,
    },

    /// The configuration document could not be parsed or validated.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Neither a direct property array nor a halo table was supplied.
    #[error("must pass either `prim_haloprop` or `halo_table` to {0}")]
    MissingHaloInput(String),

    /// A catalog column was requested that does not exist.
    #[error("column not found: {0}")]
    MissingColumn(String),

    /// Two arrays that must be aligned have different lengths.
    #[error("length mismatch: expected {expected}, found {found}")]
    LengthMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        found: usize,
    },

    /// A composite model was asked about a population it does not hold.
    #[error("unknown gal_type: {0}")]
    UnknownGalType(String),
}

impl GalhaloError {
    /// Whether this error belongs to the configuration family.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            GalhaloError::MissingArgument { .. }
                | GalhaloError::MissingParameter { .. }
                | GalhaloError::UnsupportedOccupationBound(_)
                | GalhaloError::UnpublishedThreshold { .. }
                | GalhaloError::UnsupportedPublication(_)
                | GalhaloError::UnsupportedRelation(_)
                | GalhaloError::InvalidBins(_)
                | GalhaloError::UnsupportedCorrelationStrength(_)
                | GalhaloError::InsufficientReferenceSample { .. }
                | GalhaloError::InvalidConfig(_)
        )
    }

    /// Whether this error belongs to the call-site input family.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        !self.is_configuration_error()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_dict_require_reports_component_and_key() {
        let params: ParamDict = [("alpha", 1.06)].into_iter().collect();
        assert_eq!(params.require("sats", "alpha"), Ok(1.06));

        let err = params.require("sats", "logM1").expect_err("missing key");
        assert_eq!(
            err,
            GalhaloError::MissingParameter {
                component: "sats".to_string(),
                key: "logM1".to_string(),
            }
        );
        assert!(err.is_configuration_error());
    }

    #[test]
    fn param_dict_iterates_in_name_order() {
        let mut params = ParamDict::new();
        params.insert("sigma_logM", 0.26);
        params.insert("logMmin", 12.02);

        let keys: Vec<_> = params.keys().collect();
        assert_eq!(keys, vec!["logMmin", "sigma_logM"]);
    }

    #[test]
    fn occupation_bound_accepts_only_one_and_infinity() {
        assert_eq!(OccupationBound::try_from(1.0), Ok(OccupationBound::One));
        assert_eq!(
            OccupationBound::try_from(f64::INFINITY),
            Ok(OccupationBound::Unbounded)
        );
        assert_eq!(
            OccupationBound::try_from(2.0),
            Err(GalhaloError::UnsupportedOccupationBound(2.0))
        );
    }

    #[test]
    fn missing_halo_input_is_an_input_error() {
        let err = GalhaloError::MissingHaloInput("mean_occupation".to_string());
        assert!(err.is_input_error());
        assert!(!err.is_configuration_error());
    }
}
