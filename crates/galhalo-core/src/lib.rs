//! # galhalo-core
//!
//! The galaxy-halo connection engine for galhalo - THE MODELS.
//!
//! This crate maps dark-matter halo catalogs to galaxy populations:
//! - `occupation`: how many galaxies of each population a halo hosts (HOD)
//! - `relations`: stellar-to-halo mass, concentration-mass and scatter
//! - `cam`: conditional abundance matching of a galaxy property
//!
//! ## Architectural Constraints
//!
//! - Pure Rust with NO async, NO network and NO disk I/O
//! - Every stochastic operation draws from a caller-supplied stream, all
//!   draws taken before any data-dependent branching
//! - Models validate their configuration at construction; evaluation only
//!   fails on missing or malformed halo inputs
//! - Parameter maps and column tables are `BTreeMap`-backed, so iteration
//!   order is stable

// =============================================================================
// MODULES
// =============================================================================

pub mod cam;
pub mod catalog;
pub mod config;
pub mod defaults;
pub mod interp;
pub mod occupation;
pub mod relations;
pub mod stats;
pub mod synthetic;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{GalhaloError, OccupationBound, ParamDict};

// =============================================================================
// RE-EXPORTS: Models
// =============================================================================

pub use cam::{CamConfig, ConditionalAbunMatch, CorrelationStrength, OnePointLookupTable, QuantileFunction};
pub use catalog::{Catalog, HaloQuery};
pub use config::{ModelConfig, ModelKind, PopulationConfig};
pub use occupation::{
    ComponentSpec, HodModel, Leauthaud11Cens, Leauthaud11Sats, OccupationModel,
    OccupationRealization, Zheng07Cens, Zheng07Sats,
};
pub use relations::{ConcMass, ConcMassFit, LogNormalScatterModel, Moster13SmHm, ParametrizedRelation};
