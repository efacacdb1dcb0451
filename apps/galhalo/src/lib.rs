//! # galhalo
//!
//! Command-line front-end for galhalo-core.

pub mod cli;
