//! # galhalo CLI Module
//!
//! This module implements the CLI interface for galhalo.
//!
//! ## Available Commands
//!
//! - `mean` - Mean occupation of every population over a halo mass grid
//! - `mc` - Monte Carlo occupation summary at fixed halo mass
//! - `params` - Parameters of every configured population
//! - `cam` - Conditional abundance matching on synthetic catalogs

mod commands;

use clap::{Parser, Subcommand};
use galhalo_core::GalhaloError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// galhalo - galaxy-halo connection models
///
/// Evaluates HOD occupation statistics and conditional abundance matching
/// models described by a TOML configuration file.
#[derive(Parser, Debug)]
#[command(name = "galhalo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tabulate mean occupations over a log-spaced halo mass grid
    Mean {
        /// Model configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// log10 of the smallest halo mass
        #[arg(long, default_value = "10")]
        log_mass_min: f64,

        /// log10 of the largest halo mass
        #[arg(long, default_value = "15")]
        log_mass_max: f64,

        /// Number of grid points
        #[arg(short, long, default_value = "26")]
        num: usize,
    },

    /// Draw occupations for many halos of one mass
    Mc {
        /// Model configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Halo mass (Msun/h)
        #[arg(short, long)]
        mass: f64,

        /// Number of halos
        #[arg(short = 'n', long, default_value = "10000")]
        num_halos: usize,

        /// Random seed
        #[arg(short, long, default_value = "43")]
        seed: u64,
    },

    /// List the parameters of every population
    Params {
        /// Model configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Fit CAM on a synthetic reference sample and assign a synthetic target
    Cam {
        /// Model configuration with a [cam] section (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Rows in the reference sample
        #[arg(long, default_value = "20000")]
        num_reference: usize,

        /// Rows in the target sample
        #[arg(long, default_value = "5000")]
        num_target: usize,

        /// Random seed
        #[arg(short, long, default_value = "43")]
        seed: u64,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), GalhaloError> {
    let json_mode = cli.json;

    match cli.command {
        Commands::Mean {
            config,
            log_mass_min,
            log_mass_max,
            num,
        } => cmd_mean(&config, json_mode, log_mass_min, log_mass_max, num),
        Commands::Mc {
            config,
            mass,
            num_halos,
            seed,
        } => cmd_mc(&config, json_mode, mass, num_halos, seed),
        Commands::Params { config } => cmd_params(&config, json_mode),
        Commands::Cam {
            config,
            num_reference,
            num_target,
            seed,
        } => cmd_cam(&config, json_mode, num_reference, num_target, seed),
    }
}
