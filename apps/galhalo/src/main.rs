//! # galhalo
//!
//! The command-line binary for the galhalo galaxy-halo connection models.
//!
//! ## Usage
//!
//! ```bash
//! # Mean occupation of every population over a halo mass grid
//! galhalo mean --config model.toml --log-mass-min 11 --log-mass-max 15
//!
//! # Monte Carlo occupations of 10^5 halos at fixed mass
//! galhalo mc --config model.toml --mass 1e13 --num-halos 100000 --seed 43
//!
//! # Parameters of every population
//! galhalo --json params --config model.toml
//!
//! # Conditional abundance matching on synthetic catalogs
//! galhalo cam --config cam.toml --num-reference 20000 --num-target 5000
//! ```

use clap::Parser;
use galhalo::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // GALHALO_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("GALHALO_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "galhalo=info,galhalo_core=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json {
        print_banner();
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  galhalo v{}
  occupation statistics | conditional abundance matching
"#,
        env!("CARGO_PKG_VERSION")
    );
}
