//! # CLI Command Implementations
//!
//! Each command builds a serializable report from the configuration, then
//! prints it as a table or as JSON.

use galhalo_core::stats::{logspace, mean, spearman_rank_correlation};
use galhalo_core::synthetic::fake_galaxy_catalog;
use galhalo_core::{ConditionalAbunMatch, GalhaloError, HaloQuery, ModelConfig, ParamDict};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

// =============================================================================
// CONFIGURATION LOADING
// =============================================================================

/// Maximum configuration file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Read and parse a TOML model configuration.
pub fn load_config(path: &Path) -> Result<ModelConfig, GalhaloError> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        GalhaloError::InvalidConfig(format!("cannot read '{}': {}", path.display(), e))
    })?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(GalhaloError::InvalidConfig(format!(
            "config file size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_CONFIG_FILE_SIZE
        )));
    }
    let source = std::fs::read_to_string(path).map_err(|e| {
        GalhaloError::InvalidConfig(format!("cannot read '{}': {}", path.display(), e))
    })?;
    let config = ModelConfig::from_toml_str(&source)?;
    info!(
        path = %path.display(),
        populations = config.population.len(),
        cam = config.cam.is_some(),
        "configuration loaded"
    );
    Ok(config)
}

fn print_json<T: Serialize>(report: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(report).unwrap_or_default()
    );
}

// =============================================================================
// MEAN COMMAND
// =============================================================================

/// Mean occupation of one halo mass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanRow {
    pub halo_mass: f64,
    pub mean: BTreeMap<String, f64>,
}

/// Mean occupations over a mass grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanReport {
    pub gal_types: Vec<String>,
    pub rows: Vec<MeanRow>,
}

/// Tabulate the mean occupation of every population.
pub fn mean_report(
    config: &ModelConfig,
    log_mass_min: f64,
    log_mass_max: f64,
    num: usize,
) -> Result<MeanReport, GalhaloError> {
    if num == 0 || !(log_mass_max >= log_mass_min) {
        return Err(GalhaloError::InvalidConfig(format!(
            "invalid mass grid: {num} points from 10^{log_mass_min} to 10^{log_mass_max}"
        )));
    }
    let model = config.build_model()?;
    let mass = logspace(log_mass_min, log_mass_max, num);
    let query = HaloQuery::prim_haloprop(&mass);

    let gal_types: Vec<String> = model.gal_types().map(str::to_string).collect();
    let mut columns = Vec::with_capacity(gal_types.len());
    for gal_type in &gal_types {
        columns.push(model.mean_occupation(gal_type, &query)?);
    }

    let rows = mass
        .iter()
        .enumerate()
        .map(|(i, &halo_mass)| MeanRow {
            halo_mass,
            mean: gal_types
                .iter()
                .zip(&columns)
                .map(|(g, column)| (g.clone(), column[i]))
                .collect(),
        })
        .collect();

    Ok(MeanReport { gal_types, rows })
}

/// Print mean occupations over a mass grid.
pub fn cmd_mean(
    config_path: &Path,
    json_mode: bool,
    log_mass_min: f64,
    log_mass_max: f64,
    num: usize,
) -> Result<(), GalhaloError> {
    let config = load_config(config_path)?;
    let report = mean_report(&config, log_mass_min, log_mass_max, num)?;

    if json_mode {
        print_json(&report);
        return Ok(());
    }

    print!("{:>12}", "log10 M");
    for gal_type in &report.gal_types {
        print!("  {:>14}", gal_type);
    }
    println!();
    for row in &report.rows {
        print!("{:>12.3}", row.halo_mass.log10());
        for gal_type in &report.gal_types {
            print!("  {:>14.6e}", row.mean.get(gal_type).copied().unwrap_or(f64::NAN));
        }
        println!();
    }

    Ok(())
}

// =============================================================================
// MC COMMAND
// =============================================================================

/// Realization summary of one population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct McSummary {
    pub gal_type: String,
    pub occupation_bound: String,
    pub expected_mean: f64,
    pub observed_mean: f64,
    pub total: u64,
    pub max_per_halo: u32,
}

/// Realizations of every population at fixed halo mass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct McReport {
    pub halo_mass: f64,
    pub num_halos: usize,
    pub seed: u64,
    pub populations: Vec<McSummary>,
}

/// Draw every population for `num_halos` halos of one mass.
pub fn mc_report(
    config: &ModelConfig,
    halo_mass: f64,
    num_halos: usize,
    seed: u64,
) -> Result<McReport, GalhaloError> {
    if num_halos == 0 || !(halo_mass > 0.0) || !halo_mass.is_finite() {
        return Err(GalhaloError::InvalidConfig(format!(
            "need a positive halo mass and at least one halo, got {num_halos} halos of {halo_mass}"
        )));
    }
    let model = config.build_model()?;
    let mass = vec![halo_mass; num_halos];
    let query = HaloQuery::prim_haloprop(&mass);
    let realizations = model.populate_occupations_seeded(&query, seed)?;

    let mut populations = Vec::with_capacity(realizations.len());
    for realization in realizations {
        let component = model.component(&realization.gal_type)?;
        let expected_mean = component.mean_occupation(&HaloQuery::prim_haloprop(&[halo_mass]))?[0];
        populations.push(McSummary {
            occupation_bound: component.spec().occupation_bound.to_string(),
            expected_mean,
            observed_mean: realization.total() as f64 / num_halos as f64,
            total: realization.total(),
            max_per_halo: realization.counts.iter().copied().max().unwrap_or(0),
            gal_type: realization.gal_type,
        });
    }

    Ok(McReport {
        halo_mass,
        num_halos,
        seed,
        populations,
    })
}

/// Print a Monte Carlo occupation summary at fixed halo mass.
pub fn cmd_mc(
    config_path: &Path,
    json_mode: bool,
    halo_mass: f64,
    num_halos: usize,
    seed: u64,
) -> Result<(), GalhaloError> {
    let config = load_config(config_path)?;
    let report = mc_report(&config, halo_mass, num_halos, seed)?;

    if json_mode {
        print_json(&report);
        return Ok(());
    }

    println!("Monte Carlo Occupations");
    println!("=======================");
    println!("Halo mass: {:.4e}", report.halo_mass);
    println!("Halos:     {}", report.num_halos);
    println!("Seed:      {}", report.seed);
    println!();
    for summary in &report.populations {
        println!("{} (bound {})", summary.gal_type, summary.occupation_bound);
        println!("  Expected mean: {:.6}", summary.expected_mean);
        println!("  Observed mean: {:.6}", summary.observed_mean);
        println!("  Total:         {}", summary.total);
        println!("  Max per halo:  {}", summary.max_per_halo);
    }

    Ok(())
}

// =============================================================================
// PARAMS COMMAND
// =============================================================================

/// Identity and parameters of one population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationParams {
    pub gal_type: String,
    pub threshold: f64,
    pub occupation_bound: String,
    pub prim_haloprop_key: String,
    pub params: ParamDict,
    pub publications: Vec<String>,
}

/// Parameters of every population.
pub fn params_report(config: &ModelConfig) -> Result<Vec<PopulationParams>, GalhaloError> {
    let model = config.build_model()?;
    let mut report = Vec::with_capacity(model.len());
    for gal_type in model.gal_types() {
        let component = model.component(gal_type)?;
        let spec = component.spec();
        report.push(PopulationParams {
            gal_type: spec.gal_type.clone(),
            threshold: spec.threshold,
            occupation_bound: spec.occupation_bound.to_string(),
            prim_haloprop_key: spec.prim_haloprop_key.clone(),
            params: component.param_dict().clone(),
            publications: component.publications().iter().map(|p| p.to_string()).collect(),
        });
    }
    Ok(report)
}

/// Print the parameters of every population.
pub fn cmd_params(config_path: &Path, json_mode: bool) -> Result<(), GalhaloError> {
    let config = load_config(config_path)?;
    let report = params_report(&config)?;

    if json_mode {
        print_json(&report);
        return Ok(());
    }

    for population in &report {
        println!("[{}]", population.gal_type);
        println!("  threshold:         {}", population.threshold);
        println!("  occupation_bound:  {}", population.occupation_bound);
        println!("  prim_haloprop_key: {}", population.prim_haloprop_key);
        for (key, value) in population.params.iter() {
            println!("  {key} = {value}");
        }
        if !population.publications.is_empty() {
            println!("  publications: {}", population.publications.join(", "));
        }
        println!();
    }

    Ok(())
}

// =============================================================================
// CAM COMMAND
// =============================================================================

/// Assignment summary of one primary-property bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CamBinSummary {
    pub bin: usize,
    pub source_bin: usize,
    pub reference_rows: usize,
    pub target_rows: usize,
    pub reference_mean: Option<f64>,
    pub assigned_mean: Option<f64>,
    pub spearman: Option<f64>,
}

/// Result of a CAM run on synthetic catalogs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CamReport {
    pub galprop_key: String,
    pub num_reference: usize,
    pub num_target: usize,
    pub seed: u64,
    pub backfilled_bins: Vec<usize>,
    pub bins: Vec<CamBinSummary>,
}

fn split_by_bin(bins: &[usize], values: &[f64], num_bins: usize) -> Vec<Vec<f64>> {
    let mut out = vec![Vec::new(); num_bins];
    for (&bin, &value) in bins.iter().zip(values) {
        if let Some(slot) = out.get_mut(bin) {
            slot.push(value);
        }
    }
    out
}

/// Fit CAM on a synthetic reference sample and assign a synthetic target.
pub fn cam_report(
    config: &ModelConfig,
    num_reference: usize,
    num_target: usize,
    seed: u64,
) -> Result<CamReport, GalhaloError> {
    let cam_config = config.cam_config().cloned().ok_or_else(|| {
        GalhaloError::InvalidConfig("configuration has no [cam] section".to_string())
    })?;
    let reference = fake_galaxy_catalog(num_reference, seed)?;
    let target = fake_galaxy_catalog(num_target, seed.wrapping_add(1))?;

    let cam = ConditionalAbunMatch::new(cam_config, &reference)?;
    let assigned = cam.assign_seeded(&target, seed.wrapping_add(2))?;
    let target_bins = cam.bin_indices(&target)?;
    let reference_bins = cam.bin_indices(&reference)?;
    let cfg = cam.config();
    let num_bins = cam.lookup_table().len();

    let reference_values = split_by_bin(&reference_bins, reference.column(&cfg.galprop_key)?, num_bins);
    let assigned_values = split_by_bin(&target_bins, &assigned, num_bins);
    let sec_values = split_by_bin(&target_bins, target.column(&cfg.sec_haloprop_key)?, num_bins);

    let bins = (0..num_bins)
        .map(|bin| CamBinSummary {
            bin,
            source_bin: cam.lookup_table().source_bin(bin).unwrap_or(bin),
            reference_rows: reference_values[bin].len(),
            target_rows: assigned_values[bin].len(),
            reference_mean: mean(&reference_values[bin]),
            assigned_mean: mean(&assigned_values[bin]),
            spearman: spearman_rank_correlation(&assigned_values[bin], &sec_values[bin]),
        })
        .collect();

    info!(rows = target.len(), galprop_key = %cfg.galprop_key, "target catalog assigned");
    Ok(CamReport {
        galprop_key: cfg.galprop_key.clone(),
        num_reference,
        num_target,
        seed,
        backfilled_bins: cam.backfilled_bins().to_vec(),
        bins,
    })
}

/// Print a CAM run on synthetic catalogs.
pub fn cmd_cam(
    config_path: &Path,
    json_mode: bool,
    num_reference: usize,
    num_target: usize,
    seed: u64,
) -> Result<(), GalhaloError> {
    let config = load_config(config_path)?;
    let report = cam_report(&config, num_reference, num_target, seed)?;

    if json_mode {
        print_json(&report);
        return Ok(());
    }

    println!("Conditional Abundance Matching: {}", report.galprop_key);
    println!("================================");
    println!("Reference rows: {}", report.num_reference);
    println!("Target rows:    {}", report.num_target);
    println!("Backfilled:     {:?}", report.backfilled_bins);
    println!();
    println!(
        "{:>4} {:>6} {:>9} {:>9} {:>10} {:>10} {:>9}",
        "bin", "source", "ref rows", "tgt rows", "ref mean", "tgt mean", "spearman"
    );
    let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |x| format!("{x:.4}"));
    for bin in &report.bins {
        println!(
            "{:>4} {:>6} {:>9} {:>9} {:>10} {:>10} {:>9}",
            bin.bin,
            bin.source_bin,
            bin.reference_rows,
            bin.target_rows,
            fmt(bin.reference_mean),
            fmt(bin.assigned_mean),
            fmt(bin.spearman)
        );
    }

    Ok(())
}
