//! # Validation Tier Tests (T0-T3)
//!
//! Scenario tests against published numbers and statistical guarantees.
//!
//! ## Tiers
//! - T0: Configuration Integrity
//! - T1: Published Relations
//! - T2: Monte Carlo Convergence
//! - T3: Conditional Abundance Matching

use galhalo_core::stats::{median, spearman_rank_correlation};
use galhalo_core::{
    CamConfig, Catalog, ConditionalAbunMatch, GalhaloError, HaloQuery, HodModel, Leauthaud11Sats,
    ModelConfig, Moster13SmHm, OccupationModel, ParametrizedRelation, Zheng07Cens, Zheng07Sats,
};

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

// =============================================================================
// TIER T0: CONFIGURATION INTEGRITY
// =============================================================================

mod t0_configuration_integrity {
    use super::*;

    /// T0.1: An off-table luminosity threshold is a configuration error.
    #[test]
    fn unpublished_threshold_rejected() {
        let err = Zheng07Cens::new(-19.3).expect_err("not in Table 1");
        assert!(err.is_configuration_error());
        assert!(matches!(err, GalhaloError::UnpublishedThreshold { .. }));
    }

    /// T0.2: A published threshold loads the matching table row.
    #[test]
    fn published_threshold_loaded() {
        let model = Zheng07Cens::new(-20.0).expect("published");
        assert_eq!(model.param_dict().get("logMmin"), Some(12.02));
        assert_eq!(model.param_dict().get("sigma_logM"), Some(0.26));
    }

    /// T0.3: Evaluating without halo input is an input error.
    #[test]
    fn missing_halo_input_rejected() {
        let model = Zheng07Sats::new(-20.0).expect("model");
        let err = model
            .mean_occupation(&HaloQuery::none())
            .expect_err("no halos");
        assert!(err.is_input_error());
    }

    /// T0.4: A configured model evaluates like the same model built in code.
    #[test]
    fn configured_model_matches_preset() {
        let source = r#"
[[population]]
model = "zheng07_cens"
threshold = -21.0

[[population]]
model = "zheng07_sats"
threshold = -21.0
"#;
        let configured = ModelConfig::from_toml_str(source)
            .expect("parse")
            .build_model()
            .expect("build");
        let preset = HodModel::zheng07(-21.0).expect("preset");

        let mass = [1e11, 1e12, 1e13, 1e14];
        let query = HaloQuery::prim_haloprop(&mass);
        for gal_type in ["centrals", "satellites"] {
            assert_eq!(
                configured.mean_occupation(gal_type, &query).expect("configured"),
                preset.mean_occupation(gal_type, &query).expect("preset")
            );
        }
    }
}

// =============================================================================
// TIER T1: PUBLISHED RELATIONS
// =============================================================================

mod t1_published_relations {
    use super::*;

    /// T1.1: Moster13 normalization at 1e12 Msun/h, z = 0.
    #[test]
    fn moster13_normalization() {
        let model = Moster13SmHm::default();
        let mstar = model.mean(&HaloQuery::prim_haloprop(&[1e12])).expect("mean");
        assert!((mstar[0] / 3.4275e10 - 1.0).abs() < 1e-3);
    }

    /// T1.2: Modulated satellites never exceed unmodulated satellites.
    #[test]
    fn modulation_bounds_satellites() {
        let mass: Vec<f64> = (0..200).map(|i| 10f64.powf(10.0 + 0.025 * f64::from(i))).collect();
        let query = HaloQuery::prim_haloprop(&mass);

        for threshold in [-18.0, -20.0, -22.0] {
            let plain = Zheng07Sats::new(threshold).expect("plain");
            let modulated = Zheng07Sats::new(threshold)
                .expect("plain")
                .modulate_with_cenocc("centrals")
                .expect("modulated");
            let a = plain.mean_occupation(&query).expect("plain mean");
            let b = modulated.mean_occupation(&query).expect("modulated mean");
            assert!(b.iter().zip(&a).all(|(m, p)| m <= p));
        }

        let plain = Leauthaud11Sats::new(10.5).expect("plain");
        let modulated = Leauthaud11Sats::new(10.5)
            .expect("plain")
            .modulate_with_cenocc("centrals");
        let a = plain.mean_occupation(&query).expect("plain mean");
        let b = modulated.mean_occupation(&query).expect("modulated mean");
        assert!(b.iter().zip(&a).all(|(m, p)| m <= p));
    }

    /// T1.3: Satellite scales follow a parameter perturbation without a rebuild.
    #[test]
    fn perturbation_reevaluates_in_place() {
        let mut model = Leauthaud11Sats::new(10.5).expect("model");
        let query = HaloQuery::prim_haloprop(&[1e13]);
        let before = model.mean_occupation(&query).expect("mean");
        model.set_param("bsat", 5.0).expect("set");
        let after = model.mean_occupation(&query).expect("mean");
        assert!(after[0] > before[0]);
    }

    /// T1.4: A relation update that breaks the knee inversion is refused and
    /// leaves the satellites evaluating as before.
    #[test]
    fn non_invertible_relation_update_is_refused() {
        let mut model = HodModel::leauthaud11(10.5).expect("model");
        let mass = [1e12, 1e13, 1e14];
        let query = HaloQuery::prim_haloprop(&mass);
        let before = model.mean_occupation("satellites", &query).expect("mean");

        let err = model
            .set_param("satellites", "n10", -0.01)
            .expect_err("negative stellar mass normalization");
        assert!(err.is_configuration_error());
        assert_eq!(
            model.mean_occupation("satellites", &query).expect("mean"),
            before
        );

        model.set_param("satellites", "bsat", 5.0).expect("still usable");
        let after = model.mean_occupation("satellites", &query).expect("mean");
        assert!(after.iter().zip(&before).all(|(a, b)| a > b));
    }
}

// =============================================================================
// TIER T2: MONTE CARLO CONVERGENCE
// =============================================================================

mod t2_monte_carlo_convergence {
    use super::*;

    const N: usize = 100_000;

    /// T2.1: Bernoulli realizations average to the mean within 1%.
    #[test]
    fn central_realizations_converge() {
        let model = Zheng07Cens::new(-20.0).expect("model");
        let mass = vec![10f64.powf(12.2); N];
        let query = HaloQuery::prim_haloprop(&mass);
        let expected = model.mean_occupation(&query).expect("mean")[0];
        let draws = model.mc_occupation_seeded(&query, 43).expect("draw");
        let observed = draws.iter().map(|&d| f64::from(d)).sum::<f64>() / N as f64;
        assert!((observed / expected - 1.0).abs() < 0.01, "{observed} vs {expected}");
    }

    /// T2.2: Poisson realizations average to the mean within 1%.
    #[test]
    fn satellite_realizations_converge() {
        let model = Zheng07Sats::new(-20.0).expect("model");
        let mass = vec![1e14; N];
        let query = HaloQuery::prim_haloprop(&mass);
        let expected = model.mean_occupation(&query).expect("mean")[0];
        let draws = model.mc_occupation_seeded(&query, 43).expect("draw");
        let observed = draws.iter().map(|&d| f64::from(d)).sum::<f64>() / N as f64;
        assert!((observed / expected - 1.0).abs() < 0.01, "{observed} vs {expected}");
    }

    /// T2.3: Different seeds give different realizations.
    #[test]
    fn seeds_are_independent() {
        let model = HodModel::zheng07(-20.0).expect("model");
        let mass: Vec<f64> = (0..1000).map(|i| 10f64.powf(11.0 + 0.004 * f64::from(i))).collect();
        let query = HaloQuery::prim_haloprop(&mass);
        let a = model.populate_occupations_seeded(&query, 1).expect("a");
        let b = model.populate_occupations_seeded(&query, 2).expect("b");
        assert_ne!(a, b);
    }
}

// =============================================================================
// TIER T3: CONDITIONAL ABUNDANCE MATCHING
// =============================================================================

mod t3_conditional_abundance_matching {
    use super::*;
    use galhalo_core::stats::digitize;
    use galhalo_core::synthetic::fake_galaxy_catalog;

    fn bins() -> Vec<f64> {
        vec![10f64.powf(9.75), 10f64.powf(10.5), 10f64.powf(11.25)]
    }

    fn cam() -> ConditionalAbunMatch {
        let reference = fake_galaxy_catalog(20_000, 43).expect("reference");
        ConditionalAbunMatch::new(
            CamConfig::new("gr_color", "stellar_mass", "zhalf", bins()),
            &reference,
        )
        .expect("cam")
    }

    fn bin_values(catalog: &Catalog, key: &str, bin: usize) -> Vec<f64> {
        let prim = catalog.column("stellar_mass").expect("prim");
        let values = catalog.column(key).expect("values");
        digitize(prim, &bins())
            .into_iter()
            .zip(values)
            .filter(|(b, _)| *b == bin)
            .map(|(_, v)| *v)
            .collect()
    }

    /// T3.1: Assigned values are perfectly rank-correlated with zhalf per bin.
    #[test]
    fn zero_scatter_rank_correlation() {
        let cam = cam();
        let mut target = fake_galaxy_catalog(5_000, 7).expect("target");
        let mut rng = rand_stream(11);
        cam.assign_into(&mut target, &mut rng).expect("assign");

        for bin in 0..4 {
            let color = bin_values(&target, "gr_color", bin);
            let zhalf = bin_values(&target, "zhalf", bin);
            let rho = spearman_rank_correlation(&color, &zhalf).expect("rho");
            assert!((rho - 1.0).abs() < 1e-9, "bin {bin}: {rho}");
        }
    }

    /// T3.2: Per-bin marginals of the assignment match the reference sample.
    #[test]
    fn marginal_distribution_matches_reference() {
        let cam = cam();
        let reference = fake_galaxy_catalog(20_000, 43).expect("reference");
        let mut target = fake_galaxy_catalog(20_000, 99).expect("target");
        cam.assign_into(&mut target, &mut rand_stream(5)).expect("assign");

        for bin in 0..4 {
            let assigned = bin_values(&target, "gr_color", bin);
            let expected = bin_values(&reference, "gr_color", bin);
            let (a_min, a_max) = extent(&assigned);
            let (e_min, e_max) = extent(&expected);
            assert!(a_min >= e_min - 1e-12 && a_max <= e_max + 1e-12);
            assert!((mean(&assigned) - mean(&expected)).abs() < 0.01);
            let a_med = median(&assigned).expect("median");
            let e_med = median(&expected).expect("median");
            assert!((a_med - e_med).abs() < 0.01);
        }
    }

    /// T3.3: An empty bin borrows its nearest populated neighbour's function.
    #[test]
    fn empty_bin_is_backfilled() {
        let reference = fake_galaxy_catalog(20_000, 43).expect("reference");
        // one extra edge just above the largest stellar mass leaves bin 4 empty
        let mut edges = bins();
        edges.push(1e12 + 1.0);
        let cam = ConditionalAbunMatch::new(
            CamConfig::new("gr_color", "stellar_mass", "zhalf", edges),
            &reference,
        )
        .expect("cam");

        assert_eq!(cam.backfilled_bins(), &[4]);
        let table = cam.lookup_table();
        assert_eq!(table.source_bin(4), Some(3));
        assert!(table.shares_entry(3, 4));
        assert_eq!(table.entry(3), table.entry(4));
    }

    /// T3.4: A reference sample too sparse everywhere is fatal.
    #[test]
    fn sparse_reference_rejected() {
        let reference = fake_galaxy_catalog(50, 43).expect("reference");
        let err = ConditionalAbunMatch::new(
            CamConfig::new("gr_color", "stellar_mass", "zhalf", bins()),
            &reference,
        )
        .expect_err("too sparse");
        assert_eq!(err, GalhaloError::InsufficientReferenceSample { minimum: 100 });
    }

    fn extent(values: &[f64]) -> (f64, f64) {
        values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
    }

    fn rand_stream(seed: u64) -> rand_chacha::ChaCha8Rng {
        use rand::SeedableRng;
        rand_chacha::ChaCha8Rng::seed_from_u64(seed)
    }
}
