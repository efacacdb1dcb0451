//! # Synthetic Catalogs
//!
//! Small, seeded stand-ins for simulation halo catalogs and observed galaxy
//! samples. They carry just enough structure for the models to be exercised:
//! halo properties scale with mass, and galaxy colour correlates with
//! formation redshift at fixed stellar mass.

use crate::catalog::Catalog;
use crate::GalhaloError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// Halo catalog with columns `halo_mvir`, `halo_mpeak`, `halo_vmax` and
/// `halo_zhalf`.
///
/// Masses are log-uniform between 1e10 and 1e15 Msun/h.
pub fn fake_halo_catalog(num_halos: usize, seed: u64) -> Result<Catalog, GalhaloError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut mvir = Vec::with_capacity(num_halos);
    let mut mpeak = Vec::with_capacity(num_halos);
    let mut vmax = Vec::with_capacity(num_halos);
    let mut zhalf = Vec::with_capacity(num_halos);

    for _ in 0..num_halos {
        let log_m: f64 = rng.gen_range(10.0..15.0);
        let growth: f64 = rng.sample(StandardNormal);
        let v_scatter: f64 = rng.sample(StandardNormal);
        let z_scatter: f64 = rng.sample(StandardNormal);

        let m = 10f64.powf(log_m);
        mvir.push(m);
        mpeak.push(m * 10f64.powf(0.05 * growth.abs()));
        vmax.push(200.0 * (m / 1e12).powf(1.0 / 3.0) * 10f64.powf(0.05 * v_scatter));
        zhalf.push(1.2 * 10f64.powf(-0.1 * (log_m - 12.0)) * (0.3 * z_scatter).exp());
    }

    Catalog::new()
        .with_column("halo_mvir", mvir)?
        .with_column("halo_mpeak", mpeak)?
        .with_column("halo_vmax", vmax)?
        .with_column("halo_zhalf", zhalf)
}

/// Galaxy catalog with columns `stellar_mass`, `gr_color` and `zhalf`.
///
/// Stellar masses are log-uniform between 1e9 and 1e12 Msun. Colour reddens
/// with stellar mass and, at fixed stellar mass, with `zhalf`.
pub fn fake_galaxy_catalog(num_galaxies: usize, seed: u64) -> Result<Catalog, GalhaloError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut stellar_mass = Vec::with_capacity(num_galaxies);
    let mut gr_color = Vec::with_capacity(num_galaxies);
    let mut zhalf = Vec::with_capacity(num_galaxies);

    for _ in 0..num_galaxies {
        let log_ms: f64 = rng.gen_range(9.0..12.0);
        let z_scatter: f64 = rng.sample(StandardNormal);
        let c_scatter: f64 = rng.sample(StandardNormal);

        let z = (0.4 * z_scatter).exp();
        stellar_mass.push(10f64.powf(log_ms));
        zhalf.push(z);
        gr_color.push(0.35 + 0.12 * (log_ms - 9.0) + 0.15 * z + 0.03 * c_scatter);
    }

    Catalog::new()
        .with_column("stellar_mass", stellar_mass)?
        .with_column("gr_color", gr_color)?
        .with_column("zhalf", zhalf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::spearman_rank_correlation;

    #[test]
    fn halo_catalog_is_seeded_and_complete() {
        let a = fake_halo_catalog(500, 43).expect("halos");
        let b = fake_halo_catalog(500, 43).expect("halos");
        assert_eq!(a, b);
        assert_eq!(a.len(), 500);
        assert_eq!(
            a.keys().collect::<Vec<_>>(),
            vec!["halo_mpeak", "halo_mvir", "halo_vmax", "halo_zhalf"]
        );

        let mvir = a.column("halo_mvir").expect("mvir");
        let mpeak = a.column("halo_mpeak").expect("mpeak");
        assert!(mvir.iter().all(|m| (1e10..=1e15).contains(m)));
        assert!(mpeak.iter().zip(mvir).all(|(p, m)| p >= m));
    }

    #[test]
    fn colour_tracks_zhalf() {
        let galaxies = fake_galaxy_catalog(2000, 7).expect("galaxies");
        let color = galaxies.column("gr_color").expect("color");
        let zhalf = galaxies.column("zhalf").expect("zhalf");
        let rho = spearman_rank_correlation(color, zhalf).expect("rho");
        assert!(rho > 0.2, "rho = {rho}");
    }
}
