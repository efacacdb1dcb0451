//! Monte Carlo realizations of occupation statistics.
//!
//! Every function consumes the caller's stream and nothing else, so a seeded
//! stream reproduces the same realization bit for bit.

use crate::defaults::TINY_POISSON_FLUCTUATION;
use crate::{GalhaloError, OccupationBound};
use rand::distributions::Standard;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Poisson};

/// Draw occupations for `mean` using the distribution implied by `bound`.
pub fn draw_occupation(
    bound: OccupationBound,
    mean: &[f64],
    rng: &mut dyn RngCore,
) -> Result<Vec<u32>, GalhaloError> {
    match bound {
        OccupationBound::One => Ok(nearest_integer(mean, rng)),
        OccupationBound::Unbounded => poisson(mean, rng),
    }
}

/// Bernoulli trial per halo: 1 if a uniform draw in `[0, 1)` falls below the mean.
///
/// All uniforms are drawn before any comparison.
pub fn nearest_integer(mean: &[f64], rng: &mut dyn RngCore) -> Vec<u32> {
    let uniforms: Vec<f64> = (0..mean.len())
        .map(|_| rng.sample::<f64, _>(Standard))
        .collect();
    uniforms
        .iter()
        .zip(mean)
        .map(|(u, m)| u32::from(u < m))
        .collect()
}

/// Poisson draw per halo with rate equal to the mean.
///
/// Non-positive rates are raised to [`TINY_POISSON_FLUCTUATION`]. NaN or
/// infinite rates are rejected before anything is drawn.
pub fn poisson(mean: &[f64], rng: &mut dyn RngCore) -> Result<Vec<u32>, GalhaloError> {
    if let Some(halo) = mean.iter().position(|m| !m.is_finite()) {
        return Err(GalhaloError::InvalidConfig(format!(
            "invalid Poisson rate {} for halo {halo}",
            mean[halo]
        )));
    }
    mean.iter()
        .map(|&m| {
            let rate = if m <= 0.0 { TINY_POISSON_FLUCTUATION } else { m };
            let dist = Poisson::new(rate).map_err(|e| {
                GalhaloError::InvalidConfig(format!("invalid Poisson rate {rate}: {e}"))
            })?;
            let draw: f64 = dist.sample(&mut *rng);
            Ok(draw as u32)
        })
        .collect()
}
