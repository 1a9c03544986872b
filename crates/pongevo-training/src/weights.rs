//! Weight vector operations for the genetic algorithm.
//!
//! Network genomes are flat `f64` vectors bounded to `[-max_weight, max_weight]`.
//! These helpers are used by
//! [`genetic::PopulationEvolver`](crate::genetic::PopulationEvolver) for
//! initialization, crossover and mutation.
//!
//! - **Initialization**: [`random`] draws every weight uniformly
//! - **Crossover**: [`blx_alpha`] implements the BLX-α operator
//! - **Mutation**: [`mutate`] applies Gaussian noise to a fraction of the weights

use rand::Rng;
use rand_distr::StandardNormal;

/// Creates a weight vector by applying a function to each index.
///
/// ```
/// use pongevo_training::weights;
///
/// let weights = weights::from_fn(|i| 1.0 / (i as f64 + 1.0), 3);
/// assert_eq!(weights, vec![1.0, 0.5, 1.0 / 3.0]);
/// ```
pub fn from_fn<F>(f: F, len: usize) -> Vec<f64>
where
    F: FnMut(usize) -> f64,
{
    (0..len).map(f).collect()
}

/// Generates `len` weights sampled uniformly from `[-max_weight, max_weight]`.
pub fn random<R>(rng: &mut R, max_weight: f64, len: usize) -> Vec<f64>
where
    R: Rng + ?Sized,
{
    from_fn(|_| rng.random_range(-max_weight..=max_weight), len)
}

/// Blends two parent genomes gene by gene (BLX-α).
///
/// Each child gene is drawn uniformly from the interval spanned by the two
/// parent genes, widened on both ends by `alpha` times its length, and then
/// clamped to `[-max_weight, max_weight]`. Equal parent genes are copied.
///
/// # Panics
///
/// Panics if the parents have different lengths.
pub fn blx_alpha<R>(p1: &[f64], p2: &[f64], alpha: f64, max_weight: f64, rng: &mut R) -> Vec<f64>
where
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len(), "parent genomes differ in length");
    p1.iter()
        .zip(p2)
        .map(|(&a, &b)| {
            let spread = (a - b).abs() * alpha;
            let gene = rng.random_range(a.min(b) - spread..=a.max(b) + spread);
            gene.clamp(-max_weight, max_weight)
        })
        .collect()
}

/// Adds `N(0, sigma²)` noise to each weight with probability `rate`.
///
/// Mutated weights stay within `[-max_weight, max_weight]`.
pub fn mutate<R>(weights: &mut [f64], sigma: f64, max_weight: f64, rate: f64, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for w in weights {
        if !rng.random_bool(rate) {
            continue;
        }
        let noise = sigma * rng.sample::<f64, _>(StandardNormal);
        *w = (*w + noise).clamp(-max_weight, max_weight);
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_random_stays_in_bounds() {
        let mut rng = Pcg32::seed_from_u64(1);
        let weights = random(&mut rng, 2.0, 500);
        assert_eq!(weights.len(), 500);
        assert!(weights.iter().all(|w| (-2.0..=2.0).contains(w)));
        assert!(weights.iter().any(|w| *w < 0.0));
    }

    #[test]
    fn test_blx_alpha_zero_stays_between_parents() {
        let mut rng = Pcg32::seed_from_u64(2);
        let p1 = [-1.0, 0.0, 0.5];
        let p2 = [1.0, 0.0, 0.25];
        for _ in 0..100 {
            let child = blx_alpha(&p1, &p2, 0.0, 10.0, &mut rng);
            assert!((-1.0..=1.0).contains(&child[0]));
            assert_eq!(child[1], 0.0);
            assert!((0.25..=0.5).contains(&child[2]));
        }
    }

    #[test]
    fn test_blx_alpha_copies_equal_genes() {
        let mut rng = Pcg32::seed_from_u64(5);
        let parent = [-0.75, 0.0, 1.25];
        assert_eq!(blx_alpha(&parent, &parent, 0.5, 2.0, &mut rng), parent);
    }

    #[test]
    fn test_blx_alpha_is_clamped() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..100 {
            let child = blx_alpha(&[-1.0], &[1.0], 5.0, 1.5, &mut rng);
            assert!((-1.5..=1.5).contains(&child[0]));
        }
    }

    #[test]
    fn test_mutate_rate_bounds() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut untouched = vec![0.25; 50];
        mutate(&mut untouched, 1.0, 1.0, 0.0, &mut rng);
        assert!(untouched.iter().all(|w| *w == 0.25));

        let mut mutated = vec![0.25; 50];
        mutate(&mut mutated, 1.0, 1.0, 1.0, &mut rng);
        assert!(mutated.iter().any(|w| *w != 0.25));
        assert!(mutated.iter().all(|w| (-1.0..=1.0).contains(w)));
    }
}
