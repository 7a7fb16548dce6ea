//! Seeded randomness helpers shared by the solvers.
//!
//! Every search owns one [`StdRng`]; the helpers here only borrow it so the
//! draw sequence stays a pure function of the seed.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use crate::error::Result;

/// Creates the generator used by a solver run.
///
/// # Examples
///
/// ```
/// use rand::Rng;
/// use u_evrp::random::create_rng;
///
/// let a: u64 = create_rng(42).random();
/// let b: u64 = create_rng(42).random();
/// assert_eq!(a, b);
/// ```
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Roulette-wheel selection: returns index `i` with probability
/// proportional to `weights[i]`.
///
/// Non-positive and non-finite weights are never picked unless every weight
/// is, in which case the choice is uniform.
///
/// # Panics
///
/// Panics if `weights` is empty.
pub fn roulette_select<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> usize {
    assert!(!weights.is_empty(), "roulette needs at least one weight");
    let usable = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
    let total: f64 = weights.iter().map(|&w| usable(w)).sum();
    if total <= 0.0 {
        return rng.random_range(0..weights.len());
    }
    let mut target = rng.random::<f64>() * total;
    for (i, &w) in weights.iter().enumerate() {
        let w = usable(w);
        if w > 0.0 && target < w {
            return i;
        }
        target -= w;
    }
    // rounding left a sliver past the end
    weights
        .iter()
        .rposition(|&w| usable(w) > 0.0)
        .unwrap_or(weights.len() - 1)
}

/// Draws up to `amount` distinct indices with probability proportional to
/// their weight, without replacement, in no particular order.
///
/// Indices with a non-positive or non-finite weight are never drawn, so
/// fewer than `amount` indices come back when too few weights are usable.
pub fn weighted_sample<R: Rng + ?Sized>(
    weights: &[f64],
    amount: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let usable = |i: usize| {
        let w = weights[i];
        if w.is_finite() && w > 0.0 {
            w
        } else {
            0.0
        }
    };
    let picked = index::sample_weighted(rng, weights.len(), usable, amount)?;
    Ok(picked.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roulette_respects_zero_weight() {
        let mut rng = create_rng(1);
        for _ in 0..500 {
            let i = roulette_select(&[0.0, 1.0, 3.0], &mut rng);
            assert_ne!(i, 0);
        }
    }

    #[test]
    fn test_roulette_is_proportional() {
        let mut rng = create_rng(2);
        let mut hits = [0usize; 2];
        for _ in 0..4000 {
            hits[roulette_select(&[1.0, 3.0], &mut rng)] += 1;
        }
        let share = hits[1] as f64 / 4000.0;
        assert!((share - 0.75).abs() < 0.05, "share {share}");
    }

    #[test]
    fn test_roulette_all_zero_is_uniform_pick() {
        let mut rng = create_rng(3);
        let i = roulette_select(&[0.0, 0.0], &mut rng);
        assert!(i < 2);
    }

    #[test]
    fn test_weighted_sample_distinct() {
        let mut rng = create_rng(4);
        let weights = vec![1.0; 20];
        let mut s = weighted_sample(&weights, 8, &mut rng).expect("valid weights");
        assert_eq!(s.len(), 8);
        s.sort_unstable();
        s.dedup();
        assert_eq!(s.len(), 8);
    }

    #[test]
    fn test_weighted_sample_caps_at_population() {
        let mut rng = create_rng(5);
        let s = weighted_sample(&[1.0, 0.0, 2.0], 10, &mut rng).expect("valid weights");
        assert_eq!(s.len(), 2);
        assert!(!s.contains(&1));
    }

    #[test]
    fn test_weighted_sample_prefers_heavy() {
        let mut rng = create_rng(6);
        let mut heavy = 0;
        for _ in 0..1000 {
            if weighted_sample(&[1.0, 50.0], 1, &mut rng).expect("valid weights")[0] == 1 {
                heavy += 1;
            }
        }
        assert!(heavy > 900);
    }

    #[test]
    fn test_weighted_sample_skips_unusable_weights() {
        let mut rng = create_rng(7);
        let weights = [f64::NAN, -3.0, 2.0, f64::INFINITY, 0.0, 1.0];
        for _ in 0..50 {
            let mut s = weighted_sample(&weights, 6, &mut rng).expect("unusable weights are skipped");
            s.sort_unstable();
            assert_eq!(s, vec![2, 5]);
        }
        assert!(weighted_sample(&weights, 0, &mut rng).expect("ok").is_empty());
    }
}
