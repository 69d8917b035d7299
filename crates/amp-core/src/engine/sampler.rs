//! Stochastic draws: pattern assignment and per-sample Bernoulli selection.
//!
//! Each draw builds its own generator. With a seed, the generator is reseeded
//! from it at every draw, so a draw's output depends only on the seed and its
//! own inputs, never on earlier draws.

use amp_common::{Error, Result};
use rand::distr::weighted::WeightedIndex;
use rand::distr::{Bernoulli, Distribution};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Generator for one stochastic step.
pub fn step_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_rng(&mut rand::rng()),
    }
}

/// Assign each of `n_samples` to a pattern index drawn with probability `freqs`.
pub fn assign_groups(n_samples: usize, freqs: &[f64], seed: Option<u64>) -> Result<Vec<usize>> {
    let dist = WeightedIndex::new(freqs)
        .map_err(|e| Error::InvalidFrequencies(format!("cannot sample patterns: {}", e)))?;
    let mut rng = step_rng(seed);
    Ok((0..n_samples).map(|_| dist.sample(&mut rng)).collect())
}

/// One Bernoulli outcome per probability; `true` means the pattern applies.
pub fn draw_selection(probabilities: &[f64], seed: Option<u64>, pattern: usize) -> Result<Vec<bool>> {
    let mut rng = step_rng(seed);
    probabilities
        .iter()
        .map(|&p| {
            Bernoulli::new(p)
                .map(|dist| dist.sample(&mut rng))
                .map_err(|_| Error::InvalidProbability { pattern, value: p })
        })
        .collect()
}

/// Indices of the samples assigned to `pattern`, in row order.
pub fn group_members(assignment: &[usize], pattern: usize) -> Vec<usize> {
    assignment
        .iter()
        .enumerate()
        .filter(|&(_, &g)| g == pattern)
        .map(|(row, _)| row)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_assignment_is_reproducible() {
        let a = assign_groups(500, &[0.2, 0.3, 0.5], Some(9)).unwrap();
        let b = assign_groups(500, &[0.2, 0.3, 0.5], Some(9)).unwrap();
        assert_eq!(a, b);
        assert!(a.iter().all(|&g| g < 3));
    }

    #[test]
    fn zero_frequency_pattern_never_assigned() {
        let groups = assign_groups(1000, &[0.0, 1.0], Some(1)).unwrap();
        assert!(groups.iter().all(|&g| g == 1));
    }

    #[test]
    fn assignment_tracks_frequencies() {
        let groups = assign_groups(20_000, &[0.25, 0.75], Some(5)).unwrap();
        let share = group_members(&groups, 0).len() as f64 / 20_000.0;
        assert!((share - 0.25).abs() < 0.02, "share {share}");
    }

    #[test]
    fn degenerate_probabilities_are_exact() {
        let picks = draw_selection(&[0.0, 1.0, 0.0, 1.0], Some(3), 0).unwrap();
        assert_eq!(picks, vec![false, true, false, true]);
    }

    #[test]
    fn invalid_probability_reported() {
        let err = draw_selection(&[0.5, 1.5], Some(3), 2).unwrap_err();
        assert!(matches!(err, Error::InvalidProbability { pattern: 2, .. }));
    }

    #[test]
    fn all_zero_frequencies_rejected() {
        assert!(assign_groups(10, &[0.0, 0.0], Some(1)).is_err());
    }
}
