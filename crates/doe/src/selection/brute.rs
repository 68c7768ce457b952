use super::{SelectionStrategy, combination_score};
use crate::errors::{MorrisError, Result};
use crate::utils::{binomial, combinations};
use linfa::Float;
use log::debug;
use ndarray::Array2;
use rayon::prelude::*;

/// Number of combinations scored at once
const CHUNK_SIZE: usize = 100_000;

/// Exhaustive search of the combination of k trajectories with maximum score.
///
/// Combinations are enumerated in lexicographic order and scored in parallel.
/// When several combinations reach the maximum score, the first one in
/// lexicographic order is selected, hence the result does not depend on
/// the parallel execution.
///
/// The cost grows as C(N, k), only use it for small number of trajectories.
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForce;

impl<F: Float> SelectionStrategy<F> for BruteForce {
    fn find_most_distant(&self, distances: &Array2<F>, k_choices: usize) -> Result<Vec<usize>> {
        let n = distances.nrows();
        if k_choices < 2 || k_choices >= n {
            return Err(MorrisError::InvalidValueError(format!(
                "number of selected trajectories ({k_choices}) should be in [2, {n})"
            )));
        }
        let n_combos =
            binomial(n, k_choices).ok_or(MorrisError::TooManyCombinations(n, k_choices))?;
        debug!("Brute force search among {n_combos} combinations");

        let mut best: Option<(usize, F, Vec<usize>)> = None;
        let mut combos = combinations(n, k_choices);
        let mut offset = 0;
        loop {
            let chunk: Vec<Vec<usize>> = combos.by_ref().take(CHUNK_SIZE).collect();
            if chunk.is_empty() {
                break;
            }
            let chunk_best = chunk
                .par_iter()
                .enumerate()
                .map(|(i, combo)| (offset + i, combination_score(distances, combo)))
                .reduce_with(|a, b| {
                    // total order on (score, index): first combination wins ties
                    if b.1 > a.1 || (b.1 == a.1 && b.0 < a.0) {
                        b
                    } else {
                        a
                    }
                });
            if let Some((index, score)) = chunk_best {
                if best.as_ref().is_none_or(|(_, best_score, _)| score > *best_score) {
                    best = Some((index, score, chunk[index - offset].clone()));
                }
            }
            offset += chunk.len();
        }

        best.map(|(_, _, combo)| combo)
            .ok_or(MorrisError::InvalidValueError(
                "no combination of trajectories to select from".to_string(),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::compute_distance_matrix;
    use crate::selection::tests::fixture_sample;
    use ndarray::array;

    #[test]
    fn test_brute_force_fixture() {
        let distances = compute_distance_matrix(&fixture_sample(), 6, 2).unwrap();
        let selected = BruteForce.find_most_distant(&distances, 4).unwrap();
        assert_eq!(selected, vec![0, 2, 3, 5]);
    }

    #[test]
    fn test_brute_force_first_wins_ties() {
        // all trajectories equally spread
        let distances = Array2::from_shape_fn((5, 5), |(i, j)| if i == j { 0. } else { 1. });
        let selected = BruteForce.find_most_distant(&distances, 3).unwrap();
        assert_eq!(selected, vec![0, 1, 2]);
    }

    #[test]
    fn test_brute_force_max_pair() {
        let distances = array![[0., 1., 5., 2.], [1., 0., 1., 3.], [5., 1., 0., 5.], [2., 3., 5., 0.]];
        // (0, 2) and (2, 3) tie: the first in lexicographic order is kept
        let selected = BruteForce.find_most_distant(&distances, 2).unwrap();
        assert_eq!(selected, vec![0, 2]);
        let selected = BruteForce.find_most_distant(&distances, 3).unwrap();
        assert_eq!(selected, vec![0, 2, 3]);
    }

    #[test]
    fn test_brute_force_too_many_choices() {
        let distances = Array2::<f64>::zeros((3, 3));
        assert!(BruteForce.find_most_distant(&distances, 3).is_err());
    }
}
