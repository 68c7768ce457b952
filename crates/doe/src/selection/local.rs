use super::{SelectionStrategy, combination_score};
use crate::errors::{MorrisError, Result};
use linfa::Float;
use log::debug;
use ndarray::Array2;
use std::cmp::Ordering;

/// Local optimization heuristic for the selection of the most spread out trajectories.
///
/// For each size i in `1..k`, every trajectory is associated with its i most distant
/// trajectories and the best of these sets is kept, then it is grown greedily, one
/// trajectory at a time, with the trajectory maximizing the score until it holds k
/// trajectories. The best of the k - 1 resulting sets is selected.
/// Ties are broken in favour of the lowest index.
///
/// The cost is polynomial in N, which makes it usable when the exhaustive search is not.
///
/// See Ruano M.V., Ribes J., Seco A., Ferrer J. (2012), An improved sampling strategy
/// based on trajectory design for application of the Morris method to systems with many
/// input factors, Environmental Modelling & Software 37.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalOptimization;

impl<F: Float> SelectionStrategy<F> for LocalOptimization {
    fn find_most_distant(&self, distances: &Array2<F>, k_choices: usize) -> Result<Vec<usize>> {
        let n = distances.nrows();
        if k_choices < 2 || k_choices >= n {
            return Err(MorrisError::InvalidValueError(format!(
                "number of selected trajectories ({k_choices}) should be in [2, {n})"
            )));
        }

        let mut candidates: Vec<Vec<usize>> = Vec::with_capacity(k_choices);
        for i in 1..k_choices {
            let seeds: Vec<Vec<usize>> = (0..n)
                .map(|row| {
                    let mut seed = farthest(distances, row, i);
                    seed.push(row);
                    seed
                })
                .collect();
            let mut best = best_of(distances, seeds);
            while best.len() < k_choices {
                let grown = (0..n)
                    .filter(|t| !best.contains(t))
                    .map(|t| {
                        let mut set = best.clone();
                        set.push(t);
                        set
                    })
                    .collect();
                best = best_of(distances, grown);
            }
            debug!("Local optimization from {i} farthest trajectories: {best:?}");
            candidates.push(best);
        }

        let mut selected = best_of(distances, candidates);
        selected.sort_unstable();
        Ok(selected)
    }
}

/// Indices of the `count` trajectories farthest from `row`, lowest index first on ties
fn farthest<F: Float>(distances: &Array2<F>, row: usize, count: usize) -> Vec<usize> {
    let mut others: Vec<usize> = (0..distances.ncols()).filter(|&j| j != row).collect();
    // stable sort keeps index order among equal distances
    others.sort_by(|&a, &b| {
        distances[[row, b]]
            .partial_cmp(&distances[[row, a]])
            .unwrap_or(Ordering::Equal)
    });
    others.truncate(count);
    others
}

/// First set with maximum score
fn best_of<F: Float>(distances: &Array2<F>, sets: Vec<Vec<usize>>) -> Vec<usize> {
    let mut best: Option<(F, Vec<usize>)> = None;
    for set in sets {
        let score = combination_score(distances, &set);
        if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
            best = Some((score, set));
        }
    }
    best.map(|(_, set)| set).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::tests::fixture_sample;
    use crate::selection::{BruteForce, compute_distance_matrix};
    use ndarray::array;

    #[test]
    fn test_local_optimization_fixture() {
        let distances = compute_distance_matrix(&fixture_sample(), 6, 2).unwrap();
        assert_eq!(
            LocalOptimization.find_most_distant(&distances, 4).unwrap(),
            vec![0, 2, 3, 5]
        );
        assert_eq!(
            LocalOptimization.find_most_distant(&distances, 3).unwrap(),
            vec![0, 3, 5]
        );
        assert_eq!(
            LocalOptimization.find_most_distant(&distances, 2).unwrap(),
            vec![0, 5]
        );
    }

    #[test]
    fn test_farthest() {
        let distances = array![[0., 1., 5., 2.], [1., 0., 1., 3.], [5., 1., 0., 5.], [2., 3., 5., 0.]];
        assert_eq!(farthest(&distances, 0, 2), vec![2, 3]);
        // tie between 0 and 3
        assert_eq!(farthest(&distances, 2, 2), vec![0, 3]);
        assert_eq!(farthest(&distances, 1, 3), vec![3, 0, 2]);
    }

    #[test]
    fn test_local_close_to_brute_force() {
        let distances = Array2::from_shape_fn((8, 8), |(i, j)| {
            if i == j {
                0.
            } else {
                ((i * j + i + j) % 7) as f64 + 1.
            }
        });
        let local = LocalOptimization.find_most_distant(&distances, 4).unwrap();
        let brute = BruteForce.find_most_distant(&distances, 4).unwrap();
        assert_eq!(local.len(), 4);
        let (score_local, score_brute) = (
            combination_score(&distances, &local),
            combination_score(&distances, &brute),
        );
        assert!(score_local <= score_brute);
        assert!(score_local >= 0.8 * score_brute);
    }
}
