//! Selection of the k most spread out trajectories among N candidates.
//!
//! The spread of two trajectories is the sum of the euclidean distances between all
//! their pairs of points. The score of a set of trajectories is the sum of the spreads
//! of all its pairs of trajectories. A [SelectionStrategy] looks for the set of k
//! trajectories with maximum score.
//!
//! See Campolongo F., Cariboni J., Saltelli A. (2007), An effective screening design
//! for sensitivity analysis of large models, Environmental Modelling & Software 22.
mod brute;
mod local;

pub use brute::*;
pub use local::*;

use crate::errors::{MorrisError, Result};
use crate::morris::Problem;
use crate::utils::cdist;
use linfa::Float;
use log::{debug, info};
use ndarray::{Array2, ArrayBase, Axis, Data, Ix2, s};
use rayon::prelude::*;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// A strategy looking for the k trajectories with maximum score
/// given the (N, N) symmetric matrix of trajectory spreads.
pub trait SelectionStrategy<F: Float>: Send + Sync {
    /// Returns the indices of the `k_choices` selected trajectories in ascending order
    fn find_most_distant(&self, distances: &Array2<F>, k_choices: usize) -> Result<Vec<usize>>;
}

/// Available trajectory selection methods
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum Selection {
    /// Exhaustive search over all C(N, k) combinations, see [BruteForce]
    #[default]
    BruteForce,
    /// Local optimization heuristic, see [LocalOptimization]
    LocalOptimization,
}

impl Selection {
    /// Tells whether the selection enumerates all the combinations
    pub fn is_exhaustive(&self) -> bool {
        matches!(self, Selection::BruteForce)
    }

    fn strategy<F: Float>(&self) -> Box<dyn SelectionStrategy<F>> {
        match self {
            Selection::BruteForce => Box::new(BruteForce),
            Selection::LocalOptimization => Box::new(LocalOptimization),
        }
    }
}

/// Score of a set of trajectories: sum of the pairwise spreads
pub fn combination_score<F: Float>(distances: &Array2<F>, combo: &[usize]) -> F {
    let mut score = F::zero();
    for (i, &a) in combo.iter().enumerate() {
        for &b in &combo[i + 1..] {
            score += distances[[a, b]];
        }
    }
    score
}

/// Spread between two trajectories: sum of the euclidean distances between all pairs
/// of points, 0 for identical trajectories.
///
/// # Errors
///
/// [MorrisError::InvalidValueError] if trajectories have different shapes
pub fn compute_distance<F: Float>(
    traj_a: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    traj_b: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
) -> Result<F> {
    if traj_a.shape() != traj_b.shape() {
        return Err(MorrisError::InvalidValueError(format!(
            "trajectories have different shapes {:?} and {:?}",
            traj_a.shape(),
            traj_b.shape()
        )));
    }
    if traj_a == traj_b {
        Ok(F::zero())
    } else {
        Ok(cdist(traj_a, traj_b).sum())
    }
}

/// Computes the (N, N) symmetric matrix of spreads between the N trajectories
/// stacked in `input_sample`, each trajectory being made of `num_groups + 1` rows.
pub fn compute_distance_matrix<F: Float>(
    input_sample: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    n: usize,
    num_groups: usize,
) -> Result<Array2<F>> {
    let len = num_groups + 1;
    if input_sample.nrows() != n * len {
        return Err(MorrisError::InvalidValueError(format!(
            "sample of {} rows does not hold {} trajectories of {} points",
            input_sample.nrows(),
            n,
            len
        )));
    }
    let pairs: Vec<_> = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .collect();
    let spreads = pairs
        .par_iter()
        .map(|&(i, j)| {
            compute_distance(
                &input_sample.slice(s![i * len..(i + 1) * len, ..]),
                &input_sample.slice(s![j * len..(j + 1) * len, ..]),
            )
        })
        .collect::<Result<Vec<F>>>()?;

    let mut distances = Array2::zeros((n, n));
    for (&(i, j), &d) in pairs.iter().zip(spreads.iter()) {
        distances[[i, j]] = d;
        distances[[j, i]] = d;
    }
    Ok(distances)
}

/// Selects `k_choices` trajectories among the `n` trajectories of `input_sample`
/// maximizing their spread with the given [Selection] method.
///
/// `input_sample` is the ((g + 1) * n, nx) matrix of stacked trajectories where g is
/// the number of groups of the `problem`. Selected trajectories are returned stacked
/// in their original relative order as a ((g + 1) * k_choices, nx) matrix.
///
/// # Errors
///
/// * [MorrisError::OutOfRangeError] if a value of `input_sample` is not in `[0, 1]`
/// * [MorrisError::InvalidValueError] if `k_choices` is not in `[2, n)` or `input_sample` shape is inconsistent
/// * [MorrisError::InvalidGroupsError] if problem groups are invalid
pub fn compute_optimised_trajectories<F: Float>(
    problem: &Problem<F>,
    input_sample: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    n: usize,
    k_choices: usize,
    selection: Selection,
) -> Result<Array2<F>> {
    compute_optimised_trajectories_with(
        problem,
        input_sample,
        n,
        k_choices,
        selection.strategy().as_ref(),
    )
}

/// Same as [compute_optimised_trajectories] with a user provided [SelectionStrategy]
pub fn compute_optimised_trajectories_with<F: Float>(
    problem: &Problem<F>,
    input_sample: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    n: usize,
    k_choices: usize,
    strategy: &dyn SelectionStrategy<F>,
) -> Result<Array2<F>> {
    if input_sample
        .iter()
        .any(|&v| v < F::zero() || v > F::one())
    {
        return Err(MorrisError::OutOfRangeError(
            "input sample must be scaled between 0 and 1".to_string(),
        ));
    }
    if k_choices < 2 || k_choices >= n {
        return Err(MorrisError::InvalidValueError(format!(
            "number of selected trajectories ({k_choices}) should be in [2, {n})"
        )));
    }
    if input_sample.ncols() != problem.num_vars() {
        return Err(MorrisError::InvalidValueError(format!(
            "sample has {} columns, expected {} factors",
            input_sample.ncols(),
            problem.num_vars()
        )));
    }
    let num_groups = problem.num_groups()?;
    let distances = compute_distance_matrix(input_sample, n, num_groups)?;
    debug!("Distances between trajectories {distances}");

    let selected = strategy.find_most_distant(&distances, k_choices)?;
    info!(
        "Select trajectories {:?} (score = {})",
        selected,
        combination_score(&distances, &selected)
    );

    let len = num_groups + 1;
    let rows: Vec<usize> = selected
        .iter()
        .flat_map(|&t| t * len..(t + 1) * len)
        .collect();
    Ok(input_sample.select(Axis(0), &rows))
}
