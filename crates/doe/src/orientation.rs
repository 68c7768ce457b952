//! Random orientation of a Morris trajectory: base point `x*`, direction matrix `D*`
//! and move order matrix `P*`.
use linfa::Float;
use ndarray::{Array1, Array2};
use ndarray_rand::rand::{Rng, seq::SliceRandom};

/// Computes the Morris step `delta = p / (2 * (p - 1))` for `p` levels.
///
/// The step is shared by all the trajectories of a run. It decreases towards 0.5
/// as the number of levels grows (`delta(2) = 1.`, `delta(4) = 2/3`).
///
/// **Panics** if `num_levels` is lower than 2.
pub fn compute_delta<F: Float>(num_levels: usize) -> F {
    assert!(num_levels >= 2, "Morris sampling requires at least 2 levels");
    F::cast(num_levels) / (F::cast(2.) * F::cast(num_levels - 1))
}

/// Generates a random (g, g) permutation matrix describing the order in which
/// the g groups move along a trajectory.
///
/// Each row and each column contains exactly one 1.
pub fn generate_p_star<F: Float, R: Rng>(num_groups: usize, rng: &mut R) -> Array2<F> {
    let mut order: Vec<usize> = (0..num_groups).collect();
    order.shuffle(rng);
    let mut p_star = Array2::zeros((num_groups, num_groups));
    for (i, &j) in order.iter().enumerate() {
        p_star[[i, j]] = F::one();
    }
    p_star
}

/// Generates a random (g, g) diagonal matrix whose entries are +1 or -1 with equal
/// probability, telling whether each group steps up or down.
pub fn generate_d_star<F: Float, R: Rng>(num_groups: usize, rng: &mut R) -> Array2<F> {
    let signs = Array1::from_shape_fn(num_groups, |_| {
        if rng.gen_bool(0.5) { F::one() } else { -F::one() }
    });
    Array2::from_diag(&signs)
}

/// Generates the random (1, nx) base point `x*` of a trajectory.
///
/// Each component is drawn uniformly among `grid_jump` values evenly spaced in
/// `[0, 1 - delta]` so that a step of `delta` upwards stays within `[0, 1]`.
///
/// **Panics** if `num_levels` is lower than 2 or `grid_jump` is 0.
pub fn generate_x_star<F: Float, R: Rng>(
    num_vars: usize,
    num_levels: usize,
    grid_jump: usize,
    rng: &mut R,
) -> Array2<F> {
    assert!(grid_jump > 0, "grid jump should be strictly positive");
    let bound = F::one() - compute_delta::<F>(num_levels);
    let grid: Vec<F> = (0..grid_jump)
        .map(|i| {
            if grid_jump == 1 {
                F::zero()
            } else {
                // last value is exactly the bound
                F::cast(i) / F::cast(grid_jump - 1) * bound
            }
        })
        .collect();
    Array2::from_shape_fn((1, num_vars), |_| grid[rng.gen_range(0..grid_jump)])
}
