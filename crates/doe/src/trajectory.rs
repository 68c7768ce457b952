use crate::errors::{MorrisError, Result};
use crate::orientation::{compute_delta, generate_d_star, generate_p_star, generate_x_star};
use linfa::Float;
use ndarray::{Array2, ArrayBase, Data, Ix2};
use ndarray_rand::rand::Rng;

/// Step matrix B: the (g + 1, g) strictly lower triangular matrix of ones.
pub fn step_matrix<F: Float>(num_groups: usize) -> Array2<F> {
    Array2::from_shape_fn((num_groups + 1, num_groups), |(i, j)| {
        if j < i { F::one() } else { F::zero() }
    })
}

/// Computes the (g + 1, nx) trajectory matrix
/// `B* = J x* + delta / 2 * ((2 B (G P*)^T - J) D* + J)`
///
/// where
/// * `j`: (g + 1, nx) matrix of ones
/// * `x_star`: (1, nx) base point
/// * `delta`: step
/// * `b`: (g + 1, g) [step matrix](step_matrix)
/// * `g`: (nx, g) group membership matrix
/// * `p_star`: (g, g) permutation matrix
/// * `d_star`: (nx, nx) diagonal matrix of +1/-1 directions of the factors
///
/// See Saltelli et al. (2008), Global Sensitivity Analysis. The Primer, section 3.2
pub fn compute_b_star<F: Float>(
    j: &ArrayBase<impl Data<Elem = F>, Ix2>,
    x_star: &ArrayBase<impl Data<Elem = F>, Ix2>,
    delta: F,
    b: &ArrayBase<impl Data<Elem = F>, Ix2>,
    g: &ArrayBase<impl Data<Elem = F>, Ix2>,
    p_star: &ArrayBase<impl Data<Elem = F>, Ix2>,
    d_star: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> Array2<F> {
    let two = F::cast(2.);
    let base = &j.row(0) * &x_star.row(0);
    let order = g.dot(p_star).reversed_axes();
    let moves = (b.dot(&order) * two - j).dot(d_star);
    (moves + j) * (delta / two) + &base
}

/// Generates a random Morris trajectory: a (g + 1, nx) matrix of points of `[0, 1]^nx`
/// where two consecutive points differ in the factors of only one group.
///
/// * `group_membership`: (nx, g) group membership matrix (identity when factors are not grouped)
/// * `num_levels`: number of levels p of the grid
/// * `grid_jump`: number of grid values the base point is drawn from
///
/// All factors of a group step in the same direction.
///
/// # Errors
///
/// * [MorrisError::InvalidValueError] when `num_levels < 2`, `grid_jump == 0` or `grid_jump >= num_levels`
/// * [MorrisError::TrajectoryBoundsError] if the trajectory leaves the unit hypercube
pub fn generate_trajectory<F: Float, R: Rng>(
    group_membership: &ArrayBase<impl Data<Elem = F>, Ix2>,
    num_levels: usize,
    grid_jump: usize,
    rng: &mut R,
) -> Result<Array2<F>> {
    check_levels(num_levels, grid_jump)?;
    let delta = compute_delta::<F>(num_levels);
    let num_vars = group_membership.nrows();
    let num_groups = group_membership.ncols();

    let b = step_matrix::<F>(num_groups);
    let p_star = generate_p_star::<F, R>(num_groups, rng);
    let j = Array2::<F>::ones((num_groups + 1, num_vars));
    // group directions lifted to the factors
    let directions = generate_d_star::<F, R>(num_groups, rng);
    let d_star = Array2::from_diag(&group_membership.dot(&directions.diag()));
    let x_star = generate_x_star::<F, R>(num_vars, num_levels, grid_jump, rng);

    let b_star = compute_b_star(&j, &x_star, delta, &b, group_membership, &p_star, &d_star);
    if b_star.iter().any(|&v| v < F::zero() || v > F::one()) {
        return Err(MorrisError::TrajectoryBoundsError(format!(
            "trajectory {b_star} not in [0, 1] with delta={delta}"
        )));
    }
    Ok(b_star)
}

pub(crate) fn check_levels(num_levels: usize, grid_jump: usize) -> Result<()> {
    if num_levels < 2 {
        return Err(MorrisError::InvalidValueError(format!(
            "number of levels should be at least 2, got {num_levels}"
        )));
    }
    if grid_jump == 0 {
        return Err(MorrisError::InvalidValueError(
            "grid jump should be strictly positive".to_string(),
        ));
    }
    if grid_jump >= num_levels {
        return Err(MorrisError::InvalidValueError(format!(
            "grid jump ({grid_jump}) should be lower than the number of levels ({num_levels})"
        )));
    }
    Ok(())
}
