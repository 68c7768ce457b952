use crate::errors::{MorrisError, Result};
use crate::groups::{Groups, compute_groups_matrix};
use crate::orientation::compute_delta;
use crate::selection::{Selection, compute_optimised_trajectories};
use crate::trajectory::{check_levels, generate_trajectory};
use linfa::Float;
use log::{debug, info};
use ndarray::{Array2, ArrayBase, Axis, Data, Ix2, concatenate};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use std::sync::{Arc, RwLock};

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Maximum number of optimal trajectories for an exhaustive selection
pub const MAX_EXHAUSTIVE_TRAJECTORIES: usize = 10;

/// Definition of the input factors of the model under study
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Problem<F: Float> {
    /// Number of input factors
    num_vars: usize,
    /// Optional names of the factors
    names: Option<Vec<String>>,
    /// Optional (nx, 2) matrix, the ith row is the [lower_bound, upper_bound] of xi
    bounds: Option<Array2<F>>,
    /// Optional group assignment of the factors
    groups: Option<Groups>,
}

impl<F: Float> Problem<F> {
    /// Constructor of a problem of `num_vars` input factors
    ///
    /// ```
    /// use morris_doe::{Groups, Problem};
    /// use ndarray::arr2;
    ///
    /// let problem = Problem::new(3)
    ///     .bounds(&arr2(&[[0., 1.], [-5., 5.], [10., 20.]]))
    ///     .groups(Groups::labels(["G1", "G1", "G2"]));
    /// ```
    pub fn new(num_vars: usize) -> Self {
        Problem {
            num_vars,
            names: None,
            bounds: None,
            groups: None,
        }
    }

    /// Sets the names of the factors
    pub fn names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the bounds as a (nx, 2) matrix \[\[lower bound, upper bound\], ...\]
    pub fn bounds(mut self, bounds: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Self {
        self.bounds = Some(bounds.to_owned());
        self
    }

    /// Sets the group assignment of the factors
    pub fn groups(mut self, groups: Groups) -> Self {
        self.groups = Some(groups);
        self
    }

    /// Number of input factors
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Bounds of the factors if any
    pub fn get_bounds(&self) -> Option<&Array2<F>> {
        self.bounds.as_ref()
    }

    /// Returns the (nx, g) group membership matrix and the group names.
    ///
    /// Without groups, each factor is its own group named after the factor.
    pub fn groups_matrix(&self) -> Result<(Array2<F>, Vec<String>)> {
        let (matrix, names) = compute_groups_matrix(self.groups.as_ref(), self.num_vars)?;
        match (&self.groups, &self.names) {
            (None, Some(factor_names)) if factor_names.len() == self.num_vars => {
                Ok((matrix, factor_names.to_owned()))
            }
            _ => Ok((matrix, names)),
        }
    }

    /// Number of groups, the number of factors when ungrouped
    pub fn num_groups(&self) -> Result<usize> {
        Ok(self.groups_matrix()?.0.ncols())
    }
}

type RngRef<R> = Arc<RwLock<R>>;

/// The Morris design consists of N trajectories of (g + 1) points in `[0, 1]^nx`
/// built from a random base point on a p-level grid where each point moves one
/// group of factors of a step delta from the previous point.
///
/// Optionally, among the N generated trajectories only the most spread out ones
/// are kept (aka optimal trajectories).
///
/// ```
/// use morris_doe::{Morris, Problem};
/// use ndarray_rand::rand::SeedableRng;
/// use rand_xoshiro::Xoshiro256Plus;
///
/// let problem = Problem::<f64>::new(3);
/// let morris = Morris::new(&problem)
///     .num_levels(4)
///     .grid_jump(2)
///     .optimal_trajectories(Some(4))
///     .with_rng(Xoshiro256Plus::seed_from_u64(42));
/// // 4 trajectories selected among 10, each of 3 + 1 points
/// let samples = morris.sample(10).unwrap();
/// assert_eq!(samples.dim(), (16, 3));
/// ```
#[derive(Clone, Debug)]
pub struct Morris<F: Float, R: Rng> {
    /// Definition of the input factors
    problem: Problem<F>,
    /// Number of levels p of the grid
    num_levels: usize,
    /// Number of grid values the base points are drawn from
    grid_jump: usize,
    /// Number of trajectories selected among the generated ones, all are kept if None
    optimal_trajectories: Option<usize>,
    /// Method used to select the optimal trajectories
    selection: Selection,
    /// Random generator used for reproducibility
    rng: RngRef<R>,
}

impl<F: Float> Morris<F, Xoshiro256Plus> {
    /// Constructor given the problem definition, with a 4-levels grid and grid jump of 2
    pub fn new(problem: &Problem<F>) -> Self {
        Self::new_with_rng(problem, Xoshiro256Plus::from_entropy())
    }
}

impl<F: Float, R: Rng> Morris<F, R> {
    /// Constructor given the problem definition and a random generator for reproducibility
    pub fn new_with_rng(problem: &Problem<F>, rng: R) -> Self {
        Morris {
            problem: problem.clone(),
            num_levels: 4,
            grid_jump: 2,
            optimal_trajectories: None,
            selection: Selection::default(),
            rng: Arc::new(RwLock::new(rng)),
        }
    }

    /// Sets the number of levels of the grid
    pub fn num_levels(mut self, num_levels: usize) -> Self {
        self.num_levels = num_levels;
        self
    }

    /// Sets the grid jump
    pub fn grid_jump(mut self, grid_jump: usize) -> Self {
        self.grid_jump = grid_jump;
        self
    }

    /// Sets the number of optimal trajectories to select, None to keep all trajectories
    pub fn optimal_trajectories(mut self, optimal_trajectories: Option<usize>) -> Self {
        self.optimal_trajectories = optimal_trajectories;
        self
    }

    /// Sets the selection method of the optimal trajectories
    pub fn selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the random generator
    pub fn with_rng<R2: Rng>(self, rng: R2) -> Morris<F, R2> {
        Morris {
            problem: self.problem,
            num_levels: self.num_levels,
            grid_jump: self.grid_jump,
            optimal_trajectories: self.optimal_trajectories,
            selection: self.selection,
            rng: Arc::new(RwLock::new(rng)),
        }
    }

    /// Checks the sampling parameters for `n` generated trajectories
    pub fn check(&self, n: usize) -> Result<()> {
        if self.problem.num_vars() == 0 {
            return Err(MorrisError::InvalidValueError(
                "problem should have at least one factor".to_string(),
            ));
        }
        if n == 0 {
            return Err(MorrisError::InvalidValueError(
                "number of trajectories should be strictly positive".to_string(),
            ));
        }
        if let Some(bounds) = self.problem.get_bounds() {
            if bounds.dim() != (self.problem.num_vars(), 2) {
                return Err(MorrisError::InvalidValueError(format!(
                    "bounds should be a ({}, 2) matrix, got {:?}",
                    self.problem.num_vars(),
                    bounds.dim()
                )));
            }
        }
        check_levels(self.num_levels, self.grid_jump)?;
        if let Some(k) = self.optimal_trajectories {
            if k >= n {
                return Err(MorrisError::InvalidValueError(format!(
                    "number of optimal trajectories ({k}) should be lower than the number of trajectories ({n})"
                )));
            }
            if k < 2 {
                return Err(MorrisError::InvalidValueError(format!(
                    "number of optimal trajectories ({k}) should be at least 2"
                )));
            }
            if self.selection.is_exhaustive() && k > MAX_EXHAUSTIVE_TRAJECTORIES {
                return Err(MorrisError::InvalidValueError(format!(
                    "exhaustive selection of more than {MAX_EXHAUSTIVE_TRAJECTORIES} optimal trajectories ({k}) takes too long, use local optimization"
                )));
            }
        }
        Ok(())
    }

    /// Generates `n` trajectories stacked in a ((g + 1) * M, nx) matrix of `[0, 1]^nx`
    /// where M is the number of optimal trajectories if specified, `n` otherwise.
    ///
    /// # Errors
    ///
    /// * [MorrisError::InvalidValueError] when parameters or bounds are invalid, see [Morris::check]
    /// * [MorrisError::InvalidGroupsError] when groups do not match the factors
    pub fn normalized_sample(&self, n: usize) -> Result<Array2<F>> {
        self.check(n)?;
        let (group_membership, group_names) = self.problem.groups_matrix()?;
        debug!(
            "Morris sampling: {} factors, {} groups {:?}, delta = {}",
            self.problem.num_vars(),
            group_names.len(),
            group_names,
            compute_delta::<F>(self.num_levels)
        );

        let trajectories = {
            let mut rng = self.rng.write().unwrap();
            (0..n)
                .map(|_| {
                    generate_trajectory(&group_membership, self.num_levels, self.grid_jump, &mut *rng)
                })
                .collect::<Result<Vec<_>>>()?
        };
        let views: Vec<_> = trajectories.iter().map(|t| t.view()).collect();
        let sample = concatenate(Axis(0), &views).map_err(|err| {
            MorrisError::InvalidValueError(format!("cannot stack trajectories: {err}"))
        })?;
        info!(
            "Generate {} Morris trajectories with {} levels",
            n, self.num_levels
        );

        match self.optimal_trajectories {
            Some(k) => {
                info!("Select {} optimal trajectories ({:?})", k, self.selection);
                compute_optimised_trajectories(&self.problem, &sample, n, k, self.selection)
            }
            None => Ok(sample),
        }
    }

    /// Generates trajectories as [Morris::normalized_sample] scaled to the problem bounds
    /// when given, `x = lower + x_normalized * (upper - lower)`.
    ///
    /// # Errors
    ///
    /// Same as [Morris::normalized_sample].
    pub fn sample(&self, n: usize) -> Result<Array2<F>> {
        let doe = self.normalized_sample(n)?;
        match self.problem.get_bounds() {
            Some(bounds) => {
                let lower = bounds.column(0);
                let scaler = &bounds.column(1) - &lower;
                Ok(doe * scaler + lower)
            }
            None => Ok(doe),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr2, array};
    use ndarray_rand::rand::RngCore;

    fn setup_problem() -> Problem<f64> {
        Problem::new(3)
            .names(["Test 1", "Test 2", "Test 3"])
            .bounds(&arr2(&[[0., 1.], [0., 1.], [0., 1.]]))
    }

    fn init_logger() {
        let env = env_logger::Env::new().filter_or("MORRIS_LOG", "info");
        let mut builder = env_logger::Builder::from_env(env);
        let builder = builder.target(env_logger::Target::Stdout);
        builder.try_init().ok();
    }

    #[test]
    fn test_morris_sample() {
        init_logger();
        let morris = Morris::new(&setup_problem()).with_rng(Xoshiro256Plus::seed_from_u64(42));
        let doe = morris.sample(10).unwrap();
        assert_eq!(doe.dim(), (40, 3));
        assert!(doe.iter().all(|&v| (0. ..=1.).contains(&v)));
    }

    #[test]
    fn test_morris_reproducible() {
        let problem = setup_problem();
        let doe1 = Morris::new(&problem)
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .sample(5)
            .unwrap();
        let doe2 = Morris::new(&problem)
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .sample(5)
            .unwrap();
        assert_abs_diff_eq!(doe1, doe2);
    }

    #[test]
    fn test_grid_jump_lt_num_levels() {
        let morris = Morris::new(&setup_problem())
            .num_levels(4)
            .grid_jump(4)
            .optimal_trajectories(Some(5));
        assert!(matches!(
            morris.sample(10),
            Err(MorrisError::InvalidValueError(_))
        ));
    }

    #[test]
    fn test_optimal_trajectories_lt_samples() {
        let morris = Morris::new(&setup_problem())
            .num_levels(4)
            .grid_jump(2)
            .optimal_trajectories(Some(10));
        assert!(matches!(
            morris.sample(10),
            Err(MorrisError::InvalidValueError(_))
        ));
    }

    #[test]
    fn test_optimal_trajectories_lt_10() {
        let morris = Morris::new(&setup_problem())
            .num_levels(4)
            .grid_jump(2)
            .optimal_trajectories(Some(11));
        assert!(matches!(
            morris.sample(20),
            Err(MorrisError::InvalidValueError(_))
        ));
    }

    #[test]
    fn test_optimal_trajectories_gte_one() {
        let morris = Morris::new(&setup_problem())
            .num_levels(4)
            .grid_jump(2)
            .optimal_trajectories(Some(1));
        assert!(matches!(
            morris.sample(10),
            Err(MorrisError::InvalidValueError(_))
        ));
    }

    #[test]
    fn test_local_optimization_allows_more_than_10() {
        let morris = Morris::new(&setup_problem())
            .optimal_trajectories(Some(11))
            .selection(Selection::LocalOptimization)
            .with_rng(Xoshiro256Plus::seed_from_u64(0));
        let doe = morris.sample(15).unwrap();
        assert_eq!(doe.dim(), (44, 3));
    }

    #[test]
    fn test_group_sample_fails_with_wrong_g_matrix() {
        let problem = Problem::new(4)
            .bounds(&arr2(&[[0., 1.], [0., 1.], [0., 1.], [0., 1.]]))
            .groups(Groups::membership(&array![[1, 2, 3, 4]], Vec::<String>::new()));
        let morris = Morris::new(&problem).num_levels(4).grid_jump(2);
        assert!(matches!(
            morris.sample(6),
            Err(MorrisError::InvalidGroupsError(_))
        ));
    }

    #[test]
    fn test_group_sample() {
        let problem: Problem<f64> =
            Problem::new(3).groups(Groups::labels(["Group 1", "Group 1", "Group 2"]));
        let morris = Morris::new(&problem).with_rng(Xoshiro256Plus::seed_from_u64(42));
        let doe = morris.sample(4).unwrap();
        // 2 groups: 3 points per trajectory
        assert_eq!(doe.dim(), (12, 3));
        for traj in doe.exact_chunks((3, 3)) {
            for step in 0..2 {
                let diff = &traj.row(step + 1) - &traj.row(step);
                // factors of the first group move together
                assert_abs_diff_eq!(diff[0], diff[1]);
            }
        }
    }

    #[test]
    fn test_optimal_sample_is_subset() {
        let problem: Problem<f64> = Problem::new(2);
        let all = Morris::new(&problem)
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .sample(8)
            .unwrap();
        let selected = Morris::new(&problem)
            .optimal_trajectories(Some(3))
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .sample(8)
            .unwrap();
        assert_eq!(selected.dim(), (9, 2));
        for traj in selected.exact_chunks((3, 2)) {
            assert!(all.exact_chunks((3, 2)).into_iter().any(|t| t == traj));
        }
    }

    #[test]
    fn test_sample_scaled_to_bounds() {
        let problem = Problem::new(2).bounds(&arr2(&[[5., 10.], [-1., 1.]]));
        let normalized = Morris::new(&problem)
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .normalized_sample(3)
            .unwrap();
        let scaled = Morris::new(&problem)
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .sample(3)
            .unwrap();
        assert_abs_diff_eq!(
            scaled.column(0),
            normalized.column(0).mapv(|v| 5. + 5. * v),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            scaled.column(1),
            normalized.column(1).mapv(|v| -1. + 2. * v),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_wrong_bounds_shape() {
        let problem = Problem::new(3).bounds(&arr2(&[[0., 1.], [0., 1.]]));
        let morris = Morris::new(&problem).with_rng(Xoshiro256Plus::seed_from_u64(42));
        assert!(matches!(
            morris.sample(3),
            Err(MorrisError::InvalidValueError(_))
        ));
        // rejected before any trajectory is drawn
        let mut expected = Xoshiro256Plus::seed_from_u64(42);
        assert_eq!(morris.rng.write().unwrap().next_u64(), expected.next_u64());
    }

    #[cfg(feature = "serializable")]
    #[test]
    fn test_problem_serde() {
        let problem = setup_problem().groups(Groups::labels(["a", "a", "b"]));
        let json = serde_json::to_string(&problem).unwrap();
        let loaded: Problem<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(problem, loaded);
    }

    #[test]
    fn test_group_names_default_to_factor_names() {
        let (_, names) = setup_problem().groups_matrix().unwrap();
        assert_eq!(names, vec!["Test 1", "Test 2", "Test 3"]);
    }
}
