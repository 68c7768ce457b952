/*!
This library implements the sampling of the [Morris method](https://en.wikipedia.org/wiki/Morris_method)
(a.k.a. elementary effects method) used for the screening of the input factors of a model
in global sensitivity analysis.

A Morris design is made of N trajectories in the unit hypercube `[0, 1]^nx`. Each trajectory
starts from a random point on a p-level grid and moves one factor, or one group of
factors, at a time by a step `delta`. A trajectory of a problem with g groups is thus made
of g + 1 points. Factors are grouped with [Groups]; when not grouped each factor is its own group.

Optionally the k most spread out trajectories are selected among the N generated ones
(aka optimal trajectories) either by an exhaustive search or a local optimization heuristic
(see [Selection]).

Example:
```
use morris_doe::{Groups, Morris, Problem, Selection};
use ndarray::arr2;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

// Three factors where the first two ones move together
let problem = Problem::new(3)
    .bounds(&arr2(&[[5., 10.], [0., 1.], [-1., 1.]]))
    .groups(Groups::labels(["G1", "G1", "G2"]));
// 10 trajectories of 2 + 1 points on a 4-level grid
let samples = Morris::new(&problem).sample(10).unwrap();
assert_eq!(samples.dim(), (30, 3));
// or else the 4 most spread out ones among 20 with a random generator for reproducibility
let samples = Morris::new(&problem)
    .num_levels(4)
    .grid_jump(2)
    .optimal_trajectories(Some(4))
    .selection(Selection::LocalOptimization)
    .with_rng(Xoshiro256Plus::seed_from_u64(42))
    .sample(20)
    .unwrap();
assert_eq!(samples.dim(), (12, 3));
```

Building blocks of a trajectory are available as well:
* [group membership matrix](crate::compute_groups_matrix),
* [orientation matrices](crate::orientation) `x*`, `D*`, `P*` and [step](crate::compute_delta),
* [trajectory computation](crate::compute_b_star),
* [optimal trajectories selection](crate::compute_optimised_trajectories).

*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod errors;
mod groups;
mod morris;
pub mod orientation;
mod selection;
mod trajectory;
pub mod utils;

pub use errors::*;
pub use groups::*;
pub use morris::*;
pub use orientation::{compute_delta, generate_p_star};
pub use selection::*;
pub use trajectory::*;
