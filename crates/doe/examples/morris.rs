use morris_doe::{Groups, Morris, Problem, Selection};
use ndarray::arr2;

fn main() {
    let problem = Problem::new(4)
        .names(["x1", "x2", "x3", "x4"])
        .bounds(&arr2(&[[0., 1.], [-10., 10.], [5., 15.], [0., 100.]]))
        .groups(Groups::labels(["A", "A", "B", "C"]));
    let n = 10;

    println!("Take {n} Morris trajectories of problem");
    println!("{problem:?}\n");

    println!("*** all trajectories");
    let samples = Morris::new(&problem).sample(n).unwrap();
    println!("{samples}\n");

    println!("*** 4 optimal trajectories (brute force)");
    let samples = Morris::new(&problem)
        .optimal_trajectories(Some(4))
        .sample(n)
        .unwrap();
    println!("{samples}\n");

    println!("*** 4 optimal trajectories (local optimization)");
    let samples = Morris::new(&problem)
        .optimal_trajectories(Some(4))
        .selection(Selection::LocalOptimization)
        .sample(n)
        .unwrap();
    println!("{samples}\n");
}
