//! Distance and combinatorics helpers
use linfa::Float;
use ndarray::{Array2, ArrayBase, Data, Ix2, Zip};
use ndarray_stats::DeviationExt;

/// Computes the euclidean distances between rows of two 2D arrays using parallel processing
/// The resulting array has shape (ma, mb) where ma is the number of rows in xa and mb is the number of rows in xb
///
/// **Panics** if xa and xb have not the same number of columns.
pub fn cdist<F: Float>(
    xa: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    xb: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
) -> Array2<F> {
    let ma = xa.nrows();
    let mb = xb.nrows();
    let na = xa.ncols();
    let nb = xb.ncols();
    if na != nb {
        panic!("cdist: operands should have same nb of columns. Found {na} and {nb}");
    }

    let mut res = Array2::zeros((ma, mb));
    Zip::from(res.rows_mut())
        .and(xa.rows())
        .par_for_each(|mut row_res, row_a| {
            for (j, row_b) in xb.rows().into_iter().enumerate() {
                row_res[j] = F::cast(row_a.l2_dist(&row_b).unwrap());
            }
        });

    res
}

/// Number of combinations C(n, k) or None if it overflows `usize`
pub fn binomial(n: usize, k: usize) -> Option<usize> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut res: u128 = 1;
    for i in 0..k {
        // exact division as res is C(n, i) * (n - i), C(n, i) <= C(n, k) fits in usize
        res = res * (n - i) as u128 / (i + 1) as u128;
        if res > usize::MAX as u128 {
            return None;
        }
    }
    Some(res as usize)
}

/// Iterator over the k-combinations of `0..n` in lexicographic order
///
/// ```
/// use morris_doe::utils::combinations;
///
/// let combos: Vec<Vec<usize>> = combinations(4, 2).collect();
/// assert_eq!(combos.len(), 6);
/// assert_eq!(combos[0], vec![0, 1]);
/// assert_eq!(combos[5], vec![2, 3]);
/// ```
pub fn combinations(n: usize, k: usize) -> Combinations {
    Combinations {
        n,
        indices: (0..k).collect(),
        done: k > n,
    }
}

/// Lexicographic k-combinations of `0..n`, see [combinations]
#[derive(Clone, Debug)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();
        let k = self.indices.len();
        // rightmost index which can still be incremented
        match (0..k).rev().find(|&i| self.indices[i] < self.n - k + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in (i + 1)..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_cdist() {
        let a = array![
            [35.0456, -85.2672],
            [35.1174, -89.9711],
            [35.9728, -83.9422],
            [36.1667, -86.7833]
        ];
        let expected = array![
            [0., 4.7044, 1.6172, 1.8856],
            [4.7044, 0., 6.0893, 3.3561],
            [1.6172, 6.0893, 0., 2.8477],
            [1.8856, 3.3561, 2.8477, 0.]
        ];
        assert_abs_diff_eq!(cdist(&a, &a), expected, epsilon = 1e-4);
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(6, 4), Some(15));
        assert_eq!(binomial(10, 0), Some(1));
        assert_eq!(binomial(3, 5), Some(0));
        assert_eq!(binomial(50, 25), Some(126_410_606_437_752));
        assert_eq!(binomial(usize::MAX, 2), None);
        // intermediate product exceeds usize while the result fits
        assert_eq!(binomial(67, 33), Some(14_226_520_737_620_288_370));
        assert_eq!(binomial(68, 34), None);
    }

    #[test]
    fn test_combinations_order() {
        let combos: Vec<Vec<usize>> = combinations(5, 3).collect();
        assert_eq!(combos.len(), binomial(5, 3).unwrap());
        assert_eq!(combos[0], vec![0, 1, 2]);
        assert_eq!(combos[1], vec![0, 1, 3]);
        assert_eq!(combos[9], vec![2, 3, 4]);
        assert!(combos.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_combinations_edge_cases() {
        assert_eq!(combinations(3, 0).collect::<Vec<_>>(), vec![Vec::<usize>::new()]);
        assert_eq!(combinations(3, 3).collect::<Vec<_>>(), vec![vec![0, 1, 2]]);
        assert_eq!(combinations(2, 3).count(), 0);
    }
}
