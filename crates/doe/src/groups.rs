use crate::errors::{MorrisError, Result};
use linfa::Float;
use ndarray::{Array2, ArrayBase, Data, Ix2};

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Assignment of the input factors to groups.
///
/// All factors belonging to the same group move together in a trajectory step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum Groups {
    /// One group label per factor: the ith label is the group of the ith factor
    Labels(Vec<String>),
    /// Precomputed (nx, ng) membership matrix paired with the ng group names
    Membership {
        /// Binary matrix where `matrix[[i, j]] == 1` when factor i belongs to group j
        matrix: Array2<usize>,
        /// Name of each group (column) of the membership matrix
        names: Vec<String>,
    },
}

impl Groups {
    /// Constructor from one group label per factor
    ///
    /// ```
    /// use morris_doe::Groups;
    ///
    /// let groups = Groups::labels(["G1", "G1", "G2"]);
    /// ```
    pub fn labels<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        Groups::Labels(labels.into_iter().map(Into::into).collect())
    }

    /// Constructor from a membership matrix and its group names
    pub fn membership<S: Into<String>>(
        matrix: &ArrayBase<impl Data<Elem = usize>, Ix2>,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        Groups::Membership {
            matrix: matrix.to_owned(),
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

/// Computes the (nx, ng) group membership matrix and the ng group names
/// where nx is the number of factors and ng the number of groups.
///
/// Group names are given in order of first appearance. When no groups are
/// specified every factor is its own group: the matrix is the identity and
/// names are `x1, ..., xnx`.
///
/// # Errors
///
/// [MorrisError::InvalidGroupsError] when the assignment does not pair with `num_vars`
/// (wrong label count, wrong matrix shape, names not matching the columns,
/// a factor not in exactly one group or an empty group).
pub fn compute_groups_matrix<F: Float>(
    groups: Option<&Groups>,
    num_vars: usize,
) -> Result<(Array2<F>, Vec<String>)> {
    match groups {
        None => Ok((
            Array2::eye(num_vars),
            (1..=num_vars).map(|i| format!("x{i}")).collect(),
        )),
        Some(Groups::Labels(labels)) => {
            if labels.len() != num_vars {
                return Err(MorrisError::InvalidGroupsError(format!(
                    "{} group labels given for {} factors",
                    labels.len(),
                    num_vars
                )));
            }
            let mut names: Vec<String> = vec![];
            for label in labels {
                if !names.contains(label) {
                    names.push(label.to_owned());
                }
            }
            let mut matrix = Array2::zeros((num_vars, names.len()));
            for (i, label) in labels.iter().enumerate() {
                let j = names.iter().position(|name| name == label).unwrap_or(0);
                matrix[[i, j]] = F::one();
            }
            Ok((matrix, names))
        }
        Some(Groups::Membership { matrix, names }) => {
            check_membership(matrix, names, num_vars)?;
            Ok((matrix.mapv(F::cast), names.to_owned()))
        }
    }
}

fn check_membership(matrix: &Array2<usize>, names: &[String], num_vars: usize) -> Result<()> {
    if matrix.nrows() != num_vars {
        return Err(MorrisError::InvalidGroupsError(format!(
            "membership matrix should have {} rows (one per factor), got shape {:?}",
            num_vars,
            matrix.shape()
        )));
    }
    if matrix.ncols() != names.len() {
        return Err(MorrisError::InvalidGroupsError(format!(
            "membership matrix has {} groups but {} names are given",
            matrix.ncols(),
            names.len()
        )));
    }
    if matrix.iter().any(|&v| v > 1) {
        return Err(MorrisError::InvalidGroupsError(
            "membership matrix should be binary".to_string(),
        ));
    }
    if let Some(i) = matrix.rows().into_iter().position(|row| row.sum() != 1) {
        return Err(MorrisError::InvalidGroupsError(format!(
            "factor {i} should belong to exactly one group"
        )));
    }
    if let Some(j) = matrix.columns().into_iter().position(|col| col.sum() == 0) {
        return Err(MorrisError::InvalidGroupsError(format!(
            "group {} has no factor",
            names[j]
        )));
    }
    Ok(())
}
