//! Deterministic eigen-decomposition for symmetric matrices.
//!
//! The Jacobi algorithm is stable, simple, and fully deterministic, which
//! is what the estimator needs: re-running the pipeline on identical input
//! must yield bit-identical weights. Covariance matrices here are small
//! (one row/column per variable of a sub-index), so speed is not a concern.

use crate::WeightError;
use ndarray::{Array1, Array2};

/// Result of an eigen-decomposition.
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    /// Eigenvalues, sorted in descending order.
    pub eigenvalues: Array1<f64>,
    /// Eigenvectors; column `i` pairs with `eigenvalues[i]`.
    pub eigenvectors: Array2<f64>,
}

/// Decompose a symmetric matrix with the Jacobi rotation algorithm.
///
/// # Errors
///
/// Returns [`WeightError::DimensionMismatch`] for non-square input.
pub fn symmetric_eigen(
    matrix: &Array2<f64>,
    max_iterations: usize,
    tolerance: f64,
) -> Result<EigenDecomposition, WeightError> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(WeightError::DimensionMismatch {
            expected: n,
            actual: matrix.ncols(),
        });
    }

    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);

    for _ in 0..max_iterations {
        let (p, q, max_val) = largest_off_diagonal(&a);
        if max_val.abs() < tolerance {
            break;
        }
        let (cos_theta, sin_theta) = rotation(a[[p, p]], a[[q, q]], a[[p, q]]);
        rotate(&mut a, &mut v, p, q, cos_theta, sin_theta);
    }

    let mut eigenvalues = Array1::<f64>::zeros(n);
    for i in 0..n {
        eigenvalues[i] = a[[i, i]];
    }

    // Sort eigenpairs in descending eigenvalue order
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&i, &j| {
        eigenvalues[j]
            .partial_cmp(&eigenvalues[i])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let sorted_eigenvalues = indices.iter().map(|&i| eigenvalues[i]).collect();
    let mut sorted_eigenvectors = Array2::<f64>::zeros((n, n));
    for (new_idx, &old_idx) in indices.iter().enumerate() {
        sorted_eigenvectors
            .column_mut(new_idx)
            .assign(&v.column(old_idx));
    }

    Ok(EigenDecomposition {
        eigenvalues: sorted_eigenvalues,
        eigenvectors: sorted_eigenvectors,
    })
}

/// Find the largest off-diagonal element of a symmetric matrix.
///
/// A 1x1 matrix has no off-diagonal element; it is already diagonal.
fn largest_off_diagonal(matrix: &Array2<f64>) -> (usize, usize, f64) {
    let n = matrix.nrows();
    if n < 2 {
        return (0, 0, 0.0);
    }
    let mut max_val = 0.0;
    let mut p = 0;
    let mut q = 1;

    for i in 0..n {
        for j in (i + 1)..n {
            let val = matrix[[i, j]].abs();
            if val > max_val {
                max_val = val;
                p = i;
                q = j;
            }
        }
    }

    (p, q, matrix[[p, q]])
}

/// Compute the (cos, sin) pair of a single Jacobi rotation.
fn rotation(app: f64, aqq: f64, apq: f64) -> (f64, f64) {
    if apq.abs() < 1e-15 {
        return (1.0, 0.0);
    }

    let tau = (aqq - app) / (2.0 * apq);
    let t = if tau >= 0.0 {
        1.0 / (tau + (1.0 + tau * tau).sqrt())
    } else {
        -1.0 / (-tau + (1.0 + tau * tau).sqrt())
    };

    let cos_theta = 1.0 / (1.0 + t * t).sqrt();
    let sin_theta = t * cos_theta;

    (cos_theta, sin_theta)
}

/// Apply one Jacobi rotation to the working matrix and the accumulated
/// eigenvector matrix.
fn rotate(a: &mut Array2<f64>, v: &mut Array2<f64>, p: usize, q: usize, cos: f64, sin: f64) {
    let n = a.nrows();

    let app = a[[p, p]];
    let aqq = a[[q, q]];
    let apq = a[[p, q]];

    a[[p, p]] = cos * cos * app - 2.0 * cos * sin * apq + sin * sin * aqq;
    a[[q, q]] = sin * sin * app + 2.0 * cos * sin * apq + cos * cos * aqq;
    a[[p, q]] = 0.0;
    a[[q, p]] = 0.0;

    for i in 0..n {
        if i != p && i != q {
            let aip = a[[i, p]];
            let aiq = a[[i, q]];

            a[[i, p]] = cos * aip - sin * aiq;
            a[[p, i]] = a[[i, p]];

            a[[i, q]] = sin * aip + cos * aiq;
            a[[q, i]] = a[[i, q]];
        }
    }

    for i in 0..n {
        let vip = v[[i, p]];
        let viq = v[[i, q]];

        v[[i, p]] = cos * vip - sin * viq;
        v[[i, q]] = sin * vip + cos * viq;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identity_eigenvalues() {
        let matrix = Array2::<f64>::eye(3);
        let decomp = symmetric_eigen(&matrix, 100, 1e-12).unwrap();
        for &val in decomp.eigenvalues.iter() {
            assert_abs_diff_eq!(val, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_diagonal_matrix_sorted_descending() {
        let mut matrix = Array2::<f64>::zeros((3, 3));
        matrix[[0, 0]] = 2.0;
        matrix[[1, 1]] = 4.0;
        matrix[[2, 2]] = 1.0;

        let decomp = symmetric_eigen(&matrix, 100, 1e-12).unwrap();
        assert_abs_diff_eq!(decomp.eigenvalues[0], 4.0, epsilon = 1e-10);
        assert_abs_diff_eq!(decomp.eigenvalues[1], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(decomp.eigenvalues[2], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_known_2x2_eigenpair() {
        // [[2, 1], [1, 2]] has eigenvalues 3 and 1 with eigenvectors
        // (1, 1)/sqrt(2) and (1, -1)/sqrt(2)
        let matrix = Array2::from_shape_vec((2, 2), vec![2.0, 1.0, 1.0, 2.0]).unwrap();
        let decomp = symmetric_eigen(&matrix, 100, 1e-12).unwrap();

        assert_abs_diff_eq!(decomp.eigenvalues[0], 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(decomp.eigenvalues[1], 1.0, epsilon = 1e-10);

        let v0 = decomp.eigenvectors.column(0);
        assert_abs_diff_eq!(v0[0].abs(), 1.0 / 2f64.sqrt(), epsilon = 1e-10);
        assert_abs_diff_eq!(v0[1].abs(), 1.0 / 2f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_non_square_rejected() {
        let matrix = Array2::<f64>::zeros((2, 3));
        assert!(symmetric_eigen(&matrix, 100, 1e-12).is_err());
    }

    #[test]
    fn test_deterministic() {
        let matrix =
            Array2::from_shape_vec((3, 3), vec![4.0, 1.0, 0.5, 1.0, 9.0, 1.5, 0.5, 1.5, 16.0])
                .unwrap();
        let a = symmetric_eigen(&matrix, 100, 1e-12).unwrap();
        let b = symmetric_eigen(&matrix, 100, 1e-12).unwrap();
        assert_eq!(a.eigenvalues, b.eigenvalues);
        assert_eq!(a.eigenvectors, b.eigenvectors);
    }
}
