//! Fixed-rank principal component analysis.
//!
//! Columns are centered to zero mean (no rescaling beyond centering), the
//! sample covariance matrix is decomposed with the Jacobi solver, and the
//! top components are reported as loadings plus explained-variance ratios.

use crate::WeightError;
use crate::eigen::symmetric_eigen;
use ndarray::{Array1, Array2, Axis};

/// Maximum Jacobi sweeps; covariance matrices here are tiny.
const EIGEN_MAX_ITERATIONS: usize = 100;

/// Convergence tolerance for off-diagonal elements.
const EIGEN_TOLERANCE: f64 = 1e-12;

/// Result of a fixed-rank PCA fit.
#[derive(Debug, Clone)]
pub struct PrincipalComponents {
    /// Fraction of total sample variance captured by each retained
    /// component, relative to the variance of all components.
    pub explained_variance_ratio: Array1<f64>,
    /// Loadings; row `i` holds component `i`'s coefficients over the
    /// original variables.
    pub loadings: Array2<f64>,
}

/// Fit a PCA of `rank` components to a complete-case sample matrix whose
/// rows are observations and whose columns are variables.
///
/// # Errors
///
/// Returns [`WeightError::InvalidRank`] for a zero rank,
/// [`WeightError::RankExceedsVariables`] when `rank` exceeds the column
/// count, and [`WeightError::InsufficientSample`] when there are fewer rows
/// than `rank` (or fewer than two, below which sample variance is
/// undefined).
pub fn fit_pca(sample: &Array2<f64>, rank: usize) -> Result<PrincipalComponents, WeightError> {
    let (n_rows, n_vars) = sample.dim();

    if rank == 0 {
        return Err(WeightError::InvalidRank(rank));
    }
    if rank > n_vars {
        return Err(WeightError::RankExceedsVariables {
            rank,
            variables: n_vars,
        });
    }
    let required = rank.max(2);
    if n_rows < required {
        return Err(WeightError::InsufficientSample {
            required,
            actual: n_rows,
        });
    }

    // Center variables to zero mean. n_rows >= 2, so the mean exists.
    let means = sample
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(n_vars));
    let centered = sample - &means.insert_axis(Axis(0));

    // Sample covariance: S = X^T X / (n - 1)
    let cov = centered.t().dot(&centered) / (n_rows - 1) as f64;

    let decomp = symmetric_eigen(&cov, EIGEN_MAX_ITERATIONS, EIGEN_TOLERANCE)?;

    // Total variance over ALL components; numerically tiny negative
    // eigenvalues are clamped to zero.
    let clamped: Vec<f64> = decomp.eigenvalues.iter().map(|&v| v.max(0.0)).collect();
    let total: f64 = clamped.iter().sum();

    let mut explained_variance_ratio = Array1::<f64>::zeros(rank);
    let mut loadings = Array2::<f64>::zeros((rank, n_vars));
    for i in 0..rank {
        explained_variance_ratio[i] = if total > 0.0 { clamped[i] / total } else { 0.0 };
        loadings.row_mut(i).assign(&decomp.eigenvectors.column(i));
    }

    Ok(PrincipalComponents {
        explained_variance_ratio,
        loadings,
    })
}
