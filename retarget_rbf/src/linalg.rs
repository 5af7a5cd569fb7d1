/////////////////////////////////////////////////////////////////////////////////////////////
//
// Solves the dense augmented RBF system, with a least-squares fallback for singular systems.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # linalg
//!
//! Dense solves of the augmented RBF system.
//!
//! The system is first factorised with partially pivoted LU. The solution is
//! accepted when it is finite and its relative residual `|Ax - b| / |b|` is
//! within [`Params::residual_tolerance`]. Duplicate control points make the
//! kernel block rank deficient, in which case LU either produces non-finite
//! values or a solution with huge, cancelling weights; both fail the check and,
//! when [`Params::least_squares_fallback`] is enabled, the system is solved
//! again through a truncated SVD pseudo-inverse. This yields the minimum norm
//! least-squares solution, which averages conflicting targets of coincident
//! control points.

use crate::{
    config::{Params, Solvers},
    error::{RbfError, RbfResult},
    progress::{ProgressMsg, ProgressSink},
};
use faer::{linalg::solvers::Solve, Mat, MatRef};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The factorisation that produced a model's coefficients.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SolveMethod {
    /// LU with partial pivoting.
    PartialPivLu,

    /// Truncated SVD pseudo-inverse.
    LeastSquares,
}

/// Summary of how the augmented system was solved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SolveReport {
    pub method: SolveMethod,

    /// Numerical rank of the system. Equal to the system size for LU.
    pub rank: usize,

    /// `|Ax - b| / |b|` of the accepted solution.
    pub relative_residual: f64,
}

/// Solves `lhs * x = rhs` for every column of `rhs`.
///
/// # Errors
/// [`RbfError::SingularSystem`] if no finite, accurate solution is found.
pub(crate) fn solve_augmented_system(
    lhs: &Mat<f64>,
    rhs: &Mat<f64>,
    params: &Params,
    progress: Option<&Arc<dyn ProgressSink>>,
) -> RbfResult<(Mat<f64>, SolveReport)> {
    let size = lhs.nrows();

    let lu_residual = match params.solver_type {
        Solvers::PartialPivLu => {
            let lu = lhs.partial_piv_lu();
            let solution = lu.solve(rhs);

            let residual = match all_finite(solution.as_ref()) {
                true => relative_residual(lhs, &solution, rhs),
                false => f64::INFINITY,
            };

            if residual <= params.residual_tolerance {
                let report = SolveReport {
                    method: SolveMethod::PartialPivLu,
                    rank: size,
                    relative_residual: residual,
                };
                return Ok((solution, report));
            }

            if !params.least_squares_fallback {
                return Err(RbfError::singular(format!(
                    "LU solution rejected with relative residual {:e}",
                    residual
                )));
            }

            Some(residual)
        }
        Solvers::Svd => None,
    };

    let (solution, rank) = pseudo_inverse_solve(lhs, rhs, params.svd_rcond)?;

    if !all_finite(solution.as_ref()) {
        return Err(RbfError::singular("least-squares solution is not finite"));
    }

    if let (Some(lu_residual), Some(sink)) = (lu_residual, progress) {
        sink.emit(ProgressMsg::SolverFallback { lu_residual, rank });
    }

    let report = SolveReport {
        method: SolveMethod::LeastSquares,
        rank,
        relative_residual: relative_residual(lhs, &solution, rhs),
    };

    Ok((solution, report))
}

/// `|Ax - b|_F / |b|_F`, or the absolute residual when `b` is zero.
pub fn relative_residual(lhs: &Mat<f64>, solution: &Mat<f64>, rhs: &Mat<f64>) -> f64 {
    let residual = lhs * solution - rhs;
    let rhs_norm = rhs.norm_l2();

    match rhs_norm > 0.0 {
        true => residual.norm_l2() / rhs_norm,
        false => residual.norm_l2(),
    }
}

/// Minimum norm least-squares solve through the SVD, discarding singular
/// values below `rcond * s_max`. Returns the solution and the retained rank.
fn pseudo_inverse_solve(
    lhs: &Mat<f64>,
    rhs: &Mat<f64>,
    rcond: f64,
) -> RbfResult<(Mat<f64>, usize)> {
    let svd = lhs
        .svd()
        .map_err(|_| RbfError::singular("singular value decomposition did not converge"))?;

    let u = svd.U();
    let s = svd.S().column_vector();
    let v = svd.V();

    let s_max = s.iter().fold(0.0_f64, |acc, &sv| acc.max(sv));
    let cutoff = rcond * s_max;
    let rank = s.iter().filter(|&&sv| sv > cutoff).count();

    if rank == 0 {
        return Err(RbfError::singular("every singular value is zero"));
    }

    // x = V * S^+ * U^T * b
    let mut projected = u.transpose() * rhs;
    projected
        .row_iter_mut()
        .zip(s.iter())
        .for_each(|(row, &sv)| {
            let inv = match sv > cutoff {
                true => 1.0 / sv,
                false => 0.0,
            };
            row.iter_mut().for_each(|element| *element *= inv);
        });

    Ok((v * &projected, rank))
}

pub(crate) fn all_finite(values: MatRef<f64>) -> bool {
    values
        .col_iter()
        .all(|col| col.iter().all(|v| v.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::CollectingSink;
    use equator::assert;
    use faer::{mat, utils::approx::*};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn diagonally_dominant(n: usize, seed: u64) -> Mat<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Mat::from_fn(n, n, |i, j| match i == j {
            true => n as f64 + rng.random_range(0.0..1.0),
            false => rng.random_range(0.0..1.0),
        })
    }

    #[test]
    fn lu_solves_well_conditioned_system() {
        let n = 20;
        let lhs = diagonally_dominant(n, 1);
        let expected = Mat::from_fn(n, 3, |i, j| (i + j) as f64 * 0.1);
        let rhs = &lhs * &expected;

        let (solution, report) =
            solve_augmented_system(&lhs, &rhs, &Params::default(), None).unwrap();

        let approx_eq = CwiseMat(ApproxEq::eps() * 1e4);
        assert!(&solution ~ &expected);
        assert_eq!(report.method, SolveMethod::PartialPivLu);
        assert_eq!(report.rank, n);
        assert!(report.relative_residual < 1e-12);
    }

    #[test]
    fn singular_system_falls_back_to_least_squares() {
        let lhs = mat![[1.0, 1.0], [1.0, 1.0]];
        let rhs = mat![[2.0], [4.0]];

        let sink = Arc::new(CollectingSink::new());
        let dyn_sink: Arc<dyn ProgressSink> = sink.clone();

        let (solution, report) =
            solve_augmented_system(&lhs, &rhs, &Params::default(), Some(&dyn_sink)).unwrap();

        // Minimum norm least-squares solution: x0 + x1 = 3.
        let expected = mat![[1.5], [1.5]];
        let approx_eq = CwiseMat(ApproxEq::eps() * 128.0);
        assert!(&solution ~ &expected);

        assert_eq!(report.method, SolveMethod::LeastSquares);
        assert_eq!(report.rank, 1);

        let fallback_emitted = sink
            .messages()
            .iter()
            .any(|msg| matches!(msg, ProgressMsg::SolverFallback { rank: 1, .. }));
        assert!(fallback_emitted);
    }

    #[test]
    fn singular_system_without_fallback_is_an_error() {
        let lhs = mat![[1.0, 1.0], [1.0, 1.0]];
        let rhs = mat![[2.0], [3.0]];
        let params = Params::builder().least_squares_fallback(false).build();

        let result = solve_augmented_system(&lhs, &rhs, &params, None);
        assert!(matches!(result, Err(RbfError::SingularSystem { .. })));
    }

    #[test]
    fn svd_solver_skips_lu() {
        let lhs = mat![[2.0, 0.0], [0.0, 4.0]];
        let rhs = mat![[2.0, 4.0], [4.0, 8.0]];
        let params = Params::builder().solver_type(Solvers::Svd).build();

        let (solution, report) = solve_augmented_system(&lhs, &rhs, &params, None).unwrap();

        let expected = mat![[1.0, 2.0], [1.0, 2.0]];
        let approx_eq = CwiseMat(ApproxEq::eps() * 128.0);
        assert!(&solution ~ &expected);
        assert_eq!(report.method, SolveMethod::LeastSquares);
        assert_eq!(report.rank, 2);
    }

    #[test]
    fn zero_matrix_is_singular() {
        let lhs = Mat::<f64>::zeros(3, 3);
        let rhs = Mat::from_fn(3, 1, |_, _| 1.0);

        let result = solve_augmented_system(&lhs, &rhs, &Params::default(), None);
        assert!(matches!(result, Err(RbfError::SingularSystem { .. })));
    }

    #[test]
    fn residual_of_exact_solution_is_zero() {
        let lhs = mat![[1.0, 0.0], [0.0, 1.0]];
        let x = mat![[3.0], [4.0]];
        assert_eq!(relative_residual(&lhs, &x, &x), 0.0);
    }

    #[test]
    fn residual_is_relative_to_the_right_hand_side() {
        let lhs = mat![[1.0, 0.0], [0.0, 1.0]];
        let x = mat![[3.0], [4.0]];

        // |Ax - b| = 5 against |b| = 10.
        let rhs = mat![[6.0], [8.0]];
        assert!((relative_residual(&lhs, &x, &rhs) - 0.5).abs() < 1e-15);

        // A zero right-hand side gives the absolute residual.
        let zeros = Mat::<f64>::zeros(2, 1);
        assert!((relative_residual(&lhs, &x, &zeros) - 5.0).abs() < 1e-14);
    }
}
