/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares configuration types for the direct solver and for chunked evaluation.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Declares configuration types for the direct solver and for chunked evaluation.
use serde::{Deserialize, Serialize};

/// Enum for the available direct solvers of the augmented RBF system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Solvers {
    /// LU factorisation with partial pivoting. Cheapest, and accurate for
    /// well separated control points.
    #[default]
    PartialPivLu,

    /// Pseudo-inverse through a singular value decomposition. Roughly an
    /// order of magnitude slower, but tolerant of duplicate control points.
    Svd,
}

/// Solver and evaluation parameters.
///
/// ### Default Values
/// - `solver_type`: [`Solvers::PartialPivLu`]
/// - `least_squares_fallback`: `true`
/// - `residual_tolerance`: `1e-9`
/// - `svd_rcond`: `1e-12`
/// - `polynomial_rank_tolerance`: `1e-10`
/// - `eval_chunk_size`: `1024`
/// - `parallel_evaluation`: `false`
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Params {
    /// Direct solver used for the augmented system.
    pub solver_type: Solvers,

    /// Retry with an SVD pseudo-inverse when the LU solution is non-finite
    /// or does not meet `residual_tolerance`. When disabled such a system
    /// fails the fit instead.
    pub least_squares_fallback: bool,

    /// Largest accepted relative residual `|Ax - b|_F / |b|_F` of an LU
    /// solution. The absolute residual is used when `b` is zero.
    pub residual_tolerance: f64,

    /// Singular values below `svd_rcond * s_max` are treated as zero by the
    /// pseudo-inverse.
    pub svd_rcond: f64,

    /// Relative threshold on the diagonal of the pivoted QR of the monomial
    /// matrix below which an affine column is considered dependent and dropped.
    pub polynomial_rank_tolerance: f64,

    /// Number of query points mapped per block. Bounds the size of the
    /// intermediate `(chunk x control points)` kernel matrix.
    pub eval_chunk_size: usize,

    /// Evaluate chunks on the rayon thread pool.
    pub parallel_evaluation: bool,
}

impl Params {
    /// Returns a new [`ParamsBuilder`] populated with the defaults.
    pub fn builder() -> ParamsBuilder {
        ParamsBuilder::new()
    }
}

impl Default for Params {
    fn default() -> Self {
        Params::builder().build()
    }
}

/// A convenience builder for constructing a [`Params`] instance.
///
/// The builder should be called via the [`Params::builder`] method.
///
/// See [`Params`] for details on each field.
#[derive(Debug, Clone)]
pub struct ParamsBuilder {
    pub solver_type: Solvers,
    pub least_squares_fallback: bool,
    pub residual_tolerance: f64,
    pub svd_rcond: f64,
    pub polynomial_rank_tolerance: f64,
    pub eval_chunk_size: usize,
    pub parallel_evaluation: bool,
}

impl ParamsBuilder {
    fn new() -> Self {
        Self {
            solver_type: Solvers::default(),
            least_squares_fallback: true,
            residual_tolerance: 1e-9,
            svd_rcond: 1e-12,
            polynomial_rank_tolerance: 1e-10,
            eval_chunk_size: 1024,
            parallel_evaluation: false,
        }
    }

    /// Sets the solver type.
    pub fn solver_type(mut self, solver_type: Solvers) -> Self {
        self.solver_type = solver_type;
        self
    }

    /// Enables or disables the least-squares fallback.
    pub fn least_squares_fallback(mut self, least_squares_fallback: bool) -> Self {
        self.least_squares_fallback = least_squares_fallback;
        self
    }

    /// Sets the accepted relative residual of an LU solution.
    pub fn residual_tolerance(mut self, residual_tolerance: f64) -> Self {
        self.residual_tolerance = residual_tolerance;
        self
    }

    /// Sets the relative singular value cut-off of the pseudo-inverse.
    pub fn svd_rcond(mut self, svd_rcond: f64) -> Self {
        self.svd_rcond = svd_rcond;
        self
    }

    /// Sets the rank threshold for the affine columns.
    pub fn polynomial_rank_tolerance(mut self, polynomial_rank_tolerance: f64) -> Self {
        self.polynomial_rank_tolerance = polynomial_rank_tolerance;
        self
    }

    /// Sets the number of query points mapped per block.
    pub fn eval_chunk_size(mut self, eval_chunk_size: usize) -> Self {
        self.eval_chunk_size = eval_chunk_size;
        self
    }

    /// Enables or disables parallel chunk evaluation.
    pub fn parallel_evaluation(mut self, parallel_evaluation: bool) -> Self {
        self.parallel_evaluation = parallel_evaluation;
        self
    }

    /// Builds and returns a [`Params`] instance.
    pub fn build(self) -> Params {
        Params {
            solver_type: self.solver_type,
            least_squares_fallback: self.least_squares_fallback,
            residual_tolerance: self.residual_tolerance,
            svd_rcond: self.svd_rcond,
            polynomial_rank_tolerance: self.polynomial_rank_tolerance,
            eval_chunk_size: self.eval_chunk_size,
            parallel_evaluation: self.parallel_evaluation,
        }
    }
}
