/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the error type returned by fitting and evaluating RBF deformation fields.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::interpolant_config::BasisKind;
use std::{error::Error, fmt};

pub type RbfResult<T> = std::result::Result<T, RbfError>;

/// Errors raised while fitting or evaluating an RBF deformation field.
///
/// Errors at fit time abort construction of the [`FittedModel`](crate::FittedModel)
/// entirely. Errors at evaluation time abort the whole batch before any
/// point is mapped.
#[derive(Debug, Clone, PartialEq)]
pub enum RbfError {
    /// The control point sets are empty, differ in length, or contain
    /// non-finite coordinates.
    DegenerateInput { reason: String },

    /// A point matrix does not have the expected number of coordinates.
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// The augmented kernel system could not be solved, even with the
    /// least-squares fallback (when enabled).
    SingularSystem { reason: String },

    /// A radius-dependent kernel was given a non-positive or non-finite radius.
    InvalidRadius { basis_kind: BasisKind, radius: f64 },

    /// A chunked evaluation was requested with a chunk size of zero.
    InvalidChunkSize,

    /// A control point proxy stride of zero was requested.
    InvalidProxyLevel,
}

impl RbfError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        RbfError::DegenerateInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn singular(reason: impl Into<String>) -> Self {
        RbfError::SingularSystem {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RbfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RbfError::DegenerateInput { reason } => {
                write!(f, "degenerate control points: {}", reason)
            }
            RbfError::ShapeMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "{} must have {} coordinates per point, found {}",
                what, expected, found
            ),
            RbfError::SingularSystem { reason } => {
                write!(f, "singular RBF system: {}", reason)
            }
            RbfError::InvalidRadius { basis_kind, radius } => write!(
                f,
                "radius must be positive and finite for {}, got {}",
                basis_kind, radius
            ),
            RbfError::InvalidChunkSize => write!(f, "evaluation chunk size must be at least 1"),
            RbfError::InvalidProxyLevel => write!(f, "proxy level must be at least 1"),
        }
    }
}

impl Error for RbfError {}
