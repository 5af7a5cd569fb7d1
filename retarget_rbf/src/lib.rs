/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API and high-level documentation for RBF deformation field retargeting.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Radial Basis Function (RBF) deformation fields for body retargeting.
//!
//! Retargeting an armature and its skinned meshes from one body shape to
//! another needs a smooth map of 3D space that carries the source body onto
//! the target body. This crate fits such a map from paired control points,
//! typically vertices of the source mesh and the same vertices on the target
//! mesh, and then evaluates it anywhere: bone heads and tails, or every vertex
//! of a clothing mesh.
//!
//! The map is a scattered-data interpolant `f(q) = q + s(q)`, where the
//! displacement `s` is a weighted sum of radial kernels centred on the
//! original control points plus an affine term `[1, x, y, z]`. Fitting solves
//! the dense augmented system
//!
//! ```text
//! [ K   P ] [ W ]   [ D - O ]
//! [ P^T 0 ] [ c ] = [   0   ]
//! ```
//!
//! once for all three output axes. Direct dense solves cost **O(N³)**, so
//! large meshes are usually thinned first with [`ControlPointSet::proxy`].
//!
//! # Features
//! - Five kernels: Gaussian, multiquadric and inverse multiquadric biharmonic,
//!   thin plate, and first order polyharmonic splines
//! - Exact reproduction of affine maps for every kernel
//! - Control points that do not span three dimensions (fewer than four points,
//!   or planar and collinear sets) are handled by dropping dependent affine terms
//! - Least-squares fallback for duplicate control points
//! - Chunked, optionally parallel evaluation with bounded memory
//! - JSON model persistence and CSV control point ingestion
//! - Built on [`faer`](https://docs.rs/faer/latest/faer/) for linear algebra, avoiding complex build dependencies
//!
//! # Examples
//!
//! ```
//! use retarget_rbf::{
//!     ControlPointSet,
//!     FittedModel,
//!     interpolant_config::{BasisKind, InterpolantSettings},
//!     generate_random_points,
//!     TestDeformations,
//! };
//!
//! // Sample a source "body" in the unit cube and a target body twisted about z.
//! let original = generate_random_points(60, 3, Some(42));
//! let deformed = TestDeformations::twist(&original, 0.5);
//!
//! let control_points = ControlPointSet::new(original, deformed.clone())?;
//!
//! let settings = InterpolantSettings::builder(BasisKind::ThinPlateSpline).build();
//!
//! // Fit the deformation field.
//! let model = FittedModel::builder(control_points, settings).fit()?;
//!
//! // The field carries every control point onto its partner.
//! let fitted = model.evaluate_at_source();
//!
//! let max_diff: f64 = (0..deformed.nrows())
//!     .flat_map(|i| (0..3).map(move |j| (i, j)))
//!     .map(|(i, j)| (deformed[(i, j)] - fitted[(i, j)]).abs())
//!     .fold(0.0, f64::max);
//!
//! assert!(max_diff < 1e-6);
//! # Ok::<(), retarget_rbf::RbfError>(())
//! ```
//!
//! # References
//! 1.  Fasshauer, G., 2007. Meshfree Approximation Methods with Matlab. World Scientific Publishing Co.
//! 2.  J. B. Cherrie. Fast Evaluation of Radial Basis Functions: Theory and Application.
//!     PhD thesis, University of Canterbury, 2000.
pub mod interpolant_config;

mod common;

mod control_points;

mod error;

mod rbf;

mod polynomials;

mod linalg;

pub mod progress;

pub mod config;

mod test_deformations;

pub use {
    common::{
        csv_to_control_points, generate_random_points, point_arrays_to_csv, points_from_arrays,
        points_from_rows, points_to_arrays,
    },
    control_points::ControlPointSet,
    error::{RbfError, RbfResult},
    interpolant_config::{BasisKind, InterpolantSettings},
    linalg::{SolveMethod, SolveReport},
    rbf::{evaluate, fit, Coefficients, FittedModel, FittedModelBuilder, ModelIOError},
    test_deformations::TestDeformations,
};
