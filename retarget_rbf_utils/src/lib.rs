/////////////////////////////////////////////////////////////////////////////////////////////
//
// Re-exports kernel utilities, constants, and helper functions used across the retarget_rbf crates.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities for the [`retarget_rbf`] crate
//!
//! Hosts the five radial kernels used for body-shape retargeting, a runtime
//! [`KernelType`] selector, and dense kernel matrix assembly.
mod constants;
mod rbf_kernels;
mod traits;
mod utils;
mod kernel_helpers;

/// Implemented kernels for use in the [`retarget_rbf`] crate.
pub mod kernels {
    pub use super::rbf_kernels::*;
}

pub use {
    constants::{DEFAULT_RADIUS, ZERO_DISTANCE},
    kernel_helpers::{KernelParams, KernelParamsBuilder},
    utils::{
        KernelType, get_a_matrix, get_a_matrix_symmetric, get_a_matrix_symmetric_typed,
        get_a_matrix_typed, get_distance, get_pointarray_extents, kernel_phi, select_mat_rows,
    },
    traits::{KernelFromParams, KernelFunction},
};
