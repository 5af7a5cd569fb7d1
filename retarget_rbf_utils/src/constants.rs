/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines default shape parameters and numerical guards for the radial kernels.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

/// Default shape radius handed to the radius-dependent kernels.
pub const DEFAULT_RADIUS: f64 = 0.5;

/// Distances below this are treated as exactly zero by kernels with a
/// singular log term.
pub const ZERO_DISTANCE: f64 = f64::EPSILON;
