/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides parameter and builder types for configuring RBF kernels.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{constants::DEFAULT_RADIUS, utils::KernelType};
use serde::{Deserialize, Serialize};

/// Defines the [`KernelType`] to use, along with the shape radius for
/// the radius-dependent kernels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct KernelParams {
    /// KernelType enum variant to use.
    pub kernel_type: KernelType,

    /// Shape parameter `ε` controlling the width of the Gaussian and
    /// multiquadric kernels. Smaller values restrict influence to a local
    /// neighbourhood, larger values produce smoother, broader effects.
    ///
    /// Accepted, but without effect, for the thin plate and polyharmonic kernels.
    pub radius: f64,
}

impl KernelParams {
    /// Begins building a [`KernelParams`] instance for the given kernel type.
    pub fn builder(kernel_type: KernelType) -> KernelParamsBuilder {
        KernelParamsBuilder {
            kernel_type,
            radius: DEFAULT_RADIUS,
        }
    }
}

/// Builder for [`KernelParams`] that provides sensible defaults.
#[derive(Debug, Clone, Copy)]
pub struct KernelParamsBuilder {
    kernel_type: KernelType,
    radius: f64,
}

impl KernelParamsBuilder {
    /// Sets the `radius` parameter on the builder.
    pub fn radius(mut self, v: f64) -> Self {
        self.radius = v;
        self
    }

    /// Finalises the builder into a [`KernelParams`] value.
    ///
    /// # Panics
    /// If the kernel depends on the radius and `radius` is not positive.
    pub fn build(self) -> KernelParams {
        if self.kernel_type.uses_radius() {
            assert!(self.radius > 0.0);
        }
        KernelParams {
            kernel_type: self.kernel_type,
            radius: self.radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_free_kernels_accept_any_radius() {
        for kernel_type in [KernelType::ThinPlateSplineRbf, KernelType::PolyharmonicSplineRbf] {
            let params = KernelParams::builder(kernel_type).radius(0.0).build();
            assert_eq!(params.radius, 0.0);

            let params = KernelParams::builder(kernel_type).radius(-1.0).build();
            assert_eq!(params.kernel_type, kernel_type);
        }
    }

    #[test]
    #[should_panic]
    fn radius_dependent_kernels_reject_zero_radius() {
        KernelParams::builder(KernelType::GaussianSplineRbf)
            .radius(0.0)
            .build();
    }
}
