/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the concrete RBF kernel functions and their faer-compatible evaluations.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{constants::ZERO_DISTANCE, KernelFromParams, KernelFunction, KernelParams};
use faer::RowRef;

/// Gaussian spline RBF kernel with `phi(r) = exp(-(r / radius)^2)`.
#[derive(Clone, Debug, Copy)]
pub struct GaussianSplineRbfKernel {
    pub radius: f64,
    inv_radius_sq: f64,
}

impl GaussianSplineRbfKernel {
    #[inline(always)]
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            inv_radius_sq: 1.0 / (radius * radius),
        }
    }

    #[inline(always)]
    pub fn eval_r2(&self, r2: f64) -> f64 {
        (-r2 * self.inv_radius_sq).exp()
    }

    #[inline(always)]
    pub fn phi(&self, r: f64) -> f64 {
        self.eval_r2(r * r)
    }
}

impl KernelFunction for GaussianSplineRbfKernel {
    #[inline(always)]
    fn evaluate(&self, target: RowRef<f64>, source: RowRef<f64>) -> f64 {
        self.eval_r2(get_distance_sq(target, source))
    }
}

impl KernelFromParams for GaussianSplineRbfKernel {
    #[inline(always)]
    fn from_params(p: &KernelParams) -> Self {
        Self::new(p.radius)
    }
}

/// Multiquadric biharmonic RBF kernel with `phi(r) = sqrt(r^2 + radius^2)`.
#[derive(Clone, Debug, Copy)]
pub struct MultiQuadraticBiharmonicRbfKernel {
    pub radius: f64,
    radius_sq: f64,
}

impl MultiQuadraticBiharmonicRbfKernel {
    #[inline(always)]
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            radius_sq: radius * radius,
        }
    }

    #[inline(always)]
    pub fn eval_r2(&self, r2: f64) -> f64 {
        (r2 + self.radius_sq).sqrt()
    }

    #[inline(always)]
    pub fn phi(&self, r: f64) -> f64 {
        self.eval_r2(r * r)
    }
}

impl KernelFunction for MultiQuadraticBiharmonicRbfKernel {
    #[inline(always)]
    fn evaluate(&self, target: RowRef<f64>, source: RowRef<f64>) -> f64 {
        self.eval_r2(get_distance_sq(target, source))
    }
}

impl KernelFromParams for MultiQuadraticBiharmonicRbfKernel {
    #[inline(always)]
    fn from_params(p: &KernelParams) -> Self {
        Self::new(p.radius)
    }
}

/// Inverse multiquadric biharmonic RBF kernel with `phi(r) = 1 / sqrt(r^2 + radius^2)`.
///
/// The denominator is bounded below by `radius`, so the kernel is finite
/// everywhere for a positive radius.
#[derive(Clone, Debug, Copy)]
pub struct InvMultiQuadraticBiharmonicRbfKernel {
    pub radius: f64,
    radius_sq: f64,
}

impl InvMultiQuadraticBiharmonicRbfKernel {
    #[inline(always)]
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            radius_sq: radius * radius,
        }
    }

    #[inline(always)]
    pub fn eval_r2(&self, r2: f64) -> f64 {
        1.0 / (r2 + self.radius_sq).sqrt()
    }

    #[inline(always)]
    pub fn phi(&self, r: f64) -> f64 {
        self.eval_r2(r * r)
    }
}

impl KernelFunction for InvMultiQuadraticBiharmonicRbfKernel {
    #[inline(always)]
    fn evaluate(&self, target: RowRef<f64>, source: RowRef<f64>) -> f64 {
        self.eval_r2(get_distance_sq(target, source))
    }
}

impl KernelFromParams for InvMultiQuadraticBiharmonicRbfKernel {
    #[inline(always)]
    fn from_params(p: &KernelParams) -> Self {
        Self::new(p.radius)
    }
}

/// Thin plate spline RBF kernel with `phi(r) = r^2 log r`, and `phi(0) = 0`.
#[derive(Clone, Debug, Copy)]
pub struct ThinPlateSplineRbfKernel;

impl ThinPlateSplineRbfKernel {
    #[inline(always)]
    pub fn phi(&self, r: f64) -> f64 {
        match r.abs() < ZERO_DISTANCE {
            true => 0.0,
            false => r.powi(2) * r.ln(),
        }
    }
}

impl KernelFunction for ThinPlateSplineRbfKernel {
    #[inline(always)]
    fn evaluate(&self, target: RowRef<f64>, source: RowRef<f64>) -> f64 {
        let r = crate::get_distance(target, source);
        self.phi(r)
    }
}

impl KernelFromParams for ThinPlateSplineRbfKernel {
    #[inline(always)]
    fn from_params(_: &KernelParams) -> Self {
        ThinPlateSplineRbfKernel
    }
}

/// First order polyharmonic spline RBF kernel with `phi(r) = r`.
#[derive(Clone, Debug, Copy)]
pub struct PolyharmonicSplineRbfKernel;

impl PolyharmonicSplineRbfKernel {
    #[inline(always)]
    pub fn phi(&self, r: f64) -> f64 {
        r
    }
}

impl KernelFunction for PolyharmonicSplineRbfKernel {
    #[inline(always)]
    fn evaluate(&self, target: RowRef<f64>, source: RowRef<f64>) -> f64 {
        let r = crate::get_distance(target, source);
        self.phi(r)
    }
}

impl KernelFromParams for PolyharmonicSplineRbfKernel {
    #[inline(always)]
    fn from_params(_: &KernelParams) -> Self {
        PolyharmonicSplineRbfKernel
    }
}

/// Returns the squared Euclidean distance between two points.
#[inline(always)]
pub fn get_distance_sq(target: RowRef<f64>, source: RowRef<f64>) -> f64 {
    let mut dist = 0.0;
    for (t, s) in target.iter().zip(source.iter()) {
        let diff = t - s;
        dist += diff * diff;
    }
    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    const TOL: f64 = 1e-12;

    #[test]
    fn gaussian_peaks_at_zero_and_decays() {
        let k = GaussianSplineRbfKernel::new(0.5);
        assert!((k.phi(0.0) - 1.0).abs() < TOL);
        assert!((k.phi(0.5) - (-1.0f64).exp()).abs() < TOL);
        assert!(k.phi(2.0) < k.phi(1.0));
    }

    #[test]
    fn multiquadric_equals_radius_at_zero() {
        let k = MultiQuadraticBiharmonicRbfKernel::new(0.5);
        assert!((k.phi(0.0) - 0.5).abs() < TOL);
        assert!((k.phi(1.2) - (1.44f64 + 0.25).sqrt()).abs() < TOL);
    }

    #[test]
    fn inverse_multiquadric_is_finite_at_zero() {
        let k = InvMultiQuadraticBiharmonicRbfKernel::new(0.5);
        assert!((k.phi(0.0) - 2.0).abs() < TOL);
        assert!((k.phi(1.2) - 1.0 / (1.44f64 + 0.25).sqrt()).abs() < TOL);
    }

    #[test]
    fn thin_plate_limit_is_zero() {
        let k = ThinPlateSplineRbfKernel;
        assert_eq!(k.phi(0.0), 0.0);
        assert!(k.phi(1e-300).is_finite());
        assert!(k.phi(1.0).abs() < TOL);
        assert!((k.phi(2.0) - 4.0 * 2.0f64.ln()).abs() < TOL);
    }

    #[test]
    fn polyharmonic_is_distance() {
        let k = PolyharmonicSplineRbfKernel;
        let points = mat![[0.0, 0.0, 0.0], [3.0, 4.0, 0.0f64]];
        assert!((k.evaluate(points.row(0), points.row(1)) - 5.0).abs() < TOL);
    }

    #[test]
    fn row_evaluation_matches_phi() {
        let points = mat![[0.1, 0.2, 0.3], [0.7, -0.4, 1.1f64]];
        let r = crate::get_distance(points.row(0), points.row(1));

        let g = GaussianSplineRbfKernel::new(0.8);
        let mq = MultiQuadraticBiharmonicRbfKernel::new(0.8);
        let imq = InvMultiQuadraticBiharmonicRbfKernel::new(0.8);

        assert!((g.evaluate(points.row(0), points.row(1)) - g.phi(r)).abs() < TOL);
        assert!((mq.evaluate(points.row(0), points.row(1)) - mq.phi(r)).abs() < TOL);
        assert!((imq.evaluate(points.row(0), points.row(1)) - imq.phi(r)).abs() < TOL);
        assert!(
            (ThinPlateSplineRbfKernel.evaluate(points.row(0), points.row(1))
                - ThinPlateSplineRbfKernel.phi(r))
            .abs()
                < TOL
        );
    }
}
