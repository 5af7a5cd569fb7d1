/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides analytic body deformations for validating and demonstrating RBF retargeting.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Smooth deformations `R^3 -> R^3` with known closed forms. Applying one to a
//! point cloud gives a deformed control set, and the same function applied to
//! query points gives the reference answer a fitted field is compared against.
use faer::Mat;

/// Struct that implements analytic deformations used to generate deformed
/// control points for testing RBF retargeting.
pub struct TestDeformations;

impl TestDeformations {
    /// General affine map:
    /// <div>
    /// $$
    /// F(p) = A\,p + t
    /// $$
    /// </div>
    /// Every basis kind reproduces this exactly, since the affine tail is
    /// always part of the fit.
    pub fn affine(points: &Mat<f64>, linear: &[[f64; 3]; 3], translation: &[f64; 3]) -> Mat<f64> {
        assert_eq!(points.ncols(), 3);
        let n = points.nrows();

        Mat::from_fn(n, 3, |i, j| {
            translation[j]
                + linear[j][0] * points[(i, 0)]
                + linear[j][1] * points[(i, 1)]
                + linear[j][2] * points[(i, 2)]
        })
    }

    /// Uniform scale about the origin, the simplest body retarget.
    pub fn uniform_scale(points: &Mat<f64>, factor: f64) -> Mat<f64> {
        assert_eq!(points.ncols(), 3);
        Mat::from_fn(points.nrows(), 3, |i, j| factor * points[(i, j)])
    }

    /// Twist about the `z` axis, rotating each point by an angle proportional
    /// to its height:
    /// <div>
    /// $$
    /// \theta = k z, \quad
    /// F(x,y,z) = (x\cos\theta - y\sin\theta,\; x\sin\theta + y\cos\theta,\; z)
    /// $$
    /// </div>
    pub fn twist(points: &Mat<f64>, radians_per_unit: f64) -> Mat<f64> {
        assert_eq!(points.ncols(), 3);
        let n = points.nrows();

        Mat::from_fn(n, 3, |i, j| {
            let x = points[(i, 0)];
            let y = points[(i, 1)];
            let z = points[(i, 2)];
            let (sin, cos) = (radians_per_unit * z).sin_cos();

            match j {
                0 => x * cos - y * sin,
                1 => x * sin + y * cos,
                _ => z,
            }
        })
    }

    /// Radial bulge, pushing points away from `centre` with a Gaussian falloff:
    /// <div>
    /// $$
    /// F(p) = p + a\,e^{-|p - c|^2}\,(p - c)
    /// $$
    /// </div>
    pub fn bulge(points: &Mat<f64>, centre: &[f64; 3], amount: f64) -> Mat<f64> {
        assert_eq!(points.ncols(), 3);
        let n = points.nrows();

        Mat::from_fn(n, 3, |i, j| {
            let r2: f64 = (0..3).map(|d| (points[(i, d)] - centre[d]).powi(2)).sum();
            points[(i, j)] + amount * (-r2).exp() * (points[(i, j)] - centre[j])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn affine_applies_rows_of_the_linear_part() {
        let points = mat![[1.0, 2.0, 3.0]];
        let linear = [[1.0, 0.0, 0.0], [0.0, 2.0, 0.0], [1.0, 0.0, 1.0]];
        let mapped = TestDeformations::affine(&points, &linear, &[0.5, 0.0, -1.0]);
        assert_eq!(mapped, mat![[1.5, 4.0, 3.0]]);
    }

    #[test]
    fn twist_keeps_the_base_plane_fixed() {
        let points = mat![[1.0, 2.0, 0.0], [-3.0, 0.5, 0.0]];
        assert_eq!(TestDeformations::twist(&points, 0.7), points);
    }

    #[test]
    fn bulge_keeps_the_centre_fixed() {
        let points = mat![[0.2, 0.3, 0.4]];
        let mapped = TestDeformations::bulge(&points, &[0.2, 0.3, 0.4], 0.5);
        assert_eq!(mapped, points);
    }
}
