/////////////////////////////////////////////////////////////////////////////////////////////
//
// Supplies general-purpose utilities for matrices, distances, and dense kernel matrices.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{KernelFromParams, KernelFunction, KernelParams};
use faer::{Mat, MatRef, RowRef};
use serde::{Deserialize, Serialize};

/// Returns an owned `Mat<T>` from a subset of row indices.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use retarget_rbf_utils::select_mat_rows;
///
/// let matrix = mat![
///     [0.0, 1.0],
///     [1.0, 1.0],
///     [2.0, 2.0],
///     [3.0, 3.0f64],
/// ];
///
/// let wanted_rows = vec![0usize, 2];
///
/// let sub_matrix = select_mat_rows(&matrix, &wanted_rows);
///
/// assert_eq!(
///     sub_matrix,
///     mat![
///         [0.0, 1.0],
///         [2.0, 2.0f64],    
///     ]
/// );
/// ```
#[inline(always)]
pub fn select_mat_rows<T>(existing_mat: &Mat<T>, row_indices: &[usize]) -> Mat<T>
where
    T: Clone,
{
    Mat::from_fn(row_indices.len(), existing_mat.ncols(), |i, j| {
        existing_mat.get(row_indices[i], j).clone()
    })
}

/// Computes the axis aligned bounding box (AABB) extents of a matrix of points.
///
/// Returns a flat vector containing the minimum and maximum values along each column (dimension)
/// of the input matrix. The result is arranged as:
///
/// `[min_0, min_1, ..., min_n, max_0, max_1, ..., max_n]`
///
/// where `n` is the number of columns in the matrix.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use retarget_rbf_utils::get_pointarray_extents;
///
/// let points = mat![
///     [1.0, 2.0, 0.0],
///     [3.0, -1.0, 0.0],
///     [0.5, 4.0, 1.0f64]
/// ];
/// let extents = get_pointarray_extents(&points);
/// assert_eq!(extents, vec![0.5, -1.0, 0.0, 3.0, 4.0, 1.0]);
/// ```
#[inline(always)]
pub fn get_pointarray_extents<T>(points: &Mat<T>) -> Vec<T>
where
    T: PartialOrd + Clone,
{
    let ncols = points.shape().1;

    // The first half of the vector stores mins, the second half stores maxs.
    let mut extents: Vec<T> = vec![points.get(0, 0).clone(); 2 * ncols];

    for col in 0..ncols {
        extents[col] = points.get(0, col).clone();
        extents[col + ncols] = points.get(0, col).clone();
    }

    for row in points.row_iter() {
        for (col, item) in row.iter().enumerate() {
            if item < &extents[col] {
                extents[col] = item.clone();
            }
            if item > &extents[col + ncols] {
                extents[col + ncols] = item.clone();
            }
        }
    }

    extents
}

/// Calculates the euclidean distance between two points.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use retarget_rbf_utils::get_distance;
///
/// let points = mat![
///     [1.0, 2.0, 3.0],
///     [4.0, 6.0, 3.0],
/// ];
///
/// let dist = get_distance(points.row(0), points.row(1));
///
/// assert_eq!(dist, 5.0);
/// ```
#[inline(always)]
pub fn get_distance(target: RowRef<f64>, source: RowRef<f64>) -> f64 {
    crate::kernels::get_distance_sq(target, source).sqrt()
}

/// Builds a dense `(targets x sources)` kernel matrix using a typed kernel function.
#[inline(always)]
pub fn get_a_matrix_typed<K>(
    target_points: MatRef<f64>,
    source_points: MatRef<f64>,
    kernel_function: &K,
) -> Mat<f64>
where
    K: KernelFunction,
{
    let m = target_points.nrows();
    let n = source_points.nrows();

    let mut a_matrix = Mat::<f64>::zeros(m, n);

    for j in 0..n {
        let source = source_points.row(j);

        for i in 0..m {
            let target = target_points.row(i);

            a_matrix[(i, j)] = kernel_function.evaluate(target, source);
        }
    }

    a_matrix
}

/// Builds a symmetric `(points x points)` kernel matrix using a typed kernel
/// function, evaluating only the lower triangle.
#[inline(always)]
pub fn get_a_matrix_symmetric_typed<K>(points: MatRef<f64>, kernel_function: &K) -> Mat<f64>
where
    K: KernelFunction,
{
    let n = points.nrows();

    let mut a_matrix = Mat::<f64>::zeros(n, n);

    for j in 0..n {
        let source_row = points.row(j);

        for i in j..n {
            let target_row = points.row(i);
            let k_val = kernel_function.evaluate(target_row, source_row);

            a_matrix[(i, j)] = k_val;
            a_matrix[(j, i)] = k_val;
        }
    }

    a_matrix
}

// K-free dispatcher generated from the kernel registry below.
// Assumes each kernel type implements `KernelFromParams::from_params(&KernelParams) -> K`
// and exposes an inherent `phi(r)`.
macro_rules! for_each_kernel {
    ( registry = [ $( ($V:ident, $Kty:path) ),* $(,)? ] ) => {

        /// Runtime kernel selector built from the kernel registry
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
        pub enum KernelType {
            $( $V, )*
        }

        impl KernelType {
            /// All registered kernels, in registry order.
            pub const ALL: &'static [KernelType] = &[ $( KernelType::$V, )* ];
        }

        /// Builds a dense `(targets x sources)` kernel matrix for the selected [`KernelType`].
        #[inline(always)]
        pub fn get_a_matrix(
            target_points: MatRef<f64>,
            source_points: MatRef<f64>,
            params: &crate::KernelParams,
        ) -> Mat<f64> {
            match params.kernel_type {
                $(
                    KernelType::$V => {
                        // Convert uniform params -> concrete kernel type
                        let k = <$Kty as KernelFromParams>::from_params(params);
                        get_a_matrix_typed(target_points, source_points, &k)
                    }
                ),*
            }
        }

        /// Builds the symmetric kernel (Gram) matrix of a point set for the
        /// selected [`KernelType`].
        #[inline(always)]
        pub fn get_a_matrix_symmetric(
            points: MatRef<f64>,
            params: &crate::KernelParams,
        ) -> Mat<f64> {
            match params.kernel_type {
                $(
                    KernelType::$V => {
                        let k = <$Kty as KernelFromParams>::from_params(params);
                        get_a_matrix_symmetric_typed(points, &k)
                    }
                ),*
            }
        }

        /// Evaluates the selected kernel function at distance `r`.
        #[inline(always)]
        pub fn kernel_phi(
            r: f64,
            params: &KernelParams,
        ) -> f64 {
            match params.kernel_type {
                $(
                    KernelType::$V => {
                        let k = <$Kty as KernelFromParams>::from_params(params);
                        k.phi(r)
                    }
                ), *
            }
        }
    };
}

for_each_kernel! {
    registry = [
        (GaussianSplineRbf,                  crate::kernels::GaussianSplineRbfKernel),
        (MultiQuadraticBiharmonicSplineRbf,  crate::kernels::MultiQuadraticBiharmonicRbfKernel),
        (InvMultiQuadraticBiharmonicSplineRbf, crate::kernels::InvMultiQuadraticBiharmonicRbfKernel),
        (ThinPlateSplineRbf,                 crate::kernels::ThinPlateSplineRbfKernel),
        (PolyharmonicSplineRbf,              crate::kernels::PolyharmonicSplineRbfKernel),
    ]
}

impl KernelType {
    /// Whether the shape radius enters the kernel. The thin plate and
    /// polyharmonic splines are scale free.
    pub fn uses_radius(&self) -> bool {
        matches!(
            self,
            KernelType::GaussianSplineRbf
                | KernelType::MultiQuadraticBiharmonicSplineRbf
                | KernelType::InvMultiQuadraticBiharmonicSplineRbf
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    fn params(kernel_type: KernelType) -> KernelParams {
        KernelParams::builder(kernel_type).radius(0.75).build()
    }

    #[test]
    fn symmetric_matrix_matches_rectangular() {
        let points = mat![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 2.0, 0.5],
            [0.3, -0.2, 1.0f64],
        ];

        for &kernel_type in KernelType::ALL {
            let p = params(kernel_type);
            let sym = get_a_matrix_symmetric(points.as_ref(), &p);
            let full = get_a_matrix(points.as_ref(), points.as_ref(), &p);

            for i in 0..points.nrows() {
                for j in 0..points.nrows() {
                    assert!((sym[(i, j)] - full[(i, j)]).abs() < 1e-14);
                    assert!((sym[(i, j)] - sym[(j, i)]).abs() < 1e-14);
                }
            }
        }
    }

    #[test]
    fn kernel_phi_dispatches_to_registry() {
        for &kernel_type in KernelType::ALL {
            let p = params(kernel_type);
            let points = mat![[0.0, 0.0, 0.0], [0.6, 0.8, 0.0f64]];
            let a = get_a_matrix(points.subrows(0, 1), points.subrows(1, 1), &p);
            assert!((a[(0, 0)] - kernel_phi(1.0, &p)).abs() < 1e-14);
        }
    }

    #[test]
    fn diagonal_is_kernel_at_zero() {
        let points = mat![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0f64]];
        for &kernel_type in KernelType::ALL {
            let p = params(kernel_type);
            let a = get_a_matrix_symmetric(points.as_ref(), &p);
            assert!(a[(0, 0)].is_finite());
            assert!((a[(1, 1)] - kernel_phi(0.0, &p)).abs() < 1e-14);
        }
    }

    #[test]
    fn rectangular_shape() {
        let targets = Mat::<f64>::zeros(5, 3);
        let sources = Mat::<f64>::zeros(2, 3);
        let p = params(KernelType::PolyharmonicSplineRbf);
        let a = get_a_matrix(targets.as_ref(), sources.as_ref(), &p);
        assert_eq!(a.shape(), (5, 2));
    }
}
