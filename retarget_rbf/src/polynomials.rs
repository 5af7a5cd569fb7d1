/////////////////////////////////////////////////////////////////////////////////////////////
//
// Evaluates the affine monomial basis used to augment the RBF system.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::common;
use faer::{Mat, MatRef};

/// Number of affine monomials `[1, x, y, z]` in three dimensions.
pub const AFFINE_BASIS_SIZE: usize = 4;

/// Evaluates the affine monomials `[1, x, y, z]` at `points`, after mapping
/// the points through the given normalisation.
pub fn evaluate_monomials(
    points: MatRef<f64>,
    translation_factor: &[f64],
    scale_factor: &[f64],
) -> Mat<f64> {
    // Scale the points to the [-1, 1]^d hypercube for monomial evaluation.
    let mut scaled_points = points.to_owned();

    common::scale_points(&mut scaled_points, translation_factor, scale_factor);

    let (n, d) = scaled_points.shape();

    // Basis order: [1, x, y, z]
    Mat::from_fn(n, 1 + d, |i, j| match j {
        0 => 1.0,
        _ => scaled_points[(i, j - 1)],
    })
}

/// Returns the subset of monomial columns that is linearly independent on
/// the given point set, always starting with the constant column.
///
/// Control points that do not span three dimensions (fewer than four points,
/// or all points on a plane or line) make some linear columns dependent,
/// which would leave the augmented system singular. The linear columns are
/// centred so they are measured against the constant, then a column pivoted
/// QR picks the independent ones.
pub fn select_unisolvent_columns(monomials: &Mat<f64>, tol: f64) -> Vec<usize> {
    let (n, basis_size) = monomials.shape();
    let num_linear = basis_size - 1;

    let linear = monomials.subcols(1, num_linear);
    let means: Vec<f64> = linear.col_iter().map(|col| col.sum() / n as f64).collect();
    let centred = Mat::from_fn(n, num_linear, |i, j| linear[(i, j)] - means[j]);

    let qrc = centred.col_piv_qr();
    let rc = qrc.thin_R();
    let (piv_fwd, _) = qrc.P().arrays();

    // Scaled coordinates are O(1), so an absolute floor keeps an all zero
    // block from counting noise as rank.
    let r00 = match rc.nrows() > 0 {
        true => rc.get(0, 0).abs(),
        false => 0.0,
    };
    let thresh = tol * r00.max(1.0);

    let rank = rc
        .diagonal()
        .column_vector()
        .iter()
        .filter(|val| val.abs() > thresh)
        .count();

    let mut columns: Vec<usize> = piv_fwd[..rank].iter().map(|c| c + 1).collect();
    columns.sort();

    let mut unisolvent_columns = Vec::with_capacity(rank + 1);
    unisolvent_columns.push(0);
    unisolvent_columns.extend(columns);
    unisolvent_columns
}

/// Copies the listed columns of `monomials` into a new matrix.
pub fn select_columns(monomials: &Mat<f64>, columns: &[usize]) -> Mat<f64> {
    Mat::from_fn(monomials.nrows(), columns.len(), |i, j| monomials[(i, columns[j])])
}

/// Re-expresses coefficients of the normalised, reduced basis in the raw
/// `[1, x, y, z]` basis. Dropped columns get zero coefficients.
pub fn raw_affine_coefficients(
    poly_coefficients: &Mat<f64>,
    columns: &[usize],
    translation_factor: &[f64],
    scale_factor: &[f64],
) -> Mat<f64> {
    let num_rhs = poly_coefficients.ncols();
    let mut raw = Mat::<f64>::zeros(AFFINE_BASIS_SIZE, num_rhs);

    for (row, &column) in columns.iter().enumerate() {
        for rhs in 0..num_rhs {
            let coefficient = poly_coefficients[(row, rhs)];
            match column {
                0 => raw[(0, rhs)] += coefficient,
                d => {
                    let axis = d - 1;
                    raw[(d, rhs)] += coefficient / scale_factor[axis];
                    raw[(0, rhs)] -= coefficient * translation_factor[axis] / scale_factor[axis];
                }
            }
        }
    }

    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use faer::{mat, utils::approx::*};

    #[test]
    fn monomials_linear_3d() {
        let points = mat![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        // Basis: [1, x, y, z]
        let expected = mat![[1.0, 1.0, 2.0, 3.0], [1.0, 4.0, 5.0, 6.0]];
        let monomials = evaluate_monomials(points.as_ref(), &[0.0; 3], &[1.0; 3]);

        let approx_eq = CwiseMat(ApproxEq::eps() * 128.0);
        assert!(&monomials ~ &expected);
    }

    #[test]
    fn monomials_are_normalised() {
        let points = mat![[0.0, 0.0, 0.0], [2.0, 4.0, 6.0]];
        let (t, s) = common::get_cheb_cube_scaling_factors(&points);
        let monomials = evaluate_monomials(points.as_ref(), &t, &s);
        let expected = mat![[1.0, -1.0, -1.0, -1.0], [1.0, 1.0, 1.0, 1.0]];

        let approx_eq = CwiseMat(ApproxEq::eps() * 128.0);
        assert!(&monomials ~ &expected);
    }

    #[test]
    fn full_rank_points_keep_every_column() {
        let points = mat![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let (t, s) = common::get_cheb_cube_scaling_factors(&points);
        let monomials = evaluate_monomials(points.as_ref(), &t, &s);
        assert_eq!(select_unisolvent_columns(&monomials, 1e-10), vec![0, 1, 2, 3]);
    }

    #[test]
    fn single_point_keeps_only_the_constant() {
        let points = mat![[1.0, 2.0, 3.0]];
        let (t, s) = common::get_cheb_cube_scaling_factors(&points);
        let monomials = evaluate_monomials(points.as_ref(), &t, &s);
        assert_eq!(select_unisolvent_columns(&monomials, 1e-10), vec![0]);
    }

    #[test]
    fn coplanar_points_drop_one_column() {
        let points = mat![
            [0.0, 0.0, 2.0],
            [1.0, 0.0, 2.0],
            [0.0, 1.0, 2.0],
            [1.0, 1.0, 2.0],
            [0.5, 0.3, 2.0],
        ];
        let (t, s) = common::get_cheb_cube_scaling_factors(&points);
        let monomials = evaluate_monomials(points.as_ref(), &t, &s);
        assert_eq!(select_unisolvent_columns(&monomials, 1e-10), vec![0, 1, 2]);
    }

    #[test]
    fn tilted_collinear_points_keep_two_columns() {
        let points = mat![
            [0.0, 0.0, 0.0],
            [1.0, 1.0, 1.0],
            [2.0, 2.0, 2.0],
            [3.0, 3.0, 3.0],
        ];
        let (t, s) = common::get_cheb_cube_scaling_factors(&points);
        let monomials = evaluate_monomials(points.as_ref(), &t, &s);
        let columns = select_unisolvent_columns(&monomials, 1e-10);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0], 0);
    }

    #[test]
    fn raw_coefficients_undo_the_normalisation() {
        // In normalised coordinates f = 1 + 2 s_x, with s_x = (x - 3) / 2,
        // so f = -2 + x.
        let poly = mat![[1.0], [2.0]];
        let raw = raw_affine_coefficients(&poly, &[0, 1], &[3.0, 0.0, 0.0], &[2.0, 1.0, 1.0]);
        let expected = mat![[-2.0], [1.0], [0.0], [0.0]];

        let approx_eq = CwiseMat(ApproxEq::eps() * 128.0);
        assert!(&raw ~ &expected);
    }
}
