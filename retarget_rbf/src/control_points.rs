/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the index-paired original/deformed control point sets that drive a fit.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    common::{self, DIMENSIONS},
    error::{RbfError, RbfResult},
};
use faer::Mat;
use serde::{Deserialize, Serialize};

/// Two index-paired point sets: `original[i]` moves to `deformed[i]`.
///
/// Pairs are matched by index, not by proximity. Both sets are `(N x 3)`
/// with `N >= 1`. Duplicate points are allowed, although they make the
/// interpolation system ill-conditioned and push the fit onto the
/// least-squares fallback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawControlPoints")]
pub struct ControlPointSet {
    original: Mat<f64>,
    deformed: Mat<f64>,
}

/// Unchecked form read from disk. Converted through [`ControlPointSet::new`].
#[derive(Deserialize)]
struct RawControlPoints {
    original: Mat<f64>,
    deformed: Mat<f64>,
}

impl TryFrom<RawControlPoints> for ControlPointSet {
    type Error = RbfError;

    fn try_from(raw: RawControlPoints) -> RbfResult<Self> {
        Self::new(raw.original, raw.deformed)
    }
}

impl ControlPointSet {
    /// Creates a validated control point set.
    ///
    /// # Errors
    /// - [`RbfError::ShapeMismatch`] if either matrix is not `(N x 3)`.
    /// - [`RbfError::DegenerateInput`] if the sets are empty, differ in length,
    ///   or hold non-finite coordinates.
    pub fn new(original: Mat<f64>, deformed: Mat<f64>) -> RbfResult<Self> {
        if original.ncols() != DIMENSIONS {
            return Err(RbfError::ShapeMismatch {
                what: "original control points",
                expected: DIMENSIONS,
                found: original.ncols(),
            });
        }
        if deformed.ncols() != DIMENSIONS {
            return Err(RbfError::ShapeMismatch {
                what: "deformed control points",
                expected: DIMENSIONS,
                found: deformed.ncols(),
            });
        }
        if original.nrows() != deformed.nrows() {
            return Err(RbfError::degenerate(format!(
                "{} original points but {} deformed points",
                original.nrows(),
                deformed.nrows()
            )));
        }
        if original.nrows() == 0 {
            return Err(RbfError::degenerate("no control points"));
        }
        if let Some(row) = first_non_finite_row(&original) {
            return Err(RbfError::degenerate(format!(
                "original control point {} is not finite",
                row
            )));
        }
        if let Some(row) = first_non_finite_row(&deformed) {
            return Err(RbfError::degenerate(format!(
                "deformed control point {} is not finite",
                row
            )));
        }

        Ok(Self { original, deformed })
    }

    /// Creates a control point set from coordinate triples.
    pub fn from_arrays(original: &[[f64; 3]], deformed: &[[f64; 3]]) -> RbfResult<Self> {
        Self::new(
            common::points_from_arrays(original),
            common::points_from_arrays(deformed),
        )
    }

    /// Creates a control point set from rows of coordinates, checking that
    /// every row holds three values.
    pub fn from_rows<R: AsRef<[f64]>>(original: &[R], deformed: &[R]) -> RbfResult<Self> {
        Self::new(
            common::points_from_rows(original, "original control points")?,
            common::points_from_rows(deformed, "deformed control points")?,
        )
    }

    /// Keeps every `stride`-th pair, starting with the first.
    ///
    /// Fit cost grows with the cube of the number of pairs, so dense meshes
    /// are usually thinned before fitting. A stride of `1` keeps every pair.
    ///
    /// # Errors
    /// [`RbfError::InvalidProxyLevel`] if `stride == 0`.
    pub fn proxy(&self, stride: usize) -> RbfResult<Self> {
        if stride == 0 {
            return Err(RbfError::InvalidProxyLevel);
        }

        let kept: Vec<usize> = (0..self.len()).step_by(stride).collect();

        Ok(Self {
            original: retarget_rbf_utils::select_mat_rows(&self.original, &kept),
            deformed: retarget_rbf_utils::select_mat_rows(&self.deformed, &kept),
        })
    }

    /// Number of control point pairs.
    pub fn len(&self) -> usize {
        self.original.nrows()
    }

    /// Always `false`; an empty set cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.original.nrows() == 0
    }

    /// The undeformed points, one per row.
    pub fn original(&self) -> &Mat<f64> {
        &self.original
    }

    /// The deformed points, one per row.
    pub fn deformed(&self) -> &Mat<f64> {
        &self.deformed
    }

    /// Splits the set into `(original, deformed)`.
    pub fn into_parts(self) -> (Mat<f64>, Mat<f64>) {
        (self.original, self.deformed)
    }
}

fn first_non_finite_row(points: &Mat<f64>) -> Option<usize> {
    points
        .row_iter()
        .position(|row| row.iter().any(|v| !v.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tetrahedron() -> Vec<[f64; 3]> {
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ]
    }

    #[test]
    fn empty_sets_are_degenerate() {
        let err = ControlPointSet::from_arrays(&[], &[]).unwrap_err();
        assert!(matches!(err, RbfError::DegenerateInput { .. }));
    }

    #[test]
    fn mismatched_lengths_are_degenerate() {
        let original = unit_tetrahedron();
        let err = ControlPointSet::from_arrays(&original, &original[..3]).unwrap_err();
        assert!(matches!(err, RbfError::DegenerateInput { .. }));
    }

    #[test]
    fn wrong_dimension_is_a_shape_mismatch() {
        let err = ControlPointSet::new(Mat::zeros(4, 2), Mat::zeros(4, 3)).unwrap_err();
        assert_eq!(
            err,
            RbfError::ShapeMismatch {
                what: "original control points",
                expected: 3,
                found: 2
            }
        );

        let rows = vec![vec![0.0, 0.0, 0.0], vec![1.0, 1.0]];
        let err = ControlPointSet::from_rows(&rows, &rows).unwrap_err();
        assert!(matches!(err, RbfError::ShapeMismatch { found: 2, .. }));
    }

    #[test]
    fn non_finite_coordinates_are_degenerate() {
        let original = unit_tetrahedron();
        let mut deformed = unit_tetrahedron();
        deformed[2][1] = f64::NAN;
        let err = ControlPointSet::from_arrays(&original, &deformed).unwrap_err();
        assert!(matches!(err, RbfError::DegenerateInput { .. }));
    }

    #[test]
    fn proxy_keeps_every_nth_pair() {
        let original: Vec<[f64; 3]> = (0..10).map(|i| [i as f64, 0.0, 0.0]).collect();
        let deformed: Vec<[f64; 3]> = (0..10).map(|i| [i as f64, 1.0, 0.0]).collect();
        let controls = ControlPointSet::from_arrays(&original, &deformed).unwrap();

        let thinned = controls.proxy(3).unwrap();
        assert_eq!(thinned.len(), 4);
        let kept: Vec<f64> = thinned.original().col(0).iter().copied().collect();
        assert_eq!(kept, vec![0.0, 3.0, 6.0, 9.0]);
        assert_eq!(thinned.deformed()[(3, 1)], 1.0);

        assert_eq!(controls.proxy(1).unwrap(), controls);
        assert_eq!(controls.proxy(100).unwrap().len(), 1);
        assert_eq!(controls.proxy(0).unwrap_err(), RbfError::InvalidProxyLevel);
    }

    #[test]
    fn deserialising_checks_the_pairing() {
        let tetrahedron = unit_tetrahedron();
        let set = ControlPointSet::from_arrays(&tetrahedron, &tetrahedron).unwrap();
        let shorter = ControlPointSet::from_arrays(&tetrahedron[..3], &tetrahedron[..3]).unwrap();

        let json = serde_json::to_value(&set).unwrap();
        let read: ControlPointSet = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(read, set);

        let mut unpaired = json;
        unpaired["deformed"] = serde_json::to_value(shorter.deformed()).unwrap();
        let result = serde_json::from_value::<ControlPointSet>(unpaired);
        assert!(result.is_err());
    }
}
