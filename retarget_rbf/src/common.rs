/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines shared helpers for point conversion, random point generation, CSV I/O, and scaling.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    control_points::ControlPointSet,
    error::{RbfError, RbfResult},
};
use csv::{ReaderBuilder, Writer};
use faer::{Mat, MatRef};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use retarget_rbf_utils;
use std::error::Error;
use std::fs::File;

/// Number of coordinates of every control and query point.
pub const DIMENSIONS: usize = 3;

/// Build an `(n x 3)` point matrix from rows of coordinates.
///
/// Every row is checked before any copying happens.
///
/// # Errors
/// [`RbfError::ShapeMismatch`] if any row does not hold exactly three coordinates.
///
/// # Example
/// ```
/// use retarget_rbf::points_from_rows;
///
/// let rows = vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]];
/// let points = points_from_rows(&rows, "query points").unwrap();
/// assert_eq!(points.shape(), (2, 3));
///
/// assert!(points_from_rows(&[vec![0.0, 1.0]], "query points").is_err());
/// ```
pub fn points_from_rows<R: AsRef<[f64]>>(rows: &[R], what: &'static str) -> RbfResult<Mat<f64>> {
    if let Some(bad) = rows.iter().find(|row| row.as_ref().len() != DIMENSIONS) {
        return Err(RbfError::ShapeMismatch {
            what,
            expected: DIMENSIONS,
            found: bad.as_ref().len(),
        });
    }

    Ok(Mat::from_fn(rows.len(), DIMENSIONS, |i, j| rows[i].as_ref()[j]))
}

/// Build an `(n x 3)` point matrix from fixed size coordinate triples.
pub fn points_from_arrays(rows: &[[f64; 3]]) -> Mat<f64> {
    Mat::from_fn(rows.len(), DIMENSIONS, |i, j| rows[i][j])
}

/// Copy an `(n x 3)` point matrix back into coordinate triples.
pub fn points_to_arrays(points: MatRef<f64>) -> Vec<[f64; 3]> {
    points
        .row_iter()
        .map(|row| [row[0], row[1], row[2]])
        .collect()
}

/// Generate a matrix of random points in the unit hypercube.
///
/// # Parameters
/// - `n`: Number of points to generate (rows in the output matrix).
/// - `d`: Number of spatial dimensions per point (columns in the output matrix).
/// - `seed`: Optional random seed.  
///   - If `Some(seed)` is provided, the same sequence of points will be generated
///     deterministically across runs and platforms (useful for reproducible tests).
///   - If `None`, the generator is seeded from the operating system's randomness source.
///
/// # Returns
/// A `Mat<f64>` of shape `(n, d)` where each element lies in `[0.0, 1.0)`.
///
/// # Example
/// ```
/// use retarget_rbf::generate_random_points;
///
/// // Generate 100 reproducible 3D points
/// let pts = generate_random_points(100, 3, Some(42));
/// assert_eq!(pts.ncols(), 3);
/// ```
pub fn generate_random_points(n: usize, d: usize, seed: Option<u64>) -> Mat<f64> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    Mat::from_fn(n, d, |_, _| rng.random_range(0.0..1.0))
}

/// Load paired control points from a CSV file.
///
/// Each record holds six columns: the original point `ox, oy, oz` followed by
/// the deformed point `dx, dy, dz`.
///
/// # Arguments
/// * `file_path` - Path to the CSV file.
/// * `has_headers` - Whether the file has a single header row to skip.
pub fn csv_to_control_points(
    file_path: &str,
    has_headers: bool,
) -> Result<ControlPointSet, Box<dyn Error>> {
    let file = File::open(file_path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(has_headers)
        .from_reader(file);

    let mut original = Vec::new();
    let mut deformed = Vec::new();
    let mut num_rows = 0;

    for result in reader.records() {
        let record = result?;
        if record.len() != 2 * DIMENSIONS {
            return Err(format!(
                "expected {} columns per control point record, found {} on record {}",
                2 * DIMENSIONS,
                record.len(),
                num_rows + 1
            )
            .into());
        }

        for (i, value) in record.iter().enumerate() {
            let parsed_value: f64 = value.trim().parse()?;
            if i < DIMENSIONS {
                original.push(parsed_value);
            } else {
                deformed.push(parsed_value);
            }
        }

        num_rows += 1;
    }

    let original = MatRef::from_row_major_slice(original.as_slice(), num_rows, DIMENSIONS).to_owned();
    let deformed = MatRef::from_row_major_slice(deformed.as_slice(), num_rows, DIMENSIONS).to_owned();

    Ok(ControlPointSet::new(original, deformed)?)
}

/// Write mapped point coordinates to a CSV file with headers `X, Y, Z`.
///
/// # Errors
/// Returns an error if writing to disk fails.
pub fn point_arrays_to_csv(points: &Mat<f64>, filename: &str) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_path(filename)?;

    wtr.write_record(["X", "Y", "Z"])?;

    for row in points.row_iter() {
        let record: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Compute translation and scale factors to map points into the `[-1, 1]` cube.
///
/// The translation is the midpoint of each coordinate range and the scale
/// is half the range, with zeros replaced by `1.0` to avoid division by zero.
///
/// # Returns
/// A tuple `(translation, scale)` where each is a per-dimension factor.
pub fn get_cheb_cube_scaling_factors(point_locations: &Mat<f64>) -> (Vec<f64>, Vec<f64>) {
    let dimensions = point_locations.ncols();
    let extents = retarget_rbf_utils::get_pointarray_extents(point_locations);

    let mut translation_factor: Vec<f64> = Vec::with_capacity(dimensions);
    let mut scale_factor: Vec<f64> = Vec::with_capacity(dimensions);

    (0..dimensions).for_each(|d| {
        let max_coord = extents[d + dimensions];
        let min_coord = extents[d];
        translation_factor.push((max_coord + min_coord) / 2.0);
        scale_factor.push((max_coord - min_coord) / 2.0);
    });

    scale_factor.iter_mut().for_each(|element| {
        if *element == 0.0 {
            *element = 1.0;
        }
    });

    (translation_factor, scale_factor)
}

/// Apply translation and scaling to map points into a normalized cube.
///
/// For each coordinate `x`, applies `(x - translation_factor[d]) / scale_factor[d]`.
pub fn scale_points(points: &mut Mat<f64>, translation_factor: &[f64], scale_factor: &[f64]) {
    points.row_iter_mut().for_each(|row| {
        row.iter_mut().enumerate().for_each(|(col_idx, element)| {
            *element = (*element - translation_factor[col_idx]) / scale_factor[col_idx];
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;
    use std::io::Write;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("retarget_rbf_{}_{}", std::process::id(), name))
    }

    #[test]
    fn scaling_maps_extents_to_unit_cube() {
        let mut points = mat![[0.0, 2.0, 5.0], [4.0, 6.0, 5.0f64]];
        let (t, s) = get_cheb_cube_scaling_factors(&points);
        assert_eq!(t, vec![2.0, 4.0, 5.0]);
        assert_eq!(s, vec![2.0, 2.0, 1.0]);

        scale_points(&mut points, &t, &s);
        assert_eq!(points, mat![[-1.0, -1.0, 0.0], [1.0, 1.0, 0.0f64]]);
    }

    #[test]
    fn rows_round_trip_through_arrays() {
        let rows = [[0.5, 1.5, 2.5], [-1.0, 0.0, 1.0]];
        let points = points_from_arrays(&rows);
        assert_eq!(points_to_arrays(points.as_ref()), rows.to_vec());
    }

    #[test]
    fn ragged_rows_are_rejected_up_front() {
        let rows = vec![vec![0.0, 0.0, 0.0], vec![1.0, 2.0, 3.0, 4.0]];
        let err = points_from_rows(&rows, "query points").unwrap_err();
        assert_eq!(
            err,
            RbfError::ShapeMismatch {
                what: "query points",
                expected: 3,
                found: 4
            }
        );
    }

    #[test]
    fn random_points_are_reproducible() {
        let a = generate_random_points(10, 3, Some(7));
        let b = generate_random_points(10, 3, Some(7));
        assert_eq!(a, b);
        assert!(a.col_iter().all(|c| c.iter().all(|v| (0.0..1.0).contains(v))));
    }

    #[test]
    fn control_points_load_from_csv() {
        let path = temp_path("controls.csv");
        {
            let mut file = File::create(&path).unwrap();
            writeln!(file, "ox,oy,oz,dx,dy,dz").unwrap();
            writeln!(file, "0,0,0,0,0,0").unwrap();
            writeln!(file, "1,0,0,2,0,0").unwrap();
            writeln!(file, "0,1,0,0,2,0").unwrap();
        }

        let controls = csv_to_control_points(path.to_str().unwrap(), true).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(controls.len(), 3);
        assert_eq!(controls.original()[(1, 0)], 1.0);
        assert_eq!(controls.deformed()[(2, 1)], 2.0);
    }

    #[test]
    fn csv_with_wrong_column_count_is_rejected() {
        let path = temp_path("bad_controls.csv");
        {
            let mut file = File::create(&path).unwrap();
            writeln!(file, "0,0,0,0,0").unwrap();
        }

        let result = csv_to_control_points(path.to_str().unwrap(), false);
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
    }

    #[test]
    fn mapped_points_write_to_csv() {
        let path = temp_path("mapped.csv");
        let points = mat![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0f64]];
        point_arrays_to_csv(&points, path.to_str().unwrap()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["X,Y,Z", "1,2,3", "4,5,6"]);
    }
}
