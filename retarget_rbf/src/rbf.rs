/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the fitted RBF deformation field, coefficient management, and evaluation logic.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    common::{self, DIMENSIONS},
    config::Params,
    control_points::ControlPointSet,
    error::{RbfError, RbfResult},
    interpolant_config::{BasisKind, InterpolantSettings},
    linalg::{self, SolveReport},
    polynomials,
    progress::{self, ProgressMsg, ProgressSink},
};

use faer::{concat, linalg::matmul, Accum, Mat, MatRef, Par};
use rayon::prelude::*;
use retarget_rbf_utils::{self, KernelParams};
use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Instant,
};

/// Coefficients of a solved RBF system.
///
/// The field is fitted to the displacements `deformed - original`, so these
/// coefficients describe `f(q) - q`. See [`FittedModel::affine_coefficients`]
/// for the affine part of the full map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coefficients {
    /// Kernel weights `W`, one row per control point, one column per axis.
    pub point_coefficients: Mat<f64>,

    /// Coefficients of the retained affine monomials, in the normalised basis.
    pub poly_coefficients: Mat<f64>,
}

impl Coefficients {
    pub(crate) fn new(point_coefficients: Mat<f64>, poly_coefficients: Mat<f64>) -> Self {
        Self {
            point_coefficients,
            poly_coefficients,
        }
    }
}

/// Builder for [`FittedModel`].
///
/// This builder provides an ergonomic way to configure and fit a model from
/// control points, kernel settings, and optional solver parameters.
///
/// The builder should be called via the [`FittedModel::builder`] method.
pub struct FittedModelBuilder {
    control_points: ControlPointSet,
    interpolant_settings: InterpolantSettings,
    params: Params,
    progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl FittedModelBuilder {
    fn new(control_points: ControlPointSet, interpolant_settings: InterpolantSettings) -> Self {
        Self {
            control_points,
            interpolant_settings,
            params: Params::default(),
            progress_callback: None,
        }
    }

    /// Sets custom solver and evaluation parameters.
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Optional callback for reporting fit and evaluation progress.
    ///
    /// Skipped during serialization.
    pub fn progress_callback(mut self, progress_callback: Arc<dyn ProgressSink>) -> Self {
        self.progress_callback = Some(progress_callback);
        self
    }

    /// Solves the augmented system and returns the fitted model.
    ///
    /// # Errors
    /// - [`RbfError::InvalidRadius`] for a radius-dependent kernel with a
    ///   non-positive or non-finite radius.
    /// - [`RbfError::InvalidChunkSize`] if `params.eval_chunk_size == 0`.
    /// - [`RbfError::SingularSystem`] if the system cannot be solved.
    pub fn fit(self) -> RbfResult<FittedModel> {
        FittedModel::new(
            self.control_points,
            self.interpolant_settings,
            self.params,
            self.progress_callback,
        )
    }
}

/// A smooth deformation field `R^3 -> R^3` fitted to paired control points.
///
/// The field maps every `original` control point onto its `deformed`
/// partner and interpolates smoothly in between:
///
/// `f(q) = q + sum_i W_i phi(|q - o_i|) + c_0 + c_x x + c_y y + c_z z`
///
/// The model is immutable once fitted. Evaluation takes `&self`, so a model
/// can be shared between threads and queried concurrently.
#[derive(Serialize, Deserialize, Debug)]
pub struct FittedModel {
    /// The control points the field was fitted to. The originals are the
    /// kernel centres.
    control_points: ControlPointSet,

    /// Solved kernel and affine coefficients.
    coefficients: Coefficients,

    /// Kernel settings used to fit the field.
    interpolant_settings: InterpolantSettings,

    /// Per-dimension translation factor (used for scaling/normalization for the monomial matrix).
    translation_factor: Vec<f64>,

    /// Per-dimension scaling factor (used for scaling/normalization for the monomial matrix).
    scale_factor: Vec<f64>,

    /// Affine monomial columns kept after removing those that are dependent
    /// on the control points. Always starts with the constant column.
    unisolvent_columns: Vec<usize>,

    /// How the augmented system was solved.
    solve_report: SolveReport,

    /// Solver and evaluation parameters.
    params: Params,

    /// Optional callback for reporting progress.
    /// Skipped during serialization.
    #[serde(skip, default)]
    pub(crate) progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl FittedModel {
    /// Creates a new [`FittedModelBuilder`] for the given control points and
    /// kernel settings.
    ///
    /// This is the way to fit a model with non-default parameters or a
    /// progress callback. [`fit`] covers the common case.
    pub fn builder(
        control_points: ControlPointSet,
        interpolant_settings: InterpolantSettings,
    ) -> FittedModelBuilder {
        FittedModelBuilder::new(control_points, interpolant_settings)
    }

    fn new(
        control_points: ControlPointSet,
        interpolant_settings: InterpolantSettings,
        params: Params,
        progress_callback: Option<Arc<dyn ProgressSink>>,
    ) -> RbfResult<Self> {
        let solver_start = Instant::now();

        validate_radius(&interpolant_settings)?;

        if params.eval_chunk_size == 0 {
            return Err(RbfError::InvalidChunkSize);
        }

        let points = control_points.original();
        let num_points = points.nrows();

        let (translation_factor, scale_factor) = common::get_cheb_cube_scaling_factors(points);

        let monomials =
            polynomials::evaluate_monomials(points.as_ref(), &translation_factor, &scale_factor);

        let unisolvent_columns =
            polynomials::select_unisolvent_columns(&monomials, params.polynomial_rank_tolerance);

        if unisolvent_columns.len() < polynomials::AFFINE_BASIS_SIZE {
            if let Some(sink) = &progress_callback {
                sink.emit(ProgressMsg::PolynomialReduced {
                    rank: unisolvent_columns.len(),
                });
            }
        }

        let poly_matrix = polynomials::select_columns(&monomials, &unisolvent_columns);
        let num_poly = poly_matrix.ncols();

        let kernel_params: KernelParams = interpolant_settings.into();
        let a_matrix = retarget_rbf_utils::get_a_matrix_symmetric(points.as_ref(), &kernel_params);

        let poly_t = poly_matrix.transpose().to_owned();
        let lhs_zeros = Mat::<f64>::zeros(num_poly, num_poly);

        let lhs = concat![[a_matrix, poly_matrix], [poly_t, lhs_zeros]];

        let displacements = control_points.deformed() - points;
        let rhs = concat![[displacements], [Mat::<f64>::zeros(num_poly, DIMENSIONS)]];

        let (all_coefficients, solve_report) =
            linalg::solve_augmented_system(&lhs, &rhs, &params, progress_callback.as_ref())?;

        let (point_coefficients, poly_coefficients) = all_coefficients.split_at_row(num_points);

        let model = Self {
            coefficients: Coefficients::new(
                point_coefficients.to_owned(),
                poly_coefficients.to_owned(),
            ),
            control_points,
            interpolant_settings,
            translation_factor,
            scale_factor,
            unisolvent_columns,
            solve_report,
            params,
            progress_callback,
        };

        let solver_duration = solver_start.elapsed();

        if let Some(sink) = &model.progress_callback {
            let msg = format!(
                "Took {:?} to fit RBF for {} control points using the following settings:\n\
                Basis: {}, Radius: {}\n\
                Solver: {:?}, Rank: {}, Relative residual: {:e}",
                solver_duration,
                num_points,
                model.interpolant_settings.basis_kind,
                model.interpolant_settings.radius,
                model.solve_report.method,
                model.solve_report.rank,
                model.solve_report.relative_residual,
            );

            sink.emit(ProgressMsg::Message { message: msg });
        }

        Ok(model)
    }

    /// Maps every row of `query_points` through the field.
    ///
    /// Points are processed in blocks of `params.eval_chunk_size` rows,
    /// which bounds the intermediate `(chunk x control points)` kernel matrix.
    /// Blocks run on the rayon pool when `params.parallel_evaluation` is set.
    ///
    /// ### Returns
    /// A `(n_queries x 3)` matrix, row `i` holding the image of query row `i`.
    ///
    /// ### Errors
    /// [`RbfError::ShapeMismatch`] if `query_points` does not have three
    /// columns. Nothing is evaluated in that case.
    ///
    /// ### Example
    /// ```
    /// # use retarget_rbf::{fit, BasisKind};
    /// # use faer::mat;
    /// let original = mat![[0.0, 0.0, 0.0]];
    /// let deformed = mat![[5.0, 5.0, 5.0]];
    /// let model = fit(&original, &deformed, BasisKind::ThinPlateSpline, 0.5)?;
    ///
    /// let mapped = model.evaluate(&mat![[1.0, 2.0, 3.0]])?;
    /// assert!((mapped[(0, 0)] - 6.0).abs() < 1e-12);
    /// # Ok::<(), retarget_rbf::RbfError>(())
    /// ```
    pub fn evaluate(&self, query_points: &Mat<f64>) -> RbfResult<Mat<f64>> {
        check_query_shape(query_points)?;

        Ok(self.evaluate_in_chunks(query_points.as_ref(), self.params.eval_chunk_size))
    }

    /// Like [`FittedModel::evaluate`], with an explicit block size.
    ///
    /// The result does not depend on `chunk_size` beyond floating-point
    /// rounding.
    ///
    /// ### Errors
    /// - [`RbfError::InvalidChunkSize`] if `chunk_size == 0`.
    /// - [`RbfError::ShapeMismatch`] if `query_points` does not have three columns.
    pub fn evaluate_chunked(
        &self,
        query_points: &Mat<f64>,
        chunk_size: usize,
    ) -> RbfResult<Mat<f64>> {
        if chunk_size == 0 {
            return Err(RbfError::InvalidChunkSize);
        }
        check_query_shape(query_points)?;

        Ok(self.evaluate_in_chunks(query_points.as_ref(), chunk_size))
    }

    /// Maps coordinate triples through the field.
    pub fn map_points(&self, points: &[[f64; 3]]) -> Vec<[f64; 3]> {
        let query_points = common::points_from_arrays(points);
        let mapped = self.evaluate_in_chunks(query_points.as_ref(), self.params.eval_chunk_size);
        common::points_to_arrays(mapped.as_ref())
    }

    /// Evaluate the field **at the original control points**.
    ///
    /// Useful for diagnostics: the result should reproduce the deformed
    /// control points to within solver accuracy, unless the least-squares
    /// fallback had to reconcile conflicting duplicates.
    pub fn evaluate_at_source(&self) -> Mat<f64> {
        self.evaluate_in_chunks(
            self.control_points.original().as_ref(),
            self.params.eval_chunk_size,
        )
    }

    fn evaluate_in_chunks(&self, query_points: MatRef<f64>, chunk_size: usize) -> Mat<f64> {
        let chunk_size = chunk_size.max(1);
        let num_queries = query_points.nrows();
        let mut mapped = Mat::<f64>::zeros(num_queries, DIMENSIONS);

        if num_queries == 0 {
            return mapped;
        }

        let chunk_starts: Vec<usize> = (0..num_queries).step_by(chunk_size).collect();
        let num_chunks = chunk_starts.len();
        let completed = AtomicUsize::new(0);

        let evaluate_chunk = |start: &usize| {
            let rows = chunk_size.min(num_queries - start);
            let block = self.evaluate_block(query_points.subrows(*start, rows));

            let chunk = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(sink) = &self.progress_callback {
                sink.emit(ProgressMsg::EvaluationProgress {
                    chunk,
                    num_chunks,
                    progress: progress::progress_from_chunks(chunk, num_chunks),
                });
            }

            block
        };

        let blocks: Vec<Mat<f64>> = match self.params.parallel_evaluation {
            true => chunk_starts.par_iter().map(evaluate_chunk).collect(),
            false => chunk_starts.iter().map(evaluate_chunk).collect(),
        };

        chunk_starts
            .iter()
            .zip(blocks.iter())
            .for_each(|(&start, block)| {
                mapped
                    .subrows_mut(start, block.nrows())
                    .copy_from(block.as_ref());
            });

        mapped
    }

    fn evaluate_block(&self, query_points: MatRef<f64>) -> Mat<f64> {
        let kernel_params: KernelParams = self.interpolant_settings.into();
        let centres = self.control_points.original();

        let a_matrix = retarget_rbf_utils::get_a_matrix(query_points, centres.as_ref(), &kernel_params);

        let monomials = polynomials::evaluate_monomials(
            query_points,
            &self.translation_factor,
            &self.scale_factor,
        );
        let poly_matrix = polynomials::select_columns(&monomials, &self.unisolvent_columns);

        // Identity plus displacement.
        let mut values = query_points.to_owned();

        matmul::matmul(
            values.as_mut(),
            Accum::Add,
            a_matrix.as_ref(),
            self.coefficients.point_coefficients.as_ref(),
            1.0,
            Par::Seq,
        );
        matmul::matmul(
            values.as_mut(),
            Accum::Add,
            poly_matrix.as_ref(),
            self.coefficients.poly_coefficients.as_ref(),
            1.0,
            Par::Seq,
        );

        values
    }

    /// The affine part of the map in the raw `[1, x, y, z]` basis, as a
    /// `(4 x 3)` matrix: row 0 is the constant term, rows 1..4 multiply
    /// `x`, `y` and `z`. Columns are the output axes.
    ///
    /// Monomials dropped for rank-deficient control points contribute only
    /// the identity part of their row.
    pub fn affine_coefficients(&self) -> Mat<f64> {
        let mut raw = polynomials::raw_affine_coefficients(
            &self.coefficients.poly_coefficients,
            &self.unisolvent_columns,
            &self.translation_factor,
            &self.scale_factor,
        );

        (0..DIMENSIONS).for_each(|axis| raw[(axis + 1, axis)] += 1.0);

        raw
    }

    /// The kernel weights `W`, one row per control point.
    pub fn weights(&self) -> &Mat<f64> {
        &self.coefficients.point_coefficients
    }

    pub fn control_points(&self) -> &ControlPointSet {
        &self.control_points
    }

    pub fn interpolant_settings(&self) -> &InterpolantSettings {
        &self.interpolant_settings
    }

    pub fn basis_kind(&self) -> BasisKind {
        self.interpolant_settings.basis_kind
    }

    pub fn radius(&self) -> f64 {
        self.interpolant_settings.radius
    }

    pub fn solve_report(&self) -> &SolveReport {
        &self.solve_report
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Solved kernel weights and affine coefficients, in the normalised
    /// monomial frame.
    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    /// Indices into `[1, x, y, z]` of the monomials kept in the fit.
    pub fn unisolvent_columns(&self) -> &[usize] {
        &self.unisolvent_columns
    }

    /// Checks the relations between fields that fitting guarantees but a
    /// model read from disk may not satisfy.
    fn check_consistency(&self) -> Result<(), String> {
        let num_points = self.control_points.len();
        let columns = &self.unisolvent_columns;

        let columns_valid = columns.first() == Some(&0)
            && columns.windows(2).all(|pair| pair[0] < pair[1])
            && columns.iter().all(|&col| col < polynomials::AFFINE_BASIS_SIZE);
        if !columns_valid {
            return Err(format!(
                "unisolvent columns {:?} are not increasing indices into [1, x, y, z] starting at 0",
                columns
            ));
        }

        if self.translation_factor.len() != DIMENSIONS || self.scale_factor.len() != DIMENSIONS {
            return Err(format!(
                "expected {} translation and scale factors, found {} and {}",
                DIMENSIONS,
                self.translation_factor.len(),
                self.scale_factor.len()
            ));
        }
        let factors_valid = self.translation_factor.iter().all(|t| t.is_finite())
            && self.scale_factor.iter().all(|s| s.is_finite() && *s != 0.0);
        if !factors_valid {
            return Err("normalisation factors must be finite with non-zero scale".to_string());
        }

        let weights = &self.coefficients.point_coefficients;
        if weights.nrows() != num_points || weights.ncols() != DIMENSIONS {
            return Err(format!(
                "weights are ({} x {}) but there are {} control points",
                weights.nrows(),
                weights.ncols(),
                num_points
            ));
        }

        let poly = &self.coefficients.poly_coefficients;
        if poly.nrows() != columns.len() || poly.ncols() != DIMENSIONS {
            return Err(format!(
                "affine coefficients are ({} x {}) but {} monomial columns are kept",
                poly.nrows(),
                poly.ncols(),
                columns.len()
            ));
        }

        if !linalg::all_finite(weights.as_ref()) || !linalg::all_finite(poly.as_ref()) {
            return Err("coefficients are not finite".to_string());
        }

        if self.params.eval_chunk_size == 0 {
            return Err(RbfError::InvalidChunkSize.to_string());
        }

        validate_radius(&self.interpolant_settings).map_err(|e| e.to_string())
    }

    /// Save the model as a versioned **JSON envelope** to `path`.
    ///
    /// The on-disk format is versioned via `JSON_FORMAT_NAME` and `JSON_VERSION`.
    /// Files produced here are intended to be read back with [`FittedModel::load_model`].
    /// The progress callback is not saved.
    ///
    /// ### Errors
    /// - Returns `ModelIOError::{Create, Serialize, Flush}` on I/O or serialization
    ///   failures.
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> ModelIOResult<()> {
        let path_ref = path.as_ref();
        let file = File::create(path_ref).map_err(|e| ModelIOError::Create {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        let mut w = BufWriter::new(file);

        let env = JsonEnvelopeRef {
            format: JSON_FORMAT_NAME,
            version: JSON_VERSION,
            model: self,
        };

        serde_json::to_writer_pretty(&mut w, &env).map_err(|e| ModelIOError::Serialize {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        w.flush().map_err(|e| ModelIOError::Flush {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }

    /// Load a model from a versioned **JSON envelope**, validating format & version.
    ///
    /// If `progress` is `Some`, the sink is installed on the returned model so
    /// that later evaluations can report progress.
    ///
    /// ### Errors
    /// - Returns `ModelIOError::{Open, Parse, FormatMismatch, VersionMismatch}` as appropriate.
    /// - Returns `ModelIOError::Invalid` when the fields parse but do not
    ///   describe a consistent model, e.g. weights that do not match the
    ///   control points.
    ///
    /// ### Example
    /// ```no_run
    /// # use retarget_rbf::{FittedModel, progress::{closure_sink, ProgressMsg}};
    /// let (sink, _listener) = closure_sink(256, |msg: ProgressMsg| { /* handle */ });
    /// let model = FittedModel::load_model("body_retarget.json", Some(sink))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load_model<P: AsRef<Path>>(
        path: P,
        progress: Option<Arc<dyn ProgressSink>>,
    ) -> ModelIOResult<Self> {
        let path_ref = path.as_ref();

        let file = File::open(path_ref).map_err(|e| ModelIOError::Open {
            path: path_ref.to_path_buf(),
            source: e,
        })?;
        let reader = BufReader::new(file);

        let env: JsonEnvelopeOwned<Self> =
            serde_json::from_reader(reader).map_err(|e| ModelIOError::Parse {
                path: path_ref.to_path_buf(),
                source: e,
            })?;

        if env.format != JSON_FORMAT_NAME {
            return Err(ModelIOError::FormatMismatch {
                path: path_ref.to_path_buf(),
                found: env.format,
                expected: JSON_FORMAT_NAME,
            });
        }

        if env.version != JSON_VERSION {
            return Err(ModelIOError::VersionMismatch {
                path: path_ref.to_path_buf(),
                found: env.version,
                expected: JSON_VERSION,
            });
        }

        let mut model = env.model;
        model
            .check_consistency()
            .map_err(|reason| ModelIOError::Invalid {
                path: path_ref.to_path_buf(),
                reason,
            })?;

        model.progress_callback = progress;
        Ok(model)
    }
}

/// Fits a deformation field mapping each row of `original` onto the same row
/// of `deformed`, with default [`Params`].
///
/// # Errors
/// - [`RbfError::DegenerateInput`] for empty, unequal-length or non-finite
///   control points.
/// - [`RbfError::ShapeMismatch`] if either matrix is not `(N x 3)`.
/// - [`RbfError::InvalidRadius`] for a radius-dependent kernel with a
///   non-positive or non-finite radius.
/// - [`RbfError::SingularSystem`] if the system cannot be solved.
pub fn fit(
    original: &Mat<f64>,
    deformed: &Mat<f64>,
    basis_kind: BasisKind,
    radius: f64,
) -> RbfResult<FittedModel> {
    let control_points = ControlPointSet::new(original.clone(), deformed.clone())?;
    let interpolant_settings = InterpolantSettings::builder(basis_kind).radius(radius).build();

    FittedModel::builder(control_points, interpolant_settings).fit()
}

/// Maps every row of `query_points` through `model`. See [`FittedModel::evaluate`].
pub fn evaluate(model: &FittedModel, query_points: &Mat<f64>) -> RbfResult<Mat<f64>> {
    model.evaluate(query_points)
}

fn validate_radius(interpolant_settings: &InterpolantSettings) -> RbfResult<()> {
    let radius = interpolant_settings.radius;
    let valid = radius > 0.0 && radius.is_finite();

    match interpolant_settings.basis_kind.uses_radius() && !valid {
        true => Err(RbfError::InvalidRadius {
            basis_kind: interpolant_settings.basis_kind,
            radius,
        }),
        false => Ok(()),
    }
}

fn check_query_shape(query_points: &Mat<f64>) -> RbfResult<()> {
    match query_points.ncols() == DIMENSIONS {
        true => Ok(()),
        false => Err(RbfError::ShapeMismatch {
            what: "query points",
            expected: DIMENSIONS,
            found: query_points.ncols(),
        }),
    }
}

const JSON_FORMAT_NAME: &str = "retarget_rbf.json";
const JSON_VERSION: u32 = 1;

/// Borrowing envelope for SAVE (no clone of the model).
#[derive(Serialize)]
struct JsonEnvelopeRef<'a, T: ?Sized> {
    format: &'static str,
    version: u32,
    #[serde(flatten)]
    model: &'a T,
}

/// Owning envelope for LOAD (generic over the concrete model).
#[derive(Deserialize)]
struct JsonEnvelopeOwned<T> {
    format: String,
    version: u32,
    #[serde(flatten)]
    model: T,
}

type ModelIOResult<T> = std::result::Result<T, ModelIOError>;

/// Errors that can occur when saving or loading a [`FittedModel`].
///
/// This is the error type returned by [`FittedModel::save_model`] and
/// [`FittedModel::load_model`], wrapping lower-level I/O and JSON
/// serialization issues as well as format/version validation failures.
#[derive(Debug)]
pub enum ModelIOError {
    /// Failed to create the target file before writing a model.
    Create { path: PathBuf, source: io::Error },
    /// Failed to open an existing model file for reading.
    Open { path: PathBuf, source: io::Error },
    /// Failed to flush buffered output when finishing a write.
    Flush { path: PathBuf, source: io::Error },
    /// Error serializing the in-memory model to JSON.
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Error parsing JSON when reading a model from disk.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// The JSON `format` field does not match the expected model format.
    FormatMismatch {
        path: PathBuf,
        found: String,
        expected: &'static str,
    },
    /// The JSON `version` field does not match the supported version.
    VersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
    /// The file parsed, but its fields are inconsistent with each other.
    Invalid { path: PathBuf, reason: String },
}

impl fmt::Display for ModelIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelIOError::Create { path, source } => {
                write!(f, "creating {}: {}", path.display(), source)
            }
            ModelIOError::Open { path, source } => {
                write!(f, "opening {}: {}", path.display(), source)
            }
            ModelIOError::Flush { path, source } => {
                write!(f, "flushing {}: {}", path.display(), source)
            }
            ModelIOError::Serialize { path, source } => {
                write!(f, "serializing JSON to {}: {}", path.display(), source)
            }
            ModelIOError::Parse { path, source } => {
                write!(f, "parsing JSON in {}: {}", path.display(), source)
            }
            ModelIOError::FormatMismatch {
                path,
                found,
                expected,
            } => write!(
                f,
                "unsupported format {:?} (expected {:?}) in {}",
                found,
                expected,
                path.display()
            ),
            ModelIOError::VersionMismatch {
                path,
                found,
                expected,
            } => write!(
                f,
                "unsupported version {} (expected {}) in {}",
                found,
                expected,
                path.display()
            ),
            ModelIOError::Invalid { path, reason } => {
                write!(f, "invalid model in {}: {}", path.display(), reason)
            }
        }
    }
}

impl Error for ModelIOError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ModelIOError::Create { source, .. }
            | ModelIOError::Open { source, .. }
            | ModelIOError::Flush { source, .. } => Some(source),
            ModelIOError::Serialize { source, .. } | ModelIOError::Parse { source, .. } => {
                Some(source)
            }
            ModelIOError::FormatMismatch { .. }
            | ModelIOError::VersionMismatch { .. }
            | ModelIOError::Invalid { .. } => None,
        }
    }
}
