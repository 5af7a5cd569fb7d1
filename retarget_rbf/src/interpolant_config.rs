/////////////////////////////////////////////////////////////////////////////////////////////
//
// Specifies the basis function and shape radius used to configure RBF deformation fields.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Specifies the basis function and shape radius used to configure RBF deformation fields.
use retarget_rbf_utils::{KernelParams, KernelType, DEFAULT_RADIUS};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The radial basis function used to build the deformation field.
///
/// | Basis kind | `phi(r)` |
/// |---|---|
/// | [`GaussianSpline`](BasisKind::GaussianSpline) | `exp(-(r/ε)^2)` |
/// | [`MultiQuadraticBiharmonicSpline`](BasisKind::MultiQuadraticBiharmonicSpline) | `sqrt(r^2 + ε^2)` |
/// | [`InvMultiQuadraticBiharmonicSpline`](BasisKind::InvMultiQuadraticBiharmonicSpline) | `1 / sqrt(r^2 + ε^2)` |
/// | [`ThinPlateSpline`](BasisKind::ThinPlateSpline) | `r^2 ln(r)` |
/// | [`PolyharmonicSpline`](BasisKind::PolyharmonicSpline) | `r` |
///
/// where `ε` is the shape radius. Every kernel is augmented with an affine
/// polynomial term, so all five reproduce affine deformations exactly.
#[derive(Clone, Debug, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum BasisKind {
    GaussianSpline,
    MultiQuadraticBiharmonicSpline,
    InvMultiQuadraticBiharmonicSpline,
    ThinPlateSpline,
    #[default]
    PolyharmonicSpline,
}

impl BasisKind {
    /// All basis kinds.
    pub const ALL: [BasisKind; 5] = [
        BasisKind::GaussianSpline,
        BasisKind::MultiQuadraticBiharmonicSpline,
        BasisKind::InvMultiQuadraticBiharmonicSpline,
        BasisKind::ThinPlateSpline,
        BasisKind::PolyharmonicSpline,
    ];

    /// Whether the shape radius changes the kernel. The thin plate and
    /// polyharmonic splines are scale free.
    pub fn uses_radius(&self) -> bool {
        matches!(
            self,
            BasisKind::GaussianSpline
                | BasisKind::MultiQuadraticBiharmonicSpline
                | BasisKind::InvMultiQuadraticBiharmonicSpline
        )
    }

    /// Identifier used by the host add-on for this basis kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            BasisKind::GaussianSpline => "gaussian_spline",
            BasisKind::MultiQuadraticBiharmonicSpline => "multi_quadratic_biharmonic_spline",
            BasisKind::InvMultiQuadraticBiharmonicSpline => {
                "inv_multi_quadratic_biharmonic_spline"
            }
            BasisKind::ThinPlateSpline => "thin_plate_spline",
            BasisKind::PolyharmonicSpline => "polyharmonic_spline",
        }
    }
}

impl fmt::Display for BasisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`BasisKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBasisKind(pub String);

impl fmt::Display for UnknownBasisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown basis function {:?}", self.0)
    }
}

impl std::error::Error for UnknownBasisKind {}

impl FromStr for BasisKind {
    type Err = UnknownBasisKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BasisKind::ALL
            .iter()
            .find(|kind| kind.as_str() == s.trim())
            .copied()
            .ok_or_else(|| UnknownBasisKind(s.to_string()))
    }
}

impl From<BasisKind> for KernelType {
    fn from(value: BasisKind) -> KernelType {
        match value {
            BasisKind::GaussianSpline => KernelType::GaussianSplineRbf,
            BasisKind::MultiQuadraticBiharmonicSpline => {
                KernelType::MultiQuadraticBiharmonicSplineRbf
            }
            BasisKind::InvMultiQuadraticBiharmonicSpline => {
                KernelType::InvMultiQuadraticBiharmonicSplineRbf
            }
            BasisKind::ThinPlateSpline => KernelType::ThinPlateSplineRbf,
            BasisKind::PolyharmonicSpline => KernelType::PolyharmonicSplineRbf,
        }
    }
}

/// A convenience builder for constructing a [`InterpolantSettings`] instance.
///
/// The builder should be called via the [`InterpolantSettings::builder`] method.
///
/// See [`InterpolantSettings`] for details on each field.
#[derive(Debug, Clone, Copy)]
pub struct InterpolantSettingsBuilder {
    pub basis_kind: BasisKind,
    pub radius: f64,
}

impl InterpolantSettingsBuilder {
    fn new(basis_kind: BasisKind) -> Self {
        Self {
            basis_kind,
            radius: DEFAULT_RADIUS,
        }
    }

    /// Sets the shape radius. Only used by the Gaussian and multiquadric kernels.
    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Builds and returns an instance of [`InterpolantSettings`] from the values
    /// defined in the builder.
    pub fn build(self) -> InterpolantSettings {
        InterpolantSettings {
            basis_kind: self.basis_kind,
            radius: self.radius,
        }
    }
}

/// Kernel configuration of an RBF deformation field.
///
/// The radius is validated when the field is fitted, not here, so that
/// settings can be deserialised and adjusted freely beforehand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InterpolantSettings {
    /// The radial basis function to use for interpolation.
    pub basis_kind: BasisKind,

    /// Shape parameter `ε` of the Gaussian and multiquadric kernels. Smaller
    /// values keep each control point's influence local, larger values give
    /// smoother and broader deformations. Typically chosen relative to the
    /// spacing of the control points. Defaults to `0.5`.
    pub radius: f64,
}

impl InterpolantSettings {
    /// Returns a new [`InterpolantSettingsBuilder`] for the given basis kind.
    pub fn builder(basis_kind: BasisKind) -> InterpolantSettingsBuilder {
        InterpolantSettingsBuilder::new(basis_kind)
    }
}

impl Default for InterpolantSettings {
    fn default() -> Self {
        InterpolantSettings::builder(BasisKind::default()).build()
    }
}

impl From<InterpolantSettings> for KernelParams {
    /// Converts a [`InterpolantSettings`] instance into a
    /// [`retarget_rbf_utils::KernelParams`].
    fn from(v: InterpolantSettings) -> Self {
        KernelParams {
            kernel_type: v.basis_kind.into(),
            radius: v.radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_names_round_trip() {
        for kind in BasisKind::ALL {
            let parsed: BasisKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn unknown_basis_name_is_rejected() {
        let err = "cubic_spline".parse::<BasisKind>().unwrap_err();
        assert_eq!(err, UnknownBasisKind("cubic_spline".to_string()));
    }

    #[test]
    fn defaults_match_host() {
        let settings = InterpolantSettings::default();
        assert_eq!(settings.basis_kind, BasisKind::PolyharmonicSpline);
        assert_eq!(settings.radius, 0.5);
    }

    #[test]
    fn scale_free_kernels_ignore_radius() {
        assert!(!BasisKind::ThinPlateSpline.uses_radius());
        assert!(!BasisKind::PolyharmonicSpline.uses_radius());
        assert!(BasisKind::GaussianSpline.uses_radius());
    }

    #[test]
    fn settings_convert_to_kernel_params() {
        let settings = InterpolantSettings::builder(BasisKind::GaussianSpline)
            .radius(1.25)
            .build();
        let params: KernelParams = settings.into();
        assert_eq!(params.kernel_type, KernelType::GaussianSplineRbf);
        assert_eq!(params.radius, 1.25);
    }
}
