//! Rotation matrices from axis-angle and Euler-angle descriptions.
//!
//! All matrices here act on column vectors expressed in the fixed reference frame: the columns of
//! a rotation matrix are the images of the reference axes. [`crate::Frame`] stores the transpose
//! of such a matrix as its basis (one axis per row).

use crate::angles::BoundedAngle;
use crate::error::{Error, Result};
use crate::vectors::unit_vector3;
use crate::{Matrix3, Vector3};
use log::debug;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use uom::si::angle::radian;
use uom::si::f64::Angle;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest `‖M Mᵀ - I‖_F` accepted for a matrix that claims to be a rotation.
pub(crate) const ORTHONORMALITY_TOLERANCE: f64 = 1e-9;

/// Below this, the sine of a proper Euler middle angle (or the cosine of Tait-Bryan pitch) is
/// treated as zero and the first and third angles are no longer independent.
const GIMBAL_LOCK_THRESHOLD: f64 = 1e-12;

/// One of the three Cartesian axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Returns the unit vector along this axis.
    #[must_use]
    pub fn unit(self) -> Vector3 {
        match self {
            Self::X => Vector3::x(),
            Self::Y => Vector3::y(),
            Self::Z => Vector3::z(),
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

impl Display for Axis {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("X"),
            Self::Y => f.write_str("Y"),
            Self::Z => f.write_str("Z"),
        }
    }
}

/// Returns the matrix that rotates vectors by `angle` about `axis` (right-hand rule).
///
/// `axis` does not need to be normalized. This is [Rodrigues' rotation formula][rod]:
///
/// ```text
/// R = cos(θ) I + sin(θ) [k]× + (1 - cos(θ)) k kᵀ
/// ```
///
/// where `k` is the unit axis and `[k]×` its cross-product matrix.
///
/// A zero axis describes no direction to rotate about, and yields the identity.
///
/// ```
/// use approx::assert_relative_eq;
/// use coordframe::{axis_angle_matrix, Vector3};
/// use uom::si::{angle::degree, f64::Angle};
///
/// let quarter = axis_angle_matrix(&Vector3::new(0., 0., 2.), Angle::new::<degree>(90.));
/// assert_relative_eq!(quarter * Vector3::x(), Vector3::y(), epsilon = 1e-15);
/// ```
///
/// [rod]: https://en.wikipedia.org/wiki/Rodrigues%27_rotation_formula
#[must_use]
pub fn axis_angle_matrix(axis: &Vector3, angle: impl Into<Angle>) -> Matrix3 {
    let k = unit_vector3(axis);
    if k == Vector3::zeros() {
        debug!("rotation about the zero axis is the identity");
        return Matrix3::identity();
    }
    let (sin, cos) = angle.into().get::<radian>().sin_cos();
    Matrix3::identity() * cos + k.cross_matrix() * sin + (k * k.transpose()) * (1. - cos)
}

/// Returns `‖M Mᵀ - I‖_F`, which is zero exactly when `matrix` is orthonormal.
pub(crate) fn orthonormality_error(matrix: &Matrix3) -> f64 {
    (matrix * matrix.transpose() - Matrix3::identity()).norm()
}

/// Checks that `matrix` is a proper rotation: orthonormal and right-handed.
pub(crate) fn check_rotation(matrix: &Matrix3) -> Result<()> {
    let deviation = orthonormality_error(matrix);
    // written so that NaN is rejected too
    if !(deviation <= ORTHONORMALITY_TOLERANCE) {
        return Err(Error::InvalidBasis { deviation });
    }
    let determinant = matrix.determinant();
    if determinant <= 0. {
        return Err(Error::InvalidValue {
            quantity: "determinant",
            range: "(0, ∞)",
            value: determinant,
        });
    }
    Ok(())
}

/// How a triple of Euler angles composes into a rotation.
///
/// Intrinsic conventions rotate about the axes of the frame as it is being rotated (so the second
/// rotation is about an already-rotated axis). Extrinsic conventions rotate about the fixed axes
/// of the reference frame. An extrinsic sequence is the same as the intrinsic sequence with the
/// order of the axes and the angles reversed.
///
/// For the proper Euler conventions (those repeating an axis) the middle angle is in [0, π]; for
/// the Tait-Bryan conventions it is in [-π/2, π/2]. The first and third angles are reported in
/// [0, 2π).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EulerConvention {
    /// Intrinsic Z-X′-Z″, (φ₁, Φ, φ₂), the usual convention in texture analysis.
    #[default]
    Bunge,
    /// Intrinsic Z-Y′-Z″, (α, β, γ), also known as the Roe convention.
    Matthies,
    /// Intrinsic Z-Y′-X″, (yaw, pitch, roll).
    TaitBryan,
    /// Extrinsic Z-X-Z about the reference axes.
    ExtrinsicZxz,
    /// Extrinsic Z-Y-Z about the reference axes.
    ExtrinsicZyz,
    /// Extrinsic X-Y-Z about the reference axes, (roll, pitch, yaw).
    ExtrinsicXyz,
}

/// An intrinsic axis sequence with its angles in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sequence {
    Zxz,
    Zyz,
    Zyx,
}

impl Sequence {
    fn axes(self) -> [Axis; 3] {
        match self {
            Self::Zxz => [Axis::Z, Axis::X, Axis::Z],
            Self::Zyz => [Axis::Z, Axis::Y, Axis::Z],
            Self::Zyx => [Axis::Z, Axis::Y, Axis::X],
        }
    }

    fn compose(self, [a, b, c]: [f64; 3]) -> Matrix3 {
        let [first, second, third] = self.axes();
        elemental(first, a) * elemental(second, b) * elemental(third, c)
    }

    /// Recovers the angles from the entries of `m`, assuming `m` was produced by
    /// [`Sequence::compose`].
    fn decompose(self, m: &Matrix3) -> [f64; 3] {
        let (first, second, third) = match self {
            Self::Zxz | Self::Zyz => {
                let sin_second = m[(2, 0)].hypot(m[(2, 1)]);
                let second = sin_second.atan2(m[(2, 2)]);
                if sin_second < GIMBAL_LOCK_THRESHOLD {
                    debug!(
                        "{:?} Euler angles are gimbal locked (sin = {sin_second:e})",
                        self
                    );
                    // only the first and third axes coincide, so all of the rotation about them
                    // is attributed to the first angle
                    let first = if self == Self::Zxz {
                        m[(1, 0)].atan2(m[(0, 0)])
                    } else {
                        (-m[(0, 1)]).atan2(m[(1, 1)])
                    };
                    (first, second, 0.)
                } else if self == Self::Zxz {
                    (
                        m[(0, 2)].atan2(-m[(1, 2)]),
                        second,
                        m[(2, 0)].atan2(m[(2, 1)]),
                    )
                } else {
                    (
                        m[(1, 2)].atan2(m[(0, 2)]),
                        second,
                        m[(2, 1)].atan2(-m[(2, 0)]),
                    )
                }
            }
            Self::Zyx => {
                let cos_pitch = m[(0, 0)].hypot(m[(1, 0)]);
                let pitch = (-m[(2, 0)]).atan2(cos_pitch);
                if cos_pitch < GIMBAL_LOCK_THRESHOLD {
                    debug!("Tait-Bryan angles are gimbal locked (cos = {cos_pitch:e})");
                    ((-m[(0, 1)]).atan2(m[(1, 1)]), pitch, 0.)
                } else {
                    (
                        m[(1, 0)].atan2(m[(0, 0)]),
                        pitch,
                        m[(2, 1)].atan2(m[(2, 2)]),
                    )
                }
            }
        };
        [
            BoundedAngle::from_radians(first).get(),
            second,
            BoundedAngle::from_radians(third).get(),
        ]
    }
}

fn elemental(axis: Axis, radians: f64) -> Matrix3 {
    axis_angle_matrix(&axis.unit(), Angle::new::<radian>(radians))
}

impl EulerConvention {
    /// All supported conventions.
    pub const ALL: [Self; 6] = [
        Self::Bunge,
        Self::Matthies,
        Self::TaitBryan,
        Self::ExtrinsicZxz,
        Self::ExtrinsicZyz,
        Self::ExtrinsicXyz,
    ];

    /// Returns the axes rotated about, in the order the angles are given.
    ///
    /// For intrinsic conventions the second and third axes are the rotated ones.
    #[must_use]
    pub fn axes(self) -> [Axis; 3] {
        let [first, second, third] = self.sequence().axes();
        if self.is_intrinsic() {
            [first, second, third]
        } else {
            [third, second, first]
        }
    }

    #[must_use]
    pub fn is_intrinsic(self) -> bool {
        matches!(self, Self::Bunge | Self::Matthies | Self::TaitBryan)
    }

    fn sequence(self) -> Sequence {
        match self {
            Self::Bunge | Self::ExtrinsicZxz => Sequence::Zxz,
            Self::Matthies | Self::ExtrinsicZyz => Sequence::Zyz,
            Self::TaitBryan | Self::ExtrinsicXyz => Sequence::Zyx,
        }
    }

    /// Returns the rotation matrix described by the angles `(a, b, c)` in this convention.
    ///
    /// Each angle contributes one Rodrigues rotation about its axis. For intrinsic axes
    /// `(a₁, a₂, a₃)` the result is `R_a₁(a) R_a₂(b) R_a₃(c)`; for extrinsic axes it is
    /// `R_a₃(c) R_a₂(b) R_a₁(a)`.
    #[must_use]
    pub fn rotation_matrix(
        self,
        a: impl Into<Angle>,
        b: impl Into<Angle>,
        c: impl Into<Angle>,
    ) -> Matrix3 {
        let a = a.into().get::<radian>();
        let b = b.into().get::<radian>();
        let c = c.into().get::<radian>();
        if self.is_intrinsic() {
            self.sequence().compose([a, b, c])
        } else {
            self.sequence().compose([c, b, a])
        }
    }

    /// Returns the angles `(a, b, c)` that [`EulerConvention::rotation_matrix`] turns into
    /// `rotation`.
    ///
    /// When the middle angle makes the first and third axes coincide (gimbal lock), the angle
    /// applied last is set to zero and the combined rotation is reported in the other one. For
    /// intrinsic conventions that is `c`, for extrinsic ones `a`.
    ///
    /// `rotation` is assumed to be a proper rotation; see [`crate::Frame::rotate`] for a
    /// checked entry point.
    #[must_use]
    pub fn angles(self, rotation: &Matrix3) -> (Angle, Angle, Angle) {
        let [a, b, c] = self.sequence().decompose(rotation);
        let [a, b, c] = if self.is_intrinsic() {
            [a, b, c]
        } else {
            [c, b, a]
        };
        (
            Angle::new::<radian>(a),
            Angle::new::<radian>(b),
            Angle::new::<radian>(c),
        )
    }
}

impl Display for EulerConvention {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bunge => "Bunge",
            Self::Matthies => "Matthies",
            Self::TaitBryan => "Tait-Bryan",
            Self::ExtrinsicZxz => "Extrinsic-ZXZ",
            Self::ExtrinsicZyz => "Extrinsic-ZYZ",
            Self::ExtrinsicXyz => "Extrinsic-XYZ",
        })
    }
}

impl FromStr for EulerConvention {
    type Err = Error;

    /// Parses a convention name, ignoring case and treating `_` and spaces like `-`.
    ///
    /// Besides the names produced by `Display`, the bare intrinsic axis sequences (`zxz`, `zyz`,
    /// `zyx`) and the aliases `roe` and `yaw-pitch-roll` are accepted.
    fn from_str(s: &str) -> Result<Self> {
        let name: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '_' | ' ' => '-',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        match name.as_str() {
            "bunge" | "zxz" => Ok(Self::Bunge),
            "matthies" | "roe" | "zyz" => Ok(Self::Matthies),
            "tait-bryan" | "taitbryan" | "yaw-pitch-roll" | "zyx" => Ok(Self::TaitBryan),
            "extrinsic-zxz" => Ok(Self::ExtrinsicZxz),
            "extrinsic-zyz" => Ok(Self::ExtrinsicZyz),
            "extrinsic-xyz" => Ok(Self::ExtrinsicXyz),
            _ => Err(Error::UnknownConvention(s.to_owned())),
        }
    }
}
