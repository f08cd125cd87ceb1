use crate::error::{Error, Result};
use crate::rotations::{axis_angle_matrix, check_rotation, orthonormality_error, Axis};
use crate::transforms::{Cylindrical, Spherical};
use crate::{EulerConvention, Matrix3, Vector3};
use log::debug;
use std::fmt::{self, Display, Formatter};
use std::num::NonZeroUsize;
use uom::si::f64::Angle;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A right-handed Cartesian frame that can be moved and reoriented.
///
/// A frame has an origin and three orthonormal axes, both expressed in a fixed reference frame.
/// The axes are stored as the rows of [`Frame::basis`], so for a point `p` in the reference
/// frame, `basis * (p - origin)` is the same point in the frame's local coordinates.
///
/// Rotations are applied about axes fixed in the reference frame: rotating by `R` moves every
/// axis `e` of the frame to `R e`. The origin never moves when the frame is rotated.
///
/// Repeatedly composing rotations accumulates floating-point error, which slowly takes the basis
/// away from being orthonormal. [`Frame::orthonormalize`] corrects this, and
/// [`Components::orthonormalize_every`] can be used to do so automatically.
///
/// ```
/// use approx::assert_relative_eq;
/// use coordframe::{Frame, Vector3};
/// use uom::si::{angle::degree, f64::Angle};
///
/// let mut frame = Frame::new();
/// frame.set_origin(Vector3::new(1., 0., 0.));
/// frame.rotate_axis_angle(&Vector3::z(), Angle::new::<degree>(90.));
///
/// let local = frame.to_local(&Vector3::new(1., 1., 0.));
/// assert_relative_eq!(local, Vector3::new(1., 0., 0.), epsilon = 1e-12);
/// assert_relative_eq!(frame.to_global(&local), Vector3::new(1., 1., 0.), epsilon = 1e-12);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "Components", into = "Components")
)]
pub struct Frame {
    origin: Vector3,
    basis: Matrix3,
    convention: EulerConvention,
    orthonormalize_every: Option<NonZeroUsize>,
    rotations_since_orthonormalization: usize,
}

/// Argument type for [`Frame::build`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
#[must_use]
pub struct Components {
    /// Where the frame's origin is in the reference frame.
    pub origin: Vector3,

    /// The frame's axes, one per row, in the reference frame.
    ///
    /// Must be orthonormal (to within `1e-9`) and right-handed.
    pub basis: Matrix3,

    /// How [`Frame::euler_angles`] and friends interpret angle triples.
    pub convention: EulerConvention,

    /// If set, the basis is re-orthonormalized after every this many rotations.
    pub orthonormalize_every: Option<NonZeroUsize>,
}

impl Default for Components {
    fn default() -> Self {
        Self {
            origin: Vector3::zeros(),
            basis: Matrix3::identity(),
            convention: EulerConvention::default(),
            orthonormalize_every: None,
        }
    }
}

impl Frame {
    /// Constructs a frame at the reference origin, aligned with the reference axes, using the
    /// [`Bunge`](EulerConvention::Bunge) convention.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Vector3::zeros(),
            basis: Matrix3::identity(),
            convention: EulerConvention::default(),
            orthonormalize_every: None,
            rotations_since_orthonormalization: 0,
        }
    }

    /// Constructs a frame from its parts.
    ///
    /// Returns [`Error::InvalidBasis`] if `basis` is not orthonormal, and [`Error::InvalidValue`]
    /// if it is left-handed.
    pub fn build(
        Components {
            origin,
            basis,
            convention,
            orthonormalize_every,
        }: Components,
    ) -> Result<Self> {
        check_rotation(&basis)?;
        Ok(Self {
            origin,
            basis,
            convention,
            orthonormalize_every,
            rotations_since_orthonormalization: 0,
        })
    }

    /// Constructs a frame at the reference origin whose orientation is given by Euler angles.
    ///
    /// See [`Frame::set_euler_angles`].
    #[must_use]
    pub fn from_euler_angles(
        convention: EulerConvention,
        a: impl Into<Angle>,
        b: impl Into<Angle>,
        c: impl Into<Angle>,
    ) -> Self {
        let mut frame = Self::new();
        frame.convention = convention;
        frame.set_euler_angles(a, b, c);
        frame
    }

    #[must_use]
    pub fn origin(&self) -> Vector3 {
        self.origin
    }

    /// Returns the frame's axes, one per row, in the reference frame.
    #[must_use]
    pub fn basis(&self) -> Matrix3 {
        self.basis
    }

    /// Returns one of the frame's axes in the reference frame.
    #[must_use]
    pub fn axis(&self, axis: Axis) -> Vector3 {
        self.basis.row(axis.index()).transpose()
    }

    #[must_use]
    pub fn convention(&self) -> EulerConvention {
        self.convention
    }

    #[must_use]
    pub fn orthonormalize_every(&self) -> Option<NonZeroUsize> {
        self.orthonormalize_every
    }

    /// Returns how far the basis is from orthonormal, as `‖B Bᵀ - I‖_F`.
    #[must_use]
    pub fn orthonormality_error(&self) -> f64 {
        orthonormality_error(&self.basis)
    }

    /// Moves the origin by `offset`. The axes are unaffected.
    pub fn translate(&mut self, offset: &Vector3) {
        self.origin += offset;
    }

    pub fn set_origin(&mut self, origin: Vector3) {
        self.origin = origin;
    }

    /// Changes how Euler angles are read and written. The basis is unaffected.
    pub fn set_convention(&mut self, convention: EulerConvention) {
        self.convention = convention;
    }

    /// Sets how many rotations may be applied before the basis is re-orthonormalized
    /// automatically, or disables automatic correction with `None`.
    pub fn set_orthonormalize_every(&mut self, every: Option<NonZeroUsize>) {
        self.orthonormalize_every = every;
    }

    /// Rotates the frame by `angle` about `axis`, which is fixed in the reference frame.
    ///
    /// `axis` does not need to be normalized. A zero axis leaves the frame unchanged.
    pub fn rotate_axis_angle(&mut self, axis: &Vector3, angle: impl Into<Angle>) {
        self.apply(&axis_angle_matrix(axis, angle));
    }

    /// Rotates the frame by an arbitrary rotation matrix acting on reference-frame vectors.
    ///
    /// Returns an error, and leaves the frame unchanged, if `rotation` is not orthonormal
    /// ([`Error::InvalidBasis`]) or is a reflection ([`Error::InvalidValue`]).
    pub fn rotate(&mut self, rotation: &Matrix3) -> Result<()> {
        check_rotation(rotation)?;
        self.apply(rotation);
        Ok(())
    }

    /// Rotates the frame by the rotation that the Euler angles `(a, b, c)` describe in the frame's
    /// convention.
    ///
    /// On a frame aligned with the reference axes this is the same as
    /// [`Frame::set_euler_angles`].
    pub fn rotate_euler_angles(
        &mut self,
        a: impl Into<Angle>,
        b: impl Into<Angle>,
        c: impl Into<Angle>,
    ) {
        let rotation = self.convention.rotation_matrix(a, b, c);
        self.apply(&rotation);
    }

    /// Returns the Euler angles of the frame's orientation in its convention.
    ///
    /// See [`EulerConvention`] for the ranges of the returned angles, and
    /// [`EulerConvention::angles`] for what happens at gimbal lock.
    #[must_use]
    pub fn euler_angles(&self) -> (Angle, Angle, Angle) {
        self.convention.angles(&self.basis.transpose())
    }

    /// Replaces the frame's orientation with the one given by Euler angles in its convention.
    ///
    /// The new basis is exactly the composition of three elemental rotations, so this also
    /// discards any accumulated drift.
    pub fn set_euler_angles(
        &mut self,
        a: impl Into<Angle>,
        b: impl Into<Angle>,
        c: impl Into<Angle>,
    ) {
        self.basis = self.convention.rotation_matrix(a, b, c).transpose();
        self.rotations_since_orthonormalization = 0;
    }

    /// Makes the basis orthonormal again using Gram-Schmidt.
    ///
    /// The X axis keeps its direction, the Y axis is made orthogonal to it within their common
    /// plane, and the Z axis is recomputed as X × Y.
    pub fn orthonormalize(&mut self) {
        let deviation = self.orthonormality_error();
        let x = self.axis(Axis::X).normalize();
        let y = self.axis(Axis::Y);
        let y = (y - x * x.dot(&y)).normalize();
        let z = x.cross(&y);
        self.basis = Matrix3::from_rows(&[x.transpose(), y.transpose(), z.transpose()]);
        self.rotations_since_orthonormalization = 0;
        debug!("re-orthonormalized frame basis (deviation was {deviation:e})");
    }

    fn apply(&mut self, rotation: &Matrix3) {
        self.basis *= rotation.transpose();
        self.rotations_since_orthonormalization += 1;
        if let Some(every) = self.orthonormalize_every {
            if self.rotations_since_orthonormalization >= every.get() {
                self.orthonormalize();
            }
        }
    }

    /// Expresses a point given in the reference frame in this frame's local coordinates.
    #[must_use]
    pub fn to_local(&self, point: &Vector3) -> Vector3 {
        self.basis * (point - self.origin)
    }

    /// Expresses a point given in this frame's local coordinates in the reference frame.
    #[must_use]
    pub fn to_global(&self, point: &Vector3) -> Vector3 {
        self.basis.transpose() * point + self.origin
    }

    /// Expresses a direction given in the reference frame in this frame's local spherical
    /// components.
    ///
    /// Directions are not affected by the origin.
    #[must_use]
    pub fn direction_to_spherical(&self, direction: &Vector3) -> Spherical {
        Spherical::from_cartesian(&(self.basis * direction))
    }

    /// Expresses a direction given in the reference frame in this frame's local cylindrical
    /// components.
    #[must_use]
    pub fn direction_to_cylindrical(&self, direction: &Vector3) -> Cylindrical {
        Cylindrical::from_cartesian(&(self.basis * direction))
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

// the drift counter is bookkeeping, not part of the frame's value
impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin
            && self.basis == other.basis
            && self.convention == other.convention
            && self.orthonormalize_every == other.orthonormalize_every
    }
}

impl TryFrom<Components> for Frame {
    type Error = Error;

    fn try_from(value: Components) -> Result<Self> {
        Self::build(value)
    }
}

impl From<Frame> for Components {
    fn from(value: Frame) -> Self {
        Self {
            origin: value.origin,
            basis: value.basis,
            convention: value.convention,
            orthonormalize_every: value.orthonormalize_every,
        }
    }
}

fn fmt_vector(f: &mut Formatter<'_>, v: &Vector3) -> fmt::Result {
    write!(f, "({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

impl Display for Frame {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("origin = ")?;
        fmt_vector(f, &self.origin)?;
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            write!(f, ", {} = ", axis)?;
            fmt_vector(f, &self.axis(axis))?;
        }
        write!(f, ", {}", self.convention)
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for Frame {
    type Epsilon = <f64 as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.convention == other.convention
            && self.origin.abs_diff_eq(&other.origin, epsilon)
            && self.basis.abs_diff_eq(&other.basis, epsilon)
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for Frame {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.convention == other.convention
            && self.origin.relative_eq(&other.origin, epsilon, max_relative)
            && self.basis.relative_eq(&other.basis, epsilon, max_relative)
    }
}
