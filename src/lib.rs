//! This library converts 3D points between Cartesian, spherical, and cylindrical representations,
//! and tracks a rotating Cartesian [`Frame`] whose orientation can be read and written as
//! axis-angle rotations or as Euler angles in several [conventions](EulerConvention).
//!
//! There are three layers:
//!
//! - angle and vector primitives ([`reduce_angle`], [`reduce_angles`], [`unit_vector`],
//!   [`angles_between_vectors`]) that work on plain radians and [`ndarray`] arrays;
//! - the [`transforms`] between point representations, each available for a single point and for
//!   an N×3 batch of points, plus the typed [`Spherical`] and [`Cylindrical`] values;
//! - the [`Frame`], an origin with three orthonormal axes that can be translated, rotated about
//!   fixed axes, and periodically re-orthonormalized so that long sequences of small rotations do
//!   not drift away from a proper rotation.
//!
//! Point components are plain `f64`s in whatever length unit the caller uses. Angles are
//! [`uom`] [`Angle`](uom::si::f64::Angle)s in the typed API, and radians everywhere else.
//!
//! # Examples
//!
//! Converting points:
//!
//! ```
//! use coordframe::{cartesian_to_spherical_batch, spherical_to_cartesian};
//! use ndarray::array;
//! use std::f64::consts::FRAC_PI_2;
//!
//! let points = array![[1., 0., 0.], [0., 1., 0.], [0., 0., 0.]];
//! let spherical = cartesian_to_spherical_batch(&points)?;
//! assert_eq!(spherical, array![[1., FRAC_PI_2, 0.], [1., FRAC_PI_2, FRAC_PI_2], [0., 0., 0.]]);
//!
//! // a negative radius does not describe a point
//! assert!(spherical_to_cartesian(&[-1., 0., 0.]).is_err());
//! # Ok::<(), coordframe::Error>(())
//! ```
//!
//! Tracking the orientation of a rotating frame:
//!
//! ```
//! use approx::assert_relative_eq;
//! use coordframe::{Axis, EulerConvention, Frame, Vector3};
//! use uom::si::{angle::degree, f64::Angle};
//!
//! let mut frame = Frame::new();
//! assert_eq!(frame.convention(), EulerConvention::Bunge);
//!
//! // a third of a turn about the diagonal cycles the axes
//! frame.rotate_axis_angle(&Vector3::new(1., 1., 1.), Angle::new::<degree>(120.));
//! assert_relative_eq!(frame.axis(Axis::X), Vector3::y(), epsilon = 1e-12);
//! assert_relative_eq!(frame.axis(Axis::Y), Vector3::z(), epsilon = 1e-12);
//!
//! // the same orientation as yaw, pitch, and roll
//! frame.set_convention(EulerConvention::TaitBryan);
//! let (yaw, pitch, roll) = frame.euler_angles();
//! assert_relative_eq!(yaw.get::<degree>(), 90., epsilon = 1e-9);
//! assert_relative_eq!(pitch.get::<degree>(), 0., epsilon = 1e-9);
//! assert_relative_eq!(roll.get::<degree>(), 90., epsilon = 1e-9);
//! ```

mod angles;
mod error;
mod frame;
mod vectors;

pub mod rotations;
pub mod transforms;

/// A point or direction in 3D Cartesian coordinates.
pub type Vector3 = nalgebra::Vector3<f64>;

/// A 3×3 matrix, used for rotations and for frame bases.
pub type Matrix3 = nalgebra::Matrix3<f64>;

pub use angles::{reduce_angle, reduce_angles};
pub use error::{Error, Result};
pub use frame::{Components, Frame};
pub use rotations::{axis_angle_matrix, Axis, EulerConvention};
pub use transforms::{
    cartesian_to_cylindrical, cartesian_to_cylindrical_batch, cartesian_to_spherical,
    cartesian_to_spherical_batch, cylindrical_to_cartesian, cylindrical_to_cartesian_batch,
    cylindrical_to_spherical, cylindrical_to_spherical_batch, spherical_to_cartesian,
    spherical_to_cartesian_batch, spherical_to_cylindrical, spherical_to_cylindrical_batch,
    Cylindrical, Spherical,
};
pub use vectors::{angles_between_vectors, unit_vector};
