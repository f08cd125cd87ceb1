//! Dimension-generic vector helpers.
//!
//! These operate on one-dimensional [`ndarray`] arrays of any length. A bare `f64` is not a
//! vector and does not type-check here; wrap it explicitly (eg, `array![0.1]`) if a 1-element
//! vector is what you mean.

use crate::Vector3;
use ndarray::{s, Array1, ArrayBase, ArrayView1, Data, Ix1};

/// Returns `v` scaled to unit Euclidean length.
///
/// The all-zero vector (including the empty vector) has no direction and is returned unchanged.
///
/// ```
/// use coordframe::unit_vector;
/// use ndarray::array;
///
/// assert_eq!(unit_vector(&array![3., 0., 4.]), array![0.6, 0., 0.8]);
/// assert_eq!(unit_vector(&array![0., 0.]), array![0., 0.]);
/// ```
#[must_use]
pub fn unit_vector<S>(v: &ArrayBase<S, Ix1>) -> Array1<f64>
where
    S: Data<Elem = f64>,
{
    // dividing by the largest magnitude first keeps the sum of squares from overflowing or
    // underflowing
    let scale = v.fold(0.0, |largest: f64, component| largest.max(component.abs()));
    if scale == 0.0 {
        return v.to_owned();
    }
    let scaled = v.mapv(|component| component / scale);
    let norm = scaled.dot(&scaled).sqrt();
    scaled.mapv_into(|component| component / norm)
}

/// Returns the angle in [0, π] between `u` and `v`.
///
/// If the vectors differ in length, the shorter one is padded with trailing zeros, so a 2D vector
/// can be compared against a 3D one. The cosine is clamped into [-1, 1] before taking the arc
/// cosine so that rounding can never push it out of the domain.
///
/// A zero vector has no direction; its (zero) unit vector is orthogonal to everything, so the
/// result is π/2.
///
/// ```
/// use coordframe::angles_between_vectors;
/// use ndarray::array;
/// use std::f64::consts::FRAC_PI_4;
///
/// let angle = angles_between_vectors(&array![1., 0., 0.], &array![1., 1.]);
/// assert!((angle - FRAC_PI_4).abs() < 1e-12);
/// ```
#[must_use]
pub fn angles_between_vectors<S1, S2>(u: &ArrayBase<S1, Ix1>, v: &ArrayBase<S2, Ix1>) -> f64
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    let dimensions = u.len().max(v.len());
    let u = unit_vector(&zero_padded(u.view(), dimensions));
    let v = unit_vector(&zero_padded(v.view(), dimensions));
    u.dot(&v).clamp(-1.0, 1.0).acos()
}

fn zero_padded(v: ArrayView1<'_, f64>, dimensions: usize) -> Array1<f64> {
    let mut padded = Array1::zeros(dimensions);
    padded.slice_mut(s![..v.len()]).assign(&v);
    padded
}

/// [`unit_vector`] for the fixed-size vectors used by frames.
pub(crate) fn unit_vector3(v: &Vector3) -> Vector3 {
    let unit = unit_vector(&ArrayView1::from(v.as_slice()));
    Vector3::new(unit[0], unit[1], unit[2])
}
