//! Conversions between Cartesian, spherical, and cylindrical point representations.
//!
//! Every conversion is available in three shapes:
//!
//! - typed, through [`Spherical`], [`Cylindrical`], and [`Vector3`] (for Cartesian points);
//! - single-point, taking a slice of exactly three components (eg,
//!   [`cartesian_to_spherical`]);
//! - batched, taking an N×3 [`ndarray`] array with one point per row (eg,
//!   [`cartesian_to_spherical_batch`]).
//!
//! The single-point and batched forms apply the same mapping, so row `i` of a batch result is
//! always equal to converting row `i` on its own.
//!
//! Angles in the untyped forms are in radians. Every azimuth produced by a conversion is in
//! [0, 2π). Conversions from Cartesian give degenerate points (the origin, points on the polar
//! axis) an azimuth of zero. Conversions between spherical and cylindrical keep the azimuth of
//! points on the polar axis, but the origin always becomes all zeros in either direction. Negative
//! zero is never produced as a radius or polar angle.

use crate::angles::BoundedAngle;
use crate::error::{Error, Result};
use crate::Vector3;
use log::debug;
use ndarray::{Array2, ArrayBase, Data, Ix2};
use std::f64::consts::{PI, TAU};
use std::fmt::{self, Display, Formatter};
use uom::si::angle::{degree, radian};
use uom::si::f64::Angle;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point given by its (r, θ, φ) spherical components.
///
/// This follows the physics convention for [spherical coordinates][sph], which defines
///
/// - r as the radial distance, meaning the distance to origin;
/// - θ (theta) as the polar angle, meaning the angle with respect to the positive Z axis; and
/// - φ (phi) as the azimuthal angle, meaning the angle of rotation in the XY plane from positive
///   X towards positive Y.
///
/// <div class="warning">
///
/// This type implements `Deserialize`, which does _not_ go through the range checks of
/// [`Spherical::new`].
///
/// </div>
///
/// [sph]: https://en.wikipedia.org/wiki/Spherical_coordinate_system
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Spherical {
    radius: f64,
    polar: Angle,
    azimuth: Angle,
}

impl Spherical {
    /// Constructs a spherical point.
    ///
    /// Fails with [`Error::InvalidValue`] unless `radius` is finite and non-negative, `polar` is
    /// in [0, π], and `azimuth` is in [-2π, 2π]. Out-of-range angles are rejected rather than
    /// wrapped.
    ///
    /// ```
    /// use coordframe::{Error, Spherical};
    /// use uom::si::{angle::degree, f64::Angle};
    ///
    /// let up = Spherical::new(1., Angle::new::<degree>(0.), Angle::new::<degree>(0.));
    /// assert!(up.is_ok());
    ///
    /// let beyond_south = Spherical::new(1., Angle::new::<degree>(360.), Angle::new::<degree>(0.));
    /// assert!(matches!(beyond_south, Err(Error::InvalidValue { .. })));
    /// ```
    pub fn new(radius: f64, polar: impl Into<Angle>, azimuth: impl Into<Angle>) -> Result<Self> {
        let polar = polar.into();
        let azimuth = azimuth.into();
        check_radius(radius)?;
        check_polar(polar.get::<radian>())?;
        check_azimuth(azimuth.get::<radian>())?;
        // `+ 0.` turns -0.0 into 0.0
        Ok(Self {
            radius: radius + 0.,
            polar: Angle::new::<radian>(polar.get::<radian>() + 0.),
            azimuth,
        })
    }

    /// The spherical point at the origin, with all components zero.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            radius: 0.,
            polar: Angle::new::<radian>(0.),
            azimuth: Angle::new::<radian>(0.),
        }
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the polar angle θ, measured from the positive Z axis.
    #[must_use]
    pub fn polar(&self) -> Angle {
        self.polar
    }

    /// Returns the azimuthal angle φ, measured from the positive X axis towards positive Y.
    #[must_use]
    pub fn azimuth(&self) -> Angle {
        self.azimuth
    }

    /// Returns `[r, θ, φ]` with the angles in radians.
    #[must_use]
    pub fn to_array(&self) -> [f64; 3] {
        [
            self.radius,
            self.polar.get::<radian>(),
            self.azimuth.get::<radian>(),
        ]
    }

    /// Expresses a Cartesian point in spherical components.
    ///
    /// The origin maps to (0, 0, 0), and points on the Z axis get an azimuth of zero.
    #[must_use]
    pub fn from_cartesian(point: &Vector3) -> Self {
        Self::from_cylindrical(&Cylindrical::from_cartesian(point))
    }

    /// Returns the Cartesian point `(r sinθ cosφ, r sinθ sinφ, r cosθ)`.
    #[must_use]
    pub fn to_cartesian(&self) -> Vector3 {
        let (sin_polar, cos_polar) = self.polar.get::<radian>().sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.get::<radian>().sin_cos();
        Vector3::new(
            self.radius * sin_polar * cos_azimuth,
            self.radius * sin_polar * sin_azimuth,
            self.radius * cos_polar,
        )
    }

    /// Expresses a cylindrical point in spherical components.
    ///
    /// Both representations share the azimuth; `r = √(ρ² + z²)` and `θ = atan2(ρ, z)`.
    #[must_use]
    pub fn from_cylindrical(point: &Cylindrical) -> Self {
        // a -0.0 distance from the axis would put θ at -π below the XY plane
        let rho = point.radius + 0.;
        let radius = rho.hypot(point.z);
        if radius == 0. {
            return Self::zero();
        }
        Self {
            radius,
            polar: Angle::new::<radian>(rho.atan2(point.z)),
            azimuth: BoundedAngle::new(point.azimuth).to_angle(),
        }
    }

    #[must_use]
    pub fn to_cylindrical(&self) -> Cylindrical {
        Cylindrical::from_spherical(self)
    }
}

impl From<Cylindrical> for Spherical {
    fn from(value: Cylindrical) -> Self {
        Self::from_cylindrical(&value)
    }
}

impl Display for Spherical {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "r = {:.3}, θ = {:.3}°, φ = {:.3}°",
            self.radius,
            self.polar.get::<degree>(),
            self.azimuth.get::<degree>(),
        )
    }
}

/// A point given by its (ρ, φ, z) cylindrical components.
///
/// ρ (rho) is the distance from the Z axis, φ (phi) is the same azimuthal angle as in
/// [`Spherical`], and z is the height above the XY plane.
///
/// <div class="warning">
///
/// This type implements `Deserialize`, which does _not_ go through the range checks of
/// [`Cylindrical::new`].
///
/// </div>
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cylindrical {
    radius: f64,
    azimuth: Angle,
    z: f64,
}

impl Cylindrical {
    /// Constructs a cylindrical point.
    ///
    /// Fails with [`Error::InvalidValue`] unless `radius` is finite and non-negative and
    /// `azimuth` is in [-2π, 2π].
    pub fn new(radius: f64, azimuth: impl Into<Angle>, z: f64) -> Result<Self> {
        let azimuth = azimuth.into();
        check_radius(radius)?;
        check_azimuth(azimuth.get::<radian>())?;
        Ok(Self {
            radius: radius + 0.,
            azimuth,
            z,
        })
    }

    /// The cylindrical point at the origin, with all components zero.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            radius: 0.,
            azimuth: Angle::new::<radian>(0.),
            z: 0.,
        }
    }

    /// Returns the distance ρ from the Z axis.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub fn azimuth(&self) -> Angle {
        self.azimuth
    }

    #[must_use]
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Returns `[ρ, φ, z]` with the azimuth in radians.
    #[must_use]
    pub fn to_array(&self) -> [f64; 3] {
        [self.radius, self.azimuth.get::<radian>(), self.z]
    }

    /// Expresses a Cartesian point in cylindrical components.
    ///
    /// Points on the Z axis (including the origin) get an azimuth of zero.
    #[must_use]
    pub fn from_cartesian(point: &Vector3) -> Self {
        let radius = point.x.hypot(point.y);
        let azimuth = if radius == 0. {
            0.
        } else {
            BoundedAngle::from_radians(point.y.atan2(point.x)).get()
        };
        Self {
            radius,
            azimuth: Angle::new::<radian>(azimuth),
            z: point.z,
        }
    }

    #[must_use]
    pub fn to_cartesian(&self) -> Vector3 {
        let (sin_azimuth, cos_azimuth) = self.azimuth.get::<radian>().sin_cos();
        Vector3::new(self.radius * cos_azimuth, self.radius * sin_azimuth, self.z)
    }

    /// Expresses a spherical point in cylindrical components: `ρ = r sinθ`, `z = r cosθ`.
    ///
    /// The origin maps to (0, 0, 0) whatever its azimuth.
    #[must_use]
    pub fn from_spherical(point: &Spherical) -> Self {
        if point.radius == 0. {
            return Self::zero();
        }
        let (sin_polar, cos_polar) = point.polar.get::<radian>().sin_cos();
        Self {
            radius: point.radius * sin_polar + 0.,
            azimuth: BoundedAngle::new(point.azimuth).to_angle(),
            z: point.radius * cos_polar,
        }
    }

    #[must_use]
    pub fn to_spherical(&self) -> Spherical {
        Spherical::from_cylindrical(self)
    }
}

impl From<Spherical> for Cylindrical {
    fn from(value: Spherical) -> Self {
        Self::from_spherical(&value)
    }
}

impl Display for Cylindrical {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ρ = {:.3}, φ = {:.3}°, z = {:.3}",
            self.radius,
            self.azimuth.get::<degree>(),
            self.z,
        )
    }
}

fn check_radius(value: f64) -> Result<()> {
    if value >= 0. && value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidValue {
            quantity: "radius",
            range: "[0, ∞)",
            value,
        })
    }
}

fn check_polar(value: f64) -> Result<()> {
    if (0.0..=PI).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidValue {
            quantity: "polar angle",
            range: "[0, π]",
            value,
        })
    }
}

fn check_azimuth(value: f64) -> Result<()> {
    if (-TAU..=TAU).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidValue {
            quantity: "azimuth",
            range: "[-2π, 2π]",
            value,
        })
    }
}

/// A point representation that can be read from and written to three raw components.
trait Representation: Sized {
    fn from_components(components: [f64; 3]) -> Result<Self>;
    fn to_components(&self) -> [f64; 3];
}

impl Representation for Vector3 {
    fn from_components(components: [f64; 3]) -> Result<Self> {
        Ok(Vector3::from(components))
    }

    fn to_components(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl Representation for Spherical {
    fn from_components([radius, polar, azimuth]: [f64; 3]) -> Result<Self> {
        Spherical::new(
            radius,
            Angle::new::<radian>(polar),
            Angle::new::<radian>(azimuth),
        )
    }

    fn to_components(&self) -> [f64; 3] {
        self.to_array()
    }
}

impl Representation for Cylindrical {
    fn from_components([radius, azimuth, z]: [f64; 3]) -> Result<Self> {
        Cylindrical::new(radius, Angle::new::<radian>(azimuth), z)
    }

    fn to_components(&self) -> [f64; 3] {
        self.to_array()
    }
}

fn convert_point<In, Out>(point: &[f64], convert: impl Fn(&In) -> Out) -> Result<[f64; 3]>
where
    In: Representation,
    Out: Representation,
{
    let components = <[f64; 3]>::try_from(point).map_err(|_| Error::InvalidShape {
        expected: 3,
        found: point.len(),
    })?;
    Ok(convert(&In::from_components(components)?).to_components())
}

fn convert_batch<In, Out, S>(
    points: &ArrayBase<S, Ix2>,
    convert: impl Fn(&In) -> Out,
) -> Result<Array2<f64>>
where
    In: Representation,
    Out: Representation,
    S: Data<Elem = f64>,
{
    if points.ncols() != 3 {
        return Err(Error::InvalidShape {
            expected: 3,
            found: points.ncols(),
        });
    }

    let mut converted = Array2::zeros((points.nrows(), 3));
    for (row, (point, mut out)) in points
        .outer_iter()
        .zip(converted.outer_iter_mut())
        .enumerate()
    {
        let point = In::from_components([point[0], point[1], point[2]]).map_err(|error| {
            debug!("rejecting batch at row {row}: {error}");
            error
        })?;
        for (slot, value) in out.iter_mut().zip(convert(&point).to_components()) {
            *slot = value;
        }
    }
    Ok(converted)
}

/// Converts one Cartesian point `[x, y, z]` into `[r, θ, φ]`.
///
/// ```
/// use coordframe::cartesian_to_spherical;
/// use std::f64::consts::FRAC_PI_2;
///
/// assert_eq!(cartesian_to_spherical(&[0., 1., 0.]).unwrap(), [1., FRAC_PI_2, FRAC_PI_2]);
/// assert_eq!(cartesian_to_spherical(&[0., 0., 0.]).unwrap(), [0., 0., 0.]);
/// assert!(cartesian_to_spherical(&[0., 0.]).is_err());
/// ```
pub fn cartesian_to_spherical(point: &[f64]) -> Result<[f64; 3]> {
    convert_point(point, Spherical::from_cartesian)
}

/// Converts every row `[x, y, z]` of an N×3 array into `[r, θ, φ]`.
pub fn cartesian_to_spherical_batch<S>(points: &ArrayBase<S, Ix2>) -> Result<Array2<f64>>
where
    S: Data<Elem = f64>,
{
    convert_batch(points, Spherical::from_cartesian)
}

/// Converts one spherical point `[r, θ, φ]` into `[x, y, z]`.
///
/// Fails with [`Error::InvalidValue`] if `r < 0`, θ is outside [0, π], or φ is outside [-2π, 2π].
pub fn spherical_to_cartesian(point: &[f64]) -> Result<[f64; 3]> {
    convert_point(point, Spherical::to_cartesian)
}

/// Converts every row `[r, θ, φ]` of an N×3 array into `[x, y, z]`.
///
/// If any row is out of range, the whole batch fails.
pub fn spherical_to_cartesian_batch<S>(points: &ArrayBase<S, Ix2>) -> Result<Array2<f64>>
where
    S: Data<Elem = f64>,
{
    convert_batch(points, Spherical::to_cartesian)
}

/// Converts one Cartesian point `[x, y, z]` into `[ρ, φ, z]`.
pub fn cartesian_to_cylindrical(point: &[f64]) -> Result<[f64; 3]> {
    convert_point(point, Cylindrical::from_cartesian)
}

/// Converts every row `[x, y, z]` of an N×3 array into `[ρ, φ, z]`.
pub fn cartesian_to_cylindrical_batch<S>(points: &ArrayBase<S, Ix2>) -> Result<Array2<f64>>
where
    S: Data<Elem = f64>,
{
    convert_batch(points, Cylindrical::from_cartesian)
}

/// Converts one cylindrical point `[ρ, φ, z]` into `[x, y, z]`.
pub fn cylindrical_to_cartesian(point: &[f64]) -> Result<[f64; 3]> {
    convert_point(point, Cylindrical::to_cartesian)
}

/// Converts every row `[ρ, φ, z]` of an N×3 array into `[x, y, z]`.
///
/// If any row is out of range, the whole batch fails.
pub fn cylindrical_to_cartesian_batch<S>(points: &ArrayBase<S, Ix2>) -> Result<Array2<f64>>
where
    S: Data<Elem = f64>,
{
    convert_batch(points, Cylindrical::to_cartesian)
}

/// Converts one cylindrical point `[ρ, φ, z]` into `[r, θ, φ]`.
///
/// Composing [`cartesian_to_cylindrical`] with this function gives the same result as
/// [`cartesian_to_spherical`].
pub fn cylindrical_to_spherical(point: &[f64]) -> Result<[f64; 3]> {
    convert_point(point, Spherical::from_cylindrical)
}

/// Converts every row `[ρ, φ, z]` of an N×3 array into `[r, θ, φ]`.
pub fn cylindrical_to_spherical_batch<S>(points: &ArrayBase<S, Ix2>) -> Result<Array2<f64>>
where
    S: Data<Elem = f64>,
{
    convert_batch(points, Spherical::from_cylindrical)
}

/// Converts one spherical point `[r, θ, φ]` into `[ρ, φ, z]`.
pub fn spherical_to_cylindrical(point: &[f64]) -> Result<[f64; 3]> {
    convert_point(point, Cylindrical::from_spherical)
}

/// Converts every row `[r, θ, φ]` of an N×3 array into `[ρ, φ, z]`.
///
/// If any row is out of range, the whole batch fails.
///
/// ```
/// use coordframe::spherical_to_cylindrical_batch;
/// use ndarray::array;
///
/// // the origin loses its azimuth, a point on the polar axis keeps it
/// let points = array![[0., 1., 2.], [3., 0., 2.]];
/// assert_eq!(
///     spherical_to_cylindrical_batch(&points)?,
///     array![[0., 0., 0.], [0., 2., 3.]]
/// );
/// assert!(spherical_to_cylindrical_batch(&array![[0., 1., 2.], [-1., 0., 0.]]).is_err());
/// # Ok::<(), coordframe::Error>(())
/// ```
pub fn spherical_to_cylindrical_batch<S>(points: &ArrayBase<S, Ix2>) -> Result<Array2<f64>>
where
    S: Data<Elem = f64>,
{
    convert_batch(points, Cylindrical::from_spherical)
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for Spherical {
    type Epsilon = <f64 as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        BoundedAngle::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        f64::abs_diff_eq(&self.radius, &other.radius, epsilon)
            && f64::abs_diff_eq(
                &self.polar.get::<radian>(),
                &other.polar.get::<radian>(),
                epsilon,
            )
            && BoundedAngle::abs_diff_eq(
                &BoundedAngle::new(self.azimuth),
                &BoundedAngle::new(other.azimuth),
                epsilon,
            )
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for Spherical {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        f64::relative_eq(&self.radius, &other.radius, epsilon, max_relative)
            && f64::relative_eq(
                &self.polar.get::<radian>(),
                &other.polar.get::<radian>(),
                epsilon,
                max_relative,
            )
            && BoundedAngle::relative_eq(
                &BoundedAngle::new(self.azimuth),
                &BoundedAngle::new(other.azimuth),
                epsilon,
                max_relative,
            )
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for Cylindrical {
    type Epsilon = <f64 as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        BoundedAngle::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        f64::abs_diff_eq(&self.radius, &other.radius, epsilon)
            && f64::abs_diff_eq(&self.z, &other.z, epsilon)
            && BoundedAngle::abs_diff_eq(
                &BoundedAngle::new(self.azimuth),
                &BoundedAngle::new(other.azimuth),
                epsilon,
            )
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for Cylindrical {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        f64::relative_eq(&self.radius, &other.radius, epsilon, max_relative)
            && f64::relative_eq(&self.z, &other.z, epsilon, max_relative)
            && BoundedAngle::relative_eq(
                &BoundedAngle::new(self.azimuth),
                &BoundedAngle::new(other.azimuth),
                epsilon,
                max_relative,
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};
    use quickcheck::{quickcheck, Arbitrary, Gen};
    use rstest::rstest;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn d(degrees: f64) -> Angle {
        Angle::new::<degree>(degrees)
    }

    /// A finite Cartesian point in [-100, 100)³.
    #[derive(Clone, Debug)]
    struct Point(Vector3);

    fn component(g: &mut Gen) -> f64 {
        // quickcheck will give us awkward f64 values -- we ignore those
        loop {
            match f64::arbitrary(g) {
                0. => break 0.,
                f if f.is_normal() => break f.rem_euclid(200.) - 100.,
                _ => {}
            }
        }
    }

    impl Arbitrary for Point {
        fn arbitrary(g: &mut Gen) -> Self {
            Self(Vector3::new(component(g), component(g), component(g)))
        }
    }

    fn batch(points: &[Point]) -> Array2<f64> {
        let mut batch = Array2::zeros((points.len(), 3));
        for (mut row, Point(p)) in batch.outer_iter_mut().zip(points) {
            row[0] = p.x;
            row[1] = p.y;
            row[2] = p.z;
        }
        batch
    }

    fn assert_rows_close(actual: &Array2<f64>, expected: &Array2<f64>) {
        assert_eq!(actual.shape(), expected.shape());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_relative_eq!(a, e, epsilon = 1e-9, max_relative = 1e-9);
        }
    }

    #[rstest]
    #[case([1., 0., 0.], [1., FRAC_PI_2, 0.])]
    #[case([0., 1., 0.], [1., FRAC_PI_2, FRAC_PI_2])]
    #[case([0., 0., 0.], [0., 0., 0.])]
    #[case([0., 0., 1.], [1., 0., 0.])]
    #[case([0., 0., -1.], [1., PI, 0.])]
    #[case([-1., 0., 0.], [1., FRAC_PI_2, PI])]
    #[case([0., -1., 0.], [1., FRAC_PI_2, 3. * FRAC_PI_2])]
    fn to_spherical_single_point(#[case] xyz: [f64; 3], #[case] rtp: [f64; 3]) {
        let actual = cartesian_to_spherical(&xyz).unwrap();
        for (a, e) in actual.iter().zip(rtp) {
            assert_relative_eq!(*a, e, epsilon = f64::EPSILON);
        }
    }

    #[rstest]
    #[case([1e200, 0., 0.], [1e200, FRAC_PI_2, 0.])]
    #[case([0., 0., -1e200], [1e200, PI, 0.])]
    #[case([1e-200, 1e-200, 0.], [2f64.sqrt() * 1e-200, FRAC_PI_2, FRAC_PI_2 / 2.])]
    #[case([-1e-300, 0., 0.], [1e-300, FRAC_PI_2, PI])]
    #[case([1e200, 1e200, 1e200], [3f64.sqrt() * 1e200, 2f64.sqrt().atan(), FRAC_PI_2 / 2.])]
    fn to_spherical_extreme_magnitudes(#[case] xyz: [f64; 3], #[case] rtp: [f64; 3]) {
        let actual = cartesian_to_spherical(&xyz).unwrap();
        for (a, e) in actual.iter().zip(rtp) {
            assert_relative_eq!(*a, e, epsilon = 0., max_relative = 1e-12);
        }
        let back = spherical_to_cartesian(&actual).unwrap();
        for (a, e) in back.iter().zip(xyz) {
            assert_relative_eq!(*a, e, epsilon = 1e-12 * actual[0], max_relative = 1e-12);
        }
    }

    #[rstest]
    #[case([-0., 0., -1.], [1., PI, 0.])]
    #[case([-0., 0., 1.], [1., 0., 0.])]
    #[case([-0., 1., -0.], [0., 0., 0.])]
    #[case([-0., -0., -0.], [0., 0., 0.])]
    fn cylindrical_with_negative_zero_radius(#[case] rpz: [f64; 3], #[case] rtp: [f64; 3]) {
        let actual = cylindrical_to_spherical(&rpz).unwrap();
        assert_eq!(actual, rtp);
        assert!(actual.iter().all(|c| c.is_sign_positive()), "{actual:?}");
        // the result is itself a valid spherical point
        spherical_to_cartesian(&actual).unwrap();
    }

    #[test]
    fn negative_zero_never_leaks() {
        let spherical = Spherical::new(-0., d(-0.), d(0.)).unwrap();
        assert!(spherical.radius().is_sign_positive());
        assert!(spherical.polar().get::<radian>().is_sign_positive());
        let cylindrical = Cylindrical::new(-0., d(90.), -3.).unwrap();
        assert!(cylindrical.radius().is_sign_positive());

        for rpz in [
            spherical_to_cylindrical(&[-0., 1., 0.]).unwrap(),
            spherical_to_cylindrical(&[2., -0., 0.]).unwrap(),
        ] {
            assert!(rpz[0].is_sign_positive(), "{rpz:?}");
        }
        let [_, _, azimuth] = cartesian_to_spherical(&[1., -0., 0.]).unwrap();
        assert!(azimuth.is_sign_positive());
    }

    #[test]
    fn origin_is_all_zeros_between_spherical_and_cylindrical() {
        assert_eq!(spherical_to_cylindrical(&[0., 1., 2.]).unwrap(), [0., 0., 0.]);
        assert_eq!(cylindrical_to_spherical(&[0., 2., 0.]).unwrap(), [0., 0., 0.]);
        // points on the polar axis keep their azimuth
        assert_eq!(spherical_to_cylindrical(&[1., 0., 2.]).unwrap(), [0., 2., 1.]);
        assert_eq!(cylindrical_to_spherical(&[0., 2., 1.]).unwrap(), [1., 0., 2.]);
    }

    #[test]
    fn origin_on_signed_zeros_is_zero() {
        assert_eq!(cartesian_to_spherical(&[-0., -0., -0.]).unwrap(), [0., 0., 0.]);
        assert_eq!(cartesian_to_cylindrical(&[-0., -0., 1.]).unwrap(), [0., 0., 1.]);
    }

    #[rstest]
    #[case(&[])]
    #[case(&[0.])]
    #[case(&[0., 0.])]
    #[case(&[0., 0., 0., 0.])]
    #[case(&[0., 0., 0., 0., 0., 0.])]
    fn single_point_wrong_arity(#[case] point: &[f64]) {
        let expected = Error::InvalidShape {
            expected: 3,
            found: point.len(),
        };
        assert_eq!(cartesian_to_spherical(point), Err(expected.clone()));
        assert_eq!(spherical_to_cartesian(point), Err(expected.clone()));
        assert_eq!(cartesian_to_cylindrical(point), Err(expected.clone()));
        assert_eq!(cylindrical_to_cartesian(point), Err(expected.clone()));
        assert_eq!(cylindrical_to_spherical(point), Err(expected.clone()));
        assert_eq!(spherical_to_cylindrical(point), Err(expected));
    }

    #[rstest]
    #[case([0., 0., 0.], [0., 0., 0.])]
    #[case([0., 1., 0.], [0., 0., 0.])]
    #[case([1., 0., 0.], [0., 0., 1.])]
    #[case([1., FRAC_PI_2, 0.], [1., 0., 0.])]
    #[case([1., PI, 0.], [0., 0., -1.])]
    fn to_cartesian_single_point(#[case] rtp: [f64; 3], #[case] xyz: [f64; 3]) {
        let actual = spherical_to_cartesian(&rtp).unwrap();
        for (a, e) in actual.iter().zip(xyz) {
            assert_relative_eq!(*a, e, epsilon = f64::EPSILON);
        }
    }

    #[rstest]
    #[case([-1., 0., 0.], "radius")]
    #[case([f64::NAN, 0., 0.], "radius")]
    #[case([1., 2. * PI, 0.], "polar angle")]
    #[case([1., -0.1, 0.], "polar angle")]
    #[case([1., 0., 7.], "azimuth")]
    #[case([1., 0., -7.], "azimuth")]
    fn to_cartesian_rejects_out_of_range(#[case] rtp: [f64; 3], #[case] expected: &str) {
        match spherical_to_cartesian(&rtp) {
            Err(Error::InvalidValue { quantity, .. }) => assert_eq!(quantity, expected),
            other => panic!("expected an invalid {expected}, got {other:?}"),
        }
    }

    #[test]
    fn cylindrical_rejects_out_of_range() {
        assert!(matches!(
            cylindrical_to_cartesian(&[-1., 0., 0.]),
            Err(Error::InvalidValue {
                quantity: "radius",
                ..
            })
        ));
        assert!(matches!(
            Cylindrical::new(1., d(400.), 0.),
            Err(Error::InvalidValue {
                quantity: "azimuth",
                ..
            })
        ));
        assert!(Cylindrical::new(1., d(-360.), -5.).is_ok());
    }

    #[rstest]
    #[case([1., 0., 0.], [1., 0., 0.])]
    #[case([0., 1., 0.], [1., FRAC_PI_2, 0.])]
    #[case([1., 0., 1.], [1., 0., 1.])]
    #[case([0., 0., 0.], [0., 0., 0.])]
    #[case([0., 0., 1.], [0., 0., 1.])]
    fn to_cylindrical_single_point(#[case] xyz: [f64; 3], #[case] rpz: [f64; 3]) {
        let actual = cartesian_to_cylindrical(&xyz).unwrap();
        for (a, e) in actual.iter().zip(rpz) {
            assert_relative_eq!(*a, e, epsilon = f64::EPSILON);
        }
    }

    #[test]
    fn produced_azimuth_is_canonical_for_signed_inputs() {
        let [_, azimuth, _] = spherical_to_cylindrical(&[1., FRAC_PI_2, -FRAC_PI_2]).unwrap();
        assert_relative_eq!(azimuth, 3. * FRAC_PI_2);
        let [_, _, azimuth] = cylindrical_to_spherical(&[1., 2. * PI, 0.]).unwrap();
        assert_eq!(azimuth, 0.);
    }

    #[test]
    fn batch_wrong_arity() {
        let points = Array2::<f64>::zeros((4, 2));
        let expected = Err(Error::InvalidShape {
            expected: 3,
            found: 2,
        });
        assert_eq!(cartesian_to_spherical_batch(&points), expected);
        assert_eq!(spherical_to_cartesian_batch(&points), expected);
        assert_eq!(cylindrical_to_spherical_batch(&points.view()), expected);
    }

    #[test]
    fn batch_fails_as_a_whole() {
        let points = array![[1., 0.5, 0.], [-1., 0.5, 0.], [2., 0.5, 0.]];
        assert!(matches!(
            spherical_to_cartesian_batch(&points),
            Err(Error::InvalidValue {
                quantity: "radius",
                value,
                ..
            }) if value == -1.
        ));
    }

    #[test]
    fn empty_batch() {
        let points = Array2::<f64>::zeros((0, 3));
        assert_eq!(
            cartesian_to_cylindrical_batch(&points).unwrap().shape(),
            &[0, 3]
        );
    }

    #[test]
    fn display() {
        let spherical = Spherical::from_cartesian(&Vector3::new(0., 2., 0.));
        insta::assert_snapshot!(spherical, @"r = 2.000, θ = 90.000°, φ = 90.000°");
        let cylindrical = Cylindrical::from_cartesian(&Vector3::new(-1., 0., 3.));
        insta::assert_snapshot!(cylindrical, @"ρ = 1.000, φ = 180.000°, z = 3.000");
    }

    quickcheck! {
        fn batch_matches_single_points(points: Vec<Point>) -> () {
            let batch = batch(&points);
            let converted = cartesian_to_spherical_batch(&batch).unwrap();
            for (row, Point(p)) in converted.outer_iter().zip(&points) {
                let single = cartesian_to_spherical(p.as_slice()).unwrap();
                assert_eq!(row.to_vec(), single.to_vec());
            }
        }

        fn spherical_roundtrip(points: Vec<Point>) -> () {
            let xyz = batch(&points);
            let rtp = cartesian_to_spherical_batch(&xyz).unwrap();
            assert_rows_close(&spherical_to_cartesian_batch(&rtp).unwrap(), &xyz);
        }

        fn cylindrical_roundtrip(points: Vec<Point>) -> () {
            let xyz = batch(&points);
            let rpz = cartesian_to_cylindrical_batch(&xyz).unwrap();
            assert_rows_close(&cylindrical_to_cartesian_batch(&rpz).unwrap(), &xyz);

            let rtp = cylindrical_to_spherical_batch(&rpz).unwrap();
            assert_rows_close(&cartesian_to_spherical_batch(&xyz).unwrap(), &rtp);
            assert_rows_close(&spherical_to_cylindrical_batch(&rtp).unwrap(), &rpz);
            assert_rows_close(&spherical_to_cartesian_batch(&rtp).unwrap(), &xyz);
        }

        fn typed_roundtrip(point: Point) -> () {
            let Point(p) = point;
            let spherical = Spherical::from_cartesian(&p);
            let cylindrical = Cylindrical::from_cartesian(&p);
            assert_relative_eq!(spherical.to_cartesian(), p, epsilon = 1e-9);
            assert_relative_eq!(cylindrical.to_cartesian(), p, epsilon = 1e-9);
            assert_relative_eq!(Spherical::from(cylindrical), spherical, epsilon = 1e-9);
            assert_relative_eq!(cylindrical.to_spherical().to_cylindrical(), cylindrical, epsilon = 1e-9);
        }

        fn azimuth_is_in_full_turn(point: Point) -> () {
            let Point(p) = point;
            for azimuth in [
                Spherical::from_cartesian(&p).azimuth(),
                Cylindrical::from_cartesian(&p).azimuth(),
            ] {
                let azimuth = azimuth.get::<radian>();
                assert!((0. ..TAU).contains(&azimuth), "{azimuth} is not in [0, 2π)");
            }
        }
    }
}
