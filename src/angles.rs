//! Angle range reduction.
//!
//! All angles handled here are plain radians. [`reduce_angle`] maps one angle onto a canonical
//! representative of the same rotation, and [`reduce_angles`] does the same elementwise for an
//! array of any shape.

use ndarray::{Array, ArrayBase, Data, Dimension};
use std::f64::consts::TAU;
use uom::si::angle::radian;
use uom::si::f64::Angle;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

/// Reduces `angle` (in radians) to a canonical representative of the same rotation.
///
/// With `keep_sign`, values already in [-2π, 2π] (including both endpoints) are returned
/// unchanged, and larger magnitudes are reduced modulo 2π towards zero, so the sign of the input
/// is preserved.
///
/// Without `keep_sign`, the result is in [0, 2π]:
///
/// - values in [0, 2π] are returned unchanged, so exactly 2π is a fixed point;
/// - values in [-2π, 0) have exactly one full turn added, so -2π maps to 0;
/// - everything else is reduced modulo 2π into [0, 2π).
///
/// ```
/// use coordframe::reduce_angle;
/// use std::f64::consts::{PI, TAU};
///
/// assert_eq!(reduce_angle(-TAU, false), 0.);
/// assert_eq!(reduce_angle(TAU, false), TAU);
/// assert_eq!(reduce_angle(-0.1, false), -0.1 + TAU);
/// assert_eq!(reduce_angle(-PI, true), -PI);
/// ```
#[must_use]
pub fn reduce_angle(angle: f64, keep_sign: bool) -> f64 {
    if keep_sign {
        if angle.abs() <= TAU {
            angle
        } else {
            // `%` truncates towards zero, which is exactly "keep the sign"
            angle % TAU
        }
    } else if (0.0..=TAU).contains(&angle) {
        angle
    } else if (-TAU..0.0).contains(&angle) {
        angle + TAU
    } else {
        let reduced = angle % TAU;
        if reduced < 0.0 {
            reduced + TAU
        } else {
            reduced
        }
    }
}

/// Applies [`reduce_angle`] to every element of `angles`, preserving the array's shape.
///
/// Slices, `Vec`s, and fixed-size arrays can be passed through an [`ndarray::ArrayView`]:
///
/// ```
/// use coordframe::reduce_angles;
/// use ndarray::{array, ArrayView1};
/// use std::f64::consts::TAU;
///
/// let reduced = reduce_angles(&ArrayView1::from(&[0.1, -0.2][..]), false);
/// assert_eq!(reduced, array![0.1, -0.2 + TAU]);
/// ```
#[must_use]
pub fn reduce_angles<S, D>(angles: &ArrayBase<S, D>, keep_sign: bool) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    angles.mapv(|angle| reduce_angle(angle, keep_sign))
}

/// An angle kept in [0, 2π).
///
/// Used wherever the crate produces an azimuth-like angle, and for comparisons that must treat
/// 0 and 2π as the same angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BoundedAngle {
    radians: f64,
}

impl BoundedAngle {
    pub(crate) fn new(angle: impl Into<Angle>) -> Self {
        Self::from_radians(angle.into().get::<radian>())
    }

    pub(crate) fn from_radians(radians: f64) -> Self {
        Self {
            radians: Self::into_bounds(radians),
        }
    }

    /// Returns the angle in [0, 2π) in radians.
    pub(crate) fn get(self) -> f64 {
        self.radians
    }

    pub(crate) fn to_angle(self) -> Angle {
        Angle::new::<radian>(self.radians)
    }

    /// Returns the angle in [-π, π) in radians.
    pub(crate) fn to_signed_range(self) -> f64 {
        if self.radians < std::f64::consts::PI {
            self.radians
        } else {
            self.radians - TAU
        }
    }

    fn into_bounds(radians: f64) -> f64 {
        // `+ 0.0` turns -0.0 into 0.0
        let bounded = radians.rem_euclid(TAU) + 0.0;
        // rem_euclid rounds tiny negative inputs up to exactly 2π
        if bounded >= TAU {
            0.0
        } else {
            bounded
        }
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for BoundedAngle {
    type Epsilon = <f64 as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        // this is very accurate in radians
        0.000_000_001
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        Self::from_radians(self.radians - other.radians)
            .to_signed_range()
            .abs()
            <= epsilon
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for BoundedAngle {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        let min = f64::min(self.radians, other.radians);
        let max = f64::max(self.radians, other.radians);

        f64::relative_eq(&min, &max, epsilon, max_relative)
            || f64::relative_eq(&(min + TAU), &max, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::{reduce_angle, reduce_angles, BoundedAngle};
    use approx::{assert_abs_diff_eq, assert_abs_diff_ne, assert_relative_eq, assert_relative_ne};
    use ndarray::{array, ArrayView1};
    use quickcheck::quickcheck;
    use rstest::rstest;
    use std::f64::consts::{PI, TAU};
    use uom::si::angle::degree;
    use uom::si::f64::Angle;

    fn d(degrees: f64) -> Angle {
        Angle::new::<degree>(degrees)
    }

    #[rstest]
    #[case(0.1)]
    #[case(1.)]
    #[case(0.)]
    #[case(PI)]
    fn reduce_positive_in_range_is_identity(#[case] angle: f64) {
        assert_eq!(reduce_angle(angle, true), angle);
        assert_eq!(reduce_angle(angle, false), angle);
    }

    #[rstest]
    #[case(-0.1)]
    #[case(-1.)]
    #[case(-PI)]
    fn reduce_negative_in_range(#[case] angle: f64) {
        assert_eq!(reduce_angle(angle, true), angle);
        assert_eq!(reduce_angle(angle, false), angle + TAU);
    }

    #[test]
    fn reduce_full_turn_boundaries() {
        assert_eq!(reduce_angle(-TAU, true), -TAU);
        assert_eq!(reduce_angle(-TAU, false), 0.);
        assert_eq!(reduce_angle(TAU, true), TAU);
        assert_eq!(reduce_angle(TAU, false), TAU);
    }

    #[rstest]
    #[case(TAU + 0.5, 0.5, 0.5)]
    #[case(-TAU - 0.5, -0.5, TAU - 0.5)]
    #[case(5. * TAU + 1., 1., 1.)]
    #[case(-7. * TAU - 2., -2., TAU - 2.)]
    fn reduce_beyond_full_turn(#[case] angle: f64, #[case] signed: f64, #[case] unsigned: f64) {
        assert_relative_eq!(reduce_angle(angle, true), signed, epsilon = 1e-12);
        assert_relative_eq!(reduce_angle(angle, false), unsigned, epsilon = 1e-12);
    }

    #[test]
    fn reduce_arrays_keep_shape() {
        let angles = array![0.1, -0.2];
        assert_eq!(reduce_angles(&angles, true), angles);
        assert_eq!(reduce_angles(&angles, false), array![0.1, -0.2 + TAU]);

        let grid = array![[0.1, 0.2], [TAU + 0.3, -TAU]];
        let reduced = reduce_angles(&grid, false);
        assert_eq!(reduced.shape(), &[2, 2]);
        assert_eq!(reduced[[0, 1]], 0.2);
        assert_eq!(reduced[[1, 1]], 0.);
        assert_relative_eq!(reduced[[1, 0]], 0.3, epsilon = 1e-12);
    }

    #[test]
    fn reduce_slices_and_vecs() {
        let slice = [0.1, 0.2];
        assert_eq!(
            reduce_angles(&ArrayView1::from(&slice[..]), true).to_vec(),
            slice.to_vec()
        );
        let vec = vec![0.1, 0.2];
        assert_eq!(reduce_angles(&ArrayView1::from(&vec[..]), false).to_vec(), vec);
    }

    quickcheck! {
        fn reduce_is_periodic(angle: f64, turns: i8) -> () {
            // quickcheck will give us awkward f64 values -- we ignore those
            if !(angle == 0. || angle.is_normal()) {
                return;
            }
            let angle = angle.rem_euclid(2. * TAU) - TAU;
            let turned = angle + f64::from(turns) * TAU;
            assert_abs_diff_eq!(
                BoundedAngle::from_radians(reduce_angle(turned, false)),
                BoundedAngle::from_radians(reduce_angle(angle, false)),
            );
        }

        fn reduce_recovers_angle_from_whole_turns(angle: f64, turns: u8) -> () {
            if !(angle == 0. || angle.is_normal()) {
                return;
            }
            let angle = angle.rem_euclid(TAU);
            let turned = angle + f64::from(turns % 101) * TAU;
            assert_abs_diff_eq!(
                BoundedAngle::from_radians(reduce_angle(turned, true)),
                BoundedAngle::from_radians(angle),
            );
            assert_abs_diff_eq!(
                BoundedAngle::from_radians(reduce_angle(turned, false)),
                BoundedAngle::from_radians(angle),
            );
        }

        fn reduce_keeps_sign_within_two_turns(angle: f64) -> () {
            if !(angle == 0. || angle.is_normal()) {
                return;
            }
            let angle = angle.rem_euclid(2. * TAU) - TAU;
            assert_eq!(reduce_angle(angle, true), angle);
        }
    }

    #[test]
    fn bounded_angle_negative_radians() {
        let sut = BoundedAngle::from_radians(-0.5 * PI);
        assert_eq!(sut.get(), 1.5 * PI);
    }

    #[test]
    fn bounded_angle_negative_degrees() {
        let sut = BoundedAngle::new(d(-390.));
        assert_relative_eq!(sut.get(), 330.0_f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn bounded_angle_tiny_negative_is_not_full_turn() {
        let sut = BoundedAngle::from_radians(-1e-300);
        assert!(sut.get() < TAU);
    }

    #[rstest]
    #[case(-0.)]
    #[case(-TAU)]
    #[case(-2. * TAU)]
    fn bounded_angle_is_never_negative_zero(#[case] radians: f64) {
        let sut = BoundedAngle::from_radians(radians);
        assert_eq!(sut.get(), 0.);
        assert!(sut.get().is_sign_positive());
    }

    #[test]
    fn bounded_angle_positive_outside_bounds() {
        let sut = BoundedAngle::from_radians(TAU + 0.9);
        assert_relative_eq!(sut.get(), 0.9, epsilon = 0.000_000_001);
    }

    #[rstest]
    #[case(d(0.), 0.)]
    #[case(d(180.), -180.)]
    #[case(d(359.), -1.)]
    #[case(d(90.), 90.)]
    #[case(d(270.), -90.)]
    #[case(d(-90.), -90.)]
    #[case(d(-180.), -180.)]
    #[case(d(360.), 0.)]
    #[case(d(360.+120.), 120.)]
    #[case(d(360.+340.), -20.)]
    fn bounded_angle_to_signed_range_converts_correctly(
        #[case] input: Angle,
        #[case] expected_result_in_degrees: f64,
    ) {
        assert_relative_eq!(
            BoundedAngle::new(input).to_signed_range(),
            expected_result_in_degrees.to_radians(),
            epsilon = f64::EPSILON * 1000.
        );
    }

    #[rstest]
    #[case(0., 0. + f64::EPSILON, true)]
    #[case(0. + f64::EPSILON, 0., true)]
    #[case(10., 2., false)]
    #[case(2., 10., false)]
    #[case(360. - f64::EPSILON * 1e3, 0., true)]
    #[case(0. + f64::EPSILON * 1e2, 360. - f64::EPSILON * 1e2, true)]
    #[case(10., 2. + 360., false)]
    fn bounded_angle_comparison(#[case] a: f64, #[case] b: f64, #[case] expected: bool) {
        let a = BoundedAngle::new(d(a));
        let b = BoundedAngle::new(d(b));

        if expected {
            assert_relative_eq!(&a, &b, epsilon = f64::EPSILON * 1e3);
            assert_abs_diff_eq!(&a, &b, epsilon = f64::EPSILON * 1e3);
        } else {
            assert_relative_ne!(&a, &b, epsilon = f64::EPSILON * 1e3);
            assert_abs_diff_ne!(&a, &b, epsilon = f64::EPSILON * 1e3);
        }
    }
}
