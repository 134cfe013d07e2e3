//! Small numeric helpers shared by the geometry, the solver and the exporter.

use cgmath::{prelude::*, Vector2, Vector3};
use num_traits::Float;


/// Returns `x` if it is finite and `0` otherwise (NaN, +∞ and −∞).
///
/// ```
/// use dirfield::math::sanitize;
///
/// assert_eq!(sanitize(1.5f64), 1.5);
/// assert_eq!(sanitize(f32::NAN), 0.0);
/// assert_eq!(sanitize(f64::NEG_INFINITY), 0.0);
/// ```
#[inline]
pub fn sanitize<T: Float>(x: T) -> T {
    if x.is_finite() { x } else { T::zero() }
}

/// Component-wise [`sanitize`].
#[inline]
pub fn sanitize_vec3<T: Float>(v: Vector3<T>) -> Vector3<T> {
    Vector3::new(sanitize(v.x), sanitize(v.y), sanitize(v.z))
}

/// The unit vector with the given angle (measured from the x axis).
#[inline]
pub fn from_angle(angle: f64) -> Vector2<f64> {
    Vector2::new(angle.cos(), angle.sin())
}

/// Interprets both vectors as complex numbers and multiplies them.
#[inline]
pub fn cmul(a: Vector2<f64>, b: Vector2<f64>) -> Vector2<f64> {
    Vector2::new(a.x * b.x - a.y * b.y, a.x * b.y + a.y * b.x)
}

/// Complex conjugate.
#[inline]
pub fn conj(a: Vector2<f64>) -> Vector2<f64> {
    Vector2::new(a.x, -a.y)
}

/// The (unsigned) angle between two vectors in `[0, π]`.
///
/// Uses `atan2` of the cross and dot product, which stays accurate for
/// nearly parallel vectors, unlike `acos` of the normalized dot product.
#[inline]
pub fn angle_between(a: Vector3<f64>, b: Vector3<f64>) -> f64 {
    a.cross(b).magnitude().atan2(a.dot(b))
}

/// Normalizes `v` unless it is the zero vector, in which case it is returned
/// unchanged.
#[inline]
pub fn normalize_or_zero(v: Vector2<f64>) -> Vector2<f64> {
    let len = v.magnitude();
    if len > 0.0 { v / len } else { v }
}
