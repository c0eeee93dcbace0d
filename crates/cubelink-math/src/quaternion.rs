//! Quaternion value type.
//!
//! Components are stored as `(x, y, z, w)` with `w` the scalar part, matching
//! the order the cube prints them on the wire.

use std::ops::{Mul, Neg};

use serde::{Deserialize, Serialize};

/// Dot product above which [`Quaternion::slerp`] falls back to normalized
/// linear interpolation.
///
/// Near this point `sin(theta0)` approaches zero and the spherical
/// coefficients lose precision.
pub const LERP_THRESHOLD: f64 = 0.9995;

/// A rotation in 3-D space, ideally of unit length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    /// First vector component.
    pub x: f64,
    /// Second vector component.
    pub y: f64,
    /// Third vector component.
    pub z: f64,
    /// Scalar component.
    pub w: f64,
}

impl Quaternion {
    /// The identity rotation `(0, 0, 0, 1)`.
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Create a quaternion from raw components. No normalization is applied.
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians about `axis`.
    ///
    /// The axis is normalized first. A zero-length axis yields the identity.
    pub fn from_axis_angle(axis: [f64; 3], angle: f64) -> Self {
        let [ax, ay, az] = axis;
        let length = (ax * ax + ay * ay + az * az).sqrt();
        if length == 0.0 {
            return Self::IDENTITY;
        }

        let half = angle / 2.0;
        let s = half.sin() / length;
        Self::new(ax * s, ay * s, az * s, half.cos())
    }

    /// Euclidean length of the 4-vector.
    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy. Returns the identity for a zero quaternion.
    pub fn normalized(&self) -> Self {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            return Self::IDENTITY;
        }
        self.scale(1.0 / magnitude)
    }

    /// `(-x, -y, -z, w)`.
    pub fn conjugate(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Multiplicative inverse, `conjugate / |q|^2`.
    ///
    /// Returns the identity for a zero quaternion.
    pub fn inverse(&self) -> Self {
        let norm_sq = self.dot(self);
        if norm_sq == 0.0 {
            return Self::IDENTITY;
        }
        self.conjugate().scale(1.0 / norm_sq)
    }

    /// Four-component dot product.
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Spherical linear interpolation from `self` (t = 0) to `other` (t = 1)
    /// along the shortest rotational path.
    ///
    /// When the inputs are nearly parallel the result is a normalized linear
    /// interpolation instead.
    pub fn slerp(&self, other: &Self, t: f64) -> Self {
        let mut end = *other;
        let mut dot = self.dot(other);

        // q and -q encode the same rotation; pick the nearer hemisphere.
        if dot < 0.0 {
            end = -end;
            dot = -dot;
        }

        if dot > LERP_THRESHOLD {
            let lerped = Self::new(
                self.x + t * (end.x - self.x),
                self.y + t * (end.y - self.y),
                self.z + t * (end.z - self.z),
                self.w + t * (end.w - self.w),
            );
            return lerped.normalized();
        }

        let theta_0 = dot.acos();
        let theta = theta_0 * t;
        let sin_theta_0 = theta_0.sin();
        let sin_theta = theta.sin();

        let s0 = theta.cos() - dot * sin_theta / sin_theta_0;
        let s1 = sin_theta / sin_theta_0;

        Self::new(
            s0 * self.x + s1 * end.x,
            s0 * self.y + s1 * end.y,
            s0 * self.z + s1 * end.z,
            s0 * self.w + s1 * end.w,
        )
    }

    /// Angle in radians of the rotation taking `self` to `other`.
    pub fn angle_to(&self, other: &Self) -> f64 {
        2.0 * self.dot(other).abs().min(1.0).acos()
    }

    /// Component-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.z - other.z).abs() <= tolerance
            && (self.w - other.w).abs() <= tolerance
    }

    /// True when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }

    fn scale(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor, self.w * factor)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Hamilton product. `a * b` applies `b` first, then `a`.
impl Mul for Quaternion {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

impl Neg for Quaternion {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}
