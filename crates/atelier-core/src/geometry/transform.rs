//! 2×3 affine transforms.

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Determinant magnitude below which a transform is treated as singular.
pub const EPSILON: f64 = 1e-9;

/// Geometry errors.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("transform is not invertible (determinant {determinant})")]
    SingularTransform { determinant: f64 },
}

/// An affine transform stored as the matrix `[[a, b, tx], [c, d, ty]]`.
///
/// A point `(x, y)` maps to `(a*x + b*y + tx, c*x + d*y + ty)`. Serialized as
/// the bare nested array so the wire format matches the matrix layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AffineTransform {
    pub matrix: [[f64; 3]; 2],
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineTransform {
    pub const IDENTITY: Self = Self {
        matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    };

    pub fn new(a: f64, b: f64, tx: f64, c: f64, d: f64, ty: f64) -> Self {
        Self {
            matrix: [[a, b, tx], [c, d, ty]],
        }
    }

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn translate(delta: impl Into<Vec2>) -> Self {
        let delta = delta.into();
        Self::new(1.0, 0.0, delta.x, 0.0, 1.0, delta.y)
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, 0.0, sy, 0.0)
    }

    /// Non-uniform scale that keeps `origin` fixed.
    pub fn scale_about(factor: Vec2, origin: Point) -> Self {
        (Affine::translate(origin.to_vec2())
            * Affine::scale_non_uniform(factor.x, factor.y)
            * Affine::translate(-origin.to_vec2()))
        .into()
    }

    /// Rotation by `radians` around the origin.
    pub fn rotate(radians: f64) -> Self {
        Affine::rotate(radians).into()
    }

    /// Rotation by `radians` that keeps `center` fixed.
    pub fn rotate_about(radians: f64, center: Point) -> Self {
        Affine::rotate_about(radians, center).into()
    }

    pub fn determinant(&self) -> f64 {
        let [[a, b, _], [c, d, _]] = self.matrix;
        a * d - b * c
    }

    pub fn is_invertible(&self) -> bool {
        self.determinant().abs() >= EPSILON
    }

    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.matrix[0][2], self.matrix[1][2])
    }

    /// The uniform scale implied by the linear part (square root of |det|).
    pub fn scale_factor(&self) -> f64 {
        self.determinant().abs().sqrt()
    }

    /// Rotation angle of the x basis vector, in radians.
    pub fn rotation(&self) -> f64 {
        self.matrix[1][0].atan2(self.matrix[0][0])
    }

    /// Matrix product `self × other`.
    pub fn compose(&self, other: &Self) -> Self {
        (Affine::from(*self) * Affine::from(*other)).into()
    }

    pub fn invert(&self) -> Result<Self, GeometryError> {
        let determinant = self.determinant();
        if determinant.abs() < EPSILON {
            return Err(GeometryError::SingularTransform { determinant });
        }
        Ok(Affine::from(*self).inverse().into())
    }

    /// Map a point, translation included.
    pub fn apply_point(&self, point: Point) -> Point {
        Affine::from(*self) * point
    }

    /// Map a vector through the linear part only.
    pub fn apply_vector(&self, v: Vec2) -> Vec2 {
        let [[a, b, _], [c, d, _]] = self.matrix;
        Vec2::new(a * v.x + b * v.y, c * v.x + d * v.y)
    }

    /// Axis-aligned bounding box of the transformed rectangle.
    pub fn apply_rect(&self, rect: Rect) -> Rect {
        Affine::from(*self).transform_rect_bbox(rect)
    }

    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.matrix
            .iter()
            .flatten()
            .zip(other.matrix.iter().flatten())
            .all(|(l, r)| (l - r).abs() <= epsilon)
    }

    pub fn is_identity(&self) -> bool {
        self.approx_eq(&Self::IDENTITY, EPSILON)
    }
}

impl From<Affine> for AffineTransform {
    fn from(affine: Affine) -> Self {
        // kurbo coefficients are column-major: [a, c, b, d, tx, ty] in our terms.
        let [a, c, b, d, tx, ty] = affine.as_coeffs();
        Self::new(a, b, tx, c, d, ty)
    }
}

impl From<AffineTransform> for Affine {
    fn from(t: AffineTransform) -> Self {
        let [[a, b, tx], [c, d, ty]] = t.matrix;
        Affine::new([a, c, b, d, tx, ty])
    }
}

/// Matrix product `t1 × t2`. Parent-then-child order for nested frames is
/// `compose(parent, child)`.
pub fn compose(t1: &AffineTransform, t2: &AffineTransform) -> AffineTransform {
    t1.compose(t2)
}

/// Inverse of `t`, or an error when its determinant is within [`EPSILON`] of zero.
pub fn invert(t: &AffineTransform) -> Result<AffineTransform, GeometryError> {
    t.invert()
}
