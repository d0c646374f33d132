//! Geometry kernel: vectors, affine transforms, polygon containment,
//! line rasterization and direction classification.

pub mod rect;
mod transform;

pub use transform::{compose, invert, AffineTransform, GeometryError, EPSILON};

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 2D vector. Value type, no identity.
pub type Vector2 = Vec2;

/// 3D vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Drop the z component.
    pub fn truncate(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl std::ops::Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn of(self, v: Vec2) -> f64 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }

    pub fn of_point(self, p: Point) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }

    /// Unit vector along this axis scaled by `value`.
    pub fn vector(self, value: f64) -> Vec2 {
        match self {
            Axis::X => Vec2::new(value, 0.0),
            Axis::Y => Vec2::new(0.0, value),
        }
    }
}

/// Compass direction in screen coordinates (positive y is south).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardinalDirection {
    N,
    E,
    S,
    W,
    NE,
    SE,
    SW,
    NW,
}

impl CardinalDirection {
    /// The opposite direction (`n -> s`, `ne -> sw`, ...).
    pub fn inverted(self) -> Self {
        match self {
            CardinalDirection::N => CardinalDirection::S,
            CardinalDirection::E => CardinalDirection::W,
            CardinalDirection::S => CardinalDirection::N,
            CardinalDirection::W => CardinalDirection::E,
            CardinalDirection::NE => CardinalDirection::SW,
            CardinalDirection::SE => CardinalDirection::NW,
            CardinalDirection::SW => CardinalDirection::NE,
            CardinalDirection::NW => CardinalDirection::SE,
        }
    }

    /// Whether this direction has a horizontal component.
    pub fn is_horizontal(self) -> bool {
        !matches!(self, CardinalDirection::N | CardinalDirection::S)
    }

    /// Whether this direction has a vertical component.
    pub fn is_vertical(self) -> bool {
        !matches!(self, CardinalDirection::E | CardinalDirection::W)
    }

    pub fn is_diagonal(self) -> bool {
        self.is_horizontal() && self.is_vertical()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CardinalDirection::N => "n",
            CardinalDirection::E => "e",
            CardinalDirection::S => "s",
            CardinalDirection::W => "w",
            CardinalDirection::NE => "ne",
            CardinalDirection::SE => "se",
            CardinalDirection::SW => "sw",
            CardinalDirection::NW => "nw",
        }
    }
}

impl fmt::Display for CardinalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project a 1-D delta through the linear row of `transform` for `axis`.
///
/// Translation never affects a delta; see [`apply_position`] for absolute
/// coordinates.
pub fn apply_delta(delta: f64, axis: Axis, transform: &AffineTransform) -> f64 {
    match axis {
        Axis::X => delta * transform.matrix[0][0],
        Axis::Y => delta * transform.matrix[1][1],
    }
}

/// Project a 1-D absolute position through `transform` for `axis`,
/// translation included.
pub fn apply_position(position: f64, axis: Axis, transform: &AffineTransform) -> f64 {
    match axis {
        Axis::X => position * transform.matrix[0][0] + transform.matrix[0][2],
        Axis::Y => position * transform.matrix[1][1] + transform.matrix[1][2],
    }
}

/// Map a delta expressed in the outer frame into the frame placed by
/// `frame` (usually a parent's absolute transform).
pub fn delta_to_local(delta: Vec2, frame: &AffineTransform) -> Result<Vec2, GeometryError> {
    Ok(frame.invert()?.apply_vector(delta))
}

/// Whether `point` lies on the segment `a`-`b`.
fn on_segment(point: Point, a: Point, b: Point) -> bool {
    let cross = (b.x - a.x) * (point.y - a.y) - (b.y - a.y) * (point.x - a.x);
    let scale = (b - a).hypot().max(1.0);
    if cross.abs() > EPSILON * scale {
        return false;
    }
    point.x >= a.x.min(b.x) - EPSILON
        && point.x <= a.x.max(b.x) + EPSILON
        && point.y >= a.y.min(b.y) - EPSILON
        && point.y <= a.y.max(b.y) + EPSILON
}

/// Ray-casting containment test. Points on an edge or vertex are inside.
pub fn point_in_polygon(point: Point, vertices: &[Point]) -> bool {
    let n = vertices.len();
    if n == 0 {
        return false;
    }

    let mut j = n - 1;
    for i in 0..n {
        if on_segment(point, vertices[j], vertices[i]) {
            return true;
        }
        j = i;
    }
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (vertices[i], vertices[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Integer-step line between two lattice points, both endpoints included.
/// Inputs are rounded to the nearest lattice point.
pub fn bresenham_line(a: Point, b: Point) -> Vec<Point> {
    let (mut x0, mut y0) = (a.x.round() as i64, a.y.round() as i64);
    let (x1, y1) = (b.x.round() as i64, b.y.round() as i64);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut points = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    loop {
        points.push(Point::new(x0 as f64, y0 as f64));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
    points
}

/// Dominant compass direction of `b - a`.
///
/// `|dx|` is compared with `|dy|`; ties and the zero vector resolve to the
/// horizontal axis.
pub fn classify_direction(a: Point, b: Point) -> CardinalDirection {
    let d = b - a;
    if d.x.abs() >= d.y.abs() {
        if d.x >= 0.0 {
            CardinalDirection::E
        } else {
            CardinalDirection::W
        }
    } else if d.y > 0.0 {
        CardinalDirection::S
    } else {
        CardinalDirection::N
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_apply_delta_identity() {
        for d in [-12.5, 0.0, 3.0, 1e6] {
            assert_eq!(apply_delta(d, Axis::X, &AffineTransform::IDENTITY), d);
            assert_eq!(apply_delta(d, Axis::Y, &AffineTransform::IDENTITY), d);
        }
    }

    #[test]
    fn test_apply_delta_vs_position_under_translation() {
        let t = AffineTransform::translate((100.0, 50.0));
        assert_eq!(apply_delta(5.0, Axis::X, &t), 5.0);
        assert_eq!(apply_position(5.0, Axis::X, &t), 105.0);
        assert_eq!(apply_position(5.0, Axis::Y, &t), 55.0);

        let s = AffineTransform::scale(2.0, 3.0);
        assert_eq!(apply_delta(5.0, Axis::X, &s), 10.0);
        assert_eq!(apply_delta(5.0, Axis::Y, &s), 15.0);
    }

    #[test]
    fn test_delta_to_local_nested_scale() {
        let parent = AffineTransform::scale(2.0, 4.0).compose(&AffineTransform::translate((7.0, 7.0)));
        let local = delta_to_local(Vec2::new(10.0, 10.0), &parent).unwrap();
        assert!((local.x - 5.0).abs() < 1e-9);
        assert!((local.y - 2.5).abs() < 1e-9);
        assert!(delta_to_local(Vec2::new(1.0, 1.0), &AffineTransform::scale(0.0, 1.0)).is_err());
    }

    #[test]
    fn test_point_in_polygon() {
        let poly = square();
        assert!(point_in_polygon(Point::new(5.0, 5.0), &poly));
        assert!(!point_in_polygon(Point::new(-1.0, 5.0), &poly));
        assert!(!point_in_polygon(Point::new(5.0, 10.5), &poly));
    }

    #[test]
    fn test_point_in_polygon_boundary_is_inside() {
        let poly = square();
        assert!(point_in_polygon(Point::new(0.0, 5.0), &poly));
        assert!(point_in_polygon(Point::new(0.0, 0.0), &poly));
        assert!(point_in_polygon(Point::new(10.0, 10.0), &poly));
        assert!(point_in_polygon(Point::new(5.0, 10.0), &poly));
    }

    #[test]
    fn test_point_in_polygon_concave() {
        // U shape opening upwards
        let poly = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 8.0),
            Point::new(7.0, 8.0),
            Point::new(7.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(!point_in_polygon(Point::new(5.0, 4.0), &poly));
        assert!(point_in_polygon(Point::new(1.0, 4.0), &poly));
        assert!(point_in_polygon(Point::new(5.0, 9.0), &poly));
    }

    #[test]
    fn test_point_in_polygon_degenerate() {
        assert!(!point_in_polygon(Point::new(0.0, 0.0), &[]));
        let segment = [Point::new(0.0, 0.0), Point::new(4.0, 0.0)];
        assert!(point_in_polygon(Point::new(2.0, 0.0), &segment));
        assert!(!point_in_polygon(Point::new(2.0, 1.0), &segment));
    }

    #[test]
    fn test_bresenham_single_point() {
        let p = Point::new(0.0, 0.0);
        assert_eq!(bresenham_line(p, p), vec![p]);
    }

    #[test]
    fn test_bresenham_horizontal() {
        let line = bresenham_line(Point::new(0.0, 0.0), Point::new(3.0, 0.0));
        assert_eq!(
            line,
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(3.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_bresenham_steep_and_reversed() {
        let line = bresenham_line(Point::new(2.0, 5.0), Point::new(0.0, 0.0));
        assert_eq!(line.first(), Some(&Point::new(2.0, 5.0)));
        assert_eq!(line.last(), Some(&Point::new(0.0, 0.0)));
        assert_eq!(line.len(), 6);
        for w in line.windows(2) {
            assert!((w[1].x - w[0].x).abs() <= 1.0);
            assert!((w[1].y - w[0].y).abs() <= 1.0);
        }
    }

    #[test]
    fn test_classify_direction() {
        let o = Point::new(0.0, 0.0);
        assert_eq!(classify_direction(o, Point::new(10.0, 50.0)), CardinalDirection::S);
        assert_eq!(classify_direction(o, Point::new(10.0, 0.0)), CardinalDirection::E);
        assert_eq!(classify_direction(o, Point::new(0.0, 0.0)), CardinalDirection::E);
        assert_eq!(classify_direction(o, Point::new(-10.0, -50.0)), CardinalDirection::N);
        assert_eq!(classify_direction(o, Point::new(-10.0, 3.0)), CardinalDirection::W);
    }

    #[test]
    fn test_classify_direction_ties_are_horizontal() {
        let o = Point::new(0.0, 0.0);
        assert_eq!(classify_direction(o, Point::new(10.0, 10.0)), CardinalDirection::E);
        assert_eq!(classify_direction(o, Point::new(-10.0, 10.0)), CardinalDirection::W);
        assert_eq!(classify_direction(o, Point::new(-10.0, -10.0)), CardinalDirection::W);
    }

    #[test]
    fn test_invert_direction() {
        assert_eq!(CardinalDirection::N.inverted(), CardinalDirection::S);
        assert_eq!(CardinalDirection::NE.inverted(), CardinalDirection::SW);
        assert_eq!(CardinalDirection::SW.to_string(), "sw");
    }

    #[test]
    fn test_vector3_ops() {
        let x = Vector3::new(1.0, 0.0, 0.0);
        let y = Vector3::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(y), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(x.dot(y), 0.0);
        assert_eq!((x + y) * 2.0 - y, Vector3::new(2.0, 1.0, 0.0));
        assert_eq!(Vector3::new(3.0, 4.0, 0.0).length(), 5.0);
    }
}
