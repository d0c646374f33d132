//! Rectangle helpers built on [`kurbo::Rect`].

use super::{AffineTransform, CardinalDirection};
use kurbo::{Point, Rect};

/// The nine reference points of a rectangle, in this order:
///
/// ```text
/// 0: TL   1: TR   2: BR   3: BL
/// 4: TC   5: RC   6: BC   7: LC   8: C
/// ```
pub fn to_9_points(rect: Rect) -> [Point; 9] {
    let rect = rect.abs();
    let cx = (rect.x0 + rect.x1) / 2.0;
    let cy = (rect.y0 + rect.y1) / 2.0;
    [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
        Point::new(cx, rect.y0),
        Point::new(rect.x1, cy),
        Point::new(cx, rect.y1),
        Point::new(rect.x0, cy),
        Point::new(cx, cy),
    ]
}

/// The four corners of `rect` mapped through `transform` (TL, TR, BR, BL).
pub fn quad(rect: Rect, transform: &AffineTransform) -> [Point; 4] {
    [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ]
    .map(|p| transform.apply_point(p))
}

/// Axis-aligned bounding box of `rect` after `transform`.
pub fn transform_rect(rect: Rect, transform: &AffineTransform) -> Rect {
    transform.apply_rect(rect)
}

/// Union of all rectangles, or `None` for an empty input.
pub fn union<I>(rects: I) -> Option<Rect>
where
    I: IntoIterator<Item = Rect>,
{
    rects.into_iter().reduce(|acc, r| acc.union(r))
}

/// The point of `rect` that a cardinal direction names: edge midpoints for
/// `n/e/s/w`, corners for the diagonals.
pub fn cardinal_point(rect: Rect, direction: CardinalDirection) -> Point {
    let rect = rect.abs();
    let center = rect.center();
    match direction {
        CardinalDirection::N => Point::new(center.x, rect.y0),
        CardinalDirection::E => Point::new(rect.x1, center.y),
        CardinalDirection::S => Point::new(center.x, rect.y1),
        CardinalDirection::W => Point::new(rect.x0, center.y),
        CardinalDirection::NE => Point::new(rect.x1, rect.y0),
        CardinalDirection::SE => Point::new(rect.x1, rect.y1),
        CardinalDirection::SW => Point::new(rect.x0, rect.y1),
        CardinalDirection::NW => Point::new(rect.x0, rect.y0),
    }
}

/// The corners that move when the handle at `direction` is dragged: the
/// corner itself for diagonals, both corners of the edge otherwise.
pub fn moving_corners(rect: Rect, direction: CardinalDirection) -> Vec<Point> {
    let rect = rect.abs();
    match direction {
        CardinalDirection::N => vec![Point::new(rect.x0, rect.y0), Point::new(rect.x1, rect.y0)],
        CardinalDirection::E => vec![Point::new(rect.x1, rect.y0), Point::new(rect.x1, rect.y1)],
        CardinalDirection::S => vec![Point::new(rect.x0, rect.y1), Point::new(rect.x1, rect.y1)],
        CardinalDirection::W => vec![Point::new(rect.x0, rect.y0), Point::new(rect.x0, rect.y1)],
        diagonal => vec![cardinal_point(rect, diagonal)],
    }
}
