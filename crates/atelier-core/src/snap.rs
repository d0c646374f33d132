//! Snapping: aligning moving points to anchor points of surrounding geometry.

use crate::geometry::{rect, Axis, EPSILON};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Angle snap increment in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// Snap an angle to the nearest increment.
/// Returns the snapped angle in degrees (0-360).
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    if increment <= 0.0 {
        return angle_degrees;
    }
    let snapped = (angle_degrees / increment).round() * increment;
    snapped.rem_euclid(360.0)
}

/// Anchors hit on each axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisAnchors {
    pub x: Vec<Point>,
    pub y: Vec<Point>,
}

/// Result of surface snapping: the anchors that won and the correction to
/// add to the moving points. An axis that did not snap has no anchors and a
/// zero distance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSnapping {
    pub anchors: AxisAnchors,
    pub distance: Vec2,
}

impl SurfaceSnapping {
    pub fn snapped_x(&self) -> bool {
        !self.anchors.x.is_empty()
    }

    pub fn snapped_y(&self) -> bool {
        !self.anchors.y.is_empty()
    }
}

/// Winning offset on one axis.
#[derive(Debug, Clone, PartialEq)]
struct AxisSnap {
    offset: f64,
    anchors: Vec<Point>,
}

/// Closest anchor/agent pair on `axis` within `threshold`.
///
/// Anchors are visited in the order given, so among equally close anchors the
/// first one wins.
fn snap_axis(agents: &[Point], anchors: &[Point], axis: Axis, threshold: f64) -> Option<AxisSnap> {
    let mut best: Option<f64> = None;
    for anchor in anchors {
        for agent in agents {
            let d = axis.of_point(*anchor) - axis.of_point(*agent);
            if d.abs() > threshold {
                continue;
            }
            if best.is_none_or(|b| d.abs() < b.abs()) {
                best = Some(d);
            }
        }
    }

    let offset = best?;
    let aligned = anchors
        .iter()
        .filter(|anchor| {
            agents.iter().any(|agent| {
                (axis.of_point(**anchor) - axis.of_point(*agent) - offset).abs() <= EPSILON
            })
        })
        .copied()
        .collect();
    Some(AxisSnap {
        offset,
        anchors: aligned,
    })
}

/// Snap `agents` against `anchors`, each axis independently.
///
/// Returns `None` when neither axis has an anchor within `threshold`.
pub fn snap_points(
    agents: &[Point],
    anchors: &[Point],
    threshold: f64,
    x_enabled: bool,
    y_enabled: bool,
) -> Option<SurfaceSnapping> {
    let x = x_enabled
        .then(|| snap_axis(agents, anchors, Axis::X, threshold))
        .flatten();
    let y = y_enabled
        .then(|| snap_axis(agents, anchors, Axis::Y, threshold))
        .flatten();
    if x.is_none() && y.is_none() {
        return None;
    }

    let mut snapping = SurfaceSnapping::default();
    if let Some(x) = x {
        snapping.distance.x = x.offset;
        snapping.anchors.x = x.anchors;
    }
    if let Some(y) = y {
        snapping.distance.y = y.offset;
        snapping.anchors.y = y.anchors;
    }
    Some(snapping)
}

/// Snap a moving rectangle against a set of anchor rectangles using the nine
/// reference points of each.
pub fn snap_rect(agent: Rect, anchors: &[Rect], threshold: f64) -> Option<SurfaceSnapping> {
    let agent_points = rect::to_9_points(agent);
    let anchor_points: Vec<Point> = anchors.iter().flat_map(|r| rect::to_9_points(*r)).collect();
    snap_points(&agent_points, &anchor_points, threshold, true, true)
}

/// Visual feedback for a snap: anchor points, infinite rays through the
/// snapped offsets, and segments joining moved agents to their anchors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapGuide {
    pub points: Vec<Point>,
    pub rays: Vec<(Axis, f64)>,
    pub lines: Vec<(Point, Point)>,
}

impl SnapGuide {
    /// Build the guide for `snapping`; `agents` are the points before the
    /// correction was applied.
    pub fn new(snapping: &SurfaceSnapping, agents: &[Point]) -> Self {
        let moved: Vec<Point> = agents.iter().map(|p| *p + snapping.distance).collect();
        let mut guide = SnapGuide::default();

        for (axis, anchors) in [(Axis::X, &snapping.anchors.x), (Axis::Y, &snapping.anchors.y)] {
            for anchor in anchors {
                if !guide.points.contains(anchor) {
                    guide.points.push(*anchor);
                }
                let offset = axis.of_point(*anchor);
                if !guide.rays.iter().any(|(a, o)| *a == axis && (o - offset).abs() <= EPSILON) {
                    guide.rays.push((axis, offset));
                }
                let nearest = moved
                    .iter()
                    .filter(|p| (axis.of_point(**p) - offset).abs() <= EPSILON)
                    .min_by(|a, b| a.distance(*anchor).total_cmp(&b.distance(*anchor)));
                if let Some(agent) = nearest {
                    guide.lines.push((*agent, *anchor));
                }
            }
        }
        guide
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.rays.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_angle() {
        assert_eq!(snap_angle(0.0, 15.0), 0.0);
        assert_eq!(snap_angle(7.0, 15.0), 0.0);
        assert_eq!(snap_angle(8.0, 15.0), 15.0);
        assert_eq!(snap_angle(44.0, 15.0), 45.0);
        assert_eq!(snap_angle(358.0, 15.0), 0.0);
        assert_eq!(snap_angle(-20.0, 15.0), 345.0);
    }

    #[test]
    fn test_snap_picks_minimum_distance() {
        let agents = [Point::new(10.0, 10.0)];
        let anchors = [Point::new(14.0, 100.0), Point::new(12.0, 200.0)];
        let snap = snap_points(&agents, &anchors, 5.0, true, true).unwrap();
        assert_eq!(snap.distance, Vec2::new(2.0, 0.0));
        assert_eq!(snap.anchors.x, vec![Point::new(12.0, 200.0)]);
        assert!(!snap.snapped_y());
    }

    #[test]
    fn test_snap_tie_prefers_first_anchor() {
        let agents = [Point::new(10.0, 0.0)];
        let anchors = [Point::new(13.0, 500.0), Point::new(7.0, 500.0)];
        let snap = snap_points(&agents, &anchors, 5.0, true, false).unwrap();
        assert_eq!(snap.distance.x, 3.0);
        assert_eq!(snap.anchors.x, vec![Point::new(13.0, 500.0)]);
    }

    #[test]
    fn test_snap_outside_threshold_is_free() {
        let agents = [Point::new(0.0, 0.0)];
        let anchors = [Point::new(20.0, 20.0)];
        assert!(snap_points(&agents, &anchors, 5.0, true, true).is_none());
        assert!(snap_points(&agents, &[], 5.0, true, true).is_none());
    }

    #[test]
    fn test_snap_axes_are_independent() {
        let agents = [Point::new(0.0, 0.0)];
        let anchors = [Point::new(3.0, 50.0), Point::new(80.0, -4.0)];
        let snap = snap_points(&agents, &anchors, 5.0, true, true).unwrap();
        assert_eq!(snap.distance, Vec2::new(3.0, -4.0));
        assert_eq!(snap.anchors.x, vec![Point::new(3.0, 50.0)]);
        assert_eq!(snap.anchors.y, vec![Point::new(80.0, -4.0)]);

        let only_y = snap_points(&agents, &anchors, 5.0, false, true).unwrap();
        assert_eq!(only_y.distance, Vec2::new(0.0, -4.0));
        assert!(only_y.anchors.x.is_empty());
    }

    #[test]
    fn test_snap_collects_all_aligned_anchors() {
        let agents = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let anchors = [Point::new(2.0, 40.0), Point::new(12.0, 90.0), Point::new(2.0, 70.0)];
        let snap = snap_points(&agents, &anchors, 5.0, true, false).unwrap();
        assert_eq!(snap.distance.x, 2.0);
        assert_eq!(snap.anchors.x.len(), 3);
    }

    #[test]
    fn test_snap_rect_edges() {
        let agent = Rect::new(0.0, 0.0, 10.0, 10.0);
        let anchors = [Rect::new(13.0, 40.0, 30.0, 50.0)];
        let snap = snap_rect(agent, &anchors, 5.0).unwrap();
        // right edge 10 -> left edge 13
        assert_eq!(snap.distance.x, 3.0);
        assert!(!snap.snapped_y());
    }

    #[test]
    fn test_snap_guide() {
        let agents = [Point::new(0.0, 0.0)];
        let anchors = [Point::new(3.0, 50.0)];
        let snap = snap_points(&agents, &anchors, 5.0, true, true).unwrap();
        let guide = SnapGuide::new(&snap, &agents);
        assert_eq!(guide.points, vec![Point::new(3.0, 50.0)]);
        assert_eq!(guide.rays, vec![(Axis::X, 3.0)]);
        assert_eq!(guide.lines, vec![(Point::new(3.0, 0.0), Point::new(3.0, 50.0))]);
        assert!(SnapGuide::default().is_empty());
    }
}
