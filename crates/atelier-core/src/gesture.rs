//! Gesture state machine: `idle -> active(kind) -> idle`.
//!
//! A gesture turns pointer motion into one world-space transform for the
//! active nodes. Snap anchors come from an external query, so each pointer
//! move first issues a [`QueryTicket`]; results are applied only while the
//! ticket is still current.

use crate::document::NodeId;
use crate::geometry::{classify_direction, rect, AffineTransform, CardinalDirection, EPSILON};
use crate::input::Modifiers;
use crate::snap::{self, SnapGuide, SurfaceSnapping};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Gesture errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GestureError {
    #[error("a {0} gesture is already in progress")]
    InProgress(GestureKind),
    #[error("no gesture in progress")]
    NotActive,
}

/// The kind of an active gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureKind {
    Translate,
    Scale,
    Nudge,
    Rotate,
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GestureKind::Translate => "translate",
            GestureKind::Scale => "scale",
            GestureKind::Nudge => "nudge",
            GestureKind::Rotate => "rotate",
        };
        f.write_str(name)
    }
}

/// Pointer-driven gestures and their handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerGesture {
    Translate,
    /// Resize from the handle at the given direction; the opposite handle stays put.
    Scale(CardinalDirection),
    Rotate,
}

impl PointerGesture {
    pub fn kind(self) -> GestureKind {
        match self {
            PointerGesture::Translate => GestureKind::Translate,
            PointerGesture::Scale(_) => GestureKind::Scale,
            PointerGesture::Rotate => GestureKind::Rotate,
        }
    }
}

/// Payload shared by every active gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureState<D> {
    pub ids: Vec<NodeId>,
    pub delta: D,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_snapping: Option<SurfaceSnapping>,
}

impl<D> GestureState<D> {
    fn new(ids: Vec<NodeId>, delta: D) -> Self {
        Self {
            ids,
            delta,
            surface_snapping: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleDelta {
    pub direction: CardinalDirection,
    /// Fixed point of the scale.
    pub origin: Point,
    /// Per-axis factor, snapping already applied.
    pub factor: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotateDelta {
    pub center: Point,
    /// Radians, clockwise in screen space.
    pub angle: f64,
}

/// The gesture carried by an editor state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Gesture {
    #[default]
    None,
    /// `delta` is the raw pointer delta; the snap correction is kept apart.
    Translate(GestureState<Vec2>),
    Scale(GestureState<ScaleDelta>),
    Nudge(GestureState<Vec2>),
    Rotate(GestureState<RotateDelta>),
}

static IDLE: Gesture = Gesture::None;

impl Gesture {
    pub fn kind(&self) -> Option<GestureKind> {
        match self {
            Gesture::None => None,
            Gesture::Translate(_) => Some(GestureKind::Translate),
            Gesture::Scale(_) => Some(GestureKind::Scale),
            Gesture::Nudge(_) => Some(GestureKind::Nudge),
            Gesture::Rotate(_) => Some(GestureKind::Rotate),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Gesture::None)
    }

    pub fn ids(&self) -> &[NodeId] {
        match self {
            Gesture::None => &[],
            Gesture::Translate(s) | Gesture::Nudge(s) => &s.ids,
            Gesture::Scale(s) => &s.ids,
            Gesture::Rotate(s) => &s.ids,
        }
    }

    pub fn surface_snapping(&self) -> Option<&SurfaceSnapping> {
        match self {
            Gesture::None => None,
            Gesture::Translate(s) | Gesture::Nudge(s) => s.surface_snapping.as_ref(),
            Gesture::Scale(s) => s.surface_snapping.as_ref(),
            Gesture::Rotate(s) => s.surface_snapping.as_ref(),
        }
    }

    /// The world-space transform this gesture applies to its nodes.
    pub fn transform(&self) -> AffineTransform {
        match self {
            Gesture::None => AffineTransform::IDENTITY,
            Gesture::Translate(s) => {
                let correction = s.surface_snapping.as_ref().map_or(Vec2::ZERO, |snap| snap.distance);
                AffineTransform::translate(s.delta + correction)
            }
            Gesture::Nudge(s) => AffineTransform::translate(s.delta),
            Gesture::Scale(s) => AffineTransform::scale_about(s.delta.factor, s.delta.origin),
            Gesture::Rotate(s) => AffineTransform::rotate_about(s.delta.angle, s.delta.center),
        }
    }
}

/// Snapping parameters in canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapOptions {
    pub enabled: bool,
    pub threshold: f64,
    /// Degrees; rotation locks to multiples of this while shift is held.
    pub angle_increment: f64,
}

impl Default for SnapOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 5.0,
            angle_increment: snap::ANGLE_SNAP_INCREMENT,
        }
    }
}

/// A pending pointer-move whose snap anchors are being looked up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryTicket {
    pub gesture_id: u64,
    pub tick: u64,
    /// Pointer position in canvas space.
    pub position: Point,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone)]
struct ActiveGesture {
    id: u64,
    pointer: Option<PointerGesture>,
    start: Point,
    bounds: Rect,
    gesture: Gesture,
    issued: u64,
    applied: u64,
    /// Moving points before snap correction, for guides.
    agents: Vec<Point>,
}

/// Drives a single gesture at a time.
#[derive(Debug, Clone, Default)]
pub struct GestureController {
    active: Option<ActiveGesture>,
    next_id: u64,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn kind(&self) -> Option<GestureKind> {
        self.active.as_ref().and_then(|a| a.gesture.kind())
    }

    /// The live gesture, or [`Gesture::None`] when idle.
    pub fn current(&self) -> &Gesture {
        self.active.as_ref().map_or(&IDLE, |a| &a.gesture)
    }

    pub fn gesture_id(&self) -> Option<u64> {
        self.active.as_ref().map(|a| a.id)
    }

    fn ensure_idle(&self) -> Result<(), GestureError> {
        match self.kind() {
            Some(kind) => Err(GestureError::InProgress(kind)),
            None => Ok(()),
        }
    }

    fn open(&mut self, pointer: Option<PointerGesture>, start: Point, bounds: Rect, gesture: Gesture) -> &Gesture {
        self.next_id += 1;
        log::debug!("Gesture {} started: {:?}", self.next_id, gesture.kind());
        let active = self.active.insert(ActiveGesture {
            id: self.next_id,
            pointer,
            start,
            bounds,
            gesture,
            issued: 0,
            applied: 0,
            agents: Vec::new(),
        });
        &active.gesture
    }

    /// Start a pointer gesture at canvas point `start` over nodes whose
    /// combined absolute bounds are `bounds`.
    pub fn begin(
        &mut self,
        pointer: PointerGesture,
        ids: Vec<NodeId>,
        start: Point,
        bounds: Rect,
    ) -> Result<&Gesture, GestureError> {
        self.ensure_idle()?;
        let gesture = match pointer {
            PointerGesture::Translate => Gesture::Translate(GestureState::new(ids, Vec2::ZERO)),
            PointerGesture::Scale(direction) => Gesture::Scale(GestureState::new(
                ids,
                ScaleDelta {
                    direction,
                    origin: rect::cardinal_point(bounds, direction.inverted()),
                    factor: Vec2::new(1.0, 1.0),
                },
            )),
            PointerGesture::Rotate => Gesture::Rotate(GestureState::new(
                ids,
                RotateDelta {
                    center: bounds.center(),
                    angle: 0.0,
                },
            )),
        };
        Ok(self.open(Some(pointer), start, bounds, gesture))
    }

    /// Start or extend a keyboard nudge. Repeated nudges accumulate into the
    /// same gesture; nudges never snap to surfaces.
    pub fn nudge(&mut self, ids: Vec<NodeId>, delta: Vec2) -> Result<&Gesture, GestureError> {
        if self.active.is_none() {
            return Ok(self.open(
                None,
                Point::ZERO,
                Rect::ZERO,
                Gesture::Nudge(GestureState::new(ids, delta)),
            ));
        }
        let active = self.active.as_mut().ok_or(GestureError::NotActive)?;
        match &mut active.gesture {
            Gesture::Nudge(state) => state.delta += delta,
            other => return Err(GestureError::InProgress(other.kind().unwrap_or(GestureKind::Nudge))),
        }
        Ok(&active.gesture)
    }

    /// Issue a ticket for a pointer move. `None` when no pointer gesture is
    /// active.
    pub fn ticket(&mut self, position: Point, modifiers: Modifiers) -> Option<QueryTicket> {
        let active = self.active.as_mut()?;
        if active.pointer.is_none() {
            return None;
        }
        active.issued += 1;
        Some(QueryTicket {
            gesture_id: active.id,
            tick: active.issued,
            position,
            modifiers,
        })
    }

    /// Apply a resolved ticket with the anchor rectangles its query returned.
    ///
    /// Returns `None` when the ticket is stale: its gesture has ended, or a
    /// later tick was already applied.
    pub fn apply(&mut self, ticket: &QueryTicket, anchors: &[Rect], options: &SnapOptions) -> Option<&Gesture> {
        let Some(active) = self.active.as_mut() else {
            log::debug!("Discarding tick {} of ended gesture {}", ticket.tick, ticket.gesture_id);
            return None;
        };
        if active.id != ticket.gesture_id {
            log::debug!("Discarding tick {} of ended gesture {}", ticket.tick, ticket.gesture_id);
            return None;
        }
        if ticket.tick <= active.applied {
            log::debug!(
                "Discarding out-of-order tick {} (applied {})",
                ticket.tick,
                active.applied
            );
            return None;
        }
        let pointer = active.pointer?;

        let anchor_points: Vec<Point> = anchors.iter().flat_map(|r| rect::to_9_points(*r)).collect();
        let (gesture, agents) = match pointer {
            PointerGesture::Translate => translate(active, ticket, &anchor_points, options),
            PointerGesture::Scale(direction) => scale(active, direction, ticket, &anchor_points, options),
            PointerGesture::Rotate => (rotate(active, ticket, options), Vec::new()),
        };
        active.gesture = gesture;
        active.agents = agents;
        active.applied = ticket.tick;
        Some(&active.gesture)
    }

    /// Guides for the current snap, if any.
    pub fn snap_guide(&self) -> Option<SnapGuide> {
        let active = self.active.as_ref()?;
        let snapping = active.gesture.surface_snapping()?;
        Some(SnapGuide::new(snapping, &active.agents))
    }

    /// End the gesture, returning its final state.
    pub fn finish(&mut self) -> Option<Gesture> {
        let active = self.active.take()?;
        log::debug!("Gesture {} finished", active.id);
        Some(active.gesture)
    }

    /// Abandon the gesture. Outstanding tickets become stale.
    pub fn cancel(&mut self) -> Option<Gesture> {
        let active = self.active.take()?;
        log::debug!("Gesture {} cancelled", active.id);
        Some(active.gesture)
    }
}

fn ids_of(gesture: &Gesture) -> Vec<NodeId> {
    gesture.ids().to_vec()
}

fn translate(
    active: &ActiveGesture,
    ticket: &QueryTicket,
    anchors: &[Point],
    options: &SnapOptions,
) -> (Gesture, Vec<Point>) {
    let mut delta = ticket.position - active.start;
    let (mut x_free, mut y_free) = (true, true);
    if ticket.modifiers.shift {
        // lock to the dominant axis
        match classify_direction(active.start, ticket.position) {
            CardinalDirection::E | CardinalDirection::W => {
                delta.y = 0.0;
                y_free = false;
            }
            _ => {
                delta.x = 0.0;
                x_free = false;
            }
        }
    }

    let agents = rect::to_9_points(active.bounds + delta).to_vec();
    let surface_snapping = if options.enabled {
        snap::snap_points(&agents, anchors, options.threshold, x_free, y_free)
    } else {
        None
    };
    let gesture = Gesture::Translate(GestureState {
        ids: ids_of(&active.gesture),
        delta,
        surface_snapping,
    });
    (gesture, agents)
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() < EPSILON {
        1.0
    } else {
        numerator / denominator
    }
}

fn scale(
    active: &ActiveGesture,
    direction: CardinalDirection,
    ticket: &QueryTicket,
    anchors: &[Point],
    options: &SnapOptions,
) -> (Gesture, Vec<Point>) {
    let bounds = active.bounds;
    let origin = rect::cardinal_point(bounds, direction.inverted());
    let handle = rect::cardinal_point(bounds, direction);
    let raw = ticket.position - active.start;

    let factor_at = |moved: Point| {
        Vec2::new(
            if direction.is_horizontal() {
                ratio(moved.x - origin.x, handle.x - origin.x)
            } else {
                1.0
            },
            if direction.is_vertical() {
                ratio(moved.y - origin.y, handle.y - origin.y)
            } else {
                1.0
            },
        )
    };

    let mut factor = factor_at(handle + raw);
    let uniform = ticket.modifiers.shift && direction.is_diagonal();

    // Only the corners under the dragged handle can snap.
    let preview = AffineTransform::scale_about(factor, origin);
    let agents: Vec<Point> = rect::moving_corners(bounds, direction)
        .into_iter()
        .map(|p| preview.apply_point(p))
        .collect();
    let surface_snapping = if options.enabled && !uniform {
        snap::snap_points(
            &agents,
            anchors,
            options.threshold,
            direction.is_horizontal(),
            direction.is_vertical(),
        )
    } else {
        None
    };
    if let Some(snapping) = &surface_snapping {
        factor = factor_at(handle + raw + snapping.distance);
    }
    if uniform {
        let f = if factor.x.abs() >= factor.y.abs() { factor.x } else { factor.y };
        factor = Vec2::new(f, f);
    }

    let gesture = Gesture::Scale(GestureState {
        ids: ids_of(&active.gesture),
        delta: ScaleDelta {
            direction,
            origin,
            factor,
        },
        surface_snapping,
    });
    (gesture, agents)
}

fn rotate(active: &ActiveGesture, ticket: &QueryTicket, options: &SnapOptions) -> Gesture {
    let center = active.bounds.center();
    let mut angle = (ticket.position - center).atan2() - (active.start - center).atan2();
    if ticket.modifiers.shift {
        angle = snap::snap_angle(angle.to_degrees(), options.angle_increment).to_radians();
    }
    Gesture::Rotate(GestureState::new(ids_of(&active.gesture), RotateDelta { center, angle }))
}
