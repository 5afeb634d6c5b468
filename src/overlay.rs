//! Draggable overlay positioning.
//!
//! Floating controls live inside a safe zone that keeps them clear of the
//! notch and home indicator. A pointer gesture on a control is either a tap
//! (toggle) or a drag (reposition); the two are told apart by how far the
//! pointer travelled before release.

use serde::{Deserialize, Serialize};

use crate::input::Point;

/// Minimum travel on either axis, in pixels, that turns a gesture into a drag
pub const DRAG_THRESHOLD_PX: f64 = 5.0;

pub const SAFE_ZONE: SafeZone = SafeZone {
    top: 60.0,
    bottom: 90.0,
    side_x: 12.0,
};

pub const ASSIST_HANDLE_SIZE: Size = Size {
    width: 48.0,
    height: 48.0,
};

pub const MACRO_TARGET_SIZE: Size = Size {
    width: 56.0,
    height: 56.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Margins overlays must keep from the screen edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeZone {
    pub top: f64,
    pub bottom: f64,
    pub side_x: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Which point of the widget its position refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorMode {
    TopLeft,
    Center,
}

/// Allowed range for a widget's position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(viewport: Viewport, zone: SafeZone, size: Size, anchor: AnchorMode) -> Self {
        match anchor {
            AnchorMode::Center => Self {
                min_x: zone.side_x + size.width / 2.0,
                max_x: viewport.width - zone.side_x - size.width / 2.0,
                min_y: zone.top + size.height / 2.0,
                max_y: viewport.height - zone.bottom - size.height / 2.0,
            },
            AnchorMode::TopLeft => Self {
                min_x: zone.side_x,
                max_x: viewport.width - zone.side_x - size.width,
                min_y: zone.top,
                max_y: viewport.height - zone.bottom - size.height,
            },
        }
    }

    /// On a viewport too small for the widget the minimum wins.
    pub fn clamp(&self, x: f64, y: f64) -> Position {
        Position {
            x: x.min(self.max_x).max(self.min_x),
            y: y.min(self.max_y).max(self.min_y),
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.min_x && pos.x <= self.max_x && pos.y >= self.min_y && pos.y <= self.max_y
    }
}

pub fn clamp(
    x: f64,
    y: f64,
    size: Size,
    anchor: AnchorMode,
    viewport: Viewport,
    zone: SafeZone,
) -> Position {
    Bounds::new(viewport, zone, size, anchor).clamp(x, y)
}

/// How a gesture ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragRelease {
    /// Never crossed the threshold: treat as a tap
    Tap,
    /// Moved the widget; this is where it landed
    Dropped(Position),
}

/// Pointer-down to pointer-up bookkeeping. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    active: bool,
    start: Point,
    offset: Point,
    last: Option<Position>,
}

impl DragSession {
    /// Record where the pointer went down relative to the widget origin.
    /// The widget does not move yet.
    pub fn begin(pointer: Point, current: Position) -> Self {
        Self {
            active: false,
            start: pointer,
            offset: Point::new(pointer.x - current.x, pointer.y - current.y),
            last: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Feed a move. Returns the new clamped position once the gesture has
    /// latched into a drag; a drag stays a drag until release.
    pub fn update(
        &mut self,
        pointer: Point,
        size: Size,
        anchor: AnchorMode,
        viewport: Viewport,
        zone: SafeZone,
    ) -> Option<Position> {
        let dx = (pointer.x - self.start.x).abs();
        let dy = (pointer.y - self.start.y).abs();
        if dx >= DRAG_THRESHOLD_PX || dy >= DRAG_THRESHOLD_PX {
            self.active = true;
        }
        if !self.active {
            return None;
        }
        let pos = clamp(
            pointer.x - self.offset.x,
            pointer.y - self.offset.y,
            size,
            anchor,
            viewport,
            zone,
        );
        self.last = Some(pos);
        Some(pos)
    }

    pub fn end(self) -> DragRelease {
        match (self.active, self.last) {
            (true, Some(pos)) => DragRelease::Dropped(pos),
            _ => DragRelease::Tap,
        }
    }
}

/// A floating control with a position, a size and an optional live gesture
#[derive(Debug, Clone, PartialEq)]
pub struct Draggable {
    position: Position,
    size: Size,
    anchor: AnchorMode,
    session: Option<DragSession>,
}

impl Draggable {
    pub fn new(position: Position, size: Size, anchor: AnchorMode) -> Self {
        Self {
            position,
            size,
            anchor,
            session: None,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn anchor(&self) -> AnchorMode {
        self.anchor
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// True once the current gesture has crossed the drag threshold
    pub fn is_dragging(&self) -> bool {
        self.session.map_or(false, |s| s.is_active())
    }

    /// Top-left corner of the widget's box, whatever the anchor
    pub fn origin(&self) -> Position {
        match self.anchor {
            AnchorMode::TopLeft => self.position,
            AnchorMode::Center => Position::new(
                self.position.x - self.size.width / 2.0,
                self.position.y - self.size.height / 2.0,
            ),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        let o = self.origin();
        p.x >= o.x && p.x <= o.x + self.size.width && p.y >= o.y && p.y <= o.y + self.size.height
    }

    pub fn begin_drag(&mut self, pointer: Point) {
        self.session = Some(DragSession::begin(pointer, self.position));
    }

    /// Returns the new position when the widget moved
    pub fn update_drag(
        &mut self,
        pointer: Point,
        viewport: Viewport,
        zone: SafeZone,
    ) -> Option<Position> {
        let session = self.session.as_mut()?;
        let pos = session.update(pointer, self.size, self.anchor, viewport, zone)?;
        self.position = pos;
        Some(pos)
    }

    /// `None` when no gesture was in progress
    pub fn end_drag(&mut self) -> Option<DragRelease> {
        self.session.take().map(DragSession::end)
    }

    /// Pull the widget back inside the safe zone. Returns true if it moved.
    pub fn reclamp(&mut self, viewport: Viewport, zone: SafeZone) -> bool {
        let bounds = Bounds::new(viewport, zone, self.size, self.anchor);
        let clamped = bounds.clamp(self.position.x, self.position.y);
        if clamped != self.position {
            self.position = clamped;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VP: Viewport = Viewport {
        width: 390.0,
        height: 844.0,
    };

    fn handle_at(x: f64, y: f64) -> Draggable {
        Draggable::new(Position::new(x, y), ASSIST_HANDLE_SIZE, AnchorMode::TopLeft)
    }

    #[test]
    fn top_left_bounds() {
        let b = Bounds::new(VP, SAFE_ZONE, ASSIST_HANDLE_SIZE, AnchorMode::TopLeft);
        assert_eq!(b.min_x, 12.0);
        assert_eq!(b.max_x, 390.0 - 12.0 - 48.0);
        assert_eq!(b.min_y, 60.0);
        assert_eq!(b.max_y, 844.0 - 90.0 - 48.0);
    }

    #[test]
    fn center_bounds() {
        let b = Bounds::new(VP, SAFE_ZONE, MACRO_TARGET_SIZE, AnchorMode::Center);
        assert_eq!(b.min_x, 12.0 + 28.0);
        assert_eq!(b.max_x, 390.0 - 12.0 - 28.0);
        assert_eq!(b.min_y, 60.0 + 28.0);
        assert_eq!(b.max_y, 844.0 - 90.0 - 28.0);
    }

    #[test]
    fn clamp_pulls_far_values_in() {
        let p = clamp(
            -1e9,
            1e9,
            ASSIST_HANDLE_SIZE,
            AnchorMode::TopLeft,
            VP,
            SAFE_ZONE,
        );
        assert_eq!(p, Position::new(12.0, 844.0 - 90.0 - 48.0));
    }

    #[test]
    fn tiny_viewport_pins_to_minimum() {
        let p = clamp(
            100.0,
            100.0,
            ASSIST_HANDLE_SIZE,
            AnchorMode::TopLeft,
            Viewport::new(40.0, 100.0),
            SAFE_ZONE,
        );
        assert_eq!(p, Position::new(12.0, 60.0));
    }

    #[test]
    fn small_wiggle_is_a_tap() {
        let mut h = handle_at(100.0, 200.0);
        h.begin_drag(Point::new(110.0, 210.0));
        assert_eq!(h.update_drag(Point::new(114.0, 206.0), VP, SAFE_ZONE), None);
        assert!(!h.is_dragging());
        assert_eq!(h.end_drag(), Some(DragRelease::Tap));
        assert_eq!(h.position(), Position::new(100.0, 200.0));
        assert!(!h.has_session());
    }

    #[test]
    fn crossing_threshold_moves_and_latches() {
        let mut h = handle_at(100.0, 200.0);
        h.begin_drag(Point::new(110.0, 210.0));
        let moved = h.update_drag(Point::new(130.0, 210.0), VP, SAFE_ZONE);
        assert_eq!(moved, Some(Position::new(120.0, 200.0)));
        assert!(h.is_dragging());
        // Coming back near the start does not turn it back into a tap
        let back = h.update_drag(Point::new(111.0, 210.0), VP, SAFE_ZONE);
        assert_eq!(back, Some(Position::new(101.0, 200.0)));
        assert_eq!(
            h.end_drag(),
            Some(DragRelease::Dropped(Position::new(101.0, 200.0)))
        );
    }

    #[test]
    fn exact_threshold_counts_as_drag() {
        let mut h = handle_at(100.0, 200.0);
        h.begin_drag(Point::new(100.0, 200.0));
        assert!(h.update_drag(Point::new(100.0, 205.0), VP, SAFE_ZONE).is_some());
    }

    #[test]
    fn drag_is_clamped_to_safe_zone() {
        let mut h = handle_at(100.0, 200.0);
        h.begin_drag(Point::new(100.0, 200.0));
        let p = h.update_drag(Point::new(-500.0, -500.0), VP, SAFE_ZONE).unwrap();
        assert_eq!(p, Position::new(12.0, 60.0));
    }

    #[test]
    fn end_without_begin_is_none() {
        let mut h = handle_at(100.0, 200.0);
        assert_eq!(h.end_drag(), None);
        assert_eq!(h.update_drag(Point::new(0.0, 0.0), VP, SAFE_ZONE), None);
    }

    #[test]
    fn center_anchor_hit_test() {
        let m = Draggable::new(
            Position::new(200.0, 300.0),
            MACRO_TARGET_SIZE,
            AnchorMode::Center,
        );
        assert!(m.contains(Point::new(200.0, 300.0)));
        assert!(m.contains(Point::new(173.0, 273.0)));
        assert!(!m.contains(Point::new(229.0, 300.0)));
    }

    #[test]
    fn reclamp_after_viewport_shrinks() {
        let mut h = handle_at(330.0, 700.0);
        assert!(!h.reclamp(VP, SAFE_ZONE));
        assert!(h.reclamp(Viewport::new(320.0, 568.0), SAFE_ZONE));
        assert_eq!(h.position(), Position::new(320.0 - 12.0 - 48.0, 568.0 - 90.0 - 48.0));
    }
}
