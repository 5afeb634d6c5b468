//! Pointer normalization.
//!
//! Touch and mouse input arrive in different shapes; both collapse to a
//! single [`PointerEvent`] carrying one point in logical pixels.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::overlay::Viewport;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Touch,
    Mouse,
}

/// Input as delivered by the host, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum RawPointer {
    /// Active touch points plus the points that changed in this event.
    /// A touch-end carries no active points, only changed ones.
    Touch {
        touches: Vec<Point>,
        changed: Vec<Point>,
    },
    Mouse { x: f64, y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub point: Point,
    pub source: PointerSource,
}

impl PointerEvent {
    /// One reading per event: the first active touch, else the first changed
    /// touch, else the mouse position. `None` when a touch event carries no
    /// points at all.
    pub fn normalize(phase: PointerPhase, raw: &RawPointer) -> Option<Self> {
        let (point, source) = match raw {
            RawPointer::Touch { touches, changed } => {
                let p = touches.first().or_else(|| changed.first())?;
                (*p, PointerSource::Touch)
            }
            RawPointer::Mouse { x, y } => (Point::new(*x, *y), PointerSource::Mouse),
        };
        Some(Self {
            phase,
            point,
            source,
        })
    }

    /// Map a terminal mouse event. Only the primary button takes part in
    /// gestures.
    pub fn from_mouse(ev: &MouseEvent, metrics: &CellMetrics) -> Option<Self> {
        let phase = match ev.kind {
            MouseEventKind::Down(MouseButton::Left) => PointerPhase::Down,
            MouseEventKind::Drag(MouseButton::Left) => PointerPhase::Move,
            MouseEventKind::Up(MouseButton::Left) => PointerPhase::Up,
            _ => return None,
        };
        let p = metrics.cell_center(ev.column, ev.row);
        Self::normalize(phase, &RawPointer::Mouse { x: p.x, y: p.y })
    }
}

/// Logical pixel size of one terminal cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub cell_width: f64,
    pub cell_height: f64,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            cell_width: 8.0,
            cell_height: 16.0,
        }
    }
}

/// A rectangle in terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub col: u16,
    pub row: u16,
    pub width: u16,
    pub height: u16,
}

impl CellRect {
    pub fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.col
            && row >= self.row
            && u32::from(col) < u32::from(self.col) + u32::from(self.width)
            && u32::from(row) < u32::from(self.row) + u32::from(self.height)
    }
}

impl CellMetrics {
    pub fn new(cell_width: f64, cell_height: f64) -> Self {
        Self {
            cell_width,
            cell_height,
        }
    }

    pub fn cell_center(&self, col: u16, row: u16) -> Point {
        Point::new(
            (f64::from(col) + 0.5) * self.cell_width,
            (f64::from(row) + 0.5) * self.cell_height,
        )
    }

    pub fn viewport(&self, cols: u16, rows: u16) -> Viewport {
        Viewport::new(
            f64::from(cols) * self.cell_width,
            f64::from(rows) * self.cell_height,
        )
    }

    /// Cells covered by a pixel rectangle, at least one cell in each axis
    pub fn to_cells(&self, x: f64, y: f64, width: f64, height: f64) -> CellRect {
        let col = (x / self.cell_width).floor().max(0.0);
        let row = (y / self.cell_height).floor().max(0.0);
        let right = ((x + width) / self.cell_width).ceil();
        let bottom = ((y + height) / self.cell_height).ceil();
        CellRect {
            col: col as u16,
            row: row as u16,
            width: (right - col).max(1.0) as u16,
            height: (bottom - row).max(1.0) as u16,
        }
    }
}
