//! Drag-to-rotate state machine
//!
//! Pointer and single-finger touch drags become incremental rotation of the
//! sphere. The controller owns only the gesture state; the rotation it
//! mutates belongs to the sphere and is borrowed per event.

use serde::{Deserialize, Serialize};

use crate::rotation::RotationState;

/// A single touch contact in surface coordinates
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

/// Pointer/touch input as forwarded by the webview
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
    /// Pointer left the render surface
    Leave,
    TouchStart { touches: Vec<TouchPoint> },
    TouchMove { touches: Vec<TouchPoint> },
    TouchEnd,
    TouchCancel,
}

/// Gesture state
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    /// Holds the last coordinate a delta was measured from
    Dragging { last_x: f32, last_y: f32 },
}

/// Converts drag gestures into rotation increments
#[derive(Clone, Debug)]
pub struct DragController {
    state: DragState,
    sensitivity: f32,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(crate::config::interaction::ROTATION_SENSITIVITY)
    }
}

impl DragController {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            state: DragState::Idle,
            sensitivity,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Feed one event. Returns `true` when `rotation` was changed and should
    /// be persisted.
    pub fn handle(&mut self, event: &PointerEvent, rotation: &mut RotationState) -> bool {
        match event {
            PointerEvent::Down { x, y } => {
                self.begin(*x, *y);
                false
            }
            PointerEvent::TouchStart { touches } => {
                if let [touch] = touches.as_slice() {
                    self.begin(touch.x, touch.y);
                }
                false
            }
            PointerEvent::Move { x, y } => self.drag_to(*x, *y, rotation),
            PointerEvent::TouchMove { touches } => match touches.as_slice() {
                [touch] => self.drag_to(touch.x, touch.y, rotation),
                _ => false,
            },
            PointerEvent::Up
            | PointerEvent::Leave
            | PointerEvent::TouchEnd
            | PointerEvent::TouchCancel => {
                self.state = DragState::Idle;
                false
            }
        }
    }

    fn begin(&mut self, x: f32, y: f32) {
        self.state = DragState::Dragging {
            last_x: x,
            last_y: y,
        };
    }

    fn drag_to(&mut self, x: f32, y: f32, rotation: &mut RotationState) -> bool {
        let DragState::Dragging { last_x, last_y } = self.state else {
            return false;
        };
        rotation.apply_drag(x - last_x, y - last_y, self.sensitivity);
        self.state = DragState::Dragging {
            last_x: x,
            last_y: y,
        };
        true
    }
}
