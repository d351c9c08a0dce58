//! Gesture state machine for the plan view

use lotline_core::{
    rotate_by, rotated_corners, snap_to_grid, Vec2, DEFAULT_GRID_SIZE, MIN_ELEMENT_LENGTH,
    MIN_ELEMENT_WIDTH,
};
use lotline_model::{Element, ElementId, ElementKind, LotModel};

/// Minimum element width a resize can reach
pub const MIN_STREET_WIDTH: f32 = MIN_ELEMENT_WIDTH;
/// Minimum element length a resize can reach
pub const MIN_STREET_LENGTH: f32 = MIN_ELEMENT_LENGTH;
/// Keyboard nudge distance, in layout units
pub const NUDGE_STEP: f32 = 10.0;

/// Pick radius around a corner handle, in layout units
const HANDLE_RADIUS: f32 = 10.0;

/// Editor behavior knobs
#[derive(Clone, Copy, Debug)]
pub struct EditorConfig {
    pub grid_size: f32,
    pub snap_enabled: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            snap_enabled: true,
        }
    }
}

/// Which handle a resize gesture grabbed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeDirection {
    East,
    West,
    North,
    South,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeDirection {
    /// Per-axis delta signs: how cursor movement maps onto width/length growth
    fn signs(&self) -> (f32, f32) {
        match self {
            Self::East => (1.0, 0.0),
            Self::West => (-1.0, 0.0),
            Self::North => (0.0, -1.0),
            Self::South => (0.0, 1.0),
            Self::NorthEast => (1.0, -1.0),
            Self::NorthWest => (-1.0, -1.0),
            Self::SouthEast => (1.0, 1.0),
            Self::SouthWest => (-1.0, 1.0),
        }
    }
}

/// Where the controller is in a gesture
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureState {
    Idle,
    Dragging {
        id: ElementId,
        grab_offset: Vec2,
    },
    Resizing {
        id: ElementId,
        direction: ResizeDirection,
        start_size: Vec2,
        start_cursor: Vec2,
    },
    Selected {
        id: ElementId,
    },
    Panning {
        last_cursor: Vec2,
    },
}

/// Keys the controller understands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorKey {
    Left,
    Right,
    Up,
    Down,
    RotateCw,
    RotateCcw,
    Delete,
}

/// The plan-view interaction controller.
///
/// Cursor positions are in layout coordinates; the caller applies the
/// view offset when converting from screen space. An element deleted
/// out from under an active gesture makes the rest of the gesture a
/// silent no-op.
pub struct EditorController {
    state: GestureState,
    pub config: EditorConfig,
    pub view_offset: Vec2,
    // Click-vs-drag bookkeeping: a press-release on the already selected
    // element with no movement in between toggles the selection off.
    pressed_selected: bool,
    gesture_moved: bool,
}

impl Default for EditorController {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorController {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
            config: EditorConfig::default(),
            view_offset: Vec2::ZERO,
            pressed_selected: false,
            gesture_moved: false,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn selected(&self) -> Option<ElementId> {
        match self.state {
            GestureState::Selected { id }
            | GestureState::Dragging { id, .. }
            | GestureState::Resizing { id, .. } => Some(id),
            _ => None,
        }
    }

    fn snap(&self, v: f32) -> f32 {
        if self.config.snap_enabled {
            snap_to_grid(v, self.config.grid_size)
        } else {
            v
        }
    }

    /// Pointer press: grab a handle, an element body, or the canvas.
    pub fn press(&mut self, model: &LotModel, cursor: Vec2) {
        let previous = self.selected();
        self.pressed_selected = false;
        self.gesture_moved = false;
        // Topmost element wins, so walk draw order back to front.
        let elements: Vec<&Element> = model.iter().collect();
        for e in elements.iter().rev() {
            if let Some(direction) = handle_at(e, cursor) {
                self.state = GestureState::Resizing {
                    id: e.id,
                    direction,
                    start_size: Vec2::new(e.width, e.height),
                    start_cursor: cursor,
                };
                return;
            }
            if hit_body(e, cursor) {
                self.pressed_selected = previous == Some(e.id);
                self.state = GestureState::Dragging {
                    id: e.id,
                    grab_offset: cursor - e.center(),
                };
                return;
            }
        }
        self.state = GestureState::Panning {
            last_cursor: cursor,
        };
    }

    /// Pointer move with the button held.
    pub fn drag(&mut self, model: &mut LotModel, cursor: Vec2) {
        match self.state {
            GestureState::Dragging { id, grab_offset } => {
                self.gesture_moved = true;
                if model.get(id).is_none() {
                    self.state = GestureState::Idle;
                    return;
                }
                let target = cursor - grab_offset;
                model.move_to(id, self.snap(target.x), self.snap(target.y));
            }
            GestureState::Resizing {
                id,
                direction,
                start_size,
                start_cursor,
            } => {
                self.gesture_moved = true;
                if model.get(id).is_none() {
                    self.state = GestureState::Idle;
                    return;
                }
                let delta = cursor - start_cursor;
                let (sx, sy) = direction.signs();
                let width = (start_size.x + sx * delta.x).max(MIN_STREET_WIDTH);
                let height = (start_size.y + sy * delta.y).max(MIN_STREET_LENGTH);
                model.resize_to(id, width, height);
            }
            GestureState::Panning { last_cursor } => {
                // Shifting the offset shifts the caller's screen-to-layout
                // conversion by the same delta, so the stored cursor stays
                // valid unchanged.
                self.view_offset = self.view_offset + (cursor - last_cursor);
            }
            _ => {}
        }
    }

    /// Pointer release: commit the gesture. A plain click on the element
    /// that was already selected deselects it.
    pub fn release(&mut self, model: &LotModel) {
        self.state = match self.state {
            GestureState::Dragging { id, .. } => {
                if model.get(id).is_none() {
                    GestureState::Idle
                } else if self.pressed_selected && !self.gesture_moved {
                    GestureState::Idle
                } else {
                    GestureState::Selected { id }
                }
            }
            GestureState::Resizing { id, .. } => {
                if model.get(id).is_some() {
                    GestureState::Selected { id }
                } else {
                    GestureState::Idle
                }
            }
            GestureState::Panning { .. } => GestureState::Idle,
            other => other,
        };
    }

    /// Keyboard input; only acts on a selected element.
    pub fn key(&mut self, model: &mut LotModel, key: EditorKey) {
        let GestureState::Selected { id } = self.state else {
            return;
        };
        let Some(e) = model.get(id) else {
            self.state = GestureState::Idle;
            return;
        };
        let (x, y, rotation) = (e.x, e.y, e.rotation);

        match key {
            EditorKey::Left => model.move_to(id, x - NUDGE_STEP, y),
            EditorKey::Right => model.move_to(id, x + NUDGE_STEP, y),
            EditorKey::Up => model.move_to(id, x, y - NUDGE_STEP),
            EditorKey::Down => model.move_to(id, x, y + NUDGE_STEP),
            EditorKey::RotateCw => model.rotate_to(id, rotate_by(rotation, 1)),
            EditorKey::RotateCcw => model.rotate_to(id, rotate_by(rotation, -1)),
            EditorKey::Delete => {
                model.remove(id);
                self.state = GestureState::Idle;
            }
        }
    }

    /// Palette drop: place a new element at the cursor, snapped when
    /// snapping is on, and select it.
    pub fn drop_new(&mut self, model: &mut LotModel, kind: ElementKind, cursor: Vec2) -> ElementId {
        let element = Element::new(kind, self.snap(cursor.x), self.snap(cursor.y));
        let id = model.add(element);
        self.state = GestureState::Selected { id };
        id
    }

    /// Clear the selection without touching the model.
    pub fn deselect(&mut self) {
        if matches!(self.state, GestureState::Selected { .. }) {
            self.state = GestureState::Idle;
        }
    }
}

/// Test the cursor against an element's rotated body.
fn hit_body(e: &Element, cursor: Vec2) -> bool {
    // Undo the element's rotation around its center, then box-test.
    let local = to_local(e, cursor);
    local.x.abs() <= e.width / 2.0 && local.y.abs() <= e.height / 2.0
}

/// Test the cursor against the element's corner handles.
fn handle_at(e: &Element, cursor: Vec2) -> Option<ResizeDirection> {
    let corners = rotated_corners(&e.footprint());
    let directions = [
        ResizeDirection::NorthWest,
        ResizeDirection::NorthEast,
        ResizeDirection::SouthEast,
        ResizeDirection::SouthWest,
    ];
    for (corner, direction) in corners.iter().zip(directions) {
        if (cursor - *corner).length() <= HANDLE_RADIUS {
            return Some(direction);
        }
    }
    None
}

fn to_local(e: &Element, p: Vec2) -> Vec2 {
    let d = p - e.center();
    let (sin, cos) = (-e.rotation).sin_cos();
    Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotline_core::ROTATION_STEP;

    fn spot_at(model: &mut LotModel, x: f32, y: f32) -> ElementId {
        model.add(Element::new(ElementKind::spot(), x, y))
    }

    #[test]
    fn test_press_body_starts_drag() {
        let mut model = LotModel::new();
        let id = spot_at(&mut model, 100.0, 100.0);
        let mut ctl = EditorController::new();

        ctl.press(&model, Vec2::new(110.0, 120.0));
        assert!(matches!(ctl.state(), GestureState::Dragging { id: d, .. } if d == id));
    }

    #[test]
    fn test_drag_snaps_to_grid() {
        let mut model = LotModel::new();
        let id = spot_at(&mut model, 50.0, 50.0);
        let mut ctl = EditorController::new();

        // Grab at the center, wiggle by less than half a grid cell.
        ctl.press(&model, Vec2::new(50.0, 50.0));
        ctl.drag(&mut model, Vec2::new(73.0, 46.0));
        let e = model.get(id).unwrap();
        assert_eq!((e.x, e.y), (50.0, 50.0));

        // A move past the midpoint lands on the next line.
        ctl.drag(&mut model, Vec2::new(80.0, 46.0));
        let e = model.get(id).unwrap();
        assert_eq!((e.x, e.y), (100.0, 50.0));
    }

    #[test]
    fn test_drag_unsnapped_follows_cursor() {
        let mut model = LotModel::new();
        let id = spot_at(&mut model, 50.0, 50.0);
        let mut ctl = EditorController::new();
        ctl.config.snap_enabled = false;

        ctl.press(&model, Vec2::new(60.0, 50.0));
        ctl.drag(&mut model, Vec2::new(83.0, 46.0));
        let e = model.get(id).unwrap();
        assert_eq!((e.x, e.y), (73.0, 46.0));
    }

    #[test]
    fn test_resize_floors_hold_under_large_negative_deltas() {
        let mut model = LotModel::new();
        let id = model.add(
            Element::new(ElementKind::street(), 200.0, 200.0).with_size(80.0, 300.0),
        );
        let mut ctl = EditorController::new();

        // Grab the south-east corner handle.
        let corners = rotated_corners(&model.get(id).unwrap().footprint());
        ctl.press(&model, corners[2]);
        assert!(matches!(ctl.state(), GestureState::Resizing { .. }));

        ctl.drag(&mut model, corners[2] - Vec2::new(10_000.0, 10_000.0));
        let e = model.get(id).unwrap();
        assert_eq!(e.width, MIN_STREET_WIDTH);
        assert_eq!(e.height, MIN_STREET_LENGTH);
    }

    #[test]
    fn test_release_selects_then_keys_apply() {
        let mut model = LotModel::new();
        let id = spot_at(&mut model, 100.0, 100.0);
        let mut ctl = EditorController::new();

        ctl.press(&model, Vec2::new(100.0, 100.0));
        ctl.release(&model);
        assert_eq!(ctl.state(), GestureState::Selected { id });

        ctl.key(&mut model, EditorKey::Right);
        ctl.key(&mut model, EditorKey::Up);
        let e = model.get(id).unwrap();
        assert_eq!((e.x, e.y), (110.0, 90.0));
    }

    #[test]
    fn test_click_on_selected_element_deselects() {
        let mut model = LotModel::new();
        let id = spot_at(&mut model, 100.0, 100.0);
        let mut ctl = EditorController::new();

        // First click selects.
        ctl.press(&model, Vec2::new(100.0, 100.0));
        ctl.release(&model);
        assert_eq!(ctl.state(), GestureState::Selected { id });

        // Second click on the same element toggles the selection off.
        ctl.press(&model, Vec2::new(100.0, 100.0));
        ctl.release(&model);
        assert_eq!(ctl.state(), GestureState::Idle);

        // A real drag re-selects and stays selected on release.
        ctl.press(&model, Vec2::new(100.0, 100.0));
        ctl.release(&model);
        ctl.press(&model, Vec2::new(100.0, 100.0));
        ctl.drag(&mut model, Vec2::new(150.0, 100.0));
        ctl.release(&model);
        assert_eq!(ctl.state(), GestureState::Selected { id });
    }

    #[test]
    fn test_rotate_keys_are_inverse() {
        let mut model = LotModel::new();
        let id = spot_at(&mut model, 100.0, 100.0);
        let mut ctl = EditorController::new();
        ctl.press(&model, Vec2::new(100.0, 100.0));
        ctl.release(&model);

        ctl.key(&mut model, EditorKey::RotateCw);
        let e = model.get(id).unwrap();
        assert!((e.rotation - ROTATION_STEP).abs() < 1e-6);

        ctl.key(&mut model, EditorKey::RotateCcw);
        let e = model.get(id).unwrap();
        assert!(e.rotation.abs() < 1e-6);
    }

    #[test]
    fn test_delete_key_removes_and_idles() {
        let mut model = LotModel::new();
        let id = spot_at(&mut model, 100.0, 100.0);
        let mut ctl = EditorController::new();
        ctl.press(&model, Vec2::new(100.0, 100.0));
        ctl.release(&model);

        ctl.key(&mut model, EditorKey::Delete);
        assert!(model.get(id).is_none());
        assert_eq!(ctl.state(), GestureState::Idle);
    }

    #[test]
    fn test_delete_mid_drag_is_silent() {
        let mut model = LotModel::new();
        let id = spot_at(&mut model, 100.0, 100.0);
        let mut ctl = EditorController::new();

        ctl.press(&model, Vec2::new(100.0, 100.0));
        model.remove(id);

        // The rest of the gesture does nothing and lands in Idle.
        ctl.drag(&mut model, Vec2::new(300.0, 300.0));
        assert_eq!(ctl.state(), GestureState::Idle);
        ctl.release(&model);
        assert_eq!(ctl.state(), GestureState::Idle);
        assert!(model.is_empty());
    }

    #[test]
    fn test_pan_moves_view_not_elements() {
        let mut model = LotModel::new();
        let id = spot_at(&mut model, 100.0, 100.0);
        let mut ctl = EditorController::new();

        ctl.press(&model, Vec2::new(500.0, 500.0));
        assert!(matches!(ctl.state(), GestureState::Panning { .. }));

        ctl.drag(&mut model, Vec2::new(540.0, 470.0));
        assert_eq!(ctl.view_offset, Vec2::new(40.0, -30.0));
        let e = model.get(id).unwrap();
        assert_eq!((e.x, e.y), (100.0, 100.0));

        ctl.release(&model);
        assert_eq!(ctl.state(), GestureState::Idle);
    }

    #[test]
    fn test_drop_new_snaps_and_selects() {
        let mut model = LotModel::new();
        let mut ctl = EditorController::new();

        let id = ctl.drop_new(&mut model, ElementKind::street(), Vec2::new(173.0, 226.0));
        let e = model.get(id).unwrap();
        assert_eq!((e.x, e.y), (150.0, 250.0));
        assert_eq!((e.width, e.height), (80.0, 300.0));
        assert_eq!(ctl.state(), GestureState::Selected { id });
    }

    #[test]
    fn test_topmost_element_wins() {
        let mut model = LotModel::new();
        let _bottom = spot_at(&mut model, 100.0, 100.0);
        let top = spot_at(&mut model, 110.0, 100.0);
        let mut ctl = EditorController::new();

        ctl.press(&model, Vec2::new(105.0, 100.0));
        assert!(matches!(ctl.state(), GestureState::Dragging { id, .. } if id == top));
    }
}
