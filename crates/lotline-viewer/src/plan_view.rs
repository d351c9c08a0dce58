//! 2D plan view: egui-painted top-down editing surface
//!
//! Pointer positions are converted to layout coordinates before they reach
//! the [`EditorController`]; panning is a view offset applied during that
//! conversion, so it never touches the model.

use egui::{Color32, Pos2, Rect, Sense, Shape, Stroke, Vec2 as EguiVec2};
use lotline_core::{rotated_corners, Color, Footprint, Vec2};
use lotline_editor::EditorController;
use lotline_model::{Element, ElementKind, LotModel, SignKind};
use lotline_render::status_color;

const PLAN_MARGIN: f32 = 20.0;
const HANDLE_SIZE: f32 = 8.0;
const MARKER_RADIUS: f32 = 5.0;

pub fn show(
    ui: &mut egui::Ui,
    model: &mut LotModel,
    editor: &mut EditorController,
    pending: &mut Option<ElementKind>,
) {
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
    let rect = response.rect;

    let scale = ((rect.width() - 2.0 * PLAN_MARGIN) / model.layout_width)
        .min((rect.height() - 2.0 * PLAN_MARGIN) / model.layout_height)
        .max(0.05);
    let origin = rect.min + EguiVec2::splat(PLAN_MARGIN);

    let view_offset = editor.view_offset;
    let to_screen = |p: Vec2| -> Pos2 {
        Pos2::new(
            origin.x + (p.x + view_offset.x) * scale,
            origin.y + (p.y + view_offset.y) * scale,
        )
    };
    let to_layout = |p: Pos2| -> Vec2 {
        Vec2::new(
            (p.x - origin.x) / scale - view_offset.x,
            (p.y - origin.y) / scale - view_offset.y,
        )
    };

    if let Some(pos) = response.interact_pointer_pos() {
        let cursor = to_layout(pos);
        if response.drag_started() {
            match pending.take() {
                Some(kind) => {
                    editor.drop_new(model, kind, cursor);
                }
                None => editor.press(model, cursor),
            }
        } else if response.dragged() {
            editor.drag(model, cursor);
        }
        if response.drag_stopped() {
            editor.release(model);
        }
        if response.clicked() {
            match pending.take() {
                Some(kind) => {
                    editor.drop_new(model, kind, cursor);
                }
                None => {
                    editor.press(model, cursor);
                    editor.release(model);
                }
            }
        }
    }

    // Layout surface
    let layout_rect = Rect::from_min_max(
        to_screen(Vec2::ZERO),
        to_screen(Vec2::new(model.layout_width, model.layout_height)),
    );
    painter.rect_filled(layout_rect, 0.0, parse_hex(&model.background_color));
    painter.rect_stroke(layout_rect, 0.0, Stroke::new(1.0, Color32::DARK_GRAY));

    // Grid lines at the snap spacing
    let step = editor.config.grid_size;
    if step > 1.0 {
        let grid_stroke = Stroke::new(1.0, Color32::from_gray(170));
        let mut x = 0.0;
        while x <= model.layout_width {
            painter.line_segment(
                [to_screen(Vec2::new(x, 0.0)), to_screen(Vec2::new(x, model.layout_height))],
                grid_stroke,
            );
            x += step;
        }
        let mut y = 0.0;
        while y <= model.layout_height {
            painter.line_segment(
                [to_screen(Vec2::new(0.0, y)), to_screen(Vec2::new(model.layout_width, y))],
                grid_stroke,
            );
            y += step;
        }
    }

    let selected = editor.selected();
    for element in model.iter() {
        let corners = rotated_corners(&element.footprint());
        let points: Vec<Pos2> = corners.iter().map(|c| to_screen(*c)).collect();
        let stroke = if selected == Some(element.id) {
            Stroke::new(2.0, Color32::YELLOW)
        } else {
            Stroke::new(1.0, Color32::WHITE)
        };
        painter.add(Shape::convex_polygon(points, element_fill(element), stroke));

        if let ElementKind::Street {
            has_entrance,
            has_exit,
        } = element.kind
        {
            let offset = element.height / 2.0 - 10.0;
            if has_entrance {
                let pos = street_end(element, offset);
                painter.circle_filled(to_screen(pos), MARKER_RADIUS, hex32(0x3498db));
            }
            if has_exit {
                let pos = street_end(element, -offset);
                painter.circle_filled(to_screen(pos), MARKER_RADIUS, hex32(0xe74c3c));
            }
        }

        if selected == Some(element.id) {
            for corner in corners {
                let handle =
                    Rect::from_center_size(to_screen(corner), EguiVec2::splat(HANDLE_SIZE));
                painter.rect_filled(handle, 1.0, Color32::WHITE);
                painter.rect_stroke(handle, 1.0, Stroke::new(1.0, Color32::BLACK));
            }
        }
    }

    // Ghost outline of the element about to be placed
    if let (Some(kind), Some(pos)) = (pending.as_ref(), response.hover_pos()) {
        let (width, height) = kind.default_size();
        let ghost = Footprint::new(to_layout(pos), width, height, 0.0);
        let points: Vec<Pos2> = rotated_corners(&ghost).iter().map(|c| to_screen(*c)).collect();
        painter.add(Shape::convex_polygon(
            points,
            Color32::from_white_alpha(40),
            Stroke::new(1.0, Color32::GRAY),
        ));
    }
}

/// Point along a street's long axis, `offset` layout units from the center
fn street_end(element: &Element, offset: f32) -> Vec2 {
    Vec2::new(
        element.x - element.rotation.sin() * offset,
        element.y + element.rotation.cos() * offset,
    )
}

fn element_fill(element: &Element) -> Color32 {
    match element.kind {
        ElementKind::Spot { .. } => to_color32(status_color(element.status())),
        ElementKind::Street { .. } => hex32(0x444444),
        ElementKind::Sign { sign } => match sign {
            SignKind::Stop => hex32(0xe74c3c),
            SignKind::Yield => hex32(0xf1c40f),
            SignKind::OneWay => hex32(0x3498db),
            SignKind::NoParking => hex32(0xe67e22),
        },
        ElementKind::Vehicle => hex32(0x2c3e50),
    }
}

fn to_color32(c: Color) -> Color32 {
    Color32::from_rgb(
        (c.r * 255.0) as u8,
        (c.g * 255.0) as u8,
        (c.b * 255.0) as u8,
    )
}

fn hex32(hex: u32) -> Color32 {
    Color32::from_rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// Parse a `#rrggbb` background string, falling back to neutral gray.
fn parse_hex(s: &str) -> Color32 {
    u32::from_str_radix(s.trim_start_matches('#'), 16)
        .map(hex32)
        .unwrap_or(Color32::from_gray(0xcc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_background() {
        assert_eq!(parse_hex("#cccccc"), Color32::from_gray(0xcc));
        assert_eq!(parse_hex("2ecc71"), Color32::from_rgb(0x2e, 0xcc, 0x71));
        assert_eq!(parse_hex("not-a-color"), Color32::from_gray(0xcc));
    }

    #[test]
    fn test_street_end_follows_rotation() {
        let element = Element::new(ElementKind::street(), 100.0, 100.0);
        let end = street_end(&element, 140.0);
        assert!((end.x - 100.0).abs() < 1e-5);
        assert!((end.y - 240.0).abs() < 1e-5);

        let rotated = element.with_rotation(std::f32::consts::FRAC_PI_2);
        let end = street_end(&rotated, 140.0);
        assert!((end.x - (100.0 - 140.0)).abs() < 1e-4);
        assert!((end.y - 100.0).abs() < 1e-4);
    }
}
