//! Layout loading from JSON files

use crate::format::{LayoutFile, PlacedKind};
use lotline_core::{
    ElementId, Result, DEFAULT_LAYOUT_HEIGHT, DEFAULT_LAYOUT_WIDTH, MIN_ELEMENT_LENGTH,
    MIN_ELEMENT_WIDTH,
};
use lotline_model::{reserve_ids_through, Element, ElementKind, LotModel, SignKind};
use std::fs;
use std::path::Path;

/// Load a layout from a JSON file
pub fn load_layout<P: AsRef<Path>>(path: P) -> Result<(LotModel, LayoutFile)> {
    let content = fs::read_to_string(path)?;
    load_layout_string(&content)
}

/// Load a layout from a JSON string
pub fn load_layout_string(content: &str) -> Result<(LotModel, LayoutFile)> {
    let file: LayoutFile = serde_json::from_str(content)?;
    let model = layout_file_to_model(&file);
    Ok((model, file))
}

/// Build a live model from a layout document.
///
/// Ids from the file are kept, and the id counter is bumped past the
/// highest one so freshly placed elements never collide.
pub fn layout_file_to_model(file: &LayoutFile) -> LotModel {
    let mut model = LotModel::new();
    model.layout_width = sane_dimension(file.layout.width, DEFAULT_LAYOUT_WIDTH);
    model.layout_height = sane_dimension(file.layout.height, DEFAULT_LAYOUT_HEIGHT);
    model.background_color = file.layout.background_color.clone();

    let mut max_id = 0u64;

    for def in &file.spots {
        max_id = max_id.max(def.id);
        let kind = match def.kind {
            PlacedKind::Spot => ElementKind::Spot { status: def.status },
            PlacedKind::Sign => ElementKind::Sign {
                sign: def.sign.unwrap_or(SignKind::Stop),
            },
        };
        let mut element = Element::new(kind, def.x, def.y)
            .with_size(
                sane_dimension(def.width, MIN_ELEMENT_WIDTH),
                sane_dimension(def.height, MIN_ELEMENT_LENGTH),
            )
            .with_rotation(def.rotation);
        element.id = ElementId::from_raw(def.id);
        model.add(element);
    }

    for def in &file.layout.streets {
        max_id = max_id.max(def.id);
        let mut element = Element::new(
            ElementKind::Street {
                has_entrance: def.has_entrance,
                has_exit: def.has_exit,
            },
            def.x,
            def.y,
        )
        .with_size(
            sane_dimension(def.width, MIN_ELEMENT_WIDTH),
            sane_dimension(def.height, MIN_ELEMENT_LENGTH),
        )
        .with_rotation(def.rotation);
        element.id = ElementId::from_raw(def.id);
        model.add(element);
    }

    reserve_ids_through(max_id);
    model
}

/// Invalid geometry in a file is corrected locally: non-finite or
/// non-positive dimensions clamp to the given floor.
fn sane_dimension(value: f32, floor: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotline_model::SpotStatus;

    #[test]
    fn test_load_round_trip_semantics() {
        let json = r##"{
            "spots": [
                {"id": 1, "x": 100, "y": 200, "width": 60, "height": 120, "status": "occupied"},
                {"id": 2, "x": 200, "y": 200, "width": 60, "height": 120}
            ],
            "layout": {
                "width": 1200,
                "height": 900,
                "backgroundColor": "#dddddd",
                "streets": [
                    {"id": 3, "x": 400, "y": 300, "width": 80, "height": 300, "hasEntrance": true}
                ]
            },
            "totalSpots": 2,
            "availableSpots": 1
        }"##;

        let (model, file) = load_layout_string(json).unwrap();
        assert_eq!(model.len(), 3);
        assert_eq!(model.layout_width, 1200.0);
        assert_eq!(model.total_spots(), 2);
        assert_eq!(model.available_spots(), 1);
        assert_eq!(file.available_spots, 1);

        let street = model.get(ElementId::from_raw(3)).unwrap();
        assert!(matches!(
            street.kind,
            ElementKind::Street {
                has_entrance: true,
                has_exit: false
            }
        ));

        let occupied = model.get(ElementId::from_raw(1)).unwrap();
        assert_eq!(occupied.status(), Some(SpotStatus::Occupied));
    }

    #[test]
    fn test_new_ids_do_not_collide_with_loaded() {
        let json = r#"{
            "spots": [{"id": 900, "x": 0, "y": 0, "width": 60, "height": 120}],
            "layout": {"width": 1000, "height": 800}
        }"#;
        let (mut model, _) = load_layout_string(json).unwrap();
        let new_id = model.add(Element::new(ElementKind::spot(), 50.0, 50.0));
        assert!(new_id.raw() > 900);
    }

    #[test]
    fn test_invalid_dimensions_clamp_to_floors() {
        let json = r#"{
            "spots": [{"id": 1, "x": 0, "y": 0, "width": -60, "height": 0}],
            "layout": {
                "width": -100,
                "height": 900,
                "streets": [{"id": 2, "x": 0, "y": 0, "width": 80, "height": -300}]
            }
        }"#;
        let (model, _) = load_layout_string(json).unwrap();

        assert_eq!(model.layout_width, 1000.0);
        assert_eq!(model.layout_height, 900.0);

        let spot = model.get(ElementId::from_raw(1)).unwrap();
        assert_eq!((spot.width, spot.height), (50.0, 100.0));
        let street = model.get(ElementId::from_raw(2)).unwrap();
        assert_eq!((street.width, street.height), (80.0, 100.0));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(load_layout_string("{not json").is_err());
    }
}
