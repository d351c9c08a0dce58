//! Layout saving to JSON files

use crate::format::{LayoutDef, LayoutFile, PlacedKind, SpotDef, StreetDef};
use lotline_core::Result;
use lotline_model::{ElementKind, LotModel};
use std::fs;
use std::path::Path;

/// Save a model to a layout file
pub fn save_layout<P: AsRef<Path>>(path: P, model: &LotModel) -> Result<()> {
    let content = save_layout_string(model)?;
    fs::write(path, content)?;
    Ok(())
}

/// Save a model to a JSON string
pub fn save_layout_string(model: &LotModel) -> Result<String> {
    let file = model_to_layout_file(model);
    let content = serde_json::to_string_pretty(&file)?;
    Ok(content)
}

/// Convert a LotModel to a layout document, recomputing the spot counters
pub fn model_to_layout_file(model: &LotModel) -> LayoutFile {
    let mut spots = Vec::new();
    let mut streets = Vec::new();

    for e in model.iter() {
        match e.kind {
            ElementKind::Street {
                has_entrance,
                has_exit,
            } => streets.push(StreetDef {
                id: e.id.raw(),
                x: e.x,
                y: e.y,
                width: e.width,
                height: e.height,
                rotation: e.rotation,
                has_entrance,
                has_exit,
            }),
            ElementKind::Spot { status } => spots.push(SpotDef {
                status,
                ..placed_def(e, PlacedKind::Spot)
            }),
            ElementKind::Sign { sign } => spots.push(SpotDef {
                sign: Some(sign),
                ..placed_def(e, PlacedKind::Sign)
            }),
            // Vehicles are staging props for the 3D preview, never persisted
            ElementKind::Vehicle => {}
        }
    }

    LayoutFile {
        spots,
        layout: LayoutDef {
            width: model.layout_width,
            height: model.layout_height,
            background_color: model.background_color.clone(),
            streets,
        },
        total_spots: model.total_spots(),
        available_spots: model.available_spots(),
    }
}

fn placed_def(e: &lotline_model::Element, kind: PlacedKind) -> SpotDef {
    SpotDef {
        id: e.id.raw(),
        x: e.x,
        y: e.y,
        width: e.width,
        height: e.height,
        rotation: e.rotation,
        kind,
        status: Default::default(),
        sign: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_layout_string;
    use lotline_model::{Element, SpotStatus};

    #[test]
    fn test_save_recomputes_counters() {
        let mut model = LotModel::new();
        let a = model.add(Element::new(ElementKind::spot(), 100.0, 100.0));
        model.add(Element::new(ElementKind::spot(), 200.0, 100.0));
        model.add(Element::new(ElementKind::street(), 400.0, 400.0));
        model.set_status(a, SpotStatus::Reserved);

        let file = model_to_layout_file(&model);
        assert_eq!(file.total_spots, 2);
        assert_eq!(file.available_spots, 1);
        assert_eq!(file.spots.len(), 2);
        assert_eq!(file.layout.streets.len(), 1);
    }

    #[test]
    fn test_vehicles_are_not_persisted() {
        let mut model = LotModel::new();
        model.add(Element::new(ElementKind::spot(), 0.0, 0.0));
        model.add(Element::new(ElementKind::Vehicle, 200.0, 200.0));

        let json = save_layout_string(&model).unwrap();
        assert!(!json.contains("vehicle"));

        let (reloaded, file) = load_layout_string(&json).unwrap();
        assert_eq!(file.spots.len(), 1);
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_save_then_load_preserves_model() {
        let mut model = LotModel::new();
        model.layout_width = 1500.0;
        let spot =
            model.add(Element::new(ElementKind::spot(), 120.0, 240.0));
        model.rotate_to(spot, 0.5);
        model.add(Element::new(ElementKind::street(), 600.0, 300.0));

        let json = save_layout_string(&model).unwrap();
        let (reloaded, _) = load_layout_string(&json).unwrap();

        assert_eq!(reloaded.len(), model.len());
        assert_eq!(reloaded.layout_width, 1500.0);
        let original = model.get(spot).unwrap();
        let loaded = reloaded.get(spot).unwrap();
        assert_eq!(loaded.x, original.x);
        assert_eq!(loaded.rotation, original.rotation);
        assert_eq!(loaded.kind, original.kind);
    }
}
