//! Layout file format definitions

use lotline_model::{SignKind, SpotStatus};
use serde::{Deserialize, Serialize};

/// Kind tag for records in the `spots` array. Vehicles are preview-only
/// and never written to a layout file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacedKind {
    #[default]
    Spot,
    Sign,
}

/// The root layout document.
///
/// `total_spots` and `available_spots` are derived counters written on
/// save so consumers do not have to walk the arrays; on load the element
/// records are authoritative.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutFile {
    #[serde(default)]
    pub spots: Vec<SpotDef>,
    pub layout: LayoutDef,
    #[serde(default)]
    pub total_spots: usize,
    #[serde(default)]
    pub available_spots: usize,
}

/// A record in the `spots` array: parking spots and signs
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotDef {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Rotation in radians
    #[serde(default)]
    pub rotation: f32,
    #[serde(rename = "type", default)]
    pub kind: PlacedKind,
    #[serde(default)]
    pub status: SpotStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign: Option<SignKind>,
}

impl SpotDef {
    pub fn new(id: u64, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id,
            x,
            y,
            width,
            height,
            rotation: 0.0,
            kind: PlacedKind::Spot,
            status: SpotStatus::Available,
            sign: None,
        }
    }

    pub fn with_status(mut self, status: SpotStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }
}

/// The layout canvas: dimensions, background, and the street records
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDef {
    pub width: f32,
    pub height: f32,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default)]
    pub streets: Vec<StreetDef>,
}

fn default_background() -> String {
    "#cccccc".to_string()
}

/// A street record under `layout.streets`
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetDef {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub has_entrance: bool,
    #[serde(default)]
    pub has_exit: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let file = LayoutFile {
            spots: vec![SpotDef::new(1, 100.0, 200.0, 60.0, 120.0)],
            layout: LayoutDef {
                width: 1000.0,
                height: 800.0,
                background_color: "#cccccc".to_string(),
                streets: vec![],
            },
            total_spots: 1,
            available_spots: 1,
        };

        let json = serde_json::to_string(&file).unwrap();
        assert!(json.contains("\"totalSpots\":1"));
        assert!(json.contains("\"availableSpots\":1"));
        assert!(json.contains("\"backgroundColor\""));
        assert!(json.contains("\"type\":\"spot\""));
        assert!(json.contains("\"status\":\"available\""));
    }

    #[test]
    fn test_missing_status_defaults_to_available() {
        let json = r#"{
            "spots": [{"id": 7, "x": 0, "y": 0, "width": 60, "height": 120}],
            "layout": {"width": 1000, "height": 800}
        }"#;
        let file: LayoutFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.spots[0].status, SpotStatus::Available);
        assert_eq!(file.spots[0].kind, PlacedKind::Spot);
        assert_eq!(file.layout.background_color, "#cccccc");
        assert!(file.layout.streets.is_empty());
    }
}
