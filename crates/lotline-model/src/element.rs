//! Placeable element records

use lotline_core::{ElementId, Footprint, Vec2};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Ids handed to freshly placed elements. Layout files carry their own
/// ids; [`reserve_ids_through`] keeps this allocator ahead of them.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> ElementId {
    ElementId::from_raw(NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Bump the id allocator past `raw`, so ids already present in a loaded
/// layout are never handed out again.
pub fn reserve_ids_through(raw: u64) {
    let mut current = NEXT_ID.load(Ordering::Relaxed);
    while current <= raw {
        match NEXT_ID.compare_exchange_weak(current, raw + 1, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => break,
            Err(observed) => current = observed,
        }
    }
}

/// Occupancy status of a parking spot
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
}

/// Traffic sign variants
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignKind {
    #[default]
    Stop,
    Yield,
    OneWay,
    NoParking,
}

/// What kind of element this is, plus its kind-specific state
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ElementKind {
    Spot { status: SpotStatus },
    Street { has_entrance: bool, has_exit: bool },
    Sign { sign: SignKind },
    Vehicle,
}

impl ElementKind {
    pub fn spot() -> Self {
        Self::Spot {
            status: SpotStatus::Available,
        }
    }

    pub fn street() -> Self {
        Self::Street {
            has_entrance: false,
            has_exit: false,
        }
    }

    pub fn sign(sign: SignKind) -> Self {
        Self::Sign { sign }
    }

    /// Default footprint dimensions for a freshly placed element
    pub fn default_size(&self) -> (f32, f32) {
        match self {
            Self::Spot { .. } => (60.0, 120.0),
            Self::Street { .. } => (80.0, 300.0),
            Self::Sign { .. } => (40.0, 40.0),
            Self::Vehicle => (50.0, 100.0),
        }
    }
}

/// A placeable element: center position, extents, and rotation on the
/// layout plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Rotation about the center, in radians
    pub rotation: f32,
}

impl Element {
    /// Create an element of the given kind at a position, using the kind's
    /// default size.
    pub fn new(kind: ElementKind, x: f32, y: f32) -> Self {
        let (width, height) = kind.default_size();
        Self {
            id: next_id(),
            kind,
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.center(), self.width, self.height, self.rotation)
    }

    pub fn is_spot(&self) -> bool {
        matches!(self.kind, ElementKind::Spot { .. })
    }

    pub fn status(&self) -> Option<SpotStatus> {
        match self.kind {
            ElementKind::Spot { status } => Some(status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sizes() {
        assert_eq!(ElementKind::spot().default_size(), (60.0, 120.0));
        assert_eq!(ElementKind::street().default_size(), (80.0, 300.0));
    }

    #[test]
    fn test_new_element_uses_kind_size() {
        let e = Element::new(ElementKind::street(), 100.0, 150.0);
        assert_eq!(e.width, 80.0);
        assert_eq!(e.height, 300.0);
        assert_eq!(e.rotation, 0.0);
        assert_eq!(e.center(), Vec2::new(100.0, 150.0));
    }

    #[test]
    fn test_fresh_ids_are_unique() {
        let a = Element::new(ElementKind::spot(), 0.0, 0.0);
        let b = Element::new(ElementKind::spot(), 0.0, 0.0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_reserved_ids_are_skipped() {
        reserve_ids_through(100_000);
        let e = Element::new(ElementKind::spot(), 0.0, 0.0);
        assert!(e.id.raw() > 100_000);
    }

    #[test]
    fn test_status_only_on_spots() {
        let spot = Element::new(ElementKind::spot(), 0.0, 0.0);
        assert_eq!(spot.status(), Some(SpotStatus::Available));
        let street = Element::new(ElementKind::street(), 0.0, 0.0);
        assert_eq!(street.status(), None);
    }
}
