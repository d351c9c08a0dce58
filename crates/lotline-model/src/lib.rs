//! Lotline Model - Placeable elements and the mutation/event surface
//!
//! The model is a flat, ordered collection of placeable elements (parking
//! spots, streets, signs, vehicles). Every successful mutation notifies
//! registered observers exactly once; mutations addressed to ids that no
//! longer exist are silent no-ops, which is how a delete racing an active
//! gesture resolves.

mod element;
mod model;

pub use element::{reserve_ids_through, Element, ElementKind, SignKind, SpotStatus};
pub use lotline_core::ElementId;
pub use model::{LotModel, ModelEvent, StreetFlag};
