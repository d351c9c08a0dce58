//! Lotline Layout - The persistent layout document
//!
//! Defines the JSON layout format (camelCase on the wire), conversion to
//! and from the live [`LotModel`](lotline_model::LotModel), and file
//! load/save helpers.

mod format;
mod loader;
mod saver;

pub use format::{LayoutDef, LayoutFile, PlacedKind, SpotDef, StreetDef};
pub use loader::{layout_file_to_model, load_layout, load_layout_string};
pub use saver::{model_to_layout_file, save_layout, save_layout_string};
