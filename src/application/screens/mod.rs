//! Per-screen state. Each screen owns its fields and request slots; nothing
//! is shared between screens except what navigation passes forward.

pub mod orphanages_map;
pub mod select_position;
pub mod orphanage_data;
pub mod orphanage_details;

pub use orphanages_map::*;
pub use select_position::*;
pub use orphanage_data::*;
pub use orphanage_details::*;

use crate::domain::Coordinate;

/// Progress of a single-shot device location request.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationState {
    Locating,
    Located(Coordinate),
    Failed(String),
}

impl LocationState {
    pub fn position(&self) -> Option<Coordinate> {
        match self {
            LocationState::Located(position) => Some(*position),
            _ => None,
        }
    }
}
