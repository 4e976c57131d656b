//! Map path geometry
//!
//! Erasing a circular region from drawn polylines. Coordinates are projected
//! onto a local flat plane centered on the eraser, which is accurate enough
//! for eraser radii of a few hundred meters.

mod erase;
mod projection;

use serde::{Deserialize, Serialize};

pub use erase::{erase_circle_from_polylines, erase_optional, EraseError};
pub use projection::{LocalFrame, Vec2, METERS_PER_DEGREE};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Ordered vertices of a drawn path
pub type Polyline = Vec<LatLng>;

/// Circular eraser
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EraseRegion {
    pub center: LatLng,
    pub radius_meters: f64,
}
