//! Equirectangular projection around a fixed center

use super::LatLng;

/// Meters per degree of latitude
pub const METERS_PER_DEGREE: f64 = 111_132.0;

/// Point in meters relative to the frame center (x east, y north)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn sub(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn norm_sq(self) -> f64 {
        self.dot(self)
    }

    /// Point at parameter `t` along `self + t * direction`
    pub fn along(self, direction: Vec2, t: f64) -> Vec2 {
        Vec2 {
            x: self.x + t * direction.x,
            y: self.y + t * direction.y,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Local flat frame centered on a geographic point
#[derive(Debug, Clone, Copy)]
pub struct LocalFrame {
    center: LatLng,
    cos_lat: f64,
}

impl LocalFrame {
    pub fn new(center: LatLng) -> Self {
        Self {
            center,
            cos_lat: center.lat.to_radians().cos(),
        }
    }

    pub fn to_local(&self, point: LatLng) -> Vec2 {
        Vec2 {
            x: (point.lng - self.center.lng) * METERS_PER_DEGREE * self.cos_lat,
            y: (point.lat - self.center.lat) * METERS_PER_DEGREE,
        }
    }

    pub fn to_lat_lng(&self, point: Vec2) -> LatLng {
        LatLng {
            lat: self.center.lat + point.y / METERS_PER_DEGREE,
            lng: self.center.lng + point.x / (METERS_PER_DEGREE * self.cos_lat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_near_center() {
        let frame = LocalFrame::new(LatLng::new(-23.55, -46.63));
        let point = LatLng::new(-23.551, -46.629);
        let back = frame.to_lat_lng(frame.to_local(point));
        assert!((back.lat - point.lat).abs() < 1e-12);
        assert!((back.lng - point.lng).abs() < 1e-12);
    }

    #[test]
    fn test_one_degree_north_is_constant_distance() {
        let frame = LocalFrame::new(LatLng::new(0.0, 0.0));
        let local = frame.to_local(LatLng::new(1.0, 0.0));
        assert_eq!(local, Vec2 { x: 0.0, y: METERS_PER_DEGREE });
    }
}
