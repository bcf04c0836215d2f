// Geographic points and boxes
use crate::earth::earth_radius_at;
use crate::error::{ChipError, Result};
use serde::{Deserialize, Serialize};

/// A point on the globe, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Reject non-finite or out-of-range coordinates
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(ChipError::Geometry(format!(
                "latitude {} outside [-90, 90]",
                self.lat
            )));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(ChipError::Geometry(format!(
                "longitude {} outside [-180, 180]",
                self.lon
            )));
        }
        Ok(())
    }
}

/// Geographic rectangle, edges in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    pub fn north_west(&self) -> GeoPoint {
        GeoPoint::new(self.north, self.west)
    }

    pub fn north_east(&self) -> GeoPoint {
        GeoPoint::new(self.north, self.east)
    }

    pub fn south_west(&self) -> GeoPoint {
        GeoPoint::new(self.south, self.west)
    }

    pub fn south_east(&self) -> GeoPoint {
        GeoPoint::new(self.south, self.east)
    }

    /// Average of the corners
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat <= self.north
            && point.lat >= self.south
            && point.lon >= self.west
            && point.lon <= self.east
    }

    /// The box must not reach past a pole or wrap across the anti-meridian
    pub fn validate(&self) -> Result<()> {
        if !(self.north.is_finite() && self.south.is_finite())
            || self.north > 90.0
            || self.south < -90.0
        {
            return Err(ChipError::Geometry(format!(
                "box latitude span [{}, {}] reaches past a pole",
                self.south, self.north
            )));
        }
        if !(self.east.is_finite() && self.west.is_finite())
            || self.east > 180.0
            || self.west < -180.0
        {
            return Err(ChipError::Geometry(format!(
                "box longitude span [{}, {}] crosses the anti-meridian",
                self.west, self.east
            )));
        }
        if self.north < self.south {
            return Err(ChipError::Geometry(format!(
                "box north {} below south {}",
                self.north, self.south
            )));
        }
        Ok(())
    }
}

/// Box of half-side `half_side_km` around `center`, treating the Earth as locally
/// spherical with the WGS-84 radius at the center latitude.
///
/// The box is symmetric in angle, not in ground distance. Near the poles the
/// longitude extent blows up, so callers must keep clear of +/-90 degrees.
pub fn bounding_box(center: GeoPoint, half_side_km: f64) -> BoundingBox {
    let lat = center.lat.to_radians();
    let lon = center.lon.to_radians();
    let half_side = 1000.0 * half_side_km;

    let radius = earth_radius_at(lat);
    // Radius of the parallel through the center
    let parallel_radius = radius * lat.cos();

    let d_lat = half_side / radius;
    let d_lon = half_side / parallel_radius;

    BoundingBox {
        north: (lat + d_lat).to_degrees(),
        south: (lat - d_lat).to_degrees(),
        east: (lon + d_lon).to_degrees(),
        west: (lon - d_lon).to_degrees(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_is_centered_on_input() {
        for &(lat, lon) in &[(5.0, 20.0), (45.0, 0.0), (-33.87, 151.21), (79.9, -120.0)] {
            let center = GeoPoint::new(lat, lon);
            for &radius in &[0.05, 0.2, 3.0, 25.0] {
                let bbox = bounding_box(center, radius);
                assert!(bbox.north > bbox.south);
                assert!(bbox.east > bbox.west);
                let c = bbox.center();
                assert!((c.lat - lat).abs() < 1e-9, "lat drift at {:?}", center);
                assert!((c.lon - lon).abs() < 1e-9, "lon drift at {:?}", center);
            }
        }
    }

    #[test]
    fn test_box_widens_with_latitude() {
        let equator = bounding_box(GeoPoint::new(0.0, 0.0), 1.0);
        let north = bounding_box(GeoPoint::new(60.0, 0.0), 1.0);
        let eq_width = equator.east - equator.west;
        let north_width = north.east - north.west;
        // cos(60) = 0.5, so roughly twice the angular width
        assert!((north_width / eq_width - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_one_km_at_equator() {
        let bbox = bounding_box(GeoPoint::new(0.0, 0.0), 1.0);
        // 1 km over the equatorial radius, in degrees
        let expected = (1000.0 / crate::earth::WGS84_A).to_degrees();
        assert!((bbox.north - expected).abs() < 1e-12);
        assert!((bbox.east - expected).abs() < 1e-12);
    }

    #[test]
    fn test_point_validation() {
        assert!(GeoPoint::new(5.0, 20.0).validate().is_ok());
        assert!(GeoPoint::new(90.0, 180.0).validate().is_ok());
        assert!(GeoPoint::new(90.5, 0.0).validate().is_err());
        assert!(GeoPoint::new(0.0, -180.1).validate().is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_box_validation() {
        assert!(bounding_box(GeoPoint::new(45.0, 0.0), 2.0).validate().is_ok());
        // Straddles the anti-meridian
        assert!(bounding_box(GeoPoint::new(0.0, 179.999), 2.0).validate().is_err());
        // Reaches past the north pole
        assert!(bounding_box(GeoPoint::new(89.999, 0.0), 1.0).validate().is_err());
    }
}
