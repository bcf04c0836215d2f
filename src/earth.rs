// WGS-84 ellipsoid helpers

/// Semi-major (equatorial) axis in meters
pub const WGS84_A: f64 = 6_378_137.0;
/// Semi-minor (polar) axis in meters
pub const WGS84_B: f64 = 6_356_752.3;

/// Radius of the WGS-84 ellipsoid at a geodetic latitude given in radians, in meters
pub fn earth_radius_at(lat: f64) -> f64 {
    let (sin, cos) = lat.sin_cos();
    let an = WGS84_A * WGS84_A * cos;
    let bn = WGS84_B * WGS84_B * sin;
    let ad = WGS84_A * cos;
    let bd = WGS84_B * sin;
    ((an * an + bn * bn) / (ad * ad + bd * bd)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_radius_at_equator_and_pole() {
        assert!((earth_radius_at(0.0) - WGS84_A).abs() < 1e-6);
        assert!((earth_radius_at(FRAC_PI_2) - WGS84_B).abs() < 1e-6);
        assert!((earth_radius_at(-FRAC_PI_2) - WGS84_B).abs() < 1e-6);
    }

    #[test]
    fn test_radius_decreases_towards_pole() {
        let mut previous = earth_radius_at(0.0);
        for deg in (5..=90).step_by(5) {
            let r = earth_radius_at((deg as f64).to_radians());
            assert!(r < previous, "radius should shrink at {} deg", deg);
            previous = r;
        }
    }
}
