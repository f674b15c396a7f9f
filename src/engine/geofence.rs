use crate::database::models::Company;
use crate::error::AppError;

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geofence {
    pub center: GeoPoint,
    pub radius_meters: f64,
}

/// Great-circle distance via the haversine formula.
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

pub fn is_within_radius(point: GeoPoint, center: GeoPoint, radius_meters: f64) -> bool {
    distance_meters(point, center) <= radius_meters
}

/// Resolves a company's geofence. Fails closed: a company that enables
/// geofencing without a complete center/radius must reject clock
/// operations, not silently allow them.
pub fn company_geofence(company: &Company) -> Result<Option<Geofence>, AppError> {
    if !company.geofencing_enabled {
        return Ok(None);
    }
    match (
        company.geofence_lat,
        company.geofence_lng,
        company.geofence_radius_meters,
    ) {
        (Some(lat), Some(lng), Some(radius_meters)) => Ok(Some(Geofence {
            center: GeoPoint { lat, lng },
            radius_meters,
        })),
        _ => Err(AppError::validation(
            "geofencing is enabled but the company geofence is not configured",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        let p = GeoPoint { lat: 10.7769, lng: 106.7009 };
        assert!(distance_meters(p, p) < 1e-9);
    }

    #[test]
    fn known_distance_within_tolerance() {
        // Ben Thanh Market to Saigon Notre-Dame Basilica, roughly 1.1 km.
        let a = GeoPoint { lat: 10.7725, lng: 106.6980 };
        let b = GeoPoint { lat: 10.7798, lng: 106.6990 };
        let d = distance_meters(a, b);
        assert!(d > 700.0 && d < 1000.0, "got {}", d);
    }

    #[test]
    fn radius_check_is_inclusive_of_boundary_noise() {
        let center = GeoPoint { lat: 10.0, lng: 106.0 };
        let near = GeoPoint { lat: 10.0005, lng: 106.0 };
        assert!(is_within_radius(near, center, 100.0));
        assert!(!is_within_radius(near, center, 10.0));
    }

    #[test]
    fn unconfigured_enabled_geofence_fails_closed() {
        let company = test_company(true, Some(10.0), None, Some(100.0));
        assert!(company_geofence(&company).is_err());
    }

    #[test]
    fn disabled_geofence_resolves_to_none() {
        let company = test_company(false, None, None, None);
        assert!(company_geofence(&company).unwrap().is_none());
    }

    #[test]
    fn configured_geofence_resolves() {
        let company = test_company(true, Some(10.0), Some(106.0), Some(150.0));
        let fence = company_geofence(&company).unwrap().unwrap();
        assert_eq!(fence.radius_meters, 150.0);
    }

    fn test_company(
        enabled: bool,
        lat: Option<f64>,
        lng: Option<f64>,
        radius: Option<f64>,
    ) -> Company {
        Company {
            id: uuid::Uuid::new_v4(),
            name: "test".to_string(),
            timezone_offset_hours: 7,
            geofencing_enabled: enabled,
            geofence_lat: lat,
            geofence_lng: lng,
            geofence_radius_meters: radius,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }
}
