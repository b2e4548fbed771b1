//! Geo distance query - great-circle radius search

use roaring::RoaringBitmap;

use crate::models::GeoPoint;
use crate::query::context::QueryContext;
use crate::query::types::Clause;

/// Mean Earth radius used for distances
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Query that matches geo points within `distance_km` of `center`
#[derive(Clone, Debug, PartialEq)]
pub struct GeoDistanceQuery {
    pub field: String,
    pub center: GeoPoint,
    /// Radius in kilometers
    pub distance_km: f64,
}

impl GeoDistanceQuery {
    pub fn new(field: impl Into<String>, center: GeoPoint, distance_km: f64) -> Self {
        Self {
            field: field.into(),
            center,
            distance_km,
        }
    }

    pub fn execute(&self, ctx: &QueryContext<'_>) -> Clause {
        if !self.distance_km.is_finite() || self.distance_km < 0.0 {
            return Clause::empty();
        }

        let matches: RoaringBitmap = ctx
            .field_values(&self.field)
            .into_iter()
            .filter_map(|(docno, value)| value.as_geo().map(|point| (docno, point)))
            .filter(|(_, point)| haversine_km(&self.center, point) <= self.distance_km)
            .map(|(docno, _)| docno.as_u32())
            .collect();
        Clause::constant(matches, 1.0)
    }
}

/// Haversine distance between two points in kilometers
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}
