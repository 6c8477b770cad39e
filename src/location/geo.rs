//! Great-circle distance, proximity scans and map-box projection.
//!
//! Nearby queries are a linear scan: the reference dataset is a few thousand
//! rows at most. Any index added here must keep the same `<= radius` filter
//! and the distance-then-id ordering.

use super::store::LocationStore;
use super::types::{Plot, Settlement};
use serde::Serialize;

/// Mean Earth radius used by [`haversine`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A lat/lng rectangle used for map projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// Botswana's bounding box.
pub const BOTSWANA_BOUNDS: Bounds = Bounds {
    min_lat: -26.91,
    max_lat: -17.78,
    min_lng: 19.99,
    max_lng: 29.38,
};

/// A point inside the `[0,100] × [0,100]` map box; `y` grows southwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxPoint {
    pub x: f64,
    pub y: f64,
}

/// An entity together with its distance from the query point.
#[derive(Debug, Serialize)]
pub struct Nearby<'a, T> {
    #[serde(flatten)]
    pub item: &'a T,
    pub distance_km: f64,
}

/// Great-circle distance in kilometres.
pub fn haversine(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Linear min-max rescale of a coordinate into the map box.
///
/// Coordinates outside `bounds` clamp to the nearest edge. A bound with zero
/// span maps to the middle of that axis.
pub fn project_to_box(lat: f64, lng: f64, bounds: &Bounds) -> BoxPoint {
    let x = rescale(lng, bounds.min_lng, bounds.max_lng);
    let y = 100.0 - rescale(lat, bounds.min_lat, bounds.max_lat);
    BoxPoint { x, y }
}

fn rescale(v: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span.abs() < 1e-12 {
        return 50.0;
    }
    ((v - min) / span * 100.0).clamp(0.0, 100.0)
}

/// Format coordinates as "24.6282°S, 25.9231°E".
pub fn format_coords(lat: f64, lng: f64) -> String {
    let ns = if lat >= 0.0 { 'N' } else { 'S' };
    let ew = if lng >= 0.0 { 'E' } else { 'W' };
    format!("{:.4}\u{00B0}{}, {:.4}\u{00B0}{}", lat.abs(), ns, lng.abs(), ew)
}

/// True when the pair is a valid WGS84 coordinate.
pub fn valid_coords(lat: f64, lng: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}

/// Proximity queries over a [`LocationStore`].
pub struct DistanceEngine<'a> {
    store: &'a LocationStore,
}

impl<'a> DistanceEngine<'a> {
    pub fn new(store: &'a LocationStore) -> Self {
        Self { store }
    }

    /// Settlements within `radius_km` of the point, nearest first.
    pub fn find_nearby(&self, lat: f64, lng: f64, radius_km: f64) -> Vec<Nearby<'a, Settlement>> {
        scan(self.store.settlements(), lat, lng, radius_km, |s| (s.id, s.latitude, s.longitude))
    }

    /// Plots within `radius_km` of the point, nearest first.
    pub fn find_nearby_plots(&self, lat: f64, lng: f64, radius_km: f64) -> Vec<Nearby<'a, Plot>> {
        scan(self.store.plots(), lat, lng, radius_km, |p| (p.id, p.latitude, p.longitude))
    }
}

fn scan<'a, T>(
    items: &'a [T],
    lat: f64,
    lng: f64,
    radius_km: f64,
    locate: fn(&T) -> (u32, f64, f64),
) -> Vec<Nearby<'a, T>> {
    let mut hits: Vec<(u32, Nearby<'a, T>)> = items
        .iter()
        .filter_map(|item| {
            let (id, ilat, ilng) = locate(item);
            let distance_km = haversine(lat, lng, ilat, ilng);
            (distance_km <= radius_km).then_some((id, Nearby { item, distance_km }))
        })
        .collect();
    hits.sort_by(|(ia, a), (ib, b)| a.distance_km.total_cmp(&b.distance_km).then(ia.cmp(ib)));
    hits.into_iter().map(|(_, n)| n).collect()
}
