//! Geospatial primitives shared by [`crate::index::bkd`]
//!
//! Distance math over geopoints lives inside this layer's scope (only the
//! downstream cosine-similarity ranker is an external collaborator, per
//! §1 of SPEC_FULL.md). [`BKDIndex`](crate::index::bkd::BKDIndex) itself
//! always works in meters; unit conversion happens here, at the boundary
//! where a caller's radius predicate is parsed.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters (WGS-84 authalic radius, the usual choice
/// for haversine approximations).
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// A 2-D geopoint: latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Units a radius predicate's `value` may be expressed in; always
/// converted to meters before reaching [`BKDIndex`](crate::index::bkd::BKDIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceUnit {
    Meters,
    Kilometers,
    Miles,
    Feet,
}

impl Default for DistanceUnit {
    fn default() -> Self {
        DistanceUnit::Meters
    }
}

impl DistanceUnit {
    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            DistanceUnit::Meters => value,
            DistanceUnit::Kilometers => value * 1000.0,
            DistanceUnit::Miles => value * 1609.344,
            DistanceUnit::Feet => value * 0.3048,
        }
    }
}

/// Great-circle distance between two points, in meters.
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().asin();
    EARTH_RADIUS_METERS * c
}

/// Equirectangular approximation, cheaper than haversine and accurate for
/// short distances at non-polar latitudes. Used when `highPrecision` is
/// false.
pub fn equirectangular_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let mean_lat = (lat1 + lat2) / 2.0;

    let x = (b.lon - a.lon).to_radians() * mean_lat.cos();
    let y = lat2 - lat1;
    EARTH_RADIUS_METERS * (x * x + y * y).sqrt()
}

pub fn distance_meters(a: GeoPoint, b: GeoPoint, high_precision: bool) -> f64 {
    if high_precision {
        haversine_meters(a, b)
    } else {
        equirectangular_meters(a, b)
    }
}

/// Point-in-polygon test via ray casting (even-odd rule). Degenerate
/// polygons (fewer than 3 vertices) always return `false` — callers are
/// expected to reject them before querying (§4.4: "degenerate polygons
/// return empty").
pub fn point_in_polygon(point: GeoPoint, vertices: &[GeoPoint]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = vertices.len();
    let mut j = n - 1;
    for i in 0..n {
        let vi = vertices[i];
        let vj = vertices[j];
        let intersects = (vi.lon > point.lon) != (vj.lon > point.lon)
            && point.lat
                < (vj.lat - vi.lat) * (point.lon - vi.lon) / (vj.lon - vi.lon) + vi.lat;
        if intersects {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// A polygon's area is used to reject degenerate (zero-area) shapes; computed
/// via the shoelace formula over (lon, lat) treated as a planar projection,
/// which is adequate for the small-polygon filtering this crate needs.
pub fn polygon_area(vertices: &[GeoPoint]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let n = vertices.len();
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += vertices[i].lon * vertices[j].lat - vertices[j].lon * vertices[i].lat;
    }
    (sum / 2.0).abs()
}

/// Axis-aligned bounding box over `(lat, lon)`, used by the BKD tree's
/// interior nodes to prune subtrees during radius/polygon queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl GeoBoundingBox {
    pub fn from_point(p: GeoPoint) -> Self {
        Self {
            min_lat: p.lat,
            min_lon: p.lon,
            max_lat: p.lat,
            max_lon: p.lon,
        }
    }

    pub fn expand(&mut self, p: GeoPoint) {
        self.min_lat = self.min_lat.min(p.lat);
        self.min_lon = self.min_lon.min(p.lon);
        self.max_lat = self.max_lat.max(p.lat);
        self.max_lon = self.max_lon.max(p.lon);
    }

    pub fn merge(&self, other: &GeoBoundingBox) -> GeoBoundingBox {
        GeoBoundingBox {
            min_lat: self.min_lat.min(other.min_lat),
            min_lon: self.min_lon.min(other.min_lon),
            max_lat: self.max_lat.max(other.max_lat),
            max_lon: self.max_lon.max(other.max_lon),
        }
    }

    /// Nearest point in the box to `p` — used to lower-bound the distance
    /// from `p` to anything the box could contain, so a radius query can
    /// skip subtrees whose closest point is already out of range.
    pub fn closest_point_to(&self, p: GeoPoint) -> GeoPoint {
        GeoPoint {
            lat: p.lat.clamp(self.min_lat, self.max_lat),
            lon: p.lon.clamp(self.min_lon, self.max_lon),
        }
    }

    pub fn intersects_disc(&self, center: GeoPoint, radius_meters: f64, high_precision: bool) -> bool {
        distance_meters(center, self.closest_point_to(center), high_precision) <= radius_meters
    }
}
