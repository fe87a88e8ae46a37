use serde::{Deserialize, Serialize};

/// Coordinate granularity sent to the detail endpoint. Only localities carry rosters.
pub const LOCALITY_COORDINATE_TYPE: &str = "locality";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }
}

/// Visible lat/lng rectangle as reported by the map widget.
///
/// The widget is trusted to deliver `north >= south` and `east >= west`; nothing here checks it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// Height and width of a viewport in degrees, shown in the diagnostics panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SpanDelta {
    pub lat: f64,
    pub lng: f64,
}

impl ViewportBounds {
    pub fn span(&self) -> SpanDelta {
        SpanDelta {
            lat: (self.north - self.south).abs(),
            lng: (self.east - self.west).abs(),
        }
    }

    /// Reshape into the aggregate endpoint's request body.
    pub fn to_query(&self) -> BoundsQuery {
        BoundsQuery {
            lat1: self.south,
            lat2: self.north,
            lon1: self.west,
            lon2: self.east,
        }
    }
}

/// One bounds/zoom notification from the map widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportChange {
    pub bounds: ViewportBounds,
    pub zoom: f64,
}

/// Request body for the aggregate endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundsQuery {
    pub lat1: f64,
    pub lat2: f64,
    pub lon1: f64,
    pub lon2: f64,
}

/// Request body for the detail endpoint.
///
/// The backend names the granularity field `coordiante_type`; the wire spelling must match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailQuery {
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "coordiante_type")]
    pub coordinate_type: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    District,
    Locality,
}

impl std::fmt::Display for PointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointKind::District => write!(f, "district"),
            PointKind::Locality => write!(f, "locality"),
        }
    }
}

/// Uniform point drawn on the map. Rebuilt wholesale on every aggregate fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub lat: f64,
    pub lng: f64,
    pub weight: f64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PointKind,
}

impl MapPoint {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn is_locality(&self) -> bool {
        self.kind == PointKind::Locality
    }

    /// Detail request for this point, or `None` for districts which have no roster.
    pub fn detail_query(&self) -> Option<DetailQuery> {
        match self.kind {
            PointKind::Locality => Some(DetailQuery {
                lat: self.lat,
                lon: self.lng,
                coordinate_type: LOCALITY_COORDINATE_TYPE,
            }),
            PointKind::District => None,
        }
    }

    pub fn google_maps_url(&self) -> String {
        format!(
            "https://www.google.com/maps/search/?api=1&query={},{}",
            self.lat, self.lng
        )
    }
}

/// One record of the aggregate payload, in either its district or locality shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAggregateRecord {
    pub district_lat_long: Option<String>,
    #[serde(rename = "District")]
    pub district: Option<String>,
    pub locality_lat_long: Option<String>,
    #[serde(rename = "Locality")]
    pub locality: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: Option<f64>,
}

/// Accept `count` as a JSON number or a numeric string; anything else counts as absent.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
