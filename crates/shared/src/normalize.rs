use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{MapPoint, PointKind, RawAggregateRecord};

/// Floor applied by the min-max policy so the lightest point stays visible.
pub const MIN_NORMALIZED_WEIGHT: f64 = 0.1;

/// How record counts become point weights.
///
/// The two policies are never combined: a batch is weighted entirely by one of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightPolicy {
    /// Weight is the record's `count`, untouched.
    #[default]
    RawCount,
    /// Weight is min-max scaled across the batch into `[0.1, 1.0]`.
    MinMax,
}

impl std::str::FromStr for WeightPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw-count" | "raw" => Ok(WeightPolicy::RawCount),
            "min-max" | "minmax" => Ok(WeightPolicy::MinMax),
            other => Err(format!("unknown weight policy '{other}'")),
        }
    }
}

/// Convert an aggregate response body into map points.
///
/// Accepts a bare array or one wrapped in `response`. Any other shape is [`ApiError::Shape`].
pub fn normalize_aggregate(
    body: &Value,
    policy: WeightPolicy,
) -> Result<Vec<MapPoint>, ApiError> {
    let records = match body {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("response") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ApiError::Shape(
                    "expected an array or an object with a `response` array".to_string(),
                ))
            }
        },
        other => return Err(ApiError::Shape(format!("expected an array, got {other}"))),
    };

    let points: Vec<MapPoint> = records.iter().filter_map(point_from_value).collect();

    Ok(match policy {
        WeightPolicy::RawCount => points,
        WeightPolicy::MinMax => min_max_weights(points),
    })
}

fn point_from_value(value: &Value) -> Option<MapPoint> {
    let raw = RawAggregateRecord::deserialize(value).ok()?;
    point_from_record(raw)
}

/// Build a point from one record, preferring the locality shape when both are present.
pub fn point_from_record(raw: RawAggregateRecord) -> Option<MapPoint> {
    let weight = raw.count.unwrap_or(0.0);
    let (coords, name, kind) = match (raw.locality_lat_long, raw.locality) {
        (Some(coords), Some(name)) => (coords, name, PointKind::Locality),
        _ => match (raw.district_lat_long, raw.district) {
            (Some(coords), Some(name)) => (coords, name, PointKind::District),
            _ => return None,
        },
    };
    let (lat, lng) = parse_lat_long(&coords)?;
    Some(MapPoint {
        lat,
        lng,
        weight,
        name,
        kind,
    })
}

/// Parse a `"lat,lng"` string. Zero, NaN and non-finite halves are rejected.
///
/// Exact zero is treated as "missing" by the backend, so the equator and the prime
/// meridian are unreachable.
pub fn parse_lat_long(s: &str) -> Option<(f64, f64)> {
    let mut parts = s.split(',');
    let lat = parse_coordinate(parts.next()?)?;
    let lng = parse_coordinate(parts.next()?)?;
    Some((lat, lng))
}

fn parse_coordinate(part: &str) -> Option<f64> {
    let value = part.trim().parse::<f64>().ok()?;
    if !value.is_finite() || value == 0.0 {
        return None;
    }
    Some(value)
}

/// `max(0.1, (w - min) / range)` where a zero range is treated as 1.
fn min_max_weights(mut points: Vec<MapPoint>) -> Vec<MapPoint> {
    if points.is_empty() {
        return points;
    }
    let min = points.iter().map(|p| p.weight).fold(f64::INFINITY, f64::min);
    let max = points
        .iter()
        .map(|p| p.weight)
        .fold(f64::NEG_INFINITY, f64::max);
    let range = if max - min == 0.0 { 1.0 } else { max - min };
    for point in &mut points {
        point.weight = ((point.weight - min) / range).max(MIN_NORMALIZED_WEIGHT);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrapped_district_record() {
        let body = json!({"response": [{"district_lat_long": "19.75,75.71", "District": "X", "count": 10}]});
        let points = normalize_aggregate(&body, WeightPolicy::RawCount).unwrap();
        assert_eq!(
            points,
            vec![MapPoint {
                lat: 19.75,
                lng: 75.71,
                weight: 10.0,
                name: "X".to_string(),
                kind: PointKind::District,
            }]
        );
    }

    #[test]
    fn test_bare_array_locality_record() {
        let body = json!([{"locality_lat_long": "18.5204, 73.8567", "Locality": "Pune City", "count": 3}]);
        let points = normalize_aggregate(&body, WeightPolicy::RawCount).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].kind, PointKind::Locality);
        assert_eq!(points[0].name, "Pune City");
        assert!((points[0].lng - 73.8567).abs() < 1e-9);
    }

    #[test]
    fn test_records_without_coordinates_are_dropped() {
        let body = json!([
            {"District": "NoCoords", "count": 5},
            {"Locality": "AlsoNoCoords"},
            {"count": 1},
            {"district_lat_long": "19.0,75.0", "District": "Kept", "count": 2}
        ]);
        let points = normalize_aggregate(&body, WeightPolicy::RawCount).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name, "Kept");
    }

    #[test]
    fn test_coordinate_without_label_is_dropped() {
        let body = json!([{"district_lat_long": "19.0,75.0", "count": 2}]);
        assert!(normalize_aggregate(&body, WeightPolicy::RawCount).unwrap().is_empty());
    }

    #[test]
    fn test_locality_shape_preferred_over_district() {
        let body = json!([{
            "district_lat_long": "19.0,75.0", "District": "D",
            "locality_lat_long": "19.1,75.1", "Locality": "L",
            "count": 4
        }]);
        let points = normalize_aggregate(&body, WeightPolicy::RawCount).unwrap();
        assert_eq!(points[0].name, "L");
        assert_eq!(points[0].kind, PointKind::Locality);
        assert!((points[0].lat - 19.1).abs() < 1e-9);
    }

    #[test]
    fn test_partial_locality_falls_back_to_district() {
        let body = json!([{
            "district_lat_long": "19.0,75.0", "District": "D",
            "locality_lat_long": "19.1,75.1",
            "count": 4
        }]);
        let points = normalize_aggregate(&body, WeightPolicy::RawCount).unwrap();
        assert_eq!(points[0].kind, PointKind::District);
    }

    #[test]
    fn test_zero_and_nan_coordinates_excluded() {
        let body = json!([
            {"district_lat_long": "0,75.0", "District": "ZeroLat", "count": 1},
            {"district_lat_long": "19.0,0", "District": "ZeroLng", "count": 1},
            {"district_lat_long": "abc,75.0", "District": "NaNLat", "count": 1},
            {"district_lat_long": "19.0,", "District": "EmptyLng", "count": 1},
            {"district_lat_long": "19.0", "District": "OneHalf", "count": 1},
            {"district_lat_long": "NaN,75.0", "District": "LiteralNaN", "count": 1},
            {"district_lat_long": "-12.5,-45.25", "District": "Southern", "count": 1}
        ]);
        let points = normalize_aggregate(&body, WeightPolicy::RawCount).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name, "Southern");
    }

    #[test]
    fn test_missing_count_defaults_to_zero() {
        let body = json!([{"district_lat_long": "19.0,75.0", "District": "D"}]);
        let points = normalize_aggregate(&body, WeightPolicy::RawCount).unwrap();
        assert_eq!(points[0].weight, 0.0);
    }

    #[test]
    fn test_unrecognized_shapes_are_errors() {
        for body in [
            json!(null),
            json!("oops"),
            json!(42),
            json!({"data": []}),
            json!({"response": {"error": "db down"}}),
        ] {
            assert!(matches!(
                normalize_aggregate(&body, WeightPolicy::RawCount),
                Err(ApiError::Shape(_))
            ));
        }
    }

    #[test]
    fn test_empty_arrays_are_successes() {
        assert_eq!(normalize_aggregate(&json!([]), WeightPolicy::RawCount), Ok(vec![]));
        assert_eq!(
            normalize_aggregate(&json!({"response": []}), WeightPolicy::MinMax),
            Ok(vec![])
        );
    }

    #[test]
    fn test_non_object_items_and_wrong_types_skipped() {
        let body = json!([
            "19.0,75.0",
            null,
            {"district_lat_long": 19.0, "District": "NumericCoords"},
            {"district_lat_long": "19.5,75.5", "District": "Good", "count": 1}
        ]);
        let points = normalize_aggregate(&body, WeightPolicy::RawCount).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name, "Good");
    }

    #[test]
    fn test_min_max_policy_scales_into_range() {
        let body = json!([
            {"district_lat_long": "19.0,75.0", "District": "Low", "count": 10},
            {"district_lat_long": "19.5,75.5", "District": "Mid", "count": 60},
            {"district_lat_long": "20.0,76.0", "District": "High", "count": 110}
        ]);
        let points = normalize_aggregate(&body, WeightPolicy::MinMax).unwrap();
        assert!((points[0].weight - MIN_NORMALIZED_WEIGHT).abs() < 1e-9);
        assert!((points[1].weight - 0.5).abs() < 1e-9);
        assert!((points[2].weight - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_min_max_policy_equal_weights_floor() {
        let body = json!([
            {"district_lat_long": "19.0,75.0", "District": "A", "count": 7},
            {"district_lat_long": "19.5,75.5", "District": "B", "count": 7}
        ]);
        let points = normalize_aggregate(&body, WeightPolicy::MinMax).unwrap();
        assert!(points
            .iter()
            .all(|p| (p.weight - MIN_NORMALIZED_WEIGHT).abs() < 1e-9));
    }

    #[test]
    fn test_raw_policy_keeps_counts() {
        let body = json!([
            {"district_lat_long": "19.0,75.0", "District": "A", "count": 7},
            {"district_lat_long": "19.5,75.5", "District": "B", "count": 700}
        ]);
        let points = normalize_aggregate(&body, WeightPolicy::RawCount).unwrap();
        assert_eq!(points[1].weight, 700.0);
    }

    #[test]
    fn test_weight_policy_from_str() {
        assert_eq!("raw-count".parse::<WeightPolicy>(), Ok(WeightPolicy::RawCount));
        assert_eq!("Min-Max".parse::<WeightPolicy>(), Ok(WeightPolicy::MinMax));
        assert!("log".parse::<WeightPolicy>().is_err());
    }

    #[test]
    fn test_weight_policy_serde_names() {
        assert_eq!(
            serde_json::to_value(WeightPolicy::MinMax).unwrap(),
            json!("min-max")
        );
        let policy: WeightPolicy = serde_json::from_value(json!("raw-count")).unwrap();
        assert_eq!(policy, WeightPolicy::RawCount);
    }
}
