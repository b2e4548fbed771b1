use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::{QuarryError, Result};

/// External document identifier
pub type DocumentId = String;

/// A document: a required id plus a flat field map
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Set a field value
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Build a document from `{id, <field>: value, ...}`
    ///
    /// `null` fields are skipped. A missing, empty or non-scalar `id` is a
    /// validation error.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| QuarryError::InvalidDocument("document must be a JSON object".into()))?;

        let id = match object.get("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(QuarryError::MissingDocumentId),
        };

        let mut doc = Document::new(id);
        for (name, raw) in object {
            if name == "id" {
                continue;
            }
            if let Some(value) = FieldValue::from_json(raw) {
                doc.fields.insert(name.clone(), value);
            }
        }
        doc.validate()?;
        Ok(doc)
    }

    /// `{id, <field>: value, ...}`
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("id".to_string(), Value::String(self.id.clone()));
        for (name, value) in &self.fields {
            object.insert(name.clone(), value.to_json());
        }
        Value::Object(object)
    }

    /// Check id and field names
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(QuarryError::MissingDocumentId);
        }
        for name in self.fields.keys() {
            if name.is_empty() || name.contains(':') {
                return Err(QuarryError::InvalidDocument(format!(
                    "invalid field name `{name}`: must be non-empty and not contain ':'"
                )));
            }
            if name == "id" {
                return Err(QuarryError::InvalidDocument(
                    "`id` is reserved for the document identifier".into(),
                ));
            }
        }
        Ok(())
    }
}

/// A stored field value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Geo(GeoPoint),
}

impl FieldValue {
    /// Convert a raw JSON value; `null` yields `None`
    ///
    /// Two-element numeric arrays and `{lat, lon}` objects become geo points.
    /// Other arrays are joined with spaces, other objects kept as JSON text.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(FieldValue::Boolean(*b)),
            Value::Number(n) => n.as_f64().map(FieldValue::Number),
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Array(items) => {
                if items.len() == 2 && items.iter().all(Value::is_number) {
                    return GeoPoint::from_json(value).map(FieldValue::Geo);
                }
                let parts: Vec<String> = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::Null => None,
                        Value::String(s) => Some(s.clone()),
                        other => Some(other.to_string()),
                    })
                    .collect();
                Some(FieldValue::Text(parts.join(" ")))
            }
            Value::Object(_) => match GeoPoint::from_json(value) {
                Some(point) => Some(FieldValue::Geo(point)),
                None => Some(FieldValue::Text(value.to_string())),
            },
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Geo(point) => serde_json::json!([point.lon, point.lat]),
        }
    }

    /// Human-readable form used for keyword tokens and facet values
    ///
    /// Integral numbers print without a fractional part.
    pub fn display_string(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Geo(point) => format!("{},{}", point.lat, point.lon),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Number(_) => "number",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Geo(_) => "geo_point",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_geo(&self) -> Option<GeoPoint> {
        match self {
            FieldValue::Geo(point) => Some(*point),
            _ => None,
        }
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<GeoPoint> for FieldValue {
    fn from(value: GeoPoint) -> Self {
        FieldValue::Geo(value)
    }
}

/// A latitude/longitude pair in degrees
///
/// Serialized as the GeoJSON-ordered pair `[lon, lat]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Parse `[lon, lat]` or `{lat, lon}` (`lng` accepted for `lon`)
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) if items.len() == 2 => {
                let lon = items[0].as_f64()?;
                let lat = items[1].as_f64()?;
                Some(Self::new(lat, lon))
            }
            Value::Object(object) => {
                let lat = object.get("lat")?.as_f64()?;
                let lon = object
                    .get("lon")
                    .or_else(|| object.get("lng"))?
                    .as_f64()?;
                Some(Self::new(lat, lon))
            }
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(point: GeoPoint) -> Self {
        [point.lon, point.lat]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        let doc = Document::from_json(&json!({
            "id": "p1",
            "title": "Laptop",
            "price": 999,
            "in_stock": true,
            "location": [-73.98, 40.75],
            "tags": ["fast", "light"],
            "discontinued": null
        }))
        .unwrap();

        assert_eq!(doc.id, "p1");
        assert_eq!(doc.get("title"), Some(&FieldValue::Text("Laptop".into())));
        assert_eq!(doc.get("price"), Some(&FieldValue::Number(999.0)));
        assert_eq!(doc.get("in_stock"), Some(&FieldValue::Boolean(true)));
        assert_eq!(
            doc.get("location"),
            Some(&FieldValue::Geo(GeoPoint::new(40.75, -73.98)))
        );
        assert_eq!(doc.get("tags"), Some(&FieldValue::Text("fast light".into())));
        assert!(doc.get("discontinued").is_none());
        assert!(doc.get("id").is_none());
    }

    #[test]
    fn test_missing_id_is_rejected() {
        assert!(matches!(
            Document::from_json(&json!({"title": "no id"})),
            Err(QuarryError::MissingDocumentId)
        ));
        assert!(matches!(
            Document::from_json(&json!({"id": "  ", "title": "blank"})),
            Err(QuarryError::MissingDocumentId)
        ));
        assert!(Document::from_json(&json!("not an object")).is_err());
    }

    #[test]
    fn test_numeric_id_and_bad_field_name() {
        let doc = Document::from_json(&json!({"id": 42})).unwrap();
        assert_eq!(doc.id, "42");

        assert!(matches!(
            Document::from_json(&json!({"id": "a", "bad:name": 1})),
            Err(QuarryError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_to_json_round_trip() {
        let doc = Document::new("d1")
            .with_field("title", "Rust")
            .with_field("rating", 4.5)
            .with_field("geo", GeoPoint::new(48.85, 2.35));
        let json = doc.to_json();
        assert_eq!(json["id"], "d1");
        assert_eq!(json["geo"], json!([2.35, 48.85]));
        assert_eq!(Document::from_json(&json).unwrap(), doc);
    }

    #[test]
    fn test_geo_point_parsing() {
        assert_eq!(
            GeoPoint::from_json(&json!({"lat": 1.5, "lng": 2.5})),
            Some(GeoPoint::new(1.5, 2.5))
        );
        assert_eq!(GeoPoint::from_json(&json!([1, "x"])), None);
        assert!(GeoPoint::new(45.0, 90.0).is_valid());
        assert!(!GeoPoint::new(95.0, 0.0).is_valid());
    }

    #[test]
    fn test_display_string() {
        assert_eq!(FieldValue::Number(299.0).display_string(), "299");
        assert_eq!(FieldValue::Number(15.99).display_string(), "15.99");
        assert_eq!(FieldValue::Boolean(false).display_string(), "false");
    }

    #[test]
    fn test_bincode_round_trip() {
        let doc = Document::new("b1")
            .with_field("name", "widget")
            .with_field("where", GeoPoint::new(10.0, 20.0));
        let bytes = bincode::serialize(&doc).unwrap();
        let restored: Document = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored, doc);
    }
}
