//! GeoJSON feature types as they appear in the N03 dataset.
//!
//! Coordinates are `Coordinate`s and other JSON numbers go through
//! serde_json's arbitrary-precision mode, so every coordinate and property
//! value is written back with exactly the text it was read with.

use serde::de::Error as _;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use super::{BoundingBox, Coordinate};

/// Feature attributes, in document order.
pub type Properties = Map<String, Value>;

/// A closed sequence of positions. The first ring of a polygon is its
/// exterior, the rest are holes.
pub type Ring = Vec<Position>;

/// `[lon, lat, ...]`
///
/// Ordinates past the second (altitude, measure) are carried through
/// verbatim and take no part in any computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    lon: Coordinate,
    lat: Coordinate,
    extra: Vec<Number>,
}

impl Position {
    pub fn new(lon: impl Into<Coordinate>, lat: impl Into<Coordinate>) -> Self {
        Self {
            lon: lon.into(),
            lat: lat.into(),
            extra: Vec::new(),
        }
    }

    pub fn lon(&self) -> &Coordinate {
        &self.lon
    }

    pub fn lat(&self) -> &Coordinate {
        &self.lat
    }

    pub fn extra(&self) -> &[Number] {
        &self.extra
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2 + self.extra.len()))?;
        seq.serialize_element(&self.lon)?;
        seq.serialize_element(&self.lat)?;
        for ordinate in &self.extra {
            seq.serialize_element(ordinate)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ordinates = Vec::<Number>::deserialize(deserializer)?;
        if ordinates.len() < 2 {
            return Err(D::Error::invalid_length(
                ordinates.len(),
                &"a position with at least two ordinates",
            ));
        }

        let mut ordinates = ordinates.into_iter();
        let coordinate = |number: Option<Number>| -> Result<Coordinate, D::Error> {
            number
                .ok_or_else(|| D::Error::custom("missing ordinate"))?
                .as_str()
                .parse()
                .map_err(D::Error::custom)
        };
        let lon = coordinate(ordinates.next())?;
        let lat = coordinate(ordinates.next())?;

        Ok(Self {
            lon,
            lat,
            extra: ordinates.collect(),
        })
    }
}

/// Geometry of a feature.
///
/// Only polygonal shapes carry typed coordinates. Anything else is kept as
/// its raw JSON object so a lone feature can still pass through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
    Other(Map<String, Value>),
}

impl Geometry {
    /// The GeoJSON `type` string.
    pub fn type_name(&self) -> &str {
        match self {
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::Other(object) => object
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("Unknown"),
        }
    }

    /// Exterior ring of every polygon in this geometry.
    pub fn exterior_rings(&self) -> Vec<&[Position]> {
        match self {
            Geometry::Polygon(rings) => rings.first().map(Vec::as_slice).into_iter().collect(),
            Geometry::MultiPolygon(polygons) => polygons
                .iter()
                .filter_map(|rings| rings.first().map(Vec::as_slice))
                .collect(),
            Geometry::Other(_) => Vec::new(),
        }
    }
}

impl Serialize for Geometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Geometry::Polygon(rings) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "Polygon")?;
                map.serialize_entry("coordinates", rings)?;
                map.end()
            }
            Geometry::MultiPolygon(polygons) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "MultiPolygon")?;
                map.serialize_entry("coordinates", polygons)?;
                map.end()
            }
            Geometry::Other(object) => object.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Geometry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut object = Map::<String, Value>::deserialize(deserializer)?;

        let kind = match object.get("type") {
            Some(Value::String(kind)) => kind.clone(),
            _ => return Err(D::Error::missing_field("type")),
        };

        match kind.as_str() {
            "Polygon" => {
                let coordinates = object
                    .remove("coordinates")
                    .ok_or_else(|| D::Error::missing_field("coordinates"))?;
                serde_json::from_value(coordinates)
                    .map(Geometry::Polygon)
                    .map_err(D::Error::custom)
            }
            "MultiPolygon" => {
                let coordinates = object
                    .remove("coordinates")
                    .ok_or_else(|| D::Error::missing_field("coordinates"))?;
                serde_json::from_value(coordinates)
                    .map(Geometry::MultiPolygon)
                    .map_err(D::Error::custom)
            }
            _ => Ok(Geometry::Other(object)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
enum FeatureTag {
    #[default]
    Feature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
enum CollectionTag {
    #[default]
    FeatureCollection,
}

/// One polygon record of the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFeature {
    #[serde(rename = "type")]
    tag: FeatureTag,

    #[serde(default)]
    pub properties: Properties,

    /// `null` or missing in the source becomes `None`.
    #[serde(default)]
    pub geometry: Option<Geometry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl RawFeature {
    pub fn new(properties: Properties, geometry: Option<Geometry>) -> Self {
        Self {
            tag: FeatureTag::Feature,
            properties,
            geometry,
            bbox: None,
        }
    }

    /// Look up a property that holds a string.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    pub fn geometry_type(&self) -> &str {
        self.geometry.as_ref().map_or("null", Geometry::type_name)
    }
}

/// Top level of a GeoJSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    tag: CollectionTag,

    pub features: Vec<RawFeature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<RawFeature>) -> Self {
        Self {
            tag: CollectionTag::FeatureCollection,
            features,
        }
    }

    /// Parse a GeoJSON document, keeping the exact text of every number.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// One output feature per administrative area, with its computed extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedFeature {
    #[serde(rename = "type")]
    tag: FeatureTag,

    pub properties: Properties,

    pub geometry: Option<Geometry>,

    pub bbox: BoundingBox,
}

impl MergedFeature {
    pub fn new(properties: Properties, geometry: Option<Geometry>, bbox: BoundingBox) -> Self {
        Self {
            tag: FeatureTag::Feature,
            properties,
            geometry,
            bbox,
        }
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    pub fn geometry_type(&self) -> &str {
        self.geometry.as_ref().map_or("null", Geometry::type_name)
    }
}
