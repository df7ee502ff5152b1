//! STAC 1.0.0 document structures.
//!
//! Only the fields this exporter emits are modelled. Child collections and
//! items are held in memory next to their parent and never serialized inline;
//! the writer turns them into links.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{BoundingBox, Geometry, Properties};

pub const STAC_VERSION: &str = "1.0.0";

/// Relation between two STAC documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    pub const JSON: &'static str = "application/json";
    pub const GEOJSON: &'static str = "application/geo+json";
    pub const ZIP: &'static str = "application/zip";

    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            media_type: None,
            title: None,
        }
    }

    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    pub description: String,
    pub roles: Vec<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialExtent {
    pub bbox: Vec<BoundingBox>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalExtent {
    pub interval: Vec<[DateTime<Utc>; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub spatial: SpatialExtent,
    pub temporal: TemporalExtent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

/// One administrative area as a STAC Item (a GeoJSON Feature).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "type")]
    pub kind: String,
    pub stac_version: String,
    pub id: String,
    pub geometry: Option<Geometry>,
    pub bbox: BoundingBox,
    pub properties: Properties,
    pub links: Vec<Link>,
    pub assets: BTreeMap<String, Asset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

/// One (year, prefecture) as a STAC Collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(rename = "type")]
    pub kind: String,
    pub stac_version: String,
    pub id: String,
    pub title: String,
    pub description: String,
    pub license: String,
    pub providers: Vec<Provider>,
    pub extent: Extent,
    pub links: Vec<Link>,

    #[serde(skip)]
    pub items: Vec<Item>,
}

impl Collection {
    pub fn add_item(&mut self, mut item: Item) {
        item.collection = Some(self.id.clone());
        self.items.push(item);
    }
}

/// Root of the catalog tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "type")]
    pub kind: String,
    pub stac_version: String,
    pub id: String,
    pub title: String,
    pub description: String,
    pub links: Vec<Link>,

    #[serde(skip)]
    pub children: Vec<Collection>,
}

impl Catalog {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind: "Catalog".to_string(),
            stac_version: STAC_VERSION.to_string(),
            id: id.into(),
            title: title.into(),
            description: description.into(),
            links: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn add_child(&mut self, collection: Collection) {
        self.children.push(collection);
    }

    pub fn item_count(&self) -> usize {
        self.children.iter().map(|c| c.items.len()).sum()
    }
}
