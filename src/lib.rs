//! ksj-n03 - Japanese administrative boundaries (国土数値情報 N03) as a STAC catalog
//!
//! This library provides the preprocessing core and the fetch/export modules
//! used by the `export` binary.

pub mod error;
pub mod models;
pub mod n03;
pub mod source;
pub mod stac;

pub use error::{DataConsistencyError, Error, InexactCoordinate, Result};
pub use models::{
    BoundingBox, Coordinate, FeatureCollection, Geometry, MergedFeature, RawFeature,
};
pub use n03::{extract_features, preprocess};
