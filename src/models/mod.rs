//! Core data models for the N03 pipeline.

pub mod bbox;
pub mod coordinate;
pub mod feature;

pub use bbox::BoundingBox;
pub use coordinate::Coordinate;
pub use feature::{
    FeatureCollection, Geometry, MergedFeature, Position, Properties, RawFeature, Ring,
};
