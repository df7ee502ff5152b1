//! STAC catalog output for processed N03 features.
//!
//! One root catalog, one collection per (year, prefecture), one item per
//! administrative area.

mod builder;
mod types;
mod writer;

pub use builder::{build_collection, edition_interval, edition_start};
pub use types::{
    Asset, Catalog, Collection, Extent, Item, Link, Provider, SpatialExtent, TemporalExtent,
    STAC_VERSION,
};
pub use writer::{CatalogWriter, WriteSummary};
