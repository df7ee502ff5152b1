//! Error types for the N03 pipeline.
//!
//! Data-shape failures of the core, fetch failures and catalog failures each
//! have their own enum. `Error` wraps all three.

use thiserror::Error;

/// The source dataset violates an assumption the merge relies on.
///
/// Both variants are fatal for the current (year, prefecture) unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataConsistencyError {
    /// Members of one area-code group disagree on their attributes.
    #[error("Unexpected properties: features of area {area_code} carry differing properties")]
    InconsistentProperties { area_code: String },

    /// A multi-member group contains something other than a Polygon.
    #[error("Unexpected geometry type: {geometry_type} in multi-feature area {area_code}")]
    UnsupportedGeometryType {
        area_code: String,
        geometry_type: String,
    },
}

/// A source number that `Decimal` cannot hold without rounding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Coordinate {text} cannot be represented exactly: {reason}")]
pub struct InexactCoordinate {
    pub text: String,
    pub reason: String,
}

/// Failures while obtaining or decoding the source GeoJSON.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// All download attempts failed with transient errors.
    #[error("Download of {url} failed after {attempts} attempts: {message}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        message: String,
    },

    /// The downloaded archive could not be read.
    #[error("Invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The archive has no GeoJSON member.
    #[error("No .geojson entry found in archive {0}")]
    MissingGeoJson(String),

    /// The GeoJSON entry is not valid UTF-8.
    #[error("GeoJSON is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The document is not a feature collection we understand.
    #[error("Failed to parse GeoJSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// IO error (cache reads and writes).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Prefecture code outside 01..=47.
    #[error("Invalid prefecture code: '{0}'. Expected 01 to 47")]
    InvalidPrefCode(String),
}

/// Failures while assembling or writing the STAC catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A collection needs at least one feature to name its prefecture.
    #[error("No features for year {year} prefecture {pref_code}")]
    EmptyCollection { year: i32, pref_code: String },

    /// A feature lacks a property the catalog needs.
    #[error("Feature is missing property {0}")]
    MissingProperty(&'static str),

    /// Base href could not be parsed or joined.
    #[error("Invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),

    /// Year outside the range chrono can represent.
    #[error("Invalid year: {0}")]
    InvalidYear(i32),

    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Umbrella error for library consumers.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    DataConsistency(#[from] DataConsistencyError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;
