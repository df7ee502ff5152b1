//! 国土数値情報 行政区域データ (N03) preprocessing.
//!
//! The source file holds one record per polygon fragment. Grouping by area
//! code and merging yields one feature per municipality with its extent.

mod group;
mod merge;
mod pipeline;

pub use group::{area_code, group_by_area_code, AreaCode, FeatureGroup};
pub use merge::{aggregate_bbox, merge_group};
pub use pipeline::{extract_features, preprocess};

/// Prefecture name, e.g. "東京都".
pub const PREF_NAME_KEY: &str = "N03_001";

/// County or designated-city name. Null for most municipalities.
pub const COUNTY_NAME_KEY: &str = "N03_003";

/// Municipality name.
pub const MUNICIPALITY_NAME_KEY: &str = "N03_004";

/// Administrative-area code. Null for land not yet assigned to a municipality.
pub const AREA_CODE_KEY: &str = "N03_007";
