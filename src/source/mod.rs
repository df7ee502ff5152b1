//! Retrieval of N03 source archives from the 国土数値情報 download site.
//!
//! Given a year and a prefecture, produces the raw GeoJSON text contained in
//! the published zip, optionally through an on-disk cache.

mod archive;
mod fetcher;
mod http;

use std::fmt;
use std::str::FromStr;

use crate::error::SourceError;

pub use archive::extract_geojson;
pub use fetcher::Fetcher;
pub use http::{create_client, download_bytes, RetryPolicy};

/// Directory holding every N03 edition.
pub const DEFAULT_BASE_URL: &str = "https://nlftp.mlit.go.jp/ksj/gml/data/N03";

/// Archives up to this year use a two-digit year in their file name.
const LAST_TWO_DIGIT_YEAR: i32 = 2019;

/// JIS X 0401 prefecture code, `01` (北海道) to `47` (沖縄県).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrefCode(u8);

impl PrefCode {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 47;

    pub fn new(code: u8) -> Result<Self, SourceError> {
        if (Self::MIN..=Self::MAX).contains(&code) {
            Ok(Self(code))
        } else {
            Err(SourceError::InvalidPrefCode(code.to_string()))
        }
    }

    /// All 47 prefectures in code order.
    pub fn all() -> impl Iterator<Item = PrefCode> {
        (Self::MIN..=Self::MAX).map(PrefCode)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for PrefCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl FromStr for PrefCode {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SourceError::InvalidPrefCode(s.to_string());
        if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let code: u8 = s.parse().map_err(|_| invalid())?;
        Self::new(code).map_err(|_| invalid())
    }
}

/// Download URL of the archive for one (year, prefecture).
///
/// Editions up to 2019 abbreviate the year in the file name:
/// `N03-2018/N03-180101_13_GML.zip` but `N03-2022/N03-20220101_13_GML.zip`.
pub fn zip_url(base_url: &str, year: i32, pref_code: PrefCode) -> String {
    let stamp = if year > LAST_TWO_DIGIT_YEAR {
        year.to_string()
    } else {
        format!("{:02}", year.rem_euclid(100))
    };
    format!(
        "{}/N03-{}/N03-{}0101_{}_GML.zip",
        base_url.trim_end_matches('/'),
        year,
        stamp,
        pref_code
    )
}
