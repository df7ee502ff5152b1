//! Extraction of the GeoJSON member from a downloaded N03 zip.

use std::io::{Cursor, Read};

use tracing::debug;
use zip::ZipArchive;

use crate::error::SourceError;

/// Upper bound on the buffer reserved from an entry's declared size. The
/// largest prefecture's GeoJSON is well under this; the buffer still grows
/// past it if the data is really longer.
const MAX_CAPACITY_HINT: u64 = 256 * 1024 * 1024;

fn capacity_hint(declared_size: u64) -> usize {
    usize::try_from(declared_size.min(MAX_CAPACITY_HINT)).unwrap_or(0)
}

/// Return the text of the first `.geojson` entry, in archive order.
///
/// Archives also carry GML and Shapefile versions of the same data, which
/// are ignored.
pub fn extract_geojson(bytes: &[u8]) -> Result<String, SourceError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !entry.is_file() || !entry.name().to_ascii_lowercase().ends_with(".geojson") {
            continue;
        }

        debug!(entry = entry.name(), size = entry.size(), "Reading GeoJSON entry");
        let mut buf = Vec::with_capacity(capacity_hint(entry.size()));
        entry.read_to_end(&mut buf)?;
        return Ok(String::from_utf8(buf)?);
    }

    Err(SourceError::MissingGeoJson(format!(
        "with {} entries",
        archive.len()
    )))
}
