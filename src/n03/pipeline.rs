//! Group, merge and bound one prefecture's features.

use rayon::prelude::*;
use tracing::{debug, warn};

use super::{group_by_area_code, merge_group};
use crate::error::{DataConsistencyError, Result, SourceError};
use crate::models::{FeatureCollection, MergedFeature};

/// Turn raw polygon records into one feature per area code.
///
/// Groups are merged in parallel, but the result keeps the order in which
/// area codes first appear. A single inconsistent group fails the whole
/// collection.
pub fn preprocess(
    collection: &FeatureCollection,
) -> std::result::Result<Vec<MergedFeature>, DataConsistencyError> {
    let groups = group_by_area_code(&collection.features);

    let merged: Vec<MergedFeature> = groups
        .par_iter()
        .map(merge_group)
        .collect::<std::result::Result<_, _>>()?;

    for (group, feature) in groups.iter().zip(&merged) {
        if feature.bbox.is_sentinel() {
            warn!(
                area_code = %group.area_code,
                "No exterior ring points; bbox left at the sentinel value"
            );
        }
    }

    debug!(
        "Merged {} raw features into {} areas",
        collection.features.len(),
        merged.len()
    );

    Ok(merged)
}

/// Parse a raw GeoJSON document and preprocess it.
pub fn extract_features(text: &str) -> Result<Vec<MergedFeature>> {
    let collection = FeatureCollection::from_json(text).map_err(SourceError::from)?;
    Ok(preprocess(&collection)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::Geometry;

    const DOCUMENT: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature",
              "properties": { "N03_001": "北海道", "N03_004": "札幌市中央区", "N03_007": "01101" },
              "geometry": { "type": "Polygon", "coordinates": [[[141.3, 43.0], [141.4, 43.1], [141.3, 43.0]]] } },
            { "type": "Feature",
              "properties": { "N03_001": "北海道", "N03_004": null, "N03_007": null },
              "geometry": { "type": "Polygon", "coordinates": [[[145.0, 44.0], [145.1, 44.1], [145.0, 44.0]]] } },
            { "type": "Feature",
              "properties": { "N03_001": "北海道", "N03_004": "函館市", "N03_007": "01202" },
              "geometry": { "type": "Polygon", "coordinates": [[[140.7, 41.7], [140.8, 41.8], [140.7, 41.7]]] } },
            { "type": "Feature",
              "properties": { "N03_001": "北海道", "N03_004": "札幌市中央区", "N03_007": "01101" },
              "geometry": { "type": "Polygon", "coordinates": [[[141.2, 42.9], [141.25, 42.95], [141.2, 42.9]]] } }
        ]
    }"#;

    #[test]
    fn test_extract_features_end_to_end() {
        let features = extract_features(DOCUMENT).unwrap();
        let codes: Vec<&str> = features
            .iter()
            .filter_map(|f| f.property_str("N03_007"))
            .collect();
        assert_eq!(codes, vec!["01101", "01202"]);

        assert_eq!(features[0].geometry_type(), "MultiPolygon");
        assert_eq!(features[1].geometry_type(), "Polygon");
        assert_eq!(
            serde_json::to_string(&features[0].bbox).unwrap(),
            "[141.2,42.9,141.4,43.1]"
        );
    }

    #[test]
    fn test_unassigned_land_never_reaches_output() {
        let features = extract_features(DOCUMENT).unwrap();
        assert_eq!(features.len(), 2);
        assert!(features
            .iter()
            .all(|f| f.property_str("N03_007").is_some()));
    }

    #[test]
    fn test_one_bad_group_fails_everything() {
        let broken = DOCUMENT.replacen("\"01202\"", "\"01101\"", 1);
        let err = extract_features(&broken).unwrap_err();
        assert!(matches!(
            err,
            Error::DataConsistency(DataConsistencyError::InconsistentProperties { .. })
        ));
    }

    #[test]
    fn test_numeric_and_string_codes_are_separate_areas() {
        let document = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature",
                  "properties": { "N03_001": "東京都", "N03_007": 13101 },
                  "geometry": { "type": "Polygon", "coordinates": [[[139.7, 35.6], [139.8, 35.7], [139.7, 35.6]]] } },
                { "type": "Feature",
                  "properties": { "N03_001": "東京都", "N03_007": "13101" },
                  "geometry": { "type": "Polygon", "coordinates": [[[139.5, 35.5], [139.6, 35.6], [139.5, 35.5]]] } }
            ]
        }"#;
        let features = extract_features(document).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].geometry_type(), "Polygon");
        assert_eq!(features[1].property_str("N03_007"), Some("13101"));
    }

    #[test]
    fn test_malformed_document_is_a_source_error() {
        let err = extract_features("{\"type\": \"FeatureCollection\"}").unwrap_err();
        assert!(matches!(err, Error::Source(_)));
    }

    #[test]
    fn test_empty_collection() {
        let collection = FeatureCollection::new(Vec::new());
        assert!(preprocess(&collection).unwrap().is_empty());
    }

    #[test]
    fn test_output_keeps_polygon_coordinates() {
        let features = extract_features(DOCUMENT).unwrap();
        let Some(Geometry::MultiPolygon(polygons)) = &features[0].geometry else {
            panic!("expected a multipolygon");
        };
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[1][0][1].lon().to_string(), "141.25");
    }
}
