//! Merging of one area-code group into a single feature.

use crate::error::DataConsistencyError;
use crate::models::{BoundingBox, Geometry, MergedFeature, RawFeature};

use super::FeatureGroup;

/// Merge one group into a single feature with its extent.
///
/// A lone member is copied as is. Several members must all be Polygons and
/// are wrapped, in group order, into one MultiPolygon. No geometric union is
/// performed.
pub fn merge_group(group: &FeatureGroup<'_>) -> Result<MergedFeature, DataConsistencyError> {
    let first = group.first();

    if group
        .features()
        .iter()
        .any(|feature| feature.properties != first.properties)
    {
        return Err(DataConsistencyError::InconsistentProperties {
            area_code: group.area_code.to_string(),
        });
    }

    let geometry = if group.len() > 1 {
        let mut polygons = Vec::with_capacity(group.len());
        for feature in group.features() {
            match &feature.geometry {
                Some(Geometry::Polygon(rings)) => polygons.push(rings.clone()),
                _ => {
                    return Err(DataConsistencyError::UnsupportedGeometryType {
                        area_code: group.area_code.to_string(),
                        geometry_type: feature.geometry_type().to_string(),
                    })
                }
            }
        }
        Some(Geometry::MultiPolygon(polygons))
    } else {
        first.geometry.clone()
    };

    let bbox = aggregate_bbox(group.features().iter().copied());

    Ok(MergedFeature::new(first.properties.clone(), geometry, bbox))
}

/// Fold the exterior rings of the source features into one box.
///
/// Holes never extend past their exterior ring, so they are skipped.
/// Features without polygonal geometry contribute nothing.
pub fn aggregate_bbox<'a, I>(features: I) -> BoundingBox
where
    I: IntoIterator<Item = &'a RawFeature>,
{
    features
        .into_iter()
        .filter_map(|feature| feature.geometry.as_ref())
        .flat_map(Geometry::exterior_rings)
        .fold(BoundingBox::sentinel(), |mut bbox, ring| {
            bbox.fold_ring(ring);
            bbox
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Position, Properties, Ring};
    use crate::n03::group_by_area_code;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};

    fn ring(points: &[(Decimal, Decimal)]) -> Ring {
        points
            .iter()
            .map(|&(lon, lat)| Position::new(lon, lat))
            .collect()
    }

    fn properties(code: &str, name: &str) -> Properties {
        let Value::Object(map) = json!({
            "N03_001": "東京都",
            "N03_004": name,
            "N03_007": code,
        }) else {
            unreachable!()
        };
        map
    }

    fn polygon_feature(code: &str, rings: Vec<Ring>) -> RawFeature {
        RawFeature::new(properties(code, "千代田区"), Some(Geometry::Polygon(rings)))
    }

    fn ring_a() -> Ring {
        ring(&[
            (dec!(100), dec!(30)),
            (dec!(101), dec!(30)),
            (dec!(101), dec!(31)),
            (dec!(100), dec!(31)),
            (dec!(100), dec!(30)),
        ])
    }

    fn ring_b() -> Ring {
        ring(&[
            (dec!(102), dec!(32)),
            (dec!(103), dec!(32)),
            (dec!(103), dec!(33)),
            (dec!(102), dec!(33)),
            (dec!(102), dec!(32)),
        ])
    }

    #[test]
    fn test_two_polygons_become_multipolygon() {
        let features = vec![
            polygon_feature("13101", vec![ring_a()]),
            polygon_feature("13101", vec![ring_b()]),
        ];
        let groups = group_by_area_code(&features);
        let merged = merge_group(&groups[0]).unwrap();

        assert_eq!(
            merged.geometry,
            Some(Geometry::MultiPolygon(vec![vec![ring_a()], vec![ring_b()]]))
        );
        assert_eq!(
            merged.bbox,
            BoundingBox::new(dec!(100), dec!(30), dec!(103), dec!(33))
        );
        assert_eq!(merged.properties, features[0].properties);
    }

    #[test]
    fn test_many_polygons_keep_group_order() {
        let ring_c = ring(&[
            (dec!(99.5), dec!(29.5)),
            (dec!(99.9), dec!(29.5)),
            (dec!(99.9), dec!(29.9)),
            (dec!(99.5), dec!(29.5)),
        ]);
        let features = vec![
            polygon_feature("13101", vec![ring_b()]),
            polygon_feature("13101", vec![ring_a()]),
            polygon_feature("13102", vec![ring_a()]),
            polygon_feature("13101", vec![ring_c.clone()]),
            polygon_feature("13101", vec![ring_b()]),
        ];
        let groups = group_by_area_code(&features);
        let merged = merge_group(&groups[0]).unwrap();

        let Some(Geometry::MultiPolygon(polygons)) = &merged.geometry else {
            panic!("expected a MultiPolygon, got {:?}", merged.geometry);
        };
        assert_eq!(polygons.len(), 4);
        assert_eq!(
            polygons,
            &vec![vec![ring_b()], vec![ring_a()], vec![ring_c], vec![ring_b()]]
        );
        assert_eq!(
            merged.bbox,
            BoundingBox::new(dec!(99.5), dec!(29.5), dec!(103), dec!(33))
        );
    }

    #[test]
    fn test_single_polygon_is_copied() {
        let lone = ring(&[
            (dec!(139.5), dec!(35.6)),
            (dec!(139.7), dec!(35.6)),
            (dec!(139.7), dec!(35.8)),
            (dec!(139.5), dec!(35.8)),
            (dec!(139.5), dec!(35.6)),
        ]);
        let features = vec![polygon_feature("13101", vec![lone])];
        let groups = group_by_area_code(&features);
        let merged = merge_group(&groups[0]).unwrap();

        assert_eq!(merged.geometry_type(), "Polygon");
        assert_eq!(merged.geometry, features[0].geometry);
        assert_eq!(merged.properties, features[0].properties);
        assert_eq!(
            merged.bbox,
            BoundingBox::new(dec!(139.5), dec!(35.6), dec!(139.7), dec!(35.8))
        );
    }

    #[test]
    fn test_merged_feature_does_not_alias_source() {
        let features = vec![polygon_feature("13101", vec![ring_a()])];
        let groups = group_by_area_code(&features);
        let mut merged = merge_group(&groups[0]).unwrap();

        merged
            .properties
            .insert("N03_004".to_string(), json!("changed"));
        if let Some(Geometry::Polygon(rings)) = merged.geometry.as_mut() {
            rings[0].clear();
        }

        assert_eq!(features[0].property_str("N03_004"), Some("千代田区"));
        assert_eq!(
            features[0].geometry,
            Some(Geometry::Polygon(vec![ring_a()]))
        );
    }

    #[test]
    fn test_holes_are_kept_but_do_not_widen_bbox() {
        let hole = ring(&[(dec!(0), dec!(0)), (dec!(200), dec!(100))]);
        let features = vec![
            polygon_feature("13101", vec![ring_a(), hole.clone()]),
            polygon_feature("13101", vec![ring_b()]),
        ];
        let groups = group_by_area_code(&features);
        let merged = merge_group(&groups[0]).unwrap();

        assert_eq!(
            merged.bbox,
            BoundingBox::new(dec!(100), dec!(30), dec!(103), dec!(33))
        );
        assert_eq!(
            merged.geometry,
            Some(Geometry::MultiPolygon(vec![
                vec![ring_a(), hole],
                vec![ring_b()]
            ]))
        );
    }

    #[test]
    fn test_differing_properties_are_rejected() {
        let mut other = polygon_feature("13101", vec![ring_b()]);
        other
            .properties
            .insert("N03_004".to_string(), json!("別の区"));
        let features = vec![polygon_feature("13101", vec![ring_a()]), other];
        let groups = group_by_area_code(&features);

        assert_eq!(
            merge_group(&groups[0]),
            Err(DataConsistencyError::InconsistentProperties {
                area_code: "13101".to_string()
            })
        );
    }

    #[test]
    fn test_non_polygon_member_is_rejected() {
        let multi = RawFeature::new(
            properties("13101", "千代田区"),
            Some(Geometry::MultiPolygon(vec![vec![ring_b()]])),
        );
        let features = vec![polygon_feature("13101", vec![ring_a()]), multi];
        let groups = group_by_area_code(&features);

        assert_eq!(
            merge_group(&groups[0]),
            Err(DataConsistencyError::UnsupportedGeometryType {
                area_code: "13101".to_string(),
                geometry_type: "MultiPolygon".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_geometry_in_group_is_rejected() {
        let empty = RawFeature::new(properties("13101", "千代田区"), None);
        let features = vec![polygon_feature("13101", vec![ring_a()]), empty];
        let groups = group_by_area_code(&features);

        let err = merge_group(&groups[0]).unwrap_err();
        assert!(err.to_string().starts_with("Unexpected geometry type: null"));
    }

    #[test]
    fn test_properties_checked_before_geometry() {
        let other = RawFeature::new(properties("13101", "別の区"), None);
        let features = vec![polygon_feature("13101", vec![ring_a()]), other];
        let groups = group_by_area_code(&features);

        assert!(matches!(
            merge_group(&groups[0]),
            Err(DataConsistencyError::InconsistentProperties { .. })
        ));
    }

    #[test]
    fn test_bbox_is_independent_of_feature_order() {
        let a = polygon_feature("1", vec![ring_a()]);
        let b = polygon_feature("1", vec![ring_b()]);
        assert_eq!(aggregate_bbox([&a, &b]), aggregate_bbox([&b, &a]));
    }

    #[test]
    fn test_empty_ring_leaves_sentinel() {
        let feature = polygon_feature("1", vec![Vec::new()]);
        assert!(aggregate_bbox([&feature]).is_sentinel());
    }
}
