//! Assembly of N03 collections and items.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use serde_json::Value;

use super::types::{
    Asset, Collection, Extent, Item, Link, Provider, SpatialExtent, TemporalExtent, STAC_VERSION,
};
use crate::error::CatalogError;
use crate::models::{BoundingBox, MergedFeature};
use crate::n03::{AREA_CODE_KEY, COUNTY_NAME_KEY, MUNICIPALITY_NAME_KEY, PREF_NAME_KEY};
use crate::source::PrefCode;

const LICENSE: &str = "CC-BY-4.0";

/// Editions are dated January 1st, Japan time.
const JST_OFFSET_SECS: i32 = 9 * 3600;

fn providers() -> Vec<Provider> {
    vec![
        Provider {
            name: "国土交通省".to_string(),
            description: "国土数値情報（行政区域データ）".to_string(),
            roles: vec!["licensor".to_string(), "producer".to_string()],
            url: "https://nlftp.mlit.go.jp/ksj/gml/datalist/KsjTmplt-N03-v3_1.html".to_string(),
        },
        Provider {
            name: "@sankichi92".to_string(),
            description: "STACカタログへの加工とホスティングを実施".to_string(),
            roles: vec!["processor".to_string(), "host".to_string()],
            url: "https://github.com/sankichi92".to_string(),
        },
    ]
}

/// Midnight of January 1st of `year`, in JST.
pub fn edition_start(year: i32) -> Result<DateTime<FixedOffset>, CatalogError> {
    let jst = FixedOffset::east_opt(JST_OFFSET_SECS).ok_or(CatalogError::InvalidYear(year))?;
    jst.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .ok_or(CatalogError::InvalidYear(year))
}

/// The whole of `year` in JST, as a closed UTC interval.
pub fn edition_interval(year: i32) -> Result<[DateTime<Utc>; 2], CatalogError> {
    let start = edition_start(year)?;
    let end = edition_start(year + 1)? - Duration::seconds(1);
    Ok([start.with_timezone(&Utc), end.with_timezone(&Utc)])
}

/// `{catalog_id}-{year}0101-{suffix}`
fn edition_id(catalog_id: &str, year: i32, suffix: &str) -> String {
    format!("{catalog_id}-{year}0101-{suffix}")
}

fn string_property<'a>(feature: &'a MergedFeature, key: &'static str) -> Result<&'a str, CatalogError> {
    feature
        .property_str(key)
        .ok_or(CatalogError::MissingProperty(key))
}

/// Build the collection for one (year, prefecture) with one item per area.
///
/// `source_url` is the archive the features were extracted from.
pub fn build_collection(
    catalog_id: &str,
    year: i32,
    pref_code: PrefCode,
    source_url: &str,
    features: &[MergedFeature],
) -> Result<Collection, CatalogError> {
    let first = features.first().ok_or_else(|| CatalogError::EmptyCollection {
        year,
        pref_code: pref_code.to_string(),
    })?;
    let pref_name = string_property(first, PREF_NAME_KEY)?;

    let bbox = features
        .iter()
        .fold(BoundingBox::sentinel(), |acc, f| acc.union(&f.bbox));

    let mut collection = Collection {
        kind: "Collection".to_string(),
        stac_version: STAC_VERSION.to_string(),
        id: edition_id(catalog_id, year, &pref_code.to_string()),
        title: format!("{year} {pref_name}"),
        description: format!("{year}年{pref_name}の行政区域界コレクション。"),
        license: LICENSE.to_string(),
        providers: providers(),
        extent: Extent {
            spatial: SpatialExtent { bbox: vec![bbox] },
            temporal: TemporalExtent {
                interval: vec![edition_interval(year)?],
            },
        },
        links: vec![Link::new("derived_from", source_url)
            .media_type(Link::ZIP)
            .title("国土数値情報ダウンロードサイトの加工元コンテンツ")],
        items: Vec::with_capacity(features.len()),
    };

    let datetime = edition_start(year)?.to_rfc3339();
    let asset = Asset {
        href: source_url.to_string(),
        title: Some("加工元データ".to_string()),
        description: Some(format!(
            "加工元となった{year}年{pref_name}の行政区域データ。GML、Shapefile、GeoJSON を含む ZIP ファイル。"
        )),
        media_type: Some(Link::ZIP.to_string()),
        roles: vec!["data".to_string()],
    };

    for feature in features {
        let item = build_item(catalog_id, year, feature, &datetime, &asset)?;
        collection.add_item(item);
    }

    Ok(collection)
}

fn build_item(
    catalog_id: &str,
    year: i32,
    feature: &MergedFeature,
    datetime: &str,
    asset: &Asset,
) -> Result<Item, CatalogError> {
    let area_code = string_property(feature, AREA_CODE_KEY)?;
    let county = feature.property_str(COUNTY_NAME_KEY).unwrap_or_default();
    let municipality = feature.property_str(MUNICIPALITY_NAME_KEY).unwrap_or_default();

    let mut properties = feature.properties.clone();
    properties.insert(
        "title".to_string(),
        Value::String(format!("{county}{municipality}")),
    );
    properties.insert("datetime".to_string(), Value::String(datetime.to_string()));

    let mut assets = BTreeMap::new();
    assets.insert("data".to_string(), asset.clone());

    Ok(Item {
        kind: "Feature".to_string(),
        stac_version: STAC_VERSION.to_string(),
        id: edition_id(catalog_id, year, area_code),
        geometry: feature.geometry.clone(),
        bbox: feature.bbox.clone(),
        properties,
        links: Vec::new(),
        assets,
        collection: None,
    })
}
