//! Partitioning of raw features by administrative-area code.

use std::fmt;

use hashbrown::HashMap;
use serde_json::Value;
use tracing::debug;

use super::AREA_CODE_KEY;
use crate::models::RawFeature;

/// Value of the area-code property.
///
/// Codes are strings in every published edition. Any other non-null value
/// is keyed by its JSON text in a separate variant, so the number `13101`
/// and the string `"13101"` never share a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AreaCode {
    Text(String),
    Json(String),
}

impl AreaCode {
    pub fn as_str(&self) -> &str {
        match self {
            AreaCode::Text(code) | AreaCode::Json(code) => code,
        }
    }
}

impl fmt::Display for AreaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All features sharing one area code, in source order. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureGroup<'a> {
    pub area_code: AreaCode,
    features: Vec<&'a RawFeature>,
}

impl<'a> FeatureGroup<'a> {
    pub fn new(area_code: AreaCode, first: &'a RawFeature) -> Self {
        Self {
            area_code,
            features: vec![first],
        }
    }

    pub fn push(&mut self, feature: &'a RawFeature) {
        self.features.push(feature);
    }

    pub fn first(&self) -> &'a RawFeature {
        self.features[0]
    }

    pub fn features(&self) -> &[&'a RawFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Area code of a feature, or `None` for unassigned land.
pub fn area_code(feature: &RawFeature) -> Option<AreaCode> {
    match feature.properties.get(AREA_CODE_KEY)? {
        Value::Null => None,
        Value::String(code) => Some(AreaCode::Text(code.clone())),
        other => Some(AreaCode::Json(other.to_string())),
    }
}

/// Group features by area code, keeping first-seen order of codes and of
/// features within each code. Features without a code are dropped.
pub fn group_by_area_code(features: &[RawFeature]) -> Vec<FeatureGroup<'_>> {
    let mut index: HashMap<AreaCode, usize> = HashMap::new();
    let mut groups: Vec<FeatureGroup<'_>> = Vec::new();
    let mut unassigned = 0usize;

    for feature in features {
        let Some(code) = area_code(feature) else {
            unassigned += 1;
            continue;
        };

        match index.get(&code) {
            Some(&position) => groups[position].push(feature),
            None => {
                index.insert(code.clone(), groups.len());
                groups.push(FeatureGroup::new(code, feature));
            }
        }
    }

    debug!(
        groups = groups.len(),
        unassigned,
        "Grouped {} features by area code",
        features.len()
    );

    groups
}
