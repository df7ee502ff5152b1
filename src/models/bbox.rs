//! Bounding box arithmetic over exact decimal coordinates.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Coordinate, Position};

/// Extent as `[minLon, minLat, maxLon, maxLat]`.
///
/// A fresh box is the inverted sentinel `[180, 90, -180, -90]`, so the first
/// folded point always replaces all four bounds. Each bound keeps the source
/// text of the coordinate it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub min_lon: Coordinate,
    pub min_lat: Coordinate,
    pub max_lon: Coordinate,
    pub max_lat: Coordinate,
}

impl BoundingBox {
    pub fn new(
        min_lon: impl Into<Coordinate>,
        min_lat: impl Into<Coordinate>,
        max_lon: impl Into<Coordinate>,
        max_lat: impl Into<Coordinate>,
    ) -> Self {
        Self {
            min_lon: min_lon.into(),
            min_lat: min_lat.into(),
            max_lon: max_lon.into(),
            max_lat: max_lat.into(),
        }
    }

    /// The starting value of every fold.
    pub fn sentinel() -> Self {
        Self::new(
            Decimal::from(180),
            Decimal::from(90),
            Decimal::from(-180),
            Decimal::from(-90),
        )
    }

    /// Componentwise min of the lower bounds and max of the upper bounds.
    /// On ties the current bound, and so its text, is kept.
    fn widen(
        &mut self,
        min_lon: &Coordinate,
        min_lat: &Coordinate,
        max_lon: &Coordinate,
        max_lat: &Coordinate,
    ) {
        if *min_lon < self.min_lon {
            self.min_lon = min_lon.clone();
        }
        if *min_lat < self.min_lat {
            self.min_lat = min_lat.clone();
        }
        if *max_lon > self.max_lon {
            self.max_lon = max_lon.clone();
        }
        if *max_lat > self.max_lat {
            self.max_lat = max_lat.clone();
        }
    }

    /// Widen the box to include one position.
    pub fn fold_point(&mut self, position: &Position) {
        let (lon, lat) = (position.lon(), position.lat());
        self.widen(lon, lat, lon, lat);
    }

    /// Widen the box to include every position of a ring.
    pub fn fold_ring(&mut self, ring: &[Position]) {
        for position in ring {
            self.fold_point(position);
        }
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut bbox = self.clone();
        bbox.widen(&other.min_lon, &other.min_lat, &other.max_lon, &other.max_lat);
        bbox
    }

    /// True while nothing has been folded in (or only empty rings were).
    pub fn is_sentinel(&self) -> bool {
        *self == Self::sentinel()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::sentinel()
    }
}

impl From<[Coordinate; 4]> for BoundingBox {
    fn from([min_lon, min_lat, max_lon, max_lat]: [Coordinate; 4]) -> Self {
        Self::new(min_lon, min_lat, max_lon, max_lat)
    }
}

impl Serialize for BoundingBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [&self.min_lon, &self.min_lat, &self.max_lon, &self.max_lat].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BoundingBox {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <[Coordinate; 4]>::deserialize(deserializer).map(BoundingBox::from)
    }
}
