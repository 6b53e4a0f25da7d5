// 📍 POI Entity - A named, typed point on the map
//
// "The id is IDENTITY, everything else is a VALUE"
//
// The POI keeps the NAME of its type, not the type itself. Every read goes
// back to the schema registry, so renaming a type is visible everywhere at
// once without sharing mutable state.

use crate::attributes::{AttributeMap, AttributeValue};
use crate::ids::PoiId;
use serde::{Deserialize, Serialize};

/// Point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    /// Stable identity, never reused
    pub id: PoiId,

    pub name: String,

    /// Key into the schema registry
    #[serde(rename = "type")]
    pub type_name: String,

    pub x: i64,
    pub y: i64,

    /// One entry per attribute declared on the type
    pub attributes: AttributeMap,
}

impl Poi {
    pub fn new(id: PoiId, name: impl Into<String>, type_name: impl Into<String>, x: i64, y: i64) -> Self {
        Poi {
            id,
            name: name.into(),
            type_name: type_name.into(),
            x,
            y,
            attributes: AttributeMap::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Euclidean distance from this POI to `(x, y)`
    pub fn distance_to(&self, x: i64, y: i64) -> f64 {
        let dx = self.x as f64 - x as f64;
        let dy = self.y as f64 - y as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Euclidean distance between two POIs
    pub fn distance_between(&self, other: &Poi) -> f64 {
        self.distance_to(other.x, other.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poi_creation() {
        let poi = Poi::new(PoiId::new(1), "Acropolis", "monument", 10, 20);
        assert_eq!(poi.name, "Acropolis");
        assert_eq!(poi.type_name, "monument");
        assert!(poi.attributes.is_empty());
        assert!(poi.attribute("height").is_none());
    }

    #[test]
    fn test_distance_three_four_five() {
        let a = Poi::new(PoiId::new(1), "a", "t", 0, 0);
        let b = Poi::new(PoiId::new(2), "b", "t", 3, 4);
        assert_eq!(a.distance_between(&b), 5.0);
        assert_eq!(b.distance_to(3, 4), 0.0);
    }

    #[test]
    fn test_distance_to_extreme_coordinates() {
        let poi = Poi::new(PoiId::new(1), "a", "t", 5, 5);
        assert!(poi.distance_to(i64::MIN, 0) > 9.0e18);
        assert!(poi.distance_to(i64::MAX, i64::MAX).is_finite());
    }

    #[test]
    fn test_serializes_type_key() {
        let poi = Poi::new(PoiId::new(3), "Louvre", "museum", 1, 2);
        let json = serde_json::to_value(&poi).unwrap();
        assert_eq!(json["type"], "museum");
        assert_eq!(json["id"], 3);
    }
}
