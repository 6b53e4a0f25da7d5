// 📐 Shape Layer - POI type schemas
//
// A POI type is a name plus an ordered list of attribute names. The registry
// only knows about shapes; cascading a shape change onto existing POIs is the
// store's job (see store.rs).

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};

// ============================================================================
// POI TYPE
// ============================================================================

/// Named schema declaring which attributes its POIs carry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoiType {
    pub name: String,

    /// Declaration order is display and migration order
    pub attributes: Vec<String>,
}

impl PoiType {
    pub fn new(name: impl Into<String>) -> Self {
        PoiType {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }
}

// ============================================================================
// SCHEMA REGISTRY
// ============================================================================

/// Catalog of POI types, kept in creation order
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    types: Vec<PoiType>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        SchemaRegistry { types: Vec::new() }
    }

    pub fn get(&self, name: &str) -> Option<&PoiType> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn types(&self) -> impl Iterator<Item = &PoiType> {
        self.types.iter()
    }

    pub fn count(&self) -> usize {
        self.types.len()
    }

    fn get_mut(&mut self, name: &str) -> StoreResult<&mut PoiType> {
        self.types
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| StoreError::UnknownType(name.to_string()))
    }

    /// Register a new type with no attributes
    pub fn insert(&mut self, name: &str) -> StoreResult<()> {
        if self.contains(name) {
            return Err(StoreError::TypeExists(name.to_string()));
        }
        self.types.push(PoiType::new(name));
        Ok(())
    }

    /// Remove a type definition
    ///
    /// Callers must have checked that no POI still uses it.
    pub fn remove(&mut self, name: &str) -> StoreResult<PoiType> {
        let index = self
            .types
            .iter()
            .position(|t| t.name == name)
            .ok_or_else(|| StoreError::UnknownType(name.to_string()))?;
        Ok(self.types.remove(index))
    }

    /// Declare an attribute on a type
    ///
    /// Returns `Ok(false)` when the attribute was already declared.
    pub fn add_attribute(&mut self, type_name: &str, attribute: &str) -> StoreResult<bool> {
        let poi_type = self.get_mut(type_name)?;
        if poi_type.has_attribute(attribute) {
            return Ok(false);
        }
        poi_type.attributes.push(attribute.to_string());
        Ok(true)
    }

    pub fn remove_attribute(&mut self, type_name: &str, attribute: &str) -> StoreResult<()> {
        let poi_type = self.get_mut(type_name)?;
        let index = poi_type
            .attributes
            .iter()
            .position(|a| a == attribute)
            .ok_or_else(|| StoreError::UnknownAttribute {
                type_name: type_name.to_string(),
                attribute: attribute.to_string(),
            })?;
        poi_type.attributes.remove(index);
        Ok(())
    }

    /// Rename an attribute in place, keeping its position
    pub fn rename_attribute(&mut self, type_name: &str, old: &str, new: &str) -> StoreResult<()> {
        let poi_type = self.get_mut(type_name)?;
        if poi_type.has_attribute(new) {
            return Err(StoreError::AttributeExists {
                type_name: type_name.to_string(),
                attribute: new.to_string(),
            });
        }
        let slot = poi_type
            .attributes
            .iter_mut()
            .find(|a| a.as_str() == old)
            .ok_or_else(|| StoreError::UnknownAttribute {
                type_name: type_name.to_string(),
                attribute: old.to_string(),
            })?;
        *slot = new.to_string();
        Ok(())
    }

    /// Re-key a type, keeping its attributes and position
    pub fn rename(&mut self, old: &str, new: &str) -> StoreResult<()> {
        if self.contains(new) {
            return Err(StoreError::TypeExists(new.to_string()));
        }
        self.get_mut(old)?.name = new.to_string();
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_restaurant() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry.insert("restaurant").unwrap();
        registry.add_attribute("restaurant", "cuisine").unwrap();
        registry.add_attribute("restaurant", "stars").unwrap();
        registry
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let mut registry = registry_with_restaurant();
        assert_eq!(
            registry.insert("restaurant"),
            Err(StoreError::TypeExists("restaurant".to_string()))
        );
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_add_attribute_is_idempotent() {
        let mut registry = registry_with_restaurant();
        assert_eq!(registry.add_attribute("restaurant", "cuisine"), Ok(false));
        assert_eq!(registry.get("restaurant").unwrap().attributes, vec!["cuisine", "stars"]);
    }

    #[test]
    fn test_add_attribute_unknown_type() {
        let mut registry = SchemaRegistry::new();
        assert!(matches!(
            registry.add_attribute("museum", "price"),
            Err(StoreError::UnknownType(_))
        ));
    }

    #[test]
    fn test_remove_attribute() {
        let mut registry = registry_with_restaurant();
        registry.remove_attribute("restaurant", "cuisine").unwrap();
        assert_eq!(registry.get("restaurant").unwrap().attributes, vec!["stars"]);
        assert!(matches!(
            registry.remove_attribute("restaurant", "cuisine"),
            Err(StoreError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_rename_attribute_keeps_position() {
        let mut registry = registry_with_restaurant();
        registry.rename_attribute("restaurant", "cuisine", "kitchen").unwrap();
        assert_eq!(registry.get("restaurant").unwrap().attributes, vec!["kitchen", "stars"]);
    }

    #[test]
    fn test_rename_attribute_refuses_overwrite() {
        let mut registry = registry_with_restaurant();
        assert!(matches!(
            registry.rename_attribute("restaurant", "cuisine", "stars"),
            Err(StoreError::AttributeExists { .. })
        ));
        assert!(matches!(
            registry.rename_attribute("restaurant", "missing", "other"),
            Err(StoreError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_rename_type() {
        let mut registry = registry_with_restaurant();
        registry.insert("museum").unwrap();

        assert_eq!(
            registry.rename("restaurant", "museum"),
            Err(StoreError::TypeExists("museum".to_string()))
        );
        registry.rename("restaurant", "diner").unwrap();

        assert!(!registry.contains("restaurant"));
        assert_eq!(registry.get("diner").unwrap().attributes.len(), 2);
        let names: Vec<&str> = registry.types().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["diner", "museum"]);
    }

    #[test]
    fn test_remove_type() {
        let mut registry = registry_with_restaurant();
        let removed = registry.remove("restaurant").unwrap();
        assert_eq!(removed.name, "restaurant");
        assert!(registry.remove("restaurant").is_err());
    }
}
