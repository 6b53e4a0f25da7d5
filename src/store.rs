// 🗄️ Entity Store - POIs, visitors and the schemas that shape them
//
// The store is the single owner of every entity. All mutations go through it,
// so schema changes can be cascaded onto existing POIs in the same call that
// changes the schema.
//
// Identity: one allocator per entity kind, ids never reused.
// Order:    ids only grow, so iterating a BTreeMap keyed by id IS insertion
//           order. Queries rely on that for their tie-breaking.

use crate::attributes::{AttributeMap, AttributeValue};
use crate::config::AtlasConfig;
use crate::entities::{Poi, Visit, Visitor};
use crate::error::{StoreError, StoreResult};
use crate::ids::{IdAllocator, PoiId, VisitorId};
use crate::schema::{PoiType, SchemaRegistry};
use crate::spatial::SpatialQueries;
use crate::statistics::Statistics;
use std::collections::BTreeMap;
use tracing::debug;

pub struct PoiStore {
    config: AtlasConfig,
    schema: SchemaRegistry,
    pois: BTreeMap<PoiId, Poi>,
    visitors: BTreeMap<VisitorId, Visitor>,
    poi_ids: IdAllocator,
    visitor_ids: IdAllocator,
}

impl PoiStore {
    /// Empty store on the default 1000x1000 map
    pub fn new() -> Self {
        Self::with_config(AtlasConfig::default())
    }

    pub fn with_config(config: AtlasConfig) -> Self {
        PoiStore {
            config,
            schema: SchemaRegistry::new(),
            pois: BTreeMap::new(),
            visitors: BTreeMap::new(),
            poi_ids: IdAllocator::new(),
            visitor_ids: IdAllocator::new(),
        }
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    pub fn poi_type(&self, name: &str) -> Option<&PoiType> {
        self.schema.get(name)
    }

    /// Read-only spatial queries over the current POIs
    pub fn spatial(&self) -> SpatialQueries<'_> {
        SpatialQueries::new(self)
    }

    /// Read-only visit statistics over the current visitors and POIs
    pub fn statistics(&self) -> Statistics<'_> {
        Statistics::new(self)
    }

    // ========================================================================
    // SCHEMA OPERATIONS (cascade onto POIs)
    // ========================================================================

    pub fn add_type(&mut self, name: &str) -> StoreResult<()> {
        self.schema.insert(name)?;
        debug!(type_name = name, "POI type added");
        Ok(())
    }

    /// Delete a type that no POI uses any more
    pub fn delete_type(&mut self, name: &str) -> StoreResult<()> {
        if !self.schema.contains(name) {
            return Err(StoreError::UnknownType(name.to_string()));
        }
        let in_use = self.pois_of_type(name).count();
        if in_use > 0 {
            return Err(StoreError::TypeInUse {
                name: name.to_string(),
                count: in_use,
            });
        }
        self.schema.remove(name)?;
        debug!(type_name = name, "POI type deleted");
        Ok(())
    }

    /// Declare an attribute on a type and give every existing POI of that
    /// type an unset value for it
    ///
    /// Adding an attribute that is already declared succeeds and returns
    /// `false`; existing values are left alone.
    pub fn add_attribute(&mut self, type_name: &str, attribute: &str) -> StoreResult<bool> {
        if !self.schema.add_attribute(type_name, attribute)? {
            return Ok(false);
        }
        for poi in self.pois_of_type_mut(type_name) {
            poi.attributes
                .entry(attribute.to_string())
                .or_insert(AttributeValue::Unset);
        }
        debug!(type_name, attribute, "attribute added");
        Ok(true)
    }

    pub fn delete_attribute(&mut self, type_name: &str, attribute: &str) -> StoreResult<()> {
        self.schema.remove_attribute(type_name, attribute)?;
        for poi in self.pois_of_type_mut(type_name) {
            poi.attributes.remove(attribute);
        }
        debug!(type_name, attribute, "attribute deleted");
        Ok(())
    }

    /// Rename an attribute and move every POI's value to the new name
    pub fn rename_attribute(&mut self, type_name: &str, old: &str, new: &str) -> StoreResult<()> {
        self.schema.rename_attribute(type_name, old, new)?;
        for poi in self.pois_of_type_mut(type_name) {
            if let Some(value) = poi.attributes.remove(old) {
                poi.attributes.insert(new.to_string(), value);
            }
        }
        debug!(type_name, old, new, "attribute renamed");
        Ok(())
    }

    /// Rename a type and repoint every POI that referenced it
    pub fn rename_type(&mut self, old: &str, new: &str) -> StoreResult<()> {
        self.schema.rename(old, new)?;
        for poi in self.pois_of_type_mut(old) {
            poi.type_name = new.to_string();
        }
        debug!(old, new, "POI type renamed");
        Ok(())
    }

    // ========================================================================
    // POI OPERATIONS
    // ========================================================================

    /// Add a POI with every declared attribute unset
    pub fn add_poi(&mut self, name: &str, type_name: &str, x: i64, y: i64) -> StoreResult<PoiId> {
        self.add_poi_with_attributes(name, type_name, x, y, AttributeMap::new())
    }

    /// Add a POI with initial attribute values
    ///
    /// Declared attributes missing from `attributes` are filled with `Unset`;
    /// names the type does not declare are dropped.
    pub fn add_poi_with_attributes(
        &mut self,
        name: &str,
        type_name: &str,
        x: i64,
        y: i64,
        mut attributes: AttributeMap,
    ) -> StoreResult<PoiId> {
        let poi_type = self
            .schema
            .get(type_name)
            .ok_or_else(|| StoreError::UnknownType(type_name.to_string()))?;

        if !self.config.in_bounds(x, y) {
            return Err(StoreError::OutOfBounds {
                x,
                y,
                map_size: self.config.map_size,
            });
        }

        let values: AttributeMap = poi_type
            .attributes
            .iter()
            .map(|attr| {
                let value = attributes.remove(attr).unwrap_or_default();
                (attr.clone(), value)
            })
            .collect();

        if !attributes.is_empty() {
            debug!(
                poi = name,
                ignored = ?attributes.keys().collect::<Vec<_>>(),
                "dropping attributes not declared on type"
            );
        }

        let id = PoiId::new(self.poi_ids.allocate());
        let mut poi = Poi::new(id, name, type_name, x, y);
        poi.attributes = values;
        self.pois.insert(id, poi);

        debug!(%id, name, type_name, x, y, "POI added");
        Ok(id)
    }

    /// Remove a POI; visits that reference it are kept as they are
    pub fn delete_poi(&mut self, id: PoiId) -> StoreResult<Poi> {
        let poi = self.pois.remove(&id).ok_or(StoreError::UnknownPoi(id))?;
        debug!(%id, name = %poi.name, "POI deleted");
        Ok(poi)
    }

    pub fn poi(&self, id: PoiId) -> Option<&Poi> {
        self.pois.get(&id)
    }

    pub fn contains_poi(&self, id: PoiId) -> bool {
        self.pois.contains_key(&id)
    }

    /// All POIs in insertion order
    pub fn pois(&self) -> impl Iterator<Item = &Poi> {
        self.pois.values()
    }

    pub fn poi_count(&self) -> usize {
        self.pois.len()
    }

    fn pois_of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a Poi> + 'a {
        self.pois.values().filter(move |p| p.type_name == type_name)
    }

    fn pois_of_type_mut<'a>(&'a mut self, type_name: &'a str) -> impl Iterator<Item = &'a mut Poi> + 'a {
        self.pois.values_mut().filter(move |p| p.type_name == type_name)
    }

    /// POIs of a type in insertion order, `None` if the type does not exist
    pub fn pois_by_type(&self, type_name: &str) -> Option<Vec<&Poi>> {
        if !self.schema.contains(type_name) {
            return None;
        }
        Some(self.pois.values().filter(|p| p.type_name == type_name).collect())
    }

    /// Number of POIs per type, ordered by each type's first POI
    ///
    /// Types without POIs are not listed.
    pub fn count_by_type(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for poi in self.pois.values() {
            match counts.iter_mut().find(|(name, _)| *name == poi.type_name) {
                Some((_, count)) => *count += 1,
                None => counts.push((poi.type_name.as_str(), 1)),
            }
        }
        counts
    }

    /// Attribute values of a POI in the order its type declares them
    pub fn poi_attributes<'a>(&'a self, poi: &'a Poi) -> Vec<(&'a str, &'a AttributeValue)> {
        const UNSET: &AttributeValue = &AttributeValue::Unset;
        match self.schema.get(&poi.type_name) {
            Some(poi_type) => poi_type
                .attributes
                .iter()
                .map(|attr| (attr.as_str(), poi.attributes.get(attr).unwrap_or(UNSET)))
                .collect(),
            None => Vec::new(),
        }
    }

    // ========================================================================
    // VISITOR OPERATIONS
    // ========================================================================

    pub fn add_visitor(&mut self, name: &str, nationality: &str) -> VisitorId {
        let id = VisitorId::new(self.visitor_ids.allocate());
        self.visitors.insert(id, Visitor::new(id, name, nationality));
        debug!(%id, name, nationality, "visitor added");
        id
    }

    /// Register a visit of `visitor_id` to `poi_id` on a `dd/mm/yyyy` date
    pub fn add_visit(
        &mut self,
        visitor_id: VisitorId,
        poi_id: PoiId,
        date: &str,
        rating: Option<i64>,
    ) -> StoreResult<()> {
        if !self.pois.contains_key(&poi_id) {
            return Err(StoreError::UnknownPoi(poi_id));
        }
        let visitor = self
            .visitors
            .get_mut(&visitor_id)
            .ok_or(StoreError::UnknownVisitor(visitor_id))?;

        let visit = Visit::parse(poi_id, date, rating)?;
        debug!(%visitor_id, %poi_id, date = %visit.date_string(), ?rating, "visit registered");
        visitor.visits.push(visit);
        Ok(())
    }

    pub fn visitor(&self, id: VisitorId) -> Option<&Visitor> {
        self.visitors.get(&id)
    }

    /// All visitors in registration order
    pub fn visitors(&self) -> impl Iterator<Item = &Visitor> {
        self.visitors.values()
    }

    pub fn visitor_count(&self) -> usize {
        self.visitors.len()
    }

    /// A visitor's visits in registration order, `None` for an unknown id
    pub fn visitor_history(&self, id: VisitorId) -> Option<&[Visit]> {
        self.visitors.get(&id).map(|v| v.visits.as_slice())
    }
}

impl Default for PoiStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
