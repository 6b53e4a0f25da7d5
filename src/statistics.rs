// 📊 Statistics Engine - Popularity, activity and diversity over visits
//
// Counts are always DISTINCT: a visitor who goes to the same POI five times
// counts once for that POI.
//
// Dangling visits (their POI was deleted later) are kept on purpose:
// - popularity and activity count them, they only need the POI id
// - top-k POIs and the diversity type count skip them, they need the POI
//   itself (its name, its type)

use crate::entities::{Poi, Visitor};
use crate::ids::{PoiId, VisitorId};
use crate::store::PoiStore;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

// ============================================================================
// RESULT TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoiPopularity {
    pub poi_id: PoiId,
    pub visitors: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisitorActivity {
    pub visitor_id: VisitorId,
    pub pois: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RankedVisitor<'a> {
    pub visitor: &'a Visitor,
    pub distinct_pois: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RankedPoi<'a> {
    pub poi: &'a Poi,
    pub distinct_visitors: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DiverseVisitor<'a> {
    pub visitor: &'a Visitor,
    pub poi_count: usize,
    pub type_count: usize,
}

// ============================================================================
// STATISTICS ENGINE
// ============================================================================

/// Borrowed view computing visit statistics against a store snapshot
pub struct Statistics<'a> {
    store: &'a PoiStore,
}

impl<'a> Statistics<'a> {
    pub fn new(store: &'a PoiStore) -> Self {
        Statistics { store }
    }

    /// Distinct visitors per visited POI id, in order of first appearance
    fn visitors_per_poi(&self) -> Vec<(PoiId, HashSet<VisitorId>)> {
        let mut order: Vec<(PoiId, HashSet<VisitorId>)> = Vec::new();
        let mut index: HashMap<PoiId, usize> = HashMap::new();

        for visitor in self.store.visitors() {
            for visit in &visitor.visits {
                let slot = *index.entry(visit.poi_id).or_insert_with(|| {
                    order.push((visit.poi_id, HashSet::new()));
                    order.len() - 1
                });
                order[slot].1.insert(visitor.id);
            }
        }
        order
    }

    /// Number of distinct visitors for every POI id that appears in a visit,
    /// whether or not the POI still exists
    pub fn poi_popularity(&self) -> Vec<PoiPopularity> {
        self.visitors_per_poi()
            .into_iter()
            .map(|(poi_id, visitors)| PoiPopularity {
                poi_id,
                visitors: visitors.len(),
            })
            .collect()
    }

    /// Number of distinct POI ids each visitor has visited
    pub fn visitor_activity(&self) -> Vec<VisitorActivity> {
        self.store
            .visitors()
            .map(|visitor| VisitorActivity {
                visitor_id: visitor.id,
                pois: visitor.distinct_pois().len(),
            })
            .collect()
    }

    /// The `k` visitors with the most distinct POIs
    pub fn top_k_visitors(&self, k: usize) -> Vec<RankedVisitor<'a>> {
        let mut ranked: Vec<RankedVisitor<'a>> = self
            .store
            .visitors()
            .map(|visitor| RankedVisitor {
                visitor,
                distinct_pois: visitor.distinct_pois().len(),
            })
            .collect();

        ranked.sort_by(|a, b| {
            rank(
                (a.distinct_pois, a.visitor.id, &a.visitor.name),
                (b.distinct_pois, b.visitor.id, &b.visitor.name),
            )
        });
        ranked.truncate(k);
        ranked
    }

    /// The `k` existing POIs with the most distinct visitors
    pub fn top_k_pois(&self, k: usize) -> Vec<RankedPoi<'a>> {
        let mut ranked: Vec<RankedPoi<'a>> = self
            .visitors_per_poi()
            .into_iter()
            .filter_map(|(poi_id, visitors)| {
                self.store.poi(poi_id).map(|poi| RankedPoi {
                    poi,
                    distinct_visitors: visitors.len(),
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            rank(
                (a.distinct_visitors, a.poi.id, &a.poi.name),
                (b.distinct_visitors, b.poi.id, &b.poi.name),
            )
        });
        ranked.truncate(k);
        ranked
    }

    /// Visitors with at least `min_pois` distinct POIs spread over at least
    /// `min_types` distinct types
    ///
    /// The POI count includes deleted POIs; the type count can only see POIs
    /// that still exist.
    pub fn diverse_visitors(&self, min_pois: usize, min_types: usize) -> Vec<DiverseVisitor<'a>> {
        self.store
            .visitors()
            .filter_map(|visitor| {
                let pois = visitor.distinct_pois();
                let types: HashSet<&str> = pois
                    .iter()
                    .filter_map(|id| self.store.poi(*id))
                    .map(|poi| poi.type_name.as_str())
                    .collect();

                (pois.len() >= min_pois && types.len() >= min_types).then(|| DiverseVisitor {
                    visitor,
                    poi_count: pois.len(),
                    type_count: types.len(),
                })
            })
            .collect()
    }
}

/// Count descending, then id ascending, then name ascending
fn rank<I: Ord>(a: (usize, I, &String), b: (usize, I, &String)) -> Ordering {
    b.0.cmp(&a.0)
        .then_with(|| a.1.cmp(&b.1))
        .then_with(|| a.2.cmp(b.2))
}

// ============================================================================
// TESTS
// ============================================================================
