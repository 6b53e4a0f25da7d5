// 🧭 Spatial Queries - Exact-geometry questions about POI positions
//
// Brute force over every POI. Every answer is deterministic: when distances
// tie, the POI that was added first comes first.

use crate::entities::Poi;
use crate::store::PoiStore;
use serde::Serialize;

/// A POI together with its distance to some query point
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PoiDistance<'a> {
    pub poi: &'a Poi,
    pub distance: f64,
}

/// The two POIs closest to each other
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClosestPair<'a> {
    pub first: &'a Poi,
    pub second: &'a Poi,
    pub distance: f64,
}

/// Borrowed view answering spatial queries against a store snapshot
pub struct SpatialQueries<'a> {
    store: &'a PoiStore,
    epsilon: f64,
}

impl<'a> SpatialQueries<'a> {
    pub fn new(store: &'a PoiStore) -> Self {
        SpatialQueries {
            store,
            epsilon: store.config().epsilon,
        }
    }

    /// `|a - b| < epsilon`
    pub fn approx_eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.epsilon
    }

    fn distances_from(&self, x: i64, y: i64) -> Vec<PoiDistance<'a>> {
        self.store
            .pois()
            .map(|poi| PoiDistance {
                poi,
                distance: poi.distance_to(x, y),
            })
            .collect()
    }

    /// Closest pair of POIs, `None` with fewer than two
    ///
    /// A later pair only wins on a strictly smaller distance, so among equal
    /// pairs the first one in store order is kept.
    pub fn closest_pair(&self) -> Option<ClosestPair<'a>> {
        let pois: Vec<&'a Poi> = self.store.pois().collect();
        let mut best: Option<ClosestPair<'a>> = None;

        for (i, &first) in pois.iter().enumerate() {
            for &second in &pois[i + 1..] {
                let distance = first.distance_between(second);
                if best.map_or(true, |b| distance < b.distance) {
                    best = Some(ClosestPair {
                        first,
                        second,
                        distance,
                    });
                }
            }
        }
        best
    }

    /// POIs within `radius` of `(x, y)`, nearest first
    ///
    /// The boundary is inclusive, with epsilon slack for distances that land
    /// a hair over it.
    pub fn find_in_radius(&self, x: i64, y: i64, radius: f64) -> Vec<PoiDistance<'a>> {
        let mut hits: Vec<PoiDistance<'a>> = self
            .distances_from(x, y)
            .into_iter()
            .filter(|hit| hit.distance <= radius || self.approx_eq(hit.distance, radius))
            .collect();
        sort_by_distance(&mut hits);
        hits
    }

    /// The `k` POIs nearest to `(x, y)`, nearest first
    pub fn find_k_closest(&self, x: i64, y: i64, k: usize) -> Vec<PoiDistance<'a>> {
        if k == 0 {
            return Vec::new();
        }
        let mut hits = self.distances_from(x, y);
        sort_by_distance(&mut hits);
        hits.truncate(k);
        hits
    }

    /// POIs whose distance to `(x, y)` equals `target` within epsilon, in
    /// store order
    pub fn find_at_exact_distance(&self, x: i64, y: i64, target: f64) -> Vec<PoiDistance<'a>> {
        self.distances_from(x, y)
            .into_iter()
            .filter(|hit| self.approx_eq(hit.distance, target))
            .collect()
    }
}

/// Stable, so equal distances keep store order
fn sort_by_distance(hits: &mut [PoiDistance<'_>]) {
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::PoiId;

    fn store_with_points(points: &[(i64, i64)]) -> PoiStore {
        let mut store = PoiStore::new();
        store.add_type("test").unwrap();
        for (i, (x, y)) in points.iter().enumerate() {
            store.add_poi(&format!("POI{}", i + 1), "test", *x, *y).unwrap();
        }
        store
    }

    fn ids(hits: &[PoiDistance<'_>]) -> Vec<u64> {
        hits.iter().map(|h| h.poi.id.get()).collect()
    }

    #[test]
    fn test_closest_pair_three_four_five() {
        let store = store_with_points(&[(0, 0), (3, 4)]);
        let pair = store.spatial().closest_pair().unwrap();
        assert_eq!(pair.distance, 5.0);
        assert_eq!(pair.first.id, PoiId::new(1));
        assert_eq!(pair.second.id, PoiId::new(2));
    }

    #[test]
    fn test_closest_pair_needs_two_pois() {
        assert!(store_with_points(&[]).spatial().closest_pair().is_none());
        assert!(store_with_points(&[(1, 1)]).spatial().closest_pair().is_none());
    }

    #[test]
    fn test_closest_pair_keeps_first_tie() {
        // (0,0)-(1,0) and (10,10)-(11,10) are both 1 apart
        let store = store_with_points(&[(10, 10), (0, 0), (11, 10), (1, 0)]);
        let pair = store.spatial().closest_pair().unwrap();
        assert_eq!(pair.distance, 1.0);
        assert_eq!((pair.first.id.get(), pair.second.id.get()), (1, 3));
    }

    #[test]
    fn test_radius_and_exact_distance() {
        let store = store_with_points(&[(0, 0), (3, 4)]);
        let spatial = store.spatial();

        let in_radius = spatial.find_in_radius(0, 0, 5.0);
        assert_eq!(ids(&in_radius), vec![1, 2]);

        let exact = spatial.find_at_exact_distance(0, 0, 5.0);
        assert_eq!(exact.len(), 1);
        assert_eq!((exact[0].poi.x, exact[0].poi.y), (3, 4));
    }

    #[test]
    fn test_radius_boundary_within_epsilon() {
        let store = store_with_points(&[(3, 4)]);
        let spatial = store.spatial();
        assert_eq!(spatial.find_in_radius(0, 0, 5.0 - 1e-7).len(), 1);
        assert!(spatial.find_in_radius(0, 0, 4.99).is_empty());
    }

    #[test]
    fn test_radius_sorted_with_stable_ties() {
        let store = store_with_points(&[(0, 5), (1, 0), (5, 0), (0, 1), (9, 9)]);
        let hits = store.spatial().find_in_radius(0, 0, 5.0);
        assert_eq!(ids(&hits), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_k_closest() {
        let store = store_with_points(&[(0, 5), (1, 0), (5, 0), (0, 1)]);
        let spatial = store.spatial();

        assert_eq!(ids(&spatial.find_k_closest(0, 0, 3)), vec![2, 4, 1]);
        assert_eq!(spatial.find_k_closest(0, 0, 10).len(), 4);
        assert!(spatial.find_k_closest(0, 0, 0).is_empty());
    }

    #[test]
    fn test_exact_distance_keeps_store_order() {
        let store = store_with_points(&[(5, 0), (0, 0), (3, 4), (0, 5)]);
        let hits = store.spatial().find_at_exact_distance(0, 0, 5.0);
        assert_eq!(ids(&hits), vec![1, 3, 4]);
        assert!(hits.iter().all(|h| h.distance == 5.0));
    }

    #[test]
    fn test_extreme_query_centers() {
        let store = store_with_points(&[(5, 5)]);
        let spatial = store.spatial();

        assert!(spatial.find_in_radius(i64::MIN, 0, 1.0).is_empty());
        assert!(spatial.find_at_exact_distance(0, i64::MAX, 1.0).is_empty());

        let far = spatial.find_k_closest(i64::MAX, i64::MIN, 1);
        assert_eq!(ids(&far), vec![1]);
        assert!(far[0].distance.is_finite());
        assert!(far[0].distance > 9.0e18);
    }

    #[test]
    fn test_queries_skip_deleted_pois() {
        let mut store = store_with_points(&[(0, 0), (0, 1), (50, 50)]);
        store.delete_poi(PoiId::new(2)).unwrap();
        let pair = store.spatial().closest_pair().unwrap();
        assert_eq!((pair.first.id.get(), pair.second.id.get()), (1, 3));
    }
}
