// POI Atlas - Core Library
// Entity store, schema migration, spatial queries and visit statistics.
// Used by the console menu, the terminal browser and the tests.

pub mod ids;
pub mod error;
pub mod config;
pub mod attributes;   // Attribute values (closed variant)
pub mod schema;       // POI type schemas
pub mod entities;     // POI, Visitor, Visit
pub mod store;        // Entity store + schema cascades
pub mod spatial;      // Closest pair, radius, k-nearest, exact distance
pub mod statistics;   // Popularity, activity, top-k, diversity
pub mod loader;       // JSON / YAML bulk loader
pub mod menu;         // Line-oriented console menu

// Re-export commonly used types
pub use ids::{IdAllocator, PoiId, VisitorId};
pub use error::{StoreError, StoreResult};
pub use config::{AtlasConfig, DEFAULT_EPSILON, DEFAULT_MAP_SIZE};
pub use attributes::{AttributeMap, AttributeValue};
pub use schema::{PoiType, SchemaRegistry};
pub use entities::{Poi, Visit, Visitor};
pub use store::PoiStore;
pub use spatial::{ClosestPair, PoiDistance, SpatialQueries};
pub use statistics::{
    DiverseVisitor, PoiPopularity, RankedPoi, RankedVisitor, Statistics, VisitorActivity,
};
pub use loader::{load_file, load_str, DocumentFormat, LoadReport};
pub use menu::Menu;
