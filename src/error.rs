// ❌ Store errors - every validation failure a caller can trigger

use crate::ids::{PoiId, VisitorId};
use thiserror::Error;

/// Why a store operation was refused
///
/// These are caller mistakes, not faults: the store is left untouched when
/// one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unknown POI type '{0}'")]
    UnknownType(String),

    #[error("POI type '{0}' already exists")]
    TypeExists(String),

    #[error("POI type '{name}' is still used by {count} POI(s)")]
    TypeInUse { name: String, count: usize },

    #[error("type '{type_name}' has no attribute '{attribute}'")]
    UnknownAttribute { type_name: String, attribute: String },

    #[error("type '{type_name}' already has an attribute '{attribute}'")]
    AttributeExists { type_name: String, attribute: String },

    #[error("coordinates ({x},{y}) are outside the {map_size}x{map_size} map")]
    OutOfBounds { x: i64, y: i64, map_size: i64 },

    #[error("no POI with id {0}")]
    UnknownPoi(PoiId),

    #[error("no visitor with id {0}")]
    UnknownVisitor(VisitorId),

    #[error("rating {0} is outside 1..=10")]
    RatingOutOfRange(i64),

    #[error("'{0}' is not a valid dd/mm/yyyy date")]
    InvalidDate(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
