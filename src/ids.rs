// 🔑 Identity - Monotonic id allocation per entity kind
//
// An id is IDENTITY: it is handed out once and never reused, even after the
// entity it named is deleted. One allocator exists per entity kind.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ID NEWTYPES
// ============================================================================

/// Identifier of a point of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoiId(u64);

/// Identifier of a visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(u64);

impl PoiId {
    pub fn new(raw: u64) -> Self {
        PoiId(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl VisitorId {
    pub fn new(raw: u64) -> Self {
        VisitorId(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PoiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ALLOCATOR
// ============================================================================

/// Hands out strictly increasing ids starting at 1
///
/// Only the next value is kept. Ids are never reclaimed, so no record of
/// used ids is needed.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        IdAllocator { next: 1 }
    }

    /// Allocate the next raw id
    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next = self
            .next
            .checked_add(1)
            .expect("id space exhausted: allocator can never hand out the same id twice");
        id
    }

    /// The value the next call to `allocate` will return
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_starts_at_one() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(), 1);
        assert_eq!(ids.allocate(), 2);
        assert_eq!(ids.peek(), 3);
    }

    #[test]
    fn test_allocators_are_independent() {
        let mut pois = IdAllocator::new();
        let mut visitors = IdAllocator::new();

        pois.allocate();
        pois.allocate();

        assert_eq!(visitors.allocate(), 1);
        assert_eq!(pois.allocate(), 3);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(PoiId::new(42).to_string(), "42");
        assert_eq!(VisitorId::new(7).to_string(), "7");
    }
}
