// 🧳 Visitor Entity - People and the places they have been
//
// Visits are owned by their visitor and never stored on their own. A visit
// remembers the POI id it was registered against, even if that POI is later
// deleted.

use crate::error::{StoreError, StoreResult};
use crate::ids::{PoiId, VisitorId};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Date format accepted and displayed for visits
pub const VISIT_DATE_FORMAT: &str = "%d/%m/%Y";

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 10;

// ============================================================================
// VISIT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub poi_id: PoiId,
    pub date: NaiveDate,
    pub rating: Option<u8>,
}

impl Visit {
    /// Build a visit from user-facing input, validating date and rating
    pub fn parse(poi_id: PoiId, date: &str, rating: Option<i64>) -> StoreResult<Self> {
        let rating = match rating {
            Some(r) if !(MIN_RATING..=MAX_RATING).contains(&r) => {
                return Err(StoreError::RatingOutOfRange(r));
            }
            Some(r) => Some(r as u8),
            None => None,
        };
        let date = parse_visit_date(date)?;
        Ok(Visit { poi_id, date, rating })
    }

    pub fn date_string(&self) -> String {
        self.date.format(VISIT_DATE_FORMAT).to_string()
    }
}

/// Parse a `dd/mm/yyyy` Gregorian calendar date with a year in 1..=9999
///
/// Input is taken as is; surrounding whitespace is an error.
pub fn parse_visit_date(input: &str) -> StoreResult<NaiveDate> {
    let invalid = || StoreError::InvalidDate(input.to_string());
    let date = NaiveDate::parse_from_str(input, VISIT_DATE_FORMAT).map_err(|_| invalid())?;
    if !(1..=9999).contains(&date.year()) {
        return Err(invalid());
    }
    Ok(date)
}

// ============================================================================
// VISITOR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visitor {
    pub id: VisitorId,
    pub name: String,
    pub nationality: String,

    /// Registration order, not date order
    pub visits: Vec<Visit>,
}

impl Visitor {
    pub fn new(id: VisitorId, name: impl Into<String>, nationality: impl Into<String>) -> Self {
        Visitor {
            id,
            name: name.into(),
            nationality: nationality.into(),
            visits: Vec::new(),
        }
    }

    /// Distinct POI ids this visitor has visits for, dangling ones included
    pub fn distinct_pois(&self) -> HashSet<PoiId> {
        self.visits.iter().map(|v| v.poi_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_parse_valid() {
        let visit = Visit::parse(PoiId::new(1), "15/09/2025", Some(8)).unwrap();
        assert_eq!(visit.date, NaiveDate::from_ymd_opt(2025, 9, 15).unwrap());
        assert_eq!(visit.rating, Some(8));
        assert_eq!(visit.date_string(), "15/09/2025");
    }

    #[test]
    fn test_visit_rating_bounds() {
        assert!(Visit::parse(PoiId::new(1), "01/01/2024", Some(1)).is_ok());
        assert!(Visit::parse(PoiId::new(1), "01/01/2024", Some(10)).is_ok());
        assert_eq!(
            Visit::parse(PoiId::new(1), "01/01/2024", Some(0)),
            Err(StoreError::RatingOutOfRange(0))
        );
        assert_eq!(
            Visit::parse(PoiId::new(1), "01/01/2024", Some(11)),
            Err(StoreError::RatingOutOfRange(11))
        );
    }

    #[test]
    fn test_visit_date_must_exist_in_calendar() {
        assert!(parse_visit_date("29/02/2024").is_ok());
        assert!(parse_visit_date("29/02/2023").is_err());
        assert!(parse_visit_date("31/04/2024").is_err());
        assert!(parse_visit_date("2024-01-15").is_err());
        assert!(parse_visit_date("").is_err());

        assert!(parse_visit_date("01/01/0001").is_ok());
        assert!(parse_visit_date("31/12/9999").is_ok());
        assert!(parse_visit_date("01/01/0000").is_err());
        assert!(parse_visit_date("01/01/-44").is_err());
        assert!(parse_visit_date("01/01/10000").is_err());
        assert!(parse_visit_date(" 01/01/2024 ").is_err());
        assert!(parse_visit_date("01/01/2024\n").is_err());
    }

    #[test]
    fn test_distinct_pois() {
        let mut visitor = Visitor::new(VisitorId::new(1), "John", "USA");
        for poi in [1, 2, 1] {
            visitor.visits.push(Visit::parse(PoiId::new(poi), "01/01/2024", None).unwrap());
        }
        assert_eq!(visitor.distinct_pois().len(), 2);
    }
}
