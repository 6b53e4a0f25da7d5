// Entity Models
// POIs carry identity + location + attribute values; visitors own their visits.

pub mod poi;
pub mod visitor;

pub use poi::Poi;
pub use visitor::{parse_visit_date, Visit, Visitor, MAX_RATING, MIN_RATING, VISIT_DATE_FORMAT};
