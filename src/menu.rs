// 🖥️ Console Menu - Line-oriented front end over a PoiStore
//
// Plain command routing: every menu is a `match` on the typed choice. Input
// and output are generic so the whole menu can be driven from a script.

use crate::attributes::{AttributeMap, AttributeValue};
use crate::entities::VISIT_DATE_FORMAT;
use crate::ids::{PoiId, VisitorId};
use crate::store::PoiStore;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MenuError {
    /// Input reached end of file
    #[error("input closed")]
    Closed,

    #[error(transparent)]
    Io(#[from] io::Error),
}

type MenuResult<T> = Result<T, MenuError>;

pub struct Menu<'s, R, W> {
    store: &'s mut PoiStore,
    input: R,
    out: W,
}

impl<'s, R: BufRead, W: Write> Menu<'s, R, W> {
    pub fn new(store: &'s mut PoiStore, input: R, out: W) -> Self {
        Menu { store, input, out }
    }

    /// Run until the user picks Exit or input ends
    pub fn run(&mut self) -> io::Result<()> {
        match self.main_loop() {
            Ok(()) | Err(MenuError::Closed) => {
                writeln!(self.out, "Exiting program. Goodbye!")?;
                Ok(())
            }
            Err(MenuError::Io(e)) => Err(e),
        }
    }

    fn main_loop(&mut self) -> MenuResult<()> {
        loop {
            writeln!(self.out, "\n*** POI MANAGEMENT SYSTEM MAIN MENU ***")?;
            writeln!(self.out, "1. POI and Type Operations")?;
            writeln!(self.out, "2. Visitor and Visit Operations")?;
            writeln!(self.out, "3. Run POI Queries")?;
            writeln!(self.out, "4. Run Visitor and Statistics Queries")?;
            writeln!(self.out, "0. Exit")?;

            match self.read("\nSelect a menu option: ")?.as_str() {
                "1" => self.poi_menu()?,
                "2" => self.visitor_menu()?,
                "3" => self.query_menu()?,
                "4" => self.statistics_menu()?,
                "0" => return Ok(()),
                _ => writeln!(self.out, "Invalid choice! Please select an existing option.")?,
            }
        }
    }

    // ========================================================================
    // INPUT HELPERS
    // ========================================================================

    fn read(&mut self, label: &str) -> MenuResult<String> {
        write!(self.out, "{}", label)?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(MenuError::Closed);
        }
        Ok(line.trim().to_string())
    }

    /// Read and parse a value, printing `error` and returning `None` if it
    /// does not parse
    fn read_parsed<T: FromStr>(&mut self, label: &str, error: &str) -> MenuResult<Option<T>> {
        let raw = self.read(label)?;
        match raw.parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                writeln!(self.out, "Error: {}", error)?;
                Ok(None)
            }
        }
    }

    /// Read a count; negative numbers mean zero
    fn read_count(&mut self, label: &str, error: &str) -> MenuResult<Option<usize>> {
        Ok(self
            .read_parsed::<i64>(label, error)?
            .map(|n| usize::try_from(n).unwrap_or(0)))
    }

    fn submenu(&mut self, title: &str, options: &[&str]) -> MenuResult<String> {
        writeln!(self.out, "\n--- {} ---", title)?;
        for option in options {
            writeln!(self.out, "{}", option)?;
        }
        self.read("\nSelect an option: ")
    }

    // ========================================================================
    // POI AND TYPE OPERATIONS
    // ========================================================================

    fn poi_menu(&mut self) -> MenuResult<()> {
        const OPTIONS: &[&str] = &[
            "1. Add new POI type",
            "2. Delete POI type",
            "3. Add new attribute to POI type",
            "4. Add new POI",
            "5. Delete POI",
            "6. Delete attribute from POI type",
            "7. Rename attribute of POI type",
            "8. Rename POI type",
            "9. Back to main menu",
        ];
        loop {
            match self.submenu("POI and Type Operations", OPTIONS)?.as_str() {
                "1" => self.add_type()?,
                "2" => self.delete_type()?,
                "3" => self.add_attribute()?,
                "4" => self.add_poi()?,
                "5" => self.delete_poi()?,
                "6" => self.delete_attribute()?,
                "7" => self.rename_attribute()?,
                "8" => self.rename_type()?,
                "9" => return Ok(()),
                _ => writeln!(self.out, "Invalid choice!")?,
            }
        }
    }

    fn add_type(&mut self) -> MenuResult<()> {
        let name = self.read("Enter new type name: ")?;
        match self.store.add_type(&name) {
            Ok(()) => writeln!(self.out, "Type '{}' successfully added!", name)?,
            Err(e) => writeln!(self.out, "Failed to add type: {}", e)?,
        }
        Ok(())
    }

    fn delete_type(&mut self) -> MenuResult<()> {
        let name = self.read("Enter type name to delete: ")?;
        match self.store.delete_type(&name) {
            Ok(()) => writeln!(self.out, "Type '{}' successfully deleted!", name)?,
            Err(e) => writeln!(self.out, "Failed to delete type: {}", e)?,
        }
        Ok(())
    }

    fn add_attribute(&mut self) -> MenuResult<()> {
        let type_name = self.read("Enter type name: ")?;
        let attribute = self.read("Enter new attribute name: ")?;
        match self.store.add_attribute(&type_name, &attribute) {
            Ok(true) => writeln!(self.out, "Attribute '{}' added to type '{}'!", attribute, type_name)?,
            Ok(false) => writeln!(self.out, "Type '{}' already has attribute '{}'.", type_name, attribute)?,
            Err(e) => writeln!(self.out, "Failed to add attribute: {}", e)?,
        }
        Ok(())
    }

    fn delete_attribute(&mut self) -> MenuResult<()> {
        let type_name = self.read("Enter type name: ")?;
        let attribute = self.read("Enter attribute name: ")?;
        match self.store.delete_attribute(&type_name, &attribute) {
            Ok(()) => writeln!(self.out, "Attribute '{}' deleted from type '{}'.", attribute, type_name)?,
            Err(e) => writeln!(self.out, "Failed to delete attribute: {}", e)?,
        }
        Ok(())
    }

    fn rename_attribute(&mut self) -> MenuResult<()> {
        let type_name = self.read("Enter type name: ")?;
        let old = self.read("Enter current attribute name: ")?;
        let new = self.read("Enter new attribute name: ")?;
        match self.store.rename_attribute(&type_name, &old, &new) {
            Ok(()) => writeln!(self.out, "Attribute '{}' renamed to '{}'.", old, new)?,
            Err(e) => writeln!(self.out, "Failed to rename attribute: {}", e)?,
        }
        Ok(())
    }

    fn rename_type(&mut self) -> MenuResult<()> {
        let old = self.read("Enter current type name: ")?;
        let new = self.read("Enter new type name: ")?;
        match self.store.rename_type(&old, &new) {
            Ok(()) => writeln!(self.out, "Type '{}' renamed to '{}'.", old, new)?,
            Err(e) => writeln!(self.out, "Failed to rename type: {}", e)?,
        }
        Ok(())
    }

    fn add_poi(&mut self) -> MenuResult<()> {
        let name = self.read("Enter POI name: ")?;
        let type_name = self.read("Enter POI type: ")?;
        let Some(x) = self.read_parsed::<i64>("Enter X coordinate: ", "coordinates must be integers.")? else {
            return Ok(());
        };
        let Some(y) = self.read_parsed::<i64>("Enter Y coordinate: ", "coordinates must be integers.")? else {
            return Ok(());
        };

        let declared = self
            .store
            .poi_type(&type_name)
            .map(|t| t.attributes.clone())
            .unwrap_or_default();
        let mut attributes = AttributeMap::new();
        for attribute in declared {
            let raw = self.read(&format!("Value for '{}' (Enter to leave unset): ", attribute))?;
            attributes.insert(attribute, AttributeValue::parse_input(&raw));
        }

        match self.store.add_poi_with_attributes(&name, &type_name, x, y, attributes) {
            Ok(id) => writeln!(self.out, "POI '{}' (ID: {}) successfully added!", name, id)?,
            Err(e) => writeln!(self.out, "Failed to add POI: {}", e)?,
        }
        Ok(())
    }

    fn delete_poi(&mut self) -> MenuResult<()> {
        let Some(id) = self.read_parsed::<u64>("Enter POI ID to delete: ", "ID must be a number.")? else {
            return Ok(());
        };
        match self.store.delete_poi(PoiId::new(id)) {
            Ok(_) => writeln!(self.out, "POI with ID {} successfully deleted!", id)?,
            Err(e) => writeln!(self.out, "Failed to delete POI: {}", e)?,
        }
        Ok(())
    }

    // ========================================================================
    // VISITOR OPERATIONS
    // ========================================================================

    fn visitor_menu(&mut self) -> MenuResult<()> {
        const OPTIONS: &[&str] = &[
            "1. Add new visitor",
            "2. Register visitor visit",
            "9. Back to main menu",
        ];
        loop {
            match self.submenu("Visitor and Visit Operations", OPTIONS)?.as_str() {
                "1" => self.add_visitor()?,
                "2" => self.add_visit()?,
                "9" => return Ok(()),
                _ => writeln!(self.out, "Invalid choice!")?,
            }
        }
    }

    fn add_visitor(&mut self) -> MenuResult<()> {
        let name = self.read("Enter visitor name: ")?;
        let nationality = self.read("Enter nationality: ")?;
        let id = self.store.add_visitor(&name, &nationality);
        writeln!(self.out, "Visitor '{}' (ID: {}) successfully added!", name, id)?;
        Ok(())
    }

    fn add_visit(&mut self) -> MenuResult<()> {
        const ID_ERROR: &str = "IDs and rating must be numbers.";
        let Some(visitor_id) = self.read_parsed::<u64>("Enter visitor ID: ", ID_ERROR)? else {
            return Ok(());
        };
        let Some(poi_id) = self.read_parsed::<u64>("Enter POI ID: ", ID_ERROR)? else {
            return Ok(());
        };
        let date = self.read("Enter date (dd/mm/yyyy): ")?;
        let raw_rating = self.read("Enter rating (1-10, or press Enter to skip): ")?;
        let rating = if raw_rating.is_empty() {
            None
        } else {
            match raw_rating.parse::<i64>() {
                Ok(r) => Some(r),
                Err(_) => {
                    writeln!(self.out, "Error: {}", ID_ERROR)?;
                    return Ok(());
                }
            }
        };

        match self
            .store
            .add_visit(VisitorId::new(visitor_id), PoiId::new(poi_id), &date, rating)
        {
            Ok(()) => writeln!(self.out, "Visit successfully registered!")?,
            Err(e) => writeln!(self.out, "Failed to register visit: {}", e)?,
        }
        Ok(())
    }

    // ========================================================================
    // POI QUERIES
    // ========================================================================

    fn query_menu(&mut self) -> MenuResult<()> {
        const OPTIONS: &[&str] = &[
            "1. List all POIs by type",
            "2. Find two closest POIs on map",
            "3. Show number of POIs by type",
            "4. Find POIs within radius",
            "5. Find K closest POIs",
            "6. Find POIs at exact distance",
            "9. Back to main menu",
        ];
        loop {
            match self.submenu("POI Queries", OPTIONS)?.as_str() {
                "1" => self.list_by_type()?,
                "2" => self.closest_pair()?,
                "3" => self.count_by_type()?,
                "4" => self.find_in_radius()?,
                "5" => self.find_k_closest()?,
                "6" => self.find_at_exact_distance()?,
                "9" => return Ok(()),
                _ => writeln!(self.out, "Invalid choice!")?,
            }
        }
    }

    fn list_by_type(&mut self) -> MenuResult<()> {
        let type_name = self.read("Enter type name: ")?;
        let store = &*self.store;
        match store.pois_by_type(&type_name) {
            Some(pois) if !pois.is_empty() => {
                for poi in pois {
                    let attributes: Vec<String> = store
                        .poi_attributes(poi)
                        .into_iter()
                        .map(|(name, value)| format!("{}={}", name, value))
                        .collect();
                    writeln!(
                        self.out,
                        "ID: {}, Name: {}, Coords: ({},{}), Type: {}, Attributes: [{}]",
                        poi.id,
                        poi.name,
                        poi.x,
                        poi.y,
                        poi.type_name,
                        attributes.join(", ")
                    )?;
                }
            }
            _ => writeln!(self.out, "No POIs of type '{}' found or type does not exist.", type_name)?,
        }
        Ok(())
    }

    fn closest_pair(&mut self) -> MenuResult<()> {
        match self.store.spatial().closest_pair() {
            Some(pair) => {
                writeln!(
                    self.out,
                    "Closest pair: {} (ID: {}) and {} (ID: {})",
                    pair.first.name, pair.first.id, pair.second.name, pair.second.id
                )?;
                writeln!(
                    self.out,
                    "Coords1: ({},{}), Coords2: ({},{}), Distance: {:.6}",
                    pair.first.x, pair.first.y, pair.second.x, pair.second.y, pair.distance
                )?;
            }
            None => writeln!(self.out, "Not enough POIs to find a pair.")?,
        }
        Ok(())
    }

    fn count_by_type(&mut self) -> MenuResult<()> {
        for (type_name, count) in self.store.count_by_type() {
            writeln!(self.out, "{}: {}", type_name, count)?;
        }
        Ok(())
    }

    fn read_center(&mut self, error: &str) -> MenuResult<Option<(i64, i64)>> {
        let Some(x) = self.read_parsed::<i64>("Enter X coordinate: ", error)? else {
            return Ok(None);
        };
        let Some(y) = self.read_parsed::<i64>("Enter Y coordinate: ", error)? else {
            return Ok(None);
        };
        Ok(Some((x, y)))
    }

    fn find_in_radius(&mut self) -> MenuResult<()> {
        const ERROR: &str = "coordinates and radius must be numbers.";
        let Some((x, y)) = self.read_center(ERROR)? else {
            return Ok(());
        };
        let Some(radius) = self.read_parsed::<f64>("Enter radius: ", ERROR)? else {
            return Ok(());
        };
        let hits = self.store.spatial().find_in_radius(x, y, radius);
        if hits.is_empty() {
            writeln!(self.out, "No POIs found within specified radius.")?;
        }
        for hit in hits {
            writeln!(
                self.out,
                "{} (ID: {}) [{}] @ ({},{}) - distance: {:.6}",
                hit.poi.name, hit.poi.id, hit.poi.type_name, hit.poi.x, hit.poi.y, hit.distance
            )?;
        }
        Ok(())
    }

    fn find_k_closest(&mut self) -> MenuResult<()> {
        const ERROR: &str = "coordinates and K must be numbers.";
        let Some((x, y)) = self.read_center(ERROR)? else {
            return Ok(());
        };
        let Some(k) = self.read_count("Enter K value: ", ERROR)? else {
            return Ok(());
        };
        let hits = self.store.spatial().find_k_closest(x, y, k);
        if hits.is_empty() {
            writeln!(self.out, "No POIs found.")?;
        }
        for hit in hits {
            writeln!(
                self.out,
                "{} (ID: {}) [{}] @ ({},{}) - distance: {:.6}",
                hit.poi.name, hit.poi.id, hit.poi.type_name, hit.poi.x, hit.poi.y, hit.distance
            )?;
        }
        Ok(())
    }

    fn find_at_exact_distance(&mut self) -> MenuResult<()> {
        const ERROR: &str = "coordinates and distance must be numbers.";
        let Some((x, y)) = self.read_center(ERROR)? else {
            return Ok(());
        };
        let Some(target) = self.read_parsed::<f64>("Enter distance: ", ERROR)? else {
            return Ok(());
        };
        let hits = self.store.spatial().find_at_exact_distance(x, y, target);
        if hits.is_empty() {
            writeln!(self.out, "No POIs found at specified distance.")?;
        }
        for hit in hits {
            writeln!(self.out, "{} (ID: {}) - distance: {:.6}", hit.poi.name, hit.poi.id, hit.distance)?;
        }
        Ok(())
    }

    // ========================================================================
    // VISITOR AND STATISTICS QUERIES
    // ========================================================================

    fn statistics_menu(&mut self) -> MenuResult<()> {
        const OPTIONS: &[&str] = &[
            "1. Show visitor visit history",
            "2. Show POI popularity",
            "3. Show visitor activity",
            "4. Show Top-K most active visitors",
            "5. Show Top-K most popular POIs",
            "6. Show most \"versatile\" visitors",
            "9. Back to main menu",
        ];
        loop {
            match self.submenu("Visitor and Statistics Queries", OPTIONS)?.as_str() {
                "1" => self.visitor_history()?,
                "2" => self.poi_popularity()?,
                "3" => self.visitor_activity()?,
                "4" => self.top_k_visitors()?,
                "5" => self.top_k_pois()?,
                "6" => self.diverse_visitors()?,
                "9" => return Ok(()),
                _ => writeln!(self.out, "Invalid choice!")?,
            }
        }
    }

    fn visitor_history(&mut self) -> MenuResult<()> {
        let Some(id) = self.read_parsed::<u64>("Enter visitor ID: ", "ID must be a number.")? else {
            return Ok(());
        };
        let store = &*self.store;
        match store.visitor_history(VisitorId::new(id)) {
            Some(visits) if !visits.is_empty() => {
                for visit in visits {
                    let poi_name = store.poi(visit.poi_id).map_or("UNKNOWN", |p| p.name.as_str());
                    let rating = visit.rating.map_or_else(|| "-".to_string(), |r| r.to_string());
                    writeln!(
                        self.out,
                        "Date: {}, POI: {} ({}), Rating: {}",
                        visit.date.format(VISIT_DATE_FORMAT),
                        visit.poi_id,
                        poi_name,
                        rating
                    )?;
                }
            }
            _ => writeln!(self.out, "No visit history found.")?,
        }
        Ok(())
    }

    fn poi_popularity(&mut self) -> MenuResult<()> {
        for entry in self.store.statistics().poi_popularity() {
            writeln!(self.out, "POI ID {}: {} visitors", entry.poi_id, entry.visitors)?;
        }
        Ok(())
    }

    fn visitor_activity(&mut self) -> MenuResult<()> {
        for entry in self.store.statistics().visitor_activity() {
            writeln!(self.out, "Visitor ID {}: {} POIs", entry.visitor_id, entry.pois)?;
        }
        Ok(())
    }

    fn top_k_visitors(&mut self) -> MenuResult<()> {
        let Some(k) = self.read_count("Enter K value: ", "K must be a number.")? else {
            return Ok(());
        };
        for (rank, entry) in self.store.statistics().top_k_visitors(k).iter().enumerate() {
            writeln!(
                self.out,
                "{}. {} (ID: {}) - {} POIs",
                rank + 1,
                entry.visitor.name,
                entry.visitor.id,
                entry.distinct_pois
            )?;
        }
        Ok(())
    }

    fn top_k_pois(&mut self) -> MenuResult<()> {
        let Some(k) = self.read_count("Enter K value: ", "K must be a number.")? else {
            return Ok(());
        };
        for (rank, entry) in self.store.statistics().top_k_pois(k).iter().enumerate() {
            writeln!(
                self.out,
                "{}. {} (ID: {}) - {} visitors",
                rank + 1,
                entry.poi.name,
                entry.poi.id,
                entry.distinct_visitors
            )?;
        }
        Ok(())
    }

    fn diverse_visitors(&mut self) -> MenuResult<()> {
        const ERROR: &str = "M and T must be numbers.";
        let Some(m) = self.read_count("Enter minimum number of POIs (M): ", ERROR)? else {
            return Ok(());
        };
        let Some(t) = self.read_count("Enter minimum number of types (T): ", ERROR)? else {
            return Ok(());
        };
        let diverse = self.store.statistics().diverse_visitors(m, t);
        if diverse.is_empty() {
            writeln!(self.out, "No visitors matching criteria found.")?;
        }
        for entry in diverse {
            writeln!(
                self.out,
                "{} (ID: {}, {}): {} POIs, {} types",
                entry.visitor.name,
                entry.visitor.id,
                entry.visitor.nationality,
                entry.poi_count,
                entry.type_count
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
