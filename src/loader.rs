// 📂 Config Loader - Bulk-populate a store from a JSON or YAML document
//
// The loader only uses the store's public mutation API. It never aborts on a
// bad RECORD (those are skipped and counted), only on a bad DOCUMENT.
//
// Document shape:
//   poi_types: { <type>: [<attribute>, ...], ... }
//   pois:      [ { name, type, x, y, <attribute>: <value>, ... }, ... ]
//   visitors:  [ { name, nationality?, visits?: [ { poi_id, date, rating? } ] } ]

use crate::attributes::{AttributeMap, AttributeValue};
use crate::ids::{PoiId, VisitorId};
use crate::store::PoiStore;
use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Nationality given to visitors whose record does not name one
pub const DEFAULT_NATIONALITY: &str = "Unknown";

// ============================================================================
// DOCUMENT FORMAT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.yaml` / `.yml` are YAML, anything else is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Json,
        }
    }

    pub fn parse(&self, text: &str) -> Result<Value> {
        match self {
            DocumentFormat::Json => serde_json::from_str(text).context("invalid JSON document"),
            DocumentFormat::Yaml => {
                let document: serde_yaml::Value =
                    serde_yaml::from_str(text).context("invalid YAML document")?;
                yaml_to_json(document)
            }
        }
    }
}

/// Convert a YAML tree into the JSON model the loader walks
///
/// Scalar mapping keys (`2024:`, `true:`) become their string form; only
/// sequence or mapping keys are rejected.
fn yaml_to_json(value: serde_yaml::Value) -> Result<Value> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, item) in mapping {
                object.insert(yaml_key(key)?, yaml_to_json(item)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn yaml_key(key: serde_yaml::Value) -> Result<String> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        Yaml::Tagged(tagged) => yaml_key(tagged.value),
        other => bail!("unsupported YAML mapping key: {:?}", other),
    }
}

// ============================================================================
// LOAD REPORT
// ============================================================================

/// What a load applied and what it skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub types_added: usize,
    pub attributes_added: usize,
    pub pois_added: usize,
    pub pois_out_of_bounds: usize,
    pub pois_unknown_type: usize,
    pub visitors_added: usize,
    pub visits_added: usize,
    pub visits_rejected: usize,
}

impl LoadReport {
    pub fn pois_skipped(&self) -> usize {
        self.pois_out_of_bounds + self.pois_unknown_type
    }

    pub fn summary(&self) -> String {
        format!(
            "{} types, {} POIs ({} skipped), {} visitors, {} visits ({} rejected)",
            self.types_added,
            self.pois_added,
            self.pois_skipped(),
            self.visitors_added,
            self.visits_added,
            self.visits_rejected
        )
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Read a document from disk and apply it to `store`
///
/// On error the store keeps whatever the document had already applied.
pub fn load_file(store: &mut PoiStore, path: &Path) -> Result<LoadReport> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let report = load_str(store, &text, DocumentFormat::from_path(path))
        .with_context(|| format!("failed to load config file {}", path.display()))?;
    info!(path = %path.display(), summary = %report.summary(), "configuration loaded");
    Ok(report)
}

pub fn load_str(store: &mut PoiStore, text: &str, format: DocumentFormat) -> Result<LoadReport> {
    let document = format.parse(text)?;
    apply_document(store, &document)
}

/// Apply the three sections of a parsed document, in order
pub fn apply_document(store: &mut PoiStore, document: &Value) -> Result<LoadReport> {
    let root = document
        .as_object()
        .ok_or_else(|| anyhow!("configuration root must be a mapping"))?;

    let mut report = LoadReport::default();

    if let Some(types) = root.get("poi_types") {
        apply_types(store, types, &mut report).context("in section 'poi_types'")?;
    }
    if let Some(pois) = root.get("pois") {
        apply_pois(store, pois, &mut report).context("in section 'pois'")?;
    }
    if let Some(visitors) = root.get("visitors") {
        apply_visitors(store, visitors, &mut report).context("in section 'visitors'")?;
    }

    Ok(report)
}

// ============================================================================
// SECTIONS
// ============================================================================

fn apply_types(store: &mut PoiStore, section: &Value, report: &mut LoadReport) -> Result<()> {
    let types = section
        .as_object()
        .ok_or_else(|| anyhow!("expected a mapping of type name to attribute list"))?;

    for (type_name, attributes) in types {
        match store.add_type(type_name) {
            Ok(()) => report.types_added += 1,
            Err(e) => debug!(error = %e, "type not added"),
        }

        let attributes: &[Value] = match attributes {
            Value::Null => &[],
            Value::Array(list) => list.as_slice(),
            _ => bail!("attributes of type '{}' must be a list", type_name),
        };
        for attribute in attributes {
            let attribute = attribute
                .as_str()
                .ok_or_else(|| anyhow!("attribute names of type '{}' must be strings", type_name))?;
            match store.add_attribute(type_name, attribute) {
                Ok(true) => report.attributes_added += 1,
                Ok(false) => {}
                Err(e) => debug!(error = %e, "attribute not added"),
            }
        }
    }
    Ok(())
}

fn apply_pois(store: &mut PoiStore, section: &Value, report: &mut LoadReport) -> Result<()> {
    let records = section
        .as_array()
        .ok_or_else(|| anyhow!("expected a list of POI records"))?;

    for (index, record) in records.iter().enumerate() {
        let record = record
            .as_object()
            .ok_or_else(|| anyhow!("POI record #{} is not a mapping", index))?;

        let coordinates = (
            record.get("x").and_then(Value::as_i64),
            record.get("y").and_then(Value::as_i64),
        );
        let (x, y) = match coordinates {
            (Some(x), Some(y)) if store.config().in_bounds(x, y) => (x, y),
            _ => {
                warn!(
                    poi = %display_field(record, "name"),
                    x = %display_field(record, "x"),
                    y = %display_field(record, "y"),
                    "invalid coordinates for POI, skipping"
                );
                report.pois_out_of_bounds += 1;
                continue;
            }
        };

        let type_name = required_str(record, "type", "POI", index)?;
        let Some(poi_type) = store.poi_type(type_name) else {
            debug!(type_name, "POI with unknown type skipped");
            report.pois_unknown_type += 1;
            continue;
        };
        let name = required_str(record, "name", "POI", index)?;

        let attributes: AttributeMap = poi_type
            .attributes
            .iter()
            .filter_map(|attr| {
                record
                    .get(attr)
                    .map(|value| (attr.clone(), AttributeValue::from_json(value)))
            })
            .collect();

        match store.add_poi_with_attributes(name, type_name, x, y, attributes) {
            Ok(_) => report.pois_added += 1,
            Err(e) => {
                warn!(poi = name, error = %e, "POI rejected");
                report.pois_unknown_type += 1;
            }
        }
    }
    Ok(())
}

fn apply_visitors(store: &mut PoiStore, section: &Value, report: &mut LoadReport) -> Result<()> {
    let records = section
        .as_array()
        .ok_or_else(|| anyhow!("expected a list of visitor records"))?;

    for (index, record) in records.iter().enumerate() {
        let record = record
            .as_object()
            .ok_or_else(|| anyhow!("visitor record #{} is not a mapping", index))?;

        let name = required_str(record, "name", "visitor", index)?;
        let nationality = record
            .get("nationality")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_NATIONALITY);

        let visitor_id = store.add_visitor(name, nationality);
        report.visitors_added += 1;

        let visits: &[Value] = match record.get("visits") {
            None | Some(Value::Null) => &[],
            Some(Value::Array(list)) => list.as_slice(),
            Some(_) => bail!("visits of visitor '{}' must be a list", name),
        };
        for visit in visits {
            apply_visit(store, visitor_id, visit, report)
                .with_context(|| format!("in visits of visitor '{}'", name))?;
        }
    }
    Ok(())
}

/// Register one nested visit; validation failures are counted, not raised
fn apply_visit(
    store: &mut PoiStore,
    visitor_id: VisitorId,
    visit: &Value,
    report: &mut LoadReport,
) -> Result<()> {
    let visit = visit
        .as_object()
        .ok_or_else(|| anyhow!("visit record is not a mapping"))?;
    let poi_id = visit
        .get("poi_id")
        .ok_or_else(|| anyhow!("visit record is missing 'poi_id'"))?;
    let date = visit
        .get("date")
        .ok_or_else(|| anyhow!("visit record is missing 'date'"))?;

    let rating = match visit.get("rating") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or("rating is not an integer"),
    };

    let outcome = match (poi_id.as_u64(), date.as_str(), rating) {
        (Some(poi_id), Some(date), Ok(rating)) => store
            .add_visit(visitor_id, PoiId::new(poi_id), date, rating)
            .map_err(|e| e.to_string()),
        (None, _, _) => Err(format!("poi_id {} is not a valid id", poi_id)),
        (_, None, _) => Err(format!("date {} is not a string", date)),
        (_, _, Err(reason)) => Err(reason.to_string()),
    };

    match outcome {
        Ok(()) => report.visits_added += 1,
        Err(reason) => {
            debug!(%visitor_id, reason = %reason, "visit rejected");
            report.visits_rejected += 1;
        }
    }
    Ok(())
}

// ============================================================================
// HELPERS
// ============================================================================

fn required_str<'a>(record: &'a Map<String, Value>, key: &str, kind: &str, index: usize) -> Result<&'a str> {
    match record.get(key) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => bail!("{} record #{}: '{}' must be a string, got {}", kind, index, key, other),
        None => bail!("{} record #{}: missing '{}'", kind, index, key),
    }
}

fn display_field(record: &Map<String, Value>, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "<missing>".to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    const SAMPLE_YAML: &str = r#"
poi_types:
  restaurant: [cuisine, stars]
  museum: [price]
pois:
  - { name: Taverna, type: restaurant, x: 10, y: 20, cuisine: Greek, parking: true }
  - { name: Louvre, type: museum, x: 500, y: 500, price: 17 }
  - { name: Offmap, type: museum, x: 1000, y: 5 }
  - { name: Ghost, type: castle, x: 1, y: 1 }
visitors:
  - name: John
    nationality: USA
    visits:
      - { poi_id: 1, date: 15/09/2025, rating: 8 }
      - { poi_id: 2, date: 31/02/2025 }
      - { poi_id: 99, date: 16/09/2025 }
  - name: Maria
"#;

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.YML")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("config")), DocumentFormat::Json);
    }

    #[test]
    fn test_load_yaml_sample() {
        let mut store = PoiStore::new();
        let report = load_str(&mut store, SAMPLE_YAML, DocumentFormat::Yaml).unwrap();

        assert_eq!(
            report,
            LoadReport {
                types_added: 2,
                attributes_added: 3,
                pois_added: 2,
                pois_out_of_bounds: 1,
                pois_unknown_type: 1,
                visitors_added: 2,
                visits_added: 1,
                visits_rejected: 2,
            }
        );

        let taverna = store.poi(PoiId::new(1)).unwrap();
        assert_eq!(taverna.attribute("cuisine"), Some(&AttributeValue::from("Greek")));
        assert_eq!(taverna.attribute("stars"), Some(&AttributeValue::Unset));
        assert!(taverna.attribute("parking").is_none());

        let louvre = store.poi(PoiId::new(2)).unwrap();
        assert_eq!(louvre.attribute("price"), Some(&AttributeValue::Number(17.0)));

        let maria = store.visitors().find(|v| v.name == "Maria").unwrap();
        assert_eq!(maria.nationality, DEFAULT_NATIONALITY);
    }

    #[test]
    fn test_yaml_scalar_keys_become_strings() {
        let mut store = PoiStore::new();
        let document = r#"
poi_types:
  2024: [edition]
  museum:
pois:
  - { name: Expo, type: "2024", x: 3, y: 4, edition: 7 }
"#;
        let report = load_str(&mut store, document, DocumentFormat::Yaml).unwrap();

        assert_eq!(report.types_added, 2);
        assert_eq!(report.pois_added, 1);
        let expo = store.poi(PoiId::new(1)).unwrap();
        assert_eq!(expo.type_name, "2024");
        assert_eq!(expo.attribute("edition"), Some(&AttributeValue::Number(7.0)));
    }

    #[test]
    fn test_yaml_collection_keys_rejected() {
        let result = DocumentFormat::Yaml.parse("poi_types:\n  ? [a, b]\n  : []\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_json_document() {
        let mut store = PoiStore::new();
        let document = json!({
            "poi_types": { "park": ["area"] },
            "pois": [ { "name": "Central", "type": "park", "x": 1, "y": 2, "area": 3.5 } ],
            "visitors": [ { "name": "Ana", "visits": [ { "poi_id": 1, "date": "01/01/2024", "rating": 10 } ] } ]
        });
        let report = load_str(&mut store, &document.to_string(), DocumentFormat::Json).unwrap();

        assert_eq!(report.pois_added, 1);
        assert_eq!(report.visits_added, 1);
        assert_eq!(store.statistics().top_k_visitors(1)[0].distinct_pois, 1);
    }

    #[test]
    fn test_sections_are_optional() {
        let mut store = PoiStore::new();
        let report = apply_document(&mut store, &json!({ "visitors": [ { "name": "Solo" } ] })).unwrap();
        assert_eq!(report.visitors_added, 1);
        assert_eq!(store.schema().count(), 0);
    }

    #[test]
    fn test_non_integer_coordinates_skipped() {
        let mut store = PoiStore::new();
        let document = json!({
            "poi_types": { "t": [] },
            "pois": [
                { "name": "a", "type": "t", "x": 1.5, "y": 2 },
                { "name": "b", "type": "t", "y": 2 },
                { "name": "c", "type": "t", "x": 3, "y": 4 }
            ]
        });
        let report = apply_document(&mut store, &document).unwrap();
        assert_eq!(report.pois_out_of_bounds, 2);
        assert_eq!(report.pois_added, 1);
    }

    #[test]
    fn test_bad_rating_rejected_per_visit() {
        let mut store = PoiStore::new();
        let document = json!({
            "poi_types": { "t": [] },
            "pois": [ { "name": "a", "type": "t", "x": 1, "y": 1 } ],
            "visitors": [ { "name": "V", "visits": [
                { "poi_id": 1, "date": "01/01/2024", "rating": 0 },
                { "poi_id": 1, "date": "01/01/2024", "rating": "great" },
                { "poi_id": -1, "date": "01/01/2024" },
                { "poi_id": 1, "date": 20240101 },
                { "poi_id": 1, "date": "02/01/2024", "rating": null }
            ] } ]
        });
        let report = apply_document(&mut store, &document).unwrap();
        assert_eq!(report.visits_added, 1);
        assert_eq!(report.visits_rejected, 4);
    }

    #[test]
    fn test_structural_error_keeps_partial_state() {
        let mut store = PoiStore::new();
        let document = json!({
            "poi_types": { "t": [] },
            "pois": [
                { "name": "first", "type": "t", "x": 1, "y": 1 },
                { "name": "broken", "x": 2, "y": 2 }
            ]
        });
        let err = apply_document(&mut store, &document).unwrap_err();
        assert!(format!("{:#}", err).contains("missing 'type'"));
        assert_eq!(store.poi_count(), 1);
        assert!(store.poi_type("t").is_some());
    }

    #[test]
    fn test_root_must_be_mapping() {
        let mut store = PoiStore::new();
        assert!(apply_document(&mut store, &json!([1, 2])).is_err());
        assert!(load_str(&mut store, "", DocumentFormat::Yaml).is_err());
        assert!(load_str(&mut store, "{not json", DocumentFormat::Json).is_err());
    }

    #[test]
    fn test_existing_types_are_extended() {
        let mut store = PoiStore::new();
        store.add_type("restaurant").unwrap();
        store.add_attribute("restaurant", "cuisine").unwrap();
        let id = store.add_poi("Old", "restaurant", 1, 1).unwrap();

        let report = apply_document(
            &mut store,
            &json!({ "poi_types": { "restaurant": ["cuisine", "stars"] } }),
        )
        .unwrap();

        assert_eq!(report.types_added, 0);
        assert_eq!(report.attributes_added, 1);
        assert_eq!(store.poi(id).unwrap().attribute("stars"), Some(&AttributeValue::Unset));
    }

    #[test]
    fn test_load_file_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(SAMPLE_YAML.as_bytes()).unwrap();

        let mut store = PoiStore::new();
        let report = load_file(&mut store, file.path()).unwrap();
        assert_eq!(report.pois_added, 2);
        assert_eq!(report.summary(), "2 types, 2 POIs (2 skipped), 2 visitors, 1 visits (2 rejected)");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PoiStore::new();
        assert!(load_file(&mut store, &dir.path().join("absent.json")).is_err());
    }
}
