//! Record types: what an extractor yields per page and what a run yields per link.

use crate::error::{Result, ScrapeError};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// A single spreadsheet cell; `None` renders as a blank cell
pub type Cell = Option<String>;

/// Single-level projection of an outcome, keyed by column name in encounter order
pub type FlatRow = IndexMap<String, Cell>;

/// Value of one extracted field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A string or null
    Scalar(Cell),

    /// A group of sub-fields (e.g. a characteristics table) promoted to columns on export
    Nested(IndexMap<String, Cell>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Scalar(Some(value.into()))
    }

    pub fn null() -> Self {
        FieldValue::Scalar(None)
    }

    /// Convert an extractor value. Only a top-level object becomes `Nested`;
    /// deeper objects and all arrays are kept as compact JSON text.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                FieldValue::Nested(map.into_iter().map(|(k, v)| (k, scalar_from_json(v))).collect())
            }
            other => FieldValue::Scalar(scalar_from_json(other)),
        }
    }
}

fn scalar_from_json(value: Value) -> Cell {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Product data extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PageRecord {
    fields: IndexMap<String, FieldValue>,
}

impl PageRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: append a field
    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Build a record from an extractor's JSON result.
    ///
    /// The result must be an object. When it carries no usable `url` field the
    /// requested URL is placed first, so every record identifies its page.
    pub fn from_json(value: Value, requested_url: &str) -> Result<Self> {
        let map: Map<String, Value> = match value {
            Value::Object(map) => map,
            Value::Null => return Err(ScrapeError::NoData),
            other => {
                return Err(ScrapeError::ExtractionFailed(format!(
                    "extractor returned {} instead of a record",
                    json_kind(&other)
                )));
            }
        };

        let has_url = matches!(map.get("url"), Some(Value::String(s)) if !s.is_empty());
        let mut fields = IndexMap::with_capacity(map.len() + 1);
        if !has_url {
            fields.insert("url".to_string(), FieldValue::text(requested_url));
        }
        for (key, value) in map {
            if key == "url" && !has_url {
                continue;
            }
            fields.insert(key, FieldValue::from_json(value));
        }

        Ok(Self { fields })
    }

    /// The page URL recorded by the extractor
    pub fn url(&self) -> Option<&str> {
        match self.fields.get("url") {
            Some(FieldValue::Scalar(Some(url))) => Some(url),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Flatten into a single level of cells.
    ///
    /// Nested groups are promoted to top-level columns and their own key is dropped.
    /// Top-level scalars always win a name collision; between nested groups the
    /// first group to introduce a key wins.
    pub fn flatten(&self) -> FlatRow {
        let mut row = FlatRow::with_capacity(self.fields.len());

        for (key, value) in &self.fields {
            match value {
                FieldValue::Scalar(cell) => {
                    row.insert(key.clone(), cell.clone());
                }
                FieldValue::Nested(group) => {
                    for (sub_key, cell) in group {
                        if row.contains_key(sub_key) || self.is_top_level_scalar(sub_key) {
                            continue;
                        }
                        row.insert(sub_key.clone(), cell.clone());
                    }
                }
            }
        }

        row
    }

    fn is_top_level_scalar(&self, key: &str) -> bool {
        matches!(self.fields.get(key), Some(FieldValue::Scalar(_)))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Placeholder for a link that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub url: String,
    pub error: String,
}

/// What the batch recorded for one input link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Page(PageRecord),
    Failed(FailureRecord),
}

impl Outcome {
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Outcome::Failed(FailureRecord { url: url.into(), error: error.into() })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Page(_))
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Outcome::Page(record) => record.url(),
            Outcome::Failed(failure) => Some(&failure.url),
        }
    }

    pub fn flatten(&self) -> FlatRow {
        match self {
            Outcome::Page(record) => record.flatten(),
            Outcome::Failed(failure) => FlatRow::from([
                ("url".to_string(), Some(failure.url.clone())),
                ("error".to_string(), Some(failure.error.clone())),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(row: &FlatRow) -> Vec<&str> {
        row.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_flatten_is_identity_for_flat_records() {
        let record = PageRecord::new()
            .with("url", FieldValue::text("a"))
            .with("price", FieldValue::text("10"))
            .with("article", FieldValue::null());

        let row = record.flatten();
        assert_eq!(keys(&row), vec!["url", "price", "article"]);
        assert_eq!(row["url"], Some("a".to_string()));
        assert_eq!(row["price"], Some("10".to_string()));
        assert_eq!(row["article"], None);
    }

    #[test]
    fn test_flatten_promotes_nested_fields() {
        let record = PageRecord::from_json(json!({"url": "a", "spec": {"color": "red", "size": "M"}}), "a").unwrap();

        let row = record.flatten();
        assert_eq!(keys(&row), vec!["url", "color", "size"]);
        assert_eq!(row["color"], Some("red".to_string()));
        assert_eq!(row["size"], Some("M".to_string()));
        assert!(!row.contains_key("spec"));
    }

    #[test]
    fn test_flatten_top_level_wins_collisions() {
        // The nested "price" comes first in field order but must not shadow the top-level one
        let record = PageRecord::from_json(
            json!({"url": "a", "spec": {"price": "nested", "color": "red"}, "price": "10"}),
            "a",
        )
        .unwrap();

        let row = record.flatten();
        assert_eq!(row["price"], Some("10".to_string()));
        assert_eq!(keys(&row), vec!["url", "color", "price"]);
    }

    #[test]
    fn test_flatten_first_nested_group_wins() {
        let record = PageRecord::from_json(
            json!({"url": "a", "specs": {"weight": "1kg"}, "shipping": {"weight": "1.2kg", "days": "3"}}),
            "a",
        )
        .unwrap();

        let row = record.flatten();
        assert_eq!(row["weight"], Some("1kg".to_string()));
        assert_eq!(row["days"], Some("3".to_string()));
    }

    #[test]
    fn test_from_json_converts_values() {
        let record = PageRecord::from_json(
            json!({
                "url": "http://site/p1",
                "price": 1290,
                "inStock": true,
                "images": ["a.jpg", "b.jpg"],
                "description": null,
                "specs": {"dims": {"w": 1}, "tags": ["x"]}
            }),
            "http://site/p1",
        )
        .unwrap();

        assert_eq!(record.get("price"), Some(&FieldValue::text("1290")));
        assert_eq!(record.get("inStock"), Some(&FieldValue::text("true")));
        assert_eq!(record.get("images"), Some(&FieldValue::text(r#"["a.jpg","b.jpg"]"#)));
        assert_eq!(record.get("description"), Some(&FieldValue::null()));

        let row = record.flatten();
        assert_eq!(row["dims"], Some(r#"{"w":1}"#.to_string()));
        assert_eq!(row["tags"], Some(r#"["x"]"#.to_string()));
    }

    #[test]
    fn test_from_json_inserts_missing_url_first() {
        let record = PageRecord::from_json(json!({"title": "Kettle"}), "http://site/p1").unwrap();
        assert_eq!(record.url(), Some("http://site/p1"));
        assert_eq!(record.fields().next().map(|(k, _)| k.as_str()), Some("url"));

        // A null url is replaced, not duplicated
        let record = PageRecord::from_json(json!({"title": "Kettle", "url": null}), "http://site/p1").unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.url(), Some("http://site/p1"));
    }

    #[test]
    fn test_from_json_keeps_extractor_url() {
        let record = PageRecord::from_json(json!({"url": "http://site/p1?ref=x"}), "http://site/p1").unwrap();
        assert_eq!(record.url(), Some("http://site/p1?ref=x"));
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(matches!(PageRecord::from_json(Value::Null, "u"), Err(ScrapeError::NoData)));
        let err = PageRecord::from_json(json!([1, 2]), "u").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_failure_outcome_flattens_to_url_and_error() {
        let outcome = Outcome::failed("http://site/p2", "Navigation failed: timeout");
        let row = outcome.flatten();
        assert_eq!(keys(&row), vec!["url", "error"]);
        assert_eq!(row["error"], Some("Navigation failed: timeout".to_string()));
        assert!(!outcome.is_success());
        assert_eq!(outcome.url(), Some("http://site/p2"));
    }

    #[test]
    fn test_outcome_serializes_untagged() {
        let page = Outcome::Page(PageRecord::new().with("url", FieldValue::text("a")));
        let failed = Outcome::failed("b", "no data extracted");
        let json = serde_json::to_value(vec![page, failed]).unwrap();
        assert_eq!(json, json!([{"url": "a"}, {"url": "b", "error": "no data extracted"}]));
    }
}
