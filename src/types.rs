//! Data structures produced by an extraction run

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::NOT_AVAILABLE;

// =============================================================================
// Records
// =============================================================================

/// One extracted item: field name to string value.
///
/// Fields that could not be read hold the [`NOT_AVAILABLE`] sentinel rather
/// than being omitted. Keys are kept sorted so serialized output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedRecord {
    fields: BTreeMap<String, String>,
}

impl ExtractedRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, substituting the sentinel when the value is absent.
    pub fn set(&mut self, field: impl Into<String>, value: Option<String>) {
        self.fields
            .insert(field.into(), value.unwrap_or_else(|| NOT_AVAILABLE.to_string()));
    }

    /// Builder-style variant of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: Option<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Raw field value, sentinel included.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// True when the field exists and does not hold the sentinel.
    #[must_use]
    pub fn is_available(&self, field: &str) -> bool {
        self.get(field).is_some_and(|v| v != NOT_AVAILABLE)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ExtractedRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// =============================================================================
// Result set
// =============================================================================

/// Ordered records plus the optional page-level scalar.
///
/// Serializes to the persisted document layout:
///
/// ```json
/// {
///   "pageTitle": "Blog",
///   "records": [ { "title": "Foo", "url": "https://example.com/foo" } ]
/// }
/// ```
///
/// A missing page title is written as the sentinel and read back as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(rename = "pageTitle", with = "sentinel_option", default)]
    pub page_title: Option<String>,

    #[serde(alias = "articles", default)]
    pub records: Vec<ExtractedRecord>,
}

impl ExtractionResult {
    #[must_use]
    pub fn new(records: Vec<ExtractedRecord>, page_title: Option<String>) -> Self {
        Self {
            page_title,
            records,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

mod sentinel_option {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::utils::NOT_AVAILABLE;

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_deref().unwrap_or(NOT_AVAILABLE))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.filter(|v| v != NOT_AVAILABLE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_field_becomes_sentinel() {
        let record = ExtractedRecord::new()
            .with("title", Some("Rust".into()))
            .with("snippet", None);

        assert_eq!(record.get("snippet"), Some(NOT_AVAILABLE));
        assert!(record.is_available("title"));
        assert!(!record.is_available("snippet"));
        assert!(!record.is_available("missing"));
    }

    #[test]
    fn empty_string_is_not_the_sentinel() {
        let record = ExtractedRecord::new().with("title", Some(String::new()));
        assert!(record.is_available("title"));
    }

    #[test]
    fn document_layout_has_sorted_keys_and_sentinel_title() {
        let result = ExtractionResult::new(
            vec![ExtractedRecord::from_iter([("url", "https://a.test/"), ("title", "A")])],
            None,
        );
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"pageTitle":"N/A","records":[{"title":"A","url":"https://a.test/"}]}"#
        );
    }

    #[test]
    fn articles_alias_is_accepted() {
        let parsed: ExtractionResult =
            serde_json::from_str(r#"{"pageTitle":"Blog","articles":[{"title":"x","url":"y"}]}"#)
                .unwrap();
        assert_eq!(parsed.page_title.as_deref(), Some("Blog"));
        assert_eq!(parsed.len(), 1);
    }
}
