use indexmap::IndexMap;
use serde::Serialize;

/// Field that always carries the fetched page's resolved URL
pub const ARTICLE_URL_FIELD: &str = "article_url";

/// Value extracted for a single item rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// First match, or None if the selector matched nothing
    Single(Option<String>),

    /// Every match in document order
    Many(Vec<String>),
}

impl FieldValue {
    /// Returns true if the selector matched nothing
    pub fn is_absent(&self) -> bool {
        match self {
            Self::Single(value) => value.is_none(),
            Self::Many(values) => values.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Single(value) => value.as_deref(),
            Self::Many(values) => values.first().map(String::as_str),
        }
    }
}

/// One record extracted from an item page
///
/// Fields follow the declaration order of the item rules; `article_url` is
/// always last and always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedRecord {
    #[serde(flatten)]
    fields: IndexMap<String, FieldValue>,
    article_url: String,
}

impl ExtractedRecord {
    pub fn new(fields: IndexMap<String, FieldValue>, article_url: impl Into<String>) -> Self {
        Self {
            fields,
            article_url: article_url.into(),
        }
    }

    /// The resolved URL of the page this record was extracted from
    pub fn article_url(&self) -> &str {
        &self.article_url
    }

    /// Looks up an extracted field by rule name
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Iterates extracted fields in rule order (excluding `article_url`)
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExtractedRecord {
        let mut fields = IndexMap::new();
        fields.insert(
            "article_title".to_string(),
            FieldValue::Single(Some("Hello".to_string())),
        );
        fields.insert("article_author".to_string(), FieldValue::Single(None));
        fields.insert(
            "article_tags".to_string(),
            FieldValue::Many(vec!["a".to_string(), "b".to_string()]),
        );
        ExtractedRecord::new(fields, "https://example.com/a/1")
    }

    #[test]
    fn test_accessors() {
        let record = sample();
        assert_eq!(record.article_url(), "https://example.com/a/1");
        assert_eq!(record.get("article_title").and_then(|v| v.as_str()), Some("Hello"));
        assert!(record.get("article_author").unwrap().is_absent());
        assert!(record.get("missing").is_none());
        assert_eq!(record.len(), 4);
    }

    #[test]
    fn test_serialize_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["article_title"], "Hello");
        assert!(json["article_author"].is_null());
        assert_eq!(json["article_tags"], serde_json::json!(["a", "b"]));
        assert_eq!(json[ARTICLE_URL_FIELD], "https://example.com/a/1");
    }
}
