use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Listing rule naming the links to item pages
pub const ITEM_URL_RULE: &str = "item_url";

/// Listing rule naming the link to the next listing page
pub const NEXT_PAGE_URL_RULE: &str = "next_page_url";

/// Ordered mapping from field name to selector expression
///
/// Iteration follows insertion order, so records built from a RuleMap list
/// their fields in the order the caller declared them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleMap(IndexMap<String, String>);

impl RuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, expression: impl Into<String>) {
        self.0.insert(field.into(), expression.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.shift_remove(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RuleMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Rules applied to listing pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRules {
    /// Selector for links to item pages (zero or more)
    pub item_url: String,

    /// Selector for the continuation listing page (first match only)
    pub next_page_url: Option<String>,
}

impl ListRules {
    /// Builds listing rules from a rule map
    ///
    /// Returns None if the map has no `item_url` rule.
    pub fn from_rule_map(rules: &RuleMap) -> Option<Self> {
        let item_url = rules.get(ITEM_URL_RULE)?.to_string();
        let next_page_url = rules
            .get(NEXT_PAGE_URL_RULE)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);

        Some(Self {
            item_url,
            next_page_url,
        })
    }
}
