//! Rule application against fetched documents
//!
//! Listing pages yield links; item pages yield records. Both functions are
//! pure: the same document and rules always give the same result.

use crate::crawler::record::{ExtractedRecord, FieldValue};
use crate::rules::{Document, ListRules, PageQuery, RuleMap};
use crate::url::resolve_link;
use indexmap::IndexMap;
use url::Url;

/// Links discovered on a listing page, already resolved to absolute form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingLinks {
    pub items: Vec<Url>,
    pub next_page: Option<Url>,
}

/// Applies listing rules to a listing page
///
/// Links that cannot be resolved (fragments, `javascript:` and so on) are
/// dropped. If no item links are found the next page link is not followed.
pub fn extract_listing(query: &dyn PageQuery, doc: &Document, rules: &ListRules) -> ListingLinks {
    let mut expressions = vec![rules.item_url.as_str()];
    if let Some(next) = rules.next_page_url.as_deref() {
        expressions.push(next);
    }
    let mut results = query.select_batch(doc, &expressions).into_iter();

    let items: Vec<Url> = results
        .next()
        .unwrap_or_default()
        .iter()
        .filter_map(|href| {
            let resolved = resolve_link(href, &doc.url);
            if resolved.is_none() {
                tracing::trace!("Dropping unresolvable item link '{}' on {}", href, doc.url);
            }
            resolved
        })
        .collect();

    if items.is_empty() {
        return ListingLinks::default();
    }

    let next_page = results
        .next()
        .and_then(|matches| matches.into_iter().next())
        .and_then(|href| resolve_link(&href, &doc.url));

    ListingLinks { items, next_page }
}

/// Applies item rules to an item page
///
/// Keys in `list_fields` collect every match; all other keys keep the first
/// match or None. `article_url` is set to the document's final URL.
pub fn extract_item(
    query: &dyn PageQuery,
    doc: &Document,
    rules: &RuleMap,
    list_fields: &[String],
) -> ExtractedRecord {
    let expressions: Vec<&str> = rules.iter().map(|(_, expression)| expression).collect();
    let results = query.select_batch(doc, &expressions);

    let fields: IndexMap<String, FieldValue> = rules
        .iter()
        .zip(results)
        .map(|((field, _), matches)| {
            let value = if list_fields.iter().any(|f| f == field) {
                FieldValue::Many(matches)
            } else {
                FieldValue::Single(matches.into_iter().next())
            };
            if value.is_absent() {
                tracing::debug!("No match for '{}' on {}", field, doc.url);
            }
            (field.to_string(), value)
        })
        .collect();

    ExtractedRecord::new(fields, doc.url.as_str())
}
