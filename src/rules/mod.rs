//! Selector rules and page queries
//!
//! This module contains:
//! - `RuleMap`: ordered field name -> selector expression mapping
//! - `ListRules`: the two rules that drive listing page expansion
//! - `PageQuery`: the two-method query capability the engine depends on
//! - `CssQuery`: the CSS implementation of `PageQuery` (built on `scraper`)

mod css;
mod query;
mod rule_map;

pub use css::CssQuery;
pub use query::{Document, PageQuery};
pub use rule_map::{ListRules, RuleMap, ITEM_URL_RULE, NEXT_PAGE_URL_RULE};
