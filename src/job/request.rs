//! Inbound crawl request parsing
//!
//! A request is a JSON list of site entries:
//!
//! ```json
//! [{
//!   "website_url": "https://news.example.com/",
//!   "scraping_rules": {
//!     "item_url": "h2 a::attr(href)",
//!     "next_page_url": "a.next::attr(href)",
//!     "article_title": "h1::text"
//!   },
//!   "search_keyword": "budget",
//!   "max_pagination": 3,
//!   "pagination_urls": ["https://news.example.com/archive"]
//! }]
//! ```
//!
//! Rules come either combined in `scraping_rules` (`item_url` and
//! `next_page_url` are split off as listing rules, the rest are item rules) or
//! as explicit `list_rules` + `item_rules`. Mixing both shapes is rejected.

use crate::config::Config;
use crate::crawler::ARTICLE_URL_FIELD;
use crate::job::SiteJob;
use crate::rules::{ListRules, PageQuery, RuleMap, ITEM_URL_RULE, NEXT_PAGE_URL_RULE};
use crate::url::{is_absolute, resolve_link};
use crate::ConfigError;
use serde::Deserialize;
use url::Url;

/// Values applied to site entries that leave them out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDefaults {
    pub max_pagination: u32,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self { max_pagination: 2 }
    }
}

impl RequestDefaults {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_pagination: config.crawler.default_max_pagination,
        }
    }
}

/// One site entry as it appears on the wire
#[derive(Debug, Deserialize)]
struct SiteRequest {
    website_url: String,
    #[serde(default)]
    scraping_rules: Option<RuleMap>,
    #[serde(default)]
    list_rules: Option<RuleMap>,
    #[serde(default)]
    item_rules: Option<RuleMap>,
    #[serde(default)]
    search_keyword: Option<String>,
    #[serde(default)]
    max_pagination: Option<u32>,
    #[serde(default)]
    pagination_urls: Option<Vec<String>>,
}

/// Parses a crawl request payload into site jobs
///
/// Every selector is checked against `query` so a bad rule is reported
/// before any page is fetched.
///
/// # Returns
///
/// * `Ok(Vec<SiteJob>)` - One job per site entry, in request order
/// * `Err(ConfigError)` - The payload is malformed; no job should start
pub fn parse_request(
    payload: &str,
    defaults: RequestDefaults,
    query: &dyn PageQuery,
) -> Result<Vec<SiteJob>, ConfigError> {
    let value: serde_json::Value = serde_json::from_str(payload)?;
    if !value.is_array() {
        return Err(ConfigError::Validation(
            "Expected a list of website scraping rules".to_string(),
        ));
    }

    // Entries are decoded from the raw text so rule maps keep their order
    let sites: Vec<SiteRequest> = serde_json::from_str(payload)
        .map_err(|e| ConfigError::Validation(format!("Invalid site entry: {}", e)))?;

    if sites.is_empty() {
        return Err(ConfigError::Validation(
            "Request contains no websites".to_string(),
        ));
    }

    sites
        .into_iter()
        .map(|site| build_site_job(site, defaults, query))
        .collect()
}

fn build_site_job(
    site: SiteRequest,
    defaults: RequestDefaults,
    query: &dyn PageQuery,
) -> Result<SiteJob, ConfigError> {
    let website_url = Url::parse(site.website_url.trim()).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid website_url '{}': {}", site.website_url, e))
    })?;
    if !is_absolute(&website_url) {
        return Err(ConfigError::InvalidUrl(format!(
            "website_url '{}' must be an absolute HTTP(S) URL",
            site.website_url
        )));
    }

    let (list_map, item_rules) = split_rules(&site)?;

    let list_rules = ListRules::from_rule_map(&list_map)
        .ok_or_else(|| ConfigError::MissingRule(ITEM_URL_RULE.to_string()))?;

    if item_rules.contains(ARTICLE_URL_FIELD) {
        return Err(ConfigError::Validation(format!(
            "'{}' is always the fetched page URL and cannot be a rule",
            ARTICLE_URL_FIELD
        )));
    }

    if item_rules.is_empty() {
        tracing::warn!(
            "No item rules for {}; records will only carry {}",
            website_url,
            ARTICLE_URL_FIELD
        );
    }

    validate_selector(query, ITEM_URL_RULE, &list_rules.item_url)?;
    if let Some(next) = &list_rules.next_page_url {
        validate_selector(query, NEXT_PAGE_URL_RULE, next)?;
    }
    for (field, expression) in item_rules.iter() {
        validate_selector(query, field, expression)?;
    }

    let seed_pagination_urls = site
        .pagination_urls
        .unwrap_or_default()
        .iter()
        .map(|raw| {
            resolve_link(raw, &website_url).ok_or_else(|| {
                ConfigError::InvalidUrl(format!("Invalid pagination URL '{}'", raw))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SiteJob {
        website_url,
        list_rules,
        item_rules,
        search_keyword: site.search_keyword.unwrap_or_default(),
        max_pagination: site.max_pagination.unwrap_or(defaults.max_pagination),
        seed_pagination_urls,
    })
}

/// Splits the site's rules into listing and item rule maps
fn split_rules(site: &SiteRequest) -> Result<(RuleMap, RuleMap), ConfigError> {
    match (&site.scraping_rules, &site.list_rules, &site.item_rules) {
        (Some(combined), None, None) => {
            let mut items = combined.clone();
            let mut list = RuleMap::new();
            for name in [ITEM_URL_RULE, NEXT_PAGE_URL_RULE] {
                if let Some(expression) = items.remove(name) {
                    list.insert(name, expression);
                }
            }
            Ok((list, items))
        }
        (None, Some(list), Some(items)) => {
            if items.contains(ITEM_URL_RULE) || items.contains(NEXT_PAGE_URL_RULE) {
                return Err(ConfigError::Validation(
                    "item_rules must not contain listing rules (item_url, next_page_url)"
                        .to_string(),
                ));
            }
            Ok((list.clone(), items.clone()))
        }
        (None, None, None) => Err(ConfigError::MissingRule("scraping_rules".to_string())),
        (Some(_), _, _) => Err(ConfigError::Validation(
            "Give either scraping_rules or list_rules + item_rules, not both".to_string(),
        )),
        (None, Some(_), None) => Err(ConfigError::MissingRule("item_rules".to_string())),
        (None, None, Some(_)) => Err(ConfigError::MissingRule("list_rules".to_string())),
    }
}

fn validate_selector(query: &dyn PageQuery, field: &str, expression: &str) -> Result<(), ConfigError> {
    query
        .validate(expression)
        .map_err(|message| ConfigError::InvalidSelector {
            field: field.to_string(),
            message,
        })
}
