use crate::rules::{ListRules, RuleMap};
use url::Url;

/// One site to crawl, fixed for the lifetime of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteJob {
    /// First listing page
    pub website_url: Url,

    /// Rules applied to listing pages
    pub list_rules: ListRules,

    /// Rules applied to item pages; keys name the output fields
    pub item_rules: RuleMap,

    /// Carried through unchanged; not used for filtering
    pub search_keyword: String,

    /// Maximum number of listing page fetches
    pub max_pagination: u32,

    /// Extra listing pages queued after `website_url`
    pub seed_pagination_urls: Vec<Url>,
}

impl SiteJob {
    /// Seed listing URLs in queue order: the website URL first
    pub fn seed_urls(&self) -> impl Iterator<Item = &Url> {
        std::iter::once(&self.website_url).chain(self.seed_pagination_urls.iter())
    }
}
