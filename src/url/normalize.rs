use url::Url;

/// Tracking query parameters that never change the page served
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Derives the key used to recognise an already-queued URL
///
/// # Normalization Steps
///
/// 1. Host is lowercased (the `url` crate already does this on parse)
/// 2. Fragment is removed
/// 3. Tracking parameters (`utm_*`, `fbclid`, `gclid`, `mc_eid`) are removed
/// 4. Remaining query parameters are sorted
///
/// The scheme, the `www.` prefix and a trailing slash are kept as-is: a site
/// may serve different pages on either.
///
/// # Examples
///
/// ```
/// use dynascrape::url::visit_key;
/// use url::Url;
///
/// let a = Url::parse("https://Example.com/list?page=2&utm_source=x#top").unwrap();
/// let b = Url::parse("https://example.com/list?page=2").unwrap();
/// assert_eq!(visit_key(&a), visit_key(&b));
/// ```
pub fn visit_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    url.into()
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort();
    params
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
