use url::Url;

/// A fetched page ready to be queried
#[derive(Debug, Clone)]
pub struct Document {
    /// URL that was requested
    pub requested_url: Url,

    /// Final URL after redirects; relative links resolve against it
    pub url: Url,

    /// HTTP status code of the final response
    pub status: u16,

    /// Page body
    pub body: String,
}

impl Document {
    pub fn new(requested_url: Url, url: Url, status: u16, body: impl Into<String>) -> Self {
        Self {
            requested_url,
            url,
            status,
            body: body.into(),
        }
    }

    /// Returns true if a redirect moved the document away from the requested URL
    pub fn was_redirected(&self) -> bool {
        self.requested_url != self.url
    }
}

/// Query capability the crawl engine applies selector expressions through
///
/// The expression language is owned by the implementation; the engine only
/// passes rule strings through. Empty results are never errors.
pub trait PageQuery: Send + Sync {
    /// Returns every match in document order
    fn select_all(&self, doc: &Document, expression: &str) -> Vec<String>;

    /// Returns the first match only
    fn select_one(&self, doc: &Document, expression: &str) -> Option<String> {
        self.select_all(doc, expression).into_iter().next()
    }

    /// Evaluates several expressions against one document
    ///
    /// Results line up with `expressions`. Implementations that have to parse
    /// the page should parse it once here rather than once per expression.
    fn select_batch(&self, doc: &Document, expressions: &[&str]) -> Vec<Vec<String>> {
        expressions
            .iter()
            .map(|expression| self.select_all(doc, expression))
            .collect()
    }

    /// Checks that an expression can be evaluated at all
    fn validate(&self, expression: &str) -> Result<(), String> {
        let _ = expression;
        Ok(())
    }
}
