//! CSS selector queries
//!
//! Expressions are CSS selectors with an optional trailing pseudo-element in
//! the style listing-page rules are usually written in:
//!
//! | Expression            | Result per matched element                    |
//! |-----------------------|-----------------------------------------------|
//! | `h2 a::attr(href)`    | value of the `href` attribute (if present)    |
//! | `h1.title::text`      | each non-blank direct text node, trimmed      |
//! | `div.body`            | the element's outer HTML                      |

use crate::rules::query::{Document, PageQuery};
use scraper::{ElementRef, Html, Selector};

/// What to pull out of each element a selector matches
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Html,
    Text,
    Attr(String),
}

/// `PageQuery` implementation backed by `scraper`
#[derive(Debug, Clone, Default)]
pub struct CssQuery;

impl CssQuery {
    pub fn new() -> Self {
        Self
    }
}

impl PageQuery for CssQuery {
    fn select_all(&self, doc: &Document, expression: &str) -> Vec<String> {
        let Some((selector, target)) = parse_or_warn(expression) else {
            return Vec::new();
        };

        let html = Html::parse_document(&doc.body);
        let matches = html
            .select(&selector)
            .flat_map(|element| extract(element, &target))
            .collect();
        matches
    }

    fn select_one(&self, doc: &Document, expression: &str) -> Option<String> {
        let (selector, target) = parse_or_warn(expression)?;

        let html = Html::parse_document(&doc.body);
        let first = html
            .select(&selector)
            .flat_map(|element| extract(element, &target))
            .next();
        first
    }

    fn select_batch(&self, doc: &Document, expressions: &[&str]) -> Vec<Vec<String>> {
        let html = Html::parse_document(&doc.body);
        let results = expressions
            .iter()
            .map(|expression| match parse_or_warn(expression) {
                Some((selector, target)) => html
                    .select(&selector)
                    .flat_map(|element| extract(element, &target))
                    .collect::<Vec<String>>(),
                None => Vec::new(),
            })
            .collect();
        results
    }

    fn validate(&self, expression: &str) -> Result<(), String> {
        parse_expression(expression).map(|_| ())
    }
}

fn parse_or_warn(expression: &str) -> Option<(Selector, Target)> {
    match parse_expression(expression) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("Skipping invalid selector '{}': {}", expression, e);
            None
        }
    }
}

/// Splits an expression into its CSS selector and pseudo-element target
fn parse_expression(expression: &str) -> Result<(Selector, Target), String> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err("expression is empty".to_string());
    }

    let (css, target) = if let Some(css) = expression.strip_suffix("::text") {
        (css, Target::Text)
    } else if let Some(rest) = expression.strip_suffix(')') {
        match rest.rsplit_once("::attr(") {
            Some((css, name)) => {
                let name = name.trim().trim_matches(|c| c == '"' || c == '\'');
                if name.is_empty() {
                    return Err("::attr() needs an attribute name".to_string());
                }
                (css, Target::Attr(name.to_string()))
            }
            None => (expression, Target::Html),
        }
    } else {
        (expression, Target::Html)
    };

    let css = css.trim();
    let css = if css.is_empty() { ":root" } else { css };

    let selector = Selector::parse(css).map_err(|e| format!("{:?}", e))?;
    Ok((selector, target))
}

fn extract(element: ElementRef<'_>, target: &Target) -> Vec<String> {
    match target {
        Target::Html => vec![element.html()],
        Target::Attr(name) => element
            .value()
            .attr(name)
            .map(|value| vec![value.to_string()])
            .unwrap_or_default(),
        Target::Text => element
            .children()
            .filter_map(|child| child.value().as_text().map(|text| text.trim().to_string()))
            .filter(|text| !text.is_empty())
            .collect(),
    }
}
