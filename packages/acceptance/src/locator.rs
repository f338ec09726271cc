//! Element locators
//!
//! A [`Locator`] is a (strategy, selector) pair that identifies one element.
//! A [`Target`] names a UI element and lists the locators that may find it,
//! most stable first. Positional XPaths break whenever the layout shifts, so
//! they only ever appear as the last candidate.

use std::fmt;

use tracing::{debug, warn};

use crate::driver::BrowserDriver;
use crate::error::{AcceptanceError, Result};

/// How a selector is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// XPath 1.0 expression
    XPath,
    /// CSS selector
    Css,
    /// Exact visible text of a link
    LinkText,
    /// Value of the `data-testid` attribute
    TestId,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::XPath => write!(f, "xpath"),
            Strategy::Css => write!(f, "css"),
            Strategy::LinkText => write!(f, "link text"),
            Strategy::TestId => write!(f, "test id"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    pub strategy: Strategy,
    pub selector: String,
}

/// A locator lowered to something a browser can evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    XPath(String),
    Css(String),
}

impl Locator {
    pub fn new(strategy: Strategy, selector: impl Into<String>) -> Self {
        Self {
            strategy,
            selector: selector.into(),
        }
    }

    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, selector)
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(Strategy::Css, selector)
    }

    pub fn link_text(text: impl Into<String>) -> Self {
        Self::new(Strategy::LinkText, text)
    }

    pub fn test_id(id: impl Into<String>) -> Self {
        Self::new(Strategy::TestId, id)
    }

    /// Lower to a CSS or XPath query.
    ///
    /// Link text matches `<a>` elements whose whitespace-normalized text is
    /// exactly the selector.
    pub fn query(&self) -> Query {
        match self.strategy {
            Strategy::XPath => Query::XPath(self.selector.clone()),
            Strategy::Css => Query::Css(self.selector.clone()),
            Strategy::LinkText => Query::XPath(format!(
                "//a[normalize-space(string(.))={}]",
                xpath_literal(self.selector.trim())
            )),
            Strategy::TestId => Query::Css(format!(
                "[data-testid=\"{}\"]",
                self.selector.replace('\\', "\\\\").replace('"', "\\\"")
            )),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.strategy, self.selector)
    }
}

/// Quote a string as an XPath 1.0 literal.
///
/// XPath has no escape sequences, so a value containing both quote kinds is
/// built with `concat()`.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{}\"", value)
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else {
        let parts: Vec<String> = value
            .split('"')
            .map(|part| format!("\"{}\"", part))
            .collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}

/// A named UI element with its candidate locators, most stable first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: &'static str,
    pub candidates: Vec<Locator>,
}

impl Target {
    pub fn new(name: &'static str, primary: Locator) -> Self {
        Self {
            name,
            candidates: vec![primary],
        }
    }

    /// Add a lower-priority locator.
    pub fn or(mut self, fallback: Locator) -> Self {
        self.candidates.push(fallback);
        self
    }

    /// Find the element right now, without waiting.
    ///
    /// Candidates are tried in order; the first hit wins.
    pub async fn locate<D: BrowserDriver>(&self, driver: &D) -> Result<D::Element> {
        for (index, locator) in self.candidates.iter().enumerate() {
            match driver.find_element(locator).await {
                Ok(element) => {
                    if index > 0 {
                        warn!(target_name = self.name, %locator, "located element by fallback locator");
                    } else {
                        debug!(target_name = self.name, %locator, "located element");
                    }
                    return Ok(element);
                }
                Err(AcceptanceError::LocatorNotFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(self.not_found())
    }

    pub(crate) fn not_found(&self) -> AcceptanceError {
        AcceptanceError::LocatorNotFound {
            target: self.to_string(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let candidates: Vec<String> = self.candidates.iter().map(|l| l.to_string()).collect();
        write!(f, "{} ({})", self.name, candidates.join(" | "))
    }
}
