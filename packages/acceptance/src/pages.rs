//! Page registry
//!
//! Maps the symbolic page names used in step phrases ("the user should be
//! redirected to the login_sign_up page.") to the absolute URLs the browser
//! is expected to land on.

use std::collections::BTreeMap;

use crate::error::{AcceptanceError, Result};

/// Name of the hosted login / sign-up page.
pub const LOGIN_SIGN_UP: &str = "login_sign_up";
/// Name of the public landing page.
pub const LANDING: &str = "landing";
/// Name of the authenticated home page.
pub const HOME: &str = "home";

/// Symbolic page name to expected absolute URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRegistry {
    pages: BTreeMap<String, String>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a page.
    pub fn insert(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.pages.insert(name.into(), url.into());
    }

    pub fn with_page(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.insert(name, url);
        self
    }

    /// Look up the URL registered for `name`.
    pub fn resolve(&self, name: &str) -> Result<&str> {
        self.pages
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| AcceptanceError::UnknownPage(name.to_string()))
    }

    /// Assert that `current_url` is exactly the URL registered for `name`.
    ///
    /// Comparison is byte-for-byte: a trailing slash, a query string or a
    /// different scheme all count as a mismatch.
    pub fn assert_redirected(&self, name: &str, current_url: &str) -> Result<()> {
        let expected = self.resolve(name)?;
        if expected == current_url {
            Ok(())
        } else {
            Err(AcceptanceError::AssertionFailed(format!(
                "expected to be on the {} page at '{}', but the browser is at '{}'",
                name, expected, current_url
            )))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pages.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
