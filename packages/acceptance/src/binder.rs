//! Step binder
//!
//! Maps step phrases to handlers. A phrase may contain `{name}` placeholders
//! that capture text from the step (`the user should be redirected to the
//! {page_name} page.`). Each phrase can be bound once per keyword; a second
//! registration is an error at startup instead of silently shadowing the
//! first.
//!
//! # Example
//!
//! ```ignore
//! let binder = StepBinder::with_default_steps()?;
//! binder.execute(&mut session, StepKeyword::Given, "a new user,").await?;
//! binder.execute(&mut session, StepKeyword::When, "they visit the landing page").await?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use tracing::{debug, info};

use crate::driver::Launcher;
use crate::error::{AcceptanceError, Result};
use crate::session::Session;
use crate::steps;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKeyword {
    Given,
    When,
    Then,
    /// Matches under any keyword
    Any,
}

impl StepKeyword {
    /// Whether a binding under `self` can be reached by a step under `other`.
    pub fn overlaps(self, other: StepKeyword) -> bool {
        self == other || self == StepKeyword::Any || other == StepKeyword::Any
    }
}

impl fmt::Display for StepKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKeyword::Given => write!(f, "Given"),
            StepKeyword::When => write!(f, "When"),
            StepKeyword::Then => write!(f, "Then"),
            StepKeyword::Any => write!(f, "Step"),
        }
    }
}

impl FromStr for StepKeyword {
    type Err = AcceptanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "given" => Ok(StepKeyword::Given),
            "when" => Ok(StepKeyword::When),
            "then" => Ok(StepKeyword::Then),
            "step" | "*" => Ok(StepKeyword::Any),
            other => Err(AcceptanceError::Config(format!("unknown step keyword '{}'", other))),
        }
    }
}

/// The handlers a phrase can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    GivenNewUser,
    VisitLandingPage,
    SelectGetStarted,
    AssertRedirected,
    VisitLoginPage,
    SelectSignUp,
    ProvideValidInformation,
    AssertAccountCreated,
}

#[derive(Debug, Clone)]
struct Binding {
    keyword: StepKeyword,
    pattern: String,
    regex: Regex,
    action: StepAction,
}

/// A resolved step: the action and its captured placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepMatch {
    pub action: StepAction,
    pub captures: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct StepBinder {
    bindings: Vec<Binding>,
}

/// Compile a phrase with `{name}` placeholders to an anchored regex.
fn compile_pattern(pattern: &str) -> Result<Regex> {
    let mut source = String::from("^");
    let mut rest = pattern;
    while let Some(open) = rest.find('{') {
        let close = rest[open..].find('}').map(|i| open + i).ok_or_else(|| {
            AcceptanceError::Config(format!("unclosed placeholder in step pattern '{}'", pattern))
        })?;
        let name = &rest[open + 1..close];
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(AcceptanceError::Config(format!(
                "invalid placeholder '{{{}}}' in step pattern '{}'",
                name, pattern
            )));
        }
        source.push_str(&regex::escape(&rest[..open]));
        source.push_str(&format!("(?P<{}>.+?)", name));
        rest = &rest[close + 1..];
    }
    source.push_str(&regex::escape(rest));
    source.push('$');

    Regex::new(&source)
        .map_err(|e| AcceptanceError::Config(format!("invalid step pattern '{}': {}", pattern, e)))
}

impl StepBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bindings for the landing page and sign-up features.
    pub fn with_default_steps() -> Result<Self> {
        let mut binder = Self::new();
        binder.register(StepKeyword::Given, "a new user,", StepAction::GivenNewUser)?;
        binder.register(StepKeyword::When, "they visit the landing page", StepAction::VisitLandingPage)?;
        binder.register(StepKeyword::Any, "select “Get Started“ button,", StepAction::SelectGetStarted)?;
        binder.register(
            StepKeyword::Then,
            "the user should be redirected to the {page_name} page.",
            StepAction::AssertRedirected,
        )?;
        binder.register(StepKeyword::When, "they visit the login page", StepAction::VisitLoginPage)?;
        binder.register(StepKeyword::Any, "select the “Sign Up“ button", StepAction::SelectSignUp)?;
        binder.register(StepKeyword::Any, "provide valid information,", StepAction::ProvideValidInformation)?;
        binder.register(
            StepKeyword::Then,
            "they should be able to create an account.",
            StepAction::AssertAccountCreated,
        )?;
        Ok(binder)
    }

    /// Bind `pattern` under `keyword`.
    ///
    /// Fails with [`AcceptanceError::DuplicateStep`] when the same pattern is
    /// already bound under an overlapping keyword.
    pub fn register(&mut self, keyword: StepKeyword, pattern: &str, action: StepAction) -> Result<()> {
        if self
            .bindings
            .iter()
            .any(|b| b.pattern == pattern && b.keyword.overlaps(keyword))
        {
            return Err(AcceptanceError::DuplicateStep {
                keyword,
                pattern: pattern.to_string(),
            });
        }

        let regex = compile_pattern(pattern)?;
        debug!(%keyword, pattern, ?action, "registered step");
        self.bindings.push(Binding {
            keyword,
            pattern: pattern.to_string(),
            regex,
            action,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Find the binding for a step. The whole text must match.
    pub fn resolve(&self, keyword: StepKeyword, text: &str) -> Result<StepMatch> {
        let text = text.trim();
        self.bindings
            .iter()
            .filter(|b| b.keyword.overlaps(keyword))
            .find_map(|b| {
                let caps = b.regex.captures(text)?;
                let captures = b
                    .regex
                    .capture_names()
                    .flatten()
                    .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str().to_string())))
                    .collect();
                Some(StepMatch {
                    action: b.action,
                    captures,
                })
            })
            .ok_or_else(|| AcceptanceError::UndefinedStep {
                keyword,
                text: text.to_string(),
            })
    }

    /// Resolve and run one step against the session.
    pub async fn execute<L: Launcher>(
        &self,
        session: &mut Session<L>,
        keyword: StepKeyword,
        text: &str,
    ) -> Result<()> {
        let step = self.resolve(keyword, text)?;
        info!(%keyword, step = text, "running step");

        match step.action {
            StepAction::GivenNewUser => steps::given_new_user(session).await,
            StepAction::VisitLandingPage => steps::visit_landing_page(session).await,
            StepAction::SelectGetStarted => steps::select_get_started(session).await,
            StepAction::AssertRedirected => {
                let page_name = step.captures.get("page_name").ok_or_else(|| {
                    AcceptanceError::Config("redirect step bound without a {page_name} placeholder".into())
                })?;
                steps::assert_redirected(session, page_name).await
            }
            StepAction::VisitLoginPage => steps::visit_login_page(session).await,
            StepAction::SelectSignUp => steps::select_sign_up(session).await,
            StepAction::ProvideValidInformation => steps::provide_valid_information(session).await,
            StepAction::AssertAccountCreated => steps::assert_account_created(session).await,
        }
    }
}
