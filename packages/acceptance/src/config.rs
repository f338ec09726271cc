//! Configuration for the acceptance steps
//!
//! All environment-derived settings are gathered into one explicit
//! [`AcceptanceConfig`] that is handed to the session at scenario start.
//! Missing required values fail at load time rather than surfacing later as
//! a confusing redirect mismatch.
//!
//! # Environment
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `VITE_LOGIN_SIGN_UP` | yes | |
//! | `ACCEPTANCE_LANDING_URL` | no | `http://localhost:8080/` |
//! | `ACCEPTANCE_WAIT_TIMEOUT_SECS` | no | `10` |
//! | `ACCEPTANCE_POLL_INTERVAL_MS` | no | `500` |
//! | `ACCEPTANCE_HEADLESS` | no | `true` |
//! | `ACCEPTANCE_DRIVER` | no | `chrome` |
//!
//! A `.env` file in the working directory (or any parent) is loaded first;
//! variables already set in the process environment win.
//!
//! Blank optional variables take their default. A value that does not parse
//! is a configuration error.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::{AcceptanceError, Result};
use crate::pages::{PageRegistry, HOME, LANDING, LOGIN_SIGN_UP};

/// Landing page of the application under test.
pub const DEFAULT_LANDING_URL: &str = "http://localhost:8080/";

/// Environment variable holding the hosted login / sign-up URL.
pub const LOGIN_SIGN_UP_ENV: &str = "VITE_LOGIN_SIGN_UP";

/// Upper bound for every explicit wait.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// How often a wait re-checks the page.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Which browser driver backs the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverKind {
    /// Real Chrome over the DevTools protocol
    #[default]
    Chrome,
    /// In-memory model of the application
    Simulated,
}

impl FromStr for DriverKind {
    type Err = AcceptanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" => Ok(DriverKind::Chrome),
            "simulated" => Ok(DriverKind::Simulated),
            other => Err(AcceptanceError::Config(format!(
                "unknown driver '{}', expected 'chrome' or 'simulated'",
                other
            ))),
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverKind::Chrome => write!(f, "chrome"),
            DriverKind::Simulated => write!(f, "simulated"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AcceptanceConfig {
    pub landing_url: String,
    pub login_sign_up_url: String,
    pub pages: PageRegistry,
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
    pub headless: bool,
    pub driver: DriverKind,
}

impl AcceptanceConfig {
    /// Build a configuration from explicit URLs.
    ///
    /// The page registry is seeded with `landing`, `home` and
    /// `login_sign_up`. Call [`validate`](Self::validate) before use when the
    /// URLs come from user input.
    pub fn new(landing_url: impl Into<String>, login_sign_up_url: impl Into<String>) -> Self {
        let landing_url = landing_url.into();
        let login_sign_up_url = login_sign_up_url.into();

        let mut pages = PageRegistry::new()
            .with_page(LANDING, landing_url.clone())
            .with_page(LOGIN_SIGN_UP, login_sign_up_url.clone());
        if let Ok(home) = Url::parse(&landing_url).and_then(|base| base.join("home")) {
            pages.insert(HOME, home.to_string());
        }

        Self {
            landing_url,
            login_sign_up_url,
            pages,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            headless: true,
            driver: DriverKind::default(),
        }
    }

    /// Load from `.env` and the process environment, then validate.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(AcceptanceError::Config(format!("failed to load .env: {}", e)));
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup, then validate.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let login_sign_up_url = lookup(LOGIN_SIGN_UP_ENV)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AcceptanceError::Config(format!("{} not set", LOGIN_SIGN_UP_ENV)))?;

        let landing_url = lookup("ACCEPTANCE_LANDING_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LANDING_URL.to_string());

        let wait_timeout_secs = parse_var(&lookup, "ACCEPTANCE_WAIT_TIMEOUT_SECS", u64::from_str)?
            .unwrap_or(DEFAULT_WAIT_TIMEOUT.as_secs());

        let poll_interval_ms = parse_var(&lookup, "ACCEPTANCE_POLL_INTERVAL_MS", u64::from_str)?
            .unwrap_or(DEFAULT_POLL_INTERVAL.as_millis() as u64);

        let headless = parse_var(&lookup, "ACCEPTANCE_HEADLESS", parse_flag)?.unwrap_or(true);

        let driver = match lookup("ACCEPTANCE_DRIVER") {
            Some(v) if !v.trim().is_empty() => v.parse()?,
            _ => DriverKind::default(),
        };

        let config = Self::new(landing_url, login_sign_up_url.trim())
            .with_wait_timeout(Duration::from_secs(wait_timeout_secs))
            .with_poll_interval(Duration::from_millis(poll_interval_ms))
            .with_headless(headless)
            .with_driver(driver);
        config.validate()?;
        Ok(config)
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_driver(mut self, driver: DriverKind) -> Self {
        self.driver = driver;
        self
    }

    pub fn with_page(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.pages.insert(name, url);
        self
    }

    /// Check URLs and timing bounds.
    pub fn validate(&self) -> Result<()> {
        validate_url("landing URL", &self.landing_url)?;
        validate_url(LOGIN_SIGN_UP_ENV, &self.login_sign_up_url)?;
        for (name, url) in self.pages.iter() {
            validate_url(&format!("page '{}'", name), url)?;
        }

        if self.poll_interval.is_zero() {
            return Err(AcceptanceError::Config(
                "poll interval must be greater than zero".into(),
            ));
        }
        if self.poll_interval > self.wait_timeout {
            return Err(AcceptanceError::Config(format!(
                "poll interval {:?} exceeds wait timeout {:?}",
                self.poll_interval, self.wait_timeout
            )));
        }
        Ok(())
    }
}

/// Parse an optional variable. Unset or blank is `None`; anything else must parse.
fn parse_var<F, T, E>(lookup: &F, key: &str, parse: fn(&str) -> std::result::Result<T, E>) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    E: fmt::Display,
{
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => parse(v.trim())
            .map(Some)
            .map_err(|e| AcceptanceError::Config(format!("{} '{}' is invalid: {}", key, v, e))),
        _ => Ok(None),
    }
}

fn parse_flag(value: &str) -> std::result::Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err("expected true/false, 1/0, yes/no or on/off".to_string()),
    }
}

fn validate_url(what: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| AcceptanceError::Config(format!("{} '{}' is not a URL: {}", what, value, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(AcceptanceError::Config(format!(
            "{} '{}' must use http or https, not {}",
            what, value, scheme
        ))),
    }
}
