//! Todolist acceptance steps
//!
//! Browser-driven acceptance tests for the todolist landing, login and
//! sign-up flows. This library provides:
//! - An explicit configuration and page registry built from the environment
//! - A browser driver abstraction with Chrome and in-memory implementations
//! - Bounded waits and layout-tolerant element targets
//! - Step handlers and a step binder that rejects duplicate phrases
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use todolist_acceptance::{AcceptanceConfig, AnyLauncher, Session, StepBinder, StepKeyword};
//!
//! let config = Arc::new(AcceptanceConfig::from_env()?);
//! let mut session = Session::new(config.clone(), AnyLauncher::from_config(&config));
//! let binder = StepBinder::with_default_steps()?;
//!
//! binder.execute(&mut session, StepKeyword::Given, "a new user,").await?;
//! binder.execute(&mut session, StepKeyword::When, "they visit the landing page").await?;
//! session.close().await?;
//! ```

pub mod binder;
pub mod config;
pub mod driver;
pub mod error;
pub mod locator;
pub mod pages;
pub mod scenarios;
pub mod session;
pub mod steps;
pub mod ui;
pub mod wait;

// Re-export commonly used items
pub use binder::{StepAction, StepBinder, StepKeyword, StepMatch};
pub use config::{AcceptanceConfig, DriverKind};
pub use driver::{AnyDriver, AnyLauncher, BrowserDriver, ElementState, Launcher};
pub use error::{AcceptanceError, Result};
pub use locator::{Locator, Strategy, Target};
pub use pages::PageRegistry;
pub use scenarios::{run_scenario, Scenario, ScenarioReport};
pub use session::Session;
pub use ui::SignUpDetails;
pub use wait::{Condition, Wait};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
