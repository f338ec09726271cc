//! World struct for Cucumber BDD tests
//!
//! Holds the browser session that persists across steps in a scenario.

use cucumber::World;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use todolist_acceptance::config::DEFAULT_LANDING_URL;
use todolist_acceptance::{AcceptanceConfig, AnyLauncher, DriverKind, Session, StepBinder, StepKeyword};

/// Login page of the simulated application.
const SIMULATED_LOGIN_URL: &str = "http://localhost:8080/login";

/// Test world that holds state across steps in a Cucumber scenario.
#[derive(World)]
#[world(init = Self::new)]
pub struct AcceptanceWorld {
    /// Browser session for the current scenario
    pub session: Session<AnyLauncher>,
    /// Phrase to handler bindings
    pub binder: StepBinder,
}

impl fmt::Debug for AcceptanceWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcceptanceWorld")
            .field("session", &self.session)
            .field("binder", &format!("<{} steps bound>", self.binder.len()))
            .finish()
    }
}

impl Default for AcceptanceWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Chrome when `ACCEPTANCE_DRIVER=chrome`, otherwise the simulated app.
fn scenario_config() -> AcceptanceConfig {
    match std::env::var("ACCEPTANCE_DRIVER") {
        Ok(driver) if driver.eq_ignore_ascii_case("chrome") => AcceptanceConfig::from_env()
            .unwrap_or_else(|e| panic!("Failed to load acceptance configuration: {}", e)),
        _ => AcceptanceConfig::new(DEFAULT_LANDING_URL, SIMULATED_LOGIN_URL)
            .with_driver(DriverKind::Simulated)
            .with_poll_interval(Duration::from_millis(50)),
    }
}

impl AcceptanceWorld {
    pub fn new() -> Self {
        let config = Arc::new(scenario_config());
        let launcher = AnyLauncher::from_config(&config);
        let binder = StepBinder::with_default_steps()
            .unwrap_or_else(|e| panic!("Failed to register steps: {}", e));

        Self {
            session: Session::new(config, launcher),
            binder,
        }
    }

    /// Run one step through the binder, failing the scenario on error.
    pub async fn run(&mut self, keyword: StepKeyword, text: &str) {
        if let Err(e) = self.binder.execute(&mut self.session, keyword, text).await {
            panic!("{} {}: {}", keyword, text, e);
        }
    }
}
