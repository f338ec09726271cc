//! Run the built-in acceptance scenarios without a Gherkin runner.
//!
//! Usage:
//!   VITE_LOGIN_SIGN_UP=https://... cargo run --bin acceptance-smoke
//!
//! Configuration comes from `.env` and the environment (see
//! `todolist_acceptance::config`). Set `ACCEPTANCE_DRIVER=simulated` to run
//! against the in-memory model of the application instead of Chrome.
//!
//! Exits non-zero if configuration fails to load or any scenario fails.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use todolist_acceptance::scenarios::{builtin, run_scenario};
use todolist_acceptance::{AcceptanceConfig, AnyLauncher, Session, StepBinder};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AcceptanceConfig::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let binder = match StepBinder::with_default_steps() {
        Ok(binder) => binder,
        Err(e) => {
            tracing::error!(error = %e, "failed to register steps");
            std::process::exit(1);
        }
    };

    tracing::info!(
        driver = %config.driver,
        landing = %config.landing_url,
        login = %config.login_sign_up_url,
        "running acceptance scenarios"
    );

    let mut failed = 0;
    for scenario in builtin() {
        let mut session = Session::new(config.clone(), AnyLauncher::from_config(&config));
        let report = run_scenario(&binder, &mut session, &scenario).await;
        match &report.failure {
            None => println!("PASS  {} ({} steps)", report.name, report.steps_total),
            Some((step, e)) => {
                failed += 1;
                println!("FAIL  {}\n      at: {}\n      {}", report.name, step, e);
            }
        }
    }

    if failed > 0 {
        tracing::error!(failed, "acceptance scenarios failed");
        std::process::exit(1);
    }
}
