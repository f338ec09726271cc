//! BDD test runner for the todolist acceptance steps
//!
//! Runs the Gherkin scenarios in `features/` through the step binder.
//!
//! # Usage
//!
//! Against the in-memory model of the application (default):
//!
//! ```bash
//! cargo test --test bdd -- --nocapture
//! ```
//!
//! Against a running frontend in Chrome:
//!
//! ```bash
//! ACCEPTANCE_DRIVER=chrome VITE_LOGIN_SIGN_UP=https://... cargo test --test bdd
//! ```

// Allow panic/expect in test code - these are appropriate for test setup
#![allow(clippy::expect_used, clippy::panic, clippy::unwrap_used)]

mod steps;
mod world;

use cucumber::World;
use futures::FutureExt;
use std::path::Path;

#[tokio::main]
async fn main() {
    // Initialize tracing subscriber (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .init();

    // Find the features directory relative to the package
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let features_dir = Path::new(manifest_dir)
        .parent() // packages/
        .and_then(|p| p.parent()) // project root
        .map(|p| p.join("features"))
        .expect("Could not find features directory");

    if !features_dir.exists() {
        panic!("Features directory not found: {}", features_dir.display());
    }

    world::AcceptanceWorld::cucumber()
        .max_concurrent_scenarios(1) // One browser at a time
        .after(|_feature, _rule, _scenario, _finished, world| {
            async move {
                // Teardown: the browser never outlives its scenario
                if let Some(world) = world {
                    if let Err(e) = world.session.close().await {
                        tracing::warn!(error = %e, "failed to close browser after scenario");
                    }
                }
            }
            .boxed_local()
        })
        .with_default_cli()
        .run_and_exit(features_dir)
        .await;
}
