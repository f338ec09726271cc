//! Built-in scenarios
//!
//! The same two scenarios as `features/landing_page.feature`, expressed as
//! data so they can run through the [`StepBinder`] without a Gherkin runner.

use tracing::{error, info};

use crate::binder::{StepBinder, StepKeyword};
use crate::driver::Launcher;
use crate::error::Result;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: &'static str,
    pub steps: Vec<(StepKeyword, &'static str)>,
}

/// Outcome of one scenario run.
#[derive(Debug)]
pub struct ScenarioReport {
    pub name: &'static str,
    pub steps_passed: usize,
    pub steps_total: usize,
    pub failure: Option<(String, crate::error::AcceptanceError)>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

pub fn builtin() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "Get Started takes a new user to the login page",
            steps: vec![
                (StepKeyword::Given, "a new user,"),
                (StepKeyword::When, "they visit the landing page"),
                (StepKeyword::When, "select “Get Started“ button,"),
                (StepKeyword::Then, "the user should be redirected to the login_sign_up page."),
            ],
        },
        Scenario {
            name: "A new user signs up from the login page",
            steps: vec![
                (StepKeyword::Given, "a new user,"),
                (StepKeyword::When, "they visit the login page"),
                (StepKeyword::When, "select the “Sign Up“ button"),
                (StepKeyword::When, "provide valid information,"),
                (StepKeyword::Then, "they should be able to create an account."),
            ],
        },
    ]
}

/// Run the steps in order, stopping at the first failure.
///
/// The session is closed afterwards whatever the outcome; a close failure is
/// reported only when every step passed.
pub async fn run_scenario<L: Launcher>(
    binder: &StepBinder,
    session: &mut Session<L>,
    scenario: &Scenario,
) -> ScenarioReport {
    info!(scenario = scenario.name, "scenario started");
    let mut report = ScenarioReport {
        name: scenario.name,
        steps_passed: 0,
        steps_total: scenario.steps.len(),
        failure: None,
    };

    for (keyword, text) in &scenario.steps {
        if let Err(e) = binder.execute(session, *keyword, text).await {
            error!(scenario = scenario.name, step = *text, error = %e, "step failed");
            report.failure = Some((format!("{} {}", keyword, text), e));
            break;
        }
        report.steps_passed += 1;
    }

    let closed: Result<()> = session.close().await;
    if let Err(e) = closed {
        if report.failure.is_none() {
            report.failure = Some(("close browser".to_string(), e));
        }
    }

    info!(
        scenario = scenario.name,
        passed = report.passed(),
        steps_passed = report.steps_passed,
        steps_total = report.steps_total,
        "scenario finished"
    );
    report
}
