//! Given step definitions
//!
//! Steps that set up the initial state for scenarios.

use cucumber::{gherkin::Step, given};
use todolist_acceptance::StepKeyword;

use crate::world::AcceptanceWorld;

#[given(regex = r"^.+$")]
async fn given_step(world: &mut AcceptanceWorld, step: &Step) {
    world.run(StepKeyword::Given, &step.value).await;
}
