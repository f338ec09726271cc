//! When step definitions
//!
//! Steps that drive the browser.

use cucumber::{gherkin::Step, when};
use todolist_acceptance::StepKeyword;

use crate::world::AcceptanceWorld;

#[when(regex = r"^.+$")]
async fn when_step(world: &mut AcceptanceWorld, step: &Step) {
    world.run(StepKeyword::When, &step.value).await;
}
