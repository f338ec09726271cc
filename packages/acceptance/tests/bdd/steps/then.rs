//! Then step definitions
//!
//! Steps that verify outcomes and assertions.

use cucumber::{gherkin::Step, then};
use todolist_acceptance::StepKeyword;

use crate::world::AcceptanceWorld;

#[then(regex = r"^.+$")]
async fn then_step(world: &mut AcceptanceWorld, step: &Step) {
    world.run(StepKeyword::Then, &step.value).await;
}
