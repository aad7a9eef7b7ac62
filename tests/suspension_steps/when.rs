//! When steps for suspension run BDD scenarios.

use super::world::{SuspensionWorld, run_async};
use rstest_bdd_macros::when;

#[when("the suspension is run")]
fn suspension_is_run(world: &mut SuspensionWorld) {
    let result = run_async(world.service.execute(&()));
    world.last_run = Some(result);
}
