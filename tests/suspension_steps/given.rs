//! Given steps for suspension run BDD scenarios.

use super::world::{SuspensionWorld, run_async};
use eyre::WrapErr;
use offboard::suspension::domain::PageNumber;
use rstest_bdd_macros::given;

#[given(r#"task "{key}" will fail"#)]
fn task_will_fail(world: &mut SuspensionWorld, key: String) {
    world.executor.fail(&key);
}

#[given(r#"user "{user_id}" is under review"#)]
fn user_under_review(world: &mut SuspensionWorld, user_id: String) -> Result<(), eyre::Report> {
    let users = run_async(world.service.list_users(PageNumber::FIRST))
        .wrap_err("list first directory page")?;
    let user = users
        .into_iter()
        .find(|user| user.id().as_str() == user_id)
        .ok_or_else(|| eyre::eyre!("user {user_id} is not on the first page"))?;
    world
        .service
        .select_user(user)
        .wrap_err("select user for review")?;
    Ok(())
}

#[given(r#"the tasks "{keys}" are selected"#)]
fn tasks_selected(world: &mut SuspensionWorld, keys: String) -> Result<(), eyre::Report> {
    for key in keys.split(',').map(str::trim) {
        world
            .service
            .toggle_task(key)
            .wrap_err_with(|| format!("select task {key}"))?;
    }
    Ok(())
}

#[given("{count:usize} users have been suspended")]
fn users_suspended(world: &mut SuspensionWorld, count: usize) -> Result<(), eyre::Report> {
    let users = run_async(world.service.list_users(PageNumber::FIRST))
        .wrap_err("list first directory page")?;
    for user in users.into_iter().take(count) {
        world.service.select_user(user)?;
        world.service.toggle_task("suspend")?;
        run_async(world.service.execute(&())).wrap_err("run suspension")?;
    }
    Ok(())
}
