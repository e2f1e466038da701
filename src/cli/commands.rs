use crate::config::Config;
use crate::models::user::CurrentUser;
use crate::state::SharedState;

pub async fn cmd_users_list(config: Config) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let users = state.admin_service.list_users(&CurrentUser::system()).await?;

    if users.is_empty() {
        println!("No users registered.");
        println!();
        println!("The first account registered through the web UI becomes the admin.");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<60}", "");

    for user in users {
        let status = if user.active { "active" } else { "deactivated" };
        println!("{:<24} {:<14} {}", user.username, user.role.as_str(), status);
    }

    Ok(())
}

pub async fn cmd_users_set_active(
    config: Config,
    username: &str,
    active: bool,
) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let user = state
        .admin_service
        .set_active(&CurrentUser::system(), username, active)
        .await?;

    let status = if user.active { "active" } else { "deactivated" };
    println!("✓ {} is now {}", user.username, status);
    Ok(())
}

pub async fn cmd_users_delete(config: Config, username: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    state
        .admin_service
        .delete_user(&CurrentUser::system(), username)
        .await?;

    println!("✓ Deleted {username}");
    Ok(())
}
