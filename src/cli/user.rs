use crate::services::auth;
use anyhow::Result;
use std::path::Path;

use super::UserCommand;

fn prompt_new_password(prompt: &str) -> Result<String> {
    let password = rpassword::prompt_password(prompt)?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }
    Ok(password)
}

pub async fn run(config_path: &Path, command: UserCommand) -> Result<()> {
    let (_, db) = super::open(config_path)?;
    db.migrate()?;

    match command {
        UserCommand::Add {
            email,
            name,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => prompt_new_password("Password: ")?,
            };

            auth::create_user(&db, &email, &name, &password)?;
            tracing::info!("User '{}' created", email);
        }
        UserCommand::List => {
            println!("{:<6} {:<30} {:<24} {}", "ID", "EMAIL", "NAME", "CREATED");
            println!("{}", "-".repeat(80));
            for user in auth::list_users(&db)? {
                println!(
                    "{:<6} {:<30} {:<24} {}",
                    user.id, user.email, user.name, user.created_at
                );
            }
        }
        UserCommand::Remove { email } => {
            if auth::delete_user(&db, &email)? {
                tracing::info!("User '{}' removed", email);
            } else {
                tracing::warn!("User '{}' not found", email);
            }
        }
        UserCommand::Passwd { email } => {
            let password = prompt_new_password("New password: ")?;
            auth::update_password(&db, &email, &password)?;
            tracing::info!("Password updated for '{}'", email);
        }
    }

    Ok(())
}
