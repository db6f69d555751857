use crate::services::{api_token, auth};
use anyhow::Result;
use std::path::Path;

use super::TokenCommand;

pub async fn run(config_path: &Path, command: TokenCommand) -> Result<()> {
    let (config, db) = super::open(config_path)?;
    db.migrate()?;

    match command {
        TokenCommand::Create {
            email,
            password,
            name,
            expires_days,
        } => {
            let password = match password {
                Some(p) => p,
                None => rpassword::prompt_password(format!("Password for {}: ", email))?,
            };
            let user = auth::authenticate(&db, &email, &password)?
                .ok_or_else(|| anyhow::anyhow!("Invalid email or password"))?;

            let expires_at = expires_days
                .or(config.auth.token_lifetime_days)
                .map(|days| {
                    (chrono::Utc::now() + chrono::Duration::days(i64::from(days))).to_rfc3339()
                });

            let (raw, token) =
                api_token::create_token(&db, user.id, &name, expires_at.as_deref())?;
            tracing::info!("Issued token {} ({}) for '{}'", token.id, token.prefix, email);
            println!("{}", raw);
        }
        TokenCommand::List { email } => {
            let user_id = match email {
                Some(email) => Some(
                    auth::get_user_by_email(&db, &email)?
                        .ok_or_else(|| anyhow::anyhow!("User '{}' not found", email))?
                        .id,
                ),
                None => None,
            };

            println!(
                "{:<6} {:<8} {:<20} {:<16} {:<26} {}",
                "ID", "USER", "NAME", "PREFIX", "EXPIRES", "LAST USED"
            );
            for token in api_token::list_tokens(&db, user_id)? {
                println!(
                    "{:<6} {:<8} {:<20} {:<16} {:<26} {}",
                    token.id,
                    token.user_id,
                    token.name,
                    token.prefix,
                    token.expires_at.as_deref().unwrap_or("never"),
                    token.last_used_at.as_deref().unwrap_or("-")
                );
            }
        }
        TokenCommand::Revoke { id } => {
            if api_token::revoke_token(&db, id)? {
                tracing::info!("Token {} revoked", id);
            } else {
                tracing::warn!("Token {} not found", id);
            }
        }
    }

    Ok(())
}
