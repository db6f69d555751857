use clap::Parser;
use pantry::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pantry=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { path }) => {
            pantry::cli::init::run(path).await?;
        }
        Some(Commands::Serve { host, port }) => {
            pantry::cli::serve::run(&cli.config, host, port).await?;
        }
        Some(Commands::Migrate { status }) => {
            pantry::cli::migrate::run(&cli.config, status).await?;
        }
        Some(Commands::User { command }) => {
            pantry::cli::user::run(&cli.config, command).await?;
        }
        Some(Commands::Token { command }) => {
            pantry::cli::token::run(&cli.config, command).await?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
