use anyhow::Result;
use std::path::PathBuf;

const DEFAULT_CONFIG: &str = r#"[server]
host = "127.0.0.1"
port = 3000
request_timeout_secs = 30

[database]
path = "./data/pantry.db"
pool_size = 10

[media]
upload_dir = "./data/media"
url_prefix = "/media"
max_upload_size = "10MB"

[auth]
# token_lifetime_days = 90
"#;

pub async fn run(path: PathBuf) -> Result<()> {
    let config_path = path.join("pantry.toml");
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    std::fs::create_dir_all(path.join("data/media"))?;
    std::fs::write(&config_path, DEFAULT_CONFIG)?;

    tracing::info!("Created pantry config at {:?}", config_path);
    tracing::info!("Run 'pantry user add' to create an account");
    tracing::info!("Run 'pantry serve' to start the server");

    Ok(())
}
