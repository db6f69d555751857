use anyhow::Result;
use std::path::Path;

pub async fn run(config_path: &Path, status: bool) -> Result<()> {
    let (_, db) = super::open(config_path)?;

    if !status {
        db.migrate()?;
        tracing::info!("Migrations complete");
    }

    println!("{:<10} {}", "VERSION", "APPLIED");
    for (version, applied_at) in db.migration_status()? {
        println!(
            "{:<10} {}",
            format!("{:03}", version),
            applied_at.as_deref().unwrap_or("pending")
        );
    }

    Ok(())
}
