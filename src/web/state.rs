use crate::{Config, Database};
use anyhow::Result;
use std::path::PathBuf;

pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub media_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Result<Self> {
        let media_dir = PathBuf::from(&config.media.upload_dir);
        std::fs::create_dir_all(&media_dir)?;
        let max_upload_bytes = config.media.max_upload_bytes()?;

        Ok(Self {
            config,
            db,
            media_dir,
            max_upload_bytes,
        })
    }

    pub fn media_prefix(&self) -> &str {
        self.config.media.url_prefix.trim_end_matches('/')
    }
}
