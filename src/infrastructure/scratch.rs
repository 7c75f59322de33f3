use crate::config::ExtractorConfig;
use std::path::PathBuf;
use tracing::info;

/// Create the scratch root if it does not exist yet
pub async fn setup_scratch_dir(config: &ExtractorConfig) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(&config.scratch_dir).await?;
    info!("🗂️  Scratch storage: {}", config.scratch_dir.display());
    Ok(config.scratch_dir.clone())
}
