use std::{
    fs,
    io::copy,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{config::ModelConfig, error::BotError};

/// Return the local model path, downloading it first if it is missing
/// and a hub source is configured.
///
/// A missing file without a hub source is not an error here; opening
/// the session reports it.
pub fn ensure_model(config: &ModelConfig) -> Result<PathBuf, BotError> {
    if config.path.exists() {
        info!(path = %config.path.display(), "found model");
        return Ok(config.path.clone());
    }

    if let Some(hub) = &config.hub {
        let url = hub.url();
        info!(%url, path = %config.path.display(), "model not found, downloading");
        download(&url, &config.path)?;
        info!("download complete");
    }

    Ok(config.path.clone())
}

/// Fetch `url` into `path`, via a temporary file so an interrupted
/// download never leaves a truncated model behind.
pub fn download(url: &str, path: &Path) -> Result<(), BotError> {
    let mut response = reqwest::blocking::get(url)?;

    if !response.status().is_success() {
        return Err(BotError::DownloadStatus(
            response.status().as_u16(),
            url.to_string(),
        ));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let partial = path.with_extension("part");
    let mut dest = fs::File::create(&partial)?;
    copy(&mut response, &mut dest)?;
    dest.sync_all()?;
    fs::rename(&partial, path)?;
    Ok(())
}
