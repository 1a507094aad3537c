use std::fs;
use std::io::Write;
use std::path::Path;

use reqwest::blocking::Client;
use tempfile::NamedTempFile;

use crate::config::EphemerisConfig;
use crate::error::ChartError;

/// The data files the Swiss backend needs for modern-era charts: main
/// asteroid belt, moon, and planets.
pub const ESSENTIAL_FILES: [&str; 3] = ["seas_18.se1", "semo_18.se1", "sepl_18.se1"];

/// Makes sure the essential ephemeris files exist locally, fetching any
/// missing ones from the configured host.
///
/// Idempotent and safe under concurrent first runs: each file is staged in
/// the target directory and atomically persisted, so a losing racer just
/// replaces the file with identical bytes. Files already present are never
/// touched. A single fetch failure aborts immediately; there are no retries.
pub fn ensure_ephe_files(config: &EphemerisConfig) -> Result<(), ChartError> {
    fs::create_dir_all(&config.data_dir)?;

    let client = Client::new();
    for filename in ESSENTIAL_FILES {
        let target = config.data_dir.join(filename);
        if target.exists() {
            continue;
        }
        fetch_file(&client, &config.download_base_url, filename, &target)?;
    }
    Ok(())
}

fn fetch_file(
    client: &Client,
    base_url: &str,
    filename: &str,
    target: &Path,
) -> Result<(), ChartError> {
    let url = format!("{}/{}", base_url.trim_end_matches('/'), filename);
    tracing::info!(%url, "fetching ephemeris data file");

    let bytes = client.get(&url).send()?.error_for_status()?.bytes()?;

    // Stage next to the target so persist() is a same-filesystem rename.
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(&bytes)?;
    staged.persist(target).map_err(|e| ChartError::Io(e.error))?;

    tracing::debug!(file = %target.display(), size = bytes.len(), "ephemeris file installed");
    Ok(())
}
