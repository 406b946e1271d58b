//! Writing the current YAML document to disk.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Write `yaml` to `path`, creating parent directories as needed.
pub fn write_yaml(path: &Path, yaml: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
    }
    std::fs::write(path, yaml).with_context(|| format!("write {}", path.display()))
}

/// File name for an ad-hoc save, e.g. `spheron-2024-05-01_12-30-00.yaml`.
pub fn timestamped_file_name(now: time::OffsetDateTime) -> String {
    let fmt = time::macros::format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    let stamp = now.format(&fmt).unwrap_or_else(|_| "now".into());
    format!("spheron-{stamp}.yaml")
}

/// Save `yaml` under a timestamped name in `dir`. Returns the path written.
pub fn save_timestamped(dir: &Path, yaml: &str) -> Result<PathBuf> {
    let now = time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc());
    let path = dir.join(timestamped_file_name(now));
    write_yaml(&path, yaml)?;
    Ok(path)
}
