//! Output destination resolution
//!
//! Decides what happens when the output file already exists. This runs
//! before the run controller starts; the sink itself only appends.

use crate::HarvestError;
use std::path::{Path, PathBuf};

/// What to do when the output destination already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Refuse to start; the caller must pick another name
    #[default]
    Fail,

    /// Delete the existing file and start empty
    Overwrite,

    /// Keep existing records and append after them
    Append,
}

/// Resolves the output destination according to the conflict policy
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path the sink can open for appending
/// * `Err(HarvestError::DestinationConflict)` - File exists under `Fail`
pub fn resolve_destination(path: &Path, policy: ConflictPolicy) -> Result<PathBuf, HarvestError> {
    if !path.exists() {
        return Ok(path.to_path_buf());
    }

    match policy {
        ConflictPolicy::Fail => Err(HarvestError::DestinationConflict {
            path: path.display().to_string(),
        }),
        ConflictPolicy::Overwrite => {
            tracing::info!("Overwriting existing output {}", path.display());
            std::fs::remove_file(path)?;
            Ok(path.to_path_buf())
        }
        ConflictPolicy::Append => {
            tracing::info!("Appending to existing output {}", path.display());
            Ok(path.to_path_buf())
        }
    }
}
