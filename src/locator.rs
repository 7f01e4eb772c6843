//! Finds the project root by walking up from the working directory.

use crate::error::{Error, Result};
use crate::utils::log::{log, LogLevel};
use std::path::{Path, PathBuf};

/// Returns the first of `start` and its ancestors (at most `max_depth` levels
/// up) that contains a file named `descriptor`.
///
/// `max_depth == 0` inspects `start` only. The walk also stops at the
/// filesystem root.
pub fn locate_project_root(start: &Path, max_depth: usize, descriptor: &str) -> Result<PathBuf> {
    for dir in start.ancestors().take(max_depth.saturating_add(1)) {
        log(LogLevel::Debug, &format!("Looking for {} in {}", descriptor, dir.display()));
        if dir.join(descriptor).is_file() {
            return Ok(dir.to_path_buf());
        }
    }
    Err(Error::DescriptorNotFound {
        start: start.to_path_buf(),
        depth: max_depth,
        file: descriptor.to_string(),
    })
}
