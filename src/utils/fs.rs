//! Filesystem helpers for copying and removing whole trees

use crate::error::{Error, Result};
use crate::utils::log::{log, LogLevel};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Copies the tree under `src` into `dst`, creating directories as needed.
/// Existing files in `dst` are overwritten; other content is left alone.
/// Entries under any of `skip` are not copied. Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path, skip: &[&Path]) -> Result<usize> {
    let entries: Vec<walkdir::DirEntry> = WalkDir::new(src)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !skip.iter().any(|s| entry.path() == *s))
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            Error::io(path, e.into())
        })?;

    let file_count = entries.iter().filter(|e| e.file_type().is_file()).count();
    let bar = ProgressBar::new(file_count as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {wide_msg}") {
        bar.set_style(style);
    }

    fs::create_dir_all(dst).map_err(|e| Error::io(dst, e))?;
    let mut copied = 0;
    for entry in &entries {
        let relative = match entry.path().strip_prefix(src) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative,
            _ => continue,
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            bar.set_message(relative.display().to_string());
            fs::copy(entry.path(), &target).map_err(|e| Error::io(&target, e))?;
            bar.inc(1);
            copied += 1;
        } else {
            log(LogLevel::Debug, &format!("Not copying {}", entry.path().display()));
        }
    }
    bar.finish_and_clear();
    Ok(copied)
}

/// Removes a file if present. Returns `false` only when removal failed.
pub fn remove_file_if_exists(path: &Path) -> bool {
    if !path.exists() {
        return true;
    }
    match fs::remove_file(path) {
        Ok(()) => {
            log(LogLevel::Info, &format!("Cleaning: {}", path.display()));
            true
        }
        Err(why) => {
            log(LogLevel::Error, &format!("Could not remove {}: {}", path.display(), why));
            false
        }
    }
}

/// Removes a directory tree if present. Returns `false` only when removal failed.
pub fn remove_dir_if_exists(path: &Path) -> bool {
    if !path.exists() {
        return true;
    }
    match fs::remove_dir_all(path) {
        Ok(()) => {
            log(LogLevel::Info, &format!("Cleaning: {}", path.display()));
            true
        }
        Err(why) => {
            log(LogLevel::Error, &format!("Could not remove {}: {}", path.display(), why));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_tree_merges_and_overwrites() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("src/include")).unwrap();
        fs::write(src.path().join("meson.build"), "new").unwrap();
        fs::write(src.path().join("src/include/a.h"), "header").unwrap();
        fs::write(dst.path().join("meson.build"), "old").unwrap();
        fs::write(dst.path().join("keep.txt"), "mine").unwrap();

        let copied = copy_tree(src.path(), dst.path(), &[]).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(dst.path().join("meson.build")).unwrap(), "new");
        assert_eq!(fs::read_to_string(dst.path().join("src/include/a.h")).unwrap(), "header");
        assert_eq!(fs::read_to_string(dst.path().join("keep.txt")).unwrap(), "mine");
    }

    #[test]
    fn test_copy_tree_skips_requested_paths() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("store/old")).unwrap();
        fs::write(src.path().join("store/old/file"), "x").unwrap();
        fs::write(src.path().join("main.c"), "int main(){}").unwrap();

        let skip = src.path().join("store");
        let copied = copy_tree(src.path(), dst.path(), &[skip.as_path()]).unwrap();

        assert_eq!(copied, 1);
        assert!(!dst.path().join("store").exists());
    }

    #[test]
    fn test_remove_helpers_tolerate_missing_paths() {
        let temp = TempDir::new().unwrap();
        assert!(remove_file_if_exists(&temp.path().join("nope")));
        assert!(remove_dir_if_exists(&temp.path().join("nope")));

        let dir = temp.path().join("dir/sub");
        fs::create_dir_all(&dir).unwrap();
        assert!(remove_dir_if_exists(&temp.path().join("dir")));
        assert!(!temp.path().join("dir").exists());
    }
}
