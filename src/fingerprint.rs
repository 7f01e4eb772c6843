//! This module detects additions, removals and renames of source files
//! between invocations by comparing the current source listing with a
//! snapshot persisted at the project root.

use crate::error::{Error, Result};
use crate::utils::log::{log, LogLevel};
use itertools::Itertools;
use sha1::{Digest, Sha1};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// An unordered set of normalized source paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    paths: BTreeSet<String>,
}

impl SourceSet {
    /// Builds a set from raw paths, normalizing each of them.
    pub fn from_paths<I, S>(paths: I) -> SourceSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = paths
            .into_iter()
            .filter_map(|p| normalize(p.as_ref()))
            .collect();
        SourceSet { paths }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    #[cfg(test)]
    fn contains(&self, path: &str) -> bool {
        normalize(path).is_some_and(|p| self.paths.contains(&p))
    }

    /// The persisted form: sorted paths, one per line
    pub fn to_listing(&self) -> String {
        self.paths.iter().join("\n")
    }

    /// SHA-1 hex digest of the sorted listing. Two sets are equal exactly
    /// when their fingerprints are.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha1::new();
        hasher.update(self.to_listing().as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect()
    }
}

/// Relative, `/`-separated, without a leading `./`. Empty lines are dropped.
fn normalize(path: &str) -> Option<String> {
    let unified = path.trim().replace('\\', "/");
    let parts: Vec<&str> = unified
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Computes, persists and compares source snapshots for one project root
#[derive(Debug, Clone)]
pub struct SourceFingerprintCache {
    root: PathBuf,
    cache_file: PathBuf,
    extensions: Vec<String>,
    excluded: Vec<PathBuf>,
}

impl SourceFingerprintCache {
    pub fn new(root: &Path, cache_file_name: &str, extensions: &[String]) -> Self {
        SourceFingerprintCache {
            root: root.to_path_buf(),
            cache_file: root.join(cache_file_name),
            extensions: extensions.to_vec(),
            excluded: Vec::new(),
        }
    }

    /// Skips everything under `dir` (typically the build directory) when enumerating.
    pub fn excluding(mut self, dir: &Path) -> Self {
        self.excluded.push(dir.to_path_buf());
        self
    }

    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    /// Enumerates the source files currently under the root.
    pub fn compute_current(&self) -> SourceSet {
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| self.should_descend(entry));
        let mut paths = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(why) => {
                    log(LogLevel::Warn, &format!("Skipping unreadable entry: {}", why));
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.has_source_extension(entry.path()) {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                paths.push(relative.to_string_lossy().into_owned());
            }
        }
        SourceSet::from_paths(paths)
    }

    fn should_descend(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        !hidden && !self.excluded.iter().any(|dir| entry.path() == dir)
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|wanted| wanted == ext))
    }

    /// Reads the persisted snapshot; an absent or unreadable file is an empty set.
    pub fn load_cached(&self) -> SourceSet {
        if !self.cache_file.exists() {
            return SourceSet::default();
        }
        match fs::read_to_string(&self.cache_file) {
            Ok(contents) => SourceSet::from_paths(contents.lines()),
            Err(why) => {
                log(
                    LogLevel::Warn,
                    &format!("Failed to read source cache {}: {}", self.cache_file.display(), why),
                );
                SourceSet::default()
            }
        }
    }

    /// Overwrites the snapshot with `sources`.
    pub fn store(&self, sources: &SourceSet) -> Result<()> {
        fs::write(&self.cache_file, sources.to_listing())
            .map_err(|e| Error::io(&self.cache_file, e))
    }

    /// Persists the current listing unconditionally.
    pub fn refresh(&self) -> Result<()> {
        let current = self.compute_current();
        log(
            LogLevel::Debug,
            &format!(
                "Refreshing source cache ({} files, {})",
                current.len(),
                current.fingerprint()
            ),
        );
        self.store(&current)
    }

    /// Reports whether the source listing changed since the snapshot.
    ///
    /// On a change the new listing is persisted right away, so a second call
    /// without further filesystem changes reports `false` whether or not the
    /// caller acted on the first answer.
    pub fn needs_reconfigure(&self) -> Result<bool> {
        let current = self.compute_current();
        let cached = self.load_cached();
        let (current_print, cached_print) = (current.fingerprint(), cached.fingerprint());
        log(
            LogLevel::Debug,
            &format!("Source fingerprint: current {} cached {}", current_print, cached_print),
        );
        if current_print == cached_print {
            return Ok(false);
        }
        self.store(&current)?;
        Ok(true)
    }

    /// Deletes the snapshot. Returns `false` if it existed and could not be removed.
    pub fn clear(&self) -> bool {
        if !self.cache_file.exists() {
            return true;
        }
        match fs::remove_file(&self.cache_file) {
            Ok(()) => {
                log(LogLevel::Info, &format!("Cleaning: {}", self.cache_file.display()));
                true
            }
            Err(why) => {
                log(LogLevel::Error, &format!("Could not remove source cache: {}", why));
                false
            }
        }
    }
}
