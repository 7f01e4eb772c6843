//! Parsing Module
//!
//! Reads the handful of flat string variables the front end needs out of the
//! project descriptor. This is a line scanner, not a Meson parser: only
//! `name = 'value'` (or double-quoted) assignments at the start of a line are
//! recognized. Nested, concatenated or computed values are not.

use crate::error::{Error, Result};
use crate::global_cfg::DescriptorConfig;
use crate::utils::log::{log, LogLevel};
use regex::Regex;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Returns the string literal assigned to `name` on the first line that
/// starts with `name =`, or `None` when there is no such line or that line
/// holds no quoted literal.
pub fn scan_variable(contents: &str, name: &str) -> Option<String> {
    let declaration = Regex::new(&format!(r"^{}\s*=", regex::escape(name))).ok()?;
    let literal = Regex::new(r#"^\s*(?:'([^']*)'|"([^"]*)")"#).ok()?;

    let line = contents.lines().find(|line| declaration.is_match(line))?;
    let value_start = declaration.find(line)?.end();
    let captures = literal.captures(&line[value_start..]);
    match captures.and_then(|c| c.get(1).or_else(|| c.get(2))) {
        Some(value) => Some(value.as_str().to_string()),
        None => {
            log(
                LogLevel::Warn,
                &format!("{} is declared but not assigned a plain string: {}", name, line.trim()),
            );
            None
        }
    }
}

/// Reads `path` and scans it for `name`. An unreadable file is reported and
/// treated like a missing variable.
pub fn read_variable(path: &Path, name: &str) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(contents) => scan_variable(&contents, name),
        Err(why) => {
            log(
                LogLevel::Error,
                &format!("Could not read {}: {}", path.display(), why),
            );
            None
        }
    }
}

/// Struct describing the project descriptor and the values derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    pub path: PathBuf,
    pub build_dir: String,
    pub output_subdir: String,
    pub output_name: String,
}

impl ProjectDescriptor {
    /// Reads the three required variables from the descriptor in `root`.
    /// Any absent variable is an error, and so is a value that climbs out of
    /// the project with `..`.
    pub fn resolve(root: &Path, config: &DescriptorConfig) -> Result<ProjectDescriptor> {
        let path = root.join(&config.file);
        let require = |name: &str| -> Result<String> {
            let value = read_variable(&path, name)
                .map(|value| strip_leading_separators(&value).to_string())
                .ok_or_else(|| Error::MissingVariable {
                    name: name.to_string(),
                    file: path.clone(),
                })?;
            if !stays_inside(&value) {
                return Err(Error::OutsideProject {
                    name: name.to_string(),
                    value,
                    file: path.clone(),
                });
            }
            Ok(value)
        };
        let build_dir = require(&config.build_dir_var)?;
        let output_subdir = require(&config.output_dir_var)?;
        let output_name = require(&config.output_name_var)?;
        log(
            LogLevel::Debug,
            &format!(
                "Descriptor {}: build_dir={:?} output_subdir={:?} output_name={:?}",
                path.display(),
                build_dir,
                output_subdir,
                output_name
            ),
        );
        Ok(ProjectDescriptor {
            path,
            build_dir,
            output_subdir,
            output_name,
        })
    }
}

/// Keeps descriptor values relative so they always resolve under the root
fn strip_leading_separators(value: &str) -> &str {
    value.trim_start_matches(['/', '\\'])
}

/// `..`, drive prefixes and roots could point a value outside the project
fn stays_inside(value: &str) -> bool {
    Path::new(value)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Absolute locations the pipeline works with, resolved once per run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub build_dir: PathBuf,
    pub output_dir: PathBuf,
    pub executable: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: &Path, descriptor: &ProjectDescriptor) -> ProjectLayout {
        let build_dir = root.join(&descriptor.build_dir);
        let output_dir = build_dir.join(&descriptor.output_subdir);
        let executable = output_dir.join(format!(
            "{}{}",
            descriptor.output_name,
            std::env::consts::EXE_SUFFIX
        ));
        ProjectLayout {
            root: root.to_path_buf(),
            build_dir,
            output_dir,
            executable,
        }
    }

    /// `path` relative to the project root, with `/` separators
    pub fn relative(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
