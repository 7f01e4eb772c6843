//! Error types shared across the crate.
//!
//! Failures that end a run are collected here so the binary can turn them
//! into a log line and an exit code in one place. Editor synchronisation and
//! pipeline stage failures have their own narrower types in `editor` and
//! `pipeline`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A filesystem operation failed on `path`.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No ancestor within the search bound holds the descriptor file.
    #[error(
        "{file} could not be found within {depth} level(s) above {}. \
         Maybe increase the search radius with -ms",
        start.display()
    )]
    DescriptorNotFound {
        start: PathBuf,
        depth: usize,
        file: String,
    },

    /// A variable is absent from the descriptor or is not a flat string assignment.
    #[error("{name} not found in {}", file.display())]
    MissingVariable { name: String, file: PathBuf },

    /// A variable names a path that would leave the project directory.
    #[error("{name} = '{value}' in {} must stay inside the project", file.display())]
    OutsideProject {
        name: String,
        value: String,
        file: PathBuf,
    },

    /// The user-scoped tool configuration could not be read.
    #[error("Invalid tool configuration {}: {message}", path.display())]
    ToolConfig { path: PathBuf, message: String },

    /// No application data directory could be determined for this user.
    #[error("Could not determine an application data directory; set MESONGO_HOME")]
    NoHomeDirectory,

    /// An external program could not be started at all.
    #[error("Could not start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Clipboard unavailable: {message}")]
    Clipboard { message: String },
}

impl Error {
    /// Wraps an `io::Error` with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_not_found_mentions_search_radius() {
        let err = Error::DescriptorNotFound {
            start: PathBuf::from("/tmp/project"),
            depth: 2,
            file: "meson.build".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("meson.build"));
        assert!(message.contains("2 level(s)"));
        assert!(message.contains("-ms"));
    }

    #[test]
    fn test_io_error_carries_path() {
        let err = Error::io(
            "/tmp/missing",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/missing"));
    }
}
