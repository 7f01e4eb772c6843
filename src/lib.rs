//! A one-command front end for Meson/Ninja C and C++ projects.
//!
//! From anywhere inside a project, `mesongo` finds the nearest `meson.build`,
//! decides whether the build needs a full setup or just a reconfigure,
//! compiles, installs and runs the result. It also keeps a small library of
//! project templates.
//!
//! User-scoped settings are read from `config.toml` in the application home
//! (see [`global_cfg`]).

/// Splits the raw command line into per-tool argument groups
pub mod args;
/// Flag parsing for the binary
pub mod cli;
/// Entry points used by the binary
pub mod commands;
/// Keeps editor tooling pointed at the build
pub mod editor;
pub mod error;
/// Source set fingerprinting
pub mod fingerprint;
/// Handles global config
pub mod global_cfg;
pub mod locator;
/// Contains descriptor parse related functions
pub mod parser;
/// The setup, compile, install and execute state machine
pub mod pipeline;
pub mod templates;
/// Contains logger and filesystem helpers
pub mod utils;
