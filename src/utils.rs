//! This module contains logging and filesystem helpers
//! used by the mesongo library

pub mod fs;
pub mod log;
