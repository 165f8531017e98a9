//! Command implementations for the confmerge CLI
//!
//! Each command module handles the CLI interface and delegates to the
//! confmerge library.

pub mod locate;
pub mod merge;
