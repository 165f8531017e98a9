//! Error records for configuration loading and their text rendering.
//!
//! Every fatal problem found while loading is collected into one
//! [`ConfigLoadError`], so a single failed load reports all of its
//! independent problems. The `Display` output of each type is a stable
//! text format:
//!
//! ```text
//! Config loading errors (1)
//!
//!   [db.port]  Expected int, got str
//!    └── FILE 'config.json', line 3
//!        "port": "eighty"
//!
//! ```

pub mod location;
pub mod errors;

pub use location::{format_location, source_repr};

pub use errors::{
    ConfigLoadError,
    FieldGroupViolationError,
    FieldLoadError,
    MergeConflictFieldError,
};

pub use confmerge_source_map::{FieldPath, SourceLocation};
