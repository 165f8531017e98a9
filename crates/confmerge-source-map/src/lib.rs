//! Source locations for merged configuration
//!
//! This crate provides the small value types that every other confmerge crate
//! uses to talk about *where* a configuration value came from:
//!
//! - [`LineRange`]: a 1-based inclusive range of lines in a source file
//! - [`SourceKind`]: the textual format of a source (`json`, `yaml`, `env`, ...)
//! - [`FieldPath`]: a dotted field path such as `database.port`
//! - [`SourceLocation`]: a resolved location (file + lines, or an env var name)
//!
//! # Example
//!
//! ```rust
//! use confmerge_source_map::*;
//!
//! let text = "a: 1\nb:\n  c: 2\n";
//! let range = LineRange::new(2, 3);
//! assert_eq!(range.to_string(), "line 2-3");
//! assert_eq!(excerpt(text, range), vec!["b:".to_string(), "  c: 2".to_string()]);
//!
//! let path = FieldPath::from_dotted("b.c");
//! assert_eq!(path.to_string(), "b.c");
//! ```

pub mod location;
pub mod types;
pub mod utils;

pub use location::SourceLocation;
pub use types::{FieldPath, LineRange, SourceKind};
pub use utils::{MAX_EXCERPT_WIDTH, dedent, excerpt, line_at, truncate_line};
