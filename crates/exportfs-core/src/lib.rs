//! Exports File Core
//!
//! A library for parsing and rendering UNIX `exports` files, the format
//! that declares which filesystem paths are shared with which hosts and
//! under what options.
//!
//! # Features
//!
//! - **Parser**: Parse exports files into a path → exports table, with
//!   quoted paths, comments, backslash continuations and `-opts` defaults
//! - **Rendering**: Render options, exports and whole tables back to the
//!   canonical text form
//! - **Lenient Mode**: Absorb malformed lines and parse them best-effort
//! - **Strict Mode**: Stop at the first malformed line
//!
//! # Quick Start
//!
//! ```rust
//! use exportfs_core::parse::parse_exports_str;
//!
//! let input = r#"
//! /               master(rw) trusty(rw,no_root_squash)
//! "/home/dumb user" pc002(rw)
//! /srv/www        -sync,rw server @trusted @external(ro)
//! "#;
//!
//! let table = parse_exports_str(input).unwrap();
//!
//! let www = table.get("/srv/www").unwrap();
//! assert_eq!(www.len(), 3);
//! assert_eq!(www[0].to_string(), "/srv/www server(sync,rw)");
//!
//! // Render a whole path back to one line
//! let group = table.group("/").unwrap();
//! assert_eq!(group.to_string(), "/ master(rw) trusty(rw,no_root_squash)");
//! ```
//!
//! # Modules
//!
//! - [`parse`]: Parser and data model for exports files
//! - `generate`: Random exports file generation (feature `generate`)

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[cfg(feature = "generate")]
pub mod generate;
pub mod parse;

// Re-export commonly used types at the crate root
pub use parse::{
    Export, ExportGroup, ExportOption, ExportTable, ParseError, ParserConfig, parse_exports,
    parse_exports_str, parse_exports_with_config, render_export_group,
};

/// The conventional location of the exports file.
pub const DEFAULT_EXPORTS_PATH: &str = "/etc/exports";

/// Reads and parses an exports file using the given configuration.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use exportfs_core::{DEFAULT_EXPORTS_PATH, ParserConfig, read_exports_file};
///
/// match read_exports_file(Path::new(DEFAULT_EXPORTS_PATH), &ParserConfig::default()) {
///     Ok(table) => print!("{}", table),
///     Err(e) => eprintln!("{}", e),
/// }
/// ```
pub fn read_exports_file(path: &Path, config: &ParserConfig) -> Result<ExportTable, ParseError> {
    let file = File::open(path).map_err(|e| ParseError::open(path, e))?;
    parse_exports_with_config(BufReader::new(file), config)
}
