//! Parser module for exports files.
//!
//! This module parses the UNIX `exports` format into an [`ExportTable`]
//! mapping each shared path to its host entries, and renders those
//! structures back into the canonical text form.
//!
//! # Example
//!
//! ```rust
//! use exportfs_core::parse::parse_exports_str;
//!
//! let input = r#"
//! # exports file
//! /pub       master(rw) *(ro,insecure,all_squash)
//! /srv/www   -sync,rw server @trusted @external(ro)
//! "#;
//!
//! let table = parse_exports_str(input).unwrap();
//! for (path, exports) in table.iter() {
//!     println!("{} -> {} host(s)", path, exports.len());
//! }
//! ```

mod ast;
mod error;
mod lexer;
mod parser;

// Re-export public types
pub use ast::{
    DefaultOptions, Export, ExportGroup, ExportOption, ExportTable, render_export_group,
    render_path,
};
pub use error::ParseError;
pub use parser::{
    LogicalLine, LogicalLines, ParserConfig, parse_export_line, parse_exports, parse_exports_str,
    parse_exports_strict, parse_exports_with_config,
};

// Re-export lexer utilities that may be useful for custom parsing
pub use lexer::{
    HostToken, OptionList, PathToken, Token, classify_token, parse_host, parse_option_list,
    parse_path, split_tokens, strip_comment, strip_continuation,
};
