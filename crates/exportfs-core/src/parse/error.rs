//! Error types for exports file parsing.
//!
//! In the default lenient mode the only way a parse fails is the underlying
//! reader failing. The grammar variants are produced in strict mode only.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// An error that occurred while reading or parsing an exports file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Reading a line from the input failed.
    #[error("line {line}: failed to read input: {source}")]
    Read {
        /// The physical line that could not be read (1-based).
        line: usize,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The exports file could not be opened.
    #[error("failed to open '{}': {source}", .path.display())]
    Open {
        /// The path that was opened.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A quoted path has no closing quote.
    #[error("line {line}: unterminated quoted path")]
    UnterminatedQuote {
        /// The line where the logical line starts (1-based).
        line: usize,
    },

    /// A host's option list has no closing parenthesis.
    #[error("line {line}: missing ')' after options for '{machine}'")]
    UnclosedOptions {
        /// The line where the logical line starts (1-based).
        line: usize,
        /// The host pattern whose options are unclosed.
        machine: String,
    },

    /// An option list contains an item without a key.
    #[error("line {line}: empty option")]
    EmptyOption {
        /// The line where the logical line starts (1-based).
        line: usize,
    },
}

impl ParseError {
    /// Creates a read error.
    pub fn read(line: usize, source: io::Error) -> Self {
        Self::Read { line, source }
    }

    /// Creates an open error.
    pub fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    /// Creates an unterminated quote error.
    pub fn unterminated_quote(line: usize) -> Self {
        Self::UnterminatedQuote { line }
    }

    /// Creates an unclosed options error.
    pub fn unclosed_options(line: usize, machine: impl Into<String>) -> Self {
        Self::UnclosedOptions {
            line,
            machine: machine.into(),
        }
    }

    /// Creates an empty option error.
    pub fn empty_option(line: usize) -> Self {
        Self::EmptyOption { line }
    }

    /// Returns the line number where this error occurred, or 0 if the
    /// error is not tied to a line.
    pub fn line(&self) -> usize {
        match self {
            ParseError::Read { line, .. } => *line,
            ParseError::Open { .. } => 0,
            ParseError::UnterminatedQuote { line } => *line,
            ParseError::UnclosedOptions { line, .. } => *line,
            ParseError::EmptyOption { line } => *line,
        }
    }

    /// Returns true if this error came from the underlying input rather
    /// than from the grammar.
    pub fn is_io(&self) -> bool {
        matches!(self, ParseError::Read { .. } | ParseError::Open { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error() {
        let error = ParseError::read(3, io::Error::other("disk on fire"));
        assert!(matches!(error, ParseError::Read { line: 3, .. }));
        assert!(error.is_io());
        assert_eq!(error.line(), 3);
        assert!(error.to_string().contains("disk on fire"));
    }

    #[test]
    fn open_error() {
        let error = ParseError::open(
            "/etc/exports",
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        );
        assert!(error.is_io());
        assert_eq!(error.line(), 0);
        assert!(error.to_string().contains("/etc/exports"));
    }

    #[test]
    fn unterminated_quote_error() {
        let error = ParseError::unterminated_quote(7);
        assert!(!error.is_io());
        assert_eq!(error.line(), 7);
        assert!(error.to_string().contains("unterminated"));
    }

    #[test]
    fn unclosed_options_error() {
        let error = ParseError::unclosed_options(2, "master");
        assert!(matches!(
            &error,
            ParseError::UnclosedOptions { line: 2, machine } if machine == "master"
        ));
        assert!(error.to_string().contains("'master'"));
    }

    #[test]
    fn empty_option_error() {
        let error = ParseError::empty_option(5);
        assert_eq!(error.line(), 5);
        assert_eq!(error.to_string(), "line 5: empty option");
    }
}
