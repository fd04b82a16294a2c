//! Line and file-level parsers for exports files.
//!
//! Physical lines are first assembled into logical lines by
//! [`LogicalLines`], which strips comments and joins backslash
//! continuations. Each logical line is then parsed into exports and
//! appended to an [`ExportTable`].

use super::ast::{DefaultOptions, Export, ExportTable};
use super::error::ParseError;
use super::lexer::{
    Token, classify_token, parse_option_list, parse_path, split_tokens, strip_comment,
    strip_continuation,
};
use log::{debug, trace};
use std::io::BufRead;
use std::str::FromStr;

/// Configuration options for the parser.
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// If true, the first grammar irregularity (unterminated quote, unclosed
    /// option list, empty option) aborts the parse.
    /// If false, irregularities are absorbed and parsing continues
    /// best-effort (lenient mode).
    pub strict: bool,
}

impl ParserConfig {
    /// Creates a new parser config with default settings (lenient mode).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a strict mode parser config.
    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// Creates a lenient mode parser config.
    pub fn lenient() -> Self {
        Self { strict: false }
    }

    /// Sets whether grammar irregularities are errors.
    pub fn with_strict(mut self, value: bool) -> Self {
        self.strict = value;
        self
    }
}

/// A fully assembled logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// The line text with comments and continuation markers removed.
    pub text: String,
    /// The physical line the logical line starts on (1-based).
    pub line: usize,
    /// How many physical lines were joined.
    pub physical_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineState {
    Idle,
    Continuing {
        text: String,
        start: usize,
        count: usize,
    },
}

/// Iterator assembling physical lines into logical lines.
///
/// Blank and comment-only lines are skipped. A line ending in a backslash
/// (optionally followed by whitespace) is joined with the next one. If the
/// input ends while a continuation is pending, the accumulated text is
/// yielded as a final line.
///
/// Input bytes that are not valid UTF-8 are replaced rather than treated
/// as errors; only failures of the reader itself are reported.
pub struct LogicalLines<R> {
    reader: R,
    state: LineState,
    line_num: usize,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> LogicalLines<R> {
    /// Creates a new iterator over the given reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            state: LineState::Idle,
            line_num: 0,
            buf: Vec::new(),
            done: false,
        }
    }

    /// Reads the next physical line without its line ending.
    fn read_physical(&mut self) -> Result<Option<String>, ParseError> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|e| ParseError::read(self.line_num + 1, e))?;
        if read == 0 {
            return Ok(None);
        }
        self.line_num += 1;

        let mut bytes = self.buf.as_slice();
        if let Some(stripped) = bytes.strip_suffix(b"\n") {
            bytes = stripped;
        }
        if let Some(stripped) = bytes.strip_suffix(b"\r") {
            bytes = stripped;
        }
        Ok(Some(String::from_utf8_lossy(bytes).into_owned()))
    }

    /// Feeds one physical line through the state machine.
    fn feed(&mut self, raw: &str) -> Option<LogicalLine> {
        let (joined, start, count) = match std::mem::replace(&mut self.state, LineState::Idle) {
            LineState::Idle => (raw.trim_start().to_string(), self.line_num, 1),
            LineState::Continuing {
                mut text,
                start,
                count,
            } => {
                text.push_str(raw);
                (text, start, count + 1)
            }
        };

        let content = strip_comment(&joined);
        if content.is_empty() {
            return None;
        }

        match strip_continuation(content) {
            Some("") => None,
            Some(body) => {
                self.state = LineState::Continuing {
                    text: body.to_string(),
                    start,
                    count,
                };
                None
            }
            None => Some(LogicalLine {
                text: content.to_string(),
                line: start,
                physical_lines: count,
            }),
        }
    }

    /// Flushes a pending continuation at end of input.
    fn finish(&mut self) -> Option<LogicalLine> {
        match std::mem::replace(&mut self.state, LineState::Idle) {
            LineState::Idle => None,
            LineState::Continuing { text, start, count } => Some(LogicalLine {
                text,
                line: start,
                physical_lines: count,
            }),
        }
    }
}

impl<R: BufRead> Iterator for LogicalLines<R> {
    type Item = Result<LogicalLine, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.read_physical() {
                Ok(Some(raw)) => {
                    if let Some(line) = self.feed(&raw) {
                        return Some(Ok(line));
                    }
                }
                Ok(None) => {
                    self.done = true;
                    return self.finish().map(Ok);
                }
                Err(error) => {
                    self.done = true;
                    return Some(Err(error));
                }
            }
        }
    }
}

/// Reports a grammar irregularity: an error in strict mode, a log entry
/// otherwise.
fn absorb(config: &ParserConfig, error: ParseError) -> Result<(), ParseError> {
    if config.strict {
        debug!("Strict mode: stopping at {}", error);
        return Err(error);
    }
    debug!("{} (ignored)", error);
    Ok(())
}

/// Parses one logical line into its exports.
///
/// `line` is only used for error reporting.
fn parse_line(text: &str, line: usize, config: &ParserConfig) -> Result<Vec<Export>, ParseError> {
    let Ok((remainder, path)) = parse_path(text) else {
        return Ok(Vec::new());
    };
    if path.is_unterminated() {
        absorb(config, ParseError::unterminated_quote(line))?;
    }
    let path = path.text();
    let tokens = split_tokens(remainder)
        .map(|(_, tokens)| tokens)
        .unwrap_or_default();

    let mut defaults = DefaultOptions::new();
    let mut exports = Vec::new();

    for token in tokens {
        match classify_token(token) {
            Token::Defaults(text) => {
                let list = parse_option_list(text);
                if list.empty_items > 0 {
                    absorb(config, ParseError::empty_option(line))?;
                }
                defaults.merge(list.options);
            }
            Token::Host(host) => {
                let options = match host.options {
                    None => defaults.snapshot(),
                    Some(text) => {
                        if host.unclosed {
                            absorb(config, ParseError::unclosed_options(line, host.machine))?;
                        }
                        let list = parse_option_list(text);
                        if list.empty_items > 0 {
                            absorb(config, ParseError::empty_option(line))?;
                        }
                        list.options
                    }
                };
                exports.push(Export::new(path, host.machine, options));
            }
        }
    }

    if exports.is_empty() {
        trace!("Line {}: path '{}' has no hosts", line, path);
    }
    Ok(exports)
}

/// Parses a single logical line leniently.
///
/// Comments are stripped, continuation markers are not interpreted.
pub fn parse_export_line(text: &str) -> Vec<Export> {
    let content = strip_comment(text.trim_start());
    parse_line(content, 1, &ParserConfig::lenient()).unwrap_or_default()
}

/// Parses an exports file from a reader with the given configuration.
pub fn parse_exports_with_config<R: BufRead>(
    reader: R,
    config: &ParserConfig,
) -> Result<ExportTable, ParseError> {
    debug!("Parsing exports (strict={})", config.strict);
    let mut table = ExportTable::new();
    let mut logical_lines = 0;

    for line in LogicalLines::new(reader) {
        let line = line?;
        trace!(
            "Line {}: {} physical line(s): {:?}",
            line.line, line.physical_lines, line.text
        );
        table.extend(parse_line(&line.text, line.line, config)?);
        logical_lines += 1;
    }

    debug!(
        "Parsing complete: {} logical lines, {} paths",
        logical_lines,
        table.len()
    );
    Ok(table)
}

/// Parses an exports file from a reader using default (lenient)
/// configuration.
pub fn parse_exports<R: BufRead>(reader: R) -> Result<ExportTable, ParseError> {
    parse_exports_with_config(reader, &ParserConfig::default())
}

/// Parses an exports file in strict mode, stopping at the first
/// irregularity.
pub fn parse_exports_strict<R: BufRead>(reader: R) -> Result<ExportTable, ParseError> {
    parse_exports_with_config(reader, &ParserConfig::strict())
}

/// Parses exports file content held in memory.
pub fn parse_exports_str(input: &str) -> Result<ExportTable, ParseError> {
    parse_exports(input.as_bytes())
}

impl FromStr for ExportTable {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_exports_str(s)
    }
}
