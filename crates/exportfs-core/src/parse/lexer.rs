//! Lexer and token parsers for exports files.
//!
//! This module contains the nom-based parsers for the pieces of a logical
//! line: the path, the whitespace-separated tokens after it, host tokens
//! and comma-separated option lists. None of them reject input; irregular
//! shapes are reported back to the caller so it can decide how strict to be.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_till, take_till1},
    character::complete::{char, multispace0, space0},
    combinator::{opt, rest},
    multi::many0,
    sequence::{delimited, preceded},
};

use super::ast::ExportOption;

/// Removes a trailing comment from a line.
///
/// The comment starts at the first `#` that is not escaped with a
/// backslash. Escaped markers are kept verbatim.
pub fn strip_comment(line: &str) -> &str {
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        match c {
            '#' if !escaped => return &line[..idx],
            '\\' => escaped = !escaped,
            _ => escaped = false,
        }
    }
    line
}

/// Detects a continuation marker (a backslash optionally followed by
/// whitespace) at the end of a line.
///
/// Returns the line without the marker if one is present.
pub fn strip_continuation(line: &str) -> Option<&str> {
    line.trim_end().strip_suffix('\\')
}

/// The character that ends an unquoted path.
fn is_path_terminator(c: char) -> bool {
    c == ' '
}

/// The path at the start of a logical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathToken<'a> {
    /// An unquoted path.
    Bare(&'a str),
    /// A path enclosed in double quotes (quotes not included).
    Quoted(&'a str),
    /// A quoted path whose closing quote is missing; holds the text after
    /// the opening quote up to the first space.
    Unterminated(&'a str),
}

impl<'a> PathToken<'a> {
    /// Returns the path text.
    pub fn text(&self) -> &'a str {
        match self {
            PathToken::Bare(text) | PathToken::Quoted(text) | PathToken::Unterminated(text) => {
                text
            }
        }
    }

    /// Returns true if a quoted path is missing its closing quote.
    pub fn is_unterminated(&self) -> bool {
        matches!(self, PathToken::Unterminated(_))
    }
}

/// Parses the path at the start of a logical line.
///
/// A path starting with a double quote runs to the matching quote and the
/// scan resumes right after it. Otherwise the path runs to the first space;
/// other whitespace such as tabs is part of the path.
///
/// When the closing quote is missing, the path falls back to the unquoted
/// rule (up to the first space) so the hosts after it are still parsed.
pub fn parse_path(input: &str) -> IResult<&str, PathToken<'_>> {
    let (input, _) = space0(input)?;
    alt((
        delimited(char('"'), take_till(|c: char| c == '"'), char('"')).map(PathToken::Quoted),
        preceded(char('"'), take_till(is_path_terminator)).map(PathToken::Unterminated),
        take_till(is_path_terminator).map(PathToken::Bare),
    ))
    .parse(input)
}

/// Splits the remainder of a line into whitespace-separated tokens.
///
/// Runs of whitespace of any length separate tokens.
pub fn split_tokens(input: &str) -> IResult<&str, Vec<&str>> {
    let (input, tokens) =
        many0(preceded(multispace0, take_till1(|c: char| c.is_whitespace()))).parse(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, tokens))
}

/// A host token: `machine` or `machine(opts)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostToken<'a> {
    /// The host pattern.
    pub machine: &'a str,
    /// The text between the parentheses, if there are any.
    pub options: Option<&'a str>,
    /// True if the options lack their closing parenthesis.
    pub unclosed: bool,
}

/// One token after the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A `-opts` token; holds the option list without the leading dash.
    Defaults(&'a str),
    /// A host entry.
    Host(HostToken<'a>),
}

/// Splits a host token at its first `(`.
fn host_parts(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    (take_till(|c: char| c == '('), opt(preceded(char('('), rest))).parse(input)
}

/// Parses a host token.
///
/// The options are everything after the first `(`, minus a trailing `)`.
/// When the closing parenthesis is missing the whole tail is taken.
pub fn parse_host(token: &str) -> HostToken<'_> {
    let Ok((_, (machine, tail))) = host_parts(token) else {
        return HostToken {
            machine: token,
            options: None,
            unclosed: false,
        };
    };

    match tail {
        None => HostToken {
            machine,
            options: None,
            unclosed: false,
        },
        Some(tail) => match tail.strip_suffix(')') {
            Some(inner) => HostToken {
                machine,
                options: Some(inner),
                unclosed: false,
            },
            None => HostToken {
                machine,
                options: Some(tail),
                unclosed: true,
            },
        },
    }
}

/// Classifies a token as a defaults token or a host token.
pub fn classify_token(token: &str) -> Token<'_> {
    match token.strip_prefix('-') {
        Some(options) => Token::Defaults(options),
        None => Token::Host(parse_host(token)),
    }
}

/// Splits one option item once on `=`.
fn option_item(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    (take_till(|c: char| c == '='), opt(preceded(char('='), rest))).parse(input)
}

/// The result of parsing a comma-separated option list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionList {
    /// The parsed options, in source order.
    pub options: Vec<ExportOption>,
    /// The number of items dropped because they had no key.
    pub empty_items: usize,
}

/// Parses a comma-separated option list such as `rw,anonuid=150`.
///
/// Each item splits once on the first `=`; items without `=` become flags.
/// Items with an empty key are dropped and counted.
pub fn parse_option_list(input: &str) -> OptionList {
    let mut list = OptionList::default();
    for item in input.split(',') {
        let (key, value) = match option_item(item) {
            Ok((_, (key, value))) => (key, value.unwrap_or_default()),
            Err(_) => (item, ""),
        };
        if key.is_empty() {
            list.empty_items += 1;
            continue;
        }
        list.options.push(ExportOption::new(key, value));
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_comment_removes_trailing_comment() {
        assert_eq!(
            strip_comment("/pub master(rw)   #Master should be able to write."),
            "/pub master(rw)   "
        );
    }

    #[test]
    fn strip_comment_whole_line() {
        assert_eq!(strip_comment("# sample /etc/exports file"), "");
    }

    #[test]
    fn strip_comment_no_comment() {
        assert_eq!(strip_comment("/usr *(ro)"), "/usr *(ro)");
    }

    #[test]
    fn strip_comment_escaped_marker() {
        assert_eq!(strip_comment(r"/a\#b host # note"), r"/a\#b host ");
        assert_eq!(strip_comment(r"/a\\#b"), r"/a\\");
    }

    #[test]
    fn strip_continuation_detects_marker() {
        assert_eq!(strip_continuation("master(rw) \\"), Some("master(rw) "));
        assert_eq!(strip_continuation("master(rw) \\  \t"), Some("master(rw) "));
        assert_eq!(strip_continuation("master(rw)"), None);
        assert_eq!(strip_continuation("\\"), Some(""));
    }

    #[test]
    fn parse_path_bare() {
        let (rest, path) = parse_path("/pub master(rw)").unwrap();
        assert_eq!(path, PathToken::Bare("/pub"));
        assert_eq!(rest, " master(rw)");
    }

    #[test]
    fn parse_path_keeps_tab() {
        let (rest, path) = parse_path("/a\tb host(rw)").unwrap();
        assert_eq!(path, PathToken::Bare("/a\tb"));
        assert_eq!(rest, " host(rw)");
    }

    #[test]
    fn parse_path_quoted() {
        let (rest, path) = parse_path("\"/home/dumb user\" pc002(rw)").unwrap();
        assert_eq!(path, PathToken::Quoted("/home/dumb user"));
        assert_eq!(rest, " pc002(rw)");
    }

    #[test]
    fn parse_path_quoted_resumes_after_quote() {
        let (rest, path) = parse_path("\"/var/log\"master(rw)").unwrap();
        assert_eq!(path.text(), "/var/log");
        assert_eq!(rest, "master(rw)");
    }

    #[test]
    fn parse_path_unterminated_quote() {
        let (rest, path) = parse_path("\"/home/dumb user pc002(rw)").unwrap();
        assert!(path.is_unterminated());
        assert_eq!(path.text(), "/home/dumb");
        assert_eq!(rest, " user pc002(rw)");
    }

    #[test]
    fn parse_path_only() {
        let (rest, path) = parse_path("/lonely").unwrap();
        assert_eq!(path.text(), "/lonely");
        assert_eq!(rest, "");
    }

    #[test]
    fn parse_path_keeps_inner_quote_in_bare_path() {
        let (_, path) = parse_path("/a\"b host").unwrap();
        assert_eq!(path, PathToken::Bare("/a\"b"));
    }

    #[test]
    fn split_tokens_on_whitespace_runs() {
        let (rest, tokens) = split_tokens("   master(rw) \t  trusty(rw,no_root_squash)  ").unwrap();
        assert_eq!(tokens, vec!["master(rw)", "trusty(rw,no_root_squash)"]);
        assert_eq!(rest, "");
    }

    #[test]
    fn split_tokens_empty() {
        let (_, tokens) = split_tokens("   ").unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn classify_defaults_token() {
        assert_eq!(classify_token("-sync,rw"), Token::Defaults("sync,rw"));
        assert_eq!(classify_token("-"), Token::Defaults(""));
    }

    #[test]
    fn classify_bare_host() {
        assert_eq!(
            classify_token("@trusted"),
            Token::Host(HostToken {
                machine: "@trusted",
                options: None,
                unclosed: false,
            })
        );
    }

    #[test]
    fn parse_host_with_options() {
        let host = parse_host("pc001(rw,all_squash,anonuid=150)");
        assert_eq!(host.machine, "pc001");
        assert_eq!(host.options, Some("rw,all_squash,anonuid=150"));
        assert!(!host.unclosed);
    }

    #[test]
    fn parse_host_with_cidr_and_brackets() {
        assert_eq!(parse_host("2001:db8:9:e54::/64(rw)").machine, "2001:db8:9:e54::/64");
        assert_eq!(
            parse_host("buildhost[0-9].local.domain(rw)").machine,
            "buildhost[0-9].local.domain"
        );
    }

    #[test]
    fn parse_host_unclosed_options() {
        let host = parse_host("master(rw,sync");
        assert_eq!(host.machine, "master");
        assert_eq!(host.options, Some("rw,sync"));
        assert!(host.unclosed);
    }

    #[test]
    fn parse_host_empty_parens() {
        let host = parse_host("master()");
        assert_eq!(host.options, Some(""));
        assert!(!host.unclosed);
    }

    #[test]
    fn parse_option_list_flags_and_values() {
        let list = parse_option_list("rw,all_squash,anonuid=150,anongid=100");
        assert_eq!(
            list.options,
            vec![
                ExportOption::flag("rw"),
                ExportOption::flag("all_squash"),
                ExportOption::new("anonuid", "150"),
                ExportOption::new("anongid", "100"),
            ]
        );
        assert_eq!(list.empty_items, 0);
    }

    #[test]
    fn parse_option_list_splits_on_first_equals() {
        let list = parse_option_list("sec=krb5:krb5i=x");
        assert_eq!(list.options, vec![ExportOption::new("sec", "krb5:krb5i=x")]);
    }

    #[test]
    fn parse_option_list_keeps_duplicates() {
        let list = parse_option_list("ro,ro");
        assert_eq!(list.options.len(), 2);
    }

    #[test]
    fn parse_option_list_drops_empty_items() {
        let list = parse_option_list("rw,,=x,sync");
        assert_eq!(
            list.options,
            vec![ExportOption::flag("rw"), ExportOption::flag("sync")]
        );
        assert_eq!(list.empty_items, 2);
    }

    #[test]
    fn parse_option_list_empty_input() {
        let list = parse_option_list("");
        assert!(list.options.is_empty());
        assert_eq!(list.empty_items, 1);
    }
}
