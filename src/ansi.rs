//! ANSI escape sequence tokenizer
//!
//! Splits an output stream into literal text and CSI control sequences.
//! Tokens borrow from the input, so a frame can be scanned without
//! allocating per token.

use std::borrow::Cow;
use std::iter::FusedIterator;
use std::sync::OnceLock;

use regex::{Matches, Regex};
use unicode_width::UnicodeWidthStr;

/// Source of the default escape pattern: `ESC [ <digits or ;>* <letter>`
pub const PATTERN_SOURCE: &str = r"\x1b\[[0-9;]*[A-Za-z]";

static PATTERN: OnceLock<Regex> = OnceLock::new();

/// The default CSI escape pattern, compiled once per process.
pub fn pattern() -> &'static Regex {
    PATTERN.get_or_init(|| Regex::new(PATTERN_SOURCE).expect("PATTERN_SOURCE is a valid regex"))
}

/// A non-empty slice of the input, classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token<'a> {
    /// Printable content between escape sequences
    Literal(&'a str),
    /// One complete control sequence
    Escape(&'a str),
}

impl<'a> Token<'a> {
    pub fn as_str(&self) -> &'a str {
        match *self {
            Token::Literal(s) | Token::Escape(s) => s,
        }
    }

    pub fn is_escape(&self) -> bool {
        matches!(self, Token::Escape(_))
    }

    /// Display width in terminal columns (escapes occupy none)
    pub fn width(&self) -> usize {
        match self {
            Token::Literal(s) => s.width(),
            Token::Escape(_) => 0,
        }
    }

    /// Parameter string of an SGR sequence (`ESC [ <params> m`)
    ///
    /// Returns `None` for literals and for any other escape.
    pub fn sgr_params(&self) -> Option<&'a str> {
        match *self {
            Token::Escape(s) => s.strip_prefix("\x1b[")?.strip_suffix('m'),
            Token::Literal(_) => None,
        }
    }
}

impl AsRef<str> for Token<'_> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Lazy token stream returned by [`split`]
///
/// Not restartable: call [`split`] again for another pass.
pub struct Split<'r, 't> {
    matches: Matches<'r, 't>,
    text: &'t str,
    /// Start of the text not yet yielded
    start: usize,
    include_separators: bool,
    /// Escape held back while the literal before it is yielded
    pending: Option<Token<'t>>,
    done: bool,
}

/// Split `text` into tokens separated by matches of `pattern`.
///
/// Yields the text before each match as a [`Token::Literal`], then the match
/// itself as a [`Token::Escape`] if `include_separators` is set, and finally
/// any trailing text. Empty tokens are never produced, and text that only
/// looks like the start of an escape is treated as literal.
pub fn split<'r, 't>(pattern: &'r Regex, text: &'t str, include_separators: bool) -> Split<'r, 't> {
    Split {
        matches: pattern.find_iter(text),
        text,
        start: 0,
        include_separators,
        pending: None,
        done: false,
    }
}

impl<'r, 't> Iterator for Split<'r, 't> {
    type Item = Token<'t>;

    fn next(&mut self) -> Option<Token<'t>> {
        if let Some(token) = self.pending.take() {
            return Some(token);
        }

        while !self.done {
            let Some(m) = self.matches.next() else {
                self.done = true;
                let rest = &self.text[self.start..];
                self.start = self.text.len();
                return (!rest.is_empty()).then_some(Token::Literal(rest));
            };

            let literal = &self.text[self.start..m.start()];
            self.start = m.end();

            let separator = (self.include_separators && !m.as_str().is_empty())
                .then(|| Token::Escape(m.as_str()));

            if !literal.is_empty() {
                self.pending = separator;
                return Some(Token::Literal(literal));
            }
            if separator.is_some() {
                return separator;
            }
        }

        None
    }
}

impl FusedIterator for Split<'_, '_> {}

/// Tokenize with the default pattern, keeping escape sequences
pub fn tokens(text: &str) -> Split<'static, '_> {
    split(pattern(), text, true)
}

/// Remove every escape sequence from `text`
///
/// Borrows the input when there is nothing to strip.
pub fn strip(text: &str) -> Cow<'_, str> {
    if !pattern().is_match(text) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(split(pattern(), text, false).map(|t| t.as_str()).collect())
}

/// Display width of the literal content of `text`
pub fn display_width(text: &str) -> usize {
    split(pattern(), text, false).map(|t| t.width()).sum()
}
