#![deny(warnings)]

//! This module contains all of the logic for field paths.
//!
//! A field path points at a value inside a nested document, the same way a file path points at
//! a file inside a directory tree. Name segments step into a map, index segments step into an
//! array.
//!
//! # Example
//! Below is a sample document. Different values can be reached with paths.
//! ```json
//! {
//!   "a": {
//!       "b": [10, {"c": true}]
//!    },
//!    "work phone": "555",
//!    "x.y": 1
//! }
//! ```
//!
//! | path       | value it points to           |
//! |------------|------------------------------|
//! | `a.b[1].c` | `true`
//! | `a.b[0]`   | `10`
//! | `a.b[]`    | every element of `a.b`
//! | `work phone` | `"555"`
//! | `"x.y"` or `x\.y` | `1`
//!
//! # Syntax
//! Names are written bare or quoted with `"` or `` ` ``. A bare name may contain spaces between
//! its characters, but `.`, `[`, `]`, quotes and backslashes must be escaped with `\`. Quoted
//! names only need their quotes and backslashes escaped. `\b`, `\f`, `\n`, `\r`, `\t` and
//! `\uXXXX` work in both forms. `[]` is an index segment without an index.
//!
//! # Identity
//! [`FieldPath`] values are compared, ordered and hashed by their segments: quoting is ignored
//! and names compare case-insensitively, so `A."b"` and `a.b` are the same path. Every path
//! that is equal to the empty path parses to one shared instance, see [`FieldPath::empty`].
//!
//! # Macros
//! [`field_path!`](crate::field_path) builds a path from its elements. <strong>The macro does not
//! parse</strong>: every string becomes a single name segment exactly as given. Use
//! [parse_field_path] if the path needs to be parsed.

use std::fmt::{self, Display, Formatter};

use snafu::Snafu;

pub use field_path::{FieldPath, PathElement};
pub use iter::SegmentIter;
pub use segment::{IndexSegment, NameSegment, Segment, SegmentType};

mod escape;
mod field_path;
mod iter;
mod lexer;
mod parser;
mod segment;

#[derive(Clone, Debug, Eq, PartialEq, Snafu)]
pub enum FieldPathError {
    #[snafu(display("Invalid field path {:?} at position {}: {}", path, position, kind))]
    InvalidPathSyntax {
        path: String,
        position: usize,
        kind: SyntaxErrorKind,
    },

    #[snafu(display("Illegal escape sequence in {:?} at position {}", raw, position))]
    InvalidEscape { raw: String, position: usize },

    #[snafu(display("{:?} is not a quoted identifier", raw))]
    InvalidQuoting { raw: String },

    #[snafu(display("Invalid array index {}, must be -1 or greater", index))]
    InvalidIndex { index: isize },
}

/// What went wrong at the reported position of an [`FieldPathError::InvalidPathSyntax`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SyntaxErrorKind {
    IllegalChar(char),
    IllegalEscape,
    UnterminatedQuote(char),
    UnexpectedToken {
        found: String,
        expected: &'static str,
    },
    UnexpectedEnd {
        expected: &'static str,
    },
    /// The array index doesn't fit in an `isize`.
    IndexOverflow,
}

impl Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxErrorKind::IllegalChar(c) => write!(f, "illegal character {c:?}"),
            SyntaxErrorKind::IllegalEscape => f.write_str("illegal escape sequence"),
            SyntaxErrorKind::UnterminatedQuote(quote) => {
                write!(f, "unterminated quote, expected a closing {quote}")
            }
            SyntaxErrorKind::UnexpectedToken { found, expected } => {
                write!(f, "unexpected {found}, expected {expected}")
            }
            SyntaxErrorKind::UnexpectedEnd { expected } => {
                write!(f, "unexpected end of path, expected {expected}")
            }
            SyntaxErrorKind::IndexOverflow => f.write_str("array index is too large"),
        }
    }
}

/// How name segments are quoted when a path is written out.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(any(test, feature = "proptest"), derive(proptest_derive::Arbitrary))]
pub enum QuoteMode {
    /// Names are quoted only if they were quoted when parsed or built.
    #[default]
    Natural,
    /// Every name is quoted. The output always parses back to an equal path.
    Quoted,
    /// The natural form as a JSON string literal.
    Json,
}

/// Use if you want to pre-parse paths so it can be used multiple times.
/// The return value (when borrowed) implements `IntoIterator<Item = &Segment>`.
pub fn parse_field_path(path: &str) -> Result<FieldPath, FieldPathError> {
    FieldPath::parse_from(path)
}

pub fn serialize_field_path(path: &FieldPath, mode: QuoteMode) -> String {
    match mode {
        QuoteMode::Natural => path.as_path_str(false),
        QuoteMode::Quoted => path.as_path_str(true),
        QuoteMode::Json => path.as_json_str(),
    }
}

/// Builds a [`FieldPath`] from a root name followed by fields (`&str`), indexes (`usize`) or
/// [`PathElement`]s. Nothing is parsed.
#[macro_export]
macro_rules! field_path {
    ($root:expr $(, $element:expr)* $(,)?) => {
        $crate::FieldPath::from_elements(
            $root,
            [$($crate::PathElement::from($element)),*],
        )
    };
}
