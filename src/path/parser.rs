//! Recursive descent over the field path grammar:
//!
//! ```text
//! parse          := field_segment EOF
//! field_segment  := name_segment
//! name_segment   := (QuotedIdentifier | Identifier | Integer) continuation?
//! index_segment  := '[' Integer? ']' continuation?
//! continuation   := '.' field_segment | index_segment
//! ```
//!
//! The grammar is right-recursive, so every production ends in a tail call to the next one.
//! Productions are collected in order and linked bottom-up once the input is exhausted, which
//! keeps the stack flat no matter how long the path is.

use std::iter::Peekable;

use super::escape;
use super::lexer::{Lexer, Spanned, Token};
use super::segment::{self, Detached};
use super::{FieldPathError, IndexSegment, NameSegment, SyntaxErrorKind};

/// Where a production continues.
enum Continuation {
    Name,
    Index,
    End,
}

pub(crate) struct Parser<'a> {
    path: &'a str,
    tokens: Peekable<Lexer<'a>>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(path: &'a str) -> Self {
        Self {
            path,
            tokens: Lexer::new(path).peekable(),
        }
    }

    /// Parses the whole input into a root segment.
    pub(crate) fn parse(mut self) -> Result<NameSegment, FieldPathError> {
        let (name, quoted) = self.name_segment()?;

        let mut parts = Vec::new();
        let mut next = self.continuation()?;
        loop {
            match next {
                Continuation::Name => {
                    let (name, quoted) = self.name_segment()?;
                    parts.push(Detached::Name { name, quoted });
                }
                Continuation::Index => parts.push(Detached::Index(self.index_segment()?)),
                Continuation::End => break,
            }
            next = self.continuation()?;
        }

        Ok(NameSegment::new(name, quoted, segment::link(parts, None)))
    }

    fn name_segment(&mut self) -> Result<(String, bool), FieldPathError> {
        match self.tokens.next() {
            Some((position, Token::QuotedIdentifier(raw))) => {
                // The interior starts after the one byte delimiter.
                let name = escape::unquote(raw)
                    .map_err(|error| self.escape_error(position + 1, error))?;
                Ok((name, true))
            }
            Some((position, Token::Identifier(raw))) => {
                let name =
                    escape::unescape(raw).map_err(|error| self.escape_error(position, error))?;
                Ok((name, false))
            }
            Some((_, Token::Integer(digits))) => Ok((digits.to_owned(), false)),
            Some(spanned) => Err(self.unexpected(spanned, "a field name")),
            None => Err(self.unexpected_end("a field name")),
        }
    }

    fn index_segment(&mut self) -> Result<isize, FieldPathError> {
        match self.tokens.next() {
            Some((_, Token::OBracket)) => {}
            Some(spanned) => return Err(self.unexpected(spanned, "'['")),
            None => return Err(self.unexpected_end("'['")),
        }

        let index = match self.tokens.next() {
            Some((_, Token::CBracket)) => return Ok(IndexSegment::UNBOUND),
            Some((position, Token::Integer(digits))) => digits
                .parse::<isize>()
                .map_err(|_| self.syntax_error(position, SyntaxErrorKind::IndexOverflow))?,
            Some(spanned) => return Err(self.unexpected(spanned, "an array index or ']'")),
            None => return Err(self.unexpected_end("an array index or ']'")),
        };

        match self.tokens.next() {
            Some((_, Token::CBracket)) => Ok(index),
            Some(spanned) => Err(self.unexpected(spanned, "']'")),
            None => Err(self.unexpected_end("']'")),
        }
    }

    fn continuation(&mut self) -> Result<Continuation, FieldPathError> {
        match self.tokens.peek().copied() {
            None => Ok(Continuation::End),
            Some((_, Token::Period)) => {
                self.tokens.next();
                Ok(Continuation::Name)
            }
            Some((_, Token::OBracket)) => Ok(Continuation::Index),
            Some(spanned) => Err(self.unexpected(spanned, "'.', '[' or the end of the path")),
        }
    }

    fn unexpected(&self, (position, token): Spanned<'_>, expected: &'static str) -> FieldPathError {
        let kind = match token {
            Token::ErrorChar('\\') => SyntaxErrorKind::IllegalEscape,
            Token::ErrorChar(c) => SyntaxErrorKind::IllegalChar(c),
            Token::DoubleQuote => SyntaxErrorKind::UnterminatedQuote('"'),
            Token::BackTick => SyntaxErrorKind::UnterminatedQuote('`'),
            token => SyntaxErrorKind::UnexpectedToken {
                found: token.describe(),
                expected,
            },
        };
        self.syntax_error(position, kind)
    }

    fn unexpected_end(&self, expected: &'static str) -> FieldPathError {
        self.syntax_error(self.path.len(), SyntaxErrorKind::UnexpectedEnd { expected })
    }

    fn escape_error(&self, offset: usize, error: FieldPathError) -> FieldPathError {
        let position = match error {
            FieldPathError::InvalidEscape { position, .. } => offset + position,
            _ => offset,
        };
        self.syntax_error(position, SyntaxErrorKind::IllegalEscape)
    }

    fn syntax_error(&self, position: usize, kind: SyntaxErrorKind) -> FieldPathError {
        FieldPathError::InvalidPathSyntax {
            path: self.path.to_owned(),
            position,
            kind,
        }
    }
}
