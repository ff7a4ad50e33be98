use std::iter::Peekable;
use std::str::CharIndices;

/// A token of the field path grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    Period,
    OBracket,
    CBracket,
    /// An opening `"` that is never closed.
    DoubleQuote,
    /// An opening `` ` `` that is never closed.
    BackTick,
    Integer(&'a str),
    /// Raw identifier text, escapes unresolved.
    Identifier(&'a str),
    /// Raw quoted identifier text, delimiters included.
    QuotedIdentifier(&'a str),
    ErrorChar(char),
}

impl Token<'_> {
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Period => "'.'".to_owned(),
            Token::OBracket => "'['".to_owned(),
            Token::CBracket => "']'".to_owned(),
            Token::DoubleQuote => "'\"'".to_owned(),
            Token::BackTick => "'`'".to_owned(),
            Token::Integer(s) => format!("integer {s:?}"),
            Token::Identifier(s) => format!("identifier {s:?}"),
            Token::QuotedIdentifier(s) => format!("quoted identifier {s}"),
            Token::ErrorChar(c) => format!("{c:?}"),
        }
    }
}

/// A token and the byte offset it starts at.
pub(crate) type Spanned<'a> = (usize, Token<'a>);

/// Splits field path text into tokens. Spaces between tokens are dropped.
pub(crate) struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn skip_spaces(&mut self) {
        while self.chars.next_if(|&(_, c)| c == ' ').is_some() {}
    }

    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map_or(self.input.len(), |&(position, _)| position)
    }

    /// Scans up to and including the closing delimiter.
    fn quoted_identifier(&mut self, start: usize, delimiter: char) -> Spanned<'a> {
        while let Some((position, c)) = self.chars.next() {
            match c {
                c if c == delimiter => {
                    let end = position + c.len_utf8();
                    return (start, Token::QuotedIdentifier(&self.input[start..end]));
                }
                '\\' => {
                    // Whatever follows is checked when the escapes are resolved.
                    if self.chars.next().is_none() {
                        return (position, Token::ErrorChar(c));
                    }
                }
                c if is_control(c) => return (position, Token::ErrorChar(c)),
                _ => {}
            }
        }

        let unterminated = if delimiter == '`' {
            Token::BackTick
        } else {
            Token::DoubleQuote
        };
        (start, unterminated)
    }

    /// Scans a run of identifier characters, escapes and interior spaces.
    fn identifier(&mut self, start: usize) -> Spanned<'a> {
        let mut end = start;
        while let Some(&(position, c)) = self.chars.peek() {
            match c {
                '\\' => {
                    self.chars.next();
                    match self.chars.next() {
                        Some((escaped, e)) => end = escaped + e.len_utf8(),
                        None => return (position, Token::ErrorChar(c)),
                    }
                }
                ' ' => {
                    // Only part of the identifier if more identifier text follows.
                    self.chars.next();
                }
                c if is_identifier_char(c) => {
                    self.chars.next();
                    end = position + c.len_utf8();
                }
                _ => break,
            }
        }

        let text = &self.input[start..end];
        if text.bytes().all(|b| b.is_ascii_digit()) {
            (start, Token::Integer(text))
        } else {
            (start, Token::Identifier(text))
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Spanned<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_spaces();
        let start = self.offset();
        let &(_, c) = self.chars.peek()?;

        let token = match c {
            '.' => Token::Period,
            '[' => Token::OBracket,
            ']' => Token::CBracket,
            '"' | '`' => {
                self.chars.next();
                return Some(self.quoted_identifier(start, c));
            }
            '\\' => return Some(self.identifier(start)),
            c if is_identifier_char(c) => return Some(self.identifier(start)),
            c => Token::ErrorChar(c),
        };

        self.chars.next();
        Some((start, token))
    }
}

fn is_control(c: char) -> bool {
    c < ' '
}

fn is_identifier_char(c: char) -> bool {
    !matches!(c, '.' | '[' | ']' | '"' | '`' | '\\' | ' ') && !is_control(c)
}

#[cfg(test)]
mod test {
    use super::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        Lexer::new(input).map(|(_, token)| token).collect()
    }

    #[test]
    fn structural_tokens() {
        assert_eq!(
            tokens("a.b[3].c"),
            vec![
                Token::Identifier("a"),
                Token::Period,
                Token::Identifier("b"),
                Token::OBracket,
                Token::Integer("3"),
                Token::CBracket,
                Token::Period,
                Token::Identifier("c"),
            ]
        );
    }

    #[test]
    fn spaces() {
        assert_eq!(
            tokens("work phone . cell  phone"),
            vec![
                Token::Identifier("work phone"),
                Token::Period,
                Token::Identifier("cell  phone"),
            ]
        );
        assert_eq!(
            tokens("a[ ]"),
            vec![Token::Identifier("a"), Token::OBracket, Token::CBracket]
        );
        assert_eq!(
            tokens("[ 12 ]"),
            vec![Token::OBracket, Token::Integer("12"), Token::CBracket]
        );
        assert_eq!(tokens("1 2"), vec![Token::Identifier("1 2")]);
    }

    #[test]
    fn integers_and_identifiers() {
        assert_eq!(
            tokens("1.23.4a"),
            vec![
                Token::Integer("1"),
                Token::Period,
                Token::Integer("23"),
                Token::Period,
                Token::Identifier("4a"),
            ]
        );
        assert_eq!(tokens("-1"), vec![Token::Identifier("-1")]);
    }

    #[test]
    fn escapes_stay_in_identifiers() {
        assert_eq!(tokens(r"a\.b\[4\]"), vec![Token::Identifier(r"a\.b\[4\]")]);
        assert_eq!(tokens(r"\`"), vec![Token::Identifier(r"\`")]);
        assert_eq!(tokens(r"c4 \`p"), vec![Token::Identifier(r"c4 \`p")]);
    }

    #[test]
    fn quoted_identifiers() {
        assert_eq!(
            tokens(r#""a.b"[].c"#),
            vec![
                Token::QuotedIdentifier(r#""a.b""#),
                Token::OBracket,
                Token::CBracket,
                Token::Period,
                Token::Identifier("c"),
            ]
        );
        assert_eq!(
            tokens(r#"`a\"`.`b\``"#),
            vec![
                Token::QuotedIdentifier(r#"`a\"`"#),
                Token::Period,
                Token::QuotedIdentifier(r"`b\``"),
            ]
        );
        assert_eq!(tokens("`a\"b`"), vec![Token::QuotedIdentifier("`a\"b`")]);
    }

    #[test]
    fn errors() {
        assert_eq!(tokens("\""), vec![Token::DoubleQuote]);
        assert_eq!(tokens("`abc"), vec![Token::BackTick]);
        assert_eq!(tokens("\\"), vec![Token::ErrorChar('\\')]);
        assert_eq!(tokens("\t"), vec![Token::ErrorChar('\t')]);
        assert_eq!(tokens("\"\n\""), vec![Token::ErrorChar('\n'), Token::DoubleQuote]);
    }

    #[test]
    fn positions() {
        let positions = Lexer::new("ab . [7]")
            .map(|(position, _)| position)
            .collect::<Vec<_>>();
        assert_eq!(positions, vec![0, 3, 5, 6, 7]);
    }
}
