//! Backslash escaping and quote handling for name segments.

use super::FieldPathError;

/// Characters that may delimit a quoted identifier.
pub(crate) const QUOTE_CHARS: [char; 2] = ['"', '`'];

/// Resolves the backslash escapes in `raw`.
///
/// Supported escapes are `\"`, `` \` ``, `\\`, `\/`, `\.`, `\[`, `\]`, the control codes
/// `\b`, `\f`, `\n`, `\r`, `\t` and `\uXXXX`. A high surrogate written as `\uXXXX` must be
/// followed by the matching low surrogate, and the pair decodes to a single character.
pub(crate) fn unescape(raw: &str) -> Result<String, FieldPathError> {
    // Fast path, nothing to resolve.
    if !raw.contains('\\') {
        return Ok(raw.to_owned());
    }

    let mut output = String::with_capacity(raw.len());
    let mut chars = raw.char_indices();

    while let Some((position, c)) = chars.next() {
        if c != '\\' {
            output.push(c);
            continue;
        }

        let invalid = || FieldPathError::InvalidEscape {
            raw: raw.to_owned(),
            position,
        };

        let decoded = match chars.next().ok_or_else(invalid)?.1 {
            c @ ('"' | '`' | '\\' | '/' | '.' | '[' | ']') => c,
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => {
                let unit = hex_unit(&mut chars).ok_or_else(invalid)?;
                match unit {
                    0xD800..=0xDBFF => {
                        // The low half must follow immediately as another `\u` escape.
                        let low = match (chars.next(), chars.next()) {
                            (Some((_, '\\')), Some((_, 'u'))) => {
                                hex_unit(&mut chars).ok_or_else(invalid)?
                            }
                            _ => return Err(invalid()),
                        };
                        if !(0xDC00..=0xDFFF).contains(&low) {
                            return Err(invalid());
                        }
                        let code = 0x10000 + ((u32::from(unit) - 0xD800) << 10)
                            + (u32::from(low) - 0xDC00);
                        char::from_u32(code).ok_or_else(invalid)?
                    }
                    0xDC00..=0xDFFF => return Err(invalid()),
                    unit => char::from_u32(u32::from(unit)).ok_or_else(invalid)?,
                }
            }
            _ => return Err(invalid()),
        };

        output.push(decoded);
    }

    Ok(output)
}

/// Reads exactly four hex digits.
fn hex_unit(chars: &mut std::str::CharIndices<'_>) -> Option<u16> {
    let mut unit = 0u16;
    for _ in 0..4 {
        let digit = chars.next()?.1.to_digit(16)?;
        unit = (unit << 4) | digit as u16;
    }
    Some(unit)
}

/// Strips the matching quote delimiters from `raw` and resolves escapes in what is left.
pub(crate) fn unquote(raw: &str) -> Result<String, FieldPathError> {
    let invalid = || FieldPathError::InvalidQuoting {
        raw: raw.to_owned(),
    };

    let mut chars = raw.chars();
    let (first, last) = match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(invalid()),
    };
    if first != last || !QUOTE_CHARS.contains(&first) {
        return Err(invalid());
    }

    unescape(chars.as_str())
}

/// Whether `raw` looks like a quoted identifier: at least two characters, opened and closed by
/// the same quote character.
pub(crate) fn is_quoted(raw: &str) -> bool {
    let mut chars = raw.chars();
    matches!(
        (chars.next(), chars.next_back()),
        (Some(first), Some(last)) if first == last && QUOTE_CHARS.contains(&first)
    )
}

/// Writes `name` with every character that can't appear literally escaped.
///
/// `.`, `[` and `]` are only escaped when `structural` is set, which is the case for names
/// written without quotes.
pub(crate) fn write_escaped(output: &mut String, name: &str, structural: bool) {
    output.reserve(name.len());
    for c in name.chars() {
        match c {
            '"' | '`' | '\\' => {
                output.push('\\');
                output.push(c);
            }
            '\u{8}' => output.push_str("\\b"),
            '\u{c}' => output.push_str("\\f"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            '.' | '[' | ']' if structural => {
                output.push('\\');
                output.push(c);
            }
            c if c < ' ' => {
                output.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => output.push(c),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unescape_special_and_control_chars() {
        let test_cases = [
            (r"plain", "plain"),
            (r#"a\"b"#, "a\"b"),
            (r"a\`b", "a`b"),
            (r"a\\b", "a\\b"),
            (r"a\/b", "a/b"),
            (r"a\.b\[4\]", "a.b[4]"),
            (r"\b\f\n\r\t", "\u{8}\u{c}\n\r\t"),
            (r"c4", "c4"),
            (r"étÉ", "étÉ"),
            (r"😀", "😀"),
            (r"\u00e9t\u00C9", "étÉ"),
            (r"\uD83D\uDE00", "😀"),
            (r"a\uD834\uDD1Eb", "a𝄞b"),
        ];

        for (raw, expected) in test_cases {
            assert_eq!(unescape(raw).as_deref(), Ok(expected), "raw: {raw}");
        }
    }

    #[test]
    fn unescape_rejects_bad_sequences() {
        let test_cases = [
            (r"a\x", 1),
            (r"\", 0),
            (r"ab\u12", 2),
            (r"\u12G4", 0),
            (r"x\uD83D", 1),
            (r"\uD83DA", 0),
            (r"\uDE00", 0),
            (r"ok\ ", 2),
        ];

        for (raw, position) in test_cases {
            assert_eq!(
                unescape(raw),
                Err(FieldPathError::InvalidEscape {
                    raw: raw.to_owned(),
                    position,
                }),
                "raw: {raw}"
            );
        }
    }

    #[test]
    fn unquote_strips_delimiters() {
        assert_eq!(unquote(r#""a.b""#).as_deref(), Ok("a.b"));
        assert_eq!(unquote("`a.b`").as_deref(), Ok("a.b"));
        assert_eq!(unquote(r#""""#).as_deref(), Ok(""));
        assert_eq!(unquote(r#""the\"quick""#).as_deref(), Ok("the\"quick"));
    }

    #[test]
    fn unquote_rejects_malformed_quoting() {
        for raw in ["", "x", "\"", "ab", "\"a`", "`a\"", "a\"", "\"a"] {
            assert_eq!(
                unquote(raw),
                Err(FieldPathError::InvalidQuoting {
                    raw: raw.to_owned()
                }),
                "raw: {raw:?}"
            );
        }
    }

    #[test]
    fn unquote_reports_escape_errors() {
        assert!(matches!(
            unquote(r#""a\q""#),
            Err(FieldPathError::InvalidEscape { .. })
        ));
    }

    #[test]
    fn escapes_structural_chars_only_when_unquoted() {
        let mut unquoted = String::new();
        write_escaped(&mut unquoted, "a.b[4]", true);
        assert_eq!(unquoted, r"a\.b\[4\]");

        let mut quoted = String::new();
        write_escaped(&mut quoted, "a.b[4]", false);
        assert_eq!(quoted, "a.b[4]");
    }

    #[test]
    fn escapes_quotes_and_control_chars() {
        let mut output = String::new();
        write_escaped(&mut output, "\u{f}`\"\u{8}\u{c}\n\r\t\\//", false);
        assert_eq!(output, r#"\u000F\`\"\b\f\n\r\t\\//"#);
        assert_eq!(unescape(&output).as_deref(), Ok("\u{f}`\"\u{8}\u{c}\n\r\t\\//"));
    }

    #[test]
    fn detects_quoted_text() {
        assert!(is_quoted(r#""a""#));
        assert!(is_quoted("``"));
        assert!(!is_quoted("`"));
        assert!(!is_quoted(r#""a`"#));
        assert!(!is_quoted("a"));
    }
}
