//! Literal scanning shared by grammars built on [`Lexer`]
//!
//! Every reader returns `Ok(None)` without consuming anything when the current
//! character cannot start its literal, so grammars can try them in turn.

use crate::error::{Error, Result};
use crate::lexer::{CharSource, Lexer};

/// Read a numeric literal.
///
/// Accepts digits, one leading sign, one decimal dot and, when
/// `allow_exponent` is set, an `e`/`E` exponent whose digits are read by a
/// nested call with exponents disabled.
pub fn parse_number<S: CharSource>(
    lexer: &mut Lexer<S>,
    allow_exponent: bool,
) -> Result<Option<f64>> {
    let start = lexer.position();
    let mut text = String::new();
    let mut seen_dot = false;

    while let Some(c) = lexer.peek() {
        match c {
            '0'..='9' => text.push(c),
            '+' | '-' if text.is_empty() => text.push(c),
            '.' => {
                if seen_dot {
                    return Err(Error::MultipleDots {
                        pos: lexer.position(),
                    });
                }
                seen_dot = true;
                text.push(c);
            }
            'e' | 'E' if allow_exponent => {
                if text.is_empty() {
                    return Err(Error::ExponentAtStart {
                        pos: lexer.position(),
                    });
                }
                lexer.pop();
                let mantissa = to_f64(&text, start)?;
                let exponent = parse_number(lexer, false)?.ok_or(Error::InvalidNumber {
                    pos: lexer.position(),
                })?;
                return Ok(Some(scale(mantissa, exponent)));
            }
            _ => break,
        }
        lexer.pop();
    }

    if text.is_empty() {
        return Ok(None);
    }
    to_f64(&text, start).map(Some)
}

fn to_f64(text: &str, pos: usize) -> Result<f64> {
    text.parse::<f64>()
        .map_err(|_| Error::InvalidNumber { pos })
}

fn scale(mantissa: f64, exponent: f64) -> f64 {
    // integral exponents go through powi so that 25e-1 is exactly 2.5
    if exponent.fract() != 0.0 || exponent.abs() > f64::from(i32::MAX) {
        return mantissa * 10f64.powf(exponent);
    }
    let power = 10f64.powi(exponent.abs() as i32);
    if exponent < 0.0 {
        mantissa / power
    } else {
        mantissa * power
    }
}

/// Read a quoted string literal.
///
/// Backslashes are kept verbatim together with the character that follows
/// them; no escape sequence is interpreted.
pub fn parse_string<S: CharSource>(lexer: &mut Lexer<S>) -> Result<Option<String>> {
    let quote = match lexer.peek() {
        Some(q @ ('\'' | '"')) => q,
        _ => return Ok(None),
    };
    let start = lexer.position();
    lexer.pop();

    let mut value = String::new();
    loop {
        match lexer.pop() {
            None => return Err(Error::UnfinishedString { pos: start }),
            Some(c) if c == quote => return Ok(Some(value)),
            Some('\\') => {
                value.push('\\');
                let Some(escaped) = lexer.pop() else {
                    return Err(Error::UnfinishedString { pos: start });
                };
                value.push(escaped);
            }
            Some(c) => value.push(c),
        }
    }
}

/// Read `true` or `false`.
pub fn parse_boolean<S: CharSource>(lexer: &mut Lexer<S>) -> Result<Option<bool>> {
    let (word, value) = match lexer.peek() {
        Some('t') => ("true", true),
        Some('f') => ("false", false),
        _ => return Ok(None),
    };

    for expected in word.chars() {
        match lexer.peek() {
            Some(c) if c == expected => {
                lexer.pop();
            }
            Some(_) => {
                return Err(Error::ExpectedChar {
                    expected,
                    pos: lexer.position(),
                })
            }
            None => {
                return Err(Error::UnexpectedEnd {
                    pos: lexer.position(),
                })
            }
        }
    }

    Ok(Some(value))
}

/// Read an identifier (`[A-Za-z_][A-Za-z0-9_]*`, Unicode letters allowed).
///
/// Returns an empty string when the current character cannot start one.
pub fn parse_identifier<S: CharSource>(lexer: &mut Lexer<S>) -> String {
    let mut ident = String::new();

    match lexer.peek() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return ident,
    }

    while let Some(c) = lexer.peek() {
        if c.is_alphanumeric() || c == '_' {
            ident.push(c);
            lexer.pop();
        } else {
            break;
        }
    }

    ident
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(input: &str) -> Result<Option<f64>> {
        parse_number(&mut Lexer::for_str(input), true)
    }

    #[test]
    fn test_number_stops_at_non_numeric() {
        let mut lexer = Lexer::for_str("42abc");
        assert_eq!(parse_number(&mut lexer, true).unwrap(), Some(42.0));
        assert_eq!(lexer.peek(), Some('a'));
    }

    #[test]
    fn test_sign_only_first() {
        let mut lexer = Lexer::for_str("-3+4");
        assert_eq!(parse_number(&mut lexer, true).unwrap(), Some(-3.0));
        assert_eq!(lexer.peek(), Some('+'));
    }

    #[test]
    fn test_exponent_disabled_leaves_marker() {
        let mut lexer = Lexer::for_str("5exam");
        assert_eq!(parse_number(&mut lexer, false).unwrap(), Some(5.0));
        assert_eq!(lexer.peek(), Some('e'));
    }

    #[test]
    fn test_negative_exponent() {
        assert_eq!(number("25e-1").unwrap(), Some(2.5));
    }

    #[test]
    fn test_lone_sign_is_invalid() {
        assert!(matches!(number("-"), Err(Error::InvalidNumber { pos: 0 })));
    }

    #[test]
    fn test_empty_exponent_is_invalid() {
        assert!(matches!(number("3e"), Err(Error::InvalidNumber { .. })));
    }

    #[test]
    fn test_identifier() {
        let mut lexer = Lexer::for_str("_SE1+x");
        assert_eq!(parse_identifier(&mut lexer), "_SE1");
        assert_eq!(lexer.peek(), Some('+'));

        let mut lexer = Lexer::for_str("1abc");
        assert_eq!(parse_identifier(&mut lexer), "");
        assert_eq!(lexer.position(), 0);
    }
}
