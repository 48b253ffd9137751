////////////////////////////////////////////////////////////////////////////////
// Scoria parser combinator library
////////////////////////////////////////////////////////////////////////////////
// Copyright 2022 Skylor R. Schermer
// This code is dual licenced using the MIT or Apache 2 license.
// See licence-mit.md and licence-apache.md for details.
////////////////////////////////////////////////////////////////////////////////
//! Primitive parsers.
////////////////////////////////////////////////////////////////////////////////

// Local imports.
use crate::combinator::many_1;
use crate::combinator::optional;
use crate::label::label_call;
use crate::label::LabelRepr;
use crate::parser::Parser;
use crate::result::Failure;

// External library imports.
use regex::Regex;


////////////////////////////////////////////////////////////////////////////////
// Char parsing.
////////////////////////////////////////////////////////////////////////////////

/// Returns a parser which parses the specified `char`.
pub fn char(c: char) -> Parser<char> {
    let label = label_call("char", [c.label_repr()]);
    let expected = label.clone();
    Parser::new(label, move |ctx| {
        match ctx.peek_char() {
            Some(u) if u == c => {
                let _ = ctx.next_char();
                Ok(u)
            },
            _ => Err(Failure::new(ctx.pos(), expected.clone())),
        }
    })
}

/// Returns a parser which parses any single `char` in the given string.
pub fn char_in(opts: &str) -> Parser<char> {
    let label = label_call("char_in", [opts.label_repr()]);
    let expected = label.clone();
    let opts = opts.to_owned();
    Parser::new(label, move |ctx| {
        match ctx.peek_char() {
            Some(u) if opts.contains(u) => {
                let _ = ctx.next_char();
                Ok(u)
            },
            _ => Err(Failure::new(ctx.pos(), expected.clone())),
        }
    })
}

/// Returns a parser which parses a `char` if it satisfies the given
/// predicate. The description names the predicate in the parser's label.
pub fn char_matching<F>(f: F, description: &str) -> Parser<char>
    where F: Fn(char) -> bool + 'static
{
    let label = label_call("char_matching", [description]);
    let expected = label.clone();
    Parser::new(label, move |ctx| {
        match ctx.peek_char() {
            Some(u) if (f)(u) => {
                let _ = ctx.next_char();
                Ok(u)
            },
            _ => Err(Failure::new(ctx.pos(), expected.clone())),
        }
    })
}

/// Returns a parser which parses any single `char`, failing only at the end
/// of the input.
pub fn any_char() -> Parser<char> {
    Parser::new("any_char", move |ctx| {
        let at = ctx.pos();
        ctx.next_char().ok_or_else(|| Failure::new(at, "any_char"))
    })
}

/// Returns a parser which succeeds with the unit value iff the input is at
/// its end, consuming nothing.
pub fn eof() -> Parser<()> {
    Parser::new("eof", move |ctx| {
        if ctx.at_end() {
            Ok(())
        } else {
            Err(Failure::new(ctx.pos(), "eof"))
        }
    })
}

/// Returns a parser which succeeds with the given value, consuming nothing.
pub fn pure<V>(value: V) -> Parser<V>
    where V: Clone + 'static
{
    Parser::new("pure", move |_ctx| Ok(value.clone()))
}

/// Returns a parser which always fails, consuming nothing.
pub fn unparseable<V: 'static>() -> Parser<V> {
    Parser::new("unparseable", move |ctx| {
        Err(Failure::new(ctx.pos(), "unparseable"))
    })
}


////////////////////////////////////////////////////////////////////////////////
// String parsing.
////////////////////////////////////////////////////////////////////////////////

/// Returns a parser which parses the given text literal.
///
/// The literal is matched unit-by-unit, so a failure at the first unit
/// consumed nothing and backtracks cleanly in an alternation, while a
/// partially matched literal commits its branch.
pub fn literal(expect: &str) -> Parser<String> {
    let label = label_call("literal", [expect.label_repr()]);
    let expected = label.clone();
    let expect = expect.to_owned();
    Parser::new(label, move |ctx| {
        let mut token = String::with_capacity(expect.len());
        for c in expect.chars() {
            match ctx.peek_char() {
                Some(u) if u == c => {
                    let _ = ctx.next_char();
                    token.push(u);
                },
                _ => return Err(Failure::new(ctx.pos(), expected.clone())),
            }
        }
        Ok(token)
    })
}

/// Returns a parser which parses the given text literal, ignoring ASCII
/// case. The parsed value is the input text as written.
pub fn literal_ignore_ascii_case(expect: &str) -> Parser<String> {
    let label = label_call("literal_ignore_ascii_case",
        [expect.label_repr()]);
    let expected = label.clone();
    let expect = expect.to_owned();
    Parser::new(label, move |ctx| {
        let mut token = String::with_capacity(expect.len());
        for c in expect.chars() {
            match ctx.peek_char() {
                Some(u) if u.eq_ignore_ascii_case(&c) => {
                    let _ = ctx.next_char();
                    token.push(u);
                },
                _ => return Err(Failure::new(ctx.pos(), expected.clone())),
            }
        }
        Ok(token)
    })
}

/// Returns a parser which parses zero or more whitespace `char`s (space,
/// tab, line feed, carriage return). Never fails.
pub fn whitespace() -> Parser<String> {
    Parser::new("whitespace", move |ctx| {
        let mut token = String::new();
        while let Some(c) = ctx.peek_char() {
            if c == ' ' || c == '\t' || c == '\n' || c == '\r' {
                let _ = ctx.next_char();
                token.push(c);
            } else {
                break;
            }
        }
        Ok(token)
    })
}

/// Returns a parser which parses one or more whitespace `char`s.
pub fn whitespace_1() -> Parser<String> {
    Parser::new("whitespace_1", move |ctx| {
        let mut token = String::new();
        while let Some(c) = ctx.peek_char() {
            if c == ' ' || c == '\t' || c == '\n' || c == '\r' {
                let _ = ctx.next_char();
                token.push(c);
            } else {
                break;
            }
        }
        if token.is_empty() {
            Err(Failure::new(ctx.pos(), "whitespace_1"))
        } else {
            Ok(token)
        }
    })
}

/// Returns a parser which matches the given pattern against the input at
/// the current position, consuming the matched length.
///
/// The pattern is anchored at the cursor. An invalid pattern is a grammar
/// construction error and panics here, never at parse time.
pub fn regex(pattern: &str) -> Parser<String> {
    let label = label_call("regex", [pattern.label_repr()]);
    let expected = label.clone();
    let anchored = format!(r"\A(?:{})", pattern);
    let compiled = match Regex::new(&anchored) {
        Ok(compiled) => compiled,
        Err(e) => panic!("invalid regex pattern {:?}: {}", pattern, e),
    };
    Parser::new(label, move |ctx| {
        let entry = ctx.pos();
        let rest = ctx.read_all();
        match compiled.find(&rest) {
            Some(m) => {
                let token = m.as_str().to_owned();
                let len = token.chars().count();
                ctx.source.restore_to(entry + len);
                Ok(token)
            },
            None => Err(Failure::new(entry, expected.clone())),
        }
    })
}


////////////////////////////////////////////////////////////////////////////////
// CasePolicy
////////////////////////////////////////////////////////////////////////////////
/// The accepted letter case for hexadecimal digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasePolicy {
    /// Accept uppercase letter digits only.
    Upper,
    /// Accept lowercase letter digits only.
    Lower,
    /// Accept either case.
    Mixed,
}

impl LabelRepr for CasePolicy {
    fn label_repr(&self) -> String {
        format!("{:?}", self)
    }
}


////////////////////////////////////////////////////////////////////////////////
// Number parsing.
////////////////////////////////////////////////////////////////////////////////

/// Returns a parser which parses a decimal digit.
pub fn decimal_digit() -> Parser<char> {
    Parser::new("decimal_digit", move |ctx| {
        match ctx.peek_char() {
            Some(u) if u.is_ascii_digit() => {
                let _ = ctx.next_char();
                Ok(u)
            },
            _ => Err(Failure::new(ctx.pos(), "decimal_digit")),
        }
    })
}

/// Returns a parser which parses a hexadecimal digit under the given case
/// policy.
pub fn hex_digit(policy: CasePolicy) -> Parser<char> {
    let label = label_call("hex_digit", [policy.label_repr()]);
    let expected = label.clone();
    Parser::new(label, move |ctx| {
        let accept = |u: char| u.is_ascii_digit() || match policy {
            CasePolicy::Upper => ('A'..='F').contains(&u),
            CasePolicy::Lower => ('a'..='f').contains(&u),
            CasePolicy::Mixed => u.is_ascii_hexdigit(),
        };
        match ctx.peek_char() {
            Some(u) if accept(u) => {
                let _ = ctx.next_char();
                Ok(u)
            },
            _ => Err(Failure::new(ctx.pos(), expected.clone())),
        }
    })
}

/// Returns a parser which parses one or more decimal digits as an unsigned
/// integer value.
pub fn decimal() -> Parser<u64> {
    Parser::new("decimal", move |ctx| {
        let entry = ctx.pos();
        let mut value: u64 = 0;
        let mut any = false;
        while let Some(u) = ctx.peek_char() {
            let digit = match u.to_digit(10) {
                Some(digit) => u64::from(digit),
                None => break,
            };
            let _ = ctx.next_char();
            any = true;
            value = value.checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(|| Failure::new(entry, "decimal value in range"))?;
        }
        if any {
            Ok(value)
        } else {
            Err(Failure::new(ctx.pos(), "decimal"))
        }
    })
}

/// Returns a parser which parses a signed decimal fraction with an optional
/// exponent, as a real value.
///
/// The accepted grammar is `sign? decimal ('.' decimal)? ([eE] sign?
/// decimal)?`. The value is the whole part plus the fractional digits over
/// `10^k`, negated under a leading `-`, then scaled by `10^(±e)` when an
/// exponent is present.
pub fn decimal_fraction() -> Parser<f64> {
    let p_sign = optional(char_in("+-"));
    let p_whole = decimal();
    let p_frac = optional(char('.') >> many_1(decimal_digit()));
    let p_exp = optional(char_in("eE") >> optional(char_in("+-"))
        .bind(|sign| decimal().map(move |e| {
            let e = e as i32;
            if sign == Some('-') { -e } else { e }
        })));

    Parser::new("decimal_fraction", move |ctx| {
        let sign = p_sign.run(ctx)?;
        let whole = p_whole.run(ctx)?;
        let mut value = whole as f64;

        if let Some(digits) = p_frac.run(ctx)? {
            let mut frac = 0.0_f64;
            for d in &digits {
                frac = frac * 10.0 + f64::from(d.to_digit(10).unwrap_or(0));
            }
            value += frac / 10.0_f64.powi(digits.len() as i32);
        }

        if sign == Some('-') {
            value = -value;
        }

        if let Some(e) = p_exp.run(ctx)? {
            value *= 10.0_f64.powi(e);
        }

        Ok(value)
    })
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn literal_matches_exactly() {
        assert_eq!(literal("foo").parse("foo").ok(),
            Some(String::from("foo")));
        assert!(literal("foo").parse("bar").is_err());
        assert!(literal("foo").parse("fo").is_err());
    }

    #[test]
    fn literal_ignores_ascii_case() {
        assert_eq!(literal_ignore_ascii_case("abc").parse("aBc").ok(),
            Some(String::from("aBc")));
    }

    #[test]
    fn char_parsers() {
        assert_eq!(char('x').parse("xy").ok(), Some('x'));
        assert!(char('x').parse("yx").is_err());

        assert_eq!(char_in("+-").parse("-3").ok(), Some('-'));
        assert!(char_in("+-").parse("3").is_err());

        assert_eq!(
            char_matching(|c| c.is_alphabetic(), "char::is_alphabetic")
                .parse("q")
                .ok(),
            Some('q'));
    }

    #[test]
    fn any_char_fails_at_end() {
        assert_eq!(any_char().parse("x").ok(), Some('x'));
        assert!(any_char().parse("").is_err());
    }

    #[test]
    fn eof_only_at_end() {
        assert_eq!(eof().parse("").ok(), Some(()));
        assert!(eof().parse("x").is_err());
    }

    #[test]
    fn whitespace_never_fails() {
        assert_eq!(whitespace().parse("  \t\r\nx").ok(),
            Some(String::from("  \t\r\n")));
        assert_eq!((whitespace() << any_char()).parse("x").ok(),
            Some(String::new()));
        assert!(whitespace_1().parse("x").is_err());
    }

    #[test]
    fn decimal_consumes_digits_only() {
        let p = decimal();
        assert_eq!(p.parse("123").ok(), Some(123));
        assert!(p.parse("-123").is_err());
    }

    #[test]
    fn hex_digit_case_policies() {
        assert_eq!(hex_digit(CasePolicy::Upper).parse("F").ok(), Some('F'));
        assert!(hex_digit(CasePolicy::Upper).parse("f").is_err());
        assert_eq!(hex_digit(CasePolicy::Lower).parse("f").ok(), Some('f'));
        assert_eq!(hex_digit(CasePolicy::Mixed).parse("f").ok(), Some('f'));
        assert_eq!(hex_digit(CasePolicy::Mixed).parse("7").ok(), Some('7'));
    }

    #[test]
    fn decimal_fraction_value() {
        let p = decimal_fraction();
        assert_eq!(p.parse("123").ok(), Some(123.0));
        assert_eq!(p.parse("-12.25").ok(), Some(-12.25));
        assert_eq!(p.parse("1.5e2").ok(), Some(150.0));
        assert_eq!(p.parse("25e-1").ok(), Some(2.5));
        assert_eq!(p.parse("+0.125").ok(), Some(0.125));
    }

    #[test]
    fn regex_consumes_matched_length() {
        let p = regex("[a-z]+") << literal("123");
        assert_eq!(p.parse("abc123").ok(), Some(String::from("abc")));
        assert!(regex("[a-z]+").parse("123").is_err());
    }

    #[test]
    fn regex_is_anchored() {
        assert!(regex("[0-9]+").parse("ab12").is_err());
    }

    #[test]
    fn primitive_labels() {
        assert_eq!(literal("foo").label(), r#"literal("foo")"#);
        assert_eq!(char_in("+-").label(), r#"char_in("+-")"#);
        assert_eq!(hex_digit(CasePolicy::Upper).label(), "hex_digit(Upper)");
        assert_eq!(regex("[a-z]+").label(), r#"regex("[a-z]+")"#);
    }
}
