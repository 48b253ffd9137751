////////////////////////////////////////////////////////////////////////////////
// Scoria parser combinator library
////////////////////////////////////////////////////////////////////////////////
// Copyright 2022 Skylor R. Schermer
// This code is dual licenced using the MIT or Apache 2 license.
// See licence-mit.md and licence-apache.md for details.
////////////////////////////////////////////////////////////////////////////////
//! End-to-end grammar tests.
////////////////////////////////////////////////////////////////////////////////

// Local imports.
use scoria::*;


////////////////////////////////////////////////////////////////////////////////
// Literals.
////////////////////////////////////////////////////////////////////////////////

#[test]
fn literal_accepts_its_text() {
    assert_eq!(literal("foo").parse("foo").ok(), Some(String::from("foo")));
}

#[test]
fn literal_failure_names_the_parser() {
    let e = match literal("foo").parse("bar") {
        Err(e) => e,
        Ok(_) => panic!("parse should fail"),
    };
    assert_eq!(e.at, 0);
    assert!(e.diagnostic.contains(r#"failure: literal("foo")"#));
}


////////////////////////////////////////////////////////////////////////////////
// Numbers.
////////////////////////////////////////////////////////////////////////////////

#[test]
fn decimal_stops_at_the_point() {
    // The cursor rests after the third digit.
    let p = decimal() << literal(".45");
    assert_eq!(p.parse("123.45").ok(), Some(123));
}

#[test]
fn decimal_rejects_signs() {
    assert!(decimal().parse("-123").is_err());
}

#[test]
fn decimal_fraction_json_values() {
    let p = decimal_fraction();
    assert_eq!(p.parse("-12.5e2").ok(), Some(-1250.0));
    assert_eq!(p.parse("0.25").ok(), Some(0.25));
    assert_eq!(p.parse("2E3").ok(), Some(2000.0));
}


////////////////////////////////////////////////////////////////////////////////
// Repetition.
////////////////////////////////////////////////////////////////////////////////

#[test]
fn many_collects_until_mismatch() {
    let p = many(literal("foo"));
    assert_eq!(
        p.parse("foofoofoo").ok(),
        Some(vec![
            String::from("foo"),
            String::from("foo"),
            String::from("foo"),
        ]));
}

#[test]
fn many_leaves_cursor_at_entry_on_mismatch() {
    // many consumed nothing, so the following literal sees the whole input.
    let p = many(literal("foo")) >> literal("bar");
    assert_eq!(p.parse("bar").ok(), Some(String::from("bar")));
}

#[test]
fn consumed_input_is_exact_on_success() {
    let p = many(any_char()) << eof();
    assert_eq!(p.parse("abc").ok().map(|v| v.len()), Some(3));
}


////////////////////////////////////////////////////////////////////////////////
// Round trips.
////////////////////////////////////////////////////////////////////////////////

#[test]
fn optional_matches_inner_success() {
    assert_eq!(
        optional(literal("foo")).parse("foo").ok(),
        Some(Some(String::from("foo"))));
    let p = optional(literal("foo")) >> literal("bar");
    assert_eq!(p.parse("bar").ok(), Some(String::from("bar")));
}

#[test]
fn peek_leaves_cursor_at_entry() {
    let p = peek(decimal()) << literal("42");
    assert_eq!(p.parse("42").ok(), Some(42));
}


////////////////////////////////////////////////////////////////////////////////
// CSV records.
////////////////////////////////////////////////////////////////////////////////

/// A field of a CSV record, quoted or unquoted.
fn csv_cell() -> Parser<String> {
    let escaped_quote = backtrack(literal("\"\"")).map(|_| '"');
    let quoted_char = escaped_quote
        | char_matching(|c| c != '"', "not a quote");
    let quoted = literal("\"") >> many(quoted_char) << literal("\"");
    let unquoted = many(
        char_matching(|c| c != ',' && c != '"' && c != '\n',
            "cell char"));
    (quoted | unquoted)
        .map(|chars| chars.into_iter().collect())
        .with_label("csv_cell")
}

#[test]
fn csv_record_with_quoting() {
    let record = sep_by(csv_cell(), literal(",")) << literal("\n");
    assert_eq!(
        record.parse("a,\"b,\"\"c\"\"\",d\n").ok(),
        Some(vec![
            String::from("a"),
            String::from("b,\"c\""),
            String::from("d"),
        ]));
}

#[test]
fn csv_record_with_empty_cells() {
    let record = sep_by(csv_cell(), literal(",")) << literal("\n");
    assert_eq!(
        record.parse("a,,c\n").ok(),
        Some(vec![
            String::from("a"),
            String::new(),
            String::from("c"),
        ]));
}


////////////////////////////////////////////////////////////////////////////////
// Recursive grammars.
////////////////////////////////////////////////////////////////////////////////

/// A balanced nest of parentheses.
#[derive(Debug, PartialEq)]
struct Nest(Vec<Nest>);

#[test]
fn recursive_parens() {
    let p = recursive(|p| {
        between(literal("("), literal(")"),
            optional(p).map(|inner| {
                Nest(inner.map_or_else(Vec::new, |n| vec![n]))
            }))
    });
    assert_eq!(
        p.parse("((()))").ok(),
        Some(Nest(vec![Nest(vec![Nest(vec![])])])));
    assert!(p.parse("((())").is_err());
}


////////////////////////////////////////////////////////////////////////////////
// Arithmetic via reduce.
////////////////////////////////////////////////////////////////////////////////

/// A whitespace-tolerant signed term.
fn term() -> Parser<i64> {
    spaced(decimal().map(|v| v as i64))
}

#[test]
fn reduce_folds_left_associatively() {
    let expr = reduce(term(), |accum| {
        char_in("+-").bind(move |op| term().map(move |t| {
            if op == '+' { accum + t } else { accum - t }
        }))
    });
    assert_eq!(expr.parse("1 + 2 - 3 + 4").ok(), Some(4));
    assert_eq!(expr.parse("7").ok(), Some(7));
}

#[test]
fn reduce_rests_before_the_failing_round() {
    let expr = reduce(term(), |accum| {
        char_in("+-").bind(move |op| term().map(move |t| {
            if op == '+' { accum + t } else { accum - t }
        }))
    });
    // The trailing "+ x" round fails; the value and cursor are from the
    // last successful round.
    let p = expr << (char_in("+-") >> spaced(literal("x")));
    assert_eq!(p.parse("1 + 2 + x").ok(), Some(3));
}


////////////////////////////////////////////////////////////////////////////////
// Label synthesis.
////////////////////////////////////////////////////////////////////////////////

/// A combinator defined through the label facility.
fn pair_of(p: Parser<char>, q: Parser<char>) -> Parser<(char, char)> {
    let label = label_call("pair_of", [p.label_repr(), q.label_repr()]);
    p.bind(move |a| q.clone().map(move |b| (a, b)))
        .with_label(label)
}

#[test]
fn defined_combinators_label_from_argument_labels() {
    let p = pair_of(any_char(), decimal_digit());
    assert_eq!(p.label(), "pair_of(any_char, decimal_digit)");
    assert_eq!(p.parse("a1").ok(), Some(('a', '1')));

    assert_eq!(
        many(literal("foo")).label(),
        r#"many(literal("foo"))"#);
}


////////////////////////////////////////////////////////////////////////////////
// Streamed input.
////////////////////////////////////////////////////////////////////////////////

#[test]
fn parse_from_reader() {
    let input = std::io::Cursor::new("1,2,3".as_bytes().to_vec());
    let record = sep_by(decimal(), literal(",")) << eof();
    assert_eq!(
        record.parse(Source::from_reader(input)).ok(),
        Some(vec![1, 2, 3]));
}

#[test]
fn diagnostics_from_reader_show_the_line() {
    let input = std::io::Cursor::new("12x".as_bytes().to_vec());
    let p = decimal() << eof();
    let e = match p.parse(Source::from_reader(input)) {
        Err(e) => e,
        Ok(_) => panic!("parse should fail"),
    };
    assert_eq!(e.line, 1);
    assert!(e.diagnostic.contains("12x"));
}
