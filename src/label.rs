////////////////////////////////////////////////////////////////////////////////
// Scoria parser combinator library
////////////////////////////////////////////////////////////////////////////////
// Copyright 2022 Skylor R. Schermer
// This code is dual licenced using the MIT or Apache 2 license.
// See licence-mit.md and licence-apache.md for details.
////////////////////////////////////////////////////////////////////////////////
//! Parser label synthesis.
////////////////////////////////////////////////////////////////////////////////


////////////////////////////////////////////////////////////////////////////////
// label_call
////////////////////////////////////////////////////////////////////////////////
/// Builds the label of a combinator invocation from the combinator's name
/// and the reprs of its arguments, resembling the source expression that
/// produced it.
pub fn label_call<I>(name: &str, args: I) -> String
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
{
    let mut label = String::from(name);
    label.push('(');
    for (idx, arg) in args.into_iter().enumerate() {
        if idx > 0 { label.push_str(", "); }
        label.push_str(arg.as_ref());
    }
    label.push(')');
    label
}


////////////////////////////////////////////////////////////////////////////////
// LabelRepr
////////////////////////////////////////////////////////////////////////////////
/// The textual representation of a combinator argument within a synthesized
/// label. A parser's repr is its own label; plain values repr as they would
/// be written in source.
pub trait LabelRepr {
    /// Returns the argument's representation within a label.
    fn label_repr(&self) -> String;
}

impl LabelRepr for &str {
    fn label_repr(&self) -> String {
        format!("{:?}", self)
    }
}

impl LabelRepr for String {
    fn label_repr(&self) -> String {
        format!("{:?}", self)
    }
}

impl LabelRepr for char {
    fn label_repr(&self) -> String {
        format!("{:?}", self)
    }
}

impl LabelRepr for usize {
    fn label_repr(&self) -> String {
        self.to_string()
    }
}

impl LabelRepr for u64 {
    fn label_repr(&self) -> String {
        self.to_string()
    }
}

impl LabelRepr for f64 {
    fn label_repr(&self) -> String {
        self.to_string()
    }
}

impl<T> LabelRepr for Vec<T>
    where T: LabelRepr
{
    fn label_repr(&self) -> String {
        self.iter()
            .map(LabelRepr::label_repr)
            .collect::<Vec<_>>()
            .join(", ")
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn call_labels_resemble_source() {
        assert_eq!(label_call("many", ["p"]), "many(p)");
        assert_eq!(
            label_call("sep_by", ["cell", "literal(\",\")"]),
            "sep_by(cell, literal(\",\"))");
        assert_eq!(label_call("eof", Vec::<String>::new()), "eof()");
    }

    #[test]
    fn plain_value_reprs() {
        assert_eq!("foo".label_repr(), "\"foo\"");
        assert_eq!('x'.label_repr(), "'x'");
        assert_eq!(3usize.label_repr(), "3");
    }
}
