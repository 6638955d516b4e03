//! Text codec for the `.pd` patch format.
//!
//! A patch file is a sequence of statements terminated by `;`. Each statement
//! is a whitespace-separated field list led by a record tag (`#N`, `#X`, `#A`)
//! and a command. Three characters are reserved inside fields:
//!
//! | char | meaning                  |
//! |------|--------------------------|
//! | `;`  | statement terminator     |
//! | `,`  | message separator        |
//! | `$`  | argument substitution    |
//!
//! Each is written with a `\` prefix when it is literal text, and `\` itself is
//! written as `\\`. Fields stay in escaped form inside the tree; use
//! [`unescape`] to get display text back.
//!
//! # Example
//!
//! ```rust
//! use pdkit_core::codec::{escape, parse, serialize, unescape};
//!
//! let text = "#N canvas 0 50 450 300 12;\n#X msg 10 10 bang;\n";
//! let patch = parse(text).unwrap();
//! assert_eq!(serialize(&patch), text);
//!
//! let label = "a; b, $1";
//! assert_eq!(escape(label), "a\\; b\\, \\$1");
//! assert_eq!(unescape(&escape(label)), label);
//! ```

mod lexer;
mod parse;
mod write;

pub use parse::parse;
pub use write::serialize;

pub(crate) use lexer::tokenize;

/// Escape prefix character.
pub const ESCAPE: char = '\\';

/// Characters that must carry the escape prefix when used literally.
pub const RESERVED: [char; 3] = [';', ',', '$'];

/// Escapes free-form text for storage in a patch field.
///
/// The escape prefix itself is doubled so that [`unescape`] is an exact
/// inverse for every input.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        if c == ESCAPE || RESERVED.contains(&c) {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Reverses [`escape`]: every `\x` pair becomes `x`.
///
/// A lone trailing `\` is kept as is.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            out.push(chars.next().unwrap_or(ESCAPE));
        } else {
            out.push(c);
        }
    }
    out
}

/// Escapes text that must stay a single field, such as a label or a send name.
///
/// Reserved characters are prefixed as in [`escape`] and every whitespace
/// character becomes an escaped space, so the result never splits or ends a
/// statement. Empty input yields `placeholder`.
pub fn escape_symbol(text: &str, placeholder: &str) -> String {
    if text.is_empty() {
        return placeholder.to_string();
    }
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        if c.is_whitespace() {
            out.push(ESCAPE);
            out.push(' ');
            continue;
        }
        if c == ESCAPE || RESERVED.contains(&c) {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Escapes `text` and splits it into fields on whitespace.
pub(crate) fn escape_fields(text: &str) -> Vec<String> {
    text.split_whitespace().map(escape).collect()
}

/// Formats a float field in its shortest canonical form.
///
/// Integral values print without a fractional part; very large or very small
/// magnitudes use exponent notation. Parsing the output yields `value` again.
pub fn format_float(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs();
    if value.fract() == 0.0 && magnitude < 1e15 {
        return format!("{}", value as i64);
    }
    if !(1e-4..1e15).contains(&magnitude) {
        return format!("{value:e}");
    }
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_reserved_characters() {
        assert_eq!(escape("a;b"), "a\\;b");
        assert_eq!(escape("1, 2"), "1\\, 2");
        assert_eq!(escape("$1"), "\\$1");
        assert_eq!(escape("back\\slash"), "back\\\\slash");
        assert_eq!(escape("plain text"), "plain text");
    }

    #[test]
    fn unescape_inverts_escape() {
        for s in ["", "\\", "\\;", ";;;", "a\\\\;b", "héllo; wörld, $0-x", "ends with \\"] {
            assert_eq!(unescape(&escape(s)), s, "input {s:?}");
        }
    }

    #[test]
    fn unescape_foreign_pairs() {
        assert_eq!(unescape("\\ space"), " space");
        assert_eq!(unescape("dangling\\"), "dangling\\");
    }

    #[test]
    fn escape_symbol_stays_one_field() {
        let escaped = escape_symbol("Vol; L, $1", "empty");
        assert_eq!(escaped, "Vol\\;\\ L\\,\\ \\$1");
        assert_eq!(tokenize(&escaped), vec![escaped.clone()]);
        assert_eq!(unescape(&escaped), "Vol; L, $1");
        assert_eq!(escape_symbol("a\tb", "-"), "a\\ b");
        assert_eq!(escape_symbol("", "-"), "-");
    }

    #[test]
    fn escape_fields_splits_on_whitespace() {
        assert_eq!(escape_fields("  + $1   5 "), vec!["+", "\\$1", "5"]);
        assert!(escape_fields("").is_empty());
    }

    #[test]
    fn float_format_canonical() {
        assert_eq!(format_float(0.0), "0");
        assert_eq!(format_float(-0.0), "0");
        assert_eq!(format_float(127.0), "127");
        assert_eq!(format_float(-1.0), "-1");
        assert_eq!(format_float(0.5), "0.5");
        assert_eq!(format_float(1e37), "1e37");
        assert_eq!(format_float(-1e37), "-1e37");
        assert_eq!(format_float(0.00001), "1e-5");
    }

    #[test]
    fn float_format_round_trips() {
        for v in [0.1, 1.0 / 3.0, 1e-37, 123456.789, -42.25, 1e15, 9.99e14] {
            let text = format_float(v);
            let back: f64 = text.parse().unwrap();
            assert_eq!(back, v, "{text}");
        }
    }
}
