//! Escaping rules for each position in a line
//!
//! | char          | measurement | tag key / tag value / field key |
//! |---------------|-------------|---------------------------------|
//! | `\n` `\r` `\t`| escaped     | escaped                         |
//! | space         | `\ `        | `\ `                            |
//! | `,`           | `\,`        | `\,`                            |
//! | `=`           | unchanged   | `\=`                            |
//!
//! String field values only escape `\` and `"`.
//!
//! A backslash outside string values is written as-is, so the text is not
//! always reversible: `C:\new` in a tag value reads back with a newline,
//! and a key or value ending in `\` escapes the separator after it.

fn push_escaped(out: &mut String, s: &str, escape_equals: bool) {
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ' ' | ',' => {
                out.push('\\');
                out.push(c);
            }
            '=' if escape_equals => out.push_str("\\="),
            _ => out.push(c),
        }
    }
}

/// Append an escaped measurement name. `=` is never escaped here.
pub fn push_measurement(out: &mut String, s: &str) {
    push_escaped(out, s, false);
}

/// Append an escaped tag key, tag value or field key.
pub fn push_key(out: &mut String, s: &str) {
    push_escaped(out, s, true);
}

/// Append a quoted string field value.
pub fn push_string_value(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

pub fn escape_measurement(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    push_measurement(&mut out, s);
    out
}

pub fn escape_key(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    push_key(&mut out, s);
    out
}

pub fn quote_string_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    push_string_value(&mut out, s);
    out
}

/// Reverse of the measurement/key escaping.
///
/// Unknown escape sequences are kept verbatim.
pub fn unescape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some(next @ ('\\' | ',' | '=' | ' ' | '"')) => result.push(next),
            Some(next) => {
                result.push('\\');
                result.push(next);
            }
            None => result.push('\\'),
        }
    }

    result
}

/// Reverse of [`quote_string_value`] for the text between the quotes.
pub fn unescape_string_value(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '\\' || next == '"' {
                    result.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        result.push(c);
    }

    result
}
