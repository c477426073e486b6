//! String field decoding and SQL string quoting
//!
//! String-like fields arrive double-quoted with C-style backslash escapes
//! (`"it\'s\n"`). Statement parameters are sent single-quoted with `\` and
//! `'` escaped.

/// Remove protocol quoting from a string field and resolve its escapes.
///
/// Input that is not enclosed in double quotes is returned unchanged.
pub fn strip(data: &str) -> String {
    match data
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        Some(inner) => unescape(inner),
        None => data.to_string(),
    }
}

/// Resolve backslash escapes: `\\ \" \' \n \t \r`, octal `\ooo`, `\xhh` and
/// `\uXXXX`. Unknown escapes are kept verbatim.
pub fn unescape(data: &str) -> String {
    if !data.contains('\\') {
        return data.to_string();
    }

    let mut out = String::with_capacity(data.len());
    let mut chars = data.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(d @ '0'..='7') => {
                let mut code = d.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(code));
            }
            Some(kind @ ('x' | 'u')) => {
                let width = if kind == 'x' { 2 } else { 4 };
                let digits: String = chars.by_ref().take(width).collect();
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(ch) if digits.len() == width => out.push(ch),
                    _ => {
                        out.push('\\');
                        out.push(kind);
                        out.push_str(&digits);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Quote a string as a SQL literal
pub fn quote(data: &str) -> String {
    let escaped = data.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}
