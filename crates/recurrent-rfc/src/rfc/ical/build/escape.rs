//! iCalendar text escaping (RFC 5545 §3.3.11, RFC 6868).

/// Escapes backslash, comma, semicolon and newlines in a TEXT value.
#[must_use]
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Quotes a parameter value when it holds `:`, `;` or `,`, caret-encoding
/// newlines, carets and double quotes inside the quotes.
#[must_use]
pub fn escape_param_value(s: &str) -> String {
    if !s.chars().any(|c| matches!(c, ':' | ';' | ',' | '"' | '\n' | '^')) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 4);
    out.push('"');
    for c in s.chars() {
        match c {
            '^' => out.push_str("^^"),
            '\n' => out.push_str("^n"),
            '"' => out.push_str("^'"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_text_specials() {
        assert_eq!(escape_text("a, b; c\nd\\"), r"a\, b\; c\nd\\");
    }

    #[test]
    fn param_values_quoted_only_when_needed() {
        assert_eq!(escape_param_value("Europe/Paris"), "Europe/Paris");
        assert_eq!(escape_param_value("Doe, Jane"), "\"Doe, Jane\"");
        assert_eq!(escape_param_value("say \"hi\""), "\"say ^'hi^'\"");
    }
}
