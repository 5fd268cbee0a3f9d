//! printf-style message templates.
//!
//! Catalog templates use a small subset of printf verbs:
//!
//! | Verb | Output |
//! |------|--------|
//! | `%s`, `%v` | the parameter as text; lists render as `[a b c]` |
//! | `%q` | the parameter double-quoted and escaped |
//! | `%d` | integer parameters |
//! | `%%` | a literal percent sign |

use std::fmt;

/// A positional template parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Param {
    /// A plain string.
    Str(String),
    /// A list of strings.
    List(Vec<String>),
    /// An integer.
    Int(i64),
}

impl Param {
    fn write_quoted(&self, out: &mut String) {
        match self {
            Self::Str(s) => out.push_str(&quote(s)),
            Self::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    out.push_str(&quote(item));
                }
                out.push(']');
            }
            Self::Int(n) => out.push_str(&n.to_string()),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::List(items) => write!(f, "[{}]", items.join(" ")),
            Self::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Param {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&String> for Param {
    fn from(s: &String) -> Self {
        Self::Str(s.clone())
    }
}

impl From<Vec<String>> for Param {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<&[String]> for Param {
    fn from(items: &[String]) -> Self {
        Self::List(items.to_vec())
    }
}

impl From<i64> for Param {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

/// Double-quotes a string, escaping quotes, backslashes and control characters.
#[must_use]
pub fn quote(s: &str) -> String {
    format!("{s:?}")
}

/// Expands `template` with `params`.
///
/// Verbs without a matching parameter render as `%!v(MISSING)`; unknown
/// verbs are copied through unchanged.
#[must_use]
pub fn render(template: &str, params: &[Param]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = params.iter();
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(verb @ ('s' | 'v' | 'q' | 'd')) => match args.next() {
                Some(param) if verb == 'q' => param.write_quoted(&mut out),
                Some(param) => out.push_str(&param.to_string()),
                None => {
                    out.push_str("%!");
                    out.push(verb);
                    out.push_str("(MISSING)");
                }
            },
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_quoted_string() {
        let out = render("Cheese type not found: %q", &["Feta".into()]);
        assert_eq!(out, r#"Cheese type not found: "Feta""#);
    }

    #[test]
    fn renders_list_as_bracketed_words() {
        let hosts = vec!["a.com".to_string(), "b.com".to_string()];
        let out = render("hosts %v here", &[hosts.into()]);
        assert_eq!(out, "hosts [a.com b.com] here");
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        let out = render("%q", &[r#"a"b\d"#.into()]);
        assert_eq!(out, r#""a\"b\\d""#);
    }

    #[test]
    fn marks_missing_parameters() {
        assert_eq!(render("%s and %d", &["x".into()]), "x and %!d(MISSING)");
    }

    #[test]
    fn keeps_literal_percent_and_unknown_verbs() {
        assert_eq!(render("100%% %z", &[]), "100% %z");
        assert_eq!(render("trailing %", &[]), "trailing %");
    }

    #[test]
    fn renders_integers() {
        assert_eq!(render("port %d", &[Param::Int(8080)]), "port 8080");
        assert_eq!(render("%q of %v", &[Param::Int(7), Param::Int(9)]), "7 of 9");
    }
}
