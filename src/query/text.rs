//! Text literals for boolean query values, free-text queries and facet constraints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a rendered text literal is wrapped in single quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quoting {
    /// Wrap in single quotes and escape `\` and `'`.
    #[default]
    Quote,
    /// Render the trimmed value verbatim.
    NoQuote,
}

/// Whether commas are escaped in a quoted rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommaEscaping {
    /// Leave commas untouched.
    #[default]
    Keep,
    /// Escape commas as `\,`.
    Escape,
}

/// Characters stripped from both ends of a literal: ASCII space, tab, line
/// feed, carriage return, NUL and vertical tab. Other Unicode whitespace is kept.
const TRIM_CHARS: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B'];

/// A string argument for text queries, `field` expressions and facet constraints.
///
/// The source value is trimmed on construction. Rendering with [`Quoting::Quote`]
/// surrounds the value with single quotes and backslash-escapes backslashes and
/// single quotes:
///
/// ```
/// use cloudsearch_query::query::TextLiteral;
///
/// let text = TextLiteral::new(" q\\uer'y ");
/// assert_eq!(text.build(), "'q\\\\uer\\'y'");
/// assert_eq!(text.build_unquoted(), "q\\uer'y");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextLiteral {
    value: String,
}

impl TextLiteral {
    /// Create a new text literal from a string, trimming surrounding ASCII whitespace.
    pub fn new<S: AsRef<str>>(value: S) -> Self {
        TextLiteral {
            value: value.as_ref().trim_matches(TRIM_CHARS).to_string(),
        }
    }

    /// Append a trailing `*` for prefix matching unless one is already present.
    ///
    /// The service stems indexed terms but does not stem prefix searches, so a
    /// prefix ending in `s` will not match terms whose indexed form dropped it.
    pub fn add_wildcard(&mut self) -> &mut Self {
        if !self.value.ends_with('*') {
            self.value.push('*');
        }
        self
    }

    /// Consuming variant of [`add_wildcard`](Self::add_wildcard).
    pub fn with_wildcard(mut self) -> Self {
        self.add_wildcard();
        self
    }

    /// Get the trimmed value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Render the quoted form without comma escaping.
    pub fn build(&self) -> String {
        self.build_with(Quoting::Quote, CommaEscaping::Keep)
    }

    /// Render the raw trimmed value.
    pub fn build_unquoted(&self) -> String {
        self.build_with(Quoting::NoQuote, CommaEscaping::Keep)
    }

    /// Render with explicit quoting and comma handling.
    ///
    /// Comma escaping only applies to the quoted form.
    pub fn build_with(&self, quoting: Quoting, commas: CommaEscaping) -> String {
        if quoting == Quoting::NoQuote {
            return self.value.clone();
        }

        let mut rendered = String::with_capacity(self.value.len() + 2);
        rendered.push('\'');
        for ch in self.value.chars() {
            match ch {
                '\\' | '\'' => {
                    rendered.push('\\');
                    rendered.push(ch);
                }
                ',' if commas == CommaEscaping::Escape => rendered.push_str("\\,"),
                _ => rendered.push(ch),
            }
        }
        rendered.push('\'');
        rendered
    }
}

impl fmt::Display for TextLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

impl From<&str> for TextLiteral {
    fn from(value: &str) -> Self {
        TextLiteral::new(value)
    }
}

impl From<String> for TextLiteral {
    fn from(value: String) -> Self {
        TextLiteral::new(value)
    }
}

impl From<&String> for TextLiteral {
    fn from(value: &String) -> Self {
        TextLiteral::new(value)
    }
}

impl From<&TextLiteral> for TextLiteral {
    fn from(value: &TextLiteral) -> Self {
        value.clone()
    }
}

impl From<bool> for TextLiteral {
    fn from(value: bool) -> Self {
        TextLiteral::new(if value { "1" } else { "" })
    }
}

macro_rules! text_literal_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for TextLiteral {
                fn from(value: $ty) -> Self {
                    TextLiteral::new(value.to_string())
                }
            }
        )*
    };
}

text_literal_from_number!(i32, i64, u32, u64, usize, f64);
