//! LaTeX escaping.

use crate::markup::Markup;

/// Escape every LaTeX control character in `text` and return a safe string.
///
/// Call this exactly once per raw span: escaping is not idempotent for text
/// that already contains escape sequences.
pub fn escape(text: &str) -> Markup {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '{' | '}' | '#' | '$' | '%' | '&' | '_' => {
                out.push('\\');
                out.push(ch);
            }
            '\\' => out.push_str(r"\textbackslash{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            _ => out.push(ch),
        }
    }
    Markup::trusted(out)
}

/// Escape a value unless it is already safe.
pub(crate) fn escape_markup(value: &Markup) -> Markup {
    if value.is_safe() {
        value.clone()
    } else {
        escape(value.as_str())
    }
}
