//! Placeholder substitution for the LaTeX templates.
//!
//! Templates name their slots as `%name%`. Values spliced into a template may
//! themselves refer to other declared values as `[name]`; those secondary
//! placeholders are resolved before the value is inserted. Substitution is a
//! single left-to-right scan, so text introduced by one replacement is never
//! scanned again for further placeholders.

use crate::error::ConvertError;
use crate::escape::escape_markup;
use crate::markup::Markup;

/// Insertion-ordered mapping from placeholder name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    entries: Vec<(String, Markup)>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value unless the key is already present.
    ///
    /// Returns `false` (and keeps the first value) for a repeated key.
    pub fn insert(&mut self, key: impl Into<String>, value: Markup) -> bool {
        let key = key.into();
        if self.contains_key(&key) {
            return false;
        }
        self.entries.push((key, value));
        true
    }

    /// Insert a value, overwriting an existing one in place.
    pub fn set(&mut self, key: impl Into<String>, value: Markup) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Markup> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut Markup> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Markup> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Markup)> for PlaceholderMap {
    fn from_iter<I: IntoIterator<Item = (K, Markup)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Resolve `%name%` placeholders, with `[name]` references inside values
/// looked up in `values` itself.
pub fn resolve(template: &Markup, values: &PlaceholderMap) -> Result<Markup, ConvertError> {
    resolve_with(template, values, values)
}

/// Resolve `%name%` placeholders from `values`, looking up `[name]`
/// references inside those values in `secondary`.
///
/// Raw values are escaped before they are inserted. Placeholders with no
/// matching key are left untouched.
pub fn resolve_with(
    template: &Markup,
    values: &PlaceholderMap,
    secondary: &PlaceholderMap,
) -> Result<Markup, ConvertError> {
    if !template.is_safe() {
        return Err(ConvertError::TaintViolation("template resolution"));
    }

    let text = substitute(template.as_str(), '%', '%', |name| {
        let value = escape_markup(values.get(name)?);
        let nested = substitute(value.as_str(), '[', ']', |inner| {
            secondary
                .get(inner)
                .map(|v| escape_markup(v).into_string())
        });
        Some(nested)
    });

    Ok(Markup::trusted(text))
}

/// Resolve an optional sub-template.
///
/// When every key in `required` is present, the sub-template is resolved
/// against just those keys (with `[name]` references looked up in `values`);
/// otherwise it resolves to the empty string.
pub fn resolve_optional(
    template: &Markup,
    required: &[&str],
    values: &PlaceholderMap,
) -> Result<Markup, ConvertError> {
    let mut subset = PlaceholderMap::new();
    for key in required {
        match values.get(key) {
            Some(value) => {
                subset.insert(*key, value.clone());
            }
            None => return Ok(Markup::empty()),
        }
    }
    resolve_with(template, &subset, values)
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Single-pass scan replacing `{open}name{close}` with `lookup(name)`.
fn substitute<F>(text: &str, open: char, close: char, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(open) {
        out.push_str(&rest[..start]);
        let after = &rest[start + open.len_utf8()..];

        let replaced = after.find(close).and_then(|end| {
            let name = &after[..end];
            if !is_placeholder_name(name) {
                return None;
            }
            lookup(name).map(|value| (value, end))
        });

        match replaced {
            Some((value, end)) => {
                out.push_str(&value);
                rest = &after[end + close.len_utf8()..];
            }
            None => {
                out.push(open);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, Markup)]) -> PlaceholderMap {
        pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    #[test]
    fn replaces_every_occurrence() {
        let template = Markup::literal(r"\title{%title%} \rhead{%title%}");
        let values = map(&[("title", Markup::literal("Audit"))]);
        assert_eq!(
            resolve(&template, &values).unwrap().as_str(),
            r"\title{Audit} \rhead{Audit}"
        );
    }

    #[test]
    fn escapes_raw_values() {
        let template = Markup::literal(r"\textcolor{%color%}{x}");
        let values = map(&[("color", Markup::raw("R&D"))]);
        assert_eq!(
            resolve(&template, &values).unwrap().as_str(),
            r"\textcolor{R\&D}{x}"
        );
    }

    #[test]
    fn unknown_placeholders_and_lone_percent_survive() {
        let template = Markup::literal(r"50\% of %missing% and escapeinside={\%*}{*)} %a%");
        let values = map(&[("a", Markup::literal("A"))]);
        assert_eq!(
            resolve(&template, &values).unwrap().as_str(),
            r"50\% of %missing% and escapeinside={\%*}{*)} A"
        );
    }

    #[test]
    fn inserted_text_is_not_rescanned() {
        let template = Markup::literal("%first% %second%");
        let values = map(&[
            ("first", Markup::literal("%second%")),
            ("second", Markup::literal("two")),
        ]);
        assert_eq!(
            resolve(&template, &values).unwrap().as_str(),
            "%second% two"
        );
    }

    #[test]
    fn resolves_bracket_references_inside_values() {
        let template = Markup::literal(r"\textbf{%footer%}");
        let values = map(&[
            ("client", Markup::literal("ACME")),
            ("footer", Markup::literal("Prepared for [client] [unknown]")),
        ]);
        assert_eq!(
            resolve(&template, &values).unwrap().as_str(),
            r"\textbf{Prepared for ACME [unknown]}"
        );
    }

    #[test]
    fn bracket_references_use_secondary_map() {
        let template = Markup::literal("%x%");
        let values = map(&[("x", Markup::literal("[y]"))]);
        let secondary = map(&[("y", Markup::raw("_"))]);
        assert_eq!(
            resolve_with(&template, &values, &secondary)
                .unwrap()
                .as_str(),
            r"\_"
        );
    }

    #[test]
    fn optional_template_needs_every_key() {
        let template = Markup::literal(r"%address1%\\%address2%");
        let partial = map(&[("address1", Markup::literal("1 Main St"))]);
        assert!(resolve_optional(&template, &["address1", "address2"], &partial)
            .unwrap()
            .is_empty());

        let full = map(&[
            ("address1", Markup::literal("1 Main St")),
            ("address2", Markup::literal("Springfield")),
        ]);
        assert_eq!(
            resolve_optional(&template, &["address1", "address2"], &full)
                .unwrap()
                .as_str(),
            r"1 Main St\\Springfield"
        );
    }

    #[test]
    fn raw_template_is_rejected() {
        let err = resolve(&Markup::raw("%x%"), &PlaceholderMap::new()).unwrap_err();
        assert!(matches!(err, ConvertError::TaintViolation(_)));
    }

    #[test]
    fn first_insert_wins() {
        let mut values = PlaceholderMap::new();
        assert!(values.insert("k", Markup::literal("one")));
        assert!(!values.insert("k", Markup::literal("two")));
        assert_eq!(values.get("k").unwrap().as_str(), "one");
        assert_eq!(values.len(), 1);
    }
}
