//! Inline span tokenizer.
//!
//! A line is scanned left to right. At each position the rules in [`RULES`]
//! are tried in order and the first one that matches produces a [`Span`];
//! when none matches, one character is consumed as plain text. Span bodies
//! are taken literally (no nested formatting) and escaped when rendered.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::ConvertError;
use crate::escape::escape;
use crate::markup::Markup;
use crate::template::{PlaceholderMap, resolve_with};

/// Labels with this prefix refer to a heading by title.
pub const SECTION_PREFIX: &str = "sec:";

/// How a cross-reference is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// By number (`\autoref`): figures, tables, listings.
    Numbered,
    /// By title (`\nameref`): sections.
    Named,
}

/// One recognised unit of inline markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Bold(String),
    Italic(String),
    BoldItalic(String),
    Code(String),
    Link { description: String, target: String },
    Footnote(String),
    CrossRef { label: String, kind: RefKind },
    SingleQuoted(String),
    DoubleQuoted(String),
}

struct Rule {
    name: &'static str,
    pattern: Regex,
    /// The opening delimiter does not count when preceded by a backslash.
    unescaped_only: bool,
    build: fn(&Captures<'_>) -> Option<Span>,
}

impl Rule {
    fn new(
        name: &'static str,
        pattern: &str,
        unescaped_only: bool,
        build: fn(&Captures<'_>) -> Option<Span>,
    ) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("inline grammar patterns are valid"),
            unescaped_only,
            build,
        }
    }
}

/// First capture group that participated in the match.
fn body(caps: &Captures<'_>) -> Option<String> {
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .map(|m| m.as_str().to_owned())
}

/// Inline grammar in priority order. Every pattern is anchored at the scan
/// position.
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("code", r"^`([^`]*)`", true, |c| body(c).map(Span::Code)),
        Rule::new("link", r"^\[([^\]]*)\]\(([^)]*)\)", false, |c| {
            Some(Span::Link {
                description: c.get(1)?.as_str().to_owned(),
                target: c.get(2)?.as_str().to_owned(),
            })
        }),
        Rule::new(
            "bolditalic",
            r"^(?:\*\*\*((?:\\\*|[^*])*)\*\*\*|___((?:\\_|[^_])*)___)",
            false,
            |c| body(c).map(Span::BoldItalic),
        ),
        Rule::new(
            "bold",
            r"^(?:\*\*((?:\\\*|[^*])*)\*\*|__((?:\\_|[^_])*)__)",
            false,
            |c| body(c).map(Span::Bold),
        ),
        Rule::new(
            "italic",
            r"^(?:\*((?:\\\*|[^*])*)\*|_((?:\\_|[^_])*)_)",
            false,
            |c| body(c).map(Span::Italic),
        ),
        Rule::new("footnote", r"^\^((?:\\\^|[^^])*)\^", true, |c| {
            body(c).map(Span::Footnote)
        }),
        Rule::new("ref", r"^\$((?:\\\$|[^$])*)\$", true, |c| {
            body(c).map(|label| {
                let kind = if label.starts_with(SECTION_PREFIX) {
                    RefKind::Named
                } else {
                    RefKind::Numbered
                };
                Span::CrossRef { label, kind }
            })
        }),
        Rule::new("single", r"^'((?:\\'|[^'])*)'", true, |c| {
            body(c).map(Span::SingleQuoted)
        }),
        Rule::new("quote", r#"^"((?:\\"|[^"])*)""#, true, |c| {
            body(c).map(Span::DoubleQuoted)
        }),
    ]
});

/// Split one line of raw text into spans.
///
/// Adjacent plain characters are merged into a single [`Span::Text`].
pub fn tokenize(line: &str) -> Result<Vec<Span>, ConvertError> {
    let mut spans = Vec::new();
    let mut text = String::new();
    let mut pos = 0;

    while pos < line.len() {
        let rest = &line[pos..];
        let escaped = line[..pos].ends_with('\\');

        let matched = RULES
            .iter()
            .filter(|rule| !(rule.unescaped_only && escaped))
            .find_map(|rule| rule.pattern.captures(rest).map(|caps| (rule, caps)));

        match matched {
            Some((rule, caps)) => {
                let span = (rule.build)(&caps)
                    .ok_or_else(|| ConvertError::UnknownInlineToken(rule.name.to_owned()))?;
                if !text.is_empty() {
                    spans.push(Span::Text(std::mem::take(&mut text)));
                }
                spans.push(span);
                pos += caps.get(0).map_or(0, |m| m.len());
            }
            None => {
                // Infallible: pos < line.len() and always sits on a char boundary
                let Some(ch) = rest.chars().next() else { break };
                text.push(ch);
                pos += ch.len_utf8();
            }
        }
    }

    if !text.is_empty() {
        spans.push(Span::Text(text));
    }
    Ok(spans)
}

fn render_template(
    template: &'static str,
    pairs: &[(&str, &str)],
) -> Result<Markup, ConvertError> {
    let values: PlaceholderMap = pairs
        .iter()
        .map(|(key, value)| (*key, Markup::raw(*value)))
        .collect();
    // Span bodies never take part in `[name]` resolution
    resolve_with(&Markup::literal(template), &values, &PlaceholderMap::new())
}

/// Render a single span as LaTeX.
pub fn render_span(span: &Span) -> Result<Markup, ConvertError> {
    match span {
        Span::Text(text) => Ok(escape(text)),
        Span::Bold(text) => render_template(r"\textbf{%text%}", &[("text", text.as_str())]),
        Span::Italic(text) => render_template(r"\textit{%text%}", &[("text", text.as_str())]),
        Span::BoldItalic(text) => {
            render_template(r"\textbf{\textit{%text%}}", &[("text", text.as_str())])
        }
        Span::Code(code) => render_template(
            r"\Colorbox{lightgray}{\lstinline$%code%$}",
            &[("code", code.as_str())],
        ),
        Span::Link {
            description,
            target,
        } => render_template(
            r"\href{%href%}{%description%}",
            &[("description", description.as_str()), ("href", target.as_str())],
        ),
        Span::Footnote(text) => {
            render_template(r"\footnote{%footnote%}", &[("footnote", text.as_str())])
        }
        Span::CrossRef { label, kind } => {
            let template = match kind {
                RefKind::Named => r"\nameref{%ref%}",
                RefKind::Numbered => r"\autoref{%ref%}",
            };
            render_template(template, &[("ref", label.as_str())])
        }
        Span::SingleQuoted(text) => render_template("`%text%'", &[("text", text.as_str())]),
        Span::DoubleQuoted(text) => render_template("``%text%''", &[("text", text.as_str())]),
    }
}

/// Render a sequence of spans, preserving their order.
pub fn render_spans(spans: &[Span]) -> Result<Markup, ConvertError> {
    let rendered = spans
        .iter()
        .map(render_span)
        .collect::<Result<Vec<_>, _>>()?;
    Markup::empty().join(&rendered)
}

/// Tokenize and render one line of raw text.
pub fn format_inline(line: &str) -> Result<Markup, ConvertError> {
    render_spans(&tokenize(line)?)
}
