//! `key = value` declaration blocks.
//!
//! Used by the title fence and the structured record fences. A block ends
//! at the closing fence line. Blank lines are skipped, and a line starting
//! with a space or tab continues the previous value (joined with one space).

use std::io::BufRead;

use tracing::warn;

use crate::config::BlocksConfig;
use crate::error::ConvertError;
use crate::inline::format_inline;
use crate::markup::Markup;
use crate::parser::{LineReader, is_fence_close};
use crate::template::PlaceholderMap;

/// What a continuation line attaches to.
enum Continuation {
    None,
    Append(String),
    /// Continuation of a repeated key, dropped with it.
    Discard,
}

fn declared_value(key: &str, text: &str, blocks: &BlocksConfig) -> Result<Markup, ConvertError> {
    if blocks.is_verbatim(key) {
        Ok(Markup::trusted(text.to_owned()))
    } else {
        format_inline(text)
    }
}

/// Read declarations up to and including the closing fence.
///
/// `opened_at` is the line number of the opening fence, reported if the
/// input ends first.
pub(crate) fn parse_declarations<R: BufRead>(
    reader: &mut LineReader<R>,
    opened_at: usize,
    blocks: &BlocksConfig,
) -> Result<PlaceholderMap, ConvertError> {
    let mut values = PlaceholderMap::new();
    let mut continuation = Continuation::None;

    loop {
        let line = reader
            .next_line()?
            .ok_or(ConvertError::UnterminatedFence { line: opened_at })?;

        if is_fence_close(&line.text) {
            return Ok(values);
        }
        if line.text.trim().is_empty() {
            continuation = Continuation::None;
            continue;
        }

        if line.text.starts_with([' ', '\t']) {
            match &continuation {
                Continuation::Append(key) => {
                    let addition = declared_value(key, line.text.trim(), blocks)?;
                    if let Some(value) = values.get_mut(key) {
                        if !value.is_empty() {
                            value.push(&Markup::literal(" "))?;
                        }
                        value.push(&addition)?;
                    }
                    continue;
                }
                Continuation::Discard => continue,
                Continuation::None => {}
            }
        }

        let parts: Vec<&str> = line.text.split('=').collect();
        let [key, value] = parts.as_slice() else {
            return Err(ConvertError::MalformedDeclaration {
                line: line.number,
                text: line.text.clone(),
            });
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() {
            return Err(ConvertError::MalformedDeclaration {
                line: line.number,
                text: line.text.clone(),
            });
        }

        let markup = declared_value(key, value, blocks)?;
        if values.insert(key, markup) {
            continuation = Continuation::Append(key.to_owned());
        } else {
            warn!(line = line.number, key, "repeated declaration ignored");
            continuation = Continuation::Discard;
        }
    }
}
