//! Indentation-nested lists.
//!
//! A list at nesting level `L` owns every line that either carries its
//! marker at column `2 * L` or carries a marker two spaces further in (a
//! nested list). A less indented line is handed back to the caller; any
//! other deeper indentation is malformed.

use std::io::BufRead;

use tracing::error;

use crate::block::{List, ListNode, Ordering};
use crate::error::ConvertError;
use crate::inline::tokenize;
use crate::parser::{Line, LineReader};

/// How a line relates to the list at a given level.
enum Entry<'a> {
    /// A sibling item; holds the text after the marker.
    Item(&'a str),
    /// Indented one level further: the start of a nested list of this kind.
    Nested(Ordering),
    /// Indented past this level but not a nested list item.
    Malformed,
    /// Not part of this list.
    End,
}

/// Text after an unordered marker (`* ` or `- `).
pub(crate) fn unordered_item(text: &str) -> Option<&str> {
    text.strip_prefix("* ").or_else(|| text.strip_prefix("- "))
}

/// Text after an ordered marker (ASCII digits followed by `. `).
pub(crate) fn ordered_item(text: &str) -> Option<&str> {
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    text[digits..].strip_prefix(". ")
}

fn item_text(text: &str, ordering: Ordering) -> Option<&str> {
    match ordering {
        Ordering::Unordered => unordered_item(text),
        Ordering::Ordered => ordered_item(text),
    }
}

fn classify(text: &str, level: usize, ordering: Ordering) -> Entry<'_> {
    if text.trim().is_empty() {
        return Entry::End;
    }
    let indent = text.bytes().take_while(|&b| b == b' ').count();
    let expected = level * 2;
    let rest = &text[indent..];

    if indent < expected {
        return Entry::End;
    }
    if indent == expected {
        return item_text(rest, ordering).map_or(Entry::End, Entry::Item);
    }
    if indent != expected + 2 {
        return Entry::Malformed;
    }

    let nested = match rest.chars().next() {
        Some(c) if c.is_ascii_digit() => Ordering::Ordered,
        _ => Ordering::Unordered,
    };
    match item_text(rest, nested) {
        Some(_) => Entry::Nested(nested),
        None => Entry::Malformed,
    }
}

/// Parse a list starting at `first`, which must belong to it.
///
/// Returns the list and the first line not consumed (`None` at end of
/// input).
pub(crate) fn parse_list<R: BufRead>(
    reader: &mut LineReader<R>,
    first: Line,
    level: usize,
    ordering: Ordering,
) -> Result<(List, Option<Line>), ConvertError> {
    let mut list = List::new(ordering);
    let mut current = Some(first);

    while let Some(line) = current.take() {
        match classify(&line.text, level, ordering) {
            Entry::Item(text) => {
                list.children.push(ListNode::Leaf(tokenize(text.trim_end())?));
                current = reader.next_line()?;
            }
            Entry::Nested(nested_ordering) => {
                let (nested, next) = parse_list(reader, line, level + 1, nested_ordering)?;
                list.children.push(ListNode::Container(nested));
                current = next;
            }
            Entry::Malformed => {
                error!(line = line.number, "indented line is not a list item");
                return Err(ConvertError::MalformedList {
                    line: line.number,
                    text: line.text,
                });
            }
            Entry::End => return Ok((list, Some(line))),
        }
    }

    Ok((list, None))
}
