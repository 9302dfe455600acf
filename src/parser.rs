use std::io::BufRead;

use tracing::{debug, error};

use crate::block::{Block, Document, Ordering, RecordKind};
use crate::config::Config;
use crate::declaration::parse_declarations;
use crate::error::ConvertError;
use crate::inline::{SECTION_PREFIX, tokenize};
use crate::list::{ordered_item, parse_list, unordered_item};
use crate::slug::slugify;
use crate::template::PlaceholderMap;

pub(crate) const FENCE: &str = "```";

/// Fields the title declaration must provide.
const TITLE_FIELDS: &[&str] = &["title", "author", "date", "logo"];

/// One input line without its terminator, with its 1-based number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line {
    pub number: usize,
    pub text: String,
}

/// Sequential line source over the input.
pub(crate) struct LineReader<R> {
    inner: R,
    number: usize,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, number: 0 }
    }

    /// Read the next line, or `None` at end of input.
    pub fn next_line(&mut self) -> Result<Option<Line>, ConvertError> {
        let mut text = String::new();
        if self.inner.read_line(&mut text)? == 0 {
            return Ok(None);
        }
        if text.ends_with('\n') {
            text.pop();
            if text.ends_with('\r') {
                text.pop();
            }
        }
        self.number += 1;
        Ok(Some(Line {
            number: self.number,
            text,
        }))
    }
}

pub(crate) fn is_fence_close(text: &str) -> bool {
    text.trim_end() == FENCE
}

fn is_title_fence(text: &str) -> bool {
    text.strip_prefix(FENCE).is_some_and(|tag| tag.trim() == "title")
}

/// Parse a whole document: the title declaration, then body blocks.
pub(crate) fn parse<R: BufRead>(input: R, config: &Config) -> Result<Document, ConvertError> {
    let mut reader = LineReader::new(input);
    let title = parse_title(&mut reader, config)?;
    let blocks = parse_blocks(&mut reader, config)?;
    Ok(Document { title, blocks })
}

fn parse_title<R: BufRead>(
    reader: &mut LineReader<R>,
    config: &Config,
) -> Result<PlaceholderMap, ConvertError> {
    let opening = loop {
        match reader.next_line()? {
            Some(line) if line.text.trim().is_empty() => continue,
            Some(line) if is_title_fence(&line.text) => break line,
            _ => {
                error!("title block must be at start of file");
                return Err(ConvertError::MissingTitleBlock);
            }
        }
    };

    let mut title = parse_declarations(reader, opening.number, &config.blocks)?;
    if !title.contains_key("client") {
        if let Some(company) = title.get("company").cloned() {
            title.insert("client", company);
        }
    }
    for field in TITLE_FIELDS {
        if !title.contains_key(field) {
            return Err(ConvertError::MissingField {
                record: "title",
                field: *field,
            });
        }
    }
    debug!(fields = title.len(), "parsed title block");
    Ok(title)
}

/// Read raw lines up to the closing fence.
fn read_fenced<R: BufRead>(
    reader: &mut LineReader<R>,
    opened_at: usize,
) -> Result<Vec<String>, ConvertError> {
    let mut lines = Vec::new();
    loop {
        match reader.next_line()? {
            Some(line) if is_fence_close(&line.text) => return Ok(lines),
            Some(line) => lines.push(line.text),
            None => {
                error!(line = opened_at, "fenced block is never closed");
                return Err(ConvertError::UnterminatedFence { line: opened_at });
            }
        }
    }
}

fn parse_record<R: BufRead>(
    reader: &mut LineReader<R>,
    opened_at: usize,
    kind: RecordKind,
    config: &Config,
) -> Result<Block, ConvertError> {
    let fields = parse_declarations(reader, opened_at, &config.blocks)?;
    if let Some(field) = kind
        .required_fields()
        .iter()
        .find(|field| !fields.contains_key(field))
    {
        return Err(ConvertError::MissingField {
            record: kind.name(),
            field: *field,
        });
    }
    Ok(Block::Record { kind, fields })
}

fn parse_fence<R: BufRead>(
    reader: &mut LineReader<R>,
    opening: &Line,
    config: &Config,
) -> Result<Block, ConvertError> {
    let tag = opening.text[FENCE.len()..].trim();
    match tag {
        "vuln" => parse_record(reader, opening.number, RecordKind::Vulnerability, config),
        "figure" => parse_record(reader, opening.number, RecordKind::Figure, config),
        "inline" => Ok(Block::Passthrough {
            lines: read_fenced(reader, opening.number)?,
        }),
        _ => Ok(Block::CodeBlock {
            language: (!tag.is_empty()).then(|| tag.to_owned()),
            lines: read_fenced(reader, opening.number)?,
        }),
    }
}

/// Up to three leading `#` set the level; any further `#` stay in the title.
fn parse_heading(text: &str) -> Result<Block, ConvertError> {
    let level = text.bytes().take(3).take_while(|b| *b == b'#').count();
    let title = text[level..].trim();
    Ok(Block::Heading {
        level: level as u8,
        title: tokenize(title)?,
        label: format!("{SECTION_PREFIX}{}", slugify(title)),
    })
}

fn list_start(text: &str) -> Option<Ordering> {
    if unordered_item(text).is_some() {
        Some(Ordering::Unordered)
    } else if ordered_item(text).is_some() {
        Some(Ordering::Ordered)
    } else {
        None
    }
}

/// Dispatch body lines to block parsers until end of input.
fn parse_blocks<R: BufRead>(
    reader: &mut LineReader<R>,
    config: &Config,
) -> Result<Vec<Block>, ConvertError> {
    let mut blocks = Vec::new();
    // Line handed back by a list that stopped at it
    let mut pending = None;
    let mut blank_run = 0;

    loop {
        let line = match pending.take() {
            Some(line) => line,
            None => match reader.next_line()? {
                Some(line) => line,
                None => break,
            },
        };

        if line.text.trim().is_empty() {
            blank_run += 1;
            continue;
        }
        if blank_run > 0 {
            blocks.push(Block::BlankRun { count: blank_run });
            blank_run = 0;
        }

        let text = line.text.as_str();
        let block = if text.starts_with('#') {
            parse_heading(text)?
        } else if text.starts_with(FENCE) {
            parse_fence(reader, &line, config)?
        } else if let Some(ordering) = list_start(text) {
            let (list, next) = parse_list(reader, line, 0, ordering)?;
            pending = next;
            Block::List(list)
        } else {
            Block::Paragraph {
                content: tokenize(text)?,
            }
        };
        debug!(?block, "parsed block");
        blocks.push(block);
    }

    if blank_run > 0 {
        blocks.push(Block::BlankRun { count: blank_run });
    }
    Ok(blocks)
}
