//! Convert lightweight report markup into a LaTeX `report` document.
//!
//! Input opens with a title declaration fence and continues with headings,
//! lists, paragraphs, and fenced blocks (code listings, raw LaTeX, and
//! vulnerability or figure records). All user text passes through the
//! [`Markup`] taint guard, so nothing reaches the output unescaped.

mod block;
mod config;
mod declaration;
mod error;
mod escape;
mod inline;
mod latex;
mod list;
mod markup;
mod parser;
mod slug;
mod template;

pub use block::{Block, Document, List, ListNode, Ordering, RecordKind};
pub use config::{BlocksConfig, Config, RatingsConfig};
pub use error::ConvertError;
pub use escape::escape;
pub use inline::{RefKind, Span, format_inline, render_span, render_spans, tokenize};
pub use latex::{render_block, render_preamble};
pub use markup::Markup;
pub use slug::slugify;
pub use template::{PlaceholderMap, resolve, resolve_optional, resolve_with};

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

/// Parse report markup into a title declaration and body blocks.
pub fn parse<R: BufRead>(input: R, config: &Config) -> Result<Document, ConvertError> {
    parser::parse(input, config)
}

/// Convert report markup read from `input` into LaTeX written to `output`.
///
/// The whole input is parsed before anything is written, so a parse error
/// leaves `output` untouched.
pub fn convert<R: BufRead, W: Write + ?Sized>(
    input: R,
    output: &mut W,
    config: &Config,
) -> Result<(), ConvertError> {
    let document = parse(input, config)?;
    latex::write_document(&document, config, output)
}

/// Convert report markup held in memory.
pub fn convert_str(markup: &str, config: &Config) -> Result<String, ConvertError> {
    let mut out = Vec::new();
    convert(markup.as_bytes(), &mut out, config)?;
    // Every piece of output is either input text or a UTF-8 literal
    String::from_utf8(out).map_err(|e| ConvertError::Io(std::io::Error::other(e)))
}

/// Convert the file at `input` and write the result to `output`.
///
/// The result goes to a temporary file next to `output` that only replaces
/// it once conversion has succeeded.
pub fn convert_file(input: &Path, output: &Path, config: &Config) -> Result<(), ConvertError> {
    let reader = BufReader::new(File::open(input)?);

    let dir = output
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        convert(reader, &mut writer, config)?;
        writer.flush()?;
    }
    staged.persist(output).map_err(|e| e.error)?;

    info!(input = %input.display(), output = %output.display(), "converted");
    Ok(())
}
