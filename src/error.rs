//! Error type shared by every stage of a conversion.

/// Error raised while converting a document.
///
/// Every variant aborts the whole conversion; nothing is recovered and no
/// partial output is kept.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The first non-blank line is not a title declaration fence.
    #[error("title block must be at start of file")]
    MissingTitleBlock,

    /// A declaration line does not split into exactly one key and one value.
    #[error("line {line}: malformed declaration: {text:?}")]
    MalformedDeclaration { line: usize, text: String },

    /// An indented list line whose nested content cannot be classified.
    #[error("line {line}: malformed list item: {text:?}")]
    MalformedList { line: usize, text: String },

    /// Input ended inside a fenced block.
    #[error("line {line}: fenced block is never closed")]
    UnterminatedFence { line: usize },

    /// A structured record lacks one of its required fields.
    #[error("{record} record is missing required field `{field}`")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    /// The inline grammar produced a match no span kind accounts for.
    #[error("unknown inline token `{0}`")]
    UnknownInlineToken(String),

    /// An unescaped string reached an operation that only accepts safe text.
    #[error("taint violation: attempted {0} with an unsafe string")]
    TaintViolation(&'static str),

    /// Configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Reading input or writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for ConvertError {
    fn from(e: toml::de::Error) -> Self {
        ConvertError::Config(e.to_string())
    }
}
