//! Taint-tracked strings.
//!
//! Every piece of text that ends up in the generated document is a
//! [`Markup`]. A value is either *safe* (a literal template, the output of
//! [`escape`](crate::escape::escape), or something the engine assembled from
//! safe parts) or *raw* (text straight from the input). Combining operations
//! refuse raw operands, and the output sink refuses raw values, so an
//! unescaped control character can only reach the document through one of
//! the crate-internal trusted constructors.

use std::fmt;
use std::io::Write;

use crate::error::ConvertError;

/// A string paired with a verified-safe flag.
#[derive(Clone, PartialEq, Eq)]
pub struct Markup {
    text: String,
    safe: bool,
}

impl Markup {
    /// Wrap a literal template. Literals are written by the engine's authors
    /// and are safe by construction.
    pub fn literal(text: &'static str) -> Self {
        Self::trusted(text.to_owned())
    }

    /// Wrap text taken from the input. The result is unsafe until escaped.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            safe: false,
        }
    }

    /// An empty safe string.
    pub fn empty() -> Self {
        Self::trusted(String::new())
    }

    /// Mark text as safe without escaping it.
    ///
    /// Reserved for the escaper, the template resolver, and content that is
    /// emitted verbatim on purpose (fenced code, pass-through blocks,
    /// verbatim declaration fields).
    pub(crate) fn trusted(text: String) -> Self {
        Self { text, safe: true }
    }

    pub fn is_safe(&self) -> bool {
        self.safe
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Concatenate two safe strings.
    pub fn concat(&self, rhs: &Markup) -> Result<Markup, ConvertError> {
        if !self.safe || !rhs.safe {
            return Err(ConvertError::TaintViolation("concatenation"));
        }
        let mut text = String::with_capacity(self.text.len() + rhs.text.len());
        text.push_str(&self.text);
        text.push_str(&rhs.text);
        Ok(Self::trusted(text))
    }

    /// Append a safe string in place.
    pub fn push(&mut self, rhs: &Markup) -> Result<(), ConvertError> {
        if !self.safe || !rhs.safe {
            return Err(ConvertError::TaintViolation("concatenation"));
        }
        self.text.push_str(&rhs.text);
        Ok(())
    }

    /// Join `items` using `self` as the separator.
    pub fn join<'a, I>(&self, items: I) -> Result<Markup, ConvertError>
    where
        I: IntoIterator<Item = &'a Markup>,
    {
        if !self.safe {
            return Err(ConvertError::TaintViolation("join"));
        }
        let mut text = String::new();
        for (i, item) in items.into_iter().enumerate() {
            if !item.safe {
                return Err(ConvertError::TaintViolation("join"));
            }
            if i > 0 {
                text.push_str(&self.text);
            }
            text.push_str(&item.text);
        }
        Ok(Self::trusted(text))
    }

    /// Replace every occurrence of `from` with a safe candidate.
    pub fn replace(&self, from: &str, to: &Markup) -> Result<Markup, ConvertError> {
        if !self.safe || !to.safe {
            return Err(ConvertError::TaintViolation("replacement"));
        }
        Ok(Self::trusted(self.text.replace(from, &to.text)))
    }

    /// Write the value to an output sink. Only safe values may be emitted.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<(), ConvertError> {
        if !self.safe {
            return Err(ConvertError::TaintViolation("emission"));
        }
        out.write_all(self.text.as_bytes())?;
        Ok(())
    }
}

impl fmt::Debug for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.safe { "Safe" } else { "Raw" };
        write!(f, "{kind}({:?})", self.text)
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
