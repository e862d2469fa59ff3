use std::fmt;
use std::io;

use thiserror::Error;

use crate::TypeId;

/// One step of the location trail attached to an error while it propagates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Context {
    /// Inside the payload of a named tag.
    Tag { id: TypeId, name: String },
    /// Inside a record field, by its resolved wire name.
    Field(String),
    /// Inside a list or array element.
    Index(usize),
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Tag { id, name } => write!(f, "{id} '{name}'"),
            Context::Field(name) => write!(f, "field '{name}'"),
            Context::Index(index) => write!(f, "index {index}"),
        }
    }
}

/// Renders a context stack outermost first.
struct Trail<'a>(&'a [Context]);

impl fmt::Display for Trail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        f.write_str(" (in ")?;
        for (i, ctx) in self.0.iter().rev().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "{ctx}")?;
        }
        f.write_str(")")
    }
}

/// Specific kinds of errors that can occur when decoding NBT data or mapping
/// a decoded tree onto a native type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("truncated input: need {needed} bytes, have {available}")]
    TruncatedInput { needed: usize, available: usize },

    #[error("unknown type code: {0:#04x}")]
    UnknownTypeCode(u8),

    #[error("invalid UTF-8 in string")]
    InvalidUtf8,

    #[error("list of End tags declares {0} elements")]
    NonEmptyEndList(u32),

    #[error("nesting depth exceeds the limit of {0}")]
    DepthLimitExceeded(usize),

    #[error("kind mismatch: expected {expected}, got {actual}")]
    KindMismatch { expected: TypeId, actual: TypeId },

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),

    #[error("{value} does not fit in {target}")]
    IntegerOutOfRange { value: i64, target: &'static str },

    #[error("{bytes_remaining} bytes left after the root tag")]
    ExtraData { bytes_remaining: usize },

    #[error("{path} is not a compound")]
    QueryNotCompound { path: String },

    #[error("can't find {path}")]
    QueryNotFound { path: String },

    #[error("I/O error: {message}")]
    Io { kind: io::ErrorKind, message: String },
}

/// Error type returned when decoding or unmarshaling NBT data fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error: {kind}{}", Trail(.context))]
pub struct ParseError {
    /// The root cause.
    kind: ParseErrorKind,
    /// Location trail, innermost first.
    context: Vec<Context>,
}

impl ParseError {
    /// Creates a new ParseError with the given kind and no context.
    pub const fn new(kind: ParseErrorKind) -> Self {
        Self {
            kind,
            context: Vec::new(),
        }
    }

    pub(crate) fn io(err: &io::Error) -> Self {
        Self::new(ParseErrorKind::Io {
            kind: err.kind(),
            message: err.to_string(),
        })
    }

    /// Returns the specific kind of parse error that occurred.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// Returns the location trail, innermost first.
    pub fn context(&self) -> &[Context] {
        &self.context
    }

    /// Wraps the error with one more (outer) location.
    pub fn with_context(mut self, ctx: Context) -> Self {
        self.context.push(ctx);
        self
    }
}

impl From<ParseErrorKind> for ParseError {
    fn from(kind: ParseErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result type for decoding and unmarshaling operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Specific kinds of errors that can occur when encoding tags or marshaling
/// native values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteErrorKind {
    #[error("{0} has no tag mapping")]
    UnsupportedShape(&'static str),

    #[error("cannot infer the element type of an empty sequence")]
    EmptySequenceUnsupported,

    #[error("string of {0} bytes exceeds the maximum of 65535")]
    StringTooLong(usize),

    #[error("{0} elements exceed the maximum count of u32::MAX")]
    ContentTooLarge(usize),

    #[error("list element {index} is {actual}, but the list holds {expected}")]
    ListElementMismatch {
        index: usize,
        expected: TypeId,
        actual: TypeId,
    },

    #[error("nesting depth exceeds the limit of {0}")]
    DepthLimitExceeded(usize),

    #[error("I/O error: {message}")]
    Io { kind: io::ErrorKind, message: String },
}

/// Error type returned when encoding or marshaling to NBT fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("write error: {kind}{}", Trail(.context))]
pub struct WriteError {
    kind: WriteErrorKind,
    context: Vec<Context>,
}

impl WriteError {
    /// Creates a new WriteError with the given kind and no context.
    pub const fn new(kind: WriteErrorKind) -> Self {
        Self {
            kind,
            context: Vec::new(),
        }
    }

    pub(crate) fn io(err: &io::Error) -> Self {
        Self::new(WriteErrorKind::Io {
            kind: err.kind(),
            message: err.to_string(),
        })
    }

    /// Returns the specific kind of write error that occurred.
    pub fn kind(&self) -> &WriteErrorKind {
        &self.kind
    }

    /// Returns the location trail, innermost first.
    pub fn context(&self) -> &[Context] {
        &self.context
    }

    /// Wraps the error with one more (outer) location.
    pub fn with_context(mut self, ctx: Context) -> Self {
        self.context.push(ctx);
        self
    }
}

impl From<WriteErrorKind> for WriteError {
    fn from(kind: WriteErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result type for encoding and marshaling operations.
pub type WriteResult<T> = Result<T, WriteError>;

#[cfg(test)]
mod tests {
    use super::{Context, ParseError, ParseErrorKind, WriteError, WriteErrorKind};
    use crate::TypeId;

    #[test]
    fn test_display_without_context() {
        let err = ParseError::new(ParseErrorKind::UnknownTypeCode(0x2A));
        assert_eq!(err.to_string(), "parse error: unknown type code: 0x2a");
    }

    #[test]
    fn test_display_outermost_first() {
        let err = ParseError::new(ParseErrorKind::TruncatedInput {
            needed: 4,
            available: 1,
        })
        .with_context(Context::Index(2))
        .with_context(Context::Tag {
            id: TypeId::List,
            name: "pos".to_string(),
        })
        .with_context(Context::Tag {
            id: TypeId::Compound,
            name: "".to_string(),
        });

        assert_eq!(
            err.to_string(),
            "parse error: truncated input: need 4 bytes, have 1 (in Compound '' > List 'pos' > index 2)"
        );
        assert_eq!(err.context()[0], Context::Index(2));
    }

    #[test]
    fn test_write_error_field_context() {
        let err = WriteError::new(WriteErrorKind::EmptySequenceUnsupported)
            .with_context(Context::Field("items".to_string()));
        assert_eq!(err.kind(), &WriteErrorKind::EmptySequenceUnsupported);
        assert_eq!(
            err.to_string(),
            "write error: cannot infer the element type of an empty sequence (in field 'items')"
        );
    }
}
