use thiserror::Error;

use crate::reflect::Kind;
use crate::value::{Value, ValueType};

/// Root-cause classification of a [`MarshalError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong top-level value category.
    Shape,
    /// Wrong dynamic category for a declared kind.
    TypeMismatch,
    /// A kind the marshaler cannot express.
    UnsupportedType,
    /// Non-string map key on decode.
    UnsupportedKey,
}

/// Decode/encode failure.
///
/// Each enclosing frame wraps the error it got with its own position, so the
/// rendered message reads as a path from the top-level record down to the
/// offending value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarshalError {
    #[error("{0}")]
    Shape(String),

    #[error("expected {expected} for {kind} field, got {actual}")]
    TypeMismatch {
        kind: Kind,
        expected: ValueType,
        actual: &'static str,
    },

    #[error("unsupported field type {0}")]
    UnsupportedType(&'static str),

    #[error("map keys must be strings, got {0}")]
    UnsupportedKey(&'static str),

    #[error("error setting field '{name}' at index {index}: {source}")]
    DecodeField {
        name: &'static str,
        index: usize,
        source: Box<MarshalError>,
    },

    #[error("error encoding field '{name}' at index {index}: {source}")]
    EncodeField {
        name: &'static str,
        index: usize,
        source: Box<MarshalError>,
    },

    #[error("error at array index {index}: {source}")]
    Element {
        index: usize,
        source: Box<MarshalError>,
    },

    #[error("error at map key '{key}': {source}")]
    Entry {
        key: String,
        source: Box<MarshalError>,
    },

    #[error("error processing array element at index {index}: {source}")]
    EncodeElement {
        index: usize,
        source: Box<MarshalError>,
    },

    #[error("error processing map value for key '{key}': {source}")]
    EncodeEntry {
        key: String,
        source: Box<MarshalError>,
    },

    #[error("error processing nested record: {source}")]
    NestedRecord { source: Box<MarshalError> },
}

impl MarshalError {
    pub(crate) fn mismatch(kind: Kind, expected: ValueType, actual: &Value) -> Self {
        MarshalError::TypeMismatch {
            kind,
            expected,
            actual: actual.type_label(),
        }
    }

    /// The innermost error, with every positional wrapper peeled off.
    pub fn root(&self) -> &MarshalError {
        match self {
            MarshalError::DecodeField { source, .. }
            | MarshalError::EncodeField { source, .. }
            | MarshalError::Element { source, .. }
            | MarshalError::Entry { source, .. }
            | MarshalError::EncodeElement { source, .. }
            | MarshalError::EncodeEntry { source, .. }
            | MarshalError::NestedRecord { source } => source.root(),
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            MarshalError::Shape(_) => ErrorKind::Shape,
            MarshalError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            MarshalError::UnsupportedKey(_) => ErrorKind::UnsupportedKey,
            // root() never stops on a wrapper
            _ => ErrorKind::UnsupportedType,
        }
    }
}
