//! Query error taxonomy.

use serde::Serialize;
use thiserror::Error;

use crate::cache::CacheError;

/// Malformed query syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at byte {position})")]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the text being parsed.
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self { message: message.into(), position }
    }

    /// Shift the position of an error raised while parsing a sub-slice.
    pub(crate) fn offset(mut self, by: usize) -> Self {
        self.position += by;
        self
    }
}

/// A predicate or field could not be evaluated for one document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("cannot compare {left} with {right}")]
    TypeMismatch { left: &'static str, right: &'static str },

    #[error("contains() expects a list, string or mapping, found {0}")]
    NotAContainer(&'static str),
}

/// Everything that can stop a query or drop a document from it.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("evaluation failed for {path}: {source}")]
    Evaluation {
        path: String,
        #[source]
        source: EvalError,
    },

    #[error("{0}")]
    CacheRead(#[source] CacheError),

    #[error("cannot enumerate vault: {0}")]
    StructureScan(#[source] CacheError),
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::Parse(_) => ErrorKind::Parse,
            QueryError::NotFound(_) => ErrorKind::NotFound,
            QueryError::Evaluation { .. } => ErrorKind::Evaluation,
            QueryError::CacheRead(_) => ErrorKind::CacheRead,
            QueryError::StructureScan(_) => ErrorKind::StructureScan,
        }
    }
}

impl From<CacheError> for QueryError {
    fn from(e: CacheError) -> Self {
        match e {
            CacheError::NotFound(path) => QueryError::NotFound(path),
            e @ CacheError::Read { .. } => QueryError::CacheRead(e),
            e @ CacheError::Scan(_) => QueryError::StructureScan(e),
        }
    }
}

/// Serialisable tag for [`QueryError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Parse,
    NotFound,
    Evaluation,
    CacheRead,
    StructureScan,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Parse => "parse",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Evaluation => "evaluation",
            ErrorKind::CacheRead => "cache_read",
            ErrorKind::StructureScan => "structure_scan",
        }
    }
}
