use thiserror::Error;

use crate::common::span::Span;

/// A compile-time error: a malformed token or an unexpected token while
/// parsing. Named after passerine's `compiler::syntax::Syntax`.
#[derive(Debug, Error, PartialEq)]
#[error("{span}: {reason}")]
pub struct Syntax {
    pub reason: String,
    pub span: Span,
}

impl Syntax {
    pub fn error(reason: impl Into<String>, span: Span) -> Syntax {
        Syntax { reason: reason.into(), span }
    }
}
