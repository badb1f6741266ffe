use thiserror::Error;

use crate::common::span::Span;

/// The runtime counterpart to `compiler::syntax::Syntax`: an error raised
/// while evaluating an already-parsed program, rather than while lexing or
/// parsing it. Mirrors passerine's own `Syntax`/`Trace` split between
/// compile-time and runtime failures.
#[derive(Debug, Error, PartialEq)]
#[error("{span}: {kind}")]
pub struct Trace {
    pub kind: ErrorKind,
    pub span: Span,
}

impl Trace {
    pub fn new(kind: ErrorKind, span: Span) -> Trace {
        Trace { kind, span }
    }
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ErrorKind {
    #[error("name '{0}' is not defined")]
    NameError(String),

    #[error("type error: {0}")]
    TypeError(String),

    #[error("expected {expected} argument(s), got {got}")]
    ArityError { expected: usize, got: usize },

    #[error("index out of bounds: ({x}, {y})")]
    IndexError { x: i64, y: i64 },

    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid assignment target: {0}")]
    AssignTargetError(String),

    #[error("exceeded the maximum of {0} evaluation steps")]
    StepLimit(u64),
}
