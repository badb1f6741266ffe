use thiserror::Error;

use crate::compiler::syntax::Syntax;
use crate::construct::trace::Trace;

/// Unifies the two error tiers (`Syntax` for lexing/parsing, `Trace` for
/// evaluation) plus the host-level failures that only make sense once a
/// program is run against a real image, for the CLI's `main` to report.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] Syntax),

    #[error(transparent)]
    Trace(#[from] Trace),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
