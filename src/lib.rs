//! pixelscript: an embeddable expression language for per-pixel image
//! filters. Mirrors passerine's top-level shape (`common`, `compiler`,
//! `construct`, `core`) plus two modules passerine has no analogue for:
//! `eval` (a tree-walking evaluator, where passerine compiles to bytecode)
//! and `host` (raster image I/O, since passerine never touched images).

pub mod common;
pub mod compiler;
pub mod construct;
pub mod core;
pub mod error;
pub mod eval;
pub mod host;

pub use error::Error;

use std::rc::Rc;

use common::source::Source;
use construct::grid::GridHandle;
use construct::value::Value;
use eval::Evaluator;

/// Parses and runs `source` against `grid`, returning the program's final
/// value. The single entry point both the CLI and the test suite drive
/// through — the counterpart to passerine's old (now-retired) `compile`/`run`
/// pair in its top-level `lib.rs`.
pub fn run(source: Rc<Source>, grid: GridHandle, max_steps: Option<u64>) -> Result<Value, Error> {
    let ast = compiler::parse::parse(source)?;
    let mut evaluator = Evaluator::new(grid, max_steps);
    Ok(evaluator.run(&ast)?)
}
