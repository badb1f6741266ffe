//! Host-provided callables. Grounded on passerine's `core::ffi::FFIFunction`
//! / `FFI` dispatch table (core/ffi.rs), generalized because two of these
//! (`loadColor`, `loadRef`) resolve against the grid bound at the root
//! environment rather than being pure value-in/value-out functions.

use std::rc::Rc;

use log::warn;

use crate::common::span::Span;
use crate::construct::environment::Environment;
use crate::construct::grid::{GridHandle, Snapshot};
use crate::construct::trace::{ErrorKind, Trace};
use crate::construct::value::Value;

pub mod math;
pub mod pixel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeFn {
    Rgb,
    LoadColor,
    MakeRef,
    LoadRef,
    Sqrt,
}

impl NativeFn {
    pub fn name(self) -> &'static str {
        match self {
            NativeFn::Rgb => "rgb",
            NativeFn::LoadColor => "loadColor",
            NativeFn::MakeRef => "makeRef",
            NativeFn::LoadRef => "loadRef",
            NativeFn::Sqrt => "sqrt",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            NativeFn::Rgb => 3,
            NativeFn::LoadColor => 2,
            NativeFn::MakeRef => 0,
            NativeFn::LoadRef => 2,
            NativeFn::Sqrt => 1,
        }
    }

    const ALL: [NativeFn; 5] = [NativeFn::Rgb, NativeFn::LoadColor, NativeFn::MakeRef, NativeFn::LoadRef, NativeFn::Sqrt];
}

/// Binds `pixels`, `width`, `height`, and every native function into `root`,
/// exactly once, before a program runs (spec.md §4.6).
pub fn install(root: &Environment, grid: GridHandle, width: i64, height: i64) {
    root.define("pixels", Value::Grid(grid));
    root.define("width", Value::Int(width));
    root.define("height", Value::Int(height));
    for native in NativeFn::ALL {
        root.define(native.name(), Value::Native(native));
    }
}

/// Dispatches a native call. `grid` is always the root-bound grid handle, not
/// whatever the calling scope's `pixels` binding resolves to — `loadColor`
/// and `loadRef` are the one place host bindings deliberately bypass lexical
/// scoping (spec.md §4.6, §9 Open Questions).
pub fn call(
    native: NativeFn,
    args: Vec<Value>,
    span: &Span,
    root: &Environment,
    grid: &GridHandle,
    snapshot: &mut Option<Rc<Snapshot>>,
) -> Result<Value, Trace> {
    if args.len() != native.arity() {
        return Err(Trace::new(ErrorKind::ArityError { expected: native.arity(), got: args.len() }, span.clone()));
    }
    if matches!(native, NativeFn::LoadColor | NativeFn::LoadRef) {
        warn!("{} resolves against the root environment, bypassing the calling scope", native.name());
    }
    match native {
        NativeFn::Rgb => pixel::rgb(args, span),
        NativeFn::LoadColor => pixel::load_color(args, span, root, grid),
        NativeFn::MakeRef => pixel::make_ref(span, grid, snapshot),
        NativeFn::LoadRef => pixel::load_ref(args, span, root, snapshot),
        NativeFn::Sqrt => math::sqrt(args, span),
    }
}
