//! Snippet tests for the pixelscript pipeline as a whole, end to end through
//! `pixelscript::run`. Adapted from passerine's own `tests/fledgling.rs`: that
//! harness drove `.pn` fixture files tagged with an expected `Outcome`
//! (success/syntax/trace) through lex -> parse -> desugar -> hoist -> gen ->
//! run. This crate has no desugar/hoist/bytecode-gen stages — it parses
//! straight to a tree and walks it — so the fixture-file machinery doesn't
//! carry over; the three-way split it checked for does, as `Outcome` below.

use std::cell::RefCell;
use std::rc::Rc;

use pixelscript::common::source::Source;
use pixelscript::construct::grid::{GridHandle, MemoryGrid, PixelGrid};
use pixelscript::construct::value::Value;
use pixelscript::Error;

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Success,
    Syntax,
    Trace,
}

fn outcome_of(program: &str, grid: GridHandle) -> Outcome {
    match pixelscript::run(Source::inline(program), grid, None) {
        Ok(_) => Outcome::Success,
        Err(Error::Syntax(_)) => Outcome::Syntax,
        Err(Error::Trace(_)) => Outcome::Trace,
        Err(other) => panic!("unexpected error variant: {}", other),
    }
}

fn blank_grid(width: i64, height: i64) -> GridHandle {
    Rc::new(RefCell::new(MemoryGrid::new(width, height, (0, 0, 0))))
}

#[test]
fn single_pixel_write_succeeds() {
    let grid = blank_grid(4, 4);
    assert_eq!(outcome_of("pixels[0, 0] = rgb(255, 0, 0)", grid.clone()), Outcome::Success);
    assert_eq!(grid.borrow().get(0, 0), Some((255, 0, 0)));
}

#[test]
fn per_pixel_filter_over_the_whole_grid() {
    let grid = blank_grid(2, 2);
    let program = "
        for (y = 0; y < height; y = y + 1) {
            for (x = 0; x < width; x = x + 1) {
                pixels[x, y] = rgb(x * 10, y * 10, 0)
            }
        }
    ";
    assert_eq!(outcome_of(program, grid.clone()), Outcome::Success);
    assert_eq!(grid.borrow().get(1, 1), Some((10, 10, 0)));
    assert_eq!(grid.borrow().get(0, 1), Some((0, 10, 0)));
}

#[test]
fn load_color_binds_r_g_b_globals_instead_of_returning_the_pixel() {
    let grid = blank_grid(1, 1);
    grid.borrow_mut().set(0, 0, (7, 8, 9));
    let program = "loadColor(0, 0); r == 7 && g == 8 && b == 9";
    match pixelscript::run(Source::inline(program), grid, None).unwrap() {
        Value::Bool(b) => assert!(b),
        other => panic!("expected a bool, got {:?}", other),
    }
}

#[test]
fn recursive_fibonacci_closure() {
    let grid = blank_grid(1, 1);
    let program = "fib = lambda(n) if n < 2 n else fib(n - 1) + fib(n - 2); fib(12)";
    assert_eq!(outcome_of(program, grid), Outcome::Success);
}

#[test]
fn division_by_zero_is_a_trace_error() {
    let grid = blank_grid(1, 1);
    assert_eq!(outcome_of("1 // 0", grid), Outcome::Trace);
}

#[test]
fn out_of_bounds_pixel_access_is_a_trace_error() {
    let grid = blank_grid(2, 2);
    assert_eq!(outcome_of("loadColor(10, 10)", grid), Outcome::Trace);
}

#[test]
fn malformed_program_is_a_syntax_error() {
    let grid = blank_grid(1, 1);
    assert_eq!(outcome_of("1 + ", grid), Outcome::Syntax);
}

#[test]
fn an_unknown_operator_run_is_a_syntax_error() {
    let grid = blank_grid(1, 1);
    assert_eq!(outcome_of("a <>< b", grid), Outcome::Syntax);
}

#[test]
fn a_block_does_not_introduce_a_new_scope() {
    let grid = blank_grid(1, 1);
    // If `{ ... }` opened a new scope, the assignment inside it would be
    // invisible afterwards and `x` would still read `1`.
    let program = "x = 1; { x = x + 1; x = x + 1 }; x == 3";
    match pixelscript::run(Source::inline(program), grid, None).unwrap() {
        Value::Bool(b) => assert!(b),
        other => panic!("expected a bool, got {:?}", other),
    }
}

#[test]
fn the_identity_lambda_returns_its_argument() {
    let grid = blank_grid(1, 1);
    let program = "id = lambda(x) x; id(42) == 42";
    match pixelscript::run(Source::inline(program), grid, None).unwrap() {
        Value::Bool(b) => assert!(b),
        other => panic!("expected a bool, got {:?}", other),
    }
}

#[test]
fn for_loop_variable_does_not_leak_past_the_loop() {
    let grid = blank_grid(1, 1);
    // `i` is scoped to the `for`'s own environment, so referencing it
    // afterwards is a name error, not whatever it last held.
    let program = "for (i = 0; i < 3; i = i + 1) { i }; i";
    assert_eq!(outcome_of(program, grid), Outcome::Trace);
}

#[test]
fn operator_precedence_matches_the_fixed_table() {
    let grid = blank_grid(1, 1);
    let program = "1 + 2 * 3 == 7 && 10 - 4 / 2 == 8 && 2 * 3 + 4 * 5 == 26";
    match pixelscript::run(Source::inline(program), grid, None).unwrap() {
        Value::Bool(b) => assert!(b),
        other => panic!("expected a bool, got {:?}", other),
    }
}
