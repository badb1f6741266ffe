use std::rc::Rc;

use crate::common::span::Span;
use crate::construct::environment::Environment;
use crate::construct::grid::{GridHandle, Snapshot};
use crate::construct::trace::{ErrorKind, Trace};
use crate::construct::value::Value;

fn expect_component(value: &Value, span: &Span) -> Result<u8, Trace> {
    let n = value
        .as_number()
        .ok_or_else(|| Trace::new(ErrorKind::TypeError(format!("rgb expects numbers, got {}", value.type_name())), span.clone()))?;
    Ok(n.round().clamp(0.0, 255.0) as u8)
}

fn expect_index(value: &Value, span: &Span) -> Result<i64, Trace> {
    match value {
        Value::Int(i) => Ok(*i),
        other => Err(Trace::new(ErrorKind::TypeError(format!("expected an integer index, got {}", other.type_name())), span.clone())),
    }
}

/// Binds the components of a just-read pixel into `r`/`g`/`b` at the root
/// environment, per spec.md §4.6 — not wherever `loadColor`/`loadRef` happen
/// to be called from.
fn bind_components(root: &Environment, r: u8, g: u8, b: u8) {
    let root = root.root_of();
    root.define("r", Value::Int(r as i64));
    root.define("g", Value::Int(g as i64));
    root.define("b", Value::Int(b as i64));
}

/// `rgb(r, g, b)` — builds a pixel triple, clamping each component to the
/// `u8` range rather than erroring, so overflowing intermediate arithmetic
/// (e.g. a brightened channel past 255) saturates instead of crashing the
/// program.
pub fn rgb(args: Vec<Value>, span: &Span) -> Result<Value, Trace> {
    let r = expect_component(&args[0], span)?;
    let g = expect_component(&args[1], span)?;
    let b = expect_component(&args[2], span)?;
    Ok(Value::Pixel(r, g, b))
}

/// `loadColor(x, y)` — reads the live grid (always the grid bound at the
/// root environment, not whatever `pixels` happens to mean in the calling
/// lexical scope) and binds its components into `r`/`g`/`b` at the root
/// environment. Returns `false`; the pixel itself is read back through those
/// three globals, per spec.md §4.6.
pub fn load_color(args: Vec<Value>, span: &Span, root: &Environment, grid: &GridHandle) -> Result<Value, Trace> {
    let x = expect_index(&args[0], span)?;
    let y = expect_index(&args[1], span)?;
    match grid.borrow().get(x, y) {
        Some((r, g, b)) => {
            bind_components(root, r, g, b);
            Ok(Value::Bool(false))
        }
        None => Err(Trace::new(ErrorKind::IndexError { x, y }, span.clone())),
    }
}

/// `makeRef()` — freezes the current contents of the grid into a snapshot,
/// replacing whichever one `loadRef` currently reads through. Returns `true`
/// as an acknowledgment; the snapshot itself isn't a first-class value.
pub fn make_ref(_span: &Span, grid: &GridHandle, snapshot: &mut Option<Rc<Snapshot>>) -> Result<Value, Trace> {
    *snapshot = Some(Rc::new(Snapshot::capture(&*grid.borrow())));
    Ok(Value::Bool(true))
}

/// `loadRef(x, y)` — reads through the most recent `makeRef` snapshot and
/// binds its components into `r`/`g`/`b` at the root environment, the same
/// contract `loadColor` follows. Returns `false`.
pub fn load_ref(args: Vec<Value>, span: &Span, root: &Environment, snapshot: &Option<Rc<Snapshot>>) -> Result<Value, Trace> {
    let x = expect_index(&args[0], span)?;
    let y = expect_index(&args[1], span)?;
    let snapshot = snapshot
        .as_ref()
        .ok_or_else(|| Trace::new(ErrorKind::TypeError("loadRef called before makeRef captured a snapshot".to_string()), span.clone()))?;
    match snapshot.get(x, y) {
        Some((r, g, b)) => {
            bind_components(root, r, g, b);
            Ok(Value::Bool(false))
        }
        None => Err(Trace::new(ErrorKind::IndexError { x, y }, span.clone())),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::source::Source;
    use crate::construct::grid::MemoryGrid;
    use std::cell::RefCell;

    fn here() -> Span {
        Span::point(&Source::inline(""), 1, 0)
    }

    #[test]
    fn rgb_clamps_out_of_range_components() {
        let v = rgb(vec![Value::Int(-10), Value::Int(300), Value::Int(128)], &here()).unwrap();
        assert_eq!(v, Value::Pixel(0, 255, 128));
    }

    #[test]
    fn load_color_binds_r_g_b_at_the_root_and_returns_false() {
        let grid: GridHandle = Rc::new(RefCell::new(MemoryGrid::new(2, 2, (1, 2, 3))));
        let root = Environment::root();
        let v = load_color(vec![Value::Int(0), Value::Int(0)], &here(), &root, &grid).unwrap();
        assert_eq!(v, Value::Bool(false));
        assert_eq!(root.lookup("r"), Some(Value::Int(1)));
        assert_eq!(root.lookup("g"), Some(Value::Int(2)));
        assert_eq!(root.lookup("b"), Some(Value::Int(3)));
    }

    #[test]
    fn load_color_binds_through_a_nested_scope_to_the_root() {
        let grid: GridHandle = Rc::new(RefCell::new(MemoryGrid::new(1, 1, (9, 8, 7))));
        let root = Environment::root();
        let nested = root.child().child();
        load_color(vec![Value::Int(0), Value::Int(0)], &here(), &nested, &grid).unwrap();
        assert_eq!(root.lookup("r"), Some(Value::Int(9)));
        assert_eq!(nested.lookup("g"), Some(Value::Int(8)));
    }

    #[test]
    fn load_color_out_of_bounds_errors() {
        let grid: GridHandle = Rc::new(RefCell::new(MemoryGrid::new(1, 1, (0, 0, 0))));
        let root = Environment::root();
        assert!(load_color(vec![Value::Int(5), Value::Int(5)], &here(), &root, &grid).is_err());
    }

    #[test]
    fn load_ref_without_a_snapshot_errors() {
        let root = Environment::root();
        assert!(load_ref(vec![Value::Int(0), Value::Int(0)], &here(), &root, &None).is_err());
    }

    #[test]
    fn make_ref_then_load_ref_binds_the_frozen_components() {
        let grid: GridHandle = Rc::new(RefCell::new(MemoryGrid::new(1, 1, (5, 5, 5))));
        let root = Environment::root();
        let mut snapshot = None;
        make_ref(&here(), &grid, &mut snapshot).unwrap();
        grid.borrow_mut().set(0, 0, (9, 9, 9));
        let v = load_ref(vec![Value::Int(0), Value::Int(0)], &here(), &root, &snapshot).unwrap();
        assert_eq!(v, Value::Bool(false));
        assert_eq!(root.lookup("r"), Some(Value::Int(5)));
    }
}
