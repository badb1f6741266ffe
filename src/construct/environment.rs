use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::construct::value::Value;

struct Scope {
    bindings: HashMap<String, Value>,
    parent: Option<Environment>,
}

/// A lexically-scoped environment: a chain of scopes linked by `parent`
/// pointers, shared via `Rc<RefCell<_>>` so that closures capturing an
/// environment observe later mutations made through any other handle to it.
/// Not reused from passerine's `construct::scope::Scope`, which indexes
/// locals/nonlocals by slot for its bytecode compiler; a tree-walker has no
/// compile-time resolution pass, so this is a plain name -> value chain.
#[derive(Clone)]
pub struct Environment(Rc<RefCell<Scope>>);

impl Environment {
    pub fn root() -> Environment {
        Environment(Rc::new(RefCell::new(Scope { bindings: HashMap::new(), parent: None })))
    }

    /// A new scope nested under `self`, as created on lambda call and `for`
    /// loop entry.
    pub fn child(&self) -> Environment {
        Environment(Rc::new(RefCell::new(Scope { bindings: HashMap::new(), parent: Some(self.clone()) })))
    }

    /// Binds `name` in this scope, shadowing any binding of the same name in
    /// an ancestor scope.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().bindings.insert(name.into(), value);
    }

    /// Walks the parent chain looking for an existing binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let scope = self.0.borrow();
        if let Some(value) = scope.bindings.get(name) {
            return Some(value.clone());
        }
        match &scope.parent {
            Some(parent) => parent.lookup(name),
            None => None,
        }
    }

    /// Assigns to the nearest existing binding of `name` in the chain. If no
    /// ancestor already binds `name`, it is defined fresh in `self` — plain
    /// assignment doubles as implicit declaration, as spec.md §4.3 requires.
    pub fn assign(&self, name: &str, value: Value) {
        if self.assign_existing(name, &value) {
            return;
        }
        self.define(name, value);
    }

    fn assign_existing(&self, name: &str, value: &Value) -> bool {
        let mut scope = self.0.borrow_mut();
        if scope.bindings.contains_key(name) {
            scope.bindings.insert(name.to_string(), value.clone());
            return true;
        }
        match &scope.parent {
            Some(parent) => parent.assign_existing(name, value),
            None => false,
        }
    }

    /// The outermost scope in the chain — where `loadColor`/`loadRef` write
    /// their bindings regardless of the lexical scope they're called from
    /// (spec.md §4.6, an explicit contract rather than an oversight).
    pub fn root_of(&self) -> Environment {
        let scope = self.0.borrow();
        match &scope.parent {
            Some(parent) => parent.root_of(),
            None => self.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lookup_walks_parent_chain() {
        let root = Environment::root();
        root.define("x", Value::Int(1));
        let child = root.child();
        assert_eq!(child.lookup("x"), Some(Value::Int(1)));
    }

    #[test]
    fn assign_mutates_the_defining_scope_not_a_shadow() {
        let root = Environment::root();
        root.define("x", Value::Int(1));
        let child = root.child();
        child.assign("x", Value::Int(2));
        assert_eq!(root.lookup("x"), Some(Value::Int(2)));
        assert_eq!(child.lookup("x"), Some(Value::Int(2)));
    }

    #[test]
    fn assign_with_no_existing_binding_defines_locally() {
        let root = Environment::root();
        let child = root.child();
        child.assign("y", Value::Int(9));
        assert_eq!(root.lookup("y"), None);
        assert_eq!(child.lookup("y"), Some(Value::Int(9)));
    }

    #[test]
    fn root_of_reaches_outermost_scope_through_several_levels() {
        let root = Environment::root();
        let a = root.child();
        let b = a.child();
        root.define("tag", Value::Bool(true));
        b.root_of().assign("tag", Value::Bool(false));
        assert_eq!(root.lookup("tag"), Some(Value::Bool(false)));
    }
}
