//! Scope operations: binding, lookup, and child creation.
//!
//! A scope is an ordinary heap value (`Value::Scope`) holding
//! identity-keyed symbol bindings and an optional parent link. Keeping
//! scopes on the heap lets the collector follow closure captures and
//! recursive bindings; no reference counting is involved.

use crate::error::{ErrKind, LispError, Result};
use crate::gc::{new_scope, GcRef, Heap, Value};

/// Bind `symbol` to `value` in `scope` itself, shadowing any outer
/// binding of the same symbol.
pub fn scope_bind(heap: &mut Heap, scope: GcRef, symbol: GcRef, value: GcRef) {
    match heap.get_mut(scope) {
        Value::Scope(s) => {
            s.bindings.insert(symbol, value);
        }
        _ => debug_assert!(false, "scope_bind on a non-scope value"),
    }
}

/// Look `symbol` up through the scope chain, innermost first.
pub fn scope_lookup(heap: &Heap, mut scope: GcRef, symbol: GcRef) -> Result<GcRef> {
    loop {
        match heap.get(scope) {
            Value::Scope(s) => {
                if let Some(value) = s.bindings.get(&symbol) {
                    return Ok(*value);
                }
                match s.parent {
                    Some(parent) => scope = parent,
                    None => break,
                }
            }
            _ => return Err(LispError::new(ErrKind::Type, "expected scope")),
        }
    }
    let name = match heap.get(symbol) {
        Value::Symbol(name) => name.clone(),
        _ => return Err(LispError::new(ErrKind::Type, "lookup key must be a symbol")),
    };
    Err(LispError::new(
        ErrKind::UndefinedSymbol,
        format!("symbol not found in scope: {}", name),
    ))
}

/// Create a scope whose parent is `scope`.
pub fn scope_child(heap: &mut Heap, scope: GcRef) -> GcRef {
    new_scope(heap, Some(scope))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc::{new_int, new_string};

    #[test]
    fn bind_and_lookup() {
        let mut heap = Heap::new();
        let scope = new_scope(&mut heap, None);
        let sym = heap.intern_symbol("x");
        let val = new_int(&mut heap, 42);

        scope_bind(&mut heap, scope, sym, val);
        assert_eq!(scope_lookup(&heap, scope, sym).unwrap(), val);
    }

    #[test]
    fn lookup_walks_parent_chain() {
        let mut heap = Heap::new();
        let root = new_scope(&mut heap, None);
        let outer_sym = heap.intern_symbol("outer");
        let outer_val = new_string(&mut heap, "hello");
        scope_bind(&mut heap, root, outer_sym, outer_val);

        let child = scope_child(&mut heap, root);
        let grandchild = scope_child(&mut heap, child);
        assert_eq!(scope_lookup(&heap, grandchild, outer_sym).unwrap(), outer_val);
    }

    #[test]
    fn inner_binding_shadows_outer() {
        let mut heap = Heap::new();
        let root = new_scope(&mut heap, None);
        let sym = heap.intern_symbol("x");
        let outer_val = new_int(&mut heap, 1);
        let inner_val = new_int(&mut heap, 2);
        scope_bind(&mut heap, root, sym, outer_val);

        let child = scope_child(&mut heap, root);
        scope_bind(&mut heap, child, sym, inner_val);

        assert_eq!(scope_lookup(&heap, child, sym).unwrap(), inner_val);
        assert_eq!(scope_lookup(&heap, root, sym).unwrap(), outer_val);
    }

    #[test]
    fn missing_symbol_is_undefined() {
        let mut heap = Heap::new();
        let scope = new_scope(&mut heap, None);
        let sym = heap.intern_symbol("nope");
        let err = scope_lookup(&heap, scope, sym).unwrap_err();
        assert_eq!(err.kind, ErrKind::UndefinedSymbol);
        assert!(err.message.contains("nope"));
    }
}
