//! Heap value representation for the interpreter.
//!
//! Every Lisp value lives on the garbage-collected heap as a [`GcObject`]:
//! a tagged [`Value`], a tri-state mark, and the intrusive link that
//! threads the object onto the runtime's allocation list. References
//! between values are raw [`GcRef`] pointers owned collectively by the
//! heap; the collector, not the borrow checker, is responsible for their
//! lifetimes, because closures capture scopes that can reach the closure
//! again and reference counting cannot reclaim such cycles.

pub mod heap;
pub mod objects;

pub use heap::Heap;
pub use objects::*;

use std::collections::HashMap;

use crate::error::Result;
use crate::eval::Runtime;

/// Reference to a heap-allocated value.
pub type GcRef = *mut GcObject;

/// GC mark states. `Queued` keeps the mark worklist from revisiting a
/// value that is already scheduled for traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Unmarked,
    Queued,
    Marked,
}

/// A heap cell: the value, its mark, and the intrusive allocation-list
/// link (null at the tail).
pub struct GcObject {
    pub value: Value,
    pub mark: Mark,
    pub next: GcRef,
}

/// Host function implementing a builtin operator. Receives the runtime,
/// the scope of the call site, and the argument list.
pub type BuiltinFn = fn(&mut Runtime, GcRef, GcRef) -> Result<GcRef>;

/// Distinguishes ordinary functions from macros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LambdaKind {
    Function,
    Macro,
}

/// Callable values: host builtins and user lambdas.
pub enum Callable {
    /// Host-implemented operator. `eval_args` is false for special forms,
    /// which receive their argument list unevaluated.
    Builtin {
        name: &'static str,
        func: BuiltinFn,
        eval_args: bool,
    },
    /// User function or macro: parameter symbol list, body, captured
    /// scope. All three are heap values followed by the mark phase, so a
    /// lambda keeps its closure alive.
    Lambda {
        kind: LambdaKind,
        params: GcRef,
        body: GcRef,
        closure: GcRef,
    },
}

/// A lexical environment: identity-keyed symbol bindings plus an optional
/// parent. Scopes are ordinary heap values so the collector can follow
/// the chains that closures capture; Lisp code sees them as opaque.
pub struct Scope {
    pub bindings: HashMap<GcRef, GcRef>,
    pub parent: Option<GcRef>,
}

/// The value variants of the language.
pub enum Value {
    /// Signed machine-word integer.
    Int(i64),
    /// Immutable byte sequence.
    Str(String),
    /// A name. Instances created through the interning interface are
    /// shared per heap.
    Symbol(String),
    /// Cons cell: left (car) and right (cdr).
    Pair(GcRef, GcRef),
    /// The empty list, unique per heap; doubles as the false sentinel.
    Nil,
    Callable(Callable),
    Scope(Scope),
}

impl Value {
    /// Visit every value directly referenced by `self`. This is the mark
    /// phase's traversal source; anything not visited here is sweepable.
    pub fn each_child(&self, visit: &mut dyn FnMut(GcRef)) {
        match self {
            Value::Pair(left, right) => {
                visit(*left);
                visit(*right);
            }
            Value::Callable(Callable::Lambda {
                params,
                body,
                closure,
                ..
            }) => {
                visit(*params);
                visit(*body);
                visit(*closure);
            }
            Value::Scope(scope) => {
                for (sym, val) in scope.bindings.iter() {
                    visit(*sym);
                    visit(*val);
                }
                if let Some(parent) = scope.parent {
                    visit(parent);
                }
            }
            _ => {}
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Str(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Pair(_, _) | Value::Nil => "list",
            Value::Callable(_) => "callable",
            Value::Scope(_) => "scope",
        }
    }
}

#[macro_export]
macro_rules! gc_value {
    ($r:expr) => {{
        // SAFETY: caller must ensure $r points into a live heap
        unsafe { &(*$r).value }
    }};
}
