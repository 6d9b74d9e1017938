//! Builtin operator registration and the declarative argument matcher.
//!
//! Every default operator is a [`Callable::Builtin`] with an explicit
//! "evaluate arguments?" flag; the special forms are simply builtins
//! with the flag off. Builtins validate their own arguments through
//! [`get_args`] rather than ad-hoc matching.
//!
//! [`Callable::Builtin`]: crate::gc::Callable::Builtin

pub mod debug;
pub mod list;
pub mod number;
pub mod special;

use crate::error::{ErrKind, LispError, Result};
use crate::eval::Runtime;
use crate::gc::{new_scope, GcRef, Heap, Value};

/// Register builtin operators into a scope.
///
/// Usage: `register_builtins!(rt, scope, "name" => (function, evals_args), …)`
macro_rules! register_builtins {
    ($rt:expr, $scope:expr, $($name:expr => ($func:expr, $evals:expr)),* $(,)?) => {
        $(
            let sym = $rt.heap.intern_symbol($name);
            let func = crate::gc::new_builtin(&mut $rt.heap, $name, $func, $evals);
            crate::env::scope_bind(&mut $rt.heap, $scope, sym, func);
        )*
    };
}

/// A fresh root scope containing every default operator.
pub fn default_scope(rt: &mut Runtime) -> GcRef {
    let scope = new_scope(&mut rt.heap, None);
    register_builtins!(rt, scope,
        "eval" => (debug::eval, true),
        "car" => (list::car, true),
        "cdr" => (list::cdr, true),
        "quote" => (special::quote, false),
        "cons" => (list::cons, true),
        "lambda" => (special::lambda, false),
        "macro" => (special::macro_form, false),
        "define" => (special::define, false),
        "+" => (number::add, true),
        "-" => (number::sub, true),
        "*" => (number::mul, true),
        "/" => (number::div, true),
        "==" => (number::cmp_eq, true),
        "=" => (number::cmp_eq, true),
        "!=" => (number::cmp_ne, true),
        ">" => (number::cmp_gt, true),
        ">=" => (number::cmp_ge, true),
        "<" => (number::cmp_lt, true),
        "<=" => (number::cmp_le, true),
        "if" => (special::if_form, false),
        "null?" => (list::null_p, true),
        "map" => (list::map, true),
        "reduce" => (list::reduce, true),
        "print" => (debug::print, true),
        "dump-stack" => (debug::dump_stack, true),
        "progn" => (special::progn, false),
        "unquote" => (special::unquote, false),
        "quasiquote" => (special::quasiquote, false),
        "eq?" => (list::eq_p, true),
    );
    scope
}

/// Declarative argument matcher shared by every builtin with a fixed
/// shape.
///
/// Format letters: `d` integer, `l` list, `s` symbol, `S` string, `*`
/// any value, `R` binds the remaining argument list and stops. Missing
/// arguments are `TooFewArgs`, surplus arguments `TooManyArgs`, and a
/// variant mismatch is a `Type` error.
pub fn get_args(heap: &Heap, args: GcRef, format: &str) -> Result<Vec<GcRef>> {
    let mut out = Vec::with_capacity(format.len());
    let mut current = args;
    for spec in format.chars() {
        if spec == 'R' {
            out.push(current);
            return Ok(out);
        }
        let (item, rest) = match heap.get(current) {
            Value::Pair(left, right) => (*left, *right),
            Value::Nil => {
                return Err(LispError::new(
                    ErrKind::TooFewArgs,
                    format!("expected {} arguments, got {}", format.len(), out.len()),
                ))
            }
            _ => return Err(LispError::new(ErrKind::Type, "improper argument list")),
        };
        let ok = match spec {
            'd' => matches!(heap.get(item), Value::Int(_)),
            'l' => matches!(heap.get(item), Value::Pair(_, _) | Value::Nil),
            's' => matches!(heap.get(item), Value::Symbol(_)),
            'S' => matches!(heap.get(item), Value::Str(_)),
            '*' => true,
            _ => {
                return Err(LispError::new(
                    ErrKind::Generic,
                    format!("unknown argument format letter '{}'", spec),
                ))
            }
        };
        if !ok {
            return Err(LispError::new(
                ErrKind::Type,
                format!(
                    "argument {} has wrong type (expected {})",
                    out.len() + 1,
                    match spec {
                        'd' => "integer",
                        'l' => "list",
                        's' => "symbol",
                        _ => "string",
                    }
                ),
            ));
        }
        out.push(item);
        current = rest;
    }
    if !matches!(heap.get(current), Value::Nil) {
        return Err(LispError::new(
            ErrKind::TooManyArgs,
            format!("expected at most {} arguments", format.len()),
        ));
    }
    Ok(out)
}
