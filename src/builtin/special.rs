//! Special forms: builtins that receive their arguments unevaluated.

use crate::builtin::get_args;
use crate::env::scope_bind;
use crate::error::{ErrKind, LispError, Result};
use crate::eval::Runtime;
use crate::gc::{list_to_vec, matches_sym, new_lambda, new_pair, GcRef, LambdaKind, Value};
use crate::gc_value;

/// `(quote x)`: return `x` untouched.
pub fn quote(rt: &mut Runtime, _scope: GcRef, args: GcRef) -> Result<GcRef> {
    let argv = get_args(&rt.heap, args, "*")?;
    Ok(argv[0])
}

/// `(unquote x)`: evaluate `x`; outside a quasiquote this is plain
/// evaluation.
pub fn unquote(rt: &mut Runtime, scope: GcRef, args: GcRef) -> Result<GcRef> {
    let argv = get_args(&rt.heap, args, "*")?;
    rt.eval(scope, argv[0])
}

/// `(quasiquote x)`: copy `x`, evaluating every `(unquote …)` form.
pub fn quasiquote(rt: &mut Runtime, scope: GcRef, args: GcRef) -> Result<GcRef> {
    let argv = get_args(&rt.heap, args, "*")?;
    quasi_walk(rt, scope, argv[0])
}

/// Rebuild the tree, replacing each pair headed by the `unquote` symbol
/// with its evaluation. Fresh pairs are built rather than rewriting in
/// place, so an input tree shared with other code is left intact.
fn quasi_walk(rt: &mut Runtime, scope: GcRef, v: GcRef) -> Result<GcRef> {
    let (left, right) = match gc_value!(v) {
        Value::Pair(left, right) => (*left, *right),
        _ => return Ok(v),
    };
    if matches_sym(&rt.heap, left, "unquote") {
        return rt.eval(scope, v);
    }
    let left = quasi_walk(rt, scope, left)?;
    let right = quasi_walk(rt, scope, right)?;
    Ok(new_pair(&mut rt.heap, left, right))
}

/// `(lambda (a …) body …)`: capture the current scope in an ordinary
/// function.
pub fn lambda(rt: &mut Runtime, scope: GcRef, args: GcRef) -> Result<GcRef> {
    make_lambda(rt, scope, args, LambdaKind::Function)
}

/// `(macro (a …) body …)`: as `lambda`, but arguments arrive
/// unevaluated and the result is evaluated again at the call site.
pub fn macro_form(rt: &mut Runtime, scope: GcRef, args: GcRef) -> Result<GcRef> {
    make_lambda(rt, scope, args, LambdaKind::Macro)
}

fn make_lambda(rt: &mut Runtime, scope: GcRef, args: GcRef, kind: LambdaKind) -> Result<GcRef> {
    let argv = get_args(&rt.heap, args, "lR")?;
    let (params, body) = (argv[0], argv[1]);
    for param in list_to_vec(&rt.heap, params)? {
        if !matches!(rt.heap.get(param), Value::Symbol(_)) {
            return Err(LispError::new(
                ErrKind::Type,
                "argument names must be symbols",
            ));
        }
    }
    Ok(new_lambda(&mut rt.heap, kind, params, body, scope))
}

/// `(define name expr)`: bind `name` in the current scope to the value
/// of `expr`; returns the value.
pub fn define(rt: &mut Runtime, scope: GcRef, args: GcRef) -> Result<GcRef> {
    let argv = get_args(&rt.heap, args, "s*")?;
    let value = rt.eval(scope, argv[1])?;
    scope_bind(&mut rt.heap, scope, argv[0], value);
    Ok(value)
}

/// `(if cond t e)`: only a non-zero integer selects the true branch.
pub fn if_form(rt: &mut Runtime, scope: GcRef, args: GcRef) -> Result<GcRef> {
    let argv = get_args(&rt.heap, args, "***")?;
    let cond = rt.eval(scope, argv[0])?;
    let truthy = matches!(rt.heap.get(cond), Value::Int(x) if *x != 0);
    if truthy {
        rt.eval(scope, argv[1])
    } else {
        rt.eval(scope, argv[2])
    }
}

/// `(progn e …)`: evaluate in order, return the last result.
pub fn progn(rt: &mut Runtime, scope: GcRef, args: GcRef) -> Result<GcRef> {
    rt.progn(scope, args)
}
