//! The tree-walking evaluator and the runtime that hosts it.
//!
//! [`Runtime`] owns the heap and the transient call stack used for
//! diagnostics. Evaluation is synchronous recursion on the host stack:
//! `eval` resolves symbols and dispatches list forms to `call`, which
//! performs argument evaluation (or not, for special forms and macros),
//! parameter binding, and macro re-evaluation. Collection never runs
//! implicitly; the embedder chooses its collection points with
//! [`Runtime::mark`] and [`Runtime::sweep`].

use std::io::Read;

use log::debug;

use crate::builtin;
use crate::env::{scope_bind, scope_child, scope_lookup};
use crate::error::{ErrKind, LispError, Result};
use crate::gc::{list_from_slice, Callable, GcRef, Heap, LambdaKind, Value};
use crate::gc_value;
use crate::parser;
use crate::printer::print_value;

pub struct Runtime {
    pub heap: Heap,
    /// Forms currently being applied, outermost first. Transient within a
    /// top-level `eval` and empty between interactions, so it never needs
    /// to be a GC root.
    stack: Vec<GcRef>,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            heap: Heap::new(),
            stack: Vec::new(),
        }
    }

    /// A fresh scope bound to the full default operator set.
    pub fn default_scope(&mut self) -> GcRef {
        builtin::default_scope(self)
    }

    /// Evaluate `v` in `scope`.
    ///
    /// Integers, strings, callables, scopes, and nil are self-evaluating;
    /// symbols are looked up through the scope chain; a pair is a call.
    pub fn eval(&mut self, scope: GcRef, v: GcRef) -> Result<GcRef> {
        match gc_value!(v) {
            Value::Int(_) | Value::Str(_) | Value::Callable(_) | Value::Scope(_) | Value::Nil => {
                Ok(v)
            }
            Value::Symbol(_) => scope_lookup(&self.heap, scope, v),
            Value::Pair(head, tail) => {
                let (head, tail) = (*head, *tail);
                self.stack.push(v);
                let result = self
                    .eval_form(scope, head, tail)
                    .map_err(|e| self.freeze_stack(e));
                self.stack.pop();
                result
            }
        }
    }

    fn eval_form(&mut self, scope: GcRef, head: GcRef, args: GcRef) -> Result<GcRef> {
        let f = self.eval(scope, head)?;
        if !matches!(gc_value!(f), Value::Callable(_)) {
            return Err(LispError::new(
                ErrKind::NotCallable,
                format!("cannot call value of type {}", gc_value!(f).type_name()),
            ));
        }
        self.call(scope, f, args)
    }

    /// Apply `callable` to the argument list `args`.
    ///
    /// Argument evaluation happens here, governed by the callable:
    /// builtins carry an explicit flag, ordinary lambdas always evaluate,
    /// macros never do and have their result evaluated again in the
    /// caller's scope.
    pub fn call(&mut self, scope: GcRef, callable: GcRef, args: GcRef) -> Result<GcRef> {
        match gc_value!(callable) {
            Value::Callable(Callable::Builtin {
                func, eval_args, ..
            }) => {
                let (func, eval_args) = (*func, *eval_args);
                let args = if eval_args {
                    self.eval_args(scope, args)?
                } else {
                    args
                };
                func(self, scope, args)
            }
            Value::Callable(Callable::Lambda {
                kind,
                params,
                body,
                closure,
            }) => {
                let (kind, params, body, closure) = (*kind, *params, *body, *closure);
                match kind {
                    LambdaKind::Function => {
                        let args = self.eval_args(scope, args)?;
                        let child = self.bind_params(closure, params, args)?;
                        self.progn(child, body)
                    }
                    LambdaKind::Macro => {
                        let child = self.bind_params(closure, params, args)?;
                        let expansion = self.progn(child, body)?;
                        self.eval(scope, expansion)
                    }
                }
            }
            _ => Err(LispError::new(
                ErrKind::NotCallable,
                "cannot call non-callable value",
            )),
        }
    }

    /// Evaluate each element of `args` in source order into a fresh list.
    fn eval_args(&mut self, scope: GcRef, args: GcRef) -> Result<GcRef> {
        let mut out = Vec::new();
        let mut current = args;
        loop {
            match gc_value!(current) {
                Value::Nil => break,
                Value::Pair(left, right) => {
                    let (left, right) = (*left, *right);
                    out.push(self.eval(scope, left)?);
                    current = right;
                }
                _ => {
                    return Err(LispError::new(
                        ErrKind::Type,
                        "improper list in call arguments",
                    ))
                }
            }
        }
        Ok(list_from_slice(&mut self.heap, &out))
    }

    /// Create a child of `closure` binding `params` to `args` positionally.
    fn bind_params(&mut self, closure: GcRef, mut params: GcRef, mut args: GcRef) -> Result<GcRef> {
        let child = scope_child(&mut self.heap, closure);
        loop {
            match (gc_value!(params), gc_value!(args)) {
                (Value::Nil, Value::Nil) => return Ok(child),
                (Value::Nil, _) => {
                    return Err(LispError::new(
                        ErrKind::TooManyArgs,
                        "too many arguments for lambda",
                    ))
                }
                (_, Value::Nil) => {
                    return Err(LispError::new(
                        ErrKind::TooFewArgs,
                        "too few arguments for lambda",
                    ))
                }
                (Value::Pair(param, next_params), Value::Pair(arg, next_args)) => {
                    let (param, arg) = (*param, *arg);
                    let (next_params, next_args) = (*next_params, *next_args);
                    scope_bind(&mut self.heap, child, param, arg);
                    params = next_params;
                    args = next_args;
                }
                _ => {
                    return Err(LispError::new(
                        ErrKind::Type,
                        "improper lambda parameter or argument list",
                    ))
                }
            }
        }
    }

    /// Evaluate each element of `body` in order, returning the last
    /// result; an empty body yields nil.
    pub fn progn(&mut self, scope: GcRef, body: GcRef) -> Result<GcRef> {
        let mut result = self.heap.nil();
        let mut current = body;
        loop {
            match gc_value!(current) {
                Value::Nil => return Ok(result),
                Value::Pair(left, right) => {
                    let (left, right) = (*left, *right);
                    result = self.eval(scope, left)?;
                    current = right;
                }
                _ => {
                    return Err(LispError::new(ErrKind::Type, "improper list in progn body"))
                }
            }
        }
    }

    /// Parse `source` as a progn and evaluate it.
    pub fn eval_str(&mut self, scope: GcRef, source: &str) -> Result<GcRef> {
        let progn = parser::parse_progn(&mut self.heap, source)?;
        self.eval(scope, progn)
    }

    /// Slurp `input`, parse the whole buffer as a progn, and evaluate it.
    pub fn load_file(&mut self, scope: GcRef, mut input: impl Read) -> Result<GcRef> {
        let mut source = String::new();
        input
            .read_to_string(&mut source)
            .map_err(|e| LispError::new(ErrKind::FileIo, format!("error reading input: {}", e)))?;
        debug!("loading {} bytes", source.len());
        self.eval_str(scope, &source)
    }

    /// Mark every value reachable from `root` (collection primitive).
    pub fn mark(&mut self, root: GcRef) {
        self.heap.mark(root);
    }

    /// Free everything unmarked and reset marks (collection primitive).
    pub fn sweep(&mut self) {
        self.heap.sweep();
    }

    /// Render the forms currently being applied, outermost first.
    pub fn stack_trace(&self) -> String {
        self.stack
            .iter()
            .map(|form| format!("  in: {}", print_value(&self.heap, *form)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn freeze_stack(&self, mut e: LispError) -> LispError {
        if e.stack.is_none() && !self.stack.is_empty() {
            e.stack = Some(self.stack_trace());
        }
        e
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc::is_nil;

    fn eval_to_string(src: &str) -> String {
        let mut rt = Runtime::new();
        let scope = rt.default_scope();
        let result = rt.eval_str(scope, src).unwrap();
        print_value(&rt.heap, result)
    }

    fn eval_to_err(src: &str) -> LispError {
        let mut rt = Runtime::new();
        let scope = rt.default_scope();
        rt.eval_str(scope, src).unwrap_err()
    }

    #[test]
    fn zero_argument_lambda() {
        assert_eq!(eval_to_string("((lambda () 1))"), "1");
    }

    #[test]
    fn lambda_with_argument() {
        assert_eq!(eval_to_string("((lambda (x) (+ 1 x)) 1)"), "2");
    }

    #[test]
    fn lambda_without_parameter_list_is_too_few() {
        assert_eq!(eval_to_err("(lambda)").kind, ErrKind::TooFewArgs);
    }

    #[test]
    fn lambda_parameter_names_must_be_symbols() {
        assert_eq!(eval_to_err("(lambda (x 2) 1)").kind, ErrKind::Type);
    }

    #[test]
    fn lambda_arity_is_checked_at_call() {
        assert_eq!(eval_to_err("((lambda (x y) x) 1)").kind, ErrKind::TooFewArgs);
        assert_eq!(eval_to_err("((lambda (x) x) 1 2)").kind, ErrKind::TooManyArgs);
    }

    #[test]
    fn closures_capture_lexically() {
        let mut rt = Runtime::new();
        let scope = rt.default_scope();
        rt.eval_str(scope, "(define f ((lambda (x) (lambda () x)) 1))")
            .unwrap();
        // Rebinding x in the outer scope must not affect the closure.
        rt.eval_str(scope, "(define x 99)").unwrap();
        let result = rt.eval_str(scope, "(f)").unwrap();
        assert_eq!(print_value(&rt.heap, result), "1");
    }

    #[test]
    fn macro_expansion_is_re_evaluated() {
        let mut rt = Runtime::new();
        let scope = rt.default_scope();
        rt.eval_str(scope, "(define when (macro (c t) `(if ,c ,t '())))")
            .unwrap();
        let hit = rt.eval_str(scope, "(when 1 42)").unwrap();
        assert_eq!(print_value(&rt.heap, hit), "42");
        let miss = rt.eval_str(scope, "(when 0 42)").unwrap();
        assert!(is_nil(&rt.heap, miss));
    }

    #[test]
    fn symbols_must_be_bound() {
        assert_eq!(eval_to_err("no-such-thing").kind, ErrKind::UndefinedSymbol);
    }

    #[test]
    fn head_must_be_callable() {
        assert_eq!(eval_to_err("(1 2 3)").kind, ErrKind::NotCallable);
    }

    #[test]
    fn self_evaluating_forms() {
        assert_eq!(eval_to_string("42"), "42");
        assert_eq!(eval_to_string("\"hi\""), "\"hi\"");
        assert_eq!(eval_to_string("()"), "()");
    }

    #[test]
    fn eq_is_identity_while_cmp_is_equality() {
        assert_eq!(eval_to_string("(eq? 1 1)"), "0");
        assert_eq!(eval_to_string("(== 1 1)"), "1");
        assert_eq!(eval_to_string("(define a '(1 2)) (eq? a a)"), "1");
    }

    #[test]
    fn evaluation_errors_freeze_the_stack() {
        let e = eval_to_err("((lambda (x) (/ x 0)) 1)");
        assert_eq!(e.kind, ErrKind::DivideByZero);
        let stack = e.stack.expect("stack snapshot");
        assert!(stack.contains("(/ x 0)"));
    }

    #[test]
    fn collection_between_interactions_preserves_definitions() {
        let mut rt = Runtime::new();
        let scope = rt.default_scope();
        rt.eval_str(scope, "(define double (lambda (x) (* 2 x)))")
            .unwrap();
        rt.mark(scope);
        rt.sweep();
        let result = rt.eval_str(scope, "(double 21)").unwrap();
        assert_eq!(print_value(&rt.heap, result), "42");
    }

    #[test]
    fn load_file_evaluates_a_stream() {
        let mut rt = Runtime::new();
        let scope = rt.default_scope();
        let source: &[u8] = b"(define x 40) (+ x 2)";
        let result = rt.load_file(scope, source).unwrap();
        assert_eq!(print_value(&rt.heap, result), "42");
    }
}
