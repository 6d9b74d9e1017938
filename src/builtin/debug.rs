//! Diagnostics and reflection: `print`, `dump-stack`, and `eval`.

use crate::builtin::get_args;
use crate::error::Result;
use crate::eval::Runtime;
use crate::gc::{GcRef, ListIter};
use crate::printer::print_value;

/// `(print a …)`: canonical form of each argument, then a newline;
/// returns nil.
pub fn print(rt: &mut Runtime, _scope: GcRef, args: GcRef) -> Result<GcRef> {
    let mut out = String::new();
    for item in ListIter::new(&rt.heap, args) {
        out.push_str(&print_value(&rt.heap, item));
    }
    println!("{}", out);
    Ok(rt.heap.nil())
}

/// `(dump-stack)`: write the current call stack to stderr; returns nil.
pub fn dump_stack(rt: &mut Runtime, _scope: GcRef, _args: GcRef) -> Result<GcRef> {
    eprintln!("{}", rt.stack_trace());
    Ok(rt.heap.nil())
}

/// `(eval v)`: evaluate the (already evaluated) argument once more in
/// the current scope.
pub fn eval(rt: &mut Runtime, scope: GcRef, args: GcRef) -> Result<GcRef> {
    let argv = get_args(&rt.heap, args, "*")?;
    rt.eval(scope, argv[0])
}
