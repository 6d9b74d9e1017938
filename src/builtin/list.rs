//! List primitives: construction, access, and the higher-order
//! operators.

use crate::builtin::get_args;
use crate::error::{ErrKind, LispError, Result};
use crate::eval::Runtime;
use crate::gc::{
    is_nil, list_from_slice, list_length, list_to_vec, new_int, new_pair, quote_with, GcRef, Value,
};

/// `(car l)`: first element; the empty list has none.
pub fn car(rt: &mut Runtime, _scope: GcRef, args: GcRef) -> Result<GcRef> {
    let argv = get_args(&rt.heap, args, "l")?;
    match rt.heap.get(argv[0]) {
        Value::Pair(left, _) => Ok(*left),
        _ => Err(LispError::new(ErrKind::Generic, "car of nil list")),
    }
}

/// `(cdr l)`: rest of the list. The cdr of nil is nil.
pub fn cdr(rt: &mut Runtime, _scope: GcRef, args: GcRef) -> Result<GcRef> {
    let argv = get_args(&rt.heap, args, "l")?;
    match rt.heap.get(argv[0]) {
        Value::Pair(_, right) => Ok(*right),
        _ => Ok(rt.heap.nil()),
    }
}

/// `(cons a b)`: fresh pair; `b` need not be a list.
pub fn cons(rt: &mut Runtime, _scope: GcRef, args: GcRef) -> Result<GcRef> {
    let argv = get_args(&rt.heap, args, "**")?;
    Ok(new_pair(&mut rt.heap, argv[0], argv[1]))
}

/// `(null? v)`: 1 iff `v` is nil.
pub fn null_p(rt: &mut Runtime, _scope: GcRef, args: GcRef) -> Result<GcRef> {
    let argv = get_args(&rt.heap, args, "*")?;
    let result = is_nil(&rt.heap, argv[0]) as i64;
    Ok(new_int(&mut rt.heap, result))
}

/// `(eq? a b)`: 1 iff the arguments are the same allocation.
pub fn eq_p(rt: &mut Runtime, _scope: GcRef, args: GcRef) -> Result<GcRef> {
    let argv = get_args(&rt.heap, args, "**")?;
    Ok(new_int(&mut rt.heap, (argv[0] == argv[1]) as i64))
}

/// The head of every list in `lists`, each wrapped in `(quote …)` so the
/// call path does not evaluate the elements again. `None` once any list
/// is exhausted.
fn quoted_heads(rt: &mut Runtime, lists: &[GcRef]) -> Option<Vec<GcRef>> {
    let mut heads = Vec::with_capacity(lists.len());
    for list in lists {
        match rt.heap.get(*list) {
            Value::Pair(left, _) => heads.push(*left),
            _ => return None,
        }
    }
    Some(
        heads
            .into_iter()
            .map(|h| quote_with(&mut rt.heap, h, "quote"))
            .collect(),
    )
}

/// Step every list to its tail. False if any entry has run out.
fn advance(rt: &Runtime, lists: &mut [GcRef]) -> bool {
    for list in lists.iter_mut() {
        match rt.heap.get(*list) {
            Value::Pair(_, right) => *list = *right,
            _ => return false,
        }
    }
    true
}

/// `(map f l1 … lk)`: apply `f` to parallel elements until the shortest
/// list runs out.
pub fn map(rt: &mut Runtime, scope: GcRef, args: GcRef) -> Result<GcRef> {
    let argv = get_args(&rt.heap, args, "*R")?;
    let f = argv[0];
    let mut lists = list_to_vec(&rt.heap, argv[1])?;
    if lists.is_empty() {
        return Err(LispError::new(
            ErrKind::TooFewArgs,
            "need at least two arguments",
        ));
    }
    let mut results = Vec::new();
    while let Some(heads) = quoted_heads(rt, &lists) {
        let call_args = list_from_slice(&mut rt.heap, &heads);
        results.push(rt.call(scope, f, call_args)?);
        if !advance(rt, &mut lists) {
            break;
        }
    }
    Ok(list_from_slice(&mut rt.heap, &results))
}

/// `(reduce f l)` seeds from the first element; `(reduce f init l)`
/// takes an explicit seed.
pub fn reduce(rt: &mut Runtime, scope: GcRef, args: GcRef) -> Result<GcRef> {
    let (f, mut acc, items) = match list_length(&rt.heap, args) {
        2 => {
            let argv = get_args(&rt.heap, args, "*l")?;
            let items = list_to_vec(&rt.heap, argv[1])?;
            if items.len() < 2 {
                return Err(LispError::new(
                    ErrKind::TooFewArgs,
                    "reduce: list must have at least 2 entries",
                ));
            }
            (argv[0], items[0], items[1..].to_vec())
        }
        3 => {
            let argv = get_args(&rt.heap, args, "**l")?;
            let items = list_to_vec(&rt.heap, argv[2])?;
            if items.is_empty() {
                return Err(LispError::new(
                    ErrKind::TooFewArgs,
                    "reduce: list must have at least 1 entry",
                ));
            }
            (argv[0], argv[1], items)
        }
        _ => {
            return Err(LispError::new(
                ErrKind::TooManyArgs,
                "reduce: 2 or 3 arguments required",
            ))
        }
    };
    for item in items {
        let pair = list_from_slice(&mut rt.heap, &[acc, item]);
        acc = rt.call(scope, f, pair)?;
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::print_value;

    fn eval_to_string(src: &str) -> String {
        let mut rt = Runtime::new();
        let scope = rt.default_scope();
        let result = rt.eval_str(scope, src).unwrap();
        print_value(&rt.heap, result)
    }

    fn eval_to_kind(src: &str) -> ErrKind {
        let mut rt = Runtime::new();
        let scope = rt.default_scope();
        rt.eval_str(scope, src).unwrap_err().kind
    }

    #[test]
    fn car_and_cdr_walk_a_list() {
        assert_eq!(eval_to_string("(car '(1 2 3))"), "1");
        assert_eq!(eval_to_string("(cdr '(1 2 3))"), "(2 3)");
    }

    #[test]
    fn car_of_nil_errors_but_cdr_is_nil() {
        assert_eq!(eval_to_kind("(car '())"), ErrKind::Generic);
        assert_eq!(eval_to_string("(cdr '())"), "()");
    }

    #[test]
    fn car_requires_a_list() {
        assert_eq!(eval_to_kind("(car 5)"), ErrKind::Type);
    }

    #[test]
    fn cons_builds_pairs_and_improper_tails() {
        assert_eq!(eval_to_string("(cons 1 '(2 3))"), "(1 2 3)");
        assert_eq!(eval_to_string("(cons 1 2)"), "(1 . 2)");
    }

    #[test]
    fn null_p_recognizes_only_nil() {
        assert_eq!(eval_to_string("(null? '())"), "1");
        assert_eq!(eval_to_string("(null? '(1))"), "0");
        assert_eq!(eval_to_string("(null? 0)"), "0");
    }

    #[test]
    fn map_applies_over_one_list() {
        assert_eq!(
            eval_to_string("(map (lambda (x) (* x x)) '(1 2 3))"),
            "(1 4 9)"
        );
    }

    #[test]
    fn map_zips_parallel_lists_to_the_shortest() {
        assert_eq!(eval_to_string("(map + '(1 2) '(10 20 30))"), "(11 22)");
    }

    #[test]
    fn map_over_an_empty_list_is_nil() {
        assert_eq!(eval_to_string("(map (lambda (x) x) '())"), "()");
    }

    #[test]
    fn map_does_not_re_evaluate_elements() {
        // Symbols in the input list arrive quoted; evaluating them as
        // arguments would raise undefined-symbol instead.
        assert_eq!(eval_to_string("(map (lambda (x) x) '(a b))"), "(a b)");
    }

    #[test]
    fn reduce_with_implicit_seed() {
        assert_eq!(eval_to_string("(reduce + '(1 2 3 4))"), "10");
    }

    #[test]
    fn reduce_with_explicit_seed() {
        assert_eq!(eval_to_string("(reduce + 10 '(1 2 3 4))"), "20");
    }

    #[test]
    fn reduce_arity_rules() {
        assert_eq!(eval_to_kind("(reduce + '(1))"), ErrKind::TooFewArgs);
        assert_eq!(eval_to_kind("(reduce +)"), ErrKind::TooManyArgs);
        assert_eq!(eval_to_kind("(reduce + 0 '())"), ErrKind::TooFewArgs);
    }
}
