//! Integer arithmetic and comparison operators.

use crate::builtin::get_args;
use crate::error::{ErrKind, LispError, Result};
use crate::eval::Runtime;
use crate::gc::{list_to_vec, new_int, GcRef, ListIter, Value};

fn int_arg(rt: &Runtime, v: GcRef, what: &str) -> Result<i64> {
    match rt.heap.get(v) {
        Value::Int(x) => Ok(*x),
        _ => Err(LispError::new(
            ErrKind::Type,
            format!("expect integers for {}", what),
        )),
    }
}

/// `(+ a …)`: n-ary sum; identity 0.
pub fn add(rt: &mut Runtime, _scope: GcRef, args: GcRef) -> Result<GcRef> {
    let mut sum: i64 = 0;
    for item in ListIter::new(&rt.heap, args) {
        sum = sum.wrapping_add(int_arg(rt, item, "addition")?);
    }
    Ok(new_int(&mut rt.heap, sum))
}

/// `(* a …)`: n-ary product; identity 1.
pub fn mul(rt: &mut Runtime, _scope: GcRef, args: GcRef) -> Result<GcRef> {
    let mut product: i64 = 1;
    for item in ListIter::new(&rt.heap, args) {
        product = product.wrapping_mul(int_arg(rt, item, "multiplication")?);
    }
    Ok(new_int(&mut rt.heap, product))
}

/// `(- a …)`: negation with one argument, left fold otherwise.
pub fn sub(rt: &mut Runtime, _scope: GcRef, args: GcRef) -> Result<GcRef> {
    let argv = list_to_vec(&rt.heap, args)?;
    if argv.is_empty() {
        return Err(LispError::new(
            ErrKind::TooFewArgs,
            "expected at least one arg",
        ));
    }
    let first = int_arg(rt, argv[0], "subtraction")?;
    let val = if argv.len() == 1 {
        first.wrapping_neg()
    } else {
        let mut val = first;
        for item in &argv[1..] {
            val = val.wrapping_sub(int_arg(rt, *item, "subtraction")?);
        }
        val
    };
    Ok(new_int(&mut rt.heap, val))
}

/// `(/ a …)`: left fold; a single argument is returned unchanged.
pub fn div(rt: &mut Runtime, _scope: GcRef, args: GcRef) -> Result<GcRef> {
    let argv = list_to_vec(&rt.heap, args)?;
    if argv.is_empty() {
        return Err(LispError::new(
            ErrKind::TooFewArgs,
            "expected at least one arg",
        ));
    }
    let mut val = int_arg(rt, argv[0], "division")?;
    for item in &argv[1..] {
        let divisor = int_arg(rt, *item, "division")?;
        if divisor == 0 {
            return Err(LispError::new(ErrKind::DivideByZero, "divide by zero"));
        }
        val = val.wrapping_div(divisor);
    }
    Ok(new_int(&mut rt.heap, val))
}

#[derive(Clone, Copy)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

fn cmp(rt: &mut Runtime, args: GcRef, op: CmpOp) -> Result<GcRef> {
    let argv = get_args(&rt.heap, args, "dd")?;
    let a = int_arg(rt, argv[0], "comparison")?;
    let b = int_arg(rt, argv[1], "comparison")?;
    let result = match op {
        CmpOp::Eq => a == b,
        CmpOp::Ne => a != b,
        CmpOp::Lt => a < b,
        CmpOp::Le => a <= b,
        CmpOp::Gt => a > b,
        CmpOp::Ge => a >= b,
    };
    Ok(new_int(&mut rt.heap, result as i64))
}

pub fn cmp_eq(rt: &mut Runtime, _scope: GcRef, args: GcRef) -> Result<GcRef> {
    cmp(rt, args, CmpOp::Eq)
}

pub fn cmp_ne(rt: &mut Runtime, _scope: GcRef, args: GcRef) -> Result<GcRef> {
    cmp(rt, args, CmpOp::Ne)
}

pub fn cmp_lt(rt: &mut Runtime, _scope: GcRef, args: GcRef) -> Result<GcRef> {
    cmp(rt, args, CmpOp::Lt)
}

pub fn cmp_le(rt: &mut Runtime, _scope: GcRef, args: GcRef) -> Result<GcRef> {
    cmp(rt, args, CmpOp::Le)
}

pub fn cmp_gt(rt: &mut Runtime, _scope: GcRef, args: GcRef) -> Result<GcRef> {
    cmp(rt, args, CmpOp::Gt)
}

pub fn cmp_ge(rt: &mut Runtime, _scope: GcRef, args: GcRef) -> Result<GcRef> {
    cmp(rt, args, CmpOp::Ge)
}
