//! Reader-compatible rendering of heap values.
//!
//! Everything the reader can produce prints back in a form the reader
//! accepts: integers in decimal, strings quoted and re-escaped, symbols
//! bare, lists parenthesized with a dotted improper tail. Callables and
//! scopes are opaque and print as angle-bracketed descriptions.

use crate::gc::{Callable, GcRef, Heap, LambdaKind, Value};

/// Render `v` in canonical syntax.
pub fn print_value(heap: &Heap, v: GcRef) -> String {
    match heap.get(v) {
        Value::Int(x) => x.to_string(),
        Value::Str(s) => print_string(s),
        Value::Symbol(name) => name.clone(),
        Value::Nil => "()".to_string(),
        Value::Pair(_, _) => print_list(heap, v),
        Value::Callable(Callable::Builtin { name, .. }) => format!("<builtin {}>", name),
        Value::Callable(Callable::Lambda {
            kind: LambdaKind::Function,
            ..
        }) => "<lambda>".to_string(),
        Value::Callable(Callable::Lambda {
            kind: LambdaKind::Macro,
            ..
        }) => "<macro>".to_string(),
        Value::Scope(_) => "<scope>".to_string(),
    }
}

fn print_list(heap: &Heap, v: GcRef) -> String {
    let mut s = String::from("(");
    let mut first = true;
    let mut current = v;
    loop {
        match heap.get(current) {
            Value::Pair(left, right) => {
                if !first {
                    s.push(' ');
                }
                s.push_str(&print_value(heap, *left));
                current = *right;
                first = false;
            }
            Value::Nil => {
                s.push(')');
                break;
            }
            _ => {
                s.push_str(" . ");
                s.push_str(&print_value(heap, current));
                s.push(')');
                break;
            }
        }
    }
    s
}

fn print_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\x0C' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0B' => out.push_str("\\v"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc::{equal, new_int, new_pair, new_string, new_symbol};
    use crate::parser::parse_value;

    #[test]
    fn atoms_print_canonically() {
        let mut heap = Heap::new();
        let v = new_int(&mut heap, -42);
        assert_eq!(print_value(&heap, v), "-42");
        let v = heap.intern_symbol("foo-bar?");
        assert_eq!(print_value(&heap, v), "foo-bar?");
        assert_eq!(print_value(&heap, heap.nil()), "()");
    }

    #[test]
    fn strings_are_quoted_and_escaped() {
        let mut heap = Heap::new();
        let v = new_string(&mut heap, "a\nb\t\"c\"\\");
        assert_eq!(print_value(&heap, v), r#""a\nb\t\"c\"\\""#);
    }

    #[test]
    fn lists_print_with_dotted_tails() {
        let mut heap = Heap::new();
        let one = new_int(&mut heap, 1);
        let two = new_int(&mut heap, 2);
        let nil = heap.nil();
        let tail = new_pair(&mut heap, two, nil);
        let proper = new_pair(&mut heap, one, tail);
        assert_eq!(print_value(&heap, proper), "(1 2)");

        let dotted = new_pair(&mut heap, one, two);
        assert_eq!(print_value(&heap, dotted), "(1 . 2)");
    }

    #[test]
    fn printed_values_read_back_equal() {
        let mut heap = Heap::new();
        for src in [
            "42",
            "-7",
            "foo",
            "\"a\\nb\"",
            "(1 2 3)",
            "(a (b c) . d)",
            "(quote x)",
            "()",
        ] {
            let (v, _) = parse_value(&mut heap, src, 0).unwrap().unwrap();
            let printed = print_value(&heap, v);
            let (w, _) = parse_value(&mut heap, &printed, 0).unwrap().unwrap();
            assert!(
                equal(&heap, v, w),
                "{} printed as {} but re-read differently",
                src,
                printed
            );
        }
    }

    #[test]
    fn uninterned_symbols_still_print() {
        let mut heap = Heap::new();
        let v = new_symbol(&mut heap, "loose");
        assert_eq!(print_value(&heap, v), "loose");
    }

    mod roundtrip {
        use crate::gc::{equal, list_from_slice, new_int, new_string, GcRef, Heap};
        use crate::parser::parse_value;
        use crate::printer::print_value;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Tree {
            Int(i64),
            Sym(String),
            Str(String),
            List(Vec<Tree>),
        }

        fn arb_tree() -> impl Strategy<Value = Tree> {
            let leaf = prop_oneof![
                any::<i64>().prop_map(Tree::Int),
                "[a-z][a-z0-9?!-]{0,8}".prop_map(Tree::Sym),
                "[ -~]{0,12}".prop_map(Tree::Str),
            ];
            leaf.prop_recursive(4, 32, 6, |inner| {
                prop::collection::vec(inner, 0..6).prop_map(Tree::List)
            })
        }

        fn build(heap: &mut Heap, tree: &Tree) -> GcRef {
            match tree {
                Tree::Int(x) => new_int(heap, *x),
                Tree::Sym(s) => heap.intern_symbol(s),
                Tree::Str(s) => new_string(heap, s.clone()),
                Tree::List(items) => {
                    let built: Vec<GcRef> = items.iter().map(|t| build(heap, t)).collect();
                    list_from_slice(heap, &built)
                }
            }
        }

        proptest! {
            #[test]
            fn print_then_parse_is_identity(tree in arb_tree()) {
                let mut heap = Heap::new();
                let v = build(&mut heap, &tree);
                let printed = print_value(&heap, v);
                let (w, _) = parse_value(&mut heap, &printed, 0)
                    .expect("printed form must parse")
                    .expect("printed form must not be empty");
                prop_assert!(equal(&heap, v, w), "{} did not round-trip", printed);
            }
        }
    }
}
