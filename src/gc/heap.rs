//! The garbage-collected heap: allocation list, mark, and sweep.
//!
//! The heap owns every value in a runtime. Objects are threaded onto a
//! singly-linked intrusive list whose permanent head is the nil
//! singleton; `alloc` appends at the tail. Collection is explicit: the
//! embedder calls [`Heap::mark`] for each root, then [`Heap::sweep`] to
//! free everything that was not reached. Allocation never collects.

use std::collections::{HashMap, VecDeque};
use std::ptr;

use log::debug;

use super::{GcObject, GcRef, Mark, Value};

pub struct Heap {
    /// Permanent list head; also the nil singleton.
    head: GcRef,
    tail: GcRef,
    /// Interned symbols by name. Not a GC root: sweep prunes the entry of
    /// any symbol it frees, so the cache never dangles and never keeps a
    /// symbol alive by itself.
    symbols: HashMap<String, GcRef>,
}

impl Heap {
    pub fn new() -> Self {
        let nil = Box::into_raw(Box::new(GcObject {
            value: Value::Nil,
            mark: Mark::Unmarked,
            next: ptr::null_mut(),
        }));
        Self {
            head: nil,
            tail: nil,
            symbols: HashMap::new(),
        }
    }

    /// The unique empty-list value of this heap.
    pub fn nil(&self) -> GcRef {
        self.head
    }

    /// Allocate a value, append it to the allocation list, and return its
    /// reference.
    pub fn alloc(&mut self, value: Value) -> GcRef {
        let obj = Box::into_raw(Box::new(GcObject {
            value,
            mark: Mark::Unmarked,
            next: ptr::null_mut(),
        }));
        unsafe {
            (*self.tail).next = obj;
        }
        self.tail = obj;
        obj
    }

    /// Borrow the value behind a reference.
    pub fn get(&self, r: GcRef) -> &Value {
        unsafe { &(*r).value }
    }

    /// Mutably borrow the value behind a reference.
    pub fn get_mut(&mut self, r: GcRef) -> &mut Value {
        unsafe { &mut (*r).value }
    }

    /// Intern a symbol: one shared value per name, per heap.
    pub fn intern_symbol(&mut self, name: &str) -> GcRef {
        if let Some(existing) = self.symbols.get(name) {
            return *existing;
        }
        let sym = self.alloc(Value::Symbol(name.to_string()));
        self.symbols.insert(name.to_string(), sym);
        sym
    }

    /// Number of objects on the allocation list, nil included.
    pub fn len(&self) -> usize {
        let mut n = 0;
        let mut curr = self.head;
        while !curr.is_null() {
            n += 1;
            curr = unsafe { (*curr).next };
        }
        n
    }

    /// Mark every value reachable from `root`.
    ///
    /// Traversal is iterative over an explicit worklist so that deep or
    /// cyclic structures cannot overflow the host stack. A child already
    /// queued or marked is not enqueued again, which bounds the worklist
    /// by the number of live objects.
    pub fn mark(&mut self, root: GcRef) {
        let mut worklist: VecDeque<GcRef> = VecDeque::new();
        worklist.push_back(root);
        while let Some(r) = worklist.pop_front() {
            unsafe {
                (*r).mark = Mark::Marked;
            }
            let value = unsafe { &(*r).value };
            value.each_child(&mut |child| {
                let mark = unsafe { &mut (*child).mark };
                if *mark == Mark::Unmarked {
                    *mark = Mark::Queued;
                    worklist.push_back(child);
                }
            });
        }
    }

    /// Free every object not marked since the last sweep and reset the
    /// marks of the survivors.
    ///
    /// Walks the intrusive list from the permanent nil head, unlinking
    /// unmarked successors; the head itself is never examined, so nil
    /// survives every collection until the heap is dropped.
    pub fn sweep(&mut self) {
        let mut freed = 0usize;
        let mut kept = 0usize;
        unsafe {
            let mut curr = self.head;
            while !(*curr).next.is_null() {
                let next = (*curr).next;
                if (*next).mark != Mark::Marked {
                    (*curr).next = (*next).next;
                    if let Value::Symbol(name) = &(*next).value {
                        // Uninterned symbols share names with cached ones;
                        // only drop the entry that points at this object.
                        if self.symbols.get(name).is_some_and(|s| *s == next) {
                            self.symbols.remove(name);
                        }
                    }
                    drop(Box::from_raw(next));
                    freed += 1;
                } else {
                    (*curr).mark = Mark::Unmarked;
                    curr = next;
                    kept += 1;
                }
            }
            (*curr).mark = Mark::Unmarked;
            self.tail = curr;
        }
        debug!("sweep: freed {} objects, kept {}", freed, kept);
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Heap {
    fn drop(&mut self) {
        // Free the whole allocation list, nil included. Any GcRef still
        // held by the embedder is invalid past this point.
        unsafe {
            let mut curr = self.head;
            while !curr.is_null() {
                let next = (*curr).next;
                drop(Box::from_raw(curr));
                curr = next;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc::{new_int, new_lambda, new_pair, new_scope, LambdaKind};

    #[test]
    fn alloc_appends_to_list() {
        let mut heap = Heap::new();
        assert_eq!(heap.len(), 1); // nil
        new_int(&mut heap, 1);
        new_int(&mut heap, 2);
        assert_eq!(heap.len(), 3);
    }

    #[test]
    fn sweep_frees_unreachable() {
        let mut heap = Heap::new();
        let a = new_int(&mut heap, 1);
        let b = new_int(&mut heap, 2);
        let pair = new_pair(&mut heap, a, b);
        new_int(&mut heap, 3); // garbage
        assert_eq!(heap.len(), 5);

        heap.mark(pair);
        heap.sweep();
        assert_eq!(heap.len(), 4); // nil + pair + a + b

        match heap.get(pair) {
            Value::Pair(left, right) => {
                assert!(matches!(heap.get(*left), Value::Int(1)));
                assert!(matches!(heap.get(*right), Value::Int(2)));
            }
            _ => panic!("pair did not survive intact"),
        }
    }

    #[test]
    fn nil_survives_unrooted_sweep() {
        let mut heap = Heap::new();
        new_int(&mut heap, 1);
        new_int(&mut heap, 2);
        heap.sweep();
        assert_eq!(heap.len(), 1);
        assert!(matches!(heap.get(heap.nil()), Value::Nil));
    }

    #[test]
    fn survivors_are_collectable_next_round() {
        let mut heap = Heap::new();
        let a = new_int(&mut heap, 1);
        heap.mark(a);
        heap.sweep();
        assert_eq!(heap.len(), 2);
        // Marks were reset; with no root, the survivor now dies.
        heap.sweep();
        assert_eq!(heap.len(), 1);
    }

    #[test]
    fn interned_symbols_are_shared() {
        let mut heap = Heap::new();
        let a = heap.intern_symbol("foo");
        let b = heap.intern_symbol("foo");
        let c = heap.intern_symbol("bar");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn sweep_prunes_symbol_cache() {
        let mut heap = Heap::new();
        heap.intern_symbol("transient");
        heap.sweep();
        assert_eq!(heap.len(), 1);
        // Re-interning after collection must allocate a fresh symbol; a
        // stale cache entry would be returned without allocating.
        let second = heap.intern_symbol("transient");
        assert_eq!(heap.len(), 2);
        assert!(matches!(heap.get(second), Value::Symbol(s) if s == "transient"));
    }

    #[test]
    fn mark_follows_cyclic_closure_capture() {
        let mut heap = Heap::new();
        let scope = new_scope(&mut heap, None);
        let sym = heap.intern_symbol("self");
        let nil = heap.nil();
        let body = new_int(&mut heap, 1);
        let lambda = new_lambda(&mut heap, LambdaKind::Function, nil, body, scope);
        // Bind the lambda into the scope it captures: a reference cycle.
        match heap.get_mut(scope) {
            Value::Scope(s) => {
                s.bindings.insert(sym, lambda);
            }
            _ => unreachable!(),
        }

        let before = heap.len();
        heap.mark(scope);
        heap.sweep();
        assert_eq!(heap.len(), before);

        // Unrooted, the whole cycle is reclaimed.
        heap.sweep();
        assert_eq!(heap.len(), 1);
    }

    #[test]
    fn mark_is_iterative_on_deep_structures() {
        let mut heap = Heap::new();
        let mut list = heap.nil();
        let one = new_int(&mut heap, 1);
        for _ in 0..100_000 {
            list = new_pair(&mut heap, one, list);
        }
        heap.mark(list);
        heap.sweep();
        assert_eq!(heap.len(), 100_002);
        heap.sweep();
        assert_eq!(heap.len(), 1);
    }
}
