//! lisplet: an embeddable Lisp interpreter.
//!
//! The crate provides a heap-allocated tagged value model, a recursive
//! tree-walking evaluator with lexical closures and macros, a
//! recursive-descent reader, and an explicit mark-and-sweep collector
//! tying them together. Collection points belong to the embedder: the
//! core never collects on its own.
//!
//! # Example
//!
//! ```rust
//! use lisplet::Runtime;
//! use lisplet::printer::print_value;
//!
//! let mut rt = Runtime::new();
//! let scope = rt.default_scope();
//! let result = rt.eval_str(scope, "(+ 1 2)").unwrap();
//! assert_eq!(print_value(&rt.heap, result), "3");
//!
//! // Collect everything the scope can no longer reach.
//! rt.mark(scope);
//! rt.sweep();
//! ```

pub mod builtin;
pub mod env;
pub mod error;
pub mod eval;
pub mod gc;
pub mod parser;
pub mod printer;

pub use error::{ErrKind, LispError};
pub use eval::Runtime;
pub use gc::{GcRef, Heap, Value};
