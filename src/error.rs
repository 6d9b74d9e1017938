//! Error kinds and the error value shared by the reader, evaluator, and
//! builtins.
//!
//! Every fallible core operation returns `Result<T, LispError>`. The error
//! is plain data: a stable kind, a message, an optional one-based source
//! line (reader errors), and an optional frozen call-stack rendering
//! (evaluation errors). Nothing unwinds; the evaluator short-circuits
//! with `?`.

use thiserror::Error;

/// Stable classification of interpreter failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrKind {
    #[error("syntax error")]
    Syntax,
    #[error("unexpected end of file")]
    Eof,
    #[error("file I/O error")]
    FileIo,
    #[error("type error")]
    Type,
    #[error("too few arguments")]
    TooFewArgs,
    #[error("too many arguments")]
    TooManyArgs,
    #[error("not callable")]
    NotCallable,
    #[error("undefined symbol")]
    UndefinedSymbol,
    #[error("divide by zero")]
    DivideByZero,
    #[error("error")]
    Generic,
}

/// An error produced by the reader or the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct LispError {
    pub kind: ErrKind,
    pub message: String,
    /// One-based source line, set by the reader.
    pub line: Option<usize>,
    /// Frozen call-stack rendering, set by the evaluator.
    pub stack: Option<String>,
}

impl LispError {
    pub fn new(kind: ErrKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
            stack: None,
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Render the error with its line or stack context, for the shell.
    pub fn report(&self) -> String {
        let mut out = self.to_string();
        if let Some(line) = self.line {
            out.push_str(&format!(" (line {})", line));
        }
        if let Some(stack) = &self.stack {
            out.push('\n');
            out.push_str(stack);
        }
        out
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LispError>;
