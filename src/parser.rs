//! Recursive-descent reader: source text to heap values.
//!
//! The reader walks the input byte by byte, dispatching on the first
//! significant character. It produces the same heap values the evaluator
//! consumes, applies the reader macros `'` `` ` `` `,`, and rewrites
//! dotted symbols like `a.b.c` into nested `getattr` forms. Errors carry
//! the one-based line of the failure.

use crate::error::{ErrKind, LispError, Result};
use crate::gc::{
    get_symbol, list_from_slice, new_int, new_pair, new_string, quote_with, GcRef, Heap, Value,
};

/// A parsed value and the index just past it; `None` on clean end of
/// input.
type Parsed = Option<(GcRef, usize)>;

fn err_at(input: &[u8], index: usize, kind: ErrKind, message: &str) -> LispError {
    let upto = index.min(input.len());
    let line = 1 + input[..upto].iter().filter(|&&b| b == b'\n').count();
    LispError::new(kind, message).with_line(line)
}

fn skip_space_and_comments(input: &[u8], mut index: usize) -> usize {
    loop {
        while index < input.len() && input[index].is_ascii_whitespace() {
            index += 1;
        }
        if index < input.len() && input[index] == b';' {
            while index < input.len() && input[index] != b'\n' {
                index += 1;
            }
        } else {
            return index;
        }
    }
}

fn escape_byte(b: u8) -> u8 {
    match b {
        b'a' => 0x07,
        b'b' => 0x08,
        b'f' => 0x0C,
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'v' => 0x0B,
        other => other,
    }
}

fn parse_string(heap: &mut Heap, input: &[u8], index: usize) -> Result<Parsed> {
    // input[index] is the opening quote
    let mut buf = Vec::new();
    let mut i = index + 1;
    while i < input.len() && input[i] != b'"' {
        if input[i] == b'\\' {
            i += 1;
            if i >= input.len() {
                break;
            }
            buf.push(escape_byte(input[i]));
        } else {
            buf.push(input[i]);
        }
        i += 1;
    }
    if i >= input.len() {
        return Err(err_at(
            input,
            i,
            ErrKind::Syntax,
            "unexpected eof while parsing string",
        ));
    }
    let s = String::from_utf8_lossy(&buf).into_owned();
    Ok(Some((new_string(heap, s), i + 1)))
}

fn parse_integer(heap: &mut Heap, input: &[u8], index: usize) -> Result<Parsed> {
    let mut end = index;
    if input[end] == b'-' || input[end] == b'+' {
        end += 1;
    }
    while end < input.len() && input[end].is_ascii_digit() {
        end += 1;
    }
    let text = String::from_utf8_lossy(&input[index..end]);
    match text.parse::<i64>() {
        Ok(x) => Ok(Some((new_int(heap, x), end))),
        Err(_) => Err(err_at(
            input,
            index,
            ErrKind::Syntax,
            "error parsing integer",
        )),
    }
}

fn set_right(heap: &mut Heap, pair: GcRef, value: GcRef) {
    if let Value::Pair(_, right) = heap.get_mut(pair) {
        *right = value;
    }
}

fn parse_list(heap: &mut Heap, input: &[u8], index: usize) -> Result<Parsed> {
    // index is just past the opening paren
    let mut index = skip_space_and_comments(input, index);
    if index >= input.len() {
        return Err(err_at(
            input,
            index,
            ErrKind::Eof,
            "unexpected eof while parsing list",
        ));
    }
    if input[index] == b')' {
        return Ok(Some((heap.nil(), index + 1)));
    }

    let (first, next) = match parse_value_at(heap, input, index)? {
        Some(parsed) => parsed,
        None => {
            return Err(err_at(
                input,
                index,
                ErrKind::Eof,
                "unexpected eof while parsing list",
            ))
        }
    };
    index = next;
    let nil = heap.nil();
    let head = new_pair(heap, first, nil);
    let mut tail = head;

    loop {
        index = skip_space_and_comments(input, index);
        if index >= input.len() {
            return Err(err_at(
                input,
                index,
                ErrKind::Eof,
                "unexpected eof while parsing list",
            ));
        }
        if input[index] == b'.' {
            // Dotted tail: the next value becomes the cdr of the last
            // cell, and the list must close immediately.
            index += 1;
            let (cdr, next) = match parse_value_at(heap, input, index)? {
                Some(parsed) => parsed,
                None => {
                    return Err(err_at(
                        input,
                        index,
                        ErrKind::Eof,
                        "unexpected eof while parsing list",
                    ))
                }
            };
            index = skip_space_and_comments(input, next);
            if index >= input.len() || input[index] != b')' {
                return Err(err_at(
                    input,
                    index,
                    ErrKind::Syntax,
                    "bad s-expression form",
                ));
            }
            set_right(heap, tail, cdr);
            return Ok(Some((head, index + 1)));
        } else if input[index] == b')' {
            return Ok(Some((head, index + 1)));
        } else {
            let (value, next) = match parse_value_at(heap, input, index)? {
                Some(parsed) => parsed,
                None => {
                    return Err(err_at(
                        input,
                        index,
                        ErrKind::Eof,
                        "unexpected eof while parsing list",
                    ))
                }
            };
            index = next;
            let nil = heap.nil();
            let cell = new_pair(heap, value, nil);
            set_right(heap, tail, cell);
            tail = cell;
        }
    }
}

/// Rewrite `s0.s1…sn` into nested attribute lookups:
/// `(getattr (getattr s0 (quote s1)) … (quote sn))`.
fn split_symbol(heap: &mut Heap, text: &str) -> GcRef {
    let mut parts = text.split('.');
    // The split is only taken on symbols with an interior dot, so the
    // first segment always exists.
    let first = parts.next().unwrap_or("");
    let mut prev = get_symbol(heap, first);
    for attr in parts {
        let attr_sym = get_symbol(heap, attr);
        let quoted = quote_with(heap, attr_sym, "quote");
        let getattr = get_symbol(heap, "getattr");
        prev = list_from_slice(heap, &[getattr, prev, quoted]);
    }
    prev
}

fn symbol_end(input: &[u8], mut end: usize) -> usize {
    while end < input.len() {
        let b = input[end];
        if b.is_ascii_whitespace() || b == b')' || b == b'\'' || b == b';' || b == b'"' {
            break;
        }
        end += 1;
    }
    end
}

fn parse_symbol(heap: &mut Heap, input: &[u8], index: usize) -> Result<Parsed> {
    let end = symbol_end(input, index);
    let text = String::from_utf8_lossy(&input[index..end]).into_owned();
    if text.contains('.') {
        if text.starts_with('.') || text.ends_with('.') {
            return Err(err_at(
                input,
                index,
                ErrKind::Syntax,
                "unexpected '.' at beginning or end of symbol",
            ));
        }
        return Ok(Some((split_symbol(heap, &text), end)));
    }
    Ok(Some((get_symbol(heap, &text), end)))
}

fn parse_quote(heap: &mut Heap, input: &[u8], index: usize) -> Result<Parsed> {
    let name = match input[index] {
        b'\'' => "quote",
        b'`' => "quasiquote",
        _ => "unquote",
    };
    match parse_value_at(heap, input, index + 1)? {
        Some((value, next)) => Ok(Some((quote_with(heap, value, name), next))),
        None => Err(err_at(
            input,
            index + 1,
            ErrKind::Eof,
            "unexpected eof after quote character",
        )),
    }
}

fn parse_value_at(heap: &mut Heap, input: &[u8], index: usize) -> Result<Parsed> {
    let index = skip_space_and_comments(input, index);
    if index >= input.len() {
        return Ok(None);
    }
    match input[index] {
        b'"' => parse_string(heap, input, index),
        b'(' => parse_list(heap, input, index + 1),
        // Unexpected close; surrounding context treats this as an error
        // or, at top level, an empty value.
        b')' => Ok(Some((heap.nil(), index + 1))),
        b'\'' | b'`' | b',' => parse_quote(heap, input, index),
        b if b.is_ascii_digit() => parse_integer(heap, input, index),
        b'-' | b'+' if index + 1 < input.len() && input[index + 1].is_ascii_digit() => {
            parse_integer(heap, input, index)
        }
        _ => parse_symbol(heap, input, index),
    }
}

/// Parse one value starting at byte `index`.
///
/// Returns `Ok(None)` on clean end of input, or the value together with
/// the index just past it. Errors carry the one-based source line of the
/// failure.
pub fn parse_value(heap: &mut Heap, input: &str, index: usize) -> Result<Parsed> {
    parse_value_at(heap, input.as_bytes(), index)
}

/// Parse every top-level value in `input` into a single `(progn …)` form.
pub fn parse_progn(heap: &mut Heap, input: &str) -> Result<GcRef> {
    let bytes = input.as_bytes();
    let progn = get_symbol(heap, "progn");
    let nil = heap.nil();
    let head = new_pair(heap, progn, nil);
    let mut tail = head;
    let mut index = 0;
    while let Some((value, next)) = parse_value_at(heap, bytes, index)? {
        index = next;
        let nil = heap.nil();
        let cell = new_pair(heap, value, nil);
        set_right(heap, tail, cell);
        tail = cell;
    }
    Ok(head)
}
