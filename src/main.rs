//! Interactive shell for the lisplet interpreter.

use std::fs::File;
use std::io::{self, Write};

use argh::FromArgs;

use lisplet::gc::is_nil;
use lisplet::parser;
use lisplet::printer::print_value;
use lisplet::{GcRef, Runtime};

#[derive(FromArgs)]
/// An embeddable Lisp interpreter
struct Args {
    /// files to load before the prompt (can be repeated)
    #[argh(option, short = 'f')]
    file: Vec<String>,
    /// exit after file loading, do not enter the REPL
    #[argh(switch, short = 'q')]
    quit: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Args = argh::from_env();

    let mut rt = Runtime::new();
    let scope = rt.default_scope();

    for path in &args.file {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                eprintln!("{}: {}", path, e);
                std::process::exit(1);
            }
        };
        log::info!("loading {}", path);
        if let Err(e) = rt.load_file(scope, file) {
            eprintln!("{}: {}", path, e.report());
            std::process::exit(1);
        }
        rt.mark(scope);
        rt.sweep();
    }

    if args.quit {
        return;
    }

    repl(&mut rt, scope);
}

fn repl(rt: &mut Runtime, scope: GcRef) {
    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break, // Ctrl-D, EOF
            Ok(_) => {}
        }

        let value = match parser::parse_value(&mut rt.heap, &line, 0) {
            Ok(Some((value, _))) => value,
            Ok(None) => continue, // empty line
            Err(e) => {
                eprintln!("{}", e.report());
                continue;
            }
        };
        match rt.eval(scope, value) {
            Ok(result) => {
                if !is_nil(&rt.heap, result) {
                    println!("{}", print_value(&rt.heap, result));
                }
            }
            Err(e) => eprintln!("{}", e.report()),
        }

        // Everything the scope cannot reach, including the result just
        // printed, is garbage now.
        rt.mark(scope);
        rt.sweep();
    }
}
