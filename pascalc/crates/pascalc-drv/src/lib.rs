//! pascalc-drv - command-line entry point and pipeline orchestration.
//!
//! Ties the four library crates together the way `original_source/main.cpp`
//! ties `Scanner` and `Parser` together, extended with the code generator
//! and the `-t`/`-b` symbol-table dumps the original's CLI doesn't have.
//! No argument-parsing crate: one required positional file and at most one
//! flag doesn't earn one.
//!
//! ```text
//! pascalc [option] source.pas
//!
//!   -h  usage, exit 0
//!   -l  token stream
//!   -s  AST
//!   -t  symbol table
//!   -b  symbol table, then AST
//!   (no option) full compile: emit AT&T assembly to stdout
//! ```
//!
//! `[option]` is bracketed in the usage line because it really is optional:
//! `original_source/main.cpp` has no path that performs a full compile (its
//! generator is unfinished), so there's no precedent to borrow for what a
//! bare `pascalc source.pas` invocation does. We take the bracket at face
//! value and treat a lone, non-flag-shaped argument as "compile this file",
//! the one piece of the CLI surface without a directly grounded original.

mod error;
mod symtab;

pub use error::DriverError;

use std::fmt::Write as _;

const USAGE: &str = "\
Usage: pascalc [option] source.pas

available options are:
    -h    show this message
    -l    show token stream
    -s    show AST
    -t    show symbol table
    -b    show symbol table then AST
";

/// Runs the driver over an argument list (program name already stripped),
/// printing to stdout and returning `Err` for anything that should exit
/// non-zero.
pub fn run(args: impl Iterator<Item = String>) -> Result<(), DriverError> {
    let args: Vec<String> = args.collect();
    match args.as_slice() {
        [] => {
            print!("{USAGE}");
            Ok(())
        }
        [only] => run_single_argument(only),
        [flag, path] => run_flag_and_file(flag, path),
        _ => Err(DriverError::usage("too many parameters")),
    }
}

/// A lone argument is either `-h` or, since it's the only thing the caller
/// gave us, an attempted option with no source file to apply it to.
/// Anything not shaped like an option is treated as a bare filename to
/// compile (see the module doc's note on `[option]`).
fn run_single_argument(arg: &str) -> Result<(), DriverError> {
    match flag_letter(arg) {
        Some('h') => {
            print!("{USAGE}");
            Ok(())
        }
        Some('l') | Some('s') | Some('t') | Some('b') => {
            Err(DriverError::usage("no files specified"))
        }
        Some(_) => Err(DriverError::usage("unknown option")),
        None if arg.starts_with('-') => Err(DriverError::usage("invalid option")),
        None => compile_file(arg),
    }
}

fn run_flag_and_file(flag: &str, path: &str) -> Result<(), DriverError> {
    let letter = flag_letter(flag).ok_or_else(|| DriverError::usage("invalid option"))?;
    match letter {
        'h' => {
            print!("{USAGE}");
            Ok(())
        }
        'l' => dump_tokens(&read_source(path)?),
        's' => dump_ast(&read_source(path)?),
        't' => dump_symbols(&read_source(path)?),
        'b' => dump_symbols_then_ast(&read_source(path)?),
        _ => Err(DriverError::usage("unknown option")),
    }
}

/// `Some(c)` for a well-formed `-c` flag, `None` otherwise (including when
/// `arg` doesn't start with `-` at all, or is the wrong length).
fn flag_letter(arg: &str) -> Option<char> {
    let mut chars = arg.chars();
    if chars.next()? != '-' {
        return None;
    }
    let letter = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(letter)
}

fn read_source(path: &str) -> Result<String, DriverError> {
    std::fs::read_to_string(path).map_err(|_| DriverError::usage("can't open file"))
}

fn dump_tokens(source: &str) -> Result<(), DriverError> {
    use pascalc_lex::{Scanner, TokenKind};

    let mut scanner = Scanner::new(source)?;
    loop {
        let token = scanner.current().clone();
        println!("{} {:?} {}", token.span, token.kind, token.text);
        if token.is(TokenKind::Eof) {
            break;
        }
        scanner.advance()?;
    }
    Ok(())
}

fn dump_ast(source: &str) -> Result<(), DriverError> {
    let program = pascalc_par::parse(source)?;
    print!("{}", render_ast(&program));
    Ok(())
}

fn dump_symbols(source: &str) -> Result<(), DriverError> {
    let (_, global_scope) = pascalc_par::parse_with_scope(source)?;
    symtab::print_scope(&global_scope, 0);
    Ok(())
}

fn dump_symbols_then_ast(source: &str) -> Result<(), DriverError> {
    let (program, global_scope) = pascalc_par::parse_with_scope(source)?;
    symtab::print_scope(&global_scope, 0);
    print!("{}", render_ast(&program));
    Ok(())
}

fn render_ast(program: &pascalc_par::Program) -> String {
    let mut out = String::new();
    for global in &program.globals {
        let _ = writeln!(out, "GlobalVar [{}]", global.label);
    }
    for routine in &program.routines {
        let _ = writeln!(out, "Routine({})", routine.name);
        out.push_str(&indent(&routine.body.pretty_print()));
    }
    out.push_str("Main\n");
    out.push_str(&indent(&program.main.pretty_print()));
    out
}

fn indent(block: &str) -> String {
    let mut out = String::new();
    for line in block.lines() {
        let _ = writeln!(out, "  {line}");
    }
    out
}

fn compile_file(path: &str) -> Result<(), DriverError> {
    let source = read_source(path)?;
    let program = pascalc_par::parse(&source)?;
    let asm = pascalc_gen::generate(&program);
    print!("{asm}");
    Ok(())
}
