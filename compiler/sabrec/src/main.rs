//! Sabre compiler CLI.

use std::path::Path;
use std::process::ExitCode;

use sabre_diagnostic::emitter::{ColorMode, TerminalEmitter};
use sabrec::{compile, dump_symbols, tracing_setup};

fn main() -> ExitCode {
    tracing_setup::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    let mut color = ColorMode::Auto;
    let mut positional: Vec<&str> = Vec::new();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--color=always" => color = ColorMode::Always,
            "--color=never" => color = ColorMode::Never,
            "--color=auto" => color = ColorMode::Auto,
            other => positional.push(other),
        }
    }

    let (command, path) = match positional.as_slice() {
        [command, path, ..] => (*command, *path),
        [command] => {
            // A bare path means `check`.
            if Path::new(command).exists() {
                ("check", *command)
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                return ExitCode::FAILURE;
            }
        }
        [] => {
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match command {
        "check" => run_check(path, color, false),
        "dump-symbols" => run_check(path, color, true),
        "lex" => run_lex(path),
        "parse" => run_parse(path, color),
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn run_check(path: &str, color: ColorMode, dump: bool) -> ExitCode {
    let result = match compile(Path::new(path)) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("error: {path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut emitter = TerminalEmitter::stderr(color);
    emitter.emit_all(result.unit.diags.all(), &result.unit.sources);

    if !result.succeeded() {
        return ExitCode::FAILURE;
    }
    if dump {
        let mut stdout = std::io::stdout();
        if dump_symbols(&result, &mut stdout).is_err() {
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

fn run_lex(path: &str) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: {path}: {err}");
            return ExitCode::FAILURE;
        }
    };
    let strings = sabre_ir::StringInterner::new();
    let tokens = sabre_lexer::lex(&source, &strings);
    for token in &tokens {
        println!("{:?} @ {:?}", token.kind, token.span);
    }
    ExitCode::SUCCESS
}

fn run_parse(path: &str, color: ColorMode) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: {path}: {err}");
            return ExitCode::FAILURE;
        }
    };
    let strings = sabre_ir::StringInterner::new();
    let tokens = sabre_lexer::lex(&source, &strings);
    let mut sources = sabre_diagnostic::SourceMap::new();
    let file = sources.add(path, source);
    let mut arena = sabre_ir::AstArena::new();
    let mut diags = sabre_diagnostic::DiagnosticList::new();
    let decls = sabre_parse::parse_file(&tokens, file, &strings, &mut arena, &mut diags);

    println!("{} top-level declarations", decls.len());
    let mut emitter = TerminalEmitter::stderr(color);
    emitter.emit_all(diags.all(), &sources);
    if diags.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_usage() {
    println!("Sabre shading language compiler");
    println!();
    println!("Usage: sabrec <command> [options] <path>");
    println!();
    println!("Commands:");
    println!("  check <path>         Type-check a package (a .sabre file or a directory)");
    println!("  dump-symbols <path>  Check, then print reachable symbols and bindings");
    println!("  parse <file>         Parse a single file and report syntax errors");
    println!("  lex <file>           Dump the token stream of a single file");
    println!();
    println!("Options:");
    println!("  --color=auto|always|never   Diagnostic color output (default: auto)");
    println!();
    println!("Environment:");
    println!("  SABRE_LOG            Tracing filter (RUST_LOG syntax)");
}
