// ABOUTME: CLI driver: reads a script, parses it, and walks the tree

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser as CliParser;

use treelox::config;
use treelox::error::SourceError;
use treelox::eval::Interpreter;
use treelox::parser::Parser;
use treelox::report;

/// Tree-walking interpreter for a small scripting language
#[derive(CliParser, Debug)]
#[command(name = "treelox")]
#[command(version = config::VERSION)]
#[command(about = "A tree-walking Lox interpreter")]
struct CliArgs {
    /// Script file to execute
    #[arg(value_name = "FILE")]
    script: PathBuf,

    /// Print the parsed program instead of executing it
    #[arg(long = "dump-ast")]
    dump_ast: bool,
}

const EXIT_PARSE_ERROR: u8 = 65;
const EXIT_RUNTIME_ERROR: u8 = 70;

fn main() -> ExitCode {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // usage problems and --help/--version are not failures
            println!("{}", err.render());
            return ExitCode::SUCCESS;
        }
    };

    let source = match read_source(&args.script) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let file = args.script.display().to_string();
    let (program, diagnostics) = Parser::new(&source).parse();
    if !diagnostics.is_empty() {
        for diagnostic in &diagnostics {
            println!(
                "{}",
                report::render_parse_diagnostic(&file, &source, diagnostic)
            );
        }
        return ExitCode::from(EXIT_PARSE_ERROR);
    }

    if args.dump_ast {
        for stmt in &program {
            println!("{stmt}");
        }
        return ExitCode::SUCCESS;
    }

    let stdout = io::stdout();
    let mut interpreter = Interpreter::new(stdout.lock());
    if let Err(error) = interpreter.interpret(&program) {
        println!("{}", report::render_runtime_error(&file, &source, &error));
        return ExitCode::from(EXIT_RUNTIME_ERROR);
    }

    ExitCode::SUCCESS
}

/// Reads the script as raw bytes, refusing directories and oversized files.
fn read_source(path: &Path) -> Result<Vec<u8>, SourceError> {
    let display = path.display().to_string();
    let metadata = fs::metadata(path).map_err(|e| SourceError::from_io(&display, e))?;
    if metadata.is_dir() {
        return Err(SourceError::IsADirectory(display));
    }
    if metadata.len() > config::MAX_SOURCE_BYTES {
        return Err(SourceError::TooLarge(display));
    }
    fs::read(path).map_err(|e| SourceError::from_io(&display, e))
}
