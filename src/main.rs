use std::{env, fs, io, process};
use viewcast::error::{Error, ProgramError};
use viewcast::report::Report;
use viewcast::run_program;

const EXIT_DATA_ERROR: i32 = 65;
const EXIT_SOFTWARE_ERROR: i32 = 70;

fn main() {
    init_tracing();
    let args: Vec<String> = env::args().skip(1).collect();

    match args.as_slice() {
        [path] => run_file(path),
        _ => println!("Usage: viewcast <program-file>"),
    }
}

/// Enable with `RUST_LOG=viewcast=debug` or `RUST_LOG=viewcast=trace`.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run_file(path: &str) {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) => {
            println!("{}", read_error_message(path, &error));
            return;
        }
    };

    match run_program(&content, |output| println!("{}", output)) {
        Ok(interpreter) => print!("{}", Report::new(&interpreter)),
        Err(error) => {
            eprintln!("{}", error.description());
            let code = match error {
                ProgramError::Load(_) => EXIT_DATA_ERROR,
                ProgramError::Runtime(_) => EXIT_SOFTWARE_ERROR,
            };
            process::exit(code);
        }
    }
}

fn read_error_message(path: &str, error: &io::Error) -> String {
    match error.kind() {
        io::ErrorKind::NotFound => format!("Error: file '{}' not found.", path),
        _ => format!("Error: cannot read '{}': {}", path, error),
    }
}
