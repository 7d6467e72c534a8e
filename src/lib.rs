use interpreter::{Interpreter, Output};
use error::ProgramError;

pub mod class;
pub mod environment;
pub mod error;
pub mod expression;
pub mod interpreter;
pub mod loader;
pub mod object;
pub mod parser;
pub mod report;
pub mod scanner;
pub mod statement;
pub mod token;
pub mod token_type;

/// Loads `source` and executes its statements, handing every `call` and `is`
/// result to `emit` as it happens.
pub fn run_program<F>(source: &str, emit: F) -> Result<Interpreter, ProgramError>
where
    F: FnMut(&Output),
{
    let program = loader::load(source)?;
    let mut interpreter = Interpreter::new(program.classes);
    interpreter.interpret(&program.statements, emit)?;
    Ok(interpreter)
}
