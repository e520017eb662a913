pub mod ast;
pub mod error;
mod lexer;
pub mod parser;
pub mod resolver;
pub mod scope;
mod side_table;
mod source;
mod source_reference;
mod token_stream;
pub mod tokenizer;
mod tree_walk_interpreter;
pub mod types;

pub use error::{ErrorCategory, LangError};
pub use parser::{Parser, ParserError};
pub use resolver::{Resolutions, Resolver, ResolverError};
pub use source::{SourceOffset, SourceSpan};
pub use source_reference::SourceReference;
pub use tokenizer::{Token, Tokenizer, TokenizerError};
pub use tree_walk_interpreter::{Interpreter, PreparedProgram, RuntimeError, RuntimeValue};

use std::io::Write;

/// Diagnostic output requested alongside the program's own output.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub dump_tokens: bool,
    pub dump_ast: bool,
}

/// Tokenizes, parses, resolves and runs a program, writing everything it
/// prints to `stdout`.
pub fn run<W: Write>(
    source_reference: SourceReference,
    options: RunOptions,
    stdout: &mut W,
) -> Result<(), LangError> {
    let tokens = Tokenizer::tokenize(source_reference.clone())?;
    tracing::debug!(tokens = tokens.len(), "tokenized");
    if options.dump_tokens {
        for token in &tokens {
            writeln!(stdout, "{:?} {}", token.name(), token).map_err(RuntimeError::Output)?;
        }
    }

    let program = Parser::parse(tokens, source_reference)?;
    if options.dump_ast {
        write!(stdout, "{}", program).map_err(RuntimeError::Output)?;
    }

    let mut interpreter = Interpreter::new(stdout);
    let prepared = interpreter.prepare(program)?;
    interpreter.interpret(&prepared)?;
    Ok(())
}
