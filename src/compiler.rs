//! Whole-unit compilation: source text to [`Unit`], with every error routed
//! through the caller's [`ErrorHandler`] exactly once.

use thiserror::Error;

use crate::bytecode::{Unit, compile::Compiler};
use crate::compile_error::ErrorHandler;
use crate::frontend::{parser::Parser, scanner::Scanner, source::Source};
use crate::lang::function::FunctionTree;

/// Compilation produced no unit. The reasons went to the error handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("compilation failed")]
pub struct CompilationFailed;

/// Parses `source` into the top-level function.
///
/// Fails if the handler aborted or any error was recovered from: a tree
/// assembled around skipped lines is not compiled.
pub fn parse(
    source: &Source<'_>,
    handler: &mut dyn ErrorHandler,
) -> Result<FunctionTree, CompilationFailed> {
    let mut parser = Parser::new(Scanner::new(source), handler);
    // An aborting error has already been handed to the handler.
    let tree = parser.parse_unit().map_err(|_| CompilationFailed)?;

    let recovered = parser.recovered_errors();
    if recovered > 0 {
        log::debug!("{} syntax error(s) recovered, skipping code generation", recovered);
        return Err(CompilationFailed);
    }
    Ok(tree)
}

/// Generates the unit for an already parsed tree.
pub fn generate(
    source: &Source<'_>,
    tree: &FunctionTree,
    handler: &mut dyn ErrorHandler,
) -> Result<Unit, CompilationFailed> {
    Compiler::new(source).compile_unit(tree).map_err(|error| {
        // Generation stops at its first error whatever the handler answers.
        handler.handle_error(&error);
        CompilationFailed
    })
}

pub fn compile(source: &Source<'_>, handler: &mut dyn ErrorHandler) -> Result<Unit, CompilationFailed> {
    let tree = parse(source, handler)?;
    let unit = generate(source, &tree, handler)?;
    log::info!("compiled {} function(s)", unit.functions.len());
    Ok(unit)
}
