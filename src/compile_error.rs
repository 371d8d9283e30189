use thiserror::Error;

use crate::frontend::source::SourceRange;

/// An error raised by any compiler stage, anchored to the exact source
/// position of the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
    pub location: SourceRange,
}

impl CompileError {
    pub fn new(message: impl Into<String>, location: SourceRange) -> Self {
        CompileError {
            message: message.into(),
            location,
        }
    }
}

/// What the parser should do after handing an error to its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Resynchronize at the next line and keep parsing statements.
    Continue,
    /// Stop parsing and return the error.
    Abort,
}

/// Receives every error the pipeline raises, exactly once.
pub trait ErrorHandler {
    fn handle_error(&mut self, error: &CompileError) -> Recovery;
}

impl<F> ErrorHandler for F
where
    F: FnMut(&CompileError) -> Recovery,
{
    fn handle_error(&mut self, error: &CompileError) -> Recovery {
        self(error)
    }
}
