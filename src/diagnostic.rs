use std::io::Write;

use crate::compile_error::{CompileError, ErrorHandler, Recovery};
use crate::frontend::source::Source;

/// Widest excerpt of the offending line shown under a diagnostic.
pub const HINT_WIDTH: usize = 74;

/// Renders `error` as three lines:
///
/// ```text
/// 2: Name of declared variable expected
/// var = 1
///     ^
/// ```
///
/// The excerpt is centered on the error position, clipped to the physical
/// line and never wider than [`HINT_WIDTH`]. Carriage returns and tabs in it
/// are replaced by spaces so that the caret column stays right.
pub fn format_diagnostic(source: &Source<'_>, error: &CompileError) -> String {
    let pos = error.location.begin.min(source.len());
    let line = source.line_bounds(pos);
    let half = HINT_WIDTH / 2;

    let hint_begin = pos.saturating_sub(half).max(line.begin);
    let hint_end = (pos + half).min(line.end);

    let hint: Vec<u8> = source.text().as_bytes()[hint_begin..hint_end]
        .iter()
        .map(|&b| match b {
            b'\r' | b'\t' => b' ',
            other => other,
        })
        .collect();

    format!(
        "{}: {}\n{}\n{}^\n",
        source.line_index(pos) + 1,
        error.message,
        String::from_utf8_lossy(&hint),
        " ".repeat(pos - hint_begin)
    )
}

/// `"1 error"`, `"3 errors"`.
pub fn error_summary(count: usize) -> String {
    if count == 1 {
        "1 error".to_string()
    } else {
        format!("{} errors", count)
    }
}

/// Diagnostic sink used by the driver.
///
/// Prints every error it is handed, counts them, and answers with a fixed
/// recovery policy.
pub struct Reporter<'s, W: Write> {
    source: &'s Source<'s>,
    out: W,
    policy: Recovery,
    errors: usize,
}

impl<'s, W: Write> Reporter<'s, W> {
    pub fn new(source: &'s Source<'s>, out: W) -> Self {
        Reporter {
            source,
            out,
            policy: Recovery::Continue,
            errors: 0,
        }
    }

    /// Stop at the first error instead of resynchronizing.
    pub fn stop_on_first_error(mut self) -> Self {
        self.policy = Recovery::Abort;
        self
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()) {
            log::warn!("could not write diagnostic: {}", e);
        }
    }

    /// Writes the `N error(s)` summary when anything was reported.
    pub fn finish(&mut self) {
        if self.errors > 0 {
            let summary = format!("{}\n", error_summary(self.errors));
            self.emit(&summary);
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ErrorHandler for Reporter<'_, W> {
    fn handle_error(&mut self, error: &CompileError) -> Recovery {
        self.errors += 1;
        let text = format_diagnostic(self.source, error);
        self.emit(&text);
        self.policy
    }
}
