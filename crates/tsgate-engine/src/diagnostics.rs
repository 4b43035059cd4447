//! Diagnostic fallback payloads
//!
//! When the engine suppresses emission, the requester still receives a
//! script: one `console.error(...)` statement per diagnostic, so the problems
//! show up in the console of whoever loaded the module.

use std::fmt;

use crate::engine::Diagnostic;
use crate::host::CompilerHost;

/// Human-readable position of a diagnostic (1-based line and column)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for DiagnosticLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({},{})", self.file, self.line, self.column)
    }
}

/// Convert a byte offset into 1-based (line, column) coordinates.
///
/// Columns count characters. Offsets past the end or inside a multi-byte
/// character are clamped to the preceding character boundary.
pub fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &text[..offset];
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = before.matches('\n').count() + 1;
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Locate a diagnostic using the text `host` serves for its file
pub fn locate(diagnostic: &Diagnostic, host: &dyn CompilerHost) -> Option<DiagnosticLocation> {
    let file = diagnostic.file.as_ref()?;
    let start = diagnostic.start.unwrap_or(0);
    let (line, column) = match host.read_file(file) {
        Some(text) => line_col(text, start),
        None => (1, start + 1),
    };
    Some(DiagnosticLocation {
        file: file.clone(),
        line,
        column,
    })
}

/// Render one diagnostic as a `console.error` statement
pub fn render_statement(diagnostic: &Diagnostic, host: &dyn CompilerHost) -> String {
    let message = diagnostic.message.flatten(host.new_line());
    let text = match locate(diagnostic, host) {
        Some(location) => format!("{location}: {message}"),
        None => message,
    };
    format!("console.error({});", serde_json::Value::String(text))
}

/// Build the script served in place of a module whose emission was suppressed
pub fn fallback_payload(diagnostics: &[Diagnostic], host: &dyn CompilerHost) -> String {
    diagnostics
        .iter()
        .map(|d| render_statement(d, host))
        .collect::<Vec<_>>()
        .join("\n")
}
