//! Compiler engine boundary
//!
//! The actual parsing, type checking and code generation are done by an
//! external engine. This module defines what the engine is given (root
//! identifiers, options and a [`CompilerHost`]) and what it hands back.

use serde::{Deserialize, Serialize};

use crate::host::CompilerHost;
use crate::module_id::ModuleId;

/// Language level of the emitted code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptTarget {
    Es5,
    Es2015,
    Es2020,
    EsNext,
}

/// Module format of the emitted code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    CommonJs,
    Es2015,
    EsNext,
}

/// Options passed to the engine for every compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    /// Suppress all output when any diagnostic is reported
    pub no_emit_on_error: bool,
    /// Reject expressions whose type silently widens to `any`
    pub no_implicit_any: bool,
    /// Accept decorator syntax
    pub experimental_decorators: bool,
    /// Language level of emitted code
    pub target: ScriptTarget,
    /// Module format of emitted code
    pub module: ModuleKind,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            no_emit_on_error: true,
            no_implicit_any: true,
            experimental_decorators: true,
            target: ScriptTarget::EsNext,
            module: ModuleKind::EsNext,
        }
    }
}

/// A diagnostic message, possibly with nested detail messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageChain {
    /// Text of this message
    pub text: String,
    /// More specific messages explaining this one
    pub next: Vec<MessageChain>,
}

impl MessageChain {
    /// A message without details
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            next: Vec::new(),
        }
    }

    /// Add a detail message
    pub fn with_next(mut self, next: MessageChain) -> Self {
        self.next.push(next);
        self
    }

    /// Flatten the chain into a single string.
    ///
    /// Each nested message starts on a new line, indented by two spaces per
    /// nesting level.
    pub fn flatten(&self, new_line: &str) -> String {
        let mut out = String::new();
        self.flatten_into(&mut out, new_line, 0);
        out
    }

    fn flatten_into(&self, out: &mut String, new_line: &str, indent: usize) {
        if indent > 0 {
            out.push_str(new_line);
            for _ in 0..indent {
                out.push_str("  ");
            }
        }
        out.push_str(&self.text);
        for next in &self.next {
            next.flatten_into(out, new_line, indent + 1);
        }
    }
}

impl From<&str> for MessageChain {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for MessageChain {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// A problem reported by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// File the diagnostic points into, as the engine named it
    pub file: Option<String>,
    /// Byte offset of the start of the problem in `file`
    pub start: Option<usize>,
    /// What went wrong
    pub message: MessageChain,
}

impl Diagnostic {
    /// A diagnostic located in `file` at byte offset `start`
    pub fn at(file: impl Into<String>, start: usize, message: impl Into<MessageChain>) -> Self {
        Self {
            file: Some(file.into()),
            start: Some(start),
            message: message.into(),
        }
    }

    /// A diagnostic that is not tied to any file
    pub fn global(message: impl Into<MessageChain>) -> Self {
        Self {
            file: None,
            start: None,
            message: message.into(),
        }
    }
}

/// Outcome of one engine invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitResult {
    /// The engine wrote nothing because of errors
    pub emit_skipped: bool,
    /// Problems found while compiling
    pub diagnostics: Vec<Diagnostic>,
}

impl EmitResult {
    /// Successful emit without diagnostics
    pub fn emitted() -> Self {
        Self::default()
    }

    /// Emit suppressed because of `diagnostics`
    pub fn skipped(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            emit_skipped: true,
            diagnostics,
        }
    }
}

/// An external compiler.
///
/// The engine is expected to read every file it needs (including the
/// standard library) through `host`, and to report every emitted artifact via
/// [`CompilerHost::write_file`].
pub trait CompilerEngine {
    /// Compile `roots` and everything they import
    fn emit(
        &mut self,
        roots: &[ModuleId],
        options: &CompileOptions,
        host: &mut dyn CompilerHost,
    ) -> EmitResult;
}
