//! Diagnostic records collected across the passes.
//!
//! Recoverable problems (reduction and tag errors) accumulate here while the
//! parse keeps going; once [`MAX_ERRORS`] is reached the whole parse aborts.

use serde::Serialize;
use std::fmt;

/// The number of errors after which the parse gives up.
pub const MAX_ERRORS: usize = 25;

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// Does not prevent later phases from running.
    Warning,

    /// A syntax error in the program text.
    Error,

    /// The front end contradicted itself; always a bug.
    Internal,
}

/// A single diagnostic, ordered by source position.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub path: String,
    /// Line numbers `<= 0` mark synthetic prelude/postlude lines, which are
    /// not shown to the user.
    pub line: i32,
    pub column: u32,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(
                f,
                "{}:{}:{}: {}: {}",
                self.path, self.line, self.column, self.severity, self.message
            )
        } else {
            write!(f, "{}: {}: {}", self.path, self.severity, self.message)
        }
    }
}

/// The accumulating diagnostics sink passed alongside the tree through every
/// pass.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    errors: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity >= Severity::Error {
            self.errors += 1;
        }

        log::debug!("diagnostic: {}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn warning(&mut self, path: &str, line: i32, column: u32, message: impl Into<String>) {
        self.add(Diagnostic {
            severity: Severity::Warning,
            path: path.to_string(),
            line,
            column,
            message: message.into(),
        });
    }

    pub fn error(&mut self, path: &str, line: i32, column: u32, message: impl Into<String>) {
        self.add(Diagnostic {
            severity: Severity::Error,
            path: path.to_string(),
            line,
            column,
            message: message.into(),
        });
    }

    pub fn internal(&mut self, path: &str, line: i32, column: u32, message: impl Into<String>) {
        self.add(Diagnostic {
            severity: Severity::Internal,
            path: path.to_string(),
            line,
            column,
            message: message.into(),
        });
    }

    /// Whether the error ceiling has been reached and the parse should stop
    /// discovering further problems.
    pub fn exhausted(&self) -> bool {
        self.errors >= MAX_ERRORS
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<Diagnostic> {
        self.items
    }
}
