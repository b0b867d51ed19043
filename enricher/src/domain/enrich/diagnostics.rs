//! Diagnostics sink for per-event anomalies
//!
//! Fire-and-forget: implementations must not block or fail.

use std::error::Error;

use parking_lot::Mutex;

pub trait Diagnostics: Send + Sync {
    fn warn(&self, message: &str);

    fn error(&self, message: &str, cause: Option<&dyn Error>);
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn error(&self, message: &str, cause: Option<&dyn Error>) {
        match cause {
            Some(cause) => tracing::error!(error = %error_chain(cause), "{}", message),
            None => tracing::error!("{}", message),
        }
    }
}

/// Render an error and its `source()` chain on one line.
///
/// A source whose text already appears in the rendered message is skipped.
pub fn error_chain(err: &dyn Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !rendered.contains(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        source = cause.source();
    }
    rendered
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Warn,
    Error,
}

/// A diagnostic captured by [`RecordingDiagnostics`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub cause: Option<String>,
}

/// Keeps every diagnostic in memory, for tests and embedding hosts that
/// want to surface stage anomalies themselves.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.with_level(DiagnosticLevel::Warn)
    }

    pub fn errors(&self) -> Vec<Diagnostic> {
        self.with_level(DiagnosticLevel::Error)
    }

    fn with_level(&self, level: DiagnosticLevel) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .iter()
            .filter(|d| d.level == level)
            .cloned()
            .collect()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn warn(&self, message: &str) {
        self.entries.lock().push(Diagnostic {
            level: DiagnosticLevel::Warn,
            message: message.to_string(),
            cause: None,
        });
    }

    fn error(&self, message: &str, cause: Option<&dyn Error>) {
        self.entries.lock().push(Diagnostic {
            level: DiagnosticLevel::Error,
            message: message.to_string(),
            cause: cause.map(error_chain),
        });
    }
}
