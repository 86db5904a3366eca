//! Diagnostic collection and rendering.
//!
//! Every phase of the front-end reports problems through a shared
//! [`Handler`]: the lexer pushes warnings for unknown bytes, the parser
//! pushes its single furthest-failure error, the analyzer pushes one record
//! per finding. The handler only collects; rendering happens once, at the
//! end, in the driver.
//!
//! The rendered line format is `<file>:<line>:<column>: <message>`.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, IsTerminal, Write};

/// Diagnostic severity.
///
/// `Fatal` is reserved for the embedding layer; the front-end itself only
/// produces warnings and errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// Recoverable; does not fail the build.
    Warning,
    /// Reported and fails the build at the end of the phase.
    Error,
    /// Unrecoverable; never emitted by the core phases.
    Fatal,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Warning => write!(f, "warning"),
            Level::Error => write!(f, "error"),
            Level::Fatal => write!(f, "fatal"),
        }
    }
}

/// One collected diagnostic record.
///
/// The location fields are kept separate in memory; the `file:line:column:`
/// form only exists in rendered output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        level: Level,
        file: impl Into<String>,
        line: u32,
        column: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            file: file.into(),
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(
        file: impl Into<String>,
        line: u32,
        column: u32,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Level::Warning, file, line, column, message)
    }

    /// Create an error diagnostic.
    pub fn error(
        file: impl Into<String>,
        line: u32,
        column: u32,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Level::Error, file, line, column, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.file, self.line, self.column, self.message
        )
    }
}

const C_RESET: &str = "\x1b[0m";
const C_RED: &str = "\x1b[31m";
const C_YELLOW: &str = "\x1b[33m";
const C_BOLD_RED: &str = "\x1b[1;31m";

fn level_color(level: Level) -> &'static str {
    match level {
        Level::Warning => C_YELLOW,
        Level::Error => C_RED,
        Level::Fatal => C_BOLD_RED,
    }
}

/// Returns true when stderr output may carry ANSI colors: stderr must be a
/// terminal and `NO_COLOR` must be unset (https://no-color.org/).
pub fn stderr_supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return false;
    }
    io::stderr().is_terminal()
}

/// Collector of diagnostics shared across the pipeline.
///
/// Interior mutability lets every component hold `&Handler` simultaneously;
/// records are appended in call order and iterated later by the driver.
///
/// # Examples
///
/// ```
/// use voltc_util::Handler;
///
/// let handler = Handler::new();
/// handler.error("main.vlt", 3, 14, "Undefined symbol 'x'");
/// assert!(handler.has_errors());
/// assert_eq!(handler.error_count(), 1);
/// ```
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    /// Push a pre-built diagnostic.
    pub fn push(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Push a warning at the given location.
    pub fn warning(&self, file: &str, line: u32, column: u32, message: impl Into<String>) {
        self.push(Diagnostic::warning(file, line, column, message));
    }

    /// Push an error at the given location.
    pub fn error(&self, file: &str, line: u32, column: u32, message: impl Into<String>) {
        self.push(Diagnostic::error(file, line, column, message));
    }

    /// True if any error- or fatal-severity diagnostic has been pushed.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level != Level::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level != Level::Warning)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Warning)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.borrow().is_empty()
    }

    /// Snapshot of all collected diagnostics, in push order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Render every diagnostic to `out`, one per line.
    pub fn render(&self, out: &mut dyn Write, color: bool) -> io::Result<()> {
        for diag in self.diagnostics.borrow().iter() {
            if color {
                writeln!(
                    out,
                    "{}:{}:{}: {}{}{}",
                    diag.file,
                    diag.line,
                    diag.column,
                    level_color(diag.level),
                    diag.message,
                    C_RESET
                )?;
            } else {
                writeln!(out, "{}", diag)?;
            }
        }
        Ok(())
    }

    /// Render every diagnostic to stderr, colorized when the terminal
    /// supports it.
    pub fn emit_stderr(&self) {
        let color = stderr_supports_color();
        let stderr = io::stderr();
        let _ = self.render(&mut stderr.lock(), color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_display() {
        assert_eq!(format!("{}", Level::Warning), "warning");
        assert_eq!(format!("{}", Level::Error), "error");
        assert_eq!(format!("{}", Level::Fatal), "fatal");
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error("main.vlt", 3, 14, "Undefined symbol 'x'");
        assert_eq!(format!("{}", diag), "main.vlt:3:14: Undefined symbol 'x'");
    }

    #[test]
    fn test_handler_counts() {
        let handler = Handler::new();
        assert!(handler.is_empty());
        handler.warning("a.vlt", 1, 1, "odd byte");
        handler.error("a.vlt", 2, 5, "bad");
        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 1);
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn test_handler_order_preserved() {
        let handler = Handler::new();
        handler.error("a.vlt", 1, 1, "first");
        handler.error("a.vlt", 2, 1, "second");
        let diags = handler.diagnostics();
        assert_eq!(diags[0].message, "first");
        assert_eq!(diags[1].message, "second");
    }

    #[test]
    fn test_handler_no_errors_for_warnings() {
        let handler = Handler::new();
        handler.warning("a.vlt", 1, 1, "just a warning");
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_render_plain() {
        let handler = Handler::new();
        handler.error("m.vlt", 7, 2, "boom");
        let mut buf = Vec::new();
        handler.render(&mut buf, false).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "m.vlt:7:2: boom\n");
    }

    #[test]
    fn test_render_color_wraps_message() {
        let handler = Handler::new();
        handler.warning("m.vlt", 1, 1, "hm");
        let mut buf = Vec::new();
        handler.render(&mut buf, true).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\x1b[33m"));
        assert!(text.contains("\x1b[0m"));
        assert!(text.starts_with("m.vlt:1:1: "));
    }
}
