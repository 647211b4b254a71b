//! Colored terminal output utilities.

use console::{Style, Term};

/// Color of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Plain,
    Success,
    Warning,
    Error,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Plain => Style::new(),
            Self::Success => Style::new().green(),
            Self::Warning => Style::new().yellow(),
            Self::Error => Style::new().red(),
        }
    }
}

/// Terminal output formatter.
///
/// Status lines go to stderr; rewritten documents go to stdout.
pub(crate) struct Output {
    stderr: Term,
    stdout: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            stderr: Term::stderr(),
            stdout: Term::stdout(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(Tone::Plain, msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.line(Tone::Success, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.line(Tone::Warning, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(Tone::Error, msg);
    }

    /// Write a document to stdout unchanged.
    pub(crate) fn document(&self, content: &str) -> std::io::Result<()> {
        self.stdout.write_str(content)?;
        self.stdout.flush()
    }

    fn line(&self, tone: Tone, msg: &str) {
        // Status output is best effort.
        let _ = self
            .stderr
            .write_line(&tone.style().apply_to(msg).to_string());
    }
}
