//! Reviewer adapters.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use super::request::{ManualEdit, ReviewAction, ReviewRequest};

/// Errors from collecting a human decision.
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Review I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Result of asking a reviewer.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewOutcome {
    Decided(ReviewAction),
    /// The reviewer quit or input ended; no further invoices should be asked about.
    Stopped,
}

/// Something that can answer review requests.
pub trait Reviewer {
    /// Ask for a decision on one escalated invoice.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError` if the reviewer cannot be reached.
    fn review(&mut self, request: &ReviewRequest) -> Result<ReviewOutcome, ReviewError>;
}

impl<T: Reviewer + ?Sized> Reviewer for Box<T> {
    fn review(&mut self, request: &ReviewRequest) -> Result<ReviewOutcome, ReviewError> {
        (**self).review(request)
    }
}

/// Reviewer that gives the same answer every time.
#[derive(Debug, Clone)]
pub struct FixedReviewer {
    action: ReviewAction,
}

impl FixedReviewer {
    #[must_use]
    pub fn new(action: ReviewAction) -> Self {
        Self { action }
    }

    #[must_use]
    pub fn agree() -> Self {
        Self::new(ReviewAction::Agree)
    }

    #[must_use]
    pub fn skip() -> Self {
        Self::new(ReviewAction::Skip)
    }
}

impl Reviewer for FixedReviewer {
    fn review(&mut self, request: &ReviewRequest) -> Result<ReviewOutcome, ReviewError> {
        tracing::debug!(invoice_id = %request.invoice_id, action = ?self.action, "Fixed review");
        Ok(ReviewOutcome::Decided(self.action.clone()))
    }
}

/// Line-oriented interactive reviewer.
///
/// Empty input agrees, `q` stops, end of input stops.
pub struct TerminalReviewer<R, W> {
    input: R,
    output: W,
}

impl TerminalReviewer<io::StdinLock<'static>, io::Stdout> {
    /// Reviewer on the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalReviewer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Read one trimmed line. `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>, ReviewError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt(&mut self, text: &str) -> Result<Option<String>, ReviewError> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        self.read_line()
    }

    fn show(&mut self, request: &ReviewRequest) -> Result<(), ReviewError> {
        writeln!(self.output)?;
        writeln!(
            self.output,
            "Review required for {} ({})",
            request.invoice_id, request.vendor
        )?;
        writeln!(self.output, "Reasoning: {}", request.reasoning)?;
        writeln!(self.output, "Confidence: {:.2}", request.confidence_score)?;
        if request.proposed.is_empty() {
            writeln!(self.output, "No suggestions.")?;
        }
        for suggestion in &request.proposed {
            writeln!(self.output, "  - {}", suggestion.describe())?;
        }
        Ok(())
    }

    /// Collect field/value pairs until an empty field name.
    fn collect_edits(&mut self) -> Result<Option<Vec<ManualEdit>>, ReviewError> {
        let mut edits = Vec::new();
        loop {
            let Some(field) = self.prompt("Field (empty to finish): ")? else {
                return Ok(None);
            };
            if field.is_empty() {
                return Ok(Some(edits));
            }
            let Some(value) = self.prompt(&format!("Value for {field}: "))? else {
                return Ok(None);
            };
            edits.push(ManualEdit::parse(field, &value));
        }
    }
}

impl<R: BufRead, W: Write> Reviewer for TerminalReviewer<R, W> {
    fn review(&mut self, request: &ReviewRequest) -> Result<ReviewOutcome, ReviewError> {
        self.show(request)?;
        loop {
            let Some(answer) = self.prompt("(a)gree / (m)odify / (s)kip / (q)uit [a]: ")? else {
                return Ok(ReviewOutcome::Stopped);
            };
            match answer.to_ascii_lowercase().as_str() {
                "" | "a" | "agree" => return Ok(ReviewOutcome::Decided(ReviewAction::Agree)),
                "s" | "skip" => return Ok(ReviewOutcome::Decided(ReviewAction::Skip)),
                "q" | "quit" => return Ok(ReviewOutcome::Stopped),
                "m" | "modify" => {
                    return Ok(match self.collect_edits()? {
                        Some(edits) => ReviewOutcome::Decided(ReviewAction::Modify(edits)),
                        None => ReviewOutcome::Stopped,
                    });
                }
                other => writeln!(self.output, "Unknown choice '{other}'")?,
            }
        }
    }
}
