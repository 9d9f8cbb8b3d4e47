//! Colored CLI display utilities for batch runs and memory inspection.

use std::io::{self, Write};
use std::path::Path;

use chrono::Utc;
use owo_colors::OwoColorize;

use crate::agent::ProcessingResult;
use crate::batch::BatchReport;
use crate::invoice::HumanReview;

/// Get current timestamp in the same format as tracing.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Truncate a string to at most `max_len` characters, adding an ellipsis if truncated.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}

/// Print the header shown before an invoice is processed.
pub fn print_invoice_header(invoice_id: &str, vendor: &str) {
    println!();
    println!(
        "{} {} Processing {} | {}",
        timestamp().dimmed(),
        "[INVOICE]".blue().bold(),
        invoice_id.bold(),
        vendor.cyan()
    );
    let _ = io::stdout().flush();
}

/// Print the outcome of processing one invoice.
pub fn print_result(result: &ProcessingResult) {
    println!(
        "  Confidence: {:.2}  Applied: {}/{}",
        result.confidence_score,
        result.applied,
        result.suggestion_count()
    );
    if !result.ai_available {
        println!("  {}", "AI unavailable, no suggestions".yellow());
    }
    for correction in &result.proposed_corrections {
        println!("  {} {correction}", "•".dimmed());
    }
    println!("  Reasoning: {}", result.reasoning.dimmed());
    if result.requires_human_review {
        println!("  {}", "[REVIEW REQUIRED]".yellow().bold());
    } else {
        println!("  {}", "[AUTO-APPROVED]".green().bold());
    }
    let _ = io::stdout().flush();
}

/// Print what a human review taught.
pub fn print_memory_update(update: &str) {
    println!("  {} {update}", "[MEMORY]".magenta().bold());
    let _ = io::stdout().flush();
}

/// Print the end-of-run summary.
pub fn print_batch_summary(report: &BatchReport, results_path: &Path, snapshot_path: &Path) {
    println!();
    if report.stopped {
        println!("{} Review stopped by user", "[STOPPED]".yellow().bold());
    }
    println!(
        "{} {} processed, {} auto-approved, {} escalated, {} learned",
        "[DONE]".green().bold(),
        report.results.len(),
        report.auto_approved(),
        report.escalated(),
        report.learned
    );
    println!("  Results: {}", results_path.display().to_string().cyan());
    println!("  Memory:  {}", snapshot_path.display().to_string().cyan());
    let _ = io::stdout().flush();
}

/// Print learned reviews as a table, one row per correction.
pub fn print_memory_table(reviews: &[HumanReview]) {
    if reviews.is_empty() {
        println!("{}", "No learned corrections.".dimmed());
        let _ = io::stdout().flush();
        return;
    }

    println!(
        "{:<14} {:<24} {:<20} {:<20} {}",
        "INVOICE".bold(),
        "VENDOR".bold(),
        "FIELD".bold(),
        "VALUE".bold(),
        "DECISION".bold()
    );
    for review in reviews {
        for correction in &review.corrections {
            println!(
                "{:<14} {:<24} {:<20} {:<20} {}",
                truncate(&review.invoice_id, 14),
                truncate(&review.vendor, 24).cyan(),
                truncate(&correction.field, 20),
                truncate(&correction.to.to_string(), 20),
                review.final_decision.green()
            );
        }
    }
    let corrections: usize = reviews.iter().map(|r| r.corrections.len()).sum();
    println!(
        "{}",
        format!("{} review(s), {corrections} correction(s)", reviews.len()).dimmed()
    );
    let _ = io::stdout().flush();
}

/// Print a warning.
pub fn print_warning(message: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), message);
    let _ = io::stdout().flush();
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), message);
    let _ = io::stderr().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_very_short_max() {
        assert_eq!(truncate("hello", 3), "...");
        assert_eq!(truncate("hello", 0), "...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("Müller Großhandel GmbH", 10), "Müller ...");
    }
}
