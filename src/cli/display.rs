//! Terminal rendering of answers and retrieval diagnostics

use colored::*;

use crate::rag::{PipelineOutcome, QueryReport};

/// Characters of passage text shown in diagnostics
pub const PREVIEW_CHARS: usize = 500;

/// First `max_chars` characters of `content`, with "..." when cut
pub fn preview(content: &str, max_chars: usize) -> String {
    let mut chars = content.char_indices();
    match chars.nth(max_chars) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// Multi-line summary of retrieval and reranking for one query
pub fn format_report(report: &QueryReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} Retrieved {} raw documents.\n",
        "🔍".cyan(),
        report.documents_retrieved
    ));

    if report.passages.is_empty() {
        out.push_str(&format!(
            "{}\n",
            "⚠️ No documents passed the similarity threshold.".yellow()
        ));
        return out;
    }

    out.push_str(&format!(
        "{}\n",
        format!("📊 Similarity scores (Filtered Top {}):", report.passages.len()).bold()
    ));
    for (i, ranked) in report.passages.iter().enumerate() {
        out.push_str(&format!(
            "\n➡️ Document {} - Score: {:.4}\n{}\n",
            i + 1,
            ranked.score,
            preview(&ranked.passage.content, PREVIEW_CHARS).dimmed()
        ));
    }

    if report.context_truncated {
        out.push_str(&format!(
            "\n{}\n",
            format!("Context truncated to {} tokens", report.context_tokens).dimmed()
        ));
    }

    out
}

/// Print one answered question
pub fn show_outcome(question: &str, outcome: &PipelineOutcome, show_context: bool) {
    println!("\n{}", "=".repeat(60).cyan());
    println!("{} {}", "📌 QUESTION:".bold(), question);

    if show_context {
        if let Some(report) = outcome.report() {
            println!("\n{}", format_report(report));
        }
    }

    let answer = outcome.to_answer_string();
    match outcome {
        PipelineOutcome::Answered { .. } => println!("\n{}\n{}", "🧠 ANSWER:".bold().green(), answer),
        PipelineOutcome::InsufficientEvidence { .. } => println!("\n{}", answer.yellow()),
        PipelineOutcome::Failed { .. } => println!("\n{}", answer.red()),
    }
    println!("{}", "=".repeat(60).cyan());
}
