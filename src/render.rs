//! stdout rendering of summary results, QA answers, and the session history.

use chrono::{DateTime, Local};

use crate::bullets::section_bullets;
use crate::models::{HistoryEntry, QaResponse, SummaryResponse};

pub fn print_summary(resp: &SummaryResponse) {
    println!("--- Summary ---");
    if resp.sections.is_empty() {
        println!("(no sections)");
    }
    for section in &resp.sections {
        let title = if section.title.is_empty() {
            "(untitled)"
        } else {
            &section.title
        };
        println!("{}", title);
        for bullet in section_bullets(section) {
            println!("  - {}", bullet);
        }
        println!();
    }
    if let Some(meta) = &resp.meta {
        println!(
            "model: {} | tokens: {}+{} | latency: {}ms",
            meta.model, meta.prompt_tokens, meta.completion_tokens, meta.latency_ms
        );
    }
}

pub fn print_qa(resp: &QaResponse) {
    println!("--- Answer ---");
    println!("{}", resp.answer);
    if let Some(confidence) = resp.confidence {
        println!("confidence: {}", confidence);
    }
    if !resp.citations.is_empty() {
        println!();
        println!("--- Citations ({}) ---", resp.citations.len());
        for citation in &resp.citations {
            println!(
                "{} p.{} [{}..{}]",
                if citation.source.is_empty() {
                    "(unknown source)"
                } else {
                    &citation.source
                },
                citation.page,
                citation.span[0],
                citation.span[1]
            );
        }
    }
}

pub fn print_history(entries: &[HistoryEntry]) {
    println!("--- History ({}) ---", entries.len());
    for entry in entries {
        println!("{} • {}", format_ts_local(entry.ts), entry.kind);
        println!("  {}", entry.query);
    }
}

fn format_ts_local(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}
