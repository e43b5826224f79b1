//! Plain-text rendering of a run for the notification email.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::model::{DocumentRecord, RunResult};
use crate::relevance::{Relevance, RelevancePolicy};

const DISPLAY_DATE: &str = "%d/%m/%Y";

fn display_date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format(DISPLAY_DATE).to_string())
        .unwrap_or_else(|| "-".into())
}

/// Subject line: `[ANEEL] 3 documento(s) - 05/03/2024`.
pub fn render_subject(result: &RunResult, search_date: NaiveDate) -> String {
    let date = search_date.format(DISPLAY_DATE);
    match result.total_documents {
        0 => format!("[ANEEL] Nenhum documento - {date}"),
        n => format!("[ANEEL] {n} documento(s) - {date}"),
    }
}

/// Message body listing every record, most relevant first when `policy` is set.
pub fn render_body(result: &RunResult, search_date: NaiveDate, policy: &RelevancePolicy) -> String {
    let mut out = String::new();
    let date = search_date.format(DISPLAY_DATE);
    let run_at = result.execution_timestamp.format("%d/%m/%Y %H:%M UTC");

    if result.is_empty() {
        let _ = writeln!(out, "Nenhum documento encontrado na Biblioteca da ANEEL para {date}.");
        let _ = writeln!(out);
        let _ = writeln!(out, "Execução: {run_at}");
        return out;
    }

    let _ = writeln!(
        out,
        "{} documento(s) encontrado(s) na Biblioteca da ANEEL para {date}.",
        result.total_documents
    );
    let _ = writeln!(out, "Execução: {run_at}");
    let _ = writeln!(out);

    let ranked = policy.rank(&result.documents);
    for (i, (relevance, rec)) in ranked.into_iter().enumerate() {
        let label = (!policy.is_empty()).then_some(relevance);
        write_record(&mut out, i + 1, rec, label);
    }
    out
}

fn write_record(out: &mut String, n: usize, rec: &DocumentRecord, relevance: Option<Relevance>) {
    match relevance {
        Some(r) => {
            let _ = writeln!(out, "{n}. [{}] {}", r.label(), rec.title);
        }
        None => {
            let _ = writeln!(out, "{n}. {}", rec.title);
        }
    }
    let _ = writeln!(
        out,
        "   Assinatura: {} | Publicação: {}",
        display_date(rec.signing_date),
        display_date(rec.publication_date)
    );
    if let Some(subject) = &rec.subject {
        let _ = writeln!(out, "   Assunto: {subject}");
    }
    if let Some(summary) = &rec.summary {
        let _ = writeln!(out, "   Ementa: {summary}");
    }
    let _ = writeln!(out, "   Texto Integral: {}", rec.full_text_url);
    if let Some(note) = &rec.technical_note_url {
        let _ = writeln!(out, "   Nota Técnica: {note}");
    }
    let _ = writeln!(out, "   Termo: {}", rec.search_term);
    let _ = writeln!(out);
}
