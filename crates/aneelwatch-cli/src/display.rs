//! Vertical card display for extracted records.
//!
//! Renders one [`DocumentRecord`] as a grouped, human-readable card for the
//! terminal, used by `aneelwatch extract --format card`.

use aneelwatch_core::DocumentRecord;
use chrono::NaiveDate;

const LABEL_WIDTH: usize = 16;

// ── Public API ──

/// Print a single record as a vertical card grouped by section.
pub fn print_record_card(rec: &DocumentRecord) {
    print!("{}", render_record_card(rec));
}

/// The card text printed by [`print_record_card`].
pub fn render_record_card(rec: &DocumentRecord) -> String {
    let mut out = String::new();
    let heading = if rec.title.is_empty() { "(sem título)" } else { rec.title.as_str() };
    out.push_str(&format!("=== {heading} ===\n\n"));

    section(
        &mut out,
        "Identity",
        &[
            ("document_number", rec.document_number.clone()),
            ("subject", rec.subject.clone()),
            ("summary", rec.summary.clone()),
        ],
    );
    section(
        &mut out,
        "Dates",
        &[
            ("signing_date", fmt_date(rec.signing_date)),
            ("publication_date", fmt_date(rec.publication_date)),
        ],
    );
    section(
        &mut out,
        "Links",
        &[
            ("full_text_url", Some(rec.full_text_url.clone())),
            ("technical_note", rec.technical_note_url.clone()),
        ],
    );
    section(
        &mut out,
        "Provenance",
        &[
            ("search_term", Some(rec.search_term.clone()).filter(|t| !t.is_empty())),
            ("search_date", fmt_date(Some(rec.search_date))),
        ],
    );
    out
}

// ── Internals ──

fn fmt_date(d: Option<NaiveDate>) -> Option<String> {
    d.map(|d| d.format("%d/%m/%Y").to_string())
}

/// Append a section, skipping absent values; the heading is omitted when all are absent.
fn section(out: &mut String, title: &str, rows: &[(&str, Option<String>)]) {
    let present: Vec<_> = rows
        .iter()
        .filter_map(|(k, v)| v.as_deref().map(|v| (k, v)))
        .collect();
    if present.is_empty() {
        return;
    }
    out.push_str(&format!("-- {title} --\n"));
    for (k, v) in present {
        out.push_str(&format!("  {k:<LABEL_WIDTH$} {v}\n"));
    }
    out.push('\n');
}
