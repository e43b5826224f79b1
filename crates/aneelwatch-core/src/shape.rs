//! Page shape detection: which markup variant a results page uses.

use scraper::{ElementRef, Html, Selector};

use crate::ExtractError;

/// Text the portal shows when a query has zero matches.
pub const NO_RECORDS_MARKER: &str = "nenhum registro encontrado";

/// Default container marker for the card layout.
pub const DEFAULT_CARD_SELECTOR: &str = "div.card-resultado, div.resultado-item, article.resultado";

/// Default marker for the tabular layout.
pub const DEFAULT_TABLE_SELECTOR: &str = "table#tabelaResultado, table.tabela-resultado, table.resultado";

/// Markup variants observed on the results page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageShape {
    /// One container element per result, with labeled sub-fields.
    Card,
    /// One table row per result after a header row.
    Tabular,
    /// The portal confirmed zero matches.
    NoRecords,
    /// Neither layout nor the no-records marker.
    Unknown,
}

/// Compiled selectors that identify each shape.
#[derive(Debug, Clone)]
pub struct ShapeMarkers {
    pub(crate) card: Selector,
    pub(crate) table: Selector,
    pub(crate) row: Selector,
}

impl ShapeMarkers {
    pub fn new(card: &str, table: &str) -> Result<Self, ExtractError> {
        Ok(Self {
            card: parse_selector(card)?,
            table: parse_selector(table)?,
            row: parse_selector("tr")?,
        })
    }

    /// First result table that has at least one row after its header.
    pub(crate) fn result_table<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        doc.select(&self.table)
            .find(|table| table.select(&self.row).nth(1).is_some())
    }
}

impl Default for ShapeMarkers {
    fn default() -> Self {
        Self::new(DEFAULT_CARD_SELECTOR, DEFAULT_TABLE_SELECTOR)
            .expect("built-in shape selectors are valid")
    }
}

pub(crate) fn parse_selector(s: &str) -> Result<Selector, ExtractError> {
    Selector::parse(s).map_err(|e| ExtractError::Selector {
        selector: s.to_string(),
        reason: e.to_string(),
    })
}

impl PageShape {
    /// Classify a parsed page. Structure is checked before the no-records
    /// marker since the marker text can appear in hidden page chrome.
    pub fn detect(doc: &Html, markers: &ShapeMarkers) -> Self {
        if doc.select(&markers.card).next().is_some() {
            return Self::Card;
        }
        if markers.result_table(doc).is_some() {
            return Self::Tabular;
        }
        let text = doc.root_element().text().collect::<String>().to_lowercase();
        if text.contains(NO_RECORDS_MARKER) {
            return Self::NoRecords;
        }
        Self::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(html: &str) -> PageShape {
        PageShape::detect(&Html::parse_document(html), &ShapeMarkers::default())
    }

    #[test]
    fn card_layout() {
        assert_eq!(detect(r#"<div class="card-resultado">x</div>"#), PageShape::Card);
    }

    #[test]
    fn table_layout_needs_a_data_row() {
        let header_only = r#"<table id="tabelaResultado"><tr><th>#</th><th>Ato</th></tr></table>"#;
        assert_eq!(detect(header_only), PageShape::Unknown);

        let with_row = r#"<table id="tabelaResultado">
            <tr><th>#</th><th>Ato</th></tr>
            <tr><td>1</td><td><a href="/a.pdf">A</a></td></tr>
        </table>"#;
        assert_eq!(detect(with_row), PageShape::Tabular);
    }

    #[test]
    fn no_records_marker_is_case_insensitive() {
        assert_eq!(detect("<p>NENHUM REGISTRO ENCONTRADO</p>"), PageShape::NoRecords);
    }

    #[test]
    fn structure_beats_marker() {
        let html = r#"<div hidden>Nenhum registro encontrado</div>
            <div class="resultado-item">x</div>"#;
        assert_eq!(detect(html), PageShape::Card);
    }

    #[test]
    fn unrelated_page_is_unknown() {
        assert_eq!(detect("<html><body><form></form></body></html>"), PageShape::Unknown);
    }

    #[test]
    fn bad_selector_is_reported() {
        let err = ShapeMarkers::new("div[", "table").unwrap_err();
        assert!(matches!(err, ExtractError::Selector { .. }));
    }
}
