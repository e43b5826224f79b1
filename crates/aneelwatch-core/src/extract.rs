//! Record extraction: one results page in, an ordered list of [`DocumentRecord`]s out.
//!
//! The page is classified with [`PageShape::detect`] and handed to the parser
//! for that shape. Entries without a resolvable full-text link are dropped and
//! logged. Nothing here performs I/O.

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::model::{DocumentRecord, SearchQuery};
use crate::shape::{PageShape, ShapeMarkers, parse_selector};
use crate::text::{PORTAL_ORIGIN, clean_optional, clean_text, document_number, find_date, resolve_url_against};
use crate::ExtractError;

/// Labels that introduce a sub-field inside a result card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    FullText,
    TechnicalNote,
    Signing,
    Publication,
    Subject,
    Summary,
}

impl Label {
    const ALL: [Label; 6] = [
        Label::FullText,
        Label::TechnicalNote,
        Label::Signing,
        Label::Publication,
        Label::Subject,
        Label::Summary,
    ];

    /// Accent-folded, lowercase label text.
    fn keyword(self) -> &'static str {
        match self {
            Label::FullText => "texto integral",
            Label::TechnicalNote => "nota tecnica",
            Label::Signing => "assinatura",
            Label::Publication => "publicacao",
            Label::Subject => "assunto",
            Label::Summary => "ementa",
        }
    }
}

/// Turns results-page content into document records.
#[derive(Debug, Clone)]
pub struct Extractor {
    origin: String,
    markers: ShapeMarkers,
    heading: Selector,
    anchor: Selector,
    summary: Selector,
    cell: Selector,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Extractor for the live portal layout, resolving links against [`PORTAL_ORIGIN`].
    pub fn new() -> Self {
        Self::with_markers(ShapeMarkers::default()).expect("built-in selectors are valid")
    }

    pub fn with_markers(markers: ShapeMarkers) -> Result<Self, ExtractError> {
        Ok(Self {
            origin: PORTAL_ORIGIN.to_string(),
            markers,
            heading: parse_selector("h1, h2, h3, h4, h5, .titulo, .title")?,
            anchor: parse_selector("a[href]")?,
            summary: parse_selector(".ementa")?,
            cell: parse_selector("td, th")?,
        })
    }

    /// Resolve relative links against `origin` instead of the public portal.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Extract records for the page fetched by `query`.
    pub fn extract_for(&self, content: &str, query: &SearchQuery) -> Result<Vec<DocumentRecord>, ExtractError> {
        self.extract(content, &query.term, query.search_date())
    }

    /// Extract from raw bytes, rejecting content that is not UTF-8 text.
    pub fn extract_bytes(
        &self,
        content: &[u8],
        term: &str,
        search_date: NaiveDate,
    ) -> Result<Vec<DocumentRecord>, ExtractError> {
        let text = std::str::from_utf8(content)?;
        self.extract(text, term, search_date)
    }

    /// Extract records in page order.
    ///
    /// Fails only when `content` is not a page at all (blank or binary). A page
    /// in an unrecognised layout, or one confirming zero matches, yields `Ok(vec![])`.
    pub fn extract(
        &self,
        content: &str,
        term: &str,
        search_date: NaiveDate,
    ) -> Result<Vec<DocumentRecord>, ExtractError> {
        check_content(content)?;

        let doc = Html::parse_document(content);
        let shape = PageShape::detect(&doc, &self.markers);
        let ctx = EntryContext { term, search_date };

        let (records, dropped) = match shape {
            PageShape::Card => self.parse_cards(&doc, &ctx),
            PageShape::Tabular => self.parse_table(&doc, &ctx),
            PageShape::NoRecords => {
                info!(term, "portal reports no records");
                return Ok(Vec::new());
            }
            PageShape::Unknown => {
                info!(term, "no known result layout on page");
                return Ok(Vec::new());
            }
        };

        info!(term, ?shape, kept = records.len(), dropped, "extracted records");
        Ok(records)
    }

    fn parse_cards(&self, doc: &Html, ctx: &EntryContext<'_>) -> (Vec<DocumentRecord>, usize) {
        let mut records = Vec::new();
        let mut dropped = 0;
        let cards = doc
            .select(&self.markers.card)
            .filter(|card| !self.inside_card(*card));
        for (i, card) in cards.enumerate() {
            match self.parse_card(card, ctx) {
                Some(rec) => records.push(rec),
                None => {
                    debug!(index = i, "card has no full-text link; dropped");
                    dropped += 1;
                }
            }
        }
        (records, dropped)
    }

    /// Whether `el` sits inside another element matching the card selector.
    fn inside_card(&self, el: ElementRef<'_>) -> bool {
        el.ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| self.markers.card.matches(&ancestor))
    }

    fn parse_card(&self, card: ElementRef<'_>, ctx: &EntryContext<'_>) -> Option<DocumentRecord> {
        let full_text_url = self.labeled_link(card, Label::FullText)?;

        let fields = CardFields::from_segments(card.text().map(clean_text).filter(|s| !s.is_empty()));

        let title = card
            .select(&self.heading)
            .map(|el| clean_text(&el.text().collect::<Vec<_>>().join(" ")))
            .find(|t| !t.is_empty())
            .or_else(|| clean_optional(&fields.preamble.join(" ")))
            .unwrap_or_default();

        let summary = fields.value(Label::Summary).or_else(|| {
            card.select(&self.summary)
                .find_map(|el| clean_optional(&el.text().collect::<Vec<_>>().join(" ")))
        });

        let mut rec = ctx.record(title, full_text_url);
        rec.signing_date = fields.value(Label::Signing).as_deref().and_then(find_date);
        rec.publication_date = fields.value(Label::Publication).as_deref().and_then(find_date);
        rec.subject = fields.value(Label::Subject);
        rec.summary = summary;
        rec.technical_note_url = self.labeled_link(card, Label::TechnicalNote);
        Some(rec)
    }

    /// First link in `card` whose text or title mentions `label`, resolved.
    fn labeled_link(&self, card: ElementRef<'_>, label: Label) -> Option<String> {
        card.select(&self.anchor)
            .find(|a| {
                let text = a.text().collect::<String>();
                let title = a.value().attr("title").unwrap_or_default();
                fold(&clean_text(&text)).contains(label.keyword()) || fold(title).contains(label.keyword())
            })
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| resolve_url_against(&self.origin, href))
    }

    fn parse_table(&self, doc: &Html, ctx: &EntryContext<'_>) -> (Vec<DocumentRecord>, usize) {
        let Some(table) = self.markers.result_table(doc) else {
            return (Vec::new(), 0);
        };

        let mut records = Vec::new();
        let mut dropped = 0;
        // First row is the header.
        for (i, row) in table.select(&self.markers.row).enumerate().skip(1) {
            let cells: Vec<ElementRef<'_>> = row.select(&self.cell).collect();
            if cells.len() < 2 {
                debug!(row = i, cells = cells.len(), "row too short; skipped");
                continue;
            }
            let title_cell = cells[1];
            let url = title_cell
                .select(&self.anchor)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| resolve_url_against(&self.origin, href));
            let Some(url) = url else {
                debug!(row = i, "row has no full-text link; dropped");
                dropped += 1;
                continue;
            };
            let title = clean_text(&title_cell.text().collect::<Vec<_>>().join(" "));
            records.push(ctx.record(title, url));
        }
        (records, dropped)
    }
}

/// Provenance stamped onto every record from one page.
struct EntryContext<'a> {
    term: &'a str,
    search_date: NaiveDate,
}

impl EntryContext<'_> {
    fn record(&self, title: String, full_text_url: String) -> DocumentRecord {
        let mut rec = DocumentRecord::new(title, full_text_url, self.term, self.search_date);
        rec.document_number = document_number(&rec.full_text_url);
        rec
    }
}

/// Labeled values of one card, in first-occurrence-wins order.
#[derive(Debug, Default)]
struct CardFields {
    preamble: Vec<String>,
    values: Vec<(Label, Vec<String>)>,
}

impl CardFields {
    fn from_segments(segments: impl Iterator<Item = String>) -> Self {
        let mut fields = CardFields::default();
        let mut current: Option<usize> = None;
        for segment in segments {
            for piece in split_at_labels(&segment) {
                if let Some((label, rest)) = strip_label(&piece) {
                    fields.values.push((label, Vec::new()));
                    current = Some(fields.values.len() - 1);
                    if !rest.is_empty() {
                        let last = fields.values.len() - 1;
                        fields.values[last].1.push(rest);
                    }
                } else {
                    match current {
                        Some(idx) => fields.values[idx].1.push(piece),
                        None => fields.preamble.push(piece),
                    }
                }
            }
        }
        fields
    }

    fn value(&self, label: Label) -> Option<String> {
        self.values
            .iter()
            .find(|(l, _)| *l == label)
            .and_then(|(_, parts)| clean_optional(&parts.join(" ")))
    }
}

/// If `segment` opens a label, return it and the text after the colon.
///
/// A label opens a field only when followed by a colon or when it is the whole
/// segment (`<span>Ementa</span>`), so prose that begins with a label word stays prose.
fn strip_label(segment: &str) -> Option<(Label, String)> {
    let folded = fold(segment);
    Label::ALL.into_iter().find_map(|label| {
        let kw = label.keyword();
        let rest: Vec<char> = folded.strip_prefix(kw)?.chars().collect();
        if !rest.iter().all(|c| c.is_whitespace()) && !followed_by_colon(&rest) {
            return None;
        }
        // fold() maps chars one-to-one, so char counts line up with the original.
        let tail: String = segment.chars().skip(kw.chars().count()).collect();
        let tail = tail.trim_start().trim_start_matches(':').trim().to_string();
        Some((label, tail))
    })
}

/// Split a segment before every mid-segment `Label:` occurrence.
fn split_at_labels(segment: &str) -> Vec<String> {
    let folded: Vec<char> = fold(segment).chars().collect();
    let original: Vec<char> = segment.chars().collect();

    let mut cuts = Vec::new();
    for label in Label::ALL {
        let kw: Vec<char> = label.keyword().chars().collect();
        for start in 1..folded.len() {
            if folded[start..].starts_with(&kw)
                && !folded[start - 1].is_alphanumeric()
                && followed_by_colon(&folded[start + kw.len()..])
            {
                cuts.push(start);
            }
        }
    }
    cuts.sort_unstable();
    cuts.dedup();

    let mut pieces = Vec::with_capacity(cuts.len() + 1);
    let mut from = 0;
    for cut in cuts.into_iter().chain(std::iter::once(original.len())) {
        let piece: String = original[from..cut].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }
        from = cut;
    }
    pieces
}

fn followed_by_colon(rest: &[char]) -> bool {
    rest.iter().find(|c| !c.is_whitespace()) == Some(&':')
}

/// Lowercase and strip Portuguese diacritics, one output char per input char.
fn fold(s: &str) -> String {
    s.chars()
        .map(|c| match c.to_lowercase().next().unwrap_or(c) {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Reject content that cannot be a results page.
fn check_content(content: &str) -> Result<(), ExtractError> {
    if content.trim().is_empty() {
        return Err(ExtractError::Empty);
    }
    if content.starts_with("%PDF-") {
        return Err(ExtractError::Binary("PDF document"));
    }
    if content.contains('\0') {
        return Err(ExtractError::Binary("NUL bytes"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn extract(html: &str) -> Vec<DocumentRecord> {
        Extractor::new()
            .extract(html, "resolução", date(2024, 1, 2))
            .unwrap()
    }

    fn card(inner: &str) -> String {
        format!(r#"<div class="card-resultado">{inner}</div>"#)
    }

    #[test]
    fn single_card_end_to_end() {
        let html = card(
            r#"<h4>Resolução Autorizativa nº 15.123</h4>
            <a href="/x/123.pdf">Texto Integral</a>
            <p>Assinatura: 01/01/2024</p>
            <p>Publicação: 02/01/2024</p>
            <p>Assunto: Teste</p>"#,
        );
        let records = extract(&html);
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.full_text_url, "https://biblioteca.aneel.gov.br/x/123.pdf");
        assert_eq!(rec.signing_date, Some(date(2024, 1, 1)));
        assert_eq!(rec.publication_date, Some(date(2024, 1, 2)));
        assert_eq!(rec.subject.as_deref(), Some("Teste"));
        assert_eq!(rec.title, "Resolução Autorizativa nº 15.123");
        assert_eq!(rec.document_number.as_deref(), Some("123"));
        assert_eq!(rec.search_term, "resolução");
        assert_eq!(rec.search_date, date(2024, 1, 2));
    }

    #[test]
    fn n_cards_give_n_records_in_order() {
        let html: String = (1..=5)
            .map(|i| card(&format!(r#"<h4>Ato {i}</h4><a href="/Resultado/Ato/{i}.pdf">Texto Integral</a>"#)))
            .collect();
        let records = extract(&html);
        assert_eq!(records.len(), 5);
        for (i, rec) in records.iter().enumerate() {
            assert_eq!(rec.title, format!("Ato {}", i + 1));
            assert!(!rec.full_text_url.is_empty());
        }
    }

    #[test]
    fn card_without_full_text_is_dropped() {
        let html = [
            card(r#"<h4>A</h4><a href="/a.pdf">Texto Integral</a>"#),
            card(r#"<h4>B</h4><a href="/b.pdf">Nota Técnica</a>"#),
            card(r#"<h4>C</h4><a href="javascript:void(0)">Texto Integral</a>"#),
        ]
        .concat();
        let records = extract(&html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "A");
    }

    #[test]
    fn labeled_values_split_across_elements() {
        let html = card(
            r#"<h4>Despacho nº 10</h4>
            <a href="/d/10.pdf" title="Texto Integral">PDF</a>
            <span><b>Assinatura:</b> 05/03/2024</span>
            <span><b>Assunto:</b>
                Tarifa &amp;
                Mercado</span>
            <span>Ementa</span><p>Homologa o resultado
               do leilão.</p>
            <a href="/n/1.pdf">Nota&nbsp;Técnica</a>
            <a href="/n/2.pdf">Nota Técnica</a>"#,
        );
        let rec = &extract(&html)[0];
        assert_eq!(rec.signing_date, Some(date(2024, 3, 5)));
        assert_eq!(rec.subject.as_deref(), Some("Tarifa & Mercado"));
        assert_eq!(rec.summary.as_deref(), Some("Homologa o resultado do leilão."));
        assert_eq!(rec.full_text_url, "https://biblioteca.aneel.gov.br/d/10.pdf");
        assert_eq!(
            rec.technical_note_url.as_deref(),
            Some("https://biblioteca.aneel.gov.br/n/1.pdf")
        );
    }

    #[test]
    fn labels_inside_one_text_node() {
        let html = card(
            r#"<a href="/r/1.pdf">Texto Integral</a>
            <p>Assinatura: 10/12/2023 Publicação: 15/12/2023 Assunto: Geração</p>"#,
        );
        let rec = &extract(&html)[0];
        assert_eq!(rec.signing_date, Some(date(2023, 12, 10)));
        assert_eq!(rec.publication_date, Some(date(2023, 12, 15)));
        assert_eq!(rec.subject.as_deref(), Some("Geração"));
    }

    #[test]
    fn label_matching_ignores_case_and_accents() {
        let html = card(
            r#"<a href="/r/1.pdf">TEXTO INTEGRAL</a>
            <p>PUBLICACAO: 03/04/2024</p>"#,
        );
        let rec = &extract(&html)[0];
        assert_eq!(rec.publication_date, Some(date(2024, 4, 3)));
    }

    #[test]
    fn prose_mentioning_a_label_word_is_not_a_label() {
        let html = card(
            r#"<a href="/r/1.pdf">Texto Integral</a>
            <p>Ementa: Trata do assunto da assinatura digital.</p>"#,
        );
        let rec = &extract(&html)[0];
        assert_eq!(rec.summary.as_deref(), Some("Trata do assunto da assinatura digital."));
        assert_eq!(rec.subject, None);
        assert_eq!(rec.signing_date, None);
    }

    #[test]
    fn first_full_text_link_wins() {
        let html = card(
            r#"<a href="/first.pdf">Texto Integral</a>
            <a href="/second.pdf">Texto Integral (versão compilada)</a>"#,
        );
        assert_eq!(extract(&html)[0].full_text_url, "https://biblioteca.aneel.gov.br/first.pdf");
    }

    #[test]
    fn title_falls_back_to_text_before_labels() {
        let html = card(r#"<span>REN 1.059/2023</span> <a href="/r.pdf">Texto Integral</a>"#);
        assert_eq!(extract(&html)[0].title, "REN 1.059/2023");
    }

    #[test]
    fn absolute_links_pass_through() {
        let html = card(r#"<a href="http://www2.aneel.gov.br/cedoc/ren2023.pdf">Texto Integral</a>"#);
        assert_eq!(extract(&html)[0].full_text_url, "http://www2.aneel.gov.br/cedoc/ren2023.pdf");
    }

    #[test]
    fn table_rows_become_records() {
        let html = r#"<table id="tabelaResultado">
            <tr><th>#</th><th>Ato</th><th>Data</th></tr>
            <tr><td>1</td><td><a href="/Resultado/Ato/1.pdf">  REN
                 1/2024 </a></td><td>01/01/2024</td></tr>
            <tr><td>2</td><td><a href="https://x.gov.br/2.pdf">REH 2/2024</a></td></tr>
            <tr><td>3</td><td>Sem link</td></tr>
            <tr><td>solitária</td></tr>
        </table>"#;
        let records = extract(html);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "REN 1/2024");
        assert_eq!(records[0].full_text_url, "https://biblioteca.aneel.gov.br/Resultado/Ato/1.pdf");
        assert_eq!(records[0].document_number.as_deref(), Some("1"));
        assert_eq!(records[1].full_text_url, "https://x.gov.br/2.pdf");
    }

    #[test]
    fn n_table_rows_give_n_records() {
        let rows: String = (1..=7)
            .map(|i| format!(r#"<tr><td>{i}</td><td><a href="/a/{i}.pdf">Ato {i}</a></td></tr>"#))
            .collect();
        let html = format!(r#"<table class="tabela-resultado"><tr><th>n</th><th>t</th></tr>{rows}</table>"#);
        assert_eq!(extract(&html).len(), 7);
    }

    #[test]
    fn no_records_marker_is_empty_not_error() {
        let html = "<html><body><p>Nenhum registro encontrado.</p></body></html>";
        assert!(extract(html).is_empty());
    }

    #[test]
    fn unknown_shape_is_empty() {
        assert!(extract("<html><body><h1>Manutenção</h1></body></html>").is_empty());
        assert!(extract("plain text with no markup").is_empty());
    }

    #[test]
    fn blank_and_binary_content_are_errors() {
        let ex = Extractor::new();
        let d = date(2024, 1, 1);
        assert!(matches!(ex.extract("  \n", "t", d), Err(ExtractError::Empty)));
        assert!(matches!(ex.extract("%PDF-1.7 ...", "t", d), Err(ExtractError::Binary(_))));
        assert!(matches!(ex.extract("<p>a\0b</p>", "t", d), Err(ExtractError::Binary(_))));
        assert!(matches!(
            ex.extract_bytes(&[0xff, 0xfe, 0x00], "t", d),
            Err(ExtractError::NotUtf8(_))
        ));
    }

    #[test]
    fn custom_origin_for_relative_links() {
        let ex = Extractor::new().with_origin("http://localhost:9000");
        let html = card(r#"<a href="/a.pdf">Texto Integral</a>"#);
        let recs = ex.extract(&html, "t", date(2024, 1, 1)).unwrap();
        assert_eq!(recs[0].full_text_url, "http://localhost:9000/a.pdf");
    }

    #[test]
    fn extract_for_uses_query_provenance() {
        let q = SearchQuery::between("despacho", date(2024, 2, 1), date(2024, 2, 29));
        let html = card(r#"<a href="/a.pdf">Texto Integral</a>"#);
        let recs = Extractor::new().extract_for(&html, &q).unwrap();
        assert_eq!(recs[0].search_term, "despacho");
        assert_eq!(recs[0].search_date, date(2024, 2, 1));
    }

    #[test]
    fn label_word_opening_prose_stays_in_summary() {
        let html = card(
            r#"<a href="/r/1.pdf">Texto Integral</a>
            <span>Ementa</span>
            <p>Assinatura digital de contratos de energia.</p>
            <p>Publicação: 02/01/2024</p>"#,
        );
        let rec = &extract(&html)[0];
        assert_eq!(rec.summary.as_deref(), Some("Assinatura digital de contratos de energia."));
        assert_eq!(rec.signing_date, None);
        assert_eq!(rec.publication_date, Some(date(2024, 1, 2)));
    }

    #[test]
    fn nested_card_containers_yield_one_record() {
        let html = r#"<div class="card-resultado">
            <div class="resultado-item">
                <h4>REN 1.000</h4>
                <a href="/r/1000.pdf">Texto Integral</a>
            </div>
        </div>
        <div class="resultado-item">
            <h4>REN 1.001</h4>
            <a href="/r/1001.pdf">Texto Integral</a>
        </div>"#;
        let records = extract(html);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "REN 1.000");
        assert_eq!(records[1].title, "REN 1.001");
    }

    #[test]
    fn escaped_markup_is_decoded_once() {
        let html = card(r#"<h4>Limite &amp;lt; 5 MW &amp; outros</h4><a href="/r/1.pdf">Texto Integral</a>"#);
        assert_eq!(extract(&html)[0].title, "Limite &lt; 5 MW & outros");
    }

    #[test]
    fn strip_label_needs_colon_or_whole_segment() {
        assert_eq!(strip_label("Ementa"), Some((Label::Summary, String::new())));
        assert_eq!(
            strip_label("Assinatura : 01/01/2024"),
            Some((Label::Signing, "01/01/2024".to_string()))
        );
        assert_eq!(strip_label("Assinatura digital"), None);
        assert_eq!(strip_label("Assuntos gerais"), None);
    }

    #[test]
    fn split_at_labels_requires_colon_mid_segment() {
        assert_eq!(
            split_at_labels("Assinatura: 01/01/2024 Assunto: X"),
            vec!["Assinatura: 01/01/2024", "Assunto: X"]
        );
        assert_eq!(split_at_labels("sobre o assunto da norma"), vec!["sobre o assunto da norma"]);
    }
}
