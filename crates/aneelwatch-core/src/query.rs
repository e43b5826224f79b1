//! Search request building.
//!
//! [`FormLayout`] is the one place that knows the portal's form field names;
//! when the portal renames a field only the layout changes. [`SessionContext`]
//! carries the hidden state fields scraped from the search form so they can be
//! replayed on submit.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::model::{DateFilterMode, SearchQuery};

const FORM_DATE_FORMAT: &str = "%d/%m/%Y";

/// Field names and values of the portal's advanced-search form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormLayout {
    /// Page holding the search form (and its state fields).
    pub form_path: String,
    /// Where the form is submitted.
    pub submit_path: String,
    /// Field selecting the collection tab, and the value for legislative acts.
    pub collection_field: String,
    pub collection_value: String,
    pub term_field: String,
    pub filter_mode_field: String,
    pub equal_to_value: String,
    pub between_value: String,
    pub date_from_field: String,
    pub date_to_field: String,
    pub page_field: String,
}

impl Default for FormLayout {
    fn default() -> Self {
        Self {
            form_path: "/Busca/Avancada".into(),
            submit_path: "/Busca/Avancada".into(),
            collection_field: "Colecao".into(),
            collection_value: "Legislacao".into(),
            term_field: "TermoBusca".into(),
            filter_mode_field: "TipoFiltroData".into(),
            equal_to_value: "IgualA".into(),
            between_value: "Entre".into(),
            date_from_field: "DataInicial".into(),
            date_to_field: "DataFinal".into(),
            page_field: "Pagina".into(),
        }
    }
}

impl FormLayout {
    fn mode_value(&self, mode: DateFilterMode) -> &str {
        match mode {
            DateFilterMode::EqualTo => &self.equal_to_value,
            DateFilterMode::Between => &self.between_value,
        }
    }

    /// Names this layout fills from the query; session fields with these names are not replayed.
    fn owned_fields(&self) -> [&str; 6] {
        [
            self.collection_field.as_str(),
            self.term_field.as_str(),
            self.filter_mode_field.as_str(),
            self.date_from_field.as_str(),
            self.date_to_field.as_str(),
            self.page_field.as_str(),
        ]
    }
}

/// Server-side state fields (view-state, validation and anti-forgery tokens)
/// read from the search form and replayed with the next submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    fields: Vec<(String, String)>,
}

impl SessionContext {
    /// Collect every named hidden input on `html`, in document order.
    pub fn from_page(html: &str) -> Self {
        let doc = Html::parse_document(html);
        let Ok(hidden) = Selector::parse(r#"input[type="hidden"][name]"#) else {
            return Self::default();
        };
        let mut ctx = Self::default();
        for input in doc.select(&hidden) {
            let el = input.value();
            if let Some(name) = el.attr("name") {
                ctx.insert(name, el.attr("value").unwrap_or_default());
            }
        }
        ctx
    }

    /// Set a field, replacing an earlier value with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A fully built form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub path: String,
    /// Ordered form parameters: session state first, then query fields.
    pub params: Vec<(String, String)>,
}

impl SearchRequest {
    pub fn build(query: &SearchQuery, layout: &FormLayout, session: &SessionContext) -> Self {
        let owned = layout.owned_fields();
        let mut params: Vec<(String, String)> = session
            .fields()
            .iter()
            .filter(|(name, _)| !owned.contains(&name.as_str()))
            .cloned()
            .collect();

        let mut push = |name: &str, value: String| params.push((name.to_string(), value));
        push(&layout.collection_field, layout.collection_value.clone());
        push(&layout.term_field, query.term.trim().to_string());
        push(
            &layout.filter_mode_field,
            layout.mode_value(query.date_filter_mode).to_string(),
        );
        push(
            &layout.date_from_field,
            query.date_from.format(FORM_DATE_FORMAT).to_string(),
        );
        if query.date_filter_mode == DateFilterMode::Between {
            let to = query.date_to.unwrap_or(query.date_from);
            push(&layout.date_to_field, to.format(FORM_DATE_FORMAT).to_string());
        }
        push(&layout.page_field, query.page.max(1).to_string());

        Self {
            path: layout.submit_path.clone(),
            params,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}
