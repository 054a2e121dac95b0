//! Result presentation: display strings for heterogeneous DIP records and
//! the hand-off of a record into the selection store.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use explorer_core::SelectionStore;
use explorer_dip::Document;
use serde::Serialize;

use crate::session::SearchResult;

const UNTITLED: &str = "Ohne Titel";
const SELECTED_FALLBACK: &str = "Ausgewählter Eintrag";

/// One labelled row of the metadata overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataEntry {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceLinks {
    pub pdf_url: Option<String>,
    pub xml_url: Option<String>,
}

impl SourceLinks {
    pub fn is_empty(&self) -> bool {
        self.pdf_url.is_none() && self.xml_url.is_none()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn title_or(doc: &Document, fallback: &str) -> String {
    present(&doc.titel)
        .or_else(|| present(&doc.vorgangsposition))
        .unwrap_or(fallback)
        .to_string()
}

/// Heading for a result row.
pub fn display_title(doc: &Document) -> String {
    title_or(doc, UNTITLED)
}

fn wahlperiode_label(doc: &Document) -> Option<String> {
    doc.wahlperiode.as_ref().map(|w| w.join(", ")).filter(|s| !s.is_empty())
}

/// Labelled overview of the fields a record actually carries, in a fixed
/// order. Lists are joined with ", ".
pub fn metadata_overview(doc: &Document) -> Vec<MetadataEntry> {
    let mut entries = Vec::new();
    let mut push = |label: &'static str, value: Option<String>| {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            entries.push(MetadataEntry { label, value });
        }
    };

    push("Titel", doc.titel.clone());
    push("Vorgangstyp", doc.vorgangstyp.clone());
    push("Drucksachetyp", doc.drucksachetyp.clone());
    push("Aktivitätsart", doc.aktivitaetsart.clone());
    push("Datum", doc.datum.clone());
    push("Wahlperiode", wahlperiode_label(doc));
    push("Herausgeber", doc.herausgeber.clone());
    push("Initiative", doc.initiative.as_ref().map(|i| i.join(", ")));
    push(
        "Deskriptoren",
        doc.deskriptor
            .as_ref()
            .map(|d| d.iter().map(|x| x.label()).collect::<Vec<_>>().join(", ")),
    );
    push("Abstract", doc.abstract_text.clone());

    entries
}

/// Short badges shown next to the title.
pub fn badges(doc: &Document) -> Vec<String> {
    let mut out: Vec<String> = [&doc.vorgangstyp, &doc.dokumentart, &doc.drucksachetyp, &doc.aktivitaetsart]
        .into_iter()
        .filter_map(present)
        .map(String::from)
        .collect();

    if let Some(wp) = wahlperiode_label(doc) {
        out.push(format!("WP {}", wp));
    }
    if let Some(datum) = present(&doc.datum) {
        out.push(format_date(datum));
    }
    if let Some(updated) = present(&doc.aktualisiert) {
        out.push(format!("Aktualisiert {}", format_date_time(updated)));
    }
    out
}

/// The best text a record offers for generation: full text, then abstract,
/// then the activity listing, then the whole record as JSON.
pub fn resolve_text_content(doc: &Document) -> String {
    if let Some(text) = present(&doc.text) {
        return text.to_string();
    }
    if let Some(abstract_text) = present(&doc.abstract_text) {
        return abstract_text.to_string();
    }
    if let Some(activities) = doc.aktivitaet_anzeige.as_ref().filter(|a| !a.is_empty()) {
        return activities
            .iter()
            .map(|a| {
                format!(
                    "{}: {}",
                    a.aktivitaetsart.as_deref().unwrap_or(""),
                    a.titel.as_deref().unwrap_or("")
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
    }
    serde_json::to_string_pretty(&doc.to_value()).unwrap_or_default()
}

/// PDF and XML links. Values inside `fundstelle` take precedence.
pub fn source_links(doc: &Document) -> SourceLinks {
    let fundstelle = doc.fundstelle.as_ref();
    let pick = |nested: Option<&Option<String>>, top: &Option<String>| {
        nested
            .and_then(present)
            .or_else(|| present(top))
            .map(String::from)
    };
    SourceLinks {
        pdf_url: pick(fundstelle.map(|f| &f.pdf_url), &doc.pdf_url),
        xml_url: pick(fundstelle.map(|f| &f.xml_url), &doc.xml_url),
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// `DD.MM.YYYY`, or the input unchanged if it is not a date.
pub fn format_date(value: &str) -> String {
    parse_timestamp(value)
        .map(|dt| dt.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|| value.to_string())
}

/// `DD.MM.YYYY HH:mm`, or the input unchanged if it is not a timestamp.
pub fn format_date_time(value: &str) -> String {
    parse_timestamp(value)
        .map(|dt| dt.format("%d.%m.%Y %H:%M").to_string())
        .unwrap_or_else(|| value.to_string())
}

/// "Gefundene Dokumente: n" with " von N" when the total is known.
pub fn result_info(result: &SearchResult) -> String {
    let mut label = format!("Gefundene Dokumente: {}", result.documents.len());
    if result.num_found > 0 {
        label.push_str(&format!(" von {}", result.num_found));
    }
    label
}

/// Forward a record to the task workspace.
pub fn select_document(store: &SelectionStore, doc: &Document) {
    store.set_selected_content(
        title_or(doc, SELECTED_FALLBACK),
        resolve_text_content(doc),
        Some(doc.to_value()),
    );
}
