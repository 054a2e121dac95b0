//! Filter model: the search form's state and its mapping to DIP query
//! parameters.
//!
//! Malformed individual entries (non-numeric periods or person ids) are
//! dropped; they never abort the whole build.

use explorer_dip::params::{
    DATUM_END, DATUM_START, DESKRIPTOR, INITIATIVE, PERSON_ID, TITEL, VORGANGSTYP, WAHLPERIODE,
};
use explorer_dip::{ParamValue, PersonRef, QueryParams, Scalar};
use serde::{Deserialize, Serialize};

/// User-facing filter form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Semicolon-delimited title phrases.
    pub title: String,
    /// Legislative periods. Entries may arrive as typed text.
    pub wahlperioden: Vec<Scalar>,
    pub vorgangstypen: Vec<String>,
    pub initiativen: Vec<String>,
    /// Semicolon-delimited descriptors.
    pub deskriptor: String,
    pub date_start: String,
    pub date_end: String,
    pub persons: Vec<PersonRef>,
}

impl FilterState {
    /// True when the form carries no constraint at all.
    pub fn is_empty(&self) -> bool {
        build_params(self).is_empty()
    }
}

/// Split a `;`-delimited field into trimmed, non-empty segments.
pub fn split_phrases(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Convert the filter form into DIP query parameters. Only non-empty
/// filters produce a key.
pub fn build_params(filters: &FilterState) -> QueryParams {
    let mut params = QueryParams::new();

    let titles = split_phrases(&filters.title);
    if !titles.is_empty() {
        params.insert(TITEL, ParamValue::texts(titles));
    }

    let periods: Vec<i64> = filters.wahlperioden.iter().filter_map(Scalar::as_int).collect();
    if !periods.is_empty() {
        params.insert(WAHLPERIODE, ParamValue::ints(periods));
    }

    if !filters.vorgangstypen.is_empty() {
        params.insert(VORGANGSTYP, ParamValue::texts(filters.vorgangstypen.iter().cloned()));
    }

    let descriptors = split_phrases(&filters.deskriptor);
    if !descriptors.is_empty() {
        params.insert(DESKRIPTOR, ParamValue::texts(descriptors));
    }

    if !filters.initiativen.is_empty() {
        params.insert(INITIATIVE, ParamValue::texts(filters.initiativen.iter().cloned()));
    }

    if !filters.date_start.trim().is_empty() {
        params.insert(DATUM_START, ParamValue::text(filters.date_start.clone()));
    }
    if !filters.date_end.trim().is_empty() {
        params.insert(DATUM_END, ParamValue::text(filters.date_end.clone()));
    }

    let person_ids: Vec<i64> = filters.persons.iter().filter_map(PersonRef::numeric_id).collect();
    if !person_ids.is_empty() {
        params.insert(PERSON_ID, ParamValue::ints(person_ids));
    }

    params
}

fn values(defaults: &QueryParams, key: &str) -> Vec<Scalar> {
    defaults
        .get(key)
        .map(|v| v.as_slice().iter().filter(|s| !s.is_empty()).cloned().collect())
        .unwrap_or_default()
}

fn dedup_keep_order<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn strings(defaults: &QueryParams, key: &str) -> Vec<String> {
    dedup_keep_order(values(defaults, key).iter().map(|s| s.to_string()).collect())
}

fn first_string(defaults: &QueryParams, key: &str) -> String {
    values(defaults, key)
        .first()
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// Inverse of [`build_params`]: turn configured defaults into form state.
///
/// Every multi-value key may hold a scalar or a sequence. Sequence fields
/// come out without duplicates.
pub fn defaults_to_filter_state(defaults: &QueryParams) -> FilterState {
    let wahlperioden = dedup_keep_order(
        values(defaults, WAHLPERIODE)
            .iter()
            .filter_map(Scalar::as_int)
            .collect(),
    )
    .into_iter()
    .map(Scalar::Int)
    .collect();

    let persons = dedup_keep_order(
        values(defaults, PERSON_ID)
            .iter()
            .filter_map(Scalar::as_int)
            .collect(),
    )
    .into_iter()
    .map(|id| PersonRef::new(id, ""))
    .collect();

    FilterState {
        title: strings(defaults, TITEL).join("; "),
        wahlperioden,
        vorgangstypen: strings(defaults, VORGANGSTYP),
        initiativen: strings(defaults, INITIATIVE),
        deskriptor: strings(defaults, DESKRIPTOR).join("; "),
        date_start: first_string(defaults, DATUM_START),
        date_end: first_string(defaults, DATUM_END),
        persons,
    }
}
