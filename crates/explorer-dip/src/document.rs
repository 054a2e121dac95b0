//! Heterogeneous DIP records.
//!
//! The seven datasets share no schema. `Document` is a sparse record: every
//! field the console displays is optional, and everything else is kept in
//! `extra` so a record survives a round trip unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::params::Scalar;

/// A field DIP sometimes sends as a single value and sometimes as a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            OneOrMany::One(v) => std::slice::from_ref(v).iter(),
            OneOrMany::Many(v) => v.iter(),
        }
    }
}

impl<T: ToString> OneOrMany<T> {
    pub fn join(&self, sep: &str) -> String {
        self.iter().map(ToString::to_string).collect::<Vec<_>>().join(sep)
    }
}

/// A descriptor: either a bare term or a record with a `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Deskriptor {
    Plain(String),
    Record(Map<String, Value>),
}

impl Deskriptor {
    pub fn label(&self) -> String {
        match self {
            Deskriptor::Plain(s) => s.clone(),
            Deskriptor::Record(m) => match m.get("name") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => Value::Object(m.clone()).to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundstelle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AktivitaetAnzeige {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aktivitaetsart: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titel: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vorgangsposition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dokumentnummer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vorgangstyp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drucksachetyp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aktivitaetsart: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dokumentart: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aktualisiert: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wahlperiode: Option<OneOrMany<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub herausgeber: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiative: Option<OneOrMany<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deskriptor: Option<OneOrMany<Deskriptor>>,
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aktivitaet_anzeige: Option<Vec<AktivitaetAnzeige>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fundstelle: Option<Fundstelle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml_url: Option<String>,
    /// Every field not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// Decode a record, keeping it whole even if known fields have an
    /// unexpected shape. Each such field stays unset and its raw value moves
    /// to `extra`; the other fields decode normally.
    pub fn from_value(value: Value) -> Self {
        let mut fields = match value {
            Value::Object(map) => map,
            other => {
                warn!("DIP record is not an object");
                let mut extra = Map::new();
                extra.insert("value".into(), other);
                return Document {
                    extra,
                    ..Default::default()
                };
            }
        };

        let mut rejected = Map::new();
        loop {
            match serde_json::from_value::<Document>(Value::Object(fields.clone())) {
                Ok(mut doc) => {
                    doc.extra.extend(rejected);
                    return doc;
                }
                Err(e) => {
                    let Some(key) = first_rejected_field(&fields) else {
                        warn!("DIP record did not match the known fields: {}", e);
                        fields.extend(rejected);
                        return Document {
                            extra: fields,
                            ..Default::default()
                        };
                    };
                    warn!("DIP field {} has an unexpected shape: {}", key, e);
                    if let Some(raw) = fields.remove(&key) {
                        rejected.insert(key, raw);
                    }
                }
            }
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// The first field that fails to decode on its own.
fn first_rejected_field(fields: &Map<String, Value>) -> Option<String> {
    fields
        .iter()
        .find(|(key, raw)| {
            let mut single = Map::new();
            single.insert((*key).clone(), (*raw).clone());
            serde_json::from_value::<Document>(Value::Object(single)).is_err()
        })
        .map(|(key, _)| key.clone())
}

/// One page of a DIP listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default, deserialize_with = "lenient_documents")]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default, rename = "numFound")]
    pub num_found: Option<u64>,
}

fn lenient_documents<'de, D>(deserializer: D) -> Result<Vec<Document>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(Document::from_value)
        .collect())
}
