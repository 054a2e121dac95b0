//! Person references as offered by the person directory.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params::Scalar;

/// A person that can be used as a search filter. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: Scalar,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraktion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funktion: Option<String>,
}

impl PersonRef {
    pub fn new(id: impl Into<Scalar>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            fraktion: None,
            funktion: None,
        }
    }

    /// Identity key. `17` and `"17"` name the same person.
    pub fn key(&self) -> String {
        self.id.to_string().trim().to_string()
    }

    /// The id as used by `f.person_id`, if it is numeric.
    pub fn numeric_id(&self) -> Option<i64> {
        self.id.as_int()
    }

    /// Text shown for the person in a picker.
    pub fn label(&self) -> String {
        if self.title.is_empty() {
            format!("Person {}", self.id)
        } else {
            self.title.clone()
        }
    }

    /// Secondary line: party group and role, when known.
    pub fn caption(&self) -> Option<String> {
        let parts: Vec<&str> = [self.fraktion.as_deref(), self.funktion.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" • "))
        }
    }

    /// Map a DIP `person` record. Records without an id are skipped.
    pub fn from_dip(record: &Value) -> Option<Self> {
        let id = match record.get("id")? {
            Value::String(s) if !s.is_empty() => Scalar::Text(s.clone()),
            Value::Number(n) => Scalar::Int(n.as_i64()?),
            _ => return None,
        };

        let str_field = |v: &Value, key: &str| {
            v.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        let title = str_field(record, "titel").unwrap_or_else(|| {
            [str_field(record, "vorname"), str_field(record, "nachname")]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ")
        });

        let role = record
            .get("person_roles")
            .and_then(Value::as_array)
            .and_then(|roles| roles.first());

        let fraktion = str_field(record, "fraktion")
            .or_else(|| role.and_then(|r| str_field(r, "fraktion")));
        let funktion = str_field(record, "funktion")
            .or_else(|| role.and_then(|r| str_field(r, "funktion")));

        Some(Self {
            id,
            title,
            fraktion,
            funktion,
        })
    }
}

/// One page of person suggestions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonPage {
    pub options: Vec<PersonRef>,
    #[serde(default)]
    pub cursor: Option<String>,
}
