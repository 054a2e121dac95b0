//! Query parameters in the shape DIP expects.
//!
//! Only constrained filters carry a key; absence means "no constraint".

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const TITEL: &str = "f.titel";
pub const WAHLPERIODE: &str = "f.wahlperiode";
pub const VORGANGSTYP: &str = "f.vorgangstyp";
pub const DESKRIPTOR: &str = "f.deskriptor";
pub const INITIATIVE: &str = "f.initiative";
pub const DATUM_START: &str = "f.datum.start";
pub const DATUM_END: &str = "f.datum.end";
pub const PERSON_ID: &str = "f.person_id";
pub const CURSOR: &str = "cursor";

/// A single parameter value: integer or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Text(String),
}

impl Scalar {
    /// Parse as an integer: integers pass, strings must hold a whole number.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Scalar::Text(s) if s.is_empty())
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Scalar::Text(s.clone())),
            Value::Number(n) => match n.as_i64().or_else(|| whole_number(n.as_f64()?)) {
                Some(i) => Some(Scalar::Int(i)),
                None => Some(Scalar::Text(n.to_string())),
            },
            _ => None,
        }
    }
}

/// `20.0` counts as 20; fractions and out-of-range values do not.
fn whole_number(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then(|| f as i64)
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

/// A parameter value: one scalar or a sequence of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl ParamValue {
    pub fn texts<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamValue::Many(values.into_iter().map(|s| Scalar::Text(s.into())).collect())
    }

    pub fn ints<I: IntoIterator<Item = i64>>(values: I) -> Self {
        ParamValue::Many(values.into_iter().map(Scalar::Int).collect())
    }

    pub fn text(value: impl Into<String>) -> Self {
        ParamValue::One(Scalar::Text(value.into()))
    }

    /// View either shape as a slice of scalars.
    pub fn as_slice(&self) -> &[Scalar] {
        match self {
            ParamValue::One(s) => std::slice::from_ref(s),
            ParamValue::Many(v) => v,
        }
    }
}

/// Mapping from filter key (`f.titel`, `cursor`, ...) to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, ParamValue>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ParamValue) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A copy of these parameters continuing from `cursor`.
    pub fn with_cursor(&self, cursor: &str) -> Self {
        let mut next = self.clone();
        next.insert(CURSOR, ParamValue::text(cursor));
        next
    }

    /// Flatten into URL query pairs. Sequences become repeated keys, empty
    /// strings are skipped.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .flat_map(|(key, value)| {
                value
                    .as_slice()
                    .iter()
                    .filter(|s| !s.is_empty())
                    .map(move |s| (key.clone(), s.to_string()))
            })
            .collect()
    }

    /// Build from an untyped JSON object such as configured filter defaults.
    ///
    /// Strings and numbers are kept, alone or inside arrays; nulls, booleans
    /// and nested objects are dropped.
    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        let mut params = QueryParams::new();
        for (key, value) in map {
            let converted = match value {
                Value::Array(items) => Some(ParamValue::Many(
                    items.iter().filter_map(Scalar::from_json).collect(),
                )),
                other => Scalar::from_json(other).map(ParamValue::One),
            };
            if let Some(v) = converted {
                params.insert(key.clone(), v);
            }
        }
        params
    }
}

impl FromIterator<(String, ParamValue)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (String, ParamValue)>>(iter: T) -> Self {
        QueryParams(iter.into_iter().collect())
    }
}
