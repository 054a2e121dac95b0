//! The seven DIP document-type buckets a search can target.

use std::fmt;
use std::str::FromStr;

use explorer_core::Error;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dataset {
    Vorgang,
    Vorgangsposition,
    Drucksache,
    DrucksacheText,
    Plenarprotokoll,
    PlenarprotokollText,
    Aktivitaet,
}

impl Dataset {
    pub fn all() -> &'static [Dataset] {
        &[
            Self::Vorgang,
            Self::Vorgangsposition,
            Self::Drucksache,
            Self::DrucksacheText,
            Self::Plenarprotokoll,
            Self::PlenarprotokollText,
            Self::Aktivitaet,
        ]
    }

    /// Endpoint path segment on the DIP API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vorgang => "vorgang",
            Self::Vorgangsposition => "vorgangsposition",
            Self::Drucksache => "drucksache",
            Self::DrucksacheText => "drucksache-text",
            Self::Plenarprotokoll => "plenarprotokoll",
            Self::PlenarprotokollText => "plenarprotokoll-text",
            Self::Aktivitaet => "aktivitaet",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Vorgang => "Vorgänge",
            Self::Vorgangsposition => "Vorgangspositionen",
            Self::Drucksache => "Drucksachen (Metadaten)",
            Self::DrucksacheText => "Drucksachen (Volltext)",
            Self::Plenarprotokoll => "Plenarprotokolle",
            Self::PlenarprotokollText => "Plenarprotokolle (Volltext)",
            Self::Aktivitaet => "Aktivitäten",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dataset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dataset::all()
            .iter()
            .copied()
            .find(|d| d.as_str() == s.trim())
            .ok_or_else(|| Error::Validation(format!("Unbekannter Datensatz: {}", s)))
    }
}
