//! Filter option catalogue offered to the search form.

use serde::{Deserialize, Serialize};

/// Latest legislative period covered by the catalogue.
pub const CURRENT_WAHLPERIODE: i64 = 21;

pub const VORGANGSTYPEN: &[&str] = &[
    "Gesetzgebung",
    "Antrag",
    "Entschließungsantrag",
    "Beschlussempfehlung und Bericht",
    "Kleine Anfrage",
    "Große Anfrage",
    "Schriftliche Frage",
    "Mündliche Frage",
    "Aktuelle Stunde",
    "Bericht, Gutachten, Programm",
    "Rechtsverordnung",
    "EU-Vorlage",
    "Wahl im BT",
    "Petitionen",
];

pub const INITIATIVEN: &[&str] = &[
    "Bundesregierung",
    "Bundesrat",
    "Bundestag",
    "Fraktion der CDU/CSU",
    "Fraktion der SPD",
    "Fraktion BÜNDNIS 90/DIE GRÜNEN",
    "Fraktion der AfD",
    "Fraktion Die Linke",
    "Fraktion der FDP",
    "Gruppe BSW",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataOptions {
    pub wahlperioden: Vec<i64>,
    pub vorgangstypen: Vec<String>,
    pub initiativen: Vec<String>,
}

impl MetadataOptions {
    /// The built-in catalogue, newest legislative period first.
    pub fn catalogue() -> Self {
        Self {
            wahlperioden: (1..=CURRENT_WAHLPERIODE).rev().collect(),
            vorgangstypen: VORGANGSTYPEN.iter().map(|s| s.to_string()).collect(),
            initiativen: INITIATIVEN.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue() {
        let options = MetadataOptions::catalogue();
        assert_eq!(options.wahlperioden.first(), Some(&CURRENT_WAHLPERIODE));
        assert_eq!(options.wahlperioden.last(), Some(&1));
        assert!(options.vorgangstypen.contains(&"Gesetzgebung".to_string()));
        assert!(options.initiativen.contains(&"Bundesrat".to_string()));
    }
}
