//! FHIR `Identifier` wire model and lookup helpers.
//!
//! Specimens and patients both carry a list of identifiers; the one tagged
//! `use: official` is the identifier reported downstream (sample id / case id).

use serde::Deserialize;

/// Purpose of an identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentifierUse {
    /// Identifier recommended for display and use in real-world interactions.
    Usual,
    /// Identifier considered most trusted for identification.
    Official,
    /// Temporary identifier.
    Temp,
    /// Identifier assigned in a secondary use case.
    Secondary,
    /// Identifier no longer in use.
    Old,
}

impl IdentifierUse {
    /// Parse from FHIR wire format string.
    fn from_wire(s: &str) -> Option<Self> {
        match s {
            "usual" => Some(IdentifierUse::Usual),
            "official" => Some(IdentifierUse::Official),
            "temp" => Some(IdentifierUse::Temp),
            "secondary" => Some(IdentifierUse::Secondary),
            "old" => Some(IdentifierUse::Old),
            _ => None,
        }
    }
}

/// Domain-level identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identifier {
    /// Purpose of the identifier, if the server supplied a known one.
    pub use_type: Option<IdentifierUse>,

    /// Identifier value.
    pub value: Option<String>,
}

impl Identifier {
    /// Value of the first identifier whose use is `official`.
    ///
    /// Returns `None` when no official identifier exists or it has no value.
    pub fn official_value(identifiers: &[Identifier]) -> Option<&str> {
        identifiers
            .iter()
            .find(|id| id.use_type == Some(IdentifierUse::Official))
            .and_then(|id| id.value.as_deref())
    }
}

/// Wire representation of an identifier.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub(crate) struct IdentifierWire {
    #[serde(rename = "use", default)]
    pub use_type: Option<String>,

    #[serde(default)]
    pub value: Option<String>,
}

impl From<IdentifierWire> for Identifier {
    fn from(wire: IdentifierWire) -> Self {
        Identifier {
            use_type: wire.use_type.as_deref().and_then(IdentifierUse::from_wire),
            value: wire.value,
        }
    }
}

pub(crate) fn identifiers_from_wire(wire: Vec<IdentifierWire>) -> Vec<Identifier> {
    wire.into_iter().map(Identifier::from).collect()
}
