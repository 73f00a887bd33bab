//! FHIR search `Bundle` wire model.
//!
//! Search responses are bundles with a `total` match count and an ordered
//! `entry[]` list. `total` is required; an entry may lack a `resource`.

use crate::{check_resource_type, parse_wire, FhirResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Domain-level search bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bundle<T> {
    /// Number of resources matching the search.
    pub total: u64,

    /// Entries in server order. `None` marks an entry without a resource.
    pub entries: Vec<Option<T>>,
}

impl<T> Bundle<T> {
    /// True when the server reported no matches.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// The first entry, if the bundle has one.
    ///
    /// The outer `Option` is the entry, the inner one its resource.
    pub fn first_entry(&self) -> Option<Option<&T>> {
        self.entries.first().map(Option::as_ref)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct BundleWire<R> {
    #[serde(rename = "resourceType", default)]
    pub resource_type: Option<String>,

    pub total: u64,

    #[serde(default = "Vec::new")]
    pub entry: Vec<EntryWire<R>>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct EntryWire<R> {
    #[serde(default = "Option::default")]
    pub resource: Option<R>,
}

/// Parse a search bundle and translate each entry resource with `translate`.
pub(crate) fn parse_bundle<R, T>(
    json_text: &str,
    label: &str,
    translate: impl Fn(R) -> T,
) -> FhirResult<Bundle<T>>
where
    R: DeserializeOwned,
{
    let wire: BundleWire<R> = parse_wire(json_text, label)?;
    check_resource_type(wire.resource_type.as_deref(), "Bundle")?;

    Ok(Bundle {
        total: wire.total,
        entries: wire
            .entry
            .into_iter()
            .map(|e| e.resource.map(&translate))
            .collect(),
    })
}
