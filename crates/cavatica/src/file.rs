//! Workspace file model and listing page wire types.

use crate::{CavaticaError, CavaticaResult};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A file known to the workspace API.
///
/// Read-only to this crate; the workspace owns its lifecycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RemoteFile {
    /// Workspace file id.
    pub id: String,

    /// File name, when the API returns one.
    pub name: Option<String>,

    /// Free-form metadata mapping. Values are kept as raw JSON.
    pub metadata: BTreeMap<String, Value>,
}

impl RemoteFile {
    /// Raw metadata value under `key`.
    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}

/// One page of a listing.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct FilePage {
    pub items: Vec<RemoteFile>,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FilePageWire {
    #[serde(default)]
    items: Vec<FileWire>,

    #[serde(default)]
    links: Vec<LinkWire>,
}

#[derive(Debug, Deserialize)]
struct FileWire {
    id: String,

    #[serde(default)]
    name: Option<String>,

    // `null` and absent both mean "no metadata".
    #[serde(default)]
    metadata: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct LinkWire {
    href: String,

    #[serde(default)]
    rel: Option<String>,
}

/// Parse a listing page body.
pub(crate) fn parse_page(body: &str) -> CavaticaResult<FilePage> {
    let wire: FilePageWire = serde_json::from_str(body)
        .map_err(|e| CavaticaError::Parse(format!("file listing: {e}")))?;

    let next = wire
        .links
        .into_iter()
        .find(|l| l.rel.as_deref() == Some("next"))
        .map(|l| l.href);

    let items = wire
        .items
        .into_iter()
        .map(|f| RemoteFile {
            id: f.id,
            name: f.name,
            metadata: f.metadata.unwrap_or_default(),
        })
        .collect();

    Ok(FilePage { items, next })
}
