//! Document-reference URL lookup on workspace file metadata.

use crate::constants::DOCUMENT_REFERENCE_METADATA_KEY;
use crate::{CoreError, CoreResult};
use cavatica::RemoteFile;
use serde_json::Value;

/// The DocumentReference search URL attached to `file`.
///
/// A missing key, `null`, or a blank string all mean the file has no clinical
/// record and yield `Ok(None)`.
///
/// # Errors
///
/// Returns [`CoreError::MetadataType`] when the value is present but not a string.
pub fn document_reference_url(file: &RemoteFile) -> CoreResult<Option<&str>> {
    match file.metadata_value(DOCUMENT_REFERENCE_METADATA_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(url)) => {
            let url = url.trim();
            Ok((!url.is_empty()).then_some(url))
        }
        Some(_) => Err(CoreError::MetadataType {
            file_id: file.id.clone(),
            key: DOCUMENT_REFERENCE_METADATA_KEY.to_string(),
        }),
    }
}
