use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::SnapshotError;
use crate::hash::document_hash;

/// Where a snapshot was taken.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_package: Option<String>,
    /// Anything else the producer attached
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Saved document text a locator can be replayed against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub document_text: String,
    pub hash: String,
    pub captured_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_context: Option<SourceContext>,
}

impl Snapshot {
    /// Stamp `document_text` with its hash and the current time.
    pub fn capture(document_text: impl Into<String>, source_context: Option<SourceContext>) -> Self {
        let document_text = document_text.into();
        Self {
            hash: document_hash(&document_text),
            document_text,
            captured_at: Utc::now(),
            source_context,
        }
    }

    /// Recompute the hash and compare it with the stored one.
    pub fn verify(&self) -> Result<(), SnapshotError> {
        let computed = document_hash(&self.document_text);
        if computed == self.hash {
            Ok(())
        } else {
            Err(SnapshotError::HashMismatch {
                stored: self.hash.clone(),
                computed,
            })
        }
    }

    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_hashes_document() {
        let snapshot = Snapshot::capture("<hierarchy/>", None);
        assert!(snapshot.hash.starts_with("xml_"));
        assert_eq!(snapshot.hash.len(), 4 + 64);
        assert!(snapshot.verify().is_ok());

        let mut edited = snapshot.clone();
        edited.document_text.push(' ');
        assert!(matches!(
            edited.verify(),
            Err(SnapshotError::HashMismatch { .. })
        ));
    }

    #[test]
    fn json_shape_keeps_unknown_context_fields() {
        let json = r#"{
            "documentText": "<hierarchy/>",
            "hash": "xml_x",
            "capturedAt": "2024-05-01T10:00:00Z",
            "sourceContext": {"deviceId": "emulator-5554", "pageTitle": "Feed", "orientation": "portrait"}
        }"#;
        let snapshot = Snapshot::from_json(json).unwrap();
        let context = snapshot.source_context.as_ref().unwrap();
        assert_eq!(context.device_id.as_deref(), Some("emulator-5554"));
        assert_eq!(context.extra["orientation"], "portrait");

        let back = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(back["sourceContext"]["orientation"], "portrait");
        assert_eq!(back["capturedAt"], "2024-05-01T10:00:00Z");
    }
}
