//! The seam between record types and the generic store operations.

use chrono::{DateTime, Utc};
use serde::{
    de::{DeserializeOwned, IntoDeserializer},
    Deserialize, Deserializer,
};

use crate::id::RecordId;
use crate::store::{RecordStore, Table};

/// A record that carries its own store-assigned identifier.
pub trait Keyed {
    /// The identifier the store assigned at creation.
    fn id(&self) -> RecordId;
}

/// A record kind managed with create/list/get/update/delete semantics.
///
/// Implementors describe how a create payload becomes a stored record and
/// how an update payload merges into one; the store supplies identifiers,
/// timestamps and locking.
pub trait Resource: Keyed + Clone + Send + Sync + 'static {
    /// Label used in messages, e.g. `"Asset"` in `"Asset not found"`.
    const LABEL: &'static str;

    /// Create payload. Every field may be absent.
    type Draft: DeserializeOwned + Send;

    /// Update payload. Absent fields leave the stored value untouched.
    type Patch: DeserializeOwned + Send;

    /// Build the stored record from a draft.
    fn from_draft(id: RecordId, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    /// Merge an update payload into this record.
    fn apply_patch(&mut self, patch: Self::Patch, now: DateTime<Utc>);

    /// The store collection holding records of this kind.
    fn table(store: &RecordStore) -> &Table<Self>;
}

/// Overwrite `slot` only when the patch supplied a value.
pub(crate) fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Deserialize a nullable patch field so that an explicit `null` becomes
/// `Some(None)` while an absent field (via `#[serde(default)]`) stays `None`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Deserialize an optional string-valued enum, treating `""` like an absent
/// field so the draft falls back to its default variant.
pub(crate) fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => T::deserialize(raw.into_deserializer()).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "nullable")]
        field: Option<Option<u32>>,
    }

    fn holder(json: &str) -> Holder {
        match serde_json::from_str(json) {
            Ok(p) => p,
            Err(e) => panic!("invalid holder JSON {json}: {e}"),
        }
    }

    #[test]
    fn nullable_distinguishes_absent_null_and_value() {
        assert_eq!(holder("{}").field, None);
        assert_eq!(holder(r#"{"field":null}"#).field, Some(None));
        assert_eq!(holder(r#"{"field":7}"#).field, Some(Some(7)));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    enum Shade {
        Light,
        Dark,
    }

    #[derive(Debug, Deserialize)]
    struct Draft {
        #[serde(default, deserialize_with = "blank_as_none")]
        shade: Option<Shade>,
    }

    #[test]
    fn blank_as_none_treats_empty_strings_as_absent() {
        let decode = |json: &str| match serde_json::from_str::<Draft>(json) {
            Ok(d) => d.shade,
            Err(e) => panic!("invalid draft JSON {json}: {e}"),
        };
        assert_eq!(decode("{}"), None);
        assert_eq!(decode(r#"{"shade":null}"#), None);
        assert_eq!(decode(r#"{"shade":""}"#), None);
        assert_eq!(decode(r#"{"shade":"  "}"#), None);
        assert_eq!(decode(r#"{"shade":"Dark"}"#), Some(Shade::Dark));
        assert_eq!(decode(r#"{"shade":"Light"}"#), Some(Shade::Light));
        assert!(serde_json::from_str::<Draft>(r#"{"shade":"Dim"}"#).is_err());
        assert!(serde_json::from_str::<Draft>(r#"{"shade":3}"#).is_err());
    }

    #[test]
    fn merge_keeps_value_when_patch_is_absent() {
        let mut slot = "kept".to_owned();
        merge(&mut slot, None);
        assert_eq!(slot, "kept");
        merge(&mut slot, Some("replaced".to_owned()));
        assert_eq!(slot, "replaced");
    }
}
