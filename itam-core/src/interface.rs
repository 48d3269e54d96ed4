use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::RecordId;
use crate::resource::{blank_as_none, merge, Keyed, Resource};
use crate::store::{RecordStore, Table};

/// A catalog entry describing an external API endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct SystemInterface {
    #[serde(rename = "ID")]
    pub id: RecordId,
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub description: String,
    pub status: InterfaceStatus,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// HTTP method an interface is invoked with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

/// Whether an interface is still supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterfaceStatus {
    #[default]
    Active,
    Deprecated,
}

/// Create payload for a [`SystemInterface`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewSystemInterface {
    pub name: String,
    #[serde(deserialize_with = "blank_as_none")]
    pub method: Option<HttpMethod>,
    pub url: String,
    pub description: String,
    #[serde(deserialize_with = "blank_as_none")]
    pub status: Option<InterfaceStatus>,
}

/// Update payload for a [`SystemInterface`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemInterfacePatch {
    pub name: Option<String>,
    pub method: Option<HttpMethod>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub status: Option<InterfaceStatus>,
}

impl Keyed for SystemInterface {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Resource for SystemInterface {
    const LABEL: &'static str = "Interface";
    type Draft = NewSystemInterface;
    type Patch = SystemInterfacePatch;

    fn from_draft(id: RecordId, draft: NewSystemInterface, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            method: draft.method.unwrap_or_default(),
            url: draft.url,
            description: draft.description,
            status: draft.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: SystemInterfacePatch, now: DateTime<Utc>) {
        merge(&mut self.name, patch.name);
        merge(&mut self.method, patch.method);
        merge(&mut self.url, patch.url);
        merge(&mut self.description, patch.description);
        merge(&mut self.status, patch.status);
        self.updated_at = now;
    }

    fn table(store: &RecordStore) -> &Table<Self> {
        &store.interfaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_decodes_from_uppercase_verb() {
        let draft: NewSystemInterface =
            match serde_json::from_str(r#"{"name":"Create order","method":"POST","url":"/orders"}"#) {
                Ok(d) => d,
                Err(e) => panic!("failed to decode: {e}"),
            };
        let iface = SystemInterface::from_draft(RecordId(3), draft, Utc::now());
        assert_eq!(iface.method, HttpMethod::Post);
        assert_eq!(iface.status, InterfaceStatus::Active);
    }

    #[test]
    fn lowercase_method_is_rejected() {
        let result = serde_json::from_str::<NewSystemInterface>(r#"{"method":"post"}"#);
        assert!(result.is_err(), "method spelling must match the listed verbs");
    }

    #[test]
    fn deprecating_keeps_url() {
        let mut iface = SystemInterface::from_draft(
            RecordId(1),
            NewSystemInterface {
                url: "https://billing.corp/api/v2".to_owned(),
                ..NewSystemInterface::default()
            },
            Utc::now(),
        );
        iface.apply_patch(
            SystemInterfacePatch {
                status: Some(InterfaceStatus::Deprecated),
                ..SystemInterfacePatch::default()
            },
            Utc::now(),
        );
        assert_eq!(iface.status, InterfaceStatus::Deprecated);
        assert_eq!(iface.url, "https://billing.corp/api/v2");
    }
}
