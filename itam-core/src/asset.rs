use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::RecordId;
use crate::resource::{blank_as_none, merge, Keyed, Resource};
use crate::store::{RecordStore, Table};

/// A managed infrastructure or software item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Asset {
    /// Store-assigned identifier.
    #[serde(rename = "ID")]
    pub id: RecordId,
    /// Display name, e.g. `"Prod-DB-01"`.
    pub name: String,
    /// What kind of item this is.
    #[serde(rename = "type")]
    pub kind: AssetKind,
    /// Hosting platform, e.g. `"AWS EC2"` or `"VMware"`.
    pub platform: String,
    /// Network address or host name.
    pub ip: String,
    /// Operational status.
    pub status: AssetStatus,
    /// Deployment region.
    pub region: String,
    /// Owning team or person.
    pub owner: String,
    /// Free-text description.
    pub description: String,
    /// Free-text sizing, e.g. `"4vCPU/16GB"`.
    pub specs: String,
    /// When the record was created.
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    /// When the record was last changed.
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Kind of tracked asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    /// Physical or cloud server.
    #[default]
    Server,
    /// Virtual machine.
    #[serde(rename = "VM")]
    Vm,
    /// Container workload or node.
    Container,
    /// Software licence or SaaS subscription.
    Software,
}

/// Operational status of an asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetStatus {
    /// Serving normally.
    #[default]
    Online,
    /// Down.
    Offline,
    /// Taken out of service on purpose.
    Maintenance,
}

impl AssetStatus {
    /// Whether an asset in this status counts as an active alert.
    #[must_use]
    pub fn is_degraded(self) -> bool {
        matches!(self, Self::Offline | Self::Maintenance)
    }
}

/// Create payload for an [`Asset`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewAsset {
    pub name: String,
    #[serde(rename = "type", deserialize_with = "blank_as_none")]
    pub kind: Option<AssetKind>,
    pub platform: String,
    pub ip: String,
    /// Defaults to [`AssetStatus::Online`] when absent, null or empty.
    #[serde(deserialize_with = "blank_as_none")]
    pub status: Option<AssetStatus>,
    pub region: String,
    pub owner: String,
    pub description: String,
    pub specs: String,
}

/// Update payload for an [`Asset`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AssetKind>,
    pub platform: Option<String>,
    pub ip: Option<String>,
    pub status: Option<AssetStatus>,
    pub region: Option<String>,
    pub owner: Option<String>,
    pub description: Option<String>,
    pub specs: Option<String>,
}

impl Keyed for Asset {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Resource for Asset {
    const LABEL: &'static str = "Asset";
    type Draft = NewAsset;
    type Patch = AssetPatch;

    fn from_draft(id: RecordId, draft: NewAsset, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            kind: draft.kind.unwrap_or_default(),
            platform: draft.platform,
            ip: draft.ip,
            status: draft.status.unwrap_or_default(),
            region: draft.region,
            owner: draft.owner,
            description: draft.description,
            specs: draft.specs,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: AssetPatch, now: DateTime<Utc>) {
        merge(&mut self.name, patch.name);
        merge(&mut self.kind, patch.kind);
        merge(&mut self.platform, patch.platform);
        merge(&mut self.ip, patch.ip);
        merge(&mut self.status, patch.status);
        merge(&mut self.region, patch.region);
        merge(&mut self.owner, patch.owner);
        merge(&mut self.description, patch.description);
        merge(&mut self.specs, patch.specs);
        self.updated_at = now;
    }

    fn table(store: &RecordStore) -> &Table<Self> {
        &store.assets
    }
}
