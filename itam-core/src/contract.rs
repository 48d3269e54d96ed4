use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::RecordId;
use crate::resource::{blank_as_none, merge, nullable, Keyed, Resource};
use crate::store::{RecordStore, Table};

/// A vendor agreement with monetary and temporal fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Contract {
    /// Store-assigned identifier.
    #[serde(rename = "ID")]
    pub id: RecordId,
    pub name: String,
    /// Contract number as printed on the agreement.
    pub number: String,
    pub amount: f64,
    pub currency: Currency,
    pub vendor: String,
    pub status: ContractStatus,
    pub sign_date: Option<DateTime<Utc>>,
    pub expire_date: Option<DateTime<Utc>>,
    pub description: String,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Currency a contract amount is denominated in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Cny,
    Usd,
    Eur,
}

/// Lifecycle status of a contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractStatus {
    #[default]
    Active,
    Expired,
    Terminated,
}

/// Create payload for a [`Contract`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewContract {
    pub name: String,
    pub number: String,
    pub amount: f64,
    #[serde(deserialize_with = "blank_as_none")]
    pub currency: Option<Currency>,
    pub vendor: String,
    #[serde(deserialize_with = "blank_as_none")]
    pub status: Option<ContractStatus>,
    pub sign_date: Option<DateTime<Utc>>,
    pub expire_date: Option<DateTime<Utc>>,
    pub description: String,
}

/// Update payload for a [`Contract`].
///
/// `sign_date` and `expire_date` are tri-state: absent keeps the stored
/// date, `null` clears it, a timestamp replaces it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContractPatch {
    pub name: Option<String>,
    pub number: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<Currency>,
    pub vendor: Option<String>,
    pub status: Option<ContractStatus>,
    #[serde(deserialize_with = "nullable")]
    pub sign_date: Option<Option<DateTime<Utc>>>,
    #[serde(deserialize_with = "nullable")]
    pub expire_date: Option<Option<DateTime<Utc>>>,
    pub description: Option<String>,
}

impl Keyed for Contract {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Resource for Contract {
    const LABEL: &'static str = "Contract";
    type Draft = NewContract;
    type Patch = ContractPatch;

    fn from_draft(id: RecordId, draft: NewContract, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            number: draft.number,
            amount: draft.amount,
            currency: draft.currency.unwrap_or_default(),
            vendor: draft.vendor,
            status: draft.status.unwrap_or_default(),
            sign_date: draft.sign_date,
            expire_date: draft.expire_date,
            description: draft.description,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: ContractPatch, now: DateTime<Utc>) {
        merge(&mut self.name, patch.name);
        merge(&mut self.number, patch.number);
        merge(&mut self.amount, patch.amount);
        merge(&mut self.currency, patch.currency);
        merge(&mut self.vendor, patch.vendor);
        merge(&mut self.status, patch.status);
        merge(&mut self.sign_date, patch.sign_date);
        merge(&mut self.expire_date, patch.expire_date);
        merge(&mut self.description, patch.description);
        self.updated_at = now;
    }

    fn table(store: &RecordStore) -> &Table<Self> {
        &store.contracts
    }
}

/// A versioned document attached to a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ContractFile {
    #[serde(rename = "ID")]
    pub id: RecordId,
    /// Contract this file belongs to. Not checked against the contract
    /// collection.
    pub contract_id: RecordId,
    /// Original client-side file name.
    pub file_name: String,
    /// Storage key of the blob.
    pub file_path: String,
    /// Per-contract version, starting at 1.
    pub version: u32,
    pub uploaded_by: String,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
}

/// Metadata of a freshly stored blob, ready to be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContractFile {
    pub file_name: String,
    pub file_path: String,
    pub uploaded_by: String,
}

impl Keyed for ContractFile {
    fn id(&self) -> RecordId {
        self.id
    }
}
