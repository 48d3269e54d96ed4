//! Core types for the ITAM record service.
//!
//! Defines the record kinds (assets, contracts, contract files and system
//! interfaces), their create and update payloads, and the in-memory
//! [`RecordStore`] that assigns identifiers and timestamps.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod asset;
pub mod contract;
pub mod error;
pub mod id;
pub mod interface;
pub mod resource;
pub mod sample;
pub mod stats;
pub mod store;

pub use asset::{Asset, AssetKind, AssetPatch, AssetStatus, NewAsset};
pub use contract::{
    Contract, ContractFile, ContractPatch, ContractStatus, Currency, NewContract, NewContractFile,
};
pub use error::StoreError;
pub use id::RecordId;
pub use interface::{
    HttpMethod, InterfaceStatus, NewSystemInterface, SystemInterface, SystemInterfacePatch,
};
pub use resource::{Keyed, Resource};
pub use stats::{DashboardStats, StaticStats};
pub use store::RecordStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_display_is_plain_number() {
        assert_eq!(RecordId(17).to_string(), "17");
        assert_eq!(RecordId::from(3).get(), 3);
    }

    #[test]
    fn not_found_message_names_the_resource() {
        let err = StoreError::NotFound { kind: Contract::LABEL, id: RecordId(9999) };
        assert_eq!(err.to_string(), "Contract not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn internal_error_is_not_not_found() {
        let err = StoreError::Internal("poisoned".to_owned());
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("poisoned"), "Display must include the reason");
    }

    #[test]
    fn resource_labels() {
        assert_eq!(Asset::LABEL, "Asset");
        assert_eq!(Contract::LABEL, "Contract");
        assert_eq!(SystemInterface::LABEL, "Interface");
    }

    #[test]
    fn created_records_round_trip_through_json() {
        let store = RecordStore::new();
        let created = match store.create::<Contract>(NewContract {
            name: "Support".to_owned(),
            amount: 10.0,
            currency: Some(Currency::Eur),
            ..NewContract::default()
        }) {
            Ok(c) => c,
            Err(e) => panic!("create failed: {e}"),
        };
        let json = match serde_json::to_string(&created) {
            Ok(s) => s,
            Err(e) => panic!("serialization failed: {e}"),
        };
        let back: Contract = match serde_json::from_str(&json) {
            Ok(c) => c,
            Err(e) => panic!("deserialization failed: {e}"),
        };
        assert_eq!(back, created);
    }
}
