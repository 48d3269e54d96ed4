//! Fuzz target: contract update bodies.
//!
//! Decoding must never panic, and applying a decoded patch must keep the
//! identifier and creation time of the stored contract.

#![no_main]

use itam_core::{Contract, ContractPatch, NewContract, RecordId, RecordStore};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(patch) = serde_json::from_slice::<ContractPatch>(data) else {
        return;
    };
    let store = RecordStore::new();
    let created = store.create::<Contract>(NewContract::default()).expect("create must succeed");
    let updated = store.update::<Contract>(RecordId(1), patch).expect("update must succeed");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
});
