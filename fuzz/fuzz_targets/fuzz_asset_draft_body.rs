//! Fuzz target: asset create bodies through the gateway decoder and store.
//!
//! Arbitrary bytes must either be rejected as invalid JSON or produce a
//! stored asset with identifier 1 and status defaulted when absent.

#![no_main]

use itam_core::{Asset, NewAsset, RecordStore};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(draft) = itam_gateway::extract::decode::<NewAsset>(data) else {
        return;
    };
    let had_status = draft.status.is_some();
    let store = RecordStore::new();
    let asset = store.create::<Asset>(draft).expect("fresh store must accept any draft");
    assert_eq!(asset.id.get(), 1);
    if !had_status {
        assert_eq!(asset.status, itam_core::AssetStatus::Online);
    }
    serde_json::to_vec(&asset).expect("stored asset must serialize");
});
