//! Fuzz target: storage keys built from client-supplied file names.
//!
//! Keys must never contain path separators, whatever the upload name.

#![no_main]

use itam_core::RecordId;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let name = String::from_utf8_lossy(data);
    let key = itam_gateway::storage::blob_key(RecordId(1), &name);
    assert!(!key.contains('/') && !key.contains('\\'), "separator in key {key:?}");
    assert!(key.starts_with("1_"));
});
