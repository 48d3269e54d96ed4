//! Dashboard statistics.
//!
//! Asset-derived figures are recomputed from the live collection on every
//! call. `ueba_score` and `pending_audits` have no backing data and come
//! from configuration.

use serde::{Deserialize, Serialize};

use crate::asset::{Asset, AssetStatus};
use crate::error::StoreError;
use crate::store::RecordStore;

/// Statistics that are configured rather than derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticStats {
    pub ueba_score: u32,
    pub pending_audits: u32,
}

impl Default for StaticStats {
    fn default() -> Self {
        Self { ueba_score: 15, pending_audits: 6 }
    }
}

/// Payload of `GET /api/v1/dashboard/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_assets: usize,
    pub ueba_score: u32,
    /// Assets currently Offline or in Maintenance.
    pub active_alerts: usize,
    /// Percentage of assets Online, one decimal place.
    pub sla_compliance: f64,
    pub pending_audits: u32,
}

impl DashboardStats {
    /// Compute statistics over a snapshot of the asset collection.
    #[must_use]
    pub fn from_assets(assets: &[Asset], fixed: StaticStats) -> Self {
        let total = assets.len();
        let degraded = assets.iter().filter(|a| a.status.is_degraded()).count();
        let online = assets.iter().filter(|a| a.status == AssetStatus::Online).count();
        Self {
            total_assets: total,
            ueba_score: fixed.ueba_score,
            active_alerts: degraded,
            sla_compliance: percentage(online, total),
            pending_audits: fixed.pending_audits,
        }
    }

    /// Compute statistics from the store's current assets.
    ///
    /// # Errors
    /// Returns [`StoreError::Internal`] if the asset collection lock is poisoned.
    pub fn collect(store: &RecordStore, fixed: StaticStats) -> Result<Self, StoreError> {
        Ok(Self::from_assets(&store.list::<Asset>()?, fixed))
    }
}

#[expect(clippy::cast_precision_loss, reason = "asset counts stay far below 2^52")]
fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    let raw = part as f64 / total as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::NewAsset;

    fn store_with(statuses: &[AssetStatus]) -> RecordStore {
        let store = RecordStore::new();
        for status in statuses {
            let draft = NewAsset { status: Some(*status), ..NewAsset::default() };
            if let Err(e) = store.create::<Asset>(draft) {
                panic!("create failed: {e}");
            }
        }
        store
    }

    fn collect(store: &RecordStore) -> DashboardStats {
        match DashboardStats::collect(store, StaticStats::default()) {
            Ok(s) => s,
            Err(e) => panic!("collect failed: {e}"),
        }
    }

    #[test]
    fn empty_store_reports_full_compliance() {
        let stats = collect(&RecordStore::new());
        assert_eq!(stats.total_assets, 0);
        assert_eq!(stats.active_alerts, 0);
        assert!((stats.sla_compliance - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn degraded_assets_raise_alerts_and_lower_compliance() {
        use AssetStatus::{Maintenance, Offline, Online};
        let stats = collect(&store_with(&[Online, Online, Offline, Maintenance, Online, Online]));
        assert_eq!(stats.total_assets, 6);
        assert_eq!(stats.active_alerts, 2);
        assert!((stats.sla_compliance - 66.7).abs() < 1e-9, "got {}", stats.sla_compliance);
    }

    #[test]
    fn static_fields_come_from_configuration() {
        let fixed = StaticStats { ueba_score: 42, pending_audits: 1 };
        let stats = DashboardStats::from_assets(&[], fixed);
        assert_eq!(stats.ueba_score, 42);
        assert_eq!(stats.pending_audits, 1);
    }

    #[test]
    fn total_tracks_live_collection() {
        let store = store_with(&[AssetStatus::Online; 4]);
        assert_eq!(collect(&store).total_assets, 4);
        for _ in 0..2 {
            assert!(store.create::<Asset>(NewAsset::default()).is_ok());
        }
        assert_eq!(collect(&store).total_assets, 6);
    }
}
