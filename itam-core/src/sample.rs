//! Sample assets used to seed a fresh store.

use crate::asset::{Asset, AssetKind, AssetStatus, NewAsset};
use crate::error::StoreError;
use crate::store::RecordStore;

/// Returns the four canonical sample assets.
#[must_use]
pub fn sample_assets() -> Vec<NewAsset> {
    let asset = |name: &str,
                 kind: AssetKind,
                 platform: &str,
                 ip: &str,
                 status: AssetStatus,
                 owner: &str,
                 description: &str,
                 specs: &str| NewAsset {
        name: name.to_owned(),
        kind: Some(kind),
        platform: platform.to_owned(),
        ip: ip.to_owned(),
        status: Some(status),
        region: String::new(),
        owner: owner.to_owned(),
        description: description.to_owned(),
        specs: specs.to_owned(),
    };

    vec![
        asset(
            "Prod-DB-01",
            AssetKind::Server,
            "AWS EC2",
            "192.168.1.10",
            AssetStatus::Online,
            "DBA Team",
            "Primary Database",
            "8vCPU/32GB",
        ),
        asset(
            "Web-Cluster-A",
            AssetKind::Vm,
            "VMware",
            "10.0.20.5",
            AssetStatus::Online,
            "DevOps",
            "Frontend Nginx",
            "4vCPU/8GB",
        ),
        asset(
            "K8s-Worker-05",
            AssetKind::Container,
            "BareMetal",
            "172.16.0.55",
            AssetStatus::Maintenance,
            "Platform Team",
            "K8s Node",
            "16vCPU/64GB",
        ),
        asset(
            "Jira-License-2024",
            AssetKind::Software,
            "SaaS",
            "jira.corp.com",
            AssetStatus::Online,
            "IT Admin",
            "Project Management",
            "N/A",
        ),
    ]
}

impl RecordStore {
    /// Create a store pre-populated with [`sample_assets`].
    ///
    /// # Errors
    /// Returns [`StoreError::Internal`] if seeding fails.
    pub fn with_sample_data() -> Result<Self, StoreError> {
        let store = Self::new();
        for draft in sample_assets() {
            store.create::<Asset>(draft)?;
        }
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_store_holds_four_assets_in_order() {
        let store = match RecordStore::with_sample_data() {
            Ok(s) => s,
            Err(e) => panic!("seeding failed: {e}"),
        };
        let assets = match store.list::<Asset>() {
            Ok(a) => a,
            Err(e) => panic!("list failed: {e}"),
        };
        assert_eq!(assets.len(), 4);
        assert_eq!(assets[0].name, "Prod-DB-01");
        assert_eq!(assets[2].status, AssetStatus::Maintenance);
        assert_eq!(assets[3].kind, AssetKind::Software);
        assert_eq!(assets[3].id.get(), 4);
    }
}
