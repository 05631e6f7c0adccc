//! Device directory boundary.
//!
//! The directory of record lives outside this workspace; the dispatcher
//! reads device records from it and writes exactly one thing back, the
//! heartbeat's `last_online` timestamp.

use gatelink_core::Device;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Lookup and update of device records.
pub trait DeviceDirectory: Send + Sync {
    /// Resolve one device by its directory identifier.
    async fn find_by_id(&self, device_id: &str) -> Option<Device>;

    /// Persist an updated record. Returns `false` when the directory
    /// refused the write (unknown device, stale record).
    async fn update(&self, device: &Device) -> bool;
}

/// Map-backed directory for embedders and tests.
#[derive(Default)]
pub struct InMemoryDirectory {
    devices: RwLock<HashMap<String, Device>>,
}

impl InMemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        InMemoryDirectory {
            devices: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, device: Device) {
        self.devices.write().insert(device.id.clone(), device);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }
}

/// Shared directories forward through the `Arc`, so one directory can back
/// both the sync service and the embedder's own bookkeeping.
impl<T: DeviceDirectory> DeviceDirectory for std::sync::Arc<T> {
    async fn find_by_id(&self, device_id: &str) -> Option<Device> {
        (**self).find_by_id(device_id).await
    }

    async fn update(&self, device: &Device) -> bool {
        (**self).update(device).await
    }
}

impl DeviceDirectory for InMemoryDirectory {
    async fn find_by_id(&self, device_id: &str) -> Option<Device> {
        self.devices.read().get(device_id).cloned()
    }

    async fn update(&self, device: &Device) -> bool {
        let mut devices = self.devices.write();
        match devices.get_mut(&device.id) {
            Some(slot) => {
                *slot = device.clone();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn device(id: &str) -> Device {
        Device {
            id: id.into(),
            code: "GL-001".into(),
            name: "Lobby door".into(),
            ip_address: "10.0.0.9".into(),
            port: 4370,
            device_type: "ACCESS".into(),
            manufacturer: "zkteco".into(),
            last_online: None,
        }
    }

    #[tokio::test]
    async fn test_find_and_update() {
        let directory = InMemoryDirectory::new();
        directory.insert(device("d-1"));

        let mut found = directory.find_by_id("d-1").await.unwrap();
        assert!(found.last_online.is_none());

        found.last_online = Some(Utc::now());
        assert!(directory.update(&found).await);

        let reread = directory.find_by_id("d-1").await.unwrap();
        assert!(reread.last_online.is_some());
    }

    #[tokio::test]
    async fn test_update_unknown_device_is_refused() {
        let directory = InMemoryDirectory::new();
        assert!(!directory.update(&device("ghost")).await);
    }

    #[tokio::test]
    async fn test_find_missing() {
        let directory = InMemoryDirectory::new();
        assert!(directory.find_by_id("nope").await.is_none());
    }
}
