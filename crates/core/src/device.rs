// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Devices are the targets a service acts on. The engine treats the
//! connection details as opaque — leaf drivers (SSH/NETCONF/SNMP, see
//! `wfe-adapters`) are the only thing that looks inside `properties`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

crate::define_id! {
    /// Stable identifier for a device, independent of its display name.
    pub struct DeviceId("dev-");
}

/// A managed network device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Device {
    pub fn new(id: DeviceId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), properties: BTreeMap::new() }
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// A set of devices, deduplicated by [`DeviceId`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSet(Vec<Device>);

impl DeviceSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_devices(devices: impl IntoIterator<Item = Device>) -> Self {
        let mut set = Self::new();
        for d in devices {
            set.insert(d);
        }
        set
    }

    /// Insert a device, deduplicating by id. Later inserts with the same
    /// id are ignored — the first seen definition wins.
    pub fn insert(&mut self, device: Device) {
        if !self.0.iter().any(|d| d.id == device.id) {
            self.0.push(device);
        }
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = Device>) {
        for d in other {
            self.insert(d);
        }
    }

    pub fn contains(&self, id: &DeviceId) -> bool {
        self.0.iter().any(|d| &d.id == id)
    }

    pub fn get(&self, id: &DeviceId) -> Option<&Device> {
        self.0.iter().find(|d| &d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.0.iter().map(|d| d.id)
    }

    /// Devices present in `self` but not in `other` (by id).
    pub fn difference(&self, other: &DeviceSet) -> DeviceSet {
        DeviceSet(self.0.iter().filter(|d| !other.contains(&d.id)).cloned().collect())
    }
}

impl FromIterator<Device> for DeviceSet {
    fn from_iter<T: IntoIterator<Item = Device>>(iter: T) -> Self {
        Self::from_devices(iter)
    }
}

impl<'a> IntoIterator for &'a DeviceSet {
    type Item = &'a Device;
    type IntoIter = std::slice::Iter<'a, Device>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
