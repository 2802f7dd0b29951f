//! The equipment registry: a single-mutex-guarded map from id to a
//! per-connection send handle, plus an ordered free-id pool.
//!
//! Both structures are guarded by one lock so that admission, removal,
//! directory snapshots, and broadcasts are observed as serialized atomic
//! operations — this is what prevents a newcomer from missing the very
//! `RES_ADD` that announces its own admission.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use tokio::sync::mpsc::UnboundedSender;

use crate::error::RegistryError;
use crate::protocol::EquipmentId;

/// A clonable handle for sending raw, already-encoded frames to one
/// connection's write task. Cloning and sending never blocks: the channel
/// absorbs backpressure, and a send to a connection that has already
/// disconnected simply fails silently (the connection's own read loop will
/// have already reported the disconnect).
#[derive(Debug, Clone)]
pub struct ConnHandle {
    tx: UnboundedSender<Vec<u8>>,
}

impl ConnHandle {
    pub fn new(tx: UnboundedSender<Vec<u8>>) -> Self {
        Self { tx }
    }

    /// Returns `false` if the connection's write task has already exited.
    pub fn send(&self, encoded: Vec<u8>) -> bool {
        self.tx.send(encoded).is_ok()
    }
}

struct Inner {
    connections: HashMap<EquipmentId, ConnHandle>,
    free: VecDeque<EquipmentId>,
}

/// Shared registry of live equipment connections.
pub struct Registry {
    max: u8,
    inner: Mutex<Inner>,
}

impl Registry {
    pub fn new(max: u8) -> Self {
        let free = (1..=max)
            .filter_map(EquipmentId::new)
            .collect::<VecDeque<_>>();
        Self {
            max,
            inner: Mutex::new(Inner { connections: HashMap::new(), free }),
        }
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    /// Current number of registered equipment connections.
    pub fn count(&self) -> usize {
        self.inner.lock().expect("registry mutex poisoned").connections.len()
    }

    /// Allocates the lowest available id (initially ascending, then
    /// longest-free-first once ids have cycled through release) and
    /// associates it with `handle`. Fails if the registry is at capacity.
    pub fn admit(&self, handle: ConnHandle) -> Result<EquipmentId, RegistryError> {
        let mut inner = self.inner.lock().expect("registry mutex poisoned");
        let id = inner
            .free
            .pop_front()
            .ok_or(RegistryError::Full { max: self.max })?;
        inner.connections.insert(id, handle);
        Ok(id)
    }

    /// Releases `id` back to the free pool if it is currently registered.
    /// Returns `false` if `id` was not registered.
    pub fn release(&self, id: EquipmentId) -> bool {
        let mut inner = self.inner.lock().expect("registry mutex poisoned");
        if inner.connections.remove(&id).is_some() {
            inner.free.push_back(id);
            true
        } else {
            false
        }
    }

    /// A snapshot of currently registered ids, in ascending order.
    pub fn snapshot(&self) -> Vec<EquipmentId> {
        let inner = self.inner.lock().expect("registry mutex poisoned");
        let mut ids: Vec<_> = inner.connections.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn contains(&self, id: EquipmentId) -> bool {
        self.inner.lock().expect("registry mutex poisoned").connections.contains_key(&id)
    }

    /// Sends `encoded` to every registered connection.
    pub fn broadcast(&self, encoded: &[u8]) {
        let inner = self.inner.lock().expect("registry mutex poisoned");
        for handle in inner.connections.values() {
            handle.send(encoded.to_vec());
        }
    }

    /// Sends `encoded` to every registered connection except `exclude`.
    pub fn broadcast_except(&self, exclude: EquipmentId, encoded: &[u8]) {
        let inner = self.inner.lock().expect("registry mutex poisoned");
        for (id, handle) in inner.connections.iter() {
            if *id != exclude {
                handle.send(encoded.to_vec());
            }
        }
    }

    /// Sends `encoded` to the connection registered under `id`, if any.
    pub fn send_to(&self, id: EquipmentId, encoded: Vec<u8>) -> bool {
        let inner = self.inner.lock().expect("registry mutex poisoned");
        match inner.connections.get(&id) {
            Some(handle) => handle.send(encoded),
            None => false,
        }
    }
}
