// ── Write sequencing ──
//
// Every outbound write takes a ticket covering the (target, field) pairs it
// touches. When the write settles, only the pairs the ticket is still the
// latest issuer for may be committed. A slow response can therefore never
// overwrite a field that a newer write has since claimed.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::model::{LightKey, NodeId, ValueField};

/// What a write is aimed at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WriteTarget {
    Node(NodeId),
    Light(NodeId, LightKey),
    /// The effect running on a node.
    Effect(NodeId),
}

/// Field of a [`WriteTarget`] claimed by a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteField {
    Value(ValueField),
    Selection,
}

pub type WriteKey = (WriteTarget, WriteField);

/// Proof of issue for one write.
#[derive(Debug, Clone)]
pub struct WriteTicket<K> {
    entries: Vec<(K, u64)>,
}

impl<K> WriteTicket<K> {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Latest issued sequence number per key.
pub struct WriteFence<K> {
    next: AtomicU64,
    latest: Mutex<HashMap<K, u64>>,
}

impl<K: Eq + Hash + Clone> WriteFence<K> {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
            latest: Mutex::new(HashMap::new()),
        }
    }

    /// Claim `keys` for a new write.
    pub fn issue(&self, keys: impl IntoIterator<Item = K>) -> WriteTicket<K> {
        let seq = self.next.fetch_add(1, Ordering::Relaxed);
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        let entries = keys
            .into_iter()
            .map(|key| {
                latest.insert(key.clone(), seq);
                (key, seq)
            })
            .collect();
        WriteTicket { entries }
    }

    /// Keys for which `ticket` is still the most recent write.
    pub fn settle(&self, ticket: &WriteTicket<K>) -> Vec<K> {
        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        ticket
            .entries
            .iter()
            .filter(|(key, seq)| latest.get(key) == Some(seq))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

impl<K: Eq + Hash + Clone> Default for WriteFence<K> {
    fn default() -> Self {
        Self::new()
    }
}
