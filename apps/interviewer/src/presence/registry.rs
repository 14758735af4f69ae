use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::models::user::Identity;
use crate::presence::protocol::ServerEvent;

const SHARD_COUNT: usize = 32;

#[derive(Debug, Error, PartialEq)]
pub enum PushError {
    #[error("no live channel for {0}")]
    NoChannel(Identity),

    #[error("channel {0} is closed")]
    ChannelClosed(Uuid),
}

/// One live connection. Cloning shares the same outbound queue; equality is by
/// channel id, so a reconnect always yields a handle unequal to the old one.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    id: Uuid,
    identity: Identity,
    sender: mpsc::UnboundedSender<ServerEvent>,
}

impl PartialEq for ChannelHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ChannelHandle {}

impl ChannelHandle {
    /// Creates a handle and the receiving end its socket task drains.
    pub fn open(identity: Identity) -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = Self {
            id: Uuid::new_v4(),
            identity,
            sender,
        };
        (handle, receiver)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn send(&self, event: ServerEvent) -> Result<(), PushError> {
        self.sender
            .send(event)
            .map_err(|_| PushError::ChannelClosed(self.id))
    }
}

/// Where pipeline checkpoints are pushed. Fire-and-forget: an `Err` tells the
/// caller the event went nowhere, it never blocks on delivery.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, identity: &Identity, event: ServerEvent) -> Result<(), PushError>;
}

/// Identity → live channel directory.
///
/// Split into independently locked shards chosen by identity hash, so
/// connects/disconnects for unrelated identities do not contend. Every operation
/// holds exactly one shard lock for a single map access.
pub struct PresenceRegistry {
    shards: Vec<Mutex<HashMap<Identity, ChannelHandle>>>,
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self {
            shards: (0..SHARD_COUNT).map(|_| Mutex::new(HashMap::new())).collect(),
        }
    }

    fn shard(&self, identity: &Identity) -> MutexGuard<'_, HashMap<Identity, ChannelHandle>> {
        let mut hasher = DefaultHasher::new();
        identity.hash(&mut hasher);
        let index = (hasher.finish() as usize) % self.shards.len();
        // Shard maps are only touched by single insert/get/remove calls, so a
        // poisoned lock still guards a consistent map.
        self.shards[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Maps the handle's identity to it, returning the handle it replaced.
    /// The replaced channel is not closed; its socket simply stops receiving pushes.
    pub fn register(&self, handle: ChannelHandle) -> Option<ChannelHandle> {
        let identity = handle.identity.clone();
        self.shard(&identity).insert(identity, handle)
    }

    pub fn lookup(&self, identity: &Identity) -> Option<ChannelHandle> {
        self.shard(identity).get(identity).cloned()
    }

    /// Removes the mapping for the handle's identity only if it still points at
    /// this handle. A late disconnect from a superseded socket is a no-op.
    pub fn unregister(&self, handle: &ChannelHandle) -> bool {
        let mut shard = self.shard(&handle.identity);
        if shard.get(&handle.identity) == Some(handle) {
            shard.remove(&handle.identity);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProgressSink for PresenceRegistry {
    fn emit(&self, identity: &Identity, event: ServerEvent) -> Result<(), PushError> {
        let handle = self
            .lookup(identity)
            .ok_or_else(|| PushError::NoChannel(identity.clone()))?;
        handle.send(event)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn identity(raw: &str) -> Identity {
        Identity::parse(raw).unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = PresenceRegistry::new();
        let (c1, _rx) = ChannelHandle::open(identity("a"));
        assert!(registry.register(c1.clone()).is_none());
        assert_eq!(registry.lookup(&identity("a")), Some(c1));
        assert!(registry.lookup(&identity("b")).is_none());
    }

    #[test]
    fn test_reconnect_overwrites_and_returns_evicted() {
        let registry = PresenceRegistry::new();
        let (c1, _rx1) = ChannelHandle::open(identity("a"));
        let (c2, _rx2) = ChannelHandle::open(identity("a"));
        registry.register(c1.clone());
        assert_eq!(registry.register(c2.clone()), Some(c1));
        assert_eq!(registry.lookup(&identity("a")), Some(c2));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_stale_unregister_keeps_newer_channel() {
        let registry = PresenceRegistry::new();
        let (c1, _rx1) = ChannelHandle::open(identity("a"));
        let (c2, _rx2) = ChannelHandle::open(identity("a"));
        registry.register(c1.clone());
        registry.register(c2.clone());

        assert!(!registry.unregister(&c1));
        assert_eq!(registry.lookup(&identity("a")), Some(c2.clone()));

        assert!(registry.unregister(&c2));
        assert!(registry.lookup(&identity("a")).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_emit_reaches_current_channel() {
        let registry = PresenceRegistry::new();
        let (c1, mut rx) = ChannelHandle::open(identity("a"));
        registry.register(c1);

        registry
            .emit(&identity("a"), ServerEvent::Validated { valid: true })
            .unwrap();
        assert_eq!(rx.try_recv().unwrap(), ServerEvent::Validated { valid: true });
    }

    #[test]
    fn test_emit_without_channel_is_typed_miss() {
        let registry = PresenceRegistry::new();
        let err = registry.emit(&identity("ghost"), ServerEvent::Parsed).unwrap_err();
        assert_eq!(err, PushError::NoChannel(identity("ghost")));
    }

    #[test]
    fn test_emit_to_dropped_receiver_is_closed() {
        let registry = PresenceRegistry::new();
        let (c1, rx) = ChannelHandle::open(identity("a"));
        let id = c1.id();
        registry.register(c1);
        drop(rx);
        let err = registry.emit(&identity("a"), ServerEvent::Parsed).unwrap_err();
        assert_eq!(err, PushError::ChannelClosed(id));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_identities_do_not_lose_updates() {
        let registry = Arc::new(PresenceRegistry::new());
        let mut tasks = Vec::new();

        for i in 0..200 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                let who = identity(&format!("user-{i}"));
                let (first, _rx1) = ChannelHandle::open(who.clone());
                let (second, rx2) = ChannelHandle::open(who.clone());
                registry.register(first.clone());
                registry.register(second.clone());
                registry.unregister(&first);
                // Keep the live receiver so the handle stays open.
                (who, second, rx2)
            }));
        }

        let mut survivors = Vec::new();
        for task in tasks {
            survivors.push(task.await.unwrap());
        }

        assert_eq!(registry.len(), 200);
        for (who, second, _rx) in &survivors {
            assert_eq!(registry.lookup(who).as_ref(), Some(second));
        }
    }
}
