//! In-memory keystore — enabled-key registry with change notifications.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ember_types::{Hashable, Id, Sequence};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::KeyStoreError;
use crate::keystore::{KeyChanges, KeyStore, Unsubscribe};

/// An in-memory enabled-key registry.
///
/// Tracks which addresses are enabled per chain and notifies subscribers on
/// every change. Thread-safe for use with tokio's multi-threaded runtime.
pub struct InMemoryKeyStore<A, C, S> {
    /// Enabled addresses per chain, keyed by the chain id's string form.
    enabled: Mutex<HashMap<String, Vec<A>>>,
    subscribers: Arc<Mutex<HashMap<u64, mpsc::UnboundedSender<()>>>>,
    next_subscriber: AtomicU64,
    _chain: PhantomData<C>,
    _seq: PhantomData<S>,
}

impl<A: Hashable, C: Id, S: Sequence> InMemoryKeyStore<A, C, S> {
    pub fn new() -> Self {
        Self {
            enabled: Mutex::new(HashMap::new()),
            subscribers: Arc::new(Mutex::new(HashMap::new())),
            next_subscriber: AtomicU64::new(0),
            _chain: PhantomData,
            _seq: PhantomData,
        }
    }

    /// Enable `address` for `chain_id`. No-op if already enabled.
    pub fn enable(&self, address: A, chain_id: &C) {
        let mut enabled = self.enabled.lock().unwrap();
        let entry = enabled.entry(chain_id.to_string()).or_default();
        if entry.contains(&address) {
            return;
        }
        debug!(%address, %chain_id, "key enabled");
        entry.push(address);
        drop(enabled);
        self.notify();
    }

    /// Disable `address` for `chain_id`. No-op if not enabled.
    pub fn disable(&self, address: &A, chain_id: &C) {
        let mut enabled = self.enabled.lock().unwrap();
        let Some(entry) = enabled.get_mut(&chain_id.to_string()) else {
            return;
        };
        let before = entry.len();
        entry.retain(|a| a != address);
        if entry.len() == before {
            return;
        }
        debug!(%address, %chain_id, "key disabled");
        drop(enabled);
        self.notify();
    }

    fn notify(&self) {
        // Sends to closed receivers drop the subscription.
        self.subscribers
            .lock()
            .unwrap()
            .retain(|_, tx| tx.send(()).is_ok());
    }
}

impl<A: Hashable, C: Id, S: Sequence> Default for InMemoryKeyStore<A, C, S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<A: Hashable, C: Id, S: Sequence> KeyStore for InMemoryKeyStore<A, C, S> {
    type Address = A;
    type Chain = C;
    type Seq = S;

    async fn check_enabled(&self, address: &A, chain_id: &C) -> Result<(), KeyStoreError> {
        let enabled = self.enabled.lock().unwrap();
        let is_enabled = enabled
            .get(&chain_id.to_string())
            .is_some_and(|addrs| addrs.contains(address));
        if is_enabled {
            Ok(())
        } else {
            Err(KeyStoreError::Disabled {
                address: address.to_string(),
                chain_id: chain_id.to_string(),
            })
        }
    }

    async fn enabled_addresses(&self, chain_id: &C) -> Result<Vec<A>, KeyStoreError> {
        Ok(self
            .enabled
            .lock()
            .unwrap()
            .get(&chain_id.to_string())
            .cloned()
            .unwrap_or_default())
    }

    fn subscribe_to_key_changes(&self) -> (KeyChanges, Unsubscribe) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().unwrap().insert(id, tx);

        let subscribers = Arc::clone(&self.subscribers);
        let unsubscribe: Unsubscribe = Box::new(move || {
            subscribers.lock().unwrap().remove(&id);
        });
        (rx, unsubscribe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_types::{Address, ChainId, Nonce};

    type TestKeyStore = InMemoryKeyStore<Address, ChainId, Nonce>;

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    #[tokio::test]
    async fn check_enabled_after_enable() {
        let ks = TestKeyStore::new();
        let chain = ChainId::new(1);
        ks.enable(addr(1), &chain);

        assert_eq!(ks.check_enabled(&addr(1), &chain).await, Ok(()));
    }

    #[tokio::test]
    async fn check_enabled_unknown_address_fails() {
        let ks = TestKeyStore::new();
        let chain = ChainId::new(1);
        ks.enable(addr(1), &chain);

        let err = ks.check_enabled(&addr(2), &chain).await.unwrap_err();
        assert_eq!(
            err,
            KeyStoreError::Disabled {
                address: addr(2).to_string(),
                chain_id: "1".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn check_enabled_is_per_chain() {
        let ks = TestKeyStore::new();
        ks.enable(addr(1), &ChainId::new(1));

        assert!(ks.check_enabled(&addr(1), &ChainId::new(2)).await.is_err());
    }

    #[tokio::test]
    async fn enabled_addresses_preserves_insertion_order() {
        let ks = TestKeyStore::new();
        let chain = ChainId::new(1);
        ks.enable(addr(3), &chain);
        ks.enable(addr(1), &chain);
        ks.enable(addr(3), &chain); // duplicate, ignored

        let addrs = ks.enabled_addresses(&chain).await.unwrap();
        assert_eq!(addrs, vec![addr(3), addr(1)]);
    }

    #[tokio::test]
    async fn enabled_addresses_empty_by_default() {
        let ks = TestKeyStore::new();
        let addrs = ks.enabled_addresses(&ChainId::new(1)).await.unwrap();
        assert!(addrs.is_empty());
    }

    #[tokio::test]
    async fn disable_removes_address() {
        let ks = TestKeyStore::new();
        let chain = ChainId::new(1);
        ks.enable(addr(1), &chain);
        ks.disable(&addr(1), &chain);

        assert!(ks.check_enabled(&addr(1), &chain).await.is_err());
    }

    #[tokio::test]
    async fn subscribers_are_notified_on_change() {
        let ks = TestKeyStore::new();
        let (mut rx, _unsub) = ks.subscribe_to_key_changes();

        ks.enable(addr(1), &ChainId::new(1));
        assert_eq!(rx.try_recv(), Ok(()));

        ks.disable(&addr(1), &ChainId::new(1));
        assert_eq!(rx.try_recv(), Ok(()));
    }

    #[tokio::test]
    async fn no_notification_for_noop_changes() {
        let ks = TestKeyStore::new();
        let chain = ChainId::new(1);
        ks.enable(addr(1), &chain);

        let (mut rx, _unsub) = ks.subscribe_to_key_changes();
        ks.enable(addr(1), &chain); // already enabled
        ks.disable(&addr(2), &chain); // never enabled

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unsubscribe_stops_notifications() {
        let ks = TestKeyStore::new();
        let (mut rx, unsub) = ks.subscribe_to_key_changes();

        unsub();
        ks.enable(addr(1), &ChainId::new(1));

        // Sender side was dropped by unsubscribe, so the channel reports
        // disconnected rather than a pending notification.
        assert!(rx.try_recv().is_err());
    }
}
