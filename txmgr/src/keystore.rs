//! Key-management contract used by the transaction manager.

use async_trait::async_trait;
use ember_types::{Hashable, Id, Sequence};
use tokio::sync::mpsc;

use crate::error::KeyStoreError;

/// Receiver for key-change notifications.
///
/// A `()` arrives whenever the set of enabled keys changes; subscribers
/// re-read the enabled addresses on receipt.
pub type KeyChanges = mpsc::UnboundedReceiver<()>;

/// Cancels a key-change subscription.
pub type Unsubscribe = Box<dyn FnOnce() + Send>;

/// Key management as seen by the transaction manager.
///
/// Implementations are parameterized over the address, chain-identifier,
/// and sequence-number types of the chain they serve. The sequence type is
/// part of the contract even though none of these operations consume it:
/// the signing surfaces of the same keystore do.
#[async_trait]
pub trait KeyStore: Send + Sync {
    type Address: Hashable;
    type Chain: Id;
    type Seq: Sequence;

    /// Ok when `address` is enabled for `chain_id`, an error describing why
    /// not otherwise.
    async fn check_enabled(
        &self,
        address: &Self::Address,
        chain_id: &Self::Chain,
    ) -> Result<(), KeyStoreError>;

    /// All addresses enabled for `chain_id`. Empty when none are.
    async fn enabled_addresses(
        &self,
        chain_id: &Self::Chain,
    ) -> Result<Vec<Self::Address>, KeyStoreError>;

    /// Subscribe to key-change notifications.
    ///
    /// Returns the notification receiver and a callback that cancels the
    /// subscription.
    fn subscribe_to_key_changes(&self) -> (KeyChanges, Unsubscribe);
}
