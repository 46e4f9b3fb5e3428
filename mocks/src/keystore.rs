//! Expectation-based mock of the transaction manager's key-management seam.

use std::marker::PhantomData;

use async_trait::async_trait;
use ember_txmgr::{KeyChanges, KeyStore, KeyStoreError, Unsubscribe};
use ember_types::{Hashable, Id, Sequence};

use crate::expect::{CallBuilder, ExpectationSet};

/// Mock [`KeyStore`].
///
/// Configure each operation through its `expect_*` method, then hand the
/// mock to the system under test. An invocation that matches no
/// expectation fails the test immediately; dropping the mock asserts that
/// every configured expectation was matched.
pub struct MockKeyStore<A: Hashable, C: Id, S: Sequence> {
    check_enabled: ExpectationSet<(A, C), Result<(), KeyStoreError>>,
    enabled_addresses: ExpectationSet<C, Result<Vec<A>, KeyStoreError>>,
    subscribe_to_key_changes: ExpectationSet<(), (KeyChanges, Unsubscribe)>,
    _seq: PhantomData<S>,
}

impl<A: Hashable, C: Id, S: Sequence> MockKeyStore<A, C, S> {
    pub fn new() -> Self {
        Self {
            check_enabled: ExpectationSet::new("MockKeyStore::check_enabled"),
            enabled_addresses: ExpectationSet::new("MockKeyStore::enabled_addresses"),
            subscribe_to_key_changes: ExpectationSet::new(
                "MockKeyStore::subscribe_to_key_changes",
            ),
            _seq: PhantomData,
        }
    }

    /// Expect a `check_enabled` invocation. Arguments are
    /// `(address, chain_id)`.
    pub fn expect_check_enabled(
        &self,
    ) -> CallBuilder<'_, (A, C), Result<(), KeyStoreError>> {
        self.check_enabled.expect()
    }

    /// Expect an `enabled_addresses` invocation. The argument is the chain
    /// id.
    pub fn expect_enabled_addresses(
        &self,
    ) -> CallBuilder<'_, C, Result<Vec<A>, KeyStoreError>> {
        self.enabled_addresses.expect()
    }

    /// Expect a `subscribe_to_key_changes` invocation.
    ///
    /// Channel receivers are not clonable; configure the reply with
    /// `return_once` or `returning`.
    pub fn expect_subscribe_to_key_changes(
        &self,
    ) -> CallBuilder<'_, (), (KeyChanges, Unsubscribe)> {
        self.subscribe_to_key_changes.expect()
    }

    /// Assert that every configured expectation was matched.
    ///
    /// Runs automatically on drop; call it directly to fail at a specific
    /// point instead.
    pub fn verify(&self) {
        let unmet: Vec<String> = [
            self.check_enabled.unmet(),
            self.enabled_addresses.unmet(),
            self.subscribe_to_key_changes.unmet(),
        ]
        .concat();
        if !unmet.is_empty() {
            panic!("MockKeyStore: unmet expectations:\n  {}", unmet.join("\n  "));
        }
    }
}

impl<A: Hashable, C: Id, S: Sequence> Default for MockKeyStore<A, C, S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<A: Hashable, C: Id, S: Sequence> KeyStore for MockKeyStore<A, C, S> {
    type Address = A;
    type Chain = C;
    type Seq = S;

    async fn check_enabled(&self, address: &A, chain_id: &C) -> Result<(), KeyStoreError> {
        self.check_enabled
            .call((address.clone(), chain_id.clone()))
    }

    async fn enabled_addresses(&self, chain_id: &C) -> Result<Vec<A>, KeyStoreError> {
        self.enabled_addresses.call(chain_id.clone())
    }

    fn subscribe_to_key_changes(&self) -> (KeyChanges, Unsubscribe) {
        self.subscribe_to_key_changes.call(())
    }
}

impl<A: Hashable, C: Id, S: Sequence> Drop for MockKeyStore<A, C, S> {
    fn drop(&mut self) {
        // Skip the assertion while unwinding so the original failure
        // surfaces instead of a drop-time double panic.
        if !std::thread::panicking() {
            self.verify();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expect::eq;
    use ember_types::{Address, ChainId, Nonce};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    type Mock = MockKeyStore<Address, ChainId, Nonce>;

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    #[tokio::test]
    async fn check_enabled_replays_configured_ok() {
        let ks = Mock::new();
        ks.expect_check_enabled()
            .with(eq((addr(0xab), ChainId::new(1))))
            .return_const(Ok(()));

        assert_eq!(ks.check_enabled(&addr(0xab), &ChainId::new(1)).await, Ok(()));
    }

    #[tokio::test]
    async fn check_enabled_replays_configured_error() {
        let ks = Mock::new();
        let disabled = KeyStoreError::Disabled {
            address: addr(0xab).to_string(),
            chain_id: "1".to_string(),
        };
        ks.expect_check_enabled().return_const(Err(disabled.clone()));

        assert_eq!(
            ks.check_enabled(&addr(0xab), &ChainId::new(1)).await,
            Err(disabled)
        );
    }

    #[tokio::test]
    #[should_panic(expected = "MockKeyStore::check_enabled: unexpected call")]
    async fn check_enabled_wrong_chain_is_fatal() {
        let ks = Mock::new();
        ks.expect_check_enabled()
            .with(eq((addr(0xab), ChainId::new(1))))
            .return_const(Ok(()));

        let _ = ks.check_enabled(&addr(0xab), &ChainId::new(2)).await;
    }

    #[tokio::test]
    async fn enabled_addresses_computed_from_chain_id() {
        let ks = Mock::new();
        ks.expect_enabled_addresses()
            .returning(|chain_id| Ok(vec![Address::new([chain_id.as_u64() as u8; 20])]));

        let addrs = ks.enabled_addresses(&ChainId::new(7)).await.unwrap();
        assert_eq!(addrs, vec![addr(7)]);
    }

    #[tokio::test]
    async fn enabled_addresses_replays_configured_error() {
        let ks = Mock::new();
        let unknown = KeyStoreError::UnknownAddress(addr(9).to_string());
        ks.expect_enabled_addresses()
            .return_const(Err(unknown.clone()));

        assert_eq!(
            ks.enabled_addresses(&ChainId::new(1)).await,
            Err(unknown)
        );
    }

    #[tokio::test]
    async fn enabled_addresses_default_empty_list() {
        let ks = Mock::new();
        ks.expect_enabled_addresses().return_const(Ok(Vec::new()));

        let addrs = ks.enabled_addresses(&ChainId::new(1)).await.unwrap();
        assert!(addrs.is_empty());
    }

    #[tokio::test]
    async fn run_side_effect_sees_actual_arguments() {
        let calls: Arc<Mutex<Vec<(Address, ChainId)>>> = Arc::new(Mutex::new(Vec::new()));
        let calls_in_run = Arc::clone(&calls);

        let ks = Mock::new();
        ks.expect_check_enabled()
            .run(move |args| calls_in_run.lock().unwrap().push(args.clone()))
            .return_const(Ok(()));

        ks.check_enabled(&addr(1), &ChainId::new(5)).await.unwrap();

        assert_eq!(calls.lock().unwrap().as_slice(), &[(addr(1), ChainId::new(5))]);
    }

    #[tokio::test]
    async fn subscribe_returns_configured_channel_and_unsubscribe() {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let cancelled_in_unsub = Arc::clone(&cancelled);

        let ks = Mock::new();
        ks.expect_subscribe_to_key_changes().return_once((
            rx,
            Box::new(move || cancelled_in_unsub.store(true, Ordering::SeqCst)),
        ));

        let (mut changes, unsubscribe) = ks.subscribe_to_key_changes();

        tx.send(()).unwrap();
        assert_eq!(changes.try_recv(), Ok(()));

        unsubscribe();
        assert!(cancelled.load(Ordering::SeqCst));
    }

    #[test]
    #[should_panic(expected = "MockKeyStore: unmet expectations")]
    fn drop_with_unmet_expectation_panics() {
        let ks = Mock::new();
        ks.expect_check_enabled().return_const(Ok(()));
        // Dropped without a matching call.
    }

    #[tokio::test]
    async fn drop_after_all_expectations_met_is_clean() {
        let ks = Mock::new();
        ks.expect_check_enabled().return_const(Ok(()));
        ks.check_enabled(&addr(1), &ChainId::new(1)).await.unwrap();
        ks.verify();
    }

    #[tokio::test]
    async fn mock_works_behind_trait_object() {
        let ks = Mock::new();
        ks.expect_enabled_addresses().return_const(Ok(vec![addr(2)]));

        let boxed: Box<dyn KeyStore<Address = Address, Chain = ChainId, Seq = Nonce>> =
            Box::new(ks);
        let addrs = boxed.enabled_addresses(&ChainId::new(1)).await.unwrap();
        assert_eq!(addrs, vec![addr(2)]);
    }
}
