//! Transaction-manager seams for the ember node.
//!
//! The transaction manager signs and broadcasts transactions on behalf of
//! enabled keys. This crate defines the key-management contract it depends
//! on, and an in-memory implementation used by single-process deployments
//! and the test suite.

pub mod error;
pub mod in_memory;
pub mod keystore;

pub use error::KeyStoreError;
pub use in_memory::InMemoryKeyStore;
pub use keystore::{KeyChanges, KeyStore, Unsubscribe};
