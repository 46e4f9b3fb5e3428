use thiserror::Error;

/// Errors returned by key-management implementations.
///
/// `Clone` so test doubles can replay a configured error across calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyStoreError {
    #[error("address {address} is not enabled for chain {chain_id}")]
    Disabled { address: String, chain_id: String },

    #[error("unknown address: {0}")]
    UnknownAddress(String),

    #[error("keystore error: {0}")]
    Internal(String),
}
