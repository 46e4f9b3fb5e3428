//! Fundamental types for the ember node.
//!
//! Defines the trait bounds the key-management and gateway contracts are
//! parameterized over, plus the concrete address, chain-id, and nonce types
//! used by the EVM-facing deployments and the test suite.

pub mod address;
pub mod chain;
pub mod nonce;
pub mod traits;

pub use address::{Address, AddressParseError};
pub use chain::ChainId;
pub use nonce::Nonce;
pub use traits::{Hashable, Id, Sequence};
