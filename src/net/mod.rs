//! Ledger access for the `springsui` CLI.
//!
//! These modules are gated behind the `net` Cargo feature: a blocking
//! JSON-RPC [`LedgerReader`](crate::transport::LedgerReader) and the sender
//! identity derived from an ed25519 secret key.

#![cfg(feature = "net")]

/// Sender identity and address derivation.
pub mod identity;
/// Full-node JSON-RPC client.
pub mod rpc;

pub use identity::{address_from_public_key, KeyError, SigningIdentity, SECRET_KEY_ENV};
pub use rpc::{Page, RpcClient};
