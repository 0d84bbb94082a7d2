//! Seams to the process shell: ledger reads and unit submission.
//!
//! The composer never talks to the network itself. Object lookups go through
//! [`LedgerReader`] and finished units through [`Submitter`]; each call is a
//! single blocking request with no retry.

use crate::error::ComposeError;
use crate::types::{ObjectId, SuiAddress};
use crate::unit::ValidatedUnit;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Summary of an object owned by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedObject {
    /// Object id.
    pub object_id: ObjectId,
    /// Current version.
    pub version: u64,
    /// Full Move type.
    pub object_type: String,
}

/// Object with its decoded Move fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectData {
    /// Object id.
    pub object_id: ObjectId,
    /// Full Move type.
    pub object_type: String,
    /// JSON rendering of the Move struct fields.
    pub fields: Value,
}

/// Coin object and its balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinObject {
    /// Object id.
    pub object_id: ObjectId,
    /// Balance in the coin's smallest unit.
    pub balance: u64,
}

/// Read-only view of the ledger's object index.
pub trait LedgerReader {
    /// Objects owned by `owner` whose type is exactly `struct_type`.
    fn owned_objects(
        &self,
        owner: &SuiAddress,
        struct_type: &str,
    ) -> Result<Vec<OwnedObject>, ComposeError>;

    /// Object by id; `Ok(None)` when it does not exist.
    fn object(&self, id: &ObjectId) -> Result<Option<ObjectData>, ComposeError>;

    /// Coins of `coin_type` owned by `owner`.
    fn coins(&self, owner: &SuiAddress, coin_type: &str) -> Result<Vec<CoinObject>, ComposeError>;
}

/// Outcome of handing a unit to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    /// Hex digest of the submitted unit.
    pub digest: String,
    /// Where the unit went (outbox path, `stdout`, endpoint).
    pub destination: String,
}

/// Accepts validated units for atomic submission.
pub trait Submitter {
    /// Hands `unit`, to be signed by `sender`, to the transport.
    fn submit(
        &self,
        sender: &SuiAddress,
        unit: &ValidatedUnit,
    ) -> Result<SubmitReceipt, ComposeError>;
}
