use crate::fees::FeeField;
use crate::types::{ObjectId, SuiAddress};
use thiserror::Error;

/// Errors raised while composing, validating, or handing off a transaction unit.
///
/// Validation variants (`InvalidRange`, `InvalidAmount`, `InvalidAddress`,
/// `LengthMismatch`) are always raised before anything is appended to the
/// unit under construction.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("{field} fee of {bps} bps is outside [0, 10000]")]
    /// A fee value fell outside the basis-point range.
    InvalidRange {
        /// Fee being set.
        field: FeeField,
        /// Rejected value.
        bps: i64,
    },
    #[error("stake amount {amount} is not a valid u64 quantity")]
    /// A stake delta was negative or did not fit the ledger's integer width.
    InvalidAmount {
        /// Rejected amount.
        amount: i128,
    },
    #[error("invalid address: {0:?}")]
    /// An address or object id could not be parsed.
    InvalidAddress(String),
    #[error("{addresses} validator addresses but {weights} weights")]
    /// Validator and weight inputs have different lengths.
    LengthMismatch {
        /// Number of addresses supplied.
        addresses: usize,
        /// Number of weights supplied.
        weights: usize,
    },
    #[error("validator index {index} out of range (pool has {count} validators)")]
    /// A validator index did not resolve against the pool snapshot.
    ValidatorIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Validators currently tracked by the pool.
        count: usize,
    },
    #[error("{owner} owns no {struct_type}")]
    /// The account owns no capability of the requested type.
    CapabilityNotFound {
        /// Account that was searched.
        owner: SuiAddress,
        /// Fully qualified capability type.
        struct_type: String,
    },
    #[error("pool {id} not found (expected an object of type *{expected_type})")]
    /// The pool id did not resolve to a pool of the expected type.
    PoolNotFound {
        /// Requested pool id.
        id: ObjectId,
        /// Expected type suffix.
        expected_type: String,
    },
    #[error("pool has no weight hook configured")]
    /// A weight-hook action was requested for a pool without a hook id.
    MissingWeightHook,
    #[error("{owner} holds no coins of type {coin_type}")]
    /// No coin objects of the requested type are owned by the account.
    NoCoins {
        /// Account that was searched.
        owner: SuiAddress,
        /// Coin type searched for.
        coin_type: String,
    },
    #[error("malformed transaction unit: {0}")]
    /// The unit's reference graph is inconsistent.
    MalformedUnit(String),
    #[error("ledger rejected request: {0}")]
    /// Opaque failure reported by the ledger; never retried here.
    LedgerRejected(String),
    #[error("transport error: {0}")]
    /// The request never reached the ledger or the response was unreadable.
    Transport(String),
    #[error("decode error: {0}")]
    /// A ledger response did not have the expected shape.
    Decode(String),
}
