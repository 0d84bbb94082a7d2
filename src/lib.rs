#![deny(missing_docs)]

//! # springsui
//!
//! Client-side transaction composition for a Sui liquid-staking pool.
//!
//! Every protocol action (mint, redeem, validator stake moves, fee updates,
//! weight-hook management, rebalance) is expressed as one or more chained
//! calls appended to a [`TransactionUnit`]. A unit is an append-only command
//! list whose commands may consume values produced by earlier ones; it is
//! validated as a whole and handed to a [`Submitter`] for atomic execution.
//!
//! ## Pieces
//!
//! * [`TransactionComposer`]: one method per protocol action.
//! * [`FeeConfigBuilder`]: tri-state staging of fee updates. Unset fields keep
//!   the pool's current value.
//! * [`CapabilityResolver`]: finds the `AdminCap`/`WeightHookAdminCap` an
//!   account owns; the smallest object id wins when several match.
//! * [`build_weight_map`]: validator → weight maps, last write wins.
//! * [`PoolStateReader`]: read-only pool snapshots.
//!
//! Ledger access sits behind the [`LedgerReader`] trait. With the default
//! `net` feature, [`net::RpcClient`] implements it over a full node's
//! JSON-RPC endpoint.
//!
//! ```rust
//! use springsui::{PoolDescriptor, TransactionComposer, TransactionUnit};
//!
//! let package = "0x5d8f".parse().unwrap();
//! let pool = PoolDescriptor::new("0x4b7b".parse().unwrap(), "0xab::lst::LST");
//! let composer = TransactionComposer::new(package);
//! let sender = "0xa11ce".parse().unwrap();
//!
//! let mut unit = TransactionUnit::new();
//! let sui = unit.split_gas(1_000_000_000);
//! let lst = composer.mint(&mut unit, &pool, sui);
//! let back = composer.redeem(&mut unit, &pool, lst);
//! unit.transfer_coin(back, &sender);
//! assert!(unit.validate().is_ok());
//! ```

pub mod capability;
pub mod commands;
pub mod composer;
pub mod config;
mod error;
pub mod fees;
pub mod ledger;
#[cfg(feature = "net")]
pub mod net;
pub mod plan;
pub mod pool;
#[cfg(test)]
mod testing;
pub mod transport;
mod types;
pub mod unit;
mod weights;

pub use capability::{
    AdminCap, Capability, CapabilityKind, CapabilityResolver, PoolAdmin, WeightHookAdmin,
    WeightHookAdminCap,
};
pub use composer::TransactionComposer;
pub use config::{ClientConfig, ConfigError};
pub use error::ComposeError;
pub use fees::{FeeConfig, FeeConfigArgs, FeeConfigBuilder, FeeField, Staged, MAX_BPS};
pub use plan::{PlanWriter, UnitPlan, PLAN_SCHEMA};
pub use pool::{PoolState, PoolStateReader, ValidatorStake};
pub use transport::{CoinObject, LedgerReader, ObjectData, OwnedObject, SubmitReceipt, Submitter};
pub use types::{
    normalize_type_tag, ObjectId, PoolDescriptor, SuiAddress, ADDRESS_LENGTH, SUI_FRAMEWORK,
    SUI_SYSTEM_STATE_ID,
};
pub use unit::{
    Argument, CallInput, CoinHandle, Command, Dependency, MoveCall, ObjectArg, TransactionUnit,
    ValidatedUnit,
};
pub use weights::{build_weight_map, ValidatorWeightMap};
