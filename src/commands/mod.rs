//! CLI command flows: resolve what the action needs, compose one unit,
//! validate it, and hand it to the submitter.

use crate::capability::{AdminCap, CapabilityResolver, WeightHookAdminCap};
use crate::composer::TransactionComposer;
use crate::error::ComposeError;
use crate::pool::{PoolState, PoolStateReader};
use crate::transport::{LedgerReader, SubmitReceipt, Submitter};
use crate::types::{PoolDescriptor, SuiAddress};
use crate::unit::TransactionUnit;
use tracing::info;

/// Operator actions gated by the pool `AdminCap`.
pub mod admin;
/// Mint, redeem and state inspection.
pub mod user;
/// Weight hook lifecycle.
pub mod weight_hook;

pub use admin::{
    run_collect_fees, run_decrease_validator_stake, run_increase_validator_stake, run_update_fees,
    FeeUpdate, ValidatorTarget,
};
pub use user::{run_fetch_state, run_mint, run_redeem};
pub use weight_hook::{run_initialize_weight_hook, run_rebalance, run_set_weights};

/// Everything a command needs; the sender is passed explicitly.
pub struct CommandContext<'a> {
    /// Composer bound to the contract package.
    pub composer: TransactionComposer,
    /// Pool acted on.
    pub pool: PoolDescriptor,
    /// Account the unit is built for.
    pub sender: SuiAddress,
    /// Ledger reads.
    pub reader: &'a dyn LedgerReader,
    /// Destination for validated units.
    pub submitter: &'a dyn Submitter,
}

impl<'a> CommandContext<'a> {
    fn resolver(&self) -> CapabilityResolver<'a, dyn LedgerReader + 'a> {
        CapabilityResolver::new(self.reader, self.composer.package())
    }

    fn admin_cap(&self) -> Result<AdminCap, ComposeError> {
        self.resolver().find_admin_cap(&self.sender, &self.pool.token_type)
    }

    fn weight_hook_admin_cap(&self) -> Result<WeightHookAdminCap, ComposeError> {
        self.resolver()
            .find_weight_hook_admin_cap(&self.sender, &self.pool.token_type)
    }

    fn pool_state(&self) -> Result<PoolState, ComposeError> {
        PoolStateReader::new(self.reader).fetch_pool_state(&self.pool)
    }

    fn submit(&self, action: &str, unit: TransactionUnit) -> Result<SubmitReceipt, ComposeError> {
        let validated = unit.validate()?;
        info!(
            evt = "submit",
            action,
            commands = validated.unit().len(),
            digest = %validated.digest_hex()
        );
        self.submitter.submit(&self.sender, &validated)
    }
}
