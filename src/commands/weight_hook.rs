use super::CommandContext;
use crate::error::ComposeError;
use crate::transport::SubmitReceipt;
use crate::unit::TransactionUnit;
use crate::weights::build_weight_map;

/// Creates and shares the pool's weight hook; the new hook admin cap goes to
/// the sender.
pub fn run_initialize_weight_hook(ctx: &CommandContext<'_>) -> Result<SubmitReceipt, ComposeError> {
    let admin_cap = ctx.admin_cap()?;
    let mut unit = TransactionUnit::new();
    let hook_cap = ctx
        .composer
        .initialize_weight_hook(&mut unit, &ctx.pool, &admin_cap);
    hook_cap.transfer_to(&mut unit, &ctx.sender);
    ctx.submit("initialize_weight_hook", unit)
}

/// Replaces the hook's validator weights with `validators[i] → weights[i]`.
pub fn run_set_weights<S: AsRef<str>>(
    ctx: &CommandContext<'_>,
    validators: &[S],
    weights: &[u64],
) -> Result<SubmitReceipt, ComposeError> {
    let map = build_weight_map(validators, weights)?;
    let weight_hook = ctx.pool.weight_hook_id.ok_or(ComposeError::MissingWeightHook)?;
    let hook_cap = ctx.weight_hook_admin_cap()?;
    let mut unit = TransactionUnit::new();
    ctx.composer
        .set_validator_addresses_and_weights(&mut unit, &ctx.pool, weight_hook, &hook_cap, &map);
    ctx.submit("set_validator_addresses_and_weights", unit)
}

/// Triggers a rebalance through the pool's weight hook.
pub fn run_rebalance(ctx: &CommandContext<'_>) -> Result<SubmitReceipt, ComposeError> {
    let weight_hook = ctx.pool.weight_hook_id.ok_or(ComposeError::MissingWeightHook)?;
    let mut unit = TransactionUnit::new();
    ctx.composer.rebalance(&mut unit, &ctx.pool, weight_hook);
    ctx.submit("rebalance", unit)
}
