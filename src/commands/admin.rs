use super::CommandContext;
use crate::error::ComposeError;
use crate::fees::{FeeConfig, FeeConfigArgs};
use crate::transport::SubmitReceipt;
use crate::unit::TransactionUnit;
use serde::Serialize;
use tracing::warn;

/// How the operator names the validator to unstake from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatorTarget {
    /// Explicit validator address.
    Address(String),
    /// Position in the pool's validator list.
    Index(usize),
}

/// Result of a fee update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeUpdate {
    /// Fees before the update.
    pub previous: FeeConfig,
    /// Fees after the update executes.
    pub next: FeeConfig,
    /// Submission receipt.
    pub receipt: SubmitReceipt,
}

/// Stakes `amount` MIST of the pool's buffer with `validator`.
pub fn run_increase_validator_stake(
    ctx: &CommandContext<'_>,
    validator: &str,
    amount: i128,
) -> Result<SubmitReceipt, ComposeError> {
    let admin_cap = ctx.admin_cap()?;
    let mut unit = TransactionUnit::new();
    ctx.composer
        .increase_validator_stake(&mut unit, &ctx.pool, &admin_cap, validator, amount)?;
    ctx.submit("increase_validator_stake", unit)
}

/// Unstakes up to `max_amount` MIST from the targeted validator.
pub fn run_decrease_validator_stake(
    ctx: &CommandContext<'_>,
    target: &ValidatorTarget,
    max_amount: i128,
) -> Result<SubmitReceipt, ComposeError> {
    let validator = match target {
        ValidatorTarget::Address(address) => address.clone(),
        ValidatorTarget::Index(index) => {
            ctx.pool_state()?.validator_at(*index)?.address.to_string()
        }
    };
    let admin_cap = ctx.admin_cap()?;
    let mut unit = TransactionUnit::new();
    ctx.composer
        .decrease_validator_stake(&mut unit, &ctx.pool, &admin_cap, &validator, max_amount)?;
    ctx.submit("decrease_validator_stake", unit)
}

/// Withdraws accrued fees to the sender.
pub fn run_collect_fees(ctx: &CommandContext<'_>) -> Result<SubmitReceipt, ComposeError> {
    let admin_cap = ctx.admin_cap()?;
    let mut unit = TransactionUnit::new();
    let fees = ctx.composer.collect_fees(&mut unit, &ctx.pool, &admin_cap);
    unit.transfer_coin(fees, &ctx.sender);
    ctx.submit("collect_fees", unit)
}

/// Applies the requested fee changes; unrequested fees keep their current
/// value. Returns `None` without touching the ledger when nothing was
/// requested.
pub fn run_update_fees(
    ctx: &CommandContext<'_>,
    args: &FeeConfigArgs,
) -> Result<Option<FeeUpdate>, ComposeError> {
    if args.is_empty() {
        warn!(evt = "update_fees_noop", "no fee values given; nothing to update");
        return Ok(None);
    }
    // Reject out-of-range values before any ledger read.
    args.validate()?;
    let previous = ctx.pool_state()?.fee_config;
    let admin_cap = ctx.admin_cap()?;
    let mut unit = TransactionUnit::new();
    let next = ctx
        .composer
        .update_fees(&mut unit, &ctx.pool, &admin_cap, args, &previous)?;
    let receipt = ctx.submit("update_fees", unit)?;
    Ok(Some(FeeUpdate {
        previous,
        next,
        receipt,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use crate::testing::{sender, test_pool, MemoryLedger, RecordingSubmitter};
    use crate::unit::{CallInput, Command, ObjectArg};

    fn move_calls(unit: &TransactionUnit) -> Vec<String> {
        unit.commands()
            .iter()
            .filter_map(|command| match command {
                Command::MoveCall(call) => Some(call.function.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn increase_uses_resolved_admin_cap() {
        let ledger = fixtures::ledger();
        let submitter = RecordingSubmitter::default();
        let ctx = fixtures::context(&ledger, &submitter, test_pool());
        run_increase_validator_stake(&ctx, "0xa1", 1_000).unwrap();

        let submitted = submitter.submitted.borrow();
        let unit = submitted[0].1.unit();
        assert!(unit
            .inputs()
            .contains(&CallInput::Object(ObjectArg::Owned { id: "0xad".parse().unwrap() })));
        assert_eq!(move_calls(unit), vec!["increase_validator_stake"]);
    }

    #[test]
    fn negative_amount_is_rejected_without_submission() {
        let ledger = fixtures::ledger();
        let submitter = RecordingSubmitter::default();
        let ctx = fixtures::context(&ledger, &submitter, test_pool());
        assert!(matches!(
            run_increase_validator_stake(&ctx, "0xa1", -1),
            Err(ComposeError::InvalidAmount { amount: -1 })
        ));
        assert!(submitter.submitted.borrow().is_empty());
    }

    #[test]
    fn missing_admin_cap_is_reported() {
        let ledger = MemoryLedger::default();
        let submitter = RecordingSubmitter::default();
        let ctx = fixtures::context(&ledger, &submitter, test_pool());
        assert!(matches!(
            run_collect_fees(&ctx),
            Err(ComposeError::CapabilityNotFound { owner, .. }) if owner == sender()
        ));
    }

    #[test]
    fn decrease_by_index_resolves_validator() {
        let ledger = fixtures::ledger();
        let submitter = RecordingSubmitter::default();
        let ctx = fixtures::context(&ledger, &submitter, test_pool());
        run_decrease_validator_stake(&ctx, &ValidatorTarget::Index(1), 50).unwrap();

        let submitted = submitter.submitted.borrow();
        let unit = submitted[0].1.unit();
        let validator: crate::types::SuiAddress = "0xb2".parse().unwrap();
        assert!(unit
            .inputs()
            .contains(&CallInput::Pure(validator.as_bytes().to_vec())));
    }

    #[test]
    fn decrease_by_bad_index_fails() {
        let ledger = fixtures::ledger();
        let submitter = RecordingSubmitter::default();
        let ctx = fixtures::context(&ledger, &submitter, test_pool());
        assert!(matches!(
            run_decrease_validator_stake(&ctx, &ValidatorTarget::Index(9), 50),
            Err(ComposeError::ValidatorIndexOutOfRange { index: 9, count: 2 })
        ));
    }

    #[test]
    fn collect_fees_sends_coin_to_sender() {
        let ledger = fixtures::ledger();
        let submitter = RecordingSubmitter::default();
        let ctx = fixtures::context(&ledger, &submitter, test_pool());
        run_collect_fees(&ctx).unwrap();
        let submitted = submitter.submitted.borrow();
        let unit = submitted[0].1.unit();
        assert_eq!(move_calls(unit), vec!["collect_fees"]);
        assert!(matches!(unit.commands().last(), Some(Command::TransferObjects { .. })));
    }

    #[test]
    fn update_fees_carries_current_values() {
        let ledger = fixtures::ledger();
        let submitter = RecordingSubmitter::default();
        let ctx = fixtures::context(&ledger, &submitter, test_pool());
        let args = FeeConfigArgs {
            redeem_fee_bps: Some(25),
            ..FeeConfigArgs::default()
        };
        let update = run_update_fees(&ctx, &args).unwrap().unwrap();
        assert_eq!(update.previous.redeem_fee_bps, 30);
        assert_eq!(
            update.next,
            FeeConfig {
                mint_fee_bps: 10,
                redeem_fee_bps: 25,
                spread_fee_bps: 1_000
            }
        );
        assert_eq!(submitter.submitted.borrow().len(), 1);
    }

    #[test]
    fn empty_fee_request_is_a_noop() {
        let ledger = MemoryLedger::default();
        let submitter = RecordingSubmitter::default();
        let ctx = fixtures::context(&ledger, &submitter, test_pool());
        assert_eq!(run_update_fees(&ctx, &FeeConfigArgs::default()).unwrap(), None);
        assert!(submitter.submitted.borrow().is_empty());
    }

    #[test]
    fn out_of_range_fee_fails_before_ledger_reads() {
        let ledger = MemoryLedger::default();
        let submitter = RecordingSubmitter::default();
        let ctx = fixtures::context(&ledger, &submitter, test_pool());
        let args = FeeConfigArgs {
            mint_fee_bps: Some(-5),
            ..FeeConfigArgs::default()
        };
        assert!(matches!(
            run_update_fees(&ctx, &args),
            Err(ComposeError::InvalidRange { bps: -5, .. })
        ));
    }
}
