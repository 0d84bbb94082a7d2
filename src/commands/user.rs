use super::CommandContext;
use crate::error::ComposeError;
use crate::pool::PoolState;
use crate::transport::SubmitReceipt;
use crate::unit::TransactionUnit;

/// Splits `amount` MIST off the gas coin, mints LST with it and sends the
/// LST to the sender.
pub fn run_mint(ctx: &CommandContext<'_>, amount: u64) -> Result<SubmitReceipt, ComposeError> {
    let mut unit = TransactionUnit::new();
    let sui = unit.split_gas(amount);
    let lst = ctx.composer.mint(&mut unit, &ctx.pool, sui);
    unit.transfer_coin(lst, &ctx.sender);
    ctx.submit("mint", unit)
}

/// Merges the sender's LST coins, redeems `amount` of them and sends the
/// SUI back to the sender.
pub fn run_redeem(ctx: &CommandContext<'_>, amount: u64) -> Result<SubmitReceipt, ComposeError> {
    let coins = ctx.reader.coins(&ctx.sender, &ctx.pool.token_type)?;
    let Some((first, rest)) = coins.split_first() else {
        return Err(ComposeError::NoCoins {
            owner: ctx.sender,
            coin_type: ctx.pool.token_type.clone(),
        });
    };

    let mut unit = TransactionUnit::new();
    let primary = unit.coin_input(first.object_id);
    let others = rest.iter().map(|coin| unit.coin_input(coin.object_id)).collect();
    unit.merge_coins(&primary, others);
    let lst = unit.split_coin(&primary, amount);
    let sui = ctx.composer.redeem(&mut unit, &ctx.pool, lst);
    unit.transfer_coin(sui, &ctx.sender);
    ctx.submit("redeem", unit)
}

/// Current pool snapshot.
pub fn run_fetch_state(ctx: &CommandContext<'_>) -> Result<PoolState, ComposeError> {
    ctx.pool_state()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use crate::testing::{sender, test_pool, RecordingSubmitter};
    use crate::unit::{CallInput, Command, ObjectArg};

    #[test]
    fn mint_submits_split_mint_transfer() {
        let ledger = fixtures::ledger();
        let submitter = RecordingSubmitter::default();
        let ctx = fixtures::context(&ledger, &submitter, test_pool());
        let receipt = run_mint(&ctx, 5_000).unwrap();

        let submitted = submitter.submitted.borrow();
        assert_eq!(submitted.len(), 1);
        let (who, unit) = &submitted[0];
        assert_eq!(*who, sender());
        assert_eq!(receipt.digest, unit.digest_hex());
        let commands = unit.unit().commands();
        assert!(matches!(commands[0], Command::SplitCoins { .. }));
        assert!(matches!(&commands[1], Command::MoveCall(call) if call.function == "mint"));
        assert!(matches!(commands[2], Command::TransferObjects { .. }));
    }

    #[test]
    fn redeem_merges_all_coins_first() {
        let mut ledger = fixtures::ledger();
        let pool = test_pool();
        for (id, balance) in [("0xc1", 10), ("0xc2", 20), ("0xc3", 30)] {
            ledger.add_coin(sender(), &pool.token_type, id.parse().unwrap(), balance);
        }
        let submitter = RecordingSubmitter::default();
        let ctx = fixtures::context(&ledger, &submitter, pool);
        run_redeem(&ctx, 45).unwrap();

        let submitted = submitter.submitted.borrow();
        let unit = submitted[0].1.unit();
        match &unit.commands()[0] {
            Command::MergeCoins { sources, .. } => assert_eq!(sources.len(), 2),
            other => panic!("unexpected command {other:?}"),
        }
        let owned = unit
            .inputs()
            .iter()
            .filter(|input| matches!(input, CallInput::Object(ObjectArg::Owned { .. })))
            .count();
        assert_eq!(owned, 3);
        assert!(matches!(
            &unit.commands()[2],
            Command::MoveCall(call) if call.function == "redeem"
        ));
    }

    #[test]
    fn redeem_with_single_coin_skips_merge() {
        let mut ledger = fixtures::ledger();
        let pool = test_pool();
        ledger.add_coin(sender(), &pool.token_type, "0xc1".parse().unwrap(), 10);
        let submitter = RecordingSubmitter::default();
        let ctx = fixtures::context(&ledger, &submitter, pool);
        run_redeem(&ctx, 5).unwrap();
        let submitted = submitter.submitted.borrow();
        assert!(matches!(submitted[0].1.unit().commands()[0], Command::SplitCoins { .. }));
    }

    #[test]
    fn redeem_without_coins_fails_before_submitting() {
        let ledger = fixtures::ledger();
        let submitter = RecordingSubmitter::default();
        let ctx = fixtures::context(&ledger, &submitter, test_pool());
        assert!(matches!(run_redeem(&ctx, 1), Err(ComposeError::NoCoins { .. })));
        assert!(submitter.submitted.borrow().is_empty());
    }

    #[test]
    fn fetch_state_reads_snapshot() {
        let ledger = fixtures::ledger();
        let submitter = RecordingSubmitter::default();
        let ctx = fixtures::context(&ledger, &submitter, test_pool());
        let state = run_fetch_state(&ctx).unwrap();
        assert_eq!(state.validators.len(), 2);
        assert!(submitter.submitted.borrow().is_empty());
    }
}
