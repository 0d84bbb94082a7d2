//! One method per protocol action, each appending chained calls to a unit.
//!
//! The composer holds no ledger connection and never submits. Values
//! produced by one call are threaded into the next through the handles it
//! returns, so a whole flow (split, mint, transfer) lands in one atomic unit.

use crate::capability::{AdminCap, WeightHookAdminCap};
use crate::error::ComposeError;
use crate::fees::{FeeConfig, FeeConfigArgs};
use crate::ledger::{self, FeeSetter, MintArgs, RedeemArgs, SetWeightsArgs, ValidatorStakeArgs};
use crate::types::{ObjectId, PoolDescriptor, SuiAddress, SUI_SYSTEM_STATE_ID};
use crate::unit::{Argument, CoinHandle, TransactionUnit};
use crate::weights::ValidatorWeightMap;
use tracing::debug;

/// Composes protocol actions against one deployed package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionComposer {
    package: ObjectId,
}

impl TransactionComposer {
    /// Composer for the contract published at `package`.
    pub fn new(package: ObjectId) -> Self {
        Self { package }
    }

    /// Contract package id.
    pub fn package(&self) -> ObjectId {
        self.package
    }

    fn pool_input(&self, unit: &mut TransactionUnit, pool: &PoolDescriptor) -> Argument {
        unit.shared_object(pool.id, true)
    }

    fn system_state(unit: &mut TransactionUnit) -> Argument {
        unit.shared_object(SUI_SYSTEM_STATE_ID, true)
    }

    /// Stakes `sui` into the pool; returns the minted LST coin.
    pub fn mint(
        &self,
        unit: &mut TransactionUnit,
        pool: &PoolDescriptor,
        sui: CoinHandle,
    ) -> CoinHandle {
        let info = self.pool_input(unit, pool);
        let system_state = Self::system_state(unit);
        let lst = ledger::mint(
            unit,
            self.package,
            &pool.token_type,
            MintArgs {
                info,
                sui: sui.into_argument(),
                system_state,
            },
        );
        CoinHandle::new(lst)
    }

    /// Burns `lst`; returns the redeemed SUI coin.
    pub fn redeem(
        &self,
        unit: &mut TransactionUnit,
        pool: &PoolDescriptor,
        lst: CoinHandle,
    ) -> CoinHandle {
        let info = self.pool_input(unit, pool);
        let system_state = Self::system_state(unit);
        let sui = ledger::redeem(
            unit,
            self.package,
            &pool.token_type,
            RedeemArgs {
                info,
                system_state,
                lst: lst.into_argument(),
            },
        );
        CoinHandle::new(sui)
    }

    /// Moves `amount` of unstaked SUI onto `validator`.
    ///
    /// The address and amount are checked before anything is appended.
    pub fn increase_validator_stake(
        &self,
        unit: &mut TransactionUnit,
        pool: &PoolDescriptor,
        admin_cap: &AdminCap,
        validator: &str,
        amount: i128,
    ) -> Result<(), ComposeError> {
        let args = self.stake_args(unit, pool, admin_cap, validator, amount)?;
        ledger::increase_validator_stake(unit, self.package, &pool.token_type, args);
        Ok(())
    }

    /// Unstakes up to `max_amount` from `validator`.
    pub fn decrease_validator_stake(
        &self,
        unit: &mut TransactionUnit,
        pool: &PoolDescriptor,
        admin_cap: &AdminCap,
        validator: &str,
        max_amount: i128,
    ) -> Result<(), ComposeError> {
        let args = self.stake_args(unit, pool, admin_cap, validator, max_amount)?;
        ledger::decrease_validator_stake(unit, self.package, &pool.token_type, args);
        Ok(())
    }

    fn stake_args(
        &self,
        unit: &mut TransactionUnit,
        pool: &PoolDescriptor,
        admin_cap: &AdminCap,
        validator: &str,
        amount: i128,
    ) -> Result<ValidatorStakeArgs, ComposeError> {
        let amount = checked_amount(amount)?;
        let validator: SuiAddress = validator.parse()?;
        let info = self.pool_input(unit, pool);
        let admin_cap = admin_cap.argument(unit);
        let system_state = Self::system_state(unit);
        Ok(ValidatorStakeArgs {
            info,
            admin_cap,
            system_state,
            validator_address: unit.pure_address(&validator),
            sui_amount: unit.pure_u64(amount),
        })
    }

    /// Withdraws accrued protocol fees; returns them as a SUI coin.
    pub fn collect_fees(
        &self,
        unit: &mut TransactionUnit,
        pool: &PoolDescriptor,
        admin_cap: &AdminCap,
    ) -> CoinHandle {
        let info = self.pool_input(unit, pool);
        let system_state = Self::system_state(unit);
        let admin_cap = admin_cap.argument(unit);
        let fees = ledger::collect_fees(
            unit,
            self.package,
            &pool.token_type,
            info,
            system_state,
            admin_cap,
        );
        CoinHandle::new(fees)
    }

    /// Replaces the pool fee configuration.
    ///
    /// Fields absent from `args` keep their value from `current`. Every
    /// requested value is range-checked before the unit is touched. Returns
    /// the configuration the pool will hold once the unit executes.
    pub fn update_fees(
        &self,
        unit: &mut TransactionUnit,
        pool: &PoolDescriptor,
        admin_cap: &AdminCap,
        args: &FeeConfigArgs,
        current: &FeeConfig,
    ) -> Result<FeeConfig, ComposeError> {
        let config = args.to_builder()?.finalize(current);

        let mut builder = ledger::new_fee_builder(unit, self.package);
        for (setter, bps) in [
            (FeeSetter::SuiMint, config.mint_fee_bps),
            (FeeSetter::Redeem, config.redeem_fee_bps),
            (FeeSetter::Spread, config.spread_fee_bps),
        ] {
            let fee = unit.pure_u64(bps);
            builder = ledger::set_fee(unit, self.package, setter, builder, fee);
        }
        let fee_config = ledger::to_fee_config(unit, self.package, builder);

        let info = self.pool_input(unit, pool);
        let admin_cap = admin_cap.argument(unit);
        ledger::update_fees(unit, self.package, &pool.token_type, info, admin_cap, fee_config);
        debug!(
            evt = "update_fees",
            mint = config.mint_fee_bps,
            redeem = config.redeem_fee_bps,
            spread = config.spread_fee_bps
        );
        Ok(config)
    }

    /// Creates the pool's weight hook and shares it.
    ///
    /// Returns the new hook's admin capability, which exists only inside
    /// `unit` and must be transferred before submission.
    #[must_use = "the weight hook admin cap must be transferred"]
    pub fn initialize_weight_hook(
        &self,
        unit: &mut TransactionUnit,
        pool: &PoolDescriptor,
        admin_cap: &AdminCap,
    ) -> WeightHookAdminCap {
        let admin_cap = admin_cap.argument(unit);
        let (hook, hook_cap) =
            ledger::new_weight_hook(unit, self.package, &pool.token_type, admin_cap);
        ledger::share_object(unit, &pool.weight_hook_type(&self.package), hook);
        WeightHookAdminCap::produced(hook_cap)
    }

    /// Replaces the hook's validator weights with `weights`.
    pub fn set_validator_addresses_and_weights(
        &self,
        unit: &mut TransactionUnit,
        pool: &PoolDescriptor,
        weight_hook: ObjectId,
        admin_cap: &WeightHookAdminCap,
        weights: &ValidatorWeightMap,
    ) {
        let hook = unit.shared_object(weight_hook, true);
        let admin_cap = admin_cap.argument(unit);
        let map = ledger::empty_address_u64_map(unit);
        for (validator, weight) in weights.iter() {
            let key = unit.pure_address(validator);
            let value = unit.pure_u64(*weight);
            ledger::insert_address_u64(unit, map, key, value);
        }
        ledger::set_validator_addresses_and_weights(
            unit,
            self.package,
            &pool.token_type,
            SetWeightsArgs {
                weight_hook: hook,
                admin_cap,
                weights: map,
            },
        );
    }

    /// Redistributes stake according to the hook's weights. Anyone may call it.
    pub fn rebalance(
        &self,
        unit: &mut TransactionUnit,
        pool: &PoolDescriptor,
        weight_hook: ObjectId,
    ) {
        let hook = unit.shared_object(weight_hook, true);
        let system_state = Self::system_state(unit);
        let info = self.pool_input(unit, pool);
        ledger::rebalance(unit, self.package, &pool.token_type, hook, system_state, info);
    }
}

fn checked_amount(amount: i128) -> Result<u64, ComposeError> {
    u64::try_from(amount).map_err(|_| ComposeError::InvalidAmount { amount })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sender, test_package, test_pool};
    use crate::unit::{CallInput, Command, Dependency};

    fn composer() -> TransactionComposer {
        TransactionComposer::new(test_package())
    }

    fn calls(unit: &TransactionUnit) -> Vec<String> {
        unit.commands()
            .iter()
            .filter_map(|command| match command {
                Command::MoveCall(call) => Some(format!("{}::{}", call.module, call.function)),
                _ => None,
            })
            .collect()
    }

    fn admin_cap() -> AdminCap {
        AdminCap::owned("0xcafe".parse().unwrap())
    }

    const VALIDATOR: &str = "0x8d99abb6ec7e5e7b6f3f4b0d9f9c7d2f0a1b2c3d4e5f60718293a4b5c6d7e8f9";

    #[test]
    fn mint_then_redeem_is_a_valid_unit_offline() {
        let composer = composer();
        let pool = test_pool();
        let mut unit = TransactionUnit::new();
        let sui = unit.split_gas(1_000_000_000);
        let lst = composer.mint(&mut unit, &pool, sui);
        let back = composer.redeem(&mut unit, &pool, lst);
        unit.transfer_coin(back, &sender());

        assert_eq!(
            calls(&unit),
            vec!["liquid_staking::mint", "liquid_staking::redeem"]
        );
        assert_eq!(
            unit.dependencies(),
            vec![
                Dependency { producer: 0, consumer: 1 },
                Dependency { producer: 1, consumer: 2 },
                Dependency { producer: 2, consumer: 3 },
            ]
        );
        assert!(unit.validate().is_ok());
    }

    #[test]
    fn pool_and_system_state_are_shared_once() {
        let composer = composer();
        let pool = test_pool();
        let mut unit = TransactionUnit::new();
        let sui = unit.split_gas(10);
        let lst = composer.mint(&mut unit, &pool, sui);
        let back = composer.redeem(&mut unit, &pool, lst);
        unit.transfer_coin(back, &sender());
        let objects = unit
            .inputs()
            .iter()
            .filter(|input| matches!(input, CallInput::Object(_)))
            .count();
        assert_eq!(objects, 2);
    }

    #[test]
    fn negative_stake_amount_leaves_unit_empty() {
        let composer = composer();
        let mut unit = TransactionUnit::new();
        let err = composer
            .increase_validator_stake(&mut unit, &test_pool(), &admin_cap(), VALIDATOR, -1)
            .unwrap_err();
        assert!(matches!(err, ComposeError::InvalidAmount { amount: -1 }));
        assert!(unit.is_empty());
        assert!(unit.inputs().is_empty());
    }

    #[test]
    fn oversized_amount_is_rejected() {
        let composer = composer();
        let mut unit = TransactionUnit::new();
        let too_big = i128::from(u64::MAX) + 1;
        assert!(matches!(
            composer.decrease_validator_stake(
                &mut unit,
                &test_pool(),
                &admin_cap(),
                VALIDATOR,
                too_big,
            ),
            Err(ComposeError::InvalidAmount { .. })
        ));
        assert!(unit.is_empty());
    }

    #[test]
    fn bad_validator_address_leaves_unit_empty() {
        let composer = composer();
        let mut unit = TransactionUnit::new();
        assert!(matches!(
            composer.increase_validator_stake(&mut unit, &test_pool(), &admin_cap(), "nope", 5),
            Err(ComposeError::InvalidAddress(_))
        ));
        assert!(unit.inputs().is_empty());
    }

    #[test]
    fn stake_adjustments_validate() {
        let composer = composer();
        let pool = test_pool();
        let cap = admin_cap();
        let mut unit = TransactionUnit::new();
        composer
            .increase_validator_stake(&mut unit, &pool, &cap, VALIDATOR, 1_000)
            .unwrap();
        composer
            .decrease_validator_stake(&mut unit, &pool, &cap, VALIDATOR, 0)
            .unwrap();
        assert_eq!(
            calls(&unit),
            vec![
                "liquid_staking::increase_validator_stake",
                "liquid_staking::decrease_validator_stake"
            ]
        );
        assert!(unit.validate().is_ok());
    }

    #[test]
    fn update_fees_with_only_redeem_keeps_current_values() {
        let composer = composer();
        let current = FeeConfig {
            mint_fee_bps: 10,
            redeem_fee_bps: 30,
            spread_fee_bps: 1_000,
        };
        let args = FeeConfigArgs {
            redeem_fee_bps: Some(25),
            ..FeeConfigArgs::default()
        };
        let mut unit = TransactionUnit::new();
        let config = composer
            .update_fees(&mut unit, &test_pool(), &admin_cap(), &args, &current)
            .unwrap();
        assert_eq!(
            config,
            FeeConfig {
                mint_fee_bps: 10,
                redeem_fee_bps: 25,
                spread_fee_bps: 1_000,
            }
        );
        assert_eq!(
            calls(&unit),
            vec![
                "fees::new_builder",
                "fees::set_sui_mint_fee_bps",
                "fees::set_redeem_fee_bps",
                "fees::set_spread_fee_bps",
                "fees::to_fee_config",
                "liquid_staking::update_fees",
            ]
        );
        let redeem_pure = CallInput::Pure(25u64.to_le_bytes().to_vec());
        assert!(unit.inputs().contains(&redeem_pure));
        assert!(unit.validate().is_ok());
    }

    #[test]
    fn update_fees_out_of_range_appends_nothing() {
        let composer = composer();
        let args = FeeConfigArgs {
            mint_fee_bps: Some(5),
            spread_fee_bps: Some(10_001),
            ..FeeConfigArgs::default()
        };
        let mut unit = TransactionUnit::new();
        assert!(matches!(
            composer.update_fees(
                &mut unit,
                &test_pool(),
                &admin_cap(),
                &args,
                &FeeConfig::default(),
            ),
            Err(ComposeError::InvalidRange { bps: 10_001, .. })
        ));
        assert!(unit.is_empty());
    }

    #[test]
    fn collected_fees_can_be_transferred() {
        let composer = composer();
        let mut unit = TransactionUnit::new();
        let fees = composer.collect_fees(&mut unit, &test_pool(), &admin_cap());
        unit.transfer_coin(fees, &sender());
        assert!(unit.validate().is_ok());
    }

    #[test]
    fn weight_hook_initialization_shares_hook_and_yields_cap() {
        let composer = composer();
        let pool = test_pool();
        let mut unit = TransactionUnit::new();
        let hook_cap = composer.initialize_weight_hook(&mut unit, &pool, &admin_cap());
        assert_eq!(hook_cap.object_id(), None);
        hook_cap.transfer_to(&mut unit, &sender());

        assert_eq!(calls(&unit), vec!["weight::new", "transfer::public_share_object"]);
        match &unit.commands()[1] {
            Command::MoveCall(call) => {
                assert_eq!(call.arguments, vec![Argument::NestedResult(0, 0)]);
                assert_eq!(call.type_arguments, vec![pool.weight_hook_type(&test_package())]);
            }
            other => panic!("unexpected command {other:?}"),
        }
        match &unit.commands()[2] {
            Command::TransferObjects { objects, .. } => {
                assert_eq!(objects, &vec![Argument::NestedResult(0, 1)]);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(unit.validate().is_ok());
    }

    #[test]
    fn weights_are_built_in_unit_then_consumed() {
        let composer = composer();
        let weights =
            crate::weights::build_weight_map(&["0x1", "0x2", "0x1"], &[5, 7, 9]).unwrap();
        let hook: ObjectId = "0xbb".parse().unwrap();
        let cap = WeightHookAdminCap::owned("0xcc".parse().unwrap());
        let mut unit = TransactionUnit::new();
        composer.set_validator_addresses_and_weights(&mut unit, &test_pool(), hook, &cap, &weights);

        assert_eq!(
            calls(&unit),
            vec![
                "vec_map::empty",
                "vec_map::insert",
                "vec_map::insert",
                "weight::set_validator_addresses_and_weights",
            ]
        );
        assert!(unit.validate().is_ok());
    }

    #[test]
    fn rebalance_needs_no_capability() {
        let composer = composer();
        let mut unit = TransactionUnit::new();
        composer.rebalance(&mut unit, &test_pool(), "0xbb".parse().unwrap());
        assert_eq!(calls(&unit), vec!["weight::rebalance"]);
        assert!(unit.inputs().iter().all(|input| !matches!(
            input,
            CallInput::Object(crate::unit::ObjectArg::Owned { .. })
        )));
        assert!(unit.validate().is_ok());
    }

    #[test]
    fn hook_initialized_and_configured_in_one_unit() {
        let composer = composer();
        let pool = test_pool();
        let weights = crate::weights::build_weight_map(&[VALIDATOR], &[100]).unwrap();
        let mut unit = TransactionUnit::new();
        let hook_cap = composer.initialize_weight_hook(&mut unit, &pool, &admin_cap());
        let hook: ObjectId = "0xbb".parse().unwrap();
        composer.set_validator_addresses_and_weights(&mut unit, &pool, hook, &hook_cap, &weights);
        hook_cap.transfer_to(&mut unit, &sender());
        assert!(unit.validate().is_ok());
    }
}
