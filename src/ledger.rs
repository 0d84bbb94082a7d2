//! Typed stubs for the liquid-staking contract's entry points.
//!
//! Each function appends exactly one [`MoveCall`] and returns the
//! argument(s) naming its results. Stubs know which parameters the contract
//! takes by value and record them as consumed; everything else is borrowed.

use crate::types::{ObjectId, SUI_FRAMEWORK};
use crate::unit::{Argument, Command, MoveCall, TransactionUnit};

/// Main pool module.
pub const LIQUID_STAKING_MODULE: &str = "liquid_staking";
/// Fee builder module.
pub const FEES_MODULE: &str = "fees";
/// Weight hook module.
pub const WEIGHT_MODULE: &str = "weight";

struct Call<'a> {
    package: ObjectId,
    module: &'a str,
    function: &'a str,
    type_arguments: Vec<String>,
    arguments: Vec<Argument>,
    consumed: Vec<Argument>,
    returns: u16,
}

impl Call<'_> {
    fn append(self, unit: &mut TransactionUnit) -> u16 {
        unit.push(Command::MoveCall(MoveCall {
            package: self.package,
            module: self.module.to_string(),
            function: self.function.to_string(),
            type_arguments: self.type_arguments,
            arguments: self.arguments,
            consumed: self.consumed,
            returns: self.returns,
        }))
    }
}

fn pool_call<'a>(
    package: ObjectId,
    token_type: &str,
    function: &'a str,
    arguments: Vec<Argument>,
    consumed: Vec<Argument>,
    returns: u16,
) -> Call<'a> {
    Call {
        package,
        module: LIQUID_STAKING_MODULE,
        function,
        type_arguments: vec![token_type.to_string()],
        arguments,
        consumed,
        returns,
    }
}

/// Arguments of `liquid_staking::mint`.
pub struct MintArgs {
    /// `&mut LiquidStakingInfo<P>`.
    pub info: Argument,
    /// `Coin<SUI>` (consumed).
    pub sui: Argument,
    /// `&mut SuiSystemState`.
    pub system_state: Argument,
}

/// `mint<P>(self, sui, system_state): Coin<P>`.
pub fn mint(
    unit: &mut TransactionUnit,
    package: ObjectId,
    token_type: &str,
    args: MintArgs,
) -> Argument {
    let index = pool_call(
        package,
        token_type,
        "mint",
        vec![args.info, args.sui, args.system_state],
        vec![args.sui],
        1,
    )
    .append(unit);
    Argument::Result(index)
}

/// Arguments of `liquid_staking::redeem`.
pub struct RedeemArgs {
    /// `&mut LiquidStakingInfo<P>`.
    pub info: Argument,
    /// `&mut SuiSystemState`.
    pub system_state: Argument,
    /// `Coin<P>` (consumed).
    pub lst: Argument,
}

/// `redeem<P>(self, system_state, lst): Coin<SUI>`.
pub fn redeem(
    unit: &mut TransactionUnit,
    package: ObjectId,
    token_type: &str,
    args: RedeemArgs,
) -> Argument {
    let index = pool_call(
        package,
        token_type,
        "redeem",
        vec![args.info, args.system_state, args.lst],
        vec![args.lst],
        1,
    )
    .append(unit);
    Argument::Result(index)
}

/// Arguments shared by the two stake-adjustment entry points.
pub struct ValidatorStakeArgs {
    /// `&mut LiquidStakingInfo<P>`.
    pub info: Argument,
    /// `&AdminCap<P>`.
    pub admin_cap: Argument,
    /// `&mut SuiSystemState`.
    pub system_state: Argument,
    /// Pure `address`.
    pub validator_address: Argument,
    /// Pure `u64` (exact amount to add, or maximum to remove).
    pub sui_amount: Argument,
}

/// `increase_validator_stake<P>(self, admin_cap, system_state, validator_address, sui_amount)`.
pub fn increase_validator_stake(
    unit: &mut TransactionUnit,
    package: ObjectId,
    token_type: &str,
    args: ValidatorStakeArgs,
) {
    stake_call(unit, package, token_type, "increase_validator_stake", args);
}

/// `decrease_validator_stake<P>(self, admin_cap, system_state, validator_address, max_sui_amount)`.
pub fn decrease_validator_stake(
    unit: &mut TransactionUnit,
    package: ObjectId,
    token_type: &str,
    args: ValidatorStakeArgs,
) {
    stake_call(unit, package, token_type, "decrease_validator_stake", args);
}

fn stake_call(
    unit: &mut TransactionUnit,
    package: ObjectId,
    token_type: &str,
    function: &str,
    args: ValidatorStakeArgs,
) {
    pool_call(
        package,
        token_type,
        function,
        vec![
            args.info,
            args.admin_cap,
            args.system_state,
            args.validator_address,
            args.sui_amount,
        ],
        Vec::new(),
        0,
    )
    .append(unit);
}

/// `collect_fees<P>(self, system_state, admin_cap): Coin<SUI>`.
pub fn collect_fees(
    unit: &mut TransactionUnit,
    package: ObjectId,
    token_type: &str,
    info: Argument,
    system_state: Argument,
    admin_cap: Argument,
) -> Argument {
    let index = pool_call(
        package,
        token_type,
        "collect_fees",
        vec![info, system_state, admin_cap],
        Vec::new(),
        1,
    )
    .append(unit);
    Argument::Result(index)
}

/// `update_fees<P>(self, admin_cap, fee_config)`; the fee config is consumed.
pub fn update_fees(
    unit: &mut TransactionUnit,
    package: ObjectId,
    token_type: &str,
    info: Argument,
    admin_cap: Argument,
    fee_config: Argument,
) {
    pool_call(
        package,
        token_type,
        "update_fees",
        vec![info, admin_cap, fee_config],
        vec![fee_config],
        0,
    )
    .append(unit);
}

/// `fees::new_builder(): FeeConfigBuilder`.
pub fn new_fee_builder(unit: &mut TransactionUnit, package: ObjectId) -> Argument {
    let index = Call {
        package,
        module: FEES_MODULE,
        function: "new_builder",
        type_arguments: Vec::new(),
        arguments: Vec::new(),
        consumed: Vec::new(),
        returns: 1,
    }
    .append(unit);
    Argument::Result(index)
}

/// Builder setters exposed by the `fees` module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeSetter {
    /// `set_sui_mint_fee_bps`.
    SuiMint,
    /// `set_redeem_fee_bps`.
    Redeem,
    /// `set_spread_fee_bps`.
    Spread,
}

impl FeeSetter {
    fn function(self) -> &'static str {
        match self {
            Self::SuiMint => "set_sui_mint_fee_bps",
            Self::Redeem => "set_redeem_fee_bps",
            Self::Spread => "set_spread_fee_bps",
        }
    }
}

/// `fees::set_*(builder, fee): FeeConfigBuilder`; takes the builder by value
/// and returns the updated one.
pub fn set_fee(
    unit: &mut TransactionUnit,
    package: ObjectId,
    setter: FeeSetter,
    builder: Argument,
    fee: Argument,
) -> Argument {
    let index = Call {
        package,
        module: FEES_MODULE,
        function: setter.function(),
        type_arguments: Vec::new(),
        arguments: vec![builder, fee],
        consumed: vec![builder],
        returns: 1,
    }
    .append(unit);
    Argument::Result(index)
}

/// `fees::to_fee_config(builder): FeeConfig`.
pub fn to_fee_config(unit: &mut TransactionUnit, package: ObjectId, builder: Argument) -> Argument {
    let index = Call {
        package,
        module: FEES_MODULE,
        function: "to_fee_config",
        type_arguments: Vec::new(),
        arguments: vec![builder],
        consumed: vec![builder],
        returns: 1,
    }
    .append(unit);
    Argument::Result(index)
}

/// `weight::new<P>(admin_cap): (WeightHook<P>, WeightHookAdminCap<P>)`.
///
/// Returns `(weight_hook, weight_hook_admin_cap)`.
pub fn new_weight_hook(
    unit: &mut TransactionUnit,
    package: ObjectId,
    token_type: &str,
    admin_cap: Argument,
) -> (Argument, Argument) {
    let index = Call {
        package,
        module: WEIGHT_MODULE,
        function: "new",
        type_arguments: vec![token_type.to_string()],
        arguments: vec![admin_cap],
        consumed: Vec::new(),
        returns: 2,
    }
    .append(unit);
    (Argument::NestedResult(index, 0), Argument::NestedResult(index, 1))
}

/// Arguments of `weight::set_validator_addresses_and_weights`.
pub struct SetWeightsArgs {
    /// `&mut WeightHook<P>`.
    pub weight_hook: Argument,
    /// `&WeightHookAdminCap<P>`.
    pub admin_cap: Argument,
    /// `VecMap<address, u64>` (consumed).
    pub weights: Argument,
}

/// `set_validator_addresses_and_weights<P>(self, admin_cap, weights)`.
pub fn set_validator_addresses_and_weights(
    unit: &mut TransactionUnit,
    package: ObjectId,
    token_type: &str,
    args: SetWeightsArgs,
) {
    Call {
        package,
        module: WEIGHT_MODULE,
        function: "set_validator_addresses_and_weights",
        type_arguments: vec![token_type.to_string()],
        arguments: vec![args.weight_hook, args.admin_cap, args.weights],
        consumed: vec![args.weights],
        returns: 0,
    }
    .append(unit);
}

/// `rebalance<P>(self, system_state, liquid_staking_info)`.
pub fn rebalance(
    unit: &mut TransactionUnit,
    package: ObjectId,
    token_type: &str,
    weight_hook: Argument,
    system_state: Argument,
    info: Argument,
) {
    Call {
        package,
        module: WEIGHT_MODULE,
        function: "rebalance",
        type_arguments: vec![token_type.to_string()],
        arguments: vec![weight_hook, system_state, info],
        consumed: Vec::new(),
        returns: 0,
    }
    .append(unit);
}

/// `0x2::transfer::public_share_object<T>(object)`.
pub fn share_object(unit: &mut TransactionUnit, object_type: &str, object: Argument) {
    Call {
        package: SUI_FRAMEWORK,
        module: "transfer",
        function: "public_share_object",
        type_arguments: vec![object_type.to_string()],
        arguments: vec![object],
        consumed: vec![object],
        returns: 0,
    }
    .append(unit);
}

/// `0x2::vec_map::empty<address, u64>()`.
pub fn empty_address_u64_map(unit: &mut TransactionUnit) -> Argument {
    let index = Call {
        package: SUI_FRAMEWORK,
        module: "vec_map",
        function: "empty",
        type_arguments: vec!["address".to_string(), "u64".to_string()],
        arguments: Vec::new(),
        consumed: Vec::new(),
        returns: 1,
    }
    .append(unit);
    Argument::Result(index)
}

/// `0x2::vec_map::insert<address, u64>(&mut map, key, value)`.
pub fn insert_address_u64(
    unit: &mut TransactionUnit,
    map: Argument,
    key: Argument,
    value: Argument,
) {
    Call {
        package: SUI_FRAMEWORK,
        module: "vec_map",
        function: "insert",
        type_arguments: vec!["address".to_string(), "u64".to_string()],
        arguments: vec![map, key, value],
        consumed: Vec::new(),
        returns: 0,
    }
    .append(unit);
}
