//! Read-only pool snapshots.

use crate::error::ComposeError;
use crate::fees::FeeConfig;
use crate::transport::LedgerReader;
use crate::types::{normalize_type_tag, ObjectId, PoolDescriptor, SuiAddress};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Stake the pool holds with one validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatorStake {
    /// Validator address.
    pub address: SuiAddress,
    /// SUI staked with it, active and pending.
    pub total_sui: u64,
}

/// Snapshot of a pool's on-chain state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolState {
    /// Pool object id.
    pub id: ObjectId,
    /// LST coin type.
    pub token_type: String,
    /// Weight hook from the descriptor, if any.
    pub weight_hook_id: Option<ObjectId>,
    /// Total SUI backing the pool.
    pub total_sui_supply: u64,
    /// LST in circulation.
    pub lst_supply: u64,
    /// Current fees.
    pub fee_config: FeeConfig,
    /// Mint/redeem fees not yet collected.
    pub accrued_fees: u64,
    /// Spread fees not yet collected.
    pub accrued_spread_fees: u64,
    /// Per-validator stake, in pool order.
    pub validators: Vec<ValidatorStake>,
}

impl PoolState {
    /// SUI per LST; `None` while no LST exists.
    pub fn exchange_rate(&self) -> Option<f64> {
        if self.lst_supply == 0 {
            return None;
        }
        Some(self.total_sui_supply as f64 / self.lst_supply as f64)
    }

    /// Validator at `index` of the pool's list.
    pub fn validator_at(&self, index: usize) -> Result<&ValidatorStake, ComposeError> {
        self.validators
            .get(index)
            .ok_or(ComposeError::ValidatorIndexOutOfRange {
                index,
                count: self.validators.len(),
            })
    }
}

/// Fetches [`PoolState`] snapshots.
pub struct PoolStateReader<'a, R: LedgerReader + ?Sized> {
    reader: &'a R,
}

impl<'a, R: LedgerReader + ?Sized> PoolStateReader<'a, R> {
    /// Reader over `reader`.
    pub fn new(reader: &'a R) -> Self {
        Self { reader }
    }

    /// Current state of `pool`.
    ///
    /// Fails with `PoolNotFound` when the id is unknown or names an object
    /// that is not a `LiquidStakingInfo` for the pool's token type.
    pub fn fetch_pool_state(&self, pool: &PoolDescriptor) -> Result<PoolState, ComposeError> {
        let expected_type = pool.info_type_suffix();
        let not_found = || ComposeError::PoolNotFound {
            id: pool.id,
            expected_type: expected_type.clone(),
        };
        let object = self.reader.object(&pool.id)?.ok_or_else(not_found)?;
        if !normalize_type_tag(&object.object_type).ends_with(&normalize_type_tag(&expected_type)) {
            debug!(evt = "pool_type_mismatch", id = %pool.id, found = %object.object_type);
            return Err(not_found());
        }
        decode_pool(pool, &object.fields)
    }
}

fn decode_pool(pool: &PoolDescriptor, fields: &Value) -> Result<PoolState, ComposeError> {
    let fee_fields = lookup(fields, &["fee_config", "element"])
        .filter(|value| !value.is_null())
        .or_else(|| lookup(fields, &["fee_config"]))
        .ok_or_else(|| missing("fee_config"))?;
    let fee_config = FeeConfig {
        mint_fee_bps: required_u64(fee_fields, &["sui_mint_fee_bps"])?,
        redeem_fee_bps: required_u64(fee_fields, &["redeem_fee_bps"])?,
        spread_fee_bps: required_u64(fee_fields, &["spread_fee_bps"])?,
    };

    let validators = match lookup(fields, &["storage", "validator_infos"]) {
        Some(Value::Array(infos)) => infos
            .iter()
            .map(decode_validator)
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    Ok(PoolState {
        id: pool.id,
        token_type: pool.token_type.clone(),
        weight_hook_id: pool.weight_hook_id,
        total_sui_supply: required_u64(fields, &["storage", "total_sui_supply"])?,
        lst_supply: required_u64(fields, &["lst_treasury_cap", "total_supply", "value"])?,
        fee_config,
        accrued_fees: lookup(fields, &["fees"]).and_then(as_u64).unwrap_or(0),
        accrued_spread_fees: lookup(fields, &["accrued_spread_fees"])
            .and_then(as_u64)
            .unwrap_or(0),
        validators,
    })
}

fn decode_validator(info: &Value) -> Result<ValidatorStake, ComposeError> {
    let address = lookup(info, &["validator_address"])
        .and_then(Value::as_str)
        .ok_or_else(|| missing("validator_address"))?
        .parse()?;
    Ok(ValidatorStake {
        address,
        total_sui: required_u64(info, &["total_sui_amount"])?,
    })
}

// Move structs render as `{ "type": …, "fields": { … } }`; step through the
// wrapper transparently.
fn unwrap_struct(value: &Value) -> &Value {
    match (value.get("type"), value.get("fields")) {
        (Some(_), Some(inner)) => inner,
        _ => value,
    }
}

fn lookup<'v>(value: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter()
        .try_fold(value, |current, key| unwrap_struct(current).get(*key))
        .map(unwrap_struct)
}

// u64 values arrive as JSON strings.
fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::String(raw) => raw.parse().ok(),
        Value::Number(number) => number.as_u64(),
        _ => None,
    }
}

fn required_u64(value: &Value, path: &[&str]) -> Result<u64, ComposeError> {
    lookup(value, path)
        .and_then(as_u64)
        .ok_or_else(|| missing(&path.join(".")))
}

fn missing(field: &str) -> ComposeError {
    ComposeError::Decode(format!("pool object lacks `{field}`"))
}

#[cfg(test)]
pub(crate) fn sample_pool_fields() -> Value {
    serde_json::json!({
        "id": { "id": "0x4b7b" },
        "lst_treasury_cap": {
            "type": "0x2::coin::TreasuryCap<LST>",
            "fields": { "total_supply": { "type": "0x2::balance::Supply<LST>", "fields": { "value": "900" } } }
        },
        "fee_config": {
            "type": "cell::Cell<fees::FeeConfig>",
            "fields": {
                "element": {
                    "type": "fees::FeeConfig",
                    "fields": {
                        "sui_mint_fee_bps": "10",
                        "redeem_fee_bps": "30",
                        "spread_fee_bps": "1000",
                        "sui_mint_fee_bps_custom": "0"
                    }
                }
            }
        },
        "fees": "42",
        "accrued_spread_fees": "7",
        "storage": {
            "type": "storage::Storage",
            "fields": {
                "total_sui_supply": "1000",
                "validator_infos": [
                    { "type": "storage::ValidatorInfo", "fields": { "validator_address": "0xa1", "total_sui_amount": "600" } },
                    { "type": "storage::ValidatorInfo", "fields": { "validator_address": "0xb2", "total_sui_amount": "400" } }
                ]
            }
        }
    })
}
