//! Validator weight assignments for the weight hook.

use crate::error::ComposeError;
use crate::types::SuiAddress;
use serde::Serialize;
use std::collections::BTreeMap;

/// Validator address → weight mapping, ordered by address.
///
/// Weights are relative; normalizing them into proportions happens on chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidatorWeightMap {
    weights: BTreeMap<SuiAddress, u64>,
}

impl ValidatorWeightMap {
    /// Number of distinct validators.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True when no validator is assigned.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Weight assigned to `validator`.
    pub fn get(&self, validator: &SuiAddress) -> Option<u64> {
        self.weights.get(validator).copied()
    }

    /// Entries in address order.
    pub fn iter(&self) -> impl Iterator<Item = (&SuiAddress, &u64)> {
        self.weights.iter()
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> u128 {
        self.weights.values().map(|w| u128::from(*w)).sum()
    }
}

/// Pairs `addresses[i]` with `weights[i]`.
///
/// Fails with `LengthMismatch` before parsing anything when the inputs
/// differ in length. A repeated address keeps the weight of its last
/// occurrence.
pub fn build_weight_map<S: AsRef<str>>(
    addresses: &[S],
    weights: &[u64],
) -> Result<ValidatorWeightMap, ComposeError> {
    if addresses.len() != weights.len() {
        return Err(ComposeError::LengthMismatch {
            addresses: addresses.len(),
            weights: weights.len(),
        });
    }
    let mut map = BTreeMap::new();
    for (address, weight) in addresses.iter().zip(weights) {
        let address: SuiAddress = address.as_ref().parse()?;
        map.insert(address, *weight);
    }
    Ok(ValidatorWeightMap { weights: map })
}
