//! Staged fee configuration.
//!
//! A [`FeeConfigBuilder`] collects up to three fee settings, each either
//! [`Staged::Unset`] or [`Staged::Set`]. Finalizing resolves unset fields
//! against the pool's current [`FeeConfig`]: an unset field keeps the value
//! already configured on chain.

use crate::error::ComposeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Upper bound for any fee, in basis points.
pub const MAX_BPS: u64 = 10_000;

/// Tri-state builder field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Staged<T> {
    /// Not touched; resolved from the base configuration.
    #[default]
    Unset,
    /// Explicitly set.
    Set(T),
}

impl<T: Copy> Staged<T> {
    /// True when the field was explicitly set.
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    /// The staged value, or `fallback` when unset.
    pub fn resolve(self, fallback: T) -> T {
        match self {
            Self::Set(value) => value,
            Self::Unset => fallback,
        }
    }
}

/// Names the three configurable fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeField {
    /// Fee charged on mint.
    Mint,
    /// Fee charged on redeem.
    Redeem,
    /// Share of staking rewards kept by the protocol.
    Spread,
}

impl fmt::Display for FeeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mint => "mint",
            Self::Redeem => "redeem",
            Self::Spread => "spread",
        })
    }
}

/// Immutable fee configuration, all values in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Mint fee.
    pub mint_fee_bps: u64,
    /// Redeem fee.
    pub redeem_fee_bps: u64,
    /// Spread fee.
    pub spread_fee_bps: u64,
}

impl FeeConfig {
    /// Value of one field.
    pub fn get(&self, field: FeeField) -> u64 {
        match field {
            FeeField::Mint => self.mint_fee_bps,
            FeeField::Redeem => self.redeem_fee_bps,
            FeeField::Spread => self.spread_fee_bps,
        }
    }
}

/// Mutable staging area for a [`FeeConfig`].
///
/// Setters validate the range first and leave the builder untouched on
/// error. `finalize` consumes the builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct FeeConfigBuilder {
    mint: Staged<u64>,
    redeem: Staged<u64>,
    spread: Staged<u64>,
}

impl FeeConfigBuilder {
    /// Builder with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages the mint fee.
    pub fn set_mint_fee(&mut self, bps: i64) -> Result<&mut Self, ComposeError> {
        self.mint = Staged::Set(checked_bps(FeeField::Mint, bps)?);
        Ok(self)
    }

    /// Stages the redeem fee.
    pub fn set_redeem_fee(&mut self, bps: i64) -> Result<&mut Self, ComposeError> {
        self.redeem = Staged::Set(checked_bps(FeeField::Redeem, bps)?);
        Ok(self)
    }

    /// Stages the spread fee.
    pub fn set_spread_fee(&mut self, bps: i64) -> Result<&mut Self, ComposeError> {
        self.spread = Staged::Set(checked_bps(FeeField::Spread, bps)?);
        Ok(self)
    }

    /// Current staging state of one field.
    pub fn staged(&self, field: FeeField) -> Staged<u64> {
        match field {
            FeeField::Mint => self.mint,
            FeeField::Redeem => self.redeem,
            FeeField::Spread => self.spread,
        }
    }

    /// True when no field was set.
    pub fn is_empty(&self) -> bool {
        !(self.mint.is_set() || self.redeem.is_set() || self.spread.is_set())
    }

    /// Resolves the staged fields against `base`, the configuration the
    /// pool currently holds. Unset fields carry the base value over.
    pub fn finalize(self, base: &FeeConfig) -> FeeConfig {
        FeeConfig {
            mint_fee_bps: self.mint.resolve(base.mint_fee_bps),
            redeem_fee_bps: self.redeem.resolve(base.redeem_fee_bps),
            spread_fee_bps: self.spread.resolve(base.spread_fee_bps),
        }
    }
}

fn checked_bps(field: FeeField, bps: i64) -> Result<u64, ComposeError> {
    u64::try_from(bps)
        .ok()
        .filter(|value| *value <= MAX_BPS)
        .ok_or(ComposeError::InvalidRange { field, bps })
}

/// Caller-facing fee update request; every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeConfigArgs {
    /// Requested mint fee.
    #[serde(default)]
    pub mint_fee_bps: Option<i64>,
    /// Requested redeem fee.
    #[serde(default)]
    pub redeem_fee_bps: Option<i64>,
    /// Requested spread fee.
    #[serde(default, rename = "spreadFee")]
    pub spread_fee_bps: Option<i64>,
}

impl FeeConfigArgs {
    /// True when no fee was requested.
    pub fn is_empty(&self) -> bool {
        self.mint_fee_bps.is_none()
            && self.redeem_fee_bps.is_none()
            && self.spread_fee_bps.is_none()
    }

    /// Range-checks every requested fee without staging anything.
    pub fn validate(&self) -> Result<(), ComposeError> {
        let requested = [
            (FeeField::Mint, self.mint_fee_bps),
            (FeeField::Redeem, self.redeem_fee_bps),
            (FeeField::Spread, self.spread_fee_bps),
        ];
        for (field, bps) in requested {
            if let Some(bps) = bps {
                checked_bps(field, bps)?;
            }
        }
        Ok(())
    }

    /// Drives a fresh builder through the requested updates.
    pub fn to_builder(&self) -> Result<FeeConfigBuilder, ComposeError> {
        let mut builder = FeeConfigBuilder::new();
        if let Some(bps) = self.mint_fee_bps {
            builder.set_mint_fee(bps)?;
            info!(evt = "stage_fee", field = "mint", bps, "setting mint fee bps");
        }
        if let Some(bps) = self.redeem_fee_bps {
            builder.set_redeem_fee(bps)?;
            info!(evt = "stage_fee", field = "redeem", bps, "setting redeem fee bps");
        }
        if let Some(bps) = self.spread_fee_bps {
            builder.set_spread_fee(bps)?;
            info!(evt = "stage_fee", field = "spread", bps, "setting spread fee bps");
        }
        Ok(builder)
    }
}
