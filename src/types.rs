//! Ledger identifiers and the pool descriptor supplied by configuration.

use crate::error::ComposeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Length in bytes of addresses and object identifiers.
pub const ADDRESS_LENGTH: usize = 32;

/// 32-byte account address or object identifier.
///
/// Parsing accepts the short hex forms the ledger prints (`0x5`) and
/// left-pads them; display always renders the full 64 hex digits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SuiAddress([u8; ADDRESS_LENGTH]);

/// Object identifiers share the address representation.
pub type ObjectId = SuiAddress;

/// Sui framework package (`0x2`).
pub const SUI_FRAMEWORK: ObjectId = SuiAddress::from_low_byte(2);

/// Shared Sui system state object (`0x5`), passed to every staking call.
pub const SUI_SYSTEM_STATE_ID: ObjectId = SuiAddress::from_low_byte(5);

impl SuiAddress {
    /// Wraps raw address bytes.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    const fn from_low_byte(value: u8) -> Self {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[ADDRESS_LENGTH - 1] = value;
        Self(bytes)
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

impl FromStr for SuiAddress {
    type Err = ComposeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.is_empty()
            || digits.len() > ADDRESS_LENGTH * 2
            || !digits.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(ComposeError::InvalidAddress(input.to_string()));
        }
        let padded = format!("{digits:0>64}");
        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(padded, &mut bytes)
            .map_err(|_| ComposeError::InvalidAddress(input.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for SuiAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SuiAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Rewrites every `0x…` address inside a Move type tag to its full
/// 64-digit lowercase form so tags from different sources compare equal.
pub fn normalize_type_tag(tag: &str) -> String {
    if !tag.is_ascii() {
        return tag.to_string();
    }
    let bytes = tag.as_bytes();
    let mut out = String::with_capacity(tag.len() + ADDRESS_LENGTH * 2);
    let mut idx = 0;
    while idx < bytes.len() {
        let at_word_start =
            idx == 0 || !(bytes[idx - 1].is_ascii_alphanumeric() || bytes[idx - 1] == b'_');
        if at_word_start
            && bytes[idx] == b'0'
            && matches!(bytes.get(idx + 1), Some(b'x') | Some(b'X'))
        {
            let start = idx + 2;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_hexdigit() {
                end += 1;
            }
            let len = end - start;
            if len > 0 && len <= ADDRESS_LENGTH * 2 {
                out.push_str("0x");
                out.extend(std::iter::repeat('0').take(ADDRESS_LENGTH * 2 - len));
                out.push_str(&tag[start..end].to_ascii_lowercase());
                idx = end;
                continue;
            }
        }
        out.push(bytes[idx] as char);
        idx += 1;
    }
    out
}

/// Identifies one liquid-staking pool instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDescriptor {
    /// Object id of the shared `LiquidStakingInfo` object.
    pub id: ObjectId,
    /// Move type of the pool's LST, e.g. `0x…::ripleys::RIPLEYS`.
    pub token_type: String,
    /// Shared weight hook attached to this pool, when one was initialized.
    #[serde(default)]
    pub weight_hook_id: Option<ObjectId>,
}

impl PoolDescriptor {
    /// Descriptor without a weight hook.
    pub fn new(id: ObjectId, token_type: impl Into<String>) -> Self {
        Self {
            id,
            token_type: token_type.into(),
            weight_hook_id: None,
        }
    }

    /// Attaches the weight hook id.
    pub fn with_weight_hook(mut self, weight_hook_id: ObjectId) -> Self {
        self.weight_hook_id = Some(weight_hook_id);
        self
    }

    /// Struct suffix of the pool object type, independent of the package
    /// version that created it.
    pub fn info_type_suffix(&self) -> String {
        format!("::liquid_staking::LiquidStakingInfo<{}>", self.token_type)
    }

    /// Weight hook object type under `package`.
    pub fn weight_hook_type(&self, package: &ObjectId) -> String {
        format!("{package}::weight::WeightHook<{}>", self.token_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_addresses_are_left_padded() {
        let addr: SuiAddress = "0x5".parse().unwrap();
        assert_eq!(addr, SUI_SYSTEM_STATE_ID);
        assert_eq!(
            addr.to_string(),
            "0x0000000000000000000000000000000000000000000000000000000000000005"
        );
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        for bad in ["", "0x", "0xzz", &format!("0x{}", "1".repeat(65))] {
            assert!(matches!(
                bad.parse::<SuiAddress>(),
                Err(ComposeError::InvalidAddress(_))
            ));
        }
    }

    #[test]
    fn serde_uses_hex_strings() {
        let addr: SuiAddress = "0xABC".parse().unwrap();
        let encoded = serde_json::to_string(&addr).unwrap();
        assert_eq!(encoded, format!("\"{addr}\""));
        let decoded: SuiAddress = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, addr);
    }

    #[test]
    fn type_tags_normalize_nested_addresses() {
        let short = "0x2::coin::Coin<0xAB::lst::LST>";
        let normalized = normalize_type_tag(short);
        assert_eq!(
            normalized,
            format!(
                "0x{:0>64}::coin::Coin<0x{:0>64}::lst::LST>",
                "2", "ab"
            )
        );
        assert_eq!(normalize_type_tag(&normalized), normalized);
    }

    #[test]
    fn type_tag_identifiers_with_hex_prefix_are_untouched() {
        assert_eq!(normalize_type_tag("0x2::m::a0xff"), format!("0x{:0>64}::m::a0xff", "2"));
    }
}
