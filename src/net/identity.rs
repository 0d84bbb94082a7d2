#![cfg(feature = "net")]

//! Sender identity derived from an ed25519 secret key.
//!
//! Only the address is needed to compose units; the key never leaves this
//! module and nothing here signs.

use crate::types::SuiAddress;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use blake2::digest::{consts::U32, Digest};
use ed25519_dalek::{SigningKey, VerifyingKey, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};
use std::{error::Error, fmt};

type Blake2b256 = blake2::Blake2b<U32>;

/// Signature scheme flag for ed25519 keys.
pub const ED25519_FLAG: u8 = 0x00;

/// Environment variable holding the base64 secret key.
pub const SECRET_KEY_ENV: &str = "SUI_SECRET_KEY";

/// Errors reported while loading key material.
#[derive(Debug, Clone)]
pub enum KeyError {
    /// Base64 decoding failed.
    Decode(String),
    /// Decoded buffer has the wrong length.
    InvalidLength(usize),
    /// Flag byte names a scheme other than ed25519.
    UnsupportedScheme(u8),
    /// No key was supplied.
    Missing(String),
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(err) => write!(f, "key decode error: {err}"),
            Self::InvalidLength(len) => write!(f, "unexpected key length: {len}"),
            Self::UnsupportedScheme(flag) => write!(f, "unsupported key scheme flag: {flag:#04x}"),
            Self::Missing(source) => write!(f, "no key found in {source}"),
        }
    }
}

impl Error for KeyError {}

/// Account the composed units are built for.
#[derive(Debug, Clone)]
pub struct SigningIdentity {
    verifying: VerifyingKey,
    address: SuiAddress,
}

impl SigningIdentity {
    /// Identity from a raw 32-byte secret, or 33 bytes with a leading
    /// ed25519 flag.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let secret: [u8; SECRET_KEY_LENGTH] = match bytes.len() {
            SECRET_KEY_LENGTH => bytes
                .try_into()
                .map_err(|_| KeyError::InvalidLength(bytes.len()))?,
            len if len == SECRET_KEY_LENGTH + 1 => {
                if bytes[0] != ED25519_FLAG {
                    return Err(KeyError::UnsupportedScheme(bytes[0]));
                }
                bytes[1..]
                    .try_into()
                    .map_err(|_| KeyError::InvalidLength(bytes.len()))?
            }
            len => return Err(KeyError::InvalidLength(len)),
        };
        let verifying = SigningKey::from_bytes(&secret).verifying_key();
        Ok(Self {
            address: address_from_public_key(verifying.as_bytes()),
            verifying,
        })
    }

    /// Identity from a base64 secret.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|err| KeyError::Decode(err.to_string()))?;
        Self::from_secret_bytes(&bytes)
    }

    /// Identity from [`SECRET_KEY_ENV`].
    pub fn from_env() -> Result<Self, KeyError> {
        match std::env::var(SECRET_KEY_ENV) {
            Ok(value) if !value.trim().is_empty() => Self::from_base64(&value),
            _ => Err(KeyError::Missing(SECRET_KEY_ENV.to_string())),
        }
    }

    /// Identity from a key typed at the terminal without echo.
    pub fn prompt() -> Result<Self, KeyError> {
        let entered = rpassword::prompt_password("Sui secret key (base64): ")
            .map_err(|err| KeyError::Decode(err.to_string()))?;
        if entered.trim().is_empty() {
            return Err(KeyError::Missing("prompt".to_string()));
        }
        Self::from_base64(&entered)
    }

    /// Account address.
    pub fn address(&self) -> SuiAddress {
        self.address
    }

    /// Base64 ed25519 public key.
    pub fn public_key_base64(&self) -> String {
        BASE64.encode(self.verifying.as_bytes())
    }
}

/// `blake2b256(flag || public_key)`.
pub fn address_from_public_key(public_key: &[u8; PUBLIC_KEY_LENGTH]) -> SuiAddress {
    let mut hasher = Blake2b256::new();
    hasher.update([ED25519_FLAG]);
    hasher.update(public_key);
    SuiAddress::new(hasher.finalize().into())
}
