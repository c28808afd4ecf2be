//! Purpose: Opaque key material handed through to the ledger network.
//! Exports: `KeyAlgorithm`, `PublicKey`, `PrivateKey`.
//! Role: Typed carriers only; signing happens inside the external network client.
//! Invariants: Private key bytes never appear in `Debug` output.
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::core::error::{ApiResult, Error};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum KeyAlgorithm {
    Ed25519,
    EcdsaSecp256k1,
    /// Serialized key structure (threshold or key list), carried as opaque bytes.
    ProtobufEncoded,
}

impl KeyAlgorithm {
    /// `None` accepts any non-empty length.
    fn public_key_len(self) -> Option<&'static [usize]> {
        match self {
            KeyAlgorithm::Ed25519 => Some(&[32]),
            KeyAlgorithm::EcdsaSecp256k1 => Some(&[33, 65]),
            KeyAlgorithm::ProtobufEncoded => None,
        }
    }

    fn private_key_len(self) -> Option<usize> {
        match self {
            KeyAlgorithm::Ed25519 | KeyAlgorithm::EcdsaSecp256k1 => Some(32),
            KeyAlgorithm::ProtobufEncoded => None,
        }
    }

    pub fn is_composite(self) -> bool {
        self == KeyAlgorithm::ProtobufEncoded
    }
}

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct PublicKey {
    algorithm: KeyAlgorithm,
    bytes: Arc<[u8]>,
}

impl PublicKey {
    pub fn from_bytes(algorithm: KeyAlgorithm, bytes: &[u8]) -> ApiResult<Self> {
        let accepted = match algorithm.public_key_len() {
            Some(lengths) => lengths.contains(&bytes.len()),
            None => !bytes.is_empty(),
        };
        if !accepted {
            return Err(Error::invalid_argument(format!(
                "{algorithm:?} public key cannot be {} bytes",
                bytes.len()
            )));
        }
        Ok(Self {
            algorithm,
            bytes: Arc::from(bytes),
        })
    }

    pub fn from_hex(algorithm: KeyAlgorithm, input: &str) -> ApiResult<Self> {
        let bytes = decode_hex(input, "public key")?;
        Self::from_bytes(algorithm, &bytes)
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({:?}, {})", self.algorithm, self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Mirror nodes report keys as `{"_type": "ED25519", "key": "<hex>"}`.
impl FromStr for KeyAlgorithm {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "ED25519" => Ok(KeyAlgorithm::Ed25519),
            "ECDSA_SECP256K1" => Ok(KeyAlgorithm::EcdsaSecp256k1),
            "ProtobufEncoded" => Ok(KeyAlgorithm::ProtobufEncoded),
            other => Err(Error::invalid_argument(format!(
                "unsupported key type '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Eq, PartialEq)]
pub struct PrivateKey {
    algorithm: KeyAlgorithm,
    bytes: Arc<[u8]>,
}

impl PrivateKey {
    pub fn from_bytes(algorithm: KeyAlgorithm, bytes: &[u8]) -> ApiResult<Self> {
        let Some(expected) = algorithm.private_key_len() else {
            return Err(Error::invalid_argument(format!(
                "{algorithm:?} is not a signing key algorithm"
            )));
        };
        if bytes.len() != expected {
            return Err(Error::invalid_argument(format!(
                "{algorithm:?} private key must be {expected} bytes"
            )));
        }
        Ok(Self {
            algorithm,
            bytes: Arc::from(bytes),
        })
    }

    pub fn from_hex(algorithm: KeyAlgorithm, input: &str) -> ApiResult<Self> {
        let bytes = decode_hex(input, "private key")?;
        Self::from_bytes(algorithm, &bytes)
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey({:?}, <redacted>)", self.algorithm)
    }
}

fn decode_hex(input: &str, label: &str) -> ApiResult<Vec<u8>> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(trimmed).map_err(|err| {
        Error::invalid_argument(format!("{label} is not valid hex")).with_source(err)
    })
}

#[cfg(test)]
mod tests {
    use super::{KeyAlgorithm, PrivateKey, PublicKey};
    use crate::core::error::ErrorKind;

    #[test]
    fn private_key_debug_is_redacted() {
        let key = PrivateKey::from_bytes(KeyAlgorithm::Ed25519, &[7u8; 32]).expect("key");
        let rendered = format!("{key:?}");
        assert!(!rendered.contains("07"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn public_key_checks_length() {
        let err = PublicKey::from_bytes(KeyAlgorithm::Ed25519, &[1u8; 31]).expect_err("len");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let key = PublicKey::from_hex(KeyAlgorithm::EcdsaSecp256k1, &format!("02{}", "ab".repeat(32)))
            .expect("secp");
        assert_eq!(key.as_bytes().len(), 33);
    }

    #[test]
    fn composite_keys_take_any_length_but_cannot_sign() {
        let key = PublicKey::from_hex(KeyAlgorithm::ProtobufEncoded, "2a0a1220aabb").expect("composite");
        assert!(key.algorithm().is_composite());
        assert_eq!(key.as_bytes().len(), 6);
        let err = PublicKey::from_bytes(KeyAlgorithm::ProtobufEncoded, &[]).expect_err("empty");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = PrivateKey::from_bytes(KeyAlgorithm::ProtobufEncoded, &[1u8; 32]).expect_err("signing");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn hex_prefix_is_accepted() {
        let key = PrivateKey::from_hex(KeyAlgorithm::Ed25519, &format!("0x{}", "11".repeat(32)))
            .expect("key");
        assert_eq!(key.as_bytes()[0], 0x11);
    }
}
