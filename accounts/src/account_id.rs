//! 32-byte account identifiers.

use {
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{de, Deserialize, Deserializer, Serialize, Serializer},
    sha2::{Digest, Sha256},
    std::{
        fmt,
        str::FromStr,
        sync::atomic::{AtomicU64, Ordering},
    },
    thiserror::Error,
};

/// Number of bytes in an [`AccountId`].
pub const ACCOUNT_ID_BYTES: usize = 32;

/// Maximum length of a base58-encoded [`AccountId`].
const MAX_BASE58_LEN: usize = 44;

/// Prefix of every module-derived account.
const MODULE_PREFIX: &[u8; 4] = b"modl";

/// An account's public identity.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, BorshSerialize, BorshDeserialize,
)]
pub struct AccountId([u8; ACCOUNT_ID_BYTES]);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseAccountIdError {
    #[error("String is the wrong size")]
    WrongSize,
    #[error("Invalid Base58 string")]
    Invalid,
}

impl AccountId {
    pub const fn new_from_array(bytes: [u8; ACCOUNT_ID_BYTES]) -> Self {
        Self(bytes)
    }

    /// Account derived from a development seed such as `//Alice`.
    pub fn from_dev_seed(seed: &str) -> Self {
        Self(Sha256::digest(seed.as_bytes()).into())
    }

    /// Account owned by a runtime module, e.g. the treasury's `py/trsry`.
    ///
    /// Layout: `b"modl" ++ module_id ++ zero padding`.
    pub fn from_module_id(module_id: &[u8; 8]) -> Self {
        let mut bytes = [0u8; ACCOUNT_ID_BYTES];
        bytes[..4].copy_from_slice(MODULE_PREFIX);
        bytes[4..12].copy_from_slice(module_id);
        Self(bytes)
    }

    /// Whether this account was derived with [`AccountId::from_module_id`].
    pub fn is_module_account(&self) -> bool {
        self.0.starts_with(MODULE_PREFIX) && self.0[12..].iter().all(|b| *b == 0)
    }

    /// Unique account id for tests and benchmarks.
    pub fn new_unique() -> Self {
        static I: AtomicU64 = AtomicU64::new(1);
        let i = I.fetch_add(1, Ordering::Relaxed);
        let mut bytes = [0u8; ACCOUNT_ID_BYTES];
        bytes[..8].copy_from_slice(&i.to_be_bytes());
        bytes[8..16].copy_from_slice(b"uniqueid");
        Self(bytes)
    }

    pub const fn to_bytes(self) -> [u8; ACCOUNT_ID_BYTES] {
        self.0
    }

    pub const fn as_array(&self) -> &[u8; ACCOUNT_ID_BYTES] {
        &self.0
    }
}

impl AsRef<[u8]> for AccountId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; ACCOUNT_ID_BYTES]> for AccountId {
    fn from(bytes: [u8; ACCOUNT_ID_BYTES]) -> Self {
        Self(bytes)
    }
}

impl FromStr for AccountId {
    type Err = ParseAccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > MAX_BASE58_LEN {
            return Err(ParseAccountIdError::WrongSize);
        }
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| ParseAccountIdError::Invalid)?;
        let bytes: [u8; ACCOUNT_ID_BYTES] = bytes
            .try_into()
            .map_err(|_| ParseAccountIdError::WrongSize)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
