//! Transactions as the settlement engine sees them.

use {
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    sha2::{Digest, Sha256},
    std::fmt,
    tally_accounts::AccountId,
    tally_fee_market::{Balance, Weight},
    thiserror::Error,
};

/// Bytes of a signature in the signed envelope.
pub const SIGNATURE_BYTES: u32 = 64;

/// Bytes of the signed envelope around a payload: signer (32), signature
/// (64), nonce (8), tip (16), weight limit (8) and the payload's length
/// prefix (4).
pub const SIGNED_ENVELOPE_LEN: u32 = 132;

/// SHA-256 of a transaction's borsh encoding.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, BorshSerialize, BorshDeserialize,
)]
pub struct TxHash(pub [u8; 32]);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({self})")
    }
}

impl Serialize for TxHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A signed transaction. The payload is opaque to settlement; only its
/// length is priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Transaction {
    /// Fee payer.
    pub signer: AccountId,
    pub nonce: u64,
    /// Offered on top of the computed fee, paid to the treasury with it.
    pub tip: Balance,
    /// Upper bound on the weight the call may consume.
    pub weight_limit: Weight,
    /// Encoded call.
    pub payload: Vec<u8>,
}

impl Transaction {
    pub fn new(signer: AccountId, nonce: u64, weight_limit: Weight, payload: Vec<u8>) -> Self {
        Self {
            signer,
            nonce,
            tip: 0,
            weight_limit,
            payload,
        }
    }

    pub fn with_tip(mut self, tip: Balance) -> Self {
        self.tip = tip;
        self
    }

    /// Length of the signed encoding, or `None` when the payload does not
    /// fit a `u32` length.
    pub fn encoded_len(&self) -> Option<u32> {
        u32::try_from(self.payload.len())
            .ok()?
            .checked_add(SIGNED_ENVELOPE_LEN)
    }

    /// Hash over the borsh layout of the transaction.
    ///
    /// A payload longer than `u32::MAX` bytes has no borsh encoding; its
    /// length prefix saturates at `u32::MAX`. Such transactions are refused
    /// at admission with `PayloadTooLarge`.
    pub fn hash(&self) -> TxHash {
        let mut hasher = Sha256::new();
        hasher.update(self.signer.as_ref());
        hasher.update(self.nonce.to_le_bytes());
        hasher.update(self.tip.to_le_bytes());
        hasher.update(self.weight_limit.to_le_bytes());
        hasher.update(length_prefix(self.payload.len()));
        hasher.update(&self.payload);
        TxHash(hasher.finalize().into())
    }
}

fn length_prefix(len: usize) -> [u8; 4] {
    u32::try_from(len).unwrap_or(u32::MAX).to_le_bytes()
}

/// Why a dispatched call failed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchError {
    #[error("Bad origin")]
    BadOrigin,
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("Call could not be decoded")]
    CannotDecode,
    #[error("{0}")]
    Other(String),
}

/// Result of applying a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchOutcome {
    Success,
    Failure(DispatchError),
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// What the execution engine reports after dispatching a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub outcome: DispatchOutcome,
    pub actual_weight: Weight,
}

impl ExecutionReport {
    pub fn success(actual_weight: Weight) -> Self {
        Self {
            outcome: DispatchOutcome::Success,
            actual_weight,
        }
    }

    pub fn failure(error: DispatchError, actual_weight: Weight) -> Self {
        Self {
            outcome: DispatchOutcome::Failure(error),
            actual_weight,
        }
    }
}
