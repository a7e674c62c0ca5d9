//! Reference weights for the calls the settlement engine prices.
//!
//! Values are benchmark results: a constant execution cost plus the storage
//! accesses each call performs, charged at [`DB_WEIGHT`].

use crate::Weight;

/// Weight of a single storage read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbWeight {
    pub read: Weight,
    pub write: Weight,
}

impl DbWeight {
    pub const fn reads(&self, n: Weight) -> Weight {
        self.read.saturating_mul(n)
    }

    pub const fn writes(&self, n: Weight) -> Weight {
        self.write.saturating_mul(n)
    }

    pub const fn reads_writes(&self, r: Weight, w: Weight) -> Weight {
        self.reads(r).saturating_add(self.writes(w))
    }
}

/// RocksDB-backed storage costs.
pub const DB_WEIGHT: DbWeight = DbWeight {
    read: 25_000_000,
    write: 100_000_000,
};

/// Fungible balance calls.
pub mod balances {
    use super::{Weight, DB_WEIGHT};

    // Storage: System Account (r:2 w:2)
    pub const fn transfer() -> Weight {
        20_281_000u64.saturating_add(DB_WEIGHT.reads_writes(2, 2))
    }

    // Storage: System Account (r:1 w:1)
    pub const fn set_balance() -> Weight {
        35_000_000u64.saturating_add(DB_WEIGHT.reads_writes(1, 1))
    }
}

/// Non-fungible collection calls.
pub mod nft {
    use super::{Weight, DB_WEIGHT};

    // Storage: TokensMinted (r:1 w:1), AccountBalance (r:1 w:1), TokenData (r:0 w:1),
    // Owned (r:0 w:1), TotalSupply (r:0 w:1), Balance (r:0 w:1)
    pub const fn create_item() -> Weight {
        18_681_000u64.saturating_add(DB_WEIGHT.reads_writes(2, 6))
    }

    // Storage: Balance (r:2 w:2)
    pub const fn transfer_normal() -> Weight {
        17_733_000u64.saturating_add(DB_WEIGHT.reads_writes(2, 2))
    }

    // Storage: Allowance (r:1 w:1), Balance (r:2 w:2)
    pub const fn transfer_from_normal() -> Weight {
        25_348_000u64.saturating_add(DB_WEIGHT.reads_writes(3, 3))
    }

    // Storage: Allowance (r:1 w:1)
    pub const fn approve() -> Weight {
        14_109_000u64.saturating_add(DB_WEIGHT.reads_writes(1, 1))
    }

    // Storage: TotalSupply (r:1 w:1), Balance (r:1 w:1), AccountBalance (r:1 w:1), Owned (r:0 w:1)
    pub const fn burn_item_partial() -> Weight {
        21_591_000u64.saturating_add(DB_WEIGHT.reads_writes(3, 4))
    }
}

/// System calls.
pub mod system {
    use super::Weight;

    /// No storage access; linear in the remark length.
    pub const fn remark(len: u32) -> Weight {
        1_000_000u64.saturating_add(500u64.saturating_mul(len as u64))
    }
}
