use {
    crate::{
        engine::{Admission, FeeSettlementEngine, SettlementReceipt},
        error::{AdmissionError, SettlementError},
        transaction::{ExecutionReport, Transaction, TxHash},
    },
    log::{error, info},
    serde::Serialize,
    std::collections::{HashMap, HashSet},
    tally_accounts::BalanceLedger,
    tally_fee_market::{Balance, FeeError, FeeParameterSource, Weight},
};

/// Totals for one block's settlements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BlockSettlementSummary {
    pub height: u64,
    pub settled: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub total_fees: Balance,
    /// Sum of the weight charged to settled transactions.
    pub weight_used: Weight,
}

/// Settlement session for a single block.
///
/// Settlements are applied in the order the block lists its transactions.
/// Each transaction hash settles at most once; a repeat is a fatal
/// [`SettlementError::DuplicateSettlement`]. Every admission made through the
/// session must be settled before [`finish`](Self::finish).
pub struct BlockSettlement<'a, S> {
    engine: &'a FeeSettlementEngine<S>,
    height: u64,
    /// Admissions still holding a fee, by transaction hash.
    outstanding: HashMap<TxHash, usize>,
    settled: HashSet<TxHash>,
    summary: BlockSettlementSummary,
}

impl<'a, S: FeeParameterSource> BlockSettlement<'a, S> {
    pub(crate) fn new(engine: &'a FeeSettlementEngine<S>, height: u64) -> Self {
        Self {
            engine,
            height,
            outstanding: HashMap::new(),
            settled: HashSet::new(),
            summary: BlockSettlementSummary {
                height,
                ..BlockSettlementSummary::default()
            },
        }
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    /// Admit `tx` against this block's fee parameters.
    pub fn admit<L: BalanceLedger>(
        &mut self,
        ledger: &mut L,
        tx: &Transaction,
    ) -> Result<Admission, AdmissionError> {
        let admission = self.engine.admit(ledger, self.height, tx)?;
        let count = self.outstanding.entry(admission.tx_hash).or_insert(0);
        *count = count.saturating_add(1);
        Ok(admission)
    }

    /// Settle one dispatched transaction.
    pub fn settle<L: BalanceLedger>(
        &mut self,
        ledger: &mut L,
        admission: &Admission,
        report: &ExecutionReport,
    ) -> Result<SettlementReceipt, SettlementError> {
        if admission.height != self.height {
            return Err(SettlementError::WrongBlock {
                block: self.height,
                admitted: admission.height,
            });
        }
        if self.settled.contains(&admission.tx_hash) {
            error!(
                "block {}: transaction {} settled twice",
                self.height, admission.tx_hash
            );
            return Err(SettlementError::DuplicateSettlement {
                tx_hash: admission.tx_hash,
            });
        }

        let receipt = self.engine.settle_on_outcome(ledger, admission, report)?;

        let total_fees = self
            .summary
            .total_fees
            .checked_add(receipt.fee.total_fee)
            .ok_or(FeeError::Overflow)?;
        self.settled.insert(admission.tx_hash);
        if let Some(count) = self.outstanding.get_mut(&admission.tx_hash) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.outstanding.remove(&admission.tx_hash);
            }
        }
        self.summary.total_fees = total_fees;
        self.summary.settled = self.summary.settled.saturating_add(1);
        if receipt.outcome.is_success() {
            self.summary.succeeded = self.summary.succeeded.saturating_add(1);
        } else {
            self.summary.failed = self.summary.failed.saturating_add(1);
        }
        self.summary.weight_used = self
            .summary
            .weight_used
            .saturating_add(receipt.weight_charged);

        Ok(receipt)
    }

    pub fn is_settled(&self, tx_hash: &TxHash) -> bool {
        self.settled.contains(tx_hash)
    }

    pub fn summary(&self) -> &BlockSettlementSummary {
        &self.summary
    }

    /// Close the session.
    ///
    /// An admission that was never settled still holds its fee; that is a
    /// fatal [`SettlementError::UnsettledAdmission`].
    pub fn finish(self) -> Result<BlockSettlementSummary, SettlementError> {
        if let Some(tx_hash) = self.outstanding.keys().min() {
            error!(
                "block {}: transaction {tx_hash} admitted but never settled",
                self.height
            );
            return Err(SettlementError::UnsettledAdmission { tx_hash: *tx_hash });
        }
        let summary = self.summary;
        info!(
            "block {} settled: {} transactions ({} succeeded, {} failed), fees {}, weight {}",
            summary.height,
            summary.settled,
            summary.succeeded,
            summary.failed,
            summary.total_fees,
            summary.weight_used,
        );
        Ok(summary)
    }
}
