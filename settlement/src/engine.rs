//! Fee settlement.
//!
//! A transaction moves through the engine in three steps:
//!
//! 1. **`admit`**: before execution. Checks that the signer can afford the
//!    fee at the declared weight limit and places a hold for that amount, so
//!    the call itself cannot spend the fee.
//! 2. The execution engine dispatches the call and reports the outcome and
//!    the weight actually consumed.
//! 3. **`settle_on_outcome`**: releases the hold, prices the reported weight
//!    and moves the fee from the signer to the treasury with **`settle`**.
//!    Success and failure settle the same way.

use {
    crate::{
        block::BlockSettlement,
        error::{AdmissionError, SettlementError},
        transaction::{DispatchOutcome, ExecutionReport, Transaction, TxHash},
    },
    log::{debug, error, warn},
    serde::Serialize,
    tally_accounts::{AccountId, AccountsError, BalanceLedger},
    tally_fee_market::{
        calculator::{calculate_transaction_fee, validate_transaction_fee},
        Balance, FeeBreakdown, FeeError, FeeParameterSource, FeeParameters, Weight,
    },
};

/// An admitted transaction together with the hold placed on its signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Admission {
    pub tx_hash: TxHash,
    pub payer: AccountId,
    /// Height whose fee parameters price this transaction.
    pub height: u64,
    pub encoded_len: u32,
    pub tip: Balance,
    pub weight_limit: Weight,
    /// Amount reserved on the payer: the fee at `weight_limit`.
    pub held: Balance,
}

/// Balances after a settlement transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettlementResult {
    pub payer: AccountId,
    pub fee: Balance,
    pub payer_balance_after: Balance,
    pub treasury_balance_after: Balance,
}

/// Full record of one settled transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementReceipt {
    pub tx_hash: TxHash,
    pub height: u64,
    pub outcome: DispatchOutcome,
    /// Weight the fee was computed from, after capping at the declared limit.
    pub weight_charged: Weight,
    pub fee: FeeBreakdown,
    pub result: SettlementResult,
}

/// Deducts transaction fees from signers and credits them to the treasury.
#[derive(Debug, Clone)]
pub struct FeeSettlementEngine<S> {
    source: S,
    treasury: AccountId,
    max_transaction_weight: Weight,
}

impl<S: FeeParameterSource> FeeSettlementEngine<S> {
    pub fn new(source: S, treasury: AccountId) -> Self {
        Self {
            source,
            treasury,
            max_transaction_weight: Weight::MAX,
        }
    }

    /// Reject transactions declaring more than `max_transaction_weight`.
    pub fn with_max_transaction_weight(mut self, max_transaction_weight: Weight) -> Self {
        self.max_transaction_weight = max_transaction_weight;
        self
    }

    pub fn treasury(&self) -> &AccountId {
        &self.treasury
    }

    pub fn max_transaction_weight(&self) -> Weight {
        self.max_transaction_weight
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the parameter source, e.g. to advance a schedule
    /// between blocks.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Fee parameters in effect at `height`.
    pub fn parameters_at(&self, height: u64) -> Result<FeeParameters, SettlementError> {
        self.source.fee_parameters(height).ok_or_else(|| {
            error!("no fee parameters available at height {height}");
            SettlementError::FeeParameterUnavailable { height }
        })
    }

    /// Fee for `tx` at `height` had it consumed `consumed_weight`.
    pub fn compute_fee(
        &self,
        height: u64,
        tx: &Transaction,
        consumed_weight: Weight,
    ) -> Result<FeeBreakdown, SettlementError> {
        let params = self.parameters_at(height)?;
        let encoded_len = tx
            .encoded_len()
            .ok_or(SettlementError::Fee(FeeError::Overflow))?;
        Ok(calculate_transaction_fee(
            &params,
            encoded_len,
            consumed_weight,
            tx.tip,
        )?)
    }

    /// Admit `tx` for execution at `height` and hold its maximum fee.
    pub fn admit<L: BalanceLedger>(
        &self,
        ledger: &mut L,
        height: u64,
        tx: &Transaction,
    ) -> Result<Admission, AdmissionError> {
        if tx.signer == self.treasury {
            return Err(AdmissionError::TreasuryCannotPay {
                account: self.treasury,
            });
        }
        let params = self
            .source
            .fee_parameters(height)
            .ok_or(AdmissionError::FeeParameterUnavailable { height })?;
        let encoded_len = tx.encoded_len().ok_or(AdmissionError::PayloadTooLarge {
            len: tx.payload.len(),
        })?;

        let max_fee = validate_transaction_fee(
            ledger.free_balance(&tx.signer),
            &params,
            encoded_len,
            tx.weight_limit,
            tx.tip,
            self.max_transaction_weight,
        )?;
        ledger.reserve(&tx.signer, max_fee.total_fee)?;

        let admission = Admission {
            tx_hash: tx.hash(),
            payer: tx.signer,
            height,
            encoded_len,
            tip: tx.tip,
            weight_limit: tx.weight_limit,
            held: max_fee.total_fee,
        };
        debug!(
            "admitted {} from {} at height {height}: hold {}",
            admission.tx_hash, admission.payer, admission.held
        );
        Ok(admission)
    }

    /// Move `fee` from `payer` to the treasury in one atomic transfer.
    ///
    /// The debit and the credit are one store operation: either both apply
    /// or neither does. A payer that cannot cover the fee is a fatal
    /// [`SettlementError::InsufficientFundsAtSettlement`]; the fee is never
    /// reduced to what the payer has.
    pub fn settle<L: BalanceLedger>(
        &self,
        ledger: &mut L,
        payer: &AccountId,
        fee: Balance,
    ) -> Result<SettlementResult, SettlementError> {
        if *payer == self.treasury {
            return Err(SettlementError::TreasuryPayer { account: *payer });
        }

        let receipt = ledger
            .transfer(payer, &self.treasury, fee)
            .map_err(|err| match err {
                AccountsError::InsufficientBalance {
                    account, available, ..
                } => {
                    error!(
                        "settlement invariant breached: account {account} owes fee {fee} \
                         but has {available}"
                    );
                    SettlementError::InsufficientFundsAtSettlement {
                        account,
                        fee,
                        available,
                    }
                }
                other => SettlementError::Accounts(other),
            })?;

        Ok(SettlementResult {
            payer: *payer,
            fee,
            payer_balance_after: receipt.from_free_after,
            treasury_balance_after: receipt.to_free_after,
        })
    }

    /// Release the admission hold and settle the fee for the reported
    /// execution.
    ///
    /// Weight above the declared limit is charged at the limit.
    pub fn settle_on_outcome<L: BalanceLedger>(
        &self,
        ledger: &mut L,
        admission: &Admission,
        report: &ExecutionReport,
    ) -> Result<SettlementReceipt, SettlementError> {
        let payer = admission.payer;
        ledger
            .unreserve(&payer, admission.held)
            .map_err(|err| match err {
                AccountsError::InsufficientReserved { available, .. } => {
                    error!(
                        "admission hold missing for {}: held {} but {available} reserved",
                        admission.tx_hash, admission.held
                    );
                    SettlementError::HoldMismatch {
                        account: payer,
                        held: admission.held,
                        reserved: available,
                    }
                }
                other => SettlementError::Accounts(other),
            })?;

        let weight_charged = if report.actual_weight > admission.weight_limit {
            warn!(
                "{} reported weight {} above its limit {}; charging the limit",
                admission.tx_hash, report.actual_weight, admission.weight_limit
            );
            admission.weight_limit
        } else {
            report.actual_weight
        };

        let params = self.parameters_at(admission.height)?;
        let fee = calculate_transaction_fee(
            &params,
            admission.encoded_len,
            weight_charged,
            admission.tip,
        )?;
        if fee.total_fee > admission.held {
            error!(
                "fee {} for {} exceeds its hold {}",
                fee.total_fee, admission.tx_hash, admission.held
            );
            return Err(SettlementError::FeeExceedsHold {
                tx_hash: admission.tx_hash,
                fee: fee.total_fee,
                held: admission.held,
            });
        }
        let result = self.settle(ledger, &payer, fee.total_fee)?;

        debug!(
            "settled {} ({:?}): fee {} from {payer}, weight {weight_charged}",
            admission.tx_hash, report.outcome, fee.total_fee
        );

        Ok(SettlementReceipt {
            tx_hash: admission.tx_hash,
            height: admission.height,
            outcome: report.outcome.clone(),
            weight_charged,
            fee,
            result,
        })
    }

    /// Open a settlement session for the block at `height`.
    pub fn begin_block(&self, height: u64) -> BlockSettlement<'_, S> {
        BlockSettlement::new(self, height)
    }
}
