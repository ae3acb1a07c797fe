// src/domain/model/credit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a ledger row exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionReason {
    /// Debit taken when an agent wins a lead.
    ClaimFee,
    /// Compensating credit after a claim lost the race post-debit.
    ClaimRollback,
    /// Explicit administrator refund of a cancelled claim's fee.
    Refund,
    /// Balance purchase through the external top-up flow.
    TopUp,
}

impl fmt::Display for TransactionReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransactionReason::ClaimFee => write!(f, "CLAIM_FEE"),
            TransactionReason::ClaimRollback => write!(f, "CLAIM_ROLLBACK"),
            TransactionReason::Refund => write!(f, "REFUND"),
            TransactionReason::TopUp => write!(f, "TOP_UP"),
        }
    }
}

/// Append-only ledger entry. Rows are never edited or deleted; the balance
/// is the running sum and the row is the audit trail for disputes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditTransaction {
    pub agent_id: String,
    /// Negative for debits, positive for credits.
    pub amount: i64,
    pub reason: TransactionReason,
    /// The lead or order this row settles against.
    pub reference: String,
    pub created_at: DateTime<Utc>,
}
