use serde::{Serialize, Deserialize};
use colored::Colorize;

use crate::core::error::{LedgerError, LedgerResult};

pub type Amount = f64;

/// Display format of transaction timestamps, e.g. `05/01/2024 14:03:59`.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TransactionKind {
    Deposit,
    Withdrawal
}

impl TransactionKind {
    /// Income/expense label shown next to a transaction.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Deposit => "Income",
            Self::Withdrawal => "Expense"
        }
    }

    /// Parses both the current kind names and the labels
    /// written by older versions of the app ("Polog", "Dvig").
    pub fn from_label(label: &str) -> Option<TransactionKind> {
        match label.trim() {
            "Deposit" | "Polog" => Some(Self::Deposit),
            "Withdrawal" | "Dvig" => Some(Self::Withdrawal),
            _ => None
        }
    }

    /// Sign applied to the amount when replaying onto a balance.
    pub fn sign(&self) -> Amount {
        match self {
            Self::Deposit => 1.0,
            Self::Withdrawal => -1.0
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let disp = match self {
            Self::Deposit => "Deposit",
            Self::Withdrawal => "Withdrawal"
        };
        write!(f, "{}", disp)
    }
}

/// Checks that an amount can be booked: finite and strictly positive.
pub fn validate_amount(amount: Amount) -> LedgerResult<Amount> {
    if amount.is_finite() && amount > 0.0 {
        return Ok(amount);
    }
    return Err(LedgerError::InvalidAmount(amount));
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    seq: u64,
    kind: TransactionKind,
    amount: Amount,
    timestamp: String
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let amount = format!("{:.2}", self.amount);
        let amount = match self.kind {
            TransactionKind::Deposit => amount.green(),
            TransactionKind::Withdrawal => amount.red()
        };
        write!(f, "{}: {}, {}: {} ({})",
            "Date".bold(), self.timestamp, "Amount".bold(), amount, self.kind.category())
    }
}

impl Transaction {
    pub fn new(seq: u64, kind: TransactionKind, amount: Amount, timestamp: &str) -> LedgerResult<Transaction> {
        let amount = validate_amount(amount)?;
        return Ok(Transaction { seq, kind, amount, timestamp: timestamp.to_owned() });
    }

    /// Same transaction at a different position in the log.
    pub(crate) fn with_seq(self, seq: u64) -> Transaction {
        Transaction { seq, ..self }
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn category(&self) -> &'static str {
        self.kind.category()
    }

    /// Contribution of this transaction to the account balance.
    pub fn signed_amount(&self) -> Amount {
        self.kind.sign() * self.amount
    }
}
