mod core;
pub mod backend;
pub mod config;
pub mod rates;
pub mod logging;

pub use crate::core::{Ledger, Transaction, TransactionKind, Amount, LedgerError, LedgerResult};
pub use crate::core::{CurrencyPair, BarChart, Bar, Clock, SystemClock, FixedClock, DEFAULT_BALANCE, convert};
pub use crate::core::{ledger, transaction, clock, chart, error};
