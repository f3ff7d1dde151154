pub mod error;
pub mod transaction;
pub mod clock;
pub mod chart;
pub mod ledger;

pub use error::{LedgerError, LedgerResult};
pub use transaction::{Transaction, TransactionKind, Amount};
pub use clock::{Clock, SystemClock, FixedClock};
pub use chart::{Bar, BarChart};
pub use ledger::{Ledger, CurrencyPair, DEFAULT_BALANCE, convert};
