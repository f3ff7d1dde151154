use std::collections::HashSet;

use serde::{Serialize, Deserialize};

use crate::backend::{KeyValueStore, record};
use crate::core::chart::BarChart;
use crate::core::clock::{Clock, SystemClock};
use crate::core::error::{LedgerError, LedgerResult};
use crate::core::transaction::{Transaction, TransactionKind, Amount, validate_amount};
use crate::rates::{RateError, RateProvider};

/// Opening balance of an account with no stored state.
pub const DEFAULT_BALANCE: Amount = 500.0;

/// Currencies the converter translates between.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyPair {
    pub source: String,
    pub target: String
}

impl Default for CurrencyPair {
    fn default() -> Self {
        CurrencyPair { source: "EUR".to_owned(), target: "USD".to_owned() }
    }
}

/// Converts `amount` from `pair.source` into `pair.target`.
///
/// Every provider failure collapses into `None`; nothing is retried.
pub async fn convert<P>(amount: Amount, pair: &CurrencyPair, provider: &P) -> Option<Amount>
where
    P: RateProvider + ?Sized
{
    let rate = provider.rate(&pair.source, &pair.target).await
        .and_then(|rate| if rate.is_finite() && rate > 0.0 { Ok(rate) } else { Err(RateError::InvalidRate(rate)) });

    match rate {
        Ok(rate) => Some(amount * rate),
        Err(err) => {
            log::warn!("conversion {} -> {} unavailable: {}", pair.source, pair.target, err);
            None
        }
    }
}

/// Balance and transaction history of a single account.
///
/// The ledger is the only writer of its store. Each mutation pairs one
/// balance change with one appended transaction and writes both back
/// before returning.
pub struct Ledger<S: KeyValueStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    default_balance: Amount,
    currencies: CurrencyPair,
    balance: Amount,
    transactions: Vec<Transaction>,
    next_seq: u64
}

impl<S: KeyValueStore, C: Clock> Ledger<S, C> {
    const BALANCE_KEY: &'static str = "balance";
    const TRANSACTIONS_KEY: &'static str = "transactions";
    // keys of older mobile installs, read only while the new ones are absent
    const LEGACY_BALANCE_KEY: &'static str = "stanje";
    const LEGACY_TRANSACTIONS_KEY: &'static str = "transakcije";
    // relative to the larger magnitude, floored at one unit
    const CONSISTENCY_TOLERANCE: f64 = 1e-9;

    /// Restores the ledger from `store`, falling back to `default_balance`
    /// and an empty history for whatever is missing or unreadable.
    pub fn load(store: S, clock: C, default_balance: Amount) -> Ledger<S, C> {
        let balance = Self::load_balance(&store, default_balance);
        let transactions = Self::load_transactions(&store);
        let next_seq = transactions.len() as u64;

        let ledger = Ledger {
            store, clock, default_balance,
            currencies: CurrencyPair::default(),
            balance, transactions, next_seq
        };

        if !ledger.is_consistent() {
            log::warn!("stored balance {:.2} does not match history (expected {:.2})",
                ledger.balance, ledger.expected_balance());
        }
        log::debug!("loaded ledger: balance {:.2}, {} transactions",
            ledger.balance, ledger.transactions.len());
        return ledger;
    }

    pub fn with_currencies(mut self, currencies: CurrencyPair) -> Ledger<S, C> {
        self.currencies = currencies;
        self
    }

    fn load_balance(store: &S, default_balance: Amount) -> Amount {
        let stored = store.get_scalar(Self::BALANCE_KEY)
            .and_then(|balance| match balance {
                Some(balance) => Ok(Some(balance)),
                None => store.get_scalar(Self::LEGACY_BALANCE_KEY)
            });

        match stored {
            Ok(Some(balance)) if balance.is_finite() => balance,
            Ok(_) => default_balance,
            Err(err) => {
                log::warn!("could not read balance, using default: {}", err);
                default_balance
            }
        }
    }

    fn load_transactions(store: &S) -> Vec<Transaction> {
        let stored = store.get_set(Self::TRANSACTIONS_KEY)
            .and_then(|entries| match entries {
                Some(entries) => Ok(Some(entries)),
                None => store.get_set(Self::LEGACY_TRANSACTIONS_KEY)
            });

        let entries = match stored {
            Ok(entries) => entries.unwrap_or_default(),
            Err(err) => {
                log::warn!("could not read transactions, starting empty: {}", err);
                HashSet::new()
            }
        };

        let mut decoded: Vec<_> = entries.iter()
            .filter_map(|entry| {
                let parsed = record::decode(entry);
                if parsed.is_none() {
                    log::debug!("dropping unreadable transaction record {:?}", entry);
                }
                parsed
            })
            .collect();
        decoded.sort_by(|a, b| a.0.cmp(&b.0));

        return decoded.into_iter()
            .enumerate()
            .map(|(seq, (_, transaction))| transaction.with_seq(seq as u64))
            .collect();
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn default_balance(&self) -> Amount {
        self.default_balance
    }

    pub fn currencies(&self) -> &CurrencyPair {
        &self.currencies
    }

    /// Full history, oldest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn deposit(&mut self, amount: Amount) -> LedgerResult<Amount> {
        self.record(TransactionKind::Deposit, amount)
    }

    pub fn withdraw(&mut self, amount: Amount) -> LedgerResult<Amount> {
        let amount = validate_amount(amount)?;
        if amount > self.balance {
            return Err(LedgerError::InsufficientFunds { requested: amount, available: self.balance });
        }
        self.record(TransactionKind::Withdrawal, amount)
    }

    fn record(&mut self, kind: TransactionKind, amount: Amount) -> LedgerResult<Amount> {
        let transaction = Transaction::new(self.next_seq, kind, amount, &self.clock.timestamp())?;

        self.balance += transaction.signed_amount();
        self.transactions.push(transaction);
        self.next_seq += 1;
        log::info!("{} of {:.2} recorded, balance {:.2}", kind, amount, self.balance);

        self.persist();
        return Ok(self.balance);
    }

    /// Writes balance and history back. Failures are logged, not returned:
    /// the in-memory state stays authoritative for the session.
    fn persist(&self) {
        if let Err(err) = self.store.put_scalar(Self::BALANCE_KEY, self.balance) {
            log::error!("failed to save balance: {}", err);
        }

        let mut entries = HashSet::with_capacity(self.transactions.len());
        for transaction in &self.transactions {
            match record::encode(transaction) {
                Ok(entry) => { entries.insert(entry); },
                Err(err) => log::error!("failed to encode transaction {}: {}", transaction.seq(), err)
            }
        }
        if let Err(err) = self.store.put_set(Self::TRANSACTIONS_KEY, entries) {
            log::error!("failed to save transactions: {}", err);
        }
    }

    /// Transactions of one kind, oldest first.
    pub fn transactions_of(&self, kind: TransactionKind) -> Vec<&Transaction> {
        self.transactions.iter()
            .filter(|transaction| transaction.kind() == kind)
            .collect()
    }

    pub fn deposit_transactions(&self) -> Vec<&Transaction> {
        self.transactions_of(TransactionKind::Deposit)
    }

    pub fn withdrawal_transactions(&self) -> Vec<&Transaction> {
        self.transactions_of(TransactionKind::Withdrawal)
    }

    pub fn sum_of(&self, kind: TransactionKind) -> Amount {
        self.transactions_of(kind).iter()
            .map(|transaction| transaction.amount())
            .sum()
    }

    pub fn deposit_sum(&self) -> Amount {
        self.sum_of(TransactionKind::Deposit)
    }

    pub fn withdrawal_sum(&self) -> Amount {
        self.sum_of(TransactionKind::Withdrawal)
    }

    /// Balance implied by replaying the whole history onto the default balance.
    pub fn expected_balance(&self) -> Amount {
        self.default_balance + self.transactions.iter()
            .map(|transaction| transaction.signed_amount())
            .sum::<Amount>()
    }

    pub fn is_consistent(&self) -> bool {
        let expected = self.expected_balance();
        let scale = expected.abs().max(self.balance.abs()).max(1.0);
        (expected - self.balance).abs() <= Self::CONSISTENCY_TOLERANCE * scale
    }

    pub fn chart(&self) -> BarChart {
        BarChart::new(self.deposit_sum(), self.withdrawal_sum())
    }

    /// Converts `amount` using this ledger's currency pair. Ledger state is untouched.
    pub async fn convert<P>(&self, amount: Amount, provider: &P) -> Option<Amount>
    where
        P: RateProvider + ?Sized
    {
        convert(amount, &self.currencies, provider).await
    }
}
