//! Exchange-rate providers used by the currency converter.

use std::collections::HashMap;

use async_trait::async_trait;

#[cfg(feature = "http-rates")]
mod http;
#[cfg(feature = "http-rates")]
pub use http::HttpRates;

/// Rate used by the converter when no live source is configured.
pub const OFFLINE_EUR_USD: f64 = 1.03;

#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("rate request failed: {0}")]
    Network(String),
    #[error("no rate for {from}/{to}")]
    MissingRate {
        from: String,
        to: String
    },
    #[error("provider returned an unusable rate: {0}")]
    InvalidRate(f64)
}

/// Looks up how many units of `target` one unit of `source` buys.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn rate(&self, source: &str, target: &str) -> Result<f64, RateError>;
}

#[async_trait]
impl<P: RateProvider + ?Sized> RateProvider for Box<P> {
    async fn rate(&self, source: &str, target: &str) -> Result<f64, RateError> {
        (**self).rate(source, target).await
    }
}

/// Same rate for every currency pair.
pub struct FixedRate(pub f64);

impl Default for FixedRate {
    fn default() -> Self {
        FixedRate(OFFLINE_EUR_USD)
    }
}

#[async_trait]
impl RateProvider for FixedRate {
    async fn rate(&self, _source: &str, _target: &str) -> Result<f64, RateError> {
        Ok(self.0)
    }
}

/// Rates keyed by `"SOURCE/TARGET"`, e.g. `"EUR/USD"`.
#[derive(Debug, Default, Clone)]
pub struct RateTable {
    rates: HashMap<String, f64>
}

impl RateTable {
    pub fn new(rates: HashMap<String, f64>) -> RateTable {
        let rates = rates.into_iter()
            .map(|(pair, rate)| (pair.to_uppercase(), rate))
            .collect();
        RateTable { rates }
    }

    fn key(source: &str, target: &str) -> String {
        format!("{}/{}", source, target).to_uppercase()
    }
}

#[async_trait]
impl RateProvider for RateTable {
    async fn rate(&self, source: &str, target: &str) -> Result<f64, RateError> {
        self.rates.get(&Self::key(source, target))
            .copied()
            .ok_or_else(|| RateError::MissingRate {
                from: source.to_owned(), to: target.to_owned() })
    }
}


#[cfg(test)]
mod tests {
    use super::{FixedRate, RateError, RateProvider, RateTable};
    use std::collections::HashMap;

    #[tokio::test]
    async fn fixed_rate_ignores_pair() {
        let provider = FixedRate::default();
        assert_eq!(provider.rate("EUR", "USD").await.unwrap(), 1.03);
        assert_eq!(provider.rate("GBP", "JPY").await.unwrap(), 1.03);
    }

    #[tokio::test]
    async fn table_lookup_is_case_insensitive() {
        let table = RateTable::new(HashMap::from([("eur/usd".to_string(), 1.08)]));

        assert_eq!(table.rate("EUR", "USD").await.unwrap(), 1.08);
        assert_eq!(table.rate("eur", "usd").await.unwrap(), 1.08);
        assert!(matches!(table.rate("USD", "EUR").await, Err(RateError::MissingRate { .. })));
    }

    #[tokio::test]
    async fn boxed_provider_delegates() {
        let provider: Box<dyn RateProvider> = Box::new(FixedRate(2.0));
        assert_eq!(provider.rate("EUR", "USD").await.unwrap(), 2.0);
    }
}
