use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::rates::{RateError, RateProvider};

#[derive(Debug, Deserialize)]
struct LatestRates {
    #[serde(default)]
    conversion_rates: HashMap<String, f64>,
    #[serde(default)]
    rates: HashMap<String, f64>
}

impl LatestRates {
    fn get(&self, target: &str) -> Option<f64> {
        self.conversion_rates.get(target)
            .or_else(|| self.rates.get(target))
            .copied()
    }
}

/// Queries an exchangerate-api style endpoint:
/// `GET {base_url}/{api_key}/latest/{source}`.
///
/// No retries; a failed request is reported once and the caller decides.
pub struct HttpRates {
    client: reqwest::Client,
    base_url: String,
    api_key: String
}

impl HttpRates {
    pub fn new(base_url: &str, api_key: &str) -> HttpRates {
        HttpRates {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned()
        }
    }

    fn url(&self, source: &str) -> String {
        format!("{}/{}/latest/{}", self.base_url, self.api_key, source)
    }
}

#[async_trait]
impl RateProvider for HttpRates {
    async fn rate(&self, source: &str, target: &str) -> Result<f64, RateError> {
        let resp = self.client.get(self.url(source)).send().await
            .map_err(|e| RateError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(RateError::Network(format!("status {}", resp.status())));
        }

        let latest: LatestRates = resp.json().await
            .map_err(|e| RateError::Network(e.to_string()))?;

        latest.get(target).ok_or_else(|| RateError::MissingRate {
            from: source.to_owned(), to: target.to_owned() })
    }
}
