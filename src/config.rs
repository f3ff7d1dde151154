use std::{fs, path::{Path, PathBuf}, collections::HashMap};
use serde::{Serialize, Deserialize};
use anyhow::{self, Context};

use crate::backend::JsonStore;
use crate::core::{Amount, CurrencyPair, Ledger, SystemClock, DEFAULT_BALANCE};
use crate::rates::{FixedRate, RateProvider, RateTable, OFFLINE_EUR_USD};

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig { path: PathBuf::from("banka.json") }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub default_balance: Amount
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig { default_balance: DEFAULT_BALANCE }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Fixed,
    Table,
    Http
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    pub provider: RateSource,
    pub fixed: f64,
    pub table: HashMap<String, f64>,
    pub base_url: String,
    pub api_key: String
}

impl Default for RatesConfig {
    fn default() -> Self {
        RatesConfig {
            provider: RateSource::Fixed,
            fixed: OFFLINE_EUR_USD,
            table: HashMap::new(),
            base_url: "https://v6.exchangerate-api.com/v6".to_owned(),
            api_key: String::new()
        }
    }
}

impl RatesConfig {
    pub fn provider(&self) -> anyhow::Result<Box<dyn RateProvider>> {
        match self.provider {
            RateSource::Fixed => Ok(Box::new(FixedRate(self.fixed))),
            RateSource::Table => Ok(Box::new(RateTable::new(self.table.clone()))),
            RateSource::Http => self.http_provider()
        }
    }

    #[cfg(feature = "http-rates")]
    fn http_provider(&self) -> anyhow::Result<Box<dyn RateProvider>> {
        if self.api_key.is_empty() {
            anyhow::bail!("rates.api_key is required for the http provider");
        }
        Ok(Box::new(crate::rates::HttpRates::new(&self.base_url, &self.api_key)))
    }

    #[cfg(not(feature = "http-rates"))]
    fn http_provider(&self) -> anyhow::Result<Box<dyn RateProvider>> {
        anyhow::bail!("http rates requested but banka was built without the `http-rates` feature")
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { bind: "127.0.0.1:8080".to_owned() }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub ledger: LedgerConfig,
    pub currency: CurrencyPair,
    pub rates: RatesConfig,
    pub server: ServerConfig
}

impl AppConfig {
    pub fn read(filepath: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file_content = fs::read_to_string(filepath)
            .with_context(|| "failed to read config file")?;
        let config = toml::from_str(&file_content)
            .with_context(|| "failed to parse config file")?;
        return Ok(config);
    }

    /// Reads `filepath` when given, otherwise uses the built-in defaults.
    pub fn read_or_default(filepath: Option<&Path>) -> anyhow::Result<Self> {
        match filepath {
            Some(path) => Self::read(path),
            None => Ok(Self::default())
        }
    }

    pub fn open_ledger(&self) -> Ledger<JsonStore, SystemClock> {
        let store = JsonStore::new(&self.storage.path);
        Ledger::load(store, SystemClock, self.ledger.default_balance)
            .with_currencies(self.currency.clone())
    }
}
