//! Quote-source construction by exchange id.

use super::{Binance, Kraken, QuoteSource};
use crate::error::{ConfigError, Error, Result};

/// Build a quote source for a configured exchange id.
pub fn create_source(id: &str, http: reqwest::Client) -> Result<Box<dyn QuoteSource>> {
    match id {
        "binance" => Ok(Box::new(Binance::new(http))),
        "kraken" => Ok(Box::new(Kraken::new(http))),
        other => Err(Error::Config(ConfigError::InvalidValue {
            field: "exchange",
            reason: format!("unsupported exchange '{other}' (supported: binance, kraken)"),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_supported_exchanges() {
        let http = reqwest::Client::new();
        assert_eq!(create_source("kraken", http.clone()).unwrap().id(), "kraken");
        assert_eq!(create_source("binance", http).unwrap().id(), "binance");
    }

    #[test]
    fn rejects_unknown_exchange() {
        let http = reqwest::Client::new();
        assert!(create_source("mtgox", http).is_err());
    }
}
