//! Record sources.
//!
//! HTTP clients that fetch raw records for an address:
//!
//! - [`ExplorerClient`] - transactions from an Etherscan-compatible explorer
//! - [`AttestationClient`] - attestations from a GraphQL indexer
//! - [`PriceClient`] - USD prices for the ticker
//!
//! All wrap a shared `reqwest::Client`; build them once with
//! [`Sources::from_config`] and pass them by reference.

pub mod attestations;
pub mod explorer;
pub mod prices;

pub use attestations::{attestations_request, parse_attestations_response, AttestationClient};
pub use explorer::{parse_txlist_response, txlist_query, ExplorerClient, SortOrder};
pub use prices::{parse_prices_response, price_query, ticker_line, PriceClient, DEFAULT_TICKER};

use crate::config::Config;
use crate::error::SourceResult;

/// The HTTP sources, sharing one connection pool
#[derive(Debug, Clone)]
pub struct Sources {
    pub explorer: ExplorerClient,
    pub attestations: AttestationClient,
    pub prices: PriceClient,
}

impl Sources {
    pub fn from_config(config: &Config) -> SourceResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("chainexport/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            explorer: ExplorerClient::from_config(http.clone(), config),
            attestations: AttestationClient::from_config(http.clone(), config),
            prices: PriceClient::from_config(http, config),
        })
    }
}
