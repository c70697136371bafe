//! Price API client (CoinGecko `simple/price`).

use serde_json::Value;

use crate::api::logs::{log_info_indent, log_warning_indent};
use crate::config::Config;
use crate::error::{SourceError, SourceResult};
use crate::models::PriceQuote;

/// Assets shown in the price ticker, as `(price API id, symbol)`
pub const DEFAULT_TICKER: &[(&str, &str)] = &[
    ("bitcoin", "BTC"),
    ("ethereum", "ETH"),
    ("binancecoin", "BNB"),
    ("optimism", "OP"),
];

/// Quote currency
pub const VS_CURRENCY: &str = "usd";

/// Client for the price API
#[derive(Debug, Clone)]
pub struct PriceClient {
    http: reqwest::Client,
    base_url: String,
}

impl PriceClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from configuration
    pub fn from_config(http: reqwest::Client, config: &Config) -> Self {
        Self::new(http, &config.price_url)
    }

    /// Fetch USD prices for `ticker`, in ticker order
    ///
    /// Assets the API does not price are left out with a warning.
    pub async fn fetch_prices(&self, ticker: &[(&str, &str)]) -> SourceResult<Vec<PriceQuote>> {
        log_info_indent(format!("Fetching prices for {} assets", ticker.len()), 1);

        let response = self
            .http
            .get(format!("{}/simple/price", self.base_url))
            .query(&price_query(ticker))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            log_warning_indent(format!("Price API answered HTTP {}", status), 1);
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let quotes = parse_prices_response(&body, ticker)?;
        if quotes.len() < ticker.len() {
            log_warning_indent(
                format!("No price for {} of {} assets", ticker.len() - quotes.len(), ticker.len()),
                1,
            );
        }
        Ok(quotes)
    }
}

/// Query parameters for `simple/price`
pub fn price_query(ticker: &[(&str, &str)]) -> Vec<(&'static str, String)> {
    let ids: Vec<&str> = ticker.iter().map(|(id, _)| *id).collect();
    vec![
        ("ids", ids.join(",")),
        ("vs_currencies", VS_CURRENCY.to_string()),
    ]
}

/// Parse a `simple/price` body: `{"<id>": {"usd": <number>}, ...}`
pub fn parse_prices_response(body: &str, ticker: &[(&str, &str)]) -> SourceResult<Vec<PriceQuote>> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| SourceError::InvalidResponse(e.to_string()))?;
    let prices = value
        .as_object()
        .ok_or_else(|| SourceError::InvalidResponse("expected a JSON object".to_string()))?;

    // Rate limiting and bad requests come back as {"status": {"error_message": ...}}
    if let Some(message) = prices
        .get("status")
        .and_then(|s| s.get("error_message"))
        .and_then(Value::as_str)
    {
        return Err(SourceError::Api(message.to_string()));
    }

    Ok(ticker
        .iter()
        .filter_map(|(id, symbol)| {
            let usd = prices.get(*id)?.get(VS_CURRENCY)?.as_f64()?;
            Some(PriceQuote::new(*id, *symbol, usd))
        })
        .collect())
}

/// One-line ticker: `BTC: $67000.5 | ETH: $3500`
pub fn ticker_line(quotes: &[PriceQuote]) -> String {
    quotes
        .iter()
        .map(|q| format!("{}: ${}", q.symbol, q.usd))
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_query() {
        let query = price_query(DEFAULT_TICKER);
        assert_eq!(query[0], ("ids", "bitcoin,ethereum,binancecoin,optimism".to_string()));
        assert_eq!(query[1], ("vs_currencies", "usd".to_string()));
    }

    #[test]
    fn test_parse_keeps_ticker_order() {
        let body = r#"{
            "optimism": {"usd": 1.75},
            "bitcoin": {"usd": 67012.5},
            "ethereum": {"usd": 3500},
            "binancecoin": {"usd": 590.1}
        }"#;
        let quotes = parse_prices_response(body, DEFAULT_TICKER).unwrap();
        let symbols: Vec<&str> = quotes.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTC", "ETH", "BNB", "OP"]);
        assert_eq!(quotes[0], PriceQuote::new("bitcoin", "BTC", 67012.5));
        assert_eq!(quotes[1].usd, 3500.0);
    }

    #[test]
    fn test_parse_skips_unpriced_assets() {
        let body = r#"{"bitcoin": {"usd": 67012.5}, "ethereum": {}}"#;
        let quotes = parse_prices_response(body, DEFAULT_TICKER).unwrap();
        assert_eq!(quotes, vec![PriceQuote::new("bitcoin", "BTC", 67012.5)]);
    }

    #[test]
    fn test_parse_rate_limited() {
        let body = r#"{"status": {"error_code": 429, "error_message": "You've exceeded the Rate Limit"}}"#;
        match parse_prices_response(body, DEFAULT_TICKER).unwrap_err() {
            SourceError::Api(msg) => assert!(msg.contains("Rate Limit")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_parse_not_an_object() {
        assert!(matches!(
            parse_prices_response("[1, 2]", DEFAULT_TICKER),
            Err(SourceError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_ticker_line() {
        let quotes = vec![
            PriceQuote::new("bitcoin", "BTC", 67012.5),
            PriceQuote::new("ethereum", "ETH", 3500.0),
        ];
        assert_eq!(ticker_line(&quotes), "BTC: $67012.5 | ETH: $3500");
        assert_eq!(ticker_line(&[]), "");
    }
}
