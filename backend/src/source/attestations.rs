//! Attestation indexer client (GraphQL).

use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::logs::{log_info_indent, log_warning_indent};
use crate::config::Config;
use crate::error::{SourceError, SourceResult};
use crate::models::AttestationRecord;

/// Attestations made by one attester
pub const ATTESTATIONS_QUERY: &str = r#"query Attestations($where: AttestationWhereInput) {
  attestations(where: $where) {
    recipient
    txid
  }
}"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<AttestationsData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct AttestationsData {
    #[serde(default)]
    attestations: Vec<AttestationRecord>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// GraphQL client for the attestation indexer
#[derive(Debug, Clone)]
pub struct AttestationClient {
    http: reqwest::Client,
    endpoint: String,
}

impl AttestationClient {
    pub fn new(http: reqwest::Client, endpoint: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.to_string(),
        }
    }

    /// Create a client from configuration
    pub fn from_config(http: reqwest::Client, config: &Config) -> Self {
        Self::new(http, &config.attestation_url)
    }

    /// Fetch attestations whose attester is `address`
    pub async fn fetch_attestations(&self, address: &str) -> SourceResult<Vec<AttestationRecord>> {
        log_info_indent(format!("Querying attestations by {}", address), 1);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&attestations_request(address))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            log_warning_indent(format!("Indexer answered HTTP {}", status), 1);
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let records = parse_attestations_response(&body)?;
        log_info_indent(format!("Received {} attestations", records.len()), 1);
        Ok(records)
    }
}

/// Request body for [`ATTESTATIONS_QUERY`]
pub fn attestations_request(address: &str) -> Value {
    json!({
        "query": ATTESTATIONS_QUERY,
        "variables": {
            "where": {
                "attester": { "equals": address }
            }
        }
    })
}

/// Parse a GraphQL response body into attestation records
pub fn parse_attestations_response(body: &str) -> SourceResult<Vec<AttestationRecord>> {
    let response: GraphQlResponse =
        serde_json::from_str(body).map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(SourceError::Api(messages.join("; ")));
    }

    response
        .data
        .map(|d| d.attestations)
        .ok_or_else(|| SourceError::InvalidResponse("missing data".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let body = attestations_request("0xB073");
        assert_eq!(body["variables"]["where"]["attester"]["equals"], "0xB073");
        assert!(body["query"].as_str().unwrap().contains("txid"));
    }

    #[test]
    fn test_parse_data() {
        let body = r#"{"data":{"attestations":[
            {"recipient":"0xAB","txid":"0xCD"},
            {"recipient":"0xEF","txid":"0x01","id":"0x99"}
        ]}}"#;
        let records = parse_attestations_response(body).unwrap();
        assert_eq!(records, vec![
            AttestationRecord::new("0xAB", "0xCD"),
            AttestationRecord::new("0xEF", "0x01"),
        ]);
    }

    #[test]
    fn test_parse_empty() {
        let body = r#"{"data":{"attestations":[]}}"#;
        assert!(parse_attestations_response(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        let body = r#"{"errors":[{"message":"Unknown argument"},{"message":"Bad input"}],"data":null}"#;
        match parse_attestations_response(body).unwrap_err() {
            SourceError::Api(msg) => assert_eq!(msg, "Unknown argument; Bad input"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_parse_missing_data() {
        assert!(matches!(
            parse_attestations_response("{}"),
            Err(SourceError::InvalidResponse(_))
        ));
    }
}
