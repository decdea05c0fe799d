// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! External record-lookup API.
//!
//! Indexes owner → domains and decodes records the registry alone cannot
//! resolve cheaply. Responses use the `{"s": "ok", "result": ...}` shape.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::derive::SOL_SUFFIX;
use super::state::Record;
use crate::blockchain::Pubkey;

/// Read access to the lookup API.
#[async_trait]
pub trait RecordLookup: Send + Sync {
    /// Domains owned by `owner`, each with its `.sol` suffix.
    async fn domains_for_owner(&self, owner: &Pubkey) -> Result<Vec<String>, LookupError>;

    /// Values of `records` on `domain` (given without its suffix).
    ///
    /// Records that are unset are omitted.
    async fn records(
        &self,
        domain: &str,
        records: &[Record],
    ) -> Result<Vec<(Record, String)>, LookupError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Lookup API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Lookup API request failed: {0}")]
    Transport(String),

    #[error("Lookup API error: {0}")]
    Api(String),
}

#[derive(Debug, Deserialize)]
struct ProxyResponse {
    s: String,
    result: Value,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DomainEntry {
    Named { domain: String },
    Bare(String),
}

impl DomainEntry {
    fn into_domain(self) -> String {
        let name = match self {
            DomainEntry::Named { domain } => domain,
            DomainEntry::Bare(domain) => domain,
        };
        if name.ends_with(SOL_SUFFIX) {
            name
        } else {
            format!("{name}{SOL_SUFFIX}")
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProxyRecord {
    record: String,
    deserialized: Option<String>,
}

/// HTTP client for the SNS SDK proxy.
pub struct SnsProxyClient {
    http: Client,
    base_url: url::Url,
}

impl SnsProxyClient {
    pub fn new(base_url: url::Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<url::Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::Transport(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: url::Url) -> Result<Value, LookupError> {
        let path = url.path().to_string();
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Transport(format!("GET {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: ProxyResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Api(format!("GET {path} invalid JSON: {e}")))?;
        unwrap_result(parsed)
    }
}

fn unwrap_result(response: ProxyResponse) -> Result<Value, LookupError> {
    if response.s == "ok" {
        return Ok(response.result);
    }
    let message = match response.result {
        Value::String(message) => message,
        other => other.to_string(),
    };
    Err(LookupError::Api(message))
}

fn parse_domains(result: Value) -> Result<Vec<String>, LookupError> {
    let entries: Vec<DomainEntry> = serde_json::from_value(result)
        .map_err(|e| LookupError::Api(format!("unexpected domains payload: {e}")))?;
    Ok(entries.into_iter().map(DomainEntry::into_domain).collect())
}

fn parse_records(result: Value) -> Result<Vec<(Record, String)>, LookupError> {
    let entries: Vec<ProxyRecord> = serde_json::from_value(result)
        .map_err(|e| LookupError::Api(format!("unexpected records payload: {e}")))?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            let record = Record::parse(&entry.record)?;
            let value = entry.deserialized.filter(|v| !v.is_empty())?;
            Some((record, value))
        })
        .collect())
}

#[async_trait]
impl RecordLookup for SnsProxyClient {
    async fn domains_for_owner(&self, owner: &Pubkey) -> Result<Vec<String>, LookupError> {
        let owner = owner.to_string();
        let url = self.endpoint(&["domains", &owner])?;
        parse_domains(self.get(url).await?)
    }

    async fn records(
        &self,
        domain: &str,
        records: &[Record],
    ) -> Result<Vec<(Record, String)>, LookupError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let mut url = self.endpoint(&["records", domain])?;
        let labels: Vec<&str> = records.iter().map(|r| r.as_str()).collect();
        url.query_pairs_mut().append_pair("records", &labels.join(","));
        parse_records(self.get(url).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_endpoints_under_base_path() {
        let client = SnsProxyClient::new("https://proxy.example/v1/".parse().unwrap());
        let url = client.endpoint(&["records", "abc"]).unwrap();
        assert_eq!(url.as_str(), "https://proxy.example/v1/records/abc");

        let client = SnsProxyClient::new("https://proxy.example".parse().unwrap());
        let url = client.endpoint(&["domains", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "https://proxy.example/domains/a%2Fb");
    }

    #[test]
    fn parses_domain_entries_in_both_shapes() {
        let response: ProxyResponse = serde_json::from_value(json!({
            "s": "ok",
            "result": [{ "key": "x", "domain": "bonfida" }, "solana.sol"]
        }))
        .unwrap();
        let domains = parse_domains(unwrap_result(response).unwrap()).unwrap();
        assert_eq!(domains, vec!["bonfida.sol", "solana.sol"]);
    }

    #[test]
    fn surfaces_api_errors() {
        let response: ProxyResponse = serde_json::from_value(json!({
            "s": "error",
            "result": "Invalid domain"
        }))
        .unwrap();
        assert!(matches!(
            unwrap_result(response),
            Err(LookupError::Api(message)) if message == "Invalid domain"
        ));
    }

    #[test]
    fn parses_records_skipping_unknown_and_empty() {
        let records = parse_records(json!([
            { "record": "SOL", "deserialized": "HKKp49qGWXd639QsuH7JiLijfVW5UtCVY4s1n2HANwEA" },
            { "record": "url", "deserialized": null },
            { "record": "twitter", "deserialized": "" },
            { "record": "myspace", "deserialized": "tom" }
        ]))
        .unwrap();
        assert_eq!(
            records,
            vec![(
                Record::Sol,
                "HKKp49qGWXd639QsuH7JiLijfVW5UtCVY4s1n2HANwEA".to_string()
            )]
        );
    }
}
