//! Migration of API entries from the legacy index
//!
//! Entries arrive as indexed documents,
//! `{_id, _source: {url, api_port, api_user, api_password}}`, with the
//! password base64 encoded. They are decoded into host records and bulk
//! inserted; ids already in the store are left alone, so running the
//! migration twice is harmless.

use std::fmt;
use std::time::Instant;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use wzhosts_core::errors::{ExError, ExErrorKind, HostsError};
use wzhosts_core::{log_op_end, log_op_error, log_op_start};
use wzhosts_core::{HostRecord, NewHost};

use crate::errors::{in_op, Result};
use crate::repo::{AddManySummary, HostRepository};

/// One indexed API document
#[derive(Debug, Clone, Deserialize)]
pub struct IndexedApiEntry {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source")]
    pub source: IndexedApiSource,
}

#[derive(Clone, Deserialize)]
pub struct IndexedApiSource {
    pub url: String,
    pub api_port: ApiPort,
    pub api_user: String,
    /// Base64 of the literal password
    pub api_password: String,
}

impl fmt::Debug for IndexedApiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedApiSource")
            .field("url", &self.url)
            .field("api_port", &self.api_port)
            .field("api_user", &self.api_user)
            .field("api_password", &"***REDACTED***")
            .finish()
    }
}

/// The index stored ports either as numbers or as strings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ApiPort {
    Number(u16),
    Text(String),
}

impl ApiPort {
    fn resolve(&self, id: &str) -> std::result::Result<u16, HostsError> {
        match self {
            ApiPort::Number(port) => Ok(*port),
            ApiPort::Text(text) => {
                text.trim()
                    .parse::<u16>()
                    .map_err(|_| HostsError::MalformedRecord {
                        reason: format!("host {} has invalid api_port {:?}", id, text),
                    })
            }
        }
    }
}

/// Accepted payload shapes: a bare array of entries or a search response
#[derive(Deserialize)]
#[serde(untagged)]
enum IndexedPayload {
    Entries(Vec<IndexedApiEntry>),
    Search { hits: SearchHits },
}

#[derive(Deserialize)]
struct SearchHits {
    hits: Vec<IndexedApiEntry>,
}

/// Parse indexed entries from JSON
///
/// # Errors
///
/// `Serialization` if `json` is neither an array of entries nor an object
/// with `hits.hits`.
pub fn parse_indexed_entries(json: &str) -> Result<Vec<IndexedApiEntry>> {
    let payload: IndexedPayload = serde_json::from_str(json).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("parse_indexed_entries")
            .with_message(format!("Invalid indexed API payload: {}", e))
    })?;
    Ok(match payload {
        IndexedPayload::Entries(entries) => entries,
        IndexedPayload::Search { hits } => hits.hits,
    })
}

/// Reverse the base64 encoding applied by the index
pub fn decode_api_password(encoded: &str) -> std::result::Result<String, HostsError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| HostsError::InvalidCredential {
            reason: format!("api_password is not valid base64: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|_| HostsError::InvalidCredential {
        reason: "api_password does not decode to UTF-8 text".to_string(),
    })
}

/// Map indexed entries onto host records, in input order
///
/// # Errors
///
/// Fails on the first entry with an undecodable password or unusable port.
pub fn transform(entries: &[IndexedApiEntry]) -> Result<Vec<HostRecord>> {
    entries
        .iter()
        .map(|entry| -> std::result::Result<HostRecord, HostsError> {
            let source = &entry.source;
            let port = source.api_port.resolve(&entry.id)?;
            let password = decode_api_password(&source.api_password)?;
            Ok(HostRecord::new(
                entry.id.clone(),
                source.url.clone(),
                port,
                source.api_user.clone(),
                password,
            ))
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(in_op("transform_indexed_apis"))
}

/// Transform `entries` and insert those whose id is not in the store yet
pub fn migrate(repo: &HostRepository, entries: &[IndexedApiEntry]) -> Result<AddManySummary> {
    log_op_start!("migrate_hosts", host_count = entries.len());
    let start = Instant::now();

    let summary = transform(entries)
        .and_then(|records| repo.add_many(records.into_iter().map(NewHost::from).collect()))
        .map_err(|e| {
            log_op_error!(
                "migrate_hosts",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "migrate_hosts",
        duration_ms = start.elapsed().as_millis() as u64,
        added_count = summary.added.len(),
        skipped_count = summary.skipped.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, port: ApiPort, password_b64: &str) -> IndexedApiEntry {
        IndexedApiEntry {
            id: id.to_string(),
            source: IndexedApiSource {
                url: "https://localhost".to_string(),
                api_port: port,
                api_user: "foo".to_string(),
                api_password: password_b64.to_string(),
            },
        }
    }

    #[test]
    fn test_decode_api_password() {
        assert_eq!(decode_api_password("YmFy").unwrap(), "bar");
        assert!(matches!(
            decode_api_password("not base64!"),
            Err(HostsError::InvalidCredential { .. })
        ));
    }

    #[test]
    fn test_transform_maps_fields_and_ports() {
        let records = transform(&[
            entry("1513245619425", ApiPort::Text("55000".to_string()), "YmFy"),
            entry("1513245619426", ApiPort::Number(55001), "d2F6dWg="),
        ])
        .unwrap();

        assert_eq!(records[0].id, "1513245619425");
        assert_eq!(records[0].port, 55000);
        assert_eq!(records[0].username, "foo");
        assert_eq!(records[0].password.expose(), "bar");
        assert_eq!(records[1].port, 55001);
        assert_eq!(records[1].password.expose(), "wazuh");
    }

    #[test]
    fn test_transform_rejects_bad_port() {
        let err = transform(&[entry("x", ApiPort::Text("http".to_string()), "YmFy")]).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Codec);
        assert_eq!(err.op(), Some("transform_indexed_apis"));
    }

    #[test]
    fn test_parse_accepts_array_and_search_response() {
        let doc = r#"{"_id":"a","_source":{"url":"https://h","api_port":"55000","api_user":"u","api_password":"cA=="}}"#;
        let array = format!("[{}]", doc);
        let search = format!(r#"{{"took":1,"hits":{{"total":1,"hits":[{}]}}}}"#, doc);

        assert_eq!(parse_indexed_entries(&array).unwrap()[0].id, "a");
        assert_eq!(parse_indexed_entries(&search).unwrap()[0].id, "a");
        assert_eq!(
            parse_indexed_entries("{}").unwrap_err().kind(),
            ExErrorKind::Serialization
        );
    }

    #[test]
    fn test_source_debug_hides_password() {
        let rendered = format!("{:?}", entry("a", ApiPort::Number(1), "c2VjcmV0"));
        assert!(!rendered.contains("c2VjcmV0"));
        assert!(rendered.contains("REDACTED"));
    }
}
