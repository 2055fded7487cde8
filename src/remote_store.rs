//! Remote document store backend.
//!
//! Records live in one collection of a JSON document service reached over
//! HTTP with `reqwest::blocking`:
//!
//! | Operation | Request | Success |
//! |-----------|---------|---------|
//! | get | `GET {base}/{collection}/{key}` | 200 with the record, 404 when absent |
//! | set | `PUT {base}/{collection}/{key}` | any 2xx |
//! | delete | `DELETE {base}/{collection}/{key}` | any 2xx, or 404 |
//! | list | `GET {base}/{collection}` | 200 with a `{key: record}` object |
//!
//! Keys are sent as a single percent-encoded path segment. A bearer token is
//! attached when one is configured.
//!
//! Status mapping: 401 and 403 become [`StoreError::Unauthorized`], other
//! non-2xx [`StoreError::Rejected`], transport failures and timeouts
//! [`StoreError::Unavailable`], undecodable bodies [`StoreError::Malformed`].

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

use gift_survey_core::{ParticipantRecord, Store, StoreError};

use crate::config::RemoteConfig;

pub struct RemoteDocumentStore {
    client: Client,
    base: Url,
    collection: String,
    token: Option<String>,
}

impl RemoteDocumentStore {
    pub fn new(
        base_url: &str,
        collection: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("invalid remote base URL '{}'", base_url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("remote base URL '{}' cannot hold a path", base_url);
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base,
            collection: collection.to_string(),
            token,
        })
    }

    /// Build from `[remote]`, reading the token from the configured
    /// environment variable. A missing variable means no token.
    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty());
        if token.is_none() {
            debug!(var = %config.token_env, "no remote token set, sending unauthenticated requests");
        }
        Self::new(
            &config.base_url,
            &config.collection,
            token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn collection_url(&self) -> Url {
        self.url_for(None)
    }

    fn url_for(&self, key: Option<&str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&self.collection);
            if let Some(key) = key {
                segments.push(key);
            }
        }
        url
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        request
            .send()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

/// Map a non-success status to the matching [`StoreError`].
fn status_error(status: StatusCode, body: String) -> StoreError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            StoreError::Unauthorized(format!("{}: {}", status, body))
        }
        _ => StoreError::Rejected {
            status: status.as_u16(),
            body,
        },
    }
}

fn read_error(response: Response) -> StoreError {
    let status = response.status();
    let body = response.text().unwrap_or_default();
    status_error(status, body)
}

impl Store for RemoteDocumentStore {
    fn name(&self) -> &str {
        "remote"
    }

    fn get(&self, key: &str) -> Result<Option<ParticipantRecord>, StoreError> {
        let response = self.send(self.client.get(self.url_for(Some(key))))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(read_error(response));
        }
        let body = response
            .text()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(None);
        }
        let record: ParticipantRecord = serde_json::from_str(&body)?;
        Ok(Some(record))
    }

    fn set(&self, key: &str, record: &ParticipantRecord) -> Result<(), StoreError> {
        let response = self.send(self.client.put(self.url_for(Some(key))).json(record))?;
        if !response.status().is_success() {
            return Err(read_error(response));
        }
        debug!(key, "remote record written");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let response = self.send(self.client.delete(self.url_for(Some(key))))?;
        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(read_error(response))
    }

    fn list(&self) -> Result<Vec<(String, ParticipantRecord)>, StoreError> {
        let response = self.send(self.client.get(self.collection_url()))?;
        if !response.status().is_success() {
            return Err(read_error(response));
        }
        let body = response
            .text()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(Vec::new());
        }
        let map: Map<String, Value> = serde_json::from_str(&body)?;
        let mut records: Vec<(String, ParticipantRecord)> = map
            .into_iter()
            .filter_map(|(key, value)| match serde_json::from_value(value) {
                Ok(record) => Some((key, record)),
                Err(e) => {
                    warn!(key = %key, error = %e, "skipping undecodable remote record");
                    None
                }
            })
            .collect();
        records.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    fn store(base: &str) -> RemoteDocumentStore {
        RemoteDocumentStore::new(base, "quiz_progress", None, Duration::from_secs(2)).unwrap()
    }

    /// Serve exactly one canned HTTP response and report the request line
    /// and headers that reached it.
    fn one_shot(status: &str, body: &str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                let lower = line.to_ascii_lowercase();
                if let Some(v) = lower.strip_prefix("content-length:") {
                    content_length = v.trim().parse().unwrap_or(0);
                }
                head.push_str(&line);
            }
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).unwrap();
            let mut stream = stream;
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            let _ = tx.send(head);
        });
        (format!("http://{}/v1", addr), rx)
    }

    #[test]
    fn test_key_is_a_single_encoded_segment() {
        let s = store("https://docs.example.org/v1/");
        let url = s.url_for(Some("Ana/Lima Souza"));
        assert_eq!(
            url.as_str(),
            "https://docs.example.org/v1/quiz_progress/Ana%2FLima%20Souza"
        );
        assert_eq!(
            s.collection_url().as_str(),
            "https://docs.example.org/v1/quiz_progress"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, String::new()),
            StoreError::Unauthorized(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, String::new()),
            StoreError::Unauthorized(_)
        ));
        match status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom".into()) {
            StoreError::Rejected { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unreachable_is_unavailable() {
        let s = store("http://127.0.0.1:1");
        assert!(matches!(s.get("ana"), Err(StoreError::Unavailable(_))));
        assert!(matches!(s.list(), Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_get_404_is_absent() {
        let (base, rx) = one_shot("404 Not Found", "{}");
        assert!(store(&base).get("ana").unwrap().is_none());
        let head = rx.recv().unwrap();
        assert!(head.starts_with("GET /v1/quiz_progress/ana "));
    }

    #[test]
    fn test_get_decodes_record() {
        let (base, _rx) = one_shot(
            "200 OK",
            r#"{"display_name":"Ana","answers":{"1":3},"scores":{"A":3},"completed":false,"last_updated":"2026-01-02T03:04:05Z"}"#,
        );
        let record = store(&base).get("ana").unwrap().unwrap();
        assert_eq!(record.display_name, "Ana");
        assert_eq!(record.answers.get(&1), Some(&3));
    }

    #[test]
    fn test_delete_404_succeeds() {
        let (base, rx) = one_shot("404 Not Found", "");
        store(&base).delete("ana").unwrap();
        assert!(rx.recv().unwrap().starts_with("DELETE /v1/quiz_progress/ana "));
    }

    #[test]
    fn test_set_sends_bearer_token() {
        let (base, rx) = one_shot("200 OK", "{}");
        let s = RemoteDocumentStore::new(
            &base,
            "quiz_progress",
            Some("s3cret".into()),
            Duration::from_secs(2),
        )
        .unwrap();
        let record: ParticipantRecord = serde_json::from_str(r#"{"display_name":"Ana"}"#).unwrap();
        s.set("ana", &record).unwrap();
        let head = rx.recv().unwrap();
        assert!(head.starts_with("PUT /v1/quiz_progress/ana "));
        assert!(head.to_ascii_lowercase().contains("authorization: bearer s3cret"));
    }

    #[test]
    fn test_forbidden_maps_to_unauthorized() {
        let (base, _rx) = one_shot("403 Forbidden", "denied");
        assert!(matches!(
            store(&base).list(),
            Err(StoreError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_list_skips_bad_entries() {
        let (base, _rx) = one_shot(
            "200 OK",
            r#"{"bia":{"display_name":"Bia"},"broken":{"answers":7},"ana":{"display_name":"Ana"}}"#,
        );
        let keys: Vec<String> = store(&base)
            .list()
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["ana", "bia"]);
    }

    #[test]
    fn test_bad_json_is_malformed() {
        let (base, _rx) = one_shot("200 OK", "<html>");
        assert!(matches!(
            store(&base).get("ana"),
            Err(StoreError::Malformed(_))
        ));
    }
}
