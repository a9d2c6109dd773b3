//! HTTP lookup against the Art Institute of Chicago public API.
//!
//! `GET <base>/artworks/{id}` returns `{"data": {"title": ..., ...}}` on
//! success. Anything else (transport error, timeout, non-2xx, malformed or
//! empty body) is reported as `NotFound`.

use super::{ArtworkLookup, ArtworkMetadata, LookupOutcome};
use crate::config::AppConfig;
use log::{info, warn};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

/// Errors building an `ArticClient`. Lookups themselves never fail.
#[derive(Debug)]
pub enum LookupSetupError {
    /// Base URL cannot be parsed or cannot carry path segments.
    InvalidBaseUrl(String),
    /// HTTP client construction failed (TLS backend, etc).
    Client(reqwest::Error),
}

impl Display for LookupSetupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBaseUrl(value) => write!(f, "invalid artwork API base url `{value}`"),
            Self::Client(err) => write!(f, "failed to build artwork API client: {err}"),
        }
    }
}

impl Error for LookupSetupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidBaseUrl(_) => None,
            Self::Client(err) => Some(err),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArtworkEnvelope {
    #[serde(default)]
    data: Option<Value>,
}

/// Blocking ArtIC client with a bounded per-request timeout.
#[derive(Debug, Clone)]
pub struct ArticClient {
    http: Client,
    base_url: Url,
}

impl ArticClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LookupSetupError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|_| LookupSetupError::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(LookupSetupError::InvalidBaseUrl(base_url.to_string()));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LookupSetupError::Client)?;
        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, LookupSetupError> {
        Self::new(config.artic_api_base_url.as_str(), config.lookup_timeout())
    }

    /// Builds `<base>/artworks/<id>` with the id percent-encoded as one segment.
    pub fn artwork_url(&self, external_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("artworks").push(external_id);
        }
        url
    }
}

impl ArtworkLookup for ArticClient {
    fn lookup(&self, external_id: &str) -> LookupOutcome {
        let started_at = Instant::now();
        let url = self.artwork_url(external_id);

        let response = match self.http.get(url).send() {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    "event=artwork_lookup module=lookup status=error external_id={} duration_ms={} error_code=transport_failed error={}",
                    external_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                return LookupOutcome::NotFound;
            }
        };

        let status = response.status().as_u16();
        let body = match response.text() {
            Ok(body) => body,
            Err(err) => {
                warn!(
                    "event=artwork_lookup module=lookup status=error external_id={} http_status={} duration_ms={} error_code=body_read_failed error={}",
                    external_id,
                    status,
                    started_at.elapsed().as_millis(),
                    err
                );
                return LookupOutcome::NotFound;
            }
        };

        let outcome = parse_artwork_response(status, body.as_str());
        info!(
            "event=artwork_lookup module=lookup status=ok external_id={} http_status={} found={} duration_ms={}",
            external_id,
            status,
            matches!(outcome, LookupOutcome::Found(_)),
            started_at.elapsed().as_millis()
        );
        outcome
    }
}

/// Maps an HTTP status and body to a lookup outcome.
///
/// Only a 2xx response with a non-empty `data` object counts as found; the
/// `title` is kept when it is a string.
pub fn parse_artwork_response(status: u16, body: &str) -> LookupOutcome {
    if !(200..300).contains(&status) {
        return LookupOutcome::NotFound;
    }

    let Ok(envelope) = serde_json::from_str::<ArtworkEnvelope>(body) else {
        return LookupOutcome::NotFound;
    };

    match envelope.data {
        Some(Value::Object(fields)) if !fields.is_empty() => {
            LookupOutcome::Found(ArtworkMetadata {
                title: fields
                    .get("title")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        }
        _ => LookupOutcome::NotFound,
    }
}
