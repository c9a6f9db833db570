//!
//! src/fetch.rs  Andrew Belles  Oct 2nd, 2025
//!
//! Defines methods for hitting the iTunes search endpoint and
//! returning unparsed data. No retries, one request per record
//!

use async_trait::async_trait;
use reqwest::{Client, header, redirect, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use crate::config::{HttpConfig, ItunesConfig};
use crate::types::RawRecord;
use crate::EnricherError;

/// Query parameters of a single iTunes search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub media: String,
    pub entity: String,
    pub limit: u32
}

impl SearchQuery {
    pub fn for_record(record: &RawRecord, cfg: &ItunesConfig) -> Self {
        Self {
            term: record.search_term(),
            media: cfg.media.clone(),
            entity: cfg.entity.clone(),
            limit: cfg.limit
        }
    }

    pub fn params(&self) -> [(&'static str, String); 4] {
        [
            ("term", self.term.clone()),
            ("media", self.media.clone()),
            ("entity", self.entity.clone()),
            ("limit", self.limit.to_string())
        ]
    }
}

/// Anything that can answer a search with a raw json body
#[async_trait]
pub trait SearchService {
    async fn search(&self, query: &SearchQuery) -> Result<Value, EnricherError>;
}

/// Client building functionality
fn client_helper(http: &HttpConfig) -> reqwest::ClientBuilder  {
    Client::builder()
        .timeout(http.timeout)
        .connect_timeout(http.connect_timeout)
        .pool_max_idle_per_host(http.pool_max_idle_per_host)
        .pool_idle_timeout(Some(http.pool_idle_timeout))
        .redirect(redirect::Policy::limited(http.max_redirects as usize))
}

pub fn base_client(http: &HttpConfig) -> Result<Client, EnricherError> {
    let mut h = header::HeaderMap::new();
    h.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
    client_helper(http)
        .default_headers(h)
        .build()
        .map_err(|e| EnricherError::Config(format!("build client: {e}")))
}

#[derive(Clone, Debug)]
pub struct ItunesClient {
    pub http: Client,
    pub cfg: ItunesConfig
}

impl ItunesClient {
    pub fn new(http_config: &HttpConfig, cfg: &ItunesConfig) ->
        Result<Self, EnricherError> {

        let http = base_client(http_config)?;
        Ok( Self {
            http,
            cfg: cfg.clone()
        })
    }

    /// GET /search?term=...&media=music&entity=musicTrack&limit=1
    pub fn search_request(&self, query: &SearchQuery) -> RequestBuilder {
        self.http.get(self.cfg.base_url.clone()).query(&query.params())
    }
}

#[async_trait]
impl SearchService for ItunesClient {
    async fn search(&self, query: &SearchQuery) -> Result<Value, EnricherError> {
        let response = self.search_request(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnricherError::Transport(
                format!("search {:?} returned {status}: {}", query.term, body.trim())
            ));
        }

        let value = response.json::<Value>().await.map_err(|e| EnricherError::Transport(
            format!("search {:?} returned undecodable body: {e}", query.term)
        ))?;
        debug!(term = %query.term, %status, "lookup.response");
        Ok(value)
    }
}
