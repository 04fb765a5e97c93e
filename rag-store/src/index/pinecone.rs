//! Pinecone REST client: control plane for index lifecycle, data plane for vectors.
//!
//! The control plane (`api.pinecone.io`) lists, creates and describes
//! serverless indexes. Each index has its own data-plane host, discovered
//! through `describe` and cached for the lifetime of the client.

use std::time::{Duration, Instant};

use reqwest::{
    Client, RequestBuilder, Response,
    header::{HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use super::{IndexFuture, VectorIndex};
use crate::config::{DistanceKind, PineconeConfig, RagConfig};
use crate::errors::RagError;
use crate::record::{IndexEntry, RagHit};

const API_VERSION: &str = "2025-01";
const SNIPPET_CHARS: usize = 300;

/// Serverless Pinecone index addressed by name.
pub struct PineconeIndex {
    http: Client,
    cfg: PineconeConfig,
    name: String,
    metric: DistanceKind,
    poll_interval: Duration,
    host: OnceCell<String>,
}

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexModel>,
}

#[derive(Debug, Deserialize)]
struct IndexModel {
    name: String,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    status: Option<IndexStatus>,
}

#[derive(Debug, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: CreateSpec<'a>,
}

#[derive(Serialize)]
struct CreateSpec<'a> {
    serverless: Serverless<'a>,
}

#[derive(Serialize)]
struct Serverless<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [IndexEntry],
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: u64,
    include_metadata: bool,
    include_values: bool,
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Value,
}

impl PineconeIndex {
    /// Builds the HTTP client with auth and API-version headers.
    ///
    /// # Errors
    /// `RagError::Config` for header values that are not valid ASCII,
    /// `RagError::Http` if the client cannot be built.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        let mut headers = HeaderMap::new();
        headers.insert("X-Pinecone-API-Version", HeaderValue::from_static(API_VERSION));
        if let Some(key) = &cfg.pinecone.api_key {
            let mut v = HeaderValue::from_str(key)
                .map_err(|e| RagError::Config(format!("PINECONE_API_KEY: {e}")))?;
            v.set_sensitive(true);
            headers.insert("Api-Key", v);
        }

        let mut builder = Client::builder().default_headers(headers);
        if let Some(t) = cfg.pinecone.timeout {
            builder = builder.timeout(t);
        }

        Ok(Self {
            http: builder.build()?,
            cfg: cfg.pinecone.clone(),
            name: cfg.index_name.clone(),
            metric: cfg.distance,
            poll_interval: Duration::from_secs(1),
            host: OnceCell::new(),
        })
    }

    /// Overrides the readiness polling interval.
    pub fn with_poll_interval(mut self, every: Duration) -> Self {
        self.poll_interval = every;
        self
    }

    fn control(&self, path: &str) -> String {
        format!("{}{}", self.cfg.control_url.trim_end_matches('/'), path)
    }

    async fn list_names(&self) -> Result<Vec<String>, RagError> {
        let list: IndexList = send_json(self.http.get(self.control("/indexes"))).await?;
        Ok(list.indexes.into_iter().map(|i| i.name).collect())
    }

    async fn describe(&self) -> Result<IndexModel, RagError> {
        send_json(self.http.get(self.control(&format!("/indexes/{}", self.name)))).await
    }

    async fn create(&self, dimension: usize) -> Result<(), RagError> {
        let body = CreateIndexRequest {
            name: &self.name,
            dimension,
            metric: self.metric.pinecone_metric(),
            spec: CreateSpec {
                serverless: Serverless {
                    cloud: &self.cfg.cloud,
                    region: &self.cfg.region,
                },
            },
        };
        let resp = self
            .http
            .post(self.control("/indexes"))
            .json(&body)
            .send()
            .await?;
        if resp.status() == reqwest::StatusCode::CONFLICT {
            debug!(index = %self.name, "index created concurrently");
            return Ok(());
        }
        check(resp).await?;
        Ok(())
    }

    async fn wait_ready(&self) -> Result<IndexModel, RagError> {
        let started = Instant::now();
        loop {
            let model = self.describe().await?;
            let ready = model.status.as_ref().is_some_and(|s| s.ready);
            if ready && model.host.is_some() {
                return Ok(model);
            }
            if started.elapsed() >= self.cfg.ready_timeout {
                return Err(RagError::IndexNotReady(self.name.clone()));
            }
            debug!(
                index = %self.name,
                state = model.status.as_ref().and_then(|s| s.state.as_deref()).unwrap_or("unknown"),
                "waiting for index"
            );
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn data_host(&self) -> Result<&str, RagError> {
        let host = self
            .host
            .get_or_try_init(|| async {
                let model = self.describe().await?;
                model
                    .host
                    .map(|h| normalize_host(&h))
                    .ok_or_else(|| RagError::IndexNotReady(self.name.clone()))
            })
            .await?;
        Ok(host.as_str())
    }
}

impl VectorIndex for PineconeIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn ensure_index<'a>(&'a self, dimension: usize) -> IndexFuture<'a, ()> {
        Box::pin(async move {
            if self.list_names().await?.iter().any(|n| n == &self.name) {
                debug!(index = %self.name, "index already exists");
                return Ok(());
            }

            info!(
                index = %self.name,
                dimension,
                metric = self.metric.pinecone_metric(),
                cloud = %self.cfg.cloud,
                region = %self.cfg.region,
                "creating serverless index"
            );
            self.create(dimension).await?;
            let model = self.wait_ready().await?;
            if let Some(h) = model.host {
                let _ = self.host.set(normalize_host(&h));
            }
            info!(index = %self.name, "index ready");
            Ok(())
        })
    }

    fn upsert<'a>(&'a self, entries: Vec<IndexEntry>) -> IndexFuture<'a, u64> {
        Box::pin(async move {
            if entries.is_empty() {
                return Ok(0);
            }
            let host = self.data_host().await?;
            let body = UpsertRequest {
                vectors: &entries,
                namespace: &self.cfg.namespace,
            };
            let resp: UpsertResponse = send_json(
                self.http
                    .post(format!("{host}/vectors/upsert"))
                    .json(&body),
            )
            .await?;
            if resp.upserted_count != entries.len() as u64 {
                warn!(
                    sent = entries.len(),
                    acknowledged = resp.upserted_count,
                    "pinecone acknowledged fewer vectors than sent"
                );
            }
            Ok(resp.upserted_count)
        })
    }

    fn query<'a>(&'a self, vector: Vec<f32>, top_k: u64) -> IndexFuture<'a, Vec<RagHit>> {
        Box::pin(async move {
            let host = self.data_host().await?;
            let body = QueryRequest {
                vector: &vector,
                top_k,
                include_metadata: true,
                include_values: false,
                namespace: &self.cfg.namespace,
            };
            let resp: QueryResponse =
                send_json(self.http.post(format!("{host}/query")).json(&body)).await?;
            Ok(resp
                .matches
                .into_iter()
                .map(|m| RagHit::from_metadata(m.id, m.score, m.metadata))
                .collect())
        })
    }
}

/// `describe` returns a bare hostname; tests and proxies may return a full URL.
fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

async fn send_json<T: serde::de::DeserializeOwned>(req: RequestBuilder) -> Result<T, RagError> {
    let resp = check(req.send().await?).await?;
    Ok(resp.json::<T>().await?)
}

async fn check(resp: Response) -> Result<Response, RagError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().to_string();
    let body = resp.text().await.unwrap_or_default();
    let message = if body.chars().count() > SNIPPET_CHARS {
        let mut s: String = body.chars().take(SNIPPET_CHARS).collect();
        s.push('…');
        s
    } else {
        body
    };
    error!(status = status.as_u16(), url = %url, "pinecone request failed");
    Err(RagError::Pinecone {
        status: status.as_u16(),
        url,
        message,
    })
}
