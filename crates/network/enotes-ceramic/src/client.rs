use crate::error::DocumentError;
use crate::genesis::Genesis;
use crate::network::DocumentNetwork;
use anyhow::Context;
use async_trait::async_trait;
use enotes_identity::{AuthProof, Challenge, ChallengeEndpoint, Did, Session, StreamLoader};
use enotes_types::{CommitId, StreamId};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_CERAMIC_URL: &str = "http://localhost:7007";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const STREAMS_PATH: &str = "/api/v0/streams";
const CHALLENGE_PATH: &str = "/api/v0/auth/challenge";
const VERIFY_PATH: &str = "/api/v0/auth/verify";

/// Ceramic stream type code for tile documents.
const TILE_STREAM_TYPE: u8 = 0;

#[derive(Serialize)]
struct CreateStreamRequest<'a> {
    #[serde(rename = "type")]
    stream_type: u8,
    genesis: &'a Genesis,
    signature: String,
    opts: CreateOpts,
}

#[derive(Serialize)]
struct CreateOpts {
    anchor: bool,
    publish: bool,
}

#[derive(Serialize)]
struct ChallengeRequest<'a> {
    did: &'a Did,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamResponse {
    stream_id: String,
    state: StreamState,
}

#[derive(Debug, Deserialize)]
struct StreamState {
    #[serde(default)]
    content: Value,
    #[serde(default)]
    log: Vec<LogEntry>,
}

#[derive(Debug, Deserialize)]
struct LogEntry {
    cid: String,
}

/// HTTP client for a single Ceramic node.
#[derive(Debug, Clone)]
pub struct HttpCeramicClient {
    client: Client,
    base_url: String,
}

impl HttpCeramicClient {
    /// Every request is bounded by `timeout`; expiry surfaces as a network error.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DocumentError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DocumentError::Network {
                url: base_url.clone(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Response, DocumentError> {
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| network_error(url, e))?;
        check_status(url, resp).await
    }

    async fn get(&self, url: &str) -> Result<Response, DocumentError> {
        let resp = self.client.get(url).send().await.map_err(|e| network_error(url, e))?;
        check_status(url, resp).await
    }

    /// Sign and submit a genesis commit, returning the new stream id and the
    /// genesis commit it was created from.
    async fn create_stream(&self, session: &Session, genesis: &Genesis) -> Result<CommitId, DocumentError> {
        let signature = session.sign(&genesis.signing_bytes()?)?;
        let url = self.url(STREAMS_PATH);

        tracing::debug!(url = %url, controller = %session.did(), "creating stream");

        let request = CreateStreamRequest {
            stream_type: TILE_STREAM_TYPE,
            genesis,
            signature,
            opts: CreateOpts {
                anchor: true,
                publish: true,
            },
        };
        let resp = self.send_json(&url, &request).await?;
        let status = resp.status();
        let body: StreamResponse = decode_json(&url, resp).await?;

        let rejected = |reason: String| DocumentError::Rejected {
            url: url.clone(),
            status: status.as_u16(),
            reason,
        };
        let stream: StreamId = body
            .stream_id
            .parse()
            .map_err(|e| rejected(format!("invalid streamId in response: {}", e)))?;
        let genesis_cid = body
            .state
            .log
            .first()
            .ok_or_else(|| rejected("response carries no genesis commit".into()))?;
        let commit = stream
            .at_commit(genesis_cid.cid.clone())
            .map_err(|e| rejected(format!("invalid commit cid in response: {}", e)))?;

        tracing::info!(stream = %commit.stream(), commit = %commit.version(), "stream created");
        Ok(commit)
    }
}

fn network_error(url: &str, err: reqwest::Error) -> DocumentError {
    let reason = if err.is_timeout() {
        format!("request timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    };
    DocumentError::Network {
        url: url.to_string(),
        reason,
    }
}

/// Whether a re-run may succeed once the node recovers.
fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

/// 5xx, 408 and 429 count as transient network trouble, other non-2xx as
/// rejection.
async fn check_status(url: &str, resp: Response) -> Result<Response, DocumentError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read response>".to_string());
    tracing::error!(url = %url, status = %status, "document network request failed: {}", body);

    if is_transient_status(status) {
        Err(DocumentError::Network {
            url: url.to_string(),
            reason: format!("HTTP {} - {}", status, body),
        })
    } else {
        Err(DocumentError::Rejected {
            url: url.to_string(),
            status: status.as_u16(),
            reason: body,
        })
    }
}

async fn decode_json<T: DeserializeOwned>(url: &str, resp: Response) -> Result<T, DocumentError> {
    let status: StatusCode = resp.status();
    let bytes = resp.bytes().await.map_err(|e| network_error(url, e))?;
    serde_json::from_slice(&bytes).map_err(|e| DocumentError::Rejected {
        url: url.to_string(),
        status: status.as_u16(),
        reason: format!("malformed response body: {}", e),
    })
}

#[async_trait]
impl DocumentNetwork for HttpCeramicClient {
    async fn create_immutable(&self, session: &Session, genesis: &Genesis) -> Result<CommitId, DocumentError> {
        self.create_stream(session, genesis).await
    }

    async fn create_mutable(&self, session: &Session, genesis: &Genesis) -> Result<StreamId, DocumentError> {
        Ok(self.create_stream(session, genesis).await?.stream().clone())
    }
}

#[async_trait]
impl StreamLoader for HttpCeramicClient {
    async fn load_content(&self, stream_id: &str) -> anyhow::Result<Value> {
        let url = format!("{}/{}", self.url(STREAMS_PATH), stream_id);
        tracing::debug!(url = %url, "loading stream");
        let resp = self.get(&url).await?;
        let body: StreamResponse = decode_json(&url, resp)
            .await
            .with_context(|| format!("failed to load stream {}", stream_id))?;
        Ok(body.state.content)
    }
}

#[async_trait]
impl ChallengeEndpoint for HttpCeramicClient {
    async fn request_challenge(&self, did: &Did) -> anyhow::Result<Challenge> {
        let url = self.url(CHALLENGE_PATH);
        let resp = self.send_json(&url, &ChallengeRequest { did }).await?;
        Ok(decode_json(&url, resp).await?)
    }

    async fn submit_proof(&self, proof: &AuthProof) -> anyhow::Result<()> {
        let url = self.url(VERIFY_PATH);
        self.send_json(&url, proof).await?;
        Ok(())
    }
}
