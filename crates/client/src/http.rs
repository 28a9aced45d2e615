use async_trait::async_trait;
use chainbeacon_types::{BeaconRecord, ChainInfo, Round};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::transport::Transport;

/// Wire format for `GET /{beacon}/public/{round}` (spec §6). `randomness`
/// is accepted but never trusted; callers recompute `sha256(signature)`.
#[derive(Serialize, Deserialize)]
struct RecordJson {
    round: u64,
    #[serde(default)]
    randomness: String,
    #[serde(with = "hex::serde")]
    signature: Vec<u8>,
    #[serde(with = "hex::serde")]
    previous_signature: Vec<u8>,
}

impl From<RecordJson> for BeaconRecord {
    fn from(json: RecordJson) -> Self {
        BeaconRecord { round: Round(json.round), previous_signature: json.previous_signature, signature: json.signature }
    }
}

/// HTTP relay transport (spec §6, grounded on the GET-based poll pattern
/// of a drand HTTP client: no persistent connection, one request per
/// `get`/`info` call).
pub struct HttpTransport {
    base_url: String,
    beacon_name: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, beacon_name: impl Into<String>) -> Self {
        HttpTransport { base_url: base_url.into(), beacon_name: beacon_name.into(), client: reqwest::Client::new() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url.trim_end_matches('/'), self.beacon_name, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, round: Round) -> Result<BeaconRecord, ClientError> {
        let path = if round.is_genesis() { "public/latest".to_string() } else { format!("public/{}", round.0) };
        let resp = self.client.get(self.url(&path)).send().await.map_err(|e| ClientError::Transport(e.to_string()))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(round));
        }
        let resp = resp.error_for_status().map_err(|e| ClientError::Transport(e.to_string()))?;
        let json: RecordJson = resp.json().await.map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(json.into())
    }

    async fn info(&self) -> Result<ChainInfo, ClientError> {
        let resp = self
            .client
            .get(self.url("info"))
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        resp.json().await.map_err(|e| ClientError::Transport(e.to_string()))
    }

    fn name(&self) -> &str {
        &self.base_url
    }
}
