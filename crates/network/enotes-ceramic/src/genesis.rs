use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use enotes_identity::Did;
use enotes_types::CommitId;
use rand::RngCore;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenesisHeader {
    pub controllers: Vec<Did>,
    /// Commit URL of a schema the content must conform to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Random nonce; absent for deterministic documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<String>,
}

/// First commit of a new stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Genesis {
    pub header: GenesisHeader,
    pub data: Value,
}

impl Genesis {
    /// Same controller and data always yield the same genesis, and hence the
    /// same stream on the network.
    pub fn deterministic(controller: &Did, data: Value) -> Self {
        Self {
            header: GenesisHeader {
                controllers: vec![controller.clone()],
                schema: None,
                unique: None,
            },
            data,
        }
    }

    /// A fresh stream on every call.
    pub fn unique(controller: &Did, data: Value) -> Self {
        let mut nonce = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut nonce);
        let mut genesis = Self::deterministic(controller, data);
        genesis.header.unique = Some(URL_SAFE_NO_PAD.encode(nonce));
        genesis
    }

    pub fn with_schema(mut self, schema: &CommitId) -> Self {
        self.header.schema = Some(schema.to_url());
        self
    }

    /// Bytes covered by the controller's signature.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn controller() -> Did {
        "did:3:kjzl6cwe1jw147".parse().unwrap()
    }

    #[test]
    fn deterministic_genesis_is_stable() {
        let a = Genesis::deterministic(&controller(), json!({"title": "X"}));
        let b = Genesis::deterministic(&controller(), json!({"title": "X"}));
        assert_eq!(a.signing_bytes().unwrap(), b.signing_bytes().unwrap());
        assert_eq!(
            serde_json::to_value(&a).unwrap(),
            json!({"header": {"controllers": ["did:3:kjzl6cwe1jw147"]}, "data": {"title": "X"}})
        );
    }

    #[test]
    fn unique_genesis_differs_per_call() {
        let a = Genesis::unique(&controller(), json!({}));
        let b = Genesis::unique(&controller(), json!({}));
        assert!(a.header.unique.is_some());
        assert_ne!(a.header.unique, b.header.unique);
    }

    #[test]
    fn schema_is_recorded_as_commit_url() {
        let commit: CommitId = "AAA?version=1".parse().unwrap();
        let genesis = Genesis::deterministic(&controller(), json!({})).with_schema(&commit);
        assert_eq!(genesis.header.schema.as_deref(), Some("ceramic://AAA?version=1"));
    }
}
