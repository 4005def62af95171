#![allow(dead_code)]

use anyhow::anyhow;
use async_trait::async_trait;
use enotes_bootstrap::{ConfigWriter, FileConfigWriter, PersistenceError};
use enotes_ceramic::{DocumentError, DocumentNetwork, Genesis};
use enotes_crypto::{decode_header, verify_detached_jws};
use enotes_identity::{AuthProof, Challenge, ChallengeEndpoint, Did, Session};
use enotes_types::{BootstrapConfigRecord, CommitId, StreamId};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const VERSION: &str = "1";
pub const DEFINITION_ID: &str = "CCC";

#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Network,
    Rejected(u16),
}

impl Failure {
    fn into_error(self, title: &str) -> DocumentError {
        let url = format!("memory://streams/{}", title);
        match self {
            Failure::Network => DocumentError::Network {
                url,
                reason: "request timed out".into(),
            },
            Failure::Rejected(status) => DocumentError::Rejected {
                url,
                status,
                reason: format!("{} refused", title),
            },
        }
    }
}

/// In-memory document network with fixed stream ids, injectable delays and
/// failures, and a log of what happened in which order.
#[derive(Default)]
pub struct MemoryNetwork {
    delays: HashMap<String, Duration>,
    failures: HashMap<String, Failure>,
    reject_proofs: bool,
    events: Mutex<Vec<String>>,
    published: Mutex<HashSet<String>>,
    definitions: Mutex<Vec<Genesis>>,
    pub challenge_calls: AtomicUsize,
    pub immutable_calls: AtomicUsize,
    pub mutable_calls: AtomicUsize,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, title: &str, delay: Duration) -> Self {
        self.delays.insert(title.to_string(), delay);
        self
    }

    pub fn with_failure(mut self, title: &str, failure: Failure) -> Self {
        self.failures.insert(title.to_string(), failure);
        self
    }

    pub fn rejecting_proofs(mut self) -> Self {
        self.reject_proofs = true;
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn definitions(&self) -> Vec<Genesis> {
        self.definitions.lock().unwrap().clone()
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn log(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    /// Sign through the session exactly as a real client would, then check
    /// the signature against the key named by its `kid`, which must be a
    /// controller of the genesis.
    fn check_signed(&self, session: &Session, genesis: &Genesis) -> Result<(), DocumentError> {
        let bytes = genesis.signing_bytes()?;
        let jws = session.sign(&bytes)?;
        let unauthorized = |reason: String| DocumentError::Rejected {
            url: "memory://streams".into(),
            status: 401,
            reason,
        };
        let signer = signer_of(&jws).map_err(|e| unauthorized(format!("{:#}", e)))?;
        if !genesis.header.controllers.contains(&signer) {
            return Err(unauthorized(format!("{} is not a controller", signer)));
        }
        let key = signer.ed25519_key().map_err(|e| unauthorized(e.to_string()))?;
        verify_detached_jws(&bytes, &jws, &key).map_err(|e| unauthorized(e.to_string()))
    }
}

/// The DID a detached JWS claims to be signed by.
pub fn signer_of(jws: &str) -> anyhow::Result<Did> {
    let kid = decode_header(jws)?
        .kid
        .ok_or_else(|| anyhow!("JWS header carries no kid"))?;
    Ok(kid.parse::<Did>()?)
}

fn stream_for(title: &str) -> &'static str {
    match title {
        "EncryptedNote" => "AAA",
        "NotesList" => "BBB",
        _ => "ZZZ",
    }
}

#[async_trait]
impl DocumentNetwork for MemoryNetwork {
    async fn create_immutable(&self, session: &Session, genesis: &Genesis) -> Result<CommitId, DocumentError> {
        self.immutable_calls.fetch_add(1, Ordering::SeqCst);
        self.check_signed(session, genesis)?;

        let title = genesis.data["title"].as_str().unwrap_or_default().to_string();
        self.log(format!("start:{}", title));

        if let Some(delay) = self.delays.get(&title) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(failure) = self.failures.get(&title) {
            self.log(format!("failed:{}", title));
            return Err(failure.into_error(&title));
        }

        let stream: StreamId = stream_for(&title).parse().unwrap();
        let commit = stream.at_commit(VERSION).unwrap();
        self.published.lock().unwrap().insert(commit.to_url());
        self.log(format!("end:{}", title));
        Ok(commit)
    }

    async fn create_mutable(&self, session: &Session, genesis: &Genesis) -> Result<StreamId, DocumentError> {
        self.mutable_calls.fetch_add(1, Ordering::SeqCst);
        self.check_signed(session, genesis)?;

        let schema = genesis.data["schema"].as_str().unwrap_or_default();
        if !self.published.lock().unwrap().contains(schema) {
            return Err(DocumentError::Rejected {
                url: "memory://streams".into(),
                status: 422,
                reason: format!("schema {} does not exist", schema),
            });
        }

        self.definitions.lock().unwrap().push(genesis.clone());
        self.log("definition".to_string());
        Ok(DEFINITION_ID.parse().unwrap())
    }
}

#[async_trait]
impl ChallengeEndpoint for MemoryNetwork {
    async fn request_challenge(&self, _did: &Did) -> anyhow::Result<Challenge> {
        self.challenge_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Challenge {
            nonce: "nonce-42".into(),
            aud: "memory://".into(),
        })
    }

    async fn submit_proof(&self, proof: &AuthProof) -> anyhow::Result<()> {
        if self.reject_proofs {
            return Err(anyhow!("HTTP 401: proof refused"));
        }
        let signer = signer_of(&proof.jws)?;
        if signer != proof.did {
            return Err(anyhow!("proof for {} signed by {}", proof.did, signer));
        }
        let key = signer.ed25519_key()?;
        verify_detached_jws(proof.payload.as_bytes(), &proof.jws, &key)?;
        self.log("authenticated".to_string());
        Ok(())
    }
}

/// File writer that counts how often it was asked to write.
#[derive(Default)]
pub struct RecordingWriter {
    pub calls: AtomicUsize,
}

#[async_trait]
impl ConfigWriter for RecordingWriter {
    async fn write(&self, record: &BootstrapConfigRecord, path: &Path) -> Result<(), PersistenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        FileConfigWriter.write(record, path).await
    }
}
