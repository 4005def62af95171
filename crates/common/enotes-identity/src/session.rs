use crate::did::Did;
use crate::provider::SigningCapability;
use crate::resolver::Resolver;
use async_trait::async_trait;
use enotes_crypto::{verify_detached_jws, JwsError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Lifecycle of a [`Session`]. Both transitions out of `Unauthenticated` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    Failed,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("session is not authenticated (state: {0:?})")]
    NotAuthenticated(SessionState),

    #[error("failed to sign payload: {0}")]
    Signing(#[from] JwsError),
}

/// Nonce issued by the remote party for a proof of control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub nonce: String,
    pub aud: String,
}

/// Bytes signed in answer to a [`Challenge`].
#[derive(Debug, Serialize)]
struct ChallengeResponse<'a> {
    did: &'a Did,
    nonce: &'a str,
    aud: &'a str,
}

/// Signed answer to a challenge. `payload` is the exact JSON that was signed.
#[derive(Debug, Clone, Serialize)]
pub struct AuthProof {
    pub did: Did,
    pub nonce: String,
    pub payload: String,
    pub jws: String,
}

/// Remote party able to verify that we control a DID.
#[async_trait]
pub trait ChallengeEndpoint: Send + Sync {
    async fn request_challenge(&self, did: &Did) -> anyhow::Result<Challenge>;

    async fn submit_proof(&self, proof: &AuthProof) -> anyhow::Result<()>;
}

/// Binds a signing capability, its DID and a resolver.
///
/// Writes to the document network must go through [`Session::sign`], which
/// only works once [`Session::authenticate`] has succeeded.
#[derive(Debug)]
pub struct Session {
    capability: SigningCapability,
    resolver: Arc<Resolver>,
    state: SessionState,
}

impl Session {
    pub fn new(capability: SigningCapability, resolver: Arc<Resolver>) -> Self {
        Self {
            capability,
            resolver,
            state: SessionState::Unauthenticated,
        }
    }

    pub fn did(&self) -> &Did {
        self.capability.did()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Run the challenge/response exchange with `endpoint`.
    ///
    /// On failure the session is left in [`SessionState::Failed`]; build a new
    /// session to try again.
    pub async fn authenticate(&mut self, endpoint: &dyn ChallengeEndpoint) -> Result<(), SessionError> {
        match self.state {
            SessionState::Unauthenticated => {}
            SessionState::Authenticated => {
                return Err(SessionError::Authentication("session is already authenticated".into()))
            }
            SessionState::Failed => {
                return Err(SessionError::Authentication("session has already failed".into()))
            }
        }

        match self.prove_control(endpoint).await {
            Ok(()) => {
                self.state = SessionState::Authenticated;
                tracing::info!(did = %self.did(), "session authenticated");
                Ok(())
            }
            Err(reason) => {
                self.state = SessionState::Failed;
                tracing::warn!(did = %self.did(), "authentication failed: {}", reason);
                Err(SessionError::Authentication(reason))
            }
        }
    }

    async fn prove_control(&self, endpoint: &dyn ChallengeEndpoint) -> Result<(), String> {
        let did = self.did();

        let material = self
            .resolver
            .resolve(did)
            .await
            .map_err(|e| format!("identifier unresolvable: {}", e))?;

        let challenge = endpoint
            .request_challenge(did)
            .await
            .map_err(|e| format!("challenge request failed: {:#}", e))?;

        let payload = serde_json::to_string(&ChallengeResponse {
            did,
            nonce: &challenge.nonce,
            aud: &challenge.aud,
        })
        .map_err(|e| e.to_string())?;

        let jws = self
            .capability
            .sign_jws(payload.as_bytes())
            .map_err(|e| e.to_string())?;

        // The resolved material must agree with the key we sign with.
        if !material
            .keys
            .iter()
            .any(|key| verify_detached_jws(payload.as_bytes(), &jws, key).is_ok())
        {
            return Err(format!("no verification key of {} accepts our signature", did));
        }

        let proof = AuthProof {
            did: did.clone(),
            nonce: challenge.nonce,
            payload,
            jws,
        };
        endpoint
            .submit_proof(&proof)
            .await
            .map_err(|e| format!("proof rejected: {:#}", e))
    }

    /// Sign a write payload. Calling this before authentication is a
    /// programming error and fails with [`SessionError::NotAuthenticated`].
    pub fn sign(&self, payload: &[u8]) -> Result<String, SessionError> {
        if !self.is_authenticated() {
            return Err(SessionError::NotAuthenticated(self.state));
        }
        Ok(self.capability.sign_jws(payload)?)
    }
}
