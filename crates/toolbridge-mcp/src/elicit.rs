//! Elicitation: asking the connected user for structured input mid-call.
//!
//! Tools receive an [`ElicitInput`] through their [`crate::ToolContext`].
//! The server's [`PeerElicitor`] forwards requests to whichever MCP client
//! most recently made a request; before any request has arrived it fails
//! with [`ElicitError::NotConnected`].

use async_trait::async_trait;
use rmcp::model::ServerRequest;
use rmcp::service::Peer;
use rmcp::RoleServer;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;

/// A request for user input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElicitRequest {
    /// Prompt shown to the user
    pub message: String,
    /// Flat JSON object schema describing the requested fields
    pub requested_schema: Value,
}

impl ElicitRequest {
    /// Create a request.
    pub fn new(message: impl Into<String>, requested_schema: Value) -> Self {
        Self {
            message: message.into(),
            requested_schema,
        }
    }
}

/// Per-request options.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElicitOptions {
    /// Give up after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// What the user did with the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElicitAction {
    /// Submitted the form
    Accept,
    /// Explicitly refused
    Decline,
    /// Dismissed without choosing
    Cancel,
}

/// The user's answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElicitResponse {
    /// Chosen action
    pub action: ElicitAction,
    /// Submitted values, present when accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

/// Elicitation failures.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ElicitError {
    /// No MCP client has connected yet.
    #[error("No client is connected to receive the elicitation request")]
    NotConnected,

    /// The client did not answer in time.
    #[error("Elicitation timed out after {0:?}")]
    Timeout(Duration),

    /// The request could not be built.
    #[error("Invalid elicitation request: {0}")]
    InvalidRequest(String),

    /// The client answered with an error or something unexpected.
    #[error("Elicitation failed: {0}")]
    Protocol(String),
}

/// Something that can ask the user for input.
#[async_trait]
pub trait ElicitInput: Send + Sync {
    /// Send `request` and wait for the answer.
    async fn elicit(
        &self,
        request: ElicitRequest,
        options: ElicitOptions,
    ) -> Result<ElicitResponse, ElicitError>;
}

/// Elicitor that is never connected.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisconnectedElicitor;

#[async_trait]
impl ElicitInput for DisconnectedElicitor {
    async fn elicit(
        &self,
        _request: ElicitRequest,
        _options: ElicitOptions,
    ) -> Result<ElicitResponse, ElicitError> {
        Err(ElicitError::NotConnected)
    }
}

/// Forwards elicitation requests to the connected MCP client.
///
/// Clones share the same peer slot, so the server can hand a clone to
/// every tool up front and fill the slot in once a client connects.
#[derive(Clone, Default)]
pub struct PeerElicitor {
    peer: Arc<RwLock<Option<Peer<RoleServer>>>>,
}

impl PeerElicitor {
    /// Create an unconnected elicitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the peer requests should go to. The latest peer wins.
    pub fn set_peer(&self, peer: Peer<RoleServer>) {
        match self.peer.write() {
            Ok(mut slot) => *slot = Some(peer),
            Err(poisoned) => *poisoned.into_inner() = Some(peer),
        }
    }

    /// Returns `true` once a peer has been recorded.
    pub fn is_connected(&self) -> bool {
        self.current_peer().is_some()
    }

    fn current_peer(&self) -> Option<Peer<RoleServer>> {
        match self.peer.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl std::fmt::Debug for PeerElicitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerElicitor")
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[async_trait]
impl ElicitInput for PeerElicitor {
    async fn elicit(
        &self,
        request: ElicitRequest,
        options: ElicitOptions,
    ) -> Result<ElicitResponse, ElicitError> {
        let peer = self.current_peer().ok_or(ElicitError::NotConnected)?;

        let server_request: ServerRequest = serde_json::from_value(json!({
            "method": "elicitation/create",
            "params": {
                "message": request.message,
                "requestedSchema": request.requested_schema,
            }
        }))
        .map_err(|e| ElicitError::InvalidRequest(e.to_string()))?;

        tracing::debug!("Forwarding elicitation request to client");
        let pending = peer.send_request(server_request);
        let result = match options.timeout {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| ElicitError::Timeout(limit))?,
            None => pending.await,
        }
        .map_err(|e| ElicitError::Protocol(e.to_string()))?;

        let value = serde_json::to_value(&result).map_err(|e| ElicitError::Protocol(e.to_string()))?;
        serde_json::from_value(value).map_err(|e| ElicitError::Protocol(e.to_string()))
    }
}
