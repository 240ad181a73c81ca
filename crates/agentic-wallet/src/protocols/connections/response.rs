//! Connection response message, sent with its `connection` field signed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, WalletError};
use crate::message::{generate_id, Message, SignatureEnvelope};
use crate::validation::{require_equals, require_non_empty, validate_all, Check, Validation};

/// `@type` of a connection response.
pub const RESPONSE_TYPE: &str = "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/connections/1.0/response";

/// The field carrying the responder's DID, signed on the wire.
pub const CONNECTION_FIELD: &str = "connection";

/// DID and DID document of the responder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(rename = "DID")]
    pub did: String,
    #[serde(rename = "DIDDoc", default, skip_serializing_if = "Option::is_none")]
    pub did_doc: Option<Value>,
}

/// Thread decorator linking a response to its request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub thid: String,
}

/// Connection response in open (unsigned) form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionResponseMessage {
    #[serde(rename = "@type")]
    pub message_type: String,
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "~thread")]
    pub thread: Thread,
    pub connection: Connection,
}

const CHECKS: &[Check<ConnectionResponseMessage>] = &[check_type, check_thread, check_did];

impl ConnectionResponseMessage {
    pub fn new(thread_id: impl Into<String>, connection: Connection) -> Self {
        Self {
            message_type: RESPONSE_TYPE.to_string(),
            id: generate_id(),
            thread: Thread {
                thid: thread_id.into(),
            },
            connection,
        }
    }

    pub fn validate(&self) -> Validation {
        validate_all(self, CHECKS)
    }

    pub fn to_message(&self) -> Result<Message> {
        self.validate()?;
        let value =
            serde_json::to_value(self).map_err(|e| WalletError::SerializationError(e.to_string()))?;
        Message::from_value(value)
    }

    pub fn from_message(message: &Message) -> Result<Self> {
        let response: Self = serde_json::from_value(message.clone().into_value())
            .map_err(|e| WalletError::InvalidMessage(format!("response {}: {e}", message.id())))?;
        response.validate()?;
        Ok(response)
    }

    /// Wire form with `connection` replaced by `connection~sig`.
    pub async fn sign(&self, envelope: &SignatureEnvelope, signer: &str) -> Result<Message> {
        envelope
            .sign(&self.to_message()?, CONNECTION_FIELD, signer)
            .await
    }

    /// Verify a signed wire message and parse the opened response.
    pub async fn verify(envelope: &SignatureEnvelope, message: &Message) -> Result<Self> {
        let opened = envelope.verify(message, CONNECTION_FIELD).await?;
        Self::from_message(&opened)
    }
}

fn check_type(m: &ConnectionResponseMessage) -> Validation {
    require_equals("@type", &m.message_type, RESPONSE_TYPE)
}

fn check_thread(m: &ConnectionResponseMessage) -> Validation {
    require_non_empty("~thread.thid", &m.thread.thid)
}

fn check_did(m: &ConnectionResponseMessage) -> Validation {
    require_non_empty("connection.DID", &m.connection.did)
}
