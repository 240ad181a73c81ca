//! Connection invitation message.
//!
//! An invitation names the inviter by `label` and tells the invitee how to
//! reach it: either a public `did`, or inline `recipientKeys` plus a
//! `serviceEndpoint` (and optional `routingKeys`). Never both.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WalletError};
use crate::message::{generate_id, Message};
use crate::validation::{
    require_each_non_empty, require_equals, require_non_empty, require_present, validate_all,
    Check, Validation, ValidationError,
};

/// `@type` of a connection invitation.
pub const INVITATION_TYPE: &str = "did:sov:BzCbsNYhMrjHiqZDTUASHg;spec/connections/1.0/invitation";

/// Message inviting another agent to create a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInvitationMessage {
    #[serde(rename = "@type")]
    pub message_type: String,
    #[serde(rename = "@id")]
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_keys: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_keys: Option<Vec<String>>,
}

const CHECKS: &[Check<ConnectionInvitationMessage>] = &[
    check_type,
    check_label,
    check_target_exclusive,
    check_did,
    check_inline,
];

impl ConnectionInvitationMessage {
    /// Invitation pointing at a public DID.
    pub fn with_did(label: impl Into<String>, did: impl Into<String>) -> Self {
        Self {
            message_type: INVITATION_TYPE.to_string(),
            id: generate_id(),
            label: label.into(),
            did: Some(did.into()),
            recipient_keys: None,
            service_endpoint: None,
            routing_keys: None,
        }
    }

    /// Invitation carrying keys and endpoint inline.
    pub fn inline(
        label: impl Into<String>,
        recipient_keys: Vec<String>,
        service_endpoint: impl Into<String>,
        routing_keys: Option<Vec<String>>,
    ) -> Self {
        Self {
            message_type: INVITATION_TYPE.to_string(),
            id: generate_id(),
            label: label.into(),
            did: None,
            recipient_keys: Some(recipient_keys),
            service_endpoint: Some(service_endpoint.into()),
            routing_keys,
        }
    }

    /// Replace the generated id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn is_did_invitation(&self) -> bool {
        self.did.is_some()
    }

    pub fn validate(&self) -> Validation {
        validate_all(self, CHECKS)
    }

    /// Validate and convert into a wire message.
    pub fn to_message(&self) -> Result<Message> {
        self.validate()?;
        let value =
            serde_json::to_value(self).map_err(|e| WalletError::SerializationError(e.to_string()))?;
        Message::from_value(value)
    }

    /// Parse and validate a wire message.
    pub fn from_message(message: &Message) -> Result<Self> {
        let invitation: Self = serde_json::from_value(message.clone().into_value())
            .map_err(|e| WalletError::InvalidMessage(format!("invitation {}: {e}", message.id())))?;
        invitation.validate()?;
        Ok(invitation)
    }
}

fn check_type(m: &ConnectionInvitationMessage) -> Validation {
    require_equals("@type", &m.message_type, INVITATION_TYPE)
}

fn check_label(m: &ConnectionInvitationMessage) -> Validation {
    require_non_empty("label", &m.label)
}

fn check_target_exclusive(m: &ConnectionInvitationMessage) -> Validation {
    let has_inline =
        m.recipient_keys.is_some() || m.routing_keys.is_some() || m.service_endpoint.is_some();
    if m.did.is_some() && has_inline {
        return Err(ValidationError::new(
            "did",
            "either the did or the recipientKeys/serviceEndpoint/routingKeys must be set, not both",
        ));
    }
    Ok(())
}

fn check_did(m: &ConnectionInvitationMessage) -> Validation {
    let required = m.recipient_keys.is_none();
    require_present("did", m.did.as_ref(), required)?;
    match &m.did {
        Some(did) => require_non_empty("did", did),
        None => Ok(()),
    }
}

fn check_inline(m: &ConnectionInvitationMessage) -> Validation {
    if m.did.is_some() {
        return Ok(());
    }
    require_present("recipientKeys", m.recipient_keys.as_ref(), true)?;
    require_present("serviceEndpoint", m.service_endpoint.as_ref(), true)?;

    if let Some(keys) = &m.recipient_keys {
        if keys.is_empty() {
            return Err(ValidationError::new("recipientKeys", "must not be empty"));
        }
        require_each_non_empty("recipientKeys", keys)?;
    }
    if let Some(endpoint) = &m.service_endpoint {
        require_non_empty("serviceEndpoint", endpoint)?;
    }
    if let Some(keys) = &m.routing_keys {
        require_each_non_empty("routingKeys", keys)?;
    }
    Ok(())
}
