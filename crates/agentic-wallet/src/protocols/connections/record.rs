//! Persistent state of a connection.

use serde::{Deserialize, Serialize};

use super::invitation::ConnectionInvitationMessage;
use crate::error::{Result, WalletError};
use crate::record::{Record, RecordProps, TagMap};
use crate::validation::{require_non_empty, validate_all, Check, Validation, ValidationError};

/// Type tag of [`ConnectionRecord`].
pub const CONNECTION_RECORD_TYPE: &str = "ConnectionRecord";

/// Tag keys derived from record fields. Custom tags may not use them.
pub const STATE_TAG: &str = "state";
pub const ROLE_TAG: &str = "role";
pub const VERKEY_TAG: &str = "verkey";
pub const THEIR_KEY_TAG: &str = "theirKey";
pub const INVITATION_KEY_TAG: &str = "invitationKey";

const DERIVED_TAGS: &[&str] = &[
    STATE_TAG,
    ROLE_TAG,
    VERKEY_TAG,
    THEIR_KEY_TAG,
    INVITATION_KEY_TAG,
];

/// Where a connection is in the invitation / request / response exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Invited,
    Requested,
    Responded,
    Complete,
}

impl ConnectionState {
    /// Return a stable string tag.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Invited => "invited",
            Self::Requested => "requested",
            Self::Responded => "responded",
            Self::Complete => "complete",
        }
    }

    /// Inverse of [`as_tag`](Self::as_tag).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "invited" => Some(Self::Invited),
            "requested" => Some(Self::Requested),
            "responded" => Some(Self::Responded),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }
}

/// Which side of the exchange this agent is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionRole {
    Inviter,
    Invitee,
}

impl ConnectionRole {
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Inviter => "inviter",
            Self::Invitee => "invitee",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "inviter" => Some(Self::Inviter),
            "invitee" => Some(Self::Invitee),
            _ => None,
        }
    }
}

/// A connection with another agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub id: String,
    /// Creation time, microseconds since Unix epoch.
    pub created_at: u64,
    pub state: ConnectionState,
    pub role: ConnectionRole,
    /// Our DID for this connection.
    pub did: String,
    /// Our verkey for this connection.
    pub verkey: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub their_did: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub their_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invitation: Option<ConnectionInvitationMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Caller-defined tags.
    #[serde(default)]
    pub tags: TagMap,
}

const CHECKS: &[Check<ConnectionRecord>] = &[
    check_did,
    check_verkey,
    check_custom_tags,
    check_invitation,
];

impl ConnectionRecord {
    pub fn new(
        id: impl Into<String>,
        role: ConnectionRole,
        state: ConnectionState,
        did: impl Into<String>,
        verkey: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            created_at: crate::time::now_micros(),
            state,
            role,
            did: did.into(),
            verkey: verkey.into(),
            their_did: None,
            their_key: None,
            invitation: None,
            alias: None,
            tags: TagMap::new(),
        }
    }

    /// Factory registered for [`CONNECTION_RECORD_TYPE`].
    pub fn from_props(mut props: RecordProps) -> Result<Self> {
        if props.record_type != CONNECTION_RECORD_TYPE {
            return Err(WalletError::Decode {
                record_type: props.record_type,
                reason: format!("expected {CONNECTION_RECORD_TYPE}"),
            });
        }
        for tag in DERIVED_TAGS {
            props.tags.remove(*tag);
        }
        props.into_typed()
    }

    /// Recipient key of the invitation this connection came from, if inline.
    pub fn invitation_key(&self) -> Option<&str> {
        self.invitation
            .as_ref()
            .and_then(|inv| inv.recipient_keys.as_ref())
            .and_then(|keys| keys.first())
            .map(String::as_str)
    }
}

impl Record for ConnectionRecord {
    fn record_type(&self) -> &str {
        CONNECTION_RECORD_TYPE
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn tags(&self) -> TagMap {
        let mut tags = self.tags.clone();
        tags.insert(STATE_TAG.to_string(), self.state.as_tag().to_string());
        tags.insert(ROLE_TAG.to_string(), self.role.as_tag().to_string());
        tags.insert(VERKEY_TAG.to_string(), self.verkey.clone());
        if let Some(key) = &self.their_key {
            tags.insert(THEIR_KEY_TAG.to_string(), key.clone());
        }
        if let Some(key) = self.invitation_key() {
            tags.insert(INVITATION_KEY_TAG.to_string(), key.to_string());
        }
        tags
    }

    fn to_props(&self) -> Result<RecordProps> {
        check_custom_tags(self)?;
        RecordProps::from_serializable(CONNECTION_RECORD_TYPE, self)
    }

    fn validate(&self) -> Result<()> {
        validate_all(self, CHECKS)?;
        Ok(())
    }
}

fn check_did(r: &ConnectionRecord) -> Validation {
    require_non_empty("did", &r.did)
}

fn check_verkey(r: &ConnectionRecord) -> Validation {
    require_non_empty("verkey", &r.verkey)
}

fn check_custom_tags(r: &ConnectionRecord) -> Validation {
    match DERIVED_TAGS.iter().find(|tag| r.tags.contains_key(**tag)) {
        Some(tag) => Err(ValidationError::new(
            format!("tags.{tag}"),
            "reserved for a tag derived from the record",
        )),
        None => Ok(()),
    }
}

fn check_invitation(r: &ConnectionRecord) -> Validation {
    match &r.invitation {
        Some(invitation) => invitation.validate(),
        None => Ok(()),
    }
}
