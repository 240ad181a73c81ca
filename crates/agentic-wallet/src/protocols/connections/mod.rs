//! Connections protocol: invitation and response messages, and the record
//! tracking each connection.

pub mod invitation;
pub mod record;
pub mod response;

pub use invitation::{ConnectionInvitationMessage, INVITATION_TYPE};
pub use record::{ConnectionRecord, ConnectionRole, ConnectionState, CONNECTION_RECORD_TYPE};
pub use response::{Connection, ConnectionResponseMessage, CONNECTION_FIELD, RESPONSE_TYPE};
