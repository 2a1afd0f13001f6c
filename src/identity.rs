//! Participant identity as issued by the chat server's auth layer.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle for one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnId(pub u64);

/// Durable user id backing a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authenticated participant. Sessions only ever read this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub conn: ConnId,
    pub user: UserId,
    pub name: String,
}

impl Identity {
    pub fn new(conn: ConnId, user: UserId, name: impl Into<String>) -> Self {
        Self {
            conn,
            user,
            name: name.into(),
        }
    }
}
