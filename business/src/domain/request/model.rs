use chrono::{DateTime, Utc};

use crate::domain::shared::value_objects::RequestId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Login,
    Logout,
    ListAccounts,
    Scan,
    Orders,
    Remove,
    Flush,
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestKind::Login => write!(f, "login"),
            RequestKind::Logout => write!(f, "logout"),
            RequestKind::ListAccounts => write!(f, "accounts"),
            RequestKind::Scan => write!(f, "scan"),
            RequestKind::Orders => write!(f, "orders"),
            RequestKind::Remove => write!(f, "remove"),
            RequestKind::Flush => write!(f, "flush"),
        }
    }
}

/// An in-flight caller request, alive between registration and its terminal event.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub kind: RequestKind,
    pub open_event_count: usize,
    pub opened_at: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(request_id: RequestId, kind: RequestKind) -> Self {
        Self {
            request_id,
            kind,
            open_event_count: 0,
            opened_at: Utc::now(),
        }
    }
}

/// How a request ends. Maps one to one onto the terminal event.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    Complete,
    Error(String),
}
