use serde::{Deserialize, Serialize};

/// Acting user forwarded by the upstream gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorIdentity {
    subject: String,
    role_name: String,
}

impl ActorIdentity {
    /// Creates an actor identity from gateway-supplied data.
    #[must_use]
    pub fn new(subject: impl Into<String>, role_name: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            role_name: role_name.into(),
        }
    }

    /// Returns the stable subject of the acting user.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the role name the acting user currently holds.
    #[must_use]
    pub fn role_name(&self) -> &str {
        self.role_name.as_str()
    }
}
