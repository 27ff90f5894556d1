use serde::{Deserialize, Serialize};

/// Identity persisted in the authenticated session by the identity service.
///
/// The role is kept as the raw stored name. It is parsed, and rejected when
/// unknown, at the point where a request context is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    user_id: i64,
    username: String,
    role: String,
}

impl SessionIdentity {
    /// Creates a session identity from verified login data.
    #[must_use]
    pub fn new(user_id: i64, username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            role: role.into(),
        }
    }

    /// Returns the numeric user id from the users table.
    #[must_use]
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Returns the login name.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Returns the stored role name.
    #[must_use]
    pub fn role(&self) -> &str {
        self.role.as_str()
    }
}
