//! Identity provider backed by a static users file.
//!
//! ```yaml
//! users:
//!   - id: user-1
//!     account_id: acct-1
//!     full_name: Alice Example
//!     email: alice@example.com
//!     sessions: [alice-dev-token]
//! ```

use super::{IdentityError, IdentityProvider, SessionToken};
use crate::models::UserRecord;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use storeit_types::EmailAddress;

#[derive(Debug, Deserialize)]
struct UsersFile {
    #[serde(default)]
    users: Vec<UserEntry>,
}

#[derive(Debug, Deserialize)]
struct UserEntry {
    id: String,
    account_id: String,
    full_name: String,
    email: EmailAddress,
    #[serde(default)]
    sessions: Vec<String>,
}

#[derive(Debug, Default, Clone)]
pub struct StaticIdentityProvider {
    sessions: HashMap<String, UserRecord>,
}

impl StaticIdentityProvider {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, IdentityError> {
        let file: UsersFile = serde_yaml::from_str(yaml).map_err(IdentityError::Parse)?;
        let mut sessions = HashMap::new();
        for entry in file.users {
            let user = UserRecord {
                id: entry.id,
                account_id: entry.account_id,
                full_name: entry.full_name,
                email: entry.email,
            };
            for token in entry.sessions {
                sessions.insert(token, user.clone());
            }
        }
        Ok(Self { sessions })
    }

    /// Loads users from `path`. A missing file yields a provider that knows no sessions.
    pub fn load(path: &Path) -> Result<Self, IdentityError> {
        match std::fs::read_to_string(path) {
            Ok(yaml) => Self::from_yaml_str(&yaml),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "users file not found; no session will authenticate");
                Ok(Self::default())
            }
            Err(e) => Err(IdentityError::Read(e)),
        }
    }

    /// Registers a session for `user`.
    pub fn with_session(mut self, token: impl Into<String>, user: UserRecord) -> Self {
        self.sessions.insert(token.into(), user);
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current_user(&self, session: &SessionToken) -> Result<Option<UserRecord>, IdentityError> {
        Ok(self.sessions.get(session.as_str()).cloned())
    }
}
