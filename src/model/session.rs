use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side binding of an opaque bearer token to a user.
#[derive(Debug, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}
