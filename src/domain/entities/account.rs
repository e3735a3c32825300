//! Account entity: link owners and referral requesters.

use chrono::{DateTime, Utc};

/// A registered account.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub username: String,
    /// Shown in referrer distributions instead of the raw link id.
    pub display_name: String,
    /// Argon2 PHC string; verified on suspend/delete re-authentication.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Input data for registering a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub display_name: String,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_construction() {
        let account = Account {
            id: 1,
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
            password_hash: "$argon2id$...".to_string(),
            created_at: Utc::now(),
        };

        assert_eq!(account.username, "alice");
    }
}
