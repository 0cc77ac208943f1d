// common/src/models/user.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Record;

/// Persisted user account. The plaintext password never reaches this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub mail: String,
    pub password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chatbot_api_key: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(input: NewUser, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            name: input.name,
            mail: input.mail,
            password_hash,
            chatbot_api_key: input.chatbot_api_key,
            updated_at: now,
            created_at: now,
        }
    }

    /// Replace the editable fields, keeping the creation time
    pub fn apply(&mut self, input: NewUser, password_hash: String, now: DateTime<Utc>) {
        self.name = input.name;
        self.mail = input.mail;
        self.password_hash = password_hash;
        self.chatbot_api_key = input.chatbot_api_key;
        self.updated_at = now;
    }
}

/// Body of user creation and full user updates
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub mail: String,
    pub password: String,
    #[serde(default)]
    pub chatbot_api_key: Option<String>,
}

/// Body of a login attempt
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub mail: String,
    pub password: String,
}

/// Public listing entry; omits every secret
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub mail: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Record<User>> for UserSummary {
    fn from(record: &Record<User>) -> Self {
        Self {
            id: record.id.clone(),
            name: record.doc.name.clone(),
            mail: record.doc.mail.clone(),
            created_at: record.doc.created_at,
            updated_at: record.doc.updated_at,
        }
    }
}

/// The authenticated user's own view of their account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub summary: UserSummary,
    pub chatbot_api_key: Option<String>,
}

impl From<&Record<User>> for UserProfile {
    fn from(record: &Record<User>) -> Self {
        Self {
            summary: UserSummary::from(record),
            chatbot_api_key: record.doc.chatbot_api_key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn input(name: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            mail: format!("{}@example.com", name),
            password: "pw".to_string(),
            chatbot_api_key: None,
        }
    }

    #[test]
    fn apply_keeps_created_at() {
        let created = Utc::now() - Duration::days(1);
        let mut user = User::new(input("ada"), "hash1".to_string(), created);

        let later = Utc::now();
        user.apply(input("grace"), "hash2".to_string(), later);

        assert_eq!(user.name, "grace");
        assert_eq!(user.password_hash, "hash2");
        assert_eq!(user.created_at, created);
        assert_eq!(user.updated_at, later);
    }

    #[test]
    fn summary_never_serializes_secrets() {
        let record = Record {
            id: "1".to_string(),
            doc: User::new(
                NewUser { chatbot_api_key: Some("sk-123".to_string()), ..input("ada") },
                "hash".to_string(),
                Utc::now(),
            ),
        };

        let json = serde_json::to_value(UserSummary::from(&record)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("chatbot_api_key").is_none());
        assert_eq!(json["id"], "1");

        let profile = serde_json::to_value(UserProfile::from(&record)).unwrap();
        assert_eq!(profile["chatbot_api_key"], "sk-123");
        assert_eq!(profile["mail"], "ada@example.com");
    }
}
