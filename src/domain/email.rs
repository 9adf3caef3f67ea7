use serde::{Deserialize, Serialize};

/// Backend message id (the provider's message id, opaque to the client).
pub type EmailId = String;

/// One row of the inbox listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Email {
    pub id: EmailId,
    pub thread_id: String,
    pub message_id: String,
    pub subject: String,
    pub from_address: String,
    pub date: String,
    pub snippet: String,
    pub labels: Vec<String>,
}

impl Email {
    /// Id used for the per-message endpoints; falls back to `id` when the
    /// backend left `message_id` empty.
    pub fn key(&self) -> &str {
        if self.message_id.is_empty() {
            &self.id
        } else {
            &self.message_id
        }
    }
}

/// `GET /emails`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailList {
    #[serde(default)]
    pub emails: Vec<Email>,
    /// Messages the backend moved to Lator Gator while listing.
    #[serde(default)]
    pub moved_count: Option<u32>,
}

/// `GET /emails/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailDetail {
    pub subject: String,
    pub from_address: String,
    pub date: String,
    pub content: String,
}

/// `GET /emails/{id}/analyze`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailAnalysis {
    pub category: String,
    pub topic: String,
    pub sentiment: String,
    pub priority: String,
    pub should_trash: bool,
    pub key_points: Vec<String>,
    pub action_items: Vec<String>,
}

/// `GET /stats`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub total_moved_to_gator: u64,
    pub total_emails_processed: u64,
    pub email: String,
}

/// `POST /emails/{id}/draft-response`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftResponse {
    pub content: String,
}

/// `GET /auth/url`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

/// What a completed sign-in yields, either straight from the redirect
/// (`?token=`) or from `POST /auth/callback`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub expires_in: Option<String>,
}
