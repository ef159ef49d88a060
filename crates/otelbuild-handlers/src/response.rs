use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MSG_INVALID_METHOD: &str = "Invalid request method";
pub const MSG_INVALID_CONTENT_TYPE: &str = "Invalid content type";
pub const MSG_PROCESSING_FAILED: &str = "Failed to process configuration";
pub const MSG_RECEIVED: &str = "Configuration received";

/// Response envelope returned for every submission.
///
/// `id` is the correlation identifier echoed to the caller on success; on
/// failure paths it stays at the nil UUID and callers must not rely on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub id: Uuid,
}

impl Response {
    pub fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            id: Uuid::nil(),
        }
    }

    pub fn received(id: Uuid) -> Self {
        Self {
            success: true,
            message: MSG_RECEIVED.to_string(),
            id,
        }
    }
}
