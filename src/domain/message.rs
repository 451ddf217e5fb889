//! Message entity: a rendered, recipient-addressed instance of a
//! notification type. Immutable after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,

    /// Rendered subject
    pub subject: String,

    /// Rendered body
    pub body: String,

    /// Recipient address
    pub email: String,

    pub notification_type: Uuid,

    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(subject: String, body: String, email: String, notification_type: Uuid) -> Self {
        Message {
            id: Uuid::new_v4(),
            subject,
            body,
            email,
            notification_type,
            created_at: Utc::now(),
        }
    }
}

/// Request to compose a message from a notification type.
#[derive(Debug, Deserialize)]
pub struct ComposeMessageRequest {
    pub notification_type: Option<Uuid>,

    #[serde(default)]
    pub email: String,

    /// Arbitrary key-value mapping supplying values for the template's
    /// declared tags. Extra keys are ignored.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl ComposeMessageRequest {
    /// Validate the request, returning the notification type id.
    pub fn validate(&self) -> Result<Uuid, AppError> {
        let notification_type = self.notification_type.ok_or_else(|| {
            AppError::Validation(
                "\"notification_type\" (notification type ID) is required".to_string(),
            )
        })?;
        if self.email.trim().is_empty() {
            return Err(AppError::Validation("\"email\" is required".to_string()));
        }
        Ok(notification_type)
    }
}
