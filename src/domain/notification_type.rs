//! NotificationType entity: a reusable message template tied to an event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::template::extract_tags;

use super::{validate_description, validate_name, ActivityState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationType {
    pub id: Uuid,

    /// 3-50 characters
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Subject line of composed messages. Not placeholder-substituted.
    #[serde(default)]
    pub template_subject: String,

    /// Body template with `{{tag}}` placeholders
    #[serde(default)]
    pub template_body: String,

    /// Placeholder names present in `template_body`, first-seen order.
    /// Recomputed whenever the body changes; never set by callers.
    #[serde(default)]
    pub tags: Vec<String>,

    pub state: ActivityState,

    pub created_at: DateTime<Utc>,

    pub modified_at: DateTime<Utc>,

    /// Owning event
    pub event: Uuid,
}

/// Request to register a new notification type under an event.
#[derive(Debug, Deserialize)]
pub struct CreateNotificationTypeRequest {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub template_subject: String,

    #[serde(default)]
    pub template_body: String,

    pub event: Option<Uuid>,
}

impl CreateNotificationTypeRequest {
    /// Validate the request, returning the owning event id.
    pub fn validate(&self) -> Result<Uuid, AppError> {
        let event = self
            .event
            .ok_or_else(|| AppError::Validation("\"event\" (event ID) is required".to_string()))?;
        validate_name(&self.name)?;
        validate_description(&self.description)?;
        Ok(event)
    }

    /// Build the entity once the owning event has been verified.
    /// Tags are derived from the template body here.
    pub fn into_notification_type(self, event: Uuid) -> NotificationType {
        let now = Utc::now();
        let tags = extract_tags(&self.template_body);
        NotificationType {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            template_subject: self.template_subject,
            template_body: self.template_body,
            tags,
            state: ActivityState::default(),
            created_at: now,
            modified_at: now,
            event,
        }
    }
}

/// Partial update; the owning event cannot be changed. A new
/// `template_body` recomputes the stored tags.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateNotificationTypeRequest {
    pub name: Option<String>,

    pub description: Option<String>,

    pub template_subject: Option<String>,

    pub template_body: Option<String>,

    /// `true` activates, `false` deactivates
    pub is_active: Option<bool>,
}

impl UpdateNotificationTypeRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        Ok(())
    }
}
