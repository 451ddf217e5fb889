//! Event entity: a named trigger under an application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

use super::{validate_description, validate_name, ActivityState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,

    /// Unique across events, 3-50 characters
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub state: ActivityState,

    pub created_at: DateTime<Utc>,

    pub modified_at: DateTime<Utc>,

    /// Owning application
    pub application: Uuid,
}

/// Request to register a new event under an application.
///
/// `application` is optional at the type level so a missing field reports a
/// validation error with the field name instead of a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub application: Option<Uuid>,
}

impl CreateEventRequest {
    /// Validate the request, returning the owning application id.
    pub fn validate(&self) -> Result<Uuid, AppError> {
        let application = self.application.ok_or_else(|| {
            AppError::Validation("\"application\" (application ID) is required".to_string())
        })?;
        validate_name(&self.name)?;
        validate_description(&self.description)?;
        Ok(application)
    }

    /// Build the entity once the owning application has been verified.
    pub fn into_event(self, application: Uuid) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            state: ActivityState::default(),
            created_at: now,
            modified_at: now,
            application,
        }
    }
}

/// Partial update; the owning application cannot be changed.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,

    pub description: Option<String>,

    /// `true` activates, `false` deactivates
    pub is_active: Option<bool>,
}

impl UpdateEventRequest {
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
