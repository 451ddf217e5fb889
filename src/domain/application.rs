//! Application entity: root of the notification hierarchy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

use super::{validate_description, validate_name, ActivityState};

/// Top-level tenant entity that events belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,

    /// Unique across applications, 3-50 characters
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub state: ActivityState,

    pub created_at: DateTime<Utc>,

    pub modified_at: DateTime<Utc>,
}

/// Request to register a new application
#[derive(Debug, Deserialize)]
pub struct CreateApplicationRequest {
    pub name: String,

    #[serde(default)]
    pub description: String,
}

impl CreateApplicationRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_name(&self.name)?;
        validate_description(&self.description)?;
        Ok(())
    }
}

impl From<CreateApplicationRequest> for Application {
    fn from(req: CreateApplicationRequest) -> Self {
        let now = Utc::now();
        Application {
            id: Uuid::new_v4(),
            name: req.name,
            description: req.description,
            state: ActivityState::default(),
            created_at: now,
            modified_at: now,
        }
    }
}

/// Partial update; omitted fields keep their stored values.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateApplicationRequest {
    pub name: Option<String>,

    pub description: Option<String>,

    /// `true` activates, `false` deactivates
    pub is_active: Option<bool>,
}

impl UpdateApplicationRequest {
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
