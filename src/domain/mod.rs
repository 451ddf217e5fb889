//! Domain entities for the Application → Event → NotificationType → Message
//! hierarchy, plus the shared activity state machine.

mod application;
mod event;
mod message;
mod notification_type;
mod state;

pub use application::{Application, CreateApplicationRequest, UpdateApplicationRequest};
pub use event::{CreateEventRequest, Event, UpdateEventRequest};
pub use message::{ComposeMessageRequest, Message};
pub use notification_type::{
    CreateNotificationTypeRequest, NotificationType, UpdateNotificationTypeRequest,
};
pub use state::{ActivityState, StateError};

use crate::error::AppError;

/// Entity names are 3-50 characters.
pub(crate) fn validate_name(name: &str) -> Result<(), AppError> {
    let len = name.chars().count();
    if !(3..=50).contains(&len) {
        return Err(AppError::Validation(
            "\"name\" must be 3-50 characters".to_string(),
        ));
    }
    Ok(())
}

/// Descriptions are capped at 255 characters.
pub(crate) fn validate_description(description: &str) -> Result<(), AppError> {
    if description.chars().count() > 255 {
        return Err(AppError::Validation(
            "\"description\" must be at most 255 characters".to_string(),
        ));
    }
    Ok(())
}
