//! API layer - HTTP endpoint handlers organized by entity.

mod application;
mod event;
mod health;
mod message;
mod notification_type;
mod routes;

pub use application::{
    create_application, delete_application, delete_applications, get_application,
    list_applications, update_application,
};
pub use event::{create_event, delete_event, get_event, list_events, update_event};
pub use health::health;
pub use message::{create_message, get_message};
pub use notification_type::{
    create_notification_type, delete_notification_type, delete_notification_types,
    get_notification_type, list_notification_types, update_notification_type,
};
pub use routes::api_routes;

use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::service::ListParams;

/// Query parameters accepted by every list endpoint. Events additionally
/// require `application`, notification types require `event`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub like: Option<String>,

    #[serde(default = "default_sort_by")]
    pub sort_by: String,

    /// 1 ascending (default), -1 descending
    #[serde(default = "default_sort_order")]
    pub sort_order: i64,

    /// 0 (default) returns all matching rows unpaginated
    #[serde(default)]
    pub page_number: i64,

    pub page_size: Option<i64>,

    #[serde(default = "default_is_active")]
    pub is_active: bool,

    /// Owning application (events listing)
    pub application: Option<Uuid>,

    /// Owning event (notification types listing)
    pub event: Option<Uuid>,
}

fn default_sort_by() -> String {
    "name".to_string()
}

fn default_sort_order() -> i64 {
    1
}

fn default_is_active() -> bool {
    true
}

/// Request body for collection-level DELETE endpoints.
#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    #[serde(default)]
    pub ids: Vec<Uuid>,
}

impl BulkDeleteRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.ids.is_empty() {
            return Err(AppError::Validation(
                "\"ids\" must contain at least one ID".to_string(),
            ));
        }
        Ok(())
    }
}

impl ListQuery {
    fn into_params(self, default_page_size: i64) -> ListParams {
        ListParams {
            like: self.like,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            page_number: self.page_number,
            page_size: self.page_size.unwrap_or(default_page_size),
            is_active: self.is_active,
        }
    }
}
