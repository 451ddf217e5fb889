//! Service layer: entity CRUD with hierarchy checks and delete cascades,
//! plus the message composition pipeline. Services hold the data store
//! behind the repository traits and contain all business rules; the API
//! layer above them is a thin HTTP adapter.

mod applications;
mod events;
mod messages;
mod notification_types;

pub use applications::ApplicationService;
pub use events::EventService;
pub use messages::MessageService;
pub use notification_types::NotificationTypeService;

use uuid::Uuid;

use crate::store::{EntityFilter, PageRequest, Sort, SortField, SortOrder};

/// Normalized list-query parameters shared by all entity listings.
#[derive(Debug, Clone)]
pub struct ListParams {
    /// Case-insensitive substring filter on name
    pub like: Option<String>,
    pub sort_by: String,
    /// -1 for descending, anything else ascending
    pub sort_order: i64,
    /// <= 0 returns the whole result set
    pub page_number: i64,
    pub page_size: i64,
    pub is_active: bool,
}

impl ListParams {
    /// Split into the store-facing filter, sort, and page request.
    /// Deleted rows are never listed.
    pub(crate) fn parts(&self, parent: Option<Uuid>) -> (EntityFilter, Sort, PageRequest) {
        let filter = EntityFilter {
            parent,
            parent_in: None,
            name_like: self.like.clone().filter(|l| !l.is_empty()),
            is_active: Some(self.is_active),
            include_deleted: false,
        };
        let sort = Sort {
            field: SortField::parse(&self.sort_by),
            order: SortOrder::from_i64(self.sort_order),
        };
        let page = PageRequest {
            page_number: self.page_number,
            page_size: self.page_size,
        };
        (filter, sort, page)
    }
}
