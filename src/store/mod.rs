//! Storage layer: per-entity repository traits with memory and PostgreSQL
//! implementations, selected once at startup by [`factory::create_data_store`].
//!
//! The service layer depends only on these traits. Every call is an await
//! point; no caching or locking happens above the backing store, so
//! consistency relies on the store's per-row atomicity.

mod factory;
mod memory;
mod page;
mod postgres;

pub use factory::create_data_store;
pub use memory::MemoryStore;
pub use page::{Page, PageRequest, PageWindow};
pub use postgres::PostgresStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    ActivityState, Application, Event, Message, NotificationType,
};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A store-enforced constraint was violated (e.g. duplicate unique
    /// name). The detail is safe to surface to the caller.
    #[error("{0}")]
    Constraint(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Whitelisted sort fields for list queries. Unknown names fall back to
/// sorting by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    CreatedAt,
    ModifiedAt,
    State,
}

impl SortField {
    pub fn parse(s: &str) -> Self {
        match s {
            "created_at" => SortField::CreatedAt,
            "modified_at" => SortField::ModifiedAt,
            "state" | "is_active" => SortField::State,
            _ => SortField::Name,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::CreatedAt => "created_at",
            SortField::ModifiedAt => "modified_at",
            SortField::State => "state",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Legacy numeric convention: -1 descending, anything else ascending.
    pub fn from_i64(order: i64) -> Self {
        if order == -1 {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for Sort {
    fn default() -> Self {
        Sort {
            field: SortField::Name,
            order: SortOrder::Ascending,
        }
    }
}

/// Filter for list/count/update-many operations.
///
/// Deleted rows are excluded unless `include_deleted` is set; list endpoints
/// never set it, cascades do (so a re-applied cascade stays idempotent and
/// id collection sees already-deleted children).
#[derive(Debug, Clone, Default)]
pub struct EntityFilter {
    /// Owning parent id (application for events, event for notification types)
    pub parent: Option<Uuid>,

    /// Owning parent is one of these ids (cascades spanning several events)
    pub parent_in: Option<Vec<Uuid>>,

    /// Case-insensitive substring match on name
    pub name_like: Option<String>,

    pub is_active: Option<bool>,

    pub include_deleted: bool,
}

impl EntityFilter {
    pub fn children_of(parent: Uuid) -> Self {
        EntityFilter {
            parent: Some(parent),
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Insert a new application. Fails with [`StoreError::Constraint`] on a
    /// duplicate name.
    async fn insert_application(&self, app: Application) -> StoreResult<Application>;

    /// Fetch by id. Deleted rows are invisible to this accessor.
    async fn find_application(&self, id: Uuid) -> StoreResult<Option<Application>>;

    async fn list_applications(
        &self,
        filter: &EntityFilter,
        sort: Sort,
        window: Option<PageWindow>,
    ) -> StoreResult<Vec<Application>>;

    async fn count_applications(&self, filter: &EntityFilter) -> StoreResult<u64>;

    /// Merge the patch into the stored row and bump `modified_at`.
    /// Returns `None` when the row is missing or deleted.
    async fn update_application(
        &self,
        id: Uuid,
        patch: ApplicationPatch,
    ) -> StoreResult<Option<Application>>;

    /// Transition the row to `Deleted`, deleted rows included so a retried
    /// delete can re-run its cascade. Returns `None` only when the row
    /// does not exist at all.
    async fn mark_application_deleted(&self, id: Uuid) -> StoreResult<Option<Application>>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_event(&self, event: Event) -> StoreResult<Event>;

    async fn find_event(&self, id: Uuid) -> StoreResult<Option<Event>>;

    async fn list_events(
        &self,
        filter: &EntityFilter,
        sort: Sort,
        window: Option<PageWindow>,
    ) -> StoreResult<Vec<Event>>;

    async fn count_events(&self, filter: &EntityFilter) -> StoreResult<u64>;

    async fn update_event(&self, id: Uuid, patch: EventPatch) -> StoreResult<Option<Event>>;

    /// Transition the row to `Deleted`, deleted rows included.
    async fn mark_event_deleted(&self, id: Uuid) -> StoreResult<Option<Event>>;

    /// Set the state of every matching event, bumping `modified_at`.
    /// Returns the number of rows touched. Used by delete cascades.
    async fn update_events_state(
        &self,
        filter: &EntityFilter,
        state: ActivityState,
    ) -> StoreResult<u64>;
}

#[async_trait]
pub trait NotificationTypeStore: Send + Sync {
    async fn insert_notification_type(
        &self,
        notification_type: NotificationType,
    ) -> StoreResult<NotificationType>;

    async fn find_notification_type(&self, id: Uuid) -> StoreResult<Option<NotificationType>>;

    async fn list_notification_types(
        &self,
        filter: &EntityFilter,
        sort: Sort,
        window: Option<PageWindow>,
    ) -> StoreResult<Vec<NotificationType>>;

    async fn count_notification_types(&self, filter: &EntityFilter) -> StoreResult<u64>;

    async fn update_notification_type(
        &self,
        id: Uuid,
        patch: NotificationTypePatch,
    ) -> StoreResult<Option<NotificationType>>;

    /// Transition the row to `Deleted`, deleted rows included.
    async fn mark_notification_type_deleted(
        &self,
        id: Uuid,
    ) -> StoreResult<Option<NotificationType>>;

    /// Set the state of every matching notification type. Used by cascades.
    async fn update_notification_types_state(
        &self,
        filter: &EntityFilter,
        state: ActivityState,
    ) -> StoreResult<u64>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert_message(&self, message: Message) -> StoreResult<Message>;

    async fn find_message(&self, id: Uuid) -> StoreResult<Option<Message>>;
}

/// The storage contract consumed by the service layer: one object covering
/// all four entities, chosen once during process initialization.
pub trait DataStore:
    ApplicationStore + EventStore + NotificationTypeStore + MessageStore
{
}

impl<T> DataStore for T where
    T: ApplicationStore + EventStore + NotificationTypeStore + MessageStore
{
}

/// Field merge for application updates. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ApplicationPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub state: Option<ActivityState>,
}

#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub state: Option<ActivityState>,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationTypePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub template_subject: Option<String>,
    /// Always paired with recomputed `tags` by the service layer
    pub template_body: Option<String>,
    pub tags: Option<Vec<String>>,
    pub state: Option<ActivityState>,
}
