//! PostgreSQL data store.
//!
//! Schema is created at startup with `CREATE TABLE IF NOT EXISTS` DDL.
//! Name uniqueness on applications and events is a database constraint;
//! soft-deleted rows keep occupying their name. Cascades are plain
//! `UPDATE ... WHERE parent = $n` statements with no surrounding
//! transaction; the delete transition is idempotent so a retried cascade
//! converges.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::{ActivityState, Application, Event, Message, NotificationType};

use super::{
    ApplicationPatch, ApplicationStore, EntityFilter, EventPatch, EventStore, MessageStore,
    NotificationTypePatch, NotificationTypeStore, PageWindow, Sort, SortOrder, StoreError,
    StoreResult,
};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes if they do not exist yet.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS applications (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                state TEXT NOT NULL DEFAULT 'inactive',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                modified_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                state TEXT NOT NULL DEFAULT 'inactive',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                modified_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                application_id UUID NOT NULL REFERENCES applications(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notification_types (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                template_subject TEXT NOT NULL DEFAULT '',
                template_body TEXT NOT NULL DEFAULT '',
                tags TEXT[] NOT NULL DEFAULT '{}',
                state TEXT NOT NULL DEFAULT 'inactive',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                modified_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                event_id UUID NOT NULL REFERENCES events(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id UUID PRIMARY KEY,
                subject TEXT NOT NULL DEFAULT '',
                body TEXT NOT NULL DEFAULT '',
                email TEXT NOT NULL,
                notification_type_id UUID NOT NULL REFERENCES notification_types(id),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_events_application ON events(application_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_notification_types_event ON notification_types(event_id)",
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("PostgreSQL schema ready");
        Ok(())
    }
}

fn parse_state(row: &PgRow) -> Result<ActivityState, sqlx::Error> {
    let raw: String = row.try_get("state")?;
    ActivityState::parse(&raw)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown activity state: {raw}").into()))
}

fn row_to_application(row: &PgRow) -> Result<Application, sqlx::Error> {
    Ok(Application {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        state: parse_state(row)?,
        created_at: row.try_get("created_at")?,
        modified_at: row.try_get("modified_at")?,
    })
}

fn row_to_event(row: &PgRow) -> Result<Event, sqlx::Error> {
    Ok(Event {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        state: parse_state(row)?,
        created_at: row.try_get("created_at")?,
        modified_at: row.try_get("modified_at")?,
        application: row.try_get("application_id")?,
    })
}

fn row_to_notification_type(row: &PgRow) -> Result<NotificationType, sqlx::Error> {
    Ok(NotificationType {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        template_subject: row.try_get("template_subject")?,
        template_body: row.try_get("template_body")?,
        tags: row.try_get("tags")?,
        state: parse_state(row)?,
        created_at: row.try_get("created_at")?,
        modified_at: row.try_get("modified_at")?,
        event: row.try_get("event_id")?,
    })
}

fn row_to_message(row: &PgRow) -> Result<Message, sqlx::Error> {
    Ok(Message {
        id: row.try_get("id")?,
        subject: row.try_get("subject")?,
        body: row.try_get("body")?,
        email: row.try_get("email")?,
        notification_type: row.try_get("notification_type_id")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Map insert failures, surfacing unique violations as constraint errors
/// with client-safe detail.
fn map_insert_error(err: sqlx::Error, what: &str, name: &str) -> StoreError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Constraint(format!("{what} name \"{name}\" already exists"))
        }
        e => StoreError::Database(e),
    }
}

fn order_clause(sort: Sort) -> String {
    let direction = match sort.order {
        SortOrder::Ascending => "ASC",
        SortOrder::Descending => "DESC",
    };
    // sort.field.column() is a whitelisted identifier, never caller input
    format!("ORDER BY {} {}", sort.field.column(), direction)
}

fn window_binds(window: Option<PageWindow>) -> (i64, Option<i64>) {
    match window {
        Some(w) => (w.skip as i64, Some(w.limit as i64)),
        // LIMIT NULL means no limit
        None => (0, None),
    }
}

#[async_trait]
impl ApplicationStore for PostgresStore {
    async fn insert_application(&self, app: Application) -> StoreResult<Application> {
        sqlx::query(
            r#"
            INSERT INTO applications (id, name, description, state, created_at, modified_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(app.id)
        .bind(&app.name)
        .bind(&app.description)
        .bind(app.state.as_str())
        .bind(app.created_at)
        .bind(app.modified_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "application", &app.name))?;

        Ok(app)
    }

    async fn find_application(&self, id: Uuid) -> StoreResult<Option<Application>> {
        let row = sqlx::query(
            "SELECT * FROM applications WHERE id = $1 AND state <> 'deleted'",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_application).transpose()?)
    }

    async fn list_applications(
        &self,
        filter: &EntityFilter,
        sort: Sort,
        window: Option<PageWindow>,
    ) -> StoreResult<Vec<Application>> {
        let (skip, limit) = window_binds(window);
        let sql = format!(
            r#"
            SELECT * FROM applications
            WHERE ($1 OR state <> 'deleted')
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR (state = 'active') = $3)
            {} OFFSET $4 LIMIT $5
            "#,
            order_clause(sort)
        );

        let rows = sqlx::query(&sql)
            .bind(filter.include_deleted)
            .bind(&filter.name_like)
            .bind(filter.is_active)
            .bind(skip)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(row_to_application)
            .collect::<Result<_, _>>()?)
    }

    async fn count_applications(&self, filter: &EntityFilter) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM applications
            WHERE ($1 OR state <> 'deleted')
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR (state = 'active') = $3)
            "#,
        )
        .bind(filter.include_deleted)
        .bind(&filter.name_like)
        .bind(filter.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }

    async fn update_application(
        &self,
        id: Uuid,
        patch: ApplicationPatch,
    ) -> StoreResult<Option<Application>> {
        let row = sqlx::query(
            r#"
            UPDATE applications SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                state = COALESCE($4, state),
                modified_at = NOW()
            WHERE id = $1 AND state <> 'deleted'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.state.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_application).transpose()?)
    }

    async fn mark_application_deleted(&self, id: Uuid) -> StoreResult<Option<Application>> {
        let row = sqlx::query(
            r#"
            UPDATE applications SET
                modified_at = CASE WHEN state <> 'deleted' THEN NOW() ELSE modified_at END,
                state = 'deleted'
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_application).transpose()?)
    }
}

#[async_trait]
impl EventStore for PostgresStore {
    async fn insert_event(&self, event: Event) -> StoreResult<Event> {
        sqlx::query(
            r#"
            INSERT INTO events (id, name, description, state, created_at, modified_at, application_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.state.as_str())
        .bind(event.created_at)
        .bind(event.modified_at)
        .bind(event.application)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "event", &event.name))?;

        Ok(event)
    }

    async fn find_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let row = sqlx::query("SELECT * FROM events WHERE id = $1 AND state <> 'deleted'")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_event).transpose()?)
    }

    async fn list_events(
        &self,
        filter: &EntityFilter,
        sort: Sort,
        window: Option<PageWindow>,
    ) -> StoreResult<Vec<Event>> {
        let (skip, limit) = window_binds(window);
        let sql = format!(
            r#"
            SELECT * FROM events
            WHERE ($1 OR state <> 'deleted')
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR (state = 'active') = $3)
              AND ($4::uuid IS NULL OR application_id = $4)
            {} OFFSET $5 LIMIT $6
            "#,
            order_clause(sort)
        );

        let rows = sqlx::query(&sql)
            .bind(filter.include_deleted)
            .bind(&filter.name_like)
            .bind(filter.is_active)
            .bind(filter.parent)
            .bind(skip)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(row_to_event).collect::<Result<_, _>>()?)
    }

    async fn count_events(&self, filter: &EntityFilter) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM events
            WHERE ($1 OR state <> 'deleted')
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR (state = 'active') = $3)
              AND ($4::uuid IS NULL OR application_id = $4)
            "#,
        )
        .bind(filter.include_deleted)
        .bind(&filter.name_like)
        .bind(filter.is_active)
        .bind(filter.parent)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }

    async fn update_event(&self, id: Uuid, patch: EventPatch) -> StoreResult<Option<Event>> {
        let row = sqlx::query(
            r#"
            UPDATE events SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                state = COALESCE($4, state),
                modified_at = NOW()
            WHERE id = $1 AND state <> 'deleted'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.state.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_event).transpose()?)
    }

    async fn mark_event_deleted(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let row = sqlx::query(
            r#"
            UPDATE events SET
                modified_at = CASE WHEN state <> 'deleted' THEN NOW() ELSE modified_at END,
                state = 'deleted'
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_event).transpose()?)
    }

    async fn update_events_state(
        &self,
        filter: &EntityFilter,
        state: ActivityState,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE events SET state = $1, modified_at = NOW()
            WHERE ($2 OR state <> 'deleted')
              AND ($3::uuid IS NULL OR application_id = $3)
            "#,
        )
        .bind(state.as_str())
        .bind(filter.include_deleted)
        .bind(filter.parent)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl NotificationTypeStore for PostgresStore {
    async fn insert_notification_type(
        &self,
        notification_type: NotificationType,
    ) -> StoreResult<NotificationType> {
        sqlx::query(
            r#"
            INSERT INTO notification_types
                (id, name, description, template_subject, template_body, tags,
                 state, created_at, modified_at, event_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(notification_type.id)
        .bind(&notification_type.name)
        .bind(&notification_type.description)
        .bind(&notification_type.template_subject)
        .bind(&notification_type.template_body)
        .bind(&notification_type.tags)
        .bind(notification_type.state.as_str())
        .bind(notification_type.created_at)
        .bind(notification_type.modified_at)
        .bind(notification_type.event)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "notification type", &notification_type.name))?;

        Ok(notification_type)
    }

    async fn find_notification_type(&self, id: Uuid) -> StoreResult<Option<NotificationType>> {
        let row = sqlx::query(
            "SELECT * FROM notification_types WHERE id = $1 AND state <> 'deleted'",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_notification_type).transpose()?)
    }

    async fn list_notification_types(
        &self,
        filter: &EntityFilter,
        sort: Sort,
        window: Option<PageWindow>,
    ) -> StoreResult<Vec<NotificationType>> {
        let (skip, limit) = window_binds(window);
        let sql = format!(
            r#"
            SELECT * FROM notification_types
            WHERE ($1 OR state <> 'deleted')
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR (state = 'active') = $3)
              AND ($4::uuid IS NULL OR event_id = $4)
              AND ($5::uuid[] IS NULL OR event_id = ANY($5))
            {} OFFSET $6 LIMIT $7
            "#,
            order_clause(sort)
        );

        let rows = sqlx::query(&sql)
            .bind(filter.include_deleted)
            .bind(&filter.name_like)
            .bind(filter.is_active)
            .bind(filter.parent)
            .bind(&filter.parent_in)
            .bind(skip)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(row_to_notification_type)
            .collect::<Result<_, _>>()?)
    }

    async fn count_notification_types(&self, filter: &EntityFilter) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM notification_types
            WHERE ($1 OR state <> 'deleted')
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
              AND ($3::boolean IS NULL OR (state = 'active') = $3)
              AND ($4::uuid IS NULL OR event_id = $4)
              AND ($5::uuid[] IS NULL OR event_id = ANY($5))
            "#,
        )
        .bind(filter.include_deleted)
        .bind(&filter.name_like)
        .bind(filter.is_active)
        .bind(filter.parent)
        .bind(&filter.parent_in)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }

    async fn update_notification_type(
        &self,
        id: Uuid,
        patch: NotificationTypePatch,
    ) -> StoreResult<Option<NotificationType>> {
        let row = sqlx::query(
            r#"
            UPDATE notification_types SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                template_subject = COALESCE($4, template_subject),
                template_body = COALESCE($5, template_body),
                tags = COALESCE($6, tags),
                state = COALESCE($7, state),
                modified_at = NOW()
            WHERE id = $1 AND state <> 'deleted'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.template_subject)
        .bind(patch.template_body)
        .bind(patch.tags)
        .bind(patch.state.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_notification_type).transpose()?)
    }

    async fn mark_notification_type_deleted(
        &self,
        id: Uuid,
    ) -> StoreResult<Option<NotificationType>> {
        let row = sqlx::query(
            r#"
            UPDATE notification_types SET
                modified_at = CASE WHEN state <> 'deleted' THEN NOW() ELSE modified_at END,
                state = 'deleted'
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_notification_type).transpose()?)
    }

    async fn update_notification_types_state(
        &self,
        filter: &EntityFilter,
        state: ActivityState,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notification_types SET state = $1, modified_at = NOW()
            WHERE ($2 OR state <> 'deleted')
              AND ($3::uuid IS NULL OR event_id = $3)
              AND ($4::uuid[] IS NULL OR event_id = ANY($4))
            "#,
        )
        .bind(state.as_str())
        .bind(filter.include_deleted)
        .bind(filter.parent)
        .bind(&filter.parent_in)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl MessageStore for PostgresStore {
    async fn insert_message(&self, message: Message) -> StoreResult<Message> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, subject, body, email, notification_type_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id)
        .bind(&message.subject)
        .bind(&message.body)
        .bind(&message.email)
        .bind(message.notification_type)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        Ok(message)
    }

    async fn find_message(&self, id: Uuid) -> StoreResult<Option<Message>> {
        let row = sqlx::query("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_message).transpose()?)
    }
}
