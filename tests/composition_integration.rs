//! Cross-component integration tests
//!
//! These tests drive the service layer over the in-memory store, covering
//! the hierarchy lifecycle, delete cascades, composition gating and
//! pagination, without starting an HTTP server.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use notification_manager::domain::{
    ActivityState, Application, ComposeMessageRequest, CreateApplicationRequest,
    CreateEventRequest, CreateNotificationTypeRequest, Event, NotificationType,
    UpdateApplicationRequest, UpdateEventRequest, UpdateNotificationTypeRequest,
};
use notification_manager::error::AppError;
use notification_manager::service::{
    ApplicationService, EventService, ListParams, MessageService, NotificationTypeService,
};
use notification_manager::store::{DataStore, MemoryStore};

struct TestEnvironment {
    applications: ApplicationService,
    events: EventService,
    notification_types: NotificationTypeService,
    messages: MessageService,
}

fn create_test_environment() -> TestEnvironment {
    let store: Arc<dyn DataStore> = Arc::new(MemoryStore::new());
    TestEnvironment {
        applications: ApplicationService::new(store.clone()),
        events: EventService::new(store.clone()),
        notification_types: NotificationTypeService::new(store.clone()),
        messages: MessageService::new(store),
    }
}

fn list_params() -> ListParams {
    ListParams {
        like: None,
        sort_by: "name".to_string(),
        sort_order: 1,
        page_number: 0,
        page_size: 3,
        is_active: true,
    }
}

async fn create_active_application(env: &TestEnvironment, name: &str) -> Application {
    let app = env
        .applications
        .create(CreateApplicationRequest {
            name: name.to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    env.applications
        .update(
            app.id,
            UpdateApplicationRequest {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap()
}

async fn create_active_event(env: &TestEnvironment, app: &Application, name: &str) -> Event {
    let event = env
        .events
        .create(CreateEventRequest {
            name: name.to_string(),
            description: String::new(),
            application: Some(app.id),
        })
        .await
        .unwrap();
    env.events
        .update(
            event.id,
            UpdateEventRequest {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap()
}

async fn create_active_notification_type(
    env: &TestEnvironment,
    event: &Event,
    name: &str,
    template_body: &str,
) -> NotificationType {
    let notification_type = env
        .notification_types
        .create(CreateNotificationTypeRequest {
            name: name.to_string(),
            description: String::new(),
            template_subject: "Verification code".to_string(),
            template_body: template_body.to_string(),
            event: Some(event.id),
        })
        .await
        .unwrap();
    env.notification_types
        .update(
            notification_type.id,
            UpdateNotificationTypeRequest {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap()
}

/// Build a fully active application → event → notification type chain.
async fn create_active_chain(env: &TestEnvironment) -> (Application, Event, NotificationType) {
    let app = create_active_application(env, "orders-app").await;
    let event = create_active_event(env, &app, "order-shipped").await;
    let notification_type = create_active_notification_type(
        env,
        &event,
        "shipping-confirmation",
        "Hello {{name}}, your code is {{code}}",
    )
    .await;
    (app, event, notification_type)
}

fn compose_request(notification_type: Uuid) -> ComposeMessageRequest {
    ComposeMessageRequest {
        notification_type: Some(notification_type),
        email: "alex@example.com".to_string(),
        metadata: json!({"name": "Alex", "code": "123"}),
    }
}

// --- Lifecycle -------------------------------------------------------------

#[tokio::test]
async fn test_entities_start_inactive() {
    let env = create_test_environment();
    let app = env
        .applications
        .create(CreateApplicationRequest {
            name: "orders-app".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();

    assert_eq!(app.state, ActivityState::Inactive);
}

#[tokio::test]
async fn test_tags_derived_on_create_and_recomputed_on_update() {
    let env = create_test_environment();
    let (_, _, notification_type) = create_active_chain(&env).await;
    assert_eq!(notification_type.tags, vec!["name", "code"]);

    let updated = env
        .notification_types
        .update(
            notification_type.id,
            UpdateNotificationTypeRequest {
                template_body: Some("Hi {{user}}".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.tags, vec!["user"]);

    // Updating other fields leaves the tag set alone
    let renamed = env
        .notification_types
        .update(
            notification_type.id,
            UpdateNotificationTypeRequest {
                description: Some("welcome mail".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.tags, vec!["user"]);
}

#[tokio::test]
async fn test_child_creation_requires_live_parent() {
    let env = create_test_environment();

    // Unknown application
    let err = env
        .events
        .create(CreateEventRequest {
            name: "order-shipped".to_string(),
            description: String::new(),
            application: Some(Uuid::new_v4()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Inactive application
    let app = env
        .applications
        .create(CreateApplicationRequest {
            name: "orders-app".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    let err = env
        .events
        .create(CreateEventRequest {
            name: "order-shipped".to_string(),
            description: String::new(),
            application: Some(app.id),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Missing application id reports the field name
    let err = env
        .events
        .create(CreateEventRequest {
            name: "order-shipped".to_string(),
            description: String::new(),
            application: None,
        })
        .await
        .unwrap_err();
    match err {
        AppError::Validation(msg) => assert!(msg.contains("application")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_activate_deleted_entity_rejected() {
    let env = create_test_environment();
    let app = create_active_application(&env, "orders-app").await;
    env.applications.delete(app.id).await.unwrap();

    let err = env
        .applications
        .update(
            app.id,
            UpdateApplicationRequest {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    // The deleted row is invisible to updates
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_duplicate_application_name_rejected() {
    let env = create_test_environment();
    create_active_application(&env, "orders-app").await;

    let err = env
        .applications
        .create(CreateApplicationRequest {
            name: "orders-app".to_string(),
            description: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Store(_)));
}

// --- Cascades --------------------------------------------------------------

#[tokio::test]
async fn test_application_delete_cascades_to_events_and_types() {
    let env = create_test_environment();
    let (app, event, notification_type) = create_active_chain(&env).await;
    let second_event = create_active_event(&env, &app, "order-cancelled").await;

    env.applications.delete(app.id).await.unwrap();

    // Every descendant is soft-deleted and invisible to reads
    assert!(matches!(
        env.events.get(event.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        env.events.get(second_event.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        env.notification_types
            .get(notification_type.id)
            .await
            .unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_event_delete_cascades_to_types_only() {
    let env = create_test_environment();
    let (app, event, notification_type) = create_active_chain(&env).await;

    env.events.delete(event.id).await.unwrap();

    assert!(matches!(
        env.notification_types
            .get(notification_type.id)
            .await
            .unwrap_err(),
        AppError::NotFound(_)
    ));
    // The application is untouched
    let app = env.applications.get(app.id).await.unwrap();
    assert_eq!(app.state, ActivityState::Active);
}

#[tokio::test]
async fn test_delete_is_idempotent_and_reruns_cascade() {
    let env = create_test_environment();
    let (app, _, _) = create_active_chain(&env).await;

    let first = env.applications.delete(app.id).await.unwrap();
    assert_eq!(first.state, ActivityState::Deleted);

    // Second delete: same terminal state, no error from the cascade
    let second = env.applications.delete(app.id).await.unwrap();
    assert_eq!(second.state, ActivityState::Deleted);
}

#[tokio::test]
async fn test_delete_nonexistent_reports_not_found() {
    let env = create_test_environment();
    let err = env.applications.delete(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_bulk_delete_applications_cascades_and_skips_unknown_ids() {
    let env = create_test_environment();
    let (app_a, event, notification_type) = create_active_chain(&env).await;
    let app_b = create_active_application(&env, "billing-app").await;

    let deleted = env
        .applications
        .delete_many(&[app_a.id, app_b.id, Uuid::new_v4()])
        .await
        .unwrap();

    // Unknown id is skipped, both real applications come back deleted
    assert_eq!(deleted.len(), 2);
    assert!(deleted.iter().all(|a| a.state == ActivityState::Deleted));

    // Cascade ran for each deleted application
    assert!(matches!(
        env.events.get(event.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        env.notification_types
            .get(notification_type.id)
            .await
            .unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_bulk_delete_with_no_matches_reports_nothing_to_delete() {
    let env = create_test_environment();

    let err = env
        .applications
        .delete_many(&[Uuid::new_v4(), Uuid::new_v4()])
        .await
        .unwrap_err();

    match err {
        AppError::NotFound(msg) => assert_eq!(msg, "Nothing to delete."),
        other => panic!("expected not-found error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bulk_delete_notification_types() {
    let env = create_test_environment();
    let app = create_active_application(&env, "orders-app").await;
    let event = create_active_event(&env, &app, "order-shipped").await;
    let first =
        create_active_notification_type(&env, &event, "shipping-confirmation", "Sent.").await;
    let second = create_active_notification_type(&env, &event, "shipping-delay", "Delayed.").await;

    let deleted = env
        .notification_types
        .delete_many(&[first.id, second.id])
        .await
        .unwrap();
    assert_eq!(deleted.len(), 2);

    // The parent event is untouched
    assert_eq!(
        env.events.get(event.id).await.unwrap().state,
        ActivityState::Active
    );
}

// --- Message composition ---------------------------------------------------

#[tokio::test]
async fn test_compose_renders_and_persists() {
    let env = create_test_environment();
    let (_, _, notification_type) = create_active_chain(&env).await;

    let message = env
        .messages
        .compose(compose_request(notification_type.id))
        .await
        .unwrap();

    assert_eq!(message.body, "Hello Alex, your code is 123");
    assert_eq!(message.subject, "Verification code");
    assert_eq!(message.email, "alex@example.com");
    assert_eq!(message.notification_type, notification_type.id);

    let fetched = env.messages.get(message.id).await.unwrap();
    assert_eq!(fetched.body, message.body);
}

#[tokio::test]
async fn test_compose_missing_metadata_key_names_it() {
    let env = create_test_environment();
    let (_, _, notification_type) = create_active_chain(&env).await;

    let request = ComposeMessageRequest {
        notification_type: Some(notification_type.id),
        email: "alex@example.com".to_string(),
        metadata: json!({"name": "Alex"}),
    };
    let err = env.messages.compose(request).await.unwrap_err();

    match err {
        AppError::Validation(msg) => assert!(msg.contains("\"code\"")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_compose_requires_notification_type_id() {
    let env = create_test_environment();
    let err = env
        .messages
        .compose(ComposeMessageRequest {
            notification_type: None,
            email: "alex@example.com".to_string(),
            metadata: json!({}),
        })
        .await
        .unwrap_err();

    match err {
        AppError::Validation(msg) => assert!(msg.contains("notification_type")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_compose_gated_on_inactive_ancestors() {
    // Deactivating any link of the chain blocks composition, even though
    // nothing is deleted.
    for deactivate in ["notification_type", "event", "application"] {
        let env = create_test_environment();
        let (app, event, notification_type) = create_active_chain(&env).await;

        match deactivate {
            "notification_type" => {
                env.notification_types
                    .update(
                        notification_type.id,
                        UpdateNotificationTypeRequest {
                            is_active: Some(false),
                            ..Default::default()
                        },
                    )
                    .await
                    .unwrap();
            }
            "event" => {
                env.events
                    .update(
                        event.id,
                        UpdateEventRequest {
                            is_active: Some(false),
                            ..Default::default()
                        },
                    )
                    .await
                    .unwrap();
            }
            _ => {
                env.applications
                    .update(
                        app.id,
                        UpdateApplicationRequest {
                            is_active: Some(false),
                            ..Default::default()
                        },
                    )
                    .await
                    .unwrap();
            }
        }

        let err = env
            .messages
            .compose(compose_request(notification_type.id))
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::Validation(_)),
            "expected validation error when {deactivate} is inactive"
        );
    }
}

#[tokio::test]
async fn test_compose_after_cascade_delete_fails() {
    let env = create_test_environment();
    let (app, _, notification_type) = create_active_chain(&env).await;

    env.applications.delete(app.id).await.unwrap();

    let err = env
        .messages
        .compose(compose_request(notification_type.id))
        .await
        .unwrap_err();
    // The notification type itself was swept by the cascade
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_compose_with_dangling_event_is_integrity_fault() {
    // A notification type referencing a nonexistent event can only mean
    // corrupted data; composition must report an integrity fault, not a
    // caller error. Such a row cannot be created through the service
    // layer, so it is planted directly in the store.
    let store: Arc<dyn DataStore> = Arc::new(MemoryStore::new());
    let messages = MessageService::new(store.clone());

    let now = Utc::now();
    let orphan = NotificationType {
        id: Uuid::new_v4(),
        name: "orphaned-template".to_string(),
        description: String::new(),
        template_subject: String::new(),
        template_body: "Hi {{name}}".to_string(),
        tags: vec!["name".to_string()],
        state: ActivityState::Active,
        created_at: now,
        modified_at: now,
        event: Uuid::new_v4(),
    };
    store
        .insert_notification_type(orphan.clone())
        .await
        .unwrap();

    let err = messages
        .compose(ComposeMessageRequest {
            notification_type: Some(orphan.id),
            email: "alex@example.com".to_string(),
            metadata: json!({"name": "Alex"}),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Integrity(_)));
}

#[tokio::test]
async fn test_compose_without_tags_skips_validation() {
    let env = create_test_environment();
    let app = create_active_application(&env, "orders-app").await;
    let event = create_active_event(&env, &app, "order-shipped").await;
    let notification_type =
        create_active_notification_type(&env, &event, "static-notice", "We shipped it.").await;

    let message = env
        .messages
        .compose(ComposeMessageRequest {
            notification_type: Some(notification_type.id),
            email: "alex@example.com".to_string(),
            metadata: json!({}),
        })
        .await
        .unwrap();

    assert_eq!(message.body, "We shipped it.");
}

// --- Pagination ------------------------------------------------------------

async fn seed_applications(env: &TestEnvironment, count: usize) {
    for i in 0..count {
        create_active_application(env, &format!("app-{i:02}")).await;
    }
}

#[tokio::test]
async fn test_page_zero_returns_all() {
    let env = create_test_environment();
    seed_applications(&env, 10).await;

    let page = env.applications.list(list_params()).await.unwrap();
    assert_eq!(page.current_page, 1);
    assert_eq!(page.last_page, 1);
    assert_eq!(page.total, 10);
    assert_eq!(page.items.len(), 10);
}

#[tokio::test]
async fn test_page_number_clamped_to_last_page() {
    let env = create_test_environment();
    seed_applications(&env, 10).await;

    let mut params = list_params();
    params.page_number = 5;
    params.page_size = 3;
    let page = env.applications.list(params).await.unwrap();

    assert_eq!(page.last_page, 4);
    assert_eq!(page.current_page, 4);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "app-09");
}

#[tokio::test]
async fn test_list_filters_by_activity_and_name() {
    let env = create_test_environment();
    let active = create_active_application(&env, "orders-app").await;
    env.applications
        .create(CreateApplicationRequest {
            name: "billing-app".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();

    // Default listing only shows active entities
    let page = env.applications.list(list_params()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, active.id);

    // Inactive listing with a case-insensitive name filter
    let mut params = list_params();
    params.is_active = false;
    params.like = Some("BILLING".to_string());
    let page = env.applications.list(params).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "billing-app");
}

#[tokio::test]
async fn test_deleted_entities_never_listed() {
    let env = create_test_environment();
    let app = create_active_application(&env, "orders-app").await;
    create_active_application(&env, "billing-app").await;

    env.applications.delete(app.id).await.unwrap();

    let page = env.applications.list(list_params()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "billing-app");

    // Not visible under the inactive filter either
    let mut params = list_params();
    params.is_active = false;
    let page = env.applications.list(params).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_event_listing_scoped_to_application() {
    let env = create_test_environment();
    let app_a = create_active_application(&env, "orders-app").await;
    let app_b = create_active_application(&env, "billing-app").await;
    create_active_event(&env, &app_a, "order-shipped").await;
    create_active_event(&env, &app_a, "order-cancelled").await;
    create_active_event(&env, &app_b, "invoice-sent").await;

    let page = env.events.list(app_a.id, list_params()).await.unwrap();
    assert_eq!(page.total, 2);
    assert!(page.items.iter().all(|e| e.application == app_a.id));
}
