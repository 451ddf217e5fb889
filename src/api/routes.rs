use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

use super::{
    create_application, create_event, create_message, create_notification_type,
    delete_application, delete_applications, delete_event, delete_notification_type,
    delete_notification_types, get_application, get_event, get_message, get_notification_type,
    health, list_applications, list_events, list_notification_types, update_application,
    update_event, update_notification_type,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest(
            "/api/v1",
            Router::new()
                .route(
                    "/applications",
                    post(create_application)
                        .get(list_applications)
                        .delete(delete_applications),
                )
                .route(
                    "/applications/{id}",
                    get(get_application)
                        .put(update_application)
                        .delete(delete_application),
                )
                .route("/events", post(create_event).get(list_events))
                .route(
                    "/events/{id}",
                    get(get_event).put(update_event).delete(delete_event),
                )
                .route(
                    "/notification-types",
                    post(create_notification_type)
                        .get(list_notification_types)
                        .delete(delete_notification_types),
                )
                .route(
                    "/notification-types/{id}",
                    get(get_notification_type)
                        .put(update_notification_type)
                        .delete(delete_notification_type),
                )
                .route("/messages", post(create_message))
                .route("/messages/{id}", get(get_message)),
        )
}
