use std::sync::Arc;

use crate::config::Settings;
use crate::service::{
    ApplicationService, EventService, MessageService, NotificationTypeService,
};
use crate::store::DataStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub applications: Arc<ApplicationService>,
    pub events: Arc<EventService>,
    pub notification_types: Arc<NotificationTypeService>,
    pub messages: Arc<MessageService>,
}

impl AppState {
    pub fn new(settings: Settings, store: Arc<dyn DataStore>) -> Self {
        Self {
            settings: Arc::new(settings),
            applications: Arc::new(ApplicationService::new(store.clone())),
            events: Arc::new(EventService::new(store.clone())),
            notification_types: Arc::new(NotificationTypeService::new(store.clone())),
            messages: Arc::new(MessageService::new(store)),
        }
    }
}
