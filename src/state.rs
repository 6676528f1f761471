// state.rs
use std::sync::Arc;

use crate::events::EventBus;
use crate::service::PollService;
use crate::store::PollStore;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PollService>,
}

impl AppState {
    pub fn new(store: Arc<dyn PollStore>) -> Self {
        Self {
            service: Arc::new(PollService::new(store, EventBus::new())),
        }
    }
}
