use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::email::Dispatcher;

mod health;
mod send;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(config: crate::config::Config) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(config.mail.clone()));

        Self { config, dispatcher }
    }
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        // Health check endpoints
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/api/send", post(send::action))
        .with_state(app_state)
}
