//! axum HTTP surface: the assistant endpoints, hotel search, plus task and trip storage.

pub mod auth;
pub mod dto;
pub mod handlers;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::{
    config::DEFAULT_USER,
    core::{HotelFinder, IdentityProvider, StaticTokens, TravelAssistant, TripPlanner},
    error::TravelError,
    store::{TaskRepository, TripRepository},
};

/// Uploaded images can be larger than axum's default 2 MiB body limit
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<TravelAssistant>,
    pub planner: Arc<TripPlanner>,
    pub hotels: Arc<HotelFinder>,
    pub tasks: Arc<dyn TaskRepository>,
    pub trips: Arc<dyn TripRepository>,
    pub identity: Arc<dyn IdentityProvider>,
    pub default_user: String,
}

impl AppState {
    /// State over a single store serving both tasks and trips
    pub fn new<S>(assistant: TravelAssistant, store: Arc<S>) -> Self
    where
        S: TaskRepository + TripRepository + 'static,
    {
        let tasks: Arc<dyn TaskRepository> = store.clone();
        let trips: Arc<dyn TripRepository> = store;
        Self {
            assistant: Arc::new(assistant),
            planner: Arc::new(TripPlanner::new(tasks.clone(), trips.clone())),
            hotels: Arc::new(HotelFinder::offline()),
            tasks,
            trips,
            identity: Arc::new(StaticTokens::new()),
            default_user: DEFAULT_USER.to_string(),
        }
    }

    pub fn with_hotels(mut self, hotels: HotelFinder) -> Self {
        self.hotels = Arc::new(hotels);
        self
    }

    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_default_user(mut self, user_id: impl Into<String>) -> Self {
        self.default_user = user_id.into();
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/travel/assistant", post(handlers::travel_assistant))
        .route("/api/travel/image-upload", post(handlers::image_upload))
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/api/tasks/:id",
            put(handlers::update_task).delete(handlers::delete_task),
        )
        .route(
            "/api/trips",
            get(handlers::list_trips).post(handlers::create_trip),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::resolve_user,
        ))
        .route("/api/hotels/search", get(handlers::search_hotels))
        .route("/api/hotels/best-deals", get(handlers::best_hotel_deals))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl TravelError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TravelError::Validation(_) => StatusCode::BAD_REQUEST,
            TravelError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            TravelError::NotFound(_) => StatusCode::NOT_FOUND,
            TravelError::Model(_)
            | TravelError::HotelApi(_)
            | TravelError::Http(_)
            | TravelError::Timeout(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TravelError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(target: "travel::http", code = self.error_code(), error = %self, "request failed");
        } else {
            warn!(target: "travel::http", code = self.error_code(), error = %self, "request rejected");
        }
        (status, Json(self.to_error_payload())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            TravelError::Validation("Query is required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            TravelError::NotFound("Task not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            TravelError::Timeout("slow".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            TravelError::Config("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
