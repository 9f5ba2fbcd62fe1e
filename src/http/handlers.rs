use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    Extension, Json,
};
use chrono::Utc;
use tracing::{info, warn};

use super::{
    auth::CurrentUser,
    dto::{
        AssistantRequest, AssistantResponse, HotelListResponse, HotelSearchParams,
        MessageResponse, TaskListResponse, TaskResponse, TripListResponse, TripResponse,
    },
    AppState,
};
use crate::{
    core::DEFAULT_IMAGE_MIME,
    error::{Result, TravelError},
    types::{NewTask, NewTrip, TaskId, TaskPatch},
};

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| TravelError::Validation(rejection.body_text()))
}

fn task_id(id: std::result::Result<Path<TaskId>, PathRejection>) -> Result<TaskId> {
    id.map(|Path(id)| id)
        .map_err(|_| TravelError::NotFound("Task not found".to_string()))
}

fn hotel_params(
    params: std::result::Result<Query<HotelSearchParams>, QueryRejection>,
) -> Result<HotelSearchParams> {
    params
        .map(|Query(params)| params)
        .map_err(|rejection| TravelError::Validation(rejection.body_text()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

/// POST /api/travel/assistant
pub async fn travel_assistant(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    payload: std::result::Result<Json<AssistantRequest>, JsonRejection>,
) -> Result<Json<AssistantResponse>> {
    let request = body(payload)?;
    let query = non_blank(request.query)
        .ok_or_else(|| TravelError::Validation("Query is required".to_string()))?;

    info!(target: "travel::http", session = ?request.session_id, save = request.save_tasks, "travel assistant query");
    let result = state.assistant.ask(&query).await;

    let (saved_tasks, trip) = if request.save_tasks {
        let adoption = state
            .planner
            .adopt(&user_id, &query, &result.narrative, &result.tasks, Utc::now().date_naive())
            .await;
        (Some(adoption.tasks), adoption.trip)
    } else {
        (None, None)
    };

    let mut response = AssistantResponse::new(result, request.session_id);
    response.saved_tasks = saved_tasks;
    response.trip = trip;
    Ok(Json(response))
}

/// POST /api/travel/image-upload (multipart: `image`, optional `message` and `sessionId`)
pub async fn image_upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<AssistantResponse>> {
    let mut multipart =
        multipart.map_err(|rejection| TravelError::Validation(rejection.body_text()))?;
    let malformed = |err: axum::extract::multipart::MultipartError| {
        TravelError::Validation(format!("Malformed upload: {err}"))
    };

    let mut image: Option<(Vec<u8>, String)> = None;
    let mut message = None;
    let mut session_id = None;

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let mime_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
                let bytes = field.bytes().await.map_err(malformed)?;
                image = Some((bytes.to_vec(), mime_type));
            }
            Some("message") => message = Some(field.text().await.map_err(malformed)?),
            Some("sessionId") => session_id = Some(field.text().await.map_err(malformed)?),
            _ => {}
        }
    }

    let (image, mime_type) = image
        .filter(|(bytes, _)| !bytes.is_empty())
        .ok_or_else(|| TravelError::Validation("Image is required".to_string()))?;
    let message = non_blank(message);

    info!(target: "travel::http", bytes = image.len(), mime = %mime_type, "image upload");
    let result = state
        .assistant
        .analyze_image(&image, &mime_type, message.as_deref())
        .await
        .inspect_err(|err| warn!(target: "travel::model", error = %err, "image analysis failed"))?;

    Ok(Json(AssistantResponse::new(result, non_blank(session_id))))
}

/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<TaskListResponse>> {
    let tasks = state.tasks.list_tasks(&user_id).await?;
    Ok(Json(tasks.into()))
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    payload: std::result::Result<Json<NewTask>, JsonRejection>,
) -> Result<Json<TaskResponse>> {
    let task = body(payload)?;
    if task.title.trim().is_empty() {
        return Err(TravelError::Validation("Title is required".to_string()));
    }

    let task = state.tasks.create_task(&user_id, task).await?;
    Ok(Json(task.into()))
}

/// PUT /api/tasks/:id
pub async fn update_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    id: std::result::Result<Path<TaskId>, PathRejection>,
    payload: std::result::Result<Json<TaskPatch>, JsonRejection>,
) -> Result<Json<TaskResponse>> {
    let id = task_id(id)?;
    let patch = body(payload)?;

    let task = state.tasks.update_task(&user_id, id, patch).await?;
    Ok(Json(task.into()))
}

/// DELETE /api/tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    id: std::result::Result<Path<TaskId>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let id = task_id(id)?;

    state.tasks.delete_task(&user_id, id).await?;
    Ok(Json(MessageResponse::ok("Task deleted successfully")))
}

/// GET /api/trips
pub async fn list_trips(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<TripListResponse>> {
    let trips = state.trips.list_trips(&user_id).await?;
    Ok(Json(trips.into()))
}

/// POST /api/trips
pub async fn create_trip(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    payload: std::result::Result<Json<NewTrip>, JsonRejection>,
) -> Result<Json<TripResponse>> {
    let trip = body(payload)?;
    if trip.name.trim().is_empty() || trip.destination.trim().is_empty() {
        return Err(TravelError::Validation(
            "Trip name and destination are required".to_string(),
        ));
    }

    let trip = state.trips.create_trip(&user_id, trip).await?;
    Ok(Json(trip.into()))
}

/// GET /api/hotels/search
pub async fn search_hotels(
    State(state): State<AppState>,
    params: std::result::Result<Query<HotelSearchParams>, QueryRejection>,
) -> Result<Json<HotelListResponse>> {
    let query = hotel_params(params)?.to_query();

    info!(target: "travel::http", destination = %query.destination, page = query.page, "hotel search");
    let result = state.hotels.search(&query).await;
    Ok(Json(result.into()))
}

/// GET /api/hotels/best-deals
pub async fn best_hotel_deals(
    State(state): State<AppState>,
    params: std::result::Result<Query<HotelSearchParams>, QueryRejection>,
) -> Result<Json<HotelListResponse>> {
    let params = hotel_params(params)?;
    let query = params.to_query();

    info!(target: "travel::http", destination = %query.destination, limit = params.limit(), "best hotel deals");
    let result = state.hotels.best_deals(&query, params.limit()).await;
    Ok(Json(result.into()))
}
