use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use travel_assistant_rs::{
    http::{router, AppState},
    BookingClient, GenerativeModel, HotelFinder, SqliteStore, StaticTokens, TravelAssistant,
    TravelError,
};

const BOUNDARY: &str = "travel-test-boundary";

const MODEL_REPLY: &str = r#"RESPONSE:
Lisbon is a joy in late spring: long evenings, tiled streets, and fresh seafood everywhere.

TASKS:
[{"title": "Book Flight to Lisbon", "description": "Round trip to LIS", "category": "transportation", "priority": "high", "suggestedDueDate": "+14 days"}]"#;

#[derive(Debug, Default)]
struct ScriptedModel {
    reply: Option<String>,
    last_mime: Mutex<Option<String>>,
}

impl ScriptedModel {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            ..Default::default()
        }
    }

    fn failing() -> Self {
        Self::default()
    }

    fn answer(&self) -> travel_assistant_rs::Result<String> {
        self.reply
            .clone()
            .ok_or_else(|| TravelError::Model("quota exceeded".to_string()))
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _prompt: &str) -> travel_assistant_rs::Result<String> {
        self.answer()
    }

    async fn generate_from_image(
        &self,
        _image: &[u8],
        mime_type: &str,
        _prompt: &str,
    ) -> travel_assistant_rs::Result<String> {
        *self.last_mime.lock().unwrap() = Some(mime_type.to_string());
        self.answer()
    }
}

fn app_with(model: Arc<ScriptedModel>) -> Router {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let state = AppState::new(TravelAssistant::new(model), store)
        .with_identity(Arc::new(StaticTokens::new().with_token("abc", "alice")));
    router(state)
}

fn app(model: ScriptedModel) -> Router {
    app_with(Arc::new(model))
}

fn hotel_app(hotels: HotelFinder) -> Router {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let state = AppState::new(TravelAssistant::new(Arc::new(ScriptedModel::failing())), store)
        .with_hotels(hotels);
    router(state)
}

fn booking_finder(server: &mockito::ServerGuard) -> HotelFinder {
    HotelFinder::new(Arc::new(
        BookingClient::new("rapid-key".to_string()).with_base_url(server.url()),
    ))
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn multipart_request(parts: &[(&str, Option<(&str, &str)>, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, file, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file {
            Some((filename, content_type)) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/travel/image-upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app(ScriptedModel::failing())
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_assistant_requires_query() {
    let app = app(ScriptedModel::replying(MODEL_REPLY));

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/travel/assistant", json!({ "sessionId": "s1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Query is required");

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/travel/assistant", json!({ "query": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Query is required");
}

#[tokio::test]
async fn test_assistant_rejects_malformed_json() {
    let app = app(ScriptedModel::replying(MODEL_REPLY));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/travel/assistant")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"query\": "))
        .unwrap();

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_assistant_returns_narrative_and_tasks() {
    let app = app(ScriptedModel::replying(MODEL_REPLY));

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/travel/assistant",
            json!({ "query": "Plan a trip to Lisbon", "sessionId": "s1" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"].as_str().unwrap().starts_with("Lisbon is a joy"));
    assert_eq!(body["sessionId"], "s1");
    assert_eq!(body["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(body["tasks"][0]["title"], "Book Flight to Lisbon");
    assert_eq!(body["tasks"][0]["category"], "transportation");
    assert!(body.get("savedTasks").is_none());
}

#[tokio::test]
async fn test_assistant_falls_back_when_model_fails() {
    let app = app(ScriptedModel::failing());

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/travel/assistant",
            json!({ "query": "I want to visit Paris" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]
        .as_str()
        .unwrap()
        .starts_with("Paris is the perfect destination"));
    assert_eq!(body["tasks"][0]["title"], "Research Paris requirements");
    assert_eq!(body["tasks"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_assistant_saves_tasks_and_trip() {
    let app = app(ScriptedModel::replying(MODEL_REPLY));

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/travel/assistant",
            json!({ "query": "Plan a trip to Lisbon", "saveTasks": true }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trip"]["name"], "Lisbon Trip");
    assert_eq!(body["trip"]["status"], "planning");
    let saved = body["savedTasks"].as_array().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0]["aiGenerated"], true);
    assert_eq!(saved[0]["tripId"], body["trip"]["id"]);
    assert!(saved[0]["dueDate"].is_string());

    let (_, tasks) = send(&app, get("/api/tasks")).await;
    assert_eq!(tasks["tasks"].as_array().unwrap().len(), 1);
    let (_, trips) = send(&app, get("/api/trips")).await;
    assert_eq!(trips["trips"][0]["destination"], "Lisbon");
}

#[tokio::test]
async fn test_lowercase_query_names_trip_after_destination() {
    let app = app(ScriptedModel::failing());

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/travel/assistant",
            json!({ "query": "i want to visit bali", "saveTasks": true }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_str().unwrap().contains("Ubud"));
    assert_eq!(body["trip"]["name"], "Bali Trip");
    assert_eq!(body["trip"]["destination"], "Bali");
}

#[tokio::test]
async fn test_task_crud() {
    let app = app(ScriptedModel::failing());

    let (status, created) = send(
        &app,
        json_request(
            Method::POST,
            "/api/tasks",
            json!({ "title": "Get travel insurance", "priority": "high" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["task"]["status"], "pending");
    assert_eq!(created["task"]["category"], "preparation");
    let id = created["task"]["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/tasks/{id}"),
            json!({ "status": "in-progress" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["task"]["status"], "in-progress");
    assert_eq!(updated["task"]["priority"], "high");

    let (_, listed) = send(&app, get("/api/tasks")).await;
    assert_eq!(listed["success"], true);
    assert_eq!(listed["tasks"][0]["status"], "in-progress");

    let delete = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/tasks/{id}"))
        .body(Body::empty())
        .unwrap();
    let (status, deleted) = send(&app, delete).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Task deleted successfully");

    let (status, missing) = send(
        &app,
        json_request(Method::PUT, &format!("/api/tasks/{id}"), json!({ "title": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["message"], "Task not found");
}

#[tokio::test]
async fn test_update_task_null_clears_due_date_and_tips() {
    let app = app(ScriptedModel::failing());

    let (_, created) = send(
        &app,
        json_request(
            Method::POST,
            "/api/tasks",
            json!({ "title": "Renew passport", "dueDate": "2025-03-01", "tips": "Allow six weeks" }),
        ),
    )
    .await;
    let id = created["task"]["id"].as_i64().unwrap();
    assert_eq!(created["task"]["dueDate"], "2025-03-01");

    let (status, updated) = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/tasks/{id}"),
            json!({ "dueDate": null, "tips": null }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["task"]["dueDate"], Value::Null);
    assert!(updated["task"].get("tips").is_none());
    assert_eq!(updated["task"]["title"], "Renew passport");
}

#[tokio::test]
async fn test_create_task_requires_title() {
    let app = app(ScriptedModel::failing());

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/tasks", json!({ "title": " " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Title is required");
}

#[tokio::test]
async fn test_bearer_token_scopes_tasks_to_user() {
    let app = app(ScriptedModel::failing());
    let mut request = json_request(Method::POST, "/api/tasks", json!({ "title": "Pack" }));
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
    let (_, created) = send(&app, request).await;
    assert_eq!(created["task"]["userId"], "alice");

    let (_, anonymous) = send(&app, get("/api/tasks")).await;
    assert!(anonymous["tasks"].as_array().unwrap().is_empty());

    let mut with_bad_token = get("/api/tasks");
    with_bad_token
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer nope".parse().unwrap());
    let (status, fallback) = send(&app, with_bad_token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(fallback["tasks"].as_array().unwrap().is_empty());

    let id = created["task"]["id"].as_i64().unwrap();
    let delete = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/tasks/{id}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trips_create_and_list() {
    let app = app(ScriptedModel::failing());

    let (status, created) = send(
        &app,
        json_request(
            Method::POST,
            "/api/trips",
            json!({ "name": "Tokyo Spring", "destination": "Tokyo", "budget": 3500.0, "travelers": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["trip"]["status"], "idea");

    let (_, listed) = send(&app, get("/api/trips")).await;
    assert_eq!(listed["trips"][0]["name"], "Tokyo Spring");

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/trips", json!({ "name": "", "destination": "Rome" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_image_upload_analyzes_image() {
    let model = Arc::new(ScriptedModel::replying(MODEL_REPLY));
    let app = app_with(model.clone());

    let (status, body) = send(
        &app,
        multipart_request(&[
            ("image", Some(("tram.png", "image/png")), [0x89, 0x50, 0x4e, 0x47].as_slice()),
            ("message", None, b"Where is this?".as_slice()),
            ("sessionId", None, b"img-1".as_slice()),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_str().unwrap().starts_with("Lisbon is a joy"));
    assert_eq!(body["sessionId"], "img-1");
    assert_eq!(body["tasks"][0]["title"], "Book Flight to Lisbon");
    assert_eq!(model.last_mime.lock().unwrap().as_deref(), Some("image/png"));
}

#[tokio::test]
async fn test_image_upload_requires_image() {
    let app = app(ScriptedModel::replying(MODEL_REPLY));

    let (status, body) = send(
        &app,
        multipart_request(&[("message", None, b"Where is this?".as_slice())]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Image is required");
}

#[tokio::test]
async fn test_image_upload_reports_model_failure() {
    let app = app(ScriptedModel::failing());

    let (status, body) = send(
        &app,
        multipart_request(&[("image", Some(("x.jpg", "image/jpeg")), [0xff, 0xd8, 0xff].as_slice())]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "Failed to generate AI response");
}

#[tokio::test]
async fn test_hotel_search_without_api_key_serves_curated_listings() {
    let app = hotel_app(HotelFinder::offline());

    let (status, body) = send(&app, get("/api/hotels/search?destination=Bali&currency=EUR")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 8);
    assert_eq!(body["dataSource"], "Curated hotel chains");
    assert!(body["message"].is_string());
    assert_eq!(body["hotels"][0]["name"], "The Westin Bali City Center");
    assert_eq!(body["hotels"][0]["provider"], "curated");
    assert_eq!(body["hotels"][0]["currency"], "EUR");
}

#[tokio::test]
async fn test_hotel_search_defaults_to_new_york() {
    let app = hotel_app(HotelFinder::offline());

    let (status, body) = send(&app, get("/api/hotels/search?adults=lots")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["hotels"][0]["name"].as_str().unwrap().contains("New York"));
}

#[tokio::test]
async fn test_hotel_search_returns_live_listings() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/hotels/searchHotels")
        .match_header("x-rapidapi-key", "rapid-key")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("dest_id".into(), "Lisbon".into()),
            mockito::Matcher::UrlEncoded("adults".into(), "3".into()),
            mockito::Matcher::UrlEncoded("page_number".into(), "2".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({ "data": { "hotels": [
                { "hotel_id": 42, "hotel_name": "Memmo Alfama", "min_total_price": 240, "review_score": 9.1 }
            ] } })
            .to_string(),
        )
        .create_async()
        .await;
    let app = hotel_app(booking_finder(&server));

    let (status, body) = send(
        &app,
        get("/api/hotels/search?destination=Lisbon&adults=3&pageNumber=2"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dataSource"], "Booking.com API");
    assert_eq!(body["count"], 1);
    assert_eq!(body["hotels"][0]["id"], "42");
    assert_eq!(body["hotels"][0]["provider"], "booking");
    assert!(body.get("message").is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_hotel_search_falls_back_when_api_fails() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v1/hotels/searchHotels")
        .match_query(mockito::Matcher::Any)
        .with_status(429)
        .with_body(r#"{"message":"Too many requests"}"#)
        .create_async()
        .await;
    let app = hotel_app(booking_finder(&server));

    let (status, body) = send(&app, get("/api/hotels/search?destination=Tokyo")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dataSource"], "Curated hotel chains");
    assert_eq!(body["count"], 8);
    assert!(body["hotels"][0]["name"].as_str().unwrap().contains("Tokyo"));
}

#[tokio::test]
async fn test_best_deals_are_rated_and_limited() {
    let app = hotel_app(HotelFinder::offline());

    let (status, body) = send(&app, get("/api/hotels/best-deals?destination=Paris&limit=3")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    let ratings: Vec<f64> = body["hotels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|hotel| hotel["rating"].as_f64().unwrap())
        .collect();
    assert!(ratings.windows(2).all(|pair| pair[0] >= pair[1]));
}
