//! API client for the Trip Journal REST service.
//!
//! `JournalClient` owns the session, builds every request through
//! `RequestBuilder`, and hands it to a `Transport`. Each operation makes
//! exactly one round trip and never retries.

use std::sync::Arc;

use reqwest::{Method, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::request::{ContentType, RequestBuilder};
use super::{ApiError, ApiRequest, HttpResponse, ReqwestTransport, Transport};
use crate::auth::{AuthStatus, Session, Token};
use crate::codec;
use crate::models::{
    Event, EventCreate, EventUpdate, Media, MediaCreate, ResourceId, Trip, TripCreate, TripUpdate,
};

/// Service origin used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// Client for the journal service.
/// Clone is cheap - clones share the transport and the session.
#[derive(Clone)]
pub struct JournalClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
}

impl JournalClient {
    /// Create a client talking to `base_url` over a default `reqwest` transport
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new().map_err(|e| {
            ApiError::RequestConstruction(format!("Failed to build HTTP client: {e}"))
        })?;
        Self::with_transport(base_url, Arc::new(transport))
    }

    pub fn with_transport(base_url: &str, transport: Arc<dyn Transport>) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::RequestConstruction(format!("Invalid base URL {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::RequestConstruction(format!(
                "Base URL cannot carry a path: {base_url}"
            )));
        }

        Ok(Self {
            base_url,
            transport,
            session: Arc::new(Session::new()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ===== Session =====

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Subscribe to authentication transitions
    pub fn auth_status(&self) -> AuthStatus {
        self.session.subscribe()
    }

    /// Create an account and start a session with the issued token
    pub async fn register(&self, username: &str, password: &str) -> Result<Token, ApiError> {
        let body = codec::encode(&Credentials { username, password })?;
        let request = self.request(&["register"], Method::POST, false, ContentType::Json, Some(body))?;
        let token: Token = self.fetch(request).await?;
        self.session.authenticate(token.clone());
        Ok(token)
    }

    /// Exchange credentials for a token (OAuth2 password form)
    pub async fn login(&self, username: &str, password: &str) -> Result<Token, ApiError> {
        let body = codec::encode_form(&[
            ("grant_type", ""),
            ("username", username),
            ("password", password),
        ]);
        let request = self.request(
            &["token"],
            Method::POST,
            false,
            ContentType::FormUrlEncoded,
            Some(body),
        )?;
        let token: Token = self.fetch(request).await?;
        self.session.authenticate(token.clone());
        Ok(token)
    }

    /// Reinstate a token issued earlier, without contacting the service
    pub fn resume(&self, token: Token) {
        self.session.authenticate(token);
    }

    pub fn logout(&self) {
        self.session.clear();
    }

    // ===== Trips =====

    pub async fn create_trip(&self, trip: &TripCreate) -> Result<Trip, ApiError> {
        self.send_json(&["trips"], Method::POST, trip).await
    }

    pub async fn list_trips(&self) -> Result<Vec<Trip>, ApiError> {
        let request = self.request(&["trips"], Method::GET, true, ContentType::Json, None)?;
        self.fetch(request).await
    }

    pub async fn get_trip(&self, id: &ResourceId) -> Result<Trip, ApiError> {
        let id = id.to_string();
        let request = self.request(&["trips", &id], Method::GET, true, ContentType::Json, None)?;
        self.fetch(request).await
    }

    pub async fn update_trip(&self, id: &ResourceId, trip: &TripUpdate) -> Result<Trip, ApiError> {
        self.send_json(&["trips", &id.to_string()], Method::PUT, trip).await
    }

    pub async fn delete_trip(&self, id: &ResourceId) -> Result<(), ApiError> {
        self.delete(&["trips", &id.to_string()]).await
    }

    // ===== Events =====

    pub async fn create_event(&self, event: &EventCreate) -> Result<Event, ApiError> {
        self.send_json(&["events"], Method::POST, event).await
    }

    pub async fn update_event(&self, id: &ResourceId, event: &EventUpdate) -> Result<Event, ApiError> {
        self.send_json(&["events", &id.to_string()], Method::PUT, event).await
    }

    pub async fn delete_event(&self, id: &ResourceId) -> Result<(), ApiError> {
        self.delete(&["events", &id.to_string()]).await
    }

    // ===== Media =====

    pub async fn create_media(&self, media: &MediaCreate) -> Result<Media, ApiError> {
        self.send_json(&["media"], Method::POST, media).await
    }

    pub async fn delete_media(&self, id: &ResourceId) -> Result<(), ApiError> {
        self.delete(&["media", &id.to_string()]).await
    }

    // ===== Plumbing =====

    fn request(
        &self,
        segments: &[&str],
        method: Method,
        auth_required: bool,
        content_type: ContentType,
        body: Option<Vec<u8>>,
    ) -> Result<ApiRequest, ApiError> {
        let mut request = RequestBuilder::new(&self.base_url, &self.session).build(
            segments,
            method,
            auth_required,
            content_type,
        )?;
        request.body = body;
        Ok(request)
    }

    async fn send_json<B, T>(&self, segments: &[&str], method: Method, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = codec::encode(body)?;
        let request = self.request(segments, method, true, ContentType::Json, Some(body))?;
        self.fetch(request).await
    }

    async fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        let request = self.request(segments, Method::DELETE, true, ContentType::Any, None)?;
        self.execute(request).await?;
        Ok(())
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        codec::decode(&response.body)
    }

    /// Send the request and reject non-success statuses before any decoding.
    async fn execute(&self, request: ApiRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method.clone();
        let url = request.url.clone();
        debug!(
            method = %method,
            url = %url,
            authenticated = request.headers.contains_key(reqwest::header::AUTHORIZATION),
            "Sending request"
        );

        let response = self.transport.send(request).await.map_err(ApiError::Transport)?;

        if !response.status.is_success() {
            warn!(method = %method, url = %url, status = response.status.as_u16(), "Request failed");
            return Err(ApiError::from_status(response.status, &response.body));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use reqwest::{header, StatusCode};

    use super::*;
    use crate::api::TransportError;

    /// Records every request and answers from a queue of canned responses.
    #[derive(Default)]
    struct SpyTransport {
        requests: Mutex<Vec<ApiRequest>>,
        responses: Mutex<Vec<Result<HttpResponse, String>>>,
    }

    impl SpyTransport {
        fn respond(self: &Arc<Self>, status: u16, body: &str) -> Arc<Self> {
            self.responses.lock().unwrap().push(Ok(HttpResponse::new(
                StatusCode::from_u16(status).unwrap(),
                body.as_bytes().to_vec(),
            )));
            Arc::clone(self)
        }

        fn fail(self: &Arc<Self>, message: &str) -> Arc<Self> {
            self.responses.lock().unwrap().push(Err(message.to_string()));
            Arc::clone(self)
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last(&self) -> ApiRequest {
            self.requests.lock().unwrap().last().cloned().expect("no request recorded")
        }
    }

    #[async_trait]
    impl Transport for SpyTransport {
        async fn send(&self, request: ApiRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            let mut responses = self.responses.lock().unwrap();
            assert!(!responses.is_empty(), "unexpected request");
            responses.remove(0).map_err(|message| message.into())
        }
    }

    const TOKEN_JSON: &str = r#"{"access_token":"tok-1","token_type":"bearer"}"#;
    const TRIP_JSON: &str = r#"{"id":1,"name":"Paris","start_date":"2024-05-01T00:00:00Z","end_date":"2024-05-07T00:00:00Z","events":[]}"#;
    const EVENT_JSON: &str = r#"{"id":2,"name":"Louvre","date":"2024-05-02T10:00:00Z","medias":[]}"#;

    fn client(spy: &Arc<SpyTransport>) -> JournalClient {
        JournalClient::with_transport(DEFAULT_BASE_URL, spy.clone()).unwrap()
    }

    fn logged_in(spy: &Arc<SpyTransport>) -> JournalClient {
        let client = client(spy);
        client.resume(Token::bearer("tok-1"));
        client
    }

    fn body_json(request: &ApiRequest) -> serde_json::Value {
        serde_json::from_slice(request.body.as_deref().expect("missing body")).unwrap()
    }

    #[tokio::test]
    async fn test_login_sends_form_body() {
        let spy = Arc::new(SpyTransport::default()).respond(200, TOKEN_JSON);
        let client = client(&spy);

        let token = client.login("alice", "secret").await.unwrap();
        assert_eq!(token.access_token, "tok-1");
        assert_eq!(token.token_type, "bearer");
        assert!(client.is_authenticated());

        let req = spy.last();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url.as_str(), "http://localhost:8000/token");
        assert_eq!(req.headers[header::CONTENT_TYPE], "application/x-www-form-urlencoded");
        assert_eq!(req.headers[header::ACCEPT], "application/json");
        assert!(req.headers.get(header::AUTHORIZATION).is_none());
        assert_eq!(
            req.body.as_deref(),
            Some(&b"grant_type=&username=alice&password=secret"[..])
        );
    }

    #[tokio::test]
    async fn test_register_sends_json_and_authenticates() {
        let spy = Arc::new(SpyTransport::default()).respond(200, TOKEN_JSON);
        let client = client(&spy);

        client.register("bob", "hunter2").await.unwrap();
        assert!(client.is_authenticated());

        let req = spy.last();
        assert_eq!(req.url.as_str(), "http://localhost:8000/register");
        assert_eq!(req.headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(
            body_json(&req),
            serde_json::json!({"username": "bob", "password": "hunter2"})
        );
    }

    #[tokio::test]
    async fn test_failed_login_leaves_session_untouched() {
        let spy = Arc::new(SpyTransport::default())
            .respond(401, r#"{"detail":"Incorrect username or password"}"#)
            .respond(200, r#"{"token":"wrong-shape"}"#)
            .fail("connection refused");
        let client = client(&spy);
        let mut status = client.auth_status();

        let err = client.login("alice", "wrong").await.unwrap_err();
        assert!(err.is_unauthorized());
        let err = client.register("alice", "pw").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
        let err = client.login("alice", "pw").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));

        assert!(!client.is_authenticated());
        assert!(!status.is_authenticated());
        assert_eq!(status.version(), 0);

        client.logout();
        assert_eq!(status.changed().await, Some(false));
    }

    #[tokio::test]
    async fn test_auth_status_follows_transitions() {
        let spy = Arc::new(SpyTransport::default())
            .respond(200, TOKEN_JSON)
            .respond(200, TOKEN_JSON);
        let client = client(&spy);
        let mut status = client.auth_status();
        assert!(!status.is_authenticated());

        client.register("alice", "pw").await.unwrap();
        assert_eq!(status.changed().await, Some(true));

        client.logout();
        assert_eq!(status.changed().await, Some(false));
        assert!(!client.is_authenticated());

        client.login("alice", "pw").await.unwrap();
        assert_eq!(status.changed().await, Some(true));
        assert_eq!(status.version(), 3);

        // Clones share one session
        let other = client.clone();
        other.logout();
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_authenticated_calls_without_session_never_reach_transport() {
        let spy = Arc::new(SpyTransport::default());
        let client = client(&spy);
        let id = ResourceId::Int(1);
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let trip = TripCreate {
            name: "Paris".to_string(),
            start_date: date,
            end_date: date,
        };
        let event = EventUpdate {
            name: "Louvre".to_string(),
            note: None,
            date,
            location: None,
            transition_from_previous: None,
        };
        let media = MediaCreate {
            event_id: id.clone(),
            base64_data: vec![1, 2, 3],
        };

        let results = vec![
            client.create_trip(&trip).await.map(|_| ()),
            client.list_trips().await.map(|_| ()),
            client.get_trip(&id).await.map(|_| ()),
            client.update_trip(&id, &TripUpdate {
                name: "Paris".to_string(),
                start_date: date,
                end_date: date,
            }).await.map(|_| ()),
            client.delete_trip(&id).await,
            client.create_event(&EventCreate {
                trip_id: id.clone(),
                name: event.name.clone(),
                note: None,
                date,
                location: None,
                transition_from_previous: None,
            }).await.map(|_| ()),
            client.update_event(&id, &event).await.map(|_| ()),
            client.delete_event(&id).await,
            client.create_media(&media).await.map(|_| ()),
            client.delete_media(&id).await,
        ];
        for result in results {
            assert!(matches!(result, Err(ApiError::AuthenticationRequired)));
        }
        assert_eq!(spy.calls(), 0);
    }

    #[tokio::test]
    async fn test_create_trip_sends_snake_case_body_with_bearer() {
        let spy = Arc::new(SpyTransport::default()).respond(200, TRIP_JSON);
        let client = logged_in(&spy);

        let trip = client
            .create_trip(&TripCreate {
                name: "Paris".to_string(),
                start_date: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
                end_date: Utc.with_ymd_and_hms(2024, 5, 7, 0, 0, 0).unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(trip.id, ResourceId::Int(1));
        assert_eq!(trip.name, "Paris");

        let req = spy.last();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url.as_str(), "http://localhost:8000/trips");
        assert_eq!(req.headers[header::AUTHORIZATION], "Bearer tok-1");
        assert_eq!(
            body_json(&req),
            serde_json::json!({
                "name": "Paris",
                "start_date": "2024-05-01T00:00:00Z",
                "end_date": "2024-05-07T00:00:00Z",
            })
        );
    }

    #[tokio::test]
    async fn test_list_and_get_trips() {
        let spy = Arc::new(SpyTransport::default())
            .respond(200, &format!("[{TRIP_JSON}]"))
            .respond(200, TRIP_JSON);
        let client = logged_in(&spy);

        let trips = client.list_trips().await.unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(spy.last().method, Method::GET);
        assert!(spy.last().body.is_none());

        let trip = client.get_trip(&ResourceId::Int(1)).await.unwrap();
        assert_eq!(trip, trips[0]);
        assert_eq!(spy.last().url.as_str(), "http://localhost:8000/trips/1");
    }

    #[tokio::test]
    async fn test_get_missing_trip_is_service_error() {
        let spy = Arc::new(SpyTransport::default()).respond(404, r#"{"detail":"Trip not found"}"#);
        let client = logged_in(&spy);

        let err = client.get_trip(&"missing-id".into()).await.unwrap_err();
        match err {
            ApiError::Service { status, body } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert!(body.contains("Trip not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(spy.last().url.as_str(), "http://localhost:8000/trips/missing-id");
    }

    #[tokio::test]
    async fn test_opaque_ids_map_to_exactly_one_segment() {
        let spy = Arc::new(SpyTransport::default())
            .respond(204, "")
            .respond(204, "")
            .respond(204, "");
        let client = logged_in(&spy);

        for (id, expected) in [
            ("a/b", "http://localhost:8000/trips/a%2Fb"),
            ("1/", "http://localhost:8000/trips/1%2F"),
            ("../events/5", "http://localhost:8000/trips/..%2Fevents%2F5"),
        ] {
            client.delete_trip(&id.into()).await.unwrap();
            assert_eq!(spy.last().url.as_str(), expected);
        }

        for id in ["", ".", ".."] {
            let err = client.delete_trip(&id.into()).await.unwrap_err();
            assert!(matches!(err, ApiError::RequestConstruction(_)));
            let err = client.get_trip(&id.into()).await.unwrap_err();
            assert!(matches!(err, ApiError::RequestConstruction(_)));
        }
        assert_eq!(spy.calls(), 3);
    }

    #[tokio::test]
    async fn test_update_trip_puts_to_id_path() {
        let spy = Arc::new(SpyTransport::default()).respond(200, TRIP_JSON);
        let client = logged_in(&spy);
        let update = TripUpdate {
            name: "Paris".to_string(),
            start_date: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 5, 7, 0, 0, 0).unwrap(),
        };

        client.update_trip(&ResourceId::Int(1), &update).await.unwrap();
        let req = spy.last();
        assert_eq!(req.method, Method::PUT);
        assert_eq!(req.url.as_str(), "http://localhost:8000/trips/1");
        assert!(body_json(&req).get("id").is_none());
    }

    #[tokio::test]
    async fn test_deletes_send_wildcard_content_type_and_no_body() {
        let spy = Arc::new(SpyTransport::default())
            .respond(200, "")
            .respond(204, "")
            .respond(200, "null");
        let client = logged_in(&spy);
        let id = ResourceId::Int(9);

        client.delete_trip(&id).await.unwrap();
        let req = spy.last();
        assert_eq!(req.method, Method::DELETE);
        assert_eq!(req.url.as_str(), "http://localhost:8000/trips/9");
        assert_eq!(req.headers[header::CONTENT_TYPE], "*/*");
        assert_eq!(req.headers[header::AUTHORIZATION], "Bearer tok-1");
        assert!(req.body.is_none());

        client.delete_event(&id).await.unwrap();
        assert_eq!(spy.last().url.as_str(), "http://localhost:8000/events/9");
        client.delete_media(&id).await.unwrap();
        assert_eq!(spy.last().url.as_str(), "http://localhost:8000/media/9");
        assert_eq!(spy.calls(), 3);
    }

    #[tokio::test]
    async fn test_event_and_media_creation() {
        let spy = Arc::new(SpyTransport::default())
            .respond(200, EVENT_JSON)
            .respond(200, EVENT_JSON)
            .respond(200, r#"{"id":3,"url":"http://localhost:8000/media/3.jpg"}"#);
        let client = logged_in(&spy);
        let date = Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap();

        let event = client
            .create_event(&EventCreate {
                trip_id: ResourceId::Int(1),
                name: "Louvre".to_string(),
                note: None,
                date,
                location: None,
                transition_from_previous: None,
            })
            .await
            .unwrap();
        assert_eq!(event.date, date);
        assert_eq!(spy.last().url.as_str(), "http://localhost:8000/events");
        assert_eq!(body_json(&spy.last())["trip_id"], 1);

        client.update_event(&event.id, &EventUpdate::from(&event)).await.unwrap();
        assert_eq!(spy.last().method, Method::PUT);
        assert_eq!(spy.last().url.as_str(), "http://localhost:8000/events/2");

        let media = client
            .create_media(&MediaCreate {
                event_id: event.id.clone(),
                base64_data: b"jpeg".to_vec(),
            })
            .await
            .unwrap();
        assert_eq!(media.id, ResourceId::Int(3));
        assert_eq!(body_json(&spy.last())["base64_data"], "anBlZw==");
    }

    #[tokio::test]
    async fn test_decode_failure_names_field() {
        let spy = Arc::new(SpyTransport::default())
            .respond(200, r#"[{"id":1,"name":"Paris","start_date":"yesterday","end_date":"2024-05-07T00:00:00Z"}]"#);
        let client = logged_in(&spy);

        match client.list_trips().await.unwrap_err() {
            ApiError::Decode { path, .. } => assert_eq!(path, "[0].start_date"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_request_captures_token_at_build_time() {
        let spy = Arc::new(SpyTransport::default()).respond(200, "[]");
        let client = logged_in(&spy);
        let request = client
            .request(&["trips"], Method::GET, true, ContentType::Json, None)
            .unwrap();
        client.logout();

        assert_eq!(request.headers[header::AUTHORIZATION], "Bearer tok-1");
        let response = client.execute(request).await.unwrap();
        assert_eq!(response.body, b"[]");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let spy = Arc::new(SpyTransport::default());
        for base in ["not a url", "mailto:journal@example.com"] {
            let result = JournalClient::with_transport(base, spy.clone());
            assert!(matches!(result, Err(ApiError::RequestConstruction(_))));
        }
    }
}
