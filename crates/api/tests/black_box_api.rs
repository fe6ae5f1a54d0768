use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use reqwest::StatusCode;
use serde_json::{Value, json};

use shareit_core::Clock;
use shareit_infra::services::Services;
use shareit_infra::store::InMemoryStore;

/// Clock the tests can move forward.
struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    fn advance(&self, by: ChronoDuration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

struct TestServer {
    base_url: String,
    clock: Arc<TestClock>,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let clock = Arc::new(TestClock(Mutex::new(Utc::now())));
        let services = Services::new(Arc::new(InMemoryStore::new()), clock.clone());

        // Same router as prod, bound to an ephemeral port.
        let app = shareit_api::app::build_app(Arc::new(services));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            clock,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn at(&self, offset: ChronoDuration) -> String {
        (self.clock.now() + offset).to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        caller: Option<i64>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = self.client.request(method, self.url(path));
        if let Some(caller) = caller {
            req = req.header("X-Sharer-User-Id", caller.to_string());
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req.send().await.unwrap();
        let status = res.status();
        let text = res.text().await.unwrap();
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap()
        };
        (status, body)
    }

    async fn create_user(&self, name: &str) -> i64 {
        let (status, body) = self
            .send(
                reqwest::Method::POST,
                "/users",
                None,
                Some(json!({ "name": name, "email": format!("{}@shareit.io", name.to_lowercase()) })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    async fn create_item(&self, owner: i64, name: &str) -> i64 {
        let (status, body) = self
            .send(
                reqwest::Method::POST,
                "/items",
                Some(owner),
                Some(json!({ "name": name, "description": format!("{name} for rent"), "available": true })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    async fn book(&self, booker: i64, item: i64, start: ChronoDuration, end: ChronoDuration) -> (StatusCode, Value) {
        self.send(
            reqwest::Method::POST,
            "/bookings",
            Some(booker),
            Some(json!({ "itemId": item, "start": self.at(start), "end": self.at(end) })),
        )
        .await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_needs_no_caller() {
    let srv = TestServer::spawn().await;
    let (status, _) = srv.send(reqwest::Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn caller_header_is_required_for_items() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.send(reqwest::Method::GET, "/items", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing_caller");

    let res = srv
        .client
        .get(srv.url("/bookings"))
        .header("X-Sharer-User-Id", "not-a-number")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_directory_lifecycle() {
    let srv = TestServer::spawn().await;
    let id = srv.create_user("Ann").await;

    let (status, body) = srv
        .send(
            reqwest::Method::POST,
            "/users",
            None,
            Some(json!({ "name": "Other", "email": "ann@shareit.io" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "email_conflict");

    let (status, body) = srv
        .send(
            reqwest::Method::POST,
            "/users",
            None,
            Some(json!({ "name": "Bad", "email": "not-an-email" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, body) = srv
        .send(
            reqwest::Method::PATCH,
            &format!("/users/{id}"),
            None,
            Some(json!({ "name": "Anna" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Anna");
    assert_eq!(body["email"], "ann@shareit.io");

    let (status, body) = srv
        .send(reqwest::Method::DELETE, &format!("/users/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Anna");

    let (status, _) = srv
        .send(reqwest::Method::GET, &format!("/users/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn booking_approval_flow() {
    let srv = TestServer::spawn().await;
    let owner = srv.create_user("Owner").await;
    let booker = srv.create_user("Booker").await;
    let item = srv.create_item(owner, "Tent").await;

    let (status, body) = srv
        .book(booker, item, ChronoDuration::days(1), ChronoDuration::days(2))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["status"], "WAITING");
    assert_eq!(body["item"]["name"], "Tent");
    assert_eq!(body["booker"]["id"], booker);
    let booking = body["id"].as_i64().unwrap();

    let (status, _) = srv
        .send(
            reqwest::Method::PATCH,
            &format!("/bookings/{booking}?approved=true"),
            Some(booker),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = srv
        .send(
            reqwest::Method::PATCH,
            &format!("/bookings/{booking}?approved=true"),
            Some(owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "APPROVED");

    let (status, body) = srv
        .send(
            reqwest::Method::PATCH,
            &format!("/bookings/{booking}?approved=false"),
            Some(owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_state_transition");

    let (status, _) = srv
        .send(reqwest::Method::GET, &format!("/bookings/{booking}"), Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn booking_rules_are_enforced_over_http() {
    let srv = TestServer::spawn().await;
    let owner = srv.create_user("Owner").await;
    let booker = srv.create_user("Booker").await;
    let item = srv.create_item(owner, "Kayak").await;

    let (status, _) = srv
        .book(owner, item, ChronoDuration::days(1), ChronoDuration::days(2))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = srv
        .book(booker, item, ChronoDuration::days(2), ChronoDuration::days(1))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = srv
        .book(booker, item, -ChronoDuration::days(1), ChronoDuration::days(1))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    srv.send(
        reqwest::Method::PATCH,
        &format!("/items/{item}"),
        Some(owner),
        Some(json!({ "available": false })),
    )
    .await;
    let (status, body) = srv
        .book(booker, item, ChronoDuration::days(1), ChronoDuration::days(2))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "booking_not_available");
}

#[tokio::test]
async fn booking_listing_filters_and_pages() {
    let srv = TestServer::spawn().await;
    let owner = srv.create_user("Owner").await;
    let booker = srv.create_user("Booker").await;
    let item = srv.create_item(owner, "Bike").await;

    for day in 1..=3 {
        let (status, _) = srv
            .book(
                booker,
                item,
                ChronoDuration::days(day),
                ChronoDuration::days(day) + ChronoDuration::hours(1),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = srv
        .send(reqwest::Method::GET, "/bookings?state=future", Some(booker), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let starts: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["start"].as_str().unwrap())
        .collect();
    assert_eq!(starts.len(), 3);
    assert!(starts[0] > starts[1] && starts[1] > starts[2]);

    let (_, page) = srv
        .send(
            reqwest::Method::GET,
            "/bookings/owner?state=ALL&from=1&size=1",
            Some(owner),
            None,
        )
        .await;
    assert_eq!(page.as_array().unwrap().len(), 1);
    assert_eq!(page[0]["start"], starts[1]);

    let (status, body) = srv
        .send(
            reqwest::Method::GET,
            "/bookings?state=UNSUPPORTED_STATUS",
            Some(booker),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown state: UNSUPPORTED_STATUS");

    let (status, _) = srv
        .send(reqwest::Method::GET, "/bookings?size=0", Some(booker), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = srv
        .send(reqwest::Method::GET, "/bookings", Some(999), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comments_open_once_rental_starts() {
    let srv = TestServer::spawn().await;
    let owner = srv.create_user("Owner").await;
    let booker = srv.create_user("Booker").await;
    let item = srv.create_item(owner, "Canoe").await;

    let (status, _) = srv
        .book(booker, item, ChronoDuration::days(10), ChronoDuration::days(11))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let comment_path = format!("/items/{item}/comment");
    let (status, body) = srv
        .send(
            reqwest::Method::POST,
            &comment_path,
            Some(booker),
            Some(json!({ "text": "Great canoe" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "comment_too_early");

    srv.clock.advance(ChronoDuration::days(10) + ChronoDuration::hours(1));

    let (status, body) = srv
        .send(
            reqwest::Method::POST,
            &comment_path,
            Some(booker),
            Some(json!({ "text": "Great canoe" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["authorName"], "Booker");

    let (status, _) = srv
        .send(
            reqwest::Method::POST,
            &comment_path,
            Some(owner),
            Some(json!({ "text": "I own it" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, for_owner) = srv
        .send(reqwest::Method::GET, &format!("/items/{item}"), Some(owner), None)
        .await;
    assert_eq!(for_owner["comments"][0]["text"], "Great canoe");
    assert!(for_owner["lastBooking"]["id"].is_i64());
    assert!(for_owner["nextBooking"].is_null());

    let (_, for_booker) = srv
        .send(reqwest::Method::GET, &format!("/items/{item}"), Some(booker), None)
        .await;
    assert!(for_booker["lastBooking"].is_null());
}

#[tokio::test]
async fn search_and_requests() {
    let srv = TestServer::spawn().await;
    let owner = srv.create_user("Owner").await;
    let seeker = srv.create_user("Seeker").await;

    let (status, request) = srv
        .send(
            reqwest::Method::POST,
            "/requests",
            Some(seeker),
            Some(json!({ "description": "Looking for a ladder" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let request_id = request["id"].as_i64().unwrap();

    let (status, _) = srv
        .send(
            reqwest::Method::POST,
            "/items",
            Some(owner),
            Some(json!({
                "name": "Ladder",
                "description": "Aluminium, 3m",
                "available": true,
                "requestId": request_id,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, found) = srv
        .send(reqwest::Method::GET, "/items/search?text=lAdDeR", Some(seeker), None)
        .await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (_, empty) = srv
        .send(reqwest::Method::GET, "/items/search?text=", Some(seeker), None)
        .await;
    assert_eq!(empty, json!([]));

    let (_, own) = srv
        .send(reqwest::Method::GET, "/requests", Some(seeker), None)
        .await;
    assert_eq!(own[0]["items"][0]["name"], "Ladder");

    let (_, others) = srv
        .send(reqwest::Method::GET, "/requests/all?from=0&size=10", Some(owner), None)
        .await;
    assert_eq!(others.as_array().unwrap().len(), 1);

    let (status, _) = srv
        .send(reqwest::Method::GET, "/requests/12345", Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
