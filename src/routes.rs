// routes.rs
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::services::PollService;

pub fn create_routes(service: PollService) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/poll", post(handlers::create_poll).get(handlers::list_polls))
        .route("/poll/{id}", get(handlers::get_poll))
        .route("/poll/{id}/choice", get(handlers::list_choices))
        .route("/poll/{id}/result", get(handlers::get_result))
        .route("/choice", post(handlers::create_choice))
        .route("/choice/{id}/vote", post(handlers::cast_vote))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::clock::testing::ManualClock;
    use crate::store::MemoryStore;

    fn app(clock: Arc<ManualClock>) -> Router {
        let service = PollService::new(Arc::new(MemoryStore::new()), clock, Duration::from_secs(1));
        create_routes(service)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn vote_and_read_result_end_to_end() {
        let app = app(Arc::new(ManualClock::at("2024-06-01 12:00")));

        let (status, poll) = send(&app, Method::POST, "/poll", Some(json!({ "title": "Best Language?" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(poll["expireAt"], "2024-07-01 12:00");
        let poll_id = poll["id"].as_str().unwrap().to_string();

        let mut choice_ids = Vec::new();
        for title in ["Rust", "Go"] {
            let (status, choice) = send(
                &app,
                Method::POST,
                "/choice",
                Some(json!({ "title": title, "poolId": poll_id })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(choice["poolId"], poll_id.as_str());
            choice_ids.push(choice["id"].as_str().unwrap().to_string());
        }

        for (choice_id, votes) in choice_ids.iter().zip([2, 3]) {
            for _ in 0..votes {
                let (status, vote) = send(&app, Method::POST, &format!("/choice/{choice_id}/vote"), None).await;
                assert_eq!(status, StatusCode::CREATED);
                assert_eq!(vote["createdAt"], "2024-06-01 12:00");
            }
        }

        let (status, result) = send(&app, Method::GET, &format!("/poll/{poll_id}/result"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["pollId"], poll_id.as_str());
        assert_eq!(result["title"], "Best Language?");
        assert_eq!(result["result"], json!({ "title": "Go", "votes": 3 }));

        let (status, choices) = send(&app, Method::GET, &format!("/poll/{poll_id}/choice"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(choices.as_array().map(Vec::len), Some(2));

        let (status, polls) = send(&app, Method::GET, "/poll", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(polls[0]["title"], "Best Language?");
    }

    #[tokio::test]
    async fn status_codes_follow_the_error_kind() {
        let clock = Arc::new(ManualClock::at("2024-06-01 12:00"));
        let app = app(clock.clone());

        let (status, _) = send(&app, Method::POST, "/poll", Some(json!({ "expireAt": "2024-06-02 00:00" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(&app, Method::POST, "/poll", Some(json!({ "title": 7 }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, poll) = send(
            &app,
            Method::POST,
            "/poll",
            Some(json!({ "title": "short", "expireAt": "2024-06-01 12:05" })),
        )
        .await;
        let poll_id = poll["id"].as_str().unwrap().to_string();

        let choice = json!({ "title": "yes", "poolId": poll_id });
        let (_, created) = send(&app, Method::POST, "/choice", Some(choice.clone())).await;
        let choice_id = created["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, Method::POST, "/choice", Some(choice)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "CONFLICT");

        let missing = uuid::Uuid::new_v4();
        let (status, _) = send(
            &app,
            Method::POST,
            "/choice",
            Some(json!({ "title": "x", "poolId": missing.to_string() })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::GET, &format!("/poll/{missing}/choice"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::GET, &format!("/poll/{missing}/result"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::POST, &format!("/choice/{missing}/vote"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::POST, "/choice/not-an-id/vote", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        clock.set("2024-06-01 12:06");
        let (status, body) = send(&app, Method::POST, &format!("/choice/{choice_id}/vote"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "EXPIRED");
        let (status, _) = send(
            &app,
            Method::POST,
            "/choice",
            Some(json!({ "title": "late", "poolId": poll_id })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn root_answers_hello() {
        let app = app(Arc::new(ManualClock::at("2024-06-01 12:00")));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Hello World");
    }
}
