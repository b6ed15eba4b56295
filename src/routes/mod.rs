pub mod admin;
pub mod contestants;
pub mod health;
pub mod monitoring;
pub mod pages;
pub mod questions;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_routes(static_dir: &str) -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1/app/newlywed", newlywed_routes())
        .nest("/api/v1/monitoring", monitoring_routes())
        .merge(pages::page_routes(static_dir))
}

fn newlywed_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Admin
        .route("/admin/login", post(admin::login))
        .route(
            "/admin/scoreboard",
            get(admin::get_scoreboard).post(admin::update_scoreboard),
        )
        .route("/admin/score", post(admin::update_score))
        .route("/round/update", post(admin::update_round))
        // Contestants
        .route(
            "/contestants",
            get(contestants::list_contestants).post(contestants::create_contestant),
        )
        .route(
            "/contestants/{id}",
            get(contestants::get_contestant).delete(contestants::delete_contestant),
        )
        .route("/contestants/{id}/score", post(contestants::send_team_score))
        // Questions
        .route("/questions", post(questions::publish_question))
        .route("/questions/current", get(questions::get_current_question))
        .route(
            "/questions/queue",
            get(questions::get_queue)
                .post(questions::enqueue_question)
                .delete(questions::clear_queue),
        )
        .route("/questions/queue/next", post(questions::next_question))
        // Display cues
        .route("/questions/display", post(questions::display_question))
        .route("/questions/change", post(questions::change_question))
        .route("/questions/format", post(questions::format_question))
        .route("/questions/show", post(questions::show_question))
        .route("/questions/hide", post(questions::hide_question))
        .route("/questions/choices/reveal", post(questions::reveal_choices))
        .route("/questions/answer/reveal", post(questions::reveal_answer))
        .route("/questions/answer/highlight", post(questions::highlight_answer))
        .route("/questions/answer/reset", post(questions::reset_answer))
        .route("/facts/display", post(questions::display_fact))
        .route("/facts/change", post(questions::change_fact))
        .route("/facts/reveal", post(questions::reveal_fact))
}

fn monitoring_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(monitoring::basic_health))
        .route("/health/detailed", get(monitoring::detailed_health))
        .route("/sockets", get(monitoring::socket_stats))
}

#[cfg(test)]
mod tests {
    use crate::{auth, build_router, test_state, AppState};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn admin_token(state: &AppState) -> String {
        auth::generate_token("admin", &state.config.security.jwt_secret, 1).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let app = build_router(test_state().await);
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_admin_routes_require_token() {
        let app = build_router(test_state().await);
        let response = app
            .oneshot(
                Request::get("/api/v1/app/newlywed/admin/scoreboard")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_login_then_read_scoreboard() {
        let app = build_router(test_state().await);

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/v1/app/newlywed/admin/login",
                None,
                json!({"username": "admin", "passcode": "gameshow123"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let token = json_body(response).await["token"]
            .as_str()
            .unwrap()
            .to_string();

        let mut request = Request::get("/api/v1/app/newlywed/admin/scoreboard")
            .body(Body::empty())
            .unwrap();
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["contestants"].as_array().unwrap().len(), 3);
        assert_eq!(body["round"], 1);
    }

    #[tokio::test]
    async fn test_token_accepted_from_query() {
        let state = test_state().await;
        let token = admin_token(&state);
        let app = build_router(state);

        let response = app
            .oneshot(
                Request::get(format!("/api/v1/monitoring/sockets?token={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["total"], 0);
    }

    #[tokio::test]
    async fn test_score_update_round_trip() {
        let state = test_state().await;
        let token = admin_token(&state);
        let app = build_router(state.clone());

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/v1/app/newlywed/admin/score",
                Some(&token),
                json!({"id": 2, "score": 45}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["score"], 45);

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/v1/app/newlywed/admin/score",
                Some(&token),
                json!({"id": 8, "score": 45}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "Contestant not found");

        assert_eq!(state.scoreboard.contestant(2).await.unwrap().score, 45);
    }

    #[tokio::test]
    async fn test_round_update_without_round_is_bad_request() {
        let state = test_state().await;
        let token = admin_token(&state);
        let app = build_router(state);

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/v1/app/newlywed/round/update",
                Some(&token),
                json!({"mode": 3}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Round number is required");
    }

    #[tokio::test]
    async fn test_public_contestant_list() {
        let app = build_router(test_state().await);
        let response = app
            .oneshot(
                Request::get("/api/v1/app/newlywed/contestants")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_contestant_returns_created() {
        let state = test_state().await;
        let token = admin_token(&state);
        let app = build_router(state);

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/v1/app/newlywed/contestants",
                Some(&token),
                json!({"name": "Nguyens"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json_body(response).await["id"], 3);
    }

    #[tokio::test]
    async fn test_answer_reveal_rejects_bad_id() {
        let state = test_state().await;
        let token = admin_token(&state);
        let app = build_router(state);

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/v1/app/newlywed/questions/answer/reveal",
                Some(&token),
                json!({"answerId": "q"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_monitoring_health_is_public() {
        let app = build_router(test_state().await);
        let response = app
            .oneshot(
                Request::get("/api/v1/monitoring/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "healthy");
    }
}
