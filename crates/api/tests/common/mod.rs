//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use agora_api::auth::jwt::{generate_access_token, JwtConfig};
use agora_api::config::ServerConfig;
use agora_api::router::build_app_router;
use agora_api::state::AppState;
use agora_core::multiloc::Multiloc;
use agora_core::types::DbId;
use agora_db::models::job::Job;
use agora_db::models::user::CreateUser;
use agora_db::repositories::{ProjectRepo, UserRepo};
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// The production router over `pool`, with test configuration.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

pub fn token(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).unwrap()
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, Method::GET, uri, token, None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn ml(en: &str) -> Multiloc {
    Multiloc::from([("en".to_string(), en.to_string())])
}

pub async fn user(pool: &PgPool, email: &str, role: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            first_name: None,
            last_name: None,
            role: role.to_string(),
            invite_status: None,
            email_opt_in: true,
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn project(pool: &PgPool, slug: &str) -> DbId {
    ProjectRepo::create(pool, slug, &ml(slug)).await.unwrap().id
}

pub async fn jobs_of_type(pool: &PgPool, job_type: &str) -> Vec<Job> {
    sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE job_type = $1 ORDER BY id")
        .bind(job_type)
        .fetch_all(pool)
        .await
        .unwrap()
}
