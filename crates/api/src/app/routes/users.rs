use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};

use shareit_core::UserId;
use shareit_infra::services::Services;

use crate::app::routes::common;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/:id", get(get_user).patch(update_user).delete(delete_user))
}

pub async fn create_user(
    Extension(services): Extension<Arc<Services>>,
    body: Result<Json<dto::CreateUserRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match common::body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let new_user = match body.into_new_user() {
        Ok(u) => u,
        Err(e) => return errors::domain_error_to_response(e),
    };

    common::respond(
        services.users.create(new_user).await,
        StatusCode::CREATED,
        dto::user_to_json,
    )
}

pub async fn list_users(Extension(services): Extension<Arc<Services>>) -> axum::response::Response {
    common::respond_list(services.users.list().await, dto::user_to_json)
}

pub async fn get_user(
    Extension(services): Extension<Arc<Services>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match common::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    common::respond(services.users.get(id).await, StatusCode::OK, dto::user_to_json)
}

pub async fn update_user(
    Extension(services): Extension<Arc<Services>>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateUserRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: UserId = match common::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match common::body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    common::respond(
        services.users.update(id, body.into()).await,
        StatusCode::OK,
        dto::user_to_json,
    )
}

pub async fn delete_user(
    Extension(services): Extension<Arc<Services>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match common::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    common::respond(services.users.delete(id).await, StatusCode::OK, dto::user_to_json)
}
