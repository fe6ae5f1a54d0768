use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};

use shareit_core::RequestId;
use shareit_infra::services::Services;

use crate::app::routes::common;
use crate::app::{dto, errors};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_request).get(list_own_requests))
        .route("/all", get(list_other_requests))
        .route("/:id", get(get_request))
}

pub async fn create_request(
    Extension(services): Extension<Arc<Services>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<dto::CreateItemRequestRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match common::body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let request = match body.into_new_request() {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    common::respond(
        services.requests.create(caller.user_id(), request).await,
        StatusCode::CREATED,
        dto::request_to_json,
    )
}

pub async fn list_own_requests(
    Extension(services): Extension<Arc<Services>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    common::respond_list(
        services.requests.list_by_requester(caller.user_id()).await,
        dto::request_to_json,
    )
}

pub async fn list_other_requests(
    Extension(services): Extension<Arc<Services>>,
    Extension(caller): Extension<CallerContext>,
    query: Result<Query<dto::PageQuery>, QueryRejection>,
) -> axum::response::Response {
    let query = match common::query(query) {
        Ok(q) => q,
        Err(resp) => return resp,
    };
    let page = match query.page() {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };
    common::respond_list(
        services.requests.list_of_others(caller.user_id(), page).await,
        dto::request_to_json,
    )
}

pub async fn get_request(
    Extension(services): Extension<Arc<Services>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: RequestId = match common::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    common::respond(
        services.requests.get(Some(caller.user_id()), id).await,
        StatusCode::OK,
        dto::request_to_json,
    )
}
