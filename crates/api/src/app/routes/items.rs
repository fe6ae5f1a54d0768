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

use shareit_core::ItemId;
use shareit_infra::services::Services;

use crate::app::routes::common;
use crate::app::{dto, errors};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_item).get(list_own_items))
        .route("/search", get(search_items))
        .route("/:id", get(get_item).patch(update_item))
        .route("/:id/comment", post(add_comment))
}

pub async fn create_item(
    Extension(services): Extension<Arc<Services>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<dto::CreateItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match common::body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let new_item = match body.into_new_item() {
        Ok(i) => i,
        Err(e) => return errors::domain_error_to_response(e),
    };

    common::respond(
        services.items.create(caller.user_id(), new_item).await,
        StatusCode::CREATED,
        dto::item_to_json,
    )
}

pub async fn update_item(
    Extension(services): Extension<Arc<Services>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: ItemId = match common::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match common::body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    common::respond(
        services.items.update(id, caller.user_id(), body.into()).await,
        StatusCode::OK,
        dto::item_to_json,
    )
}

pub async fn get_item(
    Extension(services): Extension<Arc<Services>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ItemId = match common::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    common::respond(
        services.items.details(id, caller.user_id()).await,
        StatusCode::OK,
        dto::item_details_to_json,
    )
}

pub async fn list_own_items(
    Extension(services): Extension<Arc<Services>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    common::respond_list(
        services.items.list_by_owner(caller.user_id()).await,
        dto::item_details_to_json,
    )
}

pub async fn search_items(
    Extension(services): Extension<Arc<Services>>,
    query: Result<Query<dto::SearchQuery>, QueryRejection>,
) -> axum::response::Response {
    let query = match common::query(query) {
        Ok(q) => q,
        Err(resp) => return resp,
    };
    let text = query.text.unwrap_or_default();
    common::respond_list(services.items.search(&text).await, dto::item_to_json)
}

pub async fn add_comment(
    Extension(services): Extension<Arc<Services>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::CreateCommentRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: ItemId = match common::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match common::body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let comment = match body.into_new_comment() {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };

    common::respond(
        services.comments.add(caller.user_id(), id, comment).await,
        StatusCode::CREATED,
        dto::comment_to_json,
    )
}
