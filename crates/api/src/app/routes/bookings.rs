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

use shareit_core::{BookingId, DomainError};
use shareit_infra::services::Services;

use crate::app::routes::common;
use crate::app::{dto, errors};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_booking).get(list_my_bookings))
        .route("/owner", get(list_owner_bookings))
        .route("/:id", get(get_booking).patch(decide_booking))
}

pub async fn create_booking(
    Extension(services): Extension<Arc<Services>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<dto::CreateBookingRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match common::body(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let (item, window) = match body.into_parts() {
        Ok(parts) => parts,
        Err(e) => return errors::domain_error_to_response(e),
    };

    common::respond(
        services.bookings.create(caller.user_id(), item, window).await,
        StatusCode::CREATED,
        dto::booking_to_json,
    )
}

pub async fn decide_booking(
    Extension(services): Extension<Arc<Services>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    query: Result<Query<dto::ApproveQuery>, QueryRejection>,
) -> axum::response::Response {
    let id: BookingId = match common::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let approved = match common::query(query) {
        Ok(dto::ApproveQuery {
            approved: Some(approved),
        }) => approved,
        Ok(_) => return errors::domain_error_to_response(DomainError::BlankField("approved")),
        Err(resp) => return resp,
    };

    common::respond(
        services.bookings.approve(caller.user_id(), id, approved).await,
        StatusCode::OK,
        dto::booking_to_json,
    )
}

pub async fn get_booking(
    Extension(services): Extension<Arc<Services>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: BookingId = match common::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    common::respond(
        services.bookings.get(caller.user_id(), id).await,
        StatusCode::OK,
        dto::booking_to_json,
    )
}

pub async fn list_my_bookings(
    Extension(services): Extension<Arc<Services>>,
    Extension(caller): Extension<CallerContext>,
    query: Result<Query<dto::BookingListQuery>, QueryRejection>,
) -> axum::response::Response {
    let query = match common::query(query) {
        Ok(q) => q,
        Err(resp) => return resp,
    };
    let (filter, page) = match query.filter().and_then(|f| Ok((f, query.page()?))) {
        Ok(parts) => parts,
        Err(e) => return errors::domain_error_to_response(e),
    };
    common::respond_list(
        services
            .bookings
            .list_by_booker(caller.user_id(), filter, page)
            .await,
        dto::booking_to_json,
    )
}

pub async fn list_owner_bookings(
    Extension(services): Extension<Arc<Services>>,
    Extension(caller): Extension<CallerContext>,
    query: Result<Query<dto::BookingListQuery>, QueryRejection>,
) -> axum::response::Response {
    let query = match common::query(query) {
        Ok(q) => q,
        Err(resp) => return resp,
    };
    let (filter, page) = match query.filter().and_then(|f| Ok((f, query.page()?))) {
        Ok(parts) => parts,
        Err(e) => return errors::domain_error_to_response(e),
    };
    common::respond_list(
        services
            .bookings
            .list_by_owner(caller.user_id(), filter, page)
            .await,
        dto::booking_to_json,
    )
}
