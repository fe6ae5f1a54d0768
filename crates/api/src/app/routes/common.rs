use std::str::FromStr;

use axum::{
    Json,
    extract::{
        Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};

use shareit_core::DomainError;
use shareit_infra::services::ServiceResult;

use crate::app::errors;

/// Unwrap a JSON body or answer 400.
pub fn body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(b)| b).map_err(errors::json_rejection)
}

/// Unwrap query parameters or answer 400.
pub fn query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, Response> {
    query.map(|Query(q)| q).map_err(errors::query_rejection)
}

/// Parse a numeric path id or answer 400.
pub fn path_id<T>(raw: &str) -> Result<T, Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(errors::domain_error_to_response)
}

pub fn respond<T>(
    result: ServiceResult<T>,
    status: StatusCode,
    to_json: impl FnOnce(T) -> serde_json::Value,
) -> Response {
    match result {
        Ok(value) => (status, Json(to_json(value))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub fn respond_list<T>(
    result: ServiceResult<Vec<T>>,
    to_json: impl FnMut(T) -> serde_json::Value,
) -> Response {
    respond(result, StatusCode::OK, |values| {
        serde_json::Value::Array(values.into_iter().map(to_json).collect())
    })
}
