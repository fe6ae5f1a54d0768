use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use shareit_bookings::{BookingFilter, BookingShort, BookingWindow};
use shareit_core::{DomainError, DomainResult, ItemId, PageRequest, RequestId};
use shareit_infra::services::{BookingView, CommentView, ItemDetails, RequestView};
use shareit_items::{Item, ItemPatch, NewComment, NewItem};
use shareit_requests::NewItemRequest;
use shareit_users::{NewUser, User, UserPatch};

// -------------------------
// Request DTOs
// -------------------------
//
// Required fields are `Option` so that a missing field is a 400 with a field
// name rather than a body rejection.

fn required<T>(value: Option<T>, field: &'static str) -> DomainResult<T> {
    value.ok_or(DomainError::BlankField(field))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl CreateUserRequest {
    pub fn into_new_user(self) -> DomainResult<NewUser> {
        Ok(NewUser::new(
            required(self.name, "name")?,
            required(self.email, "email")?,
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(body: UpdateUserRequest) -> Self {
        UserPatch {
            name: body.name,
            email: body.email,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
    pub request_id: Option<i64>,
}

impl CreateItemRequest {
    pub fn into_new_item(self) -> DomainResult<NewItem> {
        Ok(NewItem {
            name: required(self.name, "name")?,
            description: required(self.description, "description")?,
            available: required(self.available, "available")?,
            request: self.request_id.map(RequestId::new),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

impl From<UpdateItemRequest> for ItemPatch {
    fn from(body: UpdateItemRequest) -> Self {
        ItemPatch {
            name: body.name,
            description: body.description,
            available: body.available,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: Option<String>,
}

impl CreateCommentRequest {
    pub fn into_new_comment(self) -> DomainResult<NewComment> {
        Ok(NewComment {
            text: required(self.text, "text")?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequestRequest {
    pub description: Option<String>,
}

impl CreateItemRequestRequest {
    pub fn into_new_request(self) -> DomainResult<NewItemRequest> {
        Ok(NewItemRequest {
            description: required(self.description, "description")?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub item_id: Option<i64>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl CreateBookingRequest {
    pub fn into_parts(self) -> DomainResult<(ItemId, BookingWindow)> {
        let item = ItemId::new(required(self.item_id, "itemId")?);
        let start = parse_timestamp(&required(self.start, "start")?)?;
        let end = parse_timestamp(&required(self.end, "end")?)?;
        Ok((item, BookingWindow::new(start, end)?))
    }
}

/// RFC 3339, or a zone-less ISO date-time taken as UTC.
pub fn parse_timestamp(raw: &str) -> DomainResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| DomainError::invalid_window(format!("unreadable timestamp {raw:?}")))
}

#[derive(Debug, Deserialize)]
pub struct ApproveQuery {
    pub approved: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub from: Option<i64>,
    pub size: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> DomainResult<PageRequest> {
        PageRequest::new(
            self.from.unwrap_or(0),
            self.size.unwrap_or(PageRequest::DEFAULT_SIZE as i64),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BookingListQuery {
    pub state: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

impl BookingListQuery {
    pub fn filter(&self) -> DomainResult<BookingFilter> {
        match self.state.as_deref() {
            None => Ok(BookingFilter::default()),
            Some(raw) => raw.parse(),
        }
    }

    pub fn page(&self) -> DomainResult<PageRequest> {
        PageQuery {
            from: self.from,
            size: self.size,
        }
        .page()
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

fn timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

pub fn user_to_json(user: User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
    })
}

pub fn item_to_json(item: Item) -> serde_json::Value {
    serde_json::json!({
        "id": item.id,
        "name": item.name,
        "description": item.description,
        "available": item.available,
        "ownerId": item.owner,
        "requestId": item.request,
    })
}

fn booking_short_to_json(short: Option<BookingShort>) -> serde_json::Value {
    match short {
        Some(b) => serde_json::json!({ "id": b.id, "bookerId": b.booker }),
        None => serde_json::Value::Null,
    }
}

pub fn comment_to_json(view: CommentView) -> serde_json::Value {
    serde_json::json!({
        "id": view.comment.id,
        "text": view.comment.text,
        "authorName": view.author_name,
        "created": timestamp(view.comment.created),
    })
}

pub fn item_details_to_json(details: ItemDetails) -> serde_json::Value {
    let mut json = item_to_json(details.item);
    json["lastBooking"] = booking_short_to_json(details.bookings.last);
    json["nextBooking"] = booking_short_to_json(details.bookings.next);
    json["comments"] = details
        .comments
        .into_iter()
        .map(comment_to_json)
        .collect::<Vec<_>>()
        .into();
    json
}

pub fn request_to_json(view: RequestView) -> serde_json::Value {
    serde_json::json!({
        "id": view.request.id,
        "description": view.request.description,
        "requesterId": view.request.requester,
        "created": timestamp(view.request.created),
        "items": view.items.into_iter().map(item_to_json).collect::<Vec<_>>(),
    })
}

pub fn booking_to_json(view: BookingView) -> serde_json::Value {
    serde_json::json!({
        "id": view.booking.id,
        "start": timestamp(view.booking.start),
        "end": timestamp(view.booking.end),
        "status": view.booking.status,
        "item": { "id": view.item.id, "name": view.item.name },
        "booker": { "id": view.booker.id, "name": view.booker.name },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_accept_rfc3339_and_local_iso() {
        let expected = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse_timestamp("2030-01-02T03:04:05Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2030-01-02T05:04:05+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2030-01-02T03:04:05").unwrap(), expected);
        assert!(parse_timestamp("tomorrow").is_err());
    }

    #[test]
    fn missing_booking_fields_are_named() {
        let body = CreateBookingRequest {
            item_id: Some(1),
            start: None,
            end: Some("2030-01-02T03:04:05".into()),
        };
        assert_eq!(body.into_parts().unwrap_err(), DomainError::BlankField("start"));
    }

    #[test]
    fn booking_query_defaults_to_all_first_page() {
        let q = BookingListQuery::default();
        assert_eq!(q.filter().unwrap(), BookingFilter::All);
        assert_eq!(q.page().unwrap(), PageRequest::default());

        let bad = BookingListQuery {
            state: Some("UNSUPPORTED_STATUS".into()),
            ..BookingListQuery::default()
        };
        assert_eq!(
            bad.filter().unwrap_err().to_string(),
            "Unknown state: UNSUPPORTED_STATUS"
        );
    }

    #[test]
    fn non_positive_page_size_is_rejected() {
        let q = PageQuery {
            from: Some(0),
            size: Some(0),
        };
        assert_eq!(q.page().unwrap_err(), DomainError::InvalidPageSize(0));
    }
}
