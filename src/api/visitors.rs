//! Visitor registration, query, and check-in/check-out endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::VisitStatus,
        visitor::{RegisterVisitor, UpdateVisitor, VisitorResponse, VisitorSearchQuery},
    },
};

/// Registration response
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub message: String,
    pub visitor_id: i32,
    pub badge_id: String,
    pub status: VisitStatus,
    pub upload_photo_url: String,
    /// Whether the host employee was alerted by email
    pub host_alert_sent: bool,
}

/// Photo upload response
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUploadResponse {
    pub message: String,
    pub photo_path: String,
}

/// Visitors filtered by one status
#[derive(Serialize, ToSchema)]
pub struct StatusListResponse {
    pub status: VisitStatus,
    pub count: usize,
    pub visitors: Vec<VisitorResponse>,
}

/// Free-text search result
#[derive(Serialize, ToSchema)]
pub struct SearchResponse {
    pub query: String,
    pub count: usize,
    pub visitors: Vec<VisitorResponse>,
}

/// Check-in confirmation
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub message: String,
    pub check_in_time: DateTime<Utc>,
    pub visitor: VisitorResponse,
}

/// Check-out confirmation
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutResponse {
    pub message: String,
    pub check_out_time: DateTime<Utc>,
    pub visitor: VisitorResponse,
}

/// Register a new walk-in visitor
#[utoipa::path(
    post,
    path = "/visitors",
    tag = "visitors",
    request_body = RegisterVisitor,
    responses(
        (status = 201, description = "Visitor registered, approval pending", body = RegistrationResponse),
        (status = 400, description = "Missing required field"),
        (status = 404, description = "Host employee not found")
    )
)]
pub async fn register_visitor(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterVisitor>,
) -> AppResult<(StatusCode, Json<RegistrationResponse>)> {
    let outcome = state.services.visitors.register(request).await?;

    let upload_photo_url = format!("/api/v1/visitors/{}/photo", outcome.visitor.id);

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            message: "Visitor registered successfully. Approval request sent to host employee."
                .to_string(),
            visitor_id: outcome.visitor.id,
            badge_id: outcome.visitor.visitor_badge_id,
            status: outcome.visitor.status,
            upload_photo_url,
            host_alert_sent: outcome.notification.sent,
        }),
    ))
}

/// Upload a photo for an existing visitor
#[utoipa::path(
    post,
    path = "/visitors/{id}/photo",
    tag = "visitors",
    params(("id" = i32, Path, description = "Visitor ID")),
    responses(
        (status = 200, description = "Photo stored", body = PhotoUploadResponse),
        (status = 400, description = "Missing or non-image file"),
        (status = 404, description = "Visitor not found")
    )
)]
pub async fn upload_photo(
    State(state): State<crate::AppState>,
    Path(visitor_id): Path<i32>,
    mut multipart: Multipart,
) -> AppResult<Json<PhotoUploadResponse>> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut original_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart data: {}", e)))?
    {
        if field.name() != Some("photo") {
            continue;
        }

        let content_type = field.content_type().map(|mime| mime.to_string());
        if !content_type
            .as_deref()
            .map_or(false, |mime| mime.starts_with("image/"))
        {
            return Err(AppError::Validation(
                "Only image files are allowed for visitor photos".to_string(),
            ));
        }

        original_name = field.file_name().map(|name| name.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read photo: {}", e)))?;
        file_bytes = Some(data.to_vec());
    }

    let bytes = file_bytes
        .ok_or_else(|| AppError::Validation("Photo file is required".to_string()))?;

    let photo_path = state
        .services
        .visitors
        .attach_photo(visitor_id, original_name.as_deref(), &bytes)
        .await?;

    Ok(Json(PhotoUploadResponse {
        message: "Photo uploaded successfully".to_string(),
        photo_path,
    }))
}

/// List all visitors, newest first
#[utoipa::path(
    get,
    path = "/visitors",
    tag = "visitors",
    responses(
        (status = 200, description = "All visitors", body = Vec<VisitorResponse>)
    )
)]
pub async fn list_visitors(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<VisitorResponse>>> {
    let visitors = state.services.visitors.list_all().await?;
    Ok(Json(visitors.into_iter().map(Into::into).collect()))
}

/// Get a visitor by ID
#[utoipa::path(
    get,
    path = "/visitors/{id}",
    tag = "visitors",
    params(("id" = i32, Path, description = "Visitor ID")),
    responses(
        (status = 200, description = "Visitor details", body = VisitorResponse),
        (status = 404, description = "Visitor not found")
    )
)]
pub async fn get_visitor(
    State(state): State<crate::AppState>,
    Path(visitor_id): Path<i32>,
) -> AppResult<Json<VisitorResponse>> {
    let visitor = state.services.visitors.get(visitor_id).await?;
    Ok(Json(visitor.into()))
}

/// List visitors by status
#[utoipa::path(
    get,
    path = "/visitors/status/{status}",
    tag = "visitors",
    params(("status" = String, Path, description = "Visit status")),
    responses(
        (status = 200, description = "Visitors in the given status", body = StatusListResponse),
        (status = 400, description = "Unknown status")
    )
)]
pub async fn list_visitors_by_status(
    State(state): State<crate::AppState>,
    Path(status): Path<String>,
) -> AppResult<Json<StatusListResponse>> {
    let status: VisitStatus = status.parse().map_err(|_| {
        AppError::Validation(format!(
            "Invalid status. Valid statuses: {}",
            VisitStatus::ALL.map(|s| s.as_str()).join(", ")
        ))
    })?;

    let visitors = state.services.visitors.list_by_status(status).await?;

    Ok(Json(StatusListResponse {
        status,
        count: visitors.len(),
        visitors: visitors.into_iter().map(Into::into).collect(),
    }))
}

/// Search visitors by name, phone, email, company or host name
#[utoipa::path(
    get,
    path = "/visitors/search",
    tag = "visitors",
    params(VisitorSearchQuery),
    responses(
        (status = 200, description = "Matching visitors", body = SearchResponse),
        (status = 400, description = "Missing search query")
    )
)]
pub async fn search_visitors(
    State(state): State<crate::AppState>,
    Query(query): Query<VisitorSearchQuery>,
) -> AppResult<Json<SearchResponse>> {
    let visitors = state.services.visitors.search(&query.query).await?;

    Ok(Json(SearchResponse {
        query: query.query,
        count: visitors.len(),
        visitors: visitors.into_iter().map(Into::into).collect(),
    }))
}

/// Update a visitor's contact and context fields
#[utoipa::path(
    put,
    path = "/visitors/{id}",
    tag = "visitors",
    params(("id" = i32, Path, description = "Visitor ID")),
    request_body = UpdateVisitor,
    responses(
        (status = 200, description = "Visitor updated", body = VisitorResponse),
        (status = 404, description = "Visitor not found")
    )
)]
pub async fn update_visitor(
    State(state): State<crate::AppState>,
    Path(visitor_id): Path<i32>,
    Json(fields): Json<UpdateVisitor>,
) -> AppResult<Json<VisitorResponse>> {
    let visitor = state.services.visitors.update(visitor_id, fields).await?;
    Ok(Json(visitor.into()))
}

/// Delete a visitor record (administrative operation)
#[utoipa::path(
    delete,
    path = "/visitors/{id}",
    tag = "visitors",
    params(("id" = i32, Path, description = "Visitor ID")),
    responses(
        (status = 204, description = "Visitor deleted"),
        (status = 404, description = "Visitor not found")
    )
)]
pub async fn delete_visitor(
    State(state): State<crate::AppState>,
    Path(visitor_id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.visitors.delete(visitor_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Check in an approved visitor
#[utoipa::path(
    post,
    path = "/visitors/{id}/checkin",
    tag = "visitors",
    params(("id" = i32, Path, description = "Visitor ID")),
    responses(
        (status = 200, description = "Visitor checked in", body = CheckInResponse),
        (status = 404, description = "Visitor not found"),
        (status = 409, description = "Visitor not approved for entry")
    )
)]
pub async fn check_in_visitor(
    State(state): State<crate::AppState>,
    Path(visitor_id): Path<i32>,
) -> AppResult<Json<CheckInResponse>> {
    let visitor = state.services.lifecycle.check_in(visitor_id).await?;
    let check_in_time = visitor.check_in_time.unwrap_or_else(Utc::now);

    Ok(Json(CheckInResponse {
        message: "Visitor checked in successfully".to_string(),
        check_in_time,
        visitor: visitor.into(),
    }))
}

/// Quick check-in for a pre-approved visit, gated on the arrival window
#[utoipa::path(
    post,
    path = "/visitors/quick-checkin/{token}",
    tag = "visitors",
    params(("token" = String, Path, description = "Pre-approval token")),
    responses(
        (status = 200, description = "Visitor checked in", body = CheckInResponse),
        (status = 404, description = "Unknown pre-approval token"),
        (status = 409, description = "Arrival window not open yet"),
        (status = 410, description = "Arrival window has passed")
    )
)]
pub async fn quick_check_in(
    State(state): State<crate::AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<CheckInResponse>> {
    let visitor = state.services.lifecycle.quick_check_in(&token).await?;
    let check_in_time = visitor.check_in_time.unwrap_or_else(Utc::now);

    Ok(Json(CheckInResponse {
        message: "Visitor checked in successfully".to_string(),
        check_in_time,
        visitor: visitor.into(),
    }))
}

/// Check out a checked-in visitor
#[utoipa::path(
    post,
    path = "/visitors/{id}/checkout",
    tag = "visitors",
    params(("id" = i32, Path, description = "Visitor ID")),
    responses(
        (status = 200, description = "Visitor checked out", body = CheckOutResponse),
        (status = 404, description = "Visitor not found"),
        (status = 409, description = "Visitor not checked in")
    )
)]
pub async fn check_out_visitor(
    State(state): State<crate::AppState>,
    Path(visitor_id): Path<i32>,
) -> AppResult<Json<CheckOutResponse>> {
    let visitor = state.services.lifecycle.check_out(visitor_id).await?;
    let check_out_time = visitor.check_out_time.unwrap_or_else(Utc::now);

    Ok(Json(CheckOutResponse {
        message: "Visitor checked out successfully".to_string(),
        check_out_time,
        visitor: visitor.into(),
    }))
}
