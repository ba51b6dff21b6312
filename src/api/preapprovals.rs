//! Pre-approval endpoints: employee-scheduled visits and daily limits

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{
        employee::EmployeeShort,
        enums::VisitStatus,
        visitor::{CreatePreApproval, UpdatePreApproval, VisitorResponse},
    },
    services::preapprovals::CategorizedVisitors,
};

/// Optional cancellation reason
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

/// Filters for the pre-approved visitor listing
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PreApprovalListQuery {
    /// Restrict to one visit date (YYYY-MM-DD)
    pub date: Option<NaiveDate>,
    /// Restrict to one status
    pub status: Option<VisitStatus>,
}

/// Date selector for the limits endpoint
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LimitsQuery {
    /// Day to check (YYYY-MM-DD); defaults to today
    pub date: Option<NaiveDate>,
}

/// Pre-approval confirmation with the quick access pass
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreApprovalResponse {
    pub message: String,
    pub visitor: VisitorResponse,
    pub pre_approval_token: Option<String>,
    /// PNG data URL encoding the admission payload
    pub qr_code: String,
    pub quick_check_in_url: String,
    pub instructions: String,
    pub email_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_error: Option<String>,
}

/// Display buckets for pre-approved visitors
#[derive(Serialize, ToSchema)]
pub struct CategorizedResponse {
    pub upcoming: Vec<VisitorResponse>,
    pub active: Vec<VisitorResponse>,
    pub expired: Vec<VisitorResponse>,
    pub completed: Vec<VisitorResponse>,
}

impl From<CategorizedVisitors> for CategorizedResponse {
    fn from(buckets: CategorizedVisitors) -> Self {
        Self {
            upcoming: buckets.upcoming.into_iter().map(Into::into).collect(),
            active: buckets.active.into_iter().map(Into::into).collect(),
            expired: buckets.expired.into_iter().map(Into::into).collect(),
            completed: buckets.completed.into_iter().map(Into::into).collect(),
        }
    }
}

/// An employee's pre-approved visitors
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreApprovedListResponse {
    pub employee: EmployeeShort,
    pub total_pre_approved: usize,
    pub visitors: Vec<VisitorResponse>,
    pub categorized: CategorizedResponse,
}

/// Daily quota snapshot
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LimitsInfo {
    pub max_visitors_per_day: i64,
    pub current_count: i64,
    pub remaining_slots: i64,
    pub can_create_more: bool,
}

/// Daily quota response
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LimitsResponse {
    pub employee: EmployeeShort,
    pub date: NaiveDate,
    pub limits: LimitsInfo,
    pub today_visitors: Vec<VisitorResponse>,
}

/// Pre-approval update confirmation
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreApprovalResponse {
    pub message: String,
    pub visitor: VisitorResponse,
    pub email_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_error: Option<String>,
}

/// Pre-approval cancellation confirmation
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelPreApprovalResponse {
    pub message: String,
    pub visitor: VisitorResponse,
    pub reason: String,
    pub email_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_error: Option<String>,
}

/// Pre-approve a scheduled visit on behalf of an employee
#[utoipa::path(
    post,
    path = "/employees/{id}/preapprovals",
    tag = "preapprovals",
    params(("id" = i32, Path, description = "Sponsoring employee ID")),
    request_body = CreatePreApproval,
    responses(
        (status = 201, description = "Visitor pre-approved", body = PreApprovalResponse),
        (status = 400, description = "Invalid time window"),
        (status = 404, description = "Employee not found"),
        (status = 422, description = "Daily visitor limit reached")
    )
)]
pub async fn create_preapproval(
    State(state): State<crate::AppState>,
    Path(employee_id): Path<i32>,
    Json(request): Json<CreatePreApproval>,
) -> AppResult<(StatusCode, Json<PreApprovalResponse>)> {
    let outcome = state
        .services
        .preapprovals
        .create(employee_id, request)
        .await?;

    let pre_approval_token = outcome.visitor.approval_token.clone();

    Ok((
        StatusCode::CREATED,
        Json(PreApprovalResponse {
            message: "Visitor pre-approved successfully".to_string(),
            visitor: outcome.visitor.into(),
            pre_approval_token,
            qr_code: outcome.qr_code,
            quick_check_in_url: outcome.quick_check_in_url,
            instructions:
                "Visitor can use QR code or token for quick check-in during the scheduled window"
                    .to_string(),
            email_sent: outcome.notification.sent,
            email_error: outcome.notification.error,
        }),
    ))
}

/// List an employee's pre-approved visitors, categorized for display
#[utoipa::path(
    get,
    path = "/employees/{id}/preapprovals",
    tag = "preapprovals",
    params(
        ("id" = i32, Path, description = "Sponsoring employee ID"),
        PreApprovalListQuery
    ),
    responses(
        (status = 200, description = "Pre-approved visitors", body = PreApprovedListResponse),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn list_preapprovals(
    State(state): State<crate::AppState>,
    Path(employee_id): Path<i32>,
    Query(query): Query<PreApprovalListQuery>,
) -> AppResult<Json<PreApprovedListResponse>> {
    let (employee, visitors, categorized) = state
        .services
        .preapprovals
        .list(employee_id, query.date, query.status)
        .await?;

    Ok(Json(PreApprovedListResponse {
        employee: EmployeeShort::from(&employee),
        total_pre_approved: visitors.len(),
        visitors: visitors.into_iter().map(Into::into).collect(),
        categorized: categorized.into(),
    }))
}

/// Check an employee's remaining daily pre-approval quota
#[utoipa::path(
    get,
    path = "/employees/{id}/preapprovals/limits",
    tag = "preapprovals",
    params(
        ("id" = i32, Path, description = "Sponsoring employee ID"),
        LimitsQuery
    ),
    responses(
        (status = 200, description = "Daily quota snapshot", body = LimitsResponse),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn check_limits(
    State(state): State<crate::AppState>,
    Path(employee_id): Path<i32>,
    Query(query): Query<LimitsQuery>,
) -> AppResult<Json<LimitsResponse>> {
    let outcome = state
        .services
        .preapprovals
        .check_limits(employee_id, query.date)
        .await?;

    Ok(Json(LimitsResponse {
        employee: EmployeeShort::from(&outcome.employee),
        date: outcome.date,
        limits: LimitsInfo {
            max_visitors_per_day: outcome.max_per_day,
            current_count: outcome.current_count,
            remaining_slots: outcome.remaining_slots,
            can_create_more: outcome.remaining_slots > 0,
        },
        today_visitors: outcome.visitors.into_iter().map(Into::into).collect(),
    }))
}

/// Update a pre-approved visit
#[utoipa::path(
    put,
    path = "/employees/{id}/preapprovals/{visitor_id}",
    tag = "preapprovals",
    params(
        ("id" = i32, Path, description = "Sponsoring employee ID"),
        ("visitor_id" = i32, Path, description = "Visitor ID")
    ),
    request_body = UpdatePreApproval,
    responses(
        (status = 200, description = "Pre-approval updated", body = UpdatePreApprovalResponse),
        (status = 403, description = "Not the sponsoring employee"),
        (status = 404, description = "Employee or visitor not found"),
        (status = 409, description = "Visit is no longer pre-approved")
    )
)]
pub async fn update_preapproval(
    State(state): State<crate::AppState>,
    Path((employee_id, visitor_id)): Path<(i32, i32)>,
    Json(changes): Json<UpdatePreApproval>,
) -> AppResult<Json<UpdatePreApprovalResponse>> {
    let outcome = state
        .services
        .preapprovals
        .update(employee_id, visitor_id, changes)
        .await?;

    Ok(Json(UpdatePreApprovalResponse {
        message: "Pre-approved visitor updated successfully".to_string(),
        visitor: outcome.visitor.into(),
        email_sent: outcome.notification.sent,
        email_error: outcome.notification.error,
    }))
}

/// Cancel a pre-approved visit
#[utoipa::path(
    delete,
    path = "/employees/{id}/preapprovals/{visitor_id}",
    tag = "preapprovals",
    params(
        ("id" = i32, Path, description = "Sponsoring employee ID"),
        ("visitor_id" = i32, Path, description = "Visitor ID")
    ),
    request_body = CancelRequest,
    responses(
        (status = 200, description = "Pre-approval cancelled", body = CancelPreApprovalResponse),
        (status = 403, description = "Not the sponsoring employee"),
        (status = 404, description = "Employee or visitor not found"),
        (status = 409, description = "Visit is no longer pre-approved")
    )
)]
pub async fn cancel_preapproval(
    State(state): State<crate::AppState>,
    Path((employee_id, visitor_id)): Path<(i32, i32)>,
    body: Option<Json<CancelRequest>>,
) -> AppResult<Json<CancelPreApprovalResponse>> {
    let request = body.map(|Json(request)| request).unwrap_or_default();

    let outcome = state
        .services
        .preapprovals
        .cancel(employee_id, visitor_id, request.reason)
        .await?;

    Ok(Json(CancelPreApprovalResponse {
        message: "Pre-approved visitor cancelled successfully".to_string(),
        visitor: outcome.visitor.into(),
        reason: outcome.reason,
        email_sent: outcome.notification.sent,
        email_error: outcome.notification.error,
    }))
}
