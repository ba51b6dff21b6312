//! Approval workflow endpoints: token-based decisions, the pending queue,
//! and the expiry sweep

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::visitor::{ExpiredVisitor, Visitor, VisitorResponse},
};

/// Optional approval remarks
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ApproveRequest {
    pub remarks: Option<String>,
}

/// Optional rejection reason
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

/// Approval confirmation with the admission QR code
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveResponse {
    pub message: String,
    pub visitor: VisitorResponse,
    /// PNG data URL encoding the admission payload
    pub qr_code: String,
    pub check_in_url: String,
    pub email_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_error: Option<String>,
}

/// Rejection confirmation
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectResponse {
    pub message: String,
    pub visitor: VisitorResponse,
    pub reason: String,
    pub email_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_error: Option<String>,
}

/// A pending request with its decision links
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingApproval {
    pub visitor: VisitorResponse,
    pub approval_token: Option<String>,
    pub approval_expiry: Option<DateTime<Utc>>,
    pub approve_url: String,
    pub reject_url: String,
}

/// Pending queue listing
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingApprovalsResponse {
    pub count: usize,
    pub pending_approvals: Vec<PendingApproval>,
}

/// Expiry sweep report
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub message: String,
    pub expired_count: usize,
    pub expired_visitors: Vec<ExpiredVisitor>,
}

/// Approve a pending visit by its token
#[utoipa::path(
    post,
    path = "/approvals/approve/{token}",
    tag = "approvals",
    params(("token" = String, Path, description = "Approval token from the notification link")),
    request_body = ApproveRequest,
    responses(
        (status = 200, description = "Visitor approved", body = ApproveResponse),
        (status = 404, description = "Unknown approval token"),
        (status = 409, description = "Request already processed"),
        (status = 410, description = "Approval request has expired")
    )
)]
pub async fn approve_visitor(
    State(state): State<crate::AppState>,
    Path(token): Path<String>,
    body: Option<Json<ApproveRequest>>,
) -> AppResult<Json<ApproveResponse>> {
    let request = body.map(|Json(request)| request).unwrap_or_default();

    let outcome = state
        .services
        .lifecycle
        .approve(&token, request.remarks)
        .await?;

    let check_in_url = format!("/api/v1/visitors/{}/checkin", outcome.visitor.id);

    Ok(Json(ApproveResponse {
        message: "Visitor approved successfully".to_string(),
        visitor: outcome.visitor.into(),
        qr_code: outcome.qr_code,
        check_in_url,
        email_sent: outcome.notification.sent,
        email_error: outcome.notification.error,
    }))
}

/// Reject a pending visit by its token
#[utoipa::path(
    post,
    path = "/approvals/reject/{token}",
    tag = "approvals",
    params(("token" = String, Path, description = "Approval token from the notification link")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Visitor rejected", body = RejectResponse),
        (status = 404, description = "Unknown approval token"),
        (status = 409, description = "Request already processed")
    )
)]
pub async fn reject_visitor(
    State(state): State<crate::AppState>,
    Path(token): Path<String>,
    body: Option<Json<RejectRequest>>,
) -> AppResult<Json<RejectResponse>> {
    let request = body.map(|Json(request)| request).unwrap_or_default();

    let outcome = state
        .services
        .lifecycle
        .reject(&token, request.reason)
        .await?;

    Ok(Json(RejectResponse {
        message: "Visitor request rejected".to_string(),
        visitor: outcome.visitor.into(),
        reason: outcome.reason,
        email_sent: outcome.notification.sent,
        email_error: outcome.notification.error,
    }))
}

/// List all pending approval requests
#[utoipa::path(
    get,
    path = "/approvals/pending",
    tag = "approvals",
    responses(
        (status = 200, description = "Pending requests awaiting a decision", body = PendingApprovalsResponse)
    )
)]
pub async fn list_pending(
    State(state): State<crate::AppState>,
) -> AppResult<Json<PendingApprovalsResponse>> {
    let pending = state.services.lifecycle.pending_approvals(None).await?;
    Ok(Json(pending_response(&state, pending)))
}

/// List pending approval requests for one host employee
#[utoipa::path(
    get,
    path = "/approvals/pending/{employee_id}",
    tag = "approvals",
    params(("employee_id" = i32, Path, description = "Host employee ID")),
    responses(
        (status = 200, description = "Pending requests for the employee", body = PendingApprovalsResponse)
    )
)]
pub async fn list_pending_for_employee(
    State(state): State<crate::AppState>,
    Path(employee_id): Path<i32>,
) -> AppResult<Json<PendingApprovalsResponse>> {
    let pending = state
        .services
        .lifecycle
        .pending_approvals(Some(employee_id))
        .await?;
    Ok(Json(pending_response(&state, pending)))
}

/// Expire stale pending requests
#[utoipa::path(
    post,
    path = "/approvals/cleanup-expired",
    tag = "approvals",
    responses(
        (status = 200, description = "Sweep report", body = CleanupResponse)
    )
)]
pub async fn cleanup_expired(
    State(state): State<crate::AppState>,
) -> AppResult<Json<CleanupResponse>> {
    let outcome = state.services.lifecycle.sweep_expired().await?;

    let message = if outcome.expired_count == 0 {
        "No expired approval requests found".to_string()
    } else {
        format!(
            "{} expired approval requests cleaned up",
            outcome.expired_count
        )
    };

    Ok(Json(CleanupResponse {
        message,
        expired_count: outcome.expired_count,
        expired_visitors: outcome.expired,
    }))
}

fn pending_response(state: &crate::AppState, pending: Vec<Visitor>) -> PendingApprovalsResponse {
    let base_url = &state.config.visits.public_base_url;

    let pending_approvals: Vec<PendingApproval> = pending
        .into_iter()
        .map(|visitor| {
            let (approve_url, reject_url) = match &visitor.approval_token {
                Some(token) => (
                    format!("{}/api/v1/approvals/approve/{}", base_url, token),
                    format!("{}/api/v1/approvals/reject/{}", base_url, token),
                ),
                None => (String::new(), String::new()),
            };
            PendingApproval {
                approval_token: visitor.approval_token.clone(),
                approval_expiry: visitor.approval_expiry,
                approve_url,
                reject_url,
                visitor: visitor.into(),
            }
        })
        .collect();

    PendingApprovalsResponse {
        count: pending_approvals.len(),
        pending_approvals,
    }
}
