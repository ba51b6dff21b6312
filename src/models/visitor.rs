//! Visitor model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::VisitStatus;

/// Visitor row from database (one row per visit request)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Visitor {
    pub id: i32,
    pub visitor_badge_id: String,
    pub full_name: String,
    pub mobile_number: Option<String>,
    pub email: Option<String>,
    pub purpose_of_visit: String,
    pub company_name: Option<String>,
    pub host_employee_id: Option<i32>,
    /// Host identity captured at creation time. Snapshot, not a live
    /// reference: historical visits keep the host as they were then.
    pub host_employee_name: String,
    pub host_department: Option<String>,
    pub photo_path: Option<String>,
    pub status: VisitStatus,
    pub approval_token: Option<String>,
    pub approval_expiry: Option<DateTime<Utc>>,
    pub is_pre_approved: bool,
    pub visit_date: Option<DateTime<Utc>>,
    pub scheduled_arrival_start: Option<DateTime<Utc>>,
    pub scheduled_arrival_end: Option<DateTime<Utc>>,
    pub pre_approved_by_employee_id: Option<i32>,
    pub pre_approved_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approval_remarks: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub is_checked_out: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload assembled by the registration and pre-approval services
#[derive(Debug, Clone)]
pub struct NewVisitor {
    pub visitor_badge_id: String,
    pub full_name: String,
    pub mobile_number: Option<String>,
    pub email: Option<String>,
    pub purpose_of_visit: String,
    pub company_name: Option<String>,
    pub host_employee_id: Option<i32>,
    pub host_employee_name: String,
    pub host_department: Option<String>,
    pub status: VisitStatus,
    pub approval_token: String,
    pub approval_expiry: Option<DateTime<Utc>>,
    pub is_pre_approved: bool,
    pub visit_date: Option<DateTime<Utc>>,
    pub scheduled_arrival_start: Option<DateTime<Utc>>,
    pub scheduled_arrival_end: Option<DateTime<Utc>>,
    pub pre_approved_by_employee_id: Option<i32>,
    pub pre_approved_at: Option<DateTime<Utc>>,
    pub approval_remarks: Option<String>,
}

/// Front-desk registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVisitor {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Purpose of visit is required"))]
    pub purpose_of_visit: String,
    pub host_employee_id: Option<i32>,
    #[validate(length(min = 1, message = "Host employee name is required"))]
    pub host_employee_name: String,
    pub host_department: Option<String>,
    pub company_name: Option<String>,
}

/// Contact and context fields that may be edited after registration
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVisitor {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub purpose_of_visit: Option<String>,
    pub company_name: Option<String>,
}

/// Employee-initiated pre-approval request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePreApproval {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Purpose of visit is required"))]
    pub purpose_of_visit: String,
    pub company_name: Option<String>,
    /// Calendar day of the scheduled visit (YYYY-MM-DD)
    pub visit_date: NaiveDate,
    pub scheduled_arrival_start: DateTime<Utc>,
    pub scheduled_arrival_end: DateTime<Utc>,
    pub remarks: Option<String>,
}

/// Partial update to a pre-approved visit
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreApproval {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub purpose_of_visit: Option<String>,
    pub company_name: Option<String>,
    pub visit_date: Option<NaiveDate>,
    pub scheduled_arrival_start: Option<DateTime<Utc>>,
    pub scheduled_arrival_end: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
}

impl UpdatePreApproval {
    /// True when the visit date or either window bound is being changed,
    /// which requires re-issuing the admission pass.
    pub fn reschedules(&self) -> bool {
        self.visit_date.is_some()
            || self.scheduled_arrival_start.is_some()
            || self.scheduled_arrival_end.is_some()
    }
}

/// Free-text visitor search parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct VisitorSearchQuery {
    /// Matched against name, phone, email, company and host name
    pub query: String,
}

/// Row summary returned by the expiry sweep
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpiredVisitor {
    pub id: i32,
    pub full_name: String,
    pub visitor_badge_id: String,
    pub approval_expiry: Option<DateTime<Utc>>,
}

/// Scheduled arrival window
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Visitor as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitorResponse {
    pub id: i32,
    pub badge_id: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub purpose_of_visit: String,
    pub company_name: Option<String>,
    pub host_employee_id: Option<i32>,
    pub host_employee_name: String,
    pub host_department: Option<String>,
    pub status: VisitStatus,
    pub is_pre_approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_window: Option<TimeWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_approved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub photo_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Visitor> for VisitorResponse {
    fn from(v: Visitor) -> Self {
        let time_window = match (v.scheduled_arrival_start, v.scheduled_arrival_end) {
            (Some(start), Some(end)) => Some(TimeWindow { start, end }),
            _ => None,
        };

        Self {
            id: v.id,
            badge_id: v.visitor_badge_id,
            full_name: v.full_name,
            phone: v.mobile_number,
            email: v.email,
            purpose_of_visit: v.purpose_of_visit,
            company_name: v.company_name,
            host_employee_id: v.host_employee_id,
            host_employee_name: v.host_employee_name,
            host_department: v.host_department,
            status: v.status,
            is_pre_approved: v.is_pre_approved,
            visit_date: v.visit_date,
            time_window,
            pre_approved_at: v.pre_approved_at,
            approved_at: v.approved_at,
            approval_remarks: v.approval_remarks,
            rejected_at: v.rejected_at,
            rejection_reason: v.rejection_reason,
            check_in_time: v.check_in_time,
            check_out_time: v.check_out_time,
            photo_path: v.photo_path,
            created_at: v.created_at,
        }
    }
}
