//! Pre-approval service: employee-scheduled visits, daily quota enforcement,
//! and the upcoming/active/expired/completed display view

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use validator::Validate;

use crate::{
    config::VisitsConfig,
    error::{AppError, AppResult},
    models::{
        admission::PreApprovedAdmission,
        employee::Employee,
        enums::VisitStatus,
        visitor::{CreatePreApproval, NewVisitor, UpdatePreApproval, Visitor},
    },
    repository::Repository,
    services::{badges::BadgeService, deliver, email::EmailService, NotificationStatus},
};

/// Reason recorded when a cancellation arrives without one
const DEFAULT_CANCELLATION_REASON: &str = "Cancelled by host employee";

/// Inclusive day span [00:00:00.000, 23:59:59.999] for a calendar date
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = start + Duration::days(1) - Duration::milliseconds(1);
    (start, end)
}

/// Validate a scheduled arrival window against the clock
pub fn validate_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    if start >= end {
        return Err(AppError::Validation(
            "Arrival start time must be before end time".to_string(),
        ));
    }
    if start <= now {
        return Err(AppError::Validation(
            "Scheduled arrival time must be in the future".to_string(),
        ));
    }
    Ok(())
}

/// Display buckets for an employee's pre-approved visitors. The "expired"
/// bucket is a view label only; the persisted status is never changed here.
#[derive(Debug, Default)]
pub struct CategorizedVisitors {
    pub upcoming: Vec<Visitor>,
    pub active: Vec<Visitor>,
    pub expired: Vec<Visitor>,
    pub completed: Vec<Visitor>,
}

/// Partition pre-approved visitors by status and arrival window
pub fn categorize(visitors: &[Visitor], now: DateTime<Utc>) -> CategorizedVisitors {
    let mut buckets = CategorizedVisitors::default();

    for visitor in visitors {
        let bucket = match visitor.status {
            VisitStatus::CheckedOut => &mut buckets.completed,
            VisitStatus::CheckedIn => &mut buckets.active,
            _ => match (visitor.scheduled_arrival_start, visitor.scheduled_arrival_end) {
                (_, Some(end)) if now > end && visitor.status == VisitStatus::PreApproved => {
                    &mut buckets.expired
                }
                (Some(start), Some(end)) if now >= start && now <= end => &mut buckets.active,
                _ => &mut buckets.upcoming,
            },
        };
        bucket.push(visitor.clone());
    }

    buckets
}

#[derive(Clone)]
pub struct PreApprovalsService {
    repository: Repository,
    email: EmailService,
    badges: BadgeService,
    config: VisitsConfig,
}

/// Result of a successful pre-approval
pub struct PreApprovalOutcome {
    pub visitor: Visitor,
    pub qr_code: String,
    pub quick_check_in_url: String,
    pub notification: NotificationStatus,
}

/// Result of a pre-approval update
pub struct UpdateOutcome {
    pub visitor: Visitor,
    pub notification: NotificationStatus,
}

/// Result of a pre-approval cancellation
pub struct CancelOutcome {
    pub visitor: Visitor,
    pub reason: String,
    pub notification: NotificationStatus,
}

/// Daily quota snapshot for one employee
pub struct LimitsOutcome {
    pub employee: Employee,
    pub date: NaiveDate,
    pub max_per_day: i64,
    pub current_count: i64,
    pub remaining_slots: i64,
    pub visitors: Vec<Visitor>,
}

impl PreApprovalsService {
    pub fn new(
        repository: Repository,
        email: EmailService,
        badges: BadgeService,
        config: VisitsConfig,
    ) -> Self {
        Self {
            repository,
            email,
            badges,
            config,
        }
    }

    /// Create a pre-approved scheduled visit sponsored by an employee
    pub async fn create(
        &self,
        employee_id: i32,
        request: CreatePreApproval,
    ) -> AppResult<PreApprovalOutcome> {
        let employee = self.repository.employees.get_by_id(employee_id).await?;
        request.validate()?;

        let now = Utc::now();
        validate_window(
            request.scheduled_arrival_start,
            request.scheduled_arrival_end,
            now,
        )?;

        let (day_start, day_end) = day_bounds(request.visit_date);
        let count = self
            .repository
            .visitors
            .count_preapproved_for_day(employee.id, day_start, day_end)
            .await?;
        let limit = self.config.daily_preapproval_limit;

        if count >= limit {
            return Err(AppError::QuotaExceeded { count, limit });
        }

        let badge_id = self.badges.preapproval_badge_id(now);
        let token = self.badges.preapproval_token();

        let new_visitor = NewVisitor {
            visitor_badge_id: badge_id,
            full_name: request.full_name,
            mobile_number: request.phone,
            email: request.email,
            purpose_of_visit: request.purpose_of_visit,
            company_name: request.company_name,
            host_employee_id: Some(employee.id),
            host_employee_name: employee.name.clone(),
            host_department: Some(employee.department.clone()),
            status: VisitStatus::PreApproved,
            approval_token: token.clone(),
            // No expiry timestamp: the arrival window itself gates validity.
            approval_expiry: None,
            is_pre_approved: true,
            visit_date: Some(day_start),
            scheduled_arrival_start: Some(request.scheduled_arrival_start),
            scheduled_arrival_end: Some(request.scheduled_arrival_end),
            pre_approved_by_employee_id: Some(employee.id),
            pre_approved_at: Some(now),
            approval_remarks: request.remarks,
        };

        let id = self.repository.visitors.create(&new_visitor).await?;
        let visitor = self.repository.visitors.get_by_id(id).await?;

        let qr_code = self.issue_pass(&visitor, &employee.name)?;

        let notification = if visitor.email.is_some() {
            deliver(
                self.email.send_pre_approval(&visitor, &qr_code),
                &format!(
                    "Failed to send pre-approval email for visitor {}",
                    visitor.id
                ),
            )
            .await
        } else {
            NotificationStatus::default()
        };

        let quick_check_in_url = format!(
            "{}/api/v1/visitors/quick-checkin/{}",
            self.config.public_base_url, token
        );

        Ok(PreApprovalOutcome {
            visitor,
            qr_code,
            quick_check_in_url,
            notification,
        })
    }

    /// Remaining daily quota for an employee; pure read
    pub async fn check_limits(
        &self,
        employee_id: i32,
        date: Option<NaiveDate>,
    ) -> AppResult<LimitsOutcome> {
        let employee = self.repository.employees.get_by_id(employee_id).await?;

        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let (day_start, day_end) = day_bounds(date);

        let visitors = self
            .repository
            .visitors
            .list_preapproved_for_day(employee.id, day_start, day_end)
            .await?;

        let max_per_day = self.config.daily_preapproval_limit;
        let current_count = visitors.len() as i64;
        let remaining_slots = (max_per_day - current_count).max(0);

        Ok(LimitsOutcome {
            employee,
            date,
            max_per_day,
            current_count,
            remaining_slots,
            visitors,
        })
    }

    /// An employee's pre-approved visitors with optional day and status
    /// filters, plus the categorized display view
    pub async fn list(
        &self,
        employee_id: i32,
        date: Option<NaiveDate>,
        status: Option<VisitStatus>,
    ) -> AppResult<(Employee, Vec<Visitor>, CategorizedVisitors)> {
        let employee = self.repository.employees.get_by_id(employee_id).await?;

        let day = date.map(day_bounds);
        let visitors = self
            .repository
            .visitors
            .list_preapproved(employee.id, day, status)
            .await?;

        let categorized = categorize(&visitors, Utc::now());

        Ok((employee, visitors, categorized))
    }

    /// Update a pre-approved visit; only its sponsoring employee may do so
    pub async fn update(
        &self,
        employee_id: i32,
        visitor_id: i32,
        changes: UpdatePreApproval,
    ) -> AppResult<UpdateOutcome> {
        let employee = self.repository.employees.get_by_id(employee_id).await?;
        let visitor = self.repository.visitors.get_by_id(visitor_id).await?;
        changes.validate()?;

        self.require_sponsor(&visitor, &employee, "update")?;

        if changes.scheduled_arrival_start.is_some() || changes.scheduled_arrival_end.is_some() {
            let start = changes
                .scheduled_arrival_start
                .or(visitor.scheduled_arrival_start)
                .ok_or_else(|| {
                    AppError::Validation("Arrival window is incomplete".to_string())
                })?;
            let end = changes
                .scheduled_arrival_end
                .or(visitor.scheduled_arrival_end)
                .ok_or_else(|| {
                    AppError::Validation("Arrival window is incomplete".to_string())
                })?;
            validate_window(start, end, Utc::now())?;
        }

        self.repository
            .visitors
            .update_preapproval(visitor.id, &changes)
            .await?;

        let visitor = self.repository.visitors.get_by_id(visitor.id).await?;

        // A rescheduled visit gets a fresh pass and a fresh notification.
        let notification = if changes.reschedules() && visitor.email.is_some() {
            let qr_code = self.issue_pass(&visitor, &employee.name)?;
            deliver(
                self.email.send_pre_approval(&visitor, &qr_code),
                &format!(
                    "Failed to send updated pre-approval email for visitor {}",
                    visitor.id
                ),
            )
            .await
        } else {
            NotificationStatus::default()
        };

        Ok(UpdateOutcome {
            visitor,
            notification,
        })
    }

    /// Cancel a pre-approved visit; only its sponsoring employee may do so
    pub async fn cancel(
        &self,
        employee_id: i32,
        visitor_id: i32,
        reason: Option<String>,
    ) -> AppResult<CancelOutcome> {
        let employee = self.repository.employees.get_by_id(employee_id).await?;
        let visitor = self.repository.visitors.get_by_id(visitor_id).await?;

        self.require_sponsor(&visitor, &employee, "cancel")?;

        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CANCELLATION_REASON.to_string());

        let now = Utc::now();

        if !self
            .repository
            .visitors
            .mark_cancelled(visitor.id, &reason, now)
            .await?
        {
            let current = self.repository.visitors.get_by_id(visitor.id).await?;
            return Err(AppError::Conflict(format!(
                "Visit is already {}. Cannot cancel.",
                current.status
            )));
        }

        let visitor = self.repository.visitors.get_by_id(visitor.id).await?;

        let notification = if visitor.email.is_some() {
            deliver(
                self.email.send_rejection(&visitor, &reason),
                &format!(
                    "Failed to send cancellation email for visitor {}",
                    visitor.id
                ),
            )
            .await
        } else {
            NotificationStatus::default()
        };

        Ok(CancelOutcome {
            visitor,
            reason,
            notification,
        })
    }

    /// Authorization and state guard shared by update and cancel
    fn require_sponsor(
        &self,
        visitor: &Visitor,
        employee: &Employee,
        action: &str,
    ) -> AppResult<()> {
        if visitor.pre_approved_by_employee_id != Some(employee.id) {
            return Err(AppError::Forbidden(format!(
                "Not authorized to {} this visitor",
                action
            )));
        }
        if !visitor.is_pre_approved || visitor.status != VisitStatus::PreApproved {
            return Err(AppError::Conflict(format!(
                "Can only {} pre-approved visitors (status is {})",
                action, visitor.status
            )));
        }
        Ok(())
    }

    /// Encode the quick access pass for a pre-approved visit
    fn issue_pass(&self, visitor: &Visitor, host_name: &str) -> AppResult<String> {
        let (valid_from, valid_until) =
            match (visitor.scheduled_arrival_start, visitor.scheduled_arrival_end) {
                (Some(start), Some(end)) => (start, end),
                _ => {
                    return Err(AppError::Internal(
                        "Pre-approved visit is missing its arrival window".to_string(),
                    ))
                }
            };

        let token = visitor.approval_token.clone().ok_or_else(|| {
            AppError::Internal("Pre-approved visit is missing its token".to_string())
        })?;

        let pass = PreApprovedAdmission {
            visitor_id: visitor.id,
            badge_id: visitor.visitor_badge_id.clone(),
            name: visitor.full_name.clone(),
            pre_approved: true,
            token,
            valid_from,
            valid_until,
            host_employee: host_name.to_string(),
        };

        self.badges.encode_admission_pass(&pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn visitor(
        id: i32,
        status: VisitStatus,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Visitor {
        let now = Utc::now();
        Visitor {
            id,
            visitor_badge_id: format!("PRE-VIS-{}", id),
            full_name: format!("Visitor {}", id),
            mobile_number: None,
            email: None,
            purpose_of_visit: "Meeting".to_string(),
            company_name: None,
            host_employee_id: Some(1),
            host_employee_name: "Host".to_string(),
            host_department: Some("Engineering".to_string()),
            photo_path: None,
            status,
            approval_token: status
                .is_awaiting_decision()
                .then(|| format!("PRE-token{}", id)),
            approval_expiry: None,
            is_pre_approved: true,
            visit_date: window.map(|(start, _)| start),
            scheduled_arrival_start: window.map(|(start, _)| start),
            scheduled_arrival_end: window.map(|(_, end)| end),
            pre_approved_by_employee_id: Some(1),
            pre_approved_at: Some(now),
            approved_at: None,
            approval_remarks: None,
            rejected_at: None,
            rejection_reason: None,
            check_in_time: None,
            check_out_time: None,
            is_checked_out: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_day_bounds_span_the_whole_day() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let (start, end) = day_bounds(date);

        assert_eq!(start, Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap());
        assert_eq!(
            end,
            Utc.with_ymd_and_hms(2024, 6, 15, 23, 59, 59).unwrap()
                + Duration::milliseconds(999)
        );
    }

    #[test]
    fn test_window_start_must_precede_end() {
        let now = Utc::now();
        let later = now + Duration::hours(1);

        assert!(validate_window(later, later, now).is_err());
        assert!(validate_window(later + Duration::hours(1), later, now).is_err());
        assert!(validate_window(later, later + Duration::hours(1), now).is_ok());
    }

    #[test]
    fn test_window_start_must_be_future() {
        let now = Utc::now();
        let past = now - Duration::minutes(5);

        assert!(validate_window(past, now + Duration::hours(1), now).is_err());
        assert!(validate_window(now, now + Duration::hours(1), now).is_err());
    }

    #[test]
    fn test_categorize_by_status() {
        let now = Utc::now();
        let window = Some((now - Duration::hours(2), now - Duration::hours(1)));

        let visitors = vec![
            visitor(1, VisitStatus::CheckedOut, window),
            visitor(2, VisitStatus::CheckedIn, window),
        ];

        let buckets = categorize(&visitors, now);
        assert_eq!(buckets.completed.len(), 1);
        assert_eq!(buckets.active.len(), 1);
        assert!(buckets.expired.is_empty());
        assert!(buckets.upcoming.is_empty());
    }

    #[test]
    fn test_categorize_by_window() {
        let now = Utc::now();

        let past = Some((now - Duration::hours(2), now - Duration::hours(1)));
        let current = Some((now - Duration::minutes(30), now + Duration::minutes(30)));
        let future = Some((now + Duration::hours(1), now + Duration::hours(2)));

        let visitors = vec![
            visitor(1, VisitStatus::PreApproved, past),
            visitor(2, VisitStatus::PreApproved, current),
            visitor(3, VisitStatus::PreApproved, future),
        ];

        let buckets = categorize(&visitors, now);
        assert_eq!(buckets.expired.len(), 1);
        assert_eq!(buckets.expired[0].id, 1);
        assert_eq!(buckets.active.len(), 1);
        assert_eq!(buckets.active[0].id, 2);
        assert_eq!(buckets.upcoming.len(), 1);
        assert_eq!(buckets.upcoming[0].id, 3);
    }

    #[test]
    fn test_categorize_never_mutates_status() {
        let now = Utc::now();
        let past = Some((now - Duration::hours(2), now - Duration::hours(1)));

        let visitors = vec![visitor(1, VisitStatus::PreApproved, past)];
        let buckets = categorize(&visitors, now);

        assert_eq!(buckets.expired[0].status, VisitStatus::PreApproved);
    }
}
