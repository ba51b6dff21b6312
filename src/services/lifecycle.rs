//! Visit lifecycle service: approval decisions, the expiry sweep, and the
//! check-in/check-out gate

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        admission::ApprovedAdmission,
        enums::VisitStatus,
        visitor::{ExpiredVisitor, Visitor},
    },
    repository::Repository,
    services::{badges::BadgeService, deliver, email::EmailService, NotificationStatus},
};

/// Reason recorded when a rejection arrives without one
const DEFAULT_REJECTION_REASON: &str = "No reason provided";

#[derive(Clone)]
pub struct LifecycleService {
    repository: Repository,
    email: EmailService,
    badges: BadgeService,
}

/// Result of a successful approval
pub struct ApprovalOutcome {
    pub visitor: Visitor,
    pub qr_code: String,
    pub notification: NotificationStatus,
}

/// Result of a successful rejection
pub struct RejectionOutcome {
    pub visitor: Visitor,
    pub reason: String,
    pub notification: NotificationStatus,
}

/// Result of an expiry sweep
pub struct SweepOutcome {
    pub expired_count: usize,
    pub expired: Vec<ExpiredVisitor>,
}

impl LifecycleService {
    pub fn new(repository: Repository, email: EmailService, badges: BadgeService) -> Self {
        Self {
            repository,
            email,
            badges,
        }
    }

    /// Approve a pending visit by its token. The approval is authoritative
    /// once persisted; a failed notification only flags the outcome.
    pub async fn approve(
        &self,
        token: &str,
        remarks: Option<String>,
    ) -> AppResult<ApprovalOutcome> {
        let visitor = self
            .repository
            .visitors
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::NotFound("Invalid approval token".to_string()))?;

        let now = Utc::now();

        if let Some(expiry) = visitor.approval_expiry {
            if expiry < now {
                return Err(AppError::Expired { expired_at: expiry });
            }
        }

        if !visitor.status.can_transition_to(VisitStatus::Approved) {
            return Err(AppError::Conflict(format!(
                "Visitor is already {}. Cannot approve.",
                visitor.status
            )));
        }

        if !self
            .repository
            .visitors
            .mark_approved(visitor.id, remarks.as_deref(), now)
            .await?
        {
            return Err(self.conflict_for_current(visitor.id, "approve").await);
        }

        let visitor = self.repository.visitors.get_by_id(visitor.id).await?;

        let pass = ApprovedAdmission {
            visitor_id: visitor.id,
            badge_id: visitor.visitor_badge_id.clone(),
            name: visitor.full_name.clone(),
            approved: true,
            timestamp: now,
        };
        let qr_code = self.badges.encode_admission_pass(&pass)?;

        let notification = if visitor.email.is_some() {
            deliver(
                self.email.send_approval(&visitor, &qr_code),
                &format!("Failed to send approval email for visitor {}", visitor.id),
            )
            .await
        } else {
            NotificationStatus::default()
        };

        Ok(ApprovalOutcome {
            visitor,
            qr_code,
            notification,
        })
    }

    /// Reject a pending visit by its token. A pending request can always be
    /// rejected, even past its approval expiry.
    pub async fn reject(
        &self,
        token: &str,
        reason: Option<String>,
    ) -> AppResult<RejectionOutcome> {
        let visitor = self
            .repository
            .visitors
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::NotFound("Invalid approval token".to_string()))?;

        if !visitor.status.can_transition_to(VisitStatus::Rejected) {
            return Err(AppError::Conflict(format!(
                "Visitor is already {}. Cannot reject.",
                visitor.status
            )));
        }

        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());

        let now = Utc::now();

        if !self
            .repository
            .visitors
            .mark_rejected(visitor.id, &reason, now)
            .await?
        {
            return Err(self.conflict_for_current(visitor.id, "reject").await);
        }

        let visitor = self.repository.visitors.get_by_id(visitor.id).await?;

        let notification = if visitor.email.is_some() {
            deliver(
                self.email.send_rejection(&visitor, &reason),
                &format!("Failed to send rejection email for visitor {}", visitor.id),
            )
            .await
        } else {
            NotificationStatus::default()
        };

        Ok(RejectionOutcome {
            visitor,
            reason,
            notification,
        })
    }

    /// Expire all pending requests whose approval window has passed.
    /// Running it twice in a row reports zero affected on the second run.
    pub async fn sweep_expired(&self) -> AppResult<SweepOutcome> {
        let expired = self.repository.visitors.sweep_expired(Utc::now()).await?;

        if !expired.is_empty() {
            tracing::info!("Expired {} stale approval requests", expired.len());
        }

        Ok(SweepOutcome {
            expired_count: expired.len(),
            expired,
        })
    }

    /// Check in an approved walk-in visitor. Pre-approved visits go through
    /// the window-gated quick path instead.
    pub async fn check_in(&self, visitor_id: i32) -> AppResult<Visitor> {
        let visitor = self.repository.visitors.get_by_id(visitor_id).await?;

        if visitor.status != VisitStatus::Approved {
            return Err(AppError::Conflict(format!(
                "Visitor is {}, not approved for entry",
                visitor.status
            )));
        }

        let now = Utc::now();

        if !self
            .repository
            .visitors
            .mark_checked_in(visitor.id, VisitStatus::Approved, now)
            .await?
        {
            return Err(self.conflict_for_current(visitor.id, "check in").await);
        }

        self.repository.visitors.get_by_id(visitor.id).await
    }

    /// Quick check-in for a pre-approved visit by its token, gated on the
    /// scheduled arrival window.
    pub async fn quick_check_in(&self, token: &str) -> AppResult<Visitor> {
        let visitor = self
            .repository
            .visitors
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::NotFound("Invalid pre-approval token".to_string()))?;

        if visitor.status != VisitStatus::PreApproved {
            return Err(AppError::Conflict(format!(
                "Visit is {}, not eligible for quick check-in",
                visitor.status
            )));
        }

        let now = Utc::now();

        match (visitor.scheduled_arrival_start, visitor.scheduled_arrival_end) {
            (Some(start), Some(end)) => {
                if now < start {
                    return Err(AppError::Conflict(format!(
                        "Arrival window has not opened yet ({} - {})",
                        start.format("%Y-%m-%d %H:%M UTC"),
                        end.format("%H:%M UTC")
                    )));
                }
                if now > end {
                    return Err(AppError::Expired { expired_at: end });
                }
            }
            _ => {
                return Err(AppError::Conflict(
                    "Visit has no scheduled arrival window".to_string(),
                ));
            }
        }

        if !self
            .repository
            .visitors
            .mark_checked_in(visitor.id, VisitStatus::PreApproved, now)
            .await?
        {
            return Err(self.conflict_for_current(visitor.id, "check in").await);
        }

        self.repository.visitors.get_by_id(visitor.id).await
    }

    /// Check out a checked-in visitor
    pub async fn check_out(&self, visitor_id: i32) -> AppResult<Visitor> {
        let visitor = self.repository.visitors.get_by_id(visitor_id).await?;

        if !visitor.status.can_transition_to(VisitStatus::CheckedOut) {
            return Err(AppError::Conflict(format!(
                "Visitor is {}, not checked in",
                visitor.status
            )));
        }

        let now = Utc::now();

        if !self
            .repository
            .visitors
            .mark_checked_out(visitor.id, now)
            .await?
        {
            return Err(self.conflict_for_current(visitor.id, "check out").await);
        }

        self.repository.visitors.get_by_id(visitor.id).await
    }

    /// Pending requests still awaiting a decision, optionally restricted to
    /// one host employee. Requests past their expiry are left to the sweep.
    pub async fn pending_approvals(
        &self,
        host_employee_id: Option<i32>,
    ) -> AppResult<Vec<Visitor>> {
        let now = Utc::now();
        let pending = self.repository.visitors.list_pending(host_employee_id).await?;

        Ok(pending
            .into_iter()
            .filter(|v| v.approval_expiry.map_or(true, |expiry| expiry > now))
            .collect())
    }

    /// Build the conflict error for a transition that lost the
    /// read-then-write race: re-read the row and name its current status.
    async fn conflict_for_current(&self, visitor_id: i32, action: &str) -> AppError {
        match self.repository.visitors.get_by_id(visitor_id).await {
            Ok(current) => AppError::Conflict(format!(
                "Visitor is already {}. Cannot {}.",
                current.status, action
            )),
            Err(e) => e,
        }
    }
}
