//! Visitors repository for database operations

use chrono::{DateTime, NaiveTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::VisitStatus,
        visitor::{ExpiredVisitor, NewVisitor, UpdatePreApproval, UpdateVisitor, Visitor},
    },
};

#[derive(Clone)]
pub struct VisitorsRepository {
    pool: Pool<Postgres>,
}

impl VisitorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a new visitor row and return its id
    pub async fn create(&self, visitor: &NewVisitor) -> AppResult<i32> {
        let now = Utc::now();

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO visitors (
                visitor_badge_id, full_name, mobile_number, email, purpose_of_visit,
                company_name, host_employee_id, host_employee_name, host_department,
                status, approval_token, approval_expiry, is_pre_approved, visit_date,
                scheduled_arrival_start, scheduled_arrival_end,
                pre_approved_by_employee_id, pre_approved_at, approval_remarks,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20, $20)
            RETURNING id
            "#,
        )
        .bind(&visitor.visitor_badge_id)
        .bind(&visitor.full_name)
        .bind(&visitor.mobile_number)
        .bind(&visitor.email)
        .bind(&visitor.purpose_of_visit)
        .bind(&visitor.company_name)
        .bind(visitor.host_employee_id)
        .bind(&visitor.host_employee_name)
        .bind(&visitor.host_department)
        .bind(visitor.status)
        .bind(&visitor.approval_token)
        .bind(visitor.approval_expiry)
        .bind(visitor.is_pre_approved)
        .bind(visitor.visit_date)
        .bind(visitor.scheduled_arrival_start)
        .bind(visitor.scheduled_arrival_end)
        .bind(visitor.pre_approved_by_employee_id)
        .bind(visitor.pre_approved_at)
        .bind(&visitor.approval_remarks)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Get visitor by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Visitor> {
        sqlx::query_as::<_, Visitor>("SELECT * FROM visitors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Visitor with id {} not found", id)))
    }

    /// Find visitor by approval token
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<Visitor>> {
        let visitor =
            sqlx::query_as::<_, Visitor>("SELECT * FROM visitors WHERE approval_token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        Ok(visitor)
    }

    /// List all visitors, newest first
    pub async fn list_all(&self) -> AppResult<Vec<Visitor>> {
        let visitors =
            sqlx::query_as::<_, Visitor>("SELECT * FROM visitors ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(visitors)
    }

    /// List visitors in a given status, newest first
    pub async fn list_by_status(&self, status: VisitStatus) -> AppResult<Vec<Visitor>> {
        let visitors = sqlx::query_as::<_, Visitor>(
            "SELECT * FROM visitors WHERE status = $1 ORDER BY created_at DESC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(visitors)
    }

    /// List pending visitors, optionally restricted to one host employee
    pub async fn list_pending(&self, host_employee_id: Option<i32>) -> AppResult<Vec<Visitor>> {
        let visitors = match host_employee_id {
            Some(employee_id) => {
                sqlx::query_as::<_, Visitor>(
                    r#"
                    SELECT * FROM visitors
                    WHERE status = 'pending' AND host_employee_id = $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(employee_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Visitor>(
                    "SELECT * FROM visitors WHERE status = 'pending' ORDER BY created_at DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(visitors)
    }

    /// Free-text search over name, phone, email, company and host name
    pub async fn search(&self, query: &str) -> AppResult<Vec<Visitor>> {
        let pattern = format!("%{}%", query);

        let visitors = sqlx::query_as::<_, Visitor>(
            r#"
            SELECT * FROM visitors
            WHERE full_name ILIKE $1
               OR mobile_number ILIKE $1
               OR email ILIKE $1
               OR company_name ILIKE $1
               OR host_employee_name ILIKE $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(visitors)
    }

    /// Apply the provided contact/context fields, leaving the rest untouched
    pub async fn update_contact(&self, id: i32, fields: &UpdateVisitor) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE visitors SET
                full_name = COALESCE($2, full_name),
                mobile_number = COALESCE($3, mobile_number),
                email = COALESCE($4, email),
                purpose_of_visit = COALESCE($5, purpose_of_visit),
                company_name = COALESCE($6, company_name),
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&fields.full_name)
        .bind(&fields.phone)
        .bind(&fields.email)
        .bind(&fields.purpose_of_visit)
        .bind(&fields.company_name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Apply the provided pre-approval fields, leaving the rest untouched
    pub async fn update_preapproval(&self, id: i32, fields: &UpdatePreApproval) -> AppResult<()> {
        let visit_date = fields
            .visit_date
            .map(|d| d.and_time(NaiveTime::MIN).and_utc());

        sqlx::query(
            r#"
            UPDATE visitors SET
                full_name = COALESCE($2, full_name),
                mobile_number = COALESCE($3, mobile_number),
                email = COALESCE($4, email),
                purpose_of_visit = COALESCE($5, purpose_of_visit),
                company_name = COALESCE($6, company_name),
                visit_date = COALESCE($7, visit_date),
                scheduled_arrival_start = COALESCE($8, scheduled_arrival_start),
                scheduled_arrival_end = COALESCE($9, scheduled_arrival_end),
                approval_remarks = COALESCE($10, approval_remarks),
                updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&fields.full_name)
        .bind(&fields.phone)
        .bind(&fields.email)
        .bind(&fields.purpose_of_visit)
        .bind(&fields.company_name)
        .bind(visit_date)
        .bind(fields.scheduled_arrival_start)
        .bind(fields.scheduled_arrival_end)
        .bind(&fields.remarks)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Attach a stored photo to the visitor
    pub async fn set_photo_path(&self, id: i32, path: &str) -> AppResult<()> {
        sqlx::query("UPDATE visitors SET photo_path = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(path)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Administrative delete; not part of the visit workflow
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM visitors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lifecycle transitions
    //
    // Every transition is a conditional update guarded on the expected
    // current status. Zero rows affected means another request won the race
    // (or the row never was in that state); callers surface that as a
    // conflict after re-reading the row.
    // -----------------------------------------------------------------------

    /// pending -> approved; consumes the approval token
    pub async fn mark_approved(
        &self,
        id: i32,
        remarks: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE visitors SET
                status = 'approved',
                approved_at = $2,
                approval_remarks = $3,
                approval_token = NULL,
                updated_at = $2
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(remarks)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// pending -> rejected; consumes the approval token
    pub async fn mark_rejected(
        &self,
        id: i32,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE visitors SET
                status = 'rejected',
                rejected_at = $2,
                rejection_reason = $3,
                approval_token = NULL,
                updated_at = $2
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(reason)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// pre_approved -> cancelled; consumes the pre-approval token
    pub async fn mark_cancelled(
        &self,
        id: i32,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE visitors SET
                status = 'cancelled',
                rejection_reason = $3,
                approval_token = NULL,
                updated_at = $2
            WHERE id = $1 AND status = 'pre_approved'
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(reason)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// approved/pre_approved -> checked_in; consumes any remaining token
    pub async fn mark_checked_in(
        &self,
        id: i32,
        expected: VisitStatus,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE visitors SET
                status = 'checked_in',
                check_in_time = $2,
                approval_token = NULL,
                updated_at = $2
            WHERE id = $1 AND status = $3
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// checked_in -> checked_out
    pub async fn mark_checked_out(&self, id: i32, now: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE visitors SET
                status = 'checked_out',
                check_out_time = $2,
                is_checked_out = TRUE,
                updated_at = $2
            WHERE id = $1 AND status = 'checked_in'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Expire all pending requests whose approval window has passed.
    /// Idempotent: a second sweep matches nothing.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<ExpiredVisitor>> {
        let expired = sqlx::query_as::<_, ExpiredVisitor>(
            r#"
            UPDATE visitors SET
                status = 'expired',
                approval_token = NULL,
                updated_at = $1
            WHERE status = 'pending'
              AND approval_expiry IS NOT NULL
              AND approval_expiry < $1
            RETURNING id, full_name, visitor_badge_id, approval_expiry
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(expired)
    }

    // -----------------------------------------------------------------------
    // Pre-approval queries
    // -----------------------------------------------------------------------

    /// Count pre-approvals an employee has sponsored for a calendar day.
    /// Cancelled and expired visits do not consume quota.
    pub async fn count_preapproved_for_day(
        &self,
        employee_id: i32,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM visitors
            WHERE pre_approved_by_employee_id = $1
              AND visit_date >= $2 AND visit_date <= $3
              AND status IN ('pre_approved', 'checked_in', 'checked_out')
            "#,
        )
        .bind(employee_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// List the quota-consuming pre-approvals for a calendar day
    pub async fn list_preapproved_for_day(
        &self,
        employee_id: i32,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> AppResult<Vec<Visitor>> {
        let visitors = sqlx::query_as::<_, Visitor>(
            r#"
            SELECT * FROM visitors
            WHERE pre_approved_by_employee_id = $1
              AND visit_date >= $2 AND visit_date <= $3
              AND status IN ('pre_approved', 'checked_in', 'checked_out')
            ORDER BY scheduled_arrival_start ASC
            "#,
        )
        .bind(employee_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&self.pool)
        .await?;

        Ok(visitors)
    }

    /// List an employee's pre-approved visitors with optional day and status
    /// filters
    pub async fn list_preapproved(
        &self,
        employee_id: i32,
        day: Option<(DateTime<Utc>, DateTime<Utc>)>,
        status: Option<VisitStatus>,
    ) -> AppResult<Vec<Visitor>> {
        let mut sql = String::from(
            "SELECT * FROM visitors WHERE pre_approved_by_employee_id = $1 AND is_pre_approved = TRUE",
        );
        if day.is_some() {
            sql.push_str(" AND visit_date >= $2 AND visit_date <= $3");
        }
        if status.is_some() {
            let index = if day.is_some() { 4 } else { 2 };
            sql.push_str(&format!(" AND status = ${}", index));
        }
        sql.push_str(" ORDER BY visit_date DESC, scheduled_arrival_start ASC");

        let mut query = sqlx::query_as::<_, Visitor>(&sql).bind(employee_id);
        if let Some((day_start, day_end)) = day {
            query = query.bind(day_start).bind(day_end);
        }
        if let Some(status) = status {
            query = query.bind(status);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// List visitors hosted by an employee, optionally filtered by status
    pub async fn list_hosted_by(
        &self,
        employee_id: i32,
        status: Option<VisitStatus>,
    ) -> AppResult<Vec<Visitor>> {
        let visitors = match status {
            Some(status) => {
                sqlx::query_as::<_, Visitor>(
                    r#"
                    SELECT * FROM visitors
                    WHERE host_employee_id = $1 AND status = $2
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(employee_id)
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Visitor>(
                    "SELECT * FROM visitors WHERE host_employee_id = $1 ORDER BY created_at DESC",
                )
                .bind(employee_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(visitors)
    }

    /// Count visitors referencing an employee as host
    pub async fn count_hosted_by(&self, employee_id: i32) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM visitors WHERE host_employee_id = $1")
                .bind(employee_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
