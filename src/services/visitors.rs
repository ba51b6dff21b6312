//! Visitor registration and query service

use chrono::{Duration, Utc};
use rand::Rng;
use std::path::Path;
use validator::Validate;

use crate::{
    config::VisitsConfig,
    error::{AppError, AppResult},
    models::{
        enums::VisitStatus,
        visitor::{NewVisitor, RegisterVisitor, UpdateVisitor, Visitor},
    },
    repository::Repository,
    services::{badges::BadgeService, deliver, email::EmailService, NotificationStatus},
};

#[derive(Clone)]
pub struct VisitorsService {
    repository: Repository,
    email: EmailService,
    badges: BadgeService,
    config: VisitsConfig,
}

/// Result of a front-desk registration
pub struct RegistrationOutcome {
    pub visitor: Visitor,
    /// Host alert; sent only when the host employee record carries an email
    pub notification: NotificationStatus,
}

impl VisitorsService {
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

    /// Register a walk-in visitor: status pending, approval token issued,
    /// expiry stamped. The host employee is alerted best-effort.
    pub async fn register(&self, request: RegisterVisitor) -> AppResult<RegistrationOutcome> {
        request.validate()?;

        let now = Utc::now();
        let badge_id = self.badges.walkin_badge_id(now);
        let token = self.badges.approval_token();
        let expiry = now + Duration::hours(self.config.approval_ttl_hours);

        // Snapshot the host from the employee record when an id was given;
        // the free-typed name from the form is the fallback.
        let host = match request.host_employee_id {
            Some(id) => Some(self.repository.employees.get_by_id(id).await?),
            None => None,
        };
        let (host_name, host_department) = match &host {
            Some(employee) => (employee.name.clone(), Some(employee.department.clone())),
            None => (request.host_employee_name.clone(), request.host_department.clone()),
        };

        let new_visitor = NewVisitor {
            visitor_badge_id: badge_id,
            full_name: request.full_name,
            mobile_number: request.phone,
            email: request.email,
            purpose_of_visit: request.purpose_of_visit,
            company_name: request.company_name,
            host_employee_id: host.as_ref().map(|e| e.id),
            host_employee_name: host_name,
            host_department,
            status: VisitStatus::Pending,
            approval_token: token.clone(),
            approval_expiry: Some(expiry),
            is_pre_approved: false,
            visit_date: None,
            scheduled_arrival_start: None,
            scheduled_arrival_end: None,
            pre_approved_by_employee_id: None,
            pre_approved_at: None,
            approval_remarks: None,
        };

        let id = self.repository.visitors.create(&new_visitor).await?;
        let visitor = self.repository.visitors.get_by_id(id).await?;

        let notification = match &host {
            Some(employee) => {
                let approve_url = format!(
                    "{}/api/v1/approvals/approve/{}",
                    self.config.public_base_url, token
                );
                let reject_url = format!(
                    "{}/api/v1/approvals/reject/{}",
                    self.config.public_base_url, token
                );
                deliver(
                    self.email.send_employee_alert(
                        &employee.email,
                        &visitor,
                        &approve_url,
                        &reject_url,
                    ),
                    &format!("Failed to alert host employee for visitor {}", visitor.id),
                )
                .await
            }
            None => NotificationStatus::default(),
        };

        Ok(RegistrationOutcome {
            visitor,
            notification,
        })
    }

    /// Store an uploaded visitor photo and record its path
    pub async fn attach_photo(
        &self,
        visitor_id: i32,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> AppResult<String> {
        let visitor = self.repository.visitors.get_by_id(visitor_id).await?;

        let extension = original_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .unwrap_or("jpg");

        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        let file_name = format!(
            "visitor-{}-{}.{}",
            Utc::now().timestamp_millis(),
            suffix,
            extension
        );

        let dir = Path::new(&self.config.photo_dir);
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create photo directory: {}", e)))?;

        let path = dir.join(&file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store photo: {}", e)))?;

        let stored = path.to_string_lossy().into_owned();
        self.repository
            .visitors
            .set_photo_path(visitor.id, &stored)
            .await?;

        Ok(stored)
    }

    /// All visitors, newest first
    pub async fn list_all(&self) -> AppResult<Vec<Visitor>> {
        self.repository.visitors.list_all().await
    }

    /// Get a visitor by id
    pub async fn get(&self, visitor_id: i32) -> AppResult<Visitor> {
        self.repository.visitors.get_by_id(visitor_id).await
    }

    /// Visitors in a given status, newest first
    pub async fn list_by_status(&self, status: VisitStatus) -> AppResult<Vec<Visitor>> {
        self.repository.visitors.list_by_status(status).await
    }

    /// Free-text search over name, phone, email, company and host name
    pub async fn search(&self, query: &str) -> AppResult<Vec<Visitor>> {
        if query.trim().is_empty() {
            return Err(AppError::Validation("Search query is required".to_string()));
        }
        self.repository.visitors.search(query).await
    }

    /// Update contact and context fields; workflow fields are untouchable
    pub async fn update(&self, visitor_id: i32, fields: UpdateVisitor) -> AppResult<Visitor> {
        fields.validate()?;
        let visitor = self.repository.visitors.get_by_id(visitor_id).await?;
        self.repository
            .visitors
            .update_contact(visitor.id, &fields)
            .await?;
        self.repository.visitors.get_by_id(visitor.id).await
    }

    /// Administrative delete; not part of the visit workflow
    pub async fn delete(&self, visitor_id: i32) -> AppResult<()> {
        self.repository.visitors.get_by_id(visitor_id).await?;
        self.repository.visitors.delete(visitor_id).await
    }
}
