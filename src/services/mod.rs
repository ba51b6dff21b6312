//! Business logic services

pub mod badges;
pub mod email;
pub mod employees;
pub mod lifecycle;
pub mod preapprovals;
pub mod visitors;

use std::future::Future;

use crate::{
    config::{EmailConfig, VisitsConfig},
    error::AppResult,
    repository::Repository,
};

/// Outcome of a best-effort notification. Delivery failures never roll back
/// the state change they follow; they surface here instead.
#[derive(Debug, Clone, Default)]
pub struct NotificationStatus {
    pub sent: bool,
    pub error: Option<String>,
}

/// Run a notification attempt, folding any failure into the result value
pub(crate) async fn deliver<F>(attempt: F, context: &str) -> NotificationStatus
where
    F: Future<Output = AppResult<()>>,
{
    match attempt.await {
        Ok(()) => NotificationStatus {
            sent: true,
            error: None,
        },
        Err(e) => {
            tracing::warn!("{}: {}", context, e);
            NotificationStatus {
                sent: false,
                error: Some("Failed to send email notification".to_string()),
            }
        }
    }
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub lifecycle: lifecycle::LifecycleService,
    pub preapprovals: preapprovals::PreApprovalsService,
    pub visitors: visitors::VisitorsService,
    pub employees: employees::EmployeesService,
    pub email: email::EmailService,
    pub badges: badges::BadgeService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        email_config: EmailConfig,
        visits_config: VisitsConfig,
    ) -> Self {
        let email = email::EmailService::new(email_config);
        let badges = badges::BadgeService::new();

        Self {
            lifecycle: lifecycle::LifecycleService::new(
                repository.clone(),
                email.clone(),
                badges.clone(),
            ),
            preapprovals: preapprovals::PreApprovalsService::new(
                repository.clone(),
                email.clone(),
                badges.clone(),
                visits_config.clone(),
            ),
            visitors: visitors::VisitorsService::new(
                repository.clone(),
                email.clone(),
                badges.clone(),
                visits_config,
            ),
            employees: employees::EmployeesService::new(repository),
            email,
            badges,
        }
    }
}
