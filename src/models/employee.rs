//! Employee model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Employee row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub department: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Short employee identity for embedding in visitor responses
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeShort {
    pub id: i32,
    pub name: String,
    pub department: String,
}

impl From<&Employee> for EmployeeShort {
    fn from(e: &Employee) -> Self {
        Self {
            id: e.id,
            name: e.name.clone(),
            department: e.department.clone(),
        }
    }
}

/// Create employee request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEmployee {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Department is required"))]
    pub department: String,
    pub phone: Option<String>,
}

/// Partial employee update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEmployee {
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

/// Free-text employee search parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeSearchQuery {
    /// Matched against name, email, department and phone
    pub query: String,
}
