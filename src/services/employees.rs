//! Employee management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        employee::{CreateEmployee, Employee, UpdateEmployee},
        enums::VisitStatus,
        visitor::Visitor,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct EmployeesService {
    repository: Repository,
}

impl EmployeesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a new employee; email must be unique
    pub async fn create(&self, request: CreateEmployee) -> AppResult<Employee> {
        request.validate()?;

        if self
            .repository
            .employees
            .email_exists(&request.email, None)
            .await?
        {
            return Err(AppError::Conflict(
                "Employee with this email already exists".to_string(),
            ));
        }

        let id = self.repository.employees.create(&request).await?;
        self.repository.employees.get_by_id(id).await
    }

    /// Get an employee by id
    pub async fn get(&self, employee_id: i32) -> AppResult<Employee> {
        self.repository.employees.get_by_id(employee_id).await
    }

    /// Get an employee by email
    pub async fn get_by_email(&self, email: &str) -> AppResult<Employee> {
        self.repository
            .employees
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee with email {} not found", email)))
    }

    /// All employees ordered by name
    pub async fn list_all(&self) -> AppResult<Vec<Employee>> {
        self.repository.employees.list_all().await
    }

    /// Update an employee; email uniqueness is re-checked
    pub async fn update(&self, employee_id: i32, fields: UpdateEmployee) -> AppResult<Employee> {
        let employee = self.repository.employees.get_by_id(employee_id).await?;
        fields.validate()?;

        if let Some(email) = &fields.email {
            if !email.eq_ignore_ascii_case(&employee.email)
                && self
                    .repository
                    .employees
                    .email_exists(email, Some(employee.id))
                    .await?
            {
                return Err(AppError::Conflict(
                    "Employee with this email already exists".to_string(),
                ));
            }
        }

        self.repository
            .employees
            .update(employee.id, &fields)
            .await?;
        self.repository.employees.get_by_id(employee.id).await
    }

    /// Delete an employee. Blocked while visitors still reference them as
    /// host: those rows carry the employee's identity snapshot.
    pub async fn delete(&self, employee_id: i32) -> AppResult<()> {
        let employee = self.repository.employees.get_by_id(employee_id).await?;

        let hosted = self
            .repository
            .visitors
            .count_hosted_by(employee.id)
            .await?;

        if hosted > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete employee. {} visitors are assigned to this employee.",
                hosted
            )));
        }

        self.repository.employees.delete(employee.id).await
    }

    /// Employees in a department ordered by name
    pub async fn list_by_department(&self, department: &str) -> AppResult<Vec<Employee>> {
        self.repository.employees.list_by_department(department).await
    }

    /// Distinct department names
    pub async fn departments(&self) -> AppResult<Vec<String>> {
        self.repository.employees.departments().await
    }

    /// Free-text search over name, email, department and phone
    pub async fn search(&self, query: &str) -> AppResult<Vec<Employee>> {
        if query.trim().is_empty() {
            return Err(AppError::Validation("Search query is required".to_string()));
        }
        self.repository.employees.search(query).await
    }

    /// Visitors hosted by an employee, optionally filtered by status
    pub async fn visitors_of(
        &self,
        employee_id: i32,
        status: Option<VisitStatus>,
    ) -> AppResult<(Employee, Vec<Visitor>)> {
        let employee = self.repository.employees.get_by_id(employee_id).await?;
        let visitors = self
            .repository
            .visitors
            .list_hosted_by(employee.id, status)
            .await?;

        Ok((employee, visitors))
    }
}
