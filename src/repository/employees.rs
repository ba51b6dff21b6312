//! Employees repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::employee::{CreateEmployee, Employee, UpdateEmployee},
};

#[derive(Clone)]
pub struct EmployeesRepository {
    pool: Pool<Postgres>,
}

impl EmployeesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a new employee and return its id
    pub async fn create(&self, employee: &CreateEmployee) -> AppResult<i32> {
        let now = Utc::now();

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO employees (name, email, department, phone, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id
            "#,
        )
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.department)
        .bind(&employee.phone)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Get employee by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Employee> {
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee with id {} not found", id)))
    }

    /// Get employee by email
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM employees WHERE LOWER(email) = LOWER($1) AND id != $2)",
            )
            .bind(email)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM employees WHERE LOWER(email) = LOWER($1))",
            )
            .bind(email)
            .fetch_one(&self.pool)
            .await?
        };

        Ok(exists)
    }

    /// List all employees ordered by name
    pub async fn list_all(&self) -> AppResult<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>("SELECT * FROM employees ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(employees)
    }

    /// List employees in a department ordered by name
    pub async fn list_by_department(&self, department: &str) -> AppResult<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE department = $1 ORDER BY name ASC",
        )
        .bind(department)
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    /// Distinct department names
    pub async fn departments(&self) -> AppResult<Vec<String>> {
        let departments: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT department FROM employees ORDER BY department ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(departments)
    }

    /// Free-text search over name, email, department and phone
    pub async fn search(&self, query: &str) -> AppResult<Vec<Employee>> {
        let pattern = format!("%{}%", query);

        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT * FROM employees
            WHERE name ILIKE $1
               OR email ILIKE $1
               OR department ILIKE $1
               OR phone ILIKE $1
            ORDER BY name ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    /// Apply the provided fields, leaving the rest untouched
    pub async fn update(&self, id: i32, fields: &UpdateEmployee) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE employees SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                department = COALESCE($4, department),
                phone = COALESCE($5, phone),
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(&fields.department)
        .bind(&fields.phone)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete an employee row
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
