//! Employee management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    models::{
        employee::{CreateEmployee, Employee, EmployeeSearchQuery, EmployeeShort, UpdateEmployee},
        enums::VisitStatus,
        visitor::VisitorResponse,
    },
};

/// Optional status filter for an employee's visitors
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeVisitorsQuery {
    pub status: Option<String>,
}

/// Employee listing
#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub count: usize,
    pub employees: Vec<Employee>,
}

/// Department listing
#[derive(Serialize, ToSchema)]
pub struct DepartmentsResponse {
    pub departments: Vec<String>,
}

/// Employees of one department
#[derive(Serialize, ToSchema)]
pub struct DepartmentEmployeesResponse {
    pub department: String,
    pub count: usize,
    pub employees: Vec<Employee>,
}

/// Employee search result
#[derive(Serialize, ToSchema)]
pub struct EmployeeSearchResponse {
    pub query: String,
    pub count: usize,
    pub employees: Vec<Employee>,
}

/// Visitors hosted by an employee
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeVisitorsResponse {
    pub employee: EmployeeShort,
    pub visitors_count: usize,
    pub visitors: Vec<VisitorResponse>,
}

/// Create a new employee
#[utoipa::path(
    post,
    path = "/employees",
    tag = "employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Missing required field"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn create_employee(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateEmployee>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    let employee = state.services.employees.create(request).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// List all employees
#[utoipa::path(
    get,
    path = "/employees",
    tag = "employees",
    responses(
        (status = 200, description = "All employees", body = EmployeeListResponse)
    )
)]
pub async fn list_employees(
    State(state): State<crate::AppState>,
) -> AppResult<Json<EmployeeListResponse>> {
    let employees = state.services.employees.list_all().await?;
    Ok(Json(EmployeeListResponse {
        count: employees.len(),
        employees,
    }))
}

/// Get an employee by ID
#[utoipa::path(
    get,
    path = "/employees/{id}",
    tag = "employees",
    params(("id" = i32, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee details", body = Employee),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn get_employee(
    State(state): State<crate::AppState>,
    Path(employee_id): Path<i32>,
) -> AppResult<Json<Employee>> {
    let employee = state.services.employees.get(employee_id).await?;
    Ok(Json(employee))
}

/// Get an employee by email
#[utoipa::path(
    get,
    path = "/employees/email/{email}",
    tag = "employees",
    params(("email" = String, Path, description = "Employee email")),
    responses(
        (status = 200, description = "Employee details", body = Employee),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn get_employee_by_email(
    State(state): State<crate::AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<Employee>> {
    let employee = state.services.employees.get_by_email(&email).await?;
    Ok(Json(employee))
}

/// Update an employee
#[utoipa::path(
    put,
    path = "/employees/{id}",
    tag = "employees",
    params(("id" = i32, Path, description = "Employee ID")),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn update_employee(
    State(state): State<crate::AppState>,
    Path(employee_id): Path<i32>,
    Json(fields): Json<UpdateEmployee>,
) -> AppResult<Json<Employee>> {
    let employee = state.services.employees.update(employee_id, fields).await?;
    Ok(Json(employee))
}

/// Delete an employee; blocked while visitors reference them
#[utoipa::path(
    delete,
    path = "/employees/{id}",
    tag = "employees",
    params(("id" = i32, Path, description = "Employee ID")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Visitors still reference this employee")
    )
)]
pub async fn delete_employee(
    State(state): State<crate::AppState>,
    Path(employee_id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.employees.delete(employee_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List distinct departments
#[utoipa::path(
    get,
    path = "/employees/departments",
    tag = "employees",
    responses(
        (status = 200, description = "Department names", body = DepartmentsResponse)
    )
)]
pub async fn list_departments(
    State(state): State<crate::AppState>,
) -> AppResult<Json<DepartmentsResponse>> {
    let departments = state.services.employees.departments().await?;
    Ok(Json(DepartmentsResponse { departments }))
}

/// List employees of a department
#[utoipa::path(
    get,
    path = "/employees/departments/{department}",
    tag = "employees",
    params(("department" = String, Path, description = "Department name")),
    responses(
        (status = 200, description = "Employees of the department", body = DepartmentEmployeesResponse)
    )
)]
pub async fn list_department_employees(
    State(state): State<crate::AppState>,
    Path(department): Path<String>,
) -> AppResult<Json<DepartmentEmployeesResponse>> {
    let employees = state
        .services
        .employees
        .list_by_department(&department)
        .await?;

    Ok(Json(DepartmentEmployeesResponse {
        department,
        count: employees.len(),
        employees,
    }))
}

/// Search employees by name, email, department or phone
#[utoipa::path(
    get,
    path = "/employees/search",
    tag = "employees",
    params(EmployeeSearchQuery),
    responses(
        (status = 200, description = "Matching employees", body = EmployeeSearchResponse),
        (status = 400, description = "Missing search query")
    )
)]
pub async fn search_employees(
    State(state): State<crate::AppState>,
    Query(query): Query<EmployeeSearchQuery>,
) -> AppResult<Json<EmployeeSearchResponse>> {
    let employees = state.services.employees.search(&query.query).await?;

    Ok(Json(EmployeeSearchResponse {
        query: query.query,
        count: employees.len(),
        employees,
    }))
}

/// List visitors hosted by an employee
#[utoipa::path(
    get,
    path = "/employees/{id}/visitors",
    tag = "employees",
    params(
        ("id" = i32, Path, description = "Employee ID"),
        EmployeeVisitorsQuery
    ),
    responses(
        (status = 200, description = "Visitors hosted by the employee", body = EmployeeVisitorsResponse),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn list_employee_visitors(
    State(state): State<crate::AppState>,
    Path(employee_id): Path<i32>,
    Query(query): Query<EmployeeVisitorsQuery>,
) -> AppResult<Json<EmployeeVisitorsResponse>> {
    let status = query
        .status
        .map(|s| {
            s.parse::<VisitStatus>().map_err(|_| {
                AppError::Validation(format!(
                    "Invalid status. Valid statuses: {}",
                    VisitStatus::ALL.map(|s| s.as_str()).join(", ")
                ))
            })
        })
        .transpose()?;

    let (employee, visitors) = state
        .services
        .employees
        .visitors_of(employee_id, status)
        .await?;

    Ok(Json(EmployeeVisitorsResponse {
        employee: EmployeeShort::from(&employee),
        visitors_count: visitors.len(),
        visitors: visitors.into_iter().map(Into::into).collect(),
    }))
}
