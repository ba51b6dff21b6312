//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{approvals, employees, health, preapprovals, visitors};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gatepass API",
        version = "1.0.0",
        description = "Visitor Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Gatepass Team", email = "contact@gatepass.org")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Visitors
        visitors::register_visitor,
        visitors::upload_photo,
        visitors::list_visitors,
        visitors::get_visitor,
        visitors::list_visitors_by_status,
        visitors::search_visitors,
        visitors::update_visitor,
        visitors::delete_visitor,
        visitors::check_in_visitor,
        visitors::quick_check_in,
        visitors::check_out_visitor,
        // Approvals
        approvals::approve_visitor,
        approvals::reject_visitor,
        approvals::list_pending,
        approvals::list_pending_for_employee,
        approvals::cleanup_expired,
        // Pre-approvals
        preapprovals::create_preapproval,
        preapprovals::list_preapprovals,
        preapprovals::check_limits,
        preapprovals::update_preapproval,
        preapprovals::cancel_preapproval,
        // Employees
        employees::create_employee,
        employees::list_employees,
        employees::get_employee,
        employees::get_employee_by_email,
        employees::update_employee,
        employees::delete_employee,
        employees::list_departments,
        employees::list_department_employees,
        employees::search_employees,
        employees::list_employee_visitors,
    ),
    components(
        schemas(
            // Visitors
            crate::models::enums::VisitStatus,
            crate::models::visitor::RegisterVisitor,
            crate::models::visitor::UpdateVisitor,
            crate::models::visitor::CreatePreApproval,
            crate::models::visitor::UpdatePreApproval,
            crate::models::visitor::VisitorResponse,
            crate::models::visitor::TimeWindow,
            crate::models::visitor::ExpiredVisitor,
            visitors::RegistrationResponse,
            visitors::PhotoUploadResponse,
            visitors::StatusListResponse,
            visitors::SearchResponse,
            visitors::CheckInResponse,
            visitors::CheckOutResponse,
            // Approvals
            approvals::ApproveRequest,
            approvals::RejectRequest,
            approvals::ApproveResponse,
            approvals::RejectResponse,
            approvals::PendingApproval,
            approvals::PendingApprovalsResponse,
            approvals::CleanupResponse,
            // Pre-approvals
            preapprovals::CancelRequest,
            preapprovals::PreApprovalResponse,
            preapprovals::CategorizedResponse,
            preapprovals::PreApprovedListResponse,
            preapprovals::LimitsInfo,
            preapprovals::LimitsResponse,
            preapprovals::UpdatePreApprovalResponse,
            preapprovals::CancelPreApprovalResponse,
            // Employees
            crate::models::employee::Employee,
            crate::models::employee::EmployeeShort,
            crate::models::employee::CreateEmployee,
            crate::models::employee::UpdateEmployee,
            employees::EmployeeListResponse,
            employees::DepartmentsResponse,
            employees::DepartmentEmployeesResponse,
            employees::EmployeeSearchResponse,
            employees::EmployeeVisitorsResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "visitors", description = "Visitor registration and check-in/check-out"),
        (name = "approvals", description = "Token-based approval workflow"),
        (name = "preapprovals", description = "Employee-scheduled pre-approved visits"),
        (name = "employees", description = "Employee management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
