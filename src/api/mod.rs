//! API handlers for Gatepass REST endpoints

pub mod approvals;
pub mod employees;
pub mod health;
pub mod openapi;
pub mod preapprovals;
pub mod visitors;
