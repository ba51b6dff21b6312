//! Data models for Gatepass

pub mod admission;
pub mod employee;
pub mod enums;
pub mod visitor;

// Re-export commonly used types
pub use admission::{ApprovedAdmission, PreApprovedAdmission};
pub use employee::Employee;
pub use enums::VisitStatus;
pub use visitor::{Visitor, VisitorResponse};
