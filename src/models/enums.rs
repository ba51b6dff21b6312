//! Shared domain enums

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// VisitStatus
// ---------------------------------------------------------------------------

/// Visit lifecycle status (stored as the `visit_status` Postgres enum)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "visit_status", rename_all = "snake_case")]
pub enum VisitStatus {
    Pending,
    PreApproved,
    Approved,
    Rejected,
    CheckedIn,
    CheckedOut,
    Expired,
    Cancelled,
}

impl VisitStatus {
    pub const ALL: [VisitStatus; 8] = [
        VisitStatus::Pending,
        VisitStatus::PreApproved,
        VisitStatus::Approved,
        VisitStatus::Rejected,
        VisitStatus::CheckedIn,
        VisitStatus::CheckedOut,
        VisitStatus::Expired,
        VisitStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VisitStatus::Pending => "pending",
            VisitStatus::PreApproved => "pre_approved",
            VisitStatus::Approved => "approved",
            VisitStatus::Rejected => "rejected",
            VisitStatus::CheckedIn => "checked_in",
            VisitStatus::CheckedOut => "checked_out",
            VisitStatus::Expired => "expired",
            VisitStatus::Cancelled => "cancelled",
        }
    }

    /// Closed transition table for the visit lifecycle. Anything not listed
    /// here is an invalid transition and must be refused.
    pub fn can_transition_to(self, next: VisitStatus) -> bool {
        use VisitStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Expired)
                | (PreApproved, CheckedIn)
                | (PreApproved, Cancelled)
                | (Approved, CheckedIn)
                | (CheckedIn, CheckedOut)
        )
    }

    /// No transitions leave these states.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            VisitStatus::Rejected
                | VisitStatus::CheckedOut
                | VisitStatus::Expired
                | VisitStatus::Cancelled
        )
    }

    /// An approval decision is still outstanding; the approval token must be
    /// set exactly while this holds.
    pub fn is_awaiting_decision(self) -> bool {
        matches!(self, VisitStatus::Pending | VisitStatus::PreApproved)
    }
}

impl std::fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VisitStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VisitStatus::Pending),
            "pre_approved" => Ok(VisitStatus::PreApproved),
            "approved" => Ok(VisitStatus::Approved),
            "rejected" => Ok(VisitStatus::Rejected),
            "checked_in" => Ok(VisitStatus::CheckedIn),
            "checked_out" => Ok(VisitStatus::CheckedOut),
            "expired" => Ok(VisitStatus::Expired),
            "cancelled" => Ok(VisitStatus::Cancelled),
            _ => Err(format!("Invalid visit status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_forward_transitions() {
        assert!(VisitStatus::Pending.can_transition_to(VisitStatus::Approved));
        assert!(VisitStatus::Pending.can_transition_to(VisitStatus::Rejected));
        assert!(VisitStatus::Pending.can_transition_to(VisitStatus::Expired));
        assert!(VisitStatus::PreApproved.can_transition_to(VisitStatus::CheckedIn));
        assert!(VisitStatus::PreApproved.can_transition_to(VisitStatus::Cancelled));
        assert!(VisitStatus::Approved.can_transition_to(VisitStatus::CheckedIn));
        assert!(VisitStatus::CheckedIn.can_transition_to(VisitStatus::CheckedOut));
    }

    #[test]
    fn test_no_reverse_transitions() {
        assert!(!VisitStatus::Approved.can_transition_to(VisitStatus::Pending));
        assert!(!VisitStatus::CheckedIn.can_transition_to(VisitStatus::Approved));
        assert!(!VisitStatus::CheckedOut.can_transition_to(VisitStatus::CheckedIn));
        assert!(!VisitStatus::Rejected.can_transition_to(VisitStatus::Pending));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for from in VisitStatus::ALL {
            if from.is_terminal() {
                for to in VisitStatus::ALL {
                    assert!(!from.can_transition_to(to));
                }
            }
        }
    }

    #[test]
    fn test_round_trip_parse() {
        for status in VisitStatus::ALL {
            assert_eq!(VisitStatus::from_str(status.as_str()), Ok(status));
        }
        assert!(VisitStatus::from_str("unknown").is_err());
    }
}
