//! API integration tests
//!
//! These drive a running server on localhost with its database migrated.
//! Run with: cargo test -- --ignored

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Create an employee with a unique email and return its id
async fn create_employee(client: &Client, tag: &str) -> i64 {
    let unique = format!("{}-{}", tag, Utc::now().timestamp_millis());

    let response = client
        .post(format!("{}/employees", BASE_URL))
        .json(&json!({
            "name": format!("Employee {}", unique),
            "email": format!("{}@example.com", unique),
            "department": "Engineering"
        }))
        .send()
        .await
        .expect("Failed to create employee");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse employee");
    body["id"].as_i64().expect("No employee id")
}

/// Register a walk-in visitor hosted by the given employee and return
/// (visitor id, approval token taken from the pending queue)
async fn register_visitor(client: &Client, employee_id: i64, name: &str) -> (i64, String) {
    let response = client
        .post(format!("{}/visitors", BASE_URL))
        .json(&json!({
            "fullName": name,
            "purposeOfVisit": "Interview",
            "hostEmployeeId": employee_id,
            "hostEmployeeName": "ignored when id is set",
            "email": format!("visitor-{}@example.com", Utc::now().timestamp_millis())
        }))
        .send()
        .await
        .expect("Failed to register visitor");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse registration");
    let visitor_id = body["visitorId"].as_i64().expect("No visitor id");
    assert!(body["badgeId"].as_str().unwrap().starts_with("VIS-"));
    assert_eq!(body["status"], "pending");

    let pending: Value = client
        .get(format!("{}/approvals/pending/{}", BASE_URL, employee_id))
        .send()
        .await
        .expect("Failed to list pending")
        .json()
        .await
        .expect("Failed to parse pending");

    let token = pending["pendingApprovals"]
        .as_array()
        .expect("No pending array")
        .iter()
        .find(|entry| entry["visitor"]["id"].as_i64() == Some(visitor_id))
        .and_then(|entry| entry["approvalToken"].as_str())
        .expect("Visitor not in pending queue")
        .to_string();

    (visitor_id, token)
}

/// Create a pre-approval for tomorrow and return (visitor id, token)
async fn create_preapproval(client: &Client, employee_id: i64, name: &str) -> (i64, String) {
    let start = Utc::now() + Duration::hours(25);
    let end = start + Duration::hours(1);

    let response = client
        .post(format!("{}/employees/{}/preapprovals", BASE_URL, employee_id))
        .json(&json!({
            "fullName": name,
            "purposeOfVisit": "Scheduled meeting",
            "visitDate": start.date_naive().to_string(),
            "scheduledArrivalStart": start.to_rfc3339(),
            "scheduledArrivalEnd": end.to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to create pre-approval");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse pre-approval");
    let visitor_id = body["visitor"]["id"].as_i64().expect("No visitor id");
    let token = body["preApprovalToken"]
        .as_str()
        .expect("No pre-approval token")
        .to_string();

    assert!(body["visitor"]["badgeId"].as_str().unwrap().starts_with("PRE-VIS-"));
    assert!(token.starts_with("PRE-"));
    assert!(body["qrCode"].as_str().unwrap().starts_with("data:image/png;base64,"));

    (visitor_id, token)
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_approve_and_double_approve() {
    let client = Client::new();
    let employee_id = create_employee(&client, "approver").await;
    let (visitor_id, token) = register_visitor(&client, employee_id, "Alice Doe").await;

    // Approve once
    let response = client
        .post(format!("{}/approvals/approve/{}", BASE_URL, token))
        .json(&json!({ "remarks": "Meeting room 2" }))
        .send()
        .await
        .expect("Failed to approve");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse approval");
    assert_eq!(body["visitor"]["status"], "approved");
    assert_eq!(body["visitor"]["approvalRemarks"], "Meeting room 2");
    assert!(body["qrCode"].as_str().unwrap().starts_with("data:image/png;base64,"));

    // Token is consumed; the same token can never double-apply
    let response = client
        .post(format!("{}/approvals/approve/{}", BASE_URL, token))
        .send()
        .await
        .expect("Failed to send second approve");

    assert_eq!(response.status(), 404);

    // Visitor state unchanged by the failed retry
    let visitor: Value = client
        .get(format!("{}/visitors/{}", BASE_URL, visitor_id))
        .send()
        .await
        .expect("Failed to get visitor")
        .json()
        .await
        .expect("Failed to parse visitor");
    assert_eq!(visitor["status"], "approved");
}

#[tokio::test]
#[ignore]
async fn test_reject_defaults_reason() {
    let client = Client::new();
    let employee_id = create_employee(&client, "rejecter").await;
    let (visitor_id, token) = register_visitor(&client, employee_id, "Declined Guest").await;

    let response = client
        .post(format!("{}/approvals/reject/{}", BASE_URL, token))
        .send()
        .await
        .expect("Failed to reject");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse rejection");
    assert_eq!(body["reason"], "No reason provided");
    assert_eq!(body["visitor"]["status"], "rejected");

    let visitor: Value = client
        .get(format!("{}/visitors/{}", BASE_URL, visitor_id))
        .send()
        .await
        .expect("Failed to get visitor")
        .json()
        .await
        .expect("Failed to parse visitor");
    assert_eq!(visitor["rejectionReason"], "No reason provided");
}

#[tokio::test]
#[ignore]
async fn test_check_in_requires_approval() {
    let client = Client::new();
    let employee_id = create_employee(&client, "gate").await;
    let (visitor_id, token) = register_visitor(&client, employee_id, "Early Bird").await;

    // Pending visitors cannot check in
    let response = client
        .post(format!("{}/visitors/{}/checkin", BASE_URL, visitor_id))
        .send()
        .await
        .expect("Failed to send check-in");
    assert_eq!(response.status(), 409);

    // Approve, then the full gate flow works exactly once
    client
        .post(format!("{}/approvals/approve/{}", BASE_URL, token))
        .send()
        .await
        .expect("Failed to approve");

    let response = client
        .post(format!("{}/visitors/{}/checkin", BASE_URL, visitor_id))
        .send()
        .await
        .expect("Failed to check in");
    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/visitors/{}/checkout", BASE_URL, visitor_id))
        .send()
        .await
        .expect("Failed to check out");
    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/visitors/{}/checkout", BASE_URL, visitor_id))
        .send()
        .await
        .expect("Failed to send second check-out");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_preapproval_limits_after_one() {
    let client = Client::new();
    let employee_id = create_employee(&client, "limits").await;
    let (_, _) = create_preapproval(&client, employee_id, "First Guest").await;

    let date = (Utc::now() + Duration::hours(25)).date_naive();
    let response = client
        .get(format!(
            "{}/employees/{}/preapprovals/limits?date={}",
            BASE_URL, employee_id, date
        ))
        .send()
        .await
        .expect("Failed to check limits");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse limits");
    assert_eq!(body["limits"]["currentCount"], 1);
    assert_eq!(body["limits"]["remainingSlots"], 4);
    assert_eq!(body["limits"]["canCreateMore"], true);
}

#[tokio::test]
#[ignore]
async fn test_preapproval_quota_boundary() {
    let client = Client::new();
    let employee_id = create_employee(&client, "quota").await;

    // With 4 existing pre-approvals, a 5th succeeds
    for i in 0..5 {
        create_preapproval(&client, employee_id, &format!("Guest {}", i)).await;
    }

    // A 6th fails, reporting the count and the limit
    let start = Utc::now() + Duration::hours(25);
    let end = start + Duration::hours(1);
    let response = client
        .post(format!("{}/employees/{}/preapprovals", BASE_URL, employee_id))
        .json(&json!({
            "fullName": "One Too Many",
            "purposeOfVisit": "Scheduled meeting",
            "visitDate": start.date_naive().to_string(),
            "scheduledArrivalStart": start.to_rfc3339(),
            "scheduledArrivalEnd": end.to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send sixth pre-approval");

    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.expect("Failed to parse quota error");
    assert_eq!(body["details"]["currentCount"], 5);
    assert_eq!(body["details"]["limit"], 5);
}

#[tokio::test]
#[ignore]
async fn test_preapproval_window_validation() {
    let client = Client::new();
    let employee_id = create_employee(&client, "window").await;

    let start = Utc::now() + Duration::hours(25);

    // Degenerate window: start == end
    let response = client
        .post(format!("{}/employees/{}/preapprovals", BASE_URL, employee_id))
        .json(&json!({
            "fullName": "Zero Window",
            "purposeOfVisit": "Meeting",
            "visitDate": start.date_naive().to_string(),
            "scheduledArrivalStart": start.to_rfc3339(),
            "scheduledArrivalEnd": start.to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Window in the past
    let past = Utc::now() - Duration::hours(2);
    let response = client
        .post(format!("{}/employees/{}/preapprovals", BASE_URL, employee_id))
        .json(&json!({
            "fullName": "Time Traveller",
            "purposeOfVisit": "Meeting",
            "visitDate": past.date_naive().to_string(),
            "scheduledArrivalStart": past.to_rfc3339(),
            "scheduledArrivalEnd": (past + Duration::hours(1)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_quick_check_in_outside_window() {
    let client = Client::new();
    let employee_id = create_employee(&client, "quick").await;
    let (_, token) = create_preapproval(&client, employee_id, "Punctual Guest").await;

    // The window opens 25 hours from now; arriving today is refused
    let response = client
        .post(format!("{}/visitors/quick-checkin/{}", BASE_URL, token))
        .send()
        .await
        .expect("Failed to send quick check-in");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_cancel_preapproval() {
    let client = Client::new();
    let employee_id = create_employee(&client, "cancel").await;
    let (visitor_id, _) = create_preapproval(&client, employee_id, "Cancelled Guest").await;

    let response = client
        .delete(format!(
            "{}/employees/{}/preapprovals/{}",
            BASE_URL, employee_id, visitor_id
        ))
        .send()
        .await
        .expect("Failed to cancel");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse cancellation");
    assert_eq!(body["reason"], "Cancelled by host employee");
    assert_eq!(body["visitor"]["status"], "cancelled");

    // A cancelled visit cannot be updated
    let response = client
        .put(format!(
            "{}/employees/{}/preapprovals/{}",
            BASE_URL, employee_id, visitor_id
        ))
        .json(&json!({ "purposeOfVisit": "Changed" }))
        .send()
        .await
        .expect("Failed to send update");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_update_preapproval_requires_sponsor() {
    let client = Client::new();
    let sponsor_id = create_employee(&client, "sponsor").await;
    let other_id = create_employee(&client, "other").await;
    let (visitor_id, _) = create_preapproval(&client, sponsor_id, "Guarded Guest").await;

    let response = client
        .put(format!(
            "{}/employees/{}/preapprovals/{}",
            BASE_URL, other_id, visitor_id
        ))
        .json(&json!({ "purposeOfVisit": "Hijacked" }))
        .send()
        .await
        .expect("Failed to send update");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_employee_delete_blocked_while_referenced() {
    let client = Client::new();
    let employee_id = create_employee(&client, "hosting").await;
    create_preapproval(&client, employee_id, "Anchored Guest").await;

    let response = client
        .delete(format!("{}/employees/{}", BASE_URL, employee_id))
        .send()
        .await
        .expect("Failed to send delete");
    assert_eq!(response.status(), 409);

    // An employee without visitors deletes cleanly
    let free_id = create_employee(&client, "free").await;
    let response = client
        .delete(format!("{}/employees/{}", BASE_URL, free_id))
        .send()
        .await
        .expect("Failed to send delete");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_cleanup_expired_is_idempotent() {
    let client = Client::new();

    let first: Value = client
        .post(format!("{}/approvals/cleanup-expired", BASE_URL))
        .send()
        .await
        .expect("Failed to sweep")
        .json()
        .await
        .expect("Failed to parse sweep");
    assert!(first["expiredCount"].is_number());

    // Nothing left to expire on an immediate second run
    let second: Value = client
        .post(format!("{}/approvals/cleanup-expired", BASE_URL))
        .send()
        .await
        .expect("Failed to sweep again")
        .json()
        .await
        .expect("Failed to parse sweep");
    assert_eq!(second["expiredCount"], 0);
}

#[tokio::test]
#[ignore]
async fn test_unknown_token_is_not_found() {
    let client = Client::new();

    let response = client
        .post(format!("{}/approvals/approve/no-such-token", BASE_URL))
        .send()
        .await
        .expect("Failed to send approve");
    assert_eq!(response.status(), 404);

    let response = client
        .post(format!("{}/visitors/quick-checkin/no-such-token", BASE_URL))
        .send()
        .await
        .expect("Failed to send quick check-in");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_visitor_search_requires_query() {
    let client = Client::new();

    let response = client
        .get(format!("{}/visitors/search?query=", BASE_URL))
        .send()
        .await
        .expect("Failed to send search");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_visitors_by_status_rejects_unknown_status() {
    let client = Client::new();

    let response = client
        .get(format!("{}/visitors/status/teleported", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}
