//! Email service for visitor lifecycle notifications

use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    models::visitor::Visitor,
};

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Notify a visitor that their request was approved, attaching the
    /// admission QR code
    pub async fn send_approval(&self, visitor: &Visitor, qr_data_url: &str) -> AppResult<()> {
        let to = self.visitor_address(visitor)?;
        let subject = "Visitor Request Approved - Access Granted";

        let plain = format!(
            r#"
Hello {name},

Your visit request has been approved by {host}.

Badge ID: {badge}
Purpose: {purpose}

Show the attached QR code at the security desk for check-in, and bring a
valid photo ID for verification. Don't forget to check out when leaving.
"#,
            name = visitor.full_name,
            host = visitor.host_employee_name,
            badge = visitor.visitor_badge_id,
            purpose = visitor.purpose_of_visit,
        );

        let html = format!(
            r#"<html><body>
<h2>Access Approved</h2>
<p>Hello {name},</p>
<p>Your visit request has been <strong>approved</strong> by {host}.</p>
<ul>
  <li><strong>Badge ID:</strong> {badge}</li>
  <li><strong>Purpose:</strong> {purpose}</li>
  <li><strong>Department:</strong> {department}</li>
{remarks}</ul>
<p>Show this QR code at the security desk for check-in:</p>
<img src="{qr}" alt="Admission QR code" width="200">
<p>Please bring a valid photo ID for verification, and check out when leaving.</p>
</body></html>"#,
            name = visitor.full_name,
            host = visitor.host_employee_name,
            badge = visitor.visitor_badge_id,
            purpose = visitor.purpose_of_visit,
            department = visitor.host_department.as_deref().unwrap_or("N/A"),
            remarks = visitor
                .approval_remarks
                .as_deref()
                .map(|r| format!("  <li><strong>Remarks:</strong> {}</li>\n", r))
                .unwrap_or_default(),
            qr = qr_data_url,
        );

        self.send_email(to, subject, &plain, &html).await
    }

    /// Notify a visitor that their request was declined or cancelled
    pub async fn send_rejection(&self, visitor: &Visitor, reason: &str) -> AppResult<()> {
        let to = self.visitor_address(visitor)?;
        let subject = "Visitor Request Declined";

        let plain = format!(
            r#"
Hello {name},

We regret to inform you that your visitor request has been declined by {host}.

Badge ID: {badge}
Reason: {reason}

You can contact your host directly to discuss alternative arrangements, or
submit a new request if circumstances change.
"#,
            name = visitor.full_name,
            host = visitor.host_employee_name,
            badge = visitor.visitor_badge_id,
            reason = reason,
        );

        let html = format!(
            r#"<html><body>
<h2>Request Declined</h2>
<p>Hello {name},</p>
<p>We regret to inform you that your visitor request has been <strong>declined</strong> by {host}.</p>
<ul>
  <li><strong>Badge ID:</strong> {badge}</li>
  <li><strong>Reason:</strong> {reason}</li>
</ul>
<p>You can contact your host directly to discuss alternative arrangements,
or submit a new request if circumstances change.</p>
</body></html>"#,
            name = visitor.full_name,
            host = visitor.host_employee_name,
            badge = visitor.visitor_badge_id,
            reason = reason,
        );

        self.send_email(to, subject, &plain, &html).await
    }

    /// Send a pre-approved quick access pass with the validity window
    pub async fn send_pre_approval(&self, visitor: &Visitor, qr_data_url: &str) -> AppResult<()> {
        let to = self.visitor_address(visitor)?;
        let subject = "Pre-Approved Visit - Quick Access Pass";

        let window = match (visitor.scheduled_arrival_start, visitor.scheduled_arrival_end) {
            (Some(start), Some(end)) => format!(
                "{} - {}",
                start.format("%Y-%m-%d %H:%M UTC"),
                end.format("%H:%M UTC")
            ),
            _ => "TBD".to_string(),
        };

        let plain = format!(
            r#"
Hello {name},

{host} has pre-approved your visit. You can use quick check-in during your
scheduled time window.

Badge ID: {badge}
Purpose: {purpose}
Access window: {window}

Show the attached QR code at security for instant check-in. This access
pass is only valid during the above time window.
"#,
            name = visitor.full_name,
            host = visitor.host_employee_name,
            badge = visitor.visitor_badge_id,
            purpose = visitor.purpose_of_visit,
            window = window,
        );

        let html = format!(
            r#"<html><body>
<h2>Pre-Approved Access</h2>
<p>Hello {name},</p>
<p>{host} has pre-approved your visit. You can use quick check-in during
your scheduled time window.</p>
<ul>
  <li><strong>Badge ID:</strong> {badge}</li>
  <li><strong>Purpose:</strong> {purpose}</li>
  <li><strong>Access window:</strong> {window}</li>
</ul>
<p>Show this QR code at security for instant check-in:</p>
<img src="{qr}" alt="Pre-approval QR code" width="200">
<p><em>This access pass is only valid during the above time window.</em></p>
</body></html>"#,
            name = visitor.full_name,
            host = visitor.host_employee_name,
            badge = visitor.visitor_badge_id,
            purpose = visitor.purpose_of_visit,
            window = window,
            qr = qr_data_url,
        );

        self.send_email(to, subject, &plain, &html).await
    }

    /// Alert a host employee that a visitor is waiting for their decision
    pub async fn send_employee_alert(
        &self,
        employee_email: &str,
        visitor: &Visitor,
        approve_url: &str,
        reject_url: &str,
    ) -> AppResult<()> {
        let subject = "New Visitor Approval Request";

        let plain = format!(
            r#"
A visitor is requesting to meet with you.

Name: {name}
Phone: {phone}
Email: {email}
Company: {company}
Purpose: {purpose}
Badge ID: {badge}

Approve: {approve_url}
Decline: {reject_url}

Please respond promptly to avoid keeping the visitor waiting.
"#,
            name = visitor.full_name,
            phone = visitor.mobile_number.as_deref().unwrap_or("Not provided"),
            email = visitor.email.as_deref().unwrap_or("Not provided"),
            company = visitor.company_name.as_deref().unwrap_or("Not specified"),
            purpose = visitor.purpose_of_visit,
            badge = visitor.visitor_badge_id,
            approve_url = approve_url,
            reject_url = reject_url,
        );

        let html = format!(
            r#"<html><body>
<h2>Visitor Approval Needed</h2>
<p>A visitor is requesting to meet with you.</p>
<ul>
  <li><strong>Name:</strong> {name}</li>
  <li><strong>Phone:</strong> {phone}</li>
  <li><strong>Email:</strong> {email}</li>
  <li><strong>Company:</strong> {company}</li>
  <li><strong>Purpose:</strong> {purpose}</li>
  <li><strong>Badge ID:</strong> {badge}</li>
</ul>
<p>
  <a href="{approve_url}">Approve Visit</a> |
  <a href="{reject_url}">Decline Visit</a>
</p>
<p>Please respond promptly to avoid keeping the visitor waiting.</p>
</body></html>"#,
            name = visitor.full_name,
            phone = visitor.mobile_number.as_deref().unwrap_or("Not provided"),
            email = visitor.email.as_deref().unwrap_or("Not provided"),
            company = visitor.company_name.as_deref().unwrap_or("Not specified"),
            purpose = visitor.purpose_of_visit,
            badge = visitor.visitor_badge_id,
            approve_url = approve_url,
            reject_url = reject_url,
        );

        self.send_email(employee_email, subject, &plain, &html).await
    }

    fn visitor_address<'a>(&self, visitor: &'a Visitor) -> AppResult<&'a str> {
        visitor
            .email
            .as_deref()
            .ok_or_else(|| AppError::Internal("Visitor has no email address on file".to_string()))
    }

    /// Generic email sending function
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        plain_body: &str,
        html_body: &str,
    ) -> AppResult<()> {
        let from_name = self
            .config
            .smtp_from_name
            .as_deref()
            .unwrap_or("Gatepass");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(plain_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer_builder = if self.config.smtp_use_tls {
            // Use STARTTLS for secure connection
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = if let (Some(username), Some(password)) = (
            &self.config.smtp_username,
            &self.config.smtp_password,
        ) {
            mailer_builder.credentials(Credentials::new(
                username.clone(),
                password.clone(),
            ))
        } else {
            mailer_builder
        };

        let mailer = mailer_builder.build();

        mailer
            .send(&email)
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}
