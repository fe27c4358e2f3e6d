//! Transactional emails.
//!
//! Each `*_email` function renders an [`OutgoingEmail`] from domain records and
//! fails with [`EmailError::MissingField`] before anything is sent when a
//! required value (usually the recipient address) is absent.

use std::fmt;
use std::sync::Arc;

use drivers_hub_models::{Appointment, Candidate, Instructor, Payment};
use tracing::instrument;

use crate::metrics::track_email;
use crate::utils::mailer::{EmailError, Mailer, OutgoingEmail, SentEmail};

#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<dyn Mailer>,
    frontend_url: String,
}

impl fmt::Debug for EmailService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailService")
            .field("transport", &self.mailer.transport_name())
            .field("frontend_url", &self.frontend_url)
            .finish()
    }
}

impl EmailService {
    pub fn new(mailer: Arc<dyn Mailer>, frontend_url: impl Into<String>) -> Self {
        Self {
            mailer,
            frontend_url: frontend_url.into(),
        }
    }

    pub fn transport_name(&self) -> &'static str {
        self.mailer.transport_name()
    }

    #[instrument(skip_all, fields(candidate_id = %candidate.id))]
    pub async fn send_welcome_email(&self, candidate: &Candidate) -> Result<SentEmail, EmailError> {
        self.deliver("candidate_welcome", welcome_email(candidate, &self.frontend_url))
            .await
    }

    #[instrument(skip_all, fields(appointment_id = %appointment.id))]
    pub async fn send_appointment_reminder(
        &self,
        appointment: &Appointment,
        candidate: &Candidate,
    ) -> Result<SentEmail, EmailError> {
        self.deliver(
            "appointment_reminder",
            appointment_reminder_email(appointment, candidate),
        )
        .await
    }

    #[instrument(skip_all, fields(instructor_id = %instructor.id, candidate_id = %candidate.id))]
    pub async fn send_candidate_assigned_email(
        &self,
        instructor: &Instructor,
        candidate: &Candidate,
    ) -> Result<SentEmail, EmailError> {
        self.deliver(
            "candidate_assigned",
            candidate_assigned_email(instructor, candidate, &self.frontend_url),
        )
        .await
    }

    #[instrument(skip_all, fields(instructor_id = %instructor.id))]
    pub async fn send_instructor_welcome_email(
        &self,
        instructor: &Instructor,
    ) -> Result<SentEmail, EmailError> {
        self.deliver(
            "instructor_welcome",
            instructor_welcome_email(instructor, &self.frontend_url),
        )
        .await
    }

    #[instrument(skip_all, fields(payment_id = %payment.id))]
    pub async fn send_payment_confirmation(
        &self,
        payment: &Payment,
        candidate: &Candidate,
    ) -> Result<SentEmail, EmailError> {
        self.deliver(
            "payment_confirmation",
            payment_confirmation_email(payment, candidate),
        )
        .await
    }

    async fn deliver(
        &self,
        template: &'static str,
        rendered: Result<OutgoingEmail, EmailError>,
    ) -> Result<SentEmail, EmailError> {
        let result = match rendered {
            Ok(email) => self.mailer.send(email).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(sent) => {
                tracing::info!(template, message_id = %sent.message_id, transport = sent.transport, "Email sent");
                track_email(template, true);
            }
            Err(e) => {
                tracing::warn!(template, kind = e.kind(), error = %e, "Email delivery failed");
                track_email(template, false);
            }
        }

        result
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, EmailError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(EmailError::MissingField(field))
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, accent: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="100%" cellpadding="0" cellspacing="0" style="background-color: #f4f4f4; padding: 20px;">
        <tr>
            <td align="center">
                <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden;">
                    <tr>
                        <td style="background-color: {accent}; padding: 30px; text-align: center;">
                            <h1 style="margin: 0; color: #ffffff; font-size: 28px;">Drivers Hub</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 40px 30px; color: #444444; font-size: 16px; line-height: 1.5;">
                            <h2 style="margin: 0 0 20px 0; color: #333333; font-size: 22px;">{title}</h2>
                            {body}
                        </td>
                    </tr>
                    <tr>
                        <td style="background-color: #f8f9fa; padding: 20px 30px; text-align: center; border-top: 1px solid #e9ecef;">
                            <p style="margin: 0; color: #999999; font-size: 12px;">
                                This is an automated email from Drivers Hub. Please do not reply.
                            </p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"#
    )
}

pub fn welcome_email(candidate: &Candidate, frontend_url: &str) -> Result<OutgoingEmail, EmailError> {
    let to = required(candidate.email.as_deref(), "candidate email")?;
    let name = candidate.full_name();

    let text_body = format!(
        "Hi {},\n\n\
         Welcome to Drivers Hub! Your client number is {}.\n\
         Please quote it whenever you contact us.\n\n\
         {}\n\n\
         Best regards,\n\
         Drivers Hub Team",
        name, candidate.unique_client_number, frontend_url
    );
    let html_body = layout(
        "Welcome to Drivers Hub",
        "#2563EB",
        &format!(
            "<p>Hi <strong>{}</strong>,</p>\
             <p>Welcome aboard! Your client number is <strong>{}</strong>. Please quote it whenever you contact us.</p>",
            escape_html(&name),
            escape_html(&candidate.unique_client_number)
        ),
    );

    Ok(OutgoingEmail {
        to_email: to.to_string(),
        to_name: name,
        subject: "Welcome to Drivers Hub".to_string(),
        text_body,
        html_body,
    })
}

pub fn appointment_reminder_email(
    appointment: &Appointment,
    candidate: &Candidate,
) -> Result<OutgoingEmail, EmailError> {
    let to = required(candidate.email.as_deref(), "candidate email")?;
    let name = candidate.full_name();
    let when = appointment.start_time.format("%A %d %B %Y, %H:%M UTC").to_string();
    let instructor = appointment
        .instructor_name
        .clone()
        .unwrap_or_else(|| "your instructor".to_string());
    let car = appointment
        .car_license_plate
        .as_deref()
        .map(|plate| format!(" Car: {}.", plate))
        .unwrap_or_default();

    let text_body = format!(
        "Hi {},\n\n\
         This is a reminder of your driving lesson with {} on {}.{}\n\n\
         Best regards,\n\
         Drivers Hub Team",
        name, instructor, when, car
    );
    let html_body = layout(
        "Lesson reminder",
        "#F59E0B",
        &format!(
            "<p>Hi <strong>{}</strong>,</p>\
             <p>This is a reminder of your driving lesson with <strong>{}</strong> on <strong>{}</strong>.{}</p>",
            escape_html(&name),
            escape_html(&instructor),
            escape_html(&when),
            escape_html(&car)
        ),
    );

    Ok(OutgoingEmail {
        to_email: to.to_string(),
        to_name: name,
        subject: format!("Lesson reminder: {}", when),
        text_body,
        html_body,
    })
}

pub fn candidate_assigned_email(
    instructor: &Instructor,
    candidate: &Candidate,
    frontend_url: &str,
) -> Result<OutgoingEmail, EmailError> {
    let to = required(Some(instructor.email.as_str()), "instructor email")?;
    let instructor_name = instructor.full_name();
    let candidate_name = candidate.full_name();
    let link = format!("{}/instructor/candidates", frontend_url.trim_end_matches('/'));

    let text_body = format!(
        "Hi {},\n\n\
         {} ({}) has been assigned to you.\n\
         Phone: {}\n\n\
         See your candidates: {}\n\n\
         Drivers Hub Team",
        instructor_name,
        candidate_name,
        candidate.unique_client_number,
        candidate.phone.as_deref().unwrap_or("not provided"),
        link
    );
    let html_body = layout(
        "New candidate assigned",
        "#10B981",
        &format!(
            "<p>Hi <strong>{}</strong>,</p>\
             <p><strong>{}</strong> ({}) has been assigned to you.</p>\
             <p><a href=\"{}\">View your candidates</a></p>",
            escape_html(&instructor_name),
            escape_html(&candidate_name),
            escape_html(&candidate.unique_client_number),
            escape_html(&link)
        ),
    );

    Ok(OutgoingEmail {
        to_email: to.to_string(),
        to_name: instructor_name,
        subject: format!("New candidate assigned: {}", candidate_name),
        text_body,
        html_body,
    })
}

pub fn instructor_welcome_email(
    instructor: &Instructor,
    frontend_url: &str,
) -> Result<OutgoingEmail, EmailError> {
    let to = required(Some(instructor.email.as_str()), "instructor email")?;
    let name = instructor.full_name();
    let link = format!("{}/login", frontend_url.trim_end_matches('/'));

    let text_body = format!(
        "Hi {},\n\n\
         An instructor account has been created for you on Drivers Hub.\n\
         Sign in with {} at {}.\n\n\
         Drivers Hub Team",
        name, to, link
    );
    let html_body = layout(
        "Your instructor account",
        "#4F46E5",
        &format!(
            "<p>Hi <strong>{}</strong>,</p>\
             <p>An instructor account has been created for you. Sign in with <strong>{}</strong>.</p>\
             <p><a href=\"{}\">Sign in to Drivers Hub</a></p>",
            escape_html(&name),
            escape_html(to),
            escape_html(&link)
        ),
    );

    Ok(OutgoingEmail {
        to_email: to.to_string(),
        to_name: name,
        subject: "Welcome to the Drivers Hub team".to_string(),
        text_body,
        html_body,
    })
}

pub fn payment_confirmation_email(
    payment: &Payment,
    candidate: &Candidate,
) -> Result<OutgoingEmail, EmailError> {
    let to = required(candidate.email.as_deref(), "candidate email")?;
    let name = candidate.full_name();
    let reference = payment.reference.as_deref().unwrap_or("-");

    let text_body = format!(
        "Hi {},\n\n\
         We received your payment of {:.2} ({}).\n\
         Client number: {}\n\
         Reference: {}\n\n\
         Thank you,\n\
         Drivers Hub Team",
        name,
        payment.amount,
        payment.method.as_str(),
        candidate.unique_client_number,
        reference
    );
    let html_body = layout(
        "Payment received",
        "#10B981",
        &format!(
            "<p>Hi <strong>{}</strong>,</p>\
             <p>We received your payment of <strong>{:.2}</strong> by {}.</p>\
             <p>Client number: {}<br>Reference: {}</p>",
            escape_html(&name),
            payment.amount,
            payment.method.as_str(),
            escape_html(&candidate.unique_client_number),
            escape_html(reference)
        ),
    );

    Ok(OutgoingEmail {
        to_email: to.to_string(),
        to_name: name,
        subject: "Payment confirmation".to_string(),
        text_body,
        html_body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use drivers_hub_models::{
        AppointmentStatus, CandidateStatus, InstructorStatus, PaymentMethod, PaymentStatus,
    };
    use uuid::Uuid;

    fn candidate(email: Option<&str>) -> Candidate {
        Candidate {
            id: Uuid::new_v4(),
            unique_client_number: "CLI-000012".to_string(),
            first_name: "Ada".to_string(),
            last_name: "<Obi>".to_string(),
            email: email.map(str::to_string),
            phone: None,
            address: None,
            date_of_birth: None,
            status: CandidateStatus::Active,
            package_id: None,
            instructor_id: None,
            car_id: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            package_name: None,
            instructor_name: None,
            car_license_plate: None,
        }
    }

    fn instructor(email: &str) -> Instructor {
        Instructor {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            first_name: "Bola".to_string(),
            last_name: "Ade".to_string(),
            email: email.to_string(),
            phone: None,
            license_number: None,
            specialties: vec![],
            assigned_car_ids: vec![],
            status: InstructorStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_welcome_email_requires_candidate_email() {
        let err = welcome_email(&candidate(None), "http://localhost:5173").unwrap_err();
        assert!(matches!(err, EmailError::MissingField("candidate email")));

        let err = welcome_email(&candidate(Some("  ")), "http://localhost:5173").unwrap_err();
        assert!(matches!(err, EmailError::MissingField(_)));
    }

    #[test]
    fn test_welcome_email_escapes_html() {
        let email = welcome_email(&candidate(Some("ada@drivershub.local")), "http://x").unwrap();
        assert!(email.html_body.contains("Ada &lt;Obi&gt;"));
        assert!(email.text_body.contains("CLI-000012"));
    }

    #[test]
    fn test_candidate_assigned_requires_instructor_email() {
        let err = candidate_assigned_email(&instructor(""), &candidate(None), "http://x").unwrap_err();
        assert!(matches!(err, EmailError::MissingField("instructor email")));

        let email =
            candidate_assigned_email(&instructor("bola@drivershub.local"), &candidate(None), "http://x/")
                .unwrap();
        assert!(email.text_body.contains("http://x/instructor/candidates"));
    }

    #[test]
    fn test_reminder_mentions_time_and_instructor() {
        let appointment = Appointment {
            id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            instructor_id: Uuid::new_v4(),
            car_id: None,
            start_time: Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 6, 2, 15, 0, 0).unwrap(),
            status: AppointmentStatus::Scheduled,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            candidate_name: None,
            instructor_name: Some("Bola Ade".to_string()),
            car_license_plate: Some("LAG-123".to_string()),
        };
        let email =
            appointment_reminder_email(&appointment, &candidate(Some("ada@drivershub.local")))
                .unwrap();
        assert!(email.text_body.contains("Bola Ade"));
        assert!(email.text_body.contains("14:00 UTC"));
        assert!(email.text_body.contains("LAG-123"));
    }

    #[test]
    fn test_payment_confirmation_formats_amount() {
        let payment = Payment {
            id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            amount: 120.5,
            method: PaymentMethod::Bank,
            status: PaymentStatus::Paid,
            reference: None,
            notes: None,
            paid_at: Some(Utc::now()),
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            candidate_name: None,
            candidate_client_number: None,
        };
        let email =
            payment_confirmation_email(&payment, &candidate(Some("ada@drivershub.local"))).unwrap();
        assert!(email.text_body.contains("120.50 (bank)"));
    }
}
