//! In-app notifications and the events that produce them.
//!
//! A [`NotificationEvent`] describes something that just happened. It knows
//! what every admin should be told and, for events that concern a single
//! instructor, what that instructor should be told. Delivery lives in the
//! notification service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use drivers_hub_core::serde::deserialize_optional_bool;

use crate::payments::PaymentMethod;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "notification_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub read: bool,
    /// Kind of entity the notification points at, e.g. `candidate`
    pub related_entity: Option<String>,
    pub related_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A notification to be stored for one or more recipients.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationMessage {
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_entity: Option<String>,
    pub related_id: Option<Uuid>,
}

/// Body for sending a notification to a single user by hand.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateNotificationDto {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
    #[serde(rename = "type", default)]
    pub notification_type: NotificationType,
    #[validate(length(max = 50))]
    pub related_entity: Option<String>,
    pub related_id: Option<Uuid>,
}

impl From<CreateNotificationDto> for NotificationMessage {
    fn from(dto: CreateNotificationDto) -> Self {
        Self {
            title: dto.title,
            message: dto.message,
            notification_type: dto.notification_type,
            related_entity: dto.related_entity,
            related_id: dto.related_id,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationFilterParams {
    /// Only read (`true`) or unread (`false`) notifications
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub read: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct UnreadCountResponse {
    pub count: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    CandidateCreated {
        candidate_id: Uuid,
        name: String,
        client_number: String,
        instructor_id: Option<Uuid>,
    },
    InstructorCreated {
        instructor_id: Uuid,
        name: String,
    },
    CarCreated {
        car_id: Uuid,
        model: String,
        license_plate: String,
    },
    PackageCreated {
        package_id: Uuid,
        name: String,
        price: f64,
        hours: i32,
    },
    AppointmentCreated {
        appointment_id: Uuid,
        candidate_name: String,
        instructor_id: Uuid,
        start_time: DateTime<Utc>,
    },
    PaymentCreated {
        payment_id: Uuid,
        candidate_name: String,
        amount: f64,
        method: PaymentMethod,
    },
}

impl NotificationEvent {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CandidateCreated { .. } => "candidate_created",
            Self::InstructorCreated { .. } => "instructor_created",
            Self::CarCreated { .. } => "car_created",
            Self::PackageCreated { .. } => "package_created",
            Self::AppointmentCreated { .. } => "appointment_created",
            Self::PaymentCreated { .. } => "payment_created",
        }
    }

    fn related(&self) -> (&'static str, Uuid) {
        match self {
            Self::CandidateCreated { candidate_id, .. } => ("candidate", *candidate_id),
            Self::InstructorCreated { instructor_id, .. } => ("instructor", *instructor_id),
            Self::CarCreated { car_id, .. } => ("car", *car_id),
            Self::PackageCreated { package_id, .. } => ("package", *package_id),
            Self::AppointmentCreated { appointment_id, .. } => ("appointment", *appointment_id),
            Self::PaymentCreated { payment_id, .. } => ("payment", *payment_id),
        }
    }

    fn message(&self, title: &str, message: String, kind: NotificationType) -> NotificationMessage {
        let (entity, id) = self.related();
        NotificationMessage {
            title: title.to_string(),
            message,
            notification_type: kind,
            related_entity: Some(entity.to_string()),
            related_id: Some(id),
        }
    }

    /// What every admin is told.
    pub fn admin_message(&self) -> NotificationMessage {
        match self {
            Self::CandidateCreated {
                name,
                client_number,
                ..
            } => self.message(
                "New candidate",
                format!("{} was registered as {}", name, client_number),
                NotificationType::Success,
            ),
            Self::InstructorCreated { name, .. } => self.message(
                "New instructor",
                format!("{} joined as an instructor", name),
                NotificationType::Success,
            ),
            Self::CarCreated {
                model,
                license_plate,
                ..
            } => self.message(
                "New car",
                format!("{} ({}) was added to the fleet", model, license_plate),
                NotificationType::Info,
            ),
            Self::PackageCreated {
                name, price, hours, ..
            } => self.message(
                "New package",
                format!("{}: {} hours for {:.2}", name, hours, price),
                NotificationType::Info,
            ),
            Self::AppointmentCreated {
                candidate_name,
                start_time,
                ..
            } => self.message(
                "New appointment",
                format!(
                    "Lesson with {} scheduled for {}",
                    candidate_name,
                    start_time.format("%Y-%m-%d %H:%M UTC")
                ),
                NotificationType::Info,
            ),
            Self::PaymentCreated {
                candidate_name,
                amount,
                method,
                ..
            } => self.message(
                "New payment",
                format!(
                    "{:.2} received from {} by {}",
                    amount,
                    candidate_name,
                    method.as_str()
                ),
                NotificationType::Success,
            ),
        }
    }

    /// The instructor (by instructor id) directly affected by this event, if any.
    pub fn affected_instructor(&self) -> Option<Uuid> {
        match self {
            Self::CandidateCreated { instructor_id, .. } => *instructor_id,
            Self::AppointmentCreated { instructor_id, .. } => Some(*instructor_id),
            _ => None,
        }
    }

    /// What the affected instructor is told, if anyone.
    pub fn instructor_message(&self) -> Option<NotificationMessage> {
        match self {
            Self::CandidateCreated {
                name,
                client_number,
                instructor_id: Some(_),
                ..
            } => Some(self.message(
                "New candidate assigned",
                format!("{} ({}) has been assigned to you", name, client_number),
                NotificationType::Info,
            )),
            Self::AppointmentCreated {
                candidate_name,
                start_time,
                ..
            } => Some(self.message(
                "New lesson scheduled",
                format!(
                    "You have a lesson with {} on {}",
                    candidate_name,
                    start_time.format("%Y-%m-%d %H:%M UTC")
                ),
                NotificationType::Info,
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candidate_event(instructor_id: Option<Uuid>) -> NotificationEvent {
        NotificationEvent::CandidateCreated {
            candidate_id: Uuid::new_v4(),
            name: "Ada Obi".to_string(),
            client_number: "CLI-000007".to_string(),
            instructor_id,
        }
    }

    #[test]
    fn test_candidate_without_instructor_only_notifies_admins() {
        let event = candidate_event(None);
        assert_eq!(event.affected_instructor(), None);
        assert!(event.instructor_message().is_none());
        assert!(event.admin_message().message.contains("CLI-000007"));
    }

    #[test]
    fn test_candidate_with_instructor_notifies_instructor() {
        let instructor_id = Uuid::new_v4();
        let event = candidate_event(Some(instructor_id));
        assert_eq!(event.affected_instructor(), Some(instructor_id));

        let message = event.instructor_message().unwrap();
        assert_eq!(message.related_entity.as_deref(), Some("candidate"));
        assert!(message.message.contains("Ada Obi"));
    }

    #[test]
    fn test_appointment_always_notifies_instructor() {
        let instructor_id = Uuid::new_v4();
        let event = NotificationEvent::AppointmentCreated {
            appointment_id: Uuid::new_v4(),
            candidate_name: "Ada Obi".to_string(),
            instructor_id,
            start_time: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap(),
        };
        assert_eq!(event.affected_instructor(), Some(instructor_id));
        let message = event.instructor_message().unwrap();
        assert!(message.message.contains("2025-03-01 09:30 UTC"));
    }

    #[test]
    fn test_fleet_events_have_no_instructor_message() {
        let events = [
            NotificationEvent::CarCreated {
                car_id: Uuid::new_v4(),
                model: "Toyota Yaris".to_string(),
                license_plate: "LAG-123".to_string(),
            },
            NotificationEvent::PackageCreated {
                package_id: Uuid::new_v4(),
                name: "Starter".to_string(),
                price: 250.0,
                hours: 10,
            },
            NotificationEvent::PaymentCreated {
                payment_id: Uuid::new_v4(),
                candidate_name: "Ada Obi".to_string(),
                amount: 99.5,
                method: PaymentMethod::Cash,
            },
            NotificationEvent::InstructorCreated {
                instructor_id: Uuid::new_v4(),
                name: "Bola Ade".to_string(),
            },
        ];
        for event in events {
            assert!(event.instructor_message().is_none(), "{}", event.kind());
            assert!(event.admin_message().related_id.is_some());
        }
    }

    #[test]
    fn test_notification_serializes_type_field() {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "New car".to_string(),
            message: "added".to_string(),
            notification_type: NotificationType::Warning,
            read: false,
            related_entity: None,
            related_id: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["type"], "warning");
    }
}
