use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use drivers_hub_core::{ErrorResponse, FieldError, PaginationMeta};
use drivers_hub_models::{
    Appointment, AppointmentStatus, Candidate, CandidateDocument, CandidateStatus, Car,
    CarStatus, ChangePasswordDto, CreateAppointmentDto, CreateCandidateDto, CreateCarDto,
    CreateInstructorDto, CreateNotificationDto, CreatePackageDto, CreatePaymentDto,
    CreateReportDto, ExportFormat, Instructor, InstructorStatus, LoginRequest, LoginResponse,
    MarkAllReadResponse, MessageResponse, Notification, NotificationType, Package, Payment,
    PaymentMethod, PaymentStatus, RegisterRequest, Report, UnreadCountResponse,
    UpdateAppointmentDto, UpdateCandidateDto, UpdateCarDto, UpdateInstructorDto,
    UpdateInstructorProfileDto, UpdatePackageDto, UpdatePaymentDto, UpdateReportDto, User,
};

use crate::modules::documents::controller::DocumentUploadForm;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::get_me,
        crate::modules::auth::controller::change_password,
        crate::modules::candidates::controller::get_candidates,
        crate::modules::candidates::controller::get_candidate,
        crate::modules::candidates::controller::create_candidate,
        crate::modules::candidates::controller::update_candidate,
        crate::modules::candidates::controller::delete_candidate,
        crate::modules::instructors::controller::get_instructors,
        crate::modules::instructors::controller::get_instructor,
        crate::modules::instructors::controller::create_instructor,
        crate::modules::instructors::controller::update_instructor,
        crate::modules::instructors::controller::delete_instructor,
        crate::modules::instructors::controller::get_my_profile,
        crate::modules::instructors::controller::update_my_profile,
        crate::modules::instructors::controller::change_my_password,
        crate::modules::cars::controller::get_cars,
        crate::modules::cars::controller::get_car,
        crate::modules::cars::controller::create_car,
        crate::modules::cars::controller::update_car,
        crate::modules::cars::controller::delete_car,
        crate::modules::packages::controller::get_packages,
        crate::modules::packages::controller::get_package,
        crate::modules::packages::controller::create_package,
        crate::modules::packages::controller::update_package,
        crate::modules::packages::controller::delete_package,
        crate::modules::payments::controller::get_payments,
        crate::modules::payments::controller::get_payment,
        crate::modules::payments::controller::create_payment,
        crate::modules::payments::controller::update_payment,
        crate::modules::payments::controller::delete_payment,
        crate::modules::appointments::controller::get_appointments,
        crate::modules::appointments::controller::get_appointment,
        crate::modules::appointments::controller::create_appointment,
        crate::modules::appointments::controller::update_appointment,
        crate::modules::appointments::controller::delete_appointment,
        crate::modules::appointments::controller::send_reminder,
        crate::modules::reports::controller::get_reports,
        crate::modules::reports::controller::get_report,
        crate::modules::reports::controller::create_report,
        crate::modules::reports::controller::update_report,
        crate::modules::reports::controller::delete_report,
        crate::modules::notifications::controller::get_notifications,
        crate::modules::notifications::controller::create_notification,
        crate::modules::notifications::controller::get_unread_count,
        crate::modules::notifications::controller::mark_as_read,
        crate::modules::notifications::controller::mark_all_as_read,
        crate::modules::notifications::controller::delete_notification,
        crate::modules::documents::controller::upload_document,
        crate::modules::documents::controller::list_documents,
        crate::modules::documents::controller::download_document,
        crate::modules::documents::controller::delete_document,
        crate::modules::export::controller::export_candidates,
        crate::modules::export::controller::export_instructors,
    ),
    components(
        schemas(
            ErrorResponse,
            FieldError,
            PaginationMeta,
            User,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            ChangePasswordDto,
            MessageResponse,
            Candidate,
            CandidateStatus,
            CreateCandidateDto,
            UpdateCandidateDto,
            Instructor,
            InstructorStatus,
            CreateInstructorDto,
            UpdateInstructorDto,
            UpdateInstructorProfileDto,
            Car,
            CarStatus,
            CreateCarDto,
            UpdateCarDto,
            Package,
            CreatePackageDto,
            UpdatePackageDto,
            Payment,
            PaymentMethod,
            PaymentStatus,
            CreatePaymentDto,
            UpdatePaymentDto,
            Appointment,
            AppointmentStatus,
            CreateAppointmentDto,
            UpdateAppointmentDto,
            Report,
            CreateReportDto,
            UpdateReportDto,
            Notification,
            NotificationType,
            CreateNotificationDto,
            UnreadCountResponse,
            MarkAllReadResponse,
            CandidateDocument,
            DocumentUploadForm,
            ExportFormat,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and the current account"),
        (name = "Candidates", description = "Driving school candidates"),
        (name = "Instructors", description = "Instructors and instructor self-service"),
        (name = "Cars", description = "School vehicles"),
        (name = "Packages", description = "Lesson packages"),
        (name = "Payments", description = "Candidate payments"),
        (name = "Appointments", description = "Lesson scheduling and reminders"),
        (name = "Reports", description = "Lesson and progress reports"),
        (name = "Notifications", description = "In-app notifications for the current user"),
        (name = "Documents", description = "Files attached to candidates"),
        (name = "Export", description = "CSV and JSON exports")
    ),
    info(
        title = "Drivers Hub API",
        version = "0.1.0",
        description = "Driving school management API: candidates, instructors, fleet, payments and scheduling.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_group_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/candidates/{id}",
            "/api/instructors/me",
            "/api/appointments/{id}/remind",
            "/api/notifications/read-all",
            "/api/documents/candidate/{candidate_id}",
            "/api/export/candidate",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
