//! # Drivers Hub Models
//!
//! Database entities, request/response DTOs and validation rules.
//!
//! - [`users`]: accounts and the [`UserRole`] model
//! - [`auth`]: registration, login and password change bodies
//! - [`candidates`], [`instructors`], [`cars`], [`packages`], [`payments`],
//!   [`appointments`], [`reports`]: school records
//! - [`notifications`]: in-app notifications and [`NotificationEvent`]
//! - [`documents`], [`export`]: uploads and data export

pub mod appointments;
pub mod auth;
pub mod candidates;
pub mod cars;
pub mod documents;
pub mod export;
pub mod instructors;
pub mod notifications;
pub mod packages;
pub mod payments;
pub mod reports;
pub mod users;

pub use appointments::{
    Appointment, AppointmentFilterParams, AppointmentStatus, CreateAppointmentDto,
    UpdateAppointmentDto,
};
pub use auth::{ChangePasswordDto, LoginRequest, LoginResponse, MessageResponse, RegisterRequest};
pub use candidates::{
    Candidate, CandidateFilterParams, CandidateStatus, CreateCandidateDto, UpdateCandidateDto,
};
pub use cars::{Car, CarFilterParams, CarStatus, CreateCarDto, UpdateCarDto};
pub use documents::CandidateDocument;
pub use export::{ExportFormat, ExportParams};
pub use instructors::{
    CreateInstructorDto, Instructor, InstructorFilterParams, InstructorStatus,
    UpdateInstructorDto, UpdateInstructorProfileDto,
};
pub use notifications::{
    CreateNotificationDto, MarkAllReadResponse, Notification, NotificationEvent, NotificationFilterParams,
    NotificationMessage, NotificationType, UnreadCountResponse,
};
pub use packages::{CreatePackageDto, Package, UpdatePackageDto};
pub use payments::{
    CreatePaymentDto, Payment, PaymentFilterParams, PaymentMethod, PaymentStatus, UpdatePaymentDto,
};
pub use reports::{CreateReportDto, Report, ReportFilterParams, UpdateReportDto};
pub use users::{UpdateProfileDto, User, UserRole, UserWithPassword};
