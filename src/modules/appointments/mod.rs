pub mod controller;
pub mod router;
pub mod service;

pub use router::init_appointments_router;
pub use service::AppointmentService;
