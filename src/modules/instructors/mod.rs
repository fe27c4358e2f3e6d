pub mod controller;
pub mod router;
pub mod service;

pub use router::{init_instructor_self_router, init_instructors_router};
pub use service::InstructorService;
