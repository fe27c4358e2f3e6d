pub mod controller;
pub mod router;
pub mod service;

pub use router::init_export_router;
pub use service::ExportService;
