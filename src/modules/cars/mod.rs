pub mod controller;
pub mod router;
pub mod service;

pub use router::init_cars_router;
pub use service::CarService;
