//! # Drivers Hub API
//!
//! REST backend for a driving school, built with Axum and PostgreSQL. It keeps
//! the school's records (candidates, instructors, cars, lesson packages,
//! payments, appointments and progress reports), notifies staff when records
//! are created and emails candidates and instructors at key moments.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/      # AuthUser extractor and role gates
//! ├── modules/         # Feature modules
//! │   ├── auth/        # Bootstrap registration, login, password change
//! │   ├── candidates/  # Candidates and CLI-NNNNNN client numbers
//! │   ├── instructors/ # Instructor accounts and self-service
//! │   ├── cars/ packages/ payments/ appointments/ reports/
//! │   ├── notifications/ # Per-user in-app notifications and fan-out
//! │   ├── documents/   # Candidate file uploads
//! │   └── export/      # CSV / JSON exports
//! └── utils/           # Email, scoping, SQL helpers
//! ```
//!
//! Each feature module has a `controller.rs` (HTTP handlers), `service.rs`
//! (queries and business rules) and `router.rs`. Entities and DTOs live in the
//! `drivers-hub-models` crate.
//!
//! ## Roles
//!
//! | Role | Code | Reaches |
//! |------|------|---------|
//! | Admin | 0 | everything |
//! | Instructor | 1 | own appointments and reports, own profile |
//! | Staff | 2 | payments |
//!
//! Every authenticated user can read and manage their own notifications.
//!
//! ## First run
//!
//! The first `POST /api/auth/register` on an empty database creates an admin;
//! later registrations need an admin token. `drivers-hub-cli create-admin`
//! does the same from a shell.
//!
//! API documentation is served at `/swagger-ui` and `/scalar`.

pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;

pub use drivers_hub_auth;
pub use drivers_hub_config;
pub use drivers_hub_core;
pub use drivers_hub_db;
pub use drivers_hub_models;
