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
