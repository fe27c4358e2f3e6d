pub mod auth_helpers;
pub mod db;
pub mod email;
pub mod mailer;
