//! # Drivers Hub CLI
//!
//! Database seeding utilities for local development and demos.
//!
//! ```ignore
//! use drivers_hub_cli::seeder::{seed_all, SeedConfig};
//!
//! seed_all(&pool, &SeedConfig::default(), "password123").await?;
//! ```

pub mod seeder;
