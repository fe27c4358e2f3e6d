//! Demo data for local development.
//!
//! Seeding runs in dependency order: packages, cars, instructors, then
//! candidates linked to the ids created before them. Everything seeded is
//! recognisable (`@example.com` accounts, `DEMO-` plates, catalogue package
//! names) so [`clear_seed`] can remove it without touching real records.

mod candidates;
mod fleet;
mod instructors;
mod models;

use std::time::Instant;

use sqlx::PgPool;

pub use candidates::{generate_candidates, seed_candidates};
pub use fleet::{DEMO_PACKAGES, DEMO_PLATE_PREFIX, generate_cars, seed_cars, seed_packages};
pub use instructors::{SEED_EMAIL_DOMAIN, generate_instructors, seed_instructors};
pub use models::{CandidateSeed, CarSeed, InstructorSeed, PackageSeed, SeedConfig, SeededRefs};

use drivers_hub_core::hash_password;

/// Seeds every kind of demo record. All seeded instructors share `password`.
pub async fn seed_all(db: &PgPool, config: &SeedConfig, password: &str) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let password_hash = hash_password(password).map_err(|e| e.error)?;

    let package_ids = seed_packages(db).await?;
    let car_ids = seed_cars(db, config.cars).await?;
    let instructor_ids = seed_instructors(db, config.instructors, &car_ids, &password_hash).await?;

    let refs = SeededRefs {
        package_ids,
        car_ids,
        instructor_ids,
    };
    seed_candidates(db, config.candidates, &refs).await?;

    println!("\n✅ Seeding finished in {:?}", start_time.elapsed());
    Ok(())
}

/// Counts of removed demo rows.
#[derive(Debug, Default)]
pub struct ClearedCounts {
    pub candidates: u64,
    pub instructors: u64,
    pub cars: u64,
    pub packages: u64,
}

/// Removes seeded records. Admin accounts are never deleted.
pub async fn clear_seed(db: &PgPool) -> anyhow::Result<ClearedCounts> {
    let email_pattern = format!("%@{}", SEED_EMAIL_DOMAIN);
    let mut tx = db.begin().await?;

    let candidates = sqlx::query("DELETE FROM candidates WHERE email LIKE $1")
        .bind(&email_pattern)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    // instructors rows cascade from their users
    let instructors = sqlx::query("DELETE FROM users WHERE email LIKE $1 AND role = 1")
        .bind(&email_pattern)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let cars = sqlx::query("DELETE FROM cars WHERE license_plate LIKE $1")
        .bind(format!("{}%", DEMO_PLATE_PREFIX))
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let names: Vec<&str> = DEMO_PACKAGES.iter().map(|p| p.name).collect();
    let packages = sqlx::query("DELETE FROM packages WHERE name = ANY($1)")
        .bind(&names)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    Ok(ClearedCounts {
        candidates,
        instructors,
        cars,
        packages,
    })
}
