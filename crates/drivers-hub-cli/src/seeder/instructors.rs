//! Instructor accounts.
//!
//! Each instructor is a user with role `1` plus an `instructors` row linked to
//! it. Seeded accounts use `@example.com` addresses so they can be cleared later.

use std::time::Instant;

use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use rayon::prelude::*;
use sqlx::PgPool;
use uuid::Uuid;

use drivers_hub_models::UserRole;

use super::models::InstructorSeed;

/// Email domain shared by every seeded account.
pub const SEED_EMAIL_DOMAIN: &str = "example.com";

const SPECIALTIES: [&str; 4] = ["manual", "automatic", "motorway", "night driving"];

pub(crate) fn seed_email(first_name: &str, last_name: &str, index: usize) -> String {
    let local: String = format!("{}.{}", first_name, last_name)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
        .collect::<String>()
        .to_lowercase();
    format!("{}{}@{}", local, index, SEED_EMAIL_DOMAIN)
}

pub fn generate_instructors(count: usize) -> Vec<InstructorSeed> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let specialties = SPECIALTIES
                .iter()
                .skip(i % SPECIALTIES.len())
                .take(2)
                .map(|s| s.to_string())
                .collect();

            InstructorSeed {
                email: seed_email(&first_name, &last_name, i),
                first_name,
                last_name,
                phone: PhoneNumber().fake(),
                license_number: format!("INS-{:05}", (0..100_000).fake::<u32>()),
                specialties,
            }
        })
        .collect()
}

/// Inserts instructors and pairs each with one of `car_ids` round-robin.
pub async fn seed_instructors(
    db: &PgPool,
    count: usize,
    car_ids: &[Uuid],
    password_hash: &str,
) -> anyhow::Result<Vec<Uuid>> {
    let start_time = Instant::now();
    println!("🧑‍🏫 Seeding {} instructors...", count);

    let seeds = generate_instructors(count);
    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(seeds.len());

    for (i, seed) in seeds.iter().enumerate() {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO users (first_name, last_name, email, password, phone, role)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT (email) DO NOTHING
               RETURNING id"#,
        )
        .bind(&seed.first_name)
        .bind(&seed.last_name)
        .bind(&seed.email)
        .bind(password_hash)
        .bind(&seed.phone)
        .bind(UserRole::Instructor)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = user_id else {
            continue;
        };

        let instructor_id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO instructors (user_id, license_number, specialties)
               VALUES ($1, $2, $3)
               RETURNING id"#,
        )
        .bind(user_id)
        .bind(&seed.license_number)
        .bind(&seed.specialties)
        .fetch_one(&mut *tx)
        .await?;

        if !car_ids.is_empty() {
            sqlx::query(
                "INSERT INTO instructor_cars (instructor_id, car_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(instructor_id)
            .bind(car_ids[i % car_ids.len()])
            .execute(&mut *tx)
            .await?;
        }

        ids.push(instructor_id);
    }

    tx.commit().await?;

    println!("   ✓ Inserted {} instructors in {:?}", ids.len(), start_time.elapsed());
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_email_is_lowercase_ascii() {
        assert_eq!(seed_email("Zoë", "O'Neil", 3), "zo.oneil3@example.com");
        assert_eq!(seed_email("Ann", "Lee", 0), "ann.lee0@example.com");
    }

    #[test]
    fn test_generated_instructors_have_two_specialties() {
        let seeds = generate_instructors(6);
        assert_eq!(seeds.len(), 6);
        for seed in &seeds {
            assert!(!seed.specialties.is_empty());
            assert!(seed.email.ends_with(SEED_EMAIL_DOMAIN));
        }
    }
}
