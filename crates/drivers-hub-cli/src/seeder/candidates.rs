//! Candidates with reserved client numbers.

use std::time::Instant;

use chrono::{Duration, Utc};
use fake::Fake;
use fake::faker::address::en::{BuildingNumber, CityName, StreetName};
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use drivers_hub_models::candidates::{CLIENT_NUMBER_COUNTER, format_client_number};

use super::instructors::seed_email;
use super::models::{CandidateSeed, SeededRefs};

// 10 params per candidate
const BATCH_SIZE: usize = 500;

fn pick(ids: &[Uuid]) -> Option<Uuid> {
    if ids.is_empty() {
        None
    } else {
        Some(ids[(0..ids.len()).fake::<usize>()])
    }
}

pub fn generate_candidates(count: usize, refs: &SeededRefs) -> Vec<CandidateSeed> {
    let today = Utc::now().date_naive();

    (0..count)
        .into_par_iter()
        .map(|i| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let age_days: i64 = (17 * 365..60 * 365).fake();
            let building: String = BuildingNumber().fake();
            let street: String = StreetName().fake();
            let city: String = CityName().fake();

            CandidateSeed {
                email: seed_email(&first_name, &last_name, i),
                first_name,
                last_name,
                phone: PhoneNumber().fake(),
                address: format!("{} {}, {}", building, street, city),
                date_of_birth: today - Duration::days(age_days),
                package_id: pick(&refs.package_ids),
                instructor_id: pick(&refs.instructor_ids),
                car_id: pick(&refs.car_ids),
            }
        })
        .collect()
}

/// Reserves `count` consecutive sequence values and returns the first one.
async fn reserve_client_numbers(
    tx: &mut Transaction<'_, Postgres>,
    count: usize,
) -> anyhow::Result<i64> {
    let count = i64::try_from(count)?;
    let last = sqlx::query_scalar::<_, i64>(
        r#"INSERT INTO counters (name, value) VALUES ($1, $2)
           ON CONFLICT (name) DO UPDATE SET value = counters.value + $2
           RETURNING value"#,
    )
    .bind(CLIENT_NUMBER_COUNTER)
    .bind(count)
    .fetch_one(&mut **tx)
    .await?;
    Ok(last - count + 1)
}

async fn insert_candidates_chunk(
    tx: &mut Transaction<'_, Postgres>,
    candidates: &[CandidateSeed],
    first_sequence: i64,
) -> anyhow::Result<u64> {
    let mut query = String::from(
        "INSERT INTO candidates (unique_client_number, first_name, last_name, email, phone, address, date_of_birth, package_id, instructor_id, car_id) VALUES ",
    );

    for i in 0..candidates.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 10;
        let placeholders: Vec<String> = (1..=10).map(|n| format!("${}", p + n)).collect();
        query.push_str(&format!("({})", placeholders.join(", ")));
    }
    query.push_str(" ON CONFLICT (unique_client_number) DO NOTHING");

    let mut q = sqlx::query(&query);
    for (offset, candidate) in (0_i64..).zip(candidates) {
        q = q
            .bind(format_client_number(first_sequence + offset))
            .bind(&candidate.first_name)
            .bind(&candidate.last_name)
            .bind(&candidate.email)
            .bind(&candidate.phone)
            .bind(&candidate.address)
            .bind(candidate.date_of_birth)
            .bind(candidate.package_id)
            .bind(candidate.instructor_id)
            .bind(candidate.car_id);
    }

    Ok(q.execute(&mut **tx).await?.rows_affected())
}

pub async fn seed_candidates(
    db: &PgPool,
    count: usize,
    refs: &SeededRefs,
) -> anyhow::Result<u64> {
    let start_time = Instant::now();
    println!("🎓 Seeding {} candidates...", count);

    let candidates = generate_candidates(count, refs);
    if candidates.is_empty() {
        return Ok(0);
    }

    let mut tx = db.begin().await?;
    let mut sequence = reserve_client_numbers(&mut tx, candidates.len()).await?;
    let mut inserted = 0;

    for chunk in candidates.chunks(BATCH_SIZE) {
        inserted += insert_candidates_chunk(&mut tx, chunk, sequence).await?;
        sequence += i64::try_from(chunk.len())?;
    }

    tx.commit().await?;

    println!("   ✓ Inserted {} candidates in {:?}", inserted, start_time.elapsed());
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_link_only_known_refs() {
        let refs = SeededRefs {
            package_ids: vec![Uuid::new_v4()],
            car_ids: vec![],
            instructor_ids: vec![Uuid::new_v4(), Uuid::new_v4()],
        };
        let seeds = generate_candidates(20, &refs);

        assert_eq!(seeds.len(), 20);
        for seed in &seeds {
            assert_eq!(seed.package_id, Some(refs.package_ids[0]));
            assert!(seed.car_id.is_none());
            assert!(refs.instructor_ids.contains(&seed.instructor_id.unwrap()));
        }
    }

    #[test]
    fn test_candidates_are_of_driving_age() {
        let today = Utc::now().date_naive();
        for seed in generate_candidates(10, &SeededRefs::default()) {
            let age_days = (today - seed.date_of_birth).num_days();
            assert!(age_days >= 17 * 365);
        }
    }
}
