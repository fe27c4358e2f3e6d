//! Packages and cars.

use std::time::Instant;

use fake::Fake;
use rayon::prelude::*;
use sqlx::PgPool;
use uuid::Uuid;

use drivers_hub_models::cars::normalize_license_plate;

use super::models::{CarSeed, PackageSeed};

/// Plate prefix that marks a car as demo data.
pub const DEMO_PLATE_PREFIX: &str = "DEMO-";

const CAR_MODELS: [&str; 6] = [
    "Toyota Corolla",
    "Volkswagen Golf",
    "Ford Focus",
    "Skoda Octavia",
    "Renault Clio",
    "Peugeot 208",
];

pub const DEMO_PACKAGES: [PackageSeed; 4] = [
    PackageSeed {
        name: "Starter",
        description: "Ten lessons for complete beginners",
        price: 450.0,
        hours: 10,
    },
    PackageSeed {
        name: "Standard",
        description: "Twenty lessons including test preparation",
        price: 850.0,
        hours: 20,
    },
    PackageSeed {
        name: "Intensive",
        description: "Thirty lessons over four weeks",
        price: 1200.0,
        hours: 30,
    },
    PackageSeed {
        name: "Refresher",
        description: "Five lessons for licensed drivers",
        price: 240.0,
        hours: 5,
    },
];

pub fn generate_cars(count: usize) -> Vec<CarSeed> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let model = CAR_MODELS[(0..CAR_MODELS.len()).fake::<usize>()];
            let suffix: u32 = (100..1000).fake();
            CarSeed {
                model: model.to_string(),
                license_plate: normalize_license_plate(&format!(
                    "{}{:03}-{}",
                    DEMO_PLATE_PREFIX, i, suffix
                )),
                year: (2015..2025).fake(),
                transmission: if i % 3 == 0 { "automatic" } else { "manual" },
            }
        })
        .collect()
}

/// Inserts the demo catalogue. Packages that already exist are left alone and
/// their ids are still returned.
pub async fn seed_packages(db: &PgPool) -> anyhow::Result<Vec<Uuid>> {
    let start_time = Instant::now();
    println!("📦 Seeding {} packages...", DEMO_PACKAGES.len());

    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(DEMO_PACKAGES.len());

    for package in &DEMO_PACKAGES {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO packages (name, description, price, hours)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (name) DO UPDATE SET updated_at = packages.updated_at
               RETURNING id"#,
        )
        .bind(package.name)
        .bind(package.description)
        .bind(package.price)
        .bind(package.hours)
        .fetch_one(&mut *tx)
        .await?;
        ids.push(id);
    }

    tx.commit().await?;

    println!("   ✓ {} packages ready in {:?}", ids.len(), start_time.elapsed());
    Ok(ids)
}

pub async fn seed_cars(db: &PgPool, count: usize) -> anyhow::Result<Vec<Uuid>> {
    let start_time = Instant::now();
    println!("🚗 Seeding {} cars...", count);

    let cars = generate_cars(count);
    if cars.is_empty() {
        return Ok(Vec::new());
    }

    let mut query =
        String::from("INSERT INTO cars (model, license_plate, year, transmission) VALUES ");
    for i in 0..cars.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 4;
        query.push_str(&format!("(${}, ${}, ${}, ${})", p + 1, p + 2, p + 3, p + 4));
    }
    query.push_str(" ON CONFLICT (license_plate) DO NOTHING RETURNING id");

    let mut q = sqlx::query_scalar::<_, Uuid>(&query);
    for car in &cars {
        q = q
            .bind(&car.model)
            .bind(&car.license_plate)
            .bind(car.year)
            .bind(car.transmission);
    }
    let ids = q.fetch_all(db).await?;

    println!("   ✓ Inserted {} cars in {:?}", ids.len(), start_time.elapsed());
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_cars_carry_demo_plates() {
        let cars = generate_cars(12);
        assert_eq!(cars.len(), 12);
        for car in &cars {
            assert!(car.license_plate.starts_with(DEMO_PLATE_PREFIX));
            assert!((2015..2025).contains(&car.year));
        }
    }

    #[test]
    fn test_demo_packages_have_unique_names() {
        let mut names: Vec<_> = DEMO_PACKAGES.iter().map(|p| p.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), DEMO_PACKAGES.len());
    }
}
