//! Seed records and the knobs that control how many are generated.

use chrono::NaiveDate;
use uuid::Uuid;

/// Seed data for a lesson package.
pub struct PackageSeed {
    pub name: &'static str,
    pub description: &'static str,
    pub price: f64,
    pub hours: i32,
}

/// Seed data for a school car.
pub struct CarSeed {
    pub model: String,
    pub license_plate: String,
    pub year: i32,
    pub transmission: &'static str,
}

/// Seed data for an instructor and the user account behind it.
pub struct InstructorSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub license_number: String,
    pub specialties: Vec<String>,
}

/// Seed data for a candidate. The client number is reserved at insert time.
pub struct CandidateSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub package_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub car_id: Option<Uuid>,
}

/// How much demo data a full seed run creates.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub cars: usize,
    pub instructors: usize,
    pub candidates: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            cars: 5,
            instructors: 4,
            candidates: 50,
        }
    }
}

/// Ids produced by the earlier seeding steps, used to link candidates.
#[derive(Debug, Default)]
pub struct SeededRefs {
    pub package_ids: Vec<Uuid>,
    pub car_ids: Vec<Uuid>,
    pub instructor_ids: Vec<Uuid>,
}
