use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use drivers_hub_cli::seeder::{self, SeedConfig, SeededRefs};
use drivers_hub_core::hash_password;
use drivers_hub_core::password::ensure_password_length;
use drivers_hub_models::UserRole;
use drivers_hub_models::auth::normalize_email;

#[derive(Parser)]
#[command(name = "drivers-hub-cli")]
#[command(about = "Drivers Hub CLI - Administrative tools for Drivers Hub", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an admin account
    CreateAdmin {
        /// First name of the admin
        #[arg(short = 'f', long)]
        first_name: Option<String>,

        /// Last name of the admin
        #[arg(short = 'l', long)]
        last_name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed packages, cars, instructors and candidates
    Seed {
        /// Number of cars to create
        #[arg(long, default_value = "5")]
        cars: usize,

        /// Number of instructors to create
        #[arg(long, default_value = "4")]
        instructors: usize,

        /// Number of candidates to create
        #[arg(long, default_value = "50")]
        candidates: usize,

        /// Password shared by the seeded instructor accounts
        #[arg(long, default_value = "password123")]
        password: String,
    },
    /// Seed only the package catalogue
    SeedPackages,
    /// Seed only cars
    SeedCars {
        #[arg(short = 'c', long, default_value = "5")]
        cars: usize,
    },
    /// Seed candidates linked to existing packages, instructors and cars
    SeedCandidates {
        #[arg(short = 'c', long, default_value = "50")]
        candidates: usize,
    },
    /// Clear all seeded data (keeps admins and real records)
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let pool = match connect().await {
        Ok(pool) => pool,
        Err(e) => fail("Error connecting to database", e),
    };

    match cli.command {
        Commands::CreateAdmin {
            first_name,
            last_name,
            email,
            password,
        } => handle_create_admin(&pool, first_name, last_name, email, password).await,
        Commands::Seed {
            cars,
            instructors,
            candidates,
            password,
        } => {
            let config = SeedConfig {
                cars,
                instructors,
                candidates,
            };
            if let Err(e) = seeder::seed_all(&pool, &config, &password).await {
                fail("Error seeding database", e);
            }
        }
        Commands::SeedPackages => match seeder::seed_packages(&pool).await {
            Ok(ids) => println!("✅ {} packages ready", ids.len()),
            Err(e) => fail("Error seeding packages", e),
        },
        Commands::SeedCars { cars } => match seeder::seed_cars(&pool, cars).await {
            Ok(ids) => println!("✅ Created {} cars", ids.len()),
            Err(e) => fail("Error seeding cars", e),
        },
        Commands::SeedCandidates { candidates } => {
            handle_seed_candidates(&pool, candidates).await
        }
        Commands::ClearSeed => match seeder::clear_seed(&pool).await {
            Ok(counts) => {
                println!("✅ Cleared seeded data");
                println!("   Candidates: {}", counts.candidates);
                println!("   Instructors: {}", counts.instructors);
                println!("   Cars: {}", counts.cars);
                println!("   Packages: {}", counts.packages);
            }
            Err(e) => fail("Error clearing seeded data", e),
        },
    }
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    Ok(pool)
}

fn fail(context: &str, error: anyhow::Error) -> ! {
    eprintln!("\n❌ {}: {}", context, error);
    std::process::exit(1);
}

fn prompt(label: &str, value: Option<String>) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Ok(Input::new().with_prompt(label).interact_text()?),
    }
}

async fn handle_create_admin(
    pool: &PgPool,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) {
    let collected = (|| -> anyhow::Result<_> {
        let first_name = prompt("First name", first_name)?;
        let last_name = prompt("Last name", last_name)?;
        let email = prompt("Email address", email)?;
        let password = match password {
            Some(password) => password,
            None => Password::new()
                .with_prompt("Password")
                .with_confirmation("Confirm password", "Passwords don't match")
                .interact()?,
        };
        Ok((first_name, last_name, email, password))
    })();

    let (first_name, last_name, email, password) = match collected {
        Ok(values) => values,
        Err(e) => fail("Error reading input", e),
    };

    match create_admin(pool, &first_name, &last_name, &email, &password).await {
        Ok(email) => {
            println!("\n✅ Admin created successfully!");
            println!("   Email: {}", email);
            println!("   Name: {} {}", first_name, last_name);
        }
        Err(e) => fail("Error creating admin", e),
    }
}

async fn create_admin(
    db: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<String> {
    let email = normalize_email(email);
    if !email.contains('@') {
        anyhow::bail!("'{}' is not a valid email address", email);
    }
    ensure_password_length(password).map_err(|e| e.error)?;
    let hashed_password = hash_password(password).map_err(|e| e.error)?;

    let user_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (first_name, last_name, email, password, role)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(first_name.trim())
    .bind(last_name.trim())
    .bind(&email)
    .bind(&hashed_password)
    .bind(UserRole::Admin)
    .fetch_optional(db)
    .await?;

    match user_id {
        Some(_) => Ok(email),
        None => anyhow::bail!("User with this email already exists"),
    }
}

async fn handle_seed_candidates(pool: &PgPool, candidates: usize) {
    let refs = match load_refs(pool).await {
        Ok(refs) => refs,
        Err(e) => fail("Error loading existing records", e),
    };

    if refs.package_ids.is_empty() && refs.instructor_ids.is_empty() {
        eprintln!("⚠️  No packages or instructors found, candidates will be unassigned.");
    }

    match seeder::seed_candidates(pool, candidates, &refs).await {
        Ok(count) => println!("✅ Created {} candidates", count),
        Err(e) => fail("Error seeding candidates", e),
    }
}

async fn load_refs(pool: &PgPool) -> anyhow::Result<SeededRefs> {
    let package_ids = sqlx::query_scalar("SELECT id FROM packages ORDER BY name")
        .fetch_all(pool)
        .await?;
    let car_ids = sqlx::query_scalar("SELECT id FROM cars WHERE status = 'active'")
        .fetch_all(pool)
        .await?;
    let instructor_ids = sqlx::query_scalar("SELECT id FROM instructors WHERE status = 'active'")
        .fetch_all(pool)
        .await?;

    Ok(SeededRefs {
        package_ids,
        car_ids,
        instructor_ids,
    })
}
