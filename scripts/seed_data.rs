//! Seeds a job-board store with a demo admin, a demo applicant and a few jobs.
//!
//! Run: JWT_SECRET=... cargo run --bin seed_data
//! Uses the same `DATABASE_PATH` as the server, so run it while the server
//! is stopped (Sled holds an exclusive lock on the directory).

use jobboard::models::{Role, User};
use jobboard::service::{JobRequest, SignupRequest};
use jobboard::{ApiError, AppState, Config, Storage};

fn account(state: &AppState, name: &str, email: &str, password: &str, role: Role) -> Result<User, ApiError> {
    let req = SignupRequest {
        name: Some(name.to_string()),
        email: Some(email.to_string()),
        password: Some(password.to_string()),
        role: Some(role.to_string()),
    };
    match state.accounts.signup(req) {
        Ok(user) => {
            println!("created {} ({})", email, role);
            Ok(user)
        }
        // Already seeded
        Err(ApiError::Conflict(_)) => {
            println!("{} already exists, reusing it", email);
            state
                .storage
                .find_user_by_email(email)?
                .ok_or_else(|| ApiError::not_found("User not found"))
        }
        Err(e) => Err(e),
    }
}

fn job(title: &str, description: &str, company: &str, location: &str) -> JobRequest {
    JobRequest {
        title: Some(title.to_string()),
        description: Some(description.to_string()),
        company: Some(company.to_string()),
        location: Some(location.to_string()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    let storage = Storage::open(&config.database_path)?;
    let state = AppState::new(config, storage.clone())?;

    let admin = account(&state, "Demo Admin", "admin@example.com", "admin123", Role::Admin)?;
    account(&state, "Demo User", "user@example.com", "user123", Role::User)?;

    let already_posted = storage
        .list_jobs()?
        .iter()
        .any(|job| job.is_owned_by(&admin.id));
    if already_posted {
        println!("demo jobs already present, skipping");
    } else {
        let jobs = [
            job(
                "Backend Engineer",
                "Build and run the services behind our marketplace.",
                "Acme",
                "Remote",
            ),
            job(
                "Frontend Developer",
                "Own the candidate-facing web app.",
                "Globex",
                "Berlin",
            ),
            job(
                "Data Analyst",
                "Turn hiring funnel data into weekly reports.",
                "Initech",
                "Austin",
            ),
        ];
        for req in jobs {
            let created = state.jobs.create_job(&admin, req)?;
            println!("posted job {} ({})", created.title, created.id);
        }
    }

    let flushed = storage.flush()?;
    println!("seed complete, {} bytes flushed", flushed);
    Ok(())
}
