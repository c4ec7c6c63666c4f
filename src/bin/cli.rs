use clap::{Parser, Subcommand};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::fs;

const TOKEN_FILE: &str = ".jobboard_token";

#[derive(Parser)]
#[command(name = "jobboard-cli")]
#[command(about = "CLI for the job board API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,
}

#[derive(Subcommand)]
enum Commands {
    Signup {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// `user` or `admin`
        #[arg(short, long, default_value = "user")]
        role: String,
    },
    Signin {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    CreateJob {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        description: String,
        #[arg(short, long)]
        company: String,
        #[arg(short, long)]
        location: String,
    },
    ListJobs,
    GetJob {
        #[arg(short, long)]
        id: String,
    },
    Apply {
        #[arg(short, long)]
        job_id: String,
    },
    Applicants {
        #[arg(short, long)]
        job_id: String,
    },
    UpdateJob {
        #[arg(short, long)]
        job_id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        company: Option<String>,
        #[arg(short, long)]
        location: Option<String>,
    },
    DeleteJob {
        #[arg(short, long)]
        id: String,
    },
    AppliedJobs,
    SetStatus {
        #[arg(short, long)]
        job_id: String,
        #[arg(short, long)]
        applicant_id: String,
        /// `pending`, `approved` or `rejected`
        #[arg(short, long)]
        status: String,
    },
    UpdateProfile {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
    },
    Profile,
    Logout,
}

#[derive(Deserialize)]
struct SigninResponse {
    token: String,
}

/// Attach the saved token, if any. Requests without one get the server's 401.
fn authorized(builder: RequestBuilder) -> RequestBuilder {
    match fs::read_to_string(TOKEN_FILE) {
        Ok(token) => builder.bearer_auth(token.trim()),
        Err(_) => builder,
    }
}

/// JSON object holding only the fields that were given.
fn present(fields: &[(&str, Option<String>)]) -> Value {
    let map: Map<String, Value> = fields
        .iter()
        .filter_map(|(key, value)| value.clone().map(|v| (key.to_string(), Value::String(v))))
        .collect();
    Value::Object(map)
}

async fn print_response(builder: RequestBuilder) -> Result<(), reqwest::Error> {
    let res = builder.send().await?;
    let status = res.status();
    println!("{} {}", status.as_u16(), res.text().await?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = Client::new();
    let url = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Signup { name, email, password, role } => {
            let body = json!({ "name": name, "email": email, "password": password, "role": role });
            print_response(client.post(format!("{url}/signup")).json(&body)).await?;
        }
        Commands::Signin { email, password } => {
            let res = client
                .post(format!("{url}/signin"))
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await?;
            if res.status().is_success() {
                let body: SigninResponse = res.json().await?;
                fs::write(TOKEN_FILE, body.token)?;
                println!("Signed in. Token saved to {TOKEN_FILE}");
            } else {
                println!("Signin failed: {}", res.text().await?);
            }
        }
        Commands::CreateJob { title, description, company, location } => {
            let body = json!({
                "title": title,
                "description": description,
                "company": company,
                "location": location,
            });
            print_response(authorized(client.post(format!("{url}/create"))).json(&body)).await?;
        }
        Commands::ListJobs => {
            print_response(client.get(format!("{url}/all"))).await?;
        }
        Commands::GetJob { id } => {
            print_response(client.get(format!("{url}/{id}"))).await?;
        }
        Commands::Apply { job_id } => {
            print_response(authorized(client.post(format!("{url}/apply/{job_id}")))).await?;
        }
        Commands::Applicants { job_id } => {
            print_response(authorized(client.get(format!("{url}/job-applicants/{job_id}")))).await?;
        }
        Commands::UpdateJob { job_id, title, description, company, location } => {
            let body = present(&[
                ("title", title),
                ("description", description),
                ("company", company),
                ("location", location),
            ]);
            print_response(authorized(client.put(format!("{url}/update-job/{job_id}"))).json(&body))
                .await?;
        }
        Commands::DeleteJob { id } => {
            print_response(authorized(client.delete(format!("{url}/delete/{id}")))).await?;
        }
        Commands::AppliedJobs => {
            print_response(authorized(client.get(format!("{url}/user/applied-jobs")))).await?;
        }
        Commands::SetStatus { job_id, applicant_id, status } => {
            let endpoint = format!("{url}/admin/job-applicant-status/{job_id}/{applicant_id}");
            print_response(authorized(client.put(endpoint)).json(&json!({ "status": status }))).await?;
        }
        Commands::UpdateProfile { name, email, password } => {
            let body = present(&[("name", name), ("email", email), ("password", password)]);
            print_response(authorized(client.post(format!("{url}/update-profile"))).json(&body))
                .await?;
        }
        Commands::Profile => {
            print_response(authorized(client.get(format!("{url}/user/profile")))).await?;
        }
        Commands::Logout => {
            let _ = fs::remove_file(TOKEN_FILE);
            println!("Signed out (token removed).");
        }
    }

    Ok(())
}
