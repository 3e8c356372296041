//! Carlot CLI - schema setup, the user/car walkthrough and record commands.
//!
//! # Usage
//!
//! ```bash
//! # Create tables and indexes
//! carlot migrate
//!
//! # Create two cars and their owner, then query them back
//! carlot demo --seed
//!
//! # Query an existing user's cars and their owners
//! carlot demo --name a8m --model Ford
//!
//! # Record commands
//! carlot user create --name a8m --age 30
//! carlot user show a8m
//! carlot car create Tesla --owner 1
//! carlot car list --owner 1 --model Tesla
//! carlot car owner 1
//! carlot car assign 2 1
//! ```
//!
//! # Commands
//!
//! - `migrate` - Create missing tables and indexes
//! - `demo` - Run the user/car walkthrough
//! - `user` - Create, show, count and list users
//! - `car` - Create, list, assign cars and look up their owners
//!
//! The database comes from `--database-url`, `CARLOT_DATABASE_URL`,
//! `DATABASE_URL`, or `CARLOT_DB_DRIVER` + `CARLOT_DB_DSN`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carlot_core::{Age, CarId, UserId};

mod commands;

use commands::{CliError, Output};

#[derive(Parser)]
#[command(name = "carlot")]
#[command(author, version, about = "Users, cars and who owns what")]
struct Cli {
    /// Database URL (`mysql://...`, `sqlite://...`, `sqlite::memory:`)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing tables and indexes
    Migrate,
    /// Run the user/car walkthrough
    Demo {
        /// Create a Tesla, a Ford and a user owning both first
        #[arg(long)]
        seed: bool,

        /// User to create or look up
        #[arg(short, long, default_value = "a8m")]
        name: String,

        /// Age of the seeded user
        #[arg(short, long, default_value = "30")]
        age: Age,

        /// Car model to pick out of the user's cars
        #[arg(short, long, default_value = "Ford", conflicts_with = "all")]
        model: String,

        /// List the user's cars without picking one
        #[arg(long)]
        all: bool,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage cars
    Car {
        #[command(subcommand)]
        action: CarAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a user, optionally taking ownership of unowned cars
    Create {
        /// Display name (defaults to "unknown")
        #[arg(short, long)]
        name: Option<String>,

        /// Age in years
        #[arg(short, long)]
        age: Age,

        /// Car to link to the new user (repeatable)
        #[arg(short, long = "car")]
        cars: Vec<CarId>,
    },
    /// Show the one user with this name
    Show {
        /// Name to look up
        name: String,
    },
    /// Count users with this name
    Count {
        /// Name to count
        name: String,
    },
    /// List users
    List {
        /// Only users with this name
        #[arg(short, long)]
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum CarAction {
    /// Register a car
    Create {
        /// Model name
        model: String,

        /// Registration time (RFC 3339), defaults to now
        #[arg(long)]
        registered_at: Option<DateTime<Utc>>,

        /// Owning user
        #[arg(short, long)]
        owner: Option<UserId>,
    },
    /// List cars
    List {
        /// Only cars of this user
        #[arg(short, long)]
        owner: Option<UserId>,

        /// Pick the one car of the owner with this model
        #[arg(short, long, requires = "owner")]
        model: Option<String>,
    },
    /// Show the owner of a car
    Owner {
        /// Car to look up
        car: CarId,
    },
    /// Link an unowned car to a user
    Assign {
        /// Car to link
        car: CarId,

        /// New owner
        owner: UserId,
    },
}

/// Initialize tracing, JSON when `CARLOT_LOG_FORMAT=json`.
fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "carlot_cli=info,carlot_store=info".into());

    let is_json = std::env::var("CARLOT_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let url = cli.database_url.as_deref();
    let output = Output::new(cli.json);

    match cli.command {
        Commands::Migrate => commands::migrate::run(url).await?,
        Commands::Demo {
            seed,
            name,
            age,
            model,
            all,
        } => {
            let model = (!all).then_some(model);
            commands::demo::run(url, name, age, seed, model).await?;
        }
        Commands::User { action } => match action {
            UserAction::Create { name, age, cars } => {
                commands::user::create(url, output, name, age, cars).await?;
            }
            UserAction::Show { name } => commands::user::show(url, output, &name).await?,
            UserAction::Count { name } => commands::user::count(url, output, &name).await?,
            UserAction::List { name } => {
                commands::user::list(url, output, name.as_deref()).await?;
            }
        },
        Commands::Car { action } => match action {
            CarAction::Create {
                model,
                registered_at,
                owner,
            } => commands::car::create(url, output, model, registered_at, owner).await?,
            CarAction::List { owner, model } => {
                commands::car::list(url, output, owner, model.as_deref()).await?;
            }
            CarAction::Owner { car } => commands::car::owner(url, output, car).await?,
            CarAction::Assign { car, owner } => {
                commands::car::assign(url, output, car, owner).await?;
            }
        },
    }
    Ok(())
}
