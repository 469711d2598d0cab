//! Trip Journal CLI - a command line front end for the Trip Journal service.
//!
//! Every subcommand maps onto one `JournalClient` operation. The session
//! token is kept in the OS keychain between runs.

mod commands;
mod format;

use std::io;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tripjournal_core::auth::CredentialStore;
use tripjournal_core::models::ResourceId;
use tripjournal_core::{Config, JournalClient};

#[derive(Parser, Debug)]
#[command(name = "tripjournal", version, about = "Keep a journal of your trips")]
struct Cli {
    /// Service base URL (overrides TRIPJOURNAL_BASE_URL and the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and log in
    Register(AuthArgs),
    /// Log in with an existing account
    Login(AuthArgs),
    /// Forget the stored session
    Logout,
    /// Show whether a session is active
    Status,
    /// Manage trips
    #[command(subcommand)]
    Trips(TripCommand),
    /// Manage events within a trip
    #[command(subcommand)]
    Events(EventCommand),
    /// Manage photos attached to events
    #[command(subcommand)]
    Media(MediaCommand),
}

#[derive(Args, Debug)]
struct AuthArgs {
    username: String,
    /// Read the password from the first line of stdin instead of prompting
    #[arg(long)]
    password_stdin: bool,
}

#[derive(Subcommand, Debug)]
enum TripCommand {
    List,
    Show { id: ResourceId },
    Create(TripFields),
    Update {
        id: ResourceId,
        #[command(flatten)]
        fields: TripFields,
    },
    Delete {
        #[arg(required = true)]
        ids: Vec<ResourceId>,
    },
}

#[derive(Args, Debug)]
struct TripFields {
    #[arg(long)]
    name: String,
    /// Start date, YYYY-MM-DD or RFC 3339
    #[arg(long)]
    start: String,
    /// End date, YYYY-MM-DD or RFC 3339
    #[arg(long)]
    end: String,
}

#[derive(Subcommand, Debug)]
enum EventCommand {
    Create {
        #[arg(long)]
        trip: ResourceId,
        #[command(flatten)]
        fields: EventFields,
    },
    Update {
        id: ResourceId,
        #[command(flatten)]
        fields: EventFields,
    },
    Delete {
        #[arg(required = true)]
        ids: Vec<ResourceId>,
    },
}

#[derive(Args, Debug)]
struct EventFields {
    #[arg(long)]
    name: String,
    /// Date and time, YYYY-MM-DD or RFC 3339
    #[arg(long)]
    date: String,
    #[arg(long)]
    note: Option<String>,
    #[arg(long, requires = "longitude")]
    latitude: Option<f64>,
    #[arg(long, requires = "latitude")]
    longitude: Option<f64>,
    #[arg(long, requires = "latitude")]
    address: Option<String>,
    /// How you got here from the previous event
    #[arg(long)]
    transition: Option<String>,
}

#[derive(Subcommand, Debug)]
enum MediaCommand {
    /// Upload a file and attach it to an event
    Add {
        #[arg(long)]
        event: ResourceId,
        file: std::path::PathBuf,
    },
    Delete {
        #[arg(required = true)]
        ids: Vec<ResourceId>,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::load()?;
    let base_url = config.base_url(cli.base_url.as_deref());
    info!(base_url = %base_url, "Trip Journal CLI starting");

    let client = JournalClient::new(&base_url)?;
    if let Some(username) = config.last_username.as_deref() {
        match CredentialStore::load(username) {
            Ok(Some(token)) => client.resume(token),
            Ok(None) => debug!(username, "No stored session"),
            Err(e) => debug!(error = %e, "Could not read stored session"),
        }
    }

    let result = commands::run(&client, &mut config, cli.command).await;
    if let Err(e) = &result {
        if e.downcast_ref::<tripjournal_core::ApiError>()
            .is_some_and(|e| e.is_unauthorized())
        {
            eprintln!("Session rejected by the service - run `tripjournal login <username>` again.");
        }
    }
    result
}
