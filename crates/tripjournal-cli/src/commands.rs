use std::future::Future;
use std::io::{self, BufRead};
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::warn;
use tripjournal_core::api::ApiError;
use tripjournal_core::auth::CredentialStore;
use tripjournal_core::models::{
    EventCreate, EventUpdate, Location, MediaCreate, ResourceId, TripCreate, TripUpdate,
};
use tripjournal_core::{Config, JournalClient, Token};

use crate::format::{parse_date, trip_detail, trip_row};
use crate::{AuthArgs, Command, EventCommand, EventFields, MediaCommand, TripCommand, TripFields};

pub async fn run(client: &JournalClient, config: &mut Config, command: Command) -> Result<()> {
    match command {
        Command::Register(args) => {
            let password = read_password(&args)?;
            let token = client.register(&args.username, &password).await?;
            remember_session(config, &args.username, &token)?;
            println!("Registered and logged in as {}", args.username);
        }
        Command::Login(args) => {
            let password = read_password(&args)?;
            let token = client.login(&args.username, &password).await?;
            remember_session(config, &args.username, &token)?;
            println!("Logged in as {}", args.username);
        }
        Command::Logout => {
            client.logout();
            forget_session(config, &Config::config_path()?)?;
            println!("Logged out");
        }
        Command::Status => match (&config.last_username, client.is_authenticated()) {
            (Some(username), true) => println!("Logged in as {} at {}", username, client.base_url()),
            _ => println!("Not logged in ({})", client.base_url()),
        },
        Command::Trips(command) => run_trips(client, command).await?,
        Command::Events(command) => run_events(client, command).await?,
        Command::Media(command) => run_media(client, command).await?,
    }
    Ok(())
}

async fn run_trips(client: &JournalClient, command: TripCommand) -> Result<()> {
    match command {
        TripCommand::List => {
            let trips = client.list_trips().await?;
            if trips.is_empty() {
                println!("No trips yet");
            }
            for trip in &trips {
                println!("{}", trip_row(trip));
            }
        }
        TripCommand::Show { id } => {
            let trip = client.get_trip(&id).await?;
            print!("{}", trip_detail(&trip));
        }
        TripCommand::Create(fields) => {
            let trip = client.create_trip(&trip_fields(fields)?).await?;
            println!("Created trip {}", trip.id);
        }
        TripCommand::Update { id, fields } => {
            let TripCreate {
                name,
                start_date,
                end_date,
            } = trip_fields(fields)?;
            let update = TripUpdate {
                name,
                start_date,
                end_date,
            };
            let trip = client.update_trip(&id, &update).await?;
            println!("Updated trip {}", trip.id);
        }
        TripCommand::Delete { ids } => {
            delete_all("trip", &ids, |id| client.delete_trip(id)).await?;
        }
    }
    Ok(())
}

async fn run_events(client: &JournalClient, command: EventCommand) -> Result<()> {
    match command {
        EventCommand::Create { trip, fields } => {
            let update = event_fields(fields)?;
            let event = client
                .create_event(&EventCreate {
                    trip_id: trip,
                    name: update.name,
                    note: update.note,
                    date: update.date,
                    location: update.location,
                    transition_from_previous: update.transition_from_previous,
                })
                .await?;
            println!("Created event {}", event.id);
        }
        EventCommand::Update { id, fields } => {
            let event = client.update_event(&id, &event_fields(fields)?).await?;
            println!("Updated event {}", event.id);
        }
        EventCommand::Delete { ids } => {
            delete_all("event", &ids, |id| client.delete_event(id)).await?;
        }
    }
    Ok(())
}

async fn run_media(client: &JournalClient, command: MediaCommand) -> Result<()> {
    match command {
        MediaCommand::Add { event, file } => {
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let media = client
                .create_media(&MediaCreate {
                    event_id: event,
                    base64_data: data,
                })
                .await?;
            match media.url {
                Some(url) => println!("Uploaded media {} ({})", media.id, url),
                None => println!("Uploaded media {}", media.id),
            }
        }
        MediaCommand::Delete { ids } => {
            delete_all("media", &ids, |id| client.delete_media(id)).await?;
        }
    }
    Ok(())
}

/// Issue all deletes concurrently and report each outcome
async fn delete_all<'a, F, Fut>(kind: &str, ids: &'a [ResourceId], delete: F) -> Result<()>
where
    F: Fn(&'a ResourceId) -> Fut,
    Fut: Future<Output = Result<(), ApiError>>,
{
    let results = futures::future::join_all(ids.iter().map(&delete)).await;

    let mut failures = 0;
    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(()) => println!("Deleted {} {}", kind, id),
            Err(e) => {
                warn!(id = %id, error = %e, "Delete failed");
                eprintln!("Failed to delete {} {}: {}", kind, id, e);
                failures += 1;
            }
        }
    }
    if failures > 0 {
        bail!("{} of {} deletes failed", failures, ids.len());
    }
    Ok(())
}

fn remember_session(config: &mut Config, username: &str, token: &Token) -> Result<()> {
    config.last_username = Some(username.to_string());
    config.save()?;
    if let Err(e) = CredentialStore::store(username, token) {
        // The session still works for this run; it just won't be resumed later
        warn!(error = %e, "Could not persist session");
    }
    Ok(())
}

/// Saves the config without the username before deleting the keychain entry,
/// so a failed delete cannot resume the session on the next run.
fn forget_session(config: &mut Config, config_path: &Path) -> Result<()> {
    let Some(username) = config.last_username.take() else {
        return Ok(());
    };
    config.save_to(config_path)?;
    if let Err(e) = CredentialStore::delete(&username) {
        warn!(error = %e, "Could not remove stored session");
        eprintln!("Warning: could not remove the stored token from the keychain: {e:#}");
    }
    Ok(())
}

fn read_password(args: &AuthArgs) -> Result<String> {
    if args.password_stdin {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read password from stdin")?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }
    rpassword::prompt_password(format!("Password for {}: ", args.username))
        .context("Failed to read password")
}

fn trip_fields(fields: TripFields) -> Result<TripCreate> {
    let start_date = parse_date(&fields.start)?;
    let end_date = parse_date(&fields.end)?;
    if end_date < start_date {
        bail!("Trip cannot end before it starts");
    }
    Ok(TripCreate {
        name: fields.name,
        start_date,
        end_date,
    })
}

fn event_fields(fields: EventFields) -> Result<EventUpdate> {
    let location = match (fields.latitude, fields.longitude) {
        (Some(latitude), Some(longitude)) => Some(Location {
            latitude,
            longitude,
            address: fields.address,
        }),
        _ => None,
    };
    Ok(EventUpdate {
        name: fields.name,
        note: fields.note,
        date: parse_date(&fields.date)?,
        location,
        transition_from_previous: fields.transition,
    })
}
