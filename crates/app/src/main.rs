use std::io::Write as _;
use std::time::Duration;

use anyhow::{anyhow, bail};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use dinner_client::{
    ApiError, ApiResult, BookingForm, BookingsPage, DashboardPage, ReservationClient, Session,
    SubmitError, TokenStore,
};
use dinner_config::Config;
use dinner_models::{ReservationForm, ReservationId, StatusUpdate, ValidationErrors};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::OffsetTime;

mod render;
mod shell;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const GIT_HASH: &str = env!("DINNER_GIT_HASH");

fn version_string() -> String {
    format!("{VERSION} ({GIT_HASH})")
}

// --- CLI definition ---

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Parser)]
#[command(name = "dinner")]
#[command(about = "Dinner reservations: book a table, manage your bookings, run the staff dashboard")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("DINNER_GIT_HASH"), ")"))]
struct Cli {
    /// Log level (default from config, else "warn")
    #[arg(short, long, global = true)]
    log_level: Option<LogLevel>,

    /// Display log timestamps in UTC (default: local time)
    #[arg(long, global = true)]
    utc: bool,

    /// Backend base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session token
    Login {
        #[arg(short, long)]
        username: String,
        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the stored session token
    Logout,
    /// Request a table
    Book {
        /// Date (YYYY-MM-DD)
        #[arg(long, default_value = "")]
        date: String,
        /// Time (HH:MM)
        #[arg(long, default_value = "")]
        time: String,
        /// Party size (1-12)
        #[arg(long, default_value = "1")]
        guests: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        mobile: String,
        /// Seating preferences, allergies, anything else
        #[arg(long, default_value = "")]
        special_request: String,
    },
    /// List your upcoming and past bookings
    Bookings,
    /// Accept the new time the restaurant proposed
    Confirm {
        id: String,
    },
    /// Show all reservations grouped by status (staff)
    Dashboard {
        /// Keep reading commands from stdin
        #[arg(short, long)]
        interactive: bool,
    },
    /// Approve a reservation (staff)
    Approve {
        id: String,
    },
    /// Cancel a reservation (staff)
    Cancel {
        id: String,
    },
    /// Propose a new date and time (staff)
    Reschedule {
        id: String,
        /// Proposed date (YYYY-MM-DD)
        #[arg(long, default_value = "")]
        date: String,
        /// Proposed time (HH:MM)
        #[arg(long, default_value = "")]
        time: String,
    },
}

// --- Logging ---

fn init_logging(level: &str, utc: bool) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));

    if utc {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_timer(OffsetTime::new(
                time::UtcOffset::UTC,
                time::macros::format_description!(
                    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
                ),
            ))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_timer(LocalTimer)
            .init();
    }
}

struct LocalTimer;

impl tracing_subscriber::fmt::time::FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

// --- Session helpers ---

fn require_session(store: &TokenStore) -> anyhow::Result<Session> {
    store
        .session()
        .ok_or_else(|| anyhow!("Not logged in. Run `dinner login` first."))
}

/// A rejected token invalidates the stored session.
pub(crate) fn forget_session_on_auth(store: &TokenStore, err: ApiError) -> anyhow::Error {
    if !err.is_auth() {
        return err.into();
    }
    if let Err(e) = store.clear() {
        warn!("Could not remove stored token: {e}");
    }
    anyhow!("Session expired. Run `dinner login` to sign in again.")
}

/// Called after a mutation the backend already accepted: a reload failing now
/// is a warning, not a failed command.
fn warn_refresh_failed(store: &TokenStore, err: ApiError) -> anyhow::Result<()> {
    if err.is_auth() {
        return Err(forget_session_on_auth(store, err));
    }
    warn!("Refresh after a saved change failed: {err}");
    eprintln!("Your change was saved, but reloading failed: {err}");
    Ok(())
}

/// Only a rejected or unsent PATCH is a failed update. `Load` comes from the
/// re-fetch that runs once the PATCH has succeeded.
fn status_update_outcome(store: &TokenStore, result: ApiResult<()>) -> anyhow::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e @ ApiError::Load(_)) => warn_refresh_failed(store, e),
        Err(e @ ApiError::Auth) => Err(forget_session_on_auth(store, e)),
        Err(other) => Err(anyhow!("Status update failed. {other}")),
    }
}

fn print_field_errors(errors: &ValidationErrors) {
    for (field, message) in errors.iter() {
        eprintln!("  {field}: {message}");
    }
}

fn read_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_bookings(page: &BookingsPage) {
    print!("{}", render::toast(page.toast().as_ref()));
    print!("{}", render::bookings(&page.view(Local::now().date_naive())));
}

fn print_dashboard(page: &DashboardPage) {
    print!("{}", render::toast(page.toast().as_ref()));
    print!("{}", render::dashboard(page));
}

// --- Commands ---

async fn update_status(
    client: &ReservationClient,
    store: &TokenStore,
    id: String,
    update: StatusUpdate,
) -> anyhow::Result<()> {
    let session = require_session(store)?;
    let mut page = DashboardPage::new();
    let id = ReservationId::new(id);
    let result = page.update_status(client, &session, &id, &update).await;
    status_update_outcome(store, result)?;
    print_dashboard(&page);
    Ok(())
}

// --- Main ---

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // CLI args win over config file and environment.
    let mut config = Config::load();
    if let Some(level) = &cli.log_level {
        config.log_level = level.to_string();
    }
    if cli.utc {
        config.utc = true;
    }
    if let Some(url) = cli.api_url.clone() {
        config.api_url = url;
    }
    init_logging(&config.log_level, config.utc);
    info!("dinner v{} using {}", version_string(), config.api_url);

    let client = ReservationClient::new(&config.api_url, Duration::from_secs(config.timeout_secs))?;
    let store = TokenStore::new(config.token_path.clone());

    match cli.command {
        Commands::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            match client.login(&username, &password).await {
                Ok(session) => {
                    store.set(session.token())?;
                    println!("Logged in as {}.", username.trim());
                }
                Err(ApiError::Auth) => {
                    bail!("Login failed. Check your credentials or backend status.")
                }
                Err(e) => {
                    warn!("Login error: {e}");
                    bail!("Login failed. Check your credentials or backend status.")
                }
            }
        }
        Commands::Logout => {
            store.clear()?;
            println!("Logged out.");
        }
        Commands::Book {
            date,
            time,
            guests,
            first_name,
            last_name,
            email,
            mobile,
            special_request,
        } => {
            let session = require_session(&store)?;
            let mut form = BookingForm::new(ReservationForm {
                first_name,
                last_name,
                email,
                mobile_number: mobile,
                date,
                time,
                guests,
                special_request,
            });
            match form.submit(&client, &session).await {
                Ok(created) => {
                    print!("{}", render::toast(form.toast().as_ref()));
                    println!("Reservation #{} is pending approval.\n", created.id);
                    let mut page = BookingsPage::new();
                    match page.load(&client, &session).await {
                        Ok(()) => print_bookings(&page),
                        Err(e) => warn_refresh_failed(&store, e)?,
                    }
                }
                Err(SubmitError::Invalid(errors)) => {
                    eprintln!("Please fix the following:");
                    print_field_errors(&errors);
                    bail!("Reservation not submitted.");
                }
                Err(SubmitError::Api(e)) if e.is_auth() => {
                    return Err(forget_session_on_auth(&store, e));
                }
                Err(SubmitError::Api(e)) => {
                    bail!("Something went wrong. {e}");
                }
            }
        }
        Commands::Bookings => {
            let session = require_session(&store)?;
            let mut page = BookingsPage::new();
            eprintln!("Loading bookings…");
            page.load(&client, &session)
                .await
                .map_err(|e| forget_session_on_auth(&store, e))?;
            print_bookings(&page);
        }
        Commands::Confirm { id } => {
            let session = require_session(&store)?;
            let id = ReservationId::new(id);
            let mut page = BookingsPage::new();
            page.load(&client, &session)
                .await
                .map_err(|e| forget_session_on_auth(&store, e))?;

            let awaiting = page
                .reservations()
                .iter()
                .any(|r| r.id == id && r.awaits_guest_confirmation());
            if !awaiting {
                bail!("Reservation {id} has no proposed time waiting for you.");
            }

            page.confirm_reschedule(&client, &session, &id)
                .await
                .map_err(|e| match e {
                    ApiError::Auth => forget_session_on_auth(&store, e),
                    other => anyhow!("Something went wrong. Please try again. ({other})"),
                })?;
            print_bookings(&page);
        }
        Commands::Dashboard { interactive } => {
            let session = require_session(&store)?;
            let mut page = DashboardPage::new();
            if let Err(e) = page.load(&client, &session).await {
                if e.is_auth() {
                    return Err(forget_session_on_auth(&store, e));
                }
                // Still render: the page shows its own error line.
                warn!("Dashboard load failed: {e}");
            }
            print_dashboard(&page);
            if interactive {
                shell::run(&client, &session, &store, &mut page).await?;
            }
        }
        Commands::Approve { id } => {
            update_status(&client, &store, id, StatusUpdate::approve()).await?;
        }
        Commands::Cancel { id } => {
            update_status(&client, &store, id, StatusUpdate::cancel()).await?;
        }
        Commands::Reschedule { id, date, time } => {
            let update = match StatusUpdate::propose_reschedule(&date, &time) {
                Ok(u) => u,
                Err(errors) => {
                    eprintln!("A reschedule needs both a date and a time:");
                    print_field_errors(&errors);
                    bail!("Nothing was sent.");
                }
            };
            update_status(&client, &store, id, update).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(dir: &tempfile::TempDir) -> TokenStore {
        let store = TokenStore::new(dir.path().join("token"));
        store.set("tok-123").unwrap();
        store
    }

    #[test]
    fn auth_failure_clears_stored_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = stored(&dir);

        let err = forget_session_on_auth(&store, ApiError::Auth);
        assert!(err.to_string().contains("dinner login"));
        assert_eq!(store.get(), None);
    }

    #[test]
    fn other_failures_keep_stored_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = stored(&dir);

        let err = forget_session_on_auth(&store, ApiError::Transition("boom".into()));
        assert!(err.to_string().contains("boom"));
        assert_eq!(store.get().as_deref(), Some("tok-123"));
    }

    #[test]
    fn failed_reload_after_update_is_not_a_failed_update() {
        let dir = tempfile::tempdir().unwrap();
        let store = stored(&dir);

        let result = Err(ApiError::Load(r#"{"detail":"staff only"}"#.into()));
        assert!(status_update_outcome(&store, result).is_ok());
        assert_eq!(store.get().as_deref(), Some("tok-123"));
    }

    #[test]
    fn rejected_update_is_reported_as_failed() {
        let dir = tempfile::tempdir().unwrap();
        let store = stored(&dir);

        let err = status_update_outcome(&store, Err(ApiError::Transition("boom".into())))
            .unwrap_err();
        assert!(err.to_string().starts_with("Status update failed."));
        assert_eq!(store.get().as_deref(), Some("tok-123"));

        let err = status_update_outcome(&store, Err(ApiError::Auth)).unwrap_err();
        assert!(err.to_string().contains("Session expired"));
        assert_eq!(store.get(), None);
    }

    #[test]
    fn failed_reload_after_booking_keeps_session_unless_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = stored(&dir);

        assert!(warn_refresh_failed(&store, ApiError::Load("503".into())).is_ok());
        assert_eq!(store.get().as_deref(), Some("tok-123"));

        assert!(warn_refresh_failed(&store, ApiError::Auth).is_err());
        assert_eq!(store.get(), None);
    }
}
