// Interactive staff dashboard: one command per line on stdin, the dashboard is
// re-rendered after every command.

use anyhow::Result;
use dinner_client::{DashboardPage, ReservationClient, Session};
use dinner_models::{ReservationId, StatusUpdate};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::{forget_session_on_auth, render};

const HELP: &str = "\
Commands:
  approve <id>                  confirm a reservation
  cancel <id>                   cancel a reservation
  reschedule <id> <date> <time> propose a new slot (YYYY-MM-DD HH:MM)
  refresh                       reload the dashboard
  logout                        forget the stored token and leave
  quit                          leave";

#[derive(Debug, PartialEq)]
enum ShellCommand {
    Update(ReservationId, StatusUpdate),
    Refresh,
    Logout,
    Quit,
    Help,
}

fn parse(line: &str) -> Result<ShellCommand, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["approve", id] => Ok(ShellCommand::Update((*id).into(), StatusUpdate::approve())),
        ["cancel", id] => Ok(ShellCommand::Update((*id).into(), StatusUpdate::cancel())),
        ["reschedule", id, date, time] => StatusUpdate::propose_reschedule(date, time)
            .map(|u| ShellCommand::Update((*id).into(), u))
            .map_err(|e| e.to_string()),
        ["reschedule", ..] => Err("usage: reschedule <id> <date> <time>".to_string()),
        ["refresh"] => Ok(ShellCommand::Refresh),
        ["logout"] => Ok(ShellCommand::Logout),
        ["quit"] | ["exit"] => Ok(ShellCommand::Quit),
        ["help"] | [] => Ok(ShellCommand::Help),
        _ => Err(format!("unknown command: {}", line.trim())),
    }
}

pub async fn run(
    client: &ReservationClient,
    session: &Session,
    store: &dinner_client::TokenStore,
    page: &mut DashboardPage,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    println!("{HELP}");

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };

        let command = match parse(&line) {
            Ok(c) => c,
            Err(msg) => {
                eprintln!("{msg}");
                continue;
            }
        };

        let outcome = match command {
            ShellCommand::Update(id, update) => {
                page.update_status(client, session, &id, &update).await
            }
            ShellCommand::Refresh => {
                page.dismiss_toast();
                page.load(client, session).await
            }
            ShellCommand::Logout => {
                store.clear()?;
                info!("Logged out");
                println!("Logged out.");
                return Ok(());
            }
            ShellCommand::Quit => return Ok(()),
            ShellCommand::Help => {
                println!("{HELP}");
                continue;
            }
        };

        if let Err(e) = outcome {
            if e.is_auth() {
                return Err(forget_session_on_auth(store, e));
            }
            eprintln!("{e}");
        }

        print!("{}", render::toast(page.toast().as_ref()));
        print!("{}", render::dashboard(page));
    }
}
