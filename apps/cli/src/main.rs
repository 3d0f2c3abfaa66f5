use std::{io::Write, process::ExitCode, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    ClientCommand, ClientError, CommandOutput, CommandReport, CommandResult, HttpElectionApi,
    SessionController,
};
use shared::domain::{CandidateId, ElectionId};
use storage::{KeyValueStore, MemoryStore, SqliteStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

/// Read when `--password` is omitted.
const PASSWORD_ENV: &str = "VOTE_PASSWORD";

#[derive(Parser, Debug)]
#[command(name = "vote-cli", about = "Client for the mini voting demo API")]
struct Cli {
    /// Base url of the election API.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Session store location (sqlite url or file path).
    #[arg(long, global = true)]
    store: Option<String>,
    /// Keep the session in memory for this run only.
    #[arg(long, global = true)]
    ephemeral: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all elections.
    Elections,
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
        password: String,
    },
    /// Show an election and its candidates.
    Show { election_id: i64 },
    Vote {
        #[arg(long)]
        election: i64,
        #[arg(long)]
        candidate: i64,
    },
    Logout,
    Whoami,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = config::load_settings();
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }
    if let Some(store) = cli.store {
        settings.store_url = Some(store);
    }

    let api_url = config::validate_api_url(&settings.api_url)?;
    let store = open_store(&settings, cli.ephemeral).await?;

    let api = Arc::new(HttpElectionApi::new(api_url));
    let mut controller = SessionController::restore(api, store).await?;

    let mut stdout = std::io::stdout().lock();
    let succeeded = run(&mut controller, cli.command, &mut stdout).await?;
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn open_store(
    settings: &config::ClientSettings,
    ephemeral: bool,
) -> Result<Arc<dyn KeyValueStore>> {
    if ephemeral {
        return Ok(Arc::new(MemoryStore::new()));
    }
    let store_url = settings.resolve_store_url()?;
    info!(store_url = %store_url, "opening session store");
    let store = SqliteStore::new(&store_url).await?;
    store.health_check().await?;
    Ok(Arc::new(store))
}

async fn run(
    controller: &mut SessionController,
    command: Command,
    out: &mut impl Write,
) -> Result<bool> {
    match command {
        Command::Elections => {
            let report = controller.execute(ClientCommand::ListElections).await;
            if let Ok(CommandReport {
                result: CommandResult::Completed(CommandOutput::Elections(elections)),
                ..
            }) = &report
            {
                if elections.is_empty() {
                    writeln!(out, "No elections")?;
                }
                for election in elections {
                    writeln!(out, "{}", render::election_line(election))?;
                }
            }
            finish(report, false, out)
        }
        Command::Login { email, password } => {
            let report = controller
                .execute(ClientCommand::Login { email, password })
                .await;
            finish(report, true, out)
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let report = controller
                .execute(ClientCommand::Register {
                    name,
                    email,
                    password,
                })
                .await;
            finish(report, true, out)
        }
        Command::Show { election_id } => {
            let report = controller
                .execute(ClientCommand::ViewElection {
                    election_id: ElectionId(election_id),
                })
                .await;
            if let Ok(CommandReport {
                result: CommandResult::Completed(CommandOutput::Election(detail)),
                ..
            }) = &report
            {
                for line in render::election_detail(detail) {
                    writeln!(out, "{line}")?;
                }
            }
            finish(report, false, out)
        }
        Command::Vote {
            election,
            candidate,
        } => {
            // Without a token the vote is refused before anything is sent.
            if controller.is_authenticated() {
                let view = controller
                    .execute(ClientCommand::ViewElection {
                        election_id: ElectionId(election),
                    })
                    .await;
                if view.is_err() {
                    return finish(view, false, out);
                }
            }
            let report = controller
                .execute(ClientCommand::CastVote {
                    candidate_id: CandidateId(candidate),
                })
                .await;
            finish(report, true, out)
        }
        Command::Logout => {
            let report = controller.execute(ClientCommand::Logout).await;
            if report.is_ok() {
                writeln!(out, "Logged out")?;
            }
            finish(report, false, out)
        }
        Command::Whoami => {
            writeln!(out, "{}", render::welcome(controller.session()))?;
            Ok(true)
        }
    }
}

/// Optionally prints the status message and reports whether the command
/// completed. Request failures were already logged by the controller.
fn finish(
    report: std::result::Result<CommandReport, ClientError>,
    print_status: bool,
    out: &mut impl Write,
) -> Result<bool> {
    match report {
        Ok(report) => {
            if let (true, Some(status)) = (print_status, &report.status) {
                writeln!(out, "{status}")?;
            }
            Ok(report.result.is_completed())
        }
        Err(ClientError::Storage(err)) => Err(err),
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
