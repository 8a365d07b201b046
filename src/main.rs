use argh::FromArgs;
use std::path::PathBuf;
use std::process::ExitCode;
use weather_digest::{DigestConfig, DigestJob, logging, scheduler};

#[derive(FromArgs)]
/// Daily weather, air-quality and alert digest delivered to chat
struct Cli {
    /// path to the configuration file (defaults to the user config directory)
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Run(RunCommand),
    Preview(PreviewCommand),
    Schedule(ScheduleCommand),
}

#[derive(FromArgs)]
/// fetch, format and deliver one digest now
#[argh(subcommand, name = "run")]
struct RunCommand {}

#[derive(FromArgs)]
/// fetch and format a digest and print it without delivering
#[argh(subcommand, name = "preview")]
struct PreviewCommand {}

#[derive(FromArgs)]
/// deliver a digest every day at the configured time
#[argh(subcommand, name = "schedule")]
struct ScheduleCommand {
    /// local time of day to send the digest, overrides schedule.time (HH:MM)
    #[argh(option)]
    at: Option<String>,

    /// also run once immediately on startup
    #[argh(switch)]
    run_now: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli: Cli = argh::from_env();

    let mut config = match DigestConfig::load_from_path(cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.logging) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    let job = match DigestJob::from_config(&config) {
        Ok(job) => job,
        Err(e) => {
            tracing::error!("Failed to set up digest job: {}", e);
            eprintln!("{}", e.user_message());
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Run(_) => match job.run_once().await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", e.user_message());
                ExitCode::FAILURE
            }
        },
        Command::Preview(_) => match job.build_digest().await {
            Ok(digest) => {
                println!("{digest}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(kind = e.kind(), "Preview failed: {}", e);
                eprintln!("{}", e.user_message());
                ExitCode::FAILURE
            }
        },
        Command::Schedule(schedule) => {
            if let Some(at) = schedule.at {
                config.schedule.time = at;
            }
            let at = match config.schedule_time() {
                Ok(at) => at,
                Err(e) => {
                    eprintln!("{e}");
                    return ExitCode::FAILURE;
                }
            };

            tracing::info!(
                "Scheduling daily digest at {} {}",
                config.schedule.time,
                config.target.timezone
            );
            scheduler::run_daily(&job, at, schedule.run_now).await;
            ExitCode::SUCCESS
        }
    }
}
