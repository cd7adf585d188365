//! biliq — Bilibili daily-question watcher.
//!
//! Two modes:
//!   `biliq archive [--login]`  one-shot: archive new questions to Markdown
//!   `biliq email [--login]`    run now, then re-check on a daily interval
//!
//! Configuration comes from `config.json` next to the binary (override with
//! `BILIQ_CONFIG`). See `README.md` for the file layout.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use biliq::config::{Config, DEFAULT_CONFIG_PATH};
use biliq::feed::scheduler::spawn_email_scheduler;
use biliq::pipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Archive,
    Email,
}

struct CliArgs {
    mode: Mode,
    use_login: bool,
}

fn parse_args() -> Result<CliArgs> {
    let mut mode = Mode::Archive;
    let mut use_login = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "archive" | "daily" => mode = Mode::Archive,
            "email" => mode = Mode::Email,
            // "1" kept as a compatibility spelling of --login.
            "--login" | "1" => use_login = true,
            "--anonymous" | "0" => use_login = false,
            other => bail!("unknown argument `{other}` (expected archive|email, --login)"),
        }
    }
    Ok(CliArgs { mode, use_login })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("biliq=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn config_path() -> PathBuf {
    std::env::var("BILIQ_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

async fn run() -> Result<()> {
    let args = parse_args()?;
    let cfg = Config::load(&config_path())?;
    tracing::info!(
        uid = cfg.target_uid,
        document = %cfg.output_md_file,
        image_dir = %cfg.image_dir,
        "loaded configuration"
    );

    match args.mode {
        Mode::Archive => {
            let outcome = pipeline::run_archive(&cfg, args.use_login).await?;
            tracing::info!(
                new = outcome.new_entries,
                known = outcome.skipped_known,
                "archive run finished"
            );
        }
        Mode::Email => {
            // Fail fast on an incomplete mail account before scheduling.
            cfg.email_config()?;
            let handle = spawn_email_scheduler(cfg, args.use_login);
            handle.await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Local .env convenience; a no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "run failed");
            ExitCode::FAILURE
        }
    }
}
