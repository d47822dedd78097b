mod cli;
mod error_fmt;
mod fit;

use clap::Parser;
use cli::{Cli, Commands, DEFAULT_CONFIG, JSON_MODE};
use eyre::{Result, WrapErr};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

fn main() -> ExitCode {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", error_fmt::format_error_json(&e));
            } else {
                eprintln!("{}", error_fmt::humanize(&e));
            }
            ExitCode::from(error_fmt::exit_code_for_error(&e))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    // Dropped when `run` returns, flushing the file log on every path.
    let _file_guard = init_tracing(&cli, &cfg.logging)?;
    let ctx = fit::Ctx::new(&cfg, cli.json)?;

    match cli.cmd {
        Commands::FitChannel {
            samples,
            channel,
            jobs,
        } => fit::run_fit_channels(&ctx, &samples, channel.as_deref(), jobs),
        Commands::FitSteer { samples } => fit::run_fit_steer(&ctx, &samples),
        Commands::Predict {
            samples,
            channel,
            bag,
            ambient,
            temperature,
        } => fit::run_predict(&ctx, &samples, &channel, bag, ambient, temperature),
        Commands::Health => {
            if cli.json {
                println!("{}", serde_json::json!({ "status": "ok" }));
            } else {
                println!("ok");
            }
            Ok(())
        }
    }
}

/// Explicit paths must exist; the default path is optional.
fn load_config(path: Option<&Path>) -> Result<axle_config::Config> {
    match path {
        Some(p) => axle_config::load_config_file(p),
        None => {
            let p = PathBuf::from(DEFAULT_CONFIG);
            if p.exists() {
                axle_config::load_config_file(&p)
            } else {
                Ok(axle_config::Config::default())
            }
        }
    }
}

fn init_tracing(cli: &Cli, logging: &axle_config::Logging) -> Result<Option<WorkerGuard>> {
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .wrap_err_with(|| format!("invalid --log-level '{}'", cli.log_level))?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if cli.json {
        layers.push(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_filter(console_filter)
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter)
                .boxed(),
        );
    }

    let mut file_guard = None;
    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::eyre!("logging.file has no file name: {file}"))?;
        let appender = match logging.rotation.as_deref().unwrap_or("never") {
            "daily" => tracing_appender::rolling::daily(dir, name),
            "hourly" => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        file_guard = Some(guard);
        let level = logging.level.as_deref().unwrap_or("info");
        let file_filter =
            EnvFilter::try_new(level).wrap_err_with(|| format!("invalid logging.level '{level}'"))?;
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(file_filter)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(file_guard)
}
