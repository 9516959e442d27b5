use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{
    layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, Layer,
};

use review_watcher::api::PracticumClient;
use review_watcher::config::{Config, ConfigError, LoggingConfig};
use review_watcher::metrics;
use review_watcher::notifications::{LogNotifier, Notifier, TelegramChannel};
use review_watcher::poller::{Cursor, CycleOutcome, Poller};

#[derive(Parser)]
#[command(
    name = "review-watcher",
    version,
    about = "Watches homework review status and reports changes to Telegram",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file; environment variables take precedence
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll until interrupted
    Run {
        /// Seconds between polls
        #[arg(short, long)]
        interval: Option<u64>,

        /// Log notifications instead of sending them
        #[arg(long, default_value = "false")]
        dry_run: bool,

        /// Initial from_date cursor (unix seconds, default: now)
        #[arg(long)]
        from_date: Option<i64>,
    },

    /// Run a single poll cycle and print its outcome
    Once {
        /// Log notifications instead of sending them
        #[arg(long, default_value = "false")]
        dry_run: bool,

        /// from_date cursor (unix seconds, default: now)
        #[arg(long)]
        from_date: Option<i64>,
    },

    /// Validate configuration and print a redacted summary
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging needs the config file, but a config failure must still be logged.
    let loaded = Config::load(cli.config.as_deref());
    let logging = match &loaded {
        Ok(config) => config.logging.clone(),
        Err(_) => LoggingConfig::default(),
    };
    setup_tracing(&cli, &logging)?;

    let config = match loaded {
        Ok(config) => config,
        Err(err) => {
            report_config_error(&err);
            return Err(err).context("failed to load configuration");
        }
    };

    match cli.command {
        Commands::Run {
            interval,
            dry_run,
            from_date,
        } => run(config, interval, dry_run, from_date).await,
        Commands::Once { dry_run, from_date } => once(config, dry_run, from_date).await,
        Commands::CheckConfig => {
            println!("Configuration OK");
            println!("{}", config.redacted_summary());
            Ok(())
        }
    }
}

fn setup_tracing(cli: &Cli, logging: &LoggingConfig) -> Result<()> {
    let default_filter = if cli.verbose {
        "review_watcher=debug,info".to_string()
    } else {
        format!("review_watcher={},warn", logging.level)
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let log_file = match cli.log_file.as_deref().or(logging.file.as_deref()) {
        Some(path) => Some(open_log_file(path)?),
        None => None,
    };

    let format = cli.log_format.as_deref().unwrap_or(&logging.format);
    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .with(file_layer(log_file))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .with(file_layer(log_file))
                .init();
        }
    }

    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

fn file_layer<S>(file: Option<File>) -> Option<impl Layer<S>>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    })
}

fn report_config_error(err: &ConfigError) {
    match err {
        ConfigError::MissingVariables(names) => {
            for name in names {
                tracing::error!(variable = *name, "Required environment variable is missing");
            }
        }
        other => tracing::error!(error = %other, "Invalid configuration"),
    }
}

fn build_notifier(config: &Config, dry_run: bool) -> Result<Box<dyn Notifier>> {
    if dry_run {
        tracing::info!("Dry run: notifications are logged, not sent");
        return Ok(Box::new(LogNotifier));
    }
    let channel =
        TelegramChannel::new(&config.telegram).context("failed to create Telegram channel")?;
    Ok(Box::new(channel))
}

fn build_poller(
    config: &Config,
    interval: Duration,
    dry_run: bool,
    from_date: Option<i64>,
) -> Result<Poller<PracticumClient, Box<dyn Notifier>>> {
    let client = PracticumClient::new(&config.api).context("failed to create API client")?;
    let notifier = build_notifier(config, dry_run)?;
    let cursor = from_date.map(Cursor::new).unwrap_or_else(Cursor::now);
    Ok(Poller::new(client, notifier, cursor, interval))
}

async fn run(
    config: Config,
    interval: Option<u64>,
    dry_run: bool,
    from_date: Option<i64>,
) -> Result<()> {
    let interval = match interval {
        Some(0) => anyhow::bail!("--interval must be greater than 0"),
        Some(secs) => Duration::from_secs(secs),
        None => config.poll_interval(),
    };

    if let Some(addr) = config.metrics.bind_address {
        metrics::init_metrics().context("failed to register metrics")?;
        tokio::spawn(async move {
            if let Err(e) = metrics::serve(addr).await {
                tracing::error!(%addr, error = %e, "Metrics endpoint stopped");
            }
        });
    }

    let mut poller = build_poller(&config, interval, dry_run, from_date)?;
    poller
        .run(shutdown_signal())
        .await
        .context("poller stopped on an unrecoverable error")
}

async fn once(config: Config, dry_run: bool, from_date: Option<i64>) -> Result<()> {
    let mut poller = build_poller(&config, config.poll_interval(), dry_run, from_date)?;
    match poller.poll_once().await {
        CycleOutcome::Fatal(err) => Err(err).context("poll cycle failed"),
        outcome => {
            println!("{outcome}");
            println!("cursor: {}", poller.cursor());
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
