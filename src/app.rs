use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::core::{
    alerts::{Notifier, SmtpMailer},
    config::{self, DEFAULT_EMAIL_CONFIG, DEFAULT_PATTERN_CONFIG},
    error::ConfigError,
    monitor::{Monitor, DEFAULT_POLL_INTERVAL},
    scan,
};

/// Exit code for a missing log or pattern config file (EX_NOINPUT).
pub const EXIT_MISSING_INPUT: u8 = 66;
/// Exit code for a failure reading the log file (EX_IOERR).
pub const EXIT_IO: u8 = 74;
/// Exit code for an unusable pattern config (EX_CONFIG).
pub const EXIT_CONFIG: u8 = 78;

#[derive(Debug, Parser)]
#[command(name = "loghawk", version, about = "LogHawk - Real-Time Log Monitoring Tool")]
pub struct Args {
    /// Path to the log file
    pub logfile: PathBuf,

    /// Path to config file with search patterns
    #[arg(long, default_value = DEFAULT_PATTERN_CONFIG)]
    pub config: PathBuf,

    /// Enable real-time monitoring mode
    #[arg(long)]
    pub monitor: bool,

    /// Path to the SMTP settings file
    #[arg(long, default_value = DEFAULT_EMAIL_CONFIG)]
    pub email_config: PathBuf,

    /// Print alerts to the console only, never send email
    #[arg(long)]
    pub no_email: bool,

    /// Seconds to wait between polls when no new lines are available
    #[arg(
        long,
        default_value_t = DEFAULT_POLL_INTERVAL.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Log file {} does not exist.", .0.display())]
    MissingLogFile(PathBuf),

    #[error("Config file {} does not exist.", .0.display())]
    MissingConfigFile(PathBuf),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::MissingLogFile(_) | Self::MissingConfigFile(_) => EXIT_MISSING_INPUT,
            Self::Config(_) => EXIT_CONFIG,
            Self::Io { .. } => EXIT_IO,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));
}

/// Resolves on Ctrl+C. If the handler cannot be installed the monitor keeps
/// running and must be stopped some other way.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Validate inputs, load the pattern set once, then scan or monitor.
///
/// Console output goes to `out`; monitor mode runs until `shutdown` resolves.
pub async fn execute<F, W>(args: Args, shutdown: F, mut out: W) -> Result<(), AppError>
where
    F: Future<Output = ()>,
    W: Write,
{
    if !args.logfile.exists() {
        return Err(AppError::MissingLogFile(args.logfile));
    }
    if !args.config.exists() {
        return Err(AppError::MissingConfigFile(args.config));
    }

    let patterns = config::load_patterns(&args.config)?;
    log::info!("Loaded {} pattern(s) from {:?}", patterns.len(), args.config);

    let mailer = if args.no_email {
        None
    } else {
        if !args.email_config.exists() {
            log::warn!(
                "Email config {:?} not found; email alerts will fail until it exists",
                args.email_config
            );
        }
        Some(SmtpMailer::new(&args.email_config))
    };
    let mut notifier = Notifier::new(mailer);

    let io_error = |source| AppError::Io {
        path: args.logfile.clone(),
        source,
    };

    if args.monitor {
        let interval = Duration::from_secs(args.interval);
        let mut monitor =
            Monitor::open(&args.logfile, patterns, notifier, interval, out).map_err(io_error)?;
        monitor.run_until(shutdown).await;
    } else {
        scan::run(&args.logfile, &patterns, &mut notifier, &mut out)
            .await
            .map_err(io_error)?;
    }

    Ok(())
}

pub fn run() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ Error: failed to start runtime: {}", e);
            return ExitCode::from(EXIT_IO);
        }
    };

    match runtime.block_on(execute(args, interrupted(), io::stdout())) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
