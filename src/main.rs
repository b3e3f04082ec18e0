use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use mount_notify::cli::{self, NotifyOptions, OutputFormat};
use mount_notify::config::NotifyConfig;
use mount_notify::logging;
use mount_notify::mounts::CredentialOverride;
use mount_notify::shutdown::ShutdownSignals;

#[derive(Parser)]
#[command(name = "mount-notify")]
#[command(about = "Listen for changes on external storage mounts and invalidate cached folder sizes", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = "mount-notify.toml")]
    config: PathBuf,

    /// Metadata cache database (overrides database.path)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    /// Increase verbosity (-v prints every change, -vv enables debug logs)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen for updates in a mount and invalidate the folder cache
    Notify {
        /// Id of the mount to listen on
        mount_id: i64,

        /// Username for the mount when credentials are not stored
        #[arg(short, long)]
        user: Option<String>,

        /// Password for the mount when credentials are not stored
        #[arg(long)]
        password: Option<String>,

        /// Limit notifications to this path inside the mount
        #[arg(short, long, default_value = "/")]
        path: String,

        /// Skip the startup self-test
        #[arg(long)]
        no_self_check: bool,

        /// Log invalidations without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// List configured mounts
    Mounts {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match NotifyConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(database) = &cli.database {
        config.database.path = database.to_string_lossy().to_string();
    }

    let _log_guard =
        match logging::init_logging(cli.verbose, cli.log.as_deref(), config.log_directory().as_deref()) {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                return ExitCode::FAILURE;
            }
        };

    debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Commands::Notify {
            mount_id,
            user,
            password,
            path,
            no_self_check,
            dry_run,
        } => {
            let options = NotifyOptions {
                mount_id,
                credentials: CredentialOverride { user, password },
                path,
                self_check: !no_self_check,
                dry_run,
                verbose: cli.verbose > 0,
            };
            notify_until_interrupted(config, options).await
        }
        Commands::Mounts { json } => {
            let format = if json {
                OutputFormat::Json
            } else {
                OutputFormat::Table
            };
            match cli::list_mounts(&config, format, &mut std::io::stdout()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    error!("{:#}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

/// Run the blocking listener on its own thread and wait for it to fail or for
/// SIGINT/SIGTERM. Stopping by signal is the normal way out and exits with 0.
async fn notify_until_interrupted(config: NotifyConfig, options: NotifyOptions) -> ExitCode {
    let mount_id = options.mount_id;
    let mut signals = ShutdownSignals::install();
    let (tx, rx) = oneshot::channel();

    let spawned = std::thread::Builder::new()
        .name("mount-notify-listener".to_string())
        .spawn(move || {
            let _ = tx.send(cli::run_notify(&config, &options));
        });

    if let Err(e) = spawned {
        error!("Failed to start listener thread: {}", e);
        return ExitCode::FAILURE;
    }

    tokio::select! {
        result = rx => match result {
            Ok(Ok(())) => ExitCode::SUCCESS,
            Ok(Err(e)) => {
                error!("{}", e);
                ExitCode::FAILURE
            }
            Err(_) => {
                error!("Listener thread exited without reporting a result");
                ExitCode::FAILURE
            }
        },
        signal = signals.recv() => {
            info!("Received {}, stopped listening on mount {}", signal, mount_id);
            ExitCode::SUCCESS
        }
    }
}
