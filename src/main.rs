mod api_routes;
mod api_state;
mod models;
mod repo;
mod service;
mod utils;

use crate::api_state::AppState;
use crate::models::config::{setup_config, Config};
use crate::models::config_validator::validate_config;
use crate::models::filter_spec::FilterSpec;
use crate::repo::sqlite::SqliteSlot;
use crate::service::filter::apply_filter;
use crate::service::history_store::HistoryStore;
use crate::service::reconciler::Reconciler;
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};

#[macro_use]
extern crate rocket;

/// Open the durable slot named by `config` and load its history
fn open_reconciler(config: &Config) -> Result<Reconciler> {
    let slot = SqliteSlot::open(&config.database_file, &config.slot_name).with_context(|| {
        format!(
            "Failed to open history database: {}",
            config.database_file
        )
    })?;
    Ok(Reconciler::open(HistoryStore::new(slot)))
}

fn build_rocket(config: Config, reconciler: Reconciler) -> rocket::Rocket<rocket::Build> {
    let figment = rocket::Config::figment()
        .merge(("address", config.address.clone()))
        .merge(("port", config.port));

    let app_state = AppState::new(&config, reconciler);

    rocket::custom(figment).manage(app_state).mount(
        "/api",
        routes![
            api_routes::get_logs,
            api_routes::create_log,
            api_routes::clear_logs,
            api_routes::get_log_stats,
            api_routes::receive_record,
            api_routes::record_events,
            api_routes::health_check,
        ],
    )
}

#[rocket::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(parse_log_level(&args.log_level))
        .format_timestamp_secs()
        .init();

    info!("RustyLogView starting...");
    let config = load_config(&args)?;
    debug!("Effective config: {:?}", &config);

    if args.validate_only {
        info!("Configuration is valid. Exiting (--validate-only mode).");
        return Ok(());
    }

    if args.clear {
        return clear_history(&config);
    }

    if args.dump {
        return dump_history(&config, &args);
    }

    let reconciler = match open_reconciler(&config) {
        Ok(reconciler) => reconciler,
        Err(e) => {
            warn!("{:#}", e);
            warn!("Falling back to in-memory database. History will not survive a restart.");
            let in_memory = Config {
                database_file: ":memory:".to_string(),
                ..config.clone()
            };
            open_reconciler(&in_memory)?
        }
    };

    build_rocket(config, reconciler).launch().await?;
    Ok(())
}

#[derive(Parser)]
#[command(name = "RustyLogView")]
#[command(about = "Live event-log viewer with persisted, filterable history", long_about = None)]
struct Cli {
    #[arg(
        short = 'c',
        long = "config",
        default_value = "config.json",
        env = "RUSTYLOGVIEW_CONFIG"
    )]
    config_file: String,

    #[arg(
        short = 'l',
        long = "log-level",
        default_value = "info",
        env = "LOG_LEVEL"
    )]
    log_level: String,

    /// Override the configured database file
    #[arg(long = "database", env = "RUSTYLOGVIEW_DATABASE")]
    database: Option<String>,

    #[arg(short = 'v', long = "validate-only")]
    validate_only: bool,

    /// Print the (filtered) history as JSON and exit
    #[arg(long = "dump", conflicts_with = "clear")]
    dump: bool,

    /// Clear the persisted history and exit
    #[arg(long = "clear", conflicts_with = "dump")]
    clear: bool,

    #[arg(long = "level", requires = "dump")]
    level: Option<String>,

    /// Inclusive lower bound, RFC 3339 or HH:MM[:SS] today (UTC)
    #[arg(long = "from", requires = "dump")]
    from: Option<String>,

    /// Inclusive upper bound, RFC 3339 or HH:MM[:SS] today (UTC)
    #[arg(long = "to", requires = "dump")]
    to: Option<String>,
}

fn parse_log_level(level: &str) -> log::LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    }
}

fn load_config(args: &Cli) -> Result<Config> {
    // Strip any surrounding quotes from config file path
    let config_file_path = args
        .config_file
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();

    let mut config = if args.validate_only {
        setup_config(config_file_path).context("Failed to load configuration")?
    } else {
        match setup_config(config_file_path.clone()) {
            Ok(config) => {
                info!("Loaded configuration from: {}", config_file_path);
                config
            }
            Err(e) => {
                warn!(
                    "Failed to load config from: {}. Error: {}",
                    config_file_path, e
                );
                warn!("Starting with default configuration.");
                Config::default()
            }
        }
    };

    if let Some(database) = &args.database {
        config.database_file = database.clone();
        validate_config(&config).context("Invalid --database override")?;
    }

    Ok(config)
}

fn clear_history(config: &Config) -> Result<()> {
    let mut reconciler = open_reconciler(config)?;
    let cleared = reconciler.clear_all();

    if let Some(e) = cleared.storage_warning {
        return Err(e).context("Failed to clear persisted history");
    }

    info!(
        "Cleared {} entries from slot {}",
        cleared.removed, config.slot_name
    );
    Ok(())
}

fn dump_history(config: &Config, args: &Cli) -> Result<()> {
    let reconciler = open_reconciler(config)?;
    let spec = FilterSpec::from_params(
        args.level.as_deref(),
        args.from.as_deref(),
        args.to.as_deref(),
        chrono::Utc::now().date_naive(),
    )
    .context("Invalid filter")?;

    let history = reconciler.history();
    let visible = apply_filter(&history, &spec);

    println!(
        "{}",
        serde_json::to_string_pretty(&visible).context("Failed to serialize history")?
    );
    info!("Showing {} of {} entries", visible.len(), history.len());
    Ok(())
}
