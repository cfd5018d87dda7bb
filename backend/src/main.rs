//! Backend entry-point: loads settings, picks a store and serves the game API.

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::web;
use clap::Parser;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use stellar_backend::domain::PlanetGate;
use stellar_backend::middleware::TokenBucket;
use stellar_backend::outbound::persistence::{DbPool, run_migrations};
use stellar_backend::server::{
    AppDependencies, ServiceSettings, SettingsSource, build_diesel_state, build_memory_state,
    create_server, serve_until, shutdown_signal,
};

const DEFAULT_CONFIG_FILE: &str = "stellar-prod.yml";

/// Command line for the game backend.
#[derive(Debug, Parser)]
#[command(name = "stellar-backend", about = "Multi-tenant space strategy game backend")]
struct Cli {
    /// YAML or TOML settings file; missing files fall back to environment
    /// and defaults.
    #[arg(default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

fn init_tracing(database_log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(
            format!("diesel={database_log_level}")
                .parse()
                .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::WARN.into()),
        );
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        eprintln!("tracing init failed: {e}");
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();
    let (settings, source) = ServiceSettings::load_with_fallback(&cli.config)?;
    init_tracing(settings.database_log_level());
    if source == SettingsSource::EnvironmentOnly {
        warn!(path = %cli.config.display(), "config file not found; using environment and defaults");
    }

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let gate = Arc::new(PlanetGate::new(settings.gate_timeout()));
    let key_validity = settings.api_key_validity();

    let http_state = match (settings.database_url(), settings.pool_config()) {
        (Some(url), Some(pool_config)) => {
            run_migrations(&url)
                .await
                .map_err(|e| std::io::Error::other(format!("migrations failed: {e}")))?;
            let pool = DbPool::new(pool_config)
                .await
                .map_err(|e| std::io::Error::other(format!("database pool failed: {e}")))?;
            info!("serving from PostgreSQL");
            build_diesel_state(pool, Arc::clone(&gate), Arc::clone(&clock), key_validity)
        }
        _ => {
            warn!("no database configured; serving from memory, data is lost on exit");
            let (state, _) = build_memory_state(Arc::clone(&gate), Arc::clone(&clock), key_validity);
            state
        }
    };

    let (capacity, refill) = settings.throttle();
    let deps = AppDependencies {
        http_state: web::Data::new(http_state),
        base_path: settings.base_path(),
        bucket: Arc::new(TokenBucket::new(capacity, refill)),
    };

    info!(addr = %settings.bind_addr(), base_path = %deps.base_path, "starting server");
    let server = create_server(deps, &settings)?;
    serve_until(server, gate, shutdown_signal()).await
}
