pub mod cli;
pub mod core;
pub mod providers;
pub mod store;
pub mod sync;

use crate::core::config::AppConfig;
use crate::core::state::ClientState;
use crate::store::{DiskStore, LocalStore, MemoryStore};
use crate::sync::{LoadStatus, SyncService};
use anyhow::Result;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Ticker,
    List { limit: Option<usize> },
    Submit(cli::submit::SubmitArgs),
    Rates,
    Nearby { lat: f64, lng: f64, radius_km: Option<f64> },
    Locate { lat: f64, lng: f64 },
    Watch,
    Disclaimer,
}

impl AppCommand {
    fn needs_backend_data(&self) -> bool {
        !matches!(self, AppCommand::Locate { .. } | AppCommand::Disclaimer)
    }
}

fn open_store(config: &AppConfig) -> Box<dyn LocalStore> {
    let opened = config
        .default_data_path()
        .map_err(|e| e.to_string())
        .and_then(|path| DiskStore::open(&path).map_err(|e| e.to_string()));
    match opened {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!("Local store unavailable, nothing will be saved: {e}");
            Box::new(MemoryStore::new())
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Perros index starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = open_store(&config);
    let mut state = ClientState::fallback(config.fallback_rates()?);
    match store.load_state() {
        Ok(Some(persisted)) => state.restore(persisted),
        Ok(None) => debug!("No saved state, starting from sample data"),
        Err(e) => warn!("Ignoring unreadable saved state: {e}"),
    }
    let sync = SyncService::from_config(&config, state.into_shared());

    if !matches!(command, AppCommand::Disclaimer) && !store.disclaimer_seen().unwrap_or(false) {
        let state = sync.state().lock().await;
        println!("{}\n", cli::disclaimer::render(&state));
        store.mark_disclaimer_seen()?;
    }

    if command.needs_backend_data() {
        let spinner = cli::ui::new_spinner("Loading reports...");
        let status = sync.load().await;
        spinner.finish_and_clear();
        if let LoadStatus::Stale { notice } = status {
            eprintln!("{}", cli::ui::style_text(&notice, cli::ui::StyleType::Error));
        }
    }

    let result = match command {
        AppCommand::Ticker => cli::ticker::run(&sync, config.radius_km).await,
        AppCommand::List { limit } => cli::list::run(&sync, limit).await,
        AppCommand::Submit(args) => cli::submit::run(&sync, args).await,
        AppCommand::Rates => cli::rates::run(&sync).await,
        AppCommand::Nearby {
            lat,
            lng,
            radius_km,
        } => cli::nearby::run(&sync, lat, lng, radius_km.unwrap_or(config.radius_km)).await,
        AppCommand::Locate { lat, lng } => cli::locate::run(&sync, lat, lng).await,
        AppCommand::Watch => {
            cli::watch::run(&sync, config.radius_km, config.rates_refresh_interval()).await
        }
        AppCommand::Disclaimer => cli::disclaimer::run(&sync, store.as_ref()).await,
    };

    let snapshot = sync.state().lock().await.snapshot();
    store.save_state(&snapshot)?;
    result
}
