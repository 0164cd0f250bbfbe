//! Keeps the client state in step with the backend.
//!
//! Every path that brings data in (initial load, rate refresh, change feed,
//! submissions) ends in a single mutation of the [`SharedState`]. Reports
//! arriving from the feed or from a confirmed submission are reconciled by id,
//! so the order in which they arrive does not matter.
use crate::core::aggregate;
use crate::core::backend::{NewReport, PhotoUpload, ReportBackend};
use crate::core::config::AppConfig;
use crate::core::entry::{HotDogEntry, ReportChange};
use crate::core::error::PerrosError;
use crate::core::geo::Coordinates;
use crate::core::price::derive_prices;
use crate::core::rates::ExchangeRates;
use crate::core::state::SharedState;
use crate::providers::SupabaseBackend;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const OBSERVER_CAPACITY: usize = 64;

/// Result of the initial load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    /// Reports came from the backend.
    Live { reports: usize },
    /// No backend configured; sample data stays in place.
    Unconfigured,
    /// The backend failed; previously known data stays in place.
    Stale { notice: String },
}

/// A report as entered by the user, before validation.
#[derive(Debug, Clone, Default)]
pub struct SubmitReport {
    pub business_name: String,
    pub price_bs: Option<f64>,
    pub location: Option<Coordinates>,
    pub state: Option<String>,
    pub photo: Option<PhotoUpload>,
}

/// Background task handle. Stops the task when stopped or dropped.
pub struct TaskHandle {
    task: Option<JoinHandle<()>>,
}

impl TaskHandle {
    fn new(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Live subscription to report changes. Each change is applied to the state
/// before it is handed to the observer.
///
/// Notifications are best effort: if the observer falls more than
/// `OBSERVER_CAPACITY` changes behind, further notifications are dropped
/// until it catches up. The state itself never misses a change.
pub struct Subscription {
    applied: mpsc::Receiver<ReportChange>,
    handle: TaskHandle,
}

impl Subscription {
    /// Waits for the next applied change; `None` once the feed has ended.
    pub async fn next_applied(&mut self) -> Option<ReportChange> {
        self.applied.recv().await
    }

    pub fn unsubscribe(mut self) {
        self.handle.stop();
    }
}

pub struct SyncService {
    state: SharedState,
    backend: Option<Arc<dyn ReportBackend>>,
    poll_interval: Duration,
}

impl SyncService {
    pub fn new(state: SharedState, backend: Option<Arc<dyn ReportBackend>>) -> Self {
        Self {
            state,
            backend,
            poll_interval: Duration::from_secs(15),
        }
    }

    /// Builds the backend from the config. A missing or unusable backend
    /// section leaves the service in fallback mode.
    pub fn from_config(config: &AppConfig, state: SharedState) -> Self {
        let backend = config.backend.as_ref().and_then(|backend_config| {
            match SupabaseBackend::from_config(backend_config) {
                Ok(backend) => Some(Arc::new(backend) as Arc<dyn ReportBackend>),
                Err(e) => {
                    warn!("Backend unavailable, using fallback data: {e}");
                    None
                }
            }
        });
        Self::new(state, backend).with_poll_interval(config.poll_interval())
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    fn backend(&self) -> Result<&Arc<dyn ReportBackend>, PerrosError> {
        self.backend
            .as_ref()
            .ok_or_else(|| PerrosError::Configuration("no backend configured".into()))
    }

    /// Fetches reports and rates together and writes what succeeded.
    pub async fn load(&self) -> LoadStatus {
        let backend = match self.backend() {
            Ok(backend) => backend,
            Err(e) => {
                debug!("{e}");
                self.state.lock().await.set_using_fallback(true);
                return LoadStatus::Unconfigured;
            }
        };

        let (reports, rates) = futures::join!(backend.list_reports(), backend.latest_rates());

        let mut state = self.state.lock().await;
        match rates {
            Ok(Some(rates)) => state.set_exchange_rates(rates),
            Ok(None) => debug!("No exchange rates published, keeping current"),
            Err(e) => warn!("Failed to fetch exchange rates: {e}"),
        }
        match reports {
            Ok(entries) => {
                let count = entries.len();
                state.set_entries(entries);
                state.set_using_fallback(false);
                info!(count, "Loaded reports from backend");
                LoadStatus::Live { reports: count }
            }
            Err(e) => {
                warn!("Failed to load reports: {e}");
                state.set_using_fallback(true);
                LoadStatus::Stale {
                    notice: format!("Could not reach the backend, showing saved data ({e})"),
                }
            }
        }
    }

    /// One pull of the latest rates. `Ok(None)` when none are published.
    pub async fn refresh_rates(&self) -> Result<Option<ExchangeRates>, PerrosError> {
        let backend = self.backend()?;
        refresh_rates_into(backend.as_ref(), &self.state).await
    }

    /// Refreshes rates every `interval` until the handle is stopped. The
    /// first refresh happens one interval from now.
    pub fn spawn_rate_refresh(&self, interval: Duration) -> Option<TaskHandle> {
        let backend = Arc::clone(self.backend.as_ref()?);
        let state = Arc::clone(&self.state);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = refresh_rates_into(backend.as_ref(), &state).await {
                    warn!("Scheduled rate refresh failed: {e}");
                }
            }
        });
        Some(TaskHandle::new(task))
    }

    /// Validates, prices and stores a new report.
    ///
    /// Nothing is sent and the state is untouched if validation fails. If the
    /// backend cannot be reached, the entries are kept and the state is
    /// flagged as fallback data.
    pub async fn submit(&self, report: SubmitReport) -> Result<HotDogEntry, PerrosError> {
        let business_name = report.business_name.trim();
        let price_bs = match report.price_bs {
            Some(price) if !business_name.is_empty() => price,
            _ => {
                return Err(PerrosError::Validation(
                    "business name and price are required".into(),
                ));
            }
        };

        let (location, rates) = {
            let state = self.state.lock().await;
            let location = report
                .location
                .or_else(|| state.user_location())
                .ok_or_else(|| PerrosError::Validation("location is required".into()))?;
            (location, state.exchange_rates().clone())
        };
        let location = Coordinates::new(location.lat, location.lng)?;
        let prices = derive_prices(price_bs, &rates)?;
        let region = report
            .state
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        match &self.backend {
            Some(backend) => {
                let stored = backend
                    .create_report(NewReport {
                        business_name: business_name.to_string(),
                        prices,
                        location,
                        state: region,
                        photo: report.photo,
                    })
                    .await;
                let stored = match stored {
                    Ok(stored) => stored,
                    Err(e) => {
                        warn!("Failed to submit report: {e}");
                        mark_degraded(&self.state, &e).await;
                        return Err(e);
                    }
                };
                info!(id = %stored.id, "Report stored");
                self.state
                    .lock()
                    .await
                    .apply_change(ReportChange::Insert(stored.clone()));
                Ok(stored)
            }
            None => {
                let photo = report.photo.map(|p| {
                    format!("data:{};base64,{}", p.content_type, STANDARD.encode(&p.bytes))
                });
                let entry = HotDogEntry::local(business_name, prices, location, region, photo);
                info!(id = %entry.id, "Report kept locally");
                self.state.lock().await.prepend_entry(entry.clone());
                Ok(entry)
            }
        }
    }

    /// Starts applying backend changes to the state.
    pub fn subscribe(&self) -> Option<Subscription> {
        let backend = Arc::clone(self.backend.as_ref()?);
        let mut feed = backend.subscribe(self.poll_interval);
        let state = Arc::clone(&self.state);
        let (tx, rx) = mpsc::channel(OBSERVER_CAPACITY);

        let task = tokio::spawn(async move {
            while let Some(event) = feed.next().await {
                let change = match event {
                    Ok(change) => change,
                    Err(e) => {
                        mark_degraded(&state, &e).await;
                        continue;
                    }
                };
                {
                    let mut state = state.lock().await;
                    state.apply_change(change.clone());
                    state.set_using_fallback(false);
                }
                if tx.try_send(change).is_err() {
                    debug!("Observer not keeping up, change dropped from notifications");
                }
            }
        });
        Some(Subscription {
            applied: rx,
            handle: TaskHandle::new(task),
        })
    }

    /// Reports within `radius_km`, asking the backend first and filtering
    /// locally when it is absent or fails.
    pub async fn nearby(&self, center: Coordinates, radius_km: f64) -> Vec<HotDogEntry> {
        if let Some(backend) = &self.backend {
            match backend.nearby_reports(center, radius_km).await {
                Ok(entries) => return entries,
                Err(e) => warn!("Server-side nearby query failed, filtering locally: {e}"),
            }
        }
        let state = self.state.lock().await;
        aggregate::nearby(state.entries(), &center, radius_km)
            .cloned()
            .collect()
    }

    pub async fn set_user_location(&self, location: Coordinates) {
        self.state.lock().await.set_user_location(location);
    }
}

/// Flags the state as fallback data when `error` means the backend is out of reach.
async fn mark_degraded(state: &SharedState, error: &PerrosError) {
    if error.degrades_to_fallback() {
        state.lock().await.set_using_fallback(true);
    }
}

async fn refresh_rates_into(
    backend: &dyn ReportBackend,
    state: &SharedState,
) -> Result<Option<ExchangeRates>, PerrosError> {
    let rates = match backend.latest_rates().await {
        Ok(rates) => rates,
        Err(e) => {
            mark_degraded(state, &e).await;
            return Err(e);
        }
    };
    if let Some(rates) = &rates {
        debug!(bcv = rates.bcv(), usdt = rates.usdt(), "Refreshed exchange rates");
        state.lock().await.set_exchange_rates(rates.clone());
    }
    Ok(rates)
}
