//! Client-side state: reports, user location, exchange rates and the fallback flag

use crate::core::aggregate;
use crate::core::entry::{HotDogEntry, ReportChange};
use crate::core::fallback::sample_entries;
use crate::core::geo::Coordinates;
use crate::core::rates::{ExchangeRateStore, ExchangeRates};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Handle passed to everything that reads or mutates the client state.
pub type SharedState = Arc<Mutex<ClientState>>;

/// Owned container for everything the display surfaces consume.
///
/// Writes are not validated here; producers validate before writing.
#[derive(Debug, Clone)]
pub struct ClientState {
    entries: Vec<HotDogEntry>,
    user_location: Option<Coordinates>,
    rates: ExchangeRateStore,
    using_fallback: bool,
}

/// The part of [`ClientState`] that survives between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub entries: Vec<HotDogEntry>,
    #[serde(default)]
    pub user_location: Option<Coordinates>,
    #[serde(default)]
    pub exchange_rates: Option<ExchangeRates>,
}

impl ClientState {
    /// Empty state backed by live data.
    #[cfg(test)]
    pub fn new(fallback_rates: ExchangeRates) -> Self {
        Self {
            entries: Vec::new(),
            user_location: None,
            rates: ExchangeRateStore::new(fallback_rates),
            using_fallback: false,
        }
    }

    /// Sample reports and default rates, flagged as fallback data.
    pub fn fallback(fallback_rates: ExchangeRates) -> Self {
        Self {
            entries: sample_entries(),
            user_location: None,
            rates: ExchangeRateStore::new(fallback_rates),
            using_fallback: true,
        }
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    pub fn entries(&self) -> &[HotDogEntry] {
        &self.entries
    }

    pub fn user_location(&self) -> Option<Coordinates> {
        self.user_location
    }

    pub fn exchange_rates(&self) -> &ExchangeRates {
        self.rates.current()
    }

    pub fn rate_store(&self) -> &ExchangeRateStore {
        &self.rates
    }

    pub fn using_fallback(&self) -> bool {
        self.using_fallback
    }

    /// Adds a report in front of the others.
    pub fn prepend_entry(&mut self, entry: HotDogEntry) {
        debug!(id = %entry.id, "Prepending entry");
        self.entries.insert(0, entry);
    }

    /// Replaces the whole collection, as after a full refetch.
    pub fn set_entries(&mut self, entries: Vec<HotDogEntry>) {
        debug!(count = entries.len(), "Replacing entries");
        self.entries = entries;
    }

    pub fn set_user_location(&mut self, location: Coordinates) {
        self.user_location = Some(location);
    }

    pub fn set_exchange_rates(&mut self, rates: ExchangeRates) {
        self.rates.replace(rates);
    }

    pub fn set_using_fallback(&mut self, using_fallback: bool) {
        self.using_fallback = using_fallback;
    }

    /// Applies a change notification or poll result by report id.
    ///
    /// Inserts and updates both upsert: a known id is replaced where it
    /// stands, an unknown one goes to the front. Deletes of unknown ids are
    /// ignored.
    pub fn apply_change(&mut self, change: ReportChange) {
        debug!(id = change.id(), "Applying change");
        match change {
            ReportChange::Insert(entry) | ReportChange::Update(entry) => {
                match self.entries.iter_mut().find(|e| e.id == entry.id) {
                    Some(existing) => *existing = entry,
                    None => self.entries.insert(0, entry),
                }
            }
            ReportChange::Delete { id } => self.entries.retain(|e| e.id != id),
        }
    }

    pub fn national_average(&self) -> f64 {
        aggregate::national_average(&self.entries)
    }

    pub fn local_average(&self, reference: &Coordinates, radius_km: f64) -> f64 {
        aggregate::local_average(&self.entries, reference, radius_km)
    }

    /// Average around the stored user location, if one is known.
    pub fn user_local_average(&self, radius_km: f64) -> Option<f64> {
        self.user_location
            .map(|location| self.local_average(&location, radius_km))
    }

    pub fn price_trend(&self) -> aggregate::PriceTrend {
        aggregate::price_trend(&self.entries)
    }

    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            entries: self.entries.clone(),
            user_location: self.user_location,
            exchange_rates: (!self.rates.is_fallback()).then(|| self.rates.current().clone()),
        }
    }

    /// Restores a previous snapshot. The fallback flag is left untouched.
    pub fn restore(&mut self, persisted: PersistedState) {
        self.entries = persisted.entries;
        self.user_location = persisted.user_location;
        if let Some(rates) = persisted.exchange_rates {
            self.rates.replace(rates);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, price: f64) -> HotDogEntry {
        HotDogEntry {
            id: id.to_string(),
            business_name: format!("Negocio {id}"),
            price,
            price_bs: None,
            price_bcv: None,
            lat: 10.4806,
            lng: -66.9036,
            photo: None,
            state: None,
            created_at: "2025-01-15T12:00:00.000Z".to_string(),
        }
    }

    fn ids(state: &ClientState) -> Vec<&str> {
        state.entries().iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_fallback_state() {
        let state = ClientState::fallback(ExchangeRates::default());
        assert!(state.using_fallback());
        assert_eq!(state.entries().len(), 6);
        assert_eq!(state.exchange_rates(), &ExchangeRates::default());
        assert!(state.user_location().is_none());
    }

    #[test]
    fn test_prepend_is_newest_first() {
        let mut state = ClientState::new(ExchangeRates::default());
        state.prepend_entry(entry("a", 1.0));
        state.prepend_entry(entry("b", 2.0));
        assert_eq!(ids(&state), vec!["b", "a"]);
    }

    #[test]
    fn test_set_entries_overwrites() {
        let mut state = ClientState::fallback(ExchangeRates::default());
        state.set_entries(vec![entry("x", 1.0)]);
        assert_eq!(ids(&state), vec!["x"]);
        // Overwriting entries does not decide where the data came from.
        assert!(state.using_fallback());
    }

    #[test]
    fn test_apply_change_upserts_by_id() {
        let mut state = ClientState::new(ExchangeRates::default());
        state.set_entries(vec![entry("a", 1.0), entry("b", 2.0)]);

        state.apply_change(ReportChange::Update(entry("b", 5.0)));
        assert_eq!(ids(&state), vec!["a", "b"]);
        assert_eq!(state.entries()[1].price, 5.0);

        // Insert of a known id does not duplicate.
        state.apply_change(ReportChange::Insert(entry("a", 3.0)));
        assert_eq!(ids(&state), vec!["a", "b"]);
        assert_eq!(state.entries()[0].price, 3.0);

        // Update for an id we never saw is treated as new.
        state.apply_change(ReportChange::Update(entry("c", 1.0)));
        assert_eq!(ids(&state), vec!["c", "a", "b"]);

        state.apply_change(ReportChange::Delete { id: "a".into() });
        state.apply_change(ReportChange::Delete {
            id: "missing".into(),
        });
        assert_eq!(ids(&state), vec!["c", "b"]);
    }

    #[test]
    fn test_averages_delegate_to_entries() {
        let mut state = ClientState::new(ExchangeRates::default());
        assert_eq!(state.national_average(), 0.0);
        assert_eq!(state.user_local_average(50.0), None);

        state.set_entries(vec![entry("a", 2.0), entry("b", 3.0)]);
        state.set_user_location(Coordinates {
            lat: 10.48,
            lng: -66.90,
        });
        assert!((state.national_average() - 2.5).abs() < 1e-9);
        assert_eq!(state.user_local_average(50.0), Some(2.5));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut state = ClientState::new(ExchangeRates::default());
        state.set_entries(vec![entry("a", 2.0)]);
        assert!(state.snapshot().exchange_rates.is_none());

        state.set_exchange_rates(ExchangeRates::new(50.0, 60.0).unwrap());
        state.set_user_location(Coordinates { lat: 1.0, lng: 2.0 });
        let snapshot = state.snapshot();

        let mut restored = ClientState::new(ExchangeRates::default());
        restored.restore(snapshot.clone());
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.exchange_rates().usdt(), 60.0);
    }
}
