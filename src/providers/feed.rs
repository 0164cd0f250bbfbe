use crate::core::backend::{ReportBackend, ReportFeed};
use crate::core::entry::{HotDogEntry, ReportChange};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

const FEED_CAPACITY: usize = 64;

/// Changes that turn `previous` into `current`, both newest first.
///
/// Inserts are emitted oldest first so that prepending them one by one keeps
/// the collection newest first.
pub fn diff_snapshots(previous: &[HotDogEntry], current: &[HotDogEntry]) -> Vec<ReportChange> {
    let before: HashMap<&str, &HotDogEntry> =
        previous.iter().map(|e| (e.id.as_str(), e)).collect();
    let after: HashMap<&str, &HotDogEntry> = current.iter().map(|e| (e.id.as_str(), e)).collect();

    let mut changes = Vec::new();
    for entry in current.iter().rev() {
        match before.get(entry.id.as_str()) {
            None => changes.push(ReportChange::Insert(entry.clone())),
            Some(old) if *old != entry => changes.push(ReportChange::Update(entry.clone())),
            Some(_) => {}
        }
    }
    for entry in previous {
        if !after.contains_key(entry.id.as_str()) {
            changes.push(ReportChange::Delete {
                id: entry.id.clone(),
            });
        }
    }
    changes
}

/// Change feed built by re-listing reports every `interval` and diffing.
///
/// The first successful listing only sets the baseline. A failed listing is
/// sent as an error event and the next tick tries again.
pub fn poll_changes<B>(backend: Arc<B>, interval: Duration) -> ReportFeed
where
    B: ReportBackend + ?Sized + 'static,
{
    let (tx, rx) = mpsc::channel(FEED_CAPACITY);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut baseline: Option<Vec<HotDogEntry>> = None;

        loop {
            ticker.tick().await;
            let current = match backend.list_reports().await {
                Ok(current) => current,
                Err(e) => {
                    warn!("Polling reports failed: {e}");
                    if tx.send(Err(e)).await.is_err() {
                        debug!("Report feed closed, stopping poller");
                        return;
                    }
                    continue;
                }
            };
            if let Some(previous) = &baseline {
                let changes = diff_snapshots(previous, &current);
                debug!(count = changes.len(), "Polled report changes");
                for change in changes {
                    if tx.send(Ok(change)).await.is_err() {
                        debug!("Report feed closed, stopping poller");
                        return;
                    }
                }
            }
            baseline = Some(current);
        }
    });
    ReportFeed::new(rx, Some(task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::NewReport;
    use crate::core::error::PerrosError;
    use crate::core::geo::Coordinates;
    use crate::core::rates::ExchangeRates;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    fn entry(id: &str, price: f64) -> HotDogEntry {
        HotDogEntry {
            id: id.to_string(),
            business_name: format!("Negocio {id}"),
            price,
            price_bs: None,
            price_bcv: None,
            lat: 10.0,
            lng: -66.0,
            photo: None,
            state: None,
            created_at: "2025-01-15T12:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_diff_snapshots() {
        let previous = vec![entry("b", 2.0), entry("a", 1.0)];
        let current = vec![entry("d", 4.0), entry("c", 3.0), entry("b", 2.5)];

        let changes = diff_snapshots(&previous, &current);
        assert_eq!(
            changes,
            vec![
                ReportChange::Update(entry("b", 2.5)),
                ReportChange::Insert(entry("c", 3.0)),
                ReportChange::Insert(entry("d", 4.0)),
                ReportChange::Delete { id: "a".into() },
            ]
        );
        assert!(diff_snapshots(&current, &current).is_empty());
    }

    /// Serves one scripted listing per call, repeating the last one.
    struct ScriptedBackend {
        listings: Mutex<Vec<Result<Vec<HotDogEntry>, PerrosError>>>,
    }

    #[async_trait]
    impl ReportBackend for ScriptedBackend {
        async fn list_reports(&self) -> Result<Vec<HotDogEntry>, PerrosError> {
            let mut listings = self.listings.lock().await;
            if listings.len() > 1 {
                listings.remove(0)
            } else {
                match &listings[0] {
                    Ok(entries) => Ok(entries.clone()),
                    Err(e) => Err(PerrosError::Network(e.to_string())),
                }
            }
        }

        async fn create_report(&self, _report: NewReport) -> Result<HotDogEntry, PerrosError> {
            unimplemented!()
        }

        async fn latest_rates(&self) -> Result<Option<ExchangeRates>, PerrosError> {
            Ok(None)
        }

        async fn nearby_reports(
            &self,
            _center: Coordinates,
            _radius_km: f64,
        ) -> Result<Vec<HotDogEntry>, PerrosError> {
            Ok(Vec::new())
        }

        fn subscribe(self: Arc<Self>, poll_interval: Duration) -> ReportFeed {
            poll_changes(self, poll_interval)
        }
    }

    #[tokio::test]
    async fn test_poll_changes_emits_diffs_after_baseline() {
        let backend = Arc::new(ScriptedBackend {
            listings: Mutex::new(vec![
                Ok(vec![entry("a", 1.0)]),
                Err(PerrosError::Network("offline".into())),
                Ok(vec![entry("b", 2.0), entry("a", 1.0)]),
                Ok(vec![entry("b", 2.0)]),
            ]),
        });

        let mut feed = backend.subscribe(Duration::from_millis(5));
        assert!(matches!(
            feed.next().await,
            Some(Err(PerrosError::Network(_)))
        ));
        assert_eq!(
            feed.next().await.unwrap().unwrap(),
            ReportChange::Insert(entry("b", 2.0))
        );
        assert_eq!(
            feed.next().await.unwrap().unwrap(),
            ReportChange::Delete { id: "a".into() }
        );

        feed.close();
        assert!(feed.next().await.is_none());
    }
}
