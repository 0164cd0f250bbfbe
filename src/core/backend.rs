//! Backend abstractions: where reports and rates come from

use crate::core::entry::{HotDogEntry, ReportChange};
use crate::core::error::PerrosError;
use crate::core::geo::Coordinates;
use crate::core::price::DerivedPrices;
use crate::core::rates::ExchangeRates;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Photo attached to a new report.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A validated report ready to be stored.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub business_name: String,
    pub prices: DerivedPrices,
    pub location: Coordinates,
    pub state: Option<String>,
    pub photo: Option<PhotoUpload>,
}

/// One feed item: a change, or a failure to reach the backend.
pub type FeedEvent = Result<ReportChange, PerrosError>;

/// Stream of change notifications for the reports collection.
///
/// Delivery stops when the feed is closed or dropped. Failures are delivered
/// in line with changes; the feed keeps running after them.
pub struct ReportFeed {
    rx: mpsc::Receiver<FeedEvent>,
    task: Option<JoinHandle<()>>,
}

impl ReportFeed {
    pub fn new(rx: mpsc::Receiver<FeedEvent>, task: Option<JoinHandle<()>>) -> Self {
        Self { rx, task }
    }

    /// Next event, or `None` once the producer has stopped.
    pub async fn next(&mut self) -> Option<FeedEvent> {
        self.rx.recv().await
    }

    pub fn close(&mut self) {
        self.rx.close();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ReportFeed {
    fn drop(&mut self) {
        self.close();
    }
}

#[async_trait]
pub trait ReportBackend: Send + Sync {
    /// All reports, newest first.
    async fn list_reports(&self) -> Result<Vec<HotDogEntry>, PerrosError>;

    /// Stores a report (uploading its photo first, if any) and returns the
    /// stored row with its server-assigned id and timestamp.
    async fn create_report(&self, report: NewReport) -> Result<HotDogEntry, PerrosError>;

    /// Most recent rates by effective date, `None` if none were published.
    async fn latest_rates(&self) -> Result<Option<ExchangeRates>, PerrosError>;

    /// Server-side radius query.
    async fn nearby_reports(
        &self,
        center: Coordinates,
        radius_km: f64,
    ) -> Result<Vec<HotDogEntry>, PerrosError>;

    /// Starts delivering insert/update/delete notifications.
    fn subscribe(self: Arc<Self>, poll_interval: Duration) -> ReportFeed;
}
