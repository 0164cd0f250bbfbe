use crate::core::backend::{NewReport, PhotoUpload, ReportBackend, ReportFeed};
use crate::core::config::BackendConfig;
use crate::core::entry::{HotDogEntry, now_iso8601};
use crate::core::error::PerrosError;
use crate::core::geo::Coordinates;
use crate::core::rates::ExchangeRates;
use crate::providers::feed::poll_changes;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

const PHOTO_BUCKET: &str = "report-photos";

/// Row of the `reports` table.
#[derive(Debug, Deserialize)]
struct ReportRow {
    id: String,
    business_name: String,
    price_bs: f64,
    price_usdt: f64,
    price_bcv: f64,
    lat: Option<f64>,
    lng: Option<f64>,
    state: Option<String>,
    photo_url: Option<String>,
    created_at: Option<String>,
}

impl From<ReportRow> for HotDogEntry {
    fn from(row: ReportRow) -> Self {
        HotDogEntry {
            id: row.id,
            business_name: row.business_name,
            price: row.price_usdt,
            price_bs: Some(row.price_bs),
            price_bcv: Some(row.price_bcv),
            lat: row.lat.unwrap_or(0.0),
            lng: row.lng.unwrap_or(0.0),
            state: row.state,
            photo: row.photo_url,
            created_at: row.created_at.unwrap_or_else(now_iso8601),
        }
    }
}

#[derive(Debug, Serialize)]
struct ReportInsert<'a> {
    business_name: &'a str,
    price_bs: f64,
    price_usdt: f64,
    price_bcv: f64,
    lat: f64,
    lng: f64,
    state: Option<&'a str>,
    photo_url: Option<&'a str>,
}

/// Row of the `exchange_rates` table.
#[derive(Debug, Deserialize)]
struct RateRow {
    bcv_rate: f64,
    usdt_rate: f64,
    effective_date: String,
}

#[derive(Debug, Serialize)]
struct NearbyArgs {
    user_lat: f64,
    user_lng: f64,
    radius_km: f64,
}

/// Client for a Supabase project: PostgREST tables plus object storage.
pub struct SupabaseBackend {
    base_url: String,
    anon_key: String,
    client: reqwest::Client,
}

impl SupabaseBackend {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self, PerrosError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(PerrosError::Configuration("backend url is empty".into()));
        }
        if anon_key.trim().is_empty() {
            return Err(PerrosError::Configuration("backend anon_key is empty".into()));
        }
        let client = reqwest::Client::builder()
            .user_agent("perros-index/0.1")
            .timeout(timeout)
            .build()?;
        Ok(SupabaseBackend {
            base_url: base_url.to_string(),
            anon_key: anon_key.trim().to_string(),
            client,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, PerrosError> {
        Self::new(
            &config.url,
            &config.anon_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn send(request: RequestBuilder, what: &str) -> Result<Response, PerrosError> {
        let response = request
            .send()
            .await
            .map_err(|e| PerrosError::Network(format!("Request error: {e} while {what}")))?;
        if !response.status().is_success() {
            return Err(PerrosError::Network(format!(
                "HTTP error: {} while {}",
                response.status(),
                what
            )));
        }
        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, PerrosError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            PerrosError::Network(format!("Failed to parse JSON response while {what}: {e}"))
        })
    }

    /// Public URL of an object in the photo bucket.
    pub fn public_photo_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, PHOTO_BUCKET, key
        )
    }

    #[instrument(name = "PhotoUpload", skip(self, photo), fields(file = %photo.file_name))]
    async fn upload_photo(&self, photo: PhotoUpload) -> Result<String, PerrosError> {
        let key = format!(
            "{}-{}",
            chrono::Utc::now().timestamp_millis(),
            sanitize_file_name(&photo.file_name)
        );
        let request = self
            .request(
                Method::POST,
                &format!("/storage/v1/object/{PHOTO_BUCKET}/{key}"),
            )
            .header(reqwest::header::CONTENT_TYPE, photo.content_type)
            .body(photo.bytes);
        Self::send(request, "uploading photo").await?;
        Ok(self.public_photo_url(&key))
    }
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "photo".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl ReportBackend for SupabaseBackend {
    #[instrument(name = "ListReports", skip(self))]
    async fn list_reports(&self) -> Result<Vec<HotDogEntry>, PerrosError> {
        let request = self.request(
            Method::GET,
            "/rest/v1/reports?select=*&order=created_at.desc",
        );
        let response = Self::send(request, "listing reports").await?;
        let rows: Vec<ReportRow> = Self::parse(response, "listing reports").await?;
        debug!(count = rows.len(), "Fetched reports");
        Ok(rows.into_iter().map(HotDogEntry::from).collect())
    }

    #[instrument(name = "CreateReport", skip(self, report), fields(business = %report.business_name))]
    async fn create_report(&self, report: NewReport) -> Result<HotDogEntry, PerrosError> {
        let photo_url = match report.photo {
            Some(photo) => Some(self.upload_photo(photo).await?),
            None => None,
        };

        let insert = ReportInsert {
            business_name: &report.business_name,
            price_bs: report.prices.price_bs,
            price_usdt: report.prices.price_usdt,
            price_bcv: report.prices.price_bcv,
            lat: report.location.lat,
            lng: report.location.lng,
            state: report.state.as_deref(),
            photo_url: photo_url.as_deref(),
        };
        let request = self
            .request(Method::POST, "/rest/v1/reports")
            .header("Prefer", "return=representation")
            .json(&insert);
        let response = Self::send(request, "creating report").await?;
        let rows: Vec<ReportRow> = Self::parse(response, "creating report").await?;
        rows.into_iter()
            .next()
            .map(HotDogEntry::from)
            .ok_or_else(|| PerrosError::Network("Insert returned no rows".into()))
    }

    #[instrument(name = "LatestRates", skip(self))]
    async fn latest_rates(&self) -> Result<Option<ExchangeRates>, PerrosError> {
        let request = self.request(
            Method::GET,
            "/rest/v1/exchange_rates?select=*&order=effective_date.desc&limit=1",
        );
        let response = Self::send(request, "fetching exchange rates").await?;
        let rows: Vec<RateRow> = Self::parse(response, "fetching exchange rates").await?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(
                ExchangeRates::new(row.bcv_rate, row.usdt_rate)?
                    .with_effective_date(row.effective_date),
            )),
            None => Ok(None),
        }
    }

    #[instrument(name = "NearbyReports", skip(self))]
    async fn nearby_reports(
        &self,
        center: Coordinates,
        radius_km: f64,
    ) -> Result<Vec<HotDogEntry>, PerrosError> {
        let args = NearbyArgs {
            user_lat: center.lat,
            user_lng: center.lng,
            radius_km,
        };
        let request = self
            .request(Method::POST, "/rest/v1/rpc/nearby_reports")
            .json(&args);
        let response = Self::send(request, "querying nearby reports").await?;
        let rows: Vec<ReportRow> = Self::parse(response, "querying nearby reports").await?;
        Ok(rows.into_iter().map(HotDogEntry::from).collect())
    }

    fn subscribe(self: Arc<Self>, poll_interval: Duration) -> ReportFeed {
        poll_changes(self, poll_interval)
    }
}
