//! Core domain: reports, rates, geo math and the client state

pub mod aggregate;
pub mod backend;
pub mod config;
pub mod entry;
pub mod error;
pub mod fallback;
pub mod geo;
pub mod log;
pub mod price;
pub mod rates;
pub mod state;

// Re-export main types for cleaner imports
pub use backend::{FeedEvent, NewReport, PhotoUpload, ReportBackend, ReportFeed};
pub use entry::{HotDogEntry, ReportChange};
pub use error::PerrosError;
pub use geo::{Coordinates, haversine_km};
pub use price::{DerivedPrices, derive_prices};
pub use rates::{ExchangeRateStore, ExchangeRates};
pub use state::{ClientState, PersistedState, SharedState};
