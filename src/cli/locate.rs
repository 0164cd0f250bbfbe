use crate::core::geo::Coordinates;
use crate::sync::SyncService;
use anyhow::Result;
use tracing::info;

/// Records the user's position for local averages.
pub async fn run(sync: &SyncService, lat: f64, lng: f64) -> Result<()> {
    let location = Coordinates::new(lat, lng)?;
    sync.set_user_location(location).await;
    info!(lat, lng, "User location updated");
    println!("Ubicación guardada: {lat:.4}, {lng:.4}");
    Ok(())
}
