use super::{list, ui};
use crate::core::aggregate::national_average;
use crate::core::geo::Coordinates;
use crate::sync::SyncService;
use anyhow::Result;

pub async fn run(sync: &SyncService, lat: f64, lng: f64, radius_km: f64) -> Result<()> {
    let center = Coordinates::new(lat, lng)?;
    let entries = sync.nearby(center, radius_km).await;

    println!(
        "{}",
        ui::style_text(
            &format!("Reportes a {radius_km:.0} km de ({lat:.4}, {lng:.4})"),
            ui::StyleType::Title
        )
    );
    if entries.is_empty() {
        println!("{}", ui::style_text("Sin reportes cerca", ui::StyleType::Subtle));
        return Ok(());
    }
    println!("{}", list::render_table(&entries));
    // The set is already radius-filtered, so its plain mean is the local average.
    println!(
        "{} {}",
        ui::style_text("Promedio local:", ui::StyleType::Label),
        ui::style_text(&ui::format_usd(national_average(&entries)), ui::StyleType::Price)
    );
    Ok(())
}
