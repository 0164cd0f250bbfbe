use super::ui;
use crate::core::backend::PhotoUpload;
use crate::core::error::PerrosError;
use crate::core::geo::Coordinates;
use crate::core::price::parse_price;
use crate::sync::{SubmitReport, SyncService};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SubmitArgs {
    pub name: String,
    pub price_bs: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub state: Option<String>,
    pub photo: Option<PathBuf>,
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

fn read_photo(path: &Path) -> Result<PhotoUpload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read photo: {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("photo")
        .to_string();
    Ok(PhotoUpload {
        file_name,
        content_type: content_type_for(path).to_string(),
        bytes,
    })
}

/// Turns command-line input into a report, without touching the network.
pub fn to_report(args: SubmitArgs) -> Result<SubmitReport> {
    let price_bs = parse_price(&args.price_bs)?;
    let location = match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)?),
        (None, None) => None,
        _ => {
            return Err(PerrosError::Validation(
                "latitude and longitude must be given together".into(),
            )
            .into());
        }
    };
    let photo = args.photo.as_deref().map(read_photo).transpose()?;

    Ok(SubmitReport {
        business_name: args.name,
        price_bs: Some(price_bs),
        location,
        state: args.state,
        photo,
    })
}

pub async fn run(sync: &SyncService, args: SubmitArgs) -> Result<()> {
    let report = to_report(args)?;
    let spinner = ui::new_spinner("Enviando reporte...");
    let result = sync.submit(report).await;
    spinner.finish_and_clear();

    let entry = result.context("No se pudo enviar el reporte")?;
    println!(
        "¡Precio reportado! 🌭 {} {} ({:.2} Bs, BCV {})",
        entry.business_name,
        ui::style_text(&ui::format_usd(entry.price), ui::StyleType::Price),
        entry.price_bs.unwrap_or_default(),
        entry.price_bcv.map_or("-".to_string(), ui::format_usd)
    );
    if !sync.is_configured() {
        println!(
            "{}",
            ui::style_text(
                "Guardado solo en este equipo (sin conexión al servidor)",
                ui::StyleType::Subtle
            )
        );
    }
    Ok(())
}
