use super::ui;
use crate::core::entry::HotDogEntry;
use crate::sync::SyncService;
use anyhow::Result;
use chrono::{DateTime, Local};
use comfy_table::Cell;

fn format_created_at(created_at: &str) -> String {
    DateTime::parse_from_rfc3339(created_at)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| created_at.to_string())
}

/// Table of reports in the given order.
pub fn render_table<'a>(entries: impl IntoIterator<Item = &'a HotDogEntry>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Negocio"),
        ui::header_cell("Estado"),
        ui::header_cell("USDT"),
        ui::header_cell("Bs"),
        ui::header_cell("BCV"),
        ui::header_cell("Fecha"),
    ]);

    for entry in entries {
        table.add_row(vec![
            Cell::new(&entry.business_name),
            Cell::new(entry.state.as_deref().unwrap_or("-")),
            ui::price_cell(entry.price),
            ui::format_optional_cell(entry.price_bs, |v| format!("{v:.2}")),
            ui::format_optional_cell(entry.price_bcv, ui::format_usd),
            Cell::new(format_created_at(&entry.created_at)),
        ]);
    }
    table.to_string()
}

pub async fn run(sync: &SyncService, limit: Option<usize>) -> Result<()> {
    let state = sync.state().lock().await;
    let entries = state.entries();
    let shown = limit.unwrap_or(entries.len()).min(entries.len());

    println!("{}", ui::style_text("Reportes", ui::StyleType::Title));
    println!("{}", render_table(&entries[..shown]));
    if shown < entries.len() {
        println!(
            "{}",
            ui::style_text(
                &format!("... {} más", entries.len() - shown),
                ui::StyleType::Subtle
            )
        );
    }
    Ok(())
}
