use super::{ticker, ui};
use crate::core::entry::ReportChange;
use crate::sync::SyncService;
use anyhow::Result;
use std::time::Duration;
use tracing::debug;

fn describe(change: &ReportChange) -> String {
    match change {
        ReportChange::Insert(entry) => format!(
            "+ {} {}",
            entry.business_name,
            ui::format_usd(entry.price)
        ),
        ReportChange::Update(entry) => format!(
            "~ {} {}",
            entry.business_name,
            ui::format_usd(entry.price)
        ),
        ReportChange::Delete { id } => format!("- {id}"),
    }
}

/// Follows report changes and keeps rates fresh until Ctrl-C.
pub async fn run(sync: &SyncService, radius_km: f64, rates_refresh: Duration) -> Result<()> {
    let Some(mut subscription) = sync.subscribe() else {
        println!(
            "{}",
            ui::style_text(
                "Sin servidor configurado: no hay actualizaciones en vivo",
                ui::StyleType::Error
            )
        );
        return Ok(());
    };
    let _rates_task = sync.spawn_rate_refresh(rates_refresh);

    println!("{}", ticker::render(&*sync.state().lock().await, radius_km));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted, stopping watch");
                break;
            }
            change = subscription.next_applied() => {
                let Some(change) = change else { break };
                let line = ticker::render(&*sync.state().lock().await, radius_km);
                println!("{}\n{}", ui::style_text(&describe(&change), ui::StyleType::Subtle), line);
            }
        }
    }
    subscription.unsubscribe();
    Ok(())
}
