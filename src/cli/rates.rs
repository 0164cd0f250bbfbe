use super::ui;
use crate::core::rates::ExchangeRateStore;
use crate::sync::SyncService;
use anyhow::Result;
use comfy_table::Cell;

pub fn render(rates: &ExchangeRateStore) -> String {
    let current = rates.current();
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Tasa"), ui::header_cell("Bs por USD")]);
    table.add_row(vec![
        Cell::new("BCV (oficial)"),
        Cell::new(format!("{:.2}", current.bcv())),
    ]);
    table.add_row(vec![
        Cell::new("USDT (mercado)"),
        Cell::new(format!("{:.2}", current.usdt())),
    ]);
    table.add_row(vec![
        Cell::new("Brecha"),
        Cell::new(format!("{:.1}%", current.spread_pct())),
    ]);

    let source = match (rates.is_fallback(), current.effective_date()) {
        (true, _) => "Tasas por defecto".to_string(),
        (false, Some(date)) => format!("Vigentes desde {date}"),
        (false, None) => "Tasas actualizadas".to_string(),
    };
    format!(
        "{}\n{}",
        table,
        ui::style_text(&source, ui::StyleType::Subtle)
    )
}

pub async fn run(sync: &SyncService) -> Result<()> {
    let state = sync.state().lock().await;
    println!("{}", render(state.rate_store()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::ExchangeRates;

    #[test]
    fn test_render_rates() {
        console::set_colors_enabled(false);
        let mut store = ExchangeRateStore::default();
        let fallback = render(&store);
        assert!(fallback.contains("45.50"));
        assert!(fallback.contains("53.20"));
        assert!(fallback.contains("Tasas por defecto"));

        store.replace(
            ExchangeRates::new(50.0, 60.0)
                .unwrap()
                .with_effective_date("2025-01-15"),
        );
        let live = render(&store);
        assert!(live.contains("20.0%"));
        assert!(live.contains("Vigentes desde 2025-01-15"));
    }
}
