use super::ui;
use crate::core::state::ClientState;
use crate::sync::SyncService;
use anyhow::Result;

/// One-line summary: national average with trend, local average when the
/// user location is known, and the report count.
pub fn render(state: &ClientState, radius_km: f64) -> String {
    let mut parts = vec![format!(
        "🌭 {} {} {}",
        ui::style_text("Nacional:", ui::StyleType::Label),
        ui::style_text(&ui::format_usd(state.national_average()), ui::StyleType::Price),
        state.price_trend()
    )];

    if let Some(local) = state.user_local_average(radius_km).filter(|avg| *avg > 0.0) {
        parts.push(format!(
            "📍 {} {}",
            ui::style_text("Tu zona:", ui::StyleType::Label),
            ui::style_text(&ui::format_usd(local), ui::StyleType::Price)
        ));
    }

    parts.push(format!(
        "{} {}",
        ui::style_text("Reportes:", ui::StyleType::Label),
        state.entries().len()
    ));

    let mut line = parts.join("  |  ");
    if state.using_fallback() {
        line.push_str(&format!(
            "  {}",
            ui::style_text("(datos de ejemplo)", ui::StyleType::Subtle)
        ));
    }
    line
}

pub async fn run(sync: &SyncService, radius_km: f64) -> Result<()> {
    let state = sync.state().lock().await;
    println!("{}", render(&state, radius_km));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Coordinates;
    use crate::core::rates::ExchangeRates;

    #[test]
    fn test_render_fallback_ticker() {
        console::set_colors_enabled(false);
        let mut state = ClientState::fallback(ExchangeRates::default());
        let line = render(&state, 50.0);
        assert!(line.contains("Nacional: $2.3"));
        assert!(line.contains("Reportes: 6"));
        assert!(line.contains("datos de ejemplo"));
        assert!(!line.contains("Tu zona"));

        state.set_user_location(Coordinates {
            lat: 10.48,
            lng: -66.90,
        });
        state.set_using_fallback(false);
        let line = render(&state, 50.0);
        // Caracas and Miranda samples: (2.50 + 2.00) / 2
        assert!(line.contains("Tu zona: $2.25"));
        assert!(!line.contains("datos de ejemplo"));
    }
}
