use super::ui;
use crate::core::state::ClientState;
use crate::store::LocalStore;
use crate::sync::SyncService;
use anyhow::Result;

pub fn render(state: &ClientState) -> String {
    let rates = state.exchange_rates();
    [
        ui::style_text("Índice Perro: cómo leer los precios", ui::StyleType::Title),
        String::new(),
        "Los precios son reportados por la comunidad y no están verificados.".to_string(),
        format!(
            "USDT (mercado): {:.2} Bs por dólar. Es el precio principal.",
            rates.usdt()
        ),
        format!("BCV (oficial): {:.2} Bs por dólar.", rates.bcv()),
        "Los promedios usan siempre el precio en USDT.".to_string(),
    ]
    .join("\n")
}

/// Shows the disclaimer and remembers that it was seen.
pub async fn run(sync: &SyncService, store: &dyn LocalStore) -> Result<()> {
    let text = render(&*sync.state().lock().await);
    println!("{text}");
    store.mark_disclaimer_seen()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::ExchangeRates;
    use crate::store::MemoryStore;

    #[test]
    fn test_render_mentions_rates() {
        let state = ClientState::fallback(ExchangeRates::default());
        let text = render(&state);
        assert!(text.contains("53.20"));
        assert!(text.contains("45.50"));
    }

    #[tokio::test]
    async fn test_run_marks_seen() {
        let state = ClientState::fallback(ExchangeRates::default()).into_shared();
        let sync = SyncService::new(state, None);
        let store = MemoryStore::new();
        run(&sync, &store).await.unwrap();
        assert!(store.disclaimer_seen().unwrap());
    }
}
