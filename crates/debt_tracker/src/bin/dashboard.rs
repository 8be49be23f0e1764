use std::env;
use std::sync::Arc;

use ai_client::{GeminiClient, GeminiClientConfig};
use debt_store::SupabaseStore;
use debt_tracker::DebtTracker;
use models::DebtStatus;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debt_tracker=info,debt_store=info".into()),
        )
        .init();

    // Settings come from a file or, when it does not exist, from env vars
    let settings_path = env::var("DEBT_SETTINGS").unwrap_or_else(|_| "settings.json".to_string());
    let settings = settings_loader::resolve(&settings_path)?;

    let store = Arc::new(SupabaseStore::new(&settings.supabase)?);
    let mut tracker = DebtTracker::new(store);
    tracker.refresh().await?;

    let stats = tracker.stats();
    println!("Divida total : R$ {:.2}", stats.total_debt);
    println!("Total pago   : R$ {:.2}", stats.total_paid);
    println!("Pendencias   : {}", stats.pending_count);
    println!("Urgentes     : {}", stats.urgent_count);
    println!();

    for debt in tracker.records() {
        let due = debt
            .data_limite
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "sem vencimento".to_string());
        let situacao = match debt.situacao {
            DebtStatus::Open => "aberta",
            DebtStatus::Closed => "quitada",
        };
        println!(
            "[{situacao}] {} ({}): R$ {:.2}, vence {due}",
            debt.descricao, debt.credor, debt.valor
        );
    }

    if env::args().any(|a| a == "--analyze") {
        let model = GeminiClient::new(GeminiClientConfig::from_settings(&settings.gemini))?;
        println!("\n{}", tracker.analysis(&model).await);
    }

    Ok(())
}
