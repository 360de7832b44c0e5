use job_offer_tracker::{today, AppConfig, OfferStore, Tracker};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("💼 Job Offer Tracker");
    info!("====================");

    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path)?;
    info!(
        "Loaded {} (portals: {})",
        config_path.display(),
        config
            .enabled_portals
            .iter()
            .map(|portal| portal.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let output_file = config.output_file.clone();
    let mut store = OfferStore::load(&output_file).await?;

    let date = today();
    let tracker = Tracker::new(config)?;
    let summaries = tracker.run(&mut store, &date).await?;

    for summary in &summaries {
        info!(
            "{}: {} offers across {} sources",
            summary.portal, summary.offers, summary.sources
        );
    }

    store.save(&output_file).await?;
    info!("💾 Saved offers for {} to {}", date, output_file.display());

    Ok(())
}
