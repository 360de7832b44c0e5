use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use crate::config::AppConfig;
use crate::http::HttpClient;
use crate::models::PortalId;
use crate::scrapers::build_portal;
use crate::storage::{OfferStore, DATE_FORMAT};

/// Today's key in the results file, e.g. "16.10.2026"
pub fn today() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

/// Outcome of one portal during a run
#[derive(Debug, Clone, PartialEq)]
pub struct PortalSummary {
    pub portal: PortalId,
    pub sources: usize,
    pub offers: usize,
}

/// Runs every enabled portal and merges its offers into the store
pub struct Tracker {
    config: AppConfig,
    http: HttpClient,
}

impl Tracker {
    pub fn new(config: AppConfig) -> Result<Self> {
        let http = HttpClient::new(&config.http)?;
        Ok(Self { config, http })
    }

    /// Scrape the enabled portals in order and store their offers under `date`.
    ///
    /// Any portal failure aborts the run before anything is written; the caller
    /// saves the store only on success. Portals returning nothing are skipped.
    pub async fn run(&self, store: &mut OfferStore, date: &str) -> Result<Vec<PortalSummary>> {
        store.ensure_day(date);
        let mut summaries = Vec::new();

        for &enabled in &self.config.enabled_portals {
            let portal = build_portal(enabled, &self.config, self.http.clone())?;
            let id = portal.portal_id();
            let known = store.known_offer_ids(id, date);

            info!("🔎 Searching {}...", id);
            let bundles = portal
                .load_offers(&known)
                .await
                .with_context(|| format!("Failed to load offers from {}", id))?;

            if bundles.is_empty() {
                info!("Did not receive any content from {}", id);
            } else {
                let offers = bundles.iter().map(|bundle| bundle.offers.len()).sum();
                store.set_portal(date, id, &bundles)?;
                summaries.push(PortalSummary {
                    portal: id,
                    sources: bundles.len(),
                    offers,
                });
            }
            info!("Done searching {}", id);
        }

        Ok(summaries)
    }
}
