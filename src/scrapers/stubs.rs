use crate::models::{PortalId, SourceBundle};
use crate::scrapers::traits::{JobPortal, KnownOffers};
use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

/// Registered portal without a scraper yet (BullDogJob, SolidJobs).
/// It never yields offers, so the tracker leaves it out of the day's result.
pub struct StubPortal {
    id: PortalId,
    home_url: &'static str,
}

impl StubPortal {
    pub fn bulldogjob() -> Self {
        Self {
            id: PortalId::BullDogJob,
            home_url: "https://bulldogjob.pl/",
        }
    }

    pub fn solidjobs() -> Self {
        Self {
            id: PortalId::SolidJobs,
            home_url: "https://solid.jobs/offers/it",
        }
    }
}

#[async_trait]
impl JobPortal for StubPortal {
    async fn load_offers(&self, _known: &KnownOffers) -> Result<Vec<SourceBundle>> {
        warn!("[{}] Scraping {} is not implemented yet", self.id, self.home_url);
        Ok(Vec::new())
    }

    fn portal_id(&self) -> PortalId {
        self.id
    }
}
