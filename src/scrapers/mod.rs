pub mod justjoinit;
pub mod nofluffjobs;
pub mod stubs;
pub mod traits;
pub mod types;

pub use justjoinit::JustJoinIt;
pub use nofluffjobs::NoFluffJobs;
pub use stubs::StubPortal;
pub use traits::{JobPortal, KnownOffers};

use crate::config::AppConfig;
use crate::http::HttpClient;
use crate::models::PortalId;
use anyhow::{Context, Result};

/// Build the scraper for `id` from its section of the config
pub fn build_portal(
    id: PortalId,
    config: &AppConfig,
    http: HttpClient,
) -> Result<Box<dyn JobPortal>> {
    let portal: Box<dyn JobPortal> = match id {
        PortalId::NoFluffJobs => {
            let section = config.nfj.clone().context("Missing 'nfj' config section")?;
            Box::new(NoFluffJobs::new(section, http))
        }
        PortalId::JustJoinIt => {
            let section = config.jji.clone().context("Missing 'jji' config section")?;
            Box::new(JustJoinIt::new(section, http))
        }
        PortalId::BullDogJob => Box::new(StubPortal::bulldogjob()),
        PortalId::SolidJobs => Box::new(StubPortal::solidjobs()),
    };
    Ok(portal)
}
