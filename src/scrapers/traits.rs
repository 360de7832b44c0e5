use crate::models::{PortalId, SourceBundle};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;

/// Offer ids already stored for a portal on earlier days
pub type KnownOffers = HashSet<String>;

/// Common trait for all job portals
#[async_trait]
pub trait JobPortal: Send + Sync {
    /// Fetch and normalize offers for every configured source of the portal
    async fn load_offers(&self, known: &KnownOffers) -> Result<Vec<SourceBundle>>;

    /// Identifier of the portal, used as its key in the output file
    fn portal_id(&self) -> PortalId;
}
