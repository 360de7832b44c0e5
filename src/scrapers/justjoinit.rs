use crate::http::HttpClient;
use crate::models::{AverageSalary, NormalizedOffer, PortalId, SourceBundle};
use crate::scrapers::traits::{JobPortal, KnownOffers};
use crate::scrapers::types::{JustJoinFilters, JustJoinItConfig, JustJoinSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Offer as returned by the bulk JustJoinIT endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RawOffer {
    pub id: String,
    pub title: String,
    /// Category of the offer (devops, java, ...)
    #[serde(default)]
    pub marker_icon: String,
    #[serde(default)]
    pub skills: Vec<RawSkill>,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub employment_types: Vec<RawEmploymentType>,
    #[serde(default)]
    pub experience_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSkill {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEmploymentType {
    #[serde(rename = "type")]
    pub kind: String,
    /// `null` when the employer did not disclose it
    pub salary: Option<RawSalary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSalary {
    pub from: f64,
    pub to: f64,
    pub currency: String,
}

impl RawSalary {
    fn describe(&self) -> String {
        format!(
            "{}-{} {}",
            format_amount(self.from),
            format_amount(self.to),
            self.currency.to_uppercase()
        )
    }
}

fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{}", amount as i64)
    } else {
        format!("{}", amount)
    }
}

/// Check an offer against every configured filter
pub fn matches_filters(filters: &JustJoinFilters, offer: &RawOffer) -> bool {
    if !filters.categories.is_empty()
        && !filters
            .categories
            .iter()
            .any(|category| category.eq_ignore_ascii_case(&offer.marker_icon))
    {
        return false;
    }

    let has_all_skills = filters.skills.iter().all(|wanted| {
        offer
            .skills
            .iter()
            .any(|skill| skill.name.eq_ignore_ascii_case(wanted))
    });
    if !has_all_skills {
        return false;
    }

    if filters.remote_only && !offer.remote {
        return false;
    }

    if let Some(wanted) = &filters.employment_type {
        if !offer
            .employment_types
            .iter()
            .any(|employment| employment.kind.eq_ignore_ascii_case(wanted))
        {
            return false;
        }
    }

    if filters.disclosed_salary
        && offer
            .employment_types
            .iter()
            .any(|employment| employment.salary.is_none())
    {
        return false;
    }

    if let Some(level) = &filters.experience_level {
        if !level.eq_ignore_ascii_case(&offer.experience_level) {
            return false;
        }
    }

    if let Some(threshold) = filters.min_salary {
        // At least one disclosed lower bound must beat the threshold
        let threshold = threshold.0 as f64;
        let above = offer
            .employment_types
            .iter()
            .filter_map(|employment| employment.salary.as_ref())
            .any(|salary| salary.from > threshold);
        if !above {
            return false;
        }
    }

    true
}

/// Reshape a matching offer; types without a disclosed salary are left out
pub fn normalize_offer(offer: &RawOffer, offers_url: &str) -> NormalizedOffer {
    let mut employment_types = BTreeMap::new();
    let mut avg_salary = BTreeMap::new();

    for employment in &offer.employment_types {
        let Some(salary) = &employment.salary else {
            continue;
        };
        employment_types.insert(employment.kind.clone(), salary.describe());
        if let Some(avg) = AverageSalary::of(&[salary.from, salary.to]) {
            avg_salary.insert(employment.kind.clone(), avg);
        }
    }

    NormalizedOffer {
        id: offer.id.clone(),
        job_name: offer.title.clone(),
        url: format!("{}{}", offers_url, offer.id),
        employment_types,
        avg_salary,
    }
}

/// JustJoinIT scraper: one bulk JSON listing, filtered per source in memory
pub struct JustJoinIt {
    http: HttpClient,
    config: JustJoinItConfig,
}

impl JustJoinIt {
    pub fn new(config: JustJoinItConfig, http: HttpClient) -> Self {
        Self { http, config }
    }

    async fn fetch_listing(&self) -> Result<Vec<RawOffer>> {
        let body = self.http.get_text(&self.config.api_url).await?;
        let offers: Vec<RawOffer> =
            serde_json::from_str(&body).context("Failed to parse JustJoinIT offers JSON")?;
        debug!("[JJI] Listing has {} offers", offers.len());
        Ok(offers)
    }

    fn bundle_for(
        &self,
        source: &JustJoinSource,
        listing: &[RawOffer],
        known: &KnownOffers,
    ) -> SourceBundle {
        let offers: Vec<NormalizedOffer> = listing
            .iter()
            .filter(|offer| matches_filters(&source.filters, offer))
            .filter(|offer| !(self.config.skip_known_offers && known.contains(&offer.id)))
            .map(|offer| normalize_offer(offer, &self.config.offers_url))
            .collect();

        info!("[JJI] {}: {} offers", source.label, offers.len());
        SourceBundle::new(source.label.clone(), offers)
    }
}

#[async_trait]
impl JobPortal for JustJoinIt {
    async fn load_offers(&self, known: &KnownOffers) -> Result<Vec<SourceBundle>> {
        let listing = self.fetch_listing().await?;
        Ok(self
            .config
            .data_sources
            .iter()
            .map(|source| self.bundle_for(source, &listing, known))
            .collect())
    }

    fn portal_id(&self) -> PortalId {
        PortalId::JustJoinIt
    }
}
