use crate::http::HttpClient;
use crate::models::{AverageSalary, NormalizedOffer, PortalId, SourceBundle};
use crate::scrapers::traits::{JobPortal, KnownOffers};
use crate::scrapers::types::{NoFluffJobsConfig, Source};
use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};

static OFFER_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"pl/job[^"]*"#).expect("offer link regex"));
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+(?:-\w+)+").expect("slug regex"));
static B2B_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"b2b:\{[^}]+\}").expect("b2b regex"));
static PERMANENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"permanent:\{[^}]+\}").expect("permanent regex"));
static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"range:\[([^\]]+)\]").expect("range regex"));
static PERIOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"period:([A-Za-z]+)").expect("period regex"));
static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"currency:([A-Za-z]+)").expect("currency regex"));

/// Quote entity used by the embedded page state
const QUOTE_ENTITY: &str = "&q;";
const MONTHS_PER_YEAR: f64 = 12.0;

/// Salary range of one employment kind, already converted to monthly figures
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryRange {
    pub bounds: Vec<f64>,
    pub currency: String,
}

impl SalaryRange {
    /// "12000-18000 PLN"
    pub fn describe(&self) -> String {
        let bounds: Vec<String> = self
            .bounds
            .iter()
            .map(|bound| format!("{}", *bound as i64))
            .collect();
        format!("{} {}", bounds.join("-"), self.currency)
    }

    pub fn average(&self) -> Option<AverageSalary> {
        AverageSalary::of(&self.bounds)
    }
}

/// Salary details of an offer, keyed by employment kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmploymentInfo {
    pub employment_types: BTreeMap<String, String>,
    pub avg_salary: BTreeMap<String, AverageSalary>,
}

/// Relative offer links (`pl/job/...`) found on a listing page
pub fn extract_offer_links(listing: &str) -> Vec<&str> {
    OFFER_LINK_RE.find_iter(listing).map(|m| m.as_str()).collect()
}

/// Split an offer link into `(id, job_name)`.
///
/// The job name is the hyphenated slug of the link and the id is its last segment.
pub fn parse_offer_link(link: &str) -> Option<(String, String)> {
    let slug = SLUG_RE.find(link)?.as_str();
    let id = slug.rsplit('-').next()?;
    Some((id.to_string(), slug.to_string()))
}

/// Pull the b2b and permanent salary ranges out of an offer detail page
pub fn parse_employment_info(page: &str) -> EmploymentInfo {
    let page = page.replace(QUOTE_ENTITY, "");
    let mut info = EmploymentInfo::default();

    for (kind, block_re) in [("b2b", &*B2B_RE), ("permanent", &*PERMANENT_RE)] {
        if let Some(salary) = find_salary(block_re, &page) {
            if let Some(avg) = salary.average() {
                info.avg_salary.insert(kind.to_string(), avg);
            }
            info.employment_types.insert(kind.to_string(), salary.describe());
        }
    }

    info
}

fn find_salary(block_re: &Regex, page: &str) -> Option<SalaryRange> {
    let page_currency = CURRENCY_RE
        .captures(page)
        .map(|caps| caps[1].to_uppercase());

    block_re.find_iter(page).find_map(|block| {
        let block = block.as_str();
        let raw_range = RANGE_RE.captures(block)?;
        let bounds = raw_range[1]
            .split(',')
            .map(|bound| bound.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .ok()?;
        if bounds.is_empty() {
            return None;
        }

        let currency = CURRENCY_RE
            .captures(block)
            .map(|caps| caps[1].to_uppercase())
            .or_else(|| page_currency.clone())?;

        // Anything other than a monthly figure is treated as annual
        let monthly = PERIOD_RE
            .captures(block)
            .map_or(true, |caps| &caps[1] == "Month");
        let bounds = bounds
            .into_iter()
            .map(|bound| {
                if monthly {
                    bound.trunc()
                } else {
                    (bound / MONTHS_PER_YEAR).floor()
                }
            })
            .collect();

        Some(SalaryRange { bounds, currency })
    })
}

/// NoFluffJobs scraper: paginated HTML listings plus one detail page per offer
pub struct NoFluffJobs {
    http: HttpClient,
    config: NoFluffJobsConfig,
}

impl NoFluffJobs {
    pub fn new(config: NoFluffJobsConfig, http: HttpClient) -> Self {
        Self { http, config }
    }

    /// Walk listing pages 1, 2, ... until one has no offer links.
    ///
    /// A source that yields no new offers produces no bundle.
    async fn load_source(
        &self,
        source: &Source,
        known: &KnownOffers,
    ) -> Result<Option<SourceBundle>> {
        let mut offers = Vec::new();
        let mut seen = HashSet::new();
        let mut page: u32 = 1;

        loop {
            if self.config.max_pages.is_some_and(|max| page > max) {
                info!("[NFJ] {}: stopping at page limit {}", source.label, page - 1);
                break;
            }

            let listing = self.http.get_text(&format!("{}{}", source.url, page)).await?;
            let links = extract_offer_links(&listing);
            if links.is_empty() {
                debug!("[NFJ] {}: page {} is empty", source.label, page);
                break;
            }
            debug!("[NFJ] {}: page {} has {} offer links", source.label, page, links.len());

            for link in links {
                let Some((id, job_name)) = parse_offer_link(link) else {
                    debug!("[NFJ] Skipping link without a slug: {}", link);
                    continue;
                };
                if !seen.insert(id.clone()) {
                    continue;
                }
                if self.config.skip_known_offers && known.contains(&id) {
                    debug!("[NFJ] Skipping already stored offer {}", id);
                    continue;
                }

                let url = format!("{}{}", self.config.base_url, link);
                let detail = self.http.get_text(&url).await?;
                let info = parse_employment_info(&detail);
                tokio::time::sleep(Duration::from_millis(self.config.detail_delay_ms)).await;

                offers.push(NormalizedOffer {
                    id,
                    job_name,
                    url,
                    employment_types: info.employment_types,
                    avg_salary: info.avg_salary,
                });
            }

            page += 1;
            tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms)).await;
        }

        if offers.is_empty() {
            info!("[NFJ] {}: no new offers", source.label);
            return Ok(None);
        }
        info!("[NFJ] {}: {} offers", source.label, offers.len());
        Ok(Some(SourceBundle::new(source.label.clone(), offers)))
    }
}

#[async_trait]
impl JobPortal for NoFluffJobs {
    async fn load_offers(&self, known: &KnownOffers) -> Result<Vec<SourceBundle>> {
        let mut bundles = Vec::with_capacity(self.config.data_sources.len());
        for source in &self.config.data_sources {
            if let Some(bundle) = self.load_source(source, known).await? {
                bundles.push(bundle);
            }
        }
        Ok(bundles)
    }

    fn portal_id(&self) -> PortalId {
        PortalId::NoFluffJobs
    }
}
