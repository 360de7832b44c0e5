use serde::{Deserialize, Deserializer, Serialize};

/// A labeled search on a portal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// Display name written to the output file
    pub label: String,
    /// Search URL; for NoFluffJobs the page number is appended to it
    pub url: String,
}

/// NoFluffJobs settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoFluffJobsConfig {
    /// Prefix joined with the relative offer links found on listing pages
    #[serde(default = "default_nfj_base_url")]
    pub base_url: String,
    /// Pause between listing pages
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    /// Pause after each offer detail page
    #[serde(default = "default_detail_delay_ms")]
    pub detail_delay_ms: u64,
    /// Upper bound on listing pages per source; unbounded when absent
    #[serde(default)]
    pub max_pages: Option<u32>,
    /// Drop offers already stored on an earlier day
    #[serde(default)]
    pub skip_known_offers: bool,
    pub data_sources: Vec<Source>,
}

/// JustJoinIT settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JustJoinItConfig {
    /// Bulk offers endpoint, fetched once per run
    #[serde(default = "default_jji_api_url")]
    pub api_url: String,
    /// Prefix for the public offer link
    #[serde(default = "default_jji_offers_url")]
    pub offers_url: String,
    #[serde(default)]
    pub skip_known_offers: bool,
    pub data_sources: Vec<JustJoinSource>,
}

/// A labeled JustJoinIT search, described by typed filters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JustJoinSource {
    pub label: String,
    /// Matching search page on justjoin.it, for humans only
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub filters: JustJoinFilters,
}

/// Filters applied in memory to the bulk JustJoinIT listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JustJoinFilters {
    /// Offer categories (`marker_icon`), any of which is accepted
    #[serde(default)]
    pub categories: Vec<String>,
    /// Skills that must all be present on the offer
    #[serde(default)]
    pub skills: Vec<String>,
    /// b2b, permanent, mandate_contract, ...
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub remote_only: bool,
    /// Reject offers with any undisclosed salary
    #[serde(default)]
    pub disclosed_salary: bool,
    /// junior, mid or senior
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub min_salary: Option<SalaryThreshold>,
}

/// Minimum salary, written either as a number or in the "20k" shorthand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SalaryThreshold(pub u64);

impl SalaryThreshold {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_lowercase();
        match raw.strip_suffix('k') {
            Some(thousands) => thousands.trim().parse::<u64>().ok().map(|k| Self(k * 1000)),
            None => raw.parse::<u64>().ok().map(Self),
        }
    }
}

impl<'de> Deserialize<'de> for SalaryThreshold {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self(n)),
            Raw::Text(text) => Self::parse(&text).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid salary threshold: {text:?}"))
            }),
        }
    }
}

fn default_nfj_base_url() -> String {
    "https://nofluffjobs.com/".to_string()
}

fn default_jji_api_url() -> String {
    "https://justjoin.it/api/offers/".to_string()
}

fn default_jji_offers_url() -> String {
    "https://justjoin.it/offers/".to_string()
}

fn default_request_delay_ms() -> u64 {
    200
}

fn default_detail_delay_ms() -> u64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salary_threshold_shorthand() {
        assert_eq!(SalaryThreshold::parse("20k"), Some(SalaryThreshold(20_000)));
        assert_eq!(SalaryThreshold::parse("15000"), Some(SalaryThreshold(15_000)));
        assert_eq!(SalaryThreshold::parse(" 7K "), Some(SalaryThreshold(7_000)));
        assert_eq!(SalaryThreshold::parse("lots"), None);
    }

    #[test]
    fn test_filters_deserialize_with_defaults() {
        let filters: JustJoinFilters = serde_yaml::from_str(
            "categories: [devops]\nmin_salary: 20k\n",
        )
        .unwrap();
        assert_eq!(filters.categories, vec!["devops"]);
        assert!(filters.skills.is_empty());
        assert!(!filters.remote_only);
        assert_eq!(filters.min_salary, Some(SalaryThreshold(20_000)));

        let numeric: JustJoinFilters = serde_yaml::from_str("min_salary: 18000\n").unwrap();
        assert_eq!(numeric.min_salary, Some(SalaryThreshold(18_000)));

        assert!(serde_yaml::from_str::<JustJoinFilters>("min_salary: plenty\n").is_err());
    }
}
