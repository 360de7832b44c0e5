use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde_yaml::{Mapping, Value};
use std::cmp::Ordering;
use std::path::Path;
use tracing::{debug, info};

use crate::models::{PortalId, SourceBundle};
use crate::scrapers::KnownOffers;

/// Format of the top-level keys in the output file
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Cumulative results: date -> portal -> list of `{name, offers}` bundles.
///
/// Days are held as raw YAML so that earlier days are written back exactly as
/// they were read, whatever shape they had.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferStore {
    days: Mapping,
}

impl OfferStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the output file; a missing or empty file is an empty store
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let exists = tokio::fs::try_exists(path)
            .await
            .with_context(|| format!("Failed to check {}", path.display()))?;
        if !exists {
            info!("No previous results at {}, starting fresh", path.display());
            return Ok(Self::new());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid results file {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::new());
        }
        match serde_yaml::from_str::<Value>(content).context("Failed to parse results YAML")? {
            Value::Null => Ok(Self::new()),
            Value::Mapping(days) => Ok(Self { days }),
            other => bail!("Expected a mapping of dates, found {:?}", other),
        }
    }

    /// Create an empty entry for `date` unless one exists
    pub fn ensure_day(&mut self, date: &str) {
        let key = Value::String(date.to_string());
        let is_mapping = matches!(self.days.get(&key), Some(Value::Mapping(_)));
        if !is_mapping {
            self.days.insert(key, Value::Mapping(Mapping::new()));
        }
    }

    /// Replace `portal`'s bundles for `date`, leaving everything else untouched
    pub fn set_portal(
        &mut self,
        date: &str,
        portal: PortalId,
        bundles: &[SourceBundle],
    ) -> Result<()> {
        let value = serde_yaml::to_value(bundles).context("Failed to serialize offers")?;
        self.ensure_day(date);
        if let Some(Value::Mapping(day)) = self.days.get_mut(Value::String(date.to_string())) {
            day.insert(Value::String(portal.as_str().to_string()), value);
        }
        Ok(())
    }

    /// Raw entry of one day
    pub fn day(&self, date: &str) -> Option<&Value> {
        self.days.get(Value::String(date.to_string()))
    }

    /// Bundles stored for `portal` on `date`, if they have the current shape
    pub fn bundles(&self, date: &str, portal: PortalId) -> Option<Vec<SourceBundle>> {
        let raw = self.day(date)?.get(portal.as_str())?;
        serde_yaml::from_value(raw.clone()).ok()
    }

    /// Date keys in their current order
    pub fn dates(&self) -> Vec<String> {
        self.days
            .keys()
            .filter_map(|key| key.as_str().map(str::to_string))
            .collect()
    }

    /// Ids of offers stored for `portal` on any day other than `excluding_date`
    pub fn known_offer_ids(&self, portal: PortalId, excluding_date: &str) -> KnownOffers {
        let mut known = KnownOffers::new();

        for (date, day) in &self.days {
            if date.as_str() == Some(excluding_date) {
                continue;
            }
            let Some(Value::Sequence(bundles)) = day.get(portal.as_str()) else {
                continue;
            };
            for bundle in bundles {
                let Some(Value::Sequence(offers)) = bundle.get("offers") else {
                    continue;
                };
                for offer in offers {
                    match offer.get("id") {
                        Some(Value::String(id)) => {
                            known.insert(id.clone());
                        }
                        Some(Value::Number(id)) => {
                            known.insert(id.to_string());
                        }
                        _ => {}
                    }
                }
            }
        }

        debug!("{} offers already stored for {}", known.len(), portal);
        known
    }

    /// Order days newest first; keys that are not dates keep their order at the end
    pub fn sort_by_date(&mut self) {
        let mut days: Vec<(Value, Value)> = std::mem::take(&mut self.days).into_iter().collect();
        days.sort_by(|(a, _), (b, _)| match (parse_date(a), parse_date(b)) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        self.days = days.into_iter().collect();
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(&self.days).context("Failed to serialize results")
    }

    /// Sort and rewrite the whole file, creating its directory if needed
    pub async fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.sort_by_date();
        let yaml = self.to_yaml_string()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        tokio::fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

fn parse_date(key: &Value) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.as_str()?, DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AverageSalary, NormalizedOffer};
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn bundle(label: &str, ids: &[&str]) -> SourceBundle {
        let offers = ids
            .iter()
            .map(|id| NormalizedOffer {
                id: id.to_string(),
                job_name: format!("job {}", id),
                url: format!("https://justjoin.it/offers/{}", id),
                employment_types: BTreeMap::from([(
                    "b2b".to_string(),
                    "12000-18000 PLN".to_string(),
                )]),
                avg_salary: BTreeMap::from([("b2b".to_string(), AverageSalary(15000.0))]),
            })
            .collect();
        SourceBundle::new(label, offers)
    }

    #[tokio::test]
    async fn test_missing_and_empty_files_are_empty_stores() {
        let dir = tempdir().unwrap();
        let missing = OfferStore::load(dir.path().join("nope.yaml")).await.unwrap();
        assert!(missing.dates().is_empty());

        let empty_path = dir.path().join("empty.yaml");
        std::fs::write(&empty_path, "\n").unwrap();
        let empty = OfferStore::load(&empty_path).await.unwrap();
        assert!(empty.dates().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_path_is_an_error_not_a_fresh_store() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("job_offers.yaml");
        std::fs::write(&file, "16.10.2026: {}\n").unwrap();

        // A regular file used as a directory cannot be stat'ed
        let err = OfferStore::load(file.join("nested.yaml")).await.unwrap_err();
        assert!(format!("{err:#}").contains("Failed to check"));
    }

    #[test]
    fn test_non_mapping_file_is_rejected() {
        assert!(OfferStore::from_yaml_str("- a\n- b\n").is_err());
    }

    #[tokio::test]
    async fn test_later_run_keeps_earlier_day_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("offers").join("job_offers.yaml");

        let mut first = OfferStore::new();
        first
            .set_portal("15.10.2026", PortalId::JustJoinIt, &[bundle("DevOps", &["a1", "a2"])])
            .unwrap();
        first.save(&path).await.unwrap();
        let first_text = std::fs::read_to_string(&path).unwrap();

        let mut second = OfferStore::load(&path).await.unwrap();
        second
            .set_portal("16.10.2026", PortalId::NoFluffJobs, &[bundle("Rust", &["b1"])])
            .unwrap();
        second.save(&path).await.unwrap();
        let second_text = std::fs::read_to_string(&path).unwrap();

        let reloaded = OfferStore::load(&path).await.unwrap();
        assert_eq!(reloaded.dates(), vec!["16.10.2026", "15.10.2026"]);
        assert!(second_text.ends_with(&first_text));
        assert_eq!(
            reloaded.bundles("15.10.2026", PortalId::JustJoinIt).unwrap(),
            vec![bundle("DevOps", &["a1", "a2"])]
        );
    }

    #[test]
    fn test_set_portal_replaces_only_that_portal() {
        let mut store = OfferStore::new();
        store.set_portal("16.10.2026", PortalId::JustJoinIt, &[bundle("A", &["1"])]).unwrap();
        store.set_portal("16.10.2026", PortalId::NoFluffJobs, &[bundle("B", &["2"])]).unwrap();
        store.set_portal("16.10.2026", PortalId::JustJoinIt, &[bundle("C", &["3"])]).unwrap();

        assert_eq!(store.bundles("16.10.2026", PortalId::JustJoinIt).unwrap()[0].name, "C");
        assert_eq!(store.bundles("16.10.2026", PortalId::NoFluffJobs).unwrap()[0].name, "B");
    }

    #[test]
    fn test_sort_newest_first_with_unparseable_keys_last() {
        let mut store = OfferStore::from_yaml_str(
            "01.02.2026: {}\nnotes: {}\n28.12.2025: {}\n03.02.2026: {}\nzzz: {}\n",
        )
        .unwrap();
        store.sort_by_date();
        assert_eq!(
            store.dates(),
            vec!["03.02.2026", "01.02.2026", "28.12.2025", "notes", "zzz"]
        );
    }

    #[test]
    fn test_known_offer_ids_skip_the_current_day_and_other_portals() {
        let mut store = OfferStore::new();
        store
            .set_portal("14.10.2026", PortalId::NoFluffJobs, &[bundle("A", &["x1", "x2"])])
            .unwrap();
        store.set_portal("15.10.2026", PortalId::NoFluffJobs, &[bundle("A", &["x3"])]).unwrap();
        store.set_portal("15.10.2026", PortalId::JustJoinIt, &[bundle("B", &["j1"])]).unwrap();
        store.set_portal("16.10.2026", PortalId::NoFluffJobs, &[bundle("A", &["today"])]).unwrap();

        let known = store.known_offer_ids(PortalId::NoFluffJobs, "16.10.2026");
        let mut ids: Vec<_> = known.into_iter().collect();
        ids.sort();
        assert_eq!(ids, vec!["x1", "x2", "x3"]);
    }

    #[test]
    fn test_ensure_day_keeps_existing_content() {
        let mut store = OfferStore::new();
        store.set_portal("16.10.2026", PortalId::JustJoinIt, &[bundle("A", &["1"])]).unwrap();
        store.ensure_day("16.10.2026");
        assert!(store.bundles("16.10.2026", PortalId::JustJoinIt).is_some());
    }
}
