use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::TrackerError;

/// Job portal the offers were collected from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortalId {
    NoFluffJobs,
    JustJoinIt,
    BullDogJob,
    SolidJobs,
}

impl PortalId {
    /// Short identifier used in the config and as the key in the output file
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoFluffJobs => "nfj",
            Self::JustJoinIt => "jji",
            Self::BullDogJob => "bdj",
            Self::SolidJobs => "sj",
        }
    }
}

impl fmt::Display for PortalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortalId {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "nfj" => Ok(Self::NoFluffJobs),
            "jji" => Ok(Self::JustJoinIt),
            "bdj" => Ok(Self::BullDogJob),
            "sj" => Ok(Self::SolidJobs),
            other => Err(TrackerError::UnknownPortal(other.to_string())),
        }
    }
}

impl Serialize for PortalId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PortalId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Mean of a salary range, written as a whole number when it has no fraction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageSalary(pub f64);

impl AverageSalary {
    pub fn of(bounds: &[f64]) -> Option<Self> {
        if bounds.is_empty() {
            return None;
        }
        Some(Self(bounds.iter().sum::<f64>() / bounds.len() as f64))
    }
}

impl Serialize for AverageSalary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract() == 0.0 && self.0.abs() < i64::MAX as f64 {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for AverageSalary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Self)
    }
}

/// A single job offer after extraction and salary normalization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedOffer {
    pub id: String,
    pub job_name: String,
    pub url: String,
    /// Employment kind (b2b, permanent, ...) to "FROM-TO CURRENCY"
    #[serde(default)]
    pub employment_types: BTreeMap<String, String>,
    /// Employment kind to the mean of its monthly range
    #[serde(default)]
    pub avg_salary: BTreeMap<String, AverageSalary>,
}

/// Offers gathered for one labeled search of a portal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceBundle {
    pub name: String,
    pub offers: Vec<NormalizedOffer>,
}

impl SourceBundle {
    pub fn new(name: impl Into<String>, offers: Vec<NormalizedOffer>) -> Self {
        Self {
            name: name.into(),
            offers,
        }
    }
}
