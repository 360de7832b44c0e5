pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod scrapers;
pub mod storage;
pub mod tracker;

pub use config::AppConfig;
pub use error::TrackerError;
pub use models::{AverageSalary, NormalizedOffer, PortalId, SourceBundle};
pub use storage::OfferStore;
pub use tracker::{today, PortalSummary, Tracker};
