//! `vayuwatch` - Air quality classification and demo accounts for Indian cities
//!
//! This library classifies AQI readings into the six national bands, serves a
//! reference dataset of states, cities and wards with derived statistics, and
//! implements a mock phone-number account store over pluggable key/value
//! storage.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod aqi;
pub mod auth;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod stats;
pub mod storage;

pub use aqi::{classify, Category, HealthAdvisory};
pub use auth::{Clock, CredentialStore, ManualClock, OtpGrant, SystemClock, User};
pub use config::Config;
pub use dataset::{AqiReading, City, Dataset, State, Ward};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use stats::{national_stats, NationalStats};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
