//! Static geographic air quality data.
//!
//! The dataset is a fixed hierarchy of states, cities and wards with their
//! latest AQI and pollutant readings. A node's category is always derived from
//! its AQI through [`classify`]; it is never stored.

mod trend;

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aqi::{classify, Category};
use crate::error::{Error, Result};

pub use trend::{hourly_trend, weekly_trend, TrendPoint, DEFAULT_TREND_BASE};

/// The India dataset compiled into the binary.
const BUILTIN_DATASET: &str = include_str!("../../data/india.json");

/// Anything that carries an AQI reading.
pub trait AqiReading {
    /// The current AQI value.
    fn aqi(&self) -> u32;

    /// The category derived from [`AqiReading::aqi`].
    fn category(&self) -> Category {
        classify(f64::from(self.aqi()))
    }
}

/// Pollutant concentrations.
///
/// Particulates and gases are in µg/m³, CO in mg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pollutants {
    /// Fine particulate matter.
    pub pm25: f64,
    /// Coarse particulate matter.
    pub pm10: f64,
    /// Nitrogen dioxide.
    pub no2: f64,
    /// Sulphur dioxide.
    pub so2: f64,
    /// Carbon monoxide.
    pub co: f64,
    /// Ozone.
    pub o3: f64,
    /// Ammonia.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nh3: Option<f64>,
    /// Lead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pb: Option<f64>,
}

impl Pollutants {
    /// Named readings in display order, skipping absent optional ones.
    #[must_use]
    pub fn readings(&self) -> Vec<(&'static str, f64)> {
        let mut readings = vec![
            ("PM2.5", self.pm25),
            ("PM10", self.pm10),
            ("NO2", self.no2),
            ("SO2", self.so2),
            ("CO", self.co),
            ("O3", self.o3),
        ];
        if let Some(nh3) = self.nh3 {
            readings.push(("NH3", nh3));
        }
        if let Some(pb) = self.pb {
            readings.push(("Pb", pb));
        }
        readings
    }
}

/// A point on the map, serialized as `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    /// Degrees east.
    pub longitude: f64,
    /// Degrees north.
    pub latitude: f64,
}

impl From<[f64; 2]> for Coordinates {
    fn from([longitude, latitude]: [f64; 2]) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.longitude, c.latitude]
    }
}

/// A ward within a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ward {
    /// Unique ward id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Current AQI.
    pub aqi: u32,
    /// Current pollutant readings.
    pub pollutants: Pollutants,
    /// Resident population.
    pub population: u64,
    /// Area in square kilometres.
    pub area: f64,
    /// Largest contributing pollution source.
    pub dominant_source: String,
    /// Ward centroid.
    pub coordinates: Coordinates,
}

/// A city with its wards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    /// Unique city id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display name of the containing state.
    pub state: String,
    /// Current AQI.
    pub aqi: u32,
    /// Current pollutant readings.
    pub pollutants: Pollutants,
    /// Resident population.
    pub population: u64,
    /// Wards in display order.
    pub wards: Vec<Ward>,
    /// City centre.
    pub coordinates: Coordinates,
    /// Number of monitoring stations.
    pub station_count: u32,
    /// When the readings were last refreshed.
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

/// A state with its cities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    /// Unique state id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Two letter state code.
    pub code: String,
    /// Current AQI.
    pub aqi: u32,
    /// Cities in display order.
    pub cities: Vec<City>,
    /// State centre.
    pub coordinates: Coordinates,
    /// Resident population.
    pub population: u64,
}

impl AqiReading for Ward {
    fn aqi(&self) -> u32 {
        self.aqi
    }
}

impl AqiReading for City {
    fn aqi(&self) -> u32 {
        self.aqi
    }
}

impl AqiReading for State {
    fn aqi(&self) -> u32 {
        self.aqi
    }
}

/// A ward together with the city and state that contain it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WardContext<'a> {
    /// The ward itself.
    pub ward: &'a Ward,
    /// Its city.
    pub city: &'a City,
    /// Its state.
    pub state: &'a State,
}

/// Share of pollution attributed to a source category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceShare {
    /// Source id.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Percentage of total emissions.
    pub percentage: u8,
}

/// National source apportionment used by the source breakdown chart.
const POLLUTION_SOURCES: [SourceShare; 6] = [
    SourceShare { id: "vehicular", name: "Vehicular Emissions", percentage: 28 },
    SourceShare { id: "industrial", name: "Industrial", percentage: 24 },
    SourceShare { id: "construction", name: "Construction Dust", percentage: 18 },
    SourceShare { id: "waste", name: "Waste Burning", percentage: 12 },
    SourceShare { id: "stubble", name: "Stubble Burning", percentage: 10 },
    SourceShare { id: "domestic", name: "Domestic", percentage: 8 },
];

/// Static source apportionment table.
#[must_use]
pub fn pollution_sources() -> &'static [SourceShare] {
    &POLLUTION_SOURCES
}

/// The full state → city → ward hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    states: Vec<State>,
}

impl Dataset {
    /// Build a dataset from states, validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if ids are duplicated or readings are negative.
    pub fn new(states: Vec<State>) -> Result<Self> {
        let dataset = Self { states };
        dataset.validate()?;
        Ok(dataset)
    }

    /// The India dataset shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded data fails to parse or validate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_DATASET)
    }

    /// Parse a dataset from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the data is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let states: Vec<State> = serde_json::from_str(json)?;
        Self::new(states)
    }

    /// Load a dataset from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading dataset from {}", path.display());
        let json = std::fs::read_to_string(path).map_err(|e| Error::DatasetLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let dataset = Self::from_json(&json).map_err(|e| Error::DatasetLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        info!(
            "Loaded dataset with {} states from {}",
            dataset.states.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Load from `path` when given, otherwise use the builtin dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected dataset cannot be loaded.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let mut check_id = |kind: &str, id: &str| {
            if seen.insert(format!("{kind}:{id}")) {
                Ok(())
            } else {
                Err(Error::DatasetInvalid {
                    message: format!("duplicate {kind} id: {id}"),
                })
            }
        };

        for state in &self.states {
            check_id("state", &state.id)?;
            for city in &state.cities {
                check_id("city", &city.id)?;
                check_pollutants(&city.id, &city.pollutants)?;
                for ward in &city.wards {
                    check_id("ward", &ward.id)?;
                    check_pollutants(&ward.id, &ward.pollutants)?;
                }
            }
        }
        Ok(())
    }

    /// All states in display order.
    #[must_use]
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Every city across all states, in state order then city order.
    #[must_use]
    pub fn all_cities(&self) -> Vec<&City> {
        self.states.iter().flat_map(|s| s.cities.iter()).collect()
    }

    /// The `limit` cities with the highest AQI, most polluted first.
    ///
    /// Cities with equal AQI keep their dataset order.
    #[must_use]
    pub fn top_polluted(&self, limit: usize) -> Vec<&City> {
        let mut cities = self.all_cities();
        rank_by_aqi(&mut cities, limit);
        cities
    }

    /// Cities of one state, or of all states, optionally ranked.
    ///
    /// The state filter applies first; with a `limit`, the remaining cities
    /// are ranked by AQI (ties in dataset order) and truncated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownEntity`] if `state_id` does not resolve.
    pub fn select_cities(
        &self,
        state_id: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<&City>> {
        let mut cities: Vec<&City> = match state_id {
            Some(id) => self
                .state(id)
                .ok_or_else(|| Error::unknown_entity("state", id))?
                .cities
                .iter()
                .collect(),
            None => self.all_cities(),
        };
        if let Some(limit) = limit {
            rank_by_aqi(&mut cities, limit);
        }
        Ok(cities)
    }

    /// Look up a state by id.
    #[must_use]
    pub fn state(&self, id: &str) -> Option<&State> {
        self.states.iter().find(|s| s.id == id)
    }

    /// Look up a city by id.
    #[must_use]
    pub fn city(&self, id: &str) -> Option<&City> {
        self.states
            .iter()
            .flat_map(|s| s.cities.iter())
            .find(|c| c.id == id)
    }

    /// Look up a ward by id along with its city and state.
    #[must_use]
    pub fn ward(&self, id: &str) -> Option<WardContext<'_>> {
        for state in &self.states {
            for city in &state.cities {
                if let Some(ward) = city.wards.iter().find(|w| w.id == id) {
                    return Some(WardContext { ward, city, state });
                }
            }
        }
        None
    }

    /// Mock 24 hour trend for a city, or around [`DEFAULT_TREND_BASE`] if unknown.
    pub fn hourly_trend<R: Rng + ?Sized>(&self, city_id: &str, rng: &mut R) -> Vec<TrendPoint> {
        hourly_trend(self.trend_base(city_id), rng)
    }

    /// Mock 7 day trend for a city, or around [`DEFAULT_TREND_BASE`] if unknown.
    pub fn weekly_trend<R: Rng + ?Sized>(&self, city_id: &str, rng: &mut R) -> Vec<TrendPoint> {
        weekly_trend(self.trend_base(city_id), rng)
    }

    fn trend_base(&self, city_id: &str) -> u32 {
        self.city(city_id).map_or(DEFAULT_TREND_BASE, |c| c.aqi)
    }
}

fn rank_by_aqi(cities: &mut Vec<&City>, limit: usize) {
    cities.sort_by(|a, b| b.aqi.cmp(&a.aqi));
    cities.truncate(limit);
}

fn check_pollutants(owner: &str, pollutants: &Pollutants) -> Result<()> {
    if let Some((name, value)) = pollutants
        .readings()
        .into_iter()
        .find(|(_, v)| *v < 0.0 || !v.is_finite())
    {
        return Err(Error::DatasetInvalid {
            message: format!("{owner}: {name} reading {value} is not a non-negative number"),
        });
    }
    Ok(())
}
