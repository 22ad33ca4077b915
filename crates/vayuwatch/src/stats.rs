//! Aggregates over the dataset: national statistics and alerts.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aqi::{classify, round_aqi, Category};
use crate::dataset::{AqiReading, City, Dataset};

/// Nationwide summary of city readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NationalStats<'a> {
    /// Mean city AQI, rounded half-up.
    pub average_aqi: u32,
    /// Category of `average_aqi`.
    pub category: Category,
    /// Number of cities aggregated.
    pub total_cities: usize,
    /// Number of states in the dataset.
    pub total_states: usize,
    /// City count per category. Categories with no cities are absent.
    pub category_counts: BTreeMap<Category, usize>,
    /// Highest AQI city, first in dataset order on ties.
    pub worst_city: &'a City,
    /// Lowest AQI city, first in dataset order on ties.
    pub best_city: &'a City,
}

/// Compute national statistics. Returns `None` when there are no cities.
#[must_use]
pub fn national_stats(dataset: &Dataset) -> Option<NationalStats<'_>> {
    let cities = dataset.all_cities();
    let (&first, rest) = cities.split_first()?;

    let mut total: u64 = 0;
    let mut category_counts = BTreeMap::new();
    let mut worst = first;
    let mut best = first;

    for &city in &cities {
        total += u64::from(city.aqi);
        *category_counts.entry(city.category()).or_insert(0) += 1;
    }
    for &city in rest {
        if city.aqi > worst.aqi {
            worst = city;
        }
        if city.aqi < best.aqi {
            best = city;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let average_aqi = round_aqi(total as f64 / cities.len() as f64);

    Some(NationalStats {
        average_aqi,
        category: classify(f64::from(average_aqi)),
        total_cities: cities.len(),
        total_states: dataset.states().len(),
        category_counts,
        worst_city: worst,
        best_city: best,
    })
}

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Very poor or severe air.
    Severe,
    /// Poor air.
    Warning,
}

impl AlertLevel {
    /// Level raised by a category, if any.
    #[must_use]
    pub fn for_category(category: Category) -> Option<Self> {
        match category {
            Category::VeryPoor | Category::Severe => Some(Self::Severe),
            Category::Poor => Some(Self::Warning),
            Category::Good | Category::Satisfactory | Category::Moderate => None,
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Severe => write!(f, "severe"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// An air quality alert for one city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    /// City id.
    pub id: String,
    /// Alert severity.
    pub level: AlertLevel,
    /// Headline.
    pub title: String,
    /// One line explanation.
    pub description: String,
    /// `City, State`.
    pub location: String,
    /// City AQI.
    pub aqi: u32,
    /// City category.
    pub category: Category,
}

impl Alert {
    fn for_city(city: &City) -> Option<Self> {
        let category = city.category();
        let level = AlertLevel::for_category(category)?;
        let (title, description) = match level {
            AlertLevel::Severe => (
                format!("Severe Air Quality Alert - {}", city.name),
                format!(
                    "AQI has reached {}. Emergency measures recommended.",
                    city.aqi
                ),
            ),
            AlertLevel::Warning => (
                format!("Poor Air Quality Warning - {}", city.name),
                format!(
                    "AQI is {}. Sensitive groups should limit outdoor exposure.",
                    city.aqi
                ),
            ),
        };
        Some(Self {
            id: city.id.clone(),
            level,
            title,
            description,
            location: format!("{}, {}", city.name, city.state),
            aqi: city.aqi,
            category,
        })
    }
}

/// Alerts for every poor-or-worse city, highest AQI first.
#[must_use]
pub fn alerts(dataset: &Dataset) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = dataset
        .all_cities()
        .into_iter()
        .filter_map(Alert::for_city)
        .collect();
    alerts.sort_by(|a, b| b.aqi.cmp(&a.aqi));
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::State;

    fn city(id: &str, aqi: u32) -> City {
        serde_json::from_value(serde_json::json!({
            "id": id, "name": id.to_uppercase(), "state": "Test", "aqi": aqi,
            "pollutants": {"pm25": 1, "pm10": 1, "no2": 1, "so2": 1, "co": 1, "o3": 1},
            "population": 1, "coordinates": [0.0, 0.0], "stationCount": 1, "wards": []
        }))
        .unwrap()
    }

    fn dataset(aqis: &[(&str, u32)]) -> Dataset {
        let mut state: State = serde_json::from_value(serde_json::json!({
            "id": "test", "name": "Test", "code": "TS", "aqi": 0,
            "coordinates": [0.0, 0.0], "population": 1, "cities": []
        }))
        .unwrap();
        state.cities = aqis.iter().map(|(id, aqi)| city(id, *aqi)).collect();
        Dataset::new(vec![state]).unwrap()
    }

    #[test]
    fn test_three_city_stats() {
        let data = dataset(&[("a", 100), ("b", 300), ("c", 500)]);
        let stats = national_stats(&data).unwrap();

        assert_eq!(stats.average_aqi, 300);
        assert_eq!(stats.category, Category::Poor);
        assert_eq!(stats.worst_city.aqi, 500);
        assert_eq!(stats.best_city.aqi, 100);
        assert_eq!(stats.total_cities, 3);
        assert_eq!(stats.total_states, 1);
    }

    #[test]
    fn test_empty_dataset_has_no_stats() {
        let data = dataset(&[]);
        assert!(national_stats(&data).is_none());
    }

    #[test]
    fn test_ties_pick_first_encountered() {
        let data = dataset(&[("a", 200), ("b", 90), ("c", 200), ("d", 90)]);
        let stats = national_stats(&data).unwrap();
        assert_eq!(stats.worst_city.id, "a");
        assert_eq!(stats.best_city.id, "b");
    }

    #[test]
    fn test_average_rounds_half_up() {
        let data = dataset(&[("a", 100), ("b", 101)]);
        assert_eq!(national_stats(&data).unwrap().average_aqi, 101);
    }

    #[test]
    fn test_builtin_national_stats() {
        let data = Dataset::builtin().unwrap();
        let stats = national_stats(&data).unwrap();

        assert_eq!(stats.average_aqi, 192);
        assert_eq!(stats.category, Category::Moderate);
        assert_eq!(stats.total_cities, 10);
        assert_eq!(stats.total_states, 8);
        assert_eq!(stats.worst_city.id, "new-delhi");
        assert_eq!(stats.best_city.id, "chennai");
        assert_eq!(stats.category_counts.get(&Category::Moderate), Some(&6));
        assert_eq!(stats.category_counts.get(&Category::Poor), Some(&2));
        assert_eq!(stats.category_counts.get(&Category::VeryPoor), Some(&1));
        assert_eq!(stats.category_counts.get(&Category::Satisfactory), Some(&1));
        assert!(!stats.category_counts.contains_key(&Category::Severe));
    }

    #[test]
    fn test_stats_serialize_counts_by_category_name() {
        let data = dataset(&[("a", 350), ("b", 20)]);
        let json = serde_json::to_value(national_stats(&data).unwrap()).unwrap();
        assert_eq!(json["categoryCounts"]["very-poor"], 1);
        assert_eq!(json["categoryCounts"]["good"], 1);
        assert_eq!(json["worstCity"]["id"], "a");
    }

    #[test]
    fn test_alert_levels() {
        assert_eq!(AlertLevel::for_category(Category::Severe), Some(AlertLevel::Severe));
        assert_eq!(AlertLevel::for_category(Category::VeryPoor), Some(AlertLevel::Severe));
        assert_eq!(AlertLevel::for_category(Category::Poor), Some(AlertLevel::Warning));
        assert_eq!(AlertLevel::for_category(Category::Moderate), None);
    }

    #[test]
    fn test_alerts_sorted_by_aqi() {
        let data = dataset(&[("a", 250), ("b", 50), ("c", 420), ("d", 310)]);
        let alerts = alerts(&data);
        let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d", "a"]);
        assert_eq!(alerts[0].level, AlertLevel::Severe);
        assert_eq!(alerts[2].level, AlertLevel::Warning);
        assert_eq!(alerts[0].title, "Severe Air Quality Alert - C");
        assert_eq!(alerts[2].location, "A, Test");
    }

    #[test]
    fn test_builtin_alerts() {
        let data = Dataset::builtin().unwrap();
        let alerts = alerts(&data);
        let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["new-delhi", "noida", "lucknow"]);
        assert!(alerts[1].description.contains("298"));
    }
}
