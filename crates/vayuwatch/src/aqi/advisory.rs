//! Health advisories per AQI category.

use serde::Serialize;

use super::Category;

/// Guidance shown alongside an AQI reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthAdvisory {
    /// Advice for the general population.
    pub general: &'static str,
    /// Advice for children, the elderly and people with respiratory issues.
    pub sensitive: &'static str,
    /// Advice about outdoor activity.
    pub outdoor: &'static str,
}

impl HealthAdvisory {
    /// Look up the advisory for a category.
    #[must_use]
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Good => Self {
                general: "Air quality is satisfactory. Enjoy outdoor activities.",
                sensitive: "No precautions needed for sensitive groups.",
                outdoor: "Ideal conditions for all outdoor activities.",
            },
            Category::Satisfactory => Self {
                general: "Air quality is acceptable. Minor breathing discomfort possible for very sensitive people.",
                sensitive: "People with respiratory issues should monitor symptoms.",
                outdoor: "Outdoor activities are generally safe.",
            },
            Category::Moderate => Self {
                general: "May cause breathing discomfort to sensitive people.",
                sensitive: "Children, elderly, and those with respiratory issues should limit outdoor exposure.",
                outdoor: "Reduce prolonged outdoor exertion.",
            },
            Category::Poor => Self {
                general: "Breathing discomfort to most people on prolonged exposure.",
                sensitive: "Avoid outdoor activities. Use N95 masks if going outside.",
                outdoor: "Limit outdoor physical activities. Schools should restrict outdoor play.",
            },
            Category::VeryPoor => Self {
                general: "Respiratory illness on prolonged exposure. Affects healthy people.",
                sensitive: "Stay indoors. Use air purifiers. Seek medical attention if symptoms persist.",
                outdoor: "Avoid all outdoor activities. Keep windows closed.",
            },
            Category::Severe => Self {
                general: "Health emergency. Serious health effects for everyone.",
                sensitive: "Complete bed rest advised. Emergency measures required.",
                outdoor: "All outdoor activities banned. GRAP Stage IV measures in effect.",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_distinct_advice() {
        let generals: Vec<_> = Category::ALL
            .iter()
            .map(|c| HealthAdvisory::for_category(*c).general)
            .collect();
        for (i, a) in generals.iter().enumerate() {
            for b in &generals[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_severe_mentions_grap() {
        let advisory = Category::Severe.advisory();
        assert!(advisory.outdoor.contains("GRAP Stage IV"));
    }

    #[test]
    fn test_advisory_serializes_fields() {
        let json = serde_json::to_value(Category::Poor.advisory()).unwrap();
        assert!(json["general"].is_string());
        assert!(json["sensitive"].as_str().unwrap().contains("N95"));
        assert!(json["outdoor"].is_string());
    }
}
