//! Static reference tables: country display names and segment weights.
//!
//! Both tables resolve misses to a documented default instead of failing.

use std::collections::HashMap;

use crate::error::AppError;

/// Weight applied to countries missing from the segment table.
pub const DEFAULT_SEGMENT_WEIGHT: f64 = 0.05;

const COUNTRY_NAMES: [(&str, &str); 19] = [
    ("SGP", "Singapore"),
    ("IDN", "Indonesia"),
    ("CHN", "China"),
    ("THA", "Thailand"),
    ("BRN", "Brunei"),
    ("IND", "India"),
    ("KOR", "South Korea"),
    ("VNM", "Vietnam"),
    ("AUS", "Australia"),
    ("PHL", "Philippines"),
    ("GBR", "United Kingdom"),
    ("JPN", "Japan"),
    ("USA", "United States"),
    ("TWN", "Taiwan"),
    ("DEU", "Germany"),
    ("SAU", "Saudi Arabia"),
    ("NLD", "Netherlands"),
    ("FRA", "France"),
    ("RUS", "Russia"),
];

// Approximate Muslim share of the population by country.
const SEGMENT_RATIOS: [(&str, f64); 15] = [
    ("Indonesia", 0.87),
    ("Brunei", 0.81),
    ("Saudi Arabia", 1.0),
    ("Turkey", 0.99),
    ("Bangladesh", 0.90),
    ("Pakistan", 0.96),
    ("Egypt", 0.90),
    ("Iran", 0.99),
    ("India", 0.14),
    ("Singapore", 0.15),
    ("China", 0.02),
    ("Thailand", 0.05),
    ("United Kingdom", 0.06),
    ("Australia", 0.03),
    ("Philippines", 0.06),
];

/// Country code → display name.
#[derive(Debug, Clone)]
pub struct CountryNameMap {
    names: HashMap<String, String>,
}

impl CountryNameMap {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            names: entries.into_iter().collect(),
        }
    }

    /// Display name for `code`, or `code` verbatim when unknown.
    pub fn lookup<'a>(&'a self, code: &'a str) -> &'a str {
        self.names.get(code).map(String::as_str).unwrap_or(code)
    }
}

impl Default for CountryNameMap {
    fn default() -> Self {
        Self::new(
            COUNTRY_NAMES
                .iter()
                .map(|(code, name)| (code.to_string(), name.to_string())),
        )
    }
}

/// Display name → estimated share of arrivals belonging to the segment.
#[derive(Debug, Clone)]
pub struct SegmentRatioMap {
    ratios: HashMap<String, f64>,
    default_weight: f64,
}

impl SegmentRatioMap {
    /// Build a table; every weight (and the default) must lie in `[0, 1]`.
    pub fn new(
        entries: impl IntoIterator<Item = (String, f64)>,
        default_weight: f64,
    ) -> Result<Self, AppError> {
        check_weight("default", default_weight)?;
        let mut ratios = HashMap::new();
        for (name, w) in entries {
            check_weight(&name, w)?;
            ratios.insert(name, w);
        }
        Ok(Self {
            ratios,
            default_weight,
        })
    }

    /// Built-in table with a custom fallback weight.
    pub fn with_default(default_weight: f64) -> Result<Self, AppError> {
        Self::new(
            SEGMENT_RATIOS.iter().map(|(n, w)| (n.to_string(), *w)),
            default_weight,
        )
    }

    /// Weight for a display name, or the default weight when unknown.
    pub fn weight(&self, name: &str) -> f64 {
        self.ratios.get(name).copied().unwrap_or(self.default_weight)
    }
}

impl Default for SegmentRatioMap {
    fn default() -> Self {
        Self {
            ratios: SEGMENT_RATIOS
                .iter()
                .map(|(n, w)| (n.to_string(), *w))
                .collect(),
            default_weight: DEFAULT_SEGMENT_WEIGHT,
        }
    }
}

fn check_weight(name: &str, w: f64) -> Result<(), AppError> {
    if w.is_finite() && (0.0..=1.0).contains(&w) {
        Ok(())
    } else {
        Err(AppError::new(
            2,
            format!("Invalid segment weight for '{name}': {w} (must be within [0, 1])."),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_code_maps_to_name() {
        let map = CountryNameMap::default();
        assert_eq!(map.lookup("SGP"), "Singapore");
        assert_eq!(map.lookup("IDN"), "Indonesia");
    }

    #[test]
    fn unknown_code_is_returned_verbatim() {
        let map = CountryNameMap::default();
        assert_eq!(map.lookup("ZZZ"), "ZZZ");
    }

    #[test]
    fn segment_weight_lookup_and_default() {
        let ratios = SegmentRatioMap::default();
        assert_eq!(ratios.weight("Indonesia"), 0.87);
        assert_eq!(ratios.weight("Atlantis"), 0.05);
    }

    #[test]
    fn default_weight_is_tunable() {
        let ratios = SegmentRatioMap::with_default(0.2).unwrap();
        assert_eq!(ratios.weight("Atlantis"), 0.2);
        assert_eq!(ratios.weight("Saudi Arabia"), 1.0);
    }

    #[test]
    fn out_of_range_weight_is_rejected() {
        assert!(SegmentRatioMap::with_default(1.5).is_err());
        assert!(SegmentRatioMap::new([("X".to_string(), -0.1)], 0.05).is_err());
    }
}
