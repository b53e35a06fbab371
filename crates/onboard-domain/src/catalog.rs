//! Static choice lists offered by the listing form.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Instagram,
    YouTube,
    Facebook,
    Twitter,
    LinkedIn,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Instagram,
        Platform::YouTube,
        Platform::Facebook,
        Platform::Twitter,
        Platform::LinkedIn,
    ];

    /// Key stored in the `platforms` set.
    pub fn key(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::YouTube => "youtube",
            Platform::Facebook => "facebook",
            Platform::Twitter => "twitter",
            Platform::LinkedIn => "linkedin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|platform| platform.key() == normalized)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Platform::Instagram => "Instagram",
            Platform::YouTube => "YouTube",
            Platform::Facebook => "Facebook",
            Platform::Twitter => "Twitter",
            Platform::LinkedIn => "LinkedIn",
        };
        f.write_str(label)
    }
}

pub const CATEGORIES: &[&str] = &[
    "Fashion",
    "Beauty",
    "Lifestyle",
    "Travel",
    "Food",
    "Fitness",
    "Technology",
    "Gaming",
    "Education",
    "Finance",
    "Parenting",
    "Entertainment",
];

pub const LANGUAGES: &[&str] = &[
    "English", "Hindi", "Marathi", "Tamil", "Telugu", "Kannada", "Bengali", "Gujarati",
];

/// state → city → localities
const LOCATIONS: &[(&str, &[(&str, &[&str])])] = &[
    (
        "Maharashtra",
        &[
            ("Mumbai", &["Andheri", "Bandra", "Colaba", "Powai"]),
            ("Pune", &["Baner", "Kothrud", "Viman Nagar"]),
            ("Nagpur", &["Dharampeth", "Sadar"]),
        ],
    ),
    (
        "Karnataka",
        &[
            ("Bengaluru", &["Indiranagar", "Koramangala", "Whitefield"]),
            ("Mysuru", &["Gokulam", "Vijayanagar"]),
        ],
    ),
    (
        "Delhi",
        &[("New Delhi", &["Connaught Place", "Hauz Khas", "Saket"])],
    ),
    (
        "Tamil Nadu",
        &[
            ("Chennai", &["Adyar", "T. Nagar", "Velachery"]),
            ("Coimbatore", &["Peelamedu", "RS Puram"]),
        ],
    ),
];

/// Read-only view over the state/city/locality hierarchy.
pub struct LocationCatalog;

impl LocationCatalog {
    pub fn states() -> Vec<&'static str> {
        LOCATIONS.iter().map(|(state, _)| *state).collect()
    }

    pub fn cities(state: &str) -> Vec<&'static str> {
        LOCATIONS
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(state))
            .map(|(_, cities)| cities.iter().map(|(city, _)| *city).collect())
            .unwrap_or_default()
    }

    pub fn localities(state: &str, city: &str) -> Vec<&'static str> {
        LOCATIONS
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(state))
            .and_then(|(_, cities)| {
                cities
                    .iter()
                    .find(|(candidate, _)| candidate.eq_ignore_ascii_case(city))
            })
            .map(|(_, localities)| localities.to_vec())
            .unwrap_or_default()
    }

    /// state → cities, for rules that bind a child choice to its parent.
    pub fn cities_by_state() -> BTreeMap<String, Vec<String>> {
        LOCATIONS
            .iter()
            .map(|(state, cities)| {
                (
                    state.to_string(),
                    cities.iter().map(|(city, _)| city.to_string()).collect(),
                )
            })
            .collect()
    }

    /// city → localities across every state.
    pub fn localities_by_city() -> BTreeMap<String, Vec<String>> {
        LOCATIONS
            .iter()
            .flat_map(|(_, cities)| cities.iter())
            .map(|(city, localities)| {
                (
                    city.to_string(),
                    localities.iter().map(|value| value.to_string()).collect(),
                )
            })
            .collect()
    }
}
