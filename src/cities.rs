//! Built-in destination catalog offered when creating a journal.

/// A selectable destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct City {
    /// Display label, e.g. `Austin, Texas`.
    pub label: &'static str,
    /// Value stored on the journal.
    pub name: &'static str,
    pub country: &'static str,
}

pub const CITIES: &[City] = &[
    City {
        label: "Austin, Texas",
        name: "Austin",
        country: "United States",
    },
    City {
        label: "New York City, New York",
        name: "New York City",
        country: "United States",
    },
    City {
        label: "Los Angeles, California",
        name: "Los Angeles",
        country: "United States",
    },
    City {
        label: "London",
        name: "London",
        country: "United Kingdom",
    },
    City {
        label: "Paris",
        name: "Paris",
        country: "France",
    },
    City {
        label: "Tokyo",
        name: "Tokyo",
        country: "Japan",
    },
    City {
        label: "Sydney",
        name: "Sydney",
        country: "Australia",
    },
    City {
        label: "Toronto",
        name: "Toronto",
        country: "Canada",
    },
    City {
        label: "Berlin",
        name: "Berlin",
        country: "Germany",
    },
    City {
        label: "Amsterdam",
        name: "Amsterdam",
        country: "Netherlands",
    },
];

/// Distinct countries, in catalog order.
pub fn countries() -> Vec<&'static str> {
    let mut seen = Vec::new();
    for city in CITIES {
        if !seen.contains(&city.country) {
            seen.push(city.country);
        }
    }
    seen
}

/// Cities in `country`, matched case-insensitively.
pub fn in_country(country: &str) -> Vec<&'static City> {
    CITIES
        .iter()
        .filter(|c| c.country.eq_ignore_ascii_case(country))
        .collect()
}

/// Looks up a city by name, case-insensitively.
pub fn find(name: &str) -> Option<&'static City> {
    CITIES.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}
