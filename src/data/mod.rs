mod table;

pub use table::US_CITIES_BY_STATE;

/// Quick numbers about the reference table
#[derive(Debug, Clone, PartialEq)]
pub struct CityStats {
    pub total_states: usize,
    pub total_cities: usize,
    pub avg_cities_per_state: f64,
}

/// All state names in table order
pub fn states() -> impl Iterator<Item = &'static str> {
    US_CITIES_BY_STATE.iter().map(|(state, _)| *state)
}

/// Cities of a state, matched case-insensitively
pub fn cities_for(state: &str) -> Option<&'static [&'static str]> {
    let wanted = state.trim();
    US_CITIES_BY_STATE
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
        .map(|(_, cities)| *cities)
}

/// Canonical spelling of a state name, if it is one we know
pub fn canonical_state(state: &str) -> Option<&'static str> {
    let wanted = state.trim();
    states().find(|name| name.eq_ignore_ascii_case(wanted))
}

pub fn stats() -> CityStats {
    let total_states = US_CITIES_BY_STATE.len();
    let total_cities: usize = US_CITIES_BY_STATE.iter().map(|(_, c)| c.len()).sum();

    CityStats {
        total_states,
        total_cities,
        avg_cities_per_state: total_cities as f64 / total_states as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_all_states() {
        let stats = stats();
        assert_eq!(stats.total_states, 50);
        assert_eq!(stats.total_cities, 765);
        assert!((stats.avg_cities_per_state - 15.3).abs() < 1e-9);
    }

    #[test]
    fn test_cities_lookup_ignores_case() {
        let cities = cities_for("new york").expect("New York is in the table");
        assert!(cities.contains(&"Buffalo"));
        assert_eq!(cities_for("california").map(|c| c.len()), Some(20));
        assert!(cities_for("Atlantis").is_none());
    }

    #[test]
    fn test_canonical_state() {
        assert_eq!(canonical_state(" texas "), Some("Texas"));
        assert_eq!(canonical_state("Ontario"), None);
        assert_eq!(states().next(), Some("Alabama"));
    }
}
