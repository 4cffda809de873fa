use crate::data;
use crate::scrapers::reveal::RevealReport;
use std::path::PathBuf;

/// One search issued against the map
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTarget {
    pub term: String,
    pub state: Option<String>,
    pub city: Option<String>,
}

impl SearchTarget {
    pub fn term(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            state: None,
            city: None,
        }
    }

    pub fn state(state: &str) -> Self {
        Self {
            term: format!("sod farms in {}", state),
            state: Some(state.to_string()),
            city: None,
        }
    }

    pub fn city(city: &str, state: &str) -> Self {
        Self {
            term: format!("sod farms in {}, {}", city, state),
            state: Some(state.to_string()),
            city: Some(city.to_string()),
        }
    }

    pub fn label(&self) -> String {
        match (&self.city, &self.state) {
            (Some(city), Some(state)) => format!("{}, {}", city, state),
            (None, Some(state)) => state.clone(),
            _ => self.term.clone(),
        }
    }
}

/// What a harvest run covers
#[derive(Debug, Clone, PartialEq)]
pub enum SearchScope {
    /// A single free-form search term
    Term(String),
    /// Newline-delimited search terms read from a file
    Terms(Vec<String>),
    States(Vec<String>),
    /// Every city of each state, at most `max_cities` per state
    Cities {
        states: Vec<String>,
        max_cities: Option<usize>,
    },
}

impl SearchScope {
    pub fn all_states() -> Self {
        SearchScope::States(data::states().map(str::to_string).collect())
    }

    pub fn is_city_wise(&self) -> bool {
        matches!(self, SearchScope::Cities { .. })
    }

    /// File stem used for progress and final output files
    pub fn output_stem(&self) -> String {
        match self {
            SearchScope::Term(term) => crate::storage::sanitize_filename(term),
            SearchScope::Terms(_) => "search_terms".to_string(),
            SearchScope::States(_) => "all_usa_sod_farms".to_string(),
            SearchScope::Cities { .. } => "all_usa_sod_farms_citywise".to_string(),
        }
    }

    /// Expand the scope into concrete searches; unknown states are skipped
    /// in city-wise mode because there are no cities to search
    pub fn targets(&self) -> Vec<SearchTarget> {
        match self {
            SearchScope::Term(term) => vec![SearchTarget::term(term.clone())],
            SearchScope::Terms(terms) => terms
                .iter()
                .map(|t| SearchTarget::term(t.clone()))
                .collect(),
            SearchScope::States(states) => states
                .iter()
                .map(|s| SearchTarget::state(data::canonical_state(s).unwrap_or(s.as_str())))
                .collect(),
            SearchScope::Cities { states, max_cities } => states
                .iter()
                .filter_map(|s| {
                    let state = data::canonical_state(s)?;
                    let cities = data::cities_for(state)?;
                    Some((state, cities))
                })
                .flat_map(|(state, cities)| {
                    let limit = max_cities.unwrap_or(cities.len());
                    cities
                        .iter()
                        .take(limit)
                        .map(move |city| SearchTarget::city(city, state))
                })
                .collect(),
        }
    }
}

/// Parse a newline-delimited terms file, ignoring blanks and `#` comments
pub fn parse_terms(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Records collected by a harvester for one business
#[derive(Debug, Clone)]
pub struct Harvest<T> {
    pub records: Vec<T>,
    pub file: Option<PathBuf>,
    pub report: Option<RevealReport>,
}

impl<T> Harvest<T> {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            file: None,
            report: None,
        }
    }
}
