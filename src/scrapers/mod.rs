pub mod browser;
pub mod images;
pub mod maps;
pub mod reveal;
pub mod reviews;
pub mod scripts;
pub mod traits;
pub mod types;
pub mod website;

#[cfg(test)]
pub mod testing;

pub use browser::ChromePage;
pub use maps::{HarvestOptions, MapsHarvester};
pub use traits::{NavWait, PageDriver};
pub use types::{parse_terms, SearchScope, SearchTarget};

use regex::Regex;
use std::sync::OnceLock;

/// Compile `pattern` once into `cell`
pub(crate) fn cached_regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex"))
}
