use crate::models::Business;
use crate::scrapers::reveal::{self, Interaction, Plateau, RevealPlan, Step};
use crate::scrapers::scripts::Container;
use crate::scrapers::traits::{NavWait, PageDriver};
use crate::scrapers::types::{SearchScope, SearchTarget};
use crate::scrapers::{cached_regex, images, reviews};
use crate::storage::{self, OutputDir};
use anyhow::{Context, Result};
use chrono::Local;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub const MAPS_HOME: &str = "https://www.google.com/maps";

const SEARCH_BOX: &str = "#searchboxinput";
const RESULT_LINK: &str = r#"a[href*="https://www.google.com/maps/place"]"#;
const FEED: &str = r#"div[role="feed"]"#;
const NAME_HEADER: &str = "h1.DUwDvf";

const OVERVIEW_TABS: &[&str] = &[
    "button[data-value='Overview']",
    "[data-tab-index='0']",
    "div[role='tablist'] button:first-child",
];

const SHOW_MORE_BUTTONS: &[&str] = &[
    "[data-value='Show more results']",
    "button[aria-label*='Show more']",
    "button[aria-label*='More results']",
    "button[aria-label*='Load more']",
];

/// Keyword in the place URL and the category it implies; first hit wins
const CATEGORY_KEYWORDS: &[(&str, &str)] = &[
    ("turf", "sod supplier"),
    ("sod", "sod farm"),
    ("grass", "grass farm"),
    ("lawn", "lawn service"),
    ("landscap", "landscaping"),
    ("nursery", "nursery"),
    ("garden", "garden center"),
];

const JITTER: (i64, i64) = (-1000, 2000);

static LISTING_STEPS: &[Step] = &[
    Step::new(
        Interaction::Wheel {
            delta: 5000,
            jitter: JITTER,
        },
        2000,
    ),
    Step::new(
        Interaction::Wheel {
            delta: 8000,
            jitter: JITTER,
        },
        2500,
    ),
    Step::new(
        Interaction::Wheel {
            delta: 12000,
            jitter: JITTER,
        },
        3000,
    ),
    Step::new(
        Interaction::Keys {
            keys: &["PageDown"],
            times: 4,
            gap_ms: 600,
        },
        1800,
    ),
    Step::new(
        Interaction::Wheel {
            delta: 15000,
            jitter: JITTER,
        },
        4000,
    ),
    Step::new(
        Interaction::Keys {
            keys: &["End"],
            times: 1,
            gap_ms: 0,
        },
        2500,
    ),
];

static RAPID_SCROLL: [Step; 2] = [
    Step::new(Interaction::HoverFirst(RESULT_LINK), 1000),
    Step::new(
        Interaction::WheelBurst {
            start: 2500,
            step: 0,
            times: 8,
            gap_ms: 800,
            watch: None,
        },
        0,
    ),
];

static SHOW_MORE: [Step; 2] = [
    Step::new(
        Interaction::Wheel {
            delta: 25000,
            jitter: (0, 0),
        },
        4000,
    ),
    Step::new(Interaction::ClickFirst(SHOW_MORE_BUTTONS), 5000),
];

static KEY_NAVIGATION: [Step; 2] = [
    Step::new(Interaction::HoverFirst(RESULT_LINK), 1000),
    Step::new(
        Interaction::Keys {
            keys: &["End", "PageDown"],
            times: 5,
            gap_ms: 1500,
        },
        0,
    ),
];

/// Tried one at a time, in order, whenever the result count stalls
static ESCALATIONS: &[Step] = &[
    Step::new(Interaction::Sequence(&RAPID_SCROLL), 0),
    Step::new(Interaction::Sequence(&SHOW_MORE), 0),
    Step::new(Interaction::Sequence(&KEY_NAVIGATION), 0),
    Step::new(
        Interaction::HoverAndWheel {
            selector: RESULT_LINK,
            limit: 5,
            base: 4000,
            step: 1000,
        },
        0,
    ),
    Step::new(
        Interaction::WheelBurst {
            start: 3000,
            step: 500,
            times: 10,
            gap_ms: 1000,
            watch: Some(RESULT_LINK),
        },
        0,
    ),
];

const ON_ERROR: Step = Step::new(
    Interaction::Wheel {
        delta: 15000,
        jitter: (0, 0),
    },
    3000,
);

const FINAL_BURST: Step = Step::new(
    Interaction::WheelBurst {
        start: 8000,
        step: 0,
        times: 5,
        gap_ms: 2000,
        watch: None,
    },
    3000,
);

fn listing_plan() -> RevealPlan {
    RevealPlan {
        container: Some(Container::new(FEED)),
        steps: LISTING_STEPS,
        steps_per_round: 1,
        escalations: ESCALATIONS,
        stale_limit: 2,
        max_rounds: 30,
        cap: None,
        empty_grace: 5,
        empty_wait_ms: 5000,
        plateau: Some(Plateau {
            rounds: 8,
            min_count: 10,
        }),
        on_error: Some(ON_ERROR),
    }
}

/// Where one business field lives on the place page
struct Field {
    candidates: &'static [&'static str],
    /// Read this attribute instead of the element text
    attr: Option<&'static str>,
}

const NAME: Field = Field {
    candidates: &[NAME_HEADER],
    attr: None,
};

const ADDRESS: Field = Field {
    candidates: &[r#"button[data-item-id="address"] [class*="fontBodyMedium"]"#],
    attr: None,
};

const WEBSITE: Field = Field {
    candidates: &[r#"a[data-item-id="authority"] [class*="fontBodyMedium"]"#],
    attr: None,
};

const PHONE: Field = Field {
    candidates: &[
        r#"button[data-item-id*="phone:tel:"] [class*="fontBodyMedium"]"#,
        r#"[data-tooltip="Copy phone number"] [class*="fontBodyMedium"]"#,
    ],
    attr: None,
};

const REVIEW_COUNT: Field = Field {
    candidates: &[r#"button[jsaction*="reviewChart"] span"#],
    attr: None,
};

const RATING: Field = Field {
    candidates: &[
        r#"div[jsaction="pane.reviewChart.moreReviews"] div[role="img"]"#,
        r#"div.F7nice span[role="img"]"#,
    ],
    attr: Some("aria-label"),
};

fn read_field(doc: &Html, field: &Field) -> Option<String> {
    field
        .candidates
        .iter()
        .filter_map(|c| Selector::parse(c).ok())
        .find_map(|selector| {
            let el = doc.select(&selector).next()?;
            let value = match field.attr {
                Some(attr) => el.value().attr(attr)?.trim().to_string(),
                None => el.text().collect::<String>().trim().to_string(),
            };
            (!value.is_empty()).then_some(value)
        })
}

/// First integer in the review summary text, thousands separators ignored
pub fn parse_review_count(text: &str) -> Option<u32> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let text = text.replace(',', "");
    cached_regex(&NUMBER, r"\d+")
        .find(&text)
        .and_then(|m| m.as_str().parse().ok())
}

/// Average rating such as "4.7 stars" or "4,7 Sterne"
pub fn parse_average(label: &str) -> Option<f64> {
    static DECIMAL: OnceLock<Regex> = OnceLock::new();
    cached_regex(&DECIMAL, r"(\d+[.,]\d+)")
        .captures(label)
        .and_then(|caps| caps[1].replace(',', ".").parse().ok())
}

/// Latitude and longitude from a Maps URL.
///
/// Reads the `/@lat,lng,zoom` viewport segment and falls back to the
/// `!3dlat!4dlng` pair in the data parameter.
pub fn extract_coordinates(url: &str) -> Option<(f64, f64)> {
    viewport_coordinates(url).or_else(|| data_coordinates(url))
}

fn viewport_coordinates(url: &str) -> Option<(f64, f64)> {
    let (_, rest) = url.rsplit_once("/@")?;
    let segment = rest.split('/').next()?;
    let mut parts = segment.split(',');
    let lat = parts.next()?.parse().ok()?;
    let lng = parts.next()?.parse().ok()?;
    Some((lat, lng))
}

fn data_coordinates(url: &str) -> Option<(f64, f64)> {
    static DATA: OnceLock<Regex> = OnceLock::new();
    let caps = cached_regex(&DATA, r"!3d(-?\d+(?:\.\d+)?)!4d(-?\d+(?:\.\d+)?)").captures(url)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

pub fn categorize(url: &str) -> &'static str {
    let url = url.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(keyword, _)| url.contains(keyword))
        .map(|(_, category)| *category)
        .unwrap_or("others")
}

/// Place links in the results feed, duplicates removed, page order kept
pub fn extract_place_urls(html: &str) -> Vec<String> {
    static LINK: OnceLock<Selector> = OnceLock::new();
    let link = LINK.get_or_init(|| Selector::parse(RESULT_LINK).expect("static selector"));

    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    doc.select(link)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.contains("google.com/maps/place"))
        .filter(|href| seen.insert(href.to_string()))
        .map(str::to_string)
        .collect()
}

/// Build a business from a place page snapshot; `None` when the name header is missing
pub fn parse_business(
    html: &str,
    source_url: &str,
    current_url: &str,
    target: &SearchTarget,
) -> Option<Business> {
    static HEADER: OnceLock<Selector> = OnceLock::new();
    let header = HEADER.get_or_init(|| Selector::parse(NAME_HEADER).expect("static selector"));

    let doc = Html::parse_document(html);
    doc.select(header).next()?;

    let (latitude, longitude) =
        match extract_coordinates(current_url).or_else(|| extract_coordinates(source_url)) {
            Some((lat, lng)) => (Some(lat), Some(lng)),
            None => (None, None),
        };

    Some(Business {
        name: read_field(&doc, &NAME).unwrap_or_default(),
        address: read_field(&doc, &ADDRESS).unwrap_or_default(),
        website: read_field(&doc, &WEBSITE).unwrap_or_default(),
        phone_number: read_field(&doc, &PHONE).unwrap_or_default(),
        reviews_count: read_field(&doc, &REVIEW_COUNT)
            .as_deref()
            .and_then(parse_review_count),
        reviews_average: read_field(&doc, &RATING)
            .as_deref()
            .and_then(parse_average),
        latitude,
        longitude,
        state: target.state.clone().unwrap_or_default(),
        city: target.city.clone().unwrap_or_default(),
        google_maps_url: source_url.to_string(),
        category: categorize(source_url).to_string(),
    })
}

/// Go back to the main panel of a place after visiting its reviews
pub fn click_overview_tab<P: PageDriver + ?Sized>(page: &P) -> bool {
    let clicked = page
        .click_with_text("button[role='tab'], div[role='tab']", "Overview")
        .unwrap_or(false)
        || match page.first_present(OVERVIEW_TABS) {
            Ok(Some(idx)) => page.click_first(OVERVIEW_TABS[idx]).unwrap_or(false),
            _ => false,
        };

    if clicked {
        info!("Clicked 'Overview' tab");
        page.pause(Duration::from_secs(1));
    }
    clicked
}

#[derive(Debug, Clone)]
pub struct HarvestOptions {
    pub with_reviews: bool,
    pub with_images: bool,
    /// Pause before a search in a different state
    pub state_pause: Duration,
    /// Pause between searches within the same state
    pub search_pause: Duration,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            with_reviews: true,
            with_images: true,
            state_pause: Duration::from_secs(10),
            search_pause: Duration::from_secs(2),
        }
    }
}

/// Outcome of one search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSummary {
    pub label: String,
    pub found: usize,
    pub scraped: usize,
    /// Listings already harvested by an earlier search
    pub skipped: usize,
}

impl TargetSummary {
    pub fn missed(&self) -> usize {
        self.found.saturating_sub(self.scraped + self.skipped)
    }

    pub fn success_rate(&self) -> f64 {
        let attempted = self.found.saturating_sub(self.skipped);
        if attempted == 0 {
            return 0.0;
        }
        self.scraped as f64 / attempted as f64 * 100.0
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub searches: Vec<TargetSummary>,
    pub businesses: usize,
    pub csv: PathBuf,
    pub xlsx: PathBuf,
    pub elapsed: Duration,
}

/// Drives searches, listing collection and per-business harvesting
/// over one page, accumulating every business of the run
pub struct MapsHarvester<'a, P: PageDriver + ?Sized> {
    page: &'a P,
    output: &'a OutputDir,
    options: HarvestOptions,
    seen: HashSet<String>,
    businesses: Vec<Business>,
}

impl<'a, P: PageDriver + ?Sized> MapsHarvester<'a, P> {
    pub fn new(page: &'a P, output: &'a OutputDir, options: HarvestOptions) -> Self {
        Self {
            page,
            output,
            options,
            seen: HashSet::new(),
            businesses: Vec::new(),
        }
    }

    pub fn businesses(&self) -> &[Business] {
        &self.businesses
    }

    pub fn open(&self) -> Result<()> {
        info!("Opening {}", MAPS_HOME);
        self.page
            .navigate(MAPS_HOME, NavWait::Load, Duration::from_secs(60))
            .context("Failed to open Google Maps")?;
        self.page.pause(Duration::from_secs(5));
        Ok(())
    }

    /// Run every search of `scope`, checkpointing as it goes, and write
    /// the final CSV and XLSX files
    pub fn run(&mut self, scope: &SearchScope) -> Result<RunSummary> {
        let targets = scope.targets();
        let stem = scope.output_stem();
        let progress = self.output.csv(&format!("{}_progress", stem));
        let city_wise = scope.is_city_wise();
        let started = Instant::now();

        info!("{} searches to run", targets.len());

        let mut searches = Vec::with_capacity(targets.len());
        let mut previous_state: Option<&str> = None;

        for (idx, target) in targets.iter().enumerate() {
            if idx > 0 {
                let pause = if target.state.as_deref() != previous_state {
                    self.options.state_pause
                } else {
                    self.options.search_pause
                };
                debug!("Waiting {:?} before next search...", pause);
                self.page.pause(pause);
            }
            previous_state = target.state.as_deref();

            info!("{}", "=".repeat(60));
            info!("SEARCH {}/{}: {}", idx + 1, targets.len(), target.label());
            info!("{}", "=".repeat(60));

            let search_started = Instant::now();
            match self.run_target(target, city_wise, &progress) {
                Ok(summary) => {
                    if summary.found > 0 {
                        info!(
                            "Completed {}: {}/{} scraped, {} already seen",
                            summary.label, summary.scraped, summary.found, summary.skipped
                        );
                        info!("Success rate: {:.1}%", summary.success_rate());
                        if summary.missed() > 0 {
                            warn!("Missed {} listings due to errors", summary.missed());
                        }
                    }
                    searches.push(summary);
                }
                Err(e) => error!("Error scraping {}: {:#}", target.label(), e),
            }
            info!(
                "{} completed in {:.1} seconds",
                target.label(),
                search_started.elapsed().as_secs_f64()
            );

            self.checkpoint(&progress);
        }

        let elapsed = started.elapsed();
        info!("SCRAPING COMPLETED!");
        info!("Total sod farms scraped: {}", self.businesses.len());
        info!(
            "Total time: {:.1} seconds ({:.1} minutes)",
            elapsed.as_secs_f64(),
            elapsed.as_secs_f64() / 60.0
        );
        if !targets.is_empty() {
            info!(
                "Average time per search: {:.1} seconds",
                elapsed.as_secs_f64() / targets.len() as f64
            );
        }

        let final_stem = format!("{}_complete_{}", stem, Local::now().format("%Y%m%d_%H%M%S"));
        let csv = self.output.csv(&final_stem);
        let xlsx = self.output.xlsx(&final_stem);
        storage::write_csv(&csv, &self.businesses)?;
        storage::write_businesses_xlsx(&xlsx, &self.businesses)?;
        info!("Final files saved:");
        info!("  - {}", xlsx.display());
        info!("  - {}", csv.display());

        Ok(RunSummary {
            searches,
            businesses: self.businesses.len(),
            csv,
            xlsx,
            elapsed,
        })
    }

    fn checkpoint(&self, path: &Path) {
        match storage::write_csv(path, &self.businesses) {
            Ok(()) => info!(
                "Progress saved: {} total businesses so far",
                self.businesses.len()
            ),
            Err(e) => warn!("Error saving progress: {:#}", e),
        }
    }

    /// Type `term` into the search box; `false` when no listing shows up
    fn search(&self, term: &str) -> Result<bool> {
        self.page
            .fill(SEARCH_BOX, term)
            .with_context(|| format!("Failed to enter search '{}'", term))?;
        self.page.pause(Duration::from_secs(1));
        self.page.press_key("Enter")?;
        self.page.pause(Duration::from_secs(5));
        Ok(self.page.count(RESULT_LINK)? > 0)
    }

    /// Scroll the results feed until it stops growing and return the place URLs
    pub fn collect_urls(&self) -> Result<Vec<String>> {
        info!("Loading all results...");
        self.page.pause(Duration::from_secs(3));

        let report = reveal::reveal(self.page, &listing_plan(), |page| page.count(RESULT_LINK));
        info!(
            "Scrolling stopped after {} rounds ({:?}), {} listings, {} escalations used",
            report.rounds, report.reason, report.count, report.escalations_used
        );

        if let Err(e) = FINAL_BURST.run(self.page, Some(Container::new(FEED))) {
            debug!("Final scroll failed: {:#}", e);
        }

        let html = self.page.html()?;
        let urls = extract_place_urls(&html);
        info!("Extracted {} unique business URLs", urls.len());
        Ok(urls)
    }

    fn run_target(
        &mut self,
        target: &SearchTarget,
        city_wise: bool,
        progress: &Path,
    ) -> Result<TargetSummary> {
        let mut summary = TargetSummary {
            label: target.label(),
            ..Default::default()
        };

        if !self.search(&target.term)? {
            warn!("No sod farms found for {}", summary.label);
            return Ok(summary);
        }

        let urls = self.collect_urls()?;
        summary.found = urls.len();

        for (idx, url) in urls.iter().enumerate() {
            if city_wise && !self.seen.insert(url.clone()) {
                debug!("Already scraped {}", url);
                summary.skipped += 1;
                continue;
            }

            match self.visit(url, target, idx, urls.len()) {
                Ok(Some(business)) => {
                    self.businesses.push(business);
                    summary.scraped += 1;
                    if city_wise {
                        self.checkpoint(progress);
                    }
                }
                Ok(None) => warn!("Failed to scrape business {}", idx + 1),
                Err(e) => error!("Error processing business URL {}: {:#}", url, e),
            }
        }

        Ok(summary)
    }

    /// Open one place URL and harvest its details, reviews and photos
    pub fn visit(
        &self,
        url: &str,
        target: &SearchTarget,
        index: usize,
        total: usize,
    ) -> Result<Option<Business>> {
        info!(
            "Processing business {}/{} from {}",
            index + 1,
            total,
            target.label()
        );
        self.page
            .navigate(url, NavWait::Load, Duration::from_secs(30))?;
        self.page.pause(Duration::from_secs(3));

        let html = self.page.html()?;
        let current_url = self
            .page
            .current_url()
            .unwrap_or_else(|_| url.to_string());

        let business = match parse_business(&html, url, &current_url, target) {
            Some(business) => business,
            None => {
                warn!("Business details not loaded properly for URL: {}", url);
                return Ok(None);
            }
        };

        if business.name.is_empty() {
            warn!("Cannot scrape reviews or images, no business name");
        } else {
            self.harvest_extras(&business.name);
        }

        info!(
            "Completed: {} ({}/{}) [{}]",
            business.name,
            index + 1,
            total,
            target.label()
        );
        Ok(Some(business))
    }

    fn harvest_extras(&self, name: &str) {
        if self.options.with_reviews {
            info!("Scraping reviews for: {}", name);
            if let Err(e) = reviews::harvest(self.page, name, self.output) {
                warn!("Error scraping reviews: {:#}", e);
            }
            click_overview_tab(self.page);
        }

        if self.options.with_images {
            info!("Scraping images for: {}", name);
            if let Err(e) = images::harvest(self.page, name, self.output) {
                warn!("Error scraping images: {:#}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::testing::FakePage;
    use tempfile::TempDir;

    const PLACE_ONE: &str =
        "https://www.google.com/maps/place/Green+Acres+Sod/@31.45,-83.51,17z/data=!3m1!4b1";
    const PLACE_TWO: &str =
        "https://www.google.com/maps/place/Southern+Turf+Co/data=!4m7!3m6!1s0x0:0x0!8m2!3d33.749!4d-84.388";

    fn listing() -> String {
        format!(
            r#"<html><body><div role="feed">
              <a class="hfpxzc" href="{one}">Green Acres Sod</a>
              <a class="hfpxzc" href="{one}">Green Acres Sod</a>
              <a class="hfpxzc" href="{two}">Southern Turf Co</a>
              <a href="https://www.google.com/search?q=sod">More</a>
            </div></body></html>"#,
            one = PLACE_ONE,
            two = PLACE_TWO
        )
    }

    const PLACE_ONE_HTML: &str = r#"
        <html><body>
          <h1 class="DUwDvf lfPIob">Green Acres Sod</h1>
          <div jsaction="pane.reviewChart.moreReviews">
            <div role="img" aria-label="4.7 stars"></div>
            <button jsaction="pane.reviewChart.moreReviews"><span>1,234 reviews</span></button>
          </div>
          <button data-item-id="address"><div class="Io6YTe fontBodyMedium kR99db">12 Farm Rd, Tifton, GA 31794</div></button>
          <a data-item-id="authority" href="https://greenacressod.com"><div class="Io6YTe fontBodyMedium">greenacressod.com</div></a>
          <button data-item-id="phone:tel:+12295550100"><div class="Io6YTe fontBodyMedium">(229) 555-0100</div></button>
        </body></html>
    "#;

    const PLACE_TWO_HTML: &str = r#"
        <html><body>
          <h1 class="DUwDvf">Southern Turf Co</h1>
          <div jsaction="pane.reviewChart.moreReviews"><div role="img" aria-label="4,5 Sterne"></div></div>
        </body></html>
    "#;

    fn quiet_options() -> HarvestOptions {
        HarvestOptions {
            with_reviews: false,
            with_images: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_extract_place_urls_dedups_in_order() {
        let urls = extract_place_urls(&listing());
        assert_eq!(urls, vec![PLACE_ONE.to_string(), PLACE_TWO.to_string()]);
    }

    #[test]
    fn test_extract_coordinates() {
        assert_eq!(
            extract_coordinates("https://www.google.com/maps/place/X/@12.34,-56.78,15z/data"),
            Some((12.34, -56.78))
        );
        assert_eq!(extract_coordinates(PLACE_TWO), Some((33.749, -84.388)));
        assert_eq!(
            extract_coordinates("https://www.google.com/maps/place/X/@abc,def,10z"),
            None
        );
        assert_eq!(extract_coordinates("not a url"), None);
    }

    #[test]
    fn test_categorize() {
        assert_eq!(categorize(PLACE_TWO), "sod supplier");
        assert_eq!(categorize(PLACE_ONE), "sod farm");
        assert_eq!(categorize("https://example.com/TurfSod"), "sod supplier");
        assert_eq!(
            categorize("https://www.google.com/maps/place/Bobs+Hardware"),
            "others"
        );
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_review_count("(1,234)"), Some(1234));
        assert_eq!(parse_review_count("No reviews"), None);
        assert_eq!(parse_average("4.7 stars"), Some(4.7));
        assert_eq!(parse_average("4,5 Sterne"), Some(4.5));
        assert_eq!(parse_average("5 stars"), None);
    }

    #[test]
    fn test_parse_business() {
        let target = SearchTarget::city("Tifton", "Georgia");
        let business = parse_business(PLACE_ONE_HTML, PLACE_ONE, PLACE_ONE, &target).unwrap();

        assert_eq!(business.name, "Green Acres Sod");
        assert_eq!(business.address, "12 Farm Rd, Tifton, GA 31794");
        assert_eq!(business.website, "greenacressod.com");
        assert_eq!(business.phone_number, "(229) 555-0100");
        assert_eq!(business.reviews_count, Some(1234));
        assert_eq!(business.reviews_average, Some(4.7));
        assert_eq!(business.latitude, Some(31.45));
        assert_eq!(business.longitude, Some(-83.51));
        assert_eq!(business.state, "Georgia");
        assert_eq!(business.city, "Tifton");
        assert_eq!(business.category, "sod farm");

        assert!(parse_business("<html><body></body></html>", PLACE_ONE, PLACE_ONE, &target).is_none());
    }

    #[test]
    fn test_run_single_term() {
        let dir = TempDir::new().unwrap();
        let output = OutputDir::new(dir.path());
        output.create().unwrap();

        let page = FakePage::new();
        page.set_count_sequence(RESULT_LINK, &[2]);
        page.push_html(listing());
        page.push_html(PLACE_ONE_HTML);
        page.push_html(PLACE_TWO_HTML);

        let scope = SearchScope::Term("sod farms near Tifton".to_string());
        let mut harvester = MapsHarvester::new(&page, &output, quiet_options());
        let summary = harvester.run(&scope).unwrap();

        assert_eq!(summary.businesses, 2);
        assert_eq!(summary.searches[0].found, 2);
        assert_eq!(summary.searches[0].scraped, 2);
        assert_eq!(
            page.fills(),
            vec![(SEARCH_BOX.to_string(), "sod farms near Tifton".to_string())]
        );
        assert_eq!(
            page.navigations(),
            vec![
                (PLACE_ONE.to_string(), NavWait::Load),
                (PLACE_TWO.to_string(), NavWait::Load)
            ]
        );

        let businesses = harvester.businesses();
        assert_eq!(businesses[1].name, "Southern Turf Co");
        assert_eq!(businesses[1].category, "sod supplier");
        assert_eq!(businesses[1].reviews_average, Some(4.5));
        assert_eq!(businesses[1].phone_number, "");

        let back: Vec<Business> = storage::read_csv(&summary.csv).unwrap();
        assert_eq!(back, businesses);
        assert!(summary.xlsx.exists());
        assert!(output.csv("sod_farms_near_Tifton_progress").exists());
    }

    #[test]
    fn test_city_wise_skips_seen_listings() {
        let dir = TempDir::new().unwrap();
        let output = OutputDir::new(dir.path());
        output.create().unwrap();

        let page = FakePage::new();
        page.set_count_sequence(RESULT_LINK, &[2]);
        page.push_html(listing());
        page.push_html(PLACE_ONE_HTML);
        page.push_html(PLACE_TWO_HTML);
        page.push_html(listing());

        let scope = SearchScope::Cities {
            states: vec!["Georgia".to_string()],
            max_cities: Some(2),
        };
        let mut harvester = MapsHarvester::new(&page, &output, quiet_options());
        let summary = harvester.run(&scope).unwrap();

        assert_eq!(summary.businesses, 2);
        assert_eq!(summary.searches[1].label, "Augusta, Georgia");
        assert_eq!(summary.searches[1].skipped, 2);
        assert_eq!(summary.searches[1].missed(), 0);
        assert_eq!(page.navigations().len(), 2);
        assert_eq!(harvester.businesses()[0].city, "Atlanta");
        assert!(output.csv("all_usa_sod_farms_citywise_progress").exists());
    }

    #[test]
    fn test_search_without_results_is_skipped() {
        let dir = TempDir::new().unwrap();
        let output = OutputDir::new(dir.path());
        output.create().unwrap();

        let page = FakePage::new();
        page.push_html("<html><body></body></html>");

        let scope = SearchScope::States(vec!["Alaska".to_string()]);
        let mut harvester = MapsHarvester::new(&page, &output, quiet_options());
        let summary = harvester.run(&scope).unwrap();

        assert_eq!(summary.businesses, 0);
        assert_eq!(summary.searches[0].found, 0);
        assert!(page.navigations().is_empty());
        assert!(page.scripts_matching("WheelEvent") == 0);
    }

    #[test]
    fn test_listing_plan_escalates_before_stopping() {
        let page = FakePage::new();
        page.set_count_sequence(RESULT_LINK, &[2]);
        let report = reveal::reveal(&page, &listing_plan(), |page| page.count(RESULT_LINK));
        assert_eq!(report.reason, reveal::StopReason::Exhausted);
        assert_eq!(report.escalations_used, ESCALATIONS.len());
        assert!(page.keys().contains(&"PageDown".to_string()));
    }

    #[test]
    fn test_listing_escalations_restart_after_progress() {
        let page = FakePage::new();
        // Each batch of ten only shows up after the first escalation
        let counts: Vec<usize> = (1..=8).flat_map(|batch| [batch * 10; 3]).collect();
        let round = std::cell::Cell::new(0);
        let report = reveal::reveal(&page, &listing_plan(), |_| {
            let i = round.get();
            round.set(i + 1);
            Ok(counts[i.min(counts.len() - 1)])
        });

        assert_eq!(report.count, 80);
        assert_eq!(report.rounds, 30);
        assert_eq!(report.reason, reveal::StopReason::Plateau);
        assert_eq!(report.escalations_used, 11);
    }
}
