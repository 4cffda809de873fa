use crate::models::{Review, ReviewKey};
use crate::scrapers::reveal::{self, Interaction, RevealPlan, Step};
use crate::scrapers::scripts::{self, Container};
use crate::scrapers::traits::PageDriver;
use crate::scrapers::types::Harvest;
use crate::storage::{self, OutputDir};
use anyhow::Result;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

const REVIEWS_TAB: &str = "button[role='tab']";
const REVIEW_BLOCK: &str = "div.jJc9Ad";

const CONTAINERS: &[&str] = &[
    "div.m6QErb.DxyBCb.kA9KIf.dS8AEf",
    "div[role='main'] div[style*='overflow']",
    "div.m6QErb[aria-label]",
];

const TEXT_SELECTORS: &[&str] = &[".wiI7pd", ".MyEned", ".ZZnUNe"];

/// Owner response block; its text shares classes with the review text
const REPLY_BLOCK: &str = "CDe7pd";

static SCROLL_STEPS: &[Step] = &[
    Step::new(Interaction::ContainerToBottom, 2000),
    Step::new(Interaction::ContainerByViewport, 2000),
    Step::new(
        Interaction::Keys {
            keys: &["End"],
            times: 1,
            gap_ms: 0,
        },
        3000,
    ),
];

fn plan(container: Container) -> RevealPlan {
    RevealPlan {
        container: Some(container),
        steps: SCROLL_STEPS,
        steps_per_round: 3,
        stale_limit: 5,
        max_rounds: 100,
        cap: Some(2000),
        ..Default::default()
    }
}

struct Selectors {
    block: Selector,
    name: Selector,
    rating: Selector,
    text: Vec<Selector>,
    date: Selector,
    reply: Selector,
    reply_text: Selector,
}

fn selectors() -> &'static Selectors {
    static CELL: OnceLock<Selectors> = OnceLock::new();
    CELL.get_or_init(|| {
        let parse = |s: &str| Selector::parse(s).expect("static selector");
        Selectors {
            block: parse(REVIEW_BLOCK),
            name: parse(".d4r55"),
            rating: parse(".kvMYJc"),
            text: TEXT_SELECTORS.iter().map(|s| parse(s)).collect(),
            date: parse(".rsqaWe"),
            reply: parse(".CDe7pd"),
            reply_text: parse(".CDe7pd .wiI7pd"),
        }
    })
}

fn text_of(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn first_text(scope: ElementRef, selector: &Selector) -> String {
    scope.select(selector).next().map(text_of).unwrap_or_default()
}

fn in_reply(el: ElementRef) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| a.value().classes().any(|c| c == REPLY_BLOCK))
}

/// Star rating from an aria-label such as "4 stars" or "Rated 4.0 out of 5 stars"
pub fn parse_rating(label: &str) -> Option<f64> {
    if !label.to_lowercase().contains("star") {
        return None;
    }
    label
        .split_whitespace()
        .find(|part| {
            let digits = part.replace('.', "");
            !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
        })
        .and_then(|part| part.parse().ok())
}

fn parse_block(block: ElementRef) -> Option<Review> {
    let sel = selectors();

    let reviewer_name = first_text(block, &sel.name);
    if reviewer_name.is_empty() {
        return None;
    }

    let rating = block
        .select(&sel.rating)
        .next()
        .and_then(|el| el.value().attr("aria-label"))
        .and_then(parse_rating);

    let review_text = sel
        .text
        .iter()
        .find_map(|s| block.select(s).find(|el| !in_reply(*el)))
        .map(text_of)
        .unwrap_or_default();

    let business_reply = match block.select(&sel.reply_text).next() {
        Some(el) => text_of(el),
        None => first_text(block, &sel.reply),
    };

    Some(Review {
        reviewer_name,
        rating,
        review_text,
        date: first_text(block, &sel.date),
        business_reply,
    })
}

/// Every review block in the snapshot that carries a reviewer name
pub fn parse_reviews(html: &str) -> Vec<Review> {
    let document = Html::parse_document(html);
    document
        .select(&selectors().block)
        .filter_map(parse_block)
        .collect()
}

/// Keeps the first review seen for each (name, date, text prefix)
#[derive(Debug, Default)]
pub struct ReviewCollector {
    seen: HashSet<ReviewKey>,
    reviews: Vec<Review>,
}

impl ReviewCollector {
    /// Returns how many of `candidates` were new
    pub fn absorb(&mut self, candidates: Vec<Review>) -> usize {
        let before = self.reviews.len();
        for review in candidates {
            if self.seen.insert(review.key()) {
                self.reviews.push(review);
            }
        }
        self.reviews.len() - before
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn into_reviews(self) -> Vec<Review> {
        self.reviews
    }
}

fn find_container<P: PageDriver + ?Sized>(page: &P) -> Container {
    let found = page
        .eval(&scripts::first_containing(CONTAINERS, REVIEW_BLOCK))
        .ok()
        .and_then(|v| v.as_i64())
        .filter(|idx| *idx >= 0)
        .and_then(|idx| CONTAINERS.get(idx as usize).copied());

    match found {
        Some(container) => {
            info!("Found scroll container with selector: {}", container);
            Container::holding(container, REVIEW_BLOCK)
        }
        None => {
            warn!("Could not find reviews scroll container, trying page scroll");
            Container::new("body")
        }
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > 100 {
        format!("{}...", text.chars().take(100).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Collect the reviews of the business currently open in `page`
/// and write them to `reviews_{name}.csv`
pub fn harvest<P: PageDriver + ?Sized>(
    page: &P,
    business_name: &str,
    output: &OutputDir,
) -> Result<Harvest<Review>> {
    info!("Clicking 'Reviews' tab...");
    if !page.click_with_text(REVIEWS_TAB, "Reviews")? {
        warn!("Reviews tab not found");
        return Ok(Harvest::empty());
    }
    page.pause(Duration::from_secs(3));

    if !page.wait_for(REVIEW_BLOCK, Duration::from_secs(15))? {
        warn!("No reviews loaded");
        return Ok(Harvest::empty());
    }

    let container = find_container(page);

    let mut collector = ReviewCollector::default();
    let report = reveal::reveal(page, &plan(container), |page| {
        let html = page.html()?;
        let found = parse_reviews(&html);
        let blocks = found.len();
        let new = collector.absorb(found);
        debug!(
            "{} review blocks on page, total {} (+{} new)",
            blocks,
            collector.len(),
            new
        );
        Ok(collector.len())
    });

    info!(
        "Review collection finished after {} rounds: {} unique reviews",
        report.rounds,
        collector.len()
    );

    let mut harvest = Harvest {
        records: Vec::new(),
        file: None,
        report: Some(report),
    };

    if collector.is_empty() {
        warn!("No reviews extracted");
        return Ok(harvest);
    }

    let reviews = collector.into_reviews();
    let path = output.reviews_file(business_name);
    storage::write_csv(&path, &reviews)?;
    info!("Saved {} unique reviews to {}", reviews.len(), path.display());

    for (i, review) in reviews.iter().take(3).enumerate() {
        let stars = review
            .rating
            .map(|r| r.to_string())
            .unwrap_or_else(|| "?".to_string());
        info!(
            "  {}. {} ({} stars): {}",
            i + 1,
            review.reviewer_name,
            stars,
            preview(&review.review_text)
        );
    }

    harvest.records = reviews;
    harvest.file = Some(path);
    Ok(harvest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::reveal::StopReason;
    use crate::scrapers::testing::FakePage;
    use tempfile::TempDir;

    const REVIEWS: &str = r#"
        <html><body><div class="m6QErb DxyBCb kA9KIf dS8AEf">
          <div class="jJc9Ad">
            <div class="d4r55">Dana Whitfield</div>
            <span class="kvMYJc" role="img" aria-label="5 stars"></span>
            <span class="rsqaWe">2 months ago</span>
            <span class="wiI7pd">Fresh Zoysia, cut the same morning. Delivery was on time.</span>
            <div class="CDe7pd"><span class="wiI7pd">Thanks Dana, enjoy the new lawn!</span></div>
          </div>
          <div class="jJc9Ad">
            <div class="d4r55">Marcus Lee</div>
            <span class="kvMYJc" aria-label="Rated 4.0 out of 5 stars"></span>
            <span class="rsqaWe">a year ago</span>
            <div class="CDe7pd"><span class="wiI7pd">Appreciate the feedback.</span></div>
            <span class="MyEned">Good St. Augustine pallets.</span>
          </div>
          <div class="jJc9Ad">
            <span class="kvMYJc" aria-label="1 star"></span>
            <span class="wiI7pd">Anonymous block without a name</span>
          </div>
          <div class="jJc9Ad">
            <div class="d4r55">Dana Whitfield</div>
            <span class="kvMYJc" aria-label="5 stars"></span>
            <span class="rsqaWe">2 months ago</span>
            <span class="wiI7pd">Fresh Zoysia, cut the same morning. Delivery was on time.</span>
          </div>
        </div></body></html>
    "#;

    #[test]
    fn test_parse_reviews() {
        let reviews = parse_reviews(REVIEWS);
        assert_eq!(reviews.len(), 3);

        let first = &reviews[0];
        assert_eq!(first.reviewer_name, "Dana Whitfield");
        assert_eq!(first.rating, Some(5.0));
        assert_eq!(first.date, "2 months ago");
        assert!(first.review_text.starts_with("Fresh Zoysia"));
        assert_eq!(first.business_reply, "Thanks Dana, enjoy the new lawn!");

        let second = &reviews[1];
        assert_eq!(second.rating, Some(4.0));
        assert_eq!(second.review_text, "Good St. Augustine pallets.");
        assert_eq!(second.business_reply, "Appreciate the feedback.");
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("3 stars"), Some(3.0));
        assert_eq!(parse_rating("Rated 4.5 out of 5"), None);
        assert_eq!(parse_rating(""), None);
    }

    #[test]
    fn test_collector_drops_repeats() {
        let mut collector = ReviewCollector::default();
        assert_eq!(collector.absorb(parse_reviews(REVIEWS)), 2);
        assert_eq!(collector.absorb(parse_reviews(REVIEWS)), 0);
        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn test_key_uses_text_prefix() {
        let long = "x".repeat(150);
        let a = Review {
            reviewer_name: "Ann".to_string(),
            date: "a week ago".to_string(),
            review_text: format!("{}tail one", long),
            ..Default::default()
        };
        let b = Review {
            review_text: format!("{}tail two", long),
            ..a.clone()
        };
        let mut collector = ReviewCollector::default();
        assert_eq!(collector.absorb(vec![a, b]), 1);
    }

    #[test]
    fn test_missing_tab_returns_empty() {
        let dir = TempDir::new().unwrap();
        let output = OutputDir::new(dir.path());
        let page = FakePage::new();
        page.push_html(REVIEWS);

        let harvest = harvest(&page, "Green Acres Sod", &output).unwrap();
        assert!(harvest.records.is_empty());
        assert!(harvest.file.is_none());
        assert!(!output.reviews_file("Green Acres Sod").exists());
    }

    #[test]
    fn test_harvest_writes_csv() {
        let dir = TempDir::new().unwrap();
        let output = OutputDir::new(dir.path());
        output.create().unwrap();

        let page = FakePage::new();
        page.add_text_button("Reviews");
        page.add_present(REVIEW_BLOCK);
        page.push_html(REVIEWS);

        let harvest = harvest(&page, "Green Acres Sod", &output).unwrap();
        assert_eq!(harvest.records.len(), 2);
        assert_eq!(page.clicks(), vec![format!("{} >> Reviews", REVIEWS_TAB)]);
        assert_eq!(
            harvest.report.as_ref().map(|r| r.reason),
            Some(StopReason::Exhausted)
        );
        assert_eq!(page.scripts_matching("scrollHeight"), 5);
        assert!(page.keys().iter().all(|k| k == "End"));

        let path = harvest.file.unwrap();
        assert_eq!(path, output.reviews_file("Green Acres Sod"));
        let back: Vec<Review> = storage::read_csv(&path).unwrap();
        assert_eq!(back, harvest.records);
    }

    fn review_page(count: usize) -> String {
        let blocks: String = (0..count)
            .map(|i| {
                format!(
                    r#"<div class="jJc9Ad"><div class="d4r55">Reviewer {i}</div><span class="wiI7pd">Pallet {i} rooted fast.</span></div>"#
                )
            })
            .collect();
        format!("<html><body><div class=\"m6QErb\">{}</div></body></html>", blocks)
    }

    #[test]
    fn test_scrolls_the_pane_holding_reviews() {
        let dir = TempDir::new().unwrap();
        let output = OutputDir::new(dir.path());
        let page = FakePage::new();
        page.add_text_button("Reviews");
        page.add_present(REVIEW_BLOCK);
        page.push_html(REVIEWS);
        page.answer_script("return -1", serde_json::json!(1));

        harvest(&page, "Green Acres Sod", &output).unwrap();

        let pane = r#"[...document.querySelectorAll("div[role='main'] div[style*='overflow']")].find(el => el.querySelector("div.jJc9Ad"))"#;
        assert_eq!(page.scripts_matching(pane), 10);
        assert_eq!(
            page.scripts_matching(r#"document.querySelector("div[role='main']"#),
            0
        );
    }

    #[test]
    fn test_harvest_stops_past_review_cap() {
        let dir = TempDir::new().unwrap();
        let output = OutputDir::new(dir.path());
        let page = FakePage::new();
        page.add_text_button("Reviews");
        page.add_present(REVIEW_BLOCK);
        page.push_html(review_page(1000));
        page.push_html(review_page(2000));
        page.push_html(review_page(2000));
        page.push_html(review_page(2400));

        let harvest = harvest(&page, "Green Acres Sod", &output).unwrap();
        let report = harvest.report.unwrap();
        assert_eq!(report.reason, StopReason::CapReached);
        assert_eq!(report.rounds, 4);
        assert_eq!(report.count, 2400);
        assert_eq!(harvest.records.len(), 2400);
    }
}
