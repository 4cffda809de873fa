use crate::scrapers::scripts;
use crate::scrapers::traits::{NavWait, PageDriver};
use rand::Rng;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Navigation strategies tried in order until one loads, with their timeouts in seconds
const NAV_STRATEGIES: &[(NavWait, u64)] = &[
    (NavWait::NetworkIdle, 60),
    (NavWait::DomContentLoaded, 45),
    (NavWait::Load, 30),
    (NavWait::None, 20),
];

const MIN_HTML_BYTES: usize = 500;
const MIN_TEXT_CHARS: usize = 100;

const SKIP_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "noscript", "iframe",
];

const MAIN_SELECTORS: &[&str] = &[
    "main",
    "article",
    "div[id*='content']",
    "div[class*='content']",
];
const FOOTER_SELECTORS: &[&str] = &["footer", "div[class*='footer']", "div[id*='footer']"];
const HEADER_SELECTORS: &[&str] = &[
    "header",
    "div[class*='banner']",
    "div[class*='hero']",
    "div[id*='banner']",
];

const SOD_KEYWORDS: &[&str] = &[
    "sod",
    "grass",
    "turf",
    "lawn",
    "bermuda",
    "zoysia",
    "augustine",
    "centipede",
    "fescue",
];

const RELEVANT_LIMIT: usize = 15_000;
const GENERAL_LIMIT: usize = 12_000;

/// Tidy a website cell from the business table; `None` when it is blank
pub fn normalize_url(raw: &str) -> Option<String> {
    let url = raw.trim();
    if url.is_empty() {
        return None;
    }
    let url = url.strip_prefix("www.").unwrap_or(url);
    if url.starts_with("http://") || url.starts_with("https://") {
        Some(url.to_string())
    } else {
        Some(format!("https://{}", url))
    }
}

/// `url` followed by at most two alternate spellings worth trying when it fails
pub fn url_variants(url: &str) -> Vec<String> {
    let mut alternates = Vec::new();
    if url.starts_with("https://") {
        alternates.push(url.replacen("https://", "http://", 1));
    }
    if !url.contains("www.") {
        let bare = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .unwrap_or(url);
        alternates.push(format!("https://www.{}", bare));
        alternates.push(format!("http://www.{}", bare));
    }

    let mut variants = vec![url.to_string()];
    variants.extend(alternates.into_iter().take(2));
    variants
}

fn jitter_ms(range: std::ops::RangeInclusive<u64>) -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(range))
}

/// Readable text of a business website, trying each URL variant in turn
pub fn fetch_site_text<P: PageDriver + ?Sized>(page: &P, url: &str) -> Option<String> {
    for candidate in url_variants(url) {
        info!("Attempting to scrape: {}", candidate);
        match attempt(page, &candidate) {
            Some(text) => {
                info!("Successfully scraped content from: {}", candidate);
                return Some(text);
            }
            None => warn!("Failed to get content from: {}", candidate),
        }
    }
    error!("All URL attempts failed for: {}", url);
    None
}

fn attempt<P: PageDriver + ?Sized>(page: &P, url: &str) -> Option<String> {
    page.pause(jitter_ms(1000..=2000));

    let loaded = NAV_STRATEGIES.iter().any(|(wait, secs)| {
        info!(
            "Trying navigation strategy: {} with {}s timeout",
            wait.label(),
            secs
        );
        match page.navigate(url, *wait, Duration::from_secs(*secs)) {
            Ok(()) => {
                info!("Successfully loaded page with strategy: {}", wait.label());
                true
            }
            Err(e) => {
                warn!("Strategy {} failed: {:#}", wait.label(), e);
                false
            }
        }
    });
    if !loaded {
        error!("All navigation strategies failed for {}", url);
        return None;
    }

    page.pause(jitter_ms(2000..=4000));

    // Lazy sections only render once scrolled into view
    match page.eval(scripts::WINDOW_TO_BOTTOM) {
        Ok(_) => {
            page.pause(Duration::from_secs(2));
            if let Err(e) = page.eval(scripts::WINDOW_TO_TOP) {
                debug!("Scroll back to top failed on {}: {:#}", url, e);
            }
        }
        Err(e) => debug!("Scroll to bottom failed on {}: {:#}", url, e),
    }

    let html = match page.html() {
        Ok(html) => html,
        Err(e) => {
            warn!("Could not read {}: {:#}", url, e);
            return None;
        }
    };
    if html.len() < MIN_HTML_BYTES {
        warn!("Very little content received from {}", url);
        return None;
    }

    let text = clean_html_content(&html);
    let chars = text.chars().count();
    if chars < MIN_TEXT_CHARS {
        warn!("Very little text content extracted from {}", url);
        return None;
    }

    info!("Successfully extracted {} characters from {}", chars, url);
    Some(text)
}

fn first_match<'a>(doc: &'a Html, selectors: &[&str]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|sel| doc.select(&sel).next())
}

/// All text under `el`, one trimmed piece per text node, space separated
fn joined_text(el: ElementRef) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text under `el` with script, navigation and page chrome left out
fn visible_text(el: ElementRef, out: &mut Vec<String>) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push(text.to_string()),
            Node::Element(element) if SKIP_TAGS.contains(&element.name()) => {}
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    visible_text(child, out);
                }
            }
            _ => {}
        }
    }
}

fn collapse_whitespace(pieces: &[String]) -> String {
    pieces
        .iter()
        .flat_map(|piece| piece.lines())
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn contact_text(doc: &Html) -> String {
    let mut parts = Vec::new();

    if let Ok(links) = Selector::parse("a[href]") {
        for link in doc.select(&links) {
            let href = link.value().attr("href").unwrap_or_default();
            if href.to_lowercase().contains("contact") {
                parts.push(joined_text(link));
            }
        }
    }

    if let Ok(sections) = Selector::parse("div[class], section[class]") {
        for section in doc.select(&sections) {
            let class = section.value().attr("class").unwrap_or_default();
            if class.to_lowercase().contains("contact") {
                parts.push(joined_text(section));
            }
        }
    }

    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Reduce a website to text for the language model.
///
/// Sentences mentioning sod or grass lead, then the main body, then the
/// footer, header and contact sections under their own labels.
pub fn clean_html_content(html: &str) -> String {
    let doc = Html::parse_document(html);

    let footer = first_match(&doc, FOOTER_SELECTORS)
        .map(joined_text)
        .unwrap_or_default();
    let header = first_match(&doc, HEADER_SELECTORS)
        .map(joined_text)
        .unwrap_or_default();
    let contact = contact_text(&doc);

    let root = first_match(&doc, MAIN_SELECTORS).unwrap_or_else(|| doc.root_element());
    let mut pieces = Vec::new();
    visible_text(root, &mut pieces);
    let clean = collapse_whitespace(&pieces);

    let relevant: Vec<&str> = clean
        .split('.')
        .filter(|sentence| {
            let lower = sentence.to_lowercase();
            SOD_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .map(str::trim)
        .collect();

    let mut combined = clean.clone();
    for (label, section) in [
        ("FOOTER CONTENT", &footer),
        ("HEADER/BANNER CONTENT", &header),
        ("CONTACT CONTENT", &contact),
    ] {
        if !section.is_empty() {
            combined.push_str(&format!("\n\n[{}]\n{}", label, section));
        }
    }

    if relevant.is_empty() {
        truncate(&combined, GENERAL_LIMIT)
    } else {
        let text = format!("{} {}", relevant.join(". "), combined);
        truncate(&text, RELEVANT_LIMIT)
    }
}
