use crate::models::{Image, ImageSource};
use crate::scrapers::reveal::{self, Interaction, RevealPlan, Step};
use crate::scrapers::scripts::Container;
use crate::scrapers::cached_regex;
use crate::scrapers::traits::PageDriver;
use crate::scrapers::types::Harvest;
use crate::storage::{self, OutputDir};
use anyhow::Result;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Entry points into the photo gallery, most specific first
const PHOTO_BUTTONS: &[&str] = &[
    r#"[data-value="all_photos"]"#,
    r#"button[data-carousel-index="0"]"#,
    ".photos-section button",
    r#"[aria-label*="photo"]"#,
    r#"[aria-label*="Photo"]"#,
];

const IMAGE_WAIT_SELECTORS: &[&str] = &[
    r#"div[role="img"]"#,
    r#"div.U39Pmb[role="img"]"#,
    "div.Uf0tqf",
    r#"img[src*="googleusercontent.com"]"#,
    r#"img[src*="gstatic.com"]"#,
    r#"img[src*="ggpht.com"]"#,
    "img.DaSXdd",
    r#"[role="img"] img"#,
    r#"img[src^="https://lh"]"#,
    "img[data-src]",
    "picture img",
];

const SCROLL_CONTAINERS: &[&str] = &[
    r#"div[role='main'] div[style*='overflow-y']"#,
    "div.m6QErb.DxyBCb.kA9KIf.dS8AEf",
    r#"div[class*='scroll']"#,
    "[role='main']",
    "body",
];

const BACKGROUND_SELECTORS: &[&str] = &[
    r#"div[role="img"][style*="background-image"]"#,
    r#"div.U39Pmb[role="img"]"#,
    r#"div.Uf0tqf[style*="background-image"]"#,
    r#"div[style*="background-image"][style*="googleusercontent"]"#,
    r#"div[style*="background-image"][style*="gstatic"]"#,
    r#"div[style*="background-image"][style*="ggpht"]"#,
];

const IMG_TAG_SELECTORS: &[&str] = &[
    r#"img[src*="googleusercontent.com"]"#,
    r#"img[src*="gstatic.com"]"#,
    r#"img[src*="ggpht.com"]"#,
    r#"img[src^="https://lh"]"#,
    "img.DaSXdd",
    r#"img[data-src*="google"]"#,
    "picture img",
    r#"[role="img"] img"#,
    r#"img[loading="lazy"]"#,
    r#"img[alt*="photo"]"#,
    r#"img[alt*="Photo"]"#,
];

const SIZE_MARKERS: &[&str] = &["=s40", "=s60", "=w40", "=w60", "=h40", "=h60"];
const UI_MARKERS: &[&str] = &["icon", "logo", "avatar", "1x1", "pixel"];

const DEBUG_SELECTORS: &[&str] = &[
    r#"div[role="img"]"#,
    r#"div[style*="background-image"]"#,
    "img",
];

const NUDGE: Step = Step::new(Interaction::WindowBy(500), 500);

const fn settle(action: Interaction) -> Step {
    Step::new(action, 1200)
}

static CONTAINER_TO_BOTTOM: [Step; 2] = [settle(Interaction::ContainerToBottom), NUDGE];
static CONTAINER_BY: [Step; 2] = [settle(Interaction::ContainerBy(800)), NUDGE];
static PAGE_DOWN: [Step; 2] = [
    settle(Interaction::Keys {
        keys: &["PageDown"],
        times: 1,
        gap_ms: 0,
    }),
    NUDGE,
];
static END_KEY: [Step; 2] = [
    settle(Interaction::Keys {
        keys: &["End"],
        times: 1,
        gap_ms: 0,
    }),
    NUDGE,
];
static WINDOW_BY: [Step; 2] = [settle(Interaction::WindowBy(1200)), NUDGE];
static WHEEL: [Step; 2] = [
    settle(Interaction::Wheel {
        delta: 600,
        jitter: (0, 0),
    }),
    NUDGE,
];
static WINDOW_TO_BOTTOM: [Step; 2] = [settle(Interaction::WindowToBottom), NUDGE];

/// One method per round, each followed by a small window scroll.
/// The rotation opens with the container nudge and ends on the jump to
/// the container bottom.
static SCROLL_METHODS: &[Step] = &[
    Step::new(Interaction::Sequence(&CONTAINER_BY), 0),
    Step::new(Interaction::Sequence(&PAGE_DOWN), 0),
    Step::new(Interaction::Sequence(&END_KEY), 0),
    Step::new(Interaction::Sequence(&WINDOW_BY), 0),
    Step::new(Interaction::Sequence(&WHEEL), 0),
    Step::new(Interaction::Sequence(&WINDOW_TO_BOTTOM), 0),
    Step::new(Interaction::Sequence(&CONTAINER_TO_BOTTOM), 0),
];

fn plan(container: &'static str) -> RevealPlan {
    RevealPlan {
        container: Some(Container::new(container)),
        steps: SCROLL_METHODS,
        steps_per_round: 1,
        stale_limit: 15,
        max_rounds: 200,
        cap: Some(1000),
        ..Default::default()
    }
}

/// Ask for the largest rendition of a Google-hosted image.
///
/// Applying it to its own output changes nothing.
pub fn clean_image_url(url: &str) -> String {
    static WH: OnceLock<Regex> = OnceLock::new();
    static S: OnceLock<Regex> = OnceLock::new();
    static CROP: OnceLock<Regex> = OnceLock::new();
    static K_NO: OnceLock<Regex> = OnceLock::new();

    if !url.starts_with("http") {
        return url.to_string();
    }

    let url = cached_regex(&WH, r"=w\d+-h\d+").replace_all(url, "=w2000-h2000");
    let url = cached_regex(&S, r"=s\d+").replace_all(&url, "=s2000");
    let url = cached_regex(&CROP, r"=c-[^&]*").replace_all(&url, "");
    let url = cached_regex(&K_NO, r"(-k-no)+$").replace_all(&url, "");
    url.into_owned()
}

/// URL inside a `background-image: url(...)` declaration, or empty
pub fn extract_background_image_url(style: &str) -> String {
    static BG: OnceLock<Regex> = OnceLock::new();
    cached_regex(&BG, r#"background-image:\s*url\(["']?(.*?)["']?\)"#)
        .captures(style)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn style_px(style: &str, property: &str) -> String {
    static WIDTH: OnceLock<Regex> = OnceLock::new();
    static HEIGHT: OnceLock<Regex> = OnceLock::new();
    let re = match property {
        "width" => cached_regex(&WIDTH, r"width:\s*(\d+)px"),
        _ => cached_regex(&HEIGHT, r"height:\s*(\d+)px"),
    };
    re.captures(style)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn has_marker(url: &str, markers: &[&str]) -> bool {
    let lower = url.to_lowercase();
    markers.iter().any(|m| lower.contains(m))
}

fn is_thumbnail_or_ui(url: &str) -> bool {
    has_marker(url, SIZE_MARKERS) || has_marker(url, UI_MARKERS)
}

fn background_candidate(
    element: &ElementRef,
    source_type: ImageSource,
    alt_text: String,
) -> Option<Image> {
    let style = element.value().attr("style")?;
    if !style.contains("background-image") {
        return None;
    }
    let url = extract_background_image_url(style);
    if !url.starts_with("http") {
        return None;
    }
    let skip = match source_type {
        ImageSource::NestedBackgroundImage => has_marker(&url, SIZE_MARKERS),
        _ => is_thumbnail_or_ui(&url),
    };
    if skip {
        return None;
    }

    Some(Image {
        image_url: clean_image_url(&url),
        alt_text,
        width: style_px(style, "width"),
        height: style_px(style, "height"),
        original_url: url,
        source_type,
    })
}

/// Every photo candidate in `html`, in selector priority order, duplicates included
pub fn parse_images(html: &str) -> Vec<Image> {
    let document = Html::parse_document(html);
    let nested = Selector::parse(r#"div[style*="background-image"]"#).expect("static selector");
    let mut found = Vec::new();

    for raw in BACKGROUND_SELECTORS {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for element in document.select(&selector) {
            // Children are only searched under parents that are themselves
            // acceptable backgrounds
            let Some(style) = element.value().attr("style") else {
                continue;
            };
            if !style.contains("background-image") {
                continue;
            }
            let url = extract_background_image_url(style);
            if url.starts_with("http") && is_thumbnail_or_ui(&url) {
                continue;
            }

            if let Some(image) = background_candidate(
                &element,
                ImageSource::BackgroundImage,
                format!("Background image from {}", raw),
            ) {
                found.push(image);
            }
            for child in element.select(&nested) {
                if child.id() == element.id() {
                    continue;
                }
                if let Some(image) = background_candidate(
                    &child,
                    ImageSource::NestedBackgroundImage,
                    "Nested background image".to_string(),
                ) {
                    found.push(image);
                }
            }
        }
    }

    for raw in IMG_TAG_SELECTORS {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for img in document.select(&selector) {
            let attrs = img.value();
            let src = ["src", "data-src", "data-lazy-src"]
                .iter()
                .filter_map(|a| attrs.attr(a))
                .find(|s| s.starts_with("http"));
            let Some(src) = src else {
                continue;
            };
            if is_thumbnail_or_ui(src) {
                continue;
            }
            found.push(Image {
                image_url: clean_image_url(src),
                alt_text: attrs.attr("alt").unwrap_or_default().to_string(),
                original_url: src.to_string(),
                width: attrs.attr("width").unwrap_or_default().to_string(),
                height: attrs.attr("height").unwrap_or_default().to_string(),
                source_type: ImageSource::ImgTag,
            });
        }
    }

    found
}

/// Keeps the first image seen for each cleaned URL
#[derive(Debug, Default)]
pub struct ImageCollector {
    seen: HashSet<String>,
    images: Vec<Image>,
}

impl ImageCollector {
    /// Returns how many of `candidates` were new
    pub fn absorb(&mut self, candidates: Vec<Image>) -> usize {
        let before = self.images.len();
        for image in candidates {
            if self.seen.insert(image.image_url.clone()) {
                self.images.push(image);
            }
        }
        self.images.len() - before
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn into_images(self) -> Vec<Image> {
        self.images
    }
}

fn open_gallery<P: PageDriver + ?Sized>(page: &P) {
    let clicked = match page.first_present(PHOTO_BUTTONS) {
        Ok(Some(idx)) => {
            info!("Found photos section with: {}", PHOTO_BUTTONS[idx]);
            page.click_first(PHOTO_BUTTONS[idx]).unwrap_or(false)
        }
        _ => page.click_with_text("button, [role='button']", "photo").unwrap_or(false),
    };

    if clicked {
        info!("Clicked photos button");
        page.pause(Duration::from_secs(3));
    } else {
        warn!("No specific photos button found, looking for images directly");
    }
}

fn wait_for_images<P: PageDriver + ?Sized>(page: &P) -> bool {
    for selector in IMAGE_WAIT_SELECTORS {
        if page.wait_for(selector, Duration::from_secs(3)).unwrap_or(false) {
            info!("Images detected with: {}", selector);
            return true;
        }
    }
    false
}

fn log_breakdown(images: &[Image]) {
    let mut by_domain: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();

    for image in images {
        let domain = url::Url::parse(&image.image_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();
        *by_domain.entry(domain).or_default() += 1;
        *by_type.entry(image.source_type.to_string()).or_default() += 1;
    }

    for (domain, count) in &by_domain {
        info!("  {}: {} images", domain, count);
    }
    for (source_type, count) in &by_type {
        info!("  [{}] {} images", source_type, count);
    }
}

/// Collect every photo URL for the business currently open in `page`
/// and write them to `images_{name}.csv`
pub fn harvest<P: PageDriver + ?Sized>(
    page: &P,
    business_name: &str,
    output: &OutputDir,
) -> Result<Harvest<Image>> {
    info!("Starting image collection for {}", business_name);

    open_gallery(page);
    if !wait_for_images(page) {
        warn!("No images detected, continuing anyway...");
    }

    let container = match page.first_present(SCROLL_CONTAINERS) {
        Ok(Some(idx)) => SCROLL_CONTAINERS[idx],
        _ => "body",
    };
    debug!("Using scroll container: {}", container);

    let mut collector = ImageCollector::default();
    let report = reveal::reveal(page, &plan(container), |page| {
        let html = page.html()?;
        let new = collector.absorb(parse_images(&html));
        if new > 0 {
            debug!("Total: {} images (+{} new)", collector.len(), new);
        }
        Ok(collector.len())
    });

    info!(
        "Image collection finished after {} rounds: {} unique images",
        report.rounds,
        collector.len()
    );

    let mut harvest = Harvest {
        records: Vec::new(),
        file: None,
        report: Some(report),
    };

    if collector.is_empty() {
        warn!("No images were extracted");
        for selector in DEBUG_SELECTORS {
            let count = page.count(selector).unwrap_or(0);
            info!("  Found {} elements matching: {}", count, selector);
        }
    } else {
        let images = collector.into_images();
        let path = output.images_file(business_name);
        storage::write_csv(&path, &images)?;
        info!("Saved {} unique images to {}", images.len(), path.display());
        for (i, image) in images.iter().take(8).enumerate() {
            debug!("  {}. [{}] {}", i + 1, image.source_type, image.image_url);
        }
        log_breakdown(&images);
        harvest.records = images;
        harvest.file = Some(path);
    }

    if let Err(e) = page.press_key("Escape") {
        debug!("Escape after gallery failed: {:#}", e);
    }

    Ok(harvest)
}
